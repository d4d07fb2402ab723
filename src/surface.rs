use crate::models::DayDetail;
use crate::view::{DayCell, LunarLabel};
use maud::{html, Markup, PreEscaped};

/// What the modal body currently shows.
#[derive(Debug, Clone, PartialEq)]
pub enum ModalBody {
    Loading,
    Detail(DayDetail),
    Unavailable,
}

/// Page elements a calendar view writes to. Resolved once and handed to
/// the view at construction.
pub trait CalendarSurface {
    fn set_header(&mut self, title: &str);
    fn replace_grid(&mut self, leading_blanks: u32, cells: &[DayCell]);
    fn update_cell(&mut self, index: usize, cell: &DayCell);
    fn show_modal(&mut self, title: &str);
    fn set_modal_body(&mut self, body: &ModalBody);
    fn hide_modal(&mut self);
}

/// Surface that keeps the page fragments as markup, used for server-side
/// rendering of the calendar page.
#[derive(Debug, Default, Clone)]
pub struct HtmlSurface {
    header: String,
    leading_blanks: u32,
    cells: Vec<String>,
    modal_visible: bool,
    modal_title: String,
    modal_body: String,
}

impl HtmlSurface {
    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn grid_html(&self) -> String {
        html! {
            @for _ in 0..self.leading_blanks {
                div.calendar-blank {}
            }
            @for cell in &self.cells {
                (PreEscaped(cell))
            }
        }
        .into_string()
    }

    pub fn cell_html(&self, index: usize) -> Option<&str> {
        self.cells.get(index).map(String::as_str)
    }

    pub fn modal_visible(&self) -> bool {
        self.modal_visible
    }

    pub fn modal_title(&self) -> &str {
        &self.modal_title
    }

    pub fn modal_body_html(&self) -> &str {
        &self.modal_body
    }
}

impl CalendarSurface for HtmlSurface {
    fn set_header(&mut self, title: &str) {
        self.header = html! { (title) }.into_string();
    }

    fn replace_grid(&mut self, leading_blanks: u32, cells: &[DayCell]) {
        self.leading_blanks = leading_blanks;
        self.cells = cells.iter().map(render_cell).collect();
    }

    fn update_cell(&mut self, index: usize, cell: &DayCell) {
        if let Some(slot) = self.cells.get_mut(index) {
            *slot = render_cell(cell);
        }
    }

    fn show_modal(&mut self, title: &str) {
        self.modal_visible = true;
        self.modal_title = html! { (title) }.into_string();
    }

    fn set_modal_body(&mut self, body: &ModalBody) {
        self.modal_body = render_modal_body(body).into_string();
    }

    fn hide_modal(&mut self) {
        self.modal_visible = false;
    }
}

fn render_cell(cell: &DayCell) -> String {
    let mut classes = String::from("calendar-day");
    if cell.is_today {
        classes.push_str(" today");
    }
    if cell.is_new_moon() {
        classes.push_str(" new-moon");
    }
    let state = match cell.lunar {
        LunarLabel::Loading => "loading",
        LunarLabel::Ready { .. } => "ready",
        LunarLabel::NotAvailable => "missing",
        LunarLabel::Error => "error",
    };
    html! {
        div class=(classes) data-day=(cell.solar_day) data-state=(state) {
            span.solar { (cell.solar_day) }
            span.lunar { (cell.lunar.text()) }
        }
    }
    .into_string()
}

fn render_modal_body(body: &ModalBody) -> Markup {
    match body {
        ModalBody::Loading => html! { p.modal-loading { "Đang tải..." } },
        ModalBody::Unavailable => html! { p.modal-error { "Chức năng đang được cập nhật." } },
        ModalBody::Detail(detail) => {
            let rows = [
                ("Âm lịch", detail.lunar_date.clone()),
                ("Năm âm lịch", detail.lunar_year_name.clone()),
                ("Tháng âm lịch", detail.lunar_month_name.clone()),
                ("Ngày âm lịch", detail.lunar_day_name.clone()),
                ("Giờ hoàng đạo", detail.auspicious_hours.join(", ")),
                ("Giờ hắc đạo", detail.inauspicious_hours.join(", ")),
            ];
            html! {
                dl.detail {
                    @for (label, value) in &rows {
                        dt { (label) }
                        dd { (value) }
                    }
                }
            }
        }
    }
}

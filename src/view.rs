use crate::calendar::CalendarCursor;
use crate::errors::LunarError;
use crate::models::{DayDetail, DayDetailQuery, LunarMonthRequest, LunarRecord};
use crate::surface::{CalendarSurface, ModalBody};
use chrono::{Datelike, Local, NaiveDate};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LunarLabel {
    Loading,
    Ready { day: u32, month: u32 },
    NotAvailable,
    Error,
}

impl LunarLabel {
    pub fn text(&self) -> String {
        match self {
            LunarLabel::Loading => "...".to_string(),
            LunarLabel::Ready { day, month } => format!("{day}/{month} AL"),
            LunarLabel::NotAvailable => "N/A".to_string(),
            LunarLabel::Error => "Lỗi".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCell {
    pub solar_day: u32,
    pub is_today: bool,
    pub lunar: LunarLabel,
}

impl DayCell {
    pub fn is_new_moon(&self) -> bool {
        matches!(self.lunar, LunarLabel::Ready { day: 1, .. })
    }
}

/// Handed out by every render; the caller fetches `request` and reports
/// back with `generation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthTicket {
    pub generation: u64,
    pub request: LunarMonthRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    Applied,
    Failed,
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetailTicket {
    pub open_id: u64,
    pub query: DayDetailQuery,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModalState {
    Closed,
    Loading { open_id: u64, date: NaiveDate },
    Populated { open_id: u64, detail: DayDetail },
    Unavailable { open_id: u64, date: NaiveDate },
}

/// Month grid with lunar labels and the day detail modal.
///
/// Everything here is synchronous. Remote lookups happen outside the view;
/// their results come back through `resolve_batch` and `apply_detail`
/// together with the ticket that started them, and results whose ticket
/// is no longer current are dropped.
pub struct MonthCalendarView<S> {
    surface: S,
    cursor: CalendarCursor,
    leading_blanks: u32,
    cells: Vec<DayCell>,
    generation: u64,
    /// Generation whose batch has already been applied or failed.
    settled: Option<u64>,
    modal: ModalState,
    opens: u64,
}

impl<S: CalendarSurface> MonthCalendarView<S> {
    pub fn new(surface: S, cursor: CalendarCursor) -> Self {
        Self {
            surface,
            cursor,
            leading_blanks: 0,
            cells: Vec::new(),
            generation: 0,
            settled: None,
            modal: ModalState::Closed,
            opens: 0,
        }
    }

    pub fn cursor(&self) -> CalendarCursor {
        self.cursor
    }

    pub fn cells(&self) -> &[DayCell] {
        &self.cells
    }

    pub fn leading_blanks(&self) -> u32 {
        self.leading_blanks
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn modal(&self) -> &ModalState {
        &self.modal
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Renders a zero-based month using the local date for the "today" mark.
    pub fn render_month(&mut self, year: i32, month: u32) -> MonthTicket {
        self.render_month_at(year, month, Local::now().date_naive())
    }

    pub fn render_month_at(&mut self, year: i32, month: u32, today: NaiveDate) -> MonthTicket {
        let cursor = CalendarCursor::new(year, i64::from(month));
        self.cursor = cursor;
        self.generation += 1;

        let today_day = cursor.contains(today).then(|| today.day());
        self.leading_blanks = cursor.first_weekday();
        self.cells = (1..=cursor.days_in_month())
            .map(|day| DayCell {
                solar_day: day,
                is_today: today_day == Some(day),
                lunar: LunarLabel::Loading,
            })
            .collect();

        self.surface.set_header(&cursor.title());
        self.surface.replace_grid(self.leading_blanks, &self.cells);

        MonthTicket {
            generation: self.generation,
            request: LunarMonthRequest {
                month: cursor.month1(),
                year: cursor.year,
            },
        }
    }

    pub fn change_month(&mut self, delta: i64) -> MonthTicket {
        self.change_month_at(delta, Local::now().date_naive())
    }

    pub fn change_month_at(&mut self, delta: i64, today: NaiveDate) -> MonthTicket {
        let next = self.cursor.shifted(delta);
        self.render_month_at(next.year, next.month, today)
    }

    /// Writes lunar labels from a batch. Returns false, touching nothing,
    /// when the batch belongs to an earlier render or its render already
    /// settled.
    pub fn apply_lunar_batch(&mut self, records: &[Option<LunarRecord>], generation: u64) -> bool {
        if !self.settle(generation) {
            debug!(generation, current = self.generation, "dropping stale lunar batch");
            return false;
        }

        for (index, cell) in self.cells.iter_mut().enumerate() {
            cell.lunar = match records.get(index).copied().flatten() {
                Some(record) if record.is_well_formed() => LunarLabel::Ready {
                    day: record.day,
                    month: record.month,
                },
                _ => LunarLabel::NotAvailable,
            };
            self.surface.update_cell(index, cell);
        }
        true
    }

    /// Marks every cell still loading as failed.
    pub fn fail_batch(&mut self, generation: u64) -> bool {
        if !self.settle(generation) {
            debug!(generation, current = self.generation, "dropping stale batch failure");
            return false;
        }

        for (index, cell) in self.cells.iter_mut().enumerate() {
            if cell.lunar == LunarLabel::Loading {
                cell.lunar = LunarLabel::Error;
                self.surface.update_cell(index, cell);
            }
        }
        true
    }

    fn settle(&mut self, generation: u64) -> bool {
        if generation != self.generation || self.settled == Some(generation) {
            return false;
        }
        self.settled = Some(generation);
        true
    }

    pub fn resolve_batch(
        &mut self,
        generation: u64,
        result: Result<Vec<Option<LunarRecord>>, LunarError>,
    ) -> BatchOutcome {
        match result {
            Ok(records) => {
                if self.apply_lunar_batch(&records, generation) {
                    BatchOutcome::Applied
                } else {
                    BatchOutcome::Stale
                }
            }
            Err(err) => {
                if self.fail_batch(generation) {
                    warn!("lunar month lookup failed: {err}");
                    BatchOutcome::Failed
                } else {
                    BatchOutcome::Stale
                }
            }
        }
    }

    pub fn open_day_detail(&mut self, date: NaiveDate) -> DetailTicket {
        self.opens += 1;
        let open_id = self.opens;
        self.modal = ModalState::Loading { open_id, date };
        self.surface
            .show_modal(&format!("Ngày {}", date.format("%d/%m/%Y")));
        self.surface.set_modal_body(&ModalBody::Loading);

        DetailTicket {
            open_id,
            query: DayDetailQuery {
                day: date.day(),
                month: date.month(),
                year: date.year(),
            },
        }
    }

    /// Opens the modal for a day of the month on screen.
    pub fn open_cell(&mut self, solar_day: u32) -> Option<DetailTicket> {
        let date = NaiveDate::from_ymd_opt(self.cursor.year, self.cursor.month1(), solar_day)?;
        Some(self.open_day_detail(date))
    }

    /// Fills the modal if it is still waiting on `open_id`.
    pub fn apply_detail(&mut self, open_id: u64, result: Result<DayDetail, LunarError>) -> bool {
        let date = match &self.modal {
            ModalState::Loading { open_id: current, date } if *current == open_id => *date,
            _ => {
                debug!(open_id, "dropping day detail for a modal no longer waiting");
                return false;
            }
        };

        match result {
            Ok(detail) => {
                self.surface.set_modal_body(&ModalBody::Detail(detail.clone()));
                self.modal = ModalState::Populated { open_id, detail };
            }
            Err(err) => {
                warn!("day detail lookup for {date} failed: {err}");
                self.surface.set_modal_body(&ModalBody::Unavailable);
                self.modal = ModalState::Unavailable { open_id, date };
            }
        }
        true
    }

    pub fn close_modal(&mut self) {
        self.modal = ModalState::Closed;
        self.surface.hide_modal();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::HtmlSurface;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn view() -> MonthCalendarView<HtmlSurface> {
        MonthCalendarView::new(HtmlSurface::default(), CalendarCursor { year: 2024, month: 0 })
    }

    fn sample_detail() -> DayDetail {
        DayDetail {
            solar_day: 5,
            solar_month: 4,
            solar_year: 2024,
            lunar_date: "27/2 AL".into(),
            lunar_day_name: "27".into(),
            lunar_month_name: "Tháng Hai".into(),
            lunar_year_name: "Năm Giáp Thìn".into(),
            auspicious_hours: vec!["Tý (23-1)".into()],
            inauspicious_hours: vec!["Sửu (1-3)".into()],
        }
    }

    #[test]
    fn render_builds_padded_grid_with_loading_cells() {
        let mut view = view();
        let ticket = view.render_month_at(2024, 3, date(2024, 4, 17));

        assert_eq!(view.leading_blanks(), 1);
        assert_eq!(view.cells().len(), 30);
        assert!(view.cells().iter().all(|c| c.lunar == LunarLabel::Loading));
        let today: Vec<u32> = view.cells().iter().filter(|c| c.is_today).map(|c| c.solar_day).collect();
        assert_eq!(today, vec![17]);
        assert_eq!(ticket.request, LunarMonthRequest { month: 4, year: 2024 });
        assert_eq!(view.surface().header(), "Tháng 4 năm 2024");
        assert_eq!(view.surface().grid_html().matches("calendar-blank").count(), 1);
    }

    #[test]
    fn today_is_not_marked_in_other_months() {
        let mut view = view();
        view.render_month_at(2024, 3, date(2025, 4, 17));
        assert!(view.cells().iter().all(|c| !c.is_today));
    }

    #[test]
    fn change_month_normalizes_and_bumps_generation() {
        let today = date(2024, 1, 1);
        let mut view = view();
        let first = view.render_month_at(2024, 0, today);

        let back = view.change_month_at(-1, today);
        assert_eq!(view.cursor(), CalendarCursor { year: 2023, month: 11 });
        assert!(back.generation > first.generation);

        view.change_month_at(1, today);
        assert_eq!(view.cursor(), CalendarCursor { year: 2024, month: 0 });

        view.render_month_at(2024, 11, today);
        view.change_month_at(1, today);
        assert_eq!(view.cursor(), CalendarCursor { year: 2025, month: 0 });

        view.render_month_at(2024, 0, today);
        let jump = view.change_month_at(13, today);
        assert_eq!(view.cursor(), CalendarCursor { year: 2025, month: 1 });
        assert_eq!(jump.request, LunarMonthRequest { month: 2, year: 2025 });
    }

    #[test]
    fn batch_labels_cells_and_flags_new_moon() {
        let mut view = view();
        let ticket = view.render_month_at(2024, 3, date(2024, 1, 1));
        view.cells.truncate(3);

        let records = [
            Some(LunarRecord::new(15, 10)),
            None,
            Some(LunarRecord::new(1, 11)),
        ];
        assert!(view.apply_lunar_batch(&records, ticket.generation));

        let cells = view.cells();
        assert_eq!(cells[0].lunar.text(), "15/10 AL");
        assert!(!cells[0].is_new_moon());
        assert_eq!(cells[1].lunar, LunarLabel::NotAvailable);
        assert_eq!(cells[2].lunar.text(), "1/11 AL");
        assert!(cells[2].is_new_moon());
        assert!(view.surface().cell_html(2).unwrap().contains("new-moon"));
    }

    #[test]
    fn short_batch_clears_trailing_cells() {
        let mut view = view();
        let ticket = view.render_month_at(2024, 1, date(2024, 1, 1));
        let records = vec![Some(LunarRecord::new(20, 12)); 10];

        assert!(view.apply_lunar_batch(&records, ticket.generation));
        assert_eq!(view.cells().len(), 29);
        assert!(view.cells()[..10].iter().all(|c| matches!(c.lunar, LunarLabel::Ready { .. })));
        assert!(view.cells()[10..].iter().all(|c| c.lunar == LunarLabel::NotAvailable));
    }

    #[test]
    fn malformed_record_is_not_available() {
        let mut view = view();
        let ticket = view.render_month_at(2024, 1, date(2024, 1, 1));
        let records = vec![Some(LunarRecord::new(0, 12))];
        view.apply_lunar_batch(&records, ticket.generation);
        assert_eq!(view.cells()[0].lunar, LunarLabel::NotAvailable);
    }

    #[test]
    fn stale_batch_leaves_new_grid_untouched() {
        let today = date(2024, 1, 1);
        let mut view = view();
        let first = view.render_month_at(2024, 3, today);
        let second = view.change_month_at(1, today);
        let before = view.surface().grid_html();

        let records = vec![Some(LunarRecord::new(1, 3)); 30];
        assert_eq!(view.resolve_batch(first.generation, Ok(records)), BatchOutcome::Stale);
        assert!(view.cells().iter().all(|c| c.lunar == LunarLabel::Loading));
        assert_eq!(view.surface().grid_html(), before);

        assert_eq!(
            view.resolve_batch(first.generation, Err(LunarError::Status(500))),
            BatchOutcome::Stale
        );
        assert!(view.cells().iter().all(|c| c.lunar == LunarLabel::Loading));

        let records = vec![Some(LunarRecord::new(2, 4)); 31];
        assert_eq!(view.resolve_batch(second.generation, Ok(records)), BatchOutcome::Applied);
    }

    #[test]
    fn batch_is_applied_once_per_render() {
        let mut view = view();
        let ticket = view.render_month_at(2024, 3, date(2024, 1, 1));

        let first = vec![Some(LunarRecord::new(5, 3)); 30];
        let second = vec![Some(LunarRecord::new(9, 9)); 30];
        assert!(view.apply_lunar_batch(&first, ticket.generation));
        assert!(!view.apply_lunar_batch(&second, ticket.generation));
        assert!(!view.fail_batch(ticket.generation));
        assert_eq!(
            view.resolve_batch(ticket.generation, Ok(second)),
            BatchOutcome::Stale
        );
        assert!(view.cells().iter().all(|c| c.lunar == LunarLabel::Ready { day: 5, month: 3 }));

        let next = view.change_month_at(0, date(2024, 1, 1));
        assert!(view.fail_batch(next.generation));
        assert!(!view.apply_lunar_batch(&first, next.generation));
        assert!(view.cells().iter().all(|c| c.lunar == LunarLabel::Error));
    }

    #[test]
    fn failed_batch_leaves_no_loading_cells() {
        let mut view = view();
        let ticket = view.render_month_at(2024, 3, date(2024, 1, 1));
        let outcome = view.resolve_batch(ticket.generation, Err(LunarError::Timeout));

        assert_eq!(outcome, BatchOutcome::Failed);
        assert!(view.cells().iter().all(|c| c.lunar == LunarLabel::Error));
        assert!(!view.surface().grid_html().contains("data-state=\"loading\""));
    }

    #[test]
    fn modal_shows_loading_then_detail() {
        let mut view = view();
        let ticket = view.open_day_detail(date(2024, 4, 5));

        assert!(matches!(view.modal(), ModalState::Loading { .. }));
        assert!(view.surface().modal_visible());
        assert_eq!(view.surface().modal_title(), "Ngày 05/04/2024");
        assert!(view.surface().modal_body_html().contains("Đang tải"));
        assert_eq!(ticket.query, DayDetailQuery { day: 5, month: 4, year: 2024 });

        assert!(view.apply_detail(ticket.open_id, Ok(sample_detail())));
        assert!(matches!(view.modal(), ModalState::Populated { .. }));
        assert!(view.surface().modal_body_html().contains("Năm Giáp Thìn"));

        // A second answer for the same open is ignored.
        assert!(!view.apply_detail(ticket.open_id, Err(LunarError::Timeout)));
        assert!(matches!(view.modal(), ModalState::Populated { .. }));
    }

    #[test]
    fn modal_failure_shows_unavailable() {
        let mut view = view();
        let ticket = view.open_day_detail(date(2024, 4, 5));
        assert!(view.apply_detail(ticket.open_id, Err(LunarError::Status(503))));
        assert!(matches!(view.modal(), ModalState::Unavailable { .. }));
        assert!(view.surface().modal_body_html().contains("đang được cập nhật"));
    }

    #[test]
    fn detail_for_closed_or_reopened_modal_is_dropped() {
        let mut view = view();
        let first = view.open_day_detail(date(2024, 4, 5));
        view.close_modal();
        assert_eq!(view.modal(), &ModalState::Closed);
        assert!(!view.surface().modal_visible());
        assert!(!view.apply_detail(first.open_id, Ok(sample_detail())));
        assert_eq!(view.modal(), &ModalState::Closed);

        let second = view.open_day_detail(date(2024, 4, 6));
        let third = view.open_day_detail(date(2024, 4, 7));
        assert!(!view.apply_detail(second.open_id, Ok(sample_detail())));
        assert!(matches!(view.modal(), ModalState::Loading { open_id, .. } if *open_id == third.open_id));
    }

    #[test]
    fn open_cell_uses_cursor_month() {
        let mut view = view();
        view.render_month_at(2024, 1, date(2024, 1, 1));
        let ticket = view.open_cell(29).unwrap();
        assert_eq!(ticket.query, DayDetailQuery { day: 29, month: 2, year: 2024 });
        assert!(view.open_cell(30).is_none());
    }
}

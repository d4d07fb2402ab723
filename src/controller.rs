use crate::detail::DayDetailSource;
use crate::errors::LunarError;
use crate::lunar::MonthLunarSource;
use crate::surface::CalendarSurface;
use crate::view::{BatchOutcome, DetailTicket, MonthCalendarView, MonthTicket};
use chrono::NaiveDate;
use std::cell::RefCell;
use std::time::Duration;
use tokio::time::timeout;

/// Drives a `MonthCalendarView` against its remote lookups.
///
/// Runs on a single thread: the view is only borrowed between await
/// points, so several month loads may be in flight at once and each one
/// settles through the view's generation check.
pub struct CalendarController<S, M, D> {
    view: RefCell<MonthCalendarView<S>>,
    months: M,
    details: D,
    detail_timeout: Duration,
}

impl<S, M, D> CalendarController<S, M, D>
where
    S: CalendarSurface,
    M: MonthLunarSource,
    D: DayDetailSource,
{
    pub fn new(view: MonthCalendarView<S>, months: M, details: D, detail_timeout: Duration) -> Self {
        Self {
            view: RefCell::new(view),
            months,
            details,
            detail_timeout,
        }
    }

    pub fn view(&self) -> std::cell::Ref<'_, MonthCalendarView<S>> {
        self.view.borrow()
    }

    pub async fn show_month(&self, year: i32, month: u32) -> BatchOutcome {
        let ticket = self.view.borrow_mut().render_month(year, month);
        self.load(ticket).await
    }

    pub async fn change_month(&self, delta: i64) -> BatchOutcome {
        let ticket = self.view.borrow_mut().change_month(delta);
        self.load(ticket).await
    }

    /// Fetches the lunar dates of a rendered month and hands them to the view.
    pub async fn load(&self, ticket: MonthTicket) -> BatchOutcome {
        let result = self.months.fetch_month(ticket.request).await;
        self.view.borrow_mut().resolve_batch(ticket.generation, result)
    }

    /// Opens the detail modal and fills it once the lookup settles.
    /// Returns whether the answer was shown.
    pub async fn open_day_detail(&self, date: NaiveDate) -> bool {
        let ticket = self.view.borrow_mut().open_day_detail(date);
        self.fill_detail(ticket).await
    }

    /// Same as `open_day_detail` for a day of the month on screen. Days the
    /// month does not have leave the modal untouched.
    pub async fn open_cell(&self, solar_day: u32) -> bool {
        let ticket = self.view.borrow_mut().open_cell(solar_day);
        match ticket {
            Some(ticket) => self.fill_detail(ticket).await,
            None => false,
        }
    }

    async fn fill_detail(&self, ticket: DetailTicket) -> bool {
        let result = match timeout(self.detail_timeout, self.details.fetch_detail(ticket.query)).await {
            Ok(result) => result,
            Err(_) => Err(LunarError::Timeout),
        };
        self.view.borrow_mut().apply_detail(ticket.open_id, result)
    }

    pub fn close_modal(&self) {
        self.view.borrow_mut().close_modal();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::CalendarCursor;
    use crate::detail::PlaceholderDetailSource;
    use crate::models::{DayDetail, DayDetailQuery, LunarMonthRequest, LunarRecord};
    use crate::surface::HtmlSurface;
    use crate::view::{LunarLabel, ModalState};
    use std::cell::Cell;

    /// Answers month lookups after a per-month delay, April slowest.
    struct DelayedMonths {
        calls: Cell<u32>,
        fail: bool,
    }

    impl DelayedMonths {
        fn new() -> Self {
            Self { calls: Cell::new(0), fail: false }
        }
    }

    impl MonthLunarSource for DelayedMonths {
        async fn fetch_month(
            &self,
            request: LunarMonthRequest,
        ) -> Result<Vec<Option<LunarRecord>>, LunarError> {
            self.calls.set(self.calls.get() + 1);
            let delay = if request.month == 4 { 500 } else { 50 };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            if self.fail {
                return Err(LunarError::Status(502));
            }
            Ok(vec![Some(LunarRecord::new(request.month, 1)); 31])
        }
    }

    struct NeverDetail;

    impl DayDetailSource for NeverDetail {
        async fn fetch_detail(&self, _query: DayDetailQuery) -> Result<DayDetail, LunarError> {
            std::future::pending().await
        }
    }

    fn controller<M: MonthLunarSource, D: DayDetailSource>(
        months: M,
        details: D,
    ) -> CalendarController<HtmlSurface, M, D> {
        let view = MonthCalendarView::new(HtmlSurface::default(), CalendarCursor { year: 2024, month: 3 });
        CalendarController::new(view, months, details, Duration::from_secs(2))
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn month_load_labels_every_cell() {
        let controller = controller(DelayedMonths::new(), PlaceholderDetailSource::default());
        let outcome = controller.show_month(2024, 4).await;

        assert_eq!(outcome, BatchOutcome::Applied);
        let view = controller.view();
        assert_eq!(view.cells().len(), 31);
        assert!(view.cells().iter().all(|c| c.lunar == LunarLabel::Ready { day: 5, month: 1 }));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_response_for_superseded_month_is_ignored() {
        let controller = controller(DelayedMonths::new(), PlaceholderDetailSource::default());

        let (april, may) = tokio::join!(controller.show_month(2024, 3), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            controller.change_month(1).await
        });

        assert_eq!(april, BatchOutcome::Stale);
        assert_eq!(may, BatchOutcome::Applied);
        assert_eq!(controller.months.calls.get(), 2);
        let view = controller.view();
        assert_eq!(view.cursor(), CalendarCursor { year: 2024, month: 4 });
        assert!(view.cells().iter().all(|c| c.lunar == LunarLabel::Ready { day: 5, month: 1 }));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_month_load_marks_cells_as_errors() {
        let months = DelayedMonths { calls: Cell::new(0), fail: true };
        let controller = controller(months, PlaceholderDetailSource::default());

        assert_eq!(controller.show_month(2024, 1).await, BatchOutcome::Failed);
        let view = controller.view();
        assert_eq!(view.cells().len(), 29);
        assert!(view.cells().iter().all(|c| c.lunar == LunarLabel::Error));
    }

    #[tokio::test(start_paused = true)]
    async fn detail_modal_is_loading_before_the_answer() {
        let controller = controller(DelayedMonths::new(), PlaceholderDetailSource::default());

        let (shown, loading_seen) = tokio::join!(controller.open_day_detail(date(2024, 4, 5)), async {
            matches!(controller.view().modal(), ModalState::Loading { .. })
        });

        assert!(loading_seen);
        assert!(shown);
        assert!(matches!(controller.view().modal(), ModalState::Populated { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn clicked_cell_opens_detail_for_the_shown_month() {
        let controller = controller(DelayedMonths::new(), PlaceholderDetailSource::default());
        controller.show_month(2024, 1).await;

        assert!(controller.open_cell(29).await);
        match controller.view().modal() {
            ModalState::Populated { detail, .. } => {
                assert_eq!((detail.solar_day, detail.solar_month, detail.solar_year), (29, 2, 2024));
            }
            other => panic!("unexpected modal state {other:?}"),
        }

        controller.close_modal();
        assert!(!controller.open_cell(30).await);
        assert_eq!(controller.view().modal(), &ModalState::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn reloading_a_settled_month_is_stale() {
        let controller = controller(DelayedMonths::new(), PlaceholderDetailSource::default());
        let ticket = controller.view.borrow_mut().render_month(2024, 4);

        assert_eq!(controller.load(ticket).await, BatchOutcome::Applied);
        assert_eq!(controller.load(ticket).await, BatchOutcome::Stale);
        assert_eq!(controller.months.calls.get(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_detail_times_out_to_unavailable() {
        let controller = controller(DelayedMonths::new(), NeverDetail);

        assert!(controller.open_day_detail(date(2024, 4, 5)).await);
        assert!(matches!(controller.view().modal(), ModalState::Unavailable { .. }));
        assert!(controller.view().surface().modal_body_html().contains("đang được cập nhật"));
    }

    #[tokio::test(start_paused = true)]
    async fn closing_while_loading_discards_the_answer() {
        let controller = controller(DelayedMonths::new(), PlaceholderDetailSource::default());

        let (shown, ()) = tokio::join!(controller.open_day_detail(date(2024, 4, 5)), async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            controller.close_modal();
        });

        assert!(!shown);
        assert_eq!(controller.view().modal(), &ModalState::Closed);
    }
}

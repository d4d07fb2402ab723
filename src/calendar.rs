use chrono::{Datelike, NaiveDate};

/// Year and zero-based month shown by a calendar view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarCursor {
    pub year: i32,
    pub month: u32,
}

impl CalendarCursor {
    /// Builds a cursor, folding out-of-range months into the year.
    pub fn new(year: i32, month: i64) -> Self {
        Self { year, month: 0 }.shifted(month)
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month0(),
        }
    }

    /// Moves by `delta` months, carrying overflow and underflow into the year.
    pub fn shifted(self, delta: i64) -> Self {
        let total = i64::from(self.year) * 12 + i64::from(self.month) + delta;
        let year = total.div_euclid(12);
        if year > i64::from(i32::MAX) {
            return Self { year: i32::MAX, month: 11 };
        }
        if year < i64::from(i32::MIN) {
            return Self { year: i32::MIN, month: 0 };
        }
        Self {
            year: year as i32,
            month: total.rem_euclid(12) as u32,
        }
    }

    pub fn days_in_month(self) -> u32 {
        days_in_month(self.year, self.month)
    }

    pub fn first_weekday(self) -> u32 {
        first_weekday(self.year, self.month)
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month0() == self.month
    }

    /// One-based month as sent over the wire.
    pub fn month1(self) -> u32 {
        self.month + 1
    }

    pub fn title(self) -> String {
        format!("Tháng {} năm {}", self.month1(), self.year)
    }
}

pub fn is_leap_year(year: i32) -> bool {
    let year = i64::from(year);
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Day count of a zero-based month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 if is_leap_year(year) => 29,
        1 => 28,
        3 | 5 | 8 | 10 => 30,
        _ => 31,
    }
}

/// Weekday of the first of a zero-based month, 0 = Sunday.
///
/// Works on the proleptic Gregorian calendar for every `i32` year, which
/// is wider than what `NaiveDate` can represent.
pub fn first_weekday(year: i32, month: u32) -> u32 {
    let days = days_from_civil(i64::from(year), i64::from(month) + 1, 1);
    // 1970-01-01 was a Thursday.
    (days + 4).rem_euclid(7) as u32
}

fn days_from_civil(year: i64, month: i64, day: i64) -> i64 {
    let year = if month <= 2 { year - 1 } else { year };
    let era = year.div_euclid(400);
    let yoe = year - era * 400;
    let mp = (month + 9) % 12;
    let doy = (153 * mp + 2) / 5 + day - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

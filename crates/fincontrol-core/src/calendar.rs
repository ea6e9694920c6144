//! Month-end date arithmetic shared by the generator and the view filter.

use chrono::{Datelike, Months, NaiveDate};

/// Last day of the month containing `date`.
pub fn month_end(date: NaiveDate) -> Option<NaiveDate> {
    let first = date.with_day(1)?;
    first.checked_add_months(Months::new(1))?.pred_opt()
}

/// Month-end `months` calendar months before the month containing `date`.
pub fn month_end_before(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    let first = date.with_day(1)?;
    month_end(first.checked_sub_months(Months::new(months))?)
}

/// The `count` most recent month-end dates on or before `as_of`, ascending.
pub fn trailing_month_ends(as_of: NaiveDate, count: usize) -> Option<Vec<NaiveDate>> {
    let current = month_end(as_of)?;
    let latest = if current == as_of {
        current
    } else {
        month_end_before(as_of, 1)?
    };

    let mut dates = Vec::with_capacity(count);
    for back in (0..count).rev() {
        let back = u32::try_from(back).ok()?;
        dates.push(month_end_before(latest, back)?);
    }
    Some(dates)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_end_leap_year() {
        assert_eq!(month_end(date(2024, 2, 10)), Some(date(2024, 2, 29)));
        assert_eq!(month_end(date(2025, 2, 10)), Some(date(2025, 2, 28)));
        assert_eq!(month_end(date(2025, 12, 1)), Some(date(2025, 12, 31)));
    }

    #[test]
    fn test_month_end_before_crosses_year() {
        assert_eq!(month_end_before(date(2026, 2, 28), 3), Some(date(2025, 11, 30)));
        assert_eq!(month_end_before(date(2026, 3, 31), 1), Some(date(2026, 2, 28)));
    }

    #[test]
    fn test_trailing_month_ends_mid_month() {
        let dates = trailing_month_ends(date(2026, 10, 19), 12).unwrap();
        assert_eq!(dates.len(), 12);
        assert_eq!(dates[0], date(2025, 10, 31));
        assert_eq!(dates[11], date(2026, 9, 30));
    }

    #[test]
    fn test_trailing_month_ends_on_month_end() {
        let dates = trailing_month_ends(date(2026, 9, 30), 2).unwrap();
        assert_eq!(dates, vec![date(2026, 8, 31), date(2026, 9, 30)]);
    }
}

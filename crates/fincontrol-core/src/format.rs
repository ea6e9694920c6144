//! Display formatting for dashboard values.

/// `$1.2M`, `$45.3K`, or `$999` / `$-1,500,000` below the thousand
/// breakpoint (negative amounts never reach the abbreviated forms).
pub fn currency_format(value: f64) -> String {
    if value >= 1_000_000.0 {
        format!("${:.1}M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("${:.1}K", value / 1_000.0)
    } else {
        format!("${}", group_thousands(value))
    }
}

/// 0.253 -> "25.3%"
pub fn percent_format(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}

/// Ratio table cell: percent for |v| < 1, two decimals otherwise.
pub fn ratio_format(value: f64) -> String {
    if value.abs() < 1.0 {
        percent_format(value)
    } else {
        format!("{value:.2}")
    }
}

/// Signed change for KPI deltas: "+4.3%".
pub fn change_format(pct: f64) -> String {
    format!("{pct:+.1}%")
}

/// Round to a whole number and insert thousands separators.
fn group_thousands(value: f64) -> String {
    let rounded = format!("{value:.0}");
    let (sign, digits) = match rounded.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", rounded.as_str()),
    };
    // "-0" after rounding a tiny negative
    if digits.chars().all(|c| c == '0') {
        return "0".to_string();
    }

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("{sign}{grouped}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_millions() {
        assert_eq!(currency_format(1_000_000.0), "$1.0M");
        assert_eq!(currency_format(12_345_678.0), "$12.3M");
    }

    #[test]
    fn test_currency_thousands() {
        assert_eq!(currency_format(1_000.0), "$1.0K");
        assert_eq!(currency_format(999_949.0), "$999.9K");
        assert_eq!(currency_format(45_260.0), "$45.3K");
    }

    #[test]
    fn test_currency_small_and_negative() {
        assert_eq!(currency_format(999.4), "$999");
        assert_eq!(currency_format(0.0), "$0");
        assert_eq!(currency_format(-0.2), "$0");
        assert_eq!(currency_format(-1_500_000.0), "$-1,500,000");
        assert_eq!(currency_format(-1_234.0), "$-1,234");
    }

    #[test]
    fn test_percent_and_ratio_format() {
        assert_eq!(percent_format(0.253), "25.3%");
        assert_eq!(ratio_format(0.25), "25.0%");
        assert_eq!(ratio_format(-0.05), "-5.0%");
        assert_eq!(ratio_format(2.0), "2.00");
        assert_eq!(ratio_format(1.4567), "1.46");
    }

    #[test]
    fn test_change_format() {
        assert_eq!(change_format(4.26), "+4.3%");
        assert_eq!(change_format(-3.0), "-3.0%");
        assert_eq!(change_format(0.0), "+0.0%");
    }
}

use chrono::{Datelike, NaiveDate};

/// Day-first formats tried in order. UK statements never use month-first
/// numeric dates, so `%d/%m` always wins over `%m/%d`.
const FULL_FORMATS: &[&str] = &[
    "%d/%m/%Y",
    "%d/%m/%y",
    "%d-%m-%Y",
    "%d-%m-%y",
    "%d.%m.%Y",
    "%Y-%m-%d",
    "%d %b %Y",
    "%d %B %Y",
    "%d %b %y",
];

/// Parse a complete date in any of the layouts seen across UK statements.
pub fn parse_uk_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    for fmt in FULL_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(normalise_century(date));
        }
    }
    None
}

/// Parse a day+month fragment (`03 Apr`, `3 April`) against a statement year.
pub fn parse_day_month(s: &str, year: i32) -> Option<NaiveDate> {
    let s = s.trim();
    let mut parts = s.split_whitespace();
    let day: u32 = parts.next()?.parse().ok()?;
    let month = month_to_num(parts.next()?)?;
    if parts.next().is_some() {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

pub fn month_to_num(name: &str) -> Option<u32> {
    let n = name.trim_end_matches('.').to_lowercase();
    match n.get(..3)? {
        "jan" => Some(1),
        "feb" => Some(2),
        "mar" => Some(3),
        "apr" => Some(4),
        "may" => Some(5),
        "jun" => Some(6),
        "jul" => Some(7),
        "aug" => Some(8),
        "sep" => Some(9),
        "oct" => Some(10),
        "nov" => Some(11),
        "dec" => Some(12),
        _ => None,
    }
}

// chrono maps two-digit years to 1970-2069 already; this guards the formats
// where we parsed the year ourselves.
fn normalise_century(date: NaiveDate) -> NaiveDate {
    if date.year() < 100 {
        NaiveDate::from_ymd_opt(date.year() + 2000, date.month(), date.day()).unwrap_or(date)
    } else {
        date
    }
}

/// Render a date the way UK statements and our CSV output do.
pub fn format_uk(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn slash_date_is_day_first() {
        // 01/03/2024 is the 1st of March, not January 3rd.
        assert_eq!(parse_uk_date("01/03/2024"), Some(ymd(2024, 3, 1)));
    }

    #[test]
    fn two_digit_year_expands() {
        assert_eq!(parse_uk_date("05/04/23"), Some(ymd(2023, 4, 5)));
    }

    #[test]
    fn iso_accepted() {
        assert_eq!(parse_uk_date("2024-03-01"), Some(ymd(2024, 3, 1)));
    }

    #[test]
    fn month_name_forms() {
        assert_eq!(parse_uk_date("3 Apr 2024"), Some(ymd(2024, 4, 3)));
        assert_eq!(parse_uk_date("03 April 2024"), Some(ymd(2024, 4, 3)));
    }

    #[test]
    fn rejects_invalid_calendar_dates() {
        assert_eq!(parse_uk_date("31/02/2024"), None);
        assert_eq!(parse_uk_date("not a date"), None);
    }

    #[test]
    fn day_month_fragment_uses_given_year() {
        assert_eq!(parse_day_month("03 Apr", 2023), Some(ymd(2023, 4, 3)));
        assert_eq!(parse_day_month("3 December", 2022), Some(ymd(2022, 12, 3)));
        assert_eq!(parse_day_month("3 Apr 2023", 2022), None);
    }

    #[test]
    fn format_uk_renders_day_first() {
        assert_eq!(format_uk(ymd(2024, 3, 1)), "01/03/2024");
    }
}

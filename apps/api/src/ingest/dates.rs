//! Resume date parsing. Resumes carry dates in a handful of loose formats;
//! anything unparseable degrades to `None` rather than failing the record.

use chrono::NaiveDate;

const MONTHS: &[(&str, u32)] = &[
    ("january", 1),
    ("february", 2),
    ("march", 3),
    ("april", 4),
    ("may", 5),
    ("june", 6),
    ("july", 7),
    ("august", 8),
    ("september", 9),
    ("october", 10),
    ("november", 11),
    ("december", 12),
];

const OPEN_END_WORDS: &[&str] = &["present", "current", "now", "ongoing", "today"];

/// Parses a single resume date token. Accepted forms:
/// `MM/YYYY`, `YYYY-MM`, `Month YYYY`, `Mon YYYY`, bare `YYYY`.
/// Day-of-month is normalized to the 1st.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim().trim_end_matches(',');
    if s.is_empty() {
        return None;
    }

    // MM/YYYY
    if let Some((m, y)) = s.split_once('/') {
        if let (Ok(month), Ok(year)) = (m.trim().parse::<u32>(), y.trim().parse::<i32>()) {
            return NaiveDate::from_ymd_opt(year, month, 1);
        }
    }

    // YYYY-MM (but not YYYY-YYYY, which is a range handled by the caller)
    if let Some((y, m)) = s.split_once('-') {
        if y.trim().len() == 4 && m.trim().len() <= 2 {
            if let (Ok(year), Ok(month)) = (y.trim().parse::<i32>(), m.trim().parse::<u32>()) {
                return NaiveDate::from_ymd_opt(year, month, 1);
            }
        }
    }

    // Month YYYY / Mon YYYY
    let mut parts = s.split_whitespace();
    if let (Some(first), Some(second)) = (parts.next(), parts.next()) {
        let name = first.to_lowercase();
        let month = MONTHS
            .iter()
            .find(|(full, _)| *full == name || (name.len() >= 3 && full.starts_with(&name)))
            .map(|(_, n)| *n);
        if let (Some(month), Ok(year)) = (month, second.trim().parse::<i32>()) {
            return NaiveDate::from_ymd_opt(year, month, 1);
        }
    }

    // Bare year
    if s.len() == 4 {
        if let Ok(year) = s.parse::<i32>() {
            return NaiveDate::from_ymd_opt(year, 1, 1);
        }
    }

    None
}

/// True when the token marks an open-ended (still current) role.
pub fn is_open_end(raw: &str) -> bool {
    let s = raw.trim().to_lowercase();
    OPEN_END_WORDS.iter().any(|w| *w == s)
}

/// Parses a date range like `2019 - 2021`, `Jan 2020 – Present`,
/// `03/2018 to 06/2020`. Returns (start, end); either side may be `None`
/// when missing or unparseable, and an open-end word yields `end = None`.
/// Inverted ranges are swapped so start ≤ end always holds.
pub fn parse_range(raw: &str) -> (Option<NaiveDate>, Option<NaiveDate>) {
    let (left, right) = match split_range(raw) {
        Some(pair) => pair,
        None => return (parse_date(raw), None),
    };

    let start = parse_date(left);
    let end = if is_open_end(right) {
        None
    } else {
        parse_date(right)
    };

    match (start, end) {
        (Some(s), Some(e)) if s > e => (Some(e), Some(s)),
        other => other,
    }
}

fn split_range(raw: &str) -> Option<(&str, &str)> {
    for sep in ["–", "—", " to ", " - "] {
        if let Some((l, r)) = raw.split_once(sep) {
            return Some((l, r));
        }
    }
    // Bare YYYY-YYYY
    if let Some((l, r)) = raw.split_once('-') {
        if l.trim().len() == 4 && r.trim().len() == 4 {
            return Some((l, r));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_mm_slash_yyyy() {
        assert_eq!(parse_date("03/2019"), Some(ymd(2019, 3, 1)));
    }

    #[test]
    fn test_parse_month_name_yyyy() {
        assert_eq!(parse_date("January 2020"), Some(ymd(2020, 1, 1)));
        assert_eq!(parse_date("sep 2021"), Some(ymd(2021, 9, 1)));
    }

    #[test]
    fn test_parse_bare_year() {
        assert_eq!(parse_date("2018"), Some(ymd(2018, 1, 1)));
    }

    #[test]
    fn test_parse_iso_year_month() {
        assert_eq!(parse_date("2020-06"), Some(ymd(2020, 6, 1)));
    }

    #[test]
    fn test_unparseable_date_is_none() {
        assert_eq!(parse_date("Summer of discontent"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_range_with_en_dash_and_present() {
        let (s, e) = parse_range("Jan 2020 – Present");
        assert_eq!(s, Some(ymd(2020, 1, 1)));
        assert_eq!(e, None);
    }

    #[test]
    fn test_range_bare_years() {
        let (s, e) = parse_range("2019-2021");
        assert_eq!(s, Some(ymd(2019, 1, 1)));
        assert_eq!(e, Some(ymd(2021, 1, 1)));
    }

    #[test]
    fn test_range_with_to_separator() {
        let (s, e) = parse_range("03/2018 to 06/2020");
        assert_eq!(s, Some(ymd(2018, 3, 1)));
        assert_eq!(e, Some(ymd(2020, 6, 1)));
    }

    #[test]
    fn test_inverted_range_is_swapped() {
        let (s, e) = parse_range("2022 - 2019");
        assert_eq!(s, Some(ymd(2019, 1, 1)));
        assert_eq!(e, Some(ymd(2022, 1, 1)));
    }

    #[test]
    fn test_open_end_words() {
        assert!(is_open_end("Present"));
        assert!(is_open_end("current"));
        assert!(!is_open_end("2021"));
    }
}

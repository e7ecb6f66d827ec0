use chrono::{Local, NaiveDate, NaiveDateTime};

/// Canonical `YYYY-MM-DD` key for today, in the server's local timezone.
/// Week ranges and "today" must agree with what the user sees, so this
/// deliberately avoids UTC.
pub fn today_key() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// Coerce a raw sheet cell into a canonical `YYYY-MM-DD` key.
///
/// Cells written by this service are already canonical, but rows edited by
/// hand in the spreadsheet can hold anything a spreadsheet calls a date.
/// Unparseable values collapse to an empty key, which never matches a filter.
pub fn date_key(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }

    // get() rather than indexing: a multibyte character straddling the
    // 10-byte mark must fall through, not panic.
    if let Some(prefix) = raw.get(..10) {
        if NaiveDate::parse_from_str(prefix, "%Y-%m-%d").is_ok() {
            return prefix.to_string();
        }
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt.format("%Y-%m-%d").to_string();
    }

    for fmt in ["%d/%m/%Y", "%m/%d/%Y", "%d.%m.%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return d.format("%Y-%m-%d").to_string();
        }
    }

    String::new()
}

/// True when `key` falls inside the inclusive `[start, end]` range. Canonical
/// keys sort lexicographically, so plain string comparison is correct.
pub fn in_range(key: &str, start: &str, end: &str) -> bool {
    !key.is_empty() && key >= start && key <= end
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_strings_pass_through() {
        assert_eq!(date_key("2024-01-05"), "2024-01-05");
        assert_eq!(date_key("2024-01-05T08:30:00.000Z"), "2024-01-05");
        assert_eq!(date_key(" 2024-01-05 "), "2024-01-05");
    }

    #[test]
    fn spreadsheet_formats_are_coerced() {
        assert_eq!(date_key("05/01/2024"), "2024-01-05");
        assert_eq!(date_key("1/5/2024"), "2024-05-01");
        assert_eq!(date_key("05.01.2024"), "2024-01-05");
    }

    #[test]
    fn garbage_collapses_to_empty() {
        assert_eq!(date_key(""), "");
        assert_eq!(date_key("not a date"), "");
        assert_eq!(date_key("2024-13-99"), "");
    }

    #[test]
    fn multibyte_input_never_splits_a_char() {
        // Byte 10 lands inside the aleph; must collapse, not panic.
        assert_eq!(date_key("2024-01-0אx"), "");
        assert_eq!(date_key("תאריך לא תקין"), "");
        assert_eq!(date_key("יום שלישי 2024-01-05"), "");
    }

    #[test]
    fn range_membership_is_inclusive() {
        assert!(in_range("2024-01-05", "2024-01-05", "2024-01-05"));
        assert!(in_range("2024-01-05", "2024-01-01", "2024-01-07"));
        assert!(!in_range("2024-01-08", "2024-01-01", "2024-01-07"));
        assert!(!in_range("", "2024-01-01", "2024-01-07"));
    }
}

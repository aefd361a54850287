use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveTime, TimeZone, Utc};

/// Error type for user-entered dates
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateParseError {
    #[error("date must be in MM/DD/YYYY format")]
    Format,
    #[error("month must be between 1 and 12")]
    Month,
    #[error("day must be between 1 and 31")]
    Day,
    #[error("year must be between 2000 and 2100")]
    Year,
    #[error("not a calendar date")]
    Calendar,
}

/// Parse a `MM/DD/YYYY` date typed by the user. The result is noon local
/// time on that day, which keeps the calendar date stable across UTC offsets.
pub fn parse_date_string(input: &str) -> Result<DateTime<Utc>, DateParseError> {
    if input.len() != 10 {
        return Err(DateParseError::Format);
    }
    let parts: Vec<&str> = input.split('/').collect();
    let [month, day, year] = parts.as_slice() else {
        return Err(DateParseError::Format);
    };
    let month: u32 = month.parse().map_err(|_| DateParseError::Format)?;
    let day: u32 = day.parse().map_err(|_| DateParseError::Format)?;
    let year: i32 = year.parse().map_err(|_| DateParseError::Format)?;

    if !(1..=12).contains(&month) {
        return Err(DateParseError::Month);
    }
    if !(1..=31).contains(&day) {
        return Err(DateParseError::Day);
    }
    if !(2000..=2100).contains(&year) {
        return Err(DateParseError::Year);
    }

    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or(DateParseError::Calendar)?;
    Ok(local_noon(date))
}

/// Format a date as `MM/DD/YYYY` in local time.
pub fn format_date(date: DateTime<Utc>) -> String {
    let local = date.with_timezone(&Local);
    format!("{:02}/{:02}/{}", local.month(), local.day(), local.year())
}

/// Noon local time on `date`, as UTC.
pub fn local_noon(date: NaiveDate) -> DateTime<Utc> {
    let noon = date.and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN));
    match Local.from_local_datetime(&noon).earliest() {
        Some(local) => local.with_timezone(&Utc),
        None => Utc.from_utc_datetime(&noon),
    }
}

/// Calendar date of an instant in local time.
pub fn local_date(instant: DateTime<Utc>) -> NaiveDate {
    instant.with_timezone(&Local).date_naive()
}

/// Deserializers that accept full RFC 3339 timestamps as well as bare
/// `YYYY-MM-DD` dates (read as UTC midnight), both of which appear in saved
/// board files.
pub mod lenient_datetime {
    use chrono::{DateTime, NaiveDate, Utc};
    use serde::{Deserialize, Deserializer};

    fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }

    fn raw<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<serde_json::Value>::deserialize(deserializer)?;
        Ok(value.and_then(|v| v.as_str().map(str::to_string)))
    }

    /// Required timestamp. Missing, null or unparsable values become now.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(raw(deserializer)?.as_deref().and_then(parse).unwrap_or_else(Utc::now))
    }

    /// Optional timestamp. Unparsable values are dropped to `None`.
    pub fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(raw(deserializer)?.as_deref().map(str::trim).and_then(parse))
    }
}

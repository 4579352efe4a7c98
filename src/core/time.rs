use time::{format_description::well_known::Rfc3339, OffsetDateTime, PrimitiveDateTime};

pub(crate) fn primitive_now_utc() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_utc();
    PrimitiveDateTime::new(now.date(), now.time())
}

pub(crate) fn format_primitive(value: PrimitiveDateTime) -> String {
    value.assume_utc().format(&Rfc3339).unwrap_or_else(|_| value.assume_utc().to_string())
}

/// Calendar day of a UTC timestamp as `YYYY-MM-DD`.
pub(crate) fn iso_date(value: PrimitiveDateTime) -> String {
    let date = value.date();
    format!("{:04}-{:02}-{:02}", date.year(), u8::from(date.month()), date.day())
}

/// Whole seconds between two instants, rounded down and never negative.
pub(crate) fn elapsed_whole_seconds(from: PrimitiveDateTime, to: PrimitiveDateTime) -> i64 {
    (to - from).whole_seconds().max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{Date, Duration, Time};

    fn at(hour: u8, minute: u8, second: u8) -> PrimitiveDateTime {
        let date = Date::from_calendar_date(2025, time::Month::January, 2).unwrap();
        PrimitiveDateTime::new(date, Time::from_hms(hour, minute, second).unwrap())
    }

    #[test]
    fn format_primitive_outputs_utc_z() {
        assert_eq!(format_primitive(at(10, 20, 30)), "2025-01-02T10:20:30Z");
    }

    #[test]
    fn iso_date_pads_month_and_day() {
        assert_eq!(iso_date(at(23, 59, 59)), "2025-01-02");
    }

    #[test]
    fn elapsed_floors_fractional_seconds() {
        let start = at(10, 0, 0);
        let end = start + Duration::milliseconds(59_999);
        assert_eq!(elapsed_whole_seconds(start, end), 59);
    }

    #[test]
    fn elapsed_is_zero_when_clock_goes_backwards() {
        let start = at(10, 0, 5);
        assert_eq!(elapsed_whole_seconds(start, at(10, 0, 0)), 0);
    }
}

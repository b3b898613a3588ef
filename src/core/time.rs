use time::{format_description::well_known::Rfc3339, OffsetDateTime, PrimitiveDateTime};

pub(crate) fn primitive_now_utc() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_utc();
    PrimitiveDateTime::new(now.date(), now.time())
}

pub(crate) fn format_primitive(value: PrimitiveDateTime) -> String {
    value.assume_utc().format(&Rfc3339).unwrap_or_else(|_| value.assume_utc().to_string())
}

/// Elapsed wall-clock minutes between attempt start and submission,
/// rounded to the nearest whole minute.
pub(crate) fn elapsed_minutes(start: PrimitiveDateTime, end: PrimitiveDateTime) -> i32 {
    let seconds = (end - start).whole_seconds();
    ((seconds as f64) / 60.0).round() as i32
}

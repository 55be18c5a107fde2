use time::UtcDateTime;

/// Milliseconds since the Unix epoch, the unit every persisted
/// timestamp uses.
pub(crate) fn now_ms() -> i64 {
    (UtcDateTime::now().unix_timestamp_nanos() / 1_000_000) as i64
}

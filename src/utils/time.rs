use chrono::{DateTime, Utc};

/// Current wall-clock time in milliseconds since the epoch.
pub fn time_millis() -> i64 {
    let time: DateTime<Utc> = Utc::now();
    time.timestamp_millis()
}

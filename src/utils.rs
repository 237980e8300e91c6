use chrono::{NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::Serializer;

use types::{ApiError, ApiResult};

/// Timestamps are stored without a zone and are UTC by convention.
pub fn serialize_date<S>(date: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let s = Utc
        .from_utc_datetime(date)
        .to_rfc3339_opts(SecondsFormat::Millis, true);
    serializer.serialize_str(&s)
}

pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Logs a failed operation at a level matching who is at fault.
pub fn log_failure(operation: &str, err: &ApiError) {
    if err.is_internal() {
        warn!(operation, error = %err, "operation failed");
    } else {
        debug!(operation, error = %err, "request rejected");
    }
}

/// Hands `result` back unchanged, logging it first when it failed.
pub fn logged<T>(operation: &str, result: ApiResult<T>) -> ApiResult<T> {
    if let Err(ref err) = result {
        log_failure(operation, err);
    }
    result
}

/// Collects everything logged while `f` runs, formatted without ANSI colors.
#[cfg(test)]
pub fn capture_logs<F: FnOnce()>(f: F) -> String {
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing::Level;

    #[derive(Clone)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Buffer {
        fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
            self.0.lock().expect("log buffer").extend_from_slice(bytes);
            Ok(bytes.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    let buffer = Buffer(Arc::new(Mutex::new(Vec::new())));
    let writer = buffer.clone();
    let subscriber = ::tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    ::tracing::subscriber::with_default(subscriber, f);
    let bytes = buffer.0.lock().expect("log buffer").clone();
    String::from_utf8_lossy(&bytes).into_owned()
}

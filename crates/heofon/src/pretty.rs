//! Best-effort pretty printing for logs and artifact bodies.

use serde::Serialize;

/// Pretty JSON for logging
///
/// Never fails: a value that cannot be serialized logs a warning and yields an
/// empty string.
#[must_use]
pub fn plog<T: Serialize + ?Sized>(value: &T) -> String {
    match serde_json::to_string_pretty(value) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!("could not pretty print value: {e}");
            String::new()
        }
    }
}

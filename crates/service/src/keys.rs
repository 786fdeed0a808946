//! Object key generation.
//!
//! Keys look like `{prefix}{millis}-{filename}`. The filename is reduced to
//! its last path component and restricted to `[A-Za-z0-9._-]`.

use std::sync::atomic::{AtomicI64, Ordering};

pub struct KeyGenerator {
    prefix: String,
    last_millis: AtomicI64,
}

impl KeyGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into(), last_millis: AtomicI64::new(0) }
    }

    pub fn next_key(&self, original_name: &str) -> String {
        self.key_at(chrono::Utc::now().timestamp_millis(), original_name)
    }

    /// Key for a given wall-clock reading. Never reuses a millisecond value
    /// already handed out by this generator, even if the clock stalls or
    /// steps backwards.
    pub fn key_at(&self, now_millis: i64, original_name: &str) -> String {
        let millis = self.claim(now_millis);
        format!("{}{}-{}", self.prefix, millis, sanitize_filename(original_name))
    }

    fn claim(&self, now: i64) -> i64 {
        let next = |last: i64| if now > last { now } else { last + 1 };
        match self
            .last_millis
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| Some(next(last)))
        {
            Ok(prev) | Err(prev) => next(prev),
        }
    }
}

/// Strip directories and replace anything outside `[A-Za-z0-9._-]` with `_`.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '_' })
        .collect();
    if cleaned.chars().all(|c| c == '.') {
        "file".to_string()
    } else {
        cleaned
    }
}

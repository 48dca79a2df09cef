//! Stored-name generation.
//!
//! A stored name is `<timestamp>-<uuid>-<sanitized original name>`:
//! - `timestamp`: milliseconds since the Unix epoch, zero-padded to 13 digits
//!   so that lexical order matches upload order
//! - `uuid`: a random v4 UUID in simple (32 hex digit) form, which keeps two
//!   uploads landing in the same millisecond apart
//! - the original name reduced to a single safe path component

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{MAX_FILENAME_LENGTH, MAX_STORED_NAME_BYTES};

/// Bytes taken by `<13-digit timestamp>-<32 hex uuid>-`.
const PREFIX_BYTES: usize = 13 + 1 + 32 + 1;

/// Byte budget left for the sanitized name inside a stored name.
const NAME_BUDGET_BYTES: usize = MAX_STORED_NAME_BYTES - PREFIX_BYTES;

/// Name used when nothing survives sanitizing.
const FALLBACK_NAME: &str = "file";

/// Characters that are reserved on at least one common filesystem.
const RESERVED: &[char] = &['<', '>', ':', '"', '|', '?', '*'];

/// Reduce a client-supplied file name to a single safe path component.
///
/// Only the final component is kept (both `/` and `\` count as separators),
/// control characters are dropped, reserved characters become `_`, and
/// leading dots are trimmed so the result can never be `.`, `..` or hidden.
/// The result is at most [`MAX_FILENAME_LENGTH`] characters and never longer
/// than the bytes a stored name has left after its prefix.
pub fn sanitize_filename(original: &str) -> String {
    let last = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original);

    let cleaned: String = last
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| if RESERVED.contains(&c) { '_' } else { c })
        .collect();

    let trimmed = cleaned.trim().trim_start_matches('.').trim_start();
    let truncated = truncate_to_budget(trimmed).trim_end();

    if truncated.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        truncated.to_string()
    }
}

/// Longest prefix of `name` within both the character and the byte limit,
/// cut on a char boundary.
fn truncate_to_budget(name: &str) -> &str {
    let end = name
        .char_indices()
        .take(MAX_FILENAME_LENGTH)
        .map(|(i, c)| i + c.len_utf8())
        .take_while(|&end| end <= NAME_BUDGET_BYTES)
        .last()
        .unwrap_or(0);
    &name[..end]
}

/// Generate a fresh stored name for `original` at time `at`.
pub fn generate_stored_name_at(original: &str, at: DateTime<Utc>) -> String {
    let millis = at.timestamp_millis().max(0);
    let id = Uuid::new_v4().simple();
    format!("{millis:013}-{id}-{}", sanitize_filename(original))
}

/// Generate a fresh stored name for `original` using the current time.
pub fn generate_stored_name(original: &str) -> String {
    generate_stored_name_at(original, Utc::now())
}

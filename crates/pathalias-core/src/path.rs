//! Path helpers for internal system paths.
//!
//! System paths are slash-separated strings without a leading slash, e.g.
//! `node/42` or `user/7/edit`. The first segment is the substring up to the
//! first `/` and is the key the whitelist cache is built from.

/// Returns the first segment of a system path.
///
/// For a path without any `/` the whole path is its own first segment.
///
/// ```
/// use pathalias_core::first_segment;
///
/// assert_eq!(first_segment("node/42"), "node");
/// assert_eq!(first_segment("frontpage"), "frontpage");
/// ```
pub fn first_segment(path: &str) -> &str {
    match path.find('/') {
        Some(idx) => &path[..idx],
        None => path,
    }
}

//! Filename namespacing for broker-managed test-data files.
//!
//! Every team's files are prefixed with a canonical identifier derived from
//! the source-control repository name, so test authors never have to type
//! the prefix (or its casing) correctly themselves.

use tracing::{debug, info, warn};

/// Derives the canonical prefix from a repository identity: a trailing
/// `.git` suffix and a leading `jm_` marker are stripped (any casing), the
/// remainder is uppercased.
#[must_use]
pub fn repo_prefix(repo_name: &str) -> String {
    let mut name = repo_name.trim();
    if let Some(stripped) = strip_suffix_ignore_ascii_case(name, ".git") {
        name = stripped;
    }
    if let Some(stripped) = strip_prefix_ignore_ascii_case(name, "jm_") {
        name = stripped;
    }
    name.to_ascii_uppercase()
}

/// Rewrites `filename` to carry the repository prefix exactly once.
///
/// A filename already starting with the prefix in any casing has that span's
/// casing corrected; otherwise the prefix is prepended with an underscore.
/// Without a repository identity the filename passes through unchanged.
#[must_use]
pub fn normalize(filename: &str, repo_name: Option<&str>) -> String {
    let Some(repo_name) = repo_name else {
        warn!("Repository name not configured; filename '{filename}' left as-is");
        return filename.to_owned();
    };
    let prefix = repo_prefix(repo_name);
    if prefix.is_empty() {
        warn!("Repository name '{repo_name}' yields an empty prefix; filename left as-is");
        return filename.to_owned();
    }
    debug!("Repository prefix for filenames: {prefix}");

    let marker = format!("{prefix}_");
    if let Some((head, rest)) = filename.split_at_checked(marker.len())
        && head.eq_ignore_ascii_case(&marker)
    {
        let corrected = format!("{prefix}_{rest}");
        if corrected != filename {
            info!("Corrected filename case: {filename} -> {corrected}");
        }
        return corrected;
    }

    let prefixed = format!("{prefix}_{filename}");
    info!("Added repository prefix to filename: {filename} -> {prefixed}");
    prefixed
}

fn strip_suffix_ignore_ascii_case<'a>(s: &'a str, suffix: &str) -> Option<&'a str> {
    let split = s.len().checked_sub(suffix.len())?;
    let head = s.get(..split)?;
    let tail = s.get(split..)?;
    tail.eq_ignore_ascii_case(suffix).then_some(head)
}

fn strip_prefix_ignore_ascii_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let (head, tail) = s.split_at_checked(prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then_some(tail)
}

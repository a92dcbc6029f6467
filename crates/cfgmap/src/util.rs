use crate::error::Error;

/// Split a dotted path into its segments
///
/// The empty path and empty segments (`a..b`, `.a`, `a.`) are rejected.
pub(crate) fn split_path(path: &str) -> Result<Vec<&str>, Error> {
    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(Error::InvalidPath(path.to_string()));
    }

    Ok(segments)
}

/// `base.path`, or just `path` for the root
pub(crate) fn join_path(base: &str, path: &str) -> String {
    match (base.is_empty(), path.is_empty()) {
        (true, _) => path.to_string(),
        (_, true) => base.to_string(),
        _ => format!("{base}.{path}"),
    }
}

//! Final-name derivation and staging path resolution for transfers.

use std::path::{Path, PathBuf};

use url::Url;

use super::constants::STAGING_SUFFIX;
use super::error::FetchError;

/// Derives the final file name from the last `/`-delimited segment of a URL path.
///
/// The segment is returned verbatim (still percent-encoded), so it can never
/// smuggle a path separator. Query and fragment are ignored.
///
/// # Errors
///
/// Returns [`FetchError::InvalidUrl`] if `source` does not parse as an absolute
/// URL, and [`FetchError::EmptyFileName`] if the path is empty or ends in `/`.
///
/// # Examples
///
/// ```
/// use grabber_core::fetch::derive_final_name;
///
/// let name = derive_final_name("https://example.com/a/b/pic.jpg").unwrap();
/// assert_eq!(name, "pic.jpg");
/// ```
pub fn derive_final_name(source: &str) -> Result<String, FetchError> {
    let url = Url::parse(source).map_err(|_| FetchError::invalid_url(source))?;
    final_name_from_url(&url)
}

/// Same as [`derive_final_name`] for an already parsed URL.
///
/// # Errors
///
/// Returns [`FetchError::EmptyFileName`] if the path has no final segment.
pub fn final_name_from_url(url: &Url) -> Result<String, FetchError> {
    let last = url
        .path()
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty());
    match last {
        Some(segment) => Ok(segment.to_string()),
        None => Err(FetchError::empty_file_name(url.as_str())),
    }
}

/// Returns `dir/final_name.tmp`.
#[must_use]
pub fn staging_path(dir: &Path, final_name: &str) -> PathBuf {
    dir.join(format!("{final_name}{STAGING_SUFFIX}"))
}

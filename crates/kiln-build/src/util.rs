//! String and path helpers shared by build tooling.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::{Error, Result};

/// Extract the path prefix of a URL.
///
/// With `with_slash` the result carries leading and trailing slashes; a URL
/// with no path yields `"/"`. Without it, the bare path is returned.
pub fn path_from_url(target: &str, with_slash: bool) -> String {
    let path = Url::parse(target)
        .map(|url| url.path().to_string())
        .unwrap_or_else(|_| {
            // Not an absolute URL; everything before the query is the path.
            let end = target.find(['?', '#']).unwrap_or(target.len());
            target[..end].to_string()
        });
    let trimmed = path.strip_prefix('/').unwrap_or(&path);
    let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
    if with_slash {
        if trimmed.is_empty() {
            "/".to_string()
        } else {
            format!("/{trimmed}/")
        }
    } else {
        trimmed.to_string()
    }
}

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

/// Whether the extension names an image format worth optimizing.
///
/// svg is excluded: it may actually be a font file, and gains little from
/// image optimization anyway.
pub fn is_image(extension: &str) -> bool {
    IMAGE_EXTENSIONS.contains(&extension)
}

static SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.\w+$").expect("valid suffix pattern"));

/// Drop a trailing `.<ext>` from a file path.
pub fn remove_suffix(file_path: &str) -> String {
    SUFFIX.replace(file_path, "").into_owned()
}

/// Regex text matching `*.spec.<ext>` file names.
pub fn make_test_regexp(extensions: &[&str]) -> String {
    let alternatives = extensions
        .iter()
        .map(|ext| regex::escape(ext))
        .collect::<Vec<_>>()
        .join("|");
    format!(r"\.spec\.({alternatives})$")
}

/// Glob for test files under the build root.
pub fn make_test_glob(src_dir: &str, extensions: &[&str]) -> Result<String> {
    match extensions {
        [] => Err(Error::Config("at least one extension required".to_string())),
        [extension] => Ok(format!("{src_dir}/**/*.spec.{extension}")),
        _ => Ok(format!("{src_dir}/**/*.spec.@({})", extensions.join("|"))),
    }
}

/// Glob for snapshot files under the build root.
pub fn make_snapshot_glob(src_dir: &str) -> String {
    format!("{src_dir}/**/*.snap")
}

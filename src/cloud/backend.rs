use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

/// Capability interface every storage integration provides.
///
/// A `destination_key` is either relative to the backend's bucket
/// (`dag/run/file.json`) or a full URI (`s3://bucket/dag/run/file.json`);
/// backends reduce full URIs to their path component with [`object_key`].
#[cfg_attr(test, mockall::automock)]
pub trait StorageBackend {
    /// Upload one local file, returning the number of bytes written.
    ///
    /// With `overwrite == false` an existing object at the key is an error.
    fn upload_file(&self, local_path: &Path, destination_key: &str, overwrite: bool) -> Result<u64>;

    /// Whether an object or a non-empty prefix exists at `path`.
    fn object_exists(&self, path: &str) -> Result<bool>;

    /// Create the directory at `path` and its parents.
    fn ensure_directory(&self, path: &str) -> Result<()>;
}

impl<T: StorageBackend + ?Sized> StorageBackend for Box<T> {
    fn upload_file(&self, local_path: &Path, destination_key: &str, overwrite: bool) -> Result<u64> {
        (**self).upload_file(local_path, destination_key, overwrite)
    }

    fn object_exists(&self, path: &str) -> Result<bool> {
        (**self).object_exists(path)
    }

    fn ensure_directory(&self, path: &str) -> Result<()> {
        (**self).ensure_directory(path)
    }
}

impl<T: StorageBackend + ?Sized> StorageBackend for Arc<T> {
    fn upload_file(&self, local_path: &Path, destination_key: &str, overwrite: bool) -> Result<u64> {
        (**self).upload_file(local_path, destination_key, overwrite)
    }

    fn object_exists(&self, path: &str) -> Result<bool> {
        (**self).object_exists(path)
    }

    fn ensure_directory(&self, path: &str) -> Result<()> {
        (**self).ensure_directory(path)
    }
}

/// Opens backends for connection ids.
///
/// `location` is the URI the backend will serve, e.g. `s3://bucket` or
/// `gs://bucket/prefix`. Credentials and client setup stay behind this seam.
pub trait Connector {
    fn connect(&self, conn_id: &str, location: &str) -> Result<Box<dyn StorageBackend>>;
}

/// Components of a `scheme://authority/path` location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location<'a> {
    pub scheme: &'a str,
    pub authority: &'a str,
    pub path: &'a str,
}

/// Split a location into scheme, authority and path.
///
/// Returns `None` for plain paths without a `scheme://` prefix.
pub fn parse_location(location: &str) -> Option<Location<'_>> {
    let (scheme, rest) = location.split_once("://")?;

    let mut chars = scheme.chars();
    let valid_scheme = chars.next().map_or(false, |c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.');
    if !valid_scheme {
        return None;
    }

    let (authority, path) = match rest.find('/') {
        Some(slash_pos) => (&rest[..slash_pos], &rest[slash_pos + 1..]),
        None => (rest, ""),
    };

    Some(Location { scheme, authority, path })
}

/// URI scheme of a location, lowercased, if it has one.
pub fn uri_scheme(location: &str) -> Option<String> {
    parse_location(location).map(|l| l.scheme.to_ascii_lowercase())
}

/// Bucket-relative object key for a destination key or full URI.
pub fn object_key(key: &str) -> &str {
    match parse_location(key) {
        Some(location) => location.path.trim_matches('/'),
        None => key.trim_matches('/'),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_location() {
        let location = parse_location("s3://bucket/dag/run/file.json").unwrap();
        assert_eq!(location.scheme, "s3");
        assert_eq!(location.authority, "bucket");
        assert_eq!(location.path, "dag/run/file.json");

        let location = parse_location("gs://bucket").unwrap();
        assert_eq!(location.authority, "bucket");
        assert_eq!(location.path, "");

        let location = parse_location("file:///tmp/out").unwrap();
        assert_eq!(location.scheme, "file");
        assert_eq!(location.authority, "");
        assert_eq!(location.path, "tmp/out");
    }

    #[test]
    fn test_parse_location_rejects_plain_paths() {
        assert!(parse_location("/tmp/out").is_none());
        assert!(parse_location("relative/path").is_none());
        assert!(parse_location("://bucket").is_none());
        assert!(parse_location("1s3://bucket").is_none());
    }

    #[test]
    fn test_uri_scheme_is_lowercased() {
        assert_eq!(uri_scheme("S3://bucket").as_deref(), Some("s3"));
        assert_eq!(uri_scheme("/no/scheme"), None);
    }

    #[test]
    fn test_object_key() {
        assert_eq!(object_key("s3://bucket/d1/r1/file.json"), "d1/r1/file.json");
        assert_eq!(object_key("abfs://container@account.dfs.core.windows.net/a/b"), "a/b");
        assert_eq!(object_key("/d1/r1/file.json"), "d1/r1/file.json");
        assert_eq!(object_key("d1/r1/"), "d1/r1");
    }
}

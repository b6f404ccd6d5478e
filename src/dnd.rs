//! Turning a dropped file into a customization request.

use crate::scope::Scope;
use std::path::PathBuf;
use url::Url;

/// What the user decided to do with a dropped image.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum DropAction {
    /// Use the image as the current icon at `scope`.
    Apply { path: PathBuf, scope: Scope },
    /// Remove every customization of the current icon.
    Clear,
    /// Leave everything as it is.
    Cancel,
}

/// Extract the file dropped last from a `text/uri-list` payload.
///
/// Comment lines and non-`file:` URIs are ignored.
///
/// ```
/// use themed_icon::parse_uri_list;
///
/// let payload = "file:///tmp/first.png\r\nfile:///tmp/my%20icon.svg\r\n";
///
/// assert_eq!(
///     parse_uri_list(payload),
///     Some(std::path::PathBuf::from("/tmp/my icon.svg"))
/// );
/// ```
pub fn parse_uri_list(payload: &str) -> Option<PathBuf> {
    payload
        .lines()
        .rev()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| Url::parse(line).ok())
        .filter(|url| url.scheme() == "file")
        .find_map(|url| url.to_file_path().ok())
}

#[cfg(test)]
mod test {
    use crate::dnd::parse_uri_list;
    use std::path::PathBuf;

    #[test]
    fn test_last_file_uri_wins() {
        let payload = "# dragged from a file manager\nfile:///home/me/a.png\nfile:///home/me/b.png\n";

        assert_eq!(parse_uri_list(payload), Some(PathBuf::from("/home/me/b.png")));
    }

    #[test]
    fn test_non_file_uris_are_ignored() {
        let payload = "file:///home/me/a.png\nhttps://example.org/b.png\n";

        assert_eq!(parse_uri_list(payload), Some(PathBuf::from("/home/me/a.png")));
        assert_eq!(parse_uri_list("https://example.org/b.png"), None);
        assert_eq!(parse_uri_list(""), None);
        assert_eq!(parse_uri_list("not a uri"), None);
    }
}

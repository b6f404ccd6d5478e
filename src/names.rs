use std::borrow::Cow;

/// Characters that may not appear in a theme icon name.
const SEPARATORS: [char; 1] = ['/'];

/// Turn icon names into single-segment theme identifiers.
///
/// Every path separator is replaced by a hyphen. If no name needed changing the names are
/// returned as they are along with `None`; otherwise the second element holds the untouched
/// originals, which stay useful for loading the names as literal file paths.
///
/// ```
/// use themed_icon::normalize_names;
///
/// let names = vec!["clock".to_owned(), "/usr/share/pixmaps/clock.png".to_owned()];
/// let (normalized, originals) = normalize_names(&names);
///
/// assert_eq!(normalized[1], "-usr-share-pixmaps-clock.png");
/// assert_eq!(originals, Some(names));
/// ```
pub fn normalize_names<S: AsRef<str>>(names: &[S]) -> (Vec<String>, Option<Vec<String>>) {
    let originals: Vec<String> = names.iter().map(|name| name.as_ref().to_owned()).collect();

    if !originals.iter().any(|name| name.contains(SEPARATORS)) {
        return (originals, None);
    }

    let normalized = originals
        .iter()
        .map(|name| flatten_name(name).into_owned())
        .collect();

    (normalized, Some(originals))
}

/// Replace every path separator in `name` with a hyphen, so it stays a single path segment.
pub fn flatten_name(name: &str) -> Cow<'_, str> {
    if name.contains(SEPARATORS) {
        Cow::Owned(name.replace(SEPARATORS, "-"))
    } else {
        Cow::Borrowed(name)
    }
}

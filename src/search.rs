use crate::icon::{FileType, IconFile};
use crate::theme::{Theme, ThemeInfo, ThemeParseError};
use std::collections::{HashMap, VecDeque};
use std::ffi::{OsStr, OsString};
use std::path::PathBuf;

/// The theme every other theme implicitly falls back to.
pub const HICOLOR: &str = "hicolor";

/// The ordered list of directories icons and icon themes are looked for in.
///
/// By default, that is `$HOME/.icons`, `$XDG_DATA_HOME/icons`, `$XDG_DATA_DIRS/icons` and
/// `/usr/share/pixmaps`. More directories can be appended at runtime, e.g. an applet's own
/// icon directories.
///
/// # Example
///
/// ```
/// use themed_icon::SearchPath;
///
/// let mut search = SearchPath::new_empty();
/// search.append("/usr/share/avant-window-navigator/applets/clock/icons");
///
/// let locations = search.scan();
/// assert!(locations.themes_directories.is_empty());
/// ```
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SearchPath {
    /// The list of directories to search for standalone icons and icon themes
    pub dirs: Vec<PathBuf>,
}

impl SearchPath {
    /// Constructs a new `SearchPath` from the default directories.
    pub fn new() -> Self {
        <Self as Default>::default()
    }

    /// Constructs a new `SearchPath` without any directories to search.
    pub const fn new_empty() -> Self {
        Self::new_from(Vec::new())
    }

    /// Constructs a new `SearchPath` from a list of directories to search.
    pub const fn new_from(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }

    /// Appends a directory to the end of the search path.
    ///
    /// Returns `false`, leaving the path untouched, if the directory is already listed.
    pub fn append(&mut self, dir: impl Into<PathBuf>) -> bool {
        let dir = dir.into();
        if self.dirs.contains(&dir) {
            return false;
        }

        self.dirs.push(dir);
        true
    }

    /// Read every search directory, collecting standalone icons and theme candidates.
    pub fn scan(&self) -> IconLocations {
        // "Each theme is stored as subdirectories of the base directories"
        let (dirs, files) = self
            .dirs
            .iter()
            .flat_map(|base_dir| base_dir.read_dir())
            .flatten()
            .flatten()
            .filter_map(|entry| Some((entry.file_type().ok()?, entry)))
            .partition::<Vec<_>, _>(|(ft, entry)| {
                ft.is_dir() || (entry.path().extension().is_none() && ft.is_symlink())
            });

        // icons at the top-level in a base_dir don't belong to a theme, but must still be found
        let mut standalone_icons: HashMap<String, Vec<IconFile>> = HashMap::new();
        for file in files
            .into_iter()
            .filter_map(|(_, entry)| IconFile::from_path(&entry.path()))
        {
            standalone_icons
                .entry(file.icon_name().to_owned())
                .or_default()
                .push(file);
        }

        // For each theme name, list the directories where it may be found, in search order
        let mut themes_directories: HashMap<OsString, Vec<PathBuf>> = HashMap::new();
        for (_, dir) in dirs {
            themes_directories
                .entry(dir.file_name())
                .or_default()
                .push(dir.path());
        }

        IconLocations {
            standalone_icons,
            themes_directories,
        }
    }
}

impl Default for SearchPath {
    fn default() -> Self {
        // "By default, apps should look in $HOME/.icons (for backwards compatibility),
        // in $XDG_DATA_DIRS/icons
        // and in /usr/share/pixmaps (in that order)."
        let xdg = xdg::BaseDirectories::new();

        let mut directories = vec![];

        if let Some(home) = std::env::home_dir() {
            directories.push(home.join(".icons"));
        }

        xdg.data_home
            .into_iter()
            .chain(xdg.data_dirs)
            .map(|data_dir| data_dir.join("icons"))
            .for_each(|dir| directories.push(dir));

        directories.push("/usr/share/pixmaps".into());

        Self::new_from(directories)
    }
}

/// Anything that turns into an iterator of things that can become paths can be turned into a [`SearchPath`].
impl<I, P> From<I> for SearchPath
where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
{
    fn from(value: I) -> Self {
        SearchPath::new_from(value.into_iter().map(Into::into).collect())
    }
}

/// What a [`SearchPath::scan`] found.
#[derive(Debug, Default)]
pub struct IconLocations {
    /// Icons at the root of a search directory, keyed by icon name.
    pub standalone_icons: HashMap<String, Vec<IconFile>>,
    /// Theme candidates: internal theme name to every directory holding part of it.
    pub themes_directories: HashMap<OsString, Vec<PathBuf>>,
}

impl IconLocations {
    /// Parse a single theme, without its parents.
    pub fn load_single_theme<S>(&self, internal_name: S) -> std::io::Result<ThemeInfo>
    where
        S: AsRef<OsStr>,
    {
        let internal_name = internal_name.as_ref();

        let folders = self
            .themes_directories
            .get(internal_name)
            .ok_or_else(|| std::io::Error::other(ThemeParseError::NotAnIconTheme))?;

        ThemeInfo::new_from_folders(internal_name.to_string_lossy().into_owned(), folders.clone())
    }

    /// Resolve a theme and its full inheritance tree.
    ///
    /// Parents are visited breadth-first and each theme appears once. With
    /// `fall_back_to_hicolor`, [`HICOLOR`] is moved to (or added at) the very end of the chain;
    /// without it, only explicitly inherited themes are used.
    ///
    /// Returns `None` if `internal_name` is not a valid theme. Invalid parents are skipped.
    pub fn resolve_theme(&self, internal_name: &str, fall_back_to_hicolor: bool) -> Option<Theme> {
        let info = match self.load_single_theme(internal_name) {
            Ok(info) => info,
            Err(_e) => {
                #[cfg(feature = "log")]
                log::debug!("icon theme {internal_name:?} is unavailable: {_e}");

                return None;
            }
        };

        let mut visited = vec![internal_name.to_owned()];
        let mut pending: VecDeque<String> = info.index.inherits.iter().cloned().collect();
        let mut inherits_from = Vec::new();

        while let Some(parent) = pending.pop_front() {
            if visited.contains(&parent) || (fall_back_to_hicolor && parent == HICOLOR) {
                continue;
            }
            visited.push(parent.clone());

            match self.load_single_theme(&parent) {
                Ok(parent) => {
                    pending.extend(parent.index.inherits.iter().cloned());
                    inherits_from.push(parent);
                }
                Err(_e) => {
                    #[cfg(feature = "log")]
                    log::debug!("skipping parent theme {parent:?} of {internal_name:?}: {_e}");
                }
            }
        }

        if fall_back_to_hicolor
            && internal_name != HICOLOR
            && let Ok(hicolor) = self.load_single_theme(HICOLOR)
        {
            inherits_from.push(hicolor);
        }

        Some(Theme {
            info,
            inherits_from,
        })
    }

    /// Look up a standalone icon by name, preferring vector files.
    pub fn standalone_icon(&self, icon_name: &str) -> Option<&IconFile> {
        let candidates = self.standalone_icons.get(icon_name)?;

        FileType::types()
            .iter()
            .find_map(|ty| candidates.iter().find(|file| file.file_type == *ty))
    }
}

#[cfg(test)]
mod test {
    use crate::fixtures;
    use crate::icon::FileType;
    use crate::search::{HICOLOR, SearchPath};
    use std::path::PathBuf;

    fn two_root_search() -> (tempfile::TempDir, SearchPath) {
        let root = tempfile::tempdir().unwrap();
        let first = root.path().join("first");
        let second = root.path().join("second");

        fixtures::write_theme(
            &first,
            "Faenza",
            &fixtures::fixed_index("Faenza", &["Elementary"], 48),
        );
        fixtures::write_theme(
            &second,
            "Faenza",
            &fixtures::fixed_index("Faenza duplicate", &[], 48),
        );
        fixtures::write_theme(
            &second,
            "Elementary",
            &fixtures::fixed_index("Elementary", &["Faenza", HICOLOR], 48),
        );
        fixtures::write_theme(&second, HICOLOR, &fixtures::fixed_index("Hicolor", &[], 48));
        fixtures::write_theme(&second, "Plain", &fixtures::fixed_index("Plain", &[], 48));
        fixtures::write_png(&second.join("loose.png"), 8, 8, [0, 0, 0, 255]);
        fixtures::write_svg(&second.join("loose.svg"), [0, 0, 0]);
        std::fs::write(second.join("notes.txt"), "not an icon").unwrap();

        let search = SearchPath::new_from(vec![first, second]);
        (root, search)
    }

    #[test]
    fn test_append_skips_duplicates() {
        let mut search = SearchPath::new_empty();

        assert!(search.append("/opt/icons"));
        assert!(!search.append(PathBuf::from("/opt/icons")));
        assert_eq!(search.dirs, vec![PathBuf::from("/opt/icons")]);
    }

    #[test]
    fn test_scan_finds_themes_and_standalone_icons() {
        let (_root, search) = two_root_search();
        let locations = search.scan();

        assert_eq!(locations.themes_directories.len(), 4);
        assert_eq!(locations.themes_directories[std::ffi::OsStr::new("Faenza")].len(), 2);

        let loose = locations.standalone_icon("loose").unwrap();
        assert_eq!(loose.file_type, FileType::Svg, "vector icons are preferred");
        assert!(locations.standalone_icon("notes").is_none());
    }

    #[test]
    fn test_first_index_wins() {
        let (_root, search) = two_root_search();
        let theme = search.scan().load_single_theme("Faenza").unwrap();

        assert_eq!(theme.index.name, "Faenza");
        assert_eq!(theme.base_dirs.len(), 2);
    }

    #[test]
    fn test_resolve_inheritance_chain() {
        let (_root, search) = two_root_search();
        let locations = search.scan();

        let theme = locations.resolve_theme("Faenza", true).unwrap();
        let chain: Vec<_> = theme
            .inherits_from
            .iter()
            .map(|info| info.internal_name.as_str())
            .collect();
        assert_eq!(chain, vec!["Elementary", HICOLOR]);

        // explicit parents are kept either way, only the implicit fallback is optional
        let isolated = locations.resolve_theme("Faenza", false).unwrap();
        assert_eq!(isolated.inherits_from.len(), 2);

        let plain = locations.resolve_theme("Plain", true).unwrap();
        assert_eq!(plain.inherits_from[0].internal_name, HICOLOR);
        let plain = locations.resolve_theme("Plain", false).unwrap();
        assert!(plain.inherits_from.is_empty());

        let hicolor = locations.resolve_theme(HICOLOR, true).unwrap();
        assert!(hicolor.inherits_from.is_empty());

        assert!(locations.resolve_theme("Nonexistent", true).is_none());
    }
}

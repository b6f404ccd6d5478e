use crate::search::{HICOLOR, SearchPath};
use std::path::{Path, PathBuf};

/// Internal name of the theme customizations are stored in.
pub const CUSTOM_THEME_NAME: &str = "awn-theme";

/// Size icons are displayed at until told otherwise.
pub const DEFAULT_SIZE: u32 = 48;

/// Freedesktop name of the icon shown when an icon can't be found.
pub const MISSING_ICON_NAME: &str = "image-missing";

/// Where a [`ThemedIcon`](crate::ThemedIcon) finds and stores things.
///
/// The `Default` implementation follows the usual desktop locations; every field can be
/// changed with a `with_*` method.
///
/// ```
/// use themed_icon::Config;
///
/// let config = Config::default()
///     .with_icon_dir("/tmp/icons")
///     .with_default_size(32);
///
/// assert_eq!(config.custom_theme_dir(), std::path::Path::new("/tmp/icons/awn-theme"));
/// ```
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Config {
    /// User icon directory the custom theme lives in. `$HOME/.icons` by default.
    pub icon_dir: PathBuf,
    /// Package data directory, holding the `index.theme` template of the custom theme and
    /// per-applet `applets/<name>/icons` and `applets/<name>/themes` directories.
    pub data_dir: PathBuf,
    /// Directories override themes are searched for in.
    pub search_dirs: Vec<PathBuf>,
    /// Directories tried for icon names given as file names.
    pub pixmap_dirs: Vec<PathBuf>,
    /// Internal name of the host icon theme.
    pub system_theme: String,
    pub default_size: u32,
    pub missing_icon_name: String,
}

impl Config {
    pub fn with_icon_dir(mut self, icon_dir: impl Into<PathBuf>) -> Self {
        self.icon_dir = icon_dir.into();
        self
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn with_search_dirs<I, P>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.search_dirs = dirs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_pixmap_dirs<I, P>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.pixmap_dirs = dirs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_system_theme(mut self, theme_name: impl Into<String>) -> Self {
        self.system_theme = theme_name.into();
        self
    }

    pub fn with_default_size(mut self, size: u32) -> Self {
        self.default_size = size;
        self
    }

    pub fn with_missing_icon_name(mut self, icon_name: impl Into<String>) -> Self {
        self.missing_icon_name = icon_name.into();
        self
    }

    /// `{icon_dir}/awn-theme`
    pub fn custom_theme_dir(&self) -> PathBuf {
        self.icon_dir.join(CUSTOM_THEME_NAME)
    }

    /// The packaged `index.theme` copied into a fresh custom theme.
    pub fn index_template(&self) -> PathBuf {
        self.data_dir.join("index.theme")
    }

    /// The directories an applet ships its own icons and icon themes in.
    pub fn applet_dirs(&self, applet_name: &str) -> [PathBuf; 2] {
        let applet_dir = self.data_dir.join("applets").join(applet_name);
        [applet_dir.join("icons"), applet_dir.join("themes")]
    }

    pub fn search_path(&self) -> SearchPath {
        SearchPath::new_from(self.search_dirs.clone())
    }
}

impl Default for Config {
    fn default() -> Self {
        let icon_dir = std::env::home_dir()
            .map(|home| home.join(".icons"))
            .unwrap_or_else(|| Path::new(".icons").to_owned());

        Self {
            icon_dir,
            data_dir: "/usr/share/avant-window-navigator".into(),
            search_dirs: SearchPath::default().dirs,
            pixmap_dirs: vec![
                "/usr/share/pixmaps".into(),
                "/usr/local/share/pixmaps".into(),
            ],
            system_theme: HICOLOR.into(),
            default_size: DEFAULT_SIZE,
            missing_icon_name: MISSING_ICON_NAME.into(),
        }
    }
}

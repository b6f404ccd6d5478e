use crate::bitmap::Bitmap;
use crate::icon::IconFile;
use crate::search::{IconLocations, SearchPath};
use crate::theme::Theme;
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

/// Something icons can be looked up in by name and size.
///
/// This is the only way the resolution cascade talks to icon themes, so a host may plug in its
/// toolkit's theme machinery, or tests an in-memory map.
pub trait ThemeSource {
    /// Load the icon called `icon_name` for display at `size`, preferring vector artwork.
    ///
    /// A miss is `None`; it is an expected outcome, not an error.
    fn load_icon(&self, icon_name: &str, size: u32) -> Option<Bitmap>;

    /// Add a directory to look for icons and themes in. Sources that can't be extended ignore this.
    fn append_search_path(&self, _dir: &Path) {}

    /// Forget anything learned about the files on disk, so that new or removed icons are seen.
    fn rescan(&self) {}
}

/// A freedesktop icon theme read straight from disk.
///
/// The theme is located and parsed on first use and kept until [`rescan`](ThemeSource::rescan)
/// or a search path change. Icon files themselves are looked up on every load.
pub struct IconTheme {
    theme_name: String,
    fall_back_to_hicolor: bool,
    search: RefCell<SearchPath>,
    resolved: RefCell<Option<Rc<Resolved>>>,
}

struct Resolved {
    theme: Option<Theme>,
    locations: IconLocations,
}

impl IconTheme {
    /// A theme that falls back to its parents and finally `hicolor`, like any desktop theme.
    pub fn new(theme_name: impl Into<String>, search: SearchPath) -> Self {
        Self {
            theme_name: theme_name.into(),
            fall_back_to_hicolor: true,
            search: RefCell::new(search),
            resolved: RefCell::new(None),
        }
    }

    /// A theme that only ever serves its own icons (and those of themes it explicitly inherits).
    pub fn isolated(theme_name: impl Into<String>, search: SearchPath) -> Self {
        Self {
            fall_back_to_hicolor: false,
            ..Self::new(theme_name, search)
        }
    }

    pub fn theme_name(&self) -> &str {
        &self.theme_name
    }

    /// A copy of the directories this theme is searched for in.
    pub fn search_path(&self) -> SearchPath {
        self.search.borrow().clone()
    }

    /// Find the file that would be loaded for `icon_name` at `size`.
    ///
    /// Icons in the theme (or its parents) win over standalone icons in the search directories.
    pub fn find_icon(&self, icon_name: &str, size: u32) -> Option<IconFile> {
        if icon_name.is_empty() {
            return None;
        }

        let resolved = self.resolved();
        resolved
            .theme
            .as_ref()
            .and_then(|theme| theme.find_icon(icon_name, size))
            .or_else(|| resolved.locations.standalone_icon(icon_name).cloned())
    }

    fn resolved(&self) -> Rc<Resolved> {
        if let Some(resolved) = self.resolved.borrow().as_ref() {
            return Rc::clone(resolved);
        }

        let locations = self.search.borrow().scan();
        let theme = locations.resolve_theme(&self.theme_name, self.fall_back_to_hicolor);
        let resolved = Rc::new(Resolved { theme, locations });

        *self.resolved.borrow_mut() = Some(Rc::clone(&resolved));
        resolved
    }
}

impl ThemeSource for IconTheme {
    fn load_icon(&self, icon_name: &str, size: u32) -> Option<Bitmap> {
        let file = self.find_icon(icon_name, size)?;

        match file.load(size) {
            Ok(bitmap) => Some(bitmap),
            Err(_e) => {
                #[cfg(feature = "log")]
                log::debug!("unable to load icon {:?}: {_e}", file.path);

                None
            }
        }
    }

    fn append_search_path(&self, dir: &Path) {
        if self.search.borrow_mut().append(dir) {
            self.rescan();
        }
    }

    fn rescan(&self) {
        self.resolved.borrow_mut().take();
    }
}

/// The three themes an icon is looked up in.
pub struct ThemeSet {
    /// The custom theme holding user customizations. Owned.
    pub custom: Box<dyn ThemeSource>,
    /// A user-chosen theme replacing the host theme for this icon. Owned, optional.
    pub override_theme: Option<Box<dyn ThemeSource>>,
    /// The host's icon theme. Shared with every other icon and never modified except for
    /// search path registration.
    pub system: Rc<dyn ThemeSource>,
}

impl ThemeSet {
    pub fn new(custom: Box<dyn ThemeSource>, system: Rc<dyn ThemeSource>) -> Self {
        Self {
            custom,
            override_theme: None,
            system,
        }
    }

    /// Rescan every owned theme. The shared host theme is left to its owner.
    pub fn rescan(&self) {
        self.custom.rescan();
        if let Some(override_theme) = &self.override_theme {
            override_theme.rescan();
        }
    }
}

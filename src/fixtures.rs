//! Helpers for building icon themes and theme sources in tests.

use crate::bitmap::Bitmap;
use crate::source::{ThemeSet, ThemeSource};
use image::{Rgba, RgbaImage};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// A theme source backed by a map, remembering what was asked of it.
#[derive(Default)]
pub struct MemoryTheme {
    icons: HashMap<String, Bitmap>,
    pub search_paths: RefCell<Vec<PathBuf>>,
    pub rescans: Cell<usize>,
}

impl MemoryTheme {
    pub fn with(mut self, icon_name: &str, width: u32, height: u32, rgba: [u8; 4]) -> Self {
        self.icons.insert(
            icon_name.to_owned(),
            RgbaImage::from_pixel(width, height, Rgba(rgba)),
        );
        self
    }

    /// A theme set where nothing can be found.
    pub fn set() -> ThemeSet {
        ThemeSet::new(Box::new(MemoryTheme::default()), Rc::new(MemoryTheme::default()))
    }
}

impl ThemeSource for MemoryTheme {
    fn load_icon(&self, icon_name: &str, _size: u32) -> Option<Bitmap> {
        self.icons.get(icon_name).cloned()
    }

    fn append_search_path(&self, dir: &Path) {
        self.search_paths.borrow_mut().push(dir.to_owned());
    }

    fn rescan(&self) {
        self.rescans.set(self.rescans.get() + 1);
    }
}

/// An `index.theme` with a single `{size}x{size}` directory of fixed-size icons.
pub fn fixed_index(name: &str, inherits: &[&str], size: u32) -> String {
    let inherits = if inherits.is_empty() {
        String::new()
    } else {
        format!("Inherits={}\n", inherits.join(","))
    };

    format!(
        "[Icon Theme]\nName={name}\nComment=test theme\n{inherits}Directories={size}x{size}\n\n\
         [{size}x{size}]\nSize={size}\nType=Fixed\n"
    )
}

/// Create `{root}/{internal_name}/index.theme`, returning the theme directory.
pub fn write_theme(root: &Path, internal_name: &str, index: &str) -> PathBuf {
    let theme_dir = root.join(internal_name);
    std::fs::create_dir_all(&theme_dir).unwrap();
    std::fs::write(theme_dir.join("index.theme"), index).unwrap();
    theme_dir
}

pub fn write_png(path: &Path, width: u32, height: u32, rgba: [u8; 4]) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    RgbaImage::from_pixel(width, height, Rgba(rgba))
        .save(path)
        .unwrap();
}

/// A square, opaque SVG in a single colour.
pub fn write_svg(path: &Path, rgb: [u8; 3]) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, svg_source(rgb)).unwrap();
}

pub fn svg_source([r, g, b]: [u8; 3]) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="16" height="16" viewBox="0 0 16 16"><rect width="16" height="16" fill="rgb({r},{g},{b})"/></svg>"#
    )
}

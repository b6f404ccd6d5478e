use crate::bitmap::{self, Bitmap, LoadError};
use std::fmt::Display;
use std::path::{Path, PathBuf};

/// An icon file on disk along with its detected file type.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct IconFile {
    /// Path to where this icon is found on disk.
    pub path: PathBuf,
    /// The filetype of the icon, derived from its extension.
    pub file_type: FileType,
}

impl IconFile {
    /// Create an `IconFile` from a filesystem path, deriving its filetype from its extension.
    ///
    /// Returns `None` for files that aren't icons we know how to load.
    pub fn from_path(path: &Path) -> Option<IconFile> {
        let file_type = FileType::from_path_ext(path)?;

        Some(IconFile {
            path: path.to_owned(),
            file_type,
        })
    }

    /// The name this icon is looked up by: its file name without extension.
    pub fn icon_name(&self) -> &str {
        self.path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default()
    }

    /// Load this icon for display at `size`.
    ///
    /// Vector icons are rendered to fit a `size`×`size` box. Raster icons are returned at their
    /// natural size; shrinking oversized ones is left to the caller.
    pub fn load(&self, size: u32) -> Result<Bitmap, LoadError> {
        match self.file_type {
            FileType::Svg => bitmap::render_svg_file(&self.path, size),
            FileType::Png => bitmap::decode_raster(&self.path),
        }
    }
}

/// Image formats icons are stored as, both in themes and in the customization store.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum FileType {
    Png,
    Svg,
}

impl FileType {
    /// Get a `FileType` from the file extension of some path.
    pub fn from_path_ext(path: &Path) -> Option<Self> {
        let ext = path.extension()?;
        let ext = ext.to_str()?;

        if ext.eq_ignore_ascii_case("png") {
            Some(FileType::Png)
        } else if ext.eq_ignore_ascii_case("svg") {
            Some(FileType::Svg)
        } else {
            None
        }
    }

    /// The canonical, lowercase file extension of this type.
    pub fn ext(&self) -> &'static str {
        match self {
            FileType::Png => "png",
            FileType::Svg => "svg",
        }
    }

    /// All file types, in lookup preference order: vector first.
    pub const fn types() -> [FileType; 2] {
        [FileType::Svg, FileType::Png]
    }

    pub fn is_vector(&self) -> bool {
        matches!(self, FileType::Svg)
    }
}

impl Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.ext())
    }
}

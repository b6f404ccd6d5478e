use crate::icon::{FileType, IconFile};
use crate::theme::ThemeParseError::MissingRequiredAttribute;
use freedesktop_entry_parser::low_level::{SectionBytes, SectionBytesIter};
use std::path::{Path, PathBuf};

/// An icon theme together with the themes it falls back to.
pub struct Theme {
    /// The theme that was asked for.
    pub info: ThemeInfo,
    /// Every (transitive) parent of `info`, flattened into lookup order and free of duplicates.
    pub inherits_from: Vec<ThemeInfo>,
}

impl Theme {
    /// Find the file for `icon_name` closest to `size`, in this theme or any of its parents.
    pub fn find_icon(&self, icon_name: &str, size: u32) -> Option<IconFile> {
        std::iter::once(&self.info)
            .chain(&self.inherits_from)
            .find_map(|theme| theme.find_icon_here(icon_name, size))
    }
}

/// Information about a single icon theme, without its parents.
pub struct ThemeInfo {
    /// The name of the directory wherein this theme lives.
    pub internal_name: String,
    /// Every directory, across all search directories, that holds part of this theme.
    pub base_dirs: Vec<PathBuf>,
    /// The `index.theme` that describes the theme: the first one found in `base_dirs`.
    pub index_location: PathBuf,
    /// The parsed contents of `index_location`.
    pub index: ThemeIndex,
}

#[derive(Debug, thiserror::Error)]
pub enum ThemeParseError {
    #[error("missing Icon Theme index or section")]
    NotAnIconTheme,
    #[error("missing attribute `{0}`")]
    MissingRequiredAttribute(&'static str),
    #[error("the input wasn't in utf-8")]
    NotUtf8(#[from] std::str::Utf8Error),
    #[error("a number was expected but failed to parse")]
    ParseNumError(#[from] std::num::ParseIntError),
    #[error("A directory type was invalid")]
    InvalidDirectoryType,
    #[error("invalid format for a freedesktop entry file")]
    ParseError(#[from] freedesktop_entry_parser::low_level::ParseError),
}

impl ThemeInfo {
    pub fn new_from_folders(internal_name: String, folders: Vec<PathBuf>) -> std::io::Result<Self> {
        let index_location = folders
            .iter()
            .map(|f| f.join("index.theme"))
            .find(|index_path| index_path.exists())
            .ok_or_else(|| std::io::Error::other(ThemeParseError::NotAnIconTheme))?;

        let index = ThemeIndex::parse_from_file(index_location.as_path())?;

        Ok(Self {
            internal_name,
            base_dirs: folders,
            index_location,
            index,
        })
    }

    /// Find an icon in this theme only, not checking parents.
    ///
    /// A directory matching `size` exactly wins; otherwise the icon from the directory with the
    /// smallest size distance is used. Within a directory, vector files beat raster ones.
    pub fn find_icon_here(&self, icon_name: &str, size: u32) -> Option<IconFile> {
        let directories = &self.index.directories;

        // first, try to find an exact icon size match:
        let exact = directories
            .iter()
            .filter(|dir| dir.matches_size(size))
            .find_map(|dir| self.find_in_directory(dir, icon_name));
        if exact.is_some() {
            return exact;
        }

        // no exact match: try to find a match as close as possible instead.

        let mut min_dist = u32::MAX;
        let mut best_icon = None;

        for dir in directories {
            let distance = dir.size_distance(size);

            if distance < min_dist
                && let Some(file) = self.find_in_directory(dir, icon_name)
            {
                min_dist = distance;
                best_icon = Some(file);
            }
        }

        best_icon
    }

    fn find_in_directory(&self, dir: &DirectoryIndex, icon_name: &str) -> Option<IconFile> {
        for base_dir in &self.base_dirs {
            let sub_dir = base_dir.join(dir.directory_name.as_str());

            for file_type in FileType::types() {
                let path = sub_dir.join(format!("{icon_name}.{}", file_type.ext()));

                if path.is_file() {
                    return IconFile::from_path(&path);
                }
            }
        }

        None
    }
}

/// The parsed `index.theme` of an icon theme.
pub struct ThemeIndex {
    /// Human-readable name of the theme.
    pub name: String,
    /// Internal names of the themes to fall back to, in order.
    pub inherits: Vec<String>,
    /// Every entry of `Directories` and `ScaledDirectories` that has a section describing it.
    pub directories: Vec<DirectoryIndex>,
}

impl ThemeIndex {
    pub fn parse_from_file(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let index = ThemeIndex::parse(&bytes).map_err(std::io::Error::other)?;

        Ok(index)
    }

    pub fn parse(bytes: &[u8]) -> Result<Self, ThemeParseError> {
        let mut entry: SectionBytesIter = freedesktop_entry_parser::low_level::parse_entry(bytes);

        let icon_theme_section: SectionBytes =
            entry.next().ok_or(ThemeParseError::NotAnIconTheme)??;
        if icon_theme_section.title != b"Icon Theme" {
            return Err(ThemeParseError::NotAnIconTheme);
        }

        let name: &str = find_attr_req(&icon_theme_section, "Name")?;
        let inherits = find_attr(&icon_theme_section, "Inherits")?
            .iter()
            .flat_map(|s| s.split(','))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Into::into)
            .collect::<Vec<_>>();
        let directories = split_list(find_attr_req(&icon_theme_section, "Directories")?);
        let scaled_directories =
            split_list(find_attr(&icon_theme_section, "ScaledDirectories")?.unwrap_or(""));

        let directories = entry
            .filter_map(Result::ok)
            .filter_map(|section| {
                let title = str::from_utf8(section.title).ok()?;
                let is_scaled_dir = scaled_directories.contains(&title);

                // sections for directories the theme doesn't list are ignored
                if !directories.contains(&title) && !is_scaled_dir {
                    return None;
                }

                Some(DirectoryIndex::parse(section).map(|mut index| {
                    index.is_scaled_dir |= is_scaled_dir;
                    index
                }))
            })
            .collect::<Result<Vec<_>, ThemeParseError>>()?;

        Ok(Self {
            name: name.into(),
            inherits,
            directories,
        })
    }
}

/// One icon directory of a theme, as described by its section in `index.theme`.
pub struct DirectoryIndex {
    /// Path of the directory relative to the theme's base directories.
    pub directory_name: String,
    pub is_scaled_dir: bool,
    /// Nominal size of the icons in this directory.
    pub size: u32,
    pub scale: u32,
    pub directory_type: DirectoryType,
    /// Largest size `Scalable` icons in here may be drawn at. Defaults to `size`.
    pub max_size: u32,
    /// Smallest size `Scalable` icons in here may be drawn at. Defaults to `size`.
    pub min_size: u32,
    /// How far off `Threshold` icons may be from the requested size. Defaults to 2.
    pub threshold: u32,
}

impl DirectoryIndex {
    fn parse(section: SectionBytes) -> Result<Self, ThemeParseError> {
        let dir_name = str::from_utf8(section.title)?;
        let size: u32 = find_attr_req(&section, "Size")?.parse()?;
        let scale: u32 = parse_attr(&section, "Scale")?.unwrap_or(1);
        let directory_type = find_attr(&section, "Type")?
            .map(DirectoryType::try_from)
            .transpose()
            .map_err(|_| ThemeParseError::InvalidDirectoryType)?
            .unwrap_or(DirectoryType::Threshold);
        let max_size = parse_attr(&section, "MaxSize")?.unwrap_or(size);
        let min_size = parse_attr(&section, "MinSize")?.unwrap_or(size);
        let threshold = parse_attr(&section, "Threshold")?.unwrap_or(2);

        Ok(Self {
            directory_name: dir_name.into(),
            is_scaled_dir: scale != 1,
            size,
            scale,
            directory_type,
            max_size,
            min_size,
            threshold,
        })
    }

    /// Whether icons from this directory may be used as-is for `icon_size`.
    ///
    /// Only unscaled (scale 1) directories are considered.
    pub fn matches_size(&self, icon_size: u32) -> bool {
        if self.scale != 1 {
            return false;
        }

        match self.directory_type {
            DirectoryType::Fixed => self.size == icon_size,
            DirectoryType::Scalable => (self.min_size..=self.max_size).contains(&icon_size),
            DirectoryType::Threshold => self.size.abs_diff(icon_size) <= self.threshold,
        }
    }

    /// How far `icon_size` is from what this directory provides, in device pixels.
    ///
    /// Sizes come straight from `index.theme`, so the arithmetic saturates instead of overflowing.
    pub fn size_distance(&self, icon_size: u32) -> u32 {
        let scaled = |size: u32| size.saturating_mul(self.scale);

        match self.directory_type {
            DirectoryType::Fixed => scaled(self.size).abs_diff(icon_size),
            DirectoryType::Scalable => {
                let (min, max) = (scaled(self.min_size), scaled(self.max_size));

                if icon_size < min {
                    min - icon_size
                } else if icon_size > max {
                    icon_size - max
                } else {
                    0
                }
            }
            DirectoryType::Threshold => {
                let lower = scaled(self.size.saturating_sub(self.threshold));
                let higher = scaled(self.size.saturating_add(self.threshold));

                if icon_size < lower {
                    icon_size.abs_diff(scaled(self.min_size))
                } else if icon_size > higher {
                    icon_size.abs_diff(scaled(self.max_size))
                } else {
                    0
                }
            }
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DirectoryType {
    Fixed,
    Scalable,
    Threshold,
}

impl TryFrom<&str> for DirectoryType {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let value = match value {
            "Fixed" => DirectoryType::Fixed,
            "Scalable" => DirectoryType::Scalable,
            "Threshold" => DirectoryType::Threshold,
            _ => return Err(()),
        };

        Ok(value)
    }
}

fn split_list(list: &str) -> Vec<&str> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

fn find_attr<'a>(
    section: &'a SectionBytes,
    name: &str,
) -> Result<Option<&'a str>, std::str::Utf8Error> {
    section
        .attrs
        .iter()
        .find(|attr| attr.name == name.as_bytes() && attr.param.is_none())
        .map(|attr| str::from_utf8(&attr.value))
        .transpose()
}

fn find_attr_req<'a>(
    section: &'a SectionBytes,
    name: &'static str,
) -> Result<&'a str, ThemeParseError> {
    find_attr(section, name)?.ok_or(MissingRequiredAttribute(name))
}

fn parse_attr(section: &SectionBytes, name: &str) -> Result<Option<u32>, ThemeParseError> {
    Ok(find_attr(section, name)?.map(str::parse).transpose()?)
}

//! Font loading utilities for the sheet renderer.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use rusttype::Font;

use crate::error::FontError;

/// Name of the bundled font family.
pub const DEFAULT_FONT_FAMILY_NAME: &str = "Roboto";

/// Environment variable that points at a directory holding the bundled font files.
pub const FONTS_DIR_ENV: &str = "VEHICLE_SHEET_FONTS_DIR";

/// File names of one font family, one per face.
#[derive(Clone, Copy, Debug)]
struct FamilyFiles {
    name: &'static str,
    regular: &'static str,
    bold: &'static str,
    italic: &'static str,
    bold_italic: &'static str,
}

impl FamilyFiles {
    fn names(&self) -> [&'static str; 4] {
        [self.regular, self.bold, self.italic, self.bold_italic]
    }
}

const BUNDLED_FILES: FamilyFiles = FamilyFiles {
    name: DEFAULT_FONT_FAMILY_NAME,
    regular: "Roboto-Regular.ttf",
    bold: "Roboto-Bold.ttf",
    italic: "Roboto-Italic.ttf",
    bold_italic: "Roboto-BoldItalic.ttf",
};

const WINDOWS_FILES: FamilyFiles = FamilyFiles {
    name: "Arial",
    regular: "arial.ttf",
    bold: "arialbd.ttf",
    italic: "ariali.ttf",
    bold_italic: "arialbi.ttf",
};

const DEJAVU_FILES: FamilyFiles = FamilyFiles {
    name: "DejaVu Sans",
    regular: "DejaVuSans.ttf",
    bold: "DejaVuSans-Bold.ttf",
    italic: "DejaVuSans-Oblique.ttf",
    bold_italic: "DejaVuSans-BoldOblique.ttf",
};

const DEJAVU_DIRECTORIES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu",
    "/usr/share/fonts/dejavu",
    "/usr/share/fonts/TTF",
];

/// Weight and slant of a text run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Face {
    /// Upright, normal weight.
    #[default]
    Regular,
    /// Upright, bold.
    Bold,
    /// Slanted, normal weight.
    Italic,
    /// Slanted, bold.
    BoldItalic,
}

/// One font family with all four faces parsed and ready for layout.
#[derive(Clone)]
pub struct FontSet {
    family: String,
    regular: Font<'static>,
    bold: Font<'static>,
    italic: Font<'static>,
    bold_italic: Font<'static>,
}

impl std::fmt::Debug for FontSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontSet")
            .field("family", &self.family)
            .finish_non_exhaustive()
    }
}

impl FontSet {
    /// Loads the sheet fonts, preferring `explicit_dir` when given.
    ///
    /// Search order: `explicit_dir`, [`FONTS_DIR_ENV`], `assets/fonts` next to
    /// the executable, the crate's `assets/fonts`. When none of those hold the
    /// bundled Roboto family, the Windows Arial and the DejaVu Sans families
    /// are tried.
    pub fn load(explicit_dir: Option<&Path>) -> Result<Self, FontError> {
        let mut attempts = Vec::new();

        for candidate in font_directory_candidates(explicit_dir) {
            match check_directory(&candidate, &BUNDLED_FILES) {
                Ok(()) => return Self::from_directory(&candidate, &BUNDLED_FILES),
                Err(reason) => attempts.push(format!("{} ({})", candidate.display(), reason)),
            }
        }

        for (directory, files) in fallback_candidates() {
            match check_directory(&directory, &files) {
                Ok(()) => {
                    warn!(
                        "Bundled fonts unavailable; falling back to '{}' from {}",
                        files.name,
                        directory.display()
                    );
                    return Self::from_directory(&directory, &files);
                }
                Err(reason) => attempts.push(format!("{} ({})", directory.display(), reason)),
            }
        }

        let attempts = if attempts.is_empty() {
            "no search paths were available".to_owned()
        } else {
            attempts.join(", ")
        };
        Err(FontError::NotFound { attempts })
    }

    fn from_directory(directory: &Path, files: &FamilyFiles) -> Result<Self, FontError> {
        debug!("loading font family '{}' from {}", files.name, directory.display());
        Ok(Self {
            family: files.name.to_owned(),
            regular: load_font(&directory.join(files.regular))?,
            bold: load_font(&directory.join(files.bold))?,
            italic: load_font(&directory.join(files.italic))?,
            bold_italic: load_font(&directory.join(files.bold_italic))?,
        })
    }

    /// Name of the loaded family.
    pub fn family(&self) -> &str {
        &self.family
    }

    /// Returns the font for `face`.
    pub fn face(&self, face: Face) -> &Font<'static> {
        match face {
            Face::Regular => &self.regular,
            Face::Bold => &self.bold,
            Face::Italic => &self.italic,
            Face::BoldItalic => &self.bold_italic,
        }
    }
}

/// Indicates whether any supported font family can be found without an explicit directory.
pub fn default_fonts_available() -> bool {
    font_directory_candidates(None)
        .into_iter()
        .any(|dir| check_directory(&dir, &BUNDLED_FILES).is_ok())
        || fallback_candidates()
            .into_iter()
            .any(|(dir, files)| check_directory(&dir, &files).is_ok())
}

fn font_directory_candidates(explicit_dir: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates: Vec<PathBuf> = Vec::new();
    let mut push = |candidate: PathBuf| {
        if !candidates.iter().any(|existing| existing == &candidate) {
            candidates.push(candidate);
        }
    };

    if let Some(dir) = explicit_dir {
        push(dir.to_path_buf());
    }

    if let Some(path) = env_path(FONTS_DIR_ENV) {
        push(path);
    }

    if let Ok(current_exe) = env::current_exe() {
        if let Some(bin_dir) = current_exe.parent() {
            push(bin_dir.join("assets/fonts"));
        }
    }

    push(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/fonts"));

    candidates
}

fn fallback_candidates() -> Vec<(PathBuf, FamilyFiles)> {
    let mut candidates = Vec::new();

    for var in ["WINDIR", "SystemRoot"] {
        if let Some(root) = env_path(var) {
            candidates.push((root.join("Fonts"), WINDOWS_FILES));
        }
    }

    for dir in DEJAVU_DIRECTORIES {
        candidates.push((PathBuf::from(dir), DEJAVU_FILES));
    }

    candidates
}

fn env_path(var: &str) -> Option<PathBuf> {
    env::var_os(var).and_then(|value| {
        let path = PathBuf::from(value);
        if path.as_os_str().is_empty() {
            None
        } else {
            Some(path)
        }
    })
}

fn check_directory(path: &Path, files: &FamilyFiles) -> Result<(), String> {
    if !path.is_dir() {
        return Err("directory missing".to_owned());
    }

    let missing: Vec<_> = files
        .names()
        .iter()
        .filter(|name| !path.join(name).is_file())
        .copied()
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(format!("missing files [{}]", missing.join(", ")))
    }
}

fn load_font(path: &Path) -> Result<Font<'static>, FontError> {
    let data = fs::read(path).map_err(|source| FontError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Font::try_from_vec(data).ok_or_else(|| FontError::Parse {
        path: path.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::{check_directory, font_directory_candidates, FontSet, BUNDLED_FILES};
    use crate::error::FontError;
    use std::fs;

    #[test]
    fn explicit_directory_is_searched_first() {
        let dir = tempfile::tempdir().expect("tempdir");
        let candidates = font_directory_candidates(Some(dir.path()));
        assert_eq!(candidates.first().map(|p| p.as_path()), Some(dir.path()));
    }

    #[test]
    fn incomplete_directory_reports_missing_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("Roboto-Regular.ttf"), b"").expect("write");

        let reason = check_directory(dir.path(), &BUNDLED_FILES).unwrap_err();
        assert!(reason.contains("Roboto-Bold.ttf"));
        assert!(!reason.contains("Roboto-Regular.ttf"));
    }

    #[test]
    fn garbage_font_files_fail_to_parse() {
        let dir = tempfile::tempdir().expect("tempdir");
        for name in BUNDLED_FILES.names() {
            fs::write(dir.path().join(name), b"not a font").expect("write");
        }

        match FontSet::load(Some(dir.path())) {
            Err(FontError::Parse { path }) => assert!(path.starts_with(dir.path())),
            other => panic!("expected parse failure, got {other:?}"),
        }
    }
}

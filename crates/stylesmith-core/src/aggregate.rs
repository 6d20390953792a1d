//! Per-theme aggregate construction.

use std::path::{Path, PathBuf};

use crate::config::ProjectLayout;
use crate::discovery::StyleSet;
use crate::paths::{relative_to, to_import_path};
use crate::theme::ThemeError;

/// A validated theme definition file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeDescriptor {
    /// Path of the `<name>.theme.<ext>` file
    pub location: PathBuf,

    /// Theme name taken from the file name
    pub name: String,
}

impl ThemeDescriptor {
    /// Extracts the theme name from `location`.
    ///
    /// The file name must be exactly `<name>.theme.<extension>` with a
    /// non-empty name.
    pub fn from_location(location: impl Into<PathBuf>, extension: &str) -> Result<Self, ThemeError> {
        let location = location.into();
        let suffix = format!(".theme.{extension}");

        let name = location
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.strip_suffix(suffix.as_str()))
            .filter(|name| !name.is_empty())
            .map(str::to_string);

        match name {
            Some(name) => Ok(Self { location, name }),
            None => Err(ThemeError::InvalidName(location)),
        }
    }
}

/// Everything needed to build one theme: imports in cascade order and the
/// derived output paths.
#[derive(Debug, Clone)]
pub struct AggregateBuild {
    pub theme: ThemeDescriptor,

    /// Shared styles, then the theme file, then component styles
    pub styles: Vec<PathBuf>,

    /// `<scss_out>/<lib>.<theme>.<ext>`
    pub aggregate_path: PathBuf,

    /// `<css_out>/<lib>.<theme>.css`
    pub css_path: PathBuf,

    /// `<css_out>/<lib>.<theme>.css.map`
    pub map_path: PathBuf,
}

impl AggregateBuild {
    pub fn new(layout: &ProjectLayout, styles: &StyleSet, theme: ThemeDescriptor) -> Self {
        let stem = format!("{}.{}", layout.lib_name, theme.name);

        let ordered = styles
            .shared_styles
            .iter()
            .chain(std::iter::once(&theme.location))
            .chain(styles.component_styles.iter())
            .cloned()
            .collect();

        Self {
            aggregate_path: layout
                .scss_out_dir
                .join(format!("{stem}.{}", layout.extension)),
            css_path: layout.css_out_dir.join(format!("{stem}.css")),
            map_path: layout.css_out_dir.join(format!("{stem}.css.map")),
            styles: ordered,
            theme,
        }
    }

    /// Directory the aggregate is written to.
    pub fn aggregate_dir(&self) -> &Path {
        self.aggregate_path.parent().unwrap_or(Path::new(""))
    }

    /// One `@import` line per style, relative to the aggregate's directory.
    pub fn directives(&self) -> Vec<String> {
        let base = self.aggregate_dir();
        self.styles
            .iter()
            .map(|style| format!("@import '{}';\n", to_import_path(&relative_to(style, base))))
            .collect()
    }

    /// Style paths relative to the compiled stylesheet's directory, for the
    /// source map.
    pub fn map_sources(&self) -> Vec<String> {
        let base = self.css_path.parent().unwrap_or(Path::new(""));
        self.styles
            .iter()
            .map(|style| to_import_path(&relative_to(style, base)))
            .collect()
    }

    /// File name of the compiled stylesheet.
    pub fn css_file_name(&self) -> String {
        file_name(&self.css_path)
    }

    /// File name of the source map.
    pub fn map_file_name(&self) -> String {
        file_name(&self.map_path)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

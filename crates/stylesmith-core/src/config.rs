//! Build configuration.
//!
//! ## Learning: Serde for Serialization
//!
//! `#[serde(default)]` fills every missing field from `Default::default()`,
//! so an empty `stylesmith.toml` (or none at all) gives the stock layout:
//!
//! ```toml
//! [library]
//! name = "my-lib"
//!
//! [paths]
//! themes = "themes"
//! shared = "themes/shared"
//! components = "components"
//! dist = "../dist"
//!
//! [output]
//! extension = "scss"
//! style = "expanded"
//! source_map = true
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::paths::normalize;

/// Name of the optional config file looked up in the project root.
pub const CONFIG_FILE_NAME: &str = "stylesmith.toml";

/// Top-level build configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Library naming
    pub library: LibraryConfig,

    /// Input and output directories, relative to the project root
    pub paths: PathsConfig,

    /// Compiler output settings
    pub output: OutputConfig,
}

impl BuildConfig {
    /// Loads config from a TOML file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Loads `stylesmith.toml` from `root` if present, defaults otherwise.
    pub fn discover(root: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = root.as_ref().join(CONFIG_FILE_NAME);
        if path.is_file() {
            tracing::debug!(path = %path.display(), "loading build config");
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Resolves every directory against `root` and compiles the filename
    /// patterns.
    pub fn resolve(&self, root: impl AsRef<Path>) -> Result<ProjectLayout, ConfigError> {
        self.validate()?;

        let root = root.as_ref();
        let root = if root.is_absolute() {
            normalize(root)
        } else {
            normalize(&std::env::current_dir()?.join(root))
        };

        let dist = normalize(&root.join(&self.paths.dist));
        let scss_out_dir = normalize(&dist.join(&self.paths.dist_scss));
        let css_out_dir = normalize(&dist.join(&self.paths.dist_css));
        if scss_out_dir == css_out_dir {
            return Err(ConfigError::Invalid(format!(
                "aggregate and compiled outputs must be separate directories, both are {}",
                scss_out_dir.display()
            )));
        }

        let ext = regex::escape(&self.output.extension);

        Ok(ProjectLayout {
            lib_name: self.library.name.clone(),
            themes_dir: normalize(&root.join(&self.paths.themes)),
            shared_dir: normalize(&root.join(&self.paths.shared)),
            components_dir: normalize(&root.join(&self.paths.components)),
            scss_out_dir,
            css_out_dir,
            root,
            extension: self.output.extension.clone(),
            output_style: self.output.style,
            source_map: self.output.source_map,
            style_pattern: Regex::new(&format!(r"\.{ext}$"))?,
            theme_pattern: Regex::new(&format!(r"\.theme\.{ext}"))?,
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let name = &self.library.name;
        if name.is_empty() || name.contains(['/', '\\']) {
            return Err(ConfigError::Invalid(format!(
                "library name must be a non-empty file name, got {name:?}"
            )));
        }

        let ext = &self.output.extension;
        if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ConfigError::Invalid(format!(
                "style extension must be alphanumeric, got {ext:?}"
            )));
        }

        Ok(())
    }
}

/// Library naming.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Prefix of every generated file name
    pub name: String,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            name: "my-lib".to_string(),
        }
    }
}

/// Directory layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Theme definition files (`<name>.theme.<ext>`)
    pub themes: PathBuf,

    /// Styles shared by every theme
    pub shared: PathBuf,

    /// One sub-directory per component
    pub components: PathBuf,

    /// Output root
    pub dist: PathBuf,

    /// Aggregate sources, relative to `dist`
    pub dist_scss: PathBuf,

    /// Compiled stylesheets, relative to `dist`
    pub dist_css: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            themes: PathBuf::from("themes"),
            shared: PathBuf::from("themes/shared"),
            components: PathBuf::from("components"),
            dist: PathBuf::from("../dist"),
            dist_scss: PathBuf::from("scss"),
            dist_css: PathBuf::from("css"),
        }
    }
}

/// Compiler output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Extension of style source files
    pub extension: String,

    /// CSS formatting
    pub style: OutputStyle,

    /// Emit a source map next to each stylesheet
    pub source_map: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            extension: "scss".to_string(),
            style: OutputStyle::default(),
            source_map: true,
        }
    }
}

/// CSS formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputStyle {
    #[default]
    Expanded,
    Compressed,
}

impl From<OutputStyle> for grass::OutputStyle {
    fn from(style: OutputStyle) -> Self {
        match style {
            OutputStyle::Expanded => grass::OutputStyle::Expanded,
            OutputStyle::Compressed => grass::OutputStyle::Compressed,
        }
    }
}

/// Fully resolved project layout, shared by every build stage.
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    /// Project root (watched in watch mode)
    pub root: PathBuf,

    pub lib_name: String,
    pub themes_dir: PathBuf,
    pub shared_dir: PathBuf,
    pub components_dir: PathBuf,
    pub scss_out_dir: PathBuf,
    pub css_out_dir: PathBuf,

    /// Style file extension without the dot
    pub extension: String,
    pub output_style: OutputStyle,
    pub source_map: bool,

    /// Matches style file names (`\.scss$`)
    pub style_pattern: Regex,

    /// Matches theme file names (`\.theme\.scss`)
    pub theme_pattern: Regex,
}

impl ProjectLayout {
    /// Both output directories, aggregate sources first.
    pub fn output_dirs(&self) -> [&Path; 2] {
        [&self.scss_out_dir, &self.css_out_dir]
    }

    /// Returns true if `path` lies in one of the output directories.
    pub fn is_output(&self, path: &Path) -> bool {
        self.output_dirs().iter().any(|dir| path.starts_with(dir))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

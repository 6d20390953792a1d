//! # Stylesmith Core
//!
//! Style discovery, theme compilation and build orchestration.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                        Builder                            │
//! │  clean dist/scss + dist/css                               │
//! │         │                                                 │
//! │  ┌──────┴────────┐      ┌──────────────────────────────┐ │
//! │  │ StyleDiscovery│ ───▶ │        ThemeCompiler          │ │
//! │  │ shared        │      │  ┌────────┐ ┌────────┐        │ │
//! │  │ components    │      │  │ light  │ │  dark  │  ...   │ │
//! │  │ themes        │      │  └────────┘ └────────┘        │ │
//! │  └───────────────┘      └──────────────────────────────┘ │
//! └──────────────────────────────────────────────────────────┘
//!            ▲
//!            │ rebuild on *.scss change
//!       StyleWatcher
//! ```
//!
//! Each theme gets an aggregate `<lib>.<theme>.scss` that imports shared
//! styles, the theme file and component styles, in that order. The
//! aggregate is compiled to `<lib>.<theme>.css`.

pub mod aggregate;
pub mod build;
pub mod compiler;
pub mod config;
pub mod discovery;
pub mod paths;
pub mod theme;
pub mod watch;

pub use aggregate::{AggregateBuild, ThemeDescriptor};
pub use build::{BuildReport, Builder};
pub use compiler::{CompileError, CompileRequest, CompiledStyles, GrassCompiler, StyleCompiler};
pub use config::{BuildConfig, ConfigError, OutputStyle, ProjectLayout, CONFIG_FILE_NAME};
pub use discovery::{StyleDiscovery, StyleSet};
pub use theme::{ThemeArtifacts, ThemeCompiler, ThemeError, ThemeOutcome};
pub use watch::{rebuild_on_changes, watch, StyleWatcher};

use stylesmith_fs::FsError;

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that stop a build stage
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Failed to clean output directory: {0}")]
    Clean(#[source] FsError),

    #[error("Style discovery failed: {0}")]
    Discovery(#[source] FsError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Watch error: {0}")]
    Watch(#[from] notify::Error),
}

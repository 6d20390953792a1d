//! Build orchestration.
//!
//! ## Learning: Errors as Data
//!
//! `Builder::compile` returns a `BuildReport` instead of a `Result`. Stage
//! failures are logged as they happen and collected in the report, so the
//! watch loop keeps running and callers can still inspect what went wrong.

use std::sync::Arc;
use std::time::{Duration, Instant};

use stylesmith_fs::clean_dir;

use crate::compiler::{GrassCompiler, StyleCompiler};
use crate::config::ProjectLayout;
use crate::discovery::StyleDiscovery;
use crate::theme::{ThemeCompiler, ThemeOutcome};
use crate::{CoreError, CoreResult};

/// Summary of one build.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Per-theme outcomes, ordered by theme name
    pub themes: Vec<ThemeOutcome>,

    /// Stage failures that stopped the build early
    pub errors: Vec<CoreError>,

    /// Wall-clock duration of the build
    pub elapsed: Duration,
}

impl BuildReport {
    /// True when no stage failed and every theme compiled.
    pub fn is_success(&self) -> bool {
        self.errors.is_empty() && self.themes.iter().all(ThemeOutcome::is_success)
    }

    /// Themes that compiled.
    pub fn succeeded(&self) -> impl Iterator<Item = &ThemeOutcome> {
        self.themes.iter().filter(|t| t.is_success())
    }

    /// Themes that failed.
    pub fn failed(&self) -> impl Iterator<Item = &ThemeOutcome> {
        self.themes.iter().filter(|t| !t.is_success())
    }
}

/// Runs the full pipeline: clean, discover, compile.
#[derive(Clone)]
pub struct Builder {
    layout: Arc<ProjectLayout>,
    discovery: StyleDiscovery,
    themes: ThemeCompiler,
}

impl Builder {
    pub fn new(layout: ProjectLayout, compiler: Arc<dyn StyleCompiler>) -> Self {
        let layout = Arc::new(layout);
        Self {
            discovery: StyleDiscovery::new(Arc::clone(&layout)),
            themes: ThemeCompiler::new(Arc::clone(&layout), compiler),
            layout,
        }
    }

    /// Builder using the `grass` compiler with the layout's output style.
    pub fn with_grass(layout: ProjectLayout) -> Self {
        let compiler = GrassCompiler::new(layout.output_style);
        Self::new(layout, Arc::new(compiler))
    }

    pub fn layout(&self) -> &Arc<ProjectLayout> {
        &self.layout
    }

    /// Empties and recreates both output directories concurrently.
    pub async fn clean_outputs(&self) -> Vec<CoreError> {
        let (scss, css) = tokio::join!(
            clean_dir(&self.layout.scss_out_dir),
            clean_dir(&self.layout.css_out_dir),
        );

        [scss, css]
            .into_iter()
            .filter_map(Result::err)
            .map(CoreError::Clean)
            .collect()
    }

    /// Runs one full build. Never fails; see [`BuildReport`].
    pub async fn compile(&self) -> BuildReport {
        let start = Instant::now();
        let mut report = BuildReport::default();

        let clean_errors = self.clean_outputs().await;
        if clean_errors.is_empty() {
            match self.compile_themes().await {
                Ok(themes) => report.themes = themes,
                Err(e) => report.errors.push(e),
            }
        } else {
            report.errors = clean_errors;
        }

        for err in &report.errors {
            tracing::error!("{}", err);
        }

        report.elapsed = start.elapsed();
        tracing::info!(
            compiled = report.succeeded().count(),
            failed = report.failed().count(),
            "completed rendering styles in {}ms",
            report.elapsed.as_millis()
        );

        report
    }

    async fn compile_themes(&self) -> CoreResult<Vec<ThemeOutcome>> {
        let styles = self
            .discovery
            .common_styles()
            .await
            .map_err(CoreError::Discovery)?;
        let themes = self.discovery.themes().await.map_err(CoreError::Discovery)?;

        if themes.is_empty() {
            tracing::warn!(dir = %self.layout.themes_dir.display(), "no themes found");
        }

        Ok(self.themes.compile_all(&styles, themes).await)
    }
}

//! Theme compilation: aggregate, compile, persist.
//!
//! Every theme runs independently. A failure is captured in that theme's
//! [`ThemeOutcome`] and never cancels its siblings.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::future::join_all;
use stylesmith_fs::{write_file, write_to_stream, FsError};
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::aggregate::{AggregateBuild, ThemeDescriptor};
use crate::compiler::{CompileError, CompileRequest, CompiledStyles, StyleCompiler};
use crate::config::ProjectLayout;
use crate::discovery::StyleSet;

/// Files produced for a successfully compiled theme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeArtifacts {
    pub aggregate: PathBuf,
    pub css: PathBuf,
    pub source_map: Option<PathBuf>,
}

/// Result of compiling one theme.
#[derive(Debug)]
pub struct ThemeOutcome {
    /// Theme name, or the file name when no name could be extracted
    pub theme: String,

    /// The theme definition file
    pub location: PathBuf,

    pub result: Result<ThemeArtifacts, ThemeError>,
}

impl ThemeOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Builds aggregates and compiled stylesheets for themes.
#[derive(Clone)]
pub struct ThemeCompiler {
    layout: Arc<ProjectLayout>,
    compiler: Arc<dyn StyleCompiler>,
}

impl ThemeCompiler {
    pub fn new(layout: Arc<ProjectLayout>, compiler: Arc<dyn StyleCompiler>) -> Self {
        Self { layout, compiler }
    }

    /// Compiles every theme concurrently. Outcomes are ordered by theme.
    pub async fn compile_all(&self, styles: &StyleSet, themes: Vec<PathBuf>) -> Vec<ThemeOutcome> {
        let mut outcomes = join_all(
            themes
                .into_iter()
                .map(|location| self.compile_theme(styles, location)),
        )
        .await;

        outcomes.sort_by(|a, b| a.theme.cmp(&b.theme));
        outcomes
    }

    /// Compiles a single theme file.
    pub async fn compile_theme(&self, styles: &StyleSet, location: PathBuf) -> ThemeOutcome {
        let descriptor = ThemeDescriptor::from_location(location.clone(), &self.layout.extension);
        let (theme, result) = match descriptor {
            Ok(descriptor) => (
                descriptor.name.clone(),
                self.try_compile(styles, descriptor).await,
            ),
            Err(e) => (file_label(&location), Err(e)),
        };

        if let Err(err) = &result {
            report_failure(&location, err);
        }

        ThemeOutcome {
            theme,
            location,
            result,
        }
    }

    async fn try_compile(&self, styles: &StyleSet, theme: ThemeDescriptor) -> Result<ThemeArtifacts, ThemeError> {
        let build = AggregateBuild::new(&self.layout, styles, theme);

        self.write_aggregate(&build).await?;
        tracing::info!(
            "rendered {} to {}",
            file_label(&build.aggregate_path),
            self.layout.scss_out_dir.display()
        );

        let compiled = self.render(&build).await?;
        let artifacts = self.persist(&build, compiled).await?;
        tracing::info!(
            "rendered {} to {}",
            build.css_file_name(),
            self.layout.css_out_dir.display()
        );

        Ok(artifacts)
    }

    async fn write_aggregate(&self, build: &AggregateBuild) -> Result<(), ThemeError> {
        let path = &build.aggregate_path;
        let mut file = tokio::fs::File::create(path)
            .await
            .map_err(|e| FsError::from_io(path, e))?;

        write_directives(&mut file, path, &build.directives()).await
    }

    /// Runs the style compiler on the blocking pool.
    async fn render(&self, build: &AggregateBuild) -> Result<CompiledStyles, ThemeError> {
        let request = CompileRequest {
            entry: build.aggregate_path.clone(),
            out_file: build.css_file_name(),
            sources: build.map_sources(),
            source_map: self.layout.source_map,
        };

        let compiler = Arc::clone(&self.compiler);
        let compiled = tokio::task::spawn_blocking(move || compiler.compile(&request))
            .await
            .map_err(|e| ThemeError::Task(e.to_string()))??;

        Ok(compiled)
    }

    async fn persist(&self, build: &AggregateBuild, compiled: CompiledStyles) -> Result<ThemeArtifacts, ThemeError> {
        let mut css = compiled.css;

        let Some(map) = compiled.source_map else {
            write_file(&build.css_path, css).await?;
            return Ok(ThemeArtifacts {
                aggregate: build.aggregate_path.clone(),
                css: build.css_path.clone(),
                source_map: None,
            });
        };

        if !css.is_empty() && !css.ends_with('\n') {
            css.push('\n');
        }
        css.push_str(&format!("/*# sourceMappingURL={} */\n", build.map_file_name()));

        tokio::try_join!(
            write_file(&build.css_path, css),
            write_file(&build.map_path, map),
        )?;

        Ok(ThemeArtifacts {
            aggregate: build.aggregate_path.clone(),
            css: build.css_path.clone(),
            source_map: Some(build.map_path.clone()),
        })
    }
}

/// Writes import directives to `stream` in order, then closes it.
///
/// A failed directive is logged and the rest are still written; the
/// partial output is kept and the theme is reported as failed.
async fn write_directives<W>(stream: &mut W, path: &Path, directives: &[String]) -> Result<(), ThemeError>
where
    W: AsyncWrite + Unpin,
{
    let mut failed = 0;
    for directive in directives {
        if let Err(e) = write_to_stream(stream, path, directive.as_bytes()).await {
            tracing::error!("Failed to write import: {}", e);
            failed += 1;
        }
    }

    stream
        .shutdown()
        .await
        .map_err(|e| FsError::from_io(path, e))?;

    if failed > 0 {
        return Err(ThemeError::AggregateWrite {
            path: path.to_path_buf(),
            failed,
        });
    }

    Ok(())
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn report_failure(location: &Path, err: &ThemeError) {
    let label = file_label(location);
    match err {
        ThemeError::Compile(CompileError::Syntax {
            file,
            line,
            column,
            message,
        }) => {
            tracing::error!(
                theme = %label,
                file = %file.display(),
                line,
                column,
                "ERROR RENDERING {}: {}",
                label,
                message
            );
        }
        other => {
            tracing::error!(theme = %label, "ERROR RENDERING {}: {}", label, other);
        }
    }
}

/// Errors that fail a single theme.
#[derive(Debug, thiserror::Error)]
pub enum ThemeError {
    #[error("Theme file name does not match <name>.theme.<ext>: {}", .0.display())]
    InvalidName(PathBuf),

    #[error("{failed} import directive(s) could not be written to {}", path.display())]
    AggregateWrite { path: PathBuf, failed: usize },

    #[error(transparent)]
    Fs(#[from] FsError),

    #[error("Compile error: {0}")]
    Compile(#[from] CompileError),

    #[error("Compiler task failed: {0}")]
    Task(String),
}

//! Sass compilation.
//!
//! ## Learning: Traits as Seams
//!
//! The theme compiler only talks to `dyn StyleCompiler`. The default
//! implementation wraps the pure-Rust `grass` compiler; tests or other
//! front-ends can swap in their own without touching the pipeline.

use std::path::PathBuf;

use serde::Serialize;

use crate::config::OutputStyle;

/// A single compilation job.
#[derive(Debug, Clone)]
pub struct CompileRequest {
    /// The aggregate source to compile
    pub entry: PathBuf,

    /// File name of the stylesheet being produced
    pub out_file: String,

    /// Sources to list in the source map, relative to the stylesheet
    pub sources: Vec<String>,

    /// Whether a source map is wanted
    pub source_map: bool,
}

/// Output of a successful compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledStyles {
    pub css: String,

    /// Source map JSON, when one was requested and produced
    pub source_map: Option<String>,
}

/// Compiles a style entry point into CSS.
pub trait StyleCompiler: Send + Sync {
    fn compile(&self, request: &CompileRequest) -> Result<CompiledStyles, CompileError>;
}

/// [`StyleCompiler`] backed by `grass`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GrassCompiler {
    style: OutputStyle,
}

impl GrassCompiler {
    pub fn new(style: OutputStyle) -> Self {
        Self { style }
    }
}

impl StyleCompiler for GrassCompiler {
    fn compile(&self, request: &CompileRequest) -> Result<CompiledStyles, CompileError> {
        let options = grass::Options::default().style(self.style.into());
        let css = grass::from_path(&request.entry, &options)?;

        // grass has no source map support; emit a file-level map so
        // devtools can at least list the contributing sources.
        let source_map = if request.source_map {
            Some(SourceMap::new(&request.out_file, &request.sources).to_json()?)
        } else {
            None
        };

        Ok(CompiledStyles { css, source_map })
    }
}

/// Source Map revision 3 document without segment mappings.
#[derive(Debug, Serialize)]
struct SourceMap<'a> {
    version: u8,
    file: &'a str,
    sources: &'a [String],
    names: [&'a str; 0],
    mappings: &'a str,
}

impl<'a> SourceMap<'a> {
    fn new(file: &'a str, sources: &'a [String]) -> Self {
        Self {
            version: 3,
            file,
            sources,
            names: [],
            mappings: "",
        }
    }

    fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Compilation errors.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// The style source itself is malformed.
    #[error("{}:{line}:{column}: {message}", file.display())]
    Syntax {
        file: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Source map error: {0}")]
    SourceMap(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl From<Box<grass::Error>> for CompileError {
    fn from(err: Box<grass::Error>) -> Self {
        let rendered = err.to_string();
        match (*err).kind() {
            grass::ErrorKind::ParseError { message, loc, .. } => CompileError::Syntax {
                file: PathBuf::from(loc.file.name()),
                line: loc.begin.line + 1,
                column: loc.begin.column + 1,
                message,
            },
            // grass shares the error behind an Arc
            grass::ErrorKind::IoError(e) => {
                CompileError::Io(std::io::Error::new(e.kind(), e.to_string()))
            }
            _ => CompileError::Other(rendered),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn request(entry: PathBuf, source_map: bool) -> CompileRequest {
        CompileRequest {
            entry,
            out_file: "my-lib.light.css".to_string(),
            sources: vec!["../../src/themes/light.theme.scss".to_string()],
            source_map,
        }
    }

    #[test]
    fn test_compiles_imports() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("_vars.scss"), "$accent: #ff0000;").unwrap();
        std::fs::write(
            dir.path().join("main.scss"),
            "@import '_vars.scss';\n.button { color: $accent; }\n",
        )
        .unwrap();

        let compiled = GrassCompiler::default()
            .compile(&request(dir.path().join("main.scss"), false))
            .unwrap();

        assert!(compiled.css.contains(".button"));
        assert!(compiled.css.contains("#ff0000"));
        assert!(compiled.source_map.is_none());
    }

    #[test]
    fn test_source_map_lists_sources() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("main.scss"), "a { color: red; }").unwrap();

        let compiled = GrassCompiler::default()
            .compile(&request(dir.path().join("main.scss"), true))
            .unwrap();

        let map: serde_json::Value = serde_json::from_str(&compiled.source_map.unwrap()).unwrap();
        assert_eq!(map["version"], 3);
        assert_eq!(map["file"], "my-lib.light.css");
        assert_eq!(map["sources"][0], "../../src/themes/light.theme.scss");
    }

    #[test]
    fn test_missing_entry_is_io_error() {
        let dir = tempdir().unwrap();

        let err = GrassCompiler::default()
            .compile(&request(dir.path().join("absent.scss"), false))
            .unwrap_err();

        match err {
            CompileError::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
            other => panic!("expected io error, got {other:?}"),
        }
    }

    #[test]
    fn test_syntax_error_has_location() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("broken.scss"), "a {\n  color: red;\n").unwrap();

        let err = GrassCompiler::default()
            .compile(&request(dir.path().join("broken.scss"), false))
            .unwrap_err();

        match err {
            CompileError::Syntax { line, message, .. } => {
                assert!(line >= 1);
                assert!(!message.is_empty());
            }
            other => panic!("expected syntax error, got {other:?}"),
        }
    }
}

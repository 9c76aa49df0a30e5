pub mod ast;
pub mod codegen;
pub mod config;
pub mod diagram;
pub mod inflect;
pub mod lexer;
pub mod model;
pub mod parser;
pub mod types;

use std::fs;
use std::io;
use std::path::Path;

use inflect::Pluralizer;
use model::{Model, ResolveError};
use parser::{ParseError, Parser};
use types::TypeMap;

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

#[derive(Debug, thiserror::Error)]
#[error("failed to write {path}: {source}")]
pub struct WriteError {
    pub path: String,
    #[source]
    pub source: io::Error,
}

/// Both generated artifacts of one compiler run.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifacts {
    pub model: String,
    pub diagram: String,
}

/// Compile schema source into the data-model module and the ER document.
pub fn compile(source: &str) -> Result<Artifacts, CompileError> {
    let document = Parser::new(source)?.parse()?;
    let pluralizer = Pluralizer::default();
    let model = Model::from_document(&document, &pluralizer)?;
    let types = TypeMap::default();
    Ok(Artifacts {
        model: codegen::generate(&model, &types),
        diagram: diagram::generate(&model, &types),
    })
}

/// Persist both artifacts, overwriting existing files.
pub fn write_artifacts(
    artifacts: &Artifacts,
    model_path: &Path,
    diagram_path: &Path,
) -> Result<(), WriteError> {
    for (path, text) in [
        (model_path, &artifacts.model),
        (diagram_path, &artifacts.diagram),
    ] {
        fs::write(path, text).map_err(|source| WriteError {
            path: path.display().to_string(),
            source,
        })?;
    }
    Ok(())
}

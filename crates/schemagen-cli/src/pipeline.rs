//! SDL source -> SQL and API schema artifacts

use schemagen_ast::ParseError;
use schemagen_graphql::{generate_sdl, GqlError};
use schemagen_ir::{IrError, RelationSet};
use schemagen_sql::{SqlCompiler, SqlError};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::OutputConfig;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Failed to read schema {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Invalid schema: {0}")]
    Ir(#[from] IrError),

    #[error("SQL generation failed: {0}")]
    Sql(#[from] SqlError),

    #[error("API schema generation failed: {0}")]
    Graphql(#[from] GqlError),
}

/// Which artifacts to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Targets {
    #[default]
    Both,
    SqlOnly,
    GraphqlOnly,
}

impl Targets {
    pub fn sql(self) -> bool {
        self != Targets::GraphqlOnly
    }

    pub fn graphql(self) -> bool {
        self != Targets::SqlOnly
    }
}

/// Generated artifacts and a summary of the compiled document.
#[derive(Debug, Clone)]
pub struct Artifacts {
    pub fingerprint: String,
    pub object_types: usize,
    pub enum_types: usize,
    pub relations: usize,
    pub sql: Option<Vec<String>>,
    pub graphql: Option<String>,
}

impl Artifacts {
    /// The DDL script: statements separated by a blank line, each ending in `;`.
    pub fn sql_script(&self) -> Option<String> {
        self.sql.as_ref().map(|statements| {
            statements
                .iter()
                .map(|s| format!("{};\n", s))
                .collect::<Vec<_>>()
                .join("\n")
        })
    }
}

/// Compile SDL text into the requested artifacts. Nothing is written.
pub fn compile(source: &str, targets: Targets) -> Result<Artifacts, PipelineError> {
    let schema = schemagen_ast::parse(source)?;
    debug!(definitions = schema.definitions.len(), "Parsed schema");

    let document = schema.to_ir()?;
    let relations = RelationSet::resolve(&document)?;
    debug!(relations = relations.len(), "Resolved relations");

    let sql = if targets.sql() {
        Some(SqlCompiler::new(&document, &relations).compile()?)
    } else {
        None
    };
    let graphql = if targets.graphql() {
        Some(generate_sdl(&document, &relations)?)
    } else {
        None
    };

    Ok(Artifacts {
        fingerprint: document.fingerprint(),
        object_types: document.object_types().len(),
        enum_types: document.enum_types().len(),
        relations: relations.len(),
        sql,
        graphql,
    })
}

/// Compile the schema file at `path`.
pub fn compile_file(path: &Path, targets: Targets) -> Result<Artifacts, PipelineError> {
    let source = std::fs::read_to_string(path).map_err(|source| PipelineError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    compile(&source, targets)
}

/// Write the generated artifacts into the output directory.
pub fn write(artifacts: &Artifacts, output: &OutputConfig) -> Result<Vec<PathBuf>, PipelineError> {
    let mut files = Vec::new();
    if let Some(script) = artifacts.sql_script() {
        files.push((output.sql_path(), script));
    }
    if let Some(sdl) = &artifacts.graphql {
        files.push((output.graphql_path(), sdl.clone()));
    }
    if files.is_empty() {
        return Ok(Vec::new());
    }

    std::fs::create_dir_all(&output.directory).map_err(|source| PipelineError::Write {
        path: output.directory.clone(),
        source,
    })?;

    let mut written = Vec::with_capacity(files.len());
    for (path, contents) in files {
        std::fs::write(&path, contents).map_err(|source| PipelineError::Write {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), "Wrote artifact");
        written.push(path);
    }
    Ok(written)
}

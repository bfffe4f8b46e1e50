//! schemagen: compile a GraphQL SDL data model into MySQL DDL and a GraphQL
//! API schema.

use anyhow::Context;
use clap::Parser;
use schemagen_cli::{compile_file, logging, write, Config, Targets};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file (defaults to ./schemagen.yaml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// SDL schema to compile
    #[arg(short, long)]
    schema: Option<PathBuf>,

    /// Directory the artifacts are written to
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Generate only the SQL DDL
    #[arg(long, conflicts_with = "graphql_only")]
    sql_only: bool,

    /// Generate only the GraphQL schema
    #[arg(long)]
    graphql_only: bool,

    /// Compile without writing any files
    #[arg(long)]
    check: bool,
}

impl Args {
    fn targets(&self) -> Targets {
        match (self.sql_only, self.graphql_only) {
            (true, _) => Targets::SqlOnly,
            (_, true) => Targets::GraphqlOnly,
            _ => Targets::Both,
        }
    }
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut config = Config::discover(args.config.as_deref()).context("loading configuration")?;
    if let Some(schema) = &args.schema {
        config.input.schema = schema.clone();
    }
    if let Some(dir) = &args.out_dir {
        config.output.directory = dir.clone();
    }

    config.apply_logging_env();
    logging::init();

    let artifacts = compile_file(&config.input.schema, args.targets())
        .with_context(|| format!("compiling {}", config.input.schema.display()))?;
    info!(
        fingerprint = %artifacts.fingerprint,
        object_types = artifacts.object_types,
        enum_types = artifacts.enum_types,
        relations = artifacts.relations,
        "Compiled schema"
    );

    if args.check {
        info!("Check passed, no files written");
        return Ok(());
    }

    let written = write(&artifacts, &config.output)?;
    info!(files = written.len(), "Done");
    Ok(())
}

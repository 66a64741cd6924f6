//! Get command implementation

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use std::process::ExitCode;
use typed_settings::{load_source, ConfigSource, Lookup, SettingsContext, SqliteSource, ValueKind};

use super::utils::print_value;

#[derive(Args)]
pub struct GetArgs {
    /// Section the setting lives in
    #[arg(value_name = "SECTION")]
    pub section: String,

    /// Property name within the section
    #[arg(value_name = "PROPERTY")]
    pub property: String,

    /// Settings file (TOML or YAML); discovered in --dir when omitted
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory to discover typed-settings.{toml,yaml,yml} in
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub dir: PathBuf,

    /// Read settings from a SQLite database instead of a file
    #[arg(long, value_name = "DB", conflicts_with = "config")]
    pub db: Option<PathBuf>,

    /// Table holding (section, property, value) rows
    #[arg(long, value_name = "TABLE")]
    pub table: Option<String>,

    /// Kind to convert the value to
    #[arg(short, long, value_name = "KIND", default_value = "string")]
    pub kind: ValueKind,

    /// Fail with an error instead of exiting 1 when the setting is missing
    #[arg(long)]
    pub required: bool,

    /// Print the value as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: GetArgs) -> Result<ExitCode> {
    let source: Box<dyn ConfigSource> = match &args.db {
        Some(db) => {
            let mut source = SqliteSource::new(db);
            if let Some(table) = &args.table {
                source = source.with_table(table)?;
            }
            Box::new(source)
        }
        None => Box::new(load_source(&args.dir, args.config.as_deref())?),
    };

    let ctx = SettingsContext::new(source);
    let resolver = ctx.resolver();

    if args.required {
        let value = resolver.require_value(&args.section, &args.property, args.kind)?;
        print_value(&value, args.json)?;
        return Ok(ExitCode::SUCCESS);
    }

    match resolver.get_value(&args.section, &args.property, args.kind) {
        Lookup::Found(value) => {
            print_value(&value, args.json)?;
            Ok(ExitCode::SUCCESS)
        }
        Lookup::Missing(_) => Ok(ExitCode::FAILURE),
    }
}

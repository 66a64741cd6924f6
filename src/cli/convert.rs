//! Convert command implementation

use anyhow::{Context, Result};
use clap::Args;
use std::process::ExitCode;
use typed_settings::{Delimiters, TypeConverterRegistry, ValueKind};

use super::utils::print_value;

#[derive(Args)]
pub struct ConvertArgs {
    /// Raw literal, e.g. 0x1F or 0:true;7:true
    #[arg(value_name = "VALUE", allow_hyphen_values = true)]
    pub value: String,

    /// Kind to convert to (string, bool, i32, u16-array, packed-byte, ...)
    #[arg(short, long, value_name = "KIND")]
    pub kind: ValueKind,

    /// Array element delimiter
    #[arg(long, value_name = "CHAR", default_value_t = ';')]
    pub delimiter: char,

    /// Delimiter between bit pairs
    #[arg(long, value_name = "CHAR", default_value_t = ';')]
    pub pair_delimiter: char,

    /// Delimiter between a bit position and its value
    #[arg(long, value_name = "CHAR", default_value_t = ':')]
    pub value_delimiter: char,

    /// Print the value as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: ConvertArgs) -> Result<ExitCode> {
    let registry = TypeConverterRegistry::with_delimiters(Delimiters {
        array: args.delimiter,
        pair: args.pair_delimiter,
        value: args.value_delimiter,
    });

    let value = registry
        .convert(&args.value, args.kind)
        .with_context(|| format!("Cannot convert '{}' to {}", args.value, args.kind))?;

    print_value(&value, args.json)?;
    Ok(ExitCode::SUCCESS)
}

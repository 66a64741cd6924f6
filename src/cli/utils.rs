//! Shared CLI utilities.

use anyhow::Result;
use typed_settings::Value;

/// Print `value` on stdout, either as its display form or as JSON.
pub fn print_value(value: &Value, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(value)?);
    } else {
        println!("{}", value);
    }
    Ok(())
}

use serde_json::{json, Value};

use crate::cli::OutputFormat;

/// Output a success message in the appropriate format
pub fn output_success(output_format: OutputFormat, message: &str, data: Value) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let response = json!({
                "success": true,
                "message": message,
                "data": data,
            });
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
            match data {
                Value::String(s) => println!("{}", s),
                Value::Null => {}
                other => println!("{}", serde_json::to_string_pretty(&other)?),
            }
        }
    }
    Ok(())
}

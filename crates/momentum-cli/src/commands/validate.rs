use std::io::Read;
use std::path::{Path, PathBuf};

use clap::Args;
use momentum_core::validator::parse_and_validate;
use momentum_core::{apply_defaults, RecoveryStrategy, Schema};
use serde_json::json;

#[derive(Args)]
pub struct ValidateArgs {
    /// Response file, or "-" for stdin
    pub input: PathBuf,
    /// Built-in schema: diet or workout
    #[arg(long, default_value = "diet")]
    pub schema: String,
    /// Print the payload with defaults filled in when the strategy allows it
    #[arg(long)]
    pub fill_defaults: bool,
}

fn read_input(input: &Path) -> std::io::Result<String> {
    if input.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        std::fs::read_to_string(input)
    }
}

pub fn run(args: ValidateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let schema = Schema::builtin(&args.schema)
        .ok_or_else(|| format!("unknown schema '{}' (expected diet or workout)", args.schema))?;
    let raw = read_input(&args.input)?;
    let (value, report) = parse_and_validate(&raw, &schema);

    let mut output = json!({ "report": report, "usable": report.is_usable() });
    if args.fill_defaults && report.strategy == RecoveryStrategy::FillDefaults {
        if let Some(mut value) = value {
            let inserted = apply_defaults(&mut value, &schema);
            output["filled"] = json!(inserted);
            output["payload"] = value;
        }
    }
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

use std::{fs, path::PathBuf};

use anyhow::Context;
use clap::Parser;
use inventory_api::openapi::ApiDoc;
use utoipa::OpenApi;

/// Writes the inventory API OpenAPI document to disk.
#[derive(Debug, Parser)]
#[command(name = "openapi-export", version)]
struct Args {
    /// Destination file
    #[arg(short, long, default_value = "openapi/inventory-api.json")]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let json = serde_json::to_string_pretty(&ApiDoc::openapi())?;

    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(&args.output, json)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    println!("OpenAPI spec written to {}", args.output.display());
    Ok(())
}

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mutscan_core::config::{DiagnoseConfig, ScanConfig};
use mutscan_core::diagnose_paths;
use mutscan_core::inventory::model::{ScanEvent, ScanFile};
use mutscan_core::inventory::summary::InventorySummary;
use mutscan_core::inventory::worker::ScanWorker;
use mutscan_core::metadata::reader::JsonSidecarReader;
use mutscan_core::ranges::{compress, compress_gaps, expand};
use mutscan_core::report::model::{DiagnosisBatch, ToolInfo};
use mutscan_core::report::render;

mod args;

use args::{Command, InventoryFormat, OutputFormat};

#[tokio::main]
async fn main() -> Result<()> {
    let args = args::Args::parse();
    init_tracing(args.verbose);

    let code = match args.command {
        Command::Inventory {
            paths,
            root,
            sidecar_suffix,
            min_tags,
            channel_capacity,
            format,
            out,
        } => {
            let config = ScanConfig {
                min_top_level_tags: min_tags,
                channel_capacity,
            };
            let reader = JsonSidecarReader::with_suffix(sidecar_suffix);
            let output = inventory(paths, root.as_deref(), reader, config, format).await?;
            emit(out.as_deref(), &output)?;
            0
        }
        Command::Diagnose {
            paths,
            repair_dir,
            window,
            format,
            out,
        } => {
            let config = DiagnoseConfig {
                scan_window_bytes: window,
            };

            let files = diagnose_paths(&paths, &config, repair_dir.as_deref());
            let batch = DiagnosisBatch::new(tool_info(), files);

            let output = match format {
                OutputFormat::Json => serde_json::to_string_pretty(&batch)? + "\n",
                OutputFormat::Text => render::render_diagnosis(&batch),
            };
            emit(out.as_deref(), &output)?;
            batch.exit_code
        }
        Command::Ranges { numbers, gaps } => {
            let line = if gaps {
                compress_gaps(&numbers)
            } else {
                compress(&numbers)
            };
            println!("{line}");
            0
        }
        Command::Expand { text } => {
            for n in expand(&text)? {
                println!("{n}");
            }
            0
        }
    };

    std::process::exit(code);
}

async fn inventory(
    paths: Vec<PathBuf>,
    root: Option<&Path>,
    reader: JsonSidecarReader,
    config: ScanConfig,
    format: InventoryFormat,
) -> Result<String> {
    let files: Vec<ScanFile> = paths
        .into_iter()
        .map(|p| ScanFile::under_root(p, root))
        .collect();

    let mut worker = ScanWorker::spawn(Arc::new(reader), config);
    worker.start(files).await?;

    let mut events = Vec::new();
    let mut lines = String::new();

    while let Some(event) = worker.next_event().await {
        if let ScanEvent::Progress {
            current,
            total,
            filename,
        } = &event
        {
            info!("[{current}/{total}] {filename}");
        }
        if matches!(format, InventoryFormat::Ndjson) {
            lines.push_str(&serde_json::to_string(&event)?);
            lines.push('\n');
        }

        let done = matches!(event, ScanEvent::Complete { .. });
        events.push(event);
        if done {
            break;
        }
    }
    worker.shutdown().await;

    let summary = InventorySummary::from_events(&events);
    Ok(match format {
        InventoryFormat::Ndjson => lines,
        InventoryFormat::Json => serde_json::to_string_pretty(&summary)? + "\n",
        InventoryFormat::Text => render::render_inventory(&summary),
    })
}

fn tool_info() -> ToolInfo {
    ToolInfo {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }
}

fn emit(out: Option<&Path>, output: &str) -> Result<()> {
    match out {
        Some(path) => std::fs::write(path, output)?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(output.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

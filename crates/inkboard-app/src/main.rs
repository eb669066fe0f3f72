//! Main application entry point (native).
//!
//! Usage: `inkboard [--config session.json] [--export DIR] [--png] SCRIPT`
//!
//! Replays the script, prints the resulting scene as JSON and, with
//! `--export`, writes the rasterized scene into `DIR`.

use inkboard_app::{App, AppConfig, ReplayScript};
use inkboard_core::SessionConfig;
use inkboard_render::ExportFormat;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    export_dir: Option<PathBuf>,
    png: bool,
    script: Option<PathBuf>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut parsed = Args::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args.next().ok_or("--config needs a path")?;
                parsed.config = Some(path.into());
            }
            "--export" => {
                let dir = args.next().ok_or("--export needs a directory")?;
                parsed.export_dir = Some(dir.into());
            }
            "--png" => parsed.png = true,
            other if other.starts_with("--") => return Err(format!("Unknown option {}", other)),
            _ => parsed.script = Some(arg.into()),
        }
    }
    Ok(parsed)
}

fn run(args: Args) -> Result<(), String> {
    let session = match &args.config {
        Some(path) => SessionConfig::load(path).map_err(|e| e.to_string())?,
        None => SessionConfig::default(),
    };
    let script_path = args.script.ok_or("No script given")?;
    let script = ReplayScript::load(&script_path).map_err(|e| e.to_string())?;

    let mut app = App::with_config(AppConfig {
        session,
        export_format: if args.png {
            ExportFormat::Png
        } else {
            ExportFormat::Jpeg
        },
        export_dir: args.export_dir.clone(),
        ..AppConfig::default()
    });
    app.run_script(&script);

    if args.export_dir.is_some() && app.export_to_dir().is_none() {
        return Err("Export failed".to_string());
    }

    let json = app.snapshot().to_json().map_err(|e| e.to_string())?;
    println!("{}", json);
    Ok(())
}

fn main() -> ExitCode {
    #[cfg(feature = "native")]
    env_logger::init();
    log::info!("Starting Inkboard");

    let result = parse_args(std::env::args().skip(1)).and_then(run);
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("inkboard: {}", e);
            ExitCode::FAILURE
        }
    }
}

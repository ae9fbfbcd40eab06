use std::io::Write;
use std::sync::atomic::Ordering;

use anyhow::Result;
use ap_core::config::PipelineConfig;
use clap::Parser;

pub mod cli;
pub mod pipeline;

use pipeline::{PipelineJob, Progress};

fn main() -> Result<()> {
    // 1. Parser CLI
    let cli = cli::Cli::parse();

    // 2. Initialiser le logging
    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Warn))
        .init();

    // 3. Charger la config, puis appliquer les overrides CLI
    let mut config = resolve_config(&cli)?;
    cli.apply_overrides(&mut config);

    // 4. Lancer la conversion
    let job = PipelineJob::new(&cli.image, config)?;
    let handle = pipeline::submit(job)?;

    // 5. Ctrl-C : annulation coopérative
    let cancel = handle.cancel_token();
    ctrlc::set_handler(move || {
        cancel.store(true, Ordering::Relaxed);
    })?;

    // 6. Suivi de progression (se termine quand le worker s'arrête)
    let mut stderr = std::io::stderr();
    for event in handle.progress().iter() {
        match event {
            Progress::Decoded { width, height } => {
                log::info!("Image décodée : {width}x{height}");
            }
            Progress::Sampling { row, rows } => {
                let _ = write!(stderr, "\rÉchantillonnage {row}/{rows}");
                let _ = stderr.flush();
            }
            Progress::Sampled(path) => {
                let _ = writeln!(stderr, "\rTexte : {}", path.display());
            }
            Progress::Rendering => {
                let _ = writeln!(stderr, "Rendu des glyphes...");
            }
            Progress::Encoded(path) => {
                let _ = writeln!(stderr, "Image : {}", path.display());
            }
        }
    }

    match handle.wait() {
        Ok(report) => {
            log::info!(
                "Terminé : {}x{} caractères",
                report.output.width,
                report.output.height
            );
            Ok(())
        }
        Err(e) if pipeline::is_cancelled(&e) => {
            eprintln!("\nConversion annulée.");
            std::process::exit(130);
        }
        Err(e) => Err(e),
    }
}

/// Config file if present, defaults otherwise.
fn resolve_config(cli: &cli::Cli) -> Result<PipelineConfig> {
    if cli.config.exists() {
        ap_core::config::load_config(&cli.config)
    } else {
        log::warn!(
            "Config introuvable : {}. Utilisation des défauts.",
            cli.config.display()
        );
        Ok(PipelineConfig::default())
    }
}

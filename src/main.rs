use anyhow::{Result, anyhow};
use clap::Parser;
use simdigest::adapters::{
    ConsoleOutputAdapter, CsvOutputAdapter, FileSystemAdapter, JsonOutputAdapter,
    ManifestAdapter, MultiAlgorithmHasher, PercentBarAdapter, ProgressBarAdapter,
};
use simdigest::cli::{Cli, OutputFormat};
use simdigest::domain::{DigestReport, ScanConfig};
use simdigest::ports::OutputPort;
use simdigest::services::BatchDigestService;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing_subscriber::EnvFilter;

type Service = BatchDigestService<FileSystemAdapter, MultiAlgorithmHasher, ProgressBarAdapter>;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();
    let config = args.to_scan_config();

    let cancel = Arc::new(AtomicBool::new(false));
    let handler_flag = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || handler_flag.store(true, Ordering::Relaxed)) {
        tracing::warn!(error = %e, "could not install Ctrl-C handler");
    }

    let service = BatchDigestService::new(
        FileSystemAdapter::new(),
        MultiAlgorithmHasher::new(),
        ProgressBarAdapter::new().with_quiet(args.quiet),
    )
    .with_cancel_flag(cancel);

    let output: Box<dyn OutputPort> = match (&args.output_format, &args.output_file) {
        (OutputFormat::Text, Some(path)) => {
            Box::new(ConsoleOutputAdapter::with_file(path).with_summary_only(args.summary_only))
        }
        (OutputFormat::Text, None) => {
            Box::new(ConsoleOutputAdapter::new().with_summary_only(args.summary_only))
        }
        (OutputFormat::Json, Some(path)) => Box::new(JsonOutputAdapter::with_file(path)),
        (OutputFormat::Json, None) => Box::new(JsonOutputAdapter::with_stdout()),
        (OutputFormat::Csv, Some(path)) => Box::new(CsvOutputAdapter::with_file(path)),
        (OutputFormat::Csv, None) => Box::new(CsvOutputAdapter::with_stdout()),
    };

    let outcome = match &args.check {
        Some(manifest_path) => check(&service, &config, manifest_path, &*output),
        None => hash(&service, &config, &args, &*output),
    };

    match outcome {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

fn hash(service: &Service, config: &ScanConfig, args: &Cli, output: &dyn OutputPort) -> Result<bool> {
    let report = match config.paths.as_slice() {
        [path] if path.is_file() => {
            let mut bar = if args.quiet {
                PercentBarAdapter::hidden()
            } else {
                PercentBarAdapter::new(path.display().to_string())
            };
            let digest = service.digest_file(path, &config.digest, Some(&mut bar))?;
            DigestReport::new(vec![digest], vec![])
        }
        _ => service.digest_files(config)?,
    };

    output.write_report(&report)?;

    if let Some(manifest_path) = &args.write_manifest {
        let manifests = ManifestAdapter::new();
        let manifest = manifests.create_manifest(&report, config.digest.algorithm);
        manifests.save(manifest_path, &manifest)?;
    }

    Ok(report.is_complete())
}

fn check(
    service: &Service,
    config: &ScanConfig,
    manifest_path: &std::path::Path,
    output: &dyn OutputPort,
) -> Result<bool> {
    let manifest = ManifestAdapter::new()
        .load(manifest_path)?
        .ok_or_else(|| anyhow!("manifest not found: {}", manifest_path.display()))?;

    let entries = service.verify(&manifest, config)?;
    output.write_verification(&entries)?;

    Ok(entries.iter().all(|entry| entry.outcome.is_ok()))
}

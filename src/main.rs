//! Edge Scanner - Main CLI Application
//!
//! Reads candidate addresses, probes them concurrently against a CDN trace
//! endpoint, optionally measures download throughput, and writes the ranked
//! survivors to CSV.

use clap::Parser;
use edge_scanner::{
    cli::Cli,
    config::{display_config_summary, load_config, validate_config, EnvManager, ValidationLevel},
    error::{AppError, ErrorReporter, Result},
    log_debug, log_info,
    logging::LoggerFactory,
    output::{ConsoleReport, CsvResultSink},
    source::read_candidates,
    RunOutcome, ScanPipeline, PKG_NAME, VERSION,
};
use std::{path::Path, process, sync::Arc, time::Instant};

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
        process::exit(99);
    }));

    let cli = Cli::parse();

    if let Err(message) = cli.validate() {
        let error = AppError::validation(message);
        ErrorReporter::new(cli.use_colors(), cli.verbose).report_error(&error);
        process::exit(error.exit_code());
    }

    let reporter = ErrorReporter::new(cli.use_colors(), cli.verbose || cli.debug);
    if let Err(e) = run_application(cli).await {
        reporter.report_error(&e);
        process::exit(e.exit_code());
    }
}

/// Main application logic
async fn run_application(cli: Cli) -> Result<()> {
    let started = Instant::now();

    if cli.debug {
        println!("{} v{}", PKG_NAME, VERSION);
        println!("Debug mode enabled");
        println!("{}", cli.get_config_summary());
    }

    let config = Arc::new(load_config(cli)?);
    let console = ConsoleReport::new(&config);

    if config.debug {
        println!("Configuration loaded successfully:");
        println!("{}", display_config_summary(&config));
        println!();
        for warning in EnvManager::validate_current_env() {
            eprintln!("{}", console.render_warning(&warning)?);
        }
    }

    for warning in validate_config(&config)? {
        if warning.level != ValidationLevel::Info || config.verbose || config.debug {
            eprintln!("{}", warning.format(config.enable_color));
        }
    }

    let factory = LoggerFactory::new((*config).clone());
    let logger = Arc::new(factory.create_logger("edgescan").await);
    log_debug!(logger, "Session {} started", factory.session_id());

    let candidates = read_candidates(Path::new(&config.input_file), config.default_port, &logger).await?;

    let pipeline = ScanPipeline::new(Arc::clone(&config), Arc::clone(&logger))?;
    match pipeline.run(candidates).await {
        RunOutcome::NoReachableAddresses { attempted, .. } => {
            println!("{}", console.render_no_results(attempted)?);
        }
        RunOutcome::Ranked(report) => {
            CsvResultSink::write(Path::new(&config.output_file), &report.results, config.enable_tls)?;
            log_info!(logger, "Wrote {} rows to {}", report.results.len(), config.output_file);
            println!("{}", console.render(&report)?);
            println!(
                "{}",
                console.render_completion(&config.output_file, started.elapsed().as_secs_f64())?
            );
        }
    }

    Ok(())
}

use std::process::ExitCode;

use anyhow::Context;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use robot_xml_loader::{
    Cli, Config, ConfigManager, ErrorReporter, FileDiscovery, LoaderError, Output, RobotLoader,
    VerbosityLevel,
};

fn main() -> ExitCode {
    let cli = Cli::parse_args();
    let verbosity = cli.verbosity();

    // RUST_LOG wins over the -v/-q mapping
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let reporter = ErrorReporter::new(verbosity);

    if let Err(message) = cli.validate() {
        eprintln!("Error: {}", message);
        return ExitCode::from(2);
    }

    let config = match ConfigManager::load_config(&cli) {
        Ok(config) => config,
        Err(error) => {
            reporter.report_config_error(&error);
            return ExitCode::from(2);
        }
    };
    debug!(?config, "effective configuration");

    let reporter = ErrorReporter::new(VerbosityLevel::from_flags(
        config.output.verbose,
        config.output.quiet,
    ));
    match run(&cli, &config) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(error) => {
            match error.downcast_ref::<LoaderError>() {
                Some(loader_error) => reporter.report_loader_error(loader_error),
                None => eprintln!("Error: {:#}", error),
            }
            ExitCode::from(2)
        }
    }
}

/// Load every discovered file; `Ok(true)` when all of them produced a message
fn run(cli: &Cli, config: &Config) -> anyhow::Result<bool> {
    let loader = RobotLoader::from_config(config)?;

    let discovery = FileDiscovery::from_config(&config.files)?;
    let files = discovery.discover_all(&cli.paths)?;
    info!(files = files.len(), "discovered robot files");

    let results = loader.process_files(&files)?;

    let verbosity = VerbosityLevel::from_flags(config.output.verbose, config.output.quiet);
    let output = Output::new(config.output.format.into(), verbosity);
    let rendered = output
        .render(&results)
        .context("failed to render results")?;
    print!("{}", rendered);

    Ok(results.all_loaded())
}

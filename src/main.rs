use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use clap::Parser;
use signal_hook::consts::{SIGINT, SIGTERM};
use tracing::error;

use kubetop::app;
use kubetop::config::Args;
use kubetop::logging;
use kubetop::provider::KubectlProvider;

fn main() -> ExitCode {
    let config = match Args::parse().into_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let _log_guard = match logging::init(config.log_file.as_deref(), config.verbose) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: unable to open log file: {e}");
            return ExitCode::FAILURE;
        }
    };

    let should_quit = Arc::new(AtomicBool::new(false));
    for signal in [SIGINT, SIGTERM] {
        if let Err(e) = signal_hook::flag::register(signal, Arc::clone(&should_quit)) {
            eprintln!("Error: unable to register signal handler: {e}");
            return ExitCode::FAILURE;
        }
    }

    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        app::restore_terminal();
        default_hook(info);
    }));

    let provider = Arc::new(KubectlProvider::new(config.kube.clone()));
    match app::run(config, provider, should_quit) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, fatal = e.is_fatal(), "dashboard exited");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

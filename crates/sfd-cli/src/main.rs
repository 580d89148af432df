use sfd_core::{logging, ConfigError};

mod cli;

#[tokio::main]
async fn main() {
    // Initialize logging as early as possible.
    if logging::init_logging().is_err() {
        logging::init_logging_stderr();
    }

    match cli::run_from_args().await {
        Ok(report) if report.all_succeeded() => {}
        Ok(_) => std::process::exit(1),
        Err(err) => {
            // Configuration errors are reported on stdout, next to the summary.
            println!("{}", err);
            let code = if err.downcast_ref::<ConfigError>().is_some() {
                2
            } else {
                1
            };
            std::process::exit(code);
        }
    }
}

use clap::Parser;
use log::{error, info};
use squegg::cli::Cli;
use squegg::error::{AppRunError, ConfigError};
use squegg::{init_logging, run};

fn main() -> Result<(), AppRunError> {
    let cli = Cli::parse();
    init_logging(cli.log_level())?;
    info!(concat!("Squegg ", env!("CARGO_PKG_VERSION")));

    match run(cli) {
        Err(AppRunError::ConfigError { source: ConfigError::CanNotLock { .. } }) => {
            error!("Another squegg session is already using this config file");
            Ok(())
        },
        Err(err) => {
            error!("{}", err);
            Err(err)
        },
        Ok(_) => Ok(()),
    }
}

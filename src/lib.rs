use std::env;
use log::{info, warn};
use tokio::spawn;
use tokio_util::sync::CancellationToken;

use crate::cli::Cli;
use crate::config::io::ConfigIO;
use crate::config::types::Config;
use crate::device::btle::BtleTransport;
use crate::device::run_loop::run_session;
use crate::device::session::DeviceSession;
use crate::error::AppRunError;
use crate::report::stdout_consumer;

pub mod cli;
pub mod config;
pub mod device;
pub mod error;
pub mod report;

pub fn init_logging(level: log::LevelFilter) -> Result<(), AppRunError> {
    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                humantime::format_rfc3339(std::time::SystemTime::now()),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr());

    if let Ok(log_file) = env::var("LOG_FILE") {
        dispatch = dispatch.chain(
            fern::log_file(log_file).map_err(|source| AppRunError::LogFile { source })?
        );
    }

    dispatch.apply()?;
    Ok(())
}

async fn cancel_on_interrupt(cancel: CancellationToken) {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for the interrupt signal: {}", err);
        return;
    }

    info!("Interrupted, shutting down");
    cancel.cancel();
}

async fn run_async(cli: Cli) -> Result<(), AppRunError> {
    let config_io = ConfigIO::new_sync(cli.config.as_deref())?;
    let mut locker = config_io.locker()?;
    let _lock_guard = locker.lock()?;

    let mut config = match config_io.read().await {
        Ok(config) => config,
        Err(err) if err.is_file_not_found_error() => {
            info!("Config file not found, using defaults");
            Config::default()
        },
        Err(err) => return Err(err.into()),
    };
    cli.apply_overrides(&mut config);
    config.validate()?;

    if cli.save_config {
        config_io.save(&config).await?;
    }

    let transport = BtleTransport::new().await?;
    let mut session = DeviceSession::new(transport, config.target_name.clone(), stdout_consumer(cli.output_format()));

    let cancel = CancellationToken::new();
    spawn(cancel_on_interrupt(cancel.clone()));

    let outcome = run_session(&mut session, &config.run_options(), cancel).await?;
    info!("Session ended: {:?}", outcome);
    Ok(())
}

pub fn run(cli: Cli) -> Result<(), AppRunError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|source| AppRunError::Runtime { source })?;

    runtime.block_on(run_async(cli))
}

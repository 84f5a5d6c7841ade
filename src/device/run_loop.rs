use std::time::Duration;
use log::{info, warn};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::device::session::DeviceSession;
use crate::device::transport::Transport;
use crate::error::{ConnectError, RunError};

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub discovery_timeout: Duration,
    pub connect_attempts: u32,
    pub retry_delay: Duration,
    pub poll_interval: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Cancelled,
}

enum Connected {
    Yes,
    Cancelled,
}

async fn connect_with_retry<T: Transport>(session: &mut DeviceSession<T>, options: &RunOptions, cancel: &CancellationToken) -> Result<Connected, ConnectError> {
    let attempts = options.connect_attempts.max(1);
    let mut attempt = 1;

    loop {
        let result = tokio::select! {
            _ = cancel.cancelled() => return Ok(Connected::Cancelled),
            result = session.connect(options.discovery_timeout) => result,
        };

        match result {
            Ok(_) => return Ok(Connected::Yes),
            Err(err) if attempt < attempts => {
                warn!("Connect attempt {}/{} failed: {}", attempt, attempts, err);
            },
            Err(err) => return Err(err),
        }

        attempt += 1;
        tokio::select! {
            _ = cancel.cancelled() => return Ok(Connected::Cancelled),
            _ = sleep(options.retry_delay) => {},
        }
    }
}

async fn keep_alive<T: Transport>(session: &DeviceSession<T>, options: &RunOptions, cancel: &CancellationToken) -> Result<RunOutcome, RunError> {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => return Ok(RunOutcome::Cancelled),
            _ = sleep(options.poll_interval) => {
                if !session.is_connected().await {
                    warn!("Connection lost");
                    return Err(RunError::ConnectionLost);
                }
            },
        }
    }
}

/// Connect, subscribe and keep the session alive until `cancel` fires.
///
/// Once anything needs cleaning up, teardown runs exactly once before returning. A connect that
/// fails on every attempt returns its error without a teardown.
pub async fn run_session<T: Transport>(session: &mut DeviceSession<T>, options: &RunOptions, cancel: CancellationToken) -> Result<RunOutcome, RunError> {
    match connect_with_retry(session, options, &cancel).await {
        Ok(Connected::Yes) => {},
        Ok(Connected::Cancelled) => {
            info!("Cancelled while connecting");
            session.teardown().await;
            return Ok(RunOutcome::Cancelled);
        },
        Err(err) => return Err(err.into()),
    }

    let result = match session.subscribe().await {
        Ok(_) => keep_alive(session, options, &cancel).await,
        Err(err) => Err(err.into()),
    };

    session.teardown().await;
    result
}

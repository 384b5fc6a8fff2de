use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_util::compat::TokioAsyncWriteCompatExt;
use tracing::debug;

use crate::config::ConnectionSettings;
use crate::db::connection::{build_config, describe_target};
use crate::db::executor::SqlClient;
use crate::error::{AppError, ErrorKind};

/// Connect to SQL Server using resolved settings.
///
/// # Errors
///
/// Returns a `Connection` error if DNS resolution, TCP connect or login fails,
/// or if the configured timeout elapses during connect or login. A timeout of
/// zero disables the limit.
pub async fn connect(settings: &ConnectionSettings) -> Result<SqlClient> {
    let config =
        build_config(settings).map_err(|err| AppError::new(ErrorKind::Config, err.to_string()))?;
    debug!(target = %describe_target(settings), "connecting");

    let tcp = bounded(settings.timeout_ms, "Connection", TcpStream::connect(config.get_addr()))
        .await?
        .map_err(|err| AppError::new(ErrorKind::Connection, err.to_string()))?;
    tcp.set_nodelay(true)?;

    let client = bounded(
        settings.timeout_ms,
        "Login",
        tiberius::Client::connect(config, tcp.compat_write()),
    )
    .await?
    .map_err(|err| AppError::new(ErrorKind::Connection, err.to_string()))?;
    Ok(client)
}

async fn bounded<F: Future>(timeout_ms: u64, stage: &str, fut: F) -> Result<F::Output> {
    if timeout_ms == 0 {
        return Ok(fut.await);
    }
    timeout(Duration::from_millis(timeout_ms), fut)
        .await
        .map_err(|_| {
            AppError::new(
                ErrorKind::Connection,
                format!("{} timed out after {} ms", stage, timeout_ms),
            )
            .into()
        })
}

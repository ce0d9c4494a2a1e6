use tokio::signal::unix::{SignalKind, signal};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Cancel the returned token on the first SIGTERM or SIGINT.
///
/// Handles waiting on a child forward the termination to it and keep waiting,
/// so the launcher still exits with the child's code.
pub fn install_shutdown_handler() -> std::io::Result<CancellationToken> {
    let token = CancellationToken::new();
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    let cancel = token.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = sigterm.recv() => info!(target: "dtrain.launch", "received SIGTERM; forwarding to supervised process"),
            _ = sigint.recv() => info!(target: "dtrain.launch", "received SIGINT; forwarding to supervised process"),
        }
        cancel.cancel();
    });

    Ok(token)
}

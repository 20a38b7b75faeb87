//! Comms subsystem: external I/O channels.
//!
//! There is one channel, the axum HTTP server. [`start`] builds it from
//! config and returns its task handle; the shared [`CancellationToken`] stops
//! it.

pub mod axum_channel;

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::Config;
use crate::error::AppError;
use crate::subsystems::agents::Assistant;
use crate::subsystems::ui::load_background_image;

pub use axum_channel::AxumChannel;

/// Spawn the HTTP channel.
///
/// Synchronous: returns as soon as the task is spawned. If the channel
/// exits with an error the `shutdown` token is cancelled so the caller's
/// wait loop unblocks.
pub fn start(
    config: &Config,
    assistant: Arc<Assistant>,
    shutdown: CancellationToken,
) -> JoinHandle<Result<(), AppError>> {
    let background = config
        .ui
        .background_image
        .as_deref()
        .map(load_background_image)
        .unwrap_or_default();
    let has_background = !background.is_empty();

    let channel = AxumChannel::new("axum0", config.comms.axum_channel.bind.clone(), assistant, background);
    info!(
        channel_id = channel.id(),
        bind = %config.comms.axum_channel.bind,
        background = has_background,
        "loading axum channel"
    );
    tokio::spawn(async move {
        let result = channel.run(shutdown.clone()).await;
        if result.is_err() {
            shutdown.cancel();
        }
        result
    })
}

//! Pipeline coordinator: spawns the reader and sampler and owns shutdown.
//!
//! The coordinator holds the single [`CancellationToken`] both tasks observe
//! at every blocking boundary. Cancelling it makes both loops exit within one
//! tick or retry interval, close the connection, and flush the sink. If the
//! sampler dies on a sink error it cancels the token itself, so a dead sink
//! winds the reader down too instead of collecting data nobody records.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncWrite;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::Result;
use crate::config::Endpoint;
use crate::decode::AxisSelection;
use crate::frame::FrameBuffer;
use crate::reader::SocketReader;
use crate::writer::{SampleWriter, TICK_PERIOD};

/// Handle to a running reader/sampler pair.
///
/// Dropping the pipeline without calling [`Pipeline::shutdown`] cancels both
/// tasks but does not wait for them.
pub struct Pipeline {
    cancel: CancellationToken,
    reader: JoinHandle<()>,
    sampler: JoinHandle<Result<()>>,
}

impl Pipeline {
    /// Spawn the reader and sampler against a fresh frame buffer, sampling at
    /// the default 500 ms cadence.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<W>(endpoint: Endpoint, selection: AxisSelection, sink: W) -> Self
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        Self::spawn_with_period(endpoint, selection, sink, TICK_PERIOD)
    }

    /// Spawn with an explicit sampling period.
    pub fn spawn_with_period<W>(
        endpoint: Endpoint,
        selection: AxisSelection,
        sink: W,
        period: Duration,
    ) -> Self
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let buffer = Arc::new(FrameBuffer::new());

        let reader = SocketReader::new(endpoint, Arc::clone(&buffer), cancel.clone());
        let reader = tokio::spawn(reader.run());

        let sampler_cancel = cancel.clone();
        let sampler = SampleWriter::new(buffer, selection, sink, cancel.clone())
            .with_period(period);
        let sampler = tokio::spawn(async move {
            let result = sampler.run().await;
            if result.is_err() {
                // Nothing left to record; take the reader down as well.
                sampler_cancel.cancel();
            }
            result
        });

        info!("Pipeline started");
        Self { cancel, reader, sampler }
    }

    /// Token observed by both tasks. Cancelling it is equivalent to calling
    /// [`Pipeline::shutdown`], minus the join; it also fires when the
    /// pipeline stops on its own after a sink failure.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Cancel both tasks and wait for them to finish.
    ///
    /// Returns the sampler's result so a sink failure reaches the operator.
    pub async fn shutdown(mut self) -> Result<()> {
        info!("Shutting down pipeline");
        self.cancel.cancel();

        if let Err(e) = (&mut self.reader).await {
            warn!("Reader task panicked: {e}");
        }

        match (&mut self.sampler).await {
            Ok(result) => result,
            Err(e) => {
                warn!("Sampler task panicked: {e}");
                Ok(())
            }
        }
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        // Cancel on drop so an abandoned pipeline does not keep its tasks
        // reading and writing forever.
        self.cancel.cancel();
    }
}

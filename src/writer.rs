//! Sampler task: periodic snapshot, decode, and row append.
//!
//! On a fixed cadence the sampler copies the shared frame buffer, decodes it,
//! and appends one tab-separated row to the output sink, flushing after every
//! row so a forced stop loses nothing already written. A header row naming
//! every column goes out once before the first tick. A tick whose snapshot
//! cannot be decoded is skipped whole; no partial row ever reaches the sink.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::time::{Instant, MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace};

use crate::decode::{self, AxisSelection, TelemetrySample};
use crate::frame::FrameBuffer;
use crate::{Result, TelemetryError};

/// Default cadence of the sampler loop.
pub const TICK_PERIOD: Duration = Duration::from_millis(500);

/// Header metric names, in row order.
const METRIC_NAMES: [&str; 4] = ["AxisVelocity", "AxisCurrent", "AxisTorque", "AxisTemperature"];

/// Task that periodically samples the frame buffer into the output sink.
pub struct SampleWriter<W> {
    buffer: Arc<FrameBuffer>,
    selection: AxisSelection,
    sink: W,
    period: Duration,
    cancel: CancellationToken,
}

impl<W: AsyncWrite + Unpin + Send> SampleWriter<W> {
    pub fn new(
        buffer: Arc<FrameBuffer>,
        selection: AxisSelection,
        sink: W,
        cancel: CancellationToken,
    ) -> Self {
        Self { buffer, selection, sink, period: TICK_PERIOD, cancel }
    }

    /// Override the default 500 ms tick period.
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Run until cancelled or the sink fails.
    ///
    /// A sink failure is returned to the caller so the coordinator can wind
    /// the whole pipeline down instead of silently dropping rows.
    pub async fn run(mut self) -> Result<()> {
        let started = Instant::now();
        debug!("Sampler started ({} axes, {:?} period)", self.selection.len(), self.period);

        let header = format_header(&self.selection);
        self.append(&header).await?;

        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first interval tick completes immediately; consume it so every
        // row waits a full period.
        ticker.tick().await;

        let mut rows: u64 = 0;
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let snap = self.buffer.snapshot();
            let sample = match decode::decode(&snap, &self.selection, started.elapsed()) {
                Ok(sample) => sample,
                Err(e) => {
                    debug!("Skipping tick: {e}");
                    continue;
                }
            };

            let row = format_row(&sample);
            if let Err(e) = self.append(&row).await {
                error!("Output sink failed, stopping sampler: {e}");
                return Err(e);
            }
            rows += 1;
            trace!("Wrote row {rows}");
        }

        // One last flush so a cancel-triggered exit leaves nothing buffered.
        self.sink.flush().await.map_err(|e| TelemetryError::sink_error("flush on shutdown", e))?;
        debug!("Sampler stopped after {rows} rows");
        Ok(())
    }

    async fn append(&mut self, line: &str) -> Result<()> {
        self.sink
            .write_all(line.as_bytes())
            .await
            .map_err(|e| TelemetryError::sink_error("append row", e))?;
        self.sink.flush().await.map_err(|e| TelemetryError::sink_error("flush row", e))
    }
}

/// Header row: `Time` then one `{Metric}_{axis}` column per selected axis for
/// each metric, matching [`format_row`]'s value order exactly.
pub fn format_header(selection: &AxisSelection) -> String {
    let mut header = String::from("Time");
    for metric in METRIC_NAMES {
        for axis in selection.indices() {
            header.push('\t');
            header.push_str(&format!("{metric}_{axis}"));
        }
    }
    header.push('\n');
    header
}

/// One output row: elapsed seconds, per-axis velocity, current, torque
/// (4-decimal floats), integer temperature, and the direction token when the
/// controller reported one.
pub fn format_row(sample: &TelemetrySample) -> String {
    let mut row = format!("{:.4}", sample.elapsed.as_secs_f64());
    for velocity in &sample.velocities {
        row.push_str(&format!("\t{velocity:.4}"));
    }
    for current in &sample.currents {
        row.push_str(&format!("\t{current:.4}"));
    }
    for torque in &sample.torques {
        row.push_str(&format!("\t{torque:.4}"));
    }
    for temperature in &sample.temperatures {
        row.push_str(&format!("\t{temperature}"));
    }
    if let Some(direction) = sample.direction {
        row.push('\t');
        row.push_str(direction.as_str());
    }
    row.push('\n');
    row
}

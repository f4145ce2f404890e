//! Continuous TCP telemetry logging for industrial robot controllers.
//!
//! Axislog reads the controller's fixed-layout binary frame over TCP, decodes
//! per-axis motion data (velocity, current, torque, temperature) plus a
//! direction flag from known byte offsets, and appends one tab-separated row
//! per sampling tick to an output file.
//!
//! # Architecture
//!
//! - **Reader task**: owns the TCP connection, continuously refills a shared
//!   fixed-size [`FrameBuffer`], and reconnects on failure.
//! - **Sampler task**: every tick, atomically snapshots the buffer, decodes
//!   it into a [`TelemetrySample`], and appends a formatted row to the sink.
//! - **[`Pipeline`]**: spawns both tasks and coordinates cooperative shutdown
//!   through a single cancellation token.
//!
//! The buffer is the only shared state. Its contents are reachable solely
//! through lock-serialized full-copy operations, so the sampler never sees a
//! torn frame and the reader is never blocked by decoding or disk I/O.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use axislog::{Config, Pipeline};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("Config.json")?;
//!     let sink = tokio::fs::File::create("Output.txt").await?;
//!
//!     let pipeline = Pipeline::spawn(config.endpoint(), config.axis_selection()?, sink);
//!
//!     tokio::signal::ctrl_c().await?;
//!     pipeline.shutdown().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod decode;
mod error;
pub mod frame;
pub mod pipeline;
pub mod reader;
pub mod writer;

pub use config::{Config, Endpoint};
pub use decode::{AxisSelection, Direction, MAX_AXES, MIN_FRAME_LEN, TelemetrySample, decode};
pub use error::{Result, TelemetryError};
pub use frame::{FRAME_LEN, FrameBuffer};
pub use pipeline::Pipeline;
pub use reader::SocketReader;
pub use writer::{SampleWriter, TICK_PERIOD, format_header, format_row};

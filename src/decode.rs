//! Wire layout of the controller frame and the snapshot decoder.
//!
//! The controller emits one fixed-layout binary message of up to
//! [`FRAME_LEN`](crate::frame::FRAME_LEN) bytes. Per-axis metrics live in
//! four consecutive blocks of twelve little-endian 4-byte slots each, and a
//! direction word sits at a fixed offset past them:
//!
//! | field       | type | offset          |
//! |-------------|------|-----------------|
//! | velocity    | f32  | 100 + (a-1)\*4  |
//! | temperature | i32  | 148 + (a-1)\*4  |
//! | torque      | f32  | 196 + (a-1)\*4  |
//! | current     | f32  | 244 + (a-1)\*4  |
//! | direction   | i32  | 510             |
//!
//! Decoding is pure: the same snapshot and selection always produce the same
//! sample. Every field read is bounds-checked, so a short snapshot fails with
//! [`TelemetryError::InsufficientFrame`] instead of reading past the end.

use std::fmt;
use std::time::Duration;

use crate::{Result, TelemetryError};

/// Base offset of the motor velocity block.
const VELOCITY_ADDR: usize = 100;
/// Base offset of the motor temperature block.
const TEMPERATURE_ADDR: usize = 148;
/// Base offset of the torque block.
const TORQUE_ADDR: usize = 196;
/// Base offset of the current block.
const CURRENT_ADDR: usize = 244;
/// Offset of the direction word, independent of axis.
const DIRECTION_ADDR: usize = 510;

/// Raw temperatures arrive in Kelvin; rows carry Celsius.
const KELVIN_OFFSET: i32 = 273;
/// Bytes between consecutive axis slots within a block.
const AXIS_STRIDE: usize = 4;

/// Highest addressable axis index. Each metric block is 48 bytes wide, so
/// axis 13 of one block would alias slot 1 of the next.
pub const MAX_AXES: u16 = 12;

/// Shortest frame that covers every decoded offset, including the direction
/// word. Shorter snapshots are rejected wholesale.
pub const MIN_FRAME_LEN: usize = 570;

/// Ordered set of distinct 1-based axis indices to decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AxisSelection(Vec<u16>);

impl AxisSelection {
    /// Select every axis the wire layout carries (1 through 12).
    pub fn all() -> Self {
        Self((1..=MAX_AXES).collect())
    }

    /// Validate an explicit selection.
    ///
    /// Rejects an empty list, index zero, duplicates, and indices past the
    /// last slot of a metric block.
    pub fn new(axes: Vec<u16>) -> Result<Self> {
        if axes.is_empty() {
            return Err(TelemetryError::config_error("axis selection is empty"));
        }

        let mut seen = [false; MAX_AXES as usize + 1];
        for &axis in &axes {
            if axis == 0 {
                return Err(TelemetryError::InvalidAxis {
                    axis,
                    reason: "axis indices are 1-based".into(),
                });
            }
            if axis > MAX_AXES {
                return Err(TelemetryError::InvalidAxis {
                    axis,
                    reason: format!("wire layout carries {MAX_AXES} axes per metric block"),
                });
            }
            if seen[axis as usize] {
                return Err(TelemetryError::InvalidAxis { axis, reason: "duplicate index".into() });
            }
            seen[axis as usize] = true;
        }

        Ok(Self(axes))
    }

    /// Selected indices, in selection order.
    pub fn indices(&self) -> &[u16] {
        &self.0
    }

    /// Number of selected axes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// A validated selection is never empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Rotation direction reported by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Right,
    Left,
}

impl Direction {
    /// Map the wire code to a direction. Codes other than 1 and 2 mean the
    /// controller reported nothing usable.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(Direction::Right),
            2 => Some(Direction::Left),
            _ => None,
        }
    }

    /// Token written to the output row.
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Right => "right",
            Direction::Left => "left",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One decoded telemetry sample, produced per sampler tick and immediately
/// consumed by the writer.
///
/// The four per-axis vectors always have the selection's length, in the
/// selection's order.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetrySample {
    /// Time since the sampler started.
    pub elapsed: Duration,
    pub velocities: Vec<f32>,
    pub currents: Vec<f32>,
    pub torques: Vec<f32>,
    /// Celsius, already adjusted from the raw Kelvin reading.
    pub temperatures: Vec<i32>,
    pub direction: Option<Direction>,
}

/// Decode a frame snapshot into a structured sample.
///
/// Pure over the snapshot bytes: `elapsed` is threaded through untouched so
/// callers control the clock. Returns [`TelemetryError::InsufficientFrame`]
/// when the snapshot cannot cover every decoded offset.
pub fn decode(
    snapshot: &[u8],
    selection: &AxisSelection,
    elapsed: Duration,
) -> Result<TelemetrySample> {
    if snapshot.len() < MIN_FRAME_LEN {
        return Err(TelemetryError::InsufficientFrame {
            actual: snapshot.len(),
            required: MIN_FRAME_LEN,
        });
    }

    let mut velocities = Vec::with_capacity(selection.len());
    let mut currents = Vec::with_capacity(selection.len());
    let mut torques = Vec::with_capacity(selection.len());
    let mut temperatures = Vec::with_capacity(selection.len());

    for &axis in selection.indices() {
        let slot = (axis as usize - 1) * AXIS_STRIDE;
        velocities.push(read_f32(snapshot, VELOCITY_ADDR + slot)?);
        currents.push(read_f32(snapshot, CURRENT_ADDR + slot)?);
        torques.push(read_f32(snapshot, TORQUE_ADDR + slot)?);
        temperatures.push(read_i32(snapshot, TEMPERATURE_ADDR + slot)? - KELVIN_OFFSET);
    }

    // One direction word per frame, not per axis.
    let direction = Direction::from_code(read_i32(snapshot, DIRECTION_ADDR)?);

    Ok(TelemetrySample { elapsed, velocities, currents, torques, temperatures, direction })
}

fn read_f32(data: &[u8], offset: usize) -> Result<f32> {
    let bytes = data
        .get(offset..offset + 4)
        .ok_or(TelemetryError::InsufficientFrame { actual: data.len(), required: offset + 4 })?;

    Ok(f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

fn read_i32(data: &[u8], offset: usize) -> Result<i32> {
    let bytes = data
        .get(offset..offset + 4)
        .ok_or(TelemetryError::InsufficientFrame { actual: data.len(), required: offset + 4 })?;

    Ok(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

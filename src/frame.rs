//! Shared frame buffer between the socket reader and the sampler.
//!
//! The controller sends one coherent composite record per read: dozens of
//! fields at fixed offsets. A sampler must never observe a buffer whose first
//! half reflects one network read and whose second half reflects another, so
//! the contents are only reachable through two operations that copy under an
//! internal lock. No raw mutable view ever crosses the task boundary.

use std::sync::{Mutex, PoisonError};

use crate::{Result, TelemetryError};

/// Wire frame size of the controller's telemetry message.
pub const FRAME_LEN: usize = 3600;

/// Fixed-size byte buffer shared between the reader and sampler tasks.
///
/// The reader is the sole writer and the sampler the sole reader. The length
/// is fixed at construction and never changes.
#[derive(Debug)]
pub struct FrameBuffer {
    data: Mutex<Box<[u8]>>,
    len: usize,
}

impl FrameBuffer {
    /// Create a zeroed buffer of the standard wire frame size.
    pub fn new() -> Self {
        Self::with_len(FRAME_LEN)
    }

    /// Create a zeroed buffer with a non-standard length.
    ///
    /// Used to exercise short-frame handling; production code uses [`FrameBuffer::new`].
    pub fn with_len(len: usize) -> Self {
        Self { data: Mutex::new(vec![0u8; len].into_boxed_slice()), len }
    }

    /// Fixed length of the buffer in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the buffer has zero length.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Copy `bytes` into the buffer at `offset`, bounds-checked.
    ///
    /// The lock is held for the copy only, never across decode or I/O.
    pub fn write(&self, offset: usize, bytes: &[u8]) -> Result<()> {
        match offset.checked_add(bytes.len()) {
            Some(end) if end <= self.len => {
                let mut data = self.lock();
                data[offset..end].copy_from_slice(bytes);
                Ok(())
            }
            _ => Err(TelemetryError::OutOfBounds {
                offset,
                len: bytes.len(),
                frame_len: self.len,
            }),
        }
    }

    /// Atomically copy the full current contents.
    ///
    /// The returned snapshot always has the fixed frame length and reflects a
    /// state between two completed writes, never a partially applied one.
    pub fn snapshot(&self) -> Vec<u8> {
        self.lock().to_vec()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Box<[u8]>> {
        // The lock only ever guards a memcpy, so a poisoned guard still holds
        // a complete frame and can be recovered.
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn snapshot_reflects_write() {
        let buffer = FrameBuffer::new();
        buffer.write(100, &[1, 2, 3, 4]).expect("in-bounds write");

        let snap = buffer.snapshot();
        assert_eq!(snap.len(), FRAME_LEN);
        assert_eq!(&snap[100..104], &[1, 2, 3, 4]);
        assert!(snap[..100].iter().all(|&b| b == 0));
    }

    #[test]
    fn write_past_end_is_rejected() {
        let buffer = FrameBuffer::new();

        let err = buffer.write(FRAME_LEN - 2, &[0; 4]).unwrap_err();
        assert!(matches!(err, TelemetryError::OutOfBounds { offset, len, frame_len }
            if offset == FRAME_LEN - 2 && len == 4 && frame_len == FRAME_LEN));

        // Offset arithmetic must not wrap around.
        let err = buffer.write(usize::MAX, &[0; 4]).unwrap_err();
        assert!(matches!(err, TelemetryError::OutOfBounds { .. }));
    }

    #[test]
    fn short_buffer_keeps_its_length() {
        let buffer = FrameBuffer::with_len(10);
        assert_eq!(buffer.len(), 10);
        assert_eq!(buffer.snapshot().len(), 10);
    }

    /// Under sustained concurrent full-frame writes, every snapshot must be a
    /// single completed write, never a torn mix of two.
    #[test]
    fn snapshots_are_never_torn() {
        let buffer = Arc::new(FrameBuffer::new());
        let stop = Arc::new(AtomicBool::new(false));

        let writer = {
            let buffer = Arc::clone(&buffer);
            let stop = Arc::clone(&stop);
            std::thread::spawn(move || {
                let patterns = [vec![0xAAu8; FRAME_LEN], vec![0x55u8; FRAME_LEN]];
                let mut i = 0usize;
                while !stop.load(Ordering::Relaxed) {
                    buffer.write(0, &patterns[i % 2]).expect("full-frame write");
                    i += 1;
                }
            })
        };

        for _ in 0..2000 {
            let snap = buffer.snapshot();
            assert_eq!(snap.len(), FRAME_LEN);
            let first = snap[0];
            assert!(
                snap.iter().all(|&b| b == first),
                "torn snapshot: starts with {first:#x} but is not uniform"
            );
        }

        stop.store(true, Ordering::Relaxed);
        writer.join().expect("writer thread");
    }
}

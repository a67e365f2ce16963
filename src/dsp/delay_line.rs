//! # Delay Line (Ring Buffer with Two Cursors)
//!
//! A delay line stores audio samples and plays them back a fixed number of
//! samples later. Unlike a modulated delay (chorus, flanger) this one only
//! ever delays by a whole number of samples, so instead of computing a read
//! position from the write position every sample, it keeps two cursors that
//! move in lockstep:
//!
//! ```text
//!            read_pos              write_pos
//!               │                      │
//!   ┌───┬───┬───▼───┬───┬───┬───┬───┬──▼──┬───┬───┐
//!   │   │   │ old   │   │   │   │   │ new │   │   │   (wraps around)
//!   └───┴───┴───────┴───┴───┴───┴───┴─────┴───┴───┘
//!               ◄──── current_delay ────►
//! ```
//!
//! Every processed sample writes at `write_pos`, reads at `read_pos`, then
//! advances both by one. The distance between them, modulo the capacity,
//! is always the delay currently in effect.
//!
//! Changing the delay moves only the read cursor ([`DelayLine::retime`]).
//! That jump is audible as a click unless the caller masks it with a
//! crossfade; see the engine module for that protocol.

use std::num::NonZeroUsize;

use crate::error::EngineError;

/// A fixed-capacity ring buffer with independent write and read cursors.
///
/// The buffer is allocated once, in [`DelayLine::new`], and never resized,
/// so nothing here allocates while audio is running.
pub struct DelayLine {
    /// Sample memory. Starts out silent.
    buffer: Vec<f32>,

    /// Where the next input sample is stored.
    write_pos: usize,

    /// Where the next output sample is taken from.
    read_pos: usize,

    /// The delay actually in effect, in samples. Always `< buffer.len()`.
    current_delay: usize,
}

impl DelayLine {
    /// Create a silent delay line holding `capacity` samples.
    ///
    /// This is the only allocation the engine ever makes. It goes through
    /// `try_reserve_exact` so that an out-of-memory condition surfaces as a
    /// construction failure instead of aborting the host.
    pub fn new(capacity: NonZeroUsize) -> Result<Self, EngineError> {
        let capacity = capacity.get();
        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(capacity)
            .map_err(|source| EngineError::Allocation { capacity, source })?;
        buffer.resize(capacity, 0.0);

        Ok(Self {
            buffer,
            write_pos: 0,
            read_pos: 0,
            current_delay: 0,
        })
    }

    /// Number of samples the ring can hold.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// The delay in effect, in samples.
    pub fn current_delay(&self) -> usize {
        self.current_delay
    }

    /// Store `input` at the write cursor, fetch the sample under the read
    /// cursor, then advance both cursors by one.
    ///
    /// The write happens first. With a zero-sample delay both cursors point
    /// at the same slot, so the sample just written comes straight back out.
    #[inline]
    pub fn write_then_read(&mut self, input: f32) -> f32 {
        self.buffer[self.write_pos] = input;
        let output = self.buffer[self.read_pos];
        self.advance();
        output
    }

    /// Store `input` and advance, without reading. Used by the zero-delay
    /// bypass, which keeps the history populated so a later delay request
    /// has past samples to play.
    #[inline]
    pub fn write(&mut self, input: f32) {
        self.buffer[self.write_pos] = input;
        self.advance();
    }

    /// Move the read cursor so the cursor separation becomes `new_delay`.
    ///
    /// ```text
    /// read_pos = (read_pos + capacity + current_delay - new_delay) % capacity
    /// ```
    ///
    /// Adding `capacity` first keeps the `usize` arithmetic from underflowing
    /// when the delay grows. Values past the end of the ring are clamped to
    /// `capacity - 1`.
    pub fn retime(&mut self, new_delay: usize) {
        let capacity = self.capacity();
        let new_delay = new_delay.min(capacity - 1);
        self.read_pos = (self.read_pos + capacity + self.current_delay - new_delay) % capacity;
        self.current_delay = new_delay;
    }

    /// Distance from the read cursor to the write cursor, modulo capacity.
    ///
    /// Equal to [`current_delay`](Self::current_delay) at every point
    /// between samples.
    pub fn separation(&self) -> usize {
        let capacity = self.capacity();
        (self.write_pos + capacity - self.read_pos) % capacity
    }

    /// Silence the sample memory.
    ///
    /// Cursors and the current delay are kept, so the delay (and whatever
    /// latency was reported for it) stays in effect across a host reset.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
    }

    #[inline]
    fn advance(&mut self) {
        let capacity = self.capacity();
        self.write_pos = (self.write_pos + 1) % capacity;
        self.read_pos = (self.read_pos + 1) % capacity;
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────

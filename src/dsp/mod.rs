//! # DSP Building Blocks
//!
//! - **`delay_line`**: ring buffer with a write and a read cursor whose
//!   distance is the delay in effect.
//!
//! - **`fade`**: linear gain ramps that hide the jump when the read cursor
//!   moves.
//!
//! - **`profile`**: per-variant settings (buffer size, fade length, how and
//!   when latency is reported).
//!
//! - **`engine`**: the per-cycle state machine tying the three together.

pub mod delay_line;
pub mod engine;
pub mod fade;
pub mod profile;

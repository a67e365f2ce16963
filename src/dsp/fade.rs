//! # Linear Fade Ramps
//!
//! Moving a delay line's read cursor makes the output jump from one point
//! in the recorded history to another. Unless both points happen to hold
//! the same value, that jump is a step in the waveform, which the ear hears
//! as a click.
//!
//! The cure is to never jump at full volume: ramp the output down to
//! silence, jump while silent, then ramp back up.
//!
//! ```text
//! gain
//! 1.0 ─────╲                 ╱─────────
//!           ╲               ╱
//!            ╲             ╱
//! 0.0         ╲___________╱
//!          │  fade out │ fade in │
//!                      ▲
//!                   retime
//! ```
//!
//! A fade out over `len` samples uses `gain = (len - pos) / len`, so the
//! first sample is at full level and the last is one step above silence.
//! A fade in uses `gain = pos / len`, starting at exact silence.
//!
//! At typical sample rates 16 or 32 samples is well under a millisecond:
//! too short to hear as a dip, long enough to remove the step.

/// Which way a ramp moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// From full level towards silence.
    Out,
    /// From silence towards full level.
    In,
}

/// A linear gain ramp over a fixed number of samples.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FadeRamp {
    len: usize,
    direction: Direction,
}

impl FadeRamp {
    /// A ramp from full level down to silence over `len` samples.
    pub const fn fade_out(len: usize) -> Self {
        Self {
            len,
            direction: Direction::Out,
        }
    }

    /// A ramp from silence up to full level over `len` samples.
    pub const fn fade_in(len: usize) -> Self {
        Self {
            len,
            direction: Direction::In,
        }
    }

    /// Gain for the sample `pos` steps into the ramp.
    ///
    /// Only meaningful for `pos < len`. A zero-length ramp is never asked
    /// for a gain; callers skip it.
    #[inline]
    pub fn gain(&self, pos: usize) -> f32 {
        let len = self.len as f32;
        match self.direction {
            Direction::Out => (self.len - pos) as f32 / len,
            Direction::In => pos as f32 / len,
        }
    }

    /// Multiply the first `len` samples of `samples` by the ramp.
    pub fn apply(&self, samples: &mut [f32]) {
        for (pos, sample) in samples.iter_mut().take(self.len).enumerate() {
            *sample *= self.gain(pos);
        }
    }
}

/// Length of a retiming crossfade half for a cycle of `n_samples`.
///
/// Both halves have to fit in the cycle, so when fewer than `2 * fade`
/// samples are available each half shrinks to `n_samples / 2`. A
/// single-sample cycle gets a zero-length fade, which means the retime
/// happens without a ramp.
pub const fn fade_len(n_samples: usize, fade: usize) -> usize {
    if n_samples >= 2 * fade {
        fade
    } else {
        n_samples / 2
    }
}

/// Length of a fade-out placed at the end of a cycle of `n_samples`.
///
/// Only one ramp has to fit, so this shrinks to the whole cycle rather
/// than half of it.
pub const fn tail_len(n_samples: usize, fade: usize) -> usize {
    if n_samples >= fade {
        fade
    } else {
        n_samples
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    /// A fade out starts at unity and steps down evenly.
    #[test]
    fn test_fade_out_gains() {
        let ramp = FadeRamp::fade_out(4);
        let gains: Vec<f32> = (0..4).map(|pos| ramp.gain(pos)).collect();
        assert_eq!(gains, vec![1.0, 0.75, 0.5, 0.25]);
    }

    /// A fade in starts at exact silence and steps up evenly.
    #[test]
    fn test_fade_in_gains() {
        let ramp = FadeRamp::fade_in(4);
        let gains: Vec<f32> = (0..4).map(|pos| ramp.gain(pos)).collect();
        assert_eq!(gains, vec![0.0, 0.25, 0.5, 0.75]);
    }

    /// Applying a ramp only touches its own span.
    #[test]
    fn test_apply_leaves_rest_untouched() {
        let mut samples = [2.0; 6];
        FadeRamp::fade_in(4).apply(&mut samples);
        assert_eq!(samples, [0.0, 0.5, 1.0, 1.5, 2.0, 2.0]);
    }

    /// A ramp longer than the slice stops at the end of the slice.
    #[test]
    fn test_apply_short_slice() {
        let mut samples = [1.0; 2];
        FadeRamp::fade_out(8).apply(&mut samples);
        assert_eq!(samples, [1.0, 0.875]);
    }

    /// Both crossfade halves must fit into the cycle.
    #[test]
    fn test_fade_len_halves_for_short_cycles() {
        assert_eq!(fade_len(512, 32), 32);
        assert_eq!(fade_len(64, 32), 32);
        assert_eq!(fade_len(63, 32), 31);
        assert_eq!(fade_len(7, 16), 3);
        assert_eq!(fade_len(1, 16), 0);
        assert_eq!(fade_len(0, 16), 0);
    }

    /// A tail fade only needs one ramp's worth of samples.
    #[test]
    fn test_tail_len() {
        assert_eq!(tail_len(512, 32), 32);
        assert_eq!(tail_len(20, 32), 20);
        assert_eq!(tail_len(0, 32), 0);
    }
}

//! # Mode Profiles
//!
//! Every plugin in this crate runs the same delay engine. What differs
//! between them is data:
//!
//! - how big the ring buffer is and how long the click-masking fades are,
//! - which control values are accepted (the signed variant takes negative
//!   delays),
//! - whether a new delay request takes effect now or one cycle later,
//! - what gets published as latency.
//!
//! A [`ModeProfile`] bundles those choices. The engine reads it; it never
//! branches on "which plugin am I".

use std::num::NonZeroUsize;

/// Lowest control value the signed variant accepts. Anything more negative
/// is clamped here.
pub const SIGNED_MIN_DELAY: i32 = -10_000;

/// When a latched delay request is applied to the audio.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Latch {
    /// Apply the request in the same cycle it is read.
    Immediate,
    /// Publish first, apply in the following cycle. The host gets one full
    /// cycle to pick up the new latency before the audio actually shifts.
    NextCycle,
}

/// What the latency output publishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reporting {
    /// The delay that was in effect when the cycle began.
    Applied,
    /// The applied delay while the report toggle is on, otherwise zero.
    Toggle,
    /// Chosen per cycle by a [`ReportMode`] control.
    Selectable,
    /// Non-negative requests report zero. Negative requests delay nothing
    /// but report their magnitude, reserving host latency budget.
    NegativeRequest,
    /// Always zero.
    Never,
}

/// Reporting selector of the multi-mode variant.
///
/// The control is a float, rounded to nearest with ties to even. Values
/// outside `0..=3` are kept as [`ReportMode::Other`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReportMode {
    /// 0: delay the audio, report nothing.
    Silent,
    /// 1: delay the audio, report the delay in effect.
    #[default]
    Actual,
    /// 2: leave the audio undelayed, report the requested delay.
    Requested,
    /// 3: neither delay nor report.
    Off,
    /// Any other selector value. Reports the delay in effect like
    /// [`ReportMode::Actual`], but only values below 2 apply the delay.
    Other(i32),
}

impl ReportMode {
    /// Map a raw selector value. NaN acts like mode 1.
    pub fn from_control(value: f32) -> Self {
        if value.is_nan() {
            return Self::Actual;
        }
        // Saturating cast: infinities land on the i32 extremes.
        match value.round_ties_even() as i32 {
            0 => Self::Silent,
            1 => Self::Actual,
            2 => Self::Requested,
            3 => Self::Off,
            other => Self::Other(other),
        }
    }

    /// Whether a request latched under this mode is applied to the audio.
    /// Selector values from 2 upwards leave the audio undelayed.
    pub fn applies_delay(self) -> bool {
        match self {
            Self::Silent | Self::Actual => true,
            Self::Requested | Self::Off => false,
            Self::Other(mode) => mode < 2,
        }
    }
}

/// Static description of one plugin variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModeProfile {
    /// Human-readable variant name, used in log messages.
    pub name: &'static str,
    /// Ring buffer length in samples. The longest delay is one less.
    pub capacity: NonZeroUsize,
    /// Length of each half of a retiming crossfade, in samples.
    pub fade: usize,
    /// Lowest accepted delay control value, after rounding.
    pub min_delay: i32,
    pub latch: Latch,
    pub reporting: Reporting,
    /// Fade the cycle tail out when only the reported latency changes, and
    /// fade the next cycle back in. Hosts shift the stream when latency
    /// changes, so an unmasked change clicks even though the delay didn't.
    pub masks_report_changes: bool,
}

const fn capacity(samples: usize) -> NonZeroUsize {
    match NonZeroUsize::new(samples) {
        Some(capacity) => capacity,
        None => panic!("delay capacity must be non-zero"),
    }
}

impl ModeProfile {
    /// Always reports the delay in effect, one cycle behind.
    pub const BASIC: Self = Self {
        name: "basic",
        capacity: capacity(192_000),
        fade: 16,
        min_delay: 0,
        latch: Latch::Immediate,
        reporting: Reporting::Applied,
        masks_report_changes: false,
    };

    /// Reports the applied delay when the toggle is on.
    pub const TOGGLE: Self = Self {
        name: "toggle",
        capacity: capacity(192_001),
        fade: 16,
        min_delay: 0,
        latch: Latch::NextCycle,
        reporting: Reporting::Toggle,
        masks_report_changes: false,
    };

    /// Four-way reporting selector.
    pub const MULTI: Self = Self {
        name: "multi",
        capacity: capacity(262_144),
        fade: 32,
        min_delay: 0,
        latch: Latch::NextCycle,
        reporting: Reporting::Selectable,
        masks_report_changes: false,
    };

    /// Negative delays reserve latency without delaying audio.
    pub const MICRO: Self = Self {
        name: "micro",
        capacity: capacity(262_144),
        fade: 32,
        min_delay: SIGNED_MIN_DELAY,
        latch: Latch::Immediate,
        reporting: Reporting::NegativeRequest,
        masks_report_changes: true,
    };

    /// Plain delay, no latency reporting at all.
    pub const MEGA: Self = Self {
        name: "mega",
        capacity: capacity(262_144),
        fade: 32,
        min_delay: 0,
        latch: Latch::Immediate,
        reporting: Reporting::Never,
        masks_report_changes: false,
    };

    /// The same profile with a different buffer size.
    #[cfg(test)]
    pub const fn with_capacity(self, samples: usize) -> Self {
        Self {
            capacity: capacity(samples),
            ..self
        }
    }

    /// Longest delay the buffer can hold.
    pub const fn max_delay(&self) -> i32 {
        let max = self.capacity.get() - 1;
        if max > i32::MAX as usize {
            i32::MAX
        } else {
            max as i32
        }
    }

    /// Clamp a raw delay control into the accepted range without rounding.
    /// NaN is treated as zero.
    pub fn clamp_delay(&self, value: f32) -> f32 {
        if value.is_nan() {
            return 0f32.clamp(self.min_delay as f32, self.max_delay() as f32);
        }
        value.clamp(self.min_delay as f32, self.max_delay() as f32)
    }

    /// Round a raw delay control to whole samples and clamp it into the
    /// accepted range. Rounding is to nearest, ties to even.
    pub fn requested_delay(&self, value: f32) -> i32 {
        self.clamp_delay(value.round_ties_even()) as i32
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────

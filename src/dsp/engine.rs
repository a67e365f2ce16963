//! # Latency-Reporting Delay Engine
//!
//! One engine per audio channel. The host calls [`DelayEngine::process`]
//! once per cycle with a block of samples and the current control values;
//! the engine delays the block in place and returns the latency to publish.
//!
//! ## Per-cycle flow
//!
//! ```text
//!  controls ──► clamp & round ──► latch ──► target delay
//!                                  │              │
//!                                  │              ▼
//!                                  │   ┌────────────────────────┐
//!  block ──────────────────────────┼──►│ render                 │──► block
//!                                  │   │  bypass / crossfade /  │
//!                                  │   │  plain delay           │
//!                                  │   └────────────────────────┘
//!                                  ▼
//!                           reported latency
//! ```
//!
//! ## Retiming without clicks
//!
//! When the target delay differs from the one in effect, the first `F`
//! samples of the cycle are read from the old position while fading out,
//! the read cursor jumps, and the next `F` samples fade in from the new
//! position. Everything after that is a plain delay:
//!
//! ```text
//! pos:   0 ........ F ........ 2F ................ n
//!        │ fade out │ fade in  │ plain delay       │
//!        │ old pos  ▲ new pos  │                   │
//!                 retime
//! ```
//!
//! Both halves always fit in the cycle (`F` shrinks to `n / 2` on short
//! cycles), so a transition never spans two cycles and two fades never
//! overlap. The only state carried across a cycle boundary is
//! `pending_fade`, set by the signed variant when it fades a cycle's tail
//! out because the reported latency changed.
//!
//! ## Why apply one cycle late?
//!
//! With [`Latch::NextCycle`] a new request is published first and applied
//! to the audio in the following cycle. A host compensating for plugin
//! latency needs that cycle to realign the parallel paths; shifting the
//! audio before the host knows about it would put the paths out of step.

use nih_plug::nih_debug_assert_eq;

use super::delay_line::DelayLine;
use super::fade::{fade_len, tail_len, FadeRamp};
use super::profile::{Latch, ModeProfile, ReportMode, Reporting};
use crate::error::EngineError;

/// Control values sampled once at the start of a cycle.
///
/// These are raw host values: the engine clamps and rounds them itself,
/// so anything (negative, huge, NaN) is accepted.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Controls {
    /// Requested delay in samples.
    pub delay: f32,
    /// Report toggle (on at `>= 0.5`) or [`ReportMode`] selector, depending
    /// on the profile. Ignored by profiles without a reporting control.
    pub report: f32,
}

impl Controls {
    pub const fn new(delay: f32, report: f32) -> Self {
        Self { delay, report }
    }
}

/// Delay line plus the latency-reporting state machine.
pub struct DelayEngine {
    line: DelayLine,
    profile: ModeProfile,

    /// Request latched last cycle, after clamping.
    previous_request: i32,

    /// Report mode latched last cycle. Decides whether `previous_request`
    /// reaches the audio under [`Latch::NextCycle`].
    previous_mode: ReportMode,

    /// The previous cycle ended faded out to silence and the next one has
    /// to fade back in.
    pending_fade: bool,
}

impl DelayEngine {
    /// Allocate an engine for `profile`. All state starts zeroed: silent
    /// buffer, no delay, nothing latched.
    pub fn new(profile: ModeProfile) -> Result<Self, EngineError> {
        Ok(Self {
            line: DelayLine::new(profile.capacity)?,
            profile,
            previous_request: 0,
            previous_mode: ReportMode::Silent,
            pending_fade: false,
        })
    }

    /// The delay applied to the audio right now, in samples.
    pub fn current_delay(&self) -> usize {
        self.line.current_delay()
    }

    /// How long the host should keep calling after the input goes silent
    /// for the delayed audio to drain out.
    pub fn tail_samples(&self) -> u32 {
        u32::try_from(self.current_delay()).unwrap_or(u32::MAX)
    }

    /// Silence the stored history. Timing and latched controls are kept,
    /// so the reported latency does not change.
    pub fn clear(&mut self) {
        self.line.clear();
    }

    /// Process one cycle in place and return the latency to report.
    ///
    /// Exactly `block.len()` samples are consumed and produced. Bounded
    /// work, no allocation, no failure path.
    pub fn process(&mut self, block: &mut [f32], controls: Controls) -> f32 {
        let requested = self.profile.requested_delay(controls.delay);
        let mode = match self.profile.reporting {
            Reporting::Selectable => ReportMode::from_control(controls.report),
            _ => ReportMode::Actual,
        };
        let delay_at_start = self.line.current_delay();
        let request_changed = requested != self.previous_request;

        let target = match self.profile.latch {
            Latch::Immediate => requested,
            Latch::NextCycle if self.previous_mode.applies_delay() => self.previous_request,
            Latch::NextCycle => 0,
        };
        self.previous_request = requested;
        self.previous_mode = mode;

        self.render(block, usize::try_from(target).unwrap_or(0));

        if self.profile.masks_report_changes {
            self.mask_report_change(block, requested, request_changed);
        }

        nih_debug_assert_eq!(self.line.separation(), self.line.current_delay());

        match self.profile.reporting {
            Reporting::Applied => delay_at_start as f32,
            Reporting::Toggle if controls.report >= 0.5 => self.line.current_delay() as f32,
            Reporting::Toggle => 0.0,
            Reporting::Selectable => match mode {
                ReportMode::Silent | ReportMode::Off => 0.0,
                ReportMode::Requested => self.profile.clamp_delay(controls.delay),
                ReportMode::Actual | ReportMode::Other(_) => self.line.current_delay() as f32,
            },
            Reporting::NegativeRequest if requested < 0 => -(requested as f32),
            Reporting::NegativeRequest | Reporting::Never => 0.0,
        }
    }

    /// Process `input` into a separate `output` buffer.
    ///
    /// The engine works in place, so this copies first. Both slices must
    /// have the same length; extra samples in the longer one are left
    /// untouched. The plugin adapter only uses the in-place form.
    #[allow(dead_code)]
    pub fn process_into(&mut self, input: &[f32], output: &mut [f32], controls: Controls) -> f32 {
        nih_debug_assert_eq!(input.len(), output.len());
        let n = input.len().min(output.len());
        output[..n].copy_from_slice(&input[..n]);
        self.process(&mut output[..n], controls)
    }

    /// Delay `block` by `target` samples, crossfading if the delay changes.
    fn render(&mut self, block: &mut [f32], target: usize) {
        // Zero in, zero out: nothing to read back, but keep recording so a
        // later request has history to play.
        if target == 0 && self.line.current_delay() == 0 {
            for &sample in block.iter() {
                self.line.write(sample);
            }
            return;
        }

        let mut pos = 0;
        if target != self.line.current_delay() {
            let len = fade_len(block.len(), self.profile.fade);

            // If the last cycle already faded to silence, stay silent here
            // instead of starting a second fade out.
            let fade_out = FadeRamp::fade_out(len);
            for (i, sample) in block[..len].iter_mut().enumerate() {
                let delayed = self.line.write_then_read(*sample);
                *sample = if self.pending_fade {
                    0.0
                } else {
                    delayed * fade_out.gain(i)
                };
            }

            self.line.retime(target);

            let fade_in = FadeRamp::fade_in(len);
            for (i, sample) in block[len..2 * len].iter_mut().enumerate() {
                *sample = self.line.write_then_read(*sample) * fade_in.gain(i);
            }

            self.pending_fade = false;
            pos = 2 * len;
        }

        for sample in &mut block[pos..] {
            *sample = self.line.write_then_read(*sample);
        }
    }

    /// Signed variant: hide the stream shift a host applies when only the
    /// reported latency changes.
    fn mask_report_change(&mut self, block: &mut [f32], requested: i32, changed: bool) {
        let n = block.len();

        if self.pending_fade {
            FadeRamp::fade_in(fade_len(n, self.profile.fade)).apply(block);
        }
        self.pending_fade = false;

        if changed && requested < 0 {
            let len = tail_len(n, self.profile.fade);
            FadeRamp::fade_out(len).apply(&mut block[n - len..]);
            self.pending_fade = true;
        }
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────

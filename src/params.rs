//! # Plugin Parameters
//!
//! Each variant exposes a delay control plus, for two of them, a reporting
//! control. The `#[id = "..."]` strings are what hosts store in sessions
//! and presets, so they must never change once published.
//!
//! None of these parameters are smoothed. A smoothed delay would sweep the
//! read cursor through every intermediate value (a pitch glide, and a
//! latency that changes on every cycle). The engine instead jumps straight
//! to the new value behind a short crossfade.

use std::sync::Arc;

use nih_plug::prelude::*;

use crate::dsp::engine::Controls;
use crate::dsp::profile::ModeProfile;

/// Parameter sets that can be turned into one cycle's engine controls.
pub trait ControlSource: Params {
    /// Build the parameter set for a profile's delay range.
    fn for_profile(profile: &ModeProfile) -> Self;

    /// Sample the current values. Called once at the start of each cycle.
    fn controls(&self) -> Controls;
}

/// **Delay**: the requested delay in whole samples.
///
/// Range follows the profile: `min_delay ..= capacity - 1`. Negative values
/// only exist on the signed variant, where they report latency without
/// delaying the audio.
fn delay_param(profile: &ModeProfile) -> FloatParam {
    FloatParam::new(
        "Delay",
        0.0,
        FloatRange::Linear {
            min: profile.min_delay as f32,
            max: profile.max_delay() as f32,
        },
    )
    .with_unit(" samples")
    .with_step_size(1.0)
}

/// Delay only. Used by the basic, signed and mega variants.
#[derive(Params)]
pub struct DelayParams {
    #[id = "delay"]
    pub delay: FloatParam,
}

impl ControlSource for DelayParams {
    fn for_profile(profile: &ModeProfile) -> Self {
        Self {
            delay: delay_param(profile),
        }
    }

    fn controls(&self) -> Controls {
        Controls::new(self.delay.value(), 0.0)
    }
}

/// Delay plus an on/off switch for the latency report.
#[derive(Params)]
pub struct ToggleParams {
    #[id = "delay"]
    pub delay: FloatParam,

    /// **Report Latency**: when off, the plugin still delays but tells the
    /// host it adds no latency. Useful for hearing what missing
    /// compensation sounds like.
    #[id = "report"]
    pub report: BoolParam,
}

impl ControlSource for ToggleParams {
    fn for_profile(profile: &ModeProfile) -> Self {
        Self {
            delay: delay_param(profile),
            report: BoolParam::new("Report Latency", true),
        }
    }

    fn controls(&self) -> Controls {
        let report = if self.report.value() { 1.0 } else { 0.0 };
        Controls::new(self.delay.value(), report)
    }
}

/// Delay plus a four-way reporting selector.
#[derive(Params)]
pub struct MultiParams {
    #[id = "delay"]
    pub delay: FloatParam,

    /// **Report Mode**
    ///
    /// - 0 `Delay, Report 0`: delay the audio, report no latency
    /// - 1 `Delay, Report Actual`: delay and report the delay in effect
    /// - 2 `Report Only`: report the requested delay, don't delay
    /// - 3 `Bypass`: neither delay nor report
    #[id = "mode"]
    pub mode: IntParam,
}

const MODE_NAMES: [&str; 4] = [
    "Delay, Report 0",
    "Delay, Report Actual",
    "Report Only",
    "Bypass",
];

impl ControlSource for MultiParams {
    fn for_profile(profile: &ModeProfile) -> Self {
        Self {
            delay: delay_param(profile),
            mode: IntParam::new("Report Mode", 1, IntRange::Linear { min: 0, max: 3 })
                .with_value_to_string(Arc::new(|value: i32| {
                    usize::try_from(value)
                        .ok()
                        .and_then(|idx| MODE_NAMES.get(idx))
                        .map_or_else(|| value.to_string(), |name| (*name).to_string())
                }))
                .with_string_to_value(Arc::new(|text: &str| {
                    let text = text.trim();
                    MODE_NAMES
                        .iter()
                        .position(|name| name.eq_ignore_ascii_case(text))
                        .and_then(|idx| i32::try_from(idx).ok())
                        .or_else(|| text.parse().ok())
                })),
        }
    }

    fn controls(&self) -> Controls {
        Controls::new(self.delay.value(), self.mode.value() as f32)
    }
}

//! # Plugin Variants
//!
//! The crate ships several plugins built from one engine. A variant is a
//! zero-sized marker type tying together:
//!
//! - the engine [`ModeProfile`] (buffer size, fade length, reporting policy),
//! - the parameter set the host sees,
//! - the identifiers hosts use to tell the plugins apart.
//!
//! | Variant | Controls | Reported latency |
//! |---------|----------|------------------|
//! | [`Basic`] | delay | applied delay, one cycle behind |
//! | [`Toggle`] | delay, report on/off | applied delay, or 0 when off |
//! | [`Multi`] | delay, report mode 0-3 | see [`ReportMode`](crate::dsp::profile::ReportMode) |
//! | [`Micro`] | signed delay | `-delay` for negative requests, otherwise 0 |
//! | [`Mega`] | delay | none |

use crate::dsp::profile::ModeProfile;
use crate::params::{ControlSource, DelayParams, MultiParams, ToggleParams};

/// Compile-time description of one plugin in this library.
pub trait Variant: 'static + Send + Sync {
    const PROFILE: ModeProfile;
    const NAME: &'static str;
    const DESCRIPTION: &'static str;

    /// Reverse-domain identifier, unique per plugin.
    const CLAP_ID: &'static str;

    /// 16-byte VST3 class ID. Must never change once released.
    const VST3_CLASS_ID: [u8; 16];

    type Params: ControlSource;
}

pub struct Basic;

impl Variant for Basic {
    const PROFILE: ModeProfile = ModeProfile::BASIC;
    const NAME: &'static str = "NoDelay Basic";
    const DESCRIPTION: &'static str = "Sample delay that reports its delay as latency";
    const CLAP_ID: &'static str = "org.nodelay.basic";
    const VST3_CLASS_ID: [u8; 16] = *b"NoDelayBasic_v01";
    type Params = DelayParams;
}

pub struct Toggle;

impl Variant for Toggle {
    const PROFILE: ModeProfile = ModeProfile::TOGGLE;
    const NAME: &'static str = "NoDelay Toggle";
    const DESCRIPTION: &'static str = "Sample delay with a switchable latency report";
    const CLAP_ID: &'static str = "org.nodelay.toggle";
    const VST3_CLASS_ID: [u8; 16] = *b"NoDelayToggle_v1";
    type Params = ToggleParams;
}

pub struct Multi;

impl Variant for Multi {
    const PROFILE: ModeProfile = ModeProfile::MULTI;
    const NAME: &'static str = "NoDelay";
    const DESCRIPTION: &'static str =
        "Sample delay with selectable latency reporting, for testing host latency compensation";
    const CLAP_ID: &'static str = "org.nodelay.multi";
    const VST3_CLASS_ID: [u8; 16] = *b"NoDelayMulti__v1";
    type Params = MultiParams;
}

pub struct Micro;

impl Variant for Micro {
    const PROFILE: ModeProfile = ModeProfile::MICRO;
    const NAME: &'static str = "NoDelay Micro";
    const DESCRIPTION: &'static str =
        "Negative delays report latency without delaying the audio";
    const CLAP_ID: &'static str = "org.nodelay.micro";
    const VST3_CLASS_ID: [u8; 16] = *b"NoDelayMicro__v1";
    type Params = DelayParams;
}

pub struct Mega;

impl Variant for Mega {
    const PROFILE: ModeProfile = ModeProfile::MEGA;
    const NAME: &'static str = "NoDelay Mega";
    const DESCRIPTION: &'static str = "Long sample delay without latency reporting";
    const CLAP_ID: &'static str = "org.nodelay.mega";
    const VST3_CLASS_ID: [u8; 16] = *b"NoDelayMega___v1";
    type Params = DelayParams;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> [(&'static str, [u8; 16]); 5] {
        [
            (Basic::CLAP_ID, Basic::VST3_CLASS_ID),
            (Toggle::CLAP_ID, Toggle::VST3_CLASS_ID),
            (Multi::CLAP_ID, Multi::VST3_CLASS_ID),
            (Micro::CLAP_ID, Micro::VST3_CLASS_ID),
            (Mega::CLAP_ID, Mega::VST3_CLASS_ID),
        ]
    }

    /// Hosts key presets and sessions on these; a collision would load the
    /// wrong plugin.
    #[test]
    fn test_identifiers_are_unique() {
        let ids = ids();
        for (i, a) in ids.iter().enumerate() {
            for b in &ids[i + 1..] {
                assert_ne!(a.0, b.0);
                assert_ne!(a.1, b.1);
            }
        }
    }
}

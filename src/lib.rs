//! # NoDelay: Delay Plugins That Report Their Latency
//!
//! A family of AU/VST3/CLAP plugins built with
//! [nih-plug](https://github.com/robbert-vdh/nih-plug) for testing how hosts
//! compensate plugin latency. Each plugin delays its input by a whole number
//! of samples and tells the host about it, so a host with working latency
//! compensation should make the plugin inaudible: parallel paths stay time
//! aligned as if nothing was inserted.
//!
//! ## Signal Flow
//!
//! ```text
//!              ┌──────────────────────── DelayEngine (per channel) ──┐
//!              │                                                     │
//! Input ──────►│ ring buffer ──► fade out │ retime │ fade in ───────►│──► Output
//!              │                     (only when the delay changes)   │
//!              │                                                     │
//! Delay ──────►│ clamp ──► latch ──► target delay                    │
//! Report ─────►│                 └─► reported latency ───────────────│──► set_latency_samples()
//!              └─────────────────────────────────────────────────────┘
//! ```
//!
//! The plugins differ only in their `ModeProfile`; the `variant` module
//! lists them.

mod dsp;
mod error;
mod params;
mod variant;

use std::marker::PhantomData;
use std::num::NonZeroU32;
use std::sync::Arc;

use dsp::engine::{Controls, DelayEngine};
use nih_plug::prelude::*;
use params::ControlSource;
use variant::{Basic, Mega, Micro, Multi, Toggle, Variant};

/// The plugin, generic over which variant it is.
///
/// Parameters are shared with the host through an `Arc`. The engines are
/// owned by the audio thread and only touched in `process()` and `reset()`.
struct LatencyDelay<V: Variant> {
    params: Arc<V::Params>,

    /// One engine per audio channel. All of them see the same controls, so
    /// they stay in lockstep and any one of them can report the latency.
    engines: Vec<DelayEngine>,

    /// Last value passed to `set_latency_samples()`. Hosts may restart
    /// processing when latency changes, so only real changes are sent.
    reported_latency: Option<u32>,

    variant: PhantomData<V>,
}

type NoDelayBasic = LatencyDelay<Basic>;
type NoDelayToggle = LatencyDelay<Toggle>;
type NoDelay = LatencyDelay<Multi>;
type NoDelayMicro = LatencyDelay<Micro>;
type NoDelayMega = LatencyDelay<Mega>;

impl<V: Variant> Default for LatencyDelay<V> {
    fn default() -> Self {
        Self {
            params: Arc::new(V::Params::for_profile(&V::PROFILE)),
            // Populated in initialize() once the channel count is known.
            engines: Vec::new(),
            reported_latency: None,
            variant: PhantomData,
        }
    }
}

impl<V: Variant> LatencyDelay<V> {
    fn publish_latency(&mut self, latency: f32, context: &mut impl ProcessContext<Self>) {
        if let Some(samples) = latency_change(self.reported_latency, latency) {
            context.set_latency_samples(samples);
            self.reported_latency = Some(samples);
        }
    }
}

/// Run each channel through its own engine. Returns channel 0's report;
/// the engines run in lockstep, so the others agree with it. Channels
/// without an engine are left untouched.
fn process_channels(
    engines: &mut [DelayEngine],
    channels: &mut [&mut [f32]],
    controls: Controls,
) -> f32 {
    let mut latency = 0.0;
    for (channel_idx, (engine, samples)) in engines.iter_mut().zip(channels.iter_mut()).enumerate()
    {
        let reported = engine.process(samples, controls);
        if channel_idx == 0 {
            latency = reported;
        }
    }
    latency
}

/// Whole-sample latency to send to the host, or `None` if it already has
/// this value. Rounds ties to even like the delay control; negative and
/// NaN reports become 0.
fn latency_change(previous: Option<u32>, latency: f32) -> Option<u32> {
    // Saturating cast.
    let samples = latency.round_ties_even() as u32;
    (previous != Some(samples)).then_some(samples)
}

impl<V: Variant> Plugin for LatencyDelay<V> {
    const NAME: &'static str = V::NAME;
    const VENDOR: &'static str = "NoDelay";
    const URL: &'static str = "";
    const EMAIL: &'static str = "";
    const VERSION: &'static str = env!("CARGO_PKG_VERSION");

    // Every channel gets its own delay line, so any channel count works.
    // Stereo first since that's what most tracks are.
    const AUDIO_IO_LAYOUTS: &'static [AudioIOLayout] = &[
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(2),
            main_output_channels: NonZeroU32::new(2),
            aux_input_ports: &[],
            aux_output_ports: &[],
            names: PortNames::const_default(),
        },
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(1),
            main_output_channels: NonZeroU32::new(1),
            aux_input_ports: &[],
            aux_output_ports: &[],
            names: PortNames::const_default(),
        },
    ];

    const MIDI_INPUT: MidiConfig = MidiConfig::None;

    // Controls are sampled once per cycle. A delay change is a whole-cycle
    // event (crossfade at the start, latency report at the end), so splitting
    // the buffer at automation points would only produce extra transitions.
    const SAMPLE_ACCURATE_AUTOMATION: bool = false;

    type SysExMessage = ();
    type BackgroundTask = ();

    fn params(&self) -> Arc<dyn Params> {
        self.params.clone()
    }

    /// Allocate one engine per channel.
    ///
    /// The buffer size is in samples, not seconds, so a sample rate change
    /// needs no new buffers. Engines are only rebuilt when the channel count
    /// changes; rebuilding them would drop the applied delay and make the
    /// reported latency bounce.
    fn initialize(
        &mut self,
        audio_io_layout: &AudioIOLayout,
        _buffer_config: &BufferConfig,
        _context: &mut impl InitContext<Self>,
    ) -> bool {
        let num_channels = audio_io_layout
            .main_input_channels
            .map(|c| c.get() as usize)
            .unwrap_or(2);

        if self.engines.len() == num_channels {
            return true;
        }

        let engines: Result<Vec<_>, _> = (0..num_channels)
            .map(|_| DelayEngine::new(V::PROFILE))
            .collect();

        match engines {
            Ok(engines) => {
                nih_log!(
                    "{}: {} channel(s), {}-sample buffers, {} profile",
                    V::NAME,
                    num_channels,
                    V::PROFILE.capacity,
                    V::PROFILE.name,
                );
                self.engines = engines;
                self.reported_latency = None;
                true
            }
            Err(err) => {
                nih_error!("{}: {}", V::NAME, err);
                false
            }
        }
    }

    /// Silence the stored audio so stale samples don't play after a stop.
    /// The applied delay stays, and so does the reported latency.
    fn reset(&mut self) {
        for engine in &mut self.engines {
            engine.clear();
        }
    }

    fn process(
        &mut self,
        buffer: &mut Buffer,
        _aux: &mut AuxiliaryBuffers,
        context: &mut impl ProcessContext<Self>,
    ) -> ProcessStatus {
        let controls = self.params.controls();
        let latency = process_channels(&mut self.engines, buffer.as_slice(), controls);
        self.publish_latency(latency, context);

        // Keep being called after the input stops until the delayed audio
        // has drained out.
        let tail = self.engines.first().map_or(0, DelayEngine::tail_samples);
        ProcessStatus::Tail(tail)
    }
}

// ─────────────────────────────────────────────────────────────────────
// Plugin format trait implementations
// ─────────────────────────────────────────────────────────────────────

impl<V: Variant> ClapPlugin for LatencyDelay<V> {
    const CLAP_ID: &'static str = V::CLAP_ID;
    const CLAP_DESCRIPTION: Option<&'static str> = Some(V::DESCRIPTION);
    const CLAP_MANUAL_URL: Option<&'static str> = None;
    const CLAP_SUPPORT_URL: Option<&'static str> = None;
    const CLAP_FEATURES: &'static [ClapFeature] = &[
        ClapFeature::AudioEffect,
        ClapFeature::Mono,
        ClapFeature::Stereo,
        ClapFeature::Delay,
        ClapFeature::Utility,
    ];
}

impl<V: Variant> Vst3Plugin for LatencyDelay<V> {
    const VST3_CLASS_ID: [u8; 16] = V::VST3_CLASS_ID;
    const VST3_SUBCATEGORIES: &'static [Vst3SubCategory] = &[
        Vst3SubCategory::Fx,
        Vst3SubCategory::Delay,
        Vst3SubCategory::Tools,
    ];
}

// ─────────────────────────────────────────────────────────────────────
// Export macros
// ─────────────────────────────────────────────────────────────────────
//
// One library, five plugins. The CLAP factory and the VST3 factory both
// list every variant; clap_wrapper re-exports the CLAP factory as AUv2.

nih_export_clap!(NoDelayBasic, NoDelayToggle, NoDelay, NoDelayMicro, NoDelayMega);
nih_export_vst3!(NoDelayBasic, NoDelayToggle, NoDelay, NoDelayMicro, NoDelayMega);

clap_wrapper::export_auv2!();

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::profile::ModeProfile;

    /// The host only hears about real changes, in whole samples.
    #[test]
    fn test_latency_change() {
        assert_eq!(latency_change(None, 0.0), Some(0));
        assert_eq!(latency_change(Some(0), 0.0), None);
        assert_eq!(latency_change(Some(0), 100.0), Some(100));
        assert_eq!(latency_change(Some(100), 100.0), None);
        assert_eq!(latency_change(Some(100), 99.6), None);
        assert_eq!(latency_change(Some(100), 0.0), Some(0));
    }

    /// Halfway reports round to even, matching how requests are rounded.
    #[test]
    fn test_latency_change_rounds_ties_to_even() {
        assert_eq!(latency_change(None, 0.5), Some(0));
        assert_eq!(latency_change(None, 1.5), Some(2));
        assert_eq!(latency_change(None, 12.5), Some(12));
        assert_eq!(latency_change(None, -50.0), Some(0));
        assert_eq!(latency_change(None, f32::NAN), Some(0));
    }

    /// Every channel is delayed, and channel 0 supplies the report.
    #[test]
    fn test_process_channels_reports_first_channel() {
        let profile = ModeProfile::BASIC.with_capacity(1024);
        let mut engines = vec![
            DelayEngine::new(profile).unwrap(),
            DelayEngine::new(profile).unwrap(),
        ];
        let controls = Controls::new(10.0, 0.0);

        let mut left = [1.0; 64];
        let mut right = [2.0; 64];
        let mut channels: [&mut [f32]; 2] = [&mut left, &mut right];
        let first = process_channels(&mut engines, &mut channels, controls);
        assert_eq!(first, 0.0);

        let mut left = [1.0; 64];
        let mut right = [2.0; 64];
        let mut channels: [&mut [f32]; 2] = [&mut left, &mut right];
        let second = process_channels(&mut engines, &mut channels, controls);
        assert_eq!(second, 10.0);
        assert_eq!(left, [1.0; 64]);
        assert_eq!(right, [2.0; 64]);
        assert!(engines.iter().all(|engine| engine.current_delay() == 10));
    }

    /// Extra channels without an engine pass through unchanged.
    #[test]
    fn test_process_channels_skips_missing_engines() {
        let mut engines = vec![DelayEngine::new(ModeProfile::BASIC.with_capacity(256)).unwrap()];
        let mut left = [1.0; 32];
        let mut right = [2.0; 32];
        let mut channels: [&mut [f32]; 2] = [&mut left, &mut right];
        process_channels(&mut engines, &mut channels, Controls::new(5.0, 0.0));

        assert_eq!(right, [2.0; 32]);
        assert_ne!(left, [1.0; 32]);
    }
}

// Sensify - Magnet Detector Screen
//
// Field magnitude through a hysteresis gate. Entering the detected state
// asks for vibration and the alert sound; leaving it stops the sound.

use embedded_graphics::pixelcolor::Rgb888;

use crate::classifier::{Edge, HysteresisGate};
use crate::config::*;
use crate::error::Result;
use crate::events::{Effect, Sample};
use crate::present::{self, Gauge, Presenter};
use crate::reducer::Reducer;

#[derive(Debug, Clone, PartialEq)]
pub struct MagnetConfig {
    pub entry_ut: f64,
    pub exit_ratio: f64,
    /// Magnitude shown as 100 % strength.
    pub full_scale_ut: f64,
    pub vibration_pattern: Vec<u64>,
}

impl Default for MagnetConfig {
    fn default() -> Self {
        Self {
            entry_ut: MAGNET_ENTRY_THRESHOLD_UT,
            exit_ratio: MAGNET_EXIT_RATIO,
            full_scale_ut: MAGNET_FULL_SCALE_UT,
            vibration_pattern: MAGNET_VIBRATION_PATTERN_MS.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MagnetState {
    pub magnitude: f64,
    pub strength_pct: u8,
    pub detected: bool,
}

impl MagnetState {
    pub fn status_text(&self) -> &'static str {
        if self.detected {
            "Magnet Detected!"
        } else {
            "No Magnet Detected"
        }
    }
}

pub struct MagnetDetector {
    gate: HysteresisGate,
    config: MagnetConfig,
}

impl MagnetDetector {
    pub fn new(config: MagnetConfig) -> Result<Self> {
        Ok(Self {
            gate: HysteresisGate::with_ratio(config.entry_ut, config.exit_ratio)?,
            config,
        })
    }

    pub fn gate(&self) -> &HysteresisGate {
        &self.gate
    }
}

impl Reducer for MagnetDetector {
    type Sample = Sample;
    type State = MagnetState;

    fn initial_state(&self) -> MagnetState {
        MagnetState::default()
    }

    fn reduce(&self, state: &MagnetState, sample: &Sample, effects: &mut Vec<Effect>) -> Result<MagnetState> {
        let magnitude = sample.validate()?.magnitude();
        let detected = match self.gate.step(state.detected, magnitude) {
            Some(Edge::Entered) => {
                log::info!("magnet detected ({:.1} µT)", magnitude);
                effects.push(Effect::Vibrate(self.config.vibration_pattern.clone()));
                effects.push(Effect::PlaySound);
                true
            }
            Some(Edge::Exited) => {
                log::info!("magnet lost ({:.1} µT)", magnitude);
                effects.push(Effect::StopSound);
                false
            }
            None => state.detected,
        };

        Ok(MagnetState {
            magnitude,
            strength_pct: present::percent(magnitude, self.config.full_scale_ut),
            detected,
        })
    }

    fn changed(&self, published: &MagnetState, next: &MagnetState) -> bool {
        published.detected != next.detected || published.strength_pct != next.strength_pct
    }

    fn on_stop(&self, state: &MagnetState, effects: &mut Vec<Effect>) {
        if state.detected {
            effects.push(Effect::StopSound);
        }
    }
}

impl Presenter for MagnetDetector {
    fn gauge(&self, state: &MagnetState) -> Gauge {
        let fill = if state.detected {
            Rgb888::new(0x22, 0x8b, 0xe6)
        } else {
            Rgb888::new(0x86, 0x8e, 0x96)
        };
        Gauge::new(state.strength_pct as f64 / 100.0, fill)
    }
}

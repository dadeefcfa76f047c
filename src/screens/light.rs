// Sensify - Ambient Light Screen

use embedded_graphics::pixelcolor::Rgb888;

use crate::classifier::{HysteresisClassifier, OrderedStates, StateSpec};
use crate::config::*;
use crate::error::Result;
use crate::events::{Effect, Sample};
use crate::present::{self, Gauge, Presenter};
use crate::reducer::Reducer;

/// Payload carried by each light state.
#[derive(Debug, Clone, PartialEq)]
pub struct LightLevel {
    pub message: &'static str,
    pub color: Rgb888,
    /// Target screen brightness, 0.0-1.0.
    pub brightness: f64,
}

const DEFAULT_TABLE: [(f64, &str, &str, u32, f64); 9] = [
    (0.0, "PITCH_BLACK", "Completely Dark", 0x000000, 0.2),
    (5.0, "VERY_DARK", "Very Dim", 0x0d0d0d, 0.3),
    (20.0, "DARK", "Dim", 0x1a1a1a, 0.4),
    (50.0, "DIM", "Low Light", 0x4a4a4a, 0.5),
    (100.0, "MODERATE", "Moderate Light", 0x787878, 0.6),
    (500.0, "BRIGHT", "Bright Light", 0xa8a8a8, 0.7),
    (1000.0, "VERY_BRIGHT", "Very Bright Light", 0xd3d3d3, 0.8),
    (5000.0, "INTENSE", "Intense Light", 0xf5f5f5, 0.9),
    (10000.0, "EXTREME", "Extremely Bright Light", 0xffffff, 1.0),
];

/// The nine-step lux table, from pitch black to direct sunlight.
pub fn default_light_table() -> OrderedStates<LightLevel> {
    let states = DEFAULT_TABLE
        .iter()
        .map(|&(threshold, label, message, rgb, brightness)| {
            StateSpec::new(
                threshold,
                label,
                LightLevel {
                    message,
                    color: Rgb888::new((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8),
                    brightness,
                },
            )
        })
        .collect();
    match OrderedStates::new(states) {
        Ok(table) => table,
        // The table above is a non-empty literal in ascending order.
        Err(e) => unreachable!("default light table rejected: {e}"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LightState {
    /// Displayed illuminance; only follows the sensor past the debounce.
    pub lux: f64,
    pub ordinal: usize,
}

pub struct LightMeter {
    classifier: HysteresisClassifier<LightLevel>,
    debounce_lux: f64,
}

impl Default for LightMeter {
    fn default() -> Self {
        Self::new(default_light_table())
    }
}

impl LightMeter {
    pub fn new(table: OrderedStates<LightLevel>) -> Self {
        Self {
            classifier: HysteresisClassifier::without_margin(table),
            debounce_lux: LIGHT_LEVEL_DEBOUNCE_LUX,
        }
    }

    /// Anti-flicker variant: falling to a darker level needs the reading
    /// at or below `exit_ratio` times the current level's lower boundary.
    pub fn with_hysteresis(table: OrderedStates<LightLevel>, exit_ratio: f64) -> Result<Self> {
        Ok(Self {
            classifier: HysteresisClassifier::new(table, exit_ratio)?,
            debounce_lux: LIGHT_LEVEL_DEBOUNCE_LUX,
        })
    }

    fn table(&self) -> &OrderedStates<LightLevel> {
        self.classifier.states()
    }

    pub fn level(&self, state: &LightState) -> &StateSpec<LightLevel> {
        // Ordinals only ever come from this table.
        self.table()
            .get(state.ordinal)
            .unwrap_or_else(|| self.table().classify(state.lux).state)
    }

    pub fn message(&self, state: &LightState) -> &'static str {
        self.level(state).payload.message
    }

    /// Background colour for a possibly mid-animation ordinal.
    pub fn color_at(&self, position: f64) -> Rgb888 {
        let ramp: Vec<Rgb888> = self.table().iter().map(|s| s.payload.color).collect();
        present::color_ramp(&ramp, position).unwrap_or(Rgb888::new(0, 0, 0))
    }
}

impl Reducer for LightMeter {
    type Sample = Sample;
    type State = LightState;

    fn initial_state(&self) -> LightState {
        LightState::default()
    }

    fn reduce(&self, state: &LightState, sample: &Sample, effects: &mut Vec<Effect>) -> Result<LightState> {
        let lux = sample.validate()?.x.max(0.0);
        let shown = if (lux - state.lux).abs() > self.debounce_lux {
            lux
        } else {
            state.lux
        };

        let ordinal = self
            .classifier
            .step(Some(state.ordinal), lux)
            .map_or(state.ordinal, |t| t.to);
        if ordinal != state.ordinal {
            if let Some(level) = self.table().get(ordinal) {
                log::debug!("light level {} ({:.1} lx)", level.label, lux);
                effects.push(Effect::SetBrightness(level.payload.brightness));
            }
        }

        Ok(LightState { lux: shown, ordinal })
    }

    fn changed(&self, published: &LightState, next: &LightState) -> bool {
        published.ordinal != next.ordinal || published.lux != next.lux
    }
}

impl Presenter for LightMeter {
    fn gauge(&self, state: &LightState) -> Gauge {
        let steps = self.table().len().saturating_sub(1).max(1) as f64;
        Gauge::new(state.ordinal as f64 / steps, self.color_at(state.ordinal as f64))
    }
}

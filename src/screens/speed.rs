// Sensify - Accelerometer Speedometer Screen
//
// Thin screen over the motion integrator. Mode and unit toggles start the
// estimate over from zero.

use embedded_graphics::pixelcolor::Rgb888;

use crate::config::*;
use crate::error::Result;
use crate::events::{Effect, Sample};
use crate::integrator::{integrate, IntegratorConfig, IntegratorState, MotionMode, SpeedUnit};
use crate::present::{Gauge, Presenter};
use crate::reducer::Reducer;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpeedState {
    pub integrator: IntegratorState,
    pub unit: SpeedUnit,
}

impl SpeedState {
    /// Speed in the selected unit.
    pub fn display_speed(&self) -> f64 {
        self.unit.from_kmh(self.integrator.smoothed_speed)
    }

    pub fn toggle_mode(&self) -> Self {
        Self {
            integrator: IntegratorState::new(self.integrator.mode.next()),
            unit: self.unit,
        }
    }

    pub fn toggle_unit(&self) -> Self {
        Self {
            integrator: self.integrator.reset(),
            unit: self.unit.toggle(),
        }
    }

    pub fn reset(&self) -> Self {
        Self {
            integrator: self.integrator.reset(),
            unit: self.unit,
        }
    }
}

pub struct Speedometer {
    config: IntegratorConfig,
    mode: MotionMode,
}

impl Speedometer {
    pub fn new(config: IntegratorConfig, mode: MotionMode) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, mode })
    }
}

impl Reducer for Speedometer {
    type Sample = Sample;
    type State = SpeedState;

    fn initial_state(&self) -> SpeedState {
        SpeedState {
            integrator: IntegratorState::new(self.mode),
            unit: SpeedUnit::default(),
        }
    }

    fn reduce(&self, state: &SpeedState, sample: &Sample, _effects: &mut Vec<Effect>) -> Result<SpeedState> {
        Ok(SpeedState {
            integrator: integrate(state.integrator, sample.validate()?, &self.config),
            unit: state.unit,
        })
    }

    fn changed(&self, published: &SpeedState, next: &SpeedState) -> bool {
        published.unit != next.unit
            || published.integrator.mode != next.integrator.mode
            || (published.integrator.smoothed_speed - next.integrator.smoothed_speed).abs()
                > SPEED_DISPLAY_EPSILON
    }
}

impl Presenter for Speedometer {
    fn gauge(&self, state: &SpeedState) -> Gauge {
        let max = state.integrator.mode.max_speed();
        Gauge::new(state.integrator.smoothed_speed / max, Rgb888::new(0x22, 0x8b, 0xe6))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggles_reset_speed() {
        let state = SpeedState {
            integrator: IntegratorState {
                smoothed_speed: 8.0,
                last_sample_timestamp: Some(100),
                last_net_acceleration: 1.0,
                mode: MotionMode::Walking,
            },
            unit: SpeedUnit::KilometersPerHour,
        };
        let cycled = state.toggle_mode();
        assert_eq!(cycled.integrator, IntegratorState::new(MotionMode::Cycling));
        let miles = state.toggle_unit();
        assert_eq!(miles.unit, SpeedUnit::MilesPerHour);
        assert_eq!(miles.integrator.smoothed_speed, 0.0);
        assert_eq!(miles.integrator.mode, MotionMode::Walking);
    }

    #[test]
    fn test_display_speed_converts_units() {
        let state = SpeedState {
            integrator: IntegratorState {
                smoothed_speed: 10.0,
                ..IntegratorState::default()
            },
            unit: SpeedUnit::MilesPerHour,
        };
        assert!((state.display_speed() - 6.21371).abs() < 1e-9);
    }

    #[test]
    fn test_small_speed_changes_suppressed() {
        let speedo = Speedometer::new(IntegratorConfig::default(), MotionMode::Walking).unwrap();
        let a = speedo.initial_state();
        let mut b = a;
        b.integrator.smoothed_speed = 0.004;
        assert!(!speedo.changed(&a, &b));
        b.integrator.smoothed_speed = 0.01;
        assert!(speedo.changed(&a, &b));
    }

    #[test]
    fn test_reset_zeroes_speed_keeps_mode_and_unit() {
        let state = SpeedState {
            integrator: IntegratorState {
                smoothed_speed: 25.0,
                last_sample_timestamp: Some(4_000),
                last_net_acceleration: 1.5,
                mode: MotionMode::Cycling,
            },
            unit: SpeedUnit::MilesPerHour,
        };
        let cleared = state.reset();
        assert_eq!(cleared.integrator, IntegratorState::new(MotionMode::Cycling));
        assert_eq!(cleared.unit, SpeedUnit::MilesPerHour);
        assert_eq!(cleared.display_speed(), 0.0);
    }

    #[test]
    fn test_unit_toggle_through_stream() {
        use crate::drivers::sensor::SimulatedSensor;
        use crate::events::SensorKind;
        use crate::reducer::StreamReducer;

        let sensor: SimulatedSensor = SimulatedSensor::new(SensorKind::Accelerometer);
        let speedo = Speedometer::new(IntegratorConfig::default(), MotionMode::Walking).unwrap();
        let mut screen = StreamReducer::new(sensor.clone(), speedo);
        let mut seen: Vec<SpeedState> = Vec::new();
        screen.start(ACCEL_UPDATE_INTERVAL_MS).unwrap();

        for tick in 0..6u64 {
            let net = if tick % 2 == 0 { 0.0 } else { 3.0 };
            sensor.emit(Sample::new(0.0, 0.0, GRAVITY + net, tick * 100));
        }
        screen.pump(&mut |s: &SpeedState| seen.push(*s));
        assert!(screen.state().integrator.smoothed_speed > 0.0);

        let toggled = screen.state().toggle_unit();
        screen.replace_state(toggled, &mut |s: &SpeedState| seen.push(*s));
        let last = seen.last().copied().unwrap();
        assert_eq!(last.unit, SpeedUnit::MilesPerHour);
        assert_eq!(last.integrator.smoothed_speed, 0.0);

        // Later samples keep the chosen unit and restart from seeding.
        sensor.emit(Sample::new(0.0, 0.0, GRAVITY, 700));
        sensor.emit(Sample::new(0.0, 0.0, GRAVITY + 3.0, 800));
        screen.pump(&mut |s: &SpeedState| seen.push(*s));
        assert_eq!(screen.state().unit, SpeedUnit::MilesPerHour);
        assert!(screen.state().integrator.smoothed_speed > 0.0);
    }
}

// Sensify - Step Counter Screen
//
// Counts a step when the jump between consecutive accelerometer readings is
// large, the recent window shows sustained movement, and the cooldown since
// the previous step has passed.

use std::collections::VecDeque;

use embedded_graphics::pixelcolor::Rgb888;

use crate::config::*;
use crate::error::Result;
use crate::events::{magnitude, Effect, Sample};
use crate::present::{Gauge, Presenter};
use crate::reducer::Reducer;

#[derive(Debug, Clone, PartialEq)]
pub struct StepConfig {
    pub daily_goal: u32,
    pub distance_threshold: f64,
    pub moving_threshold: f64,
    pub cooldown_ms: u64,
    pub window_len: usize,
}

impl Default for StepConfig {
    fn default() -> Self {
        Self {
            daily_goal: STEP_DAILY_GOAL,
            distance_threshold: STEP_DISTANCE_THRESHOLD,
            moving_threshold: STEP_MOVING_THRESHOLD,
            cooldown_ms: STEP_COOLDOWN_MS,
            window_len: STEP_WINDOW_LEN,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StepState {
    pub steps: u32,
    pub goal_reached: bool,
    pub moving: bool,
    pub last_step_ms: Option<u64>,
    pub last_reading: Option<(f64, f64, f64)>,
    /// Most recent movement distances, oldest first.
    pub window: VecDeque<f64>,
}

pub struct StepCounter {
    config: StepConfig,
}

impl StepCounter {
    pub fn new(config: StepConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StepConfig {
        &self.config
    }
}

impl Default for StepCounter {
    fn default() -> Self {
        Self::new(StepConfig::default())
    }
}

impl Reducer for StepCounter {
    type Sample = Sample;
    type State = StepState;

    fn initial_state(&self) -> StepState {
        StepState::default()
    }

    fn reduce(&self, state: &StepState, sample: &Sample, effects: &mut Vec<Effect>) -> Result<StepState> {
        let sample = sample.validate()?;
        let mut next = state.clone();
        next.last_reading = Some((sample.x, sample.y, sample.z));

        let Some((px, py, pz)) = state.last_reading else {
            return Ok(next);
        };

        let distance = magnitude(sample.x - px, sample.y - py, sample.z - pz);
        next.window.push_back(distance);
        while next.window.len() > self.config.window_len.max(1) {
            next.window.pop_front();
        }
        let average = next.window.iter().sum::<f64>() / next.window.len() as f64;
        next.moving = average > self.config.moving_threshold;

        let cooled_down = state
            .last_step_ms
            .map_or(true, |last| sample.timestamp_ms.saturating_sub(last) > self.config.cooldown_ms);

        if next.moving && distance > self.config.distance_threshold && cooled_down {
            next.steps += 1;
            next.last_step_ms = Some(sample.timestamp_ms);

            if next.steps >= self.config.daily_goal && !next.goal_reached {
                next.goal_reached = true;
                log::info!("daily step goal reached ({} steps)", next.steps);
                effects.push(Effect::alert(
                    "Goal Reached!",
                    format!("You walked {} steps today.", next.steps),
                ));
            }
        }

        Ok(next)
    }

    fn changed(&self, published: &StepState, next: &StepState) -> bool {
        published.steps != next.steps
            || published.moving != next.moving
            || published.goal_reached != next.goal_reached
    }
}

impl Presenter for StepCounter {
    fn gauge(&self, state: &StepState) -> Gauge {
        let goal = self.config.daily_goal.max(1) as f64;
        let fill = if state.goal_reached {
            Rgb888::new(0x40, 0xc0, 0x57)
        } else {
            Rgb888::new(0x22, 0x8b, 0xe6)
        };
        Gauge::new(state.steps as f64 / goal, fill)
    }
}

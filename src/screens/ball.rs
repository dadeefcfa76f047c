// Sensify - Ball Balance Game
//
// Tilt rolls the ball; holding it within the centre radius for the win
// duration wins the round.

use embedded_graphics::pixelcolor::Rgb888;

use crate::config::*;
use crate::error::{Result, SensifyError};
use crate::events::{Effect, Sample};
use crate::present::{Gauge, Presenter};
use crate::reducer::Reducer;

#[derive(Debug, Clone, PartialEq)]
pub struct BallConfig {
    pub field_width: f64,
    pub field_height: f64,
    pub ball_size: f64,
    /// Pixels moved per unit of tilt per sample.
    pub gain: f64,
    pub center_threshold: f64,
    pub win_duration_ms: u64,
}

impl Default for BallConfig {
    fn default() -> Self {
        Self {
            field_width: BALL_FIELD_WIDTH,
            field_height: BALL_FIELD_HEIGHT,
            ball_size: BALL_SIZE,
            gain: BALL_GAIN,
            center_threshold: BALL_CENTER_THRESHOLD,
            win_duration_ms: BALL_WIN_DURATION_MS,
        }
    }
}

impl BallConfig {
    pub fn validate(&self) -> Result<()> {
        if self.field_width < self.ball_size || self.field_height < self.ball_size {
            return Err(SensifyError::InvalidConfig(
                "ball does not fit on the field".into(),
            ));
        }
        if self.win_duration_ms == 0 {
            return Err(SensifyError::InvalidConfig("win duration must be non-zero".into()));
        }
        Ok(())
    }

    fn center(&self) -> (f64, f64) {
        (self.field_width / 2.0, self.field_height / 2.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BallState {
    pub x: f64,
    pub y: f64,
    pub hold_started_ms: Option<u64>,
    /// 0-100.
    pub progress: f64,
    pub won: bool,
}

pub struct BallGame {
    config: BallConfig,
}

impl BallGame {
    pub fn new(config: BallConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Ball back in the middle, round not yet won.
    pub fn new_round(&self) -> BallState {
        let (x, y) = self.config.center();
        BallState {
            x,
            y,
            ..BallState::default()
        }
    }

    pub fn progress_message(&self, state: &BallState) -> String {
        if state.won {
            return "You Win!".to_owned();
        }
        if state.progress == 0.0 {
            return format!(
                "Move the ball to the center and hold for {} seconds!",
                self.config.win_duration_ms / 1000
            );
        }
        let remaining_ms = self.config.win_duration_ms as f64 * (1.0 - state.progress / 100.0);
        format!(
            "Keep holding! {} seconds remaining",
            (remaining_ms / 1000.0).ceil() as u64
        )
    }
}

impl Reducer for BallGame {
    type Sample = Sample;
    type State = BallState;

    fn initial_state(&self) -> BallState {
        self.new_round()
    }

    fn reduce(&self, state: &BallState, sample: &Sample, effects: &mut Vec<Effect>) -> Result<BallState> {
        let sample = sample.validate()?;
        let c = &self.config;
        let mut next = BallState {
            x: (state.x - sample.x * c.gain).clamp(0.0, c.field_width - c.ball_size),
            y: (state.y + sample.y * c.gain).clamp(0.0, c.field_height - c.ball_size),
            ..*state
        };
        if next.won {
            return Ok(next);
        }

        let (cx, cy) = c.center();
        let centered = (next.x - cx).hypot(next.y - cy) <= c.center_threshold;
        if !centered {
            next.hold_started_ms = None;
            next.progress = 0.0;
            return Ok(next);
        }

        let started = *next.hold_started_ms.get_or_insert(sample.timestamp_ms);
        let elapsed = sample.timestamp_ms.saturating_sub(started);
        next.progress = (elapsed as f64 / c.win_duration_ms as f64 * 100.0).min(100.0);
        if elapsed >= c.win_duration_ms {
            next.won = true;
            log::info!("ball game won");
            effects.push(Effect::alert(
                "You Win!",
                format!("You held the ball in the center for {} seconds!", c.win_duration_ms / 1000),
            ));
        }
        Ok(next)
    }

    fn changed(&self, published: &BallState, next: &BallState) -> bool {
        (published.x - next.x).abs() >= 0.5
            || (published.y - next.y).abs() >= 0.5
            || published.progress.floor() != next.progress.floor()
            || published.won != next.won
    }
}

impl Presenter for BallGame {
    fn gauge(&self, state: &BallState) -> Gauge {
        let fill = if state.won {
            Rgb888::new(0x40, 0xc0, 0x57)
        } else {
            Rgb888::new(0xa7, 0xff, 0xeb)
        };
        Gauge::new(state.progress / 100.0, fill)
    }
}

// Sensify - Fall Detector Screen
//
// A reading above the fall threshold raises a "potential fall" alert and
// starts a response countdown. If the user does not confirm they are safe
// before it expires, the emergency alert goes out. Further spikes while a
// countdown is pending are ignored.

use embedded_graphics::pixelcolor::Rgb888;

use crate::config::*;
use crate::contact::EmergencyContact;
use crate::error::{Result, SensifyError};
use crate::events::{Effect, Sample};
use crate::present::{Gauge, Presenter};
use crate::reducer::Reducer;

#[derive(Debug, Clone, PartialEq)]
pub struct FallConfig {
    pub threshold: f64,
    pub response_timeout_ms: u64,
}

impl Default for FallConfig {
    fn default() -> Self {
        Self {
            threshold: FALL_THRESHOLD,
            response_timeout_ms: FALL_RESPONSE_TIMEOUT_MS,
        }
    }
}

impl FallConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.threshold.is_finite() || self.threshold <= 0.0 {
            return Err(SensifyError::InvalidConfig(format!(
                "fall threshold must be positive, got {}",
                self.threshold
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FallState {
    pub acceleration: f64,
    /// Deadline of the pending countdown, if any.
    pub deadline_ms: Option<u64>,
    pub falls_detected: u32,
    pub escalations: u32,
}

impl FallState {
    pub fn countdown_remaining_ms(&self, now_ms: u64) -> Option<u64> {
        self.deadline_ms.map(|d| d.saturating_sub(now_ms))
    }
}

pub struct FallDetector {
    config: FallConfig,
    contact: Option<String>,
}

impl FallDetector {
    pub fn new(config: FallConfig, contact: &EmergencyContact) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            contact: contact.number().map(str::to_owned),
        })
    }

    /// Escalates an expired countdown. Called on every sample and may be
    /// called from a timer between samples.
    pub fn tick(&self, state: &FallState, now_ms: u64, effects: &mut Vec<Effect>) -> FallState {
        match state.deadline_ms {
            Some(deadline) if now_ms >= deadline => {
                effects.push(self.emergency_alert());
                log::warn!("no response within {} ms; emergency alert sent", self.config.response_timeout_ms);
                FallState {
                    deadline_ms: None,
                    escalations: state.escalations + 1,
                    ..*state
                }
            }
            _ => *state,
        }
    }

    /// User tapped "I'm okay": cancels the pending countdown.
    pub fn confirm_safe(&self, state: &FallState) -> FallState {
        if state.deadline_ms.is_some() {
            log::info!("fall alert cancelled by user");
        }
        FallState {
            deadline_ms: None,
            ..*state
        }
    }

    /// Manual trigger from the emergency button.
    pub fn manual_alert(&self, state: &FallState, effects: &mut Vec<Effect>) -> FallState {
        effects.push(self.emergency_alert());
        FallState {
            deadline_ms: None,
            escalations: state.escalations + 1,
            ..*state
        }
    }

    fn emergency_alert(&self) -> Effect {
        let body = match &self.contact {
            Some(number) => format!("Emergency contact {number} has been notified"),
            None => "No emergency contact set".to_owned(),
        };
        Effect::alert("Emergency Alert Sent", body)
    }
}

impl Reducer for FallDetector {
    type Sample = Sample;
    type State = FallState;

    fn initial_state(&self) -> FallState {
        FallState::default()
    }

    fn reduce(&self, state: &FallState, sample: &Sample, effects: &mut Vec<Effect>) -> Result<FallState> {
        let acceleration = sample.validate()?.magnitude();
        let mut next = self.tick(state, sample.timestamp_ms, effects);
        next.acceleration = acceleration;

        if acceleration > self.config.threshold && next.deadline_ms.is_none() {
            log::warn!("potential fall ({:.2})", acceleration);
            next.deadline_ms = Some(sample.timestamp_ms.saturating_add(self.config.response_timeout_ms));
            next.falls_detected += 1;
            effects.push(Effect::alert(
                "Potential Fall Detected",
                format!(
                    "Are you okay? Tap to confirm you are safe. Emergency contact will be notified in {} seconds.",
                    self.config.response_timeout_ms / 1000
                ),
            ));
        }

        Ok(next)
    }

    fn changed(&self, published: &FallState, next: &FallState) -> bool {
        published.deadline_ms != next.deadline_ms
            || published.falls_detected != next.falls_detected
            || published.escalations != next.escalations
    }
}

impl Presenter for FallDetector {
    fn gauge(&self, state: &FallState) -> Gauge {
        let fill = if state.deadline_ms.is_some() {
            Rgb888::new(0xf0, 0x3e, 0x3e)
        } else {
            Rgb888::new(0x40, 0xc0, 0x57)
        };
        Gauge::new(state.acceleration / (self.config.threshold * 2.0), fill)
    }
}

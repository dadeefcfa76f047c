// Sensify - Threshold Classifier
//
// Maps a scalar reading onto one of an ordered set of named states.
//
// A table is scanned in ascending threshold order and the first state whose
// threshold is >= the reading wins; readings above every threshold land on
// the last (highest) state. Equal thresholds resolve to the state declared
// first. Two debounced variants sit on top:
//
//   * `HysteresisGate` - binary detected/clear with separate entry and exit
//     thresholds (magnet on/off).
//   * `HysteresisClassifier` - multi-state table where falling transitions
//     must clear the lower boundary by an exit ratio.

use crate::error::{Result, SensifyError};

// ---------------------------------------------------------------------------
// State tables
// ---------------------------------------------------------------------------

/// One entry of a threshold table.
#[derive(Debug, Clone, PartialEq)]
pub struct StateSpec<P> {
    pub threshold: f64,
    pub label: String,
    pub payload: P,
}

impl<P> StateSpec<P> {
    pub fn new(threshold: f64, label: impl Into<String>, payload: P) -> Self {
        Self {
            threshold,
            label: label.into(),
            payload,
        }
    }
}

/// Non-empty, ascending threshold table.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedStates<P> {
    states: Vec<StateSpec<P>>,
}

/// Result of classifying one reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classified<'a, P> {
    pub ordinal: usize,
    pub state: &'a StateSpec<P>,
}

impl<P> OrderedStates<P> {
    pub fn new(states: Vec<StateSpec<P>>) -> Result<Self> {
        if states.is_empty() {
            return Err(SensifyError::EmptyStateTable);
        }
        for pair in states.windows(2) {
            if !pair[0].threshold.is_finite() || !pair[1].threshold.is_finite() {
                return Err(SensifyError::InvalidConfig(format!(
                    "non-finite threshold near state '{}'",
                    pair[0].label
                )));
            }
            if pair[1].threshold < pair[0].threshold {
                return Err(SensifyError::InvalidConfig(format!(
                    "state '{}' ({}) is declared after '{}' ({}) but has a lower threshold",
                    pair[1].label, pair[1].threshold, pair[0].label, pair[0].threshold
                )));
            }
        }
        Ok(Self { states })
    }

    /// Total: always returns exactly one state.
    pub fn classify(&self, scalar: f64) -> Classified<'_, P> {
        let ordinal = self.ordinal_of(scalar);
        Classified {
            ordinal,
            state: &self.states[ordinal],
        }
    }

    pub fn ordinal_of(&self, scalar: f64) -> usize {
        self.states
            .iter()
            .position(|s| s.threshold >= scalar)
            .unwrap_or(self.states.len() - 1)
    }

    pub fn get(&self, ordinal: usize) -> Option<&StateSpec<P>> {
        self.states.get(ordinal)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    // Never true; the constructor rejects empty tables.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StateSpec<P>> {
        self.states.iter()
    }
}

impl OrderedStates<()> {
    /// Convenience for tables without a payload.
    pub fn from_labels(table: &[(f64, &str)]) -> Result<Self> {
        Self::new(
            table
                .iter()
                .map(|&(threshold, label)| StateSpec::new(threshold, label, ()))
                .collect(),
        )
    }
}

/// Free-function form of [`OrderedStates::classify`].
pub fn classify<P>(scalar: f64, states: &OrderedStates<P>) -> Classified<'_, P> {
    states.classify(scalar)
}

// ---------------------------------------------------------------------------
// Binary hysteresis
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Entered,
    Exited,
}

/// Enters at `reading >= entry`, leaves at `reading < exit`.
#[derive(Debug, Clone, PartialEq)]
pub struct HysteresisGate {
    entry: f64,
    exit: f64,
    active: bool,
}

impl HysteresisGate {
    pub fn new(entry: f64, exit: f64) -> Result<Self> {
        if !entry.is_finite() || !exit.is_finite() {
            return Err(SensifyError::InvalidConfig(
                "hysteresis thresholds must be finite".into(),
            ));
        }
        if exit > entry {
            return Err(SensifyError::InvalidConfig(format!(
                "exit threshold {exit} is above entry threshold {entry}"
            )));
        }
        Ok(Self {
            entry,
            exit,
            active: false,
        })
    }

    /// Exit threshold derived as `ratio * entry` (e.g. 0.8).
    pub fn with_ratio(entry: f64, ratio: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&ratio) {
            return Err(SensifyError::InvalidConfig(format!(
                "exit ratio {ratio} must lie in [0, 1]"
            )));
        }
        Self::new(entry, entry * ratio)
    }

    /// Pure form of [`update`](Self::update) for callers that keep the
    /// active flag in their own state.
    pub fn step(&self, active: bool, reading: f64) -> Option<Edge> {
        if !active && reading >= self.entry {
            Some(Edge::Entered)
        } else if active && reading < self.exit {
            Some(Edge::Exited)
        } else {
            None
        }
    }

    /// Feeds one reading, returning the edge crossed, if any.
    pub fn update(&mut self, reading: f64) -> Option<Edge> {
        let edge = self.step(self.active, reading);
        match edge {
            Some(Edge::Entered) => self.active = true,
            Some(Edge::Exited) => self.active = false,
            None => {}
        }
        edge
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn entry(&self) -> f64 {
        self.entry
    }

    pub fn exit(&self) -> f64 {
        self.exit
    }

    pub fn reset(&mut self) {
        self.active = false;
    }
}

// ---------------------------------------------------------------------------
// Multi-state hysteresis
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: Option<usize>,
    pub to: usize,
}

/// Rising transitions happen as soon as the plain table says so; falling
/// ones only once the reading is at or below `exit_ratio` times the lower
/// boundary of the active state.
#[derive(Debug, Clone)]
pub struct HysteresisClassifier<P> {
    states: OrderedStates<P>,
    exit_ratio: f64,
    current: Option<usize>,
}

impl<P> HysteresisClassifier<P> {
    pub fn new(states: OrderedStates<P>, exit_ratio: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&exit_ratio) {
            return Err(SensifyError::InvalidConfig(format!(
                "exit ratio {exit_ratio} must lie in [0, 1]"
            )));
        }
        Ok(Self {
            states,
            exit_ratio,
            current: None,
        })
    }

    /// No exit margin: behaves exactly like [`OrderedStates::classify`].
    pub fn without_margin(states: OrderedStates<P>) -> Self {
        Self {
            states,
            exit_ratio: 1.0,
            current: None,
        }
    }

    /// Pure form of [`update`](Self::update) for callers that keep the
    /// active ordinal in their own state. An ordinal outside the table
    /// counts as no current state.
    pub fn step(&self, current: Option<usize>, scalar: f64) -> Option<Transition> {
        let current = current.filter(|&i| i < self.states.len());
        let candidate = self.states.ordinal_of(scalar);
        let to = match current {
            None => candidate,
            Some(current) if candidate > current => candidate,
            Some(current) if candidate < current => {
                let boundary = self.states.get(current - 1).map_or(f64::INFINITY, |s| s.threshold);
                if scalar <= boundary * self.exit_ratio {
                    candidate
                } else {
                    return None;
                }
            }
            Some(_) => return None,
        };
        Some(Transition { from: current, to })
    }

    pub fn update(&mut self, scalar: f64) -> Option<Transition> {
        let transition = self.step(self.current, scalar)?;
        self.current = Some(transition.to);
        Some(transition)
    }

    pub fn current(&self) -> Option<&StateSpec<P>> {
        self.current.and_then(|i| self.states.get(i))
    }

    pub fn current_ordinal(&self) -> Option<usize> {
        self.current
    }

    pub fn states(&self) -> &OrderedStates<P> {
        &self.states
    }

    pub fn reset(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> OrderedStates<()> {
        OrderedStates::from_labels(&[(0.0, "BLACK"), (5.0, "DIM"), (20.0, "BRIGHT")])
            .unwrap()
    }

    #[test]
    fn test_first_threshold_at_or_above_wins() {
        let t = table();
        assert_eq!(t.classify(3.0).state.label, "DIM");
        assert_eq!(t.classify(0.0).state.label, "BLACK");
        assert_eq!(t.classify(5.0).state.label, "DIM");
        assert_eq!(t.classify(5.0001).state.label, "BRIGHT");
    }

    #[test]
    fn test_overflow_lands_on_last_state() {
        assert_eq!(table().classify(999.0).state.label, "BRIGHT");
        assert_eq!(table().classify(f64::INFINITY).ordinal, 2);
    }

    #[test]
    fn test_shared_threshold_first_declared_wins() {
        let t = OrderedStates::from_labels(&[(0.0, "A"), (10.0, "B"), (10.0, "C")]).unwrap();
        assert_eq!(t.classify(10.0).state.label, "B");
        assert_eq!(t.classify(7.0).state.label, "B");
    }

    #[test]
    fn test_rejects_empty_and_descending_tables() {
        assert_eq!(
            OrderedStates::<()>::new(Vec::new()).unwrap_err(),
            SensifyError::EmptyStateTable
        );
        assert!(OrderedStates::from_labels(&[(10.0, "A"), (5.0, "B")]).is_err());
    }

    #[test]
    fn test_monotonic_over_sweep() {
        let t = table();
        let mut last = 0;
        for i in 0..5000 {
            let ordinal = t.classify(i as f64 * 0.01).ordinal;
            assert!(ordinal >= last);
            last = ordinal;
        }
    }

    #[test]
    fn test_gate_scenario_two_transitions() {
        let mut gate = HysteresisGate::with_ratio(30.0, 0.8).unwrap();
        let edges: Vec<_> = [10.0, 32.0, 28.0, 26.0, 22.0]
            .iter()
            .map(|&m| gate.update(m))
            .collect();
        assert_eq!(
            edges,
            vec![None, Some(Edge::Entered), None, None, Some(Edge::Exited)]
        );
    }

    #[test]
    fn test_gate_rejects_exit_above_entry() {
        assert!(HysteresisGate::new(10.0, 12.0).is_err());
        assert!(HysteresisGate::with_ratio(10.0, 1.5).is_err());
    }

    #[test]
    fn test_gate_oscillation_does_not_flicker() {
        let mut gate = HysteresisGate::with_ratio(30.0, 0.8).unwrap();
        let changes = (0..100)
            .map(|i| if i % 2 == 0 { 29.0 } else { 31.0 })
            .filter_map(|m| gate.update(m))
            .count();
        assert_eq!(changes, 1);
        assert!(gate.is_active());
    }

    #[test]
    fn test_multi_state_falling_needs_margin() {
        let mut c = HysteresisClassifier::new(table(), 0.8).unwrap();
        assert_eq!(c.update(10.0), Some(Transition { from: None, to: 2 }));
        // DIM on the plain table, but not yet below 0.8 * 5.
        assert_eq!(c.update(4.5), None);
        assert_eq!(c.update(3.9), Some(Transition { from: Some(2), to: 1 }));
        // The DIM/BLACK boundary is 0, so only 0 itself drops to BLACK.
        assert_eq!(c.update(0.5), None);
        assert_eq!(c.update(0.0), Some(Transition { from: Some(1), to: 0 }));
    }

    #[test]
    fn test_multi_state_oscillation_at_boundary() {
        let mut c = HysteresisClassifier::new(table(), 0.8).unwrap();
        c.update(6.0);
        let flips = (0..50)
            .map(|i| if i % 2 == 0 { 4.8 } else { 5.2 })
            .filter_map(|v| c.update(v))
            .count();
        assert_eq!(flips, 0);
        assert_eq!(c.current().map(|s| s.label.as_str()), Some("BRIGHT"));
    }

    #[test]
    fn test_step_with_unknown_ordinal_reclassifies() {
        let c = HysteresisClassifier::new(table(), 0.8).unwrap();
        assert_eq!(c.step(Some(7), 3.0), Some(Transition { from: None, to: 1 }));
        assert_eq!(c.step(Some(usize::MAX), 30.0), Some(Transition { from: None, to: 2 }));
    }

    #[test]
    fn test_without_margin_matches_plain_table() {
        let c = HysteresisClassifier::without_margin(table());
        let mut current = None;
        for x in [25.0, 19.0, 4.0, 0.0, 6.0, 30.0, 1.0] {
            if let Some(t) = c.step(current, x) {
                current = Some(t.to);
            }
            assert_eq!(current, Some(table().ordinal_of(x)));
        }
    }
}

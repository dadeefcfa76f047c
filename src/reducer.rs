// Sensify - Stream Reducer
//
// Owns one sensor subscription and folds its samples into screen state.
//
// Lifecycle:
//
//   Uninitialized --start()--> Active --stop()--> Stopped --start()--> Active
//         |                      |
//      probe() fails       source disconnects
//         v                      v
//     Unavailable  <-------------'      (terminal for this instance)
//
// Samples arrive over an mpsc channel and are drained on the owner's thread
// by `pump()`, in arrival order, one at a time. Dropping the reducer stops
// the subscription.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use crate::error::{Result, SensifyError};
use crate::events::{Effect, SensorKind};

pub type SubscriptionId = u64;

// ---------------------------------------------------------------------------
// Seams
// ---------------------------------------------------------------------------

/// A platform sensor binding.
pub trait SampleSource {
    type Sample: Send + 'static;

    fn kind(&self) -> SensorKind;

    fn is_available(&self) -> bool;

    fn set_update_interval(&mut self, interval_ms: u64);

    /// Registers a listener. Samples are sent until `unsubscribe` is called
    /// or the receiving end is dropped.
    fn subscribe(&mut self, tx: Sender<Self::Sample>) -> Result<SubscriptionId>;

    /// Must tolerate unknown or already-removed ids.
    fn unsubscribe(&mut self, id: SubscriptionId);
}

/// Pure per-sample transform plus the "materially changed" predicate.
pub trait Reducer {
    type Sample;
    type State: Clone;

    fn initial_state(&self) -> Self::State;

    /// Side effects are pushed onto `effects` rather than performed.
    fn reduce(
        &self,
        state: &Self::State,
        sample: &Self::Sample,
        effects: &mut Vec<Effect>,
    ) -> Result<Self::State>;

    fn changed(&self, published: &Self::State, next: &Self::State) -> bool;

    /// Effects that close whatever `state` left open (a playing sound, say)
    /// when the subscription ends.
    fn on_stop(&self, _state: &Self::State, _effects: &mut Vec<Effect>) {}
}

/// Receives published state and emitted effects.
pub trait StateSink<S> {
    fn on_state_change(&mut self, state: &S);

    fn on_effect(&mut self, _effect: &Effect) {}
}

impl<S, F> StateSink<S> for F
where
    F: FnMut(&S),
{
    fn on_state_change(&mut self, state: &S) {
        self(state)
    }
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReducerStatus {
    Uninitialized,
    Active,
    Stopped,
    Unavailable,
}

struct Subscription<T> {
    id: SubscriptionId,
    rx: Receiver<T>,
}

enum Lifecycle<T> {
    Uninitialized,
    Active(Subscription<T>),
    Stopped,
    Unavailable,
}

impl<T> Lifecycle<T> {
    fn status(&self) -> ReducerStatus {
        match self {
            Self::Uninitialized => ReducerStatus::Uninitialized,
            Self::Active(_) => ReducerStatus::Active,
            Self::Stopped => ReducerStatus::Stopped,
            Self::Unavailable => ReducerStatus::Unavailable,
        }
    }
}

/// Outcome of one `pump()` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PumpReport {
    pub processed: usize,
    pub dropped: usize,
    pub published: usize,
}

// ---------------------------------------------------------------------------
// Stream Reducer
// ---------------------------------------------------------------------------

pub struct StreamReducer<Src, R>
where
    Src: SampleSource,
    R: Reducer<Sample = Src::Sample>,
{
    source: Src,
    reducer: R,
    state: R::State,
    published: R::State,
    lifecycle: Lifecycle<Src::Sample>,
    /// Teardown effects not yet handed to a sink.
    pending: Vec<Effect>,
}

impl<Src, R> StreamReducer<Src, R>
where
    Src: SampleSource,
    R: Reducer<Sample = Src::Sample>,
{
    pub fn new(source: Src, reducer: R) -> Self {
        let state = reducer.initial_state();
        Self {
            source,
            reducer,
            published: state.clone(),
            state,
            lifecycle: Lifecycle::Uninitialized,
            pending: Vec::new(),
        }
    }

    pub fn status(&self) -> ReducerStatus {
        self.lifecycle.status()
    }

    pub fn state(&self) -> &R::State {
        &self.state
    }

    pub fn reducer(&self) -> &R {
        &self.reducer
    }

    pub fn source(&self) -> &Src {
        &self.source
    }

    /// One-shot availability check before subscribing.
    pub fn probe(&mut self) -> ReducerStatus {
        if matches!(self.lifecycle, Lifecycle::Uninitialized | Lifecycle::Stopped)
            && !self.source.is_available()
        {
            log::warn!("{} unavailable", self.source.kind());
            self.lifecycle = Lifecycle::Unavailable;
        }
        self.status()
    }

    /// Subscribes with the given update interval. A live subscription is
    /// released first, so repeated starts never stack listeners.
    pub fn start(&mut self, interval_ms: u64) -> Result<()> {
        let kind = self.source.kind();
        if matches!(self.lifecycle, Lifecycle::Unavailable) {
            return Err(SensifyError::SensorUnavailable(kind));
        }
        self.stop();

        if !self.source.is_available() {
            log::warn!("{} unavailable; not subscribing", kind);
            self.lifecycle = Lifecycle::Unavailable;
            return Err(SensifyError::SensorUnavailable(kind));
        }

        self.source.set_update_interval(interval_ms);
        let (tx, rx) = mpsc::channel();
        match self.source.subscribe(tx) {
            Ok(id) => {
                self.reset();
                self.lifecycle = Lifecycle::Active(Subscription { id, rx });
                log::info!("{} subscribed (id {}, every {} ms)", kind, id, interval_ms);
                Ok(())
            }
            Err(e) => {
                log::error!("{} subscribe failed: {}", kind, e);
                self.lifecycle = Lifecycle::Unavailable;
                Err(e)
            }
        }
    }

    /// Releases the subscription. No-op unless active.
    ///
    /// Teardown effects from [`Reducer::on_stop`] are queued and delivered
    /// by the next `pump()` ahead of any new sample, or right away by
    /// [`stop_with`](Self::stop_with).
    pub fn stop(&mut self) {
        if !matches!(self.lifecycle, Lifecycle::Active(_)) {
            return;
        }
        if let Lifecycle::Active(sub) = std::mem::replace(&mut self.lifecycle, Lifecycle::Stopped) {
            self.source.unsubscribe(sub.id);
            self.reducer.on_stop(&self.state, &mut self.pending);
            log::info!("{} unsubscribed (id {})", self.source.kind(), sub.id);
        }
    }

    /// `stop()` followed by delivery of the teardown effects.
    pub fn stop_with(&mut self, sink: &mut impl StateSink<R::State>) {
        self.stop();
        self.flush_pending(sink);
    }

    /// Drains every pending sample through the reducer.
    pub fn pump(&mut self, sink: &mut impl StateSink<R::State>) -> PumpReport {
        let mut report = PumpReport::default();
        let mut effects = Vec::new();
        self.flush_pending(sink);

        loop {
            let next = match &self.lifecycle {
                Lifecycle::Active(sub) => sub.rx.try_recv(),
                _ => break,
            };

            let sample = match next {
                Ok(sample) => sample,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.on_disconnect();
                    break;
                }
            };

            report.processed += 1;
            match self.reducer.reduce(&self.state, &sample, &mut effects) {
                Ok(next_state) => {
                    for effect in effects.drain(..) {
                        sink.on_effect(&effect);
                    }
                    if self.reducer.changed(&self.published, &next_state) {
                        self.published = next_state.clone();
                        self.state = next_state;
                        sink.on_state_change(&self.state);
                        report.published += 1;
                    } else {
                        self.state = next_state;
                    }
                }
                Err(e) => {
                    effects.clear();
                    report.dropped += 1;
                    log::warn!("{}: {}", self.source.kind(), e);
                }
            }
        }

        // A disconnect queues teardown effects too.
        self.flush_pending(sink);
        report
    }

    fn flush_pending(&mut self, sink: &mut impl StateSink<R::State>) {
        for effect in self.pending.drain(..) {
            sink.on_effect(&effect);
        }
    }

    /// Returns state to the reducer's initial value without publishing.
    pub fn reset(&mut self) {
        self.state = self.reducer.initial_state();
        self.published = self.state.clone();
    }

    /// Installs `state` directly (user actions such as a mode toggle) and
    /// publishes it.
    pub fn replace_state(&mut self, state: R::State, sink: &mut impl StateSink<R::State>) {
        self.state = state;
        self.published = self.state.clone();
        sink.on_state_change(&self.state);
    }

    fn on_disconnect(&mut self) {
        if let Lifecycle::Active(sub) =
            std::mem::replace(&mut self.lifecycle, Lifecycle::Unavailable)
        {
            self.source.unsubscribe(sub.id);
            self.reducer.on_stop(&self.state, &mut self.pending);
        }
        log::error!("{} stream ended; sensor unavailable", self.source.kind());
    }
}

impl<Src, R> Drop for StreamReducer<Src, R>
where
    Src: SampleSource,
    R: Reducer<Sample = Src::Sample>,
{
    fn drop(&mut self) {
        self.stop();
        if !self.pending.is_empty() {
            log::warn!(
                "{} dropped with {} undelivered teardown effect(s); use stop_with()",
                self.source.kind(),
                self.pending.len()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::sensor::SimulatedSensor;
    use crate::events::Sample;

    /// Running sum of `x`; publishes only when the whole-number part moves.
    struct Summer;

    impl Reducer for Summer {
        type Sample = Sample;
        type State = f64;

        fn initial_state(&self) -> f64 {
            0.0
        }

        fn reduce(&self, state: &f64, sample: &Sample, effects: &mut Vec<Effect>) -> Result<f64> {
            let x = sample.validate()?.x;
            if x >= 100.0 {
                effects.push(Effect::PlaySound);
            }
            Ok(state + x)
        }

        fn changed(&self, published: &f64, next: &f64) -> bool {
            published.floor() != next.floor()
        }
    }

    #[derive(Default)]
    struct Collect {
        states: Vec<f64>,
        effects: Vec<Effect>,
    }

    impl StateSink<f64> for Collect {
        fn on_state_change(&mut self, state: &f64) {
            self.states.push(*state);
        }

        fn on_effect(&mut self, effect: &Effect) {
            self.effects.push(effect.clone());
        }
    }

    fn screen() -> (SimulatedSensor, StreamReducer<SimulatedSensor, Summer>) {
        let sensor = SimulatedSensor::new(SensorKind::Light);
        let reducer = StreamReducer::new(sensor.clone(), Summer);
        (sensor, reducer)
    }

    #[test]
    fn test_start_subscribes_with_interval() {
        let (sensor, mut r) = screen();
        assert_eq!(r.status(), ReducerStatus::Uninitialized);
        r.start(100).unwrap();
        assert_eq!(r.status(), ReducerStatus::Active);
        assert_eq!(sensor.listener_count(), 1);
        assert_eq!(sensor.update_interval_ms(), 100);
    }

    #[test]
    fn test_restart_never_stacks_listeners() {
        let (sensor, mut r) = screen();
        r.start(100).unwrap();
        r.start(50).unwrap();
        r.start(16).unwrap();
        assert_eq!(sensor.listener_count(), 1);
        assert_eq!(sensor.update_interval_ms(), 16);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let (sensor, mut r) = screen();
        r.stop();
        assert_eq!(r.status(), ReducerStatus::Uninitialized);
        r.start(100).unwrap();
        r.stop();
        r.stop();
        assert_eq!(r.status(), ReducerStatus::Stopped);
        assert_eq!(sensor.listener_count(), 0);
    }

    #[test]
    fn test_publishes_only_material_changes() {
        let (sensor, mut r) = screen();
        let mut sink = Collect::default();
        r.start(100).unwrap();
        sensor.emit_all([0.2, 0.3, 0.6, 0.1, 2.0].map(|x| Sample::scalar(x, 0)));
        let report = r.pump(&mut sink);

        assert_eq!(report.processed, 5);
        // 0.2, 0.5 stay below 1; 1.1 crosses, 1.2 does not, 3.2 does.
        assert_eq!(sink.states.len(), 2);
        assert!((sink.states[0] - 1.1).abs() < 1e-9);
        assert!((sink.states[1] - 3.2).abs() < 1e-9);
        assert_eq!(report.published, 2);
    }

    #[test]
    fn test_suppressed_updates_still_accumulate() {
        let (sensor, mut r) = screen();
        let mut sink = Collect::default();
        r.start(100).unwrap();
        for _ in 0..9 {
            sensor.emit(Sample::scalar(0.1, 0));
        }
        r.pump(&mut sink);
        assert!(sink.states.is_empty());
        assert!((r.state() - 0.9).abs() < 1e-9);

        sensor.emit(Sample::scalar(0.15, 0));
        r.pump(&mut sink);
        assert_eq!(sink.states.len(), 1);
    }

    #[test]
    fn test_effects_reach_sink() {
        let (sensor, mut r) = screen();
        let mut sink = Collect::default();
        r.start(100).unwrap();
        sensor.emit(Sample::scalar(150.0, 0));
        r.pump(&mut sink);
        assert_eq!(sink.effects, vec![Effect::PlaySound]);
    }

    #[test]
    fn test_bad_sample_dropped_state_kept() {
        let (sensor, mut r) = screen();
        let mut sink = Collect::default();
        r.start(100).unwrap();
        sensor.emit(Sample::scalar(1.5, 0));
        sensor.emit(Sample::scalar(f64::NAN, 100));
        sensor.emit(Sample::scalar(1.0, 200));
        let report = r.pump(&mut sink);

        assert_eq!(report.dropped, 1);
        assert_eq!(r.status(), ReducerStatus::Active);
        assert!((r.state() - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_probe_marks_unavailable() {
        let sensor: SimulatedSensor = SimulatedSensor::unavailable(SensorKind::Magnetometer);
        let mut r = StreamReducer::new(sensor.clone(), Summer);
        assert_eq!(r.probe(), ReducerStatus::Unavailable);
        assert!(matches!(
            r.start(100),
            Err(SensifyError::SensorUnavailable(SensorKind::Magnetometer))
        ));
        assert_eq!(sensor.listener_count(), 0);
    }

    #[test]
    fn test_unavailable_is_terminal() {
        let (sensor, mut r) = screen();
        sensor.set_available(false);
        assert!(r.start(100).is_err());
        sensor.set_available(true);
        assert!(r.start(100).is_err());
        assert_eq!(r.status(), ReducerStatus::Unavailable);
    }

    #[test]
    fn test_subscribe_failure_becomes_unavailable() {
        let (sensor, mut r) = screen();
        sensor.fail_next_subscribe();
        assert!(r.start(100).is_err());
        assert_eq!(r.status(), ReducerStatus::Unavailable);
        assert_eq!(sensor.listener_count(), 0);
    }

    #[test]
    fn test_permission_denied_is_reported_once() {
        let (sensor, mut r) = screen();
        sensor.deny_permission();
        let err = r.start(100).unwrap_err();
        assert!(err.user_alert().is_some());
        // Not retried: later starts only see the terminal state.
        let again = r.start(100).unwrap_err();
        assert_eq!(again, SensifyError::SensorUnavailable(SensorKind::Light));
        assert!(again.user_alert().is_none());
    }

    #[test]
    fn test_disconnect_mid_stream() {
        let (sensor, mut r) = screen();
        let mut sink = Collect::default();
        r.start(100).unwrap();
        sensor.emit(Sample::scalar(4.0, 0));
        sensor.disconnect();

        let report = r.pump(&mut sink);
        // Already-queued samples are still processed first.
        assert_eq!(report.processed, 1);
        assert_eq!(r.status(), ReducerStatus::Unavailable);
        assert_eq!(sink.states, vec![4.0]);
    }

    #[test]
    fn test_pump_when_stopped_is_noop() {
        let (sensor, mut r) = screen();
        let mut sink = Collect::default();
        r.start(100).unwrap();
        r.stop();
        sensor.emit(Sample::scalar(5.0, 0));
        assert_eq!(r.pump(&mut sink), PumpReport::default());
    }

    #[test]
    fn test_restart_resets_state() {
        let (sensor, mut r) = screen();
        let mut sink = Collect::default();
        r.start(100).unwrap();
        sensor.emit(Sample::scalar(7.0, 0));
        r.pump(&mut sink);
        r.stop();
        r.start(100).unwrap();
        assert_eq!(*r.state(), 0.0);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let (sensor, mut r) = screen();
        r.start(100).unwrap();
        assert_eq!(sensor.listener_count(), 1);
        drop(r);
        assert_eq!(sensor.listener_count(), 0);
    }

    #[test]
    fn test_replace_state_publishes() {
        let (_sensor, mut r) = screen();
        let mut seen = Vec::new();
        r.replace_state(42.0, &mut |s: &f64| seen.push(*s));
        assert_eq!(seen, vec![42.0]);
        assert_eq!(*r.state(), 42.0);
    }
}

// Sensify - Simulated Sensor Driver
//
// Host stand-in for a platform sensor binding. Clones share one listener
// table, so a generator thread can emit while a screen owns the source.

use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{Result, SensifyError};
use crate::events::{Sample, SensorKind};
use crate::reducer::{SampleSource, SubscriptionId};

struct Inner<T> {
    available: bool,
    fail_subscribe: bool,
    permission_denied: bool,
    interval_ms: u64,
    next_id: SubscriptionId,
    listeners: Vec<(SubscriptionId, Sender<T>)>,
}

/// Thread-safe handle to a shared simulated sensor.
pub struct SimulatedSensor<T = Sample> {
    kind: SensorKind,
    inner: Arc<Mutex<Inner<T>>>,
}

impl<T> Clone for SimulatedSensor<T> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone + Send + 'static> SimulatedSensor<T> {
    pub fn new(kind: SensorKind) -> Self {
        Self {
            kind,
            inner: Arc::new(Mutex::new(Inner {
                available: true,
                fail_subscribe: false,
                permission_denied: false,
                interval_ms: 0,
                next_id: 1,
                listeners: Vec::new(),
            })),
        }
    }

    /// A sensor whose availability probe fails.
    pub fn unavailable(kind: SensorKind) -> Self {
        let sensor = Self::new(kind);
        sensor.set_available(false);
        sensor
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_available(&self, available: bool) {
        self.lock().available = available;
    }

    /// Makes the next `subscribe` call fail as if the platform threw.
    pub fn fail_next_subscribe(&self) {
        self.lock().fail_subscribe = true;
    }

    /// Every later `subscribe` fails as if the user rejected the prompt.
    pub fn deny_permission(&self) {
        self.lock().permission_denied = true;
    }

    /// Delivers one sample to every listener, pruning dropped receivers.
    /// Returns the number of listeners reached.
    pub fn emit(&self, sample: T) -> usize {
        let mut inner = self.lock();
        inner
            .listeners
            .retain(|(_, tx)| tx.send(sample.clone()).is_ok());
        inner.listeners.len()
    }

    pub fn emit_all(&self, samples: impl IntoIterator<Item = T>) {
        for sample in samples {
            self.emit(sample);
        }
    }

    /// Drops every listener's sender, as if the platform stream died.
    pub fn disconnect(&self) {
        let mut inner = self.lock();
        inner.available = false;
        inner.listeners.clear();
    }

    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }

    pub fn update_interval_ms(&self) -> u64 {
        self.lock().interval_ms
    }

    pub fn kind_of(&self) -> SensorKind {
        self.kind
    }
}

impl<T: Clone + Send + 'static> SampleSource for SimulatedSensor<T> {
    type Sample = T;

    fn kind(&self) -> SensorKind {
        self.kind
    }

    fn is_available(&self) -> bool {
        self.lock().available
    }

    fn set_update_interval(&mut self, interval_ms: u64) {
        self.lock().interval_ms = interval_ms;
    }

    fn subscribe(&mut self, tx: Sender<T>) -> Result<SubscriptionId> {
        let mut inner = self.lock();
        if inner.permission_denied {
            return Err(SensifyError::PermissionDenied(format!(
                "access to the {} was rejected",
                self.kind
            )));
        }
        if std::mem::take(&mut inner.fail_subscribe) || !inner.available {
            return Err(SensifyError::SensorUnavailable(self.kind));
        }
        let id = inner.next_id;
        inner.next_id += 1;
        inner.listeners.push((id, tx));
        Ok(id)
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        self.lock().listeners.retain(|(lid, _)| *lid != id);
    }
}

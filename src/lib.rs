// Sensify - Sensor Screens Core
//
// Platform sensor readings are folded by per-screen reducers into small
// state values, classified against threshold tables, and mapped to visual
// and haptic output. The binary in `main.rs` drives every screen from
// simulated sensors on the host.

pub mod classifier;
pub mod config;
pub mod contact;
pub mod drivers;
pub mod effects;
pub mod error;
pub mod events;
pub mod gps;
pub mod integrator;
pub mod present;
pub mod reducer;
pub mod screens;
pub mod tasks;

pub use error::{Result, SensifyError};
pub use events::{Effect, GpsFix, Sample, SensorKind};
pub use reducer::{PumpReport, Reducer, ReducerStatus, SampleSource, StateSink, StreamReducer};

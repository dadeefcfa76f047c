// Sensify - Samples & Emitted Events

use std::fmt;

use crate::error::{Result, SensifyError};

// ---------------------------------------------------------------------------
// Sensor Kinds
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    /// Illuminance in lux, delivered on the `x` axis.
    Light,
    /// Magnetic field, µT per axis.
    Magnetometer,
    /// Linear acceleration, m/s² per axis.
    Accelerometer,
    Location,
}

impl SensorKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Light => "ambient light sensor",
            Self::Magnetometer => "magnetometer",
            Self::Accelerometer => "accelerometer",
            Self::Location => "location",
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

// ---------------------------------------------------------------------------
// Sensor Data (3-axis reading)
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Sample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Monotonic milliseconds.
    pub timestamp_ms: u64,
}

impl Sample {
    pub fn new(x: f64, y: f64, z: f64, timestamp_ms: u64) -> Self {
        Self { x, y, z, timestamp_ms }
    }

    /// Single-axis reading (e.g. illuminance).
    pub fn scalar(value: f64, timestamp_ms: u64) -> Self {
        Self::new(value, 0.0, 0.0, timestamp_ms)
    }

    /// Euclidean norm of the axis triple.
    pub fn magnitude(&self) -> f64 {
        magnitude(self.x, self.y, self.z)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Rejects readings a transform cannot use.
    pub fn validate(&self) -> Result<&Self> {
        if self.is_finite() {
            Ok(self)
        } else {
            Err(SensifyError::TransientSample(format!(
                "non-finite reading ({}, {}, {}) at {} ms",
                self.x, self.y, self.z, self.timestamp_ms
            )))
        }
    }
}

pub fn magnitude(x: f64, y: f64, z: f64) -> f64 {
    (x * x + y * y + z * z).sqrt()
}

// ---------------------------------------------------------------------------
// Location fix
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpsFix {
    pub latitude: f64,
    pub longitude: f64,
    /// Instantaneous speed in m/s, when the platform reports one.
    pub speed_mps: Option<f64>,
    pub timestamp_ms: u64,
}

impl GpsFix {
    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.speed_mps.map_or(true, f64::is_finite)
    }

    pub fn validate(&self) -> Result<&Self> {
        if self.is_finite() {
            Ok(self)
        } else {
            Err(SensifyError::TransientSample(format!(
                "malformed location fix at {} ms",
                self.timestamp_ms
            )))
        }
    }
}

// ---------------------------------------------------------------------------
// Effects - side effects requested by reducers, performed by drivers
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Alternating off/on durations in milliseconds.
    Vibrate(Vec<u64>),
    /// Start the alert sound for the current detection episode.
    PlaySound,
    /// End the current detection episode's sound.
    StopSound,
    /// Fire-and-forget user-visible alert.
    PresentAlert { title: String, body: String },
    /// Target screen brightness, 0.0-1.0.
    SetBrightness(f64),
}

impl Effect {
    pub fn alert(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self::PresentAlert {
            title: title.into(),
            body: body.into(),
        }
    }
}

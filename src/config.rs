// Sensify - Sensor & Screen Configuration
//
// Tunables shared by the reducers and screens. Component `*Config` structs
// build their `Default` from these values.

// ---------------------------------------------------------------------------
// Sampling (milliseconds)
// ---------------------------------------------------------------------------
pub const LIGHT_UPDATE_INTERVAL_MS: u64 = 100;
pub const MAGNET_UPDATE_INTERVAL_MS: u64 = 100;
pub const ACCEL_UPDATE_INTERVAL_MS: u64 = 100;
pub const BALL_UPDATE_INTERVAL_MS: u64 = 16;          // ~60 Hz for smooth rolling
pub const GPS_UPDATE_INTERVAL_MS: u64 = 500;

// ---------------------------------------------------------------------------
// Motion Integrator
// ---------------------------------------------------------------------------
pub const GRAVITY: f64 = 9.81;                        // m/s²
pub const NOISE_EPSILON: f64 = 0.1;                   // m/s² jitter gate
pub const SMOOTHING_ALPHA: f64 = 0.7;                 // weight of previous speed

pub const WALKING_SENSITIVITY: f64 = 0.05;
pub const WALKING_MAX_SPEED: f64 = 10.0;
pub const CYCLING_SENSITIVITY: f64 = 0.08;
pub const CYCLING_MAX_SPEED: f64 = 40.0;
pub const DRIVING_SENSITIVITY: f64 = 0.2;
pub const DRIVING_MAX_SPEED: f64 = 200.0;

/// Speeds closer than this are rendered identically (two decimals).
pub const SPEED_DISPLAY_EPSILON: f64 = 0.005;

// ---------------------------------------------------------------------------
// Units
// ---------------------------------------------------------------------------
pub const KMH_TO_MPH: f64 = 0.621371;
pub const MPS_TO_KMH: f64 = 3.6;

// ---------------------------------------------------------------------------
// Ambient Light
// ---------------------------------------------------------------------------
pub const LIGHT_LEVEL_DEBOUNCE_LUX: f64 = 0.5;

// ---------------------------------------------------------------------------
// Magnet Detector
// ---------------------------------------------------------------------------
pub const MAGNET_ENTRY_THRESHOLD_UT: f64 = 100.0;
pub const MAGNET_EXIT_RATIO: f64 = 0.8;
pub const MAGNET_FULL_SCALE_UT: f64 = 200.0;          // 100 % strength
pub const MAGNET_VIBRATION_PATTERN_MS: [u64; 3] = [200, 100, 200];

// ---------------------------------------------------------------------------
// Tilt / Surface Level
// ---------------------------------------------------------------------------
pub const TILT_BAR_MAX_PX: f64 = 350.0;
pub const TILT_FULL_SCALE_DEG: f64 = 90.0;

// ---------------------------------------------------------------------------
// Step Counter
// ---------------------------------------------------------------------------
pub const STEP_DAILY_GOAL: u32 = 30;
pub const STEP_DISTANCE_THRESHOLD: f64 = 0.5;
pub const STEP_MOVING_THRESHOLD: f64 = 0.1;
pub const STEP_COOLDOWN_MS: u64 = 500;
pub const STEP_WINDOW_LEN: usize = 10;

// ---------------------------------------------------------------------------
// Fall Detector
// ---------------------------------------------------------------------------
pub const FALL_THRESHOLD: f64 = 2.5;                  // m/s²
pub const FALL_RESPONSE_TIMEOUT_MS: u64 = 20_000;     // countdown before escalation
pub const EMERGENCY_CONTACT_KEY: &str = "emergencyContact";
pub const EMERGENCY_CONTACT_MIN_DIGITS: usize = 10;

// ---------------------------------------------------------------------------
// Ball Game
// ---------------------------------------------------------------------------
pub const BALL_FIELD_WIDTH: f64 = 360.0;
pub const BALL_FIELD_HEIGHT: f64 = 640.0;
pub const BALL_SIZE: f64 = 40.0;
pub const BALL_GAIN: f64 = 20.0;
pub const BALL_CENTER_THRESHOLD: f64 = 10.0;
pub const BALL_WIN_DURATION_MS: u64 = 5000;

// ---------------------------------------------------------------------------
// GPS Speedometer
// ---------------------------------------------------------------------------
pub const EARTH_RADIUS_KM: f64 = 6371.0;
pub const GPS_SMOOTHING_FACTOR: f64 = 0.2;
pub const GPS_STATIONARY_SPEED_MPS: f64 = 0.5;        // below this reads as zero
pub const GPS_GAUGE_FULL_SCALE_KMH: f64 = 200.0;

// ---------------------------------------------------------------------------
// Presentation
// ---------------------------------------------------------------------------
pub const SCREEN_WIDTH: u32 = 128;
pub const SCREEN_HEIGHT: u32 = 64;

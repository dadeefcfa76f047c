pub mod audio;
pub mod backlight;
pub mod haptic;
pub mod notify;
pub mod sensor;
pub mod storage;

// Sensify - Screens
//
// One `Reducer` per sensor screen. Each keeps its state in an explicit
// value passed through `reduce`, and requests side effects as `Effect`s.

pub mod ball;
pub mod fall;
pub mod gps_speed;
pub mod light;
pub mod magnet;
pub mod speed;
pub mod steps;
pub mod tilt;

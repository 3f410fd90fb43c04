//! Detector state and the pure step function.

use contracts::Reading;

/// Previous reading plus the previous trigger outcome
///
/// Zeroed on creation and whenever a new sensor session opens.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DetectorState {
    pub last: Reading,
    pub last_shake_detected: bool,
}

impl DetectorState {
    pub const fn new() -> Self {
        Self {
            last: Reading::zero(),
            last_shake_detected: false,
        }
    }
}

/// Three-valued sign: -1, 0 or 1. NaN stays NaN and compares unequal to everything.
fn sign(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        // 0.0, -0.0 and NaN
        value * 0.0
    }
}

/// Advance the detector by one reading
///
/// Returns the next state and whether this reading is a rising edge.
pub fn step(state: DetectorState, reading: Reading, threshold: f64) -> (DetectorState, bool) {
    let last = state.last;
    let delta_x = reading.x - last.x;
    let delta_y = reading.y - last.y;
    let delta_z = reading.z - last.z;

    let magnitude_trigger =
        delta_x.abs() > threshold || delta_y.abs() > threshold || delta_z.abs() > threshold;

    let near_rest =
        reading.x.abs() < threshold && reading.y.abs() < threshold && reading.z.abs() < threshold;

    let sign_trigger = sign(delta_x) != sign(last.x)
        || sign(delta_y) != sign(last.y)
        || sign(delta_z) != sign(last.z)
        || near_rest;

    let shake_detected = magnitude_trigger && sign_trigger;
    let rising_edge = shake_detected && !state.last_shake_detected;

    let next = DetectorState {
        last: reading,
        last_shake_detected: shake_detected,
    };

    (next, rising_edge)
}

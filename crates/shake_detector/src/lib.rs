//! # Shake Detector
//!
//! Turns a raw 3-axis reading stream into discrete shake events.
//!
//! Responsibilities:
//! - Delta magnitude trigger (sudden motion)
//! - Sign reversal / near-rest trigger (one swing is one shake)
//! - Rising edge output (sustained shaking fires once)
//!
//! ## Usage Example
//!
//! ```
//! use contracts::Reading;
//! use shake_detector::ShakeDetector;
//!
//! let mut detector = ShakeDetector::default();
//! assert!(!detector.process(Reading::new(0.0, 0.0, 0.0)));
//! assert!(detector.process(Reading::new(30.0, 0.0, 0.0)));
//! assert!(!detector.process(Reading::new(30.0, 0.0, 0.0)));
//! ```

mod detector;
mod state;

pub use contracts::{Reading, DEFAULT_SHAKE_THRESHOLD};
pub use detector::{DetectorStats, ShakeDetector};
pub use state::{step, DetectorState};

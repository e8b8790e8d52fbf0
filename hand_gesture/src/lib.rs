//! # hand_gesture
//!
//! Turns noisy per-frame hand-landmark samples into a stable discrete
//! [`GestureState`] plus a continuous [`PointerSample`], and publishes the
//! latest result through a single-writer / single-reader [`tracking`] cell.
//!
//! ## Gesture rules
//!
//! | Condition (first match wins) | Gesture |
//! |---|---|
//! | thumb–index pinch **and** ≥ 2 digits extended | `Pinch` |
//! | ≥ 4 digits extended | `Open` |
//! | anything else, or no hand | `Neutral` |
//!
//! ## Quick start
//!
//! ```rust
//! use hand_gesture::{classify, tracking_signal, GestureState};
//!
//! let (mut writer, reader) = tracking_signal();
//! let result = classify(None);
//! writer.publish(&result);
//!
//! assert_eq!(reader.gesture(), GestureState::Neutral);
//! assert!(!reader.latest().present);
//! ```

pub mod landmark;
pub mod classify;
pub mod tracking;

pub use landmark::{Landmark, LandmarkFrame, LANDMARK_COUNT};
pub use classify::{classify, Classification, GestureState, PointerSample};
pub use tracking::{tracking_signal, TrackingReader, TrackingWriter};

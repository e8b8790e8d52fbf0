//! Stateless per-frame gesture classification.
//!
//! [`classify`] is a pure function of the 21 input points: identical frames
//! always produce identical results and nothing is remembered between calls.
//! Debouncing, if any, belongs to the caller.

use crate::landmark::{
    LandmarkFrame, FINGER_BASES, FINGER_TIPS, INDEX_BASE, INDEX_TIP, THUMB_BASE, THUMB_TIP,
};

// ════════════════════════════════════════════════════════════════════════════
// Thresholds
// ════════════════════════════════════════════════════════════════════════════

/// A finger is extended when its tip is this much further from the wrist
/// than its base.
const FINGER_EXTENSION_RATIO: f32 = 1.2;
/// Same test for the thumb, against the thumb MCP joint.
const THUMB_EXTENSION_RATIO:  f32 = 1.1;
/// Thumb tip to index tip, normalised image units.
const PINCH_THRESHOLD:        f32 = 0.08;
/// Scales the wrist → index-base span into the depth proxy.
const HAND_SIZE_SCALE:        f32 = 5.0;
/// Reference spans shorter than this are treated as degenerate.
const MIN_REFERENCE:          f32 = 1e-6;

// ════════════════════════════════════════════════════════════════════════════
// GestureState
// ════════════════════════════════════════════════════════════════════════════

/// The discrete mode driving formation, camera, and gallery logic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum GestureState {
    /// Tree formation.
    #[default]
    Neutral,
    /// Explosion formation.
    Open,
    /// Viewing the selected photo.
    Pinch,
}

impl GestureState {
    /// Status text shown to the user.
    pub fn label(self) -> &'static str {
        match self {
            GestureState::Neutral => "Tree (Neutral)",
            GestureState::Open    => "Cosmic Expansion",
            GestureState::Pinch   => "Viewing Memory",
        }
    }

    /// Manual override order: Neutral → Pinch → Open → Neutral.
    pub fn cycle(self) -> Self {
        match self {
            GestureState::Neutral => GestureState::Pinch,
            GestureState::Pinch   => GestureState::Open,
            GestureState::Open    => GestureState::Neutral,
        }
    }

    pub fn to_u8(self) -> u8 {
        match self {
            GestureState::Neutral => 0,
            GestureState::Open    => 1,
            GestureState::Pinch   => 2,
        }
    }

    /// Unknown codes decode as `Neutral`.
    pub fn from_u8(code: u8) -> Self {
        match code {
            1 => GestureState::Open,
            2 => GestureState::Pinch,
            _ => GestureState::Neutral,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// PointerSample
// ════════════════════════════════════════════════════════════════════════════

/// Continuous hand position in mirrored screen space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerSample {
    /// 0.0 (left) – 1.0 (right), already mirrored for a selfie camera.
    pub x: f32,
    /// 0.0 (top) – 1.0 (bottom).
    pub y: f32,
    /// Hand-size depth proxy; larger means the hand is closer.
    pub z: f32,
    pub present: bool,
}

impl PointerSample {
    /// Centered, no hand.
    pub const IDLE: PointerSample = PointerSample { x: 0.5, y: 0.5, z: 0.5, present: false };

    /// True when the sample is present and every field is finite.
    pub fn is_usable(&self) -> bool {
        self.present && self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Default for PointerSample {
    fn default() -> Self { PointerSample::IDLE }
}

// ════════════════════════════════════════════════════════════════════════════
// classify
// ════════════════════════════════════════════════════════════════════════════

/// Result of classifying one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Classification {
    pub gesture:        GestureState,
    pub pointer:        PointerSample,
    /// Extended digits, thumb included (0–5).
    pub extended:       u8,
    /// Thumb tip to index tip; `INFINITY` when no hand was seen.
    pub pinch_distance: f32,
}

/// Classify one landmark frame, or the absence of a hand.
///
/// With no hand the result is `Neutral` with `pointer.present == false`; the
/// other pointer fields are [`PointerSample::IDLE`] and callers that want to
/// keep the last position should only honour the `present` flag.
pub fn classify(frame: Option<&LandmarkFrame>) -> Classification {
    let frame = match frame {
        Some(f) => f,
        None    => {
            return Classification {
                gesture:        GestureState::Neutral,
                pointer:        PointerSample::IDLE,
                extended:       0,
                pinch_distance: f32::INFINITY,
            };
        }
    };

    let wrist = frame.wrist();

    let fingers = FINGER_TIPS.iter().zip(FINGER_BASES.iter())
        .filter(|(&tip, &base)| is_extended(frame, tip, base, FINGER_EXTENSION_RATIO))
        .count() as u8;
    let thumb = is_extended(frame, THUMB_TIP, THUMB_BASE, THUMB_EXTENSION_RATIO) as u8;
    let extended = fingers + thumb;

    let pinch_distance = frame.point(THUMB_TIP).planar_distance(frame.point(INDEX_TIP));
    let is_pinching = pinch_distance < PINCH_THRESHOLD;

    let gesture = if is_pinching && extended >= 2 {
        GestureState::Pinch
    } else if extended >= 4 {
        GestureState::Open
    } else {
        GestureState::Neutral
    };

    let hand_size = frame.point(INDEX_BASE).planar_distance(wrist) * HAND_SIZE_SCALE;

    let pointer = PointerSample {
        x:       finite_or(1.0 - wrist.x, PointerSample::IDLE.x),
        y:       finite_or(wrist.y,       PointerSample::IDLE.y),
        z:       finite_or(hand_size,     0.0),
        present: true,
    };

    Classification { gesture, pointer, extended, pinch_distance }
}

/// Tip-versus-base extension test relative to the wrist.
///
/// A zero-length (or non-finite) base span cannot be compared against, so the
/// digit counts as curled.
fn is_extended(frame: &LandmarkFrame, tip: usize, base: usize, ratio: f32) -> bool {
    let wrist    = frame.wrist();
    let tip_dist  = frame.point(tip).planar_distance(wrist);
    let base_dist = frame.point(base).planar_distance(wrist);
    if !(base_dist.is_finite() && tip_dist.is_finite()) || base_dist < MIN_REFERENCE {
        return false;
    }
    tip_dist > base_dist * ratio
}

fn finite_or(v: f32, fallback: f32) -> f32 {
    if v.is_finite() { v } else { fallback }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

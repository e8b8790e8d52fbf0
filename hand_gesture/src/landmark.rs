//! The 21-point hand skeleton as delivered by a landmark detector.
//!
//! Coordinates are normalised image space: `x` and `y` in `[0, 1]` with `y`
//! growing downward, `z` a relative depth the classifier ignores.

// ════════════════════════════════════════════════════════════════════════════
// Skeleton indices
// ════════════════════════════════════════════════════════════════════════════

/// Number of keypoints in one hand frame.
pub const LANDMARK_COUNT: usize = 21;

pub const WRIST:       usize = 0;
pub const THUMB_CMC:   usize = 1;
pub const THUMB_BASE:  usize = 2;
pub const THUMB_IP:    usize = 3;
pub const THUMB_TIP:   usize = 4;
pub const INDEX_BASE:  usize = 5;
pub const INDEX_TIP:   usize = 8;
pub const MIDDLE_BASE: usize = 9;
pub const MIDDLE_TIP:  usize = 12;
pub const RING_BASE:   usize = 13;
pub const RING_TIP:    usize = 16;
pub const PINKY_BASE:  usize = 17;
pub const PINKY_TIP:   usize = 20;

/// Tip indices of the four non-thumb fingers, index → pinky.
pub const FINGER_TIPS:  [usize; 4] = [INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];
/// Base (knuckle) indices matching [`FINGER_TIPS`].
pub const FINGER_BASES: [usize; 4] = [INDEX_BASE, MIDDLE_BASE, RING_BASE, PINKY_BASE];

// ════════════════════════════════════════════════════════════════════════════
// Landmark
// ════════════════════════════════════════════════════════════════════════════

/// One keypoint in normalised image space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Landmark { x, y, z }
    }

    /// Distance in the image plane (`z` ignored).
    pub fn planar_distance(&self, other: &Landmark) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LandmarkFrame
// ════════════════════════════════════════════════════════════════════════════

/// All 21 keypoints of one detected hand.
#[derive(Clone, Debug, PartialEq)]
pub struct LandmarkFrame {
    points: [Landmark; LANDMARK_COUNT],
}

impl LandmarkFrame {
    pub fn new(points: [Landmark; LANDMARK_COUNT]) -> Self {
        LandmarkFrame { points }
    }

    /// Build a frame from a detector's point list.
    /// Returns `None` unless exactly 21 points are supplied.
    pub fn from_slice(points: &[Landmark]) -> Option<Self> {
        let points: [Landmark; LANDMARK_COUNT] = points.try_into().ok()?;
        Some(LandmarkFrame { points })
    }

    /// Every keypoint at the same coordinate.
    pub fn uniform(at: Landmark) -> Self {
        LandmarkFrame { points: [at; LANDMARK_COUNT] }
    }

    pub fn point(&self, index: usize) -> &Landmark { &self.points[index] }
    pub fn points(&self) -> &[Landmark; LANDMARK_COUNT] { &self.points }

    pub fn set(&mut self, index: usize, at: Landmark) {
        self.points[index] = at;
    }

    pub fn wrist(&self) -> &Landmark { &self.points[WRIST] }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_slice_requires_21_points() {
        let short = vec![Landmark::default(); 20];
        assert!(LandmarkFrame::from_slice(&short).is_none());
        let exact = vec![Landmark::default(); LANDMARK_COUNT];
        assert!(LandmarkFrame::from_slice(&exact).is_some());
    }

    #[test]
    fn planar_distance_ignores_depth() {
        let a = Landmark::new(0.0, 0.0, 0.0);
        let b = Landmark::new(0.3, 0.4, 9.0);
        assert!((a.planar_distance(&b) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn finger_tables_line_up() {
        for (tip, base) in FINGER_TIPS.iter().zip(FINGER_BASES.iter()) {
            assert_eq!(tip - base, 3);
        }
    }
}

//! Orbit camera and the gesture-keyed rig that steers it.
//!
//! The camera orbits the origin at a fixed polar angle; only azimuth and
//! distance move.  [`CameraRig`] decides each frame which of three behaviours
//! applies:
//!
//! | Mode | When | Auto-rotate | Distance |
//! |---|---|---|---|
//! | `Viewing`  | `Pinch` | off, azimuth frozen | back to 20 at 2/s |
//! | `Steering` | `Neutral` with a hand present | off | pointer-driven at 5/s |
//! | `Cruising` | otherwise | on | back to 20 at 0.5/s |

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use glam::{Mat3, Quat, Vec3};
use hand_gesture::{GestureState, PointerSample};
use log::debug;

use crate::motion::damp;

// ════════════════════════════════════════════════════════════════════════════
// Constants
// ════════════════════════════════════════════════════════════════════════════

/// Resting orbit distance.
pub const NEUTRAL_DISTANCE:   f32 = 20.0;
pub const MIN_DISTANCE:       f32 = 10.0;
pub const MAX_DISTANCE:       f32 = 40.0;
/// Orbit-controls units: one unit is a full turn per minute.
pub const AUTO_ROTATE_SPEED:  f32 = 0.5;

const VIEWING_RETURN_RATE:    f32 = 2.0;
const CRUISING_RETURN_RATE:   f32 = 0.5;
const STEER_RATE:             f32 = 5.0;
/// Distance changes smaller than this are left alone.
const RETURN_EPSILON:         f32 = 0.1;

/// Azimuth swing across the full pointer width, radians.
const AZIMUTH_SPAN:           f32 = 4.0;
/// Hand-size proxy that maps to the far distance.
const ZOOM_Z_FAR:             f32 = 0.1;
/// Hand-size range over which the camera zooms in fully.
const ZOOM_Z_RANGE:           f32 = 0.3;
const STEER_FAR_DISTANCE:     f32 = 35.0;
const STEER_NEAR_DISTANCE:    f32 = 12.0;

// ════════════════════════════════════════════════════════════════════════════
// OrbitCamera
// ════════════════════════════════════════════════════════════════════════════

/// A camera on a sphere around the origin, always looking at it.
#[derive(Clone, Debug, PartialEq)]
pub struct OrbitCamera {
    /// Around +Y, 0 on the +Z axis.  Kept in `(-π, π]`.
    azimuth:               f32,
    /// From +Y, fixed after construction.
    polar:                 f32,
    distance:              f32,
    pub min_distance:      f32,
    pub max_distance:      f32,
    pub auto_rotate:       bool,
    pub auto_rotate_speed: f32,
}

impl Default for OrbitCamera {
    /// The start pose looks at the tree from (0, 2, 20).
    fn default() -> Self {
        let polar = FRAC_PI_2 - 2.0_f32.atan2(20.0);
        OrbitCamera::new(0.0, polar, NEUTRAL_DISTANCE)
    }
}

impl OrbitCamera {
    pub fn new(azimuth: f32, polar: f32, distance: f32) -> Self {
        OrbitCamera {
            azimuth:           wrap_angle(azimuth),
            polar:             polar.clamp(1e-3, PI - 1e-3),
            distance:          distance.clamp(MIN_DISTANCE, MAX_DISTANCE),
            min_distance:      MIN_DISTANCE,
            max_distance:      MAX_DISTANCE,
            auto_rotate:       true,
            auto_rotate_speed: AUTO_ROTATE_SPEED,
        }
    }

    pub fn azimuth(&self)  -> f32 { self.azimuth }
    pub fn polar(&self)    -> f32 { self.polar }
    pub fn distance(&self) -> f32 { self.distance }

    /// Non-finite values are ignored.
    pub fn set_azimuth(&mut self, azimuth: f32) {
        if azimuth.is_finite() {
            self.azimuth = wrap_angle(azimuth);
        }
    }

    /// Clamped to `[min_distance, max_distance]`; non-finite values are ignored.
    pub fn set_distance(&mut self, distance: f32) {
        if distance.is_finite() {
            self.distance = distance.clamp(self.min_distance, self.max_distance);
        }
    }

    /// Apply auto-rotation and re-clamp the distance.
    pub fn update(&mut self, delta: f32) {
        if self.auto_rotate && delta.is_finite() && delta > 0.0 {
            let angle = TAU / 60.0 * self.auto_rotate_speed * delta;
            self.azimuth = wrap_angle(self.azimuth - angle);
        }
        self.distance = self.distance.clamp(self.min_distance, self.max_distance);
    }

    pub fn position(&self) -> Vec3 {
        let (sp, cp) = self.polar.sin_cos();
        let (sa, ca) = self.azimuth.sin_cos();
        Vec3::new(sp * sa, cp, sp * ca) * self.distance
    }

    /// Unit vector from the camera toward the origin.
    pub fn forward(&self) -> Vec3 {
        let f = -self.position().normalize_or_zero();
        if f == Vec3::ZERO { Vec3::NEG_Z } else { f }
    }

    /// Rotation taking the camera's local −Z onto [`forward`](Self::forward)
    /// with +Y kept up.
    pub fn orientation(&self) -> Quat {
        let back  = -self.forward();
        let right = Vec3::Y.cross(back).try_normalize().unwrap_or(Vec3::X);
        let up    = back.cross(right);
        Quat::from_mat3(&Mat3::from_cols(right, up, back)).normalize()
    }
}

/// Wrap into `(-π, π]`.
fn wrap_angle(a: f32) -> f32 {
    let w = (a + PI).rem_euclid(TAU) - PI;
    if w == -PI { PI } else { w }
}

// ════════════════════════════════════════════════════════════════════════════
// CameraRig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RigMode {
    /// A photo is being viewed; hold still.
    Viewing,
    /// The hand steers azimuth and distance.
    Steering,
    /// No steering input; slow auto-rotation.
    Cruising,
}

/// Drives an [`OrbitCamera`] from the gesture and pointer.
#[derive(Clone, Debug)]
pub struct CameraRig {
    smoothed_azimuth:  f32,
    smoothed_distance: f32,
    mode:              RigMode,
}

impl Default for CameraRig {
    fn default() -> Self {
        CameraRig {
            smoothed_azimuth:  0.0,
            smoothed_distance: NEUTRAL_DISTANCE,
            mode:              RigMode::Cruising,
        }
    }
}

impl CameraRig {
    pub fn new() -> Self { Self::default() }

    pub fn mode(&self) -> RigMode { self.mode }

    /// Advance one frame.
    pub fn tick(
        &mut self,
        gesture: GestureState,
        pointer: &PointerSample,
        camera:  &mut OrbitCamera,
        delta:   f32,
    ) {
        let mode = match gesture {
            GestureState::Pinch                          => RigMode::Viewing,
            GestureState::Neutral if pointer.is_usable() => RigMode::Steering,
            _                                            => RigMode::Cruising,
        };
        if mode != self.mode {
            debug!("camera rig {:?} -> {:?}", self.mode, mode);
            if mode == RigMode::Steering {
                // Start smoothing from where the camera actually is.
                self.smoothed_azimuth  = camera.azimuth();
                self.smoothed_distance = camera.distance();
            }
            self.mode = mode;
        }

        match mode {
            RigMode::Viewing => {
                camera.auto_rotate = false;
                return_to_neutral(camera, VIEWING_RETURN_RATE, delta);
            }
            RigMode::Steering => {
                camera.auto_rotate = false;
                let target_azimuth  = (pointer.x - 0.5) * AZIMUTH_SPAN;
                let zoom            = ((pointer.z - ZOOM_Z_FAR) / ZOOM_Z_RANGE).clamp(0.0, 1.0);
                let target_distance = STEER_FAR_DISTANCE
                    + (STEER_NEAR_DISTANCE - STEER_FAR_DISTANCE) * zoom;

                self.smoothed_azimuth  = damp(self.smoothed_azimuth,  target_azimuth,  STEER_RATE, delta);
                self.smoothed_distance = damp(self.smoothed_distance, target_distance, STEER_RATE, delta);
                camera.set_azimuth(self.smoothed_azimuth);
                camera.set_distance(self.smoothed_distance);
            }
            RigMode::Cruising => {
                camera.auto_rotate = true;
                return_to_neutral(camera, CRUISING_RETURN_RATE, delta);
            }
        }

        camera.update(delta);
    }
}

fn return_to_neutral(camera: &mut OrbitCamera, rate: f32, delta: f32) {
    let d = camera.distance();
    if (d - NEUTRAL_DISTANCE).abs() > RETURN_EPSILON {
        camera.set_distance(damp(d, NEUTRAL_DISTANCE, rate, delta));
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn hand(x: f32, z: f32) -> PointerSample {
        PointerSample { x, y: 0.5, z, present: true }
    }

    fn run(rig: &mut CameraRig, cam: &mut OrbitCamera, g: GestureState, p: PointerSample, secs: f32) {
        let steps = (secs / DT).round() as usize;
        for _ in 0..steps { rig.tick(g, &p, cam, DT); }
    }

    fn approx(a: Vec3, b: Vec3) -> bool { (a - b).length() < 1e-4 }

    #[test]
    fn default_pose_matches_start_position() {
        let cam = OrbitCamera::default();
        let p = cam.position();
        assert!((p.length() - 20.0).abs() < 1e-4);
        assert!((p.y / p.z - 0.1).abs() < 1e-4);
        assert!(p.x.abs() < 1e-5);
    }

    #[test]
    fn on_axis_camera_looks_down_negative_z() {
        let cam = OrbitCamera::new(0.0, FRAC_PI_2, 20.0);
        assert!(approx(cam.position(), Vec3::new(0.0, 0.0, 20.0)));
        assert!(approx(cam.forward(), Vec3::NEG_Z));
        assert!(approx(cam.orientation() * Vec3::NEG_Z, Vec3::NEG_Z));
    }

    #[test]
    fn orientation_points_at_origin() {
        for &az in &[0.0_f32, 0.7, -2.0, 3.0] {
            let cam = OrbitCamera::new(az, 1.2, 25.0);
            let q = cam.orientation();
            assert!(approx(q * Vec3::NEG_Z, cam.forward()), "azimuth {}", az);
            // camera up stays in the upper hemisphere
            assert!((q * Vec3::Y).y > 0.0);
        }
    }

    #[test]
    fn distance_is_clamped() {
        let mut cam = OrbitCamera::default();
        cam.set_distance(100.0);
        assert_eq!(cam.distance(), MAX_DISTANCE);
        cam.set_distance(1.0);
        assert_eq!(cam.distance(), MIN_DISTANCE);
        cam.set_distance(f32::NAN);
        assert_eq!(cam.distance(), MIN_DISTANCE);
    }

    #[test]
    fn auto_rotation_rate() {
        let mut cam = OrbitCamera::default();
        cam.update(1.0);
        let expected = -TAU / 60.0 * AUTO_ROTATE_SPEED;
        assert!((cam.azimuth() - expected).abs() < 1e-5);
    }

    #[test]
    fn azimuth_stays_wrapped() {
        let mut cam = OrbitCamera::default();
        for _ in 0..10_000 { cam.update(0.5); }
        assert!(cam.azimuth() > -PI && cam.azimuth() <= PI);
    }

    #[test]
    fn pinch_freezes_azimuth_and_recenters_distance() {
        let mut rig = CameraRig::new();
        let mut cam = OrbitCamera::new(1.0, 1.3, 35.0);
        let azimuth = cam.azimuth();
        run(&mut rig, &mut cam, GestureState::Pinch, hand(0.9, 0.4), 3.0);
        assert_eq!(rig.mode(), RigMode::Viewing);
        assert!(!cam.auto_rotate);
        assert_eq!(cam.azimuth(), azimuth);
        assert!((cam.distance() - NEUTRAL_DISTANCE).abs() <= RETURN_EPSILON + 1e-3);
    }

    #[test]
    fn steering_follows_pointer() {
        let mut rig = CameraRig::new();
        let mut cam = OrbitCamera::default();
        // Far right, big hand: swing to +2 rad and close in.
        run(&mut rig, &mut cam, GestureState::Neutral, hand(1.0, 0.5), 3.0);
        assert_eq!(rig.mode(), RigMode::Steering);
        assert!(!cam.auto_rotate);
        assert!((cam.azimuth() - 2.0).abs() < 1e-3);
        assert!((cam.distance() - STEER_NEAR_DISTANCE).abs() < 1e-2);

        // Far left, tiny hand: swing to −2 rad and back off.
        run(&mut rig, &mut cam, GestureState::Neutral, hand(0.0, 0.05), 3.0);
        assert!((cam.azimuth() + 2.0).abs() < 1e-3);
        assert!((cam.distance() - STEER_FAR_DISTANCE).abs() < 1e-2);
    }

    #[test]
    fn steering_is_smoothed() {
        let mut rig = CameraRig::new();
        let mut cam = OrbitCamera::new(0.0, 1.3, 20.0);
        rig.tick(GestureState::Neutral, &hand(1.0, 0.25), &mut cam, DT);
        // One frame closes 5/60 of the gap, not all of it.
        assert!((cam.azimuth() - 2.0 * 5.0 / 60.0).abs() < 1e-4);
    }

    #[test]
    fn open_hand_cruises_even_with_pointer() {
        let mut rig = CameraRig::new();
        let mut cam = OrbitCamera::default();
        rig.tick(GestureState::Open, &hand(0.9, 0.4), &mut cam, DT);
        assert_eq!(rig.mode(), RigMode::Cruising);
        assert!(cam.auto_rotate);
        assert!(cam.azimuth() < 0.0);
    }

    #[test]
    fn cruising_returns_slowly() {
        let mut rig = CameraRig::new();
        let mut cam = OrbitCamera::new(0.0, 1.3, 35.0);
        run(&mut rig, &mut cam, GestureState::Neutral, PointerSample::IDLE, 1.0);
        let expected = NEUTRAL_DISTANCE + 15.0 * (-0.5_f32).exp();
        assert!((cam.distance() - expected).abs() < 0.1, "{}", cam.distance());
    }

    #[test]
    fn non_finite_pointer_is_treated_as_absent() {
        let mut rig = CameraRig::new();
        let mut cam = OrbitCamera::default();
        rig.tick(GestureState::Neutral, &hand(f32::NAN, 0.3), &mut cam, DT);
        assert_eq!(rig.mode(), RigMode::Cruising);
        assert!(cam.position().is_finite());
    }
}

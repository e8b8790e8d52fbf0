//! Floating photo panels and the nearest-panel selection.
//!
//! Panels hang on a coarse spiral around the tree.  Each frame the panel
//! whose *tree* position is closest to the camera becomes the selection;
//! while the hand pinches, that panel flies to a pose 4 units in front of
//! the camera and every other panel stays home.

use std::f32::consts::PI;

use glam::{EulerRot, Vec3};
use hand_gesture::GestureState;
use log::{debug, info};
use rand::Rng;

use crate::camera::OrbitCamera;
use crate::motion::damp;

// ════════════════════════════════════════════════════════════════════════════
// Constants
// ════════════════════════════════════════════════════════════════════════════

const PANEL_RATE:      f32 = 3.0;

const VIEW_DISTANCE:   f32 = 4.0;
const VIEW_SCALE:      f32 = 2.5;
const VIEW_SWAY:       f32 = 0.02;
const VIEW_SWAY_FREQ:  f32 = 0.5;

const TREE_SCALE:      f32 = 1.0;
const BOB_AMPLITUDE:   f32 = 0.003;
const BOB_FREQ:        f32 = 1.5;
const IDLE_SWAY:       f32 = 0.001;

// slot spiral
const SLOT_HEIGHT:     f32 = 10.0;
const SLOT_RADIUS:     f32 = 4.5;
const SLOT_MIN_RADIUS: f32 = 1.0;
const SLOT_TURNS:      f32 = 20.0;
const SLOT_ROLL:       f32 = 0.2;

// ════════════════════════════════════════════════════════════════════════════
// Types
// ════════════════════════════════════════════════════════════════════════════

/// Creation-ordered panel identifier.
pub type PanelId = u64;

/// Opaque reference to a user image (URL or path).  Owned by its panel.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PhotoHandle(String);

impl PhotoHandle {
    pub fn new(source: impl Into<String>) -> Self { PhotoHandle(source.into()) }
    pub fn as_str(&self) -> &str { &self.0 }
}

/// Animated transform of a panel.  `rotation` is XYZ Euler radians.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanelPose {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale:    f32,
}

/// A photo placed on the tree.
#[derive(Clone, Debug)]
pub struct PhotoPanel {
    id:            PanelId,
    handle:        PhotoHandle,
    tree_position: Vec3,
    tree_rotation: Vec3,
    pose:          PanelPose,
}

impl PhotoPanel {
    pub fn id(&self)            -> PanelId      { self.id }
    pub fn handle(&self)        -> &PhotoHandle { &self.handle }
    pub fn tree_position(&self) -> Vec3         { self.tree_position }
    pub fn tree_rotation(&self) -> Vec3         { self.tree_rotation }
    pub fn pose(&self)          -> &PanelPose   { &self.pose }

    /// Per-panel phase for the idle bob.
    fn phase(&self) -> f32 { (self.id % 10_000) as f32 }

    fn resting_target(&self, t: f32) -> PanelPose {
        let phase = self.phase();
        PanelPose {
            position: self.tree_position + Vec3::Y * ((t * BOB_FREQ + phase).sin() * BOB_AMPLITUDE),
            rotation: self.tree_rotation + Vec3::Z * ((t + phase).cos() * IDLE_SWAY),
            scale:    TREE_SCALE,
        }
    }
}

/// Pick a random slot on the panel spiral: `(position, rotation)`.
pub fn tree_slot<R: Rng>(rng: &mut R) -> (Vec3, Vec3) {
    let t: f32   = rng.random();
    let height   = t * SLOT_HEIGHT - SLOT_HEIGHT / 2.0;
    let radius   = (1.0 - t) * SLOT_RADIUS + SLOT_MIN_RADIUS;
    let angle    = t * SLOT_TURNS + rng.random::<f32>() * PI;
    let roll     = rng.random::<f32>() * SLOT_ROLL - SLOT_ROLL / 2.0;
    let position = Vec3::new(angle.cos() * radius, height, angle.sin() * radius);
    (position, Vec3::new(0.0, -angle, roll))
}

// ════════════════════════════════════════════════════════════════════════════
// Gallery
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Default)]
pub struct Gallery {
    panels:  Vec<PhotoPanel>,
    next_id: PanelId,
    nearest: Option<PanelId>,
}

impl Gallery {
    pub fn new() -> Self { Self::default() }

    /// Hang a photo on a random slot.
    pub fn add<R: Rng>(&mut self, handle: PhotoHandle, rng: &mut R) -> PanelId {
        let (position, rotation) = tree_slot(rng);
        self.add_at(handle, position, rotation)
    }

    /// Hang a photo at an explicit tree pose.  The panel starts at scale 0.
    pub fn add_at(&mut self, handle: PhotoHandle, position: Vec3, rotation: Vec3) -> PanelId {
        let id = self.next_id;
        self.next_id += 1;
        info!("panel {} added for {} at {:?}", id, handle.as_str(), position);
        self.panels.push(PhotoPanel {
            id,
            handle,
            tree_position: position,
            tree_rotation: rotation,
            pose: PanelPose { position, rotation, scale: 0.0 },
        });
        id
    }

    /// The panel whose tree position is closest to `camera`; ties go to the
    /// earliest panel.
    pub fn nearest_to(&self, camera: Vec3) -> Option<PanelId> {
        let mut best: Option<(PanelId, f32)> = None;
        for p in &self.panels {
            let d = p.tree_position.distance_squared(camera);
            match best {
                Some((_, b)) if d >= b => {}
                _ => best = Some((p.id, d)),
            }
        }
        best.map(|(id, _)| id)
    }

    /// Refresh the selection and animate every panel.
    /// Returns true when the selection changed.
    pub fn tick(&mut self, gesture: GestureState, camera: &OrbitCamera, elapsed: f32, delta: f32) -> bool {
        let cam_pos = camera.position();
        let nearest = self.nearest_to(cam_pos);
        let changed = nearest != self.nearest;
        if changed {
            debug!("nearest panel {:?} -> {:?}", self.nearest, nearest);
            self.nearest = nearest;
        }

        let viewing = if gesture == GestureState::Pinch { self.nearest } else { None };
        let view_pose = viewing.map(|_| {
            let (x, y, z) = camera.orientation().to_euler(EulerRot::XYZ);
            PanelPose {
                position: cam_pos + camera.forward() * VIEW_DISTANCE,
                rotation: Vec3::new(x, y, z + (elapsed * VIEW_SWAY_FREQ).sin() * VIEW_SWAY),
                scale:    VIEW_SCALE,
            }
        });

        for panel in &mut self.panels {
            let target = match view_pose {
                Some(v) if viewing == Some(panel.id) => v,
                _                                    => panel.resting_target(elapsed),
            };
            let pose = &mut panel.pose;
            pose.position = damp(pose.position, target.position, PANEL_RATE, delta);
            pose.rotation = damp(pose.rotation, target.rotation, PANEL_RATE, delta);
            pose.scale    = damp(pose.scale,    target.scale,    PANEL_RATE, delta);
        }
        changed
    }

    pub fn nearest(&self)  -> Option<PanelId> { self.nearest }
    pub fn panels(&self)   -> &[PhotoPanel]   { &self.panels }
    pub fn len(&self)      -> usize           { self.panels.len() }
    pub fn is_empty(&self) -> bool            { self.panels.is_empty() }

    pub fn get(&self, id: PanelId) -> Option<&PhotoPanel> {
        self.panels.iter().find(|p| p.id == id)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::f32::consts::FRAC_PI_2;

    const DT: f32 = 1.0 / 60.0;

    fn on_axis_camera() -> OrbitCamera {
        let mut cam = OrbitCamera::new(0.0, FRAC_PI_2, 20.0);
        cam.auto_rotate = false;
        cam
    }

    fn two_panels() -> (Gallery, PanelId, PanelId) {
        let mut g = Gallery::new();
        let near = g.add_at(PhotoHandle::new("near.jpg"), Vec3::new(0.0, 0.0, -5.0), Vec3::ZERO);
        let far  = g.add_at(PhotoHandle::new("far.jpg"),  Vec3::new(0.0, 0.0, -10.0), Vec3::ZERO);
        (g, near, far)
    }

    fn run(g: &mut Gallery, gesture: GestureState, cam: &OrbitCamera, t: &mut f32, steps: usize) {
        for _ in 0..steps {
            *t += DT;
            g.tick(gesture, cam, *t, DT);
        }
    }

    #[test]
    fn ids_are_creation_ordered() {
        let mut g = Gallery::new();
        let mut rng = StdRng::seed_from_u64(1);
        let ids: Vec<PanelId> = (0..5).map(|i| g.add(PhotoHandle::new(format!("{}.png", i)), &mut rng)).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
        assert_eq!(g.get(3).map(|p| p.handle().as_str()), Some("3.png"));
    }

    #[test]
    fn slots_stay_on_the_spiral() {
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..500 {
            let (p, r) = tree_slot(&mut rng);
            assert!(p.y >= -5.0 && p.y < 5.0);
            let radius = (p.x * p.x + p.z * p.z).sqrt();
            assert!(radius > SLOT_MIN_RADIUS - 1e-4 && radius <= SLOT_RADIUS + SLOT_MIN_RADIUS + 1e-4);
            assert_eq!(r.x, 0.0);
            assert!(r.z >= -0.1 && r.z < 0.1);
            // yaw faces outward: −angle
            let angle = -r.y;
            assert!((angle.cos() * radius - p.x).abs() < 1e-3);
        }
    }

    #[test]
    fn nearest_uses_tree_positions() {
        let (g, near, _) = two_panels();
        assert_eq!(g.nearest_to(on_axis_camera().position()), Some(near));
    }

    #[test]
    fn ties_go_to_the_first_panel() {
        let mut g = Gallery::new();
        let a = g.add_at(PhotoHandle::new("a"), Vec3::new(1.0, 0.0, 0.0), Vec3::ZERO);
        let _ = g.add_at(PhotoHandle::new("b"), Vec3::new(-1.0, 0.0, 0.0), Vec3::ZERO);
        assert_eq!(g.nearest_to(Vec3::ZERO), Some(a));
    }

    #[test]
    fn empty_gallery_has_no_selection() {
        let mut g = Gallery::new();
        assert_eq!(g.nearest_to(Vec3::ZERO), None);
        assert!(!g.tick(GestureState::Pinch, &on_axis_camera(), 0.0, DT));
    }

    #[test]
    fn selection_change_reported_once() {
        let (mut g, near, _) = two_panels();
        let cam = on_axis_camera();
        assert!(g.tick(GestureState::Neutral, &cam, 0.0, DT));
        assert!(!g.tick(GestureState::Neutral, &cam, DT, DT));
        assert_eq!(g.nearest(), Some(near));
    }

    #[test]
    fn panels_pop_in() {
        let (mut g, near, _) = two_panels();
        assert_eq!(g.get(near).map(|p| p.pose().scale), Some(0.0));
        let mut t = 0.0;
        run(&mut g, GestureState::Neutral, &on_axis_camera(), &mut t, 180);
        for p in g.panels() {
            assert!((p.pose().scale - 1.0).abs() < 0.01);
            assert!((p.pose().position - p.tree_position()).length() < 0.01);
        }
    }

    #[test]
    fn pinch_brings_nearest_panel_to_the_camera() {
        let (mut g, near, far) = two_panels();
        let cam = on_axis_camera();
        let mut t = 0.0;
        run(&mut g, GestureState::Neutral, &cam, &mut t, 1);
        assert_eq!(g.nearest(), Some(near));

        run(&mut g, GestureState::Pinch, &cam, &mut t, 120);
        let target = cam.position() + cam.forward() * 4.0;
        let p = g.get(near).unwrap().pose();
        assert!((p.scale - 2.5).abs() < 0.025, "scale {}", p.scale);
        assert!((p.position - target).length() < target.length() * 0.01, "position {:?}", p.position);
        // facing the camera: only the sway remains on z
        assert!(p.rotation.x.abs() < 1e-2 && p.rotation.y.abs() < 1e-2);
        assert!(p.rotation.z.abs() <= VIEW_SWAY + 1e-3);

        let other = g.get(far).unwrap();
        assert!((other.pose().position - other.tree_position()).length() < 0.02);
        assert!(other.pose().scale <= 1.0 + 1e-3);
    }

    #[test]
    fn releasing_pinch_sends_panel_home() {
        let (mut g, near, _) = two_panels();
        let cam = on_axis_camera();
        let mut t = 0.0;
        run(&mut g, GestureState::Pinch, &cam, &mut t, 120);
        run(&mut g, GestureState::Open, &cam, &mut t, 240);
        let p = g.get(near).unwrap();
        assert!((p.pose().scale - 1.0).abs() < 0.01);
        assert!((p.pose().position - p.tree_position()).length() < 0.05);
    }

    #[test]
    fn tree_pose_never_changes() {
        let mut g = Gallery::new();
        let mut rng = StdRng::seed_from_u64(3);
        let id = g.add(PhotoHandle::new("x"), &mut rng);
        let (pos, rot) = { let p = g.get(id).unwrap(); (p.tree_position(), p.tree_rotation()) };
        let mut t = 0.0;
        run(&mut g, GestureState::Pinch, &on_axis_camera(), &mut t, 60);
        let p = g.get(id).unwrap();
        assert_eq!((p.tree_position(), p.tree_rotation()), (pos, rot));
    }
}

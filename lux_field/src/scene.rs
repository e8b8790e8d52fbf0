//! One frame of the whole world: camera, particles, and photos.

use glam::Vec3;
use hand_gesture::{GestureState, PointerSample};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::camera::{CameraRig, OrbitCamera};
use crate::gallery::{Gallery, PanelId, PhotoHandle};
use crate::particles::{FieldConfig, ParticleField};
use crate::theme::ThemeConfig;

/// Everything the renderer draws, advanced once per frame.
#[derive(Debug)]
pub struct Scene {
    camera:    OrbitCamera,
    rig:       CameraRig,
    particles: ParticleField,
    gallery:   Gallery,
    theme:     &'static ThemeConfig,
    elapsed:   f32,
    rng:       StdRng,
}

impl Scene {
    /// Build a scene with an entropy-seeded layout.
    pub fn new(theme: &'static ThemeConfig, config: FieldConfig) -> Self {
        Self::with_rng(theme, config, StdRng::from_rng(&mut rand::rng()))
    }

    /// Build a reproducible scene.
    pub fn seeded(theme: &'static ThemeConfig, config: FieldConfig, seed: u64) -> Self {
        Self::with_rng(theme, config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(theme: &'static ThemeConfig, config: FieldConfig, mut rng: StdRng) -> Self {
        let particles = ParticleField::new(theme, config, &mut rng);
        info!("scene: {} particles, theme {}", particles.len(), theme.id);
        Scene {
            camera: OrbitCamera::default(),
            rig: CameraRig::new(),
            particles,
            gallery: Gallery::new(),
            theme,
            elapsed: 0.0,
            rng,
        }
    }

    /// Advance by `delta` seconds.  The camera moves first so the gallery
    /// selects against this frame's camera position.
    ///
    /// Returns true when the nearest photo changed.
    pub fn tick(&mut self, delta: f32, gesture: GestureState, pointer: &PointerSample) -> bool {
        let delta = if delta.is_finite() && delta > 0.0 { delta } else { 0.0 };
        self.elapsed += delta;
        self.rig.tick(gesture, pointer, &mut self.camera, delta);
        self.particles.tick(gesture, self.elapsed, delta);
        self.gallery.tick(gesture, &self.camera, self.elapsed, delta)
    }

    /// Switch palettes.  Regenerates the particle field; photos are kept.
    pub fn rebuild(&mut self, theme: &'static ThemeConfig) {
        self.theme = theme;
        self.particles.rebuild(theme, &mut self.rng);
    }

    pub fn add_photo(&mut self, handle: PhotoHandle) -> PanelId {
        self.gallery.add(handle, &mut self.rng)
    }

    pub fn camera(&self)    -> &OrbitCamera        { &self.camera }
    pub fn rig(&self)       -> &CameraRig          { &self.rig }
    pub fn particles(&self) -> &ParticleField      { &self.particles }
    pub fn gallery(&self)   -> &Gallery            { &self.gallery }
    pub fn theme(&self)     -> &'static ThemeConfig { self.theme }
    pub fn elapsed(&self)   -> f32                 { self.elapsed }

    /// Camera eye position, for renderers.
    pub fn eye(&self) -> Vec3 { self.camera.position() }
}

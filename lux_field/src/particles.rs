//! The particle tree and its explosion formation.
//!
//! Particles are laid out once along a cone spiral and never added or
//! removed; only a theme rebuild replaces the whole set.  Each tick every
//! particle is damped toward a gesture-dependent target.

use std::f32::consts::TAU;

use glam::Vec3;
use hand_gesture::GestureState;
use log::debug;
use rand::Rng;

use crate::motion::damp;
use crate::theme::{Rgb, ThemeConfig, EXPLOSION_RADIUS, PARTICLE_COUNT, TREE_HEIGHT, TREE_RADIUS};

// ════════════════════════════════════════════════════════════════════════════
// Constants
// ════════════════════════════════════════════════════════════════════════════

/// Spiral angle per unit of height fraction.
const TREE_TURNS:        f32 = 50.0;
const ANGLE_JITTER:      f32 = 0.5;
/// Full width of the per-axis position jitter.
const VOLUME_JITTER:     f32 = 0.5;
/// Minimum primary-color mix.
const COLOR_BIAS:        f32 = 0.2;

const OPEN_DAMPING:      f32 = 2.0;
const TREE_DAMPING:      f32 = 4.0;
/// The explosion cloud is flattened vertically.
const OPEN_VERTICAL:     f32 = 0.5;
const DRIFT_AMPLITUDE:   f32 = 2.0;
const SPARKLE_AMPLITUDE: f32 = 0.05;

/// Field spin about +Y, rad/s.
const TREE_SPIN:         f32 = 0.1;
const OPEN_SPIN:         f32 = 0.05;

// ════════════════════════════════════════════════════════════════════════════
// FieldConfig
// ════════════════════════════════════════════════════════════════════════════

/// Size and shape of the field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldConfig {
    pub count:            usize,
    pub tree_height:      f32,
    pub tree_radius:      f32,
    pub explosion_radius: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        FieldConfig {
            count:            PARTICLE_COUNT,
            tree_height:      TREE_HEIGHT,
            tree_radius:      TREE_RADIUS,
            explosion_radius: EXPLOSION_RADIUS,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Particle
// ════════════════════════════════════════════════════════════════════════════

/// One particle.  Everything but `position` is fixed at generation.
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    rest:          Vec3,
    explosion_dir: Vec3,
    color:         Vec3,
    position:      Vec3,
}

impl Particle {
    /// Tree-formation coordinate.
    pub fn rest(&self)          -> Vec3 { self.rest }
    /// Components in `[-1, 1)`; not normalised.
    pub fn explosion_dir(&self) -> Vec3 { self.explosion_dir }
    /// Linear RGB, may slightly exceed 1.0.
    pub fn color(&self)         -> Vec3 { self.color }
    /// Current animated position, before the field spin.
    pub fn position(&self)      -> Vec3 { self.position }
}

// ════════════════════════════════════════════════════════════════════════════
// ParticleField
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
pub struct ParticleField {
    config:     FieldConfig,
    theme_id:   &'static str,
    particles:  Vec<Particle>,
    rotation_y: f32,
}

impl ParticleField {
    pub fn new<R: Rng>(theme: &ThemeConfig, config: FieldConfig, rng: &mut R) -> Self {
        let particles = generate(theme, &config, rng);
        ParticleField { config, theme_id: theme.id, particles, rotation_y: 0.0 }
    }

    /// Replace every particle with a fresh layout in `theme`'s colors.
    /// Old positions are discarded; the count never changes.
    pub fn rebuild<R: Rng>(&mut self, theme: &ThemeConfig, rng: &mut R) {
        debug!("rebuilding {} particles for theme {}", self.config.count, theme.id);
        self.particles = generate(theme, &self.config, rng);
        self.theme_id  = theme.id;
    }

    /// Advance one frame.  `elapsed` drives the oscillations, `delta` the
    /// damping and spin.
    pub fn tick(&mut self, gesture: GestureState, elapsed: f32, delta: f32) {
        if !delta.is_finite() || delta <= 0.0 {
            return;
        }
        let rate   = damping_rate(gesture);
        let radius = self.config.explosion_radius;
        for (i, p) in self.particles.iter_mut().enumerate() {
            let target = target_for(p, i, gesture, elapsed, radius);
            p.position = damp(p.position, target, rate, delta);
        }
        self.rotation_y = (self.rotation_y + delta * spin_rate(gesture)).rem_euclid(TAU);
    }

    /// Where particle `index` is heading at time `elapsed`.
    pub fn target(&self, index: usize, gesture: GestureState, elapsed: f32) -> Vec3 {
        target_for(&self.particles[index], index, gesture, elapsed, self.config.explosion_radius)
    }

    pub fn particles(&self) -> &[Particle] { &self.particles }
    pub fn len(&self)       -> usize       { self.particles.len() }
    pub fn is_empty(&self)  -> bool        { self.particles.is_empty() }
    pub fn theme_id(&self)  -> &'static str { self.theme_id }
    pub fn config(&self)    -> &FieldConfig { &self.config }

    /// Spin about +Y, radians in `[0, 2π)`.
    pub fn rotation_y(&self) -> f32 { self.rotation_y }
}

/// Damping rate for the current formation.
pub fn damping_rate(gesture: GestureState) -> f32 {
    match gesture {
        GestureState::Open => OPEN_DAMPING,
        _                  => TREE_DAMPING,
    }
}

/// Field spin speed for the current formation.
pub fn spin_rate(gesture: GestureState) -> f32 {
    match gesture {
        GestureState::Open => OPEN_SPIN,
        _                  => TREE_SPIN,
    }
}

fn target_for(p: &Particle, index: usize, gesture: GestureState, t: f32, radius: f32) -> Vec3 {
    let i = index as f32;
    match gesture {
        GestureState::Open => {
            let d = p.explosion_dir;
            Vec3::new(
                d.x * radius                 + (t * 0.5 + i).sin()       * DRIFT_AMPLITUDE,
                d.y * radius * OPEN_VERTICAL + (t * 0.3 + i).cos()       * DRIFT_AMPLITUDE,
                d.z * radius                 + (t * 0.5 + i * 0.5).sin() * DRIFT_AMPLITUDE,
            )
        }
        _ => {
            let side = (t * 2.0 + i).sin() * SPARKLE_AMPLITUDE;
            let up   = (t * 3.0 + i).cos() * SPARKLE_AMPLITUDE;
            p.rest + Vec3::new(side, up, side)
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Generation
// ════════════════════════════════════════════════════════════════════════════

fn generate<R: Rng>(theme: &ThemeConfig, config: &FieldConfig, rng: &mut R) -> Vec<Particle> {
    let n = config.count;
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let p = i as f32 / n as f32;
        let height = p * config.tree_height - config.tree_height / 2.0;
        let radius = (1.0 - p) * config.tree_radius;
        let angle  = p * TREE_TURNS + rng.random::<f32>() * ANGLE_JITTER;

        let mut jitter = || (rng.random::<f32>() - 0.5) * VOLUME_JITTER;
        let rest = Vec3::new(
            angle.cos() * radius + jitter(),
            height               + jitter(),
            angle.sin() * radius + jitter(),
        );

        let mix   = rng.random::<f32>() * p + COLOR_BIAS;
        let color = Rgb::lerp(theme.secondary, theme.primary, mix);

        let mut unit = || (rng.random::<f32>() - 0.5) * 2.0;
        let explosion_dir = Vec3::new(unit(), unit(), unit());

        out.push(Particle { rest, explosion_dir, color, position: rest });
    }
    out
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

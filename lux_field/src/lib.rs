//! # lux_field
//!
//! The per-frame animation engine behind the gesture-driven particle tree.
//!
//! Every component advances through an explicit `tick(delta)` and every
//! time-based step scales by that delta, so nothing assumes a frame rate.
//!
//! ## Components
//!
//! | Module | Owns | Reacts to |
//! |---|---|---|
//! | [`particles`] | rest / explosion / color / position of every particle | gesture |
//! | [`gallery`] | photo panels and the nearest-panel selection | gesture, camera |
//! | [`camera`] | orbit camera and the gesture-keyed rig | gesture, pointer |
//! | [`scene`] | all of the above, ticked in a fixed order | everything |
//!
//! ## Damped approach
//!
//! All motion uses `current += (target − current) · min(1, delta · rate)`,
//! see [`motion::damp`].

pub mod motion;
pub mod theme;
pub mod particles;
pub mod gallery;
pub mod camera;
pub mod scene;

pub use camera::{CameraRig, OrbitCamera, RigMode};
pub use gallery::{Gallery, PanelId, PanelPose, PhotoHandle, PhotoPanel};
pub use particles::{FieldConfig, Particle, ParticleField};
pub use scene::Scene;
pub use theme::{Rgb, ThemeConfig};

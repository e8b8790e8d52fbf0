//! # lux_tree
//!
//! A hand-gesture controlled particle tree with floating photo memories,
//! rendered in a software framebuffer window.
//!
//! ## Gesture → Action mapping
//!
//! | Gesture | Hand | Action |
//! |---|---|---|
//! | Fist / relaxed hand | present | Tree formation; wrist steers the orbit, hand size zooms |
//! | Open palm (≥ 4 digits) | present | Cosmic expansion: particles scatter, camera cruises |
//! | Pinch (thumb–index, ≥ 2 digits) | present | Nearest photo flies in front of the camera |
//! | No hand | n/a | Tree formation, slow auto-rotation |
//!
//! ## Feature flags
//!
//! * (default): **Simulation mode**: mouse + keys build a synthetic 21-point hand.
//! * `leap`: **Hardware mode**: polls a real LeapMotion controller via LeapC.
//!
//! ### Keyboard shortcuts
//!
//! | Key | Action |
//! |---|---|
//! | `1` / `2` / `3` / `0` | Simulated fist / open palm / OK sign / no hand |
//! | mouse, scroll | Simulated wrist position, hand size |
//! | `G` | Cycle gesture by hand (switches to manual mode) |
//! | `P` | Hang a new photo |
//! | `T` | Next theme |
//! | `Q` / `Esc` | Quit |

pub mod error;
pub mod tracker;
pub mod visualizer;
pub mod app;

//! Software-rendered visualizer using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                                                              │
//! │      particle tree (additive splats, perspective)            │
//! │            ▢ photo panels (polaroid quads)                   │
//! │                                                              │
//! ├──────────────────────────────────────────────────────────────┤
//! │  status: gesture label · mode · theme · photos · error       │
//! │  key legend                                                  │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use std::sync::mpsc::Sender;
use std::time::Duration;

use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};
use log::debug;
use lux_field::theme::vec3_to_argb;
use lux_field::{OrbitCamera, PhotoHandle, Scene};
use minifb::{Key, KeyRepeat, MouseMode, Window, WindowOptions};

use crate::app::AppState;
use crate::error::AppError;
use crate::tracker::{SimInput, SimPose};

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

const FOV_DEG:          f32 = 50.0;
const NEAR:             f32 = 0.1;
const FAR:              f32 = 1000.0;

const STATUS_H:         usize = 40;
const STATUS_BG:        u32   = 0xFF0B0B16;
const LEGEND_COLOR:     u32   = 0xFF888888;
const LABEL_SCALE:      usize = 2;

/// Particle brightness before depth falloff.
const PARTICLE_GAIN:    f32 = 0.55;
/// Particles nearer than this get a 2×2 splat.
const SPLAT_NEAR:       f32 = 16.0;
const DEPTH_REFERENCE:  f32 = 20.0;

// Polaroid layout in panel-local units.
const FRAME_HALF_W:     f32 = 0.5;
const FRAME_HALF_H:     f32 = 0.6;
const PHOTO_HALF_W:     f32 = 0.42;
const PHOTO_TOP:        f32 = 0.52;
const PHOTO_BOTTOM:     f32 = -0.32;
const FRAME_COLOR:      u32 = 0xFFF4F1EA;

const LEGEND: &str = "G=gesture  1/2/3/0=fist/open/ok/none  mouse=move  scroll=size  P=photo  T=theme  Q=quit";

/// Window actions the app loop handles.  Simulated-hand input goes straight
/// to the tracker instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UiCommand {
    CycleGesture,
    AddPhoto,
    NextTheme,
    Quit,
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window:     Window,
    buf:        Vec<u32>,
    width:      usize,
    height:     usize,
    sim_tx:     Sender<SimInput>,
    last_mouse: Option<(f32, f32)>,
}

impl Visualizer {
    pub fn new(width: usize, height: usize, sim_tx: Sender<SimInput>) -> Result<Self, AppError> {
        let mut window = Window::new(
            "Lux Tree — gesture particle tree",
            width, height,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        ).map_err(|e| AppError::Window(e.to_string()))?;

        window.limit_update_rate(Some(Duration::from_millis(16))); // ~60fps
        debug!("window {}x{}", width, height);

        Ok(Visualizer {
            window,
            buf: vec![0xFF000000; width * height],
            width,
            height,
            sim_tx,
            last_mouse: None,
        })
    }

    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Poll keyboard and mouse.  Hand simulation input is forwarded to the
    /// tracker; everything else is returned.
    pub fn poll_input(&mut self) -> Vec<UiCommand> {
        let mut cmds = Vec::new();
        if !self.window.is_open() {
            cmds.push(UiCommand::Quit);
            return cmds;
        }

        let pressed = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);

        if pressed(Key::Q) || pressed(Key::Escape) { cmds.push(UiCommand::Quit); }
        if pressed(Key::G) { cmds.push(UiCommand::CycleGesture); }
        if pressed(Key::P) { cmds.push(UiCommand::AddPhoto); }
        if pressed(Key::T) { cmds.push(UiCommand::NextTheme); }

        for (key, pose) in [
            (Key::Key1, SimPose::Fist),
            (Key::Key2, SimPose::OpenPalm),
            (Key::Key3, SimPose::OkSign),
            (Key::Key0, SimPose::Absent),
        ] {
            if pressed(key) {
                let _ = self.sim_tx.send(SimInput::Pose(pose));
            }
        }

        if let Some((mx, my)) = self.window.get_mouse_pos(MouseMode::Clamp) {
            let at = (mx / self.width as f32, my / self.height as f32);
            if self.last_mouse != Some(at) {
                self.last_mouse = Some(at);
                let _ = self.sim_tx.send(SimInput::Pointer { x: at.0, y: at.1 });
            }
        }
        if let Some((_, dy)) = self.window.get_scroll_wheel() {
            if dy != 0.0 {
                let _ = self.sim_tx.send(SimInput::Zoom(dy.signum()));
            }
        }

        cmds
    }

    /// Render one frame.
    pub fn render(&mut self, app: &AppState) {
        let scene = app.scene();
        let theme = scene.theme();
        self.buf.fill(theme.background.to_argb());

        let view_proj = view_projection(scene.camera(), self.width, self.height);

        // ── Particles ─────────────────────────────────────────────────────
        self.draw_particles(scene, &view_proj);

        // ── Photo panels ──────────────────────────────────────────────────
        self.draw_panels(scene, &view_proj, theme.glow.to_argb());

        // ── Status bar ────────────────────────────────────────────────────
        let top = self.height.saturating_sub(STATUS_H);
        self.fill_rect(0, top, self.width, STATUS_H, STATUS_BG);
        self.draw_label(&app.status, 10, top + 6, theme.light.to_argb());
        self.draw_label(LEGEND, 10, top + 24, LEGEND_COLOR);

        if let Err(e) = self.window.update_with_buffer(&self.buf, self.width, self.height) {
            debug!("frame dropped: {}", e);
        }
    }

    // ── Particles ─────────────────────────────────────────────────────────

    fn draw_particles(&mut self, scene: &Scene, view_proj: &Mat4) {
        let field = scene.particles();
        let spin  = Quat::from_rotation_y(field.rotation_y());
        for p in field.particles() {
            let Some(s) = project(view_proj, spin * p.position(), self.width, self.height) else {
                continue;
            };
            let falloff = (DEPTH_REFERENCE / s.z).clamp(0.25, 1.0);
            let color   = vec3_to_argb(p.color() * PARTICLE_GAIN * falloff);
            let (x, y)  = (s.x as isize, s.y as isize);
            self.add_pixel(x, y, color);
            if s.z < SPLAT_NEAR {
                self.add_pixel(x + 1, y,     color);
                self.add_pixel(x,     y + 1, color);
                self.add_pixel(x + 1, y + 1, color);
            }
        }
    }

    // ── Panels ────────────────────────────────────────────────────────────

    fn draw_panels(&mut self, scene: &Scene, view_proj: &Mat4, glow: u32) {
        let gallery = scene.gallery();
        let eye     = scene.eye();

        // back to front
        let mut order: Vec<_> = gallery.panels().iter()
            .filter(|p| p.pose().scale > 0.01)
            .collect();
        order.sort_by(|a, b| {
            let da = a.pose().position.distance_squared(eye);
            let db = b.pose().position.distance_squared(eye);
            db.total_cmp(&da)
        });

        for panel in order {
            let pose = panel.pose();
            let rot  = Quat::from_euler(EulerRot::XYZ, pose.rotation.x, pose.rotation.y, pose.rotation.z);
            let quad = |x0: f32, x1: f32, y0: f32, y1: f32| -> Option<[Vec2; 4]> {
                let mut out = [Vec2::ZERO; 4];
                for (o, (x, y)) in out.iter_mut().zip([(x0, y0), (x1, y0), (x1, y1), (x0, y1)]) {
                    let world = pose.position + rot * (Vec3::new(x, y, 0.0) * pose.scale);
                    *o = project(view_proj, world, self.width, self.height)?.truncate();
                }
                Some(out)
            };

            let frame = quad(-FRAME_HALF_W, FRAME_HALF_W, -FRAME_HALF_H, FRAME_HALF_H);
            let photo = quad(-PHOTO_HALF_W, PHOTO_HALF_W, PHOTO_BOTTOM, PHOTO_TOP);
            let (Some(frame), Some(photo)) = (frame, photo) else { continue };

            let border = if gallery.nearest() == Some(panel.id()) {
                blend(FRAME_COLOR, glow, 0.45)
            } else {
                FRAME_COLOR
            };
            self.fill_quad(&frame, border);
            self.fill_quad(&photo, photo_tint(panel.handle()));
        }
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y + h).min(self.height) {
            for col in x..(x + w).min(self.width) {
                self.buf[row * self.width + col] = color;
            }
        }
    }

    fn fill_quad(&mut self, quad: &[Vec2; 4], color: u32) {
        let (mut lo, mut hi) = (quad[0], quad[0]);
        for q in &quad[1..] {
            lo = lo.min(*q);
            hi = hi.max(*q);
        }
        let x0 = lo.x.floor().max(0.0) as usize;
        let y0 = lo.y.floor().max(0.0) as usize;
        let x1 = (hi.x.ceil().max(0.0) as usize).min(self.width);
        let y1 = (hi.y.ceil().max(0.0) as usize).min(self.height);
        for row in y0..y1 {
            for col in x0..x1 {
                if inside_quad(quad, Vec2::new(col as f32 + 0.5, row as f32 + 0.5)) {
                    self.buf[row * self.width + col] = color;
                }
            }
        }
    }

    fn add_pixel(&mut self, x: isize, y: isize, color: u32) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            let i = y as usize * self.width + x as usize;
            self.buf[i] = add_argb(self.buf[i], color);
        }
    }

    /// Minimal bitmap font: 3×5 glyphs drawn at `LABEL_SCALE`.
    fn draw_label(&mut self, text: &str, x: usize, y: usize, color: u32) {
        let advance = 4 * LABEL_SCALE;
        let mut cx = x;
        for ch in text.chars() {
            if cx + advance > self.width { break; }
            for (row, &bits) in char_glyph(ch).iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        self.fill_rect(
                            cx + col * LABEL_SCALE,
                            y + row * LABEL_SCALE,
                            LABEL_SCALE, LABEL_SCALE,
                            color,
                        );
                    }
                }
            }
            cx += advance;
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Projection
// ════════════════════════════════════════════════════════════════════════════

/// Perspective × look-at for the orbit camera.
pub fn view_projection(camera: &OrbitCamera, width: usize, height: usize) -> Mat4 {
    let aspect = width.max(1) as f32 / height.max(1) as f32;
    let proj   = Mat4::perspective_rh(FOV_DEG.to_radians(), aspect, NEAR, FAR);
    let view   = Mat4::look_at_rh(camera.position(), Vec3::ZERO, Vec3::Y);
    proj * view
}

/// World point to `(screen x, screen y, view depth)`, or `None` when it is
/// outside the depth range.
pub fn project(view_proj: &Mat4, p: Vec3, width: usize, height: usize) -> Option<Vec3> {
    let clip = *view_proj * p.extend(1.0);
    if clip.w < NEAR {
        return None;
    }
    let ndc = clip.truncate() / clip.w;
    if !(0.0..=1.0).contains(&ndc.z) {
        return None;
    }
    Some(Vec3::new(
        (ndc.x + 1.0) * 0.5 * width as f32,
        (1.0 - ndc.y) * 0.5 * height as f32,
        clip.w,
    ))
}

/// Point-in-convex-quad test, either winding.
fn inside_quad(quad: &[Vec2; 4], p: Vec2) -> bool {
    let (mut pos, mut neg) = (false, false);
    for i in 0..4 {
        let a = quad[i];
        let b = quad[(i + 1) % 4];
        let e = (b - a).perp_dot(p - a);
        if e > 0.0 { pos = true; } else if e < 0.0 { neg = true; }
    }
    !(pos && neg)
}

// ────────────────────────────────────────────────────────────────────────────
// Colors
// ────────────────────────────────────────────────────────────────────────────

/// Channel-wise saturating add of two ARGB colors.
fn add_argb(a: u32, b: u32) -> u32 {
    let ch = |shift: u32| (((a >> shift) & 0xFF) + ((b >> shift) & 0xFF)).min(0xFF) << shift;
    0xFF000000 | ch(16) | ch(8) | ch(0)
}

/// Alpha-blend two ARGB colors. `t` = 0.0 → all `a`, `t` = 1.0 → all `b`.
fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |ca: u32, cb: u32| (ca as f32 * (1.0 - t) + cb as f32 * t) as u32;
    let ar = (a >> 16) & 0xFF; let br = (b >> 16) & 0xFF;
    let ag = (a >>  8) & 0xFF; let bg = (b >>  8) & 0xFF;
    let ab =  a        & 0xFF; let bb =  b        & 0xFF;
    0xFF000000 | (lerp(ar, br) << 16) | (lerp(ag, bg) << 8) | lerp(ab, bb)
}

/// Stand-in color for a photo: a stable muted tone derived from its handle.
fn photo_tint(handle: &PhotoHandle) -> u32 {
    let h = handle.as_str().bytes()
        .fold(0x811C_9DC5u32, |h, b| (h ^ b as u32).wrapping_mul(0x0100_0193));
    let ch = |shift: u32| 0x50 + ((h >> shift) & 0x7F);
    0xFF000000 | (ch(16) << 16) | (ch(8) << 8) | ch(0)
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

const FALLBACK_GLYPH: [u8; 5] = [0b000, 0b000, 0b010, 0b000, 0b000];

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '(' => [0b001, 0b010, 0b010, 0b010, 0b001],
        ')' => [0b100, 0b010, 0b010, 0b010, 0b100],
        '`' | '\'' => [0b010, 0b010, 0b000, 0b000, 0b000],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => FALLBACK_GLYPH,
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

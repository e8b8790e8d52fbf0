//! Color themes and the fixed dimensions of the tree.

use glam::Vec3;

// ════════════════════════════════════════════════════════════════════════════
// Field dimensions
// ════════════════════════════════════════════════════════════════════════════

pub const PARTICLE_COUNT:   usize = 8000;
pub const TREE_HEIGHT:      f32   = 12.0;
pub const TREE_RADIUS:      f32   = 5.0;
pub const EXPLOSION_RADIUS: f32   = 25.0;

// ════════════════════════════════════════════════════════════════════════════
// Rgb
// ════════════════════════════════════════════════════════════════════════════

/// An 8-bit-per-channel color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// From `0xRRGGBB`.
    pub const fn hex(hex: u32) -> Self {
        Rgb {
            r: ((hex >> 16) & 0xFF) as u8,
            g: ((hex >>  8) & 0xFF) as u8,
            b: ( hex        & 0xFF) as u8,
        }
    }

    /// Channels as 0.0–1.0.
    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.r as f32, self.g as f32, self.b as f32) / 255.0
    }

    /// Packed opaque ARGB (`0xFFRRGGBB`) for a framebuffer.
    pub fn to_argb(self) -> u32 {
        0xFF000000 | ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Channel-wise blend; `t` is not clamped so callers may overshoot.
    pub fn lerp(a: Rgb, b: Rgb, t: f32) -> Vec3 {
        a.to_vec3().lerp(b.to_vec3(), t)
    }
}

/// Pack 0.0–1.0 channels into ARGB, saturating out-of-range values.
pub fn vec3_to_argb(c: Vec3) -> u32 {
    let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0) as u32;
    0xFF000000 | (q(c.x) << 16) | (q(c.y) << 8) | q(c.z)
}

// ════════════════════════════════════════════════════════════════════════════
// ThemeConfig
// ════════════════════════════════════════════════════════════════════════════

/// A user-selectable palette.  Changing themes rebuilds the particle field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThemeConfig {
    pub id:         &'static str,
    pub name:       &'static str,
    /// Upper / brighter particles.
    pub primary:    Rgb,
    /// Lower particles.
    pub secondary:  Rgb,
    pub glow:       Rgb,
    pub background: Rgb,
    pub light:      Rgb,
}

pub static ICE: ThemeConfig = ThemeConfig {
    id:         "ICE",
    name:       "Glacial Luxury",
    primary:    Rgb::hex(0xE0F2FF),
    secondary:  Rgb::hex(0x0066FF),
    glow:       Rgb::hex(0x4488FF),
    background: Rgb::hex(0x000814),
    light:      Rgb::hex(0xAACCFF),
};

pub static CLASSIC: ThemeConfig = ThemeConfig {
    id:         "CLASSIC",
    name:       "Royal Tradition",
    primary:    Rgb::hex(0xFFD700),
    secondary:  Rgb::hex(0x0F5132),
    glow:       Rgb::hex(0xC41E3A),
    background: Rgb::hex(0x051005),
    light:      Rgb::hex(0xFFDDAA),
};

pub static NEON: ThemeConfig = ThemeConfig {
    id:         "NEON",
    name:       "Cyber Night",
    primary:    Rgb::hex(0x00FFFF),
    secondary:  Rgb::hex(0xFF00FF),
    glow:       Rgb::hex(0x9D00FF),
    background: Rgb::hex(0x0A0014),
    light:      Rgb::hex(0xFFAAEE),
};

static ALL: [&ThemeConfig; 3] = [&ICE, &CLASSIC, &NEON];

impl ThemeConfig {
    /// Built-in themes in menu order.
    pub fn all() -> &'static [&'static ThemeConfig] { &ALL }

    /// Case-insensitive lookup by id.
    pub fn by_id(id: &str) -> Option<&'static ThemeConfig> {
        ALL.iter().copied().find(|t| t.id.eq_ignore_ascii_case(id))
    }

    /// The theme after this one, wrapping.
    pub fn next(&self) -> &'static ThemeConfig {
        let i = ALL.iter().position(|t| t.id == self.id).unwrap_or(0);
        ALL[(i + 1) % ALL.len()]
    }

    /// The startup theme.
    pub fn default_theme() -> &'static ThemeConfig { &ICE }
}

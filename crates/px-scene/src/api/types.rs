use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use serde::{Deserialize, Serialize};

slotmap::new_key_type! {
    /// Stable handle to an entity stored in a [`Scene`](crate::Scene).
    /// Identity is the handle, never the entity's contents.
    pub struct EntityId;
}

/// A 32-bit ARGB color. This is also the pixel format of every surface.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub u32);

impl Color {
    pub const TRANSPARENT: Self = Self(0x0000_0000);
    pub const WHITE: Self = Self(0xFFFF_FFFF);
    pub const BLACK: Self = Self(0xFF00_0000);
    pub const RED: Self = Self(0xFFFF_0000);
    pub const GREEN: Self = Self(0xFF00_FF00);
    pub const BLUE: Self = Self(0xFF00_00FF);
    pub const LIGHT_GRAY: Self = Self(0xFFCC_CCCC);

    pub const fn argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self((a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32)
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::argb(0xFF, r, g, b)
    }

    pub const fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub const fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn blue(self) -> u8 {
        self.0 as u8
    }

    /// Alpha as a fraction in [0, 1].
    pub fn opacity(self) -> f32 {
        self.alpha() as f32 / 255.0
    }

    /// Replace the alpha channel, keeping RGB.
    pub fn with_opacity(self, opacity: f32) -> Self {
        let a = (opacity.clamp(0.0, 1.0) * 255.0).round() as u32;
        Self((self.0 & 0x00FF_FFFF) | (a << 24))
    }

    /// Multiply the existing alpha channel by `factor`.
    pub fn fade(self, factor: f32) -> Self {
        self.with_opacity(self.opacity() * factor.clamp(0.0, 1.0))
    }

    pub fn to_rgba8(self) -> [u8; 4] {
        [self.red(), self.green(), self.blue(), self.alpha()]
    }

    pub fn from_rgba8([r, g, b, a]: [u8; 4]) -> Self {
        Self::argb(a, r, g, b)
    }
}

/// World-space placement of an entity: translation plus rotation in radians (CCW positive).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    pub position: Vec2,
    pub rotation: f32,
}

impl Pose {
    pub const fn new(position: Vec2, rotation: f32) -> Self {
        Self { position, rotation }
    }
}

use crate::category::{Category, CategoryId};
use crate::config::LayoutConfig;
use palette::Srgb;
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::fmt;
use std::str::FromStr;

/// Ring colour, written as `#rrggbb` in config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, SerializeDisplay, DeserializeFromStr)]
pub struct BandColor(pub Srgb<u8>);

impl BandColor {
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self(Srgb::new(red, green, blue))
    }

    /// Gold, bronze, dark goldenrod, sienna, dark khaki, slate grey, medium purple,
    /// light steel blue, gainsboro.
    pub fn stone_and_metal() -> Vec<Self> {
        vec![
            Self::rgb(0xd4, 0xaf, 0x37),
            Self::rgb(0xcd, 0x7f, 0x32),
            Self::rgb(0xb8, 0x86, 0x0b),
            Self::rgb(0xa0, 0x52, 0x2d),
            Self::rgb(0x8b, 0x73, 0x55),
            Self::rgb(0x70, 0x80, 0x90),
            Self::rgb(0x93, 0x70, 0xdb),
            Self::rgb(0xb0, 0xc4, 0xde),
            Self::rgb(0xdc, 0xdc, 0xdc),
        ]
    }

    pub fn to_unit_rgb(self) -> (f64, f64, f64) {
        let c: Srgb<f64> = self.0.into_format();
        (c.red, c.green, c.blue)
    }
}

impl FromStr for BandColor {
    type Err = palette::rgb::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Srgb::from_str(s.trim()).map(Self)
    }
}

impl fmt::Display for BandColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0.red, self.0.green, self.0.blue)
    }
}

/// A ring on the dial. Bands are ordered innermost first; `index` is the position in that
/// order, not the category's raw ordinal.
#[derive(Debug, Clone, PartialEq)]
pub struct Band {
    pub category_id: CategoryId,
    pub index: usize,
    pub radius: f64,
    pub thickness: f64,
    /// Resting stacking order: inner bands sit above outer ones.
    pub z_order: usize,
    pub color: BandColor,
}

impl Band {
    pub fn inner_radius(&self) -> f64 {
        self.radius - self.thickness / 2.0
    }

    pub fn outer_radius(&self) -> f64 {
        self.radius + self.thickness / 2.0
    }

    /// Radial membership. The inner edge is open so bands that touch never share a point.
    pub fn contains_distance(&self, distance: f64) -> bool {
        distance > self.inner_radius() && distance <= self.outer_radius()
    }
}

pub fn band_radius(index: usize, cfg: &LayoutConfig) -> f64 {
    cfg.min_radius + index as f64 * cfg.radius_step
}

pub fn layout(categories: &[Category], cfg: &LayoutConfig) -> Vec<Band> {
    let mut ordered: Vec<&Category> = categories.iter().collect();
    ordered.sort_by_key(|c| c.ordinal_index);

    let count = ordered.len();
    ordered
        .into_iter()
        .enumerate()
        .map(|(index, category)| Band {
            category_id: category.id.clone(),
            index,
            radius: band_radius(index, cfg),
            thickness: cfg.thickness,
            z_order: count - 1 - index,
            color: cfg.palette[index % cfg.palette.len()],
        })
        .collect()
}

//! Toolbar color palette (Tailwind v3 shades 300 to 800).

use crate::shapes::SerializableColor;

/// Palette color families, in toolbar order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorName {
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
    Gray,
}

impl ColorName {
    pub const ALL: [ColorName; 6] = [
        ColorName::Red,
        ColorName::Blue,
        ColorName::Green,
        ColorName::Yellow,
        ColorName::Purple,
        ColorName::Gray,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ColorName::Red => "red",
            ColorName::Blue => "blue",
            ColorName::Green => "green",
            ColorName::Yellow => "yellow",
            ColorName::Purple => "purple",
            ColorName::Gray => "gray",
        }
    }

    /// Hex values for shades 300..=800.
    fn shades(&self) -> &'static [&'static str; 6] {
        match self {
            ColorName::Red => &["#fca5a5", "#f87171", "#ef4444", "#dc2626", "#b91c1c", "#991b1b"],
            ColorName::Blue => &["#93c5fd", "#60a5fa", "#3b82f6", "#2563eb", "#1d4ed8", "#1e40af"],
            ColorName::Green => &["#86efac", "#4ade80", "#22c55e", "#16a34a", "#15803d", "#166534"],
            ColorName::Yellow => &["#fde047", "#facc15", "#eab308", "#ca8a04", "#a16207", "#854d0e"],
            ColorName::Purple => &["#d8b4fe", "#c084fc", "#a855f7", "#9333ea", "#7e22ce", "#6b21a8"],
            ColorName::Gray => &["#d1d5db", "#9ca3af", "#6b7280", "#4b5563", "#374151", "#1f2937"],
        }
    }
}

/// Available shades.
pub const SHADES: [u16; 6] = [300, 400, 500, 600, 700, 800];

/// Colors offered outside the shade grid.
pub const EXTRA_COLORS: [&str; 2] = ["#ffffff", "#000000"];

/// Tailwind red-600.
pub const DEFAULT_COLOR: SerializableColor = SerializableColor::new(0xdc, 0x26, 0x26, 255);

/// Hex string for a palette entry, or `None` for an unknown shade.
pub fn hex(name: ColorName, shade: u16) -> Option<&'static str> {
    let index = SHADES.iter().position(|s| *s == shade)?;
    Some(name.shades()[index])
}

/// Color for a palette entry.
pub fn color(name: ColorName, shade: u16) -> Option<SerializableColor> {
    hex(name, shade).and_then(SerializableColor::from_hex)
}

//! Swatches offered by the customizer.

/// A named color offered to the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Swatch {
    pub name: &'static str,
    pub hex: &'static str,
}

const fn swatch(name: &'static str, hex: &'static str) -> Swatch {
    Swatch { name, hex }
}

pub const PAINT_SWATCHES: [Swatch; 8] = [
    swatch("Obsidian", "#0a0a0a"),
    swatch("Silver Surge", "#c0c0c0"),
    swatch("Atomic Red", "#ff0000"),
    swatch("Electric Blue", "#0066ff"),
    swatch("Cyber Lime", "#32cd32"),
    swatch("Gold Rush", "#ffd700"),
    swatch("Deep Purple", "#4b0082"),
    swatch("Frozen White", "#f8f8ff"),
];

pub const NEON_SWATCHES: [Swatch; 4] = [
    swatch("Cyber Cyan", "#00ffff"),
    swatch("Acid Green", "#7fff00"),
    swatch("Magma Pink", "#ff1493"),
    swatch("Ultraviolet", "#9400d3"),
];

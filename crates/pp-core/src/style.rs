//! Colors, marker symbols and the palette that assigns them to series

use serde::{Deserialize, Serialize};

/// An opaque RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    /// Neutral color used for aggregate views and empty palettes
    pub const GRAY: Rgb = Rgb([160, 160, 160]);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b])
    }

    pub fn r(&self) -> u8 {
        self.0[0]
    }

    pub fn g(&self) -> u8 {
        self.0[1]
    }

    pub fn b(&self) -> u8 {
        self.0[2]
    }
}

/// Marker drawn at each point of a scatter series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerSymbol {
    Circle,
    Down,
    Up,
    Right,
    Left,
    Square,
    Asterisk,
    Plus,
    Diamond,
    Cross,
}

/// Twelve visually distinct colors; one more than there are symbols so
/// consecutive columns rarely repeat the same color/symbol pair.
const DISTINCT_COLORS: [Rgb; 12] = [
    Rgb::new(230, 25, 75),
    Rgb::new(60, 180, 75),
    Rgb::new(255, 225, 25),
    Rgb::new(0, 130, 200),
    Rgb::new(245, 130, 48),
    Rgb::new(145, 30, 180),
    Rgb::new(70, 240, 240),
    Rgb::new(240, 50, 230),
    Rgb::new(210, 245, 60),
    Rgb::new(250, 190, 212),
    Rgb::new(0, 128, 128),
    Rgb::new(220, 190, 255),
];

const SYMBOLS: [MarkerSymbol; 10] = [
    MarkerSymbol::Circle,
    MarkerSymbol::Down,
    MarkerSymbol::Up,
    MarkerSymbol::Right,
    MarkerSymbol::Left,
    MarkerSymbol::Square,
    MarkerSymbol::Asterisk,
    MarkerSymbol::Plus,
    MarkerSymbol::Diamond,
    MarkerSymbol::Cross,
];

/// Cycling color and symbol sequences indexed by a column's identity index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    pub colors: Vec<Rgb>,
    pub symbols: Vec<MarkerSymbol>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: DISTINCT_COLORS.to_vec(),
            symbols: SYMBOLS.to_vec(),
        }
    }
}

impl Palette {
    /// Color for the given identity index
    pub fn color(&self, identity: usize) -> Rgb {
        if self.colors.is_empty() {
            return Rgb::GRAY;
        }
        self.colors[identity % self.colors.len()]
    }

    /// Symbol for the given identity index
    pub fn symbol(&self, identity: usize) -> MarkerSymbol {
        if self.symbols.is_empty() {
            return MarkerSymbol::Circle;
        }
        self.symbols[identity % self.symbols.len()]
    }
}

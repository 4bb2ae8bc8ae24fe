use meshboard_core::Color;

use crate::error::SceneError;

/// Pastel palette assets are colored from, in order.
const DEFAULT_HEX: [u32; 10] = [
    0xD8E2DC, // grey pink
    0xFFE5D9, // light coral
    0xFEC89A, // light apricot
    0xF9DCC4, // pale beige
    0xE8E8E4, // light grey
    0xD6E2E9, // grey blue
    0xEFD3D7, // pale mauve
    0xF2E8CF, // pale khaki
    0xDDE5B6, // pale olive
    0xE0C3A0, // light camel
];

/// Ordered, non-empty list of display colors.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<Color>,
}

impl Palette {
    pub fn new(colors: Vec<Color>) -> Result<Self, SceneError> {
        if colors.is_empty() {
            return Err(SceneError::EmptyPalette);
        }
        Ok(Self { colors })
    }

    /// Parse a list of `#RRGGBB` strings, as found in settings files.
    pub fn from_hex_strings<S: AsRef<str>>(values: &[S]) -> Result<Self, SceneError> {
        let colors = values
            .iter()
            .map(|s| s.as_ref().parse::<Color>())
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(colors)
    }

    /// Color for the `index`-th rendered item, cycling through the palette.
    pub fn color_for(&self, index: usize) -> Color {
        self.colors[index % self.colors.len()]
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: DEFAULT_HEX.iter().map(|&hex| Color::from_hex(hex)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_palette_cycles() {
        let palette = Palette::default();
        assert_eq!(palette.len(), 10);
        assert_eq!(palette.color_for(0), palette.color_for(10));
        assert_eq!(palette.color_for(3), palette.color_for(23));
        assert_ne!(palette.color_for(0), palette.color_for(1));
        assert_eq!(palette.color_for(2).to_hex_string(), "#FEC89A");
    }

    #[test]
    fn test_empty_palette_is_rejected() {
        assert_eq!(Palette::new(Vec::new()), Err(SceneError::EmptyPalette));
        assert_eq!(
            Palette::from_hex_strings::<&str>(&[]),
            Err(SceneError::EmptyPalette)
        );
    }

    #[test]
    fn test_parses_hex_strings() {
        let palette = Palette::from_hex_strings(&["#FF0000", "00FF00"]).unwrap();
        assert_eq!(palette.color_for(1), Color::rgb(0.0, 1.0, 0.0));
        assert!(matches!(
            Palette::from_hex_strings(&["#nothex"]),
            Err(SceneError::BadColor(_))
        ));
    }
}

use image::Rgba;
use serde::{Deserialize, Serialize};

// ============================================================================
// ColourState — foreground / background pair the tools paint with
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColourState {
    pub foreground: Rgba<u8>,
    pub background: Rgba<u8>,
}

impl Default for ColourState {
    fn default() -> Self {
        Self {
            foreground: Rgba([0, 0, 0, 255]),
            background: Rgba([255, 255, 255, 255]),
        }
    }
}

impl ColourState {
    pub fn swap_colours(&mut self) {
        std::mem::swap(&mut self.foreground, &mut self.background);
    }
}

// ============================================================================
// Swatch — ordered palette of named colours
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwatchColour {
    pub name: String,
    pub colour: [u8; 4],
}

impl SwatchColour {
    pub fn new(name: impl Into<String>, colour: Rgba<u8>) -> Self {
        Self { name: name.into(), colour: colour.0 }
    }

    pub fn rgba(&self) -> Rgba<u8> {
        Rgba(self.colour)
    }
}

/// An ordered palette. A colour may appear several times; textured fills
/// use how often each colour appears as its probability.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Swatch {
    pub colours: Vec<SwatchColour>,
}

impl Swatch {
    pub fn new(colours: Vec<SwatchColour>) -> Self {
        Self { colours }
    }

    /// Swatch built from a colour scan, named by hex value.
    pub fn from_colours(colours: &[Rgba<u8>]) -> Self {
        Self {
            colours: colours
                .iter()
                .map(|c| {
                    let name = format!("#{:02X}{:02X}{:02X}{:02X}", c[0], c[1], c[2], c[3]);
                    SwatchColour::new(name, *c)
                })
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.colours.is_empty()
    }

    pub fn len(&self) -> usize {
        self.colours.len()
    }

    /// Distinct colours with their share of the swatch, in order of first
    /// appearance. The shares sum to 1.
    pub fn weights(&self) -> Vec<(Rgba<u8>, f32)> {
        let mut counts: Vec<(Rgba<u8>, usize)> = Vec::new();
        for entry in &self.colours {
            let c = entry.rgba();
            match counts.iter_mut().find(|(k, _)| *k == c) {
                Some((_, n)) => *n += 1,
                None => counts.push((c, 1)),
            }
        }
        let total = self.colours.len() as f32;
        counts.into_iter().map(|(c, n)| (c, n as f32 / total)).collect()
    }
}

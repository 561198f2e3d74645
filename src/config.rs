//! Engine configuration.
//!
//! Everything the tools need from the surrounding application's settings is
//! carried in [`EngineConfig`] and handed to the core explicitly. The text
//! form is the same `key=value` format the application settings file uses, but
//! reading and writing that file is left to the application.

use serde::{Deserialize, Serialize};

use crate::components::tools::PenRightClickBehaviour;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Largest brush size the tools accept.
    pub max_tool_size: u32,
    /// Maximum number of undo steps (0 = unlimited).
    pub max_undo_steps: usize,
    pub pen_right_click_behaviour: PenRightClickBehaviour,
    /// Fill tolerance, 0 = exact match, 255 = everything.
    pub fill_tolerance: u8,
    /// Side of the square around the seed that greedy fills may reach.
    /// `None` = the whole layer.
    pub greedy_fill_reach: Option<u32>,
    /// Distance from a viewport edge at which a selection drag starts panning.
    pub pan_margin: u32,
    /// Colour scans stop once more than this many unique colours are found.
    pub max_palette_colours: usize,
    /// Largest image (in pixels) a colour scan accepts.
    pub max_palette_scan_pixels: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_tool_size: 100,
            max_undo_steps: 100,
            pen_right_click_behaviour: PenRightClickBehaviour::AppliesEraser,
            fill_tolerance: 0,
            greedy_fill_reach: None,
            pan_margin: 10,
            max_palette_colours: 500,
            max_palette_scan_pixels: 4096 * 4096,
        }
    }
}

impl EngineConfig {
    /// Parse `key=value` lines. Unknown keys and bad values keep their defaults.
    pub fn from_config_str(content: &str) -> Self {
        let mut c = Self::default();
        for line in content.lines() {
            let Some((key, val)) = line.split_once('=') else { continue };
            let key = key.trim();
            let val = val.trim();
            match key {
                "max_tool_size" => {
                    c.max_tool_size = val.parse().unwrap_or(c.max_tool_size).max(1);
                }
                "max_undo_steps" => {
                    c.max_undo_steps = val.parse().unwrap_or(c.max_undo_steps);
                }
                "pen_right_click_behaviour" => {
                    c.pen_right_click_behaviour = match val {
                        "eyedropper" => PenRightClickBehaviour::AppliesEyeDropper,
                        "background" => PenRightClickBehaviour::AppliesBackgroundColour,
                        _ => PenRightClickBehaviour::AppliesEraser,
                    };
                }
                "fill_tolerance" => {
                    c.fill_tolerance = val.parse().unwrap_or(c.fill_tolerance);
                }
                "greedy_fill_reach" => {
                    c.greedy_fill_reach = match val {
                        "" | "none" => None,
                        v => v.parse().ok().filter(|n: &u32| *n > 0),
                    };
                }
                "pan_margin" => {
                    c.pan_margin = val.parse().unwrap_or(c.pan_margin);
                }
                "max_palette_colours" => {
                    c.max_palette_colours = val.parse().unwrap_or(c.max_palette_colours);
                }
                "max_palette_scan_pixels" => {
                    c.max_palette_scan_pixels = val.parse().unwrap_or(c.max_palette_scan_pixels);
                }
                _ => {}
            }
        }
        c
    }

    pub fn to_config_string(&self) -> String {
        let behaviour = match self.pen_right_click_behaviour {
            PenRightClickBehaviour::AppliesEraser => "eraser",
            PenRightClickBehaviour::AppliesEyeDropper => "eyedropper",
            PenRightClickBehaviour::AppliesBackgroundColour => "background",
        };
        let reach = self
            .greedy_fill_reach
            .map_or_else(|| "none".to_string(), |n| n.to_string());
        format!(
            "max_tool_size={}\n\
             max_undo_steps={}\n\
             pen_right_click_behaviour={behaviour}\n\
             fill_tolerance={}\n\
             greedy_fill_reach={reach}\n\
             pan_margin={}\n\
             max_palette_colours={}\n\
             max_palette_scan_pixels={}\n",
            self.max_tool_size,
            self.max_undo_steps,
            self.fill_tolerance,
            self.pan_margin,
            self.max_palette_colours,
            self.max_palette_scan_pixels,
        )
    }
}

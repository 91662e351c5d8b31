//! Node measurement.
//!
//! The real measurer lives in the renderer (it knows fonts and CSS); the
//! layout only needs a deterministic `node -> size` function for one pass.

use super::geometry::Size;
use crate::tree::Node;

/// Intrinsic size of a node's rendered content.
pub trait Measure {
    fn measure(&self, node: &Node) -> Size;
}

impl<F> Measure for F
where
    F: Fn(&Node) -> Size,
{
    fn measure(&self, node: &Node) -> Size {
        self(node)
    }
}

/// Monospace estimate for hosts without a text engine.
///
/// Honors a `fontSize` style entry (`"18px"` or `"18"`) by scaling the base
/// metrics; other style keys are ignored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharWidthMeasure {
    pub char_width: f32,
    pub line_height: f32,
    pub padding_x: f32,
    pub padding_y: f32,
    /// Font size the base metrics were taken at.
    pub base_font_size: f32,
}

impl Default for CharWidthMeasure {
    fn default() -> Self {
        Self {
            char_width: 8.0,
            line_height: 20.0,
            padding_x: 12.0,
            padding_y: 6.0,
            base_font_size: 16.0,
        }
    }
}

impl CharWidthMeasure {
    fn scale(&self, node: &Node) -> f32 {
        node.style
            .get("fontSize")
            .and_then(|size| size.trim_end_matches("px").trim().parse::<f32>().ok())
            .filter(|size| *size > 0.0)
            .map_or(1.0, |size| size / self.base_font_size)
    }
}

impl Measure for CharWidthMeasure {
    fn measure(&self, node: &Node) -> Size {
        let scale = self.scale(node);
        let lines = node.topic.lines().count().max(1);
        let longest = node
            .topic
            .lines()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0);

        Size::new(
            longest as f32 * self.char_width * scale + 2.0 * self.padding_x,
            lines as f32 * self.line_height * scale + 2.0 * self.padding_y,
        )
    }
}

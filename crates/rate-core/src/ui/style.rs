//! Resolved, immutable widget style
//!
//! A [`Style`] is built once from a [`RateConfig`] and then shared read-only
//! by the renderer and the animation controller. Every radius derives from
//! the inner point radius, matching the proportions of the widget's design:
//!
//! | Element          | Radius          |
//! |------------------|-----------------|
//! | inner disc       | `inner`         |
//! | line stroke      | `inner` (width) |
//! | outer ring       | `2 * inner`     |
//! | selected point   | `4 * inner`     |

use embedded_graphics::mono_font::ascii::{FONT_8X13, FONT_9X18_BOLD};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::text::Baseline;
use embedded_graphics::text::renderer::TextRenderer;

use crate::config::RateConfig;
use crate::ui::colors::{SIMPLE_TEXT_ALPHA, blend};

/// Inner point radius every other dimension derives from
pub const DEFAULT_INNER_RADIUS_PX: u32 = 8;

/// Extra pixel used to fully cover anti-aliased edges when clearing
pub const RADIUS_DELTA_PX: u32 = 1;

/// Font for unselected labels
pub const SIMPLE_FONT: &MonoFont<'static> = &FONT_8X13;

/// Font for the selected label (larger and bold)
pub const SELECTED_FONT: &MonoFont<'static> = &FONT_9X18_BOLD;

/// Colors, radii and label fonts of one widget instance.
#[derive(Debug, Clone, Copy)]
pub struct Style {
    pub selected_color: Rgb565,
    pub simple_color: Rgb565,
    pub background_color: Rgb565,
    /// Unselected label color: translucent black over the background
    pub simple_text_color: Rgb565,

    pub inner_radius: u32,
    pub line_width: u32,
    pub outer_radius: u32,
    pub selected_radius: u32,
    pub radius_delta: u32,

    pub simple_font: &'static MonoFont<'static>,
    pub selected_font: &'static MonoFont<'static>,

    /// How far the unselected baseline sits above the selected one
    label_baseline_shift: f32,
}

impl Style {
    /// Resolve the style for a configuration using the default dimensions.
    pub fn new(config: &RateConfig) -> Self {
        Self::with_inner_radius(config, DEFAULT_INNER_RADIUS_PX)
    }

    /// Resolve the style with a custom inner point radius.
    pub fn with_inner_radius(config: &RateConfig, inner_radius: u32) -> Self {
        let outer_radius = inner_radius << 1;
        let selected_radius = outer_radius << 1;

        Self {
            selected_color: config.selected_color,
            simple_color: config.simple_color,
            background_color: config.background_color,
            simple_text_color: blend(Rgb565::BLACK, config.background_color, SIMPLE_TEXT_ALPHA),
            inner_radius,
            line_width: inner_radius,
            outer_radius,
            selected_radius,
            radius_delta: RADIUS_DELTA_PX,
            simple_font: SIMPLE_FONT,
            selected_font: SELECTED_FONT,
            label_baseline_shift: baseline_shift(SIMPLE_FONT, SELECTED_FONT),
        }
    }

    /// Radius of a point flipped during an animation.
    pub fn filled_point_radius(&self) -> u32 {
        self.outer_radius + self.radius_delta
    }

    /// Radius that fully erases a selected point.
    pub fn selected_clear_radius(&self) -> u32 {
        self.selected_radius + self.radius_delta
    }

    /// Horizontal tap tolerance around each point center.
    pub fn hit_radius(&self) -> f32 {
        self.selected_radius as f32
    }

    /// Distance of the first and last point from the widget edges.
    pub fn edge_offset(&self) -> f32 {
        self.selected_radius as f32
    }

    pub fn label_baseline_shift(&self) -> f32 {
        self.label_baseline_shift
    }

    pub fn simple_label_style(&self) -> MonoTextStyle<'static, Rgb565> {
        MonoTextStyle::new(self.simple_font, self.simple_text_color)
    }

    pub fn selected_label_style(&self) -> MonoTextStyle<'static, Rgb565> {
        MonoTextStyle::new(self.selected_font, self.selected_color)
    }
}

/// Vertical distance between the centers of the `"0"` glyph boxes.
///
/// Computed once so both label sizes appear centered on the same row.
fn baseline_shift(simple: &'static MonoFont<'static>, selected: &'static MonoFont<'static>) -> f32 {
    let center_y = |font: &'static MonoFont<'static>| -> f32 {
        let bounds = MonoTextStyle::new(font, Rgb565::BLACK)
            .measure_string("0", Point::zero(), Baseline::Alphabetic)
            .bounding_box;
        bounds.top_left.y as f32 + bounds.size.height as f32 / 2.0
    };
    (center_y(simple) - center_y(selected)).abs()
}

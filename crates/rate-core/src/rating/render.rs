//! Painting of the rate widget onto a raster target.
//!
//! The [`Renderer`] knows two static states (base and rated) and otherwise
//! executes [`PaintOp`]s handed to it by the animation controller. Ops are
//! declarative so they can be inspected in tests and replayed against any
//! `DrawTarget`.

extern crate alloc;

use alloc::vec::Vec;
use core::fmt::Write;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Circle, Line, PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyle, TextStyleBuilder};

use super::layout::Geometry;
use crate::ui::Style;

/// Style role of a painted shape, resolved against the [`Style`] at paint time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paint {
    Selected,
    Simple,
    Background,
}

/// One incremental drawing instruction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PaintOp {
    /// Stretch of the connecting line between two x positions
    Segment { from_x: f32, to_x: f32, paint: Paint },
    /// Filled circle centered on a point
    Disc {
        index: usize,
        radius: u32,
        paint: Paint,
    },
    /// Erase the square around a point before it is redrawn
    ClearPoint { index: usize },
    /// Erase the label area above a point
    ClearLabel { index: usize },
    /// Draw the 1-based label of a point
    Label { index: usize, selected: bool },
}

pub type PaintOps = Vec<PaintOp>;

/// Paints widget states using a shared style and geometry.
pub struct Renderer<'a> {
    style: &'a Style,
    geometry: &'a Geometry,
}

impl<'a> Renderer<'a> {
    pub fn new(style: &'a Style, geometry: &'a Geometry) -> Self {
        Self { style, geometry }
    }

    /// Paint the unrated widget: line, hollow points and the two end labels.
    pub fn paint_base<D: DrawTarget<Color = Rgb565>>(&self, target: &mut D) -> Result<(), D::Error> {
        let style = self.style;
        let points = &self.geometry.points;

        target.clear(style.background_color)?;

        self.segment(target, points[0], points[points.last_index()], style.simple_color)?;

        for index in 0..points.len() {
            self.disc(target, index, style.outer_radius, style.simple_color)?;
            self.disc(target, index, style.inner_radius, style.background_color)?;
        }

        self.label(target, 0, false)?;
        self.label(target, points.last_index(), false)
    }

    /// Paint a rating without animation, on top of the base state.
    pub fn paint_rated_static<D: DrawTarget<Color = Rgb565>>(
        &self,
        target: &mut D,
        rating: usize,
    ) -> Result<(), D::Error> {
        let style = self.style;
        let points = &self.geometry.points;

        self.segment(target, points[0], points[rating], style.selected_color)?;
        for index in 0..rating {
            self.disc(target, index, style.outer_radius, style.selected_color)?;
        }
        self.disc(target, rating, style.selected_radius, style.selected_color)?;

        self.clear_label(target, rating)?;
        self.label(target, rating, true)
    }

    /// Select the first point without animation.
    pub fn paint_start_point<D: DrawTarget<Color = Rgb565>>(&self, target: &mut D) -> Result<(), D::Error> {
        self.execute(target, &Self::start_point_ops(self.style))
    }

    /// Ops selecting the first point when the widget leaves the unrated state.
    pub fn start_point_ops(style: &Style) -> PaintOps {
        alloc::vec![
            PaintOp::ClearLabel { index: 0 },
            PaintOp::Disc {
                index: 0,
                radius: style.selected_radius,
                paint: Paint::Selected,
            },
            PaintOp::Label {
                index: 0,
                selected: true,
            },
        ]
    }

    /// Apply ops in order.
    pub fn execute<D: DrawTarget<Color = Rgb565>>(
        &self,
        target: &mut D,
        ops: &[PaintOp],
    ) -> Result<(), D::Error> {
        for op in ops {
            match *op {
                PaintOp::Segment {
                    from_x,
                    to_x,
                    paint,
                } => self.segment(target, from_x, to_x, self.color(paint))?,
                PaintOp::Disc {
                    index,
                    radius,
                    paint,
                } => self.disc(target, index, radius, self.color(paint))?,
                PaintOp::ClearPoint { index } => self.clear_point(target, index)?,
                PaintOp::ClearLabel { index } => self.clear_label(target, index)?,
                PaintOp::Label { index, selected } => self.label(target, index, selected)?,
            }
        }
        Ok(())
    }

    fn color(&self, paint: Paint) -> Rgb565 {
        match paint {
            Paint::Selected => self.style.selected_color,
            Paint::Simple => self.style.simple_color,
            Paint::Background => self.style.background_color,
        }
    }

    fn segment<D: DrawTarget<Color = Rgb565>>(
        &self,
        target: &mut D,
        from_x: f32,
        to_x: f32,
        color: Rgb565,
    ) -> Result<(), D::Error> {
        let y = self.geometry.line_y;
        Line::new(
            Point::new(libm::roundf(from_x) as i32, y),
            Point::new(libm::roundf(to_x) as i32, y),
        )
        .into_styled(PrimitiveStyle::with_stroke(color, self.style.line_width))
        .draw(target)
    }

    fn disc<D: DrawTarget<Color = Rgb565>>(
        &self,
        target: &mut D,
        index: usize,
        radius: u32,
        color: Rgb565,
    ) -> Result<(), D::Error> {
        Circle::with_center(self.geometry.center(index), radius * 2)
            .into_styled(PrimitiveStyle::with_fill(color))
            .draw(target)
    }

    /// Square `outer_radius` wide, padded two delta pixels above and below.
    fn clear_point<D: DrawTarget<Color = Rgb565>>(
        &self,
        target: &mut D,
        index: usize,
    ) -> Result<(), D::Error> {
        let center = self.geometry.center(index);
        let half_w = self.style.outer_radius as i32;
        let half_h = half_w + 2 * self.style.radius_delta as i32;
        let area = Rectangle::with_corners(
            center - Point::new(half_w, half_h),
            center + Point::new(half_w, half_h),
        );
        target.fill_solid(&area, self.style.background_color)
    }

    /// Area covered by the selected label of a point, plus the radius delta.
    pub fn label_area(&self, index: usize) -> Rectangle {
        let text = label_text(index);
        Text::with_text_style(
            &text,
            Point::new(self.geometry.center(index).x, self.geometry.selected_text_y),
            self.style.selected_label_style(),
            label_alignment(),
        )
        .bounding_box()
        .offset(self.style.radius_delta as i32)
    }

    fn clear_label<D: DrawTarget<Color = Rgb565>>(
        &self,
        target: &mut D,
        index: usize,
    ) -> Result<(), D::Error> {
        target.fill_solid(&self.label_area(index), self.style.background_color)
    }

    fn label<D: DrawTarget<Color = Rgb565>>(
        &self,
        target: &mut D,
        index: usize,
        selected: bool,
    ) -> Result<(), D::Error> {
        let text = label_text(index);
        let x = self.geometry.center(index).x;
        if selected {
            Text::with_text_style(
                &text,
                Point::new(x, self.geometry.selected_text_y),
                self.style.selected_label_style(),
                label_alignment(),
            )
            .draw(target)?;
        } else {
            Text::with_text_style(
                &text,
                Point::new(x, self.geometry.simple_text_y),
                self.style.simple_label_style(),
                label_alignment(),
            )
            .draw(target)?;
        }
        Ok(())
    }
}

/// Labels show the 1-based rating.
fn label_text(index: usize) -> heapless::String<8> {
    let mut text = heapless::String::new();
    write!(text, "{}", index + 1).ok();
    text
}

fn label_alignment() -> TextStyle {
    TextStyleBuilder::new()
        .alignment(Alignment::Center)
        .baseline(Baseline::Alphabetic)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RateConfig;
    use crate::framebuffer::FrameBuffer;
    use embedded_graphics::primitives::PointsIter;

    fn setup() -> (Style, Geometry) {
        let style = Style::new(&RateConfig::default());
        let geometry = Geometry::new(Size::new(320, 160), 5, &style).unwrap();
        (style, geometry)
    }

    fn above_center(geometry: &Geometry, index: usize, dy: i32) -> Point {
        geometry.center(index) - Point::new(0, dy)
    }

    #[test]
    fn test_base_has_hollow_points() {
        let (style, geometry) = setup();
        let renderer = Renderer::new(&style, &geometry);
        let mut buffer = FrameBuffer::new(geometry.size, Rgb565::BLACK);
        let Ok(()) = renderer.paint_base(&mut buffer);

        for index in 0..geometry.points.len() {
            let center = geometry.center(index);
            assert_eq!(buffer.pixel(center), Some(style.background_color));
            assert_eq!(
                buffer.pixel(above_center(&geometry, index, 12)),
                Some(style.simple_color)
            );
        }
        assert_eq!(buffer.pixel(Point::zero()), Some(style.background_color));
    }

    #[test]
    fn test_base_labels_only_end_points() {
        let (style, geometry) = setup();
        let renderer = Renderer::new(&style, &geometry);
        let mut buffer = FrameBuffer::new(geometry.size, Rgb565::BLACK);
        let Ok(()) = renderer.paint_base(&mut buffer);

        let has_ink = |index: usize| {
            renderer
                .label_area(index)
                .points()
                .any(|p| buffer.pixel(p) == Some(style.simple_text_color))
        };
        assert!(has_ink(0));
        assert!(has_ink(4));
        assert!(!has_ink(2));
    }

    #[test]
    fn test_rated_static_fills_up_to_rating() {
        let (style, geometry) = setup();
        let renderer = Renderer::new(&style, &geometry);
        let mut buffer = FrameBuffer::new(geometry.size, Rgb565::BLACK);
        let Ok(()) = renderer.paint_base(&mut buffer);
        let Ok(()) = renderer.paint_rated_static(&mut buffer, 2);

        // Points before the rating are solid, the rating is a large disc
        assert_eq!(buffer.pixel(geometry.center(0)), Some(style.selected_color));
        assert_eq!(buffer.pixel(geometry.center(1)), Some(style.selected_color));
        assert_eq!(
            buffer.pixel(above_center(&geometry, 2, 28)),
            Some(style.selected_color)
        );
        // Points after it stay hollow
        assert_eq!(buffer.pixel(geometry.center(3)), Some(style.background_color));
        assert_eq!(
            buffer.pixel(above_center(&geometry, 3, 12)),
            Some(style.simple_color)
        );
        // The line between 0 and 1 is selected, between 3 and 4 simple
        let mid = |a: usize| {
            Point::new(
                ((geometry.points[a] + geometry.points[a + 1]) / 2.0) as i32,
                geometry.line_y,
            )
        };
        assert_eq!(buffer.pixel(mid(0)), Some(style.selected_color));
        assert_eq!(buffer.pixel(mid(3)), Some(style.simple_color));

        let selected_ink = renderer
            .label_area(2)
            .points()
            .any(|p| buffer.pixel(p) == Some(style.selected_color));
        assert!(selected_ink);
    }

    #[test]
    fn test_execute_resolves_paint_roles() {
        let (style, geometry) = setup();
        let renderer = Renderer::new(&style, &geometry);
        let mut buffer = FrameBuffer::new(geometry.size, Rgb565::BLACK);
        let Ok(()) = renderer.paint_base(&mut buffer);

        let ops = [
            PaintOp::ClearPoint { index: 1 },
            PaintOp::Disc {
                index: 1,
                radius: style.filled_point_radius(),
                paint: Paint::Selected,
            },
        ];
        let Ok(()) = renderer.execute(&mut buffer, &ops);
        assert_eq!(buffer.pixel(geometry.center(1)), Some(style.selected_color));

        let ops = [PaintOp::Disc {
            index: 1,
            radius: style.inner_radius,
            paint: Paint::Background,
        }];
        let Ok(()) = renderer.execute(&mut buffer, &ops);
        assert_eq!(buffer.pixel(geometry.center(1)), Some(style.background_color));
    }

    #[test]
    fn test_label_text_is_one_based() {
        assert_eq!(label_text(0).as_str(), "1");
        assert_eq!(label_text(9).as_str(), "10");
    }
}

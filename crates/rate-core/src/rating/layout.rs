//! Point layout and vertical geometry.

extern crate alloc;

use alloc::vec::Vec;
use core::ops::Index;
use embedded_graphics::prelude::*;
use thiserror_no_std::Error;

use crate::ui::Style;

/// Why a layout pass could not place the points.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum LayoutError {
    /// Fewer than two points cannot span a line
    #[error("At least 2 points are required (got {count})")]
    TooFewPoints {
        /// Requested point count
        count: usize,
    },

    /// The usable width cannot hold distinct points
    #[error("Width {width} cannot fit {count} points with edge offset {edge_offset}")]
    Infeasible {
        width: u32,
        count: usize,
        edge_offset: f32,
    },

    /// The height cannot fit the selected label above the line
    #[error("Height {height} is below the minimum of {min}")]
    TooShort {
        height: u32,
        min: u32,
    },
}

/// Ordered x-coordinates of the point centers.
///
/// Strictly increasing and evenly spaced; the first and last centers sit
/// `edge_offset` pixels from the left and right edges.
#[derive(Debug, Clone, PartialEq)]
pub struct PointSet {
    centers: Vec<f32>,
    step: f32,
}

impl PointSet {
    pub fn len(&self) -> usize {
        self.centers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.centers.is_empty()
    }

    /// Distance between neighbouring centers.
    pub fn step(&self) -> f32 {
        self.step
    }

    pub fn last_index(&self) -> usize {
        self.centers.len() - 1
    }

    /// Whether `index` is the first or last point.
    pub fn is_end(&self, index: usize) -> bool {
        index == 0 || index == self.last_index()
    }

    pub fn get(&self, index: usize) -> Option<f32> {
        self.centers.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        self.centers.iter().copied()
    }
}

impl Index<usize> for PointSet {
    type Output = f32;

    fn index(&self, index: usize) -> &f32 {
        &self.centers[index]
    }
}

/// Place `point_count` centers across `width`, `edge_offset` in from each side.
pub fn compute_layout(
    width: u32,
    point_count: usize,
    edge_offset: f32,
) -> Result<PointSet, LayoutError> {
    if point_count < 2 {
        return Err(LayoutError::TooFewPoints { count: point_count });
    }

    let usable = width as f32 - 2.0 * edge_offset;
    let step = usable / (point_count - 1) as f32;
    // Below one pixel neighbouring points would land on the same column
    if usable <= 0.0 || step < 1.0 {
        return Err(LayoutError::Infeasible {
            width,
            count: point_count,
            edge_offset,
        });
    }

    let centers = (0..point_count)
        .map(|i| edge_offset + i as f32 * step)
        .collect();

    Ok(PointSet { centers, step })
}

/// Everything the renderer needs to know about where things go.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    pub size: Size,
    pub points: PointSet,
    /// Row of the connecting line and point centers
    pub line_y: i32,
    /// Baseline of the selected label
    pub selected_text_y: i32,
    /// Baseline of unselected labels, shifted so both sizes share a center
    pub simple_text_y: i32,
}

impl Geometry {
    pub fn new(size: Size, point_count: usize, style: &Style) -> Result<Self, LayoutError> {
        let min = Self::min_height(style);
        if size.height < min {
            return Err(LayoutError::TooShort {
                height: size.height,
                min,
            });
        }

        let points = compute_layout(size.width, point_count, style.edge_offset())?;

        let radius = style.selected_radius as i32;
        let line_y = size.height as i32 - (radius << 1) + ((radius >> 1) >> 1);
        let selected_text_y = line_y - (radius << 1) + (radius >> 1);
        let simple_text_y = libm::roundf(selected_text_y as f32 - style.label_baseline_shift()) as i32;

        Ok(Self {
            size,
            points,
            line_y,
            selected_text_y,
            simple_text_y,
        })
    }

    /// Smallest height that keeps the selected label inside the widget.
    pub fn min_height(style: &Style) -> u32 {
        let radius = style.selected_radius;
        let line_from_bottom = (radius << 1) - ((radius >> 1) >> 1);
        let label_above_line = (radius << 1) - (radius >> 1);
        line_from_bottom
            + label_above_line
            + style.selected_font.baseline
            + style.radius_delta
    }

    /// Point center as a raster coordinate on the line row.
    pub fn center(&self, index: usize) -> Point {
        Point::new(libm::roundf(self.points[index]) as i32, self.line_y)
    }
}

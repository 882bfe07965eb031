//! Fill animation between two points
//!
//! An [`AnimationRun`] moves the fill boundary from a start point to a
//! target point. It never touches a raster itself: [`AnimationRun::start`]
//! and [`AnimationRun::advance`] return the [`PaintOp`]s for the caller to
//! execute, so the timing math is independent of whatever clock drives it.
//!
//! # Timing
//!
//! ```text
//! duration_ms = (ln(|target - start|) + 4) * 80
//! value       = t^2              (accelerating, t = elapsed / duration)
//! ```
//!
//! A one-step change takes 320ms; longer spans take logarithmically longer.
//!
//! # Incremental painting
//!
//! Each tick paints only the stretch of line between the previous and the
//! current boundary position. Once the boundary has traveled a selected
//! radius past a point, that point is flipped: filled when moving forward,
//! reset to a hollow ring when moving backward. Near the end the target is
//! committed as the selected point.

extern crate alloc;

use embassy_time::Duration;
use log::trace;

use super::layout::PointSet;
use super::render::{Paint, PaintOp, PaintOps};
use crate::ui::Style;

/// Tolerance for float progress comparisons
pub const PROGRESS_EPSILON: f32 = 0.01;

/// Added to `ln(span)` before scaling
const DURATION_BASE: f64 = 4.0;

/// Milliseconds per unit of the duration curve
const DURATION_SCALE_MS: f64 = 80.0;

/// Duration of a run covering `span` points.
///
/// A zero span never animates; it is treated like a single step.
pub fn duration_for_span(span: usize) -> Duration {
    let span = span.max(1) as f64;
    let ms = (libm::log(span) + DURATION_BASE) * DURATION_SCALE_MS;
    Duration::from_millis(ms as u64)
}

/// Accelerating interpolation of normalized time.
#[inline]
pub fn ease_in(t: f32) -> f32 {
    t * t
}

/// Travel direction of the fill boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    fn between(start: usize, target: usize) -> Self {
        if target >= start {
            Direction::Forward
        } else {
            Direction::Backward
        }
    }

    pub fn sign(self) -> f32 {
        match self {
            Direction::Forward => 1.0,
            Direction::Backward => -1.0,
        }
    }

    /// Forward fills with the selected color, backward restores the line.
    fn main_paint(self) -> Paint {
        match self {
            Direction::Forward => Paint::Selected,
            Direction::Backward => Paint::Simple,
        }
    }
}

/// Output of one animation tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub ops: PaintOps,
    pub finished: bool,
}

/// One timed transition of the fill boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationRun {
    start_index: usize,
    target_index: usize,
    direction: Direction,
    start_x: f32,
    way_length: f32,
    duration: Duration,
    elapsed: Duration,
    /// Eased value of the previous tick
    prev_value: f32,
    /// Points flipped so far, counted from the start point
    crossed: usize,
    committed: bool,
    finished: bool,
}

impl AnimationRun {
    /// Begin a run from `start` to `target`.
    ///
    /// Returns `None` when both are the same point. Otherwise the returned
    /// ops lift the selection off the start point: its large disc and label
    /// are erased and the line through it is restored in the run's paint.
    pub fn start(
        start: usize,
        target: usize,
        points: &PointSet,
        style: &Style,
    ) -> Option<(Self, PaintOps)> {
        if start == target {
            return None;
        }

        let direction = Direction::between(start, target);
        let start_x = points[start];
        let run = Self {
            start_index: start,
            target_index: target,
            direction,
            start_x,
            way_length: (points[target] - start_x).abs(),
            duration: duration_for_span(start.abs_diff(target)),
            elapsed: Duration::from_ticks(0),
            prev_value: 0.0,
            crossed: 0,
            committed: false,
            finished: false,
        };

        let dir = direction.sign();
        let clear_radius = style.selected_clear_radius() as f32;
        let behind = if points.is_end(start) {
            style.outer_radius as f32
        } else {
            clear_radius
        };

        let mut ops = alloc::vec![
            PaintOp::Disc {
                index: start,
                radius: style.selected_clear_radius(),
                paint: Paint::Background,
            },
            PaintOp::Segment {
                from_x: start_x + dir * clear_radius,
                to_x: start_x - dir * behind,
                paint: direction.main_paint(),
            },
            PaintOp::ClearLabel { index: start },
        ];
        if points.is_end(start) {
            ops.push(PaintOp::Label {
                index: start,
                selected: false,
            });
        }

        Some((run, ops))
    }

    /// Advance to `elapsed` time since the run started.
    ///
    /// Ticks after the run finished return no ops.
    pub fn advance(&mut self, elapsed: Duration, points: &PointSet, style: &Style) -> Frame {
        let mut ops = PaintOps::new();
        if self.finished {
            return Frame {
                ops,
                finished: true,
            };
        }

        let t = if self.duration.as_ticks() == 0 {
            1.0
        } else {
            (elapsed.as_ticks() as f32 / self.duration.as_ticks() as f32).min(1.0)
        };
        let value = ease_in(t);

        if !self.committed {
            let dir = self.direction.sign();
            let paint = self.direction.main_paint();

            let current_start = dir * (self.prev_value - PROGRESS_EPSILON) * self.way_length + self.start_x;
            ops.push(PaintOp::Segment {
                from_x: current_start,
                to_x: dir * value * self.way_length + self.start_x,
                paint,
            });

            let covered = (current_start - self.start_x).abs();
            while self.crossed < self.span() {
                let index = self.index_at(self.crossed);
                let distance = (points[index] - self.start_x).abs();
                if covered - distance < style.selected_radius as f32 {
                    break;
                }
                self.flip(index, style, &mut ops);
            }

            if 1.0 - value < PROGRESS_EPSILON {
                // Points the boundary skipped over in a long frame
                while self.crossed < self.span() {
                    let index = self.index_at(self.crossed);
                    self.flip(index, style, &mut ops);
                }

                let target = self.target_index;
                if points.is_end(target) {
                    ops.push(PaintOp::ClearLabel { index: target });
                }
                ops.push(PaintOp::Disc {
                    index: target,
                    radius: style.selected_radius,
                    paint: Paint::Selected,
                });
                ops.push(PaintOp::Label {
                    index: target,
                    selected: true,
                });
                self.committed = true;
            }
        }

        trace!(
            "Run {}->{} t={} value={} crossed={}",
            self.start_index, self.target_index, t, value, self.crossed
        );

        self.prev_value = value;
        self.elapsed = elapsed;
        self.finished = t >= 1.0;

        Frame {
            ops,
            finished: self.finished,
        }
    }

    /// Redraw a point the boundary has passed.
    ///
    /// Only the backward direction punches the hollow center back in; a
    /// forward flip leaves a solid dot.
    fn flip(&mut self, index: usize, style: &Style, ops: &mut PaintOps) {
        let paint = self.direction.main_paint();
        ops.push(PaintOp::ClearPoint { index });
        ops.push(PaintOp::Disc {
            index,
            radius: style.filled_point_radius(),
            paint,
        });
        if self.direction == Direction::Backward {
            ops.push(PaintOp::Disc {
                index,
                radius: style.inner_radius,
                paint: Paint::Background,
            });
        }
        self.crossed += 1;
    }

    fn span(&self) -> usize {
        self.start_index.abs_diff(self.target_index)
    }

    fn index_at(&self, steps: usize) -> usize {
        match self.direction {
            Direction::Forward => self.start_index + steps,
            Direction::Backward => self.start_index - steps,
        }
    }

    pub fn start_index(&self) -> usize {
        self.start_index
    }

    pub fn target_index(&self) -> usize {
        self.target_index
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Time since the run started, as of the last tick.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Number of points flipped so far.
    pub fn crossed(&self) -> usize {
        self.crossed
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RateConfig;
    use crate::rating::layout::compute_layout;
    use alloc::vec::Vec;

    fn setup() -> (PointSet, Style) {
        let style = Style::new(&RateConfig::default());
        // Centers at 32, 96, 160, 224, 288
        let points = compute_layout(320, 5, style.edge_offset()).unwrap();
        (points, style)
    }

    fn run_to_end(run: &mut AnimationRun, points: &PointSet, style: &Style) -> Vec<Frame> {
        let step = Duration::from_millis(16);
        let mut elapsed = Duration::from_ticks(0);
        let mut frames = Vec::new();
        loop {
            elapsed += step;
            let frame = run.advance(elapsed, points, style);
            let finished = frame.finished;
            frames.push(frame);
            if finished {
                break;
            }
        }
        frames
    }

    fn flipped(frames: &[Frame]) -> Vec<usize> {
        frames
            .iter()
            .flat_map(|f| f.ops.iter())
            .filter_map(|op| match op {
                PaintOp::ClearPoint { index } => Some(*index),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_duration_formula() {
        assert_eq!(duration_for_span(1).as_millis(), 320);
        assert_eq!(duration_for_span(2).as_millis(), 375);
        assert_eq!(duration_for_span(4).as_millis(), 430);
        assert_eq!(duration_for_span(10).as_millis(), 504);
    }

    #[test]
    fn test_duration_monotonic_and_sublinear() {
        for span in 1..50 {
            assert!(duration_for_span(span + 1) > duration_for_span(span));
        }
        let two = duration_for_span(2).as_millis();
        let four = duration_for_span(4).as_millis();
        assert!(four < 2 * two);
    }

    #[test]
    fn test_ease_in_accelerates() {
        assert_eq!(ease_in(0.0), 0.0);
        assert_eq!(ease_in(1.0), 1.0);
        assert!(ease_in(0.5) < 0.5);
    }

    #[test]
    fn test_same_point_does_not_start() {
        let (points, style) = setup();
        assert!(AnimationRun::start(2, 2, &points, &style).is_none());
    }

    #[test]
    fn test_start_ops_lift_selection() {
        let (points, style) = setup();
        let (run, ops) = AnimationRun::start(1, 4, &points, &style).unwrap();

        assert_eq!(run.direction(), Direction::Forward);
        assert_eq!(run.duration().as_millis(), 407);
        assert_eq!(
            ops[0],
            PaintOp::Disc {
                index: 1,
                radius: 33,
                paint: Paint::Background
            }
        );
        assert_eq!(
            ops[1],
            PaintOp::Segment {
                from_x: 96.0 + 33.0,
                to_x: 96.0 - 33.0,
                paint: Paint::Selected
            }
        );
        assert_eq!(ops[2], PaintOp::ClearLabel { index: 1 });
        assert_eq!(ops.len(), 3);
    }

    #[test]
    fn test_start_from_end_point_restores_label() {
        let (points, style) = setup();
        let (run, ops) = AnimationRun::start(4, 0, &points, &style).unwrap();

        assert_eq!(run.direction(), Direction::Backward);
        assert_eq!(
            ops[1],
            PaintOp::Segment {
                from_x: 288.0 - 33.0,
                to_x: 288.0 + 16.0,
                paint: Paint::Simple
            }
        );
        assert_eq!(
            ops[3],
            PaintOp::Label {
                index: 4,
                selected: false
            }
        );
    }

    #[test]
    fn test_forward_run_flips_each_point_once() {
        let (points, style) = setup();
        let (mut run, _) = AnimationRun::start(1, 4, &points, &style).unwrap();
        let frames = run_to_end(&mut run, &points, &style);

        assert_eq!(flipped(&frames), [1, 2, 3]);
        assert_eq!(run.crossed(), 3);
        assert!(run.is_finished());

        // Forward flips never punch the hollow center back in
        let hollowed = frames.iter().flat_map(|f| f.ops.iter()).any(|op| {
            matches!(
                op,
                PaintOp::Disc {
                    paint: Paint::Background,
                    ..
                }
            )
        });
        assert!(!hollowed);
    }

    #[test]
    fn test_backward_run_restores_hollow_points() {
        let (points, style) = setup();
        let (mut run, _) = AnimationRun::start(4, 1, &points, &style).unwrap();
        let frames = run_to_end(&mut run, &points, &style);

        assert_eq!(flipped(&frames), [4, 3, 2]);
        let hollowed = frames
            .iter()
            .flat_map(|f| f.ops.iter())
            .filter(|op| {
                matches!(
                    op,
                    PaintOp::Disc {
                        radius: 8,
                        paint: Paint::Background,
                        ..
                    }
                )
            })
            .count();
        assert_eq!(hollowed, 3);
    }

    #[test]
    fn test_target_committed_once_at_end() {
        let (points, style) = setup();
        let (mut run, _) = AnimationRun::start(0, 4, &points, &style).unwrap();
        let frames = run_to_end(&mut run, &points, &style);

        let commits: Vec<_> = frames
            .iter()
            .flat_map(|f| f.ops.iter())
            .filter(|op| {
                matches!(
                    op,
                    PaintOp::Label {
                        selected: true,
                        ..
                    }
                )
            })
            .collect();
        assert_eq!(
            commits,
            [&PaintOp::Label {
                index: 4,
                selected: true
            }]
        );

        // End targets clear their unselected label before the commit
        let label_clears: Vec<_> = frames
            .iter()
            .flat_map(|f| f.ops.iter())
            .filter(|op| matches!(op, PaintOp::ClearLabel { .. }))
            .collect();
        assert_eq!(label_clears, [&PaintOp::ClearLabel { index: 4 }]);
    }

    #[test]
    fn test_segments_are_incremental() {
        let (points, style) = setup();
        let (mut run, _) = AnimationRun::start(0, 2, &points, &style).unwrap();

        let first = run.advance(Duration::from_millis(100), &points, &style);
        let second = run.advance(Duration::from_millis(200), &points, &style);

        let segment = |frame: &Frame| match frame.ops[0] {
            PaintOp::Segment { from_x, to_x, .. } => (from_x, to_x),
            other => panic!("expected a segment, got {:?}", other),
        };
        let (_, first_end) = segment(&first);
        let (second_start, second_end) = segment(&second);

        // Each segment starts just behind where the previous one ended
        let overlap = PROGRESS_EPSILON * run.way_length;
        assert!((first_end - overlap - second_start).abs() < 1e-3);
        assert!(second_end > first_end);
    }

    #[test]
    fn test_single_long_frame_still_reaches_target() {
        let (points, style) = setup();
        let (mut run, _) = AnimationRun::start(0, 4, &points, &style).unwrap();
        let frame = run.advance(Duration::from_secs(5), &points, &style);

        assert!(frame.finished);
        assert_eq!(run.crossed(), 4);
        assert!(frame.ops.contains(&PaintOp::Disc {
            index: 4,
            radius: 32,
            paint: Paint::Selected
        }));

        let again = run.advance(Duration::from_secs(6), &points, &style);
        assert!(again.finished);
        assert!(again.ops.is_empty());
    }
}

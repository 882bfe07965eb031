//! The rate widget: a row of points the user taps to pick a rating.
//!
//! [`RateWidget`] wires the pieces together. Touch delivery only hit-tests
//! and queues ([`input`]); [`RateWidget::update`] is the single place the
//! rating and the raster change. It drains queued taps through the
//! [`selection`] state machine, executes the resulting effects and advances
//! the one active [`animation::AnimationRun`] by the frame delta.

pub mod animation;
pub mod input;
pub mod layout;
pub mod persist;
pub mod render;
pub mod selection;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Receiver;
use embassy_time::Duration;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use log::{debug, trace};
use thiserror_no_std::Error;

use crate::config::RateConfig;
use crate::framebuffer::FrameBuffer;
use crate::ui::{Style, TouchEvent, TouchPoint, TouchResult, Touchable};
use animation::AnimationRun;
use input::{RATED_CHANNEL_CAPACITY, RatedChannel, TapQueue};
use layout::{Geometry, LayoutError};
use persist::{PersistError, SavedState};
use render::Renderer;
use selection::{Effect, Rating, Selection};

/// Errors surfaced by the widget API.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum RateError {
    /// A rating index beyond the last point
    #[error("Rating {index} is out of range for {count} points")]
    OutOfRange { index: usize, count: usize },

    #[error("Saved state unusable: {0}")]
    Persist(PersistError),

    /// Taps are only accepted while attached
    #[error("Widget is detached")]
    Detached,
}

/// Interactive rating selector.
pub struct RateWidget {
    style: Style,
    point_count: usize,
    geometry: Option<Geometry>,
    buffer: Option<FrameBuffer>,
    selection: Selection,
    active: Option<AnimationRun>,
    attached: bool,
    taps: TapQueue,
    rated: RatedChannel,
}

impl RateWidget {
    pub fn new(config: &RateConfig) -> Self {
        Self::with_style(Style::new(config), config.point_count())
    }

    pub fn with_style(style: Style, point_count: usize) -> Self {
        Self {
            style,
            point_count,
            geometry: None,
            buffer: None,
            selection: Selection::new(),
            active: None,
            attached: false,
            taps: TapQueue::new(),
            rated: RatedChannel::new(),
        }
    }

    /// Lay the widget out for `size`.
    ///
    /// A new size rebuilds the raster from the current rating; a running
    /// animation is dropped. On error the widget has no geometry, ignores
    /// taps and draws nothing until a usable size arrives.
    pub fn set_size(&mut self, size: Size) -> Result<(), LayoutError> {
        if self.geometry.as_ref().is_some_and(|g| g.size == size) {
            return Ok(());
        }

        self.cancel_run();
        self.buffer = None;
        match Geometry::new(size, self.point_count, &self.style) {
            Ok(geometry) => {
                debug!(
                    "Rate widget laid out at {}x{}, step {}",
                    size.width,
                    size.height,
                    geometry.points.step()
                );
                self.geometry = Some(geometry);
                Ok(())
            }
            Err(e) => {
                self.geometry = None;
                Err(e)
            }
        }
    }

    /// Start accepting touches and ticks.
    pub fn attach(&mut self) {
        self.attached = true;
    }

    /// Stop accepting touches and ticks. Queued taps are dropped.
    pub fn detach(&mut self) {
        debug!("Rate widget detached, dropping {} queued taps", self.taps.len());
        self.attached = false;
        self.taps.clear();
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Hit-test a press and queue it for the next [`update`](Self::update).
    ///
    /// Returns whether the press landed on a point.
    pub fn handle_press(&self, point: TouchPoint) -> bool {
        if !self.attached {
            return false;
        }
        let Some(geometry) = &self.geometry else {
            return false;
        };
        self.taps
            .submit(point.to_point(), &geometry.points, self.style.hit_radius())
            .is_some()
    }

    /// Select `index` as if it had been tapped.
    pub fn select(&self, index: usize) -> Result<(), RateError> {
        if !self.attached {
            return Err(RateError::Detached);
        }
        self.check_index(index)?;
        self.taps.push(index);
        Ok(())
    }

    /// Advance by one host frame of `delta`.
    ///
    /// Applies queued taps first, then moves the active run forward. A run
    /// that finishes hands over to its catch-up run, if any, within the same
    /// tick.
    pub fn update(&mut self, delta: Duration) {
        if !self.attached {
            trace!("Tick on detached rate widget ignored");
            return;
        }
        self.ensure_buffer();

        let (Some(geometry), Some(buffer)) = (&self.geometry, &mut self.buffer) else {
            self.taps.clear();
            return;
        };

        let mut tick = Tick {
            style: &self.style,
            geometry,
            buffer,
            selection: &mut self.selection,
            active: &mut self.active,
            rated: &self.rated,
        };

        while let Some(index) = self.taps.try_next() {
            tick.tap(index);
        }
        tick.advance(delta);
    }

    /// Flush changed pixels to `display`, with the widget's top-left at `origin`.
    pub fn draw<D>(&mut self, display: &mut D, origin: Point) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        self.ensure_buffer();
        match &mut self.buffer {
            Some(buffer) => buffer.flush(display, origin),
            None => Ok(()),
        }
    }

    /// The raster holding the committed visual state.
    pub fn buffer(&mut self) -> Option<&FrameBuffer> {
        self.ensure_buffer();
        self.buffer.as_ref()
    }

    /// 1-based rating, `None` when unrated.
    pub fn current_rate(&self) -> Option<usize> {
        self.selection.rating().index().map(|index| index + 1)
    }

    pub fn is_rated(&self) -> bool {
        self.selection.rating() != Rating::Unrated
    }

    pub fn rating(&self) -> Rating {
        self.selection.rating()
    }

    pub fn point_count(&self) -> usize {
        self.point_count
    }

    pub fn geometry(&self) -> Option<&Geometry> {
        self.geometry.as_ref()
    }

    pub fn style(&self) -> &Style {
        &self.style
    }

    /// The animation currently running, if any.
    pub fn active_run(&self) -> Option<&AnimationRun> {
        self.active.as_ref()
    }

    /// Back to the unrated state, repainted from scratch on the next draw.
    pub fn init(&mut self) {
        debug!("Rate widget reset");
        self.selection.reset();
        self.active = None;
        self.buffer = None;
        self.taps.clear();
    }

    /// Jump to `index` without animating. No rating event is published.
    pub fn restore_rating(&mut self, index: usize) -> Result<(), RateError> {
        self.check_index(index)?;
        debug!("Rate widget restored to {}", index);
        self.selection.restore(index);
        self.active = None;
        self.buffer = None;
        Ok(())
    }

    pub fn save_state(&self) -> SavedState {
        SavedState::from_rating(self.selection.rating())
    }

    /// Apply a saved record, as produced by [`save_state`](Self::save_state).
    pub fn restore_state(&mut self, state: &SavedState) -> Result<(), RateError> {
        match state.index() {
            Some(index) => self.restore_rating(index),
            None => {
                self.init();
                Ok(())
            }
        }
    }

    /// Decode and apply an encoded [`SavedState`].
    pub fn restore_bytes(&mut self, bytes: &[u8]) -> Result<(), RateError> {
        let state = SavedState::decode(bytes).map_err(RateError::Persist)?;
        self.restore_state(&state)
    }

    /// Stream of 0-based ratings, published as soon as a tap changes it.
    pub fn rated_receiver(
        &self,
    ) -> Receiver<'_, CriticalSectionRawMutex, usize, RATED_CHANNEL_CAPACITY> {
        self.rated.receiver()
    }

    pub fn try_next_rated(&self) -> Option<usize> {
        self.rated.try_next()
    }

    fn check_index(&self, index: usize) -> Result<(), RateError> {
        if index < self.point_count {
            Ok(())
        } else {
            Err(RateError::OutOfRange {
                index,
                count: self.point_count,
            })
        }
    }

    /// Drop the active run. The raster keeps whatever it showed, so it is
    /// rebuilt from the live rating.
    fn cancel_run(&mut self) {
        if self.active.take().is_some() {
            debug!("Cancelled running animation");
            self.buffer = None;
        }
        if let Some(index) = self.selection.rating().index() {
            self.selection.restore(index);
        }
    }

    fn ensure_buffer(&mut self) {
        if self.buffer.is_some() {
            return;
        }
        let Some(geometry) = &self.geometry else {
            return;
        };

        let renderer = Renderer::new(&self.style, geometry);
        let mut buffer = FrameBuffer::new(geometry.size, self.style.background_color);
        let Ok(()) = renderer.paint_base(&mut buffer);
        if let Some(index) = self.selection.rating().index() {
            let Ok(()) = renderer.paint_rated_static(&mut buffer, index);
        }
        self.buffer = Some(buffer);
    }
}

impl Touchable for RateWidget {
    fn contains_point(&self, point: TouchPoint) -> bool {
        self.geometry.as_ref().is_some_and(|g| {
            u32::from(point.x) < g.size.width && u32::from(point.y) < g.size.height
        })
    }

    fn handle_touch(&mut self, event: TouchEvent) -> TouchResult {
        match event {
            TouchEvent::Press(point) if self.handle_press(point) => TouchResult::Handled,
            _ => TouchResult::NotHandled,
        }
    }
}

/// Mutable view of the widget for one `update` call.
struct Tick<'a> {
    style: &'a Style,
    geometry: &'a Geometry,
    buffer: &'a mut FrameBuffer,
    selection: &'a mut Selection,
    active: &'a mut Option<AnimationRun>,
    rated: &'a RatedChannel,
}

impl<'a> Tick<'a> {
    fn renderer(&self) -> Renderer<'a> {
        Renderer::new(self.style, self.geometry)
    }

    fn tap(&mut self, index: usize) {
        for effect in self.selection.on_tap(index) {
            self.apply(effect);
        }
    }

    fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::PaintStartPoint => {
                let Ok(()) = self.renderer().paint_start_point(&mut *self.buffer);
            }
            Effect::StartAnimation { from, to } => self.start(from, to),
            Effect::EmitRated(index) => self.rated.publish(index),
        }
    }

    fn start(&mut self, from: usize, to: usize) {
        match AnimationRun::start(from, to, &self.geometry.points, self.style) {
            Some((run, ops)) => {
                debug!("Animating {} -> {} over {}ms", from, to, run.duration().as_millis());
                let Ok(()) = self.renderer().execute(&mut *self.buffer, &ops);
                *self.active = Some(run);
            }
            None => self.complete(to),
        }
    }

    fn advance(&mut self, delta: Duration) {
        let Some(run) = self.active.as_mut() else {
            return;
        };

        let frame = run.advance(run.elapsed() + delta, &self.geometry.points, self.style);
        let target = run.target_index();
        let Ok(()) = self.renderer().execute(&mut *self.buffer, &frame.ops);

        if frame.finished {
            debug!("Animation to {} finished", target);
            *self.active = None;
            self.complete(target);
        }
    }

    fn complete(&mut self, target: usize) {
        if let Some(effect) = self.selection.on_animation_complete(target) {
            self.apply(effect);
        }
    }
}

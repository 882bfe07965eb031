//! Channels between input delivery and the UI-mutation context.
//!
//! Touch handlers only hit-test and enqueue; the raster and rating are
//! mutated later, when the widget's `update` drains the [`TapQueue`]. Rating
//! changes leave the widget through a [`RatedChannel`] that collaborators
//! drain either synchronously or from an async task.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Receiver, TrySendError};
use embassy_sync::signal::Signal;
use embedded_graphics::prelude::*;
use log::{trace, warn};

use super::hit_test::hit_test;
use super::layout::PointSet;

/// Taps buffered between two UI ticks
pub const TAP_QUEUE_CAPACITY: usize = 8;

/// Rating events buffered for collaborators
pub const RATED_CHANNEL_CAPACITY: usize = 8;

/// Hit-tested taps waiting for the next tick.
///
/// Once the channel is full, further taps coalesce into a single overflow
/// slot that always holds the newest one, so the last tap before a tick is
/// never lost.
pub struct TapQueue {
    channel: Channel<CriticalSectionRawMutex, usize, TAP_QUEUE_CAPACITY>,
    overflow: Signal<CriticalSectionRawMutex, usize>,
}

impl Default for TapQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl TapQueue {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
            overflow: Signal::new(),
        }
    }

    /// Hit-test `tap` and queue the index of the point it lands on.
    ///
    /// Returns the index, or `None` if the tap missed every point.
    pub fn submit(&self, tap: Point, points: &PointSet, hit_radius: f32) -> Option<usize> {
        let index = hit_test(tap, points, hit_radius)?;
        self.push(index);
        Some(index)
    }

    /// Queue an already resolved point index.
    pub fn push(&self, index: usize) {
        // Taps after an overflow stay behind it to keep their order
        if self.overflow.signaled() {
            self.overflow.signal(index);
            return;
        }
        match self.channel.try_send(index) {
            Ok(()) => trace!("Queued tap on point {}", index),
            Err(TrySendError::Full(_)) => {
                warn!("Tap queue full, coalescing taps into point {}", index);
                self.overflow.signal(index);
            }
        }
    }

    /// Next queued index, if any. The overflow slot comes last.
    pub fn try_next(&self) -> Option<usize> {
        self.channel
            .try_receive()
            .ok()
            .or_else(|| self.overflow.try_take())
    }

    /// Drop everything queued.
    pub fn clear(&self) {
        self.channel.clear();
        self.overflow.reset();
    }

    pub fn len(&self) -> usize {
        self.channel.len() + usize::from(self.overflow.signaled())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Outgoing stream of 0-based ratings.
pub struct RatedChannel {
    channel: Channel<CriticalSectionRawMutex, usize, RATED_CHANNEL_CAPACITY>,
}

impl Default for RatedChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl RatedChannel {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
        }
    }

    /// Publish without blocking. A full channel drops the event.
    pub fn publish(&self, index: usize) {
        if let Err(TrySendError::Full(dropped)) = self.channel.try_send(index) {
            warn!("Rated channel full, dropping event {}", dropped);
        }
    }

    pub fn receiver(
        &self,
    ) -> Receiver<'_, CriticalSectionRawMutex, usize, RATED_CHANNEL_CAPACITY> {
        self.channel.receiver()
    }

    pub fn try_next(&self) -> Option<usize> {
        self.channel.try_receive().ok()
    }
}

//! Rating state and the re-entrancy policy for taps.
//!
//! Transitions return declarative [`Effect`]s instead of painting or
//! publishing directly; the widget executes them. A tap that arrives while a
//! run is animating only moves the live rating. When that run completes,
//! [`Selection::on_animation_complete`] compares the live rating with the
//! run's target and asks for a catch-up run if they differ, so there is never
//! more than one run and no tap is lost.

use heapless::Vec;
use log::debug;

/// Current rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rating {
    #[default]
    Unrated,
    Rated(usize),
}

impl Rating {
    pub fn index(self) -> Option<usize> {
        match self {
            Rating::Unrated => None,
            Rating::Rated(index) => Some(index),
        }
    }
}

/// Work a transition asks the widget to do, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Paint point 0 as selected, without animation
    PaintStartPoint,
    /// Launch an animation run
    StartAnimation { from: usize, to: usize },
    /// Publish the new 0-based rating
    EmitRated(usize),
}

/// A tap produces at most one of each effect.
pub type Effects = Vec<Effect, 3>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    rating: Rating,
    animating: bool,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rating(&self) -> Rating {
        self.rating
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    /// Apply a tap on point `index`.
    ///
    /// The rating changes immediately; the visual catch-up follows.
    pub fn on_tap(&mut self, index: usize) -> Effects {
        let mut effects = Effects::new();

        let previous = match self.rating {
            Rating::Unrated => {
                effects.push(Effect::PaintStartPoint).ok();
                0
            }
            Rating::Rated(previous) => previous,
        };

        if !self.animating && previous != index {
            effects
                .push(Effect::StartAnimation {
                    from: previous,
                    to: index,
                })
                .ok();
            self.animating = true;
        }

        let changed = self.rating != Rating::Rated(index);
        self.rating = Rating::Rated(index);
        if changed {
            effects.push(Effect::EmitRated(index)).ok();
        }

        debug!("Tap on {} -> {:?}", index, effects);
        effects
    }

    /// Called when the run animating towards `target` finishes.
    pub fn on_animation_complete(&mut self, target: usize) -> Option<Effect> {
        self.animating = false;
        match self.rating {
            Rating::Rated(live) if live != target => {
                debug!("Catch-up run {} -> {}", target, live);
                self.animating = true;
                Some(Effect::StartAnimation {
                    from: target,
                    to: live,
                })
            }
            _ => None,
        }
    }

    /// Back to unrated. Any running animation is abandoned by the caller.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Jump straight to `index` without animation.
    pub fn restore(&mut self, index: usize) {
        self.rating = Rating::Rated(index);
        self.animating = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emitted(effects: &Effects) -> usize {
        effects
            .iter()
            .filter(|e| matches!(e, Effect::EmitRated(_)))
            .count()
    }

    #[test]
    fn test_first_tap_paints_start_then_animates() {
        let mut selection = Selection::new();
        let effects = selection.on_tap(2);

        assert_eq!(
            effects.as_slice(),
            [
                Effect::PaintStartPoint,
                Effect::StartAnimation { from: 0, to: 2 },
                Effect::EmitRated(2),
            ]
        );
        assert_eq!(selection.rating(), Rating::Rated(2));
        assert_eq!(emitted(&effects), 1);
    }

    #[test]
    fn test_first_tap_on_start_point_does_not_animate() {
        let mut selection = Selection::new();
        let effects = selection.on_tap(0);

        assert_eq!(
            effects.as_slice(),
            [Effect::PaintStartPoint, Effect::EmitRated(0)]
        );
        assert!(!selection.is_animating());
    }

    #[test]
    fn test_tap_while_idle_starts_one_run() {
        let mut selection = Selection::new();
        selection.restore(1);

        let effects = selection.on_tap(4);
        assert_eq!(
            effects.as_slice(),
            [
                Effect::StartAnimation { from: 1, to: 4 },
                Effect::EmitRated(4)
            ]
        );
        assert!(selection.is_animating());
    }

    #[test]
    fn test_tap_during_run_defers_to_catch_up() {
        let mut selection = Selection::new();
        selection.restore(1);
        selection.on_tap(4);

        // Mid-run: only the live rating moves
        let effects = selection.on_tap(0);
        assert_eq!(effects.as_slice(), [Effect::EmitRated(0)]);
        assert_eq!(selection.rating(), Rating::Rated(0));

        assert_eq!(
            selection.on_animation_complete(4),
            Some(Effect::StartAnimation { from: 4, to: 0 })
        );
        assert!(selection.is_animating());
        assert_eq!(selection.on_animation_complete(0), None);
        assert!(!selection.is_animating());
    }

    #[test]
    fn test_tap_back_to_target_needs_no_catch_up() {
        let mut selection = Selection::new();
        selection.restore(1);
        selection.on_tap(4);
        selection.on_tap(2);
        selection.on_tap(4);

        assert_eq!(selection.on_animation_complete(4), None);
    }

    #[test]
    fn test_repeated_tap_is_silent() {
        let mut selection = Selection::new();
        selection.restore(3);
        assert!(selection.on_tap(3).is_empty());
    }

    #[test]
    fn test_reset_returns_to_unrated() {
        let mut selection = Selection::new();
        selection.on_tap(3);
        selection.reset();

        assert_eq!(selection.rating(), Rating::Unrated);
        assert!(!selection.is_animating());
        assert_eq!(selection.rating().index(), None);
    }
}

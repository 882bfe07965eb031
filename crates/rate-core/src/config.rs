//! Widget configuration
//!
//! Hosts describe a widget with string attributes ([`RateAttributes`]), the
//! same shape a layout file or settings store would hand over. Resolution
//! into a [`RateConfig`] never fails: missing or malformed values fall back
//! to documented defaults and log a warning.

use embedded_graphics::pixelcolor::Rgb565;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::ui::colors::{DEFAULT_SELECTED, DEFAULT_SIMPLE, FALLBACK_BACKGROUND, parse_hex};

/// Highest rating value when none is configured (five points)
pub const DEFAULT_MAX_VALUE: u8 = 4;

/// Raw, unvalidated widget attributes.
///
/// Serializable so a host can keep them in a settings record; decoding
/// borrows the strings from the input bytes.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy)]
#[serde(bound(deserialize = "'de: 'a"))]
pub struct RateAttributes<'a> {
    pub selected_color: Option<&'a str>,
    pub simple_color: Option<&'a str>,
    pub background_color: Option<&'a str>,
    pub max_value: Option<&'a str>,
}

impl<'a> RateAttributes<'a> {
    /// Collect attributes from `(name, value)` pairs.
    ///
    /// Unknown names are ignored; a repeated name keeps the last value.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut attrs = Self::default();
        for (name, value) in pairs {
            match name {
                "selected_color" => attrs.selected_color = Some(value),
                "simple_color" => attrs.simple_color = Some(value),
                "background_color" => attrs.background_color = Some(value),
                "max_value" => attrs.max_value = Some(value),
                other => warn!("Ignoring unknown rate widget attribute {:?}", other),
            }
        }
        attrs
    }
}

/// Colors the host theme can contribute.
#[derive(Debug, Default, Clone, Copy)]
pub struct Theme {
    /// Accent color, used as the selected color when none is configured
    pub primary: Option<Rgb565>,
    /// Window background, third link of the background chain
    pub window_background: Option<Rgb565>,
}

/// Best-effort background lookup: own, then parent, then window.
#[derive(Debug, Default, Clone, Copy)]
pub struct BackgroundChain {
    pub own: Option<Rgb565>,
    pub parent: Option<Rgb565>,
    pub window: Option<Rgb565>,
}

impl BackgroundChain {
    /// First available color, or white.
    pub fn resolve(&self) -> Rgb565 {
        self.own
            .or(self.parent)
            .or(self.window)
            .unwrap_or(FALLBACK_BACKGROUND)
    }
}

/// Validated widget configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateConfig {
    pub selected_color: Rgb565,
    pub simple_color: Rgb565,
    pub background_color: Rgb565,
    /// Highest 0-based rating; the widget shows `max_value + 1` points
    pub max_value: u8,
}

impl Default for RateConfig {
    fn default() -> Self {
        Self {
            selected_color: DEFAULT_SELECTED,
            simple_color: DEFAULT_SIMPLE,
            background_color: FALLBACK_BACKGROUND,
            max_value: DEFAULT_MAX_VALUE,
        }
    }
}

impl RateConfig {
    /// Resolve attributes against the theme and background chain.
    ///
    /// If the theme has no window background the chain's own `window` link
    /// is used.
    pub fn resolve(attrs: &RateAttributes<'_>, theme: &Theme, background: &BackgroundChain) -> Self {
        let selected_color = color_attr("selected_color", attrs.selected_color)
            .or(theme.primary)
            .unwrap_or(DEFAULT_SELECTED);

        let simple_color = color_attr("simple_color", attrs.simple_color).unwrap_or(DEFAULT_SIMPLE);

        let background_color = color_attr("background_color", attrs.background_color)
            .unwrap_or_else(|| {
                BackgroundChain {
                    window: background.window.or(theme.window_background),
                    ..*background
                }
                .resolve()
            });

        let max_value = attrs
            .max_value
            .and_then(|raw| match raw.trim().parse::<u8>() {
                Ok(value) if value >= 1 => Some(value),
                _ => {
                    warn!("Invalid max_value {:?}, using {}", raw, DEFAULT_MAX_VALUE);
                    None
                }
            })
            .unwrap_or(DEFAULT_MAX_VALUE);

        Self {
            selected_color,
            simple_color,
            background_color,
            max_value,
        }
    }

    /// Number of selectable points.
    pub fn point_count(&self) -> usize {
        self.max_value as usize + 1
    }
}

fn color_attr(name: &str, raw: Option<&str>) -> Option<Rgb565> {
    let raw = raw?;
    let parsed = parse_hex(raw);
    if parsed.is_none() {
        warn!("Invalid {} {:?}, falling back to default", name, raw);
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::prelude::*;

    #[test]
    fn test_defaults_when_nothing_configured() {
        let config = RateConfig::resolve(
            &RateAttributes::default(),
            &Theme::default(),
            &BackgroundChain::default(),
        );
        assert_eq!(config, RateConfig::default());
        assert_eq!(config.point_count(), 5);
    }

    #[test]
    fn test_attributes_override_theme() {
        let attrs = RateAttributes::from_pairs([
            ("selected_color", "#FF0000"),
            ("simple_color", "#00FF00"),
            ("background_color", "#FF0000FF"),
            ("max_value", "10"),
        ]);
        let theme = Theme {
            primary: Some(Rgb565::YELLOW),
            window_background: Some(Rgb565::BLACK),
        };
        let config = RateConfig::resolve(&attrs, &theme, &BackgroundChain::default());

        assert_eq!(config.selected_color, Rgb565::RED);
        assert_eq!(config.simple_color, Rgb565::GREEN);
        assert_eq!(config.background_color, Rgb565::BLUE);
        assert_eq!(config.point_count(), 11);
    }

    #[test]
    fn test_malformed_values_fail_soft() {
        let attrs = RateAttributes::from_pairs([
            ("selected_color", "red"),
            ("simple_color", "#12"),
            ("max_value", "zero"),
        ]);
        let theme = Theme {
            primary: Some(Rgb565::CYAN),
            window_background: None,
        };
        let config = RateConfig::resolve(&attrs, &theme, &BackgroundChain::default());

        assert_eq!(config.selected_color, Rgb565::CYAN);
        assert_eq!(config.simple_color, DEFAULT_SIMPLE);
        assert_eq!(config.max_value, DEFAULT_MAX_VALUE);

        let zero = RateAttributes::from_pairs([("max_value", "0")]);
        let config = RateConfig::resolve(&zero, &theme, &BackgroundChain::default());
        assert_eq!(config.max_value, DEFAULT_MAX_VALUE);
    }

    #[test]
    fn test_attributes_decode_from_postcard() {
        let attrs = RateAttributes::from_pairs([("selected_color", "#3F51B5"), ("max_value", "7")]);
        let bytes = postcard::to_allocvec(&attrs).unwrap();

        let decoded: RateAttributes<'_> = postcard::from_bytes(&bytes).unwrap();
        assert_eq!(decoded.selected_color, Some("#3F51B5"));
        assert_eq!(decoded.simple_color, None);
        assert_eq!(decoded.max_value, Some("7"));

        let config = RateConfig::resolve(&decoded, &Theme::default(), &BackgroundChain::default());
        assert_eq!(config.point_count(), 8);
        assert_eq!(config.selected_color, parse_hex("#3F51B5").unwrap());
    }

    #[test]
    fn test_background_chain_order() {
        let chain = BackgroundChain {
            own: None,
            parent: Some(Rgb565::GREEN),
            window: Some(Rgb565::BLUE),
        };
        assert_eq!(chain.resolve(), Rgb565::GREEN);

        let chain = BackgroundChain {
            parent: None,
            ..chain
        };
        assert_eq!(chain.resolve(), Rgb565::BLUE);
        assert_eq!(BackgroundChain::default().resolve(), FALLBACK_BACKGROUND);
    }

    #[test]
    fn test_theme_window_background_feeds_chain() {
        let theme = Theme {
            primary: None,
            window_background: Some(Rgb565::MAGENTA),
        };
        let config = RateConfig::resolve(
            &RateAttributes::default(),
            &theme,
            &BackgroundChain::default(),
        );
        assert_eq!(config.background_color, Rgb565::MAGENTA);
    }
}

//! Desktop simulator for the rate widget.
//!
//! Renders a [`RateWidget`] in an SDL2 window via `embedded-graphics-simulator`
//! and forwards mouse clicks as touch events.
//!
//! Widget attributes can be passed as `name=value` arguments, for example
//! `rate-simulator max_value=9 selected_color=#3F51B5`.
//!
//! # Key bindings
//!
//! | Key | Action                              |
//! |-----|-------------------------------------|
//! | R   | Reset to unrated                    |
//! | S   | Save the current rating             |
//! | L   | Load the saved rating into a new widget |
//! | Q   | Quit                                |

use std::time::{Duration, Instant};

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics_simulator::{
    OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window, sdl2::Keycode,
};
use log::{error, info, warn};

use rate_core::ui::{TouchEvent, TouchPoint, TouchResult, Touchable};
use rate_core::{BackgroundChain, RateAttributes, RateConfig, RateWidget, Theme};

// ---------------------------------------------------------------------------
// Display constants
// ---------------------------------------------------------------------------

const DISPLAY_WIDTH_PX: u32 = 320;
const DISPLAY_HEIGHT_PX: u32 = 240;

/// Pixel scale factor for the simulator window.
const WINDOW_SCALE: u32 = 2;

/// Target frame duration (~60 FPS).
const FRAME_DURATION: Duration = Duration::from_millis(16);

/// Where the widget sits on the screen.
const WIDGET_ORIGIN: Point = Point::new(0, 40);
const WIDGET_SIZE: Size = Size::new(DISPLAY_WIDTH_PX, 160);

// ---------------------------------------------------------------------------
// Widget helpers
// ---------------------------------------------------------------------------

fn create_widget(config: &RateConfig) -> RateWidget {
    let mut widget = RateWidget::new(config);
    if let Err(e) = widget.set_size(WIDGET_SIZE) {
        warn!("Widget cannot be laid out: {}", e);
    }
    widget.attach();
    widget
}

/// Translate a screen position into widget-local touch coordinates.
fn to_widget_touch(point: Point) -> Option<TouchPoint> {
    let local = point - WIDGET_ORIGIN;
    let x = u16::try_from(local.x).ok()?;
    let y = u16::try_from(local.y).ok()?;
    Some(TouchPoint::new(x, y))
}

fn frame_delta(elapsed: Duration) -> embassy_time::Duration {
    embassy_time::Duration::from_micros(elapsed.as_micros() as u64)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    env_logger::init();
    info!("Starting rate widget simulator");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let attrs = RateAttributes::from_pairs(args.iter().filter_map(|arg| arg.split_once('=')));
    let config = RateConfig::resolve(&attrs, &Theme::default(), &BackgroundChain::default());
    info!("Config: {:?} ({} points)", config, config.point_count());
    info!("Keys: R=Reset  S=Save  L=Load  Q=Quit");

    let mut display = SimulatorDisplay::<Rgb565>::new(Size::new(DISPLAY_WIDTH_PX, DISPLAY_HEIGHT_PX));
    let output_settings = OutputSettingsBuilder::new().scale(WINDOW_SCALE).build();
    let mut window = Window::new("Rate Simulator", &output_settings);

    let mut widget = create_widget(&config);
    let mut saved: Option<Vec<u8>> = None;

    // The SDL window is lazily initialized on the first `update()` call.
    // We must call `update()` once before `events()` or it will panic.
    let _ = display.clear(config.background_color);
    let _ = widget.draw(&mut display, WIDGET_ORIGIN);
    window.update(&display);

    let mut last_frame = Instant::now();

    // -----------------------------------------------------------------------
    // Main loop
    // -----------------------------------------------------------------------
    'running: loop {
        let frame_start = Instant::now();

        // --- SDL events ---------------------------------------------------
        for event in window.events() {
            match event {
                SimulatorEvent::Quit => break 'running,

                SimulatorEvent::KeyDown { keycode, .. } => match keycode {
                    Keycode::Q | Keycode::Escape => break 'running,
                    Keycode::R => {
                        info!("Reset");
                        widget.init();
                    }
                    Keycode::S => match widget.save_state().encode() {
                        Ok(bytes) => {
                            info!("Saved rating {:?} ({} bytes)", widget.current_rate(), bytes.len());
                            saved = Some(bytes);
                        }
                        Err(e) => error!("Save failed: {}", e),
                    },
                    Keycode::L => match &saved {
                        Some(bytes) => {
                            widget = create_widget(&config);
                            match widget.restore_bytes(bytes) {
                                Ok(()) => info!("Loaded rating {:?}", widget.current_rate()),
                                Err(e) => error!("Load failed: {}", e),
                            }
                            let _ = display.clear(config.background_color);
                        }
                        None => info!("Nothing saved yet"),
                    },
                    _ => {}
                },

                SimulatorEvent::MouseButtonDown { point, .. } => {
                    let Some(touch) = to_widget_touch(point) else {
                        continue;
                    };
                    if widget.contains_point(touch)
                        && widget.handle_touch(TouchEvent::Press(touch)) == TouchResult::Handled
                    {
                        info!("Touch at ({}, {})", touch.x, touch.y);
                    }
                }

                _ => {}
            }
        }

        // --- Widget tick --------------------------------------------------
        let now = Instant::now();
        widget.update(frame_delta(now - last_frame));
        last_frame = now;

        while let Some(index) = widget.try_next_rated() {
            info!("Rated {} of {}", index + 1, widget.point_count());
        }

        // --- Render -------------------------------------------------------
        if let Err(e) = widget.draw(&mut display, WIDGET_ORIGIN) {
            error!("Draw error: {:?}", e);
        }
        window.update(&display);

        // --- Frame pacing -------------------------------------------------
        let elapsed = frame_start.elapsed();
        if elapsed < FRAME_DURATION {
            std::thread::sleep(FRAME_DURATION - elapsed);
        }
    }

    info!("Simulator exiting");
}

//! Hover-zoom overlay.
//!
//! The overlay is a single page-sized element whose background shows the
//! hovered page image. Zooming in enlarges the background and centres it on
//! the cursor; zooming out fits the whole image again.

use std::fmt;

use crate::config::DEFAULT_ZOOM_SCALE_PERCENT;
use crate::types::page::ImageDescriptor;

/// Id of the overlay element.
pub const ZOOM_OVERLAY_ID: &str = "zoomed-page";

/// Pointer position over a hovered page image, with the image's layout box.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerEvent {
    pub offset_x: f64,
    pub offset_y: f64,
    pub page_x: f64,
    pub page_y: f64,
    pub target: ImageBox,
}

/// Layout box of the hovered image.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ImageBox {
    pub offset_left: f64,
    pub offset_top: f64,
    pub offset_width: f64,
    pub offset_height: f64,
}

impl PointerEvent {
    /// Pointer position relative to the image. A zero offset falls back to
    /// page coordinates minus the image's offset.
    pub fn position_in_target(&self) -> (f64, f64) {
        let x = if self.offset_x != 0.0 {
            self.offset_x
        } else {
            self.page_x - self.target.offset_left
        };
        let y = if self.offset_y != 0.0 {
            self.offset_y
        } else {
            self.page_y - self.target.offset_top
        };
        (x, y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Display {
    #[default]
    None,
    InlineBlock,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackgroundSize {
    Percent(f64),
    Contain,
}

impl fmt::Display for BackgroundSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackgroundSize::Percent(p) => write!(f, "{}%", p),
            BackgroundSize::Contain => write!(f, "contain"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BackgroundPosition {
    pub x_percent: f64,
    pub y_percent: f64,
}

impl BackgroundPosition {
    pub const ORIGIN: BackgroundPosition = BackgroundPosition {
        x_percent: 0.0,
        y_percent: 0.0,
    };
}

impl fmt::Display for BackgroundPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}% {}%", self.x_percent, self.y_percent)
    }
}

/// Visible part of the background image, as fractions of its size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvWindow {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

/// Style state of the zoom overlay. Each call overwrites what the last one set.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoomOverlay {
    pub id: &'static str,
    pub display: Display,
    pub background_image: Option<String>,
    pub background_size: BackgroundSize,
    pub background_position: BackgroundPosition,
    scale_percent: f64,
}

impl Default for ZoomOverlay {
    fn default() -> Self {
        ZoomOverlay::new(DEFAULT_ZOOM_SCALE_PERCENT as f64)
    }
}

impl ZoomOverlay {
    pub fn new(scale_percent: f64) -> Self {
        ZoomOverlay {
            id: ZOOM_OVERLAY_ID,
            display: Display::None,
            background_image: None,
            background_size: BackgroundSize::Contain,
            background_position: BackgroundPosition::ORIGIN,
            scale_percent,
        }
    }

    /// Shows the overlay magnified around the pointer.
    pub fn zoom_in(&mut self, image: &ImageDescriptor, event: &PointerEvent) {
        self.background_image = Some(image.url.clone());
        self.background_size = BackgroundSize::Percent(self.scale_percent);
        self.display = Display::InlineBlock;

        let (pos_x, pos_y) = event.position_in_target();
        self.background_position = BackgroundPosition {
            x_percent: percent_of(pos_x, event.target.offset_width),
            y_percent: percent_of(pos_y, event.target.offset_height),
        };
    }

    /// Returns the overlay to an unzoomed full preview of the image.
    pub fn zoom_out(&mut self, image: &ImageDescriptor) {
        self.background_image = Some(image.url.clone());
        self.background_position = BackgroundPosition::ORIGIN;
        self.background_size = BackgroundSize::Contain;
    }

    /// CSS `background-image` value.
    pub fn background_image_css(&self) -> String {
        match &self.background_image {
            Some(url) => format!("url('{}')", url),
            None => "none".to_string(),
        }
    }

    /// Part of the image visible through the overlay for the current size and position.
    pub fn uv_window(&self) -> UvWindow {
        match self.background_size {
            BackgroundSize::Contain => UvWindow {
                min_x: 0.0,
                min_y: 0.0,
                max_x: 1.0,
                max_y: 1.0,
            },
            BackgroundSize::Percent(p) => {
                let scale = (p / 100.0).max(1.0);
                let span = 1.0 / scale;
                let px = (self.background_position.x_percent / 100.0).clamp(0.0, 1.0);
                let py = (self.background_position.y_percent / 100.0).clamp(0.0, 1.0);
                let min_x = (1.0 - span) * px;
                let min_y = (1.0 - span) * py;
                UvWindow {
                    min_x,
                    min_y,
                    max_x: min_x + span,
                    max_y: min_y + span,
                }
            }
        }
    }
}

fn percent_of(value: f64, extent: f64) -> f64 {
    if extent == 0.0 {
        0.0
    } else {
        value / extent * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image() -> ImageDescriptor {
        ImageDescriptor {
            url: "/media/pdoc-1/page-3.png".to_string(),
            width: 200.0,
            height: 400.0,
        }
    }

    fn event_at(x: f64, y: f64) -> PointerEvent {
        PointerEvent {
            offset_x: x,
            offset_y: y,
            page_x: 0.0,
            page_y: 0.0,
            target: ImageBox {
                offset_left: 0.0,
                offset_top: 0.0,
                offset_width: 200.0,
                offset_height: 400.0,
            },
        }
    }

    #[test]
    fn test_zoom_in_centres_on_cursor() {
        let mut overlay = ZoomOverlay::default();
        overlay.zoom_in(&image(), &event_at(100.0, 100.0));

        assert_eq!(overlay.background_position.to_string(), "50% 25%");
        assert_eq!(overlay.background_size.to_string(), "180%");
        assert_eq!(overlay.display, Display::InlineBlock);
        assert_eq!(overlay.background_image_css(), "url('/media/pdoc-1/page-3.png')");
    }

    #[test]
    fn test_zero_offset_falls_back_to_page_coordinates() {
        let mut event = event_at(0.0, 0.0);
        event.page_x = 150.0;
        event.page_y = 300.0;
        event.target.offset_left = 50.0;
        event.target.offset_top = 100.0;

        let mut overlay = ZoomOverlay::default();
        overlay.zoom_in(&image(), &event);
        assert_eq!(overlay.background_position.to_string(), "50% 50%");
    }

    #[test]
    fn test_zoom_out_resets_position_and_size() {
        let mut overlay = ZoomOverlay::default();
        overlay.zoom_in(&image(), &event_at(180.0, 390.0));
        overlay.zoom_out(&image());

        assert_eq!(overlay.background_position, BackgroundPosition::ORIGIN);
        assert_eq!(overlay.background_position.to_string(), "0% 0%");
        assert_eq!(overlay.background_size, BackgroundSize::Contain);
        assert_eq!(overlay.uv_window().max_x, 1.0);
    }

    #[test]
    fn test_uv_window_tracks_position() {
        let mut overlay = ZoomOverlay::new(200.0);
        overlay.zoom_in(&image(), &event_at(200.0, 0.0001));
        let uv = overlay.uv_window();
        assert!((uv.min_x - 0.5).abs() < 1e-9);
        assert!((uv.max_x - 1.0).abs() < 1e-9);
        assert!(uv.min_y < 1e-3);
    }

    #[test]
    fn test_zero_sized_target_does_not_divide_by_zero() {
        let mut event = event_at(10.0, 10.0);
        event.target.offset_width = 0.0;
        event.target.offset_height = 0.0;
        let mut overlay = ZoomOverlay::default();
        overlay.zoom_in(&image(), &event);
        assert_eq!(overlay.background_position, BackgroundPosition::ORIGIN);
    }
}

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct ViewportPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct ViewportRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// The deep-zoom image viewer showing the roll. Image coordinates are pixels;
/// viewport coordinates are the viewer's normalized space.
pub trait ViewportPort: Send {
    fn pan_to(&mut self, center: ViewportPoint);
    fn fit_bounds(&mut self, bounds: ViewportRect);
    fn fit_horizontally(&mut self);
    fn current_bounds(&self) -> ViewportRect;
    fn image_to_viewport_coordinates(&self, x: f64, y: f64) -> ViewportPoint;

    fn update_play_line(&mut self, at: ViewportPoint);
}

//! Display-scale management.
//!
//! Zoom is a view transform only. Nothing here touches element geometry,
//! and every screen/canvas conversion reads the scale at the moment of the
//! call.

use crate::{CanvasDescriptor, EditorConfig, Point};

/// Owns the current display scale.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportController {
    scale: f32,
    min: f32,
    max: f32,
    step: f32,
    padding: f32,
}

impl Default for ViewportController {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl ViewportController {
    /// Create a controller at scale 1.0 with limits from `config`.
    #[must_use]
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            scale: 1.0,
            min: config.zoom_min,
            max: config.zoom_max,
            step: config.zoom_step,
            padding: config.canvas_padding,
        }
    }

    /// Current display scale.
    #[must_use]
    pub const fn scale(&self) -> f32 {
        self.scale
    }

    /// Set the zoom, snapped to the zoom step and clamped to the limits.
    ///
    /// Non-finite factors are ignored. Returns the applied scale.
    pub fn set_zoom(&mut self, factor: f32) -> f32 {
        if !factor.is_finite() {
            tracing::warn!("Ignoring non-finite zoom factor {factor}");
            return self.scale;
        }
        let snapped = if self.step > 0.0 {
            (factor / self.step).round() * self.step
        } else {
            factor
        };
        self.scale = snapped.clamp(self.min, self.max);
        tracing::debug!("Zoom set to {}", self.zoom_label());
        self.scale
    }

    /// Zoom in by one step.
    pub fn zoom_in(&mut self) -> f32 {
        self.set_zoom(self.scale + self.step)
    }

    /// Zoom out by one step.
    pub fn zoom_out(&mut self) -> f32 {
        self.set_zoom(self.scale - self.step)
    }

    /// Largest scale, at most 1.0, at which the whole canvas fits inside
    /// the available area minus padding. Aspect ratio is preserved.
    ///
    /// The result is not snapped to the zoom step, but never drops below
    /// the minimum zoom.
    pub fn fit_to_view(&mut self, available_width: f32, available_height: f32, canvas: &CanvasDescriptor) -> f32 {
        if canvas.width == 0 || canvas.height == 0 {
            return self.scale;
        }
        #[allow(clippy::cast_precision_loss)]
        let (canvas_w, canvas_h) = (canvas.width as f32, canvas.height as f32);
        let fit_x = (available_width - self.padding) / canvas_w;
        let fit_y = (available_height - self.padding) / canvas_h;
        let fit = fit_x.min(fit_y).min(1.0);
        self.scale = if fit.is_finite() { fit.max(self.min) } else { 1.0 };
        tracing::debug!("Fit to view: {}", self.zoom_label());
        self.scale
    }

    /// Zoom label for the controls, e.g. `100%`.
    #[must_use]
    pub fn zoom_label(&self) -> String {
        format!("{:.0}%", (self.scale * 100.0).round())
    }

    /// Convert a display position to unscaled canvas units.
    #[must_use]
    pub fn to_canvas(&self, point: Point) -> Point {
        Point::new(point.x / self.scale, point.y / self.scale)
    }

    /// Convert a display-pixel delta to unscaled canvas units.
    #[must_use]
    pub fn delta_to_canvas(&self, dx: f32, dy: f32) -> (f32, f32) {
        (dx / self.scale, dy / self.scale)
    }

    /// Reset to scale 1.0 and return the previous scale.
    pub fn reset(&mut self) -> f32 {
        std::mem::replace(&mut self.scale, 1.0)
    }

    /// Restore a scale captured by [`reset`](Self::reset), bypassing
    /// snapping.
    pub fn restore(&mut self, scale: f32) {
        self.scale = scale;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn set_zoom_clamps_and_snaps() {
        let mut viewport = ViewportController::default();
        assert!(approx(viewport.set_zoom(5.0), 3.0));
        assert!(approx(viewport.set_zoom(0.01), 0.1));
        assert!(approx(viewport.set_zoom(1.26), 1.3));
        assert!(approx(viewport.set_zoom(f32::NAN), 1.3));
    }

    #[test]
    fn zoom_steps_and_label() {
        let mut viewport = ViewportController::default();
        viewport.zoom_in();
        assert_eq!(viewport.zoom_label(), "110%");
        viewport.zoom_out();
        viewport.zoom_out();
        assert_eq!(viewport.zoom_label(), "90%");
    }

    #[test]
    fn fit_to_view_never_upscales() {
        let mut viewport = ViewportController::default();
        let canvas = CanvasDescriptor::new(400, 300);
        assert!(approx(viewport.fit_to_view(2000.0, 2000.0, &canvas), 1.0));
    }

    #[test]
    fn fit_to_view_takes_smaller_ratio() {
        let mut viewport = ViewportController::default();
        let canvas = CanvasDescriptor::new(1000, 500);
        // (540 - 40) / 1000 = 0.5 vs (1040 - 40) / 500 = 2.0
        assert!(approx(viewport.fit_to_view(540.0, 1040.0, &canvas), 0.5));
    }

    #[test]
    fn conversions_use_current_scale() {
        let mut viewport = ViewportController::default();
        viewport.set_zoom(2.0);
        let p = viewport.to_canvas(Point::new(40.0, 20.0));
        assert!(approx(p.x, 20.0) && approx(p.y, 10.0));
        viewport.set_zoom(0.5);
        let (dx, _) = viewport.delta_to_canvas(10.0, 0.0);
        assert!(approx(dx, 20.0));
    }
}

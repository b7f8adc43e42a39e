use crate::model::PlaybackPosition;
use pianola_ports::types::Tick;

/// `pixel = first_hole_px + tick * pixels_per_tick`. Negative results clamp to 0.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PositionMapper {
    total_ticks: Tick,
    first_hole_px: f64,
    pixels_per_tick: f64,
}

impl PositionMapper {
    pub fn new(total_ticks: Tick, first_hole_px: f64, pixels_per_tick: f64) -> Self {
        let pixels_per_tick = if pixels_per_tick.is_finite() && pixels_per_tick > 0.0 {
            pixels_per_tick
        } else {
            1.0
        };
        let first_hole_px = if first_hole_px.is_finite() {
            first_hole_px.max(0.0)
        } else {
            0.0
        };
        Self {
            total_ticks: total_ticks.max(0),
            first_hole_px,
            pixels_per_tick,
        }
    }

    pub fn total_ticks(&self) -> Tick {
        self.total_ticks
    }

    pub fn first_hole_px(&self) -> f64 {
        self.first_hole_px
    }

    pub fn pixels_per_tick(&self) -> f64 {
        self.pixels_per_tick
    }

    pub fn tick_to_progress(&self, tick: Tick) -> f64 {
        if self.total_ticks == 0 {
            return 0.0;
        }
        (tick.max(0) as f64 / self.total_ticks as f64).clamp(0.0, 1.0)
    }

    pub fn progress_to_tick(&self, progress: f64) -> Tick {
        if progress.is_nan() {
            return 0;
        }
        (progress.clamp(0.0, 1.0) * self.total_ticks as f64).trunc() as Tick
    }

    pub fn tick_to_pixel(&self, tick: Tick) -> f64 {
        (self.first_hole_px + tick as f64 * self.pixels_per_tick).max(0.0)
    }

    pub fn pixel_to_tick(&self, pixel: f64) -> Tick {
        if pixel.is_nan() {
            return 0;
        }
        let tick = ((pixel - self.first_hole_px) / self.pixels_per_tick).round();
        (tick as Tick).max(0)
    }

    pub fn clamp_tick(&self, tick: Tick) -> Tick {
        if self.total_ticks == 0 {
            return tick.max(0);
        }
        tick.clamp(0, self.total_ticks)
    }

    pub fn position(&self, tick: Tick) -> PlaybackPosition {
        let tick = tick.max(0);
        PlaybackPosition {
            tick,
            progress: self.tick_to_progress(tick),
        }
    }
}

impl Default for PositionMapper {
    fn default() -> Self {
        Self::new(0, 0.0, 1.0)
    }
}

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use crate::foundation::error::{ReelError, ReelResult};

/// Rectangle of the complex plane rendered by one frame.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    /// Left edge (real axis).
    pub x_min: f64,
    /// Right edge (real axis).
    pub x_max: f64,
    /// Bottom edge (imaginary axis).
    pub y_min: f64,
    /// Top edge (imaginary axis).
    pub y_max: f64,
}

impl Viewport {
    /// Build a viewport, rejecting non-finite bounds and empty extents.
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> ReelResult<Self> {
        if ![x_min, x_max, y_min, y_max].iter().all(|v| v.is_finite()) {
            return Err(ReelError::validation("viewport bounds must be finite"));
        }
        if x_min >= x_max || y_min >= y_max {
            return Err(ReelError::validation(format!(
                "viewport extents must be positive (x {x_min}..{x_max}, y {y_min}..{y_max})"
            )));
        }
        Ok(Self {
            x_min,
            x_max,
            y_min,
            y_max,
        })
    }

    /// Horizontal extent.
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    /// Vertical extent.
    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    /// Midpoint of the rectangle.
    pub fn center(&self) -> (f64, f64) {
        (
            (self.x_min + self.x_max) / 2.0,
            (self.y_min + self.y_max) / 2.0,
        )
    }
}

/// Raster parameters shared by every frame of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RenderSettings {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Iteration cap passed to the renderer.
    pub max_iter: u32,
}

impl RenderSettings {
    /// Build validated settings.
    pub fn new(width: u32, height: u32, max_iter: u32) -> ReelResult<Self> {
        let settings = Self {
            width,
            height,
            max_iter,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Reject zero dimensions or a zero iteration count.
    pub fn validate(&self) -> ReelResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ReelError::validation("frame width/height must be non-zero"));
        }
        if self.max_iter == 0 {
            return Err(ReelError::validation("max_iter must be non-zero"));
        }
        Ok(())
    }
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            max_iter: 1000,
        }
    }
}

/// Parse a `WIDTHxHEIGHT` string such as `1920x1080`.
pub fn parse_resolution(text: &str) -> ReelResult<(u32, u32)> {
    let bad = || ReelError::validation(format!("resolution '{text}' must look like WIDTHxHEIGHT"));
    let (w, h) = text.trim().split_once(['x', 'X']).ok_or_else(bad)?;
    let w: u32 = w.trim().parse().map_err(|_| bad())?;
    let h: u32 = h.trim().parse().map_err(|_| bad())?;
    if w == 0 || h == 0 {
        return Err(ReelError::validation(format!(
            "resolution '{text}' must have non-zero width and height"
        )));
    }
    Ok((w, h))
}

/// Parse an `x,y` center string such as `-0.7269,0.1889`.
pub fn parse_center(text: &str) -> ReelResult<(f64, f64)> {
    let bad = || ReelError::validation(format!("center '{text}' must look like x,y"));
    let (x, y) = text.trim().split_once(',').ok_or_else(bad)?;
    let x: f64 = x.trim().parse().map_err(|_| bad())?;
    let y: f64 = y.trim().parse().map_err(|_| bad())?;
    if !x.is_finite() || !y.is_finite() {
        return Err(bad());
    }
    Ok((x, y))
}

/// Shared cancellation flag.
///
/// Clones observe the same flag. The process runner polls it while waiting on a child and the
/// driver checks it between frames.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// New, not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;

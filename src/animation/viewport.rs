use crate::animation::regions::Region;
use crate::foundation::core::Viewport;
use crate::foundation::error::{ReelError, ReelResult};

/// Width of the unmagnified view on the real axis.
pub const BASE_WIDTH: f64 = 3.0;
/// Height of the unmagnified view on the imaginary axis.
pub const BASE_HEIGHT: f64 = 2.4;

/// Magnification at `progress` along a geometric zoom from `start_zoom` to `end_zoom`.
///
/// `zoom(p) = start * (end / start)^p`. The endpoints are returned verbatim and interior values
/// are clamped into the closed interval between them, so rounding never overshoots.
pub fn zoom_at(progress: f64, start_zoom: f64, end_zoom: f64) -> f64 {
    if progress <= 0.0 {
        return start_zoom;
    }
    if progress >= 1.0 {
        return end_zoom;
    }
    let z = start_zoom * (end_zoom / start_zoom).powf(progress);
    z.clamp(start_zoom.min(end_zoom), start_zoom.max(end_zoom))
}

/// Viewport for one frame of a zoom animation.
pub fn viewport_for_zoom(
    base_width: f64,
    base_height: f64,
    center: (f64, f64),
    progress: f64,
    start_zoom: f64,
    end_zoom: f64,
) -> ReelResult<Viewport> {
    if !(0.0..=1.0).contains(&progress) {
        return Err(ReelError::validation(format!(
            "zoom progress must be within [0, 1], got {progress}"
        )));
    }
    check_zoom("start_zoom", start_zoom)?;
    check_zoom("end_zoom", end_zoom)?;
    centered(
        base_width,
        base_height,
        center,
        zoom_at(progress, start_zoom, end_zoom),
    )
}

/// Viewport for a catalog region: fixed magnification, no interpolation.
pub fn viewport_for_region(
    base_width: f64,
    base_height: f64,
    region: &Region,
) -> ReelResult<Viewport> {
    check_zoom("region zoom", region.zoom)?;
    centered(base_width, base_height, region.center, region.zoom)
}

fn check_zoom(name: &str, zoom: f64) -> ReelResult<()> {
    if !(zoom.is_finite() && zoom > 0.0) {
        return Err(ReelError::validation(format!(
            "{name} must be a finite value > 0, got {zoom}"
        )));
    }
    Ok(())
}

fn centered(
    base_width: f64,
    base_height: f64,
    center: (f64, f64),
    zoom: f64,
) -> ReelResult<Viewport> {
    let v = centered_unchecked(base_width, base_height, center, zoom);
    Viewport::new(v.x_min, v.x_max, v.y_min, v.y_max)
}

/// Same arithmetic as [`viewport_for_zoom`] without validation. Callers must have checked that
/// `zoom` lies between two magnifications that produced valid viewports.
pub(crate) fn centered_unchecked(
    base_width: f64,
    base_height: f64,
    center: (f64, f64),
    zoom: f64,
) -> Viewport {
    let half_w = base_width / zoom / 2.0;
    let half_h = base_height / zoom / 2.0;
    Viewport {
        x_min: center.0 - half_w,
        x_max: center.0 + half_w,
        y_min: center.1 - half_h,
        y_max: center.1 + half_h,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/viewport.rs"]
mod tests;

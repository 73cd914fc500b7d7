use crate::{
    composite_cpu::over, core::Rgba8Premul, model::GradientSpot, surface::Surface,
};

/// Per-frame draw counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Gradient fills issued this frame; equals the palette's spot count.
    pub spots_drawn: u32,
}

/// Clear the surface and paint every spot, first to last.
///
/// Drawing only reads spot state; whatever the driver most recently wrote is
/// what this frame shows.
pub fn draw_frame(surface: &mut Surface, spots: &[GradientSpot]) -> FrameStats {
    surface.clear();
    let mut stats = FrameStats::default();
    for spot in spots {
        fill_radial(surface, spot);
        stats.spots_drawn += 1;
    }
    stats
}

/// Rasterize one radial gradient onto the surface.
///
/// The gradient is centered at `(center.x * width, center.y * height)` with
/// outer radius `radius_factor * max(width, height)`. Alpha falls off
/// linearly from the spot color at the center to fully transparent at the
/// outer radius; RGB is held and premultiplied per pixel, then composited
/// source-over.
pub fn fill_radial(surface: &mut Surface, spot: &GradientSpot) {
    let w = surface.width();
    let h = surface.height();
    let cx = spot.center.x * f64::from(w);
    let cy = spot.center.y * f64::from(h);
    let radius = spot.radius_factor * f64::from(surface.viewport().max_side());
    if !radius.is_finite() || radius <= 0.0 {
        return;
    }

    let color = spot.color;
    let data = surface.data_mut();
    for y in 0..h {
        let dy = f64::from(y) + 0.5 - cy;
        let row = (y as usize) * (w as usize) * 4;
        for x in 0..w {
            let dx = f64::from(x) + 0.5 - cx;
            let dist = (dx * dx + dy * dy).sqrt();
            if dist >= radius {
                continue;
            }
            let falloff = 1.0 - dist / radius;
            let alpha = (f64::from(color.a) * falloff).round() as u8;
            if alpha == 0 {
                continue;
            }
            let src = Rgba8Premul::from_straight_rgba(color.r, color.g, color.b, alpha);

            let idx = row + (x as usize) * 4;
            let dst = [data[idx], data[idx + 1], data[idx + 2], data[idx + 3]];
            data[idx..idx + 4].copy_from_slice(&over(dst, src.to_array()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::{Point, Rgba8, Viewport},
        model::Palette,
    };

    fn spot(x: f64, y: f64, radius: f64, color: Rgba8) -> GradientSpot {
        GradientSpot::new(Point::new(x, y), radius, color)
    }

    #[test]
    fn draw_frame_counts_one_fill_per_spot() {
        let mut surface = Surface::new(Viewport::new(64, 48)).unwrap();
        let palette = Palette::dusk();
        let stats = draw_frame(&mut surface, &palette.spots);
        assert_eq!(stats.spots_drawn, 3);

        let stats = draw_frame(&mut surface, &[]);
        assert_eq!(stats.spots_drawn, 0);
    }

    #[test]
    fn gradient_peaks_at_center_and_fades_out() {
        let mut surface = Surface::new(Viewport::new(100, 100)).unwrap();
        let s = spot(0.5, 0.5, 0.2, Rgba8::new(255, 255, 255, 200));
        draw_frame(&mut surface, std::slice::from_ref(&s));

        let center = surface.pixel(50, 50).unwrap();
        let mid = surface.pixel(60, 50).unwrap();
        let outside = surface.pixel(90, 50).unwrap();
        assert!(center[3] > mid[3]);
        assert!(mid[3] > 0);
        assert_eq!(outside, [0, 0, 0, 0]);
    }

    #[test]
    fn draw_frame_clears_previous_content() {
        let mut surface = Surface::new(Viewport::new(32, 32)).unwrap();
        let s = spot(0.5, 0.5, 1.0, Rgba8::new(255, 255, 255, 255));
        draw_frame(&mut surface, std::slice::from_ref(&s));
        assert!(surface.data().iter().any(|&b| b != 0));

        draw_frame(&mut surface, &[]);
        assert!(surface.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn repeated_draws_do_not_accumulate() {
        let mut surface = Surface::new(Viewport::new(40, 40)).unwrap();
        let palette = Palette::dusk();
        draw_frame(&mut surface, &palette.spots);
        let first = surface.data().to_vec();
        draw_frame(&mut surface, &palette.spots);
        assert_eq!(surface.data(), first.as_slice());
    }

    #[test]
    fn radius_scales_by_longer_side() {
        // 100x10 surface: radius 0.3 spans 30px from the center column.
        let mut surface = Surface::new(Viewport::new(100, 10)).unwrap();
        let s = spot(0.5, 0.5, 0.3, Rgba8::new(255, 255, 255, 255));
        draw_frame(&mut surface, std::slice::from_ref(&s));

        assert!(surface.pixel(50, 5).unwrap()[3] > 0);
        assert!(surface.pixel(75, 5).unwrap()[3] > 0);
        assert_eq!(surface.pixel(85, 5).unwrap()[3], 0);
    }

    #[test]
    fn extreme_spot_values_never_panic() {
        let mut surface = Surface::new(Viewport::new(16, 16)).unwrap();
        for s in [
            spot(0.0, 0.0, 1.0, Rgba8::new(1, 2, 3, 255)),
            spot(1.0, 1.0, 0.001, Rgba8::new(1, 2, 3, 255)),
            spot(0.5, 0.5, 1.0, Rgba8::new(0, 0, 0, 0)),
        ] {
            draw_frame(&mut surface, std::slice::from_ref(&s));
        }
    }
}

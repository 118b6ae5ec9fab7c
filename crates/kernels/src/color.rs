//! Worker color assignment for visual output.

/// 24-bit RGB pixel.
pub type Rgb = [u8; 3];

/// Convert HSV (each component in [0, 1]) to RGB bytes.
pub fn hsv_to_rgb(hue: f32, saturation: f32, value: f32) -> Rgb {
    let sector = (hue * 6.0) as i32;
    let f = hue * 6.0 - sector as f32;
    let p = value * (1.0 - saturation);
    let q = value * (1.0 - f * saturation);
    let t = value * (1.0 - (1.0 - f) * saturation);

    let (r, g, b) = match sector {
        0 => (value, t, p),
        1 => (q, value, p),
        2 => (p, value, t),
        3 => (p, q, value),
        4 => (t, p, value),
        _ => (value, p, q),
    };
    [(r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8]
}

/// Distinct hue per worker, spread evenly around the color wheel.
pub fn worker_color(worker: usize, workers: usize) -> Rgb {
    let hue = worker as f32 / workers.max(1) as f32;
    hsv_to_rgb(hue, 0.8, 0.95)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_value_zero_saturation_is_white() {
        assert_eq!(hsv_to_rgb(0.3, 0.0, 1.0), [255, 255, 255]);
    }

    #[test]
    fn worker_colors_are_distinct() {
        let colors: Vec<Rgb> = (0..8).map(|w| worker_color(w, 8)).collect();
        for (i, a) in colors.iter().enumerate() {
            for b in &colors[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}

//! Time of day.
//!
//! The clock is an angle that wraps at 360 and advances one unit every
//! `60 * day_minutes` seconds. The sun height derived from it dims block
//! lighting in the shader and tints the sky.

/// Advances the clock by `dt` seconds.
pub fn advance(time: f32, dt: f32, day_minutes: f32) -> f32 {
    if day_minutes <= 0.0 {
        return time;
    }
    (time + dt / (60.0 * day_minutes)) % 360.0
}

/// Sun height in `[0, 1]`; 1 is noon.
pub fn sun_height(time: f32) -> f32 {
    ((-time).sin() + 1.0) / 2.0
}

const NIGHT_SKY: [f64; 3] = [0.02, 0.02, 0.08];
const DAY_SKY: [f64; 3] = [0.48, 0.68, 1.0];

/// Background color for a sun height.
pub fn sky_color(sun: f32) -> wgpu::Color {
    let t = sun.clamp(0.0, 1.0) as f64;
    let mix = |i: usize| NIGHT_SKY[i] + (DAY_SKY[i] - NIGHT_SKY[i]) * t;
    wgpu::Color {
        r: mix(0),
        g: mix(1),
        b: mix(2),
        a: 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_wraps_at_360() {
        let time = advance(359.9, 60.0 * 0.1 * 0.2, 0.1);

        assert!((time - 0.1).abs() < 1e-3, "{}", time);
    }

    #[test]
    fn one_day_length_advances_one_unit() {
        assert!((advance(0.0, 6.0, 0.1) - 1.0).abs() < 1e-6);
        assert_eq!(advance(5.0, 1.0, 0.0), 5.0);
    }

    #[test]
    fn sun_stays_in_unit_range() {
        for step in 0..3600 {
            let sun = sun_height(step as f32 * 0.1);
            assert!((0.0..=1.0).contains(&sun));
        }
        assert!((sun_height(0.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn sky_brightens_with_the_sun() {
        let night = sky_color(0.0);
        let day = sky_color(1.0);

        assert_eq!(night.b, NIGHT_SKY[2]);
        assert!(day.r > night.r && day.g > night.g && day.b > night.b);
    }
}

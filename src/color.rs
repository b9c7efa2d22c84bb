use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Curve colours
// ---------------------------------------------------------------------------

/// Hue of the first lap; blue reads well on both egui themes.
const FIRST_HUE: f32 = 210.0;

fn hsl_to_color32(hue: f32, saturation: f32, lightness: f32) -> Color32 {
    let rgb: Srgb = Hsl::new(hue, saturation, lightness).into_color();
    let [r, g, b] = [rgb.red, rgb.green, rgb.blue].map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
    Color32::from_rgb(r, g, b)
}

/// `n` hues spread evenly around the wheel, starting at `start_hue`.
pub fn spread_hues(n: usize, start_hue: f32) -> Vec<Color32> {
    (0..n)
        .map(|i| {
            let hue = (start_hue + i as f32 * 360.0 / n as f32) % 360.0;
            hsl_to_color32(hue, 0.75, 0.55)
        })
        .collect()
}

/// One colour per lap plus one for the time-difference curve.
#[derive(Debug, Clone, Copy)]
pub struct LapPalette {
    pub series: [Color32; 2],
    pub diff: Color32,
}

impl Default for LapPalette {
    fn default() -> Self {
        // Laps on opposite hues; the gap curve is a muted neutral.
        match *spread_hues(2, FIRST_HUE).as_slice() {
            [a, b] => Self {
                series: [a, b],
                diff: hsl_to_color32(FIRST_HUE + 90.0, 0.25, 0.6),
            },
            _ => Self {
                series: [Color32::LIGHT_BLUE, Color32::LIGHT_RED],
                diff: Color32::LIGHT_GRAY,
            },
        }
    }
}

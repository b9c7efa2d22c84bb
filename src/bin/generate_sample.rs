//! Writes synthetic lap-detail pages for trying out the viewer:
//!
//! * `sample_lap.html`         – both laps as polyline paths
//! * `sample_lap_markers.svg`  – a third lap as `x:y` markers in `serie-0`,
//!   to be opened as the comparison chart

use std::fmt::Write as _;

const WIDTH: f64 = 800.0;
const HEIGHT: f64 = 400.0;
const MAX_SPEED: f64 = 300.0;

/// Corners as (position, width, speed lost in km/h).
const CORNERS: &[(f64, f64, f64)] = &[
    (0.12, 0.015, 150.0),
    (0.31, 0.025, 90.0),
    (0.47, 0.010, 170.0),
    (0.66, 0.030, 70.0),
    (0.84, 0.020, 120.0),
];

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

fn speed_profile(x: f64, corners: &[(f64, f64, f64)], top: f64, noise: f64, rng: &mut SimpleRng) -> f64 {
    let lost: f64 = corners
        .iter()
        .map(|&(mu, sigma, amp)| gaussian(x, mu, sigma, amp))
        .sum();
    (top - lost + rng.gauss(0.0, noise)).max(40.0)
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn to_pixel(x: f64, v: f64) -> (f64, f64) {
    (x * WIDTH, HEIGHT - v / MAX_SPEED * HEIGHT)
}

/// Pixel points of one lap, with the occasional pen retrace.
fn lap_pixels(start: f64, top: f64, corner_shift: f64, rng: &mut SimpleRng) -> Vec<(f64, f64)> {
    let corners: Vec<(f64, f64, f64)> = CORNERS
        .iter()
        .map(|&(mu, sigma, amp)| (mu + corner_shift, sigma, amp))
        .collect();
    let n = 1500;
    let mut points = Vec::with_capacity(n + 16);
    for i in 0..=n {
        let x = start + (1.0 - start) * i as f64 / n as f64;
        let v = speed_profile(x, &corners, top, 1.5, rng);
        points.push(to_pixel(x, v));
        if i % 97 == 50 {
            // Backtrack artifact: the renderer steps back a little.
            let back = x - 0.0015;
            points.push(to_pixel(back, speed_profile(back, &corners, top, 1.5, rng)));
        }
    }
    points
}

fn axes(svg: &mut String) {
    svg.push_str("<g class=\"axis x\">\n<path d=\"M0 0 v400\" class=\"line\"/>\n");
    for i in 0..=10 {
        let x = i as f64 / 10.0;
        let (px, _) = to_pixel(x, 0.0);
        let _ = writeln!(
            svg,
            "<g class=\"guides\"><path d=\"M{px:.6} 0.000000 v{HEIGHT:.6}\" class=\"major line\"/>\
             <text x=\"{px:.6}\" y=\"415\" class=\"major\">{x:.1}</text><title>{x:.1}</title></g>"
        );
    }
    svg.push_str("</g>\n<g class=\"axis y\">\n");
    for v in (0..=300).step_by(50) {
        let (_, py) = to_pixel(0.0, v as f64);
        let _ = writeln!(
            svg,
            "<g class=\"guides\"><path d=\"M0.000000 {py:.6} h{WIDTH:.6}\" class=\"major guide line\"/>\
             <text x=\"-5\" y=\"{py:.6}\" class=\"major\">{v}</text><title>{v}</title></g>"
        );
    }
    svg.push_str("</g>\n");
}

fn path_series(svg: &mut String, index: usize, points: &[(f64, f64)]) {
    let mut d = String::new();
    for (i, (x, y)) in points.iter().enumerate() {
        let cmd = if i == 0 { "M" } else if i == 1 { "L" } else { "" };
        let _ = write!(d, "{}{cmd}{x:.6} {y:.6}", if i == 0 { "" } else { " " });
    }
    let _ = writeln!(
        svg,
        "<g class=\"series serie-{index} color-{index}\">\
         <path d=\"{d}\" class=\"line reactive nofill\"/></g>"
    );
}

fn marker_series(svg: &mut String, index: usize, points: &[(f64, f64)]) {
    let _ = writeln!(svg, "<g class=\"series serie-{index} color-{index}\"><g class=\"dots\">");
    for (x, y) in points {
        let _ = writeln!(
            svg,
            "<circle cx=\"{x:.6}\" cy=\"{y:.6}\" r=\"1\" class=\"dot reactive tooltip-trigger\"/>\
             <desc class=\"value\">{x:.6}:{y:.6}</desc>"
        );
    }
    svg.push_str("</g></g>\n");
}

fn chart(series: impl FnOnce(&mut String)) -> String {
    let mut svg = String::new();
    svg.push_str("<svg xmlns=\"http://www.w3.org/2000/svg\" class=\"pygal-chart\">\n");
    svg.push_str("<g class=\"graph line-graph vertical\">\n<g class=\"plot\" transform=\"translate(60, 20)\">\n");
    svg.push_str("<rect class=\"background\" width=\"800\" height=\"400\"/>\n");
    axes(&mut svg);
    series(&mut svg);
    svg.push_str("</g>\n<g class=\"titles\"><text class=\"title\">Speed</text></g>\n</g>\n</svg>\n");
    svg
}

fn main() -> std::io::Result<()> {
    let mut rng = SimpleRng::new(42);

    let lap0 = lap_pixels(0.0, 262.0, 0.0, &mut rng);
    let lap1 = lap_pixels(0.002, 258.0, 0.001, &mut rng);
    let lap2 = lap_pixels(0.001, 265.0, -0.001, &mut rng);

    let page = format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>Lap details</title>\n\
         <script>function show(a, b) {{ return a < b; }}</script></head>\n\
         <body><h1>Lap details</h1><br>\n{}</body></html>\n",
        chart(|svg| {
            path_series(svg, 0, &lap0);
            path_series(svg, 1, &lap1);
        })
    );
    std::fs::write("sample_lap.html", page)?;

    let thinned: Vec<(f64, f64)> = lap2.iter().copied().step_by(3).collect();
    std::fs::write(
        "sample_lap_markers.svg",
        chart(|svg| marker_series(svg, 0, &thinned)),
    )?;

    println!(
        "Wrote sample_lap.html ({} + {} points) and sample_lap_markers.svg ({} markers)",
        lap0.len(),
        lap1.len(),
        thinned.len()
    );
    Ok(())
}

// Colors with f32 channels in [0, 1], multi-stop gradients, and the
// precomputed 2D grid that turns a normalized velocity into a particle color.

use crate::error::{Result, SurferError};
use std::str::FromStr;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0.0, g: 0.0, b: 0.0 };

    pub fn new(r: f32, g: f32, b: f32) -> Rgb {
        Rgb { r, g, b }
    }

    // Built from an unsigned 32 holding 0x00RRGGBB
    pub fn from_u32(num: u32) -> Rgb {
        let r = ((num >> 16) & 0xff) as f32 / 255.0;
        let g = ((num >> 8) & 0xff) as f32 / 255.0;
        let b = (num & 0xff) as f32 / 255.0;

        Rgb { r, g, b }
    }

    /// Parses `#rgb` or `#rrggbb`, the leading `#` being optional.
    pub fn from_hex(hex: &str) -> Result<Rgb> {
        let digits = hex.trim().trim_start_matches('#');
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(SurferError::InvalidHexColor(hex.to_owned()));
        }
        let expanded = match digits.len() {
            3 => digits.chars().flat_map(|c| vec![c, c]).collect::<String>(),
            6 => digits.to_owned(),
            _ => return Err(SurferError::InvalidHexColor(hex.to_owned())),
        };
        let num = u32::from_str_radix(&expanded, 16)
            .map_err(|_| SurferError::InvalidHexColor(hex.to_owned()))?;
        Ok(Rgb::from_u32(num))
    }

    pub fn to_hex(&self) -> String {
        format!(
            "#{:02x}{:02x}{:02x}",
            channel_to_u8(self.r),
            channel_to_u8(self.g),
            channel_to_u8(self.b)
        )
    }

    pub fn to_rgba8(&self) -> [u8; 4] {
        [
            channel_to_u8(self.r),
            channel_to_u8(self.g),
            channel_to_u8(self.b),
            0xff,
        ]
    }

    pub fn lerp(a: &Rgb, b: &Rgb, t: f32) -> Rgb {
        let mut out = Rgb::BLACK;
        Rgb::lerp_into(a, b, t, &mut out);
        out
    }

    pub fn lerp_into(a: &Rgb, b: &Rgb, t: f32, out: &mut Rgb) {
        out.r = a.r + (b.r - a.r) * t;
        out.g = a.g + (b.g - a.g) * t;
        out.b = a.b + (b.b - a.b) * t;
    }

    // Plain per-channel average
    pub fn blend(&self, other: &Rgb) -> Rgb {
        Rgb {
            r: (self.r + other.r) * 0.5,
            g: (self.g + other.g) * 0.5,
            b: (self.b + other.b) * 0.5,
        }
    }
}

impl FromStr for Rgb {
    type Err = SurferError;

    fn from_str(s: &str) -> Result<Rgb> {
        Rgb::from_hex(s)
    }
}

fn channel_to_u8(v: f32) -> u8 {
    (v.max(0.0).min(1.0) * 255.0).round() as u8
}

pub fn parse_stops(stops: &[String], axis: &'static str) -> Result<Vec<Rgb>> {
    if stops.is_empty() {
        return Err(SurferError::EmptyGradient { axis });
    }
    stops.iter().map(|s| Rgb::from_hex(s)).collect()
}

/// Samples a gradient whose stops are evenly spaced over [0, 1].
///
/// `t <= 0` gives the first stop and `t >= 1` the last; a single stop is
/// returned for every `t`. `None` for an empty stop list.
pub fn sample_gradient(stops: &[Rgb], t: f64) -> Option<Rgb> {
    let last = stops.len().checked_sub(1)?;
    if t <= 0.0 || last == 0 {
        return Some(stops[0]);
    }
    if t >= 1.0 {
        return Some(stops[last]);
    }
    let scaled = t * last as f64;
    let idx = (scaled.floor() as usize).min(last - 1);
    let frac = (scaled - idx as f64) as f32;
    Some(Rgb::lerp(&stops[idx], &stops[idx + 1], frac))
}

fn axis_position(i: usize, detail: usize) -> f64 {
    if detail == 1 {
        0.5
    } else {
        i as f64 / (detail - 1) as f64
    }
}

/// A `detail_y` x `detail_x` table of colors, row `j` / column `i` being the
/// average of the Y gradient at `j` and the X gradient at `i`.
#[derive(Clone, Debug)]
pub struct ColorGrid {
    detail_x: usize,
    detail_y: usize,
    cells: Vec<Rgb>,
}

impl ColorGrid {
    pub const DEFAULT_DETAIL: usize = 30;

    pub fn new(
        gradient_x: &[Rgb],
        gradient_y: &[Rgb],
        detail_x: usize,
        detail_y: usize,
    ) -> Result<ColorGrid> {
        if gradient_x.is_empty() {
            return Err(SurferError::EmptyGradient { axis: "x" });
        }
        if gradient_y.is_empty() {
            return Err(SurferError::EmptyGradient { axis: "y" });
        }
        if detail_x == 0 || detail_y == 0 {
            return Err(SurferError::ZeroGridDimension { detail_x, detail_y });
        }

        let column_colors: Vec<Rgb> = (0..detail_x)
            .map(|i| sample_gradient(gradient_x, axis_position(i, detail_x)).unwrap_or_default())
            .collect();
        let row_colors: Vec<Rgb> = (0..detail_y)
            .map(|j| sample_gradient(gradient_y, axis_position(j, detail_y)).unwrap_or_default())
            .collect();

        let mut cells = Vec::with_capacity(detail_x * detail_y);
        for row_color in &row_colors {
            for column_color in &column_colors {
                cells.push(column_color.blend(row_color));
            }
        }

        Ok(ColorGrid {
            detail_x,
            detail_y,
            cells,
        })
    }

    pub fn from_hex_stops(
        x_stops: &[String],
        y_stops: &[String],
        detail_x: usize,
        detail_y: usize,
    ) -> Result<ColorGrid> {
        let gradient_x = parse_stops(x_stops, "x")?;
        let gradient_y = parse_stops(y_stops, "y")?;
        ColorGrid::new(&gradient_x, &gradient_y, detail_x, detail_y)
    }

    pub fn detail_x(&self) -> usize {
        self.detail_x
    }

    pub fn detail_y(&self) -> usize {
        self.detail_y
    }

    pub fn cell(&self, row: usize, col: usize) -> Rgb {
        self.cells[row * self.detail_x + col]
    }

    /// Bilinearly samples the grid at a normalized velocity and writes the
    /// result into `out`. Called once per particle per frame, so nothing here
    /// allocates. Inputs outside [-1, 1] are clamped; NaN reads as 0.
    pub fn lookup_into(&self, nx: f64, ny: f64, out: &mut Rgb) {
        let fx = grid_coordinate(nx, self.detail_x);
        let fy = grid_coordinate(ny, self.detail_y);

        let x0 = fx.floor() as usize;
        let x1 = (x0 + 1).min(self.detail_x - 1);
        let y0 = fy.floor() as usize;
        let y1 = (y0 + 1).min(self.detail_y - 1);
        let wx = (fx - x0 as f64) as f32;
        let wy = (fy - y0 as f64) as f32;

        let c00 = self.cell(y0, x0);
        let c10 = self.cell(y0, x1);
        let c01 = self.cell(y1, x0);
        let c11 = self.cell(y1, x1);

        let mut top = Rgb::BLACK;
        let mut bottom = Rgb::BLACK;
        Rgb::lerp_into(&c00, &c10, wx, &mut top);
        Rgb::lerp_into(&c01, &c11, wx, &mut bottom);
        Rgb::lerp_into(&top, &bottom, wy, out);
    }

    pub fn lookup(&self, nx: f64, ny: f64) -> Rgb {
        let mut out = Rgb::BLACK;
        self.lookup_into(nx, ny, &mut out);
        out
    }

    /// Rasterizes the grid as RGBA8, each cell a `cell_size` square.
    /// Returns `(width, height, pixels)`.
    pub fn to_rgba_pixels(&self, cell_size: usize) -> (usize, usize, Vec<u8>) {
        let cell_size = cell_size.max(1);
        let width = self.detail_x * cell_size;
        let height = self.detail_y * cell_size;
        let mut pixels = vec![0u8; width * height * 4];
        for y in 0..height {
            for x in 0..width {
                let rgba = self.cell(y / cell_size, x / cell_size).to_rgba8();
                let idx = (y * width + x) * 4;
                pixels[idx..idx + 4].copy_from_slice(&rgba);
            }
        }
        (width, height, pixels)
    }
}

fn grid_coordinate(n: f64, detail: usize) -> f64 {
    let n = if n.is_nan() { 0.0 } else { n.max(-1.0).min(1.0) };
    ((n + 1.0) / 2.0) * (detail - 1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPS: f32 = 1e-5;

    fn close(a: Rgb, b: Rgb) -> bool {
        (a.r - b.r).abs() < EPS && (a.g - b.g).abs() < EPS && (a.b - b.b).abs() < EPS
    }

    fn stops(hexes: &[&str]) -> Vec<Rgb> {
        hexes.iter().map(|h| Rgb::from_hex(h).unwrap()).collect()
    }

    fn default_grid() -> ColorGrid {
        ColorGrid::new(
            &stops(&["#0000ff", "#ff0000"]),
            &stops(&["#00ff00", "#ffff00"]),
            30,
            30,
        )
        .unwrap()
    }

    #[test]
    fn parses_short_and_long_hex() {
        assert_eq!(Rgb::from_hex("#fff").unwrap(), Rgb::new(1.0, 1.0, 1.0));
        assert_eq!(Rgb::from_hex("ff0000").unwrap(), Rgb::new(1.0, 0.0, 0.0));
        let c: Rgb = "#00ff00".parse().unwrap();
        assert_eq!(c, Rgb::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn rejects_malformed_hex() {
        for bad in &["", "#ff", "#ggg", "#12345", "#+ffff0", "#1234567"] {
            assert!(Rgb::from_hex(bad).is_err(), "{} should not parse", bad);
        }
    }

    #[test]
    fn hex_formatting_round_trips() {
        assert_eq!(Rgb::from_hex("#1a2b3c").unwrap().to_hex(), "#1a2b3c");
        assert_eq!(Rgb::new(2.0, -1.0, 0.5).to_hex(), "#ff0080");
    }

    #[test]
    fn gradient_endpoints_match_stops() {
        let g = stops(&["#000000", "#808080", "#ffffff"]);
        assert_eq!(sample_gradient(&g, 0.0), Some(g[0]));
        assert_eq!(sample_gradient(&g, 1.0), Some(g[2]));
        assert_eq!(sample_gradient(&g, -3.0), Some(g[0]));
        assert_eq!(sample_gradient(&g, 7.0), Some(g[2]));
    }

    #[test]
    fn gradient_interpolates_between_stops() {
        let g = stops(&["#000000", "#ffffff"]);
        let mid = sample_gradient(&g, 0.5).unwrap();
        assert!(close(mid, Rgb::new(0.5, 0.5, 0.5)));

        let three = stops(&["#ff0000", "#00ff00", "#0000ff"]);
        assert!(close(sample_gradient(&three, 0.5).unwrap(), Rgb::new(0.0, 1.0, 0.0)));
        assert!(close(sample_gradient(&three, 0.75).unwrap(), Rgb::new(0.0, 0.5, 0.5)));
    }

    #[test]
    fn empty_gradient_has_no_sample() {
        assert_eq!(sample_gradient(&[], 0.5), None);
        assert_eq!(sample_gradient(&[], 0.0), None);
    }

    #[test]
    fn single_stop_gradient_is_constant() {
        let g = stops(&["#336699"]);
        for &t in &[-1.0, 0.0, 0.3, 0.99, 1.0, 2.0] {
            assert_eq!(sample_gradient(&g, t), Some(g[0]));
        }
    }

    #[test]
    fn grid_cells_average_both_axes() {
        let grid = default_grid();
        // blue blended with green
        assert!(close(grid.cell(0, 0), Rgb::new(0.0, 0.5, 0.5)));
        // red blended with yellow
        assert!(close(grid.cell(29, 29), Rgb::new(1.0, 0.5, 0.0)));
    }

    #[test]
    fn lookup_corners_match_grid_corners() {
        let grid = default_grid();
        assert!(close(grid.lookup(-1.0, -1.0), grid.cell(0, 0)));
        assert!(close(grid.lookup(1.0, 1.0), grid.cell(29, 29)));
        assert!(close(grid.lookup(-1.0, 1.0), grid.cell(29, 0)));
    }

    #[test]
    fn lookup_clamps_out_of_range_input() {
        let grid = default_grid();
        assert!(close(grid.lookup(-5.0, -1.5), grid.cell(0, 0)));
        assert!(close(grid.lookup(1.0001, 9.0), grid.cell(29, 29)));
        assert!(close(grid.lookup(f64::NAN, f64::NAN), grid.lookup(0.0, 0.0)));
    }

    #[test]
    fn single_cell_grid_uses_gradient_midpoint() {
        let grid = ColorGrid::new(
            &stops(&["#000000", "#ffffff"]),
            &stops(&["#000000", "#ffffff"]),
            1,
            1,
        )
        .unwrap();
        assert!(close(grid.cell(0, 0), Rgb::new(0.5, 0.5, 0.5)));
        assert!(close(grid.lookup(0.7, -0.2), grid.cell(0, 0)));
    }

    #[test]
    fn construction_rejects_degenerate_input() {
        let g = stops(&["#000000", "#ffffff"]);
        assert!(matches!(
            ColorGrid::new(&[], &g, 4, 4),
            Err(SurferError::EmptyGradient { axis: "x" })
        ));
        assert!(matches!(
            ColorGrid::new(&g, &[], 4, 4),
            Err(SurferError::EmptyGradient { axis: "y" })
        ));
        assert!(matches!(
            ColorGrid::new(&g, &g, 0, 4),
            Err(SurferError::ZeroGridDimension { .. })
        ));
        assert!(ColorGrid::from_hex_stops(&["#zzz".to_owned()], &["#fff".to_owned()], 2, 2).is_err());
    }

    #[test]
    fn rasterizes_cells_into_squares() {
        let grid = ColorGrid::new(
            &stops(&["#000000", "#ffffff"]),
            &stops(&["#000000", "#000000"]),
            2,
            1,
        )
        .unwrap();
        let (width, height, pixels) = grid.to_rgba_pixels(3);
        assert_eq!((width, height), (6, 3));
        assert_eq!(pixels.len(), 6 * 3 * 4);
        assert_eq!(&pixels[0..4], &[0, 0, 0, 255]);
        let right = (2 * 6 + 5) * 4;
        assert_eq!(&pixels[right..right + 4], &[128, 128, 128, 255]);
    }

    proptest! {
        #[test]
        fn lookup_stays_in_unit_range(nx in -1.0f64..=1.0, ny in -1.0f64..=1.0) {
            let grid = ColorGrid::new(
                &stops(&["#0000ff", "#ff0000", "#ffffff"]),
                &stops(&["#00ff00", "#ffff00"]),
                17,
                5,
            ).unwrap();
            let mut out = Rgb::BLACK;
            grid.lookup_into(nx, ny, &mut out);
            for &c in &[out.r, out.g, out.b] {
                prop_assert!(c >= -1e-6 && c <= 1.0 + 1e-6, "channel {} out of range", c);
            }
        }
    }
}

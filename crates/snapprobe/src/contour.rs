//! Binarization and external contour extraction.
//!
//! Foreground pixels are 8-connected and background pixels 4-connected, with
//! an implicit background frame around the image. Only outermost borders are
//! traced; components nested inside holes of other components are covered by
//! their parent's region and not reported separately.

use image::{GrayImage, Luma};
use serde::{Deserialize, Serialize};

const FOREGROUND: u8 = 255;

// Single-precision epsilon used as the class-weight cutoff
const CLASS_EPSILON: f64 = f32::EPSILON as f64;

// Chain-code directions, counter-clockwise starting east (y grows downwards)
const DIRECTIONS: [(i64, i64); 8] = [
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];
const WEST: usize = 4;

/// A pixel coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    /// Column
    pub x: u32,
    /// Row
    pub y: u32,
}

impl Point {
    /// Create a new point
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: u32,
    /// Top edge
    pub y: u32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

/// Closed border polyline of one connected region, collinear points removed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contour {
    points: Vec<Point>,
}

impl Contour {
    /// Polyline vertices in traversal order
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Smallest rectangle containing every vertex
    #[must_use]
    pub fn bounding_box(&self) -> Rect {
        let min_x = self.points.iter().map(|p| p.x).min().unwrap_or(0);
        let min_y = self.points.iter().map(|p| p.y).min().unwrap_or(0);
        let max_x = self.points.iter().map(|p| p.x).max().unwrap_or(0);
        let max_y = self.points.iter().map(|p| p.y).max().unwrap_or(0);
        Rect {
            x: min_x,
            y: min_y,
            width: max_x - min_x + 1,
            height: max_y - min_y + 1,
        }
    }
}

/// External contours of a binary image together with their filled area
#[derive(Debug, Clone)]
pub struct Regions {
    /// One contour per outermost connected region
    pub contours: Vec<Contour>,
    /// Pixels enclosed by any external contour, border included (255), else 0
    pub fill: GrayImage,
}

impl Regions {
    /// Number of filled pixels
    #[must_use]
    pub fn filled_pixels(&self) -> usize {
        self.fill.as_raw().iter().filter(|&&v| v != 0).count()
    }
}

/// Otsu's threshold: the intensity maximizing between-class variance
#[must_use]
pub fn otsu_threshold(image: &GrayImage) -> u8 {
    let raw = image.as_raw();
    if raw.is_empty() {
        return 0;
    }

    let mut histogram = [0u64; 256];
    for &value in raw {
        histogram[usize::from(value)] += 1;
    }

    let scale = 1.0 / raw.len() as f64;
    let mu = histogram
        .iter()
        .enumerate()
        .map(|(i, &count)| i as f64 * count as f64)
        .sum::<f64>()
        * scale;

    let (mut mu1, mut q1) = (0.0f64, 0.0f64);
    let (mut max_sigma, mut max_val) = (0.0f64, 0u8);
    for (i, &count) in histogram.iter().enumerate() {
        let p_i = count as f64 * scale;
        mu1 *= q1;
        q1 += p_i;
        let q2 = 1.0 - q1;
        if q1.min(q2) < CLASS_EPSILON || q1.max(q2) > 1.0 - CLASS_EPSILON {
            continue;
        }
        mu1 = (mu1 + i as f64 * p_i) / q1;
        let mu2 = (mu - q1 * mu1) / q2;
        let sigma = q1 * q2 * (mu1 - mu2) * (mu1 - mu2);
        if sigma > max_sigma {
            max_sigma = sigma;
            max_val = i as u8;
        }
    }
    max_val
}

/// Inverted binary threshold: pixels at or below `threshold` become foreground
#[must_use]
pub fn threshold_binary_inv(image: &GrayImage, threshold: u8) -> GrayImage {
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        *pixel = Luma([if pixel.0[0] > threshold { 0 } else { FOREGROUND }]);
    }
    out
}

/// Trace the outer border of every outermost foreground region
#[must_use]
pub fn external_regions(binary: &GrayImage) -> Regions {
    let grid = Grid::new(binary);
    let outside = grid.outer_background();

    let mut visited = vec![false; grid.len()];
    let mut contours = Vec::new();
    for y in 0..grid.height {
        for x in 0..grid.width {
            let i = grid.index(x, y);
            if !grid.fg[i] || visited[i] {
                continue;
            }
            if x == 0 || outside[i - 1] {
                contours.push(simplify(&grid.trace_border(x, y)));
            }
            grid.mark_component(x, y, &mut visited);
        }
    }

    let fill_raw = outside
        .iter()
        .map(|&out| if out { 0 } else { FOREGROUND })
        .collect();
    let fill = GrayImage::from_raw(binary.width(), binary.height(), fill_raw)
        .unwrap_or_else(|| GrayImage::new(binary.width(), binary.height()));

    Regions { contours, fill }
}

struct Grid {
    width: usize,
    height: usize,
    fg: Vec<bool>,
}

impl Grid {
    fn new(binary: &GrayImage) -> Self {
        Self {
            width: binary.width() as usize,
            height: binary.height() as usize,
            fg: binary.as_raw().iter().map(|&v| v != 0).collect(),
        }
    }

    const fn len(&self) -> usize {
        self.width * self.height
    }

    const fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    fn is_fg(&self, x: i64, y: i64) -> bool {
        x >= 0
            && y >= 0
            && (x as usize) < self.width
            && (y as usize) < self.height
            && self.fg[self.index(x as usize, y as usize)]
    }

    /// Background pixels 4-connected to the frame
    fn outer_background(&self) -> Vec<bool> {
        let mut outside = vec![false; self.len()];
        let mut stack = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let on_edge = x == 0 || y == 0 || x + 1 == self.width || y + 1 == self.height;
                if on_edge && !self.fg[self.index(x, y)] {
                    outside[self.index(x, y)] = true;
                    stack.push((x, y));
                }
            }
        }
        while let Some((x, y)) = stack.pop() {
            let neighbours = [
                (x.wrapping_sub(1), y),
                (x + 1, y),
                (x, y.wrapping_sub(1)),
                (x, y + 1),
            ];
            for (nx, ny) in neighbours {
                if nx >= self.width || ny >= self.height {
                    continue;
                }
                let i = self.index(nx, ny);
                if !self.fg[i] && !outside[i] {
                    outside[i] = true;
                    stack.push((nx, ny));
                }
            }
        }
        outside
    }

    /// Flag every pixel 8-connected to `(x, y)`
    fn mark_component(&self, x: usize, y: usize, visited: &mut [bool]) {
        let mut stack = vec![(x, y)];
        visited[self.index(x, y)] = true;
        while let Some((cx, cy)) = stack.pop() {
            for (dx, dy) in DIRECTIONS {
                let (nx, ny) = (cx as i64 + dx, cy as i64 + dy);
                if !self.is_fg(nx, ny) {
                    continue;
                }
                let i = self.index(nx as usize, ny as usize);
                if !visited[i] {
                    visited[i] = true;
                    stack.push((nx as usize, ny as usize));
                }
            }
        }
    }

    /// Suzuki-Abe outer border following from a pixel whose west neighbour is background
    fn trace_border(&self, x: usize, y: usize) -> Vec<Point> {
        let start = (x as i64, y as i64);
        let step = |p: (i64, i64), d: usize| (p.0 + DIRECTIONS[d].0, p.1 + DIRECTIONS[d].1);

        // Clockwise from west for the first neighbour
        let first = (0..8)
            .map(|k| (WEST + 8 - k) % 8)
            .map(|d| step(start, d))
            .find(|&(nx, ny)| self.is_fg(nx, ny));
        let Some(second) = first else {
            return vec![to_point(start)];
        };

        let mut points = Vec::new();
        let (mut prev, mut cur) = (second, start);
        loop {
            let back = direction(cur, prev);
            let next = (1..=8)
                .map(|k| step(cur, (back + k) % 8))
                .find(|&(nx, ny)| self.is_fg(nx, ny));
            points.push(to_point(cur));
            let Some(next) = next else { break };
            if next == start && cur == second {
                break;
            }
            prev = cur;
            cur = next;
        }
        points
    }
}

fn direction(from: (i64, i64), to: (i64, i64)) -> usize {
    let delta = (to.0 - from.0, to.1 - from.1);
    DIRECTIONS.iter().position(|&d| d == delta).unwrap_or(0)
}

const fn to_point(p: (i64, i64)) -> Point {
    Point::new(p.0 as u32, p.1 as u32)
}

/// Drop vertices whose incoming and outgoing steps point the same way
fn simplify(points: &[Point]) -> Contour {
    let n = points.len();
    if n < 3 {
        return Contour {
            points: points.to_vec(),
        };
    }
    let delta = |a: Point, b: Point| (i64::from(b.x) - i64::from(a.x), i64::from(b.y) - i64::from(a.y));
    let kept = (0..n)
        .filter(|&i| {
            let prev = points[(i + n - 1) % n];
            let next = points[(i + 1) % n];
            i == 0 || delta(prev, points[i]) != delta(points[i], next)
        })
        .map(|i| points[i])
        .collect();
    Contour { points: kept }
}

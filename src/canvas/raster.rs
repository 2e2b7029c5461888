//! RGBA pixel buffer with round-capped stroke painting

/// A point in surface coordinates (pixels, origin top-left)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Stroke style
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pen {
    /// Line width in pixels
    pub width: f32,
    /// RGB color
    pub color: [u8; 3],
}

impl Default for Pen {
    fn default() -> Self {
        Self {
            width: 5.0,
            color: [0x11, 0x18, 0x27],
        }
    }
}

/// Straight-alpha RGBA raster, transparent when created
#[derive(Debug, Clone)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Raster {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes, row-major
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// RGBA value at a pixel, `None` outside the raster
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.index(x, y);
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }

    /// True when no pixel carries any ink
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.pixels.chunks_exact(4).all(|px| px[3] == 0)
    }

    /// Reset every pixel to transparent
    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    /// Paint a segment as a capsule of the pen's width
    ///
    /// Round caps fall out of the distance test, so consecutive segments of a
    /// stroke join without gaps. Edge pixels get partial coverage.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn stroke_segment(&mut self, from: Point, to: Point, pen: &Pen) {
        let radius = pen.width / 2.0;
        let reach = radius + 1.0;

        let min_x = (from.x.min(to.x) - reach).floor().max(0.0);
        let min_y = (from.y.min(to.y) - reach).floor().max(0.0);
        let max_x = (from.x.max(to.x) + reach).ceil().min(self.width as f32 - 1.0);
        let max_y = (from.y.max(to.y) + reach).ceil().min(self.height as f32 - 1.0);

        if max_x < min_x || max_y < min_y {
            return;
        }

        for y in min_y as u32..=max_y as u32 {
            for x in min_x as u32..=max_x as u32 {
                let center = Point::new(x as f32 + 0.5, y as f32 + 0.5);
                let distance = distance_to_segment(center, from, to);
                let coverage = (radius + 0.5 - distance).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.blend(x, y, pen.color, (coverage * 255.0).round() as u8);
                }
            }
        }
    }

    /// Ink a pixel, keeping the strongest coverage seen so far
    fn blend(&mut self, x: u32, y: u32, color: [u8; 3], alpha: u8) {
        let i = self.index(x, y);
        if alpha > self.pixels[i + 3] {
            self.pixels[i..i + 3].copy_from_slice(&color);
            self.pixels[i + 3] = alpha;
        }
    }

    const fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }
}

fn distance_to_segment(p: Point, a: Point, b: Point) -> f32 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx.mul_add(dx, dy * dy);
    let t = if len_sq == 0.0 {
        0.0
    } else {
        ((p.x - a.x).mul_add(dx, (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0)
    };
    let (cx, cy) = (t.mul_add(dx, a.x), t.mul_add(dy, a.y));
    (p.x - cx).hypot(p.y - cy)
}

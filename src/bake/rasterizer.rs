//! Scanline coverage of UV triangles in texel space.
//!
//! Vertices are scaled to texel units and shifted by half a texel so that
//! integer coordinates land on texel centers. The triangle is sorted by its
//! vertical coordinate and split at the middle vertex into two halves; each
//! half walks its rows and fills `[ceil(x_left), ceil(x_right))`.

use glam::Vec2;

use crate::surface::mask::{TexelMask, TexelState};

/// Rasterizes triangles into one image's texel grid, visiting each texel at
/// most once for the lifetime of the mask.
pub struct TexelRasterizer<'m> {
    width: i32,
    height: i32,
    mask: &'m mut TexelMask,
}

impl<'m> TexelRasterizer<'m> {
    pub fn new(mask: &'m mut TexelMask) -> Self {
        Self {
            width: mask.width() as i32,
            height: mask.height() as i32,
            mask,
        }
    }

    /// Marks every not yet written texel whose center lies inside the triangle
    /// with UV corners `st` as written, then calls `flush(x, y)` for it.
    pub fn rasterize(&mut self, st: [Vec2; 3], flush: &mut impl FnMut(u32, u32)) {
        let (w, h) = (self.width as f32, self.height as f32);
        let mut lo = Vec2::new(st[0].x * w - 0.5, st[0].y * h - 0.5);
        let mut mi = Vec2::new(st[1].x * w - 0.5, st[1].y * h - 0.5);
        let mut hi = Vec2::new(st[2].x * w - 0.5, st[2].y * h - 0.5);

        if lo == mi || lo == hi || mi == hi {
            return;
        }

        if lo.y > mi.y && lo.y > hi.y {
            std::mem::swap(&mut lo, &mut hi);
        } else if mi.y > hi.y {
            std::mem::swap(&mut mi, &mut hi);
        }
        if lo.y > mi.y {
            std::mem::swap(&mut lo, &mut mi);
        }

        let mid_is_right = (-(hi.x - lo.x) * (mi.y - hi.y) + (hi.y - lo.y) * (mi.x - hi.x)) > 0.0;
        let y_lo = lo.y.ceil() as i32;
        let y_mid = mi.y.ceil() as i32;
        let y_hi = hi.y.ceil() as i32;

        self.rasterize_half((lo, mi), (lo, hi), y_lo, y_mid, mid_is_right, flush);
        self.rasterize_half((mi, hi), (lo, hi), y_mid, y_hi, mid_is_right, flush);
    }

    fn rasterize_half(
        &mut self,
        short: (Vec2, Vec2),
        long: (Vec2, Vec2),
        y0: i32,
        y1: i32,
        mid_is_right: bool,
        flush: &mut impl FnMut(u32, u32),
    ) {
        if y1 <= 0 || y0 >= self.height {
            return;
        }
        let y0 = y0.max(0);
        let y1 = y1.min(self.height);

        for y in y0..y1 {
            let mut x_l = edge_x(short, y as f32);
            let mut x_r = edge_x(long, y as f32);
            if mid_is_right {
                std::mem::swap(&mut x_l, &mut x_r);
            }

            let ix_l = x_l.ceil() as i32;
            let ix_r = x_r.ceil() as i32;
            if ix_r > 0 && ix_l < self.width {
                for x in ix_l.max(0)..ix_r.min(self.width) {
                    self.visit(x, y, flush);
                }
            }
        }
    }

    fn visit(&mut self, x: i32, y: i32, flush: &mut impl FnMut(u32, u32)) {
        if x < 0 || x >= self.width || y < 0 || y >= self.height {
            return;
        }
        let (x, y) = (x as u32, y as u32);
        if self.mask.get(x, y) == TexelState::Unset {
            self.mask.set(x, y, TexelState::Written);
            flush(x, y);
        }
    }
}

/// X of the edge at row `y`; edges with no vertical extent keep their start.
fn edge_x((p0, p1): (Vec2, Vec2), y: f32) -> f32 {
    if (p1.y - p0.y).abs() > f32::EPSILON {
        p0.x + ((p1.x - p0.x) * (y - p0.y)) / (p1.y - p0.y)
    } else {
        p0.x
    }
}

#[cfg(test)]
#[path = "../../tests/unit/bake/rasterizer.rs"]
mod tests;

use glam::{Vec3, Vec4};

use crate::foundation::math::unit_float_to_u8;

bitflags::bitflags! {
    /// Cache and dirty state of an image after baking.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ImageFlags: u32 {
        /// The byte view is stale relative to float pixels.
        const RECT_INVALID = 1 << 0;
        /// Any display transform cache must be rebuilt.
        const DISPLAY_BUFFER_INVALID = 1 << 1;
        /// Pixels differ from what is saved on disk.
        const BITMAP_DIRTY = 1 << 2;
        /// Cached mipmaps were dropped.
        const MIPMAP_INVALID = 1 << 3;
    }
}

/// RGBA pixel storage, either float or 8-bit per channel.
#[derive(Clone, Debug, PartialEq)]
pub enum Pixels {
    Float(Vec<f32>),
    Byte(Vec<u8>),
}

impl Pixels {
    pub fn is_float(&self) -> bool {
        matches!(self, Pixels::Float(_))
    }

    fn texel_count(&self) -> usize {
        match self {
            Pixels::Float(v) => v.len() / 4,
            Pixels::Byte(v) => v.len() / 4,
        }
    }
}

/// A bake target.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageBuffer {
    pub name: String,
    width: u32,
    height: u32,
    pixels: Pixels,
    pub flags: ImageFlags,
    /// Whether alpha is a real channel of this image rather than padding.
    pub rgba_planes: bool,
    mipmaps: Vec<Pixels>,
}

impl ImageBuffer {
    /// Transparent black float image.
    pub fn new_float(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self::with_pixels(
            name,
            width,
            height,
            Pixels::Float(vec![0.0; texel_len(width, height)]),
        )
    }

    /// Transparent black 8-bit image.
    pub fn new_byte(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self::with_pixels(
            name,
            width,
            height,
            Pixels::Byte(vec![0; texel_len(width, height)]),
        )
    }

    fn with_pixels(name: impl Into<String>, width: u32, height: u32, pixels: Pixels) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            pixels,
            flags: ImageFlags::empty(),
            rgba_planes: false,
            mipmaps: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Images without texels are skipped by the baker.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn is_float(&self) -> bool {
        self.pixels.is_float()
    }

    pub fn pixels(&self) -> &Pixels {
        &self.pixels
    }

    pub(crate) fn pixels_mut(&mut self) -> &mut Pixels {
        &mut self.pixels
    }

    pub fn texel_index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Texel as float RGBA; byte channels stay in `0..=255`.
    pub fn texel(&self, index: usize) -> Vec4 {
        let i = index * 4;
        match &self.pixels {
            Pixels::Float(v) => Vec4::from_slice(&v[i..i + 4]),
            Pixels::Byte(v) => Vec4::new(
                f32::from(v[i]),
                f32::from(v[i + 1]),
                f32::from(v[i + 2]),
                f32::from(v[i + 3]),
            ),
        }
    }

    /// Writes a unit-range color into the RGB channels.
    pub fn write_rgb(&mut self, index: usize, rgb: Vec3) {
        let i = index * 4;
        match &mut self.pixels {
            Pixels::Float(v) => v[i..i + 3].copy_from_slice(&rgb.to_array()),
            Pixels::Byte(v) => {
                v[i] = unit_float_to_u8(rgb.x);
                v[i + 1] = unit_float_to_u8(rgb.y);
                v[i + 2] = unit_float_to_u8(rgb.z);
            }
        }
    }

    pub fn set_opaque(&mut self, index: usize) {
        let i = index * 4 + 3;
        match &mut self.pixels {
            Pixels::Float(v) => v[i] = 1.0,
            Pixels::Byte(v) => v[i] = 255,
        }
    }

    pub fn alpha_is_zero(&self, index: usize) -> bool {
        let i = index * 4 + 3;
        match &self.pixels {
            Pixels::Float(v) => v[i] == 0.0,
            Pixels::Byte(v) => v[i] == 0,
        }
    }

    /// True if any texel is not fully opaque.
    pub fn has_transparency(&self) -> bool {
        match &self.pixels {
            Pixels::Float(v) => v.chunks_exact(4).any(|px| px[3] != 1.0),
            Pixels::Byte(v) => v.chunks_exact(4).any(|px| px[3] != 255),
        }
    }

    pub fn fill_alpha_opaque(&mut self) {
        for i in 0..self.pixels.texel_count() {
            self.set_opaque(i);
        }
    }

    /// Straight RGBA8 copy of the pixels, converting float channels.
    pub fn to_rgba8(&self) -> Vec<u8> {
        match &self.pixels {
            Pixels::Float(v) => v.iter().map(|&c| unit_float_to_u8(c)).collect(),
            Pixels::Byte(v) => v.clone(),
        }
    }

    pub fn mipmap_count(&self) -> usize {
        self.mipmaps.len()
    }

    /// Builds a 2x2 box-filtered mipmap chain down to a single texel.
    pub fn build_mipmaps(&mut self) {
        self.mipmaps.clear();
        let (mut w, mut h) = (self.width as usize, self.height as usize);
        let mut src = self.pixels.clone();
        while w > 1 || h > 1 {
            let (nw, nh) = ((w / 2).max(1), (h / 2).max(1));
            let level = downsample(&src, w, h, nw, nh);
            self.mipmaps.push(level.clone());
            src = level;
            (w, h) = (nw, nh);
        }
    }

    /// Drops cached mipmaps; returns whether any existed.
    pub fn free_mipmaps(&mut self) -> bool {
        let had = !self.mipmaps.is_empty();
        self.mipmaps.clear();
        had
    }
}

fn texel_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * 4
}

fn downsample(src: &Pixels, w: usize, h: usize, nw: usize, nh: usize) -> Pixels {
    let sample = |x: usize, y: usize, c: usize| -> f32 {
        let (x, y) = (x.min(w - 1), y.min(h - 1));
        let i = (y * w + x) * 4 + c;
        match src {
            Pixels::Float(v) => v[i],
            Pixels::Byte(v) => f32::from(v[i]),
        }
    };
    let mut out = vec![0.0f32; nw * nh * 4];
    for y in 0..nh {
        for x in 0..nw {
            for c in 0..4 {
                let acc = sample(2 * x, 2 * y, c)
                    + sample(2 * x + 1, 2 * y, c)
                    + sample(2 * x, 2 * y + 1, c)
                    + sample(2 * x + 1, 2 * y + 1, c);
                out[(y * nw + x) * 4 + c] = acc * 0.25;
            }
        }
    }
    match src {
        Pixels::Float(_) => Pixels::Float(out),
        Pixels::Byte(_) => Pixels::Byte(out.iter().map(|&c| (c + 0.5) as u8).collect()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/surface/buffer.rs"]
mod tests;

use glam::Vec4;

use crate::surface::{
    buffer::{ImageBuffer, Pixels},
    mask::{TexelMask, TexelState},
};

/// Neighbour offsets with their weights (the offset length).
const NEIGHBOURS: [(i32, i32, f32); 8] = [
    (-1, -1, std::f32::consts::SQRT_2),
    (-1, 0, 1.0),
    (-1, 1, std::f32::consts::SQRT_2),
    (0, -1, 1.0),
    (0, 1, 1.0),
    (1, -1, std::f32::consts::SQRT_2),
    (1, 0, 1.0),
    (1, 1, std::f32::consts::SQRT_2),
];

/// Grows assigned texels outward by up to `passes` rings.
///
/// A texel is assigned if its mask state is not `Unset`, or, with no mask,
/// if its alpha is non-zero. Each pass fills unassigned texels that touch an
/// assigned 4-neighbour with the weighted average of their assigned
/// 8-neighbours, reading only the previous pass. Returns the number of texels
/// filled.
pub fn extend_margin(image: &mut ImageBuffer, mut mask: Option<&mut TexelMask>, passes: u32) -> usize {
    if image.is_empty() {
        return 0;
    }
    let (w, h) = (image.width() as i32, image.height() as i32);
    let mut filled_total = 0usize;

    for _ in 0..passes {
        let src = image.clone();
        let src_mask = mask.as_deref().cloned();
        let assigned = |x: i32, y: i32| -> bool {
            if x < 0 || y < 0 || x >= w || y >= h {
                return false;
            }
            let i = (y * w + x) as usize;
            match &src_mask {
                Some(m) => m.states()[i] != TexelState::Unset,
                None => !src.alpha_is_zero(i),
            }
        };

        let mut filled = 0usize;
        for y in 0..h {
            for x in 0..w {
                if assigned(x, y) {
                    continue;
                }
                let touches = assigned(x - 1, y)
                    || assigned(x + 1, y)
                    || assigned(x, y - 1)
                    || assigned(x, y + 1);
                if !touches {
                    continue;
                }

                let mut acc = Vec4::ZERO;
                let mut wsum = 0.0f32;
                for &(dx, dy, weight) in &NEIGHBOURS {
                    let (nx, ny) = (x + dx, y + dy);
                    if assigned(nx, ny) {
                        acc += src.texel((ny * w + nx) as usize) * weight;
                        wsum += weight;
                    }
                }
                if wsum == 0.0 {
                    continue;
                }

                let index = (y * w + x) as usize;
                store(image.pixels_mut(), index, acc / wsum);
                if let Some(m) = mask.as_deref_mut() {
                    m.states_mut()[index] = TexelState::Margin;
                }
                filled += 1;
            }
        }

        if filled == 0 {
            break;
        }
        filled_total += filled;
    }

    filled_total
}

fn store(pixels: &mut Pixels, index: usize, v: Vec4) {
    let i = index * 4;
    match pixels {
        Pixels::Float(p) => p[i..i + 4].copy_from_slice(&v.to_array()),
        Pixels::Byte(p) => {
            for (c, value) in v.to_array().into_iter().enumerate() {
                p[i + c] = if value > 255.0 {
                    255
                } else if value < 0.0 {
                    0
                } else {
                    (value + 0.5) as u8
                };
            }
        }
    }
}

/// Post-bake filtering of one image keyed by its texel mask.
///
/// Images that gain transparency during the bake are promoted to RGBA;
/// otherwise the alpha written by the margin passes is reset to opaque.
pub fn bake_filter(image: &mut ImageBuffer, mask: Option<&mut TexelMask>, margin: u32) -> usize {
    let is_new_alpha = !image.rgba_planes && image.has_transparency();

    let filled = if margin > 0 {
        extend_margin(image, mask, margin)
    } else {
        0
    };

    if is_new_alpha {
        image.rgba_planes = true;
    } else if margin > 0 && !image.rgba_planes {
        image.fill_alpha_opaque();
    }

    filled
}

#[cfg(test)]
#[path = "../../tests/unit/surface/filter.rs"]
mod tests;

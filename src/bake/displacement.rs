use crate::{
    bake::{
        driver::BakeDriver,
        geometry::{GeometrySource, face_uv},
        resolver::PixelContext,
    },
    job::settings::BakeJob,
    surface::{
        buffer::{ImageBuffer, ImageFlags},
        mask::{TexelMask, TexelState},
    },
};

/// Height ranges narrower than this normalize to zero.
pub const MIN_HEIGHT_RANGE: f32 = 1e-5;

/// Bakes the signed distance from a reference surface to the high-res grids
/// along the reference normal, normalized per image.
#[derive(Clone, Copy, Debug, Default)]
pub struct DisplacementDriver;

#[derive(Clone, Debug)]
pub struct HeightAccumulator {
    heights: Vec<f32>,
    min: f32,
    max: f32,
}

impl HeightAccumulator {
    /// `(min, max)` of the raw heights, or `None` before the first texel.
    pub fn range(&self) -> Option<(f32, f32)> {
        (self.min <= self.max).then_some((self.min, self.max))
    }
}

impl BakeDriver for DisplacementDriver {
    type State = HeightAccumulator;

    fn init(&self, _job: &BakeJob<'_>, image: &ImageBuffer) -> HeightAccumulator {
        HeightAccumulator {
            heights: vec![0.0; image.width() as usize * image.height() as usize],
            min: f32::MAX,
            max: f32::MIN,
        }
    }

    fn apply(
        &self,
        job: &BakeJob<'_>,
        state: &mut HeightAccumulator,
        image: &mut ImageBuffer,
        pixel: &PixelContext,
    ) {
        let uv = face_uv(job.lores(), pixel.face, pixel.st);
        let p1 = job.hires().position(pixel.face, uv);
        let reference = job.displacement_reference().sample(pixel.face, uv);

        let height = reference.normal.dot(p1 - reference.position);

        let index = image.texel_index(pixel.x, pixel.y);
        state.heights[index] = height;
        state.min = state.min.min(height);
        state.max = state.max.max(height);

        image.set_opaque(index);
        if image.is_float() {
            image.flags.insert(ImageFlags::RECT_INVALID);
        }
        image.flags.insert(ImageFlags::DISPLAY_BUFFER_INVALID);
    }

    fn finalize(&self, state: &mut HeightAccumulator, image: &mut ImageBuffer, mask: &TexelMask) {
        let range = state.max - state.min;
        let normalize = |h: f32| {
            if range > MIN_HEIGHT_RANGE {
                (h - state.min) / range
            } else {
                0.0
            }
        };

        for (index, &texel) in mask.states().iter().enumerate() {
            if texel != TexelState::Written {
                continue;
            }
            image.write_rgb(index, glam::Vec3::splat(normalize(state.heights[index])));
        }

        if let Some((min, max)) = state.range() {
            tracing::debug!(image = %image.name, min, max, "normalized heights");
        }
        image
            .flags
            .insert(ImageFlags::RECT_INVALID | ImageFlags::DISPLAY_BUFFER_INVALID);
    }

    fn height_range(&self, state: &HeightAccumulator) -> Option<(f32, f32)> {
        state.range()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/bake/displacement.rs"]
mod tests;

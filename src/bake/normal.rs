use crate::{
    bake::{driver::BakeDriver, geometry::face_uv, resolver::PixelContext},
    job::settings::BakeJob,
    surface::{
        buffer::{ImageBuffer, ImageFlags},
        mask::TexelMask,
    },
};

/// Bakes high-res grid normals into the low-res tangent frame, packed as
/// `n * 0.5 + 0.5`.
#[derive(Clone, Copy, Debug, Default)]
pub struct NormalDriver;

impl BakeDriver for NormalDriver {
    type State = ();

    fn init(&self, _job: &BakeJob<'_>, _image: &ImageBuffer) {}

    fn apply(&self, job: &BakeJob<'_>, _state: &mut (), image: &mut ImageBuffer, pixel: &PixelContext) {
        let uv = face_uv(job.lores(), pixel.face, pixel.st);
        let n = job.hires().normal(pixel.face, uv);
        let color = (pixel.to_tangent * n).normalize_or_zero() * 0.5 + 0.5;

        let index = image.texel_index(pixel.x, pixel.y);
        image.write_rgb(index, color);
        image.set_opaque(index);
        if image.is_float() {
            image.flags.insert(ImageFlags::RECT_INVALID);
        }
        image.flags.insert(ImageFlags::DISPLAY_BUFFER_INVALID);
    }

    fn finalize(&self, _state: &mut (), _image: &mut ImageBuffer, _mask: &TexelMask) {}
}

#[cfg(test)]
#[path = "../../tests/unit/bake/normal.rs"]
mod tests;

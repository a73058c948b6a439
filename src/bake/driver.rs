use crate::{
    bake::resolver::PixelContext,
    job::settings::BakeJob,
    surface::{buffer::ImageBuffer, mask::TexelMask},
};

/// One bake mode, applied image by image.
///
/// The orchestrator calls `init` before the first face of an image, `apply`
/// once per covered texel, `finalize` after the last face (also after a
/// cancelled pass) and `release` last.
pub trait BakeDriver {
    /// Per-image scratch data.
    type State;

    fn init(&self, job: &BakeJob<'_>, image: &ImageBuffer) -> Self::State;

    fn apply(
        &self,
        job: &BakeJob<'_>,
        state: &mut Self::State,
        image: &mut ImageBuffer,
        pixel: &PixelContext,
    );

    fn finalize(&self, state: &mut Self::State, image: &mut ImageBuffer, mask: &TexelMask);

    /// Raw value range seen so far, for drivers that normalize.
    fn height_range(&self, _state: &Self::State) -> Option<(f32, f32)> {
        None
    }

    fn release(&self, state: Self::State) {
        drop(state);
    }
}

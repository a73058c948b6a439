//! Drives a bake over every image the low-res faces point at.

use crate::{
    bake::{
        displacement::DisplacementDriver,
        driver::BakeDriver,
        normal::NormalDriver,
        rasterizer::TexelRasterizer,
        resolver::PixelResolver,
    },
    foundation::error::BakeResult,
    job::{
        control::{CancelToken, ProgressSink},
        settings::{BakeJob, BakeMode},
    },
    surface::{
        buffer::{ImageBuffer, ImageFlags},
        filter::bake_filter,
        mask::{TexelMask, TexelState},
    },
};

/// Outcome of a bake for one target image.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ImageReport {
    pub image: usize,
    pub name: String,
    pub faces_baked: usize,
    pub texels_written: usize,
    pub margin_texels: usize,
    /// Raw displacement range before normalization.
    pub height_range: Option<(f32, f32)>,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct BakeReport {
    pub images: Vec<ImageReport>,
    pub cancelled: bool,
}

impl BakeReport {
    pub fn texels_written(&self) -> usize {
        self.images.iter().map(|r| r.texels_written).sum()
    }
}

/// Bakes `job` into `images`, indexed by each face's `image` field.
///
/// Tripping `cancel` stops face iteration; images are still finalized and
/// filtered over whatever was written.
#[tracing::instrument(
    skip_all,
    fields(mode = ?job.settings().mode, faces = job.lores().face_count(), images = images.len())
)]
pub fn bake_images(
    job: &BakeJob<'_>,
    images: &mut [ImageBuffer],
    cancel: &CancelToken,
    progress: &mut dyn ProgressSink,
) -> BakeResult<BakeReport> {
    job.check_images(images)?;

    let mut pass = Pass {
        job,
        targets: collect_images(job),
        cancel,
        progress,
    };

    let mut masks: Vec<Option<TexelMask>> = images.iter().map(|_| None).collect();
    let mut report = match job.settings().mode {
        BakeMode::Normals => pass.run(&NormalDriver, images, &mut masks),
        BakeMode::Displacement => pass.run(&DisplacementDriver, images, &mut masks),
    };

    for entry in &mut report.images {
        let image = &mut images[entry.image];
        let Some(mut mask) = masks[entry.image].take() else {
            continue;
        };
        entry.margin_texels = finish_image(image, &mut mask, job.settings().margin);
    }

    if report.cancelled {
        tracing::warn!(
            texels = report.texels_written(),
            "bake cancelled; keeping partial results"
        );
    }
    tracing::info!(
        images = report.images.len(),
        texels = report.texels_written(),
        "bake finished"
    );
    Ok(report)
}

/// Distinct image indices referenced by faces, in first-reference order.
fn collect_images(job: &BakeJob<'_>) -> Vec<usize> {
    let mut seen = Vec::new();
    for image in job.lores().faces.iter().filter_map(|f| f.image) {
        let image = image as usize;
        if !seen.contains(&image) {
            seen.push(image);
        }
    }
    seen
}

struct Pass<'j, 'a, 'p> {
    job: &'j BakeJob<'a>,
    targets: Vec<usize>,
    cancel: &'j CancelToken,
    progress: &'j mut (dyn ProgressSink + 'p),
}

impl Pass<'_, '_, '_> {
    fn run<D: BakeDriver>(
        &mut self,
        driver: &D,
        images: &mut [ImageBuffer],
        masks: &mut [Option<TexelMask>],
    ) -> BakeReport {
        let mut report = BakeReport::default();
        let total = self.targets.len();

        for done in 0..total {
            let target = self.targets[done];
            let image = &mut images[target];
            if image.is_empty() {
                tracing::debug!(image = %image.name, "skipping image without texels");
                continue;
            }

            let mut mask = TexelMask::new(image.width(), image.height());
            let mut state = driver.init(self.job, image);
            let (faces_baked, cancelled) =
                self.bake_faces(driver, &mut state, image, &mut mask, target, done, total);
            report.cancelled |= cancelled;

            driver.finalize(&mut state, image, &mask);
            let height_range = driver.height_range(&state);
            driver.release(state);

            let texels_written = mask.count(TexelState::Written);
            tracing::debug!(
                image = %image.name,
                faces = faces_baked,
                texels = texels_written,
                "image baked"
            );
            report.images.push(ImageReport {
                image: target,
                name: image.name.clone(),
                faces_baked,
                texels_written,
                margin_texels: 0,
                height_range,
            });
            masks[target] = Some(mask);
        }

        report
    }

    /// Rasterizes every face that targets `target`. Returns the number of
    /// faces baked and whether the pass was cancelled.
    #[allow(clippy::too_many_arguments)]
    fn bake_faces<D: BakeDriver>(
        &mut self,
        driver: &D,
        state: &mut D::State,
        image: &mut ImageBuffer,
        mask: &mut TexelMask,
        target: usize,
        images_done: usize,
        total_images: usize,
    ) -> (usize, bool) {
        let job = self.job;
        let mesh = job.lores();
        let faces_in_image = mesh
            .faces
            .iter()
            .filter(|f| f.image.map(|i| i as usize) == Some(target))
            .count();
        let resolver = PixelResolver::new(mesh, image.width(), image.height(), job.settings().level);

        let mut faces_baked = 0;
        let mut rasterizer = TexelRasterizer::new(mask);
        for (face_idx, face) in mesh.faces.iter().enumerate() {
            if self.cancel.is_cancelled() {
                return (faces_baked, true);
            }
            if face.image.map(|i| i as usize) != Some(target) {
                continue;
            }

            for &tri in face.triangles() {
                let st = tri.map(|c| face.uv[c]);
                rasterizer.rasterize(st, &mut |x, y| {
                    let pixel = resolver.resolve(face_idx, tri, x, y);
                    driver.apply(job, state, image, &pixel);
                });
            }

            faces_baked += 1;
            let fraction =
                (images_done as f32 + faces_baked as f32 / faces_in_image as f32) / total_images as f32;
            self.progress.progress(fraction);
        }

        (faces_baked, false)
    }
}

/// Margin filter and cache invalidation after all images are baked.
fn finish_image(image: &mut ImageBuffer, mask: &mut TexelMask, margin: u32) -> usize {
    let filled = bake_filter(image, Some(mask), margin);

    image
        .flags
        .insert(ImageFlags::BITMAP_DIRTY | ImageFlags::DISPLAY_BUFFER_INVALID);
    if image.is_float() {
        image.flags.insert(ImageFlags::RECT_INVALID);
    }
    if image.free_mipmaps() {
        image.flags.insert(ImageFlags::MIPMAP_INVALID);
    }

    filled
}

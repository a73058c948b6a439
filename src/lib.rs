//! CPU baking of displacement and tangent-space normal maps from
//! multiresolution subdivision grids.
//!
//! A bake walks every face of a low resolution mesh in UV space, rasterizes
//! it into the face's target image and, for each covered texel, samples the
//! high resolution grids that belong to the same surface point.
//!
//! # Pipeline overview
//!
//! 1. **Validate**: [`BakeJob::new`] checks the mesh, grids and settings and
//!    generates a tangent layer if the mesh has none.
//! 2. **Bake**: [`bake_images`] rasterizes faces image by image and hands
//!    each texel to the driver selected by [`BakeMode`].
//! 3. **Finish**: written texels are grown by the margin filter and image
//!    caches are flagged stale.
//!
//! Baking is single-threaded and deterministic; [`CancelToken`] may be tripped
//! from another thread and is polled once per face.
#![forbid(unsafe_code)]

mod bake;
mod foundation;
mod job;
mod mesh;
mod surface;

pub use bake::displacement::{DisplacementDriver, HeightAccumulator, MIN_HEIGHT_RANGE};
pub use bake::driver::BakeDriver;
pub use bake::geometry::{
    GeometrySample, GeometrySource, GridLocation, GridSource, LowResSource, ReferenceSource,
    corner_to_face_uv, face_uv, grids_from_surface,
};
pub use bake::normal::NormalDriver;
pub use bake::orchestrator::{BakeReport, ImageReport, bake_images};
pub use bake::rasterizer::TexelRasterizer;
pub use bake::resolver::{PixelContext, PixelResolver};
pub use foundation::error::{BakeError, BakeResult};
pub use job::control::{CancelToken, NoProgress, ProgressSink};
pub use job::file::{DemoParams, ImageDesc, JobFile, demo_job};
pub use job::settings::{BakeJob, BakeMode, BakeSettings, MAX_LEVEL, MAX_REFERENCE_LEVELS};
pub use mesh::grids::{Grid, GridAttr, SubdivGrids};
pub use mesh::lowres::{Face, LowResMesh, QUAD_SPLIT, Vertex};
pub use surface::buffer::{ImageBuffer, ImageFlags, Pixels};
pub use surface::filter::{bake_filter, extend_margin};
pub use surface::mask::{TexelMask, TexelState};

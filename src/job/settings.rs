use std::borrow::Cow;

use crate::{
    bake::geometry::{GridSource, LowResSource, ReferenceSource},
    foundation::error::{BakeError, BakeResult},
    mesh::{grids::SubdivGrids, lowres::LowResMesh},
    surface::buffer::ImageBuffer,
};

/// Upper bound on the extra subdivision used for the displacement reference.
pub const MAX_REFERENCE_LEVELS: u32 = 6;

/// Deepest multires level the grid index arithmetic supports.
pub const MAX_LEVEL: u32 = 15;

/// What a bake writes into its target images.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BakeMode {
    /// Tangent-space normal map.
    #[default]
    Normals,
    /// Normalized scalar height map.
    Displacement,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BakeSettings {
    pub mode: BakeMode,
    /// Multires level the low-res mesh was evaluated at (0 = base mesh).
    pub level: u32,
    /// Total multires levels; the high-res grids are the deepest one. Equal
    /// to `level` when the low-res mesh already sits at the top level, in
    /// which case displacement is measured from the low-res mesh.
    pub total_levels: u32,
    /// Margin filter passes run after baking.
    pub margin: u32,
    /// Measure displacement against the low-res mesh itself instead of a
    /// smoother subdivided reference.
    pub use_lores_mesh: bool,
}

impl Default for BakeSettings {
    fn default() -> Self {
        Self {
            mode: BakeMode::Normals,
            level: 0,
            total_levels: 0,
            margin: 2,
            use_lores_mesh: false,
        }
    }
}

impl BakeSettings {
    /// Extra subdivision levels the displacement reference sits above the
    /// low-res mesh.
    pub fn reference_levels(&self) -> u32 {
        self.total_levels
            .saturating_sub(self.level)
            .min(MAX_REFERENCE_LEVELS)
    }

    /// Whether displacement is measured against reference grids.
    pub fn uses_reference_grids(&self) -> bool {
        self.mode == BakeMode::Displacement && !self.use_lores_mesh && self.reference_levels() > 0
    }
}

/// Everything one bake run reads.
#[derive(Clone, Debug)]
pub struct BakeJob<'a> {
    lores: Cow<'a, LowResMesh>,
    hires: &'a SubdivGrids,
    reference: Option<&'a SubdivGrids>,
    settings: BakeSettings,
}

impl<'a> BakeJob<'a> {
    /// Validates inputs and prepares the job. A tangent layer is generated
    /// on a private copy of the mesh when it has none.
    pub fn new(
        lores: &'a LowResMesh,
        hires: &'a SubdivGrids,
        reference: Option<&'a SubdivGrids>,
        settings: BakeSettings,
    ) -> BakeResult<Self> {
        lores.validate()?;
        hires.validate()?;
        if settings.level > MAX_LEVEL {
            return Err(BakeError::validation(format!(
                "level {} exceeds the supported maximum {MAX_LEVEL}",
                settings.level
            )));
        }
        GridSource::new(lores, hires, settings.level).check_faces()?;

        if settings.uses_reference_grids() {
            let reference = reference.ok_or_else(|| {
                BakeError::validation(format!(
                    "displacement against a reference {} levels above the low-res mesh needs reference grids",
                    settings.reference_levels()
                ))
            })?;
            reference.validate()?;
            GridSource::new(lores, reference, 0).check_faces()?;
        }

        let lores = if lores.tangents.is_some() {
            Cow::Borrowed(lores)
        } else {
            let mut owned = lores.clone();
            owned.ensure_tangents();
            Cow::Owned(owned)
        };

        Ok(Self {
            lores,
            hires,
            reference,
            settings,
        })
    }

    pub fn settings(&self) -> &BakeSettings {
        &self.settings
    }

    pub fn lores(&self) -> &LowResMesh {
        &self.lores
    }

    pub fn hires(&self) -> GridSource<'_> {
        GridSource::new(&self.lores, self.hires, self.settings.level)
    }

    /// Geometry displacement heights are measured from.
    pub fn displacement_reference(&self) -> ReferenceSource<'_> {
        match self.reference {
            Some(grids) if self.settings.uses_reference_grids() => {
                ReferenceSource::Grids(GridSource::new(&self.lores, grids, 0))
            }
            _ => ReferenceSource::LowRes(LowResSource::new(&self.lores)),
        }
    }

    /// Every image a face points at must exist.
    pub fn check_images(&self, images: &[ImageBuffer]) -> BakeResult<()> {
        for (idx, face) in self.lores.faces.iter().enumerate() {
            if let Some(image) = face.image
                && image as usize >= images.len()
            {
                return Err(BakeError::validation(format!(
                    "face {idx} targets image {image} but only {} images were supplied",
                    images.len()
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/job/settings.rs"]
mod tests;

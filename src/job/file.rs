use std::{fs, path::Path};

use glam::{Vec2, Vec3};

use crate::{
    bake::geometry::grids_from_surface,
    foundation::{
        error::{BakeError, BakeResult},
        math::encode_short_normal,
    },
    job::settings::{BakeJob, BakeSettings},
    mesh::{
        grids::SubdivGrids,
        lowres::{Face, LowResMesh, Vertex},
    },
    surface::buffer::ImageBuffer,
};

/// Target image declared by a job file.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ImageDesc {
    pub width: u32,
    pub height: u32,
    /// Float pixels instead of 8-bit.
    #[serde(default)]
    pub float: bool,
    #[serde(default)]
    pub name: Option<String>,
}

/// A complete bake described as JSON.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct JobFile {
    #[serde(default)]
    pub settings: BakeSettings,
    pub mesh: LowResMesh,
    pub hires: SubdivGrids,
    #[serde(default)]
    pub reference: Option<SubdivGrids>,
    pub images: Vec<ImageDesc>,
}

impl JobFile {
    pub fn from_json_str(s: &str) -> BakeResult<Self> {
        serde_json::from_str(s).map_err(|e| BakeError::serde(format!("parse job file: {e}")))
    }

    pub fn to_json_string(&self) -> BakeResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| BakeError::serde(format!("serialize job file: {e}")))
    }

    pub fn load(path: &Path) -> BakeResult<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| BakeError::io(format!("read job file '{}': {e}", path.display())))?;
        Self::from_json_str(&text)
    }

    pub fn save(&self, path: &Path) -> BakeResult<()> {
        let text = self.to_json_string()?;
        fs::write(path, text)
            .map_err(|e| BakeError::io(format!("write job file '{}': {e}", path.display())))
    }

    /// Validated bake job borrowing this file's geometry.
    pub fn job(&self) -> BakeResult<BakeJob<'_>> {
        BakeJob::new(
            &self.mesh,
            &self.hires,
            self.reference.as_ref(),
            self.settings,
        )
    }

    /// Fresh transparent target images, one per description.
    pub fn build_images(&self) -> Vec<ImageBuffer> {
        self.images
            .iter()
            .enumerate()
            .map(|(idx, desc)| {
                let name = self.image_name(idx);
                if desc.float {
                    ImageBuffer::new_float(name, desc.width, desc.height)
                } else {
                    ImageBuffer::new_byte(name, desc.width, desc.height)
                }
            })
            .collect()
    }

    /// Declared name of image `idx`, or its index.
    pub fn image_name(&self, idx: usize) -> String {
        self.images
            .get(idx)
            .and_then(|d| d.name.clone())
            .unwrap_or_else(|| idx.to_string())
    }

    /// One PNG file name per declared image, safe to join onto an output
    /// directory and distinct from each other (case-insensitively).
    ///
    /// Characters other than ASCII alphanumerics, `-`, `_` and `.` become `_`,
    /// and leading dots are dropped. Clashes get `-<index>` appended.
    pub fn output_file_names(&self) -> Vec<String> {
        let mut taken = std::collections::HashSet::new();
        (0..self.images.len())
            .map(|idx| {
                let mut stem = sanitize_file_stem(&self.image_name(idx));
                if stem.is_empty() {
                    stem = idx.to_string();
                }
                let mut candidate = stem.clone();
                let mut suffix = idx;
                while !taken.insert(candidate.to_ascii_lowercase()) {
                    candidate = format!("{stem}-{suffix}");
                    suffix += 1;
                }
                format!("{candidate}.png")
            })
            .collect()
    }
}

fn sanitize_file_stem(name: &str) -> String {
    let mapped: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    mapped.trim_start_matches('.').to_string()
}

/// Parameters of the built-in sample job.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DemoParams {
    /// Quads per side of the low-res plane.
    pub tiles: u32,
    pub grid_size: u32,
    pub image_size: u32,
    /// Peak height of the bump on the high-res surface.
    pub amplitude: f32,
}

impl Default for DemoParams {
    fn default() -> Self {
        Self {
            tiles: 2,
            grid_size: 9,
            image_size: 64,
            amplitude: 0.2,
        }
    }
}

/// A flat plane of `tiles²` quads baked against a single smooth bump.
pub fn demo_job(params: DemoParams, settings: BakeSettings) -> JobFile {
    let n = params.tiles.max(1);
    let step = 1.0 / n as f32;

    let mut vertices = Vec::with_capacity(((n + 1) * (n + 1)) as usize);
    for j in 0..=n {
        for i in 0..=n {
            vertices.push(Vertex {
                position: Vec3::new(i as f32 * step, j as f32 * step, 0.0),
                normal: encode_short_normal(Vec3::Z),
            });
        }
    }

    let mut faces = Vec::with_capacity((n * n) as usize);
    for j in 0..n {
        for i in 0..n {
            let v = |di: u32, dj: u32| (j + dj) * (n + 1) + (i + di);
            let verts = vec![v(0, 0), v(1, 0), v(1, 1), v(0, 1)];
            let uv = verts
                .iter()
                .map(|&idx| vertices[idx as usize].position.truncate())
                .collect();
            faces.push(Face {
                verts,
                uv,
                smooth: true,
                image: Some(0),
            });
        }
    }

    let mesh = LowResMesh {
        vertices,
        faces,
        ..LowResMesh::default()
    };

    let amplitude = params.amplitude;
    let bump = |p: Vec2| {
        use std::f32::consts::PI;
        let (sx, cx) = (PI * p.x).sin_cos();
        let (sy, cy) = (PI * p.y).sin_cos();
        let z = amplitude * sx * sy;
        let dzdx = amplitude * PI * cx * sy;
        let dzdy = amplitude * PI * sx * cy;
        (p.extend(z), Vec3::new(-dzdx, -dzdy, 1.0).normalize())
    };

    let hires = grids_from_surface(&mesh, params.grid_size, |face, uv| {
        bump(face_point(&mesh, face, uv))
    });

    JobFile {
        settings,
        mesh,
        hires,
        reference: None,
        images: vec![ImageDesc {
            width: params.image_size,
            height: params.image_size,
            float: false,
            name: Some("demo".to_owned()),
        }],
    }
}

/// Planar position of face parameters on an axis-aligned quad.
fn face_point(mesh: &LowResMesh, face: usize, uv: Vec2) -> Vec2 {
    let p0 = mesh.corner_position(face, 0).truncate();
    let p2 = mesh.corner_position(face, 2).truncate();
    p0 + (p2 - p0) * uv
}

#[cfg(test)]
#[path = "../../tests/unit/job/file.rs"]
mod tests;

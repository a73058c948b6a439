use glam::{Vec2, Vec3, Vec4};

use crate::foundation::{
    error::{BakeError, BakeResult},
    math::{decode_short_normal, encode_short_normal, normal_quad, normal_tri},
};

/// Corner index triples used to split a face into triangles.
///
/// Quads always split along the `0-2` diagonal.
pub const QUAD_SPLIT: [[usize; 3]; 2] = [[0, 1, 2], [0, 2, 3]];

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Vertex {
    pub position: Vec3,
    /// Vertex normal scaled to the `i16` range.
    pub normal: [i16; 3],
}

impl Vertex {
    /// Vertex with `normal` normalized and encoded.
    pub fn new(position: Vec3, normal: Vec3) -> Self {
        Self {
            position,
            normal: encode_short_normal(normal),
        }
    }
}

/// A triangle or quad of the low resolution mesh.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Face {
    /// Three or four vertex indices.
    pub verts: Vec<u32>,
    /// One UV per corner.
    pub uv: Vec<Vec2>,
    #[serde(default)]
    pub smooth: bool,
    /// Index of the image this face bakes into, if any.
    #[serde(default)]
    pub image: Option<u32>,
}

impl Face {
    pub fn corner_count(&self) -> usize {
        self.verts.len()
    }

    pub fn is_quad(&self) -> bool {
        self.verts.len() == 4
    }

    /// Corner triples of the triangles this face splits into.
    pub fn triangles(&self) -> &'static [[usize; 3]] {
        if self.is_quad() {
            &QUAD_SPLIT
        } else {
            &QUAD_SPLIT[..1]
        }
    }
}

/// The low resolution mesh whose UV layout drives the bake.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LowResMesh {
    pub vertices: Vec<Vertex>,
    pub faces: Vec<Face>,
    /// Optional precomputed flat normal per face.
    #[serde(default)]
    pub face_normals: Option<Vec<Vec3>>,
    /// Optional tangent layer: four corners of `(x, y, z, sign)` per face.
    #[serde(default)]
    pub tangents: Option<Vec<[Vec4; 4]>>,
    /// Optional map from face to the original polygon it was subdivided from.
    #[serde(default)]
    pub face_origin: Option<Vec<u32>>,
}

impl LowResMesh {
    pub fn validate(&self) -> BakeResult<()> {
        let vert_count = self.vertices.len();
        for (idx, face) in self.faces.iter().enumerate() {
            if !(3..=4).contains(&face.corner_count()) {
                return Err(BakeError::validation(format!(
                    "face {idx} must have 3 or 4 corners, got {}",
                    face.corner_count()
                )));
            }
            if face.uv.len() != face.corner_count() {
                return Err(BakeError::validation(format!(
                    "face {idx} has {} uvs for {} corners",
                    face.uv.len(),
                    face.corner_count()
                )));
            }
            if let Some(v) = face.verts.iter().find(|&&v| v as usize >= vert_count) {
                return Err(BakeError::validation(format!(
                    "face {idx} references vertex {v} but the mesh has {vert_count}"
                )));
            }
            if face.uv.iter().any(|uv| !uv.is_finite()) {
                return Err(BakeError::validation(format!(
                    "face {idx} has non-finite uvs"
                )));
            }
        }

        let face_count = self.faces.len();
        if let Some(normals) = &self.face_normals
            && normals.len() != face_count
        {
            return Err(BakeError::validation(format!(
                "face_normals has {} entries for {face_count} faces",
                normals.len()
            )));
        }
        if let Some(tangents) = &self.tangents
            && tangents.len() != face_count
        {
            return Err(BakeError::validation(format!(
                "tangent layer has {} entries for {face_count} faces",
                tangents.len()
            )));
        }
        if let Some(origin) = &self.face_origin
            && origin.len() != face_count
        {
            return Err(BakeError::validation(format!(
                "face_origin has {} entries for {face_count} faces",
                origin.len()
            )));
        }
        Ok(())
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn corner_position(&self, face: usize, corner: usize) -> Vec3 {
        self.vertices[self.faces[face].verts[corner] as usize].position
    }

    /// Decoded, normalized vertex normal at a face corner.
    pub fn corner_vertex_normal(&self, face: usize, corner: usize) -> Vec3 {
        let v = &self.vertices[self.faces[face].verts[corner] as usize];
        decode_short_normal(v.normal).normalize_or_zero()
    }

    /// Flat face normal, from the precomputed layer when present.
    pub fn flat_normal(&self, face: usize) -> Vec3 {
        if let Some(normals) = &self.face_normals {
            return normals[face];
        }
        let p = |c| self.corner_position(face, c);
        if self.faces[face].is_quad() {
            normal_quad(p(0), p(1), p(2), p(3))
        } else {
            normal_tri(p(0), p(1), p(2))
        }
    }

    /// Shading normal at a corner: flat faces share the face normal, smooth
    /// faces use the vertex normal.
    pub fn corner_normal(&self, face: usize, corner: usize) -> Vec3 {
        if self.faces[face].smooth {
            self.corner_vertex_normal(face, corner)
        } else {
            self.flat_normal(face)
        }
    }

    /// Tangent `(x, y, z, sign)` at a face corner. Zero when no layer exists.
    pub fn corner_tangent(&self, face: usize, corner: usize) -> Vec4 {
        self.tangents
            .as_ref()
            .map_or(Vec4::ZERO, |layer| layer[face][corner])
    }

    /// Original polygon a face was subdivided from; identity without a map.
    pub fn origin_polygon(&self, face: usize) -> usize {
        self.face_origin
            .as_ref()
            .map_or(face, |origin| origin[face] as usize)
    }

    /// Fills the tangent layer if the mesh does not carry one.
    pub fn ensure_tangents(&mut self) {
        if self.tangents.is_none() {
            let layer = crate::mesh::tangent::generate_tangents(self);
            self.tangents = Some(layer);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mesh/lowres.rs"]
mod tests;

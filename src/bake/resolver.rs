use glam::{Mat3, Vec2, Vec3};

use crate::{
    foundation::math::{invert_or_adjugate, resolve_tri_uv},
    mesh::lowres::LowResMesh,
};

/// Everything a bake driver needs for one covered texel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PixelContext {
    pub x: u32,
    pub y: u32,
    pub face: usize,
    pub level: u32,
    /// Texel center in UV space.
    pub st: Vec2,
    /// Barycentric weights of `st` against the triangle's three corners.
    pub weights: Vec3,
    /// Object space to tangent space.
    pub to_tangent: Mat3,
}

/// Builds pixel contexts for the triangles of one image.
#[derive(Clone, Copy, Debug)]
pub struct PixelResolver<'a> {
    mesh: &'a LowResMesh,
    width: u32,
    height: u32,
    level: u32,
}

impl<'a> PixelResolver<'a> {
    pub fn new(mesh: &'a LowResMesh, width: u32, height: u32, level: u32) -> Self {
        Self {
            mesh,
            width,
            height,
            level,
        }
    }

    /// Resolves texel `(x, y)` covered by corners `tri` of `face`.
    pub fn resolve(&self, face: usize, tri: [usize; 3], x: u32, y: u32) -> PixelContext {
        let st = Vec2::new(
            (x as f32 + 0.5) / self.width as f32,
            (y as f32 + 0.5) / self.height as f32,
        );
        let uvs = &self.mesh.faces[face].uv;
        let fuv = resolve_tri_uv(st, uvs[tri[0]], uvs[tri[1]], uvs[tri[2]]);
        let weights = Vec3::new(fuv.x, fuv.y, 1.0 - fuv.x - fuv.y);

        let tangents = tri.map(|c| self.mesh.corner_tangent(face, c));
        let normals = tri.map(|c| self.mesh.corner_normal(face, c));

        // The handedness is shared by all corners of a sane face; the blend
        // only guards against mixed input.
        let sign_blend =
            tangents[0].w * weights.x + tangents[1].w * weights.y + tangents[2].w * weights.z;
        let sign = if sign_blend < 0.0 { -1.0 } else { 1.0 };

        let tangent = tangents[0].truncate() * weights.x
            + tangents[1].truncate() * weights.y
            + tangents[2].truncate() * weights.z;
        let normal = normals[0] * weights.x + normals[1] * weights.y + normals[2] * weights.z;
        let bitangent = normal.cross(tangent) * sign;

        let from_tangent = Mat3::from_cols(tangent, bitangent, normal);

        PixelContext {
            x,
            y,
            face,
            level: self.level,
            st,
            weights,
            to_tangent: invert_or_adjugate(from_tangent),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/bake/resolver.rs"]
mod tests;

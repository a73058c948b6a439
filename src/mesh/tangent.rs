use glam::{Vec3, Vec4};

use crate::mesh::lowres::LowResMesh;

/// MikkTSpace view of a low-res mesh that collects the per-corner result.
struct TangentLayer<'m> {
    mesh: &'m LowResMesh,
    layer: Vec<[Vec4; 4]>,
}

impl bevy_mikktspace::Geometry for TangentLayer<'_> {
    fn num_faces(&self) -> usize {
        self.mesh.face_count()
    }

    fn num_vertices_of_face(&self, face: usize) -> usize {
        self.mesh.faces[face].corner_count()
    }

    fn position(&self, face: usize, vert: usize) -> [f32; 3] {
        self.mesh.corner_position(face, vert).to_array()
    }

    fn normal(&self, face: usize, vert: usize) -> [f32; 3] {
        self.mesh.corner_normal(face, vert).to_array()
    }

    fn tex_coord(&self, face: usize, vert: usize) -> [f32; 2] {
        self.mesh.faces[face].uv[vert].to_array()
    }

    fn set_tangent_encoded(&mut self, tangent: [f32; 4], face: usize, vert: usize) {
        self.layer[face][vert] = Vec4::from_array(tangent);
    }
}

/// Per-corner MikkTSpace tangent layer, `w` holding the bitangent sign.
///
/// Corners MikkTSpace leaves without a usable tangent (degenerate UVs, or a
/// mesh it rejects outright) get an arbitrary unit vector orthogonal to the
/// corner normal with a positive sign.
pub(crate) fn generate_tangents(mesh: &LowResMesh) -> Vec<[Vec4; 4]> {
    let mut geometry = TangentLayer {
        mesh,
        layer: vec![[Vec4::ZERO; 4]; mesh.face_count()],
    };

    if !bevy_mikktspace::generate_tangents(&mut geometry) {
        tracing::warn!(
            faces = mesh.face_count(),
            "tangent generation failed; using fallback frames"
        );
    }

    let mut layer = geometry.layer;
    for (face_idx, corners) in layer.iter_mut().enumerate() {
        for (c, corner) in corners
            .iter_mut()
            .enumerate()
            .take(mesh.faces[face_idx].corner_count())
        {
            let t = corner.truncate();
            if t.is_finite() && t.length_squared() > f32::EPSILON {
                continue;
            }
            let n = mesh.corner_normal(face_idx, c).normalize_or_zero();
            let fallback = if n == Vec3::ZERO {
                Vec3::X
            } else {
                n.any_orthonormal_vector()
            };
            *corner = fallback.extend(1.0);
        }
    }

    layer
}

#[cfg(test)]
#[path = "../../tests/unit/mesh/tangent.rs"]
mod tests;

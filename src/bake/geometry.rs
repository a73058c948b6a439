//! Position and normal lookup for a UV on a low-res face.
//!
//! Two sources share one interface: the low-res mesh itself (bilinear over
//! quads, barycentric over triangles) and a set of subdivision grids laid
//! out per original polygon corner.

use glam::{Vec2, Vec3};

use crate::{
    foundation::{
        error::{BakeError, BakeResult},
        math::{
            decode_short_normal, interp_barycentric_tri, interp_bilinear_quad, resolve_quad_uv,
            resolve_tri_uv,
        },
    },
    mesh::{
        grids::{GridAttr, SubdivGrids},
        lowres::LowResMesh,
    },
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeometrySample {
    pub position: Vec3,
    pub normal: Vec3,
}

pub trait GeometrySource {
    /// Surface point and normal at `uv` in the face's own `[0, 1]²` parameters.
    fn sample(&self, face: usize, uv: Vec2) -> GeometrySample;
}

/// Face parameters of a texture-space point: the point is inverted against
/// the face's UV corners and clamped to `[0, 1]²`.
pub fn face_uv(mesh: &LowResMesh, face: usize, st: Vec2) -> Vec2 {
    let uv = &mesh.faces[face].uv;
    let resolved = if mesh.faces[face].is_quad() {
        resolve_quad_uv(st, uv[0], uv[1], uv[2], uv[3])
    } else {
        resolve_tri_uv(st, uv[0], uv[1], uv[2])
    };
    resolved.clamp(Vec2::ZERO, Vec2::ONE)
}

/// Samples the low-res mesh directly.
#[derive(Clone, Copy, Debug)]
pub struct LowResSource<'a> {
    mesh: &'a LowResMesh,
}

impl<'a> LowResSource<'a> {
    pub fn new(mesh: &'a LowResMesh) -> Self {
        Self { mesh }
    }
}

impl GeometrySource for LowResSource<'_> {
    fn sample(&self, face: usize, uv: Vec2) -> GeometrySample {
        let f = &self.mesh.faces[face];
        let vert = |c: usize| &self.mesh.vertices[f.verts[c] as usize];
        if f.is_quad() {
            let co = [0, 1, 2, 3].map(|c| vert(c).position);
            let no = [0, 1, 2, 3].map(|c| decode_short_normal(vert(c).normal));
            GeometrySample {
                position: interp_bilinear_quad(co, uv.x, uv.y),
                normal: interp_bilinear_quad(no, uv.x, uv.y),
            }
        } else {
            let co = [0, 1, 2].map(|c| vert(c).position);
            let no = [0, 1, 2].map(|c| decode_short_normal(vert(c).normal));
            GeometrySample {
                position: interp_barycentric_tri(co, uv.x, uv.y),
                normal: interp_barycentric_tri(no, uv.x, uv.y),
            }
        }
    }
}

/// A grid and continuous element coordinates inside it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridLocation {
    pub grid: usize,
    pub x: f32,
    pub y: f32,
}

/// Samples subdivision grids that pair with the low-res faces.
#[derive(Clone, Copy, Debug)]
pub struct GridSource<'a> {
    mesh: &'a LowResMesh,
    grids: &'a SubdivGrids,
    level: u32,
}

impl<'a> GridSource<'a> {
    pub fn new(mesh: &'a LowResMesh, grids: &'a SubdivGrids, level: u32) -> Self {
        Self { mesh, grids, level }
    }

    /// Grid index and element coordinates of `uv` on `face`.
    ///
    /// Returns `None` when the face's grid does not exist in this set.
    pub fn locate(&self, face: usize, uv: Vec2) -> Option<GridLocation> {
        let grid_size = self.grids.grid_size();
        let face_side = (grid_size << 1) - 1;

        let (grid, crn_x, crn_y) = if self.level == 0 {
            let g_index = self.grids.offset(face)?;
            let span = (face_side - 1) as f32;
            let (s, x, y) = rot_face_to_corner(
                self.mesh.faces[face].corner_count(),
                face_side,
                uv.x * span,
                uv.y * span,
            );
            (g_index + s, x, y)
        } else {
            let lvl = self.level;
            let side = (1usize << (lvl - 1)) + 1;
            let cells = (side - 1) * (side - 1);
            let grid_index = self.mesh.origin_polygon(face);
            let loc_offs = face % (1usize << (2 * lvl));
            let cell_index = loc_offs % cells;
            let cell_side = (grid_size - 1) / (side - 1);
            let row = cell_index / (side - 1);
            let col = cell_index % (side - 1);

            let g_index = self.grids.offset(grid_index)?;
            let s = (face / (1usize << (2 * (lvl - 1)))).checked_sub(g_index)?;

            (
                g_index + s,
                (col * cell_side) as f32 + uv.y * cell_side as f32,
                (row * cell_side) as f32 + uv.x * cell_side as f32,
            )
        };

        if grid >= self.grids.grid_count() {
            return None;
        }

        // The upper bound is grid_size, one past the last element; the
        // bilinear lookup clamps the element indices instead.
        let max = grid_size as f32;
        Some(GridLocation {
            grid,
            x: crn_x.clamp(0.0, max),
            y: crn_y.clamp(0.0, max),
        })
    }

    pub fn interpolate(&self, loc: GridLocation, attr: GridAttr) -> Vec3 {
        let last = self.grids.grid_size() - 1;
        let x0 = (loc.x as usize).min(last);
        let y0 = (loc.y as usize).min(last);
        let x1 = if x0 >= last { last } else { x0 + 1 };
        let y1 = if y0 >= last { last } else { y0 + 1 };
        let u = loc.x - x0 as f32;
        let v = loc.y - y0 as f32;

        let data = [
            self.grids.elem(loc.grid, x0, y0, attr),
            self.grids.elem(loc.grid, x1, y0, attr),
            self.grids.elem(loc.grid, x1, y1, attr),
            self.grids.elem(loc.grid, x0, y1, attr),
        ];
        interp_bilinear_quad(data, u, v)
    }

    pub fn position(&self, face: usize, uv: Vec2) -> Vec3 {
        self.locate(face, uv)
            .map_or(Vec3::ZERO, |loc| self.interpolate(loc, GridAttr::Position))
    }

    pub fn normal(&self, face: usize, uv: Vec2) -> Vec3 {
        self.locate(face, uv)
            .map_or(Vec3::ZERO, |loc| self.interpolate(loc, GridAttr::Normal))
    }

    /// Every face must map onto an existing grid for every UV.
    pub(crate) fn check_faces(&self) -> BakeResult<()> {
        if self.level > 0 {
            let cells_per_side = 1usize << (self.level - 1);
            if self.grids.grid_size() - 1 < cells_per_side {
                return Err(BakeError::validation(format!(
                    "grid_size {} is too small for level {}",
                    self.grids.grid_size(),
                    self.level
                )));
            }
        }

        let checked_uvs = [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(0.5, 0.5),
            Vec2::new(0.9, 0.05),
            Vec2::new(0.05, 0.9),
        ];
        for face in 0..self.mesh.face_count() {
            if checked_uvs.iter().any(|&uv| self.locate(face, uv).is_none()) {
                return Err(BakeError::validation(format!(
                    "face {face} has no matching grid at level {}",
                    self.level
                )));
            }
        }
        Ok(())
    }
}

impl GeometrySource for GridSource<'_> {
    fn sample(&self, face: usize, uv: Vec2) -> GeometrySample {
        match self.locate(face, uv) {
            Some(loc) => GeometrySample {
                position: self.interpolate(loc, GridAttr::Position),
                normal: self.interpolate(loc, GridAttr::Normal),
            },
            None => GeometrySample {
                position: Vec3::ZERO,
                normal: Vec3::ZERO,
            },
        }
    }
}

/// The displacement reference surface, picked once per job.
#[derive(Clone, Copy, Debug)]
pub enum ReferenceSource<'a> {
    LowRes(LowResSource<'a>),
    Grids(GridSource<'a>),
}

impl GeometrySource for ReferenceSource<'_> {
    fn sample(&self, face: usize, uv: Vec2) -> GeometrySample {
        match self {
            ReferenceSource::LowRes(src) => src.sample(face, uv),
            ReferenceSource::Grids(src) => src.sample(face, uv),
        }
    }
}

/// Maps face coordinates in `[0, face_side - 1]²` to a corner grid and the
/// coordinates inside it. Grid element `(0, 0)` sits at the face center and
/// `(size - 1, size - 1)` at the grid's face corner.
pub(crate) fn rot_face_to_corner(corners: usize, face_side: usize, u: f32, v: f32) -> (usize, f32, f32) {
    let offset = face_side as f32 * 0.5 - 0.5;

    if corners == 4 {
        if u <= offset && v <= offset {
            (0, offset - v, offset - u)
        } else if u > offset && v <= offset {
            (1, u - offset, offset - v)
        } else if u > offset && v > offset {
            (2, v - offset, u - offset)
        } else {
            (3, offset - u, v - offset)
        }
    } else {
        let half = offset.trunc();
        let span = (face_side - 1) as f32;
        let w = span - u - v;
        let (s, w1, w2) = if u >= v && u >= w {
            (0, w, v)
        } else if v >= u && v >= w {
            (1, u, w)
        } else {
            (2, v, u)
        };
        let w1 = w1 / span;
        let w2 = w2 / span;
        let x = (1.0 - (2.0 * w1) / guard(1.0 - w2)) * half;
        let y = (1.0 - (2.0 * w2) / guard(1.0 - w1)) * half;
        (s, x, y)
    }
}

fn guard(d: f32) -> f32 {
    if d.abs() < f32::EPSILON { f32::EPSILON } else { d }
}

/// Inverse of [`rot_face_to_corner`] for grid elements: face parameters in
/// `[0, 1]²` of element `(x, y)` of corner grid `s`.
pub fn corner_to_face_uv(corners: usize, grid_size: usize, s: usize, x: usize, y: usize) -> Vec2 {
    let half = (grid_size - 1) as f32;
    let span = 2.0 * half;
    let (x, y) = (x as f32, y as f32);

    if corners == 4 {
        let (u, v) = match s {
            0 => (half - y, half - x),
            1 => (half + x, half - y),
            2 => (half + y, half + x),
            _ => (half - x, half + y),
        };
        return Vec2::new(u / span, v / span);
    }

    let a = (1.0 - x / half) * 0.5;
    let b = (1.0 - y / half) * 0.5;
    let denom = 1.0 - a * b;
    let w1 = a * (1.0 - b) / denom;
    let w2 = b * (1.0 - a) / denom;
    let rest = 1.0 - w1 - w2;
    // Corner weights (u, v, w) per grid, see rot_face_to_corner.
    let (u, v) = match s {
        0 => (rest, w2),
        1 => (w1, rest),
        _ => (w2, w1),
    };
    Vec2::new(u, v)
}

/// Builds level-0 grids for `mesh` by evaluating `surface(face, uv)` at the
/// face parameters of every grid element; one polygon per face.
pub fn grids_from_surface(
    mesh: &LowResMesh,
    grid_size: u32,
    mut surface: impl FnMut(usize, Vec2) -> (Vec3, Vec3),
) -> SubdivGrids {
    let corners: Vec<usize> = mesh.faces.iter().map(|f| f.corner_count()).collect();
    SubdivGrids::from_fn(grid_size, &corners, |face, s, x, y| {
        let uv = corner_to_face_uv(corners[face], grid_size as usize, s, x, y);
        surface(face, uv)
    })
}

#[cfg(test)]
#[path = "../../tests/unit/bake/geometry.rs"]
mod tests;

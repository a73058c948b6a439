use glam::Vec3;

use crate::foundation::error::{BakeError, BakeResult};

/// One corner grid of a subdivided polygon, `size * size` elements, row-major.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Grid {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
}

/// Which attribute a grid lookup reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridAttr {
    Normal,
    Position,
}

/// Precomputed subdivision grids: each original polygon owns one grid per
/// corner, starting at `grid_offset[polygon]`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SubdivGrids {
    pub grid_size: u32,
    pub grid_offset: Vec<u32>,
    pub grids: Vec<Grid>,
}

impl SubdivGrids {
    pub fn validate(&self) -> BakeResult<()> {
        if self.grid_size < 2 {
            return Err(BakeError::validation(format!(
                "grid_size must be >= 2, got {}",
                self.grid_size
            )));
        }
        let n = self.elems_per_grid();
        for (idx, grid) in self.grids.iter().enumerate() {
            if grid.positions.len() != n || grid.normals.len() != n {
                return Err(BakeError::validation(format!(
                    "grid {idx} must hold {n} positions and normals, got {} and {}",
                    grid.positions.len(),
                    grid.normals.len()
                )));
            }
        }
        if let Some(off) = self
            .grid_offset
            .iter()
            .find(|&&off| off as usize >= self.grids.len())
        {
            return Err(BakeError::validation(format!(
                "grid offset {off} is past the {} available grids",
                self.grids.len()
            )));
        }
        Ok(())
    }

    pub fn grid_size(&self) -> usize {
        self.grid_size as usize
    }

    fn elems_per_grid(&self) -> usize {
        self.grid_size() * self.grid_size()
    }

    pub fn grid_count(&self) -> usize {
        self.grids.len()
    }

    pub fn offset(&self, polygon: usize) -> Option<usize> {
        self.grid_offset.get(polygon).map(|&o| o as usize)
    }

    pub fn elem(&self, grid: usize, x: usize, y: usize, attr: GridAttr) -> Vec3 {
        let g = &self.grids[grid];
        let i = y * self.grid_size() + x;
        match attr {
            GridAttr::Normal => g.normals[i],
            GridAttr::Position => g.positions[i],
        }
    }

    /// Builds grids by evaluating `f(polygon, corner, x, y)` for every element,
    /// one grid per polygon corner.
    pub fn from_fn(
        grid_size: u32,
        corners_per_polygon: &[usize],
        mut f: impl FnMut(usize, usize, usize, usize) -> (Vec3, Vec3),
    ) -> Self {
        let size = grid_size as usize;
        let mut grid_offset = Vec::with_capacity(corners_per_polygon.len());
        let mut grids = Vec::new();
        for (poly, &corners) in corners_per_polygon.iter().enumerate() {
            grid_offset.push(grids.len() as u32);
            for corner in 0..corners {
                let mut positions = Vec::with_capacity(size * size);
                let mut normals = Vec::with_capacity(size * size);
                for y in 0..size {
                    for x in 0..size {
                        let (p, n) = f(poly, corner, x, y);
                        positions.push(p);
                        normals.push(n);
                    }
                }
                grids.push(Grid { positions, normals });
            }
        }
        Self {
            grid_size,
            grid_offset,
            grids,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mesh/grids.rs"]
mod tests;

//! Grid-sampled signed distance fields.
//!
//! A [`UniformGrid`] stores node-centered samples; [`SimpleLevelSet`]
//! interpolates them trilinearly and differentiates the interpolant for
//! the normal. Points outside the grid take the value at the clamped
//! point plus the distance to the grid box.

use glam::Vec3;
use weft_math::geometry::{normalize_or, try_normalize};
use weft_math::Aabb;
use weft_types::{WeftError, WeftResult};

use crate::query::ColliderQuery;

/// Axis-aligned lattice of sample nodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformGrid {
    /// Position of node `(0, 0, 0)`.
    pub min: Vec3,
    /// Spacing between neighbouring nodes along each axis.
    pub cell_size: Vec3,
    /// Number of nodes along each axis (at least 2).
    pub dims: [usize; 3],
}

/// Location of a point inside a grid cell.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CellCoord {
    pub base: [usize; 3],
    pub frac: Vec3,
}

impl UniformGrid {
    /// Creates a grid spanning `bounds` with `dims` nodes per axis.
    pub fn from_bounds(bounds: Aabb, dims: [usize; 3]) -> WeftResult<Self> {
        if dims.iter().any(|&d| d < 2) {
            return Err(WeftError::InvalidShape(format!(
                "grid needs at least 2 nodes per axis, got {dims:?}"
            )));
        }
        let extents = bounds.extents();
        if extents.cmple(Vec3::ZERO).any() {
            return Err(WeftError::InvalidShape(format!(
                "grid bounds must have positive extents, got {extents}"
            )));
        }
        let cells = Vec3::new(
            (dims[0] - 1) as f32,
            (dims[1] - 1) as f32,
            (dims[2] - 1) as f32,
        );
        Ok(Self {
            min: bounds.min,
            cell_size: extents / cells,
            dims,
        })
    }

    /// Total number of nodes.
    pub fn node_count(&self) -> usize {
        self.dims[0] * self.dims[1] * self.dims[2]
    }

    /// Flat index of node `(i, j, k)`, x fastest.
    #[inline]
    pub fn node_index(&self, i: usize, j: usize, k: usize) -> usize {
        i + self.dims[0] * (j + self.dims[1] * k)
    }

    /// World position of node `(i, j, k)`.
    #[inline]
    pub fn node_position(&self, i: usize, j: usize, k: usize) -> Vec3 {
        self.min + self.cell_size * Vec3::new(i as f32, j as f32, k as f32)
    }

    /// Box spanned by the nodes.
    pub fn bounds(&self) -> Aabb {
        let cells = Vec3::new(
            (self.dims[0] - 1) as f32,
            (self.dims[1] - 1) as f32,
            (self.dims[2] - 1) as f32,
        );
        Aabb::new(self.min, self.min + self.cell_size * cells)
    }

    /// Cell containing `p` (clamped to the grid) and the fractional
    /// position inside it.
    pub(crate) fn locate(&self, p: Vec3) -> CellCoord {
        let u = (p - self.min) / self.cell_size;
        let mut base = [0usize; 3];
        let mut frac = [0.0f32; 3];
        for axis in 0..3 {
            let max_base = (self.dims[axis] - 2) as f32;
            let cell = u[axis].floor().clamp(0.0, max_base);
            base[axis] = cell as usize;
            frac[axis] = (u[axis] - cell).clamp(0.0, 1.0);
        }
        CellCoord {
            base,
            frac: Vec3::from_array(frac),
        }
    }

    /// The 8 corner node indices of a cell with their trilinear weights.
    pub(crate) fn corner_weights(&self, coord: &CellCoord) -> [(usize, f32); 8] {
        let [i, j, k] = coord.base;
        let f = coord.frac;
        let mut out = [(0usize, 0.0f32); 8];
        for (n, slot) in out.iter_mut().enumerate() {
            let (dx, dy, dz) = (n & 1, (n >> 1) & 1, (n >> 2) & 1);
            let wx = if dx == 1 { f.x } else { 1.0 - f.x };
            let wy = if dy == 1 { f.y } else { 1.0 - f.y };
            let wz = if dz == 1 { f.z } else { 1.0 - f.z };
            *slot = (self.node_index(i + dx, j + dy, k + dz), wx * wy * wz);
        }
        out
    }
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// A signed distance field sampled on a uniform grid.
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleLevelSet {
    grid: UniformGrid,
    values: Vec<f32>,
}

impl SimpleLevelSet {
    /// Creates a level set from node samples (x fastest, then y, then z).
    pub fn new(grid: UniformGrid, values: Vec<f32>) -> WeftResult<Self> {
        if values.len() != grid.node_count() {
            return Err(WeftError::InvalidShape(format!(
                "level set has {} samples for {} grid nodes",
                values.len(),
                grid.node_count()
            )));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(WeftError::InvalidShape("level set samples must be finite".into()));
        }
        Ok(Self { grid, values })
    }

    /// Samples `sdf` at every node of a grid spanning `bounds`.
    pub fn from_fn(bounds: Aabb, dims: [usize; 3], sdf: impl Fn(Vec3) -> f32) -> WeftResult<Self> {
        let grid = UniformGrid::from_bounds(bounds, dims)?;
        let mut values = Vec::with_capacity(grid.node_count());
        for k in 0..dims[2] {
            for j in 0..dims[1] {
                for i in 0..dims[0] {
                    values.push(sdf(grid.node_position(i, j, k)));
                }
            }
        }
        Self::new(grid, values)
    }

    pub fn grid(&self) -> &UniformGrid {
        &self.grid
    }

    /// Trilinear value and gradient at a point inside the grid box.
    fn sample(&self, p: Vec3) -> (f32, Vec3) {
        let coord = self.grid.locate(p);
        let [i, j, k] = coord.base;
        let f = coord.frac;
        let v = |dx: usize, dy: usize, dz: usize| self.values[self.grid.node_index(i + dx, j + dy, k + dz)];

        let (c000, c100, c010, c110) = (v(0, 0, 0), v(1, 0, 0), v(0, 1, 0), v(1, 1, 0));
        let (c001, c101, c011, c111) = (v(0, 0, 1), v(1, 0, 1), v(0, 1, 1), v(1, 1, 1));

        let c00 = lerp(c000, c100, f.x);
        let c10 = lerp(c010, c110, f.x);
        let c01 = lerp(c001, c101, f.x);
        let c11 = lerp(c011, c111, f.x);
        let value = lerp(lerp(c00, c10, f.y), lerp(c01, c11, f.y), f.z);

        let gx = lerp(
            lerp(c100 - c000, c110 - c010, f.y),
            lerp(c101 - c001, c111 - c011, f.y),
            f.z,
        ) / self.grid.cell_size.x;
        let gy = lerp(
            lerp(c010 - c000, c110 - c100, f.x),
            lerp(c011 - c001, c111 - c101, f.x),
            f.z,
        ) / self.grid.cell_size.y;
        let gz = lerp(
            lerp(c001 - c000, c101 - c100, f.x),
            lerp(c011 - c010, c111 - c110, f.x),
            f.y,
        ) / self.grid.cell_size.z;

        (value, Vec3::new(gx, gy, gz))
    }
}

impl ColliderQuery for SimpleLevelSet {
    fn phi_with_normal(&self, local: Vec3) -> (f32, Vec3) {
        let bounds = self.grid.bounds();
        let clamped = bounds.clamp(local);
        let (value, gradient) = self.sample(clamped);
        let inner_normal = normalize_or(gradient, Vec3::Z);

        let outside = local - clamped;
        let outside_dist = outside.length();
        if outside_dist <= 0.0 {
            return (value, inner_normal);
        }

        // Estimate the surface point behind the clamped sample and point
        // the normal from there towards the query.
        let surface = clamped - value.max(0.0) * inner_normal;
        let normal = try_normalize(local - surface).unwrap_or(inner_normal);
        (value + outside_dist, normal)
    }

    fn local_bounds(&self) -> Aabb {
        self.grid.bounds()
    }
}

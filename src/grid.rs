//! Dense uniform grids.
//!
//! [`Grid`] is a 3D array of `Vec3` cells covering a world-space box, used
//! for the sampled wind field. [`CellMap`] is a square 2D map of arbitrary
//! cell values, used for the surface maps of the flow automaton.
//!
//! # Layout
//!
//! `Grid` is row-major with `j` (x) fastest:
//!
//! ```text
//! index(i, j, k) = (k * ny + i) * nx + j
//! ```
//!
//! where `i` runs along y, `j` along x and `k` along z. The same linear
//! order is what the renderer receives.

use crate::error::{Result, SimError};
use crate::math::Bounds;
use glam::{UVec3, Vec3};

/// Dense 3D grid of vectors over a bounding box.
#[derive(Clone, Debug)]
pub struct Grid {
    /// Cells per axis (x, y, z).
    resolution: UVec3,
    /// World-space box.
    bounds: Bounds,
    /// Size of one cell per axis.
    cell_size: Vec3,
    data: Vec<Vec3>,
}

impl Grid {
    /// Create a zeroed grid.
    ///
    /// Fails if any axis has zero cells or the box has no volume.
    pub fn new(resolution: UVec3, bounds: Bounds) -> Result<Self> {
        if resolution.min_element() == 0 {
            return Err(SimError::config(format!(
                "grid resolution must be positive on every axis, got {resolution}"
            )));
        }
        if !bounds.is_valid() {
            return Err(SimError::config("grid bounds must have positive extent on every axis"));
        }
        let total = resolution.x as usize * resolution.y as usize * resolution.z as usize;
        Ok(Self {
            resolution,
            bounds,
            cell_size: bounds.size() / resolution.as_vec3(),
            data: vec![Vec3::ZERO; total],
        })
    }

    pub fn resolution(&self) -> UVec3 {
        self.resolution
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// Size of one cell: `box_size / cell_count` per axis.
    pub fn cell_size(&self) -> Vec3 {
        self.cell_size
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Linear index of `(i, j, k)` without bounds checks.
    #[inline]
    pub fn index_unchecked(&self, i: usize, j: usize, k: usize) -> usize {
        let nx = self.resolution.x as usize;
        let ny = self.resolution.y as usize;
        (k * ny + i) * nx + j
    }

    /// Linear index of `(i, j, k)`, where `i` is the y cell, `j` the x cell
    /// and `k` the z cell.
    pub fn index(&self, i: usize, j: usize, k: usize) -> Result<usize> {
        SimError::check_index("grid row (i)", i as i64, self.resolution.y as usize)?;
        SimError::check_index("grid column (j)", j as i64, self.resolution.x as usize)?;
        SimError::check_index("grid layer (k)", k as i64, self.resolution.z as usize)?;
        Ok(self.index_unchecked(i, j, k))
    }

    pub fn get(&self, i: usize, j: usize, k: usize) -> Result<Vec3> {
        Ok(self.data[self.index(i, j, k)?])
    }

    pub fn set(&mut self, i: usize, j: usize, k: usize, value: Vec3) -> Result<()> {
        let idx = self.index(i, j, k)?;
        self.data[idx] = value;
        Ok(())
    }

    /// Accumulate `value` into a cell.
    pub fn add(&mut self, i: usize, j: usize, k: usize, value: Vec3) -> Result<()> {
        let idx = self.index(i, j, k)?;
        self.data[idx] += value;
        Ok(())
    }

    /// World-space center of a cell: `min + (idx + 0.5) * cell_size`.
    pub fn cell_center(&self, i: usize, j: usize, k: usize) -> Result<Vec3> {
        self.index(i, j, k)?;
        Ok(self.cell_center_unchecked(i, j, k))
    }

    #[inline]
    pub(crate) fn cell_center_unchecked(&self, i: usize, j: usize, k: usize) -> Vec3 {
        let idx = Vec3::new(j as f32, i as f32, k as f32);
        self.bounds.min + (idx + 0.5) * self.cell_size
    }

    /// Cells in linear order.
    pub fn data(&self) -> &[Vec3] {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut [Vec3] {
        &mut self.data
    }

    /// Raw bytes for upload (12 bytes per cell, tightly packed).
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }
}

/// Square 2D map addressed by integer `(x, y)` cells.
#[derive(Clone, Debug, PartialEq)]
pub struct CellMap<T> {
    size: usize,
    cells: Vec<T>,
}

impl<T: Clone> CellMap<T> {
    /// Create a `size × size` map filled with `value`.
    pub fn new(size: usize, value: T) -> Self {
        Self { size, cells: vec![value; size * size] }
    }

    /// Fill every cell with `value`.
    pub fn fill(&mut self, value: T) {
        self.cells.fill(value);
    }
}

impl<T> CellMap<T> {
    /// Build from row-major cells (`y * size + x`).
    pub fn from_vec(size: usize, cells: Vec<T>) -> Result<Self> {
        if cells.len() != size * size {
            return Err(SimError::config(format!(
                "cell map of side {size} needs {} cells, got {}",
                size * size,
                cells.len()
            )));
        }
        Ok(Self { size, cells })
    }

    /// Side length.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether `(x, y)` lies on the map.
    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.size && (y as usize) < self.size
    }

    #[inline]
    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        self.contains(x, y).then(|| y as usize * self.size + x as usize)
    }

    /// Cell at `(x, y)`, `None` off the map.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Option<&T> {
        self.offset(x, y).map(|o| &self.cells[o])
    }

    #[inline]
    pub fn get_mut(&mut self, x: i32, y: i32) -> Option<&mut T> {
        self.offset(x, y).map(|o| &mut self.cells[o])
    }

    /// Checked access that reports which axis was out of range.
    pub fn try_get_mut(&mut self, x: i32, y: i32) -> Result<&mut T> {
        SimError::check_index("surface column (x)", x as i64, self.size)?;
        SimError::check_index("surface row (y)", y as i64, self.size)?;
        let o = y as usize * self.size + x as usize;
        Ok(&mut self.cells[o])
    }

    /// Cells in row-major order.
    pub fn as_slice(&self) -> &[T] {
        &self.cells
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.cells.iter()
    }
}

impl<T: Copy> CellMap<T> {
    /// Copy of the cell at `(x, y)`, or `default` off the map.
    #[inline]
    pub fn get_or(&self, x: i32, y: i32, default: T) -> T {
        self.get(x, y).copied().unwrap_or(default)
    }
}

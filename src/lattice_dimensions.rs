use crate::cells::{Axis, LatticeCoordinate, Point3};
use crate::errors::*;
use crate::units::{Depth, EdgesCount, Height, NodesCount, Width};


#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct LatticeDimensions {
    width: Width,
    height: Height,
    depth: Depth,
}

impl LatticeDimensions {
    /// Every dimension must be at least one cell, nothing is allocated otherwise.
    pub fn new(width: Width, height: Height, depth: Depth) -> Result<LatticeDimensions> {
        for &(axis, value) in &[(Axis::X, width.0), (Axis::Y, height.0), (Axis::Z, depth.0)] {
            if value == 0 {
                bail!(ErrorKind::InvalidDimension(axis, value));
            }
        }

        Ok(LatticeDimensions {
            width,
            height,
            depth,
        })
    }

    #[inline(always)]
    pub fn width(&self) -> Width {
        self.width
    }

    #[inline(always)]
    pub fn height(&self) -> Height {
        self.height
    }

    #[inline(always)]
    pub fn depth(&self) -> Depth {
        self.depth
    }

    #[inline]
    pub fn extent(&self, axis: Axis) -> usize {
        match axis {
            Axis::X => self.width.0,
            Axis::Y => self.height.0,
            Axis::Z => self.depth.0,
        }
    }

    /// Number of cells, saturating at `usize::MAX` for lattices too large to address.
    #[inline(always)]
    pub fn size(&self) -> NodesCount {
        NodesCount(self.cells_count().unwrap_or(usize::MAX))
    }

    fn cells_count(&self) -> Option<usize> {
        self.width.0.checked_mul(self.height.0)?.checked_mul(self.depth.0)
    }

    /// Exact node and edge counts of the full grid graph: along each axis every cell but the
    /// last in its line has one edge to the next cell.
    /// None if either count overflows `usize`.
    pub fn graph_size(&self) -> Option<(NodesCount, EdgesCount)> {
        let (w, h, d) = (self.width.0, self.height.0, self.depth.0);
        let cells = self.cells_count()?;
        // Each cell count is divisible by its own extent, and every extent is at least one.
        let x_edges = (cells / w).checked_mul(w - 1)?;
        let y_edges = (cells / h).checked_mul(h - 1)?;
        let z_edges = (cells / d).checked_mul(d - 1)?;
        let edges = x_edges.checked_add(y_edges)?.checked_add(z_edges)?;
        Some((NodesCount(cells), EdgesCount(edges)))
    }

    /// Number of outer shell walls: both z faces and both x faces of every height layer.
    /// Saturates at `usize::MAX`.
    pub fn boundary_size(&self) -> usize {
        self.width.0
            .saturating_add(self.depth.0)
            .saturating_mul(self.height.0)
            .saturating_mul(2)
    }

    #[inline]
    pub fn is_valid_coordinate(&self, coord: LatticeCoordinate) -> bool {
        (coord.x as usize) < self.width.0 &&
        (coord.y as usize) < self.height.0 &&
        (coord.z as usize) < self.depth.0
    }

    /// Convert a lattice coordinate to a one dimensional index in the range 0...size.
    /// Returns None if the coordinate is invalid.
    #[inline]
    pub fn coordinate_to_index(&self, coord: LatticeCoordinate) -> Option<usize> {
        if self.is_valid_coordinate(coord) {
            let layer = coord.y as usize * self.depth.0;
            Some((layer + coord.z as usize) * self.width.0 + coord.x as usize)
        } else {
            None
        }
    }

    /// World position of a cell centre, with the lattice centred on the origin along every axis.
    pub fn world_position(&self, coord: LatticeCoordinate) -> Point3 {
        Point3::new(centred(coord.x, self.width.0),
                    centred(coord.y, self.height.0),
                    centred(coord.z, self.depth.0))
    }

    /// World coordinate of the outer face of the lattice along an axis, negative or positive side.
    pub fn face_offset(&self, axis: Axis) -> f32 {
        self.extent(axis) as f32 / 2.0
    }
}

#[inline]
fn centred(index: u32, extent: usize) -> f32 {
    -(extent as f32 - 1.0) / 2.0 + index as f32
}

//! Physical placements derived from a lattice: the outer shell around the whole lattice and one
//! wall or floor for every wall left standing after carving.

use crate::cells::{Axis, LatticeCoordinate, Point3};
use crate::lattice::{Edge, EdgeSmallVec, IndexType, Lattice};
use crate::lattice_dimensions::LatticeDimensions;
use crate::scheduler::{StepOutcome, WorkUnit};

#[derive(Eq, PartialEq, Copy, Clone, Debug, Hash)]
pub enum PartitionKind {
    Wall,
    Floor,
}

/// Rotation about the vertical axis. A canonical wall spans the x axis, facing along z.
#[derive(Eq, PartialEq, Copy, Clone, Debug, Hash)]
pub enum Orientation {
    Canonical,
    Rotated90,
}

#[derive(Eq, PartialEq, Copy, Clone, Debug, Hash)]
pub enum PartitionOrigin {
    /// Part of the shell enclosing the lattice.
    Boundary,
    /// A wall or floor between two cells that was not carved.
    Inner,
}

#[derive(PartialEq, Copy, Clone, Debug)]
pub struct Partition {
    pub kind: PartitionKind,
    pub position: Point3,
    pub orientation: Orientation,
    pub origin: PartitionOrigin,
}

impl Partition {
    fn boundary_wall(position: Point3, orientation: Orientation) -> Partition {
        Partition {
            kind: PartitionKind::Wall,
            position,
            orientation,
            origin: PartitionOrigin::Boundary,
        }
    }
}

/// Index of a placement in the order it was emitted.
#[derive(Eq, PartialEq, Copy, Clone, Debug, Hash, Ord, PartialOrd)]
pub struct PartitionId(pub usize);

/// The outer shell: for every height layer, a wall at both z faces over every x column and a
/// rotated wall at both x faces over every z row.
pub fn boundary_partitions(dimensions: &LatticeDimensions) -> Vec<Partition> {
    let (width, height, depth) = (dimensions.width().0 as u32,
                                  dimensions.height().0 as u32,
                                  dimensions.depth().0 as u32);
    let z_face = dimensions.face_offset(Axis::Z);
    let x_face = dimensions.face_offset(Axis::X);

    let mut partitions = Vec::with_capacity(dimensions.boundary_size());
    for y in 0..height {
        for x in 0..width {
            let centre = dimensions.world_position(LatticeCoordinate::new(x, y, 0));
            for &z in &[-z_face, z_face] {
                let position = Point3::new(centre.x, centre.y, z);
                partitions.push(Partition::boundary_wall(position, Orientation::Canonical));
            }
        }
        for z in 0..depth {
            let centre = dimensions.world_position(LatticeCoordinate::new(0, y, z));
            for &x in &[-x_face, x_face] {
                let position = Point3::new(x, centre.y, centre.z);
                partitions.push(Partition::boundary_wall(position, Orientation::Rotated90));
            }
        }
    }

    partitions
}

/// Turn a standing wall between two cells into its placement.
///
/// Cells stacked vertically get a floor just under the upper cell. Otherwise it is a wall halfway
/// between the two cell centres, rotated when the cells sit side by side along x.
pub fn classify<GridIndexType: IndexType>(lattice: &Lattice<GridIndexType>, edge: Edge) -> Partition {
    let (a, b) = lattice.edge_coordinates(edge);
    let (a_pos, b_pos) = (lattice.world_position(a), lattice.world_position(b));

    let (kind, position, orientation) = if a.x == b.x && a.z == b.z {
        let upper = if a.y < b.y { b_pos } else { a_pos };
        (PartitionKind::Floor, upper - Point3::new(0.0, 0.5, 0.0), Orientation::Canonical)
    } else if a.x == b.x {
        (PartitionKind::Wall, a_pos.midpoint(b_pos), Orientation::Canonical)
    } else {
        (PartitionKind::Wall, a_pos.midpoint(b_pos), Orientation::Rotated90)
    };

    Partition {
        kind,
        position,
        orientation,
        origin: PartitionOrigin::Inner,
    }
}

/// What the emitter works on: the carved lattice, consumed as it goes, and the placement list.
#[derive(Debug)]
pub struct EmissionContext<'a, GridIndexType: IndexType> {
    pub lattice: &'a mut Lattice<GridIndexType>,
    pub placements: &'a mut Vec<Partition>,
}

/// Walks the cells in index order emitting one placement per step for each wall still standing.
/// Once every wall of a cell has been emitted they are all unlinked from the lattice, so cells
/// visited later never see them again and each wall is emitted exactly once.
#[derive(Debug, Default)]
pub struct PartitionEmitter {
    next_cell: usize,
    pending: EdgeSmallVec,
    pending_emitted: usize,
    emitted: usize,
}

impl PartitionEmitter {
    pub fn new() -> PartitionEmitter {
        PartitionEmitter::default()
    }

    /// Inner placements emitted so far.
    #[inline]
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    /// Load the walls of the next cell that still has some. False once every cell is done.
    fn load_next_cell<GridIndexType: IndexType>(&mut self, lattice: &Lattice<GridIndexType>) -> bool {
        while self.next_cell < lattice.size() {
            let walls = lattice.walls_at(self.next_cell);
            self.next_cell += 1;
            if !walls.is_empty() {
                self.pending = walls;
                self.pending_emitted = 0;
                return true;
            }
        }
        false
    }
}

impl<'a, GridIndexType: IndexType> WorkUnit<EmissionContext<'a, GridIndexType>> for PartitionEmitter {
    fn step(&mut self, ctx: &mut EmissionContext<'a, GridIndexType>) -> StepOutcome {

        if self.pending_emitted == self.pending.len() && !self.load_next_cell(ctx.lattice) {
            return StepOutcome::Complete;
        }

        let edge = self.pending[self.pending_emitted];
        ctx.placements.push(classify(ctx.lattice, edge));
        self.pending_emitted += 1;
        self.emitted += 1;

        if self.pending_emitted == self.pending.len() {
            for edge in self.pending.drain(..) {
                let removed = ctx.lattice.remove(edge);
                debug_assert!(removed, "wall {:?} emitted twice", edge);
            }
            self.pending_emitted = 0;
        }

        StepOutcome::Continue
    }
}

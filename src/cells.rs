use smallvec::SmallVec;
use std::convert::From;
use std::ops::{Add, Sub};

use crate::lattice_dimensions::LatticeDimensions;

/// Integer position of a cell inside the lattice. `y` is the height axis.
#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug, Ord, PartialOrd)]
pub struct LatticeCoordinate {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl LatticeCoordinate {
    pub fn new(x: u32, y: u32, z: u32) -> LatticeCoordinate {
        LatticeCoordinate { x, y, z }
    }

    /// Cells are laid out one height layer after another, each layer row by row along z,
    /// with x varying fastest.
    #[inline]
    pub fn from_row_major_index(index: usize, dimensions: &LatticeDimensions) -> LatticeCoordinate {
        let width = dimensions.width().0;
        let depth = dimensions.depth().0;
        let x = index % width;
        let layer_row = index / width;
        let z = layer_row % depth;
        let y = layer_row / depth;

        LatticeCoordinate::new(x as u32, y as u32, z as u32)
    }

    #[inline]
    pub fn component(&self, axis: Axis) -> u32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }
}

impl From<(u32, u32, u32)> for LatticeCoordinate {
    fn from(x_y_z: (u32, u32, u32)) -> LatticeCoordinate {
        LatticeCoordinate::new(x_y_z.0, x_y_z.1, x_y_z.2)
    }
}

pub type CoordinateSmallVec = SmallVec<[LatticeCoordinate; 6]>;

#[derive(Eq, PartialEq, Copy, Clone, Debug, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum LatticeDirection {
    East,
    West,
    Up,
    Down,
    North,
    South,
}

pub const ALL_DIRECTIONS: [LatticeDirection; 6] = [LatticeDirection::East,
                                                   LatticeDirection::West,
                                                   LatticeDirection::Up,
                                                   LatticeDirection::Down,
                                                   LatticeDirection::North,
                                                   LatticeDirection::South];

impl LatticeDirection {
    pub fn axis(self) -> Axis {
        match self {
            LatticeDirection::East | LatticeDirection::West => Axis::X,
            LatticeDirection::Up | LatticeDirection::Down => Axis::Y,
            LatticeDirection::North | LatticeDirection::South => Axis::Z,
        }
    }
}

/// Creates a new coordinate offset 1 cell away in the given direction.
/// Returns None if the coordinate is not representable. It may still lie outside the lattice.
pub fn offset_coordinate(coord: LatticeCoordinate,
                         dir: LatticeDirection)
                         -> Option<LatticeCoordinate> {
    let LatticeCoordinate { x, y, z } = coord;
    match dir {
        LatticeDirection::East => x.checked_add(1).map(|x| LatticeCoordinate { x, ..coord }),
        LatticeDirection::West => x.checked_sub(1).map(|x| LatticeCoordinate { x, ..coord }),
        LatticeDirection::Up => y.checked_add(1).map(|y| LatticeCoordinate { y, ..coord }),
        LatticeDirection::Down => y.checked_sub(1).map(|y| LatticeCoordinate { y, ..coord }),
        LatticeDirection::North => z.checked_add(1).map(|z| LatticeCoordinate { z, ..coord }),
        LatticeDirection::South => z.checked_sub(1).map(|z| LatticeCoordinate { z, ..coord }),
    }
}

/// The single axis along which two coordinates differ by exactly one, if they are adjacent.
pub fn adjacency_axis(a: LatticeCoordinate, b: LatticeCoordinate) -> Option<Axis> {
    let delta = |axis| (i64::from(a.component(axis)) - i64::from(b.component(axis))).abs();
    let (dx, dy, dz) = (delta(Axis::X), delta(Axis::Y), delta(Axis::Z));
    match (dx, dy, dz) {
        (1, 0, 0) => Some(Axis::X),
        (0, 1, 0) => Some(Axis::Y),
        (0, 0, 1) => Some(Axis::Z),
        _ => None,
    }
}

/// A position in world space, in cell units, with the lattice centred on the origin.
#[derive(PartialEq, Copy, Clone, Debug, Default)]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3 {
    pub fn new(x: f32, y: f32, z: f32) -> Point3 {
        Point3 { x, y, z }
    }

    pub fn midpoint(self, other: Point3) -> Point3 {
        Point3::new((self.x + other.x) / 2.0,
                    (self.y + other.y) / 2.0,
                    (self.z + other.z) / 2.0)
    }
}

impl Add for Point3 {
    type Output = Point3;
    fn add(self, rhs: Point3) -> Point3 {
        Point3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Point3 {
    type Output = Point3;
    fn sub(self, rhs: Point3) -> Point3 {
        Point3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

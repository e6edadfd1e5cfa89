use petgraph::{Graph, Undirected};
use petgraph::graph;
pub use petgraph::graph::IndexType;
use smallvec::SmallVec;
use std::fmt;
use std::slice;

use crate::cells::{offset_coordinate, CoordinateSmallVec, LatticeCoordinate, LatticeDirection,
                   Point3, ALL_DIRECTIONS};
use crate::errors::*;
use crate::lattice_dimensions::LatticeDimensions;
use crate::units::{EdgesCount, NodesCount};


/// A wall between two axis-adjacent cells, stored as an unordered pair of cell indices.
/// The lower index always comes first so the same wall always compares and hashes equal.
#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug, Ord, PartialOrd)]
pub struct Edge {
    low: usize,
    high: usize,
}

impl Edge {
    pub fn new(a: usize, b: usize) -> Edge {
        debug_assert!(a != b, "an edge needs two distinct cells");
        if a < b {
            Edge { low: a, high: b }
        } else {
            Edge { low: b, high: a }
        }
    }

    #[inline]
    pub fn cells(&self) -> (usize, usize) {
        (self.low, self.high)
    }
}

pub type EdgeSmallVec = SmallVec<[Edge; 6]>;

/// The full 3D grid graph of cells. An edge present between two cells is a wall, a removed edge
/// is a passage.
#[derive(Clone)]
pub struct Lattice<GridIndexType: IndexType = u32> {
    graph: Graph<(), (), Undirected, GridIndexType>,
    dimensions: LatticeDimensions,
}

pub type SmallLattice = Lattice<u8>;
pub type MediumLattice = Lattice<u16>;
pub type LargeLattice = Lattice<u32>;

impl<GridIndexType: IndexType> fmt::Debug for Lattice<GridIndexType> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Lattice :: graph: {:?}, dimensions: {:?}", self.graph, self.dimensions)
    }
}

impl<GridIndexType: IndexType> Lattice<GridIndexType> {
    /// Allocate every cell and link every pair of axis-adjacent cells with a wall.
    ///
    /// Fails if the cell or wall count cannot be indexed by `GridIndexType`.
    pub fn build(dimensions: LatticeDimensions) -> Result<Lattice<GridIndexType>> {

        let (NodesCount(nodes), EdgesCount(edges)) = match dimensions.graph_size() {
            Some(counts) => counts,
            None => bail!(ErrorKind::LatticeTooLarge(dimensions.size(), EdgesCount(usize::MAX))),
        };

        // The maximum index value is reserved by petgraph as an end marker.
        let index_limit = <GridIndexType as IndexType>::max().index();
        if nodes >= index_limit || edges >= index_limit {
            bail!(ErrorKind::LatticeTooLarge(NodesCount(nodes), EdgesCount(edges)));
        }

        let mut lattice = Lattice {
            graph: Graph::with_capacity(nodes, edges),
            dimensions,
        };
        for _ in 0..nodes {
            let _ = lattice.graph.add_node(());
        }

        // Only link forwards along each axis so every wall is added once.
        let forward_dirs = [LatticeDirection::East, LatticeDirection::Up, LatticeDirection::North];
        for index in 0..nodes {
            let coord = LatticeCoordinate::from_row_major_index(index, &dimensions);
            for dir in &forward_dirs {
                let neighbour_index = lattice.neighbour_at_direction(coord, *dir)
                    .and_then(|neighbour| dimensions.coordinate_to_index(neighbour));
                if let Some(neighbour_index) = neighbour_index {
                    let _ = lattice.graph.add_edge(node_index(index), node_index(neighbour_index), ());
                }
            }
        }

        Ok(lattice)
    }

    #[inline]
    pub fn dimensions(&self) -> &LatticeDimensions {
        &self.dimensions
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.dimensions.size().0
    }

    /// Number of walls still standing between cells.
    #[inline]
    pub fn walls_count(&self) -> usize {
        self.graph.edge_count()
    }

    #[inline]
    pub fn coordinate_to_index(&self, coord: LatticeCoordinate) -> Option<usize> {
        self.dimensions.coordinate_to_index(coord)
    }

    #[inline]
    pub fn index_to_coordinate(&self, index: usize) -> Option<LatticeCoordinate> {
        if index < self.size() {
            Some(LatticeCoordinate::from_row_major_index(index, &self.dimensions))
        } else {
            None
        }
    }

    #[inline]
    pub fn is_valid_coordinate(&self, coord: LatticeCoordinate) -> bool {
        self.dimensions.is_valid_coordinate(coord)
    }

    #[inline]
    pub fn world_position(&self, coord: LatticeCoordinate) -> Point3 {
        self.dimensions.world_position(coord)
    }

    /// The two cells a wall separates.
    pub fn edge_coordinates(&self, edge: Edge) -> (LatticeCoordinate, LatticeCoordinate) {
        let (a, b) = edge.cells();
        (LatticeCoordinate::from_row_major_index(a, &self.dimensions),
         LatticeCoordinate::from_row_major_index(b, &self.dimensions))
    }

    /// Cells that are next to a particular cell along one axis, but not necessarily
    /// separated by a wall.
    pub fn neighbours(&self, coord: LatticeCoordinate) -> CoordinateSmallVec {
        ALL_DIRECTIONS.iter()
            .filter_map(|dir| self.neighbour_at_direction(coord, *dir))
            .collect()
    }

    pub fn neighbour_at_direction(&self,
                                  coord: LatticeCoordinate,
                                  direction: LatticeDirection)
                                  -> Option<LatticeCoordinate> {
        offset_coordinate(coord, direction)
            .filter(|neighbour_coord| self.is_valid_coordinate(*neighbour_coord))
    }

    /// Walls still standing around a cell. None if the coordinate is invalid.
    pub fn walls(&self, coord: LatticeCoordinate) -> Option<EdgeSmallVec> {
        self.coordinate_to_index(coord).map(|index| self.walls_at(index))
    }

    /// Walls still standing around the cell with the given index.
    pub fn walls_at(&self, index: usize) -> EdgeSmallVec {
        self.graph
            .neighbors(node_index(index))
            .map(|neighbour| Edge::new(index, neighbour.index()))
            .collect()
    }

    /// Neighbouring cells reachable through a carved passage. None if the coordinate is invalid.
    pub fn passages(&self, coord: LatticeCoordinate) -> Option<CoordinateSmallVec> {
        if self.is_valid_coordinate(coord) {
            let open = self.neighbours(coord)
                .iter()
                .cloned()
                .filter(|neighbour| !self.has_wall(coord, *neighbour))
                .collect();
            Some(open)
        } else {
            None
        }
    }

    /// Is there a wall between two cells? Cells that are not neighbours never share a wall.
    pub fn has_wall(&self, a: LatticeCoordinate, b: LatticeCoordinate) -> bool {
        match (self.coordinate_to_index(a), self.coordinate_to_index(b)) {
            (Some(a_index), Some(b_index)) => {
                self.graph.find_edge(node_index(a_index), node_index(b_index)).is_some()
            }
            _ => false,
        }
    }

    /// Is there a passage from a cell to its neighbour in some direction?
    pub fn is_neighbour_open(&self, coord: LatticeCoordinate, direction: LatticeDirection) -> bool {
        self.neighbour_at_direction(coord, direction)
            .map_or(false, |neighbour_coord| !self.has_wall(coord, neighbour_coord))
    }

    /// Remove a wall, turning it into a passage.
    /// Returns true if the wall existed. Removing the same wall twice is a caller bug.
    pub fn remove(&mut self, edge: Edge) -> bool {
        let (a, b) = edge.cells();
        if let Some(edge_index) = self.graph.find_edge(node_index(a), node_index(b)) {
            // This will invalidate the last edge index in the graph, which is fine as we
            // are not storing them for any reason.
            let _ = self.graph.remove_edge(edge_index);
            return true;
        }

        false
    }

    pub fn iter(&self) -> CellIter {
        CellIter {
            dimensions: self.dimensions,
            current_cell_number: 0,
            cells_count: self.size(),
        }
    }

    pub fn iter_walls(&self) -> WallsIter<GridIndexType> {
        WallsIter { graph_edge_iter: self.graph.raw_edges().iter() }
    }
}

#[inline]
fn node_index<GridIndexType: IndexType>(index: usize) -> graph::NodeIndex<GridIndexType> {
    graph::NodeIndex::<GridIndexType>::new(index)
}

#[derive(Debug, Copy, Clone)]
pub struct CellIter {
    dimensions: LatticeDimensions,
    current_cell_number: usize,
    cells_count: usize,
}

impl ExactSizeIterator for CellIter {} // default impl using size_hint()
impl Iterator for CellIter {
    type Item = LatticeCoordinate;
    fn next(&mut self) -> Option<Self::Item> {
        if self.current_cell_number < self.cells_count {
            let coord = LatticeCoordinate::from_row_major_index(self.current_cell_number,
                                                                &self.dimensions);
            self.current_cell_number += 1;
            Some(coord)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let lower_bound = self.cells_count - self.current_cell_number;
        let upper_bound = lower_bound;
        (lower_bound, Some(upper_bound))
    }
}

impl<'a, GridIndexType: IndexType> IntoIterator for &'a Lattice<GridIndexType> {
    type Item = LatticeCoordinate;
    type IntoIter = CellIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct WallsIter<'a, GridIndexType: IndexType> {
    graph_edge_iter: slice::Iter<'a, graph::Edge<(), GridIndexType>>,
}

impl<'a, GridIndexType: IndexType> Iterator for WallsIter<'a, GridIndexType> {
    type Item = Edge;

    fn next(&mut self) -> Option<Self::Item> {
        self.graph_edge_iter
            .next()
            .map(|edge| Edge::new(edge.source().index(), edge.target().index()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.graph_edge_iter.size_hint()
    }
}
impl<'a, GridIndexType: IndexType> ExactSizeIterator for WallsIter<'a, GridIndexType> {}

impl<'a, GridIndexType: IndexType> fmt::Debug for WallsIter<'a, GridIndexType> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "WallsIter :: edges iter : {:?}", self.graph_edge_iter)
    }
}

/// Text rendering of each height layer from the bottom up, looking down on the x/z plane with
/// z growing downwards. Cell bodies show open floors (`v`), open ceilings (`^`) or both (`x`).
impl<GridIndexType: IndexType> fmt::Display for Lattice<GridIndexType> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {

        const CORNER: &str = "+";
        const WALL_LR_3: &str = "---";
        const OPEN_LR_3: &str = "   ";
        const WALL_UD: &str = "|";
        const OPEN_UD: &str = " ";

        let width = self.dimensions.width().0 as u32;
        let height = self.dimensions.height().0 as u32;
        let depth = self.dimensions.depth().0 as u32;

        let mut output = String::new();
        for y in 0..height {
            output.push_str(&format!("layer {}\n", y));

            // The northern boundary of the first row, every later row draws its own southern side.
            output.push_str(CORNER);
            for _ in 0..width {
                output.push_str(WALL_LR_3);
                output.push_str(CORNER);
            }
            output.push('\n');

            for z in 0..depth {
                let mut row_middle_section_render = String::from(WALL_UD);
                let mut row_bottom_section_render = String::from(CORNER);

                for x in 0..width {
                    let coord = LatticeCoordinate::new(x, y, z);
                    let body = match (self.is_neighbour_open(coord, LatticeDirection::Down),
                                      self.is_neighbour_open(coord, LatticeDirection::Up)) {
                        (true, true) => " x ",
                        (true, false) => " v ",
                        (false, true) => " ^ ",
                        (false, false) => "   ",
                    };
                    row_middle_section_render.push_str(body);
                    row_middle_section_render.push_str(
                        if self.is_neighbour_open(coord, LatticeDirection::East) {
                            OPEN_UD
                        } else {
                            WALL_UD
                        });

                    row_bottom_section_render.push_str(
                        if self.is_neighbour_open(coord, LatticeDirection::North) {
                            OPEN_LR_3
                        } else {
                            WALL_LR_3
                        });
                    row_bottom_section_render.push_str(CORNER);
                }

                output.push_str(&row_middle_section_render);
                output.push('\n');
                output.push_str(&row_bottom_section_render);
                output.push('\n');
            }
        }

        write!(f, "{}", output)
    }
}


#[cfg(test)]
mod tests {

    use itertools::Itertools; // a trait

    use super::*;
    use crate::units::{Depth, Height, Width};

    fn small_lattice(w: usize, h: usize, d: usize) -> SmallLattice {
        let dims = LatticeDimensions::new(Width(w), Height(h), Depth(d))
            .expect("invalid dimensions");
        SmallLattice::build(dims).expect("lattice dimensions too large for small lattice")
    }

    // Compare a smallvec to e.g. a vec! or &[T].
    macro_rules! assert_smallvec_eq {
        ($x:expr, $y:expr) => (assert_eq!(&*$x, &*$y))
    }

    #[test]
    fn neighbour_cells() {
        let g = small_lattice(3, 3, 3);

        let check_expected_neighbours = |coord, expected_neighbours: &[LatticeCoordinate]| {
            let neighbours = g.neighbours(coord).iter().cloned().sorted().collect::<Vec<_>>();
            let expected = expected_neighbours.iter().cloned().sorted().collect::<Vec<_>>();
            assert_eq!(neighbours, expected);
        };
        let gc = |x, y, z| LatticeCoordinate::new(x, y, z);

        // corners
        check_expected_neighbours(gc(0, 0, 0), &[gc(1, 0, 0), gc(0, 1, 0), gc(0, 0, 1)]);
        check_expected_neighbours(gc(2, 2, 2), &[gc(1, 2, 2), gc(2, 1, 2), gc(2, 2, 1)]);

        // edge of the cube
        check_expected_neighbours(gc(1, 0, 0),
                                  &[gc(0, 0, 0), gc(2, 0, 0), gc(1, 1, 0), gc(1, 0, 1)]);

        // Centre of the cube has all 6
        check_expected_neighbours(gc(1, 1, 1),
                                  &[gc(0, 1, 1), gc(2, 1, 1), gc(1, 0, 1), gc(1, 2, 1),
                                    gc(1, 1, 0), gc(1, 1, 2)]);
    }

    #[test]
    fn neighbour_at_dir() {
        let g = small_lattice(2, 2, 2);
        let gc = |x, y, z| LatticeCoordinate::new(x, y, z);
        let check_neighbour = |coord, dir: LatticeDirection, expected| {
            assert_eq!(g.neighbour_at_direction(coord, dir), expected);
        };
        check_neighbour(gc(0, 0, 0), LatticeDirection::West, None);
        check_neighbour(gc(0, 0, 0), LatticeDirection::Down, None);
        check_neighbour(gc(0, 0, 0), LatticeDirection::South, None);
        check_neighbour(gc(0, 0, 0), LatticeDirection::East, Some(gc(1, 0, 0)));
        check_neighbour(gc(0, 0, 0), LatticeDirection::Up, Some(gc(0, 1, 0)));
        check_neighbour(gc(0, 0, 0), LatticeDirection::North, Some(gc(0, 0, 1)));

        check_neighbour(gc(1, 1, 1), LatticeDirection::East, None);
        check_neighbour(gc(1, 1, 1), LatticeDirection::Up, None);
        check_neighbour(gc(1, 1, 1), LatticeDirection::North, None);
    }

    #[test]
    fn lattice_size() {
        let g = small_lattice(4, 2, 3);
        assert_eq!(g.size(), 24);
        assert_eq!(g.iter().count(), 24);
    }

    #[test]
    fn single_cell_has_no_walls() {
        let g = small_lattice(1, 1, 1);
        assert_eq!(g.size(), 1);
        assert_eq!(g.walls_count(), 0);
        assert_smallvec_eq!(g.walls(LatticeCoordinate::new(0, 0, 0)).unwrap(), &[]);
    }

    #[test]
    fn construction_links_exactly_the_adjacent_pairs() {
        let g = small_lattice(2, 1, 2);
        assert_eq!(g.size(), 4);
        assert_eq!(g.walls_count(), 4);

        // (0,0,0)=0, (1,0,0)=1, (0,0,1)=2, (1,0,1)=3
        let walls = g.iter_walls().sorted().collect::<Vec<Edge>>();
        assert_eq!(walls,
                   vec![Edge::new(0, 1), Edge::new(0, 2), Edge::new(1, 3), Edge::new(2, 3)]);

        for a in g.iter() {
            for b in g.iter() {
                let adjacent = crate::cells::adjacency_axis(a, b).is_some();
                assert_eq!(g.has_wall(a, b), adjacent, "{:?} {:?}", a, b);
            }
        }
    }

    #[test]
    fn construction_matches_graph_size() {
        let g = small_lattice(3, 4, 5);
        let (_, EdgesCount(edges)) = g.dimensions().graph_size().unwrap();
        assert_eq!(g.walls_count(), edges);
        assert_eq!(g.iter_walls().len(), edges);
    }

    #[test]
    fn too_large_for_index_type() {
        let dims = LatticeDimensions::new(Width(10), Height(10), Depth(10)).unwrap();
        let result = SmallLattice::build(dims);
        match result {
            Err(e) => match *e.kind() {
                ErrorKind::LatticeTooLarge(NodesCount(1000), _) => {}
                ref other => panic!("unexpected error {:?}", other),
            },
            Ok(_) => panic!("a u8 indexed lattice cannot hold 1000 cells"),
        }
        assert!(MediumLattice::build(dims).is_ok());
    }

    #[test]
    fn too_large_to_count() {
        let dims = LatticeDimensions::new(Width(usize::MAX), Height(usize::MAX), Depth(2)).unwrap();
        match LargeLattice::build(dims) {
            Err(e) => match *e.kind() {
                ErrorKind::LatticeTooLarge(NodesCount(nodes), _) => assert_eq!(nodes, usize::MAX),
                ref other => panic!("unexpected error {:?}", other),
            },
            Ok(_) => panic!("a lattice with more cells than usize can count was built"),
        }
    }

    #[test]
    fn removing_walls() {
        let mut g = small_lattice(3, 1, 1);
        let gc = |x, y, z| LatticeCoordinate::new(x, y, z);
        let (a, b, c) = (gc(0, 0, 0), gc(1, 0, 0), gc(2, 0, 0));

        assert!(g.has_wall(a, b) && g.has_wall(b, a));
        assert!(g.has_wall(b, c));
        assert!(!g.has_wall(a, c));
        assert_smallvec_eq!(g.passages(b).unwrap(), &[]);

        let ab = Edge::new(1, 0);
        assert_eq!(ab, Edge::new(0, 1));
        assert!(g.remove(ab));
        assert!(!g.has_wall(a, b) && !g.has_wall(b, a));
        assert!(g.has_wall(b, c));
        assert_eq!(g.walls_count(), 1);
        assert_smallvec_eq!(g.walls(b).unwrap(), &[Edge::new(1, 2)]);
        assert_smallvec_eq!(g.walls(a).unwrap(), &[]);
        assert_smallvec_eq!(g.passages(b).unwrap(), &[a]);
        assert!(g.is_neighbour_open(b, LatticeDirection::West));
        assert!(!g.is_neighbour_open(b, LatticeDirection::East));

        // A second removal finds nothing to remove.
        assert!(!g.remove(ab));
        assert_eq!(g.walls_count(), 1);
    }

    #[test]
    fn invalid_coordinates() {
        let g = small_lattice(2, 2, 2);
        let outside = LatticeCoordinate::new(5, 0, 0);
        assert!(g.walls(outside).is_none());
        assert!(g.passages(outside).is_none());
        assert!(!g.has_wall(outside, LatticeCoordinate::new(1, 0, 0)));
        assert_eq!(g.index_to_coordinate(8), None);
        assert_eq!(g.index_to_coordinate(7), Some(LatticeCoordinate::new(1, 1, 1)));
    }

    #[test]
    fn edge_coordinates_and_positions() {
        let g = small_lattice(2, 1, 1);
        let (a, b) = g.edge_coordinates(Edge::new(1, 0));
        assert_eq!(a, LatticeCoordinate::new(0, 0, 0));
        assert_eq!(b, LatticeCoordinate::new(1, 0, 0));
        assert_eq!(g.world_position(a), Point3::new(-0.5, 0.0, 0.0));
        assert_eq!(g.world_position(b), Point3::new(0.5, 0.0, 0.0));
    }

    #[test]
    fn cell_iter() {
        let g = small_lattice(2, 2, 1);
        assert_eq!(g.iter().collect::<Vec<LatticeCoordinate>>(),
                   &[LatticeCoordinate::new(0, 0, 0),
                     LatticeCoordinate::new(1, 0, 0),
                     LatticeCoordinate::new(0, 1, 0),
                     LatticeCoordinate::new(1, 1, 0)]);
        assert_eq!((&g).into_iter().len(), 4);
    }

    #[test]
    fn display_layers() {
        let mut g = small_lattice(2, 2, 1);
        // open the floor between (0,0,0) and (0,1,0), and the x wall in the top layer
        assert!(g.remove(Edge::new(0, 2)));
        assert!(g.remove(Edge::new(2, 3)));
        let expected = "layer 0\n\
                        +---+---+\n\
                        | ^ |   |\n\
                        +---+---+\n\
                        layer 1\n\
                        +---+---+\n\
                        | v     |\n\
                        +---+---+\n";
        assert_eq!(format!("{}", g), expected);
    }
}

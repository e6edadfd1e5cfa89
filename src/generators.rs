use bit_set::BitSet;
use rand::Rng;
use rand_xorshift::XorShiftRng;

use crate::lattice::{Edge, IndexType, Lattice};
use crate::scheduler::{StepOutcome, WorkUnit};
use crate::utils::{self, FnvHashSet};

/// Apply the randomized Prim's maze generation algorithm to a lattice in one go.
/// Returns the number of walls carved into passages.
pub fn prims<GridIndexType, R>(lattice: &mut Lattice<GridIndexType>, rng: R) -> usize
    where GridIndexType: IndexType,
          R: Rng
{
    let mut carver = PrimsCarver::new(rng, lattice.size());
    while carver.step(lattice) == StepOutcome::Continue {}
    carver.carved()
}

/// Randomized Prim's algorithm, one atomic step at a time.
///
/// Start from a cell, put its walls in the frontier, then repeatedly pick a random frontier
/// wall. If exactly one of the two cells it divides has been visited, knock the wall down and
/// add the walls of the newly visited cell to the frontier. Walls with both (or neither) sides
/// visited just leave the frontier. When the frontier is empty the carver moves on to the
/// next unvisited cell, so a lattice split into separate regions still gets every region
/// carved. What is left standing is a spanning forest of walls around a tree of passages.
#[derive(Debug)]
pub struct PrimsCarver<R: Rng = XorShiftRng> {
    rng: R,
    visited: BitSet,
    frontier: Vec<Edge>,
    in_frontier: FnvHashSet<Edge>,
    next_unvisited: usize,
    carved: usize,
    regions: usize,
}

impl<R: Rng> PrimsCarver<R> {
    pub fn new(rng: R, cells_count: usize) -> PrimsCarver<R> {
        PrimsCarver {
            rng,
            visited: BitSet::with_capacity(cells_count),
            frontier: Vec::new(),
            in_frontier: utils::fnv_hashset(cells_count),
            next_unvisited: 0,
            carved: 0,
            regions: 0,
        }
    }

    /// Number of walls knocked down so far.
    #[inline]
    pub fn carved(&self) -> usize {
        self.carved
    }

    /// Number of disjoint regions the carver has started from.
    #[inline]
    pub fn regions(&self) -> usize {
        self.regions
    }

    #[inline]
    pub fn is_visited(&self, cell_index: usize) -> bool {
        self.visited.contains(cell_index)
    }

    fn visit<GridIndexType: IndexType>(&mut self, cell_index: usize, lattice: &Lattice<GridIndexType>) {
        let _ = self.visited.insert(cell_index);
        for edge in lattice.walls_at(cell_index) {
            if self.in_frontier.insert(edge) {
                self.frontier.push(edge);
            }
        }
    }

    fn find_unvisited(&mut self, cells_count: usize) -> Option<usize> {
        while self.next_unvisited < cells_count {
            let candidate = self.next_unvisited;
            if !self.visited.contains(candidate) {
                return Some(candidate);
            }
            self.next_unvisited += 1;
        }
        None
    }
}

impl<GridIndexType, R> WorkUnit<Lattice<GridIndexType>> for PrimsCarver<R>
    where GridIndexType: IndexType,
          R: Rng
{
    fn step(&mut self, lattice: &mut Lattice<GridIndexType>) -> StepOutcome {

        if self.frontier.is_empty() {
            return match self.find_unvisited(lattice.size()) {
                Some(start) => {
                    self.regions += 1;
                    self.visit(start, lattice);
                    StepOutcome::Continue
                }
                None => StepOutcome::Complete,
            };
        }

        let selected = self.rng.gen_range(0..self.frontier.len());
        let edge = self.frontier[selected];
        let (a, b) = edge.cells();

        let newly_visited = match (self.visited.contains(a), self.visited.contains(b)) {
            (true, false) => Some(b),
            (false, true) => Some(a),
            _ => None, // stale: both sides already part of the maze
        };

        if let Some(cell_index) = newly_visited {
            let removed = lattice.remove(edge);
            debug_assert!(removed, "frontier wall {:?} was already carved", edge);
            self.carved += 1;
            self.visit(cell_index, lattice);
        }

        // New walls were only appended, so `selected` still points at the same wall.
        let _ = self.frontier.swap_remove(selected);
        let _ = self.in_frontier.remove(&edge);

        StepOutcome::Continue
    }
}


#[cfg(test)]
mod tests {

    use petgraph::unionfind::UnionFind;
    use quickcheck::{quickcheck, TestResult};
    use rand::SeedableRng;
    use rand_xorshift::XorShiftRng;

    use super::*;
    use crate::clock::SteppingClock;
    use crate::lattice::{LargeLattice, MediumLattice};
    use crate::lattice_dimensions::LatticeDimensions;
    use crate::scheduler::{FrameBudget, Resumption, RunId, Scheduler};
    use crate::units::{Depth, Height, Width};
    use itertools::Itertools;
    use std::time::Duration;

    fn lattice(w: usize, h: usize, d: usize) -> LargeLattice {
        let dims = LatticeDimensions::new(Width(w), Height(h), Depth(d)).expect("invalid dimensions");
        LargeLattice::build(dims).expect("lattice too large")
    }

    fn rng(seed: u64) -> XorShiftRng {
        XorShiftRng::seed_from_u64(seed)
    }

    /// Every pair of neighbours without a wall is a passage. A perfect maze has exactly
    /// size - 1 passages and they join every cell without any loop.
    fn assert_perfect_maze<Ix: IndexType>(g: &Lattice<Ix>) {
        let mut cells = UnionFind::<usize>::new(g.size());
        let mut passages = 0;
        for coord in g.iter() {
            let index = g.coordinate_to_index(coord).unwrap();
            for open in g.passages(coord).unwrap().iter() {
                let open_index = g.coordinate_to_index(*open).unwrap();
                if index < open_index {
                    passages += 1;
                    assert!(cells.union(index, open_index), "passages form a loop");
                }
            }
        }
        assert_eq!(passages, g.size() - 1);
        let roots = (0..g.size()).map(|i| cells.find(i)).unique().count();
        assert_eq!(roots, 1);
    }

    #[test]
    fn carves_a_spanning_tree() {
        for &(w, h, d) in &[(1, 1, 1), (2, 1, 1), (1, 5, 1), (2, 1, 2), (5, 1, 5), (4, 3, 2), (6, 6, 6)] {
            let mut g = lattice(w, h, d);
            let (_, total_edges) = g.dimensions().graph_size().unwrap();
            let carved = prims(&mut g, rng(7));
            assert_eq!(carved, g.size() - 1);
            assert_eq!(g.walls_count(), total_edges.0 - carved);
            assert_perfect_maze(&g);
        }
    }

    #[test]
    fn single_wall_is_always_carved() {
        for seed in 0..20 {
            let mut g = lattice(2, 1, 1);
            assert_eq!(prims(&mut g, rng(seed)), 1);
            assert_eq!(g.walls_count(), 0);
        }
    }

    #[test]
    fn single_cell_needs_no_carving() {
        let mut g = lattice(1, 1, 1);
        let mut carver = PrimsCarver::new(rng(1), g.size());
        assert_eq!(carver.step(&mut g), StepOutcome::Continue);
        assert_eq!(carver.step(&mut g), StepOutcome::Complete);
        assert_eq!(carver.carved(), 0);
        assert_eq!(carver.regions(), 1);
    }

    #[test]
    fn same_seed_same_maze() {
        let walls_after_carving = |seed| {
            let mut g = lattice(7, 2, 5);
            let _ = prims(&mut g, rng(seed));
            g.iter_walls().sorted().collect::<Vec<Edge>>()
        };
        assert_eq!(walls_after_carving(42), walls_after_carving(42));
        assert_eq!(walls_after_carving(3), walls_after_carving(3));
    }

    #[test]
    fn separate_regions_are_each_carved() {
        // Knocking out the middle wall of a 4 long corridor leaves two regions of walls.
        let mut g = lattice(4, 1, 1);
        assert!(g.remove(Edge::new(1, 2)));

        let mut carver = PrimsCarver::new(rng(9), g.size());
        while carver.step(&mut g) == StepOutcome::Continue {}

        assert_eq!(carver.regions(), 2);
        assert_eq!(carver.carved(), g.size() - 2);
        assert_eq!(g.walls_count(), 0);
        assert!((0..g.size()).all(|i| carver.is_visited(i)));
    }

    #[test]
    fn stepping_under_a_budget_gives_the_same_maze() {
        let mut all_at_once = lattice(5, 2, 5);
        let _ = prims(&mut all_at_once, rng(11));

        let mut sliced = lattice(5, 2, 5);
        let clock = SteppingClock::new(Duration::from_millis(1));
        let run = RunId::initial();
        let mut scheduler = Scheduler::new(run, FrameBudget::new(Duration::from_millis(4)), &clock);
        let mut carver = PrimsCarver::new(rng(11), sliced.size());

        let mut resumptions = 0;
        loop {
            resumptions += 1;
            match scheduler.resume(&mut carver, &mut sliced, run, Duration::from_millis(4)) {
                Resumption::Suspended => continue,
                Resumption::Completed => break,
                Resumption::Aborted => panic!("run was never superseded"),
            }
        }

        assert!(resumptions > 1);
        assert_eq!(all_at_once.iter_walls().sorted().collect::<Vec<_>>(),
                   sliced.iter_walls().sorted().collect::<Vec<_>>());
        assert_perfect_maze(&sliced);
    }

    #[test]
    fn quickcheck_spanning_tree_for_any_small_lattice() {
        fn p(w: u8, h: u8, d: u8, seed: u64) -> TestResult {
            let (w, h, d) = (w as usize % 6 + 1, h as usize % 4 + 1, d as usize % 6 + 1);
            let dims = LatticeDimensions::new(Width(w), Height(h), Depth(d)).unwrap();
            let mut g = MediumLattice::build(dims).unwrap();
            let (_, total_edges) = dims.graph_size().unwrap();

            let carved = prims(&mut g, XorShiftRng::seed_from_u64(seed));
            assert_perfect_maze(&g);
            TestResult::from_bool(carved == g.size() - 1 &&
                                  g.walls_count() == total_edges.0 - carved)
        }
        quickcheck(p as fn(u8, u8, u8, u64) -> TestResult)
    }
}

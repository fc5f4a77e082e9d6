// Path search over a finished maze.
//
// Every strategy works purely off the open passages of the maze (`Maze::open_neighbours`),
// never the generator's visited bookkeeping, and never mutates the maze, so one maze can
// serve any number of concurrent searches.

use std::collections::VecDeque;
use std::fmt;

use bit_set::BitSet;
use itertools::Itertools;
use smallvec::SmallVec;

use crate::cells::Coordinate;
use crate::errors::*;
use crate::grid::Maze;
use crate::grid_displays::GridDisplay;
use crate::utils::{self, FnvHashMap};

/// Ordered coordinates from a start cell to an end cell. Empty when there is no route.
pub type SearchPath = Vec<Coordinate>;

pub trait PathStrategy: fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// Find a path from `start` to `end` through open passages.
    ///
    /// Both coordinates must lie on the maze, otherwise this is an error rather
    /// than an empty path. `start == end` gives the single cell path.
    fn find_path(&self, maze: &Maze, start: Coordinate, end: Coordinate) -> Result<SearchPath>;
}

/// Shortest paths by edge count. Ties between equally short routes always resolve
/// the same way because neighbours are expanded in Right, Left, Up, Down order.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct BreadthFirstSearch;

impl PathStrategy for BreadthFirstSearch {
    fn name(&self) -> &'static str {
        "bfs"
    }

    fn find_path(&self, maze: &Maze, start: Coordinate, end: Coordinate) -> Result<SearchPath> {
        check_endpoints(maze, start, end)?;

        let mut visited = BitSet::with_capacity(maze.size());
        let mut parents: FnvHashMap<Coordinate, Coordinate> = utils::fnv_hashmap(maze.size());
        let mut frontier = VecDeque::with_capacity(maze.size());

        visited.insert(flat_index(maze, start)?);
        frontier.push_back(start);

        while let Some(current) = frontier.pop_front() {
            if current == end {
                return Ok(trace_back(&parents, start, end));
            }

            for neighbour in maze.open_neighbours(current) {
                if visited.insert(flat_index(maze, neighbour)?) {
                    parents.insert(neighbour, current);
                    frontier.push_back(neighbour);
                }
            }
        }

        Ok(SearchPath::new())
    }
}

/// Look up a search strategy by its `name()`.
pub fn strategy_by_name(name: &str) -> Result<Box<dyn PathStrategy>> {
    match name {
        "bfs" | "breadth-first" => Ok(Box::new(BreadthFirstSearch)),
        _ => Err(ErrorKind::UnknownStrategy(String::from(name)).into()),
    }
}

fn check_endpoints(maze: &Maze, start: Coordinate, end: Coordinate) -> Result<()> {
    maze.check_contains(start)?;
    maze.check_contains(end)
}

fn flat_index(maze: &Maze, coord: Coordinate) -> Result<usize> {
    maze.index_of(coord)
        .ok_or_else(|| ErrorKind::CoordinateOutOfBounds(coord, maze.width(), maze.height()).into())
}

fn trace_back(parents: &FnvHashMap<Coordinate, Coordinate>,
              start: Coordinate,
              end: Coordinate)
              -> SearchPath {
    let mut path = vec![end];
    let mut current = end;
    while current != start {
        match parents.get(&current) {
            Some(&parent) => {
                current = parent;
                path.push(current);
            }
            None => return SearchPath::new(),
        }
    }
    path.reverse();
    path
}

/// Does every consecutive pair of the path share an open passage?
pub fn is_connected_path(maze: &Maze, path: &[Coordinate]) -> bool {
    path.iter().all(|&coord| maze.contains(coord)) &&
    path.iter().tuple_windows().all(|(&a, &b)| maze.is_linked(a, b))
}

/// Flood fill step counts from one start cell to every reachable cell.
#[derive(Debug, Clone)]
pub struct Distances {
    start_coordinate: Coordinate,
    distances: FnvHashMap<Coordinate, u32>,
    max_distance: u32,
}

impl Distances {
    pub fn for_maze(maze: &Maze, start_coordinate: Coordinate) -> Result<Distances> {
        maze.check_contains(start_coordinate)?;

        let mut max: u32 = 0;
        let mut distances: FnvHashMap<Coordinate, u32> = utils::fnv_hashmap(maze.size());
        distances.insert(start_coordinate, 0);

        // Every link is one step, so the first distance recorded for a cell is already its
        // shortest. The distances map doubles as the visited set.
        let mut frontier = vec![start_coordinate];
        while !frontier.is_empty() {

            let mut new_frontier = vec![];
            for cell_coord in &frontier {
                let distance_to_cell = distances[cell_coord];
                max = max.max(distance_to_cell);

                for link_coordinate in maze.open_neighbours(*cell_coord) {
                    if !distances.contains_key(&link_coordinate) {
                        distances.insert(link_coordinate, distance_to_cell + 1);
                        new_frontier.push(link_coordinate);
                    }
                }
            }
            frontier = new_frontier;
        }

        Ok(Distances {
            start_coordinate,
            distances,
            max_distance: max,
        })
    }

    #[inline(always)]
    pub fn start(&self) -> Coordinate {
        self.start_coordinate
    }

    #[inline(always)]
    pub fn max(&self) -> u32 {
        self.max_distance
    }

    #[inline(always)]
    pub fn distance_to(&self, coord: Coordinate) -> Option<u32> {
        self.distances.get(&coord).cloned()
    }

    pub fn furthest_points(&self) -> SmallVec<[Coordinate; 8]> {
        self.distances
            .iter()
            .filter(|&(_, &distance)| distance == self.max_distance)
            .map(|(&coord, _)| coord)
            .sorted()
            .collect()
    }
}

impl GridDisplay for Distances {
    fn render_cell_body(&self, coord: Coordinate) -> String {
        if let Some(d) = self.distances.get(&coord) {
            // centre align, padding 3, lowercase hexadecimal
            format!("{:^3x}", d)
        } else {
            String::from("   ")
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;
    use std::u32;

    use super::*;
    use crate::cancellation::CancellationToken;
    use crate::cells::Direction;
    use crate::events::GenerationEvents;
    use crate::generators::{generate, GenerationConfig};
    use crate::units::{Height, Width};

    static OUT_OF_GRID_COORDINATE: Coordinate = Coordinate { x: u32::MAX, z: u32::MAX };

    fn gc(x: u32, z: u32) -> Coordinate {
        Coordinate::new(x, z)
    }

    fn generated(w: usize, h: usize, seed: u64) -> Maze {
        generate(&GenerationConfig::new(Width(w), Height(h), seed),
                 CancellationToken::new(),
                 GenerationEvents::new())
            .unwrap()
            .run()
            .into_maze()
    }

    // 2x2 with every internal wall open, a cycle
    fn open_square() -> Maze {
        let mut m = Maze::new(Width(2), Height(2)).unwrap();
        m.carve(gc(0, 0), Direction::Right);
        m.carve(gc(0, 0), Direction::Up);
        m.carve(gc(1, 0), Direction::Up);
        m.carve(gc(0, 1), Direction::Right);
        m
    }

    #[test]
    fn bfs_on_generated_maze_is_shortest() {
        let maze = generated(4, 4, 1);
        let (start, end) = (gc(0, 0), gc(3, 3));
        let path = BreadthFirstSearch.find_path(&maze, start, end).unwrap();

        assert!(!path.is_empty());
        assert_eq!(path.first(), Some(&start));
        assert_eq!(path.last(), Some(&end));
        assert!(is_connected_path(&maze, &path));

        let distances = Distances::for_maze(&maze, start).unwrap();
        assert_eq!(path.len() as u32 - 1, distances.distance_to(end).unwrap());
    }

    #[test]
    fn bfs_matches_flood_fill_everywhere() {
        let maze = generated(6, 5, 31);
        let start = gc(2, 3);
        let distances = Distances::for_maze(&maze, start).unwrap();
        for cell in maze.iter() {
            let path = BreadthFirstSearch.find_path(&maze, start, cell.coord).unwrap();
            assert!(is_connected_path(&maze, &path));
            assert_eq!(path.len() as u32 - 1, distances.distance_to(cell.coord).unwrap());
        }
    }

    #[test]
    fn path_to_self_is_single_cell() {
        let maze = generated(3, 3, 8);
        for cell in maze.iter() {
            let path = BreadthFirstSearch.find_path(&maze, cell.coord, cell.coord).unwrap();
            assert_eq!(path, vec![cell.coord]);
        }
        let closed = Maze::new(Width(2), Height(2)).unwrap();
        assert_eq!(BreadthFirstSearch.find_path(&closed, gc(1, 1), gc(1, 1)).unwrap(), vec![gc(1, 1)]);
    }

    #[test]
    fn out_of_bounds_endpoints_are_errors() {
        let maze = generated(3, 3, 8);
        for &(start, end) in [(gc(3, 0), gc(0, 0)), (gc(0, 0), gc(0, 3)), (OUT_OF_GRID_COORDINATE, gc(1, 1))].iter() {
            match BreadthFirstSearch.find_path(&maze, start, end) {
                Err(ref e) => match *e.kind() {
                    ErrorKind::CoordinateOutOfBounds(..) => {}
                    ref other => panic!("unexpected error {:?}", other),
                },
                Ok(path) => panic!("expected an error, got path {:?}", path),
            }
        }
    }

    #[test]
    fn unreachable_end_gives_empty_path() {
        let closed = Maze::new(Width(3), Height(3)).unwrap();
        assert!(BreadthFirstSearch.find_path(&closed, gc(0, 0), gc(2, 2)).unwrap().is_empty());

        let mut partial = Maze::new(Width(3), Height(1)).unwrap();
        partial.carve(gc(0, 0), Direction::Right);
        assert_eq!(BreadthFirstSearch.find_path(&partial, gc(0, 0), gc(1, 0)).unwrap(),
                   vec![gc(0, 0), gc(1, 0)]);
        assert!(BreadthFirstSearch.find_path(&partial, gc(0, 0), gc(2, 0)).unwrap().is_empty());
    }

    #[test]
    fn ties_break_in_neighbour_order() {
        // Two equally short routes round the square, Right is expanded before Up.
        let maze = open_square();
        let path = BreadthFirstSearch.find_path(&maze, gc(0, 0), gc(1, 1)).unwrap();
        assert_eq!(path, vec![gc(0, 0), gc(1, 0), gc(1, 1)]);

        let back = BreadthFirstSearch.find_path(&maze, gc(1, 1), gc(0, 0)).unwrap();
        assert_eq!(back, vec![gc(1, 1), gc(0, 1), gc(0, 0)]);
    }

    #[test]
    fn visited_bits_are_not_walls() {
        let mut maze = open_square();
        for coord in [gc(0, 0), gc(1, 0), gc(0, 1), gc(1, 1)].iter() {
            maze.mark_visited(*coord);
        }
        assert_eq!(BreadthFirstSearch.find_path(&maze, gc(0, 0), gc(1, 1)).unwrap().len(), 3);
    }

    #[test]
    fn strategies_shared_across_threads() {
        let maze = Arc::new(generated(8, 8, 2));
        let strategy: Arc<dyn PathStrategy> = Arc::from(strategy_by_name("bfs").unwrap());
        let expected = strategy.find_path(&maze, gc(0, 0), gc(7, 7)).unwrap();

        let workers = (0..4)
            .map(|_| {
                let (maze, strategy) = (maze.clone(), strategy.clone());
                thread::spawn(move || strategy.find_path(&maze, gc(0, 0), gc(7, 7)).unwrap())
            })
            .collect::<Vec<_>>();
        for worker in workers {
            assert_eq!(worker.join().unwrap(), expected);
        }
    }

    #[test]
    fn strategy_lookup() {
        assert_eq!(strategy_by_name("bfs").unwrap().name(), "bfs");
        assert_eq!(strategy_by_name("breadth-first").unwrap().name(), "bfs");
        match *strategy_by_name("a-star").unwrap_err().kind() {
            ErrorKind::UnknownStrategy(ref name) => assert_eq!(name, "a-star"),
            ref other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn connected_path_checks() {
        let maze = open_square();
        assert!(is_connected_path(&maze, &[]));
        assert!(is_connected_path(&maze, &[gc(0, 0)]));
        assert!(is_connected_path(&maze, &[gc(0, 0), gc(1, 0), gc(1, 1)]));
        assert!(!is_connected_path(&maze, &[gc(0, 0), gc(1, 1)]));
        assert!(!is_connected_path(&maze, &[OUT_OF_GRID_COORDINATE]));

        let closed = Maze::new(Width(2), Height(2)).unwrap();
        assert!(!is_connected_path(&closed, &[gc(0, 0), gc(1, 0)]));
    }

    #[test]
    fn distances_construction_requires_valid_start_coordinate() {
        let maze = generated(3, 3, 1);
        assert!(Distances::for_maze(&maze, OUT_OF_GRID_COORDINATE).is_err());
    }

    #[test]
    fn distances_on_open_square() {
        let distances = Distances::for_maze(&open_square(), gc(0, 0)).unwrap();
        assert_eq!(distances.start(), gc(0, 0));
        assert_eq!(distances.distance_to(gc(0, 0)), Some(0));
        assert_eq!(distances.distance_to(gc(1, 0)), Some(1));
        assert_eq!(distances.distance_to(gc(0, 1)), Some(1));
        assert_eq!(distances.distance_to(gc(1, 1)), Some(2));
        assert_eq!(distances.max(), 2);
        assert_eq!(&*distances.furthest_points(), &[gc(1, 1)]);
        assert_eq!(distances.distance_to(OUT_OF_GRID_COORDINATE), None);
    }

    #[test]
    fn distances_to_unreachable_cells_is_none() {
        let closed = Maze::new(Width(3), Height(3)).unwrap();
        let distances = Distances::for_maze(&closed, gc(0, 0)).unwrap();
        for cell in closed.iter() {
            if cell.coord == gc(0, 0) {
                assert_eq!(distances.distance_to(cell.coord), Some(0));
            } else {
                assert_eq!(distances.distance_to(cell.coord), None);
            }
        }
    }
}

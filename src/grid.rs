use std::fmt;

use crate::cells::{Cell, Coordinate, CoordinateSmallVec, Direction, NeighbourSmallVec, WallState};
use crate::errors::*;
use crate::units::{EdgesCount, Height, NodesCount, Width};

/// A `width` x `height` grid of wall bitmasks stored row-major in one buffer,
/// cell (x, z) lives at index `x + z * width`.
///
/// New mazes start with every wall closed. Passages are only ever opened in
/// matched pairs through `carve`, so the wall bits of two neighbouring cells
/// always agree about the passage between them.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Maze {
    cells: Vec<WallState>,
    width: usize,
    height: usize,
}

impl Maze {
    pub fn new(width: Width, height: Height) -> Result<Maze> {
        let (Width(w), Height(h)) = (width, height);
        if w == 0 || h == 0 || w > u32::MAX as usize || h > u32::MAX as usize {
            return Err(ErrorKind::InvalidDimensions(w, h).into());
        }

        Ok(Maze {
            cells: vec![WallState::ALL_WALLS; w * h],
            width: w,
            height: h,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.cells.len()
    }

    /// Node and edge counts of a spanning tree over this grid.
    pub fn spanning_tree_size(&self) -> (NodesCount, EdgesCount) {
        (NodesCount(self.size()), EdgesCount(self.size() - 1))
    }

    #[inline]
    pub fn contains(&self, coord: Coordinate) -> bool {
        (coord.x as usize) < self.width && (coord.z as usize) < self.height
    }

    /// Convert a grid coordinate to a one dimensional index in the range 0..maze.size().
    /// Returns None if the grid coordinate is invalid.
    #[inline]
    pub fn index_of(&self, coord: Coordinate) -> Option<usize> {
        if self.contains(coord) {
            Some(coord.x as usize + coord.z as usize * self.width)
        } else {
            None
        }
    }

    #[inline]
    pub fn coordinate_at(&self, index: usize) -> Option<Coordinate> {
        if index < self.size() {
            Some(Coordinate::new((index % self.width) as u32, (index / self.width) as u32))
        } else {
            None
        }
    }

    /// Fail with `CoordinateOutOfBounds` unless the coordinate lies on the grid.
    pub fn check_contains(&self, coord: Coordinate) -> Result<()> {
        if self.contains(coord) {
            Ok(())
        } else {
            Err(ErrorKind::CoordinateOutOfBounds(coord, self.width, self.height).into())
        }
    }

    #[inline]
    pub fn wall_state(&self, coord: Coordinate) -> Option<WallState> {
        self.index_of(coord).map(|index| self.cells[index])
    }

    pub fn cell(&self, coord: Coordinate) -> Option<Cell> {
        self.wall_state(coord).map(|state| Cell { coord, state })
    }

    /// All cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = Cell> + '_ {
        self.cells.iter().enumerate().map(move |(index, &state)| {
            Cell {
                coord: Coordinate::new((index % self.width) as u32, (index / self.width) as u32),
                state,
            }
        })
    }

    pub fn neighbour_at_direction(&self, coord: Coordinate, direction: Direction) -> Option<Coordinate> {
        if self.contains(coord) {
            direction.offset(coord, self.width, self.height)
        } else {
            None
        }
    }

    /// Cells to the Right, Left, Up or Down of a particular cell, in that order,
    /// whether or not a passage leads there.
    pub fn neighbours(&self, coord: Coordinate) -> NeighbourSmallVec {
        Direction::ALL
            .iter()
            .filter_map(|&direction| {
                self.neighbour_at_direction(coord, direction)
                    .map(|neighbour| (direction, neighbour))
            })
            .collect()
    }

    /// Neighbours the generator has not reached yet.
    pub fn unvisited_neighbours(&self, coord: Coordinate) -> NeighbourSmallVec {
        self.neighbours(coord)
            .into_iter()
            .filter(|&(_, neighbour)| !self.is_visited(neighbour))
            .collect()
    }

    /// Neighbours reachable through an open passage. Visited bookkeeping is ignored.
    pub fn open_neighbours(&self, coord: Coordinate) -> CoordinateSmallVec {
        let state = match self.wall_state(coord) {
            Some(state) => state,
            None => return CoordinateSmallVec::new(),
        };
        self.neighbours(coord)
            .into_iter()
            .filter(|&(direction, _)| !state.has_wall(direction))
            .map(|(_, neighbour)| neighbour)
            .collect()
    }

    /// Is there an open passage from `coord` in `direction`?
    pub fn is_open(&self, coord: Coordinate, direction: Direction) -> bool {
        self.neighbour_at_direction(coord, direction).is_some() &&
        self.wall_state(coord).map_or(false, |state| !state.has_wall(direction))
    }

    /// Are two adjacent cells joined by an open passage?
    pub fn is_linked(&self, a: Coordinate, b: Coordinate) -> bool {
        self.neighbours(a)
            .iter()
            .any(|&(direction, neighbour)| neighbour == b && self.is_open(a, direction))
    }

    /// Open the passage between a cell and its neighbour in `direction`, clearing
    /// both the wall bit on this cell and the opposite wall bit on the neighbour.
    ///
    /// Returns the neighbour coordinate, or None (leaving the maze untouched) if
    /// there is no neighbour in that direction.
    pub fn carve(&mut self, coord: Coordinate, direction: Direction) -> Option<Coordinate> {
        let neighbour = self.neighbour_at_direction(coord, direction)?;
        let (index, neighbour_index) = (self.index_of(coord)?, self.index_of(neighbour)?);

        self.cells[index].remove(direction.wall());
        self.cells[neighbour_index].remove(direction.opposite().wall());
        Some(neighbour)
    }

    pub fn mark_visited(&mut self, coord: Coordinate) -> bool {
        if let Some(index) = self.index_of(coord) {
            self.cells[index].insert(WallState::VISITED);
            true
        } else {
            false
        }
    }

    #[inline]
    pub fn is_visited(&self, coord: Coordinate) -> bool {
        self.wall_state(coord).map_or(false, WallState::is_visited)
    }

    pub fn visited_count(&self) -> usize {
        self.cells.iter().filter(|state| state.is_visited()).count()
    }

    /// Number of open passages, each shared passage counted once.
    pub fn open_passages_count(&self) -> usize {
        self.iter()
            .map(|cell| {
                [Direction::Right, Direction::Up]
                    .iter()
                    .filter(|&&direction| self.is_open(cell.coord, direction))
                    .count()
            })
            .sum()
    }

    /// Every passage agrees on both of its sides.
    pub fn is_wall_symmetric(&self) -> bool {
        self.iter().all(|cell| {
            self.neighbours(cell.coord).iter().all(|&(direction, neighbour)| {
                let neighbour_state = self.cells[neighbour.x as usize + neighbour.z as usize * self.width];
                cell.state.has_wall(direction) == neighbour_state.has_wall(direction.opposite())
            })
        })
    }

    /// One byte of wall state per cell, row-major.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.cells.iter().map(|state| state.bits()).collect()
    }
}

impl fmt::Debug for Maze {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Maze :: width: {:?}, height: {:?}, open passages: {:?}",
               self.width, self.height, self.open_passages_count())
    }
}

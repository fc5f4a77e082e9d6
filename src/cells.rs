use std::convert::TryFrom;
use std::fmt;

use bitflags::bitflags;
use smallvec::SmallVec;

use crate::errors::*;

#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug, Ord, PartialOrd)]
pub struct Coordinate {
    pub x: u32,
    pub z: u32,
}

impl Coordinate {
    pub fn new(x: u32, z: u32) -> Coordinate {
        Coordinate { x, z }
    }
}

impl From<(u32, u32)> for Coordinate {
    fn from(x_z_pair: (u32, u32)) -> Coordinate {
        Coordinate::new(x_z_pair.0, x_z_pair.1)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

pub type CoordinateSmallVec = SmallVec<[Coordinate; 4]>;
pub type NeighbourSmallVec = SmallVec<[(Direction, Coordinate); 4]>;

bitflags! {
    /// Per cell wall bitmask. A set wall bit is a closed passage in that direction.
    ///
    /// `VISITED` is bookkeeping for the generators only, path search ignores it.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct WallState: u8 {
        const LEFT    = 0b0000_0001;
        const RIGHT   = 0b0000_0010;
        const DOWN    = 0b0000_0100;
        const UP      = 0b0000_1000;
        const VISITED = 0b1000_0000;

        const ALL_WALLS = Self::LEFT.bits() | Self::RIGHT.bits() | Self::DOWN.bits() | Self::UP.bits();
    }
}

impl WallState {
    #[inline]
    pub fn has_wall(self, direction: Direction) -> bool {
        self.contains(direction.wall())
    }

    #[inline]
    pub fn is_visited(self) -> bool {
        self.contains(WallState::VISITED)
    }

    /// The wall bits only, without the generation bookkeeping.
    #[inline]
    pub fn walls(self) -> WallState {
        self & WallState::ALL_WALLS
    }
}

#[derive(Eq, PartialEq, Copy, Clone, Debug, Hash)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    /// Neighbour enumeration order. Generation and search tie-breaks depend on it.
    pub const ALL: [Direction; 4] = [Direction::Right, Direction::Left, Direction::Up, Direction::Down];

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    pub fn wall(self) -> WallState {
        match self {
            Direction::Left => WallState::LEFT,
            Direction::Right => WallState::RIGHT,
            Direction::Up => WallState::UP,
            Direction::Down => WallState::DOWN,
        }
    }

    /// Creates a new `Coordinate` offset 1 cell away in this direction.
    /// Returns None if the coordinate would leave a `width` x `height` grid.
    pub fn offset(self, coord: Coordinate, width: usize, height: usize) -> Option<Coordinate> {
        let (x, z) = (coord.x as usize, coord.z as usize);
        match self {
            Direction::Right if x + 1 < width => Some(Coordinate::new(coord.x + 1, coord.z)),
            Direction::Left if x > 0 => Some(Coordinate::new(coord.x - 1, coord.z)),
            Direction::Up if z + 1 < height => Some(Coordinate::new(coord.x, coord.z + 1)),
            Direction::Down if z > 0 => Some(Coordinate::new(coord.x, coord.z - 1)),
            _ => None,
        }
    }
}

impl TryFrom<WallState> for Direction {
    type Error = Error;

    fn try_from(state: WallState) -> Result<Direction> {
        Direction::ALL
            .iter()
            .cloned()
            .find(|direction| direction.wall() == state)
            .ok_or_else(|| ErrorKind::UndefinedDirection(state.bits()).into())
    }
}

/// Opposite wall bit of a single direction wall bit.
/// Anything other than exactly one of the four wall bits is a programming error.
pub fn opposite_wall(state: WallState) -> Result<WallState> {
    Direction::try_from(state).map(|direction| direction.opposite().wall())
}

#[derive(Eq, PartialEq, Copy, Clone, Debug, Hash)]
pub struct Cell {
    pub coord: Coordinate,
    pub state: WallState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposites() {
        for &direction in Direction::ALL.iter() {
            assert_ne!(direction.opposite(), direction);
            assert_eq!(direction.opposite().opposite(), direction);
        }
        assert_eq!(Direction::Left.opposite(), Direction::Right);
        assert_eq!(Direction::Up.opposite(), Direction::Down);
    }

    #[test]
    fn wall_bits_match_directions() {
        assert_eq!(WallState::LEFT.bits(), 1);
        assert_eq!(WallState::RIGHT.bits(), 2);
        assert_eq!(WallState::DOWN.bits(), 4);
        assert_eq!(WallState::UP.bits(), 8);
        for &direction in Direction::ALL.iter() {
            assert_eq!(Direction::try_from(direction.wall()).unwrap(), direction);
        }
    }

    #[test]
    fn opposite_of_undefined_direction_fails() {
        assert_eq!(opposite_wall(WallState::UP).unwrap(), WallState::DOWN);
        assert_eq!(opposite_wall(WallState::RIGHT).unwrap(), WallState::LEFT);

        let bad_inputs = [WallState::VISITED,
                          WallState::empty(),
                          WallState::LEFT | WallState::UP,
                          WallState::ALL_WALLS];
        for state in bad_inputs.iter() {
            let err = opposite_wall(*state).unwrap_err();
            match *err.kind() {
                ErrorKind::UndefinedDirection(bits) => assert_eq!(bits, state.bits()),
                ref other => panic!("expected an undefined direction error, got {:?}", other),
            }
        }
    }

    #[test]
    fn visited_is_not_a_wall() {
        let state = WallState::VISITED | WallState::UP;
        assert!(state.is_visited());
        assert_eq!(state.walls(), WallState::UP);
        assert!(state.has_wall(Direction::Up));
        assert!(!state.has_wall(Direction::Down));
    }

    #[test]
    fn offsets_stay_in_bounds() {
        let origin = Coordinate::new(0, 0);
        assert_eq!(Direction::Left.offset(origin, 3, 3), None);
        assert_eq!(Direction::Down.offset(origin, 3, 3), None);
        assert_eq!(Direction::Right.offset(origin, 3, 3), Some(Coordinate::new(1, 0)));
        assert_eq!(Direction::Up.offset(origin, 3, 3), Some(Coordinate::new(0, 1)));

        let corner = Coordinate::new(2, 2);
        assert_eq!(Direction::Right.offset(corner, 3, 3), None);
        assert_eq!(Direction::Up.offset(corner, 3, 3), None);
        assert_eq!(Direction::Right.offset(origin, 1, 1), None);
    }
}

use std::fmt;

use crate::cells::{Coordinate, CoordinateSmallVec, Direction};
use crate::grid::Maze;
use crate::utils::{self, FnvHashSet};

pub trait GridDisplay {
    /// Render the contents of a grid cell as text.
    /// The String should be 3 glyphs long, padded if required.
    fn render_cell_body(&self, _: Coordinate) -> String {
        String::from("   ")
    }
}

#[derive(Debug)]
pub struct PathDisplay {
    on_path_coordinates: FnvHashSet<Coordinate>,
}
impl PathDisplay {
    pub fn new(path: &[Coordinate]) -> Self {
        let mut on_path_coordinates = utils::fnv_hashset(path.len());
        on_path_coordinates.extend(path.iter().cloned());
        PathDisplay { on_path_coordinates }
    }
}
impl GridDisplay for PathDisplay {
    fn render_cell_body(&self, coord: Coordinate) -> String {
        if self.on_path_coordinates.contains(&coord) {
            String::from(" . ")
        } else {
            String::from("   ")
        }
    }
}

#[derive(Debug)]
pub struct StartEndPointsDisplay {
    start_coordinates: CoordinateSmallVec,
    end_coordinates: CoordinateSmallVec,
}
impl StartEndPointsDisplay {
    pub fn new(starts: CoordinateSmallVec, ends: CoordinateSmallVec) -> StartEndPointsDisplay {
        StartEndPointsDisplay {
            start_coordinates: starts,
            end_coordinates: ends,
        }
    }
}
impl GridDisplay for StartEndPointsDisplay {
    fn render_cell_body(&self, coord: Coordinate) -> String {
        if self.start_coordinates.contains(&coord) {
            String::from(" S ")
        } else if self.end_coordinates.contains(&coord) {
            String::from(" E ")
        } else {
            String::from("   ")
        }
    }
}

/// Draw the maze with ascii walls, the row with the largest z at the top so that
/// `Up` points up the page.
pub fn render_text(maze: &Maze, display: Option<&dyn GridDisplay>) -> String {
    let body = |coord: Coordinate| -> String {
        display.map_or_else(|| String::from("   "), |d| d.render_cell_body(coord))
    };
    let horizontal_walls = |z: u32, direction: Direction| -> String {
        let mut line = String::from("+");
        for x in 0..maze.width() as u32 {
            line.push_str(if maze.is_open(Coordinate::new(x, z), direction) { "   " } else { "---" });
            line.push('+');
        }
        line.push('\n');
        line
    };

    let mut output = String::new();
    for z in (0..maze.height() as u32).rev() {
        output.push_str(&horizontal_walls(z, Direction::Up));

        let mut middle = String::from("|");
        for x in 0..maze.width() as u32 {
            let coord = Coordinate::new(x, z);
            middle.push_str(&body(coord));
            middle.push(if maze.is_open(coord, Direction::Right) { ' ' } else { '|' });
        }
        middle.push('\n');
        output.push_str(&middle);
    }
    output.push_str(&horizontal_walls(0, Direction::Down));
    output
}

impl fmt::Display for Maze {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", render_text(self, None))
    }
}

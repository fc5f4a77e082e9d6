//! **carved_mazes** generates perfect mazes by seeded randomised backtracking and
//! finds shortest paths through them.

pub mod cancellation;
pub mod cells;
pub mod errors;
pub mod events;
pub mod generators;
pub mod grid;
pub mod grid_displays;
pub mod pathing;
pub mod units;
mod utils;

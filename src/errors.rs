// Create the Error, ErrorKind, ResultExt, and Result types
// Result is a typedef of std `Result` with the error type our own `Error`
// Defines the From conversions that let `?` work for our `Error`.
// ResultExt adds the `chain_err` trait method.
use error_chain::*;

use crate::cells::Coordinate;

error_chain! {

    foreign_links {
        Io(::std::io::Error);
    }

    errors {
        InvalidDimensions(width: usize, height: usize) {
            description("invalid grid dimensions")
            display("invalid grid dimensions {}x{}, width and height must be at least 1", width, height)
        }
        CoordinateOutOfBounds(coord: Coordinate, width: usize, height: usize) {
            description("coordinate outside of the grid")
            display("coordinate ({}, {}) is outside of the {}x{} grid", coord.x, coord.z, width, height)
        }
        UndefinedDirection(bits: u8) {
            description("wall state is not a single direction")
            display("wall state {:#010b} does not name exactly one direction", bits)
        }
        ObserverFailed(reason: String) {
            description("generation observer failed")
            display("generation observer failed: {}", reason)
        }
        UnknownStrategy(name: String) {
            description("unknown path strategy")
            display("unknown path strategy '{}'", name)
        }
        GenerationPanicked {
            description("maze generation thread panicked")
            display("maze generation thread panicked")
        }
    }
}

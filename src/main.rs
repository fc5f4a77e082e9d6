use std::time::Duration;

use carved_mazes::{
    cancellation::CancellationToken,
    cells::Coordinate,
    errors::*,
    events::{GenerationEvents, GenerationStep},
    generators::{self, GenerationConfig},
    grid_displays::{self, PathDisplay, StartEndPointsDisplay},
    pathing::{self, Distances},
    units::{Height, Width},
};
use docopt::Docopt;
use log::info;
use serde::Deserialize;
use smallvec::smallvec;

const USAGE: &str = "Mazes

Usage:
    mazes_driver -h | --help
    mazes_driver [--width=<w>] [--height=<h>] [--seed=<n>] [--step-delay=<ms>] [--show-steps] [--strategy=<name>] [--start-x=<x> --start-z=<z>] [--end-x=<x> --end-z=<z>] [--show-distances]

Options:
    -h --help              Show this screen.
    --width=<w>            The grid width in a w*h grid [default: 10].
    --height=<h>           The grid height in a w*h grid [default: 10].
    --seed=<n>             Random seed, the same seed always carves the same maze [default: 1].
    --step-delay=<ms>      Milliseconds to pause after each carved passage [default: 0].
    --show-steps           Print the maze after every carved passage.
    --strategy=<name>      Path search strategy [default: bfs].
    --start-x=<x>          x coordinate of the path start.
    --start-z=<z>          z coordinate of the path start.
    --end-x=<x>            x coordinate of the path end.
    --end-z=<z>            z coordinate of the path end.
    --show-distances       Show the distance from the start point to all other cells instead of the path.
";

#[derive(Debug, Deserialize)]
struct MazeArgs {
    flag_width: usize,
    flag_height: usize,
    flag_seed: u64,
    flag_step_delay: u64,
    flag_show_steps: bool,
    flag_strategy: String,
    flag_start_x: Option<u32>,
    flag_start_z: Option<u32>,
    flag_end_x: Option<u32>,
    flag_end_z: Option<u32>,
    flag_show_distances: bool,
}

fn main() {
    env_logger::init();

    let args: MazeArgs = Docopt::new(USAGE)
        .and_then(|d| d.deserialize())
        .unwrap_or_else(|e| e.exit());

    if let Err(ref e) = run(&args) {
        eprintln!("error: {}", e);
        for cause in e.iter().skip(1) {
            eprintln!("caused by: {}", cause);
        }
        ::std::process::exit(1);
    }
}

fn run(args: &MazeArgs) -> Result<()> {
    let config = GenerationConfig::new(Width(args.flag_width), Height(args.flag_height), args.flag_seed)
        .with_step_delay(Duration::from_millis(args.flag_step_delay));
    let strategy = pathing::strategy_by_name(&args.flag_strategy)?;

    let mut events = GenerationEvents::new();
    if args.flag_show_steps {
        events.subscribe(print_step);
    }

    let outcome = generators::generate(&config, CancellationToken::new(), events)?.run();
    let maze = outcome.maze();
    info!("generated {:?} with seed {}", maze, config.seed);

    let start = Coordinate::new(args.flag_start_x.unwrap_or(0), args.flag_start_z.unwrap_or(0));
    let end = match (args.flag_end_x, args.flag_end_z) {
        (Some(x), Some(z)) => Coordinate::new(x, z),
        _ => Coordinate::new(maze.width() as u32 - 1, maze.height() as u32 - 1),
    };

    if args.flag_show_distances {
        let distances = Distances::for_maze(maze, start)
            .chain_err(|| "invalid start coordinate from which to show path distances")?;
        print!("{}", grid_displays::render_text(maze, Some(&distances)));
        return Ok(());
    }

    let path = strategy.find_path(maze, start, end)?;
    if path.is_empty() {
        println!("no path from {} to {}", start, end);
        let display = StartEndPointsDisplay::new(smallvec![start], smallvec![end]);
        print!("{}", grid_displays::render_text(maze, Some(&display)));
    } else {
        println!("{} path from {} to {}: {} steps", strategy.name(), start, end, path.len() - 1);
        print!("{}", grid_displays::render_text(maze, Some(&PathDisplay::new(&path))));
    }

    Ok(())
}

fn print_step(step: &GenerationStep) -> Result<()> {
    println!("step {}: carved into {}", step.index, step.current);
    print!("{}", step.maze);
    Ok(())
}

use std::path::PathBuf;

use crate::config::{load_simulation_config, run_duration, save_simulation_config, ConfigOverrides};
use crate::init::RunSettings;
use crate::output::dump::FrameDumpSettings;
use clap::Parser;
use shared::constants::{CONFIG_LOAD_ERROR, DEFAULT_DUMP_EVERY, DEFAULT_FRAME_RATE};

mod config;
mod init;
mod output;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// RON file with the simulation configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Overrides both grid dimensions
    #[arg(short, long)]
    grid_size: Option<usize>,

    /// Stop after this many seconds of wall-clock time
    #[arg(short, long)]
    duration: Option<f64>,

    /// Frames per second of the headless loop
    #[arg(short, long, default_value_t = DEFAULT_FRAME_RATE)]
    tick_rate: u32,

    #[arg(long)]
    dump_dir: Option<PathBuf>,

    #[arg(long, default_value_t = DEFAULT_DUMP_EVERY)]
    dump_every: u64,

    /// Append frame-rate averages to this file
    #[arg(long)]
    fps_log: Option<PathBuf>,

    /// 0 removes the cap
    #[arg(long)]
    max_ticks_per_frame: Option<u32>,

    /// Start with stepping disabled
    #[arg(long)]
    paused: bool,

    /// Write the effective configuration to this file and exit
    #[arg(long)]
    write_config: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();

    if let Some(size) = args.grid_size {
        if !(3..=8192).contains(&size) {
            eprintln!("Error: grid_size must be between 3 and 8192 (inclusive).");
            eprintln!("Got: {size}");
            eprintln!("Smaller grids cannot hold the pulse, larger ones would not fit in memory four times over.");
            std::process::exit(1);
        }
    }

    if args.tick_rate < 1 || args.tick_rate > 1000 {
        eprintln!("Error: tick_rate must be between 1 and 1000 (inclusive).");
        eprintln!("Got: {}", args.tick_rate);
        std::process::exit(1);
    }

    if args.dump_every < 1 {
        eprintln!("Error: dump_every must be at least 1.");
        std::process::exit(1);
    }

    let duration = match args.duration {
        Some(seconds) => match run_duration(seconds) {
            Some(duration) => Some(duration),
            None => {
                eprintln!("Error: duration must be a positive number of seconds.");
                eprintln!("Got: {seconds}");
                std::process::exit(1);
            }
        },
        None => None,
    };

    let overrides = ConfigOverrides {
        grid_size: args.grid_size,
        max_ticks_per_frame: args.max_ticks_per_frame,
    };

    if let Some(path) = args.write_config {
        let mut config = match load_simulation_config(args.config.as_deref()) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("{CONFIG_LOAD_ERROR}: {err}");
                std::process::exit(1);
            }
        };
        overrides.apply(&mut config);
        if let Err(err) = save_simulation_config(&config, &path) {
            eprintln!("Could not write {} : {err}", path.display());
            std::process::exit(1);
        }
        return;
    }

    init::init(
        RunSettings {
            frame_rate: args.tick_rate,
            duration,
            paused: args.paused,
            dump: args.dump_dir.map(|dir| FrameDumpSettings {
                dir,
                every: args.dump_every,
            }),
            fps_log: args.fps_log,
        },
        args.config,
        overrides,
    );
}

use crate::config::{load_simulation_config, ConfigOverrides};
use crate::output::{
    self, dump::FrameDumpSettings, frame_rate::FrameRateLog, setup_resources, RunLimit,
};
use bevy::prelude::*;
use bevy_app::ScheduleRunnerPlugin;
use bevy_log::{error, info};
use shared::constants::{CONFIG_LOAD_ERROR, DUMP_DIR_ERROR, GRID_ALLOCATION_ERROR};
use shared::{SimulationModes, SurfaceSimulation, SurfaceSimulationPlugin};
use std::path::PathBuf;
use std::time::Duration;

/// How the headless run is driven, as opposed to what is simulated.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub frame_rate: u32,
    pub duration: Option<Duration>,
    pub paused: bool,
    pub dump: Option<FrameDumpSettings>,
    pub fps_log: Option<PathBuf>,
}

pub fn init(settings: RunSettings, config_path: Option<PathBuf>, overrides: ConfigOverrides) {
    let mut app = App::new();
    app.add_plugins(
        MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
            1.0 / settings.frame_rate as f64,
        ))),
    );

    app.add_plugins(bevy_log::LogPlugin::default());

    let mut config = match load_simulation_config(config_path.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            error!("{} : {}", CONFIG_LOAD_ERROR, err);
            std::process::exit(1);
        }
    };
    overrides.apply(&mut config);

    let simulation = match SurfaceSimulation::new(&config) {
        Ok(simulation) => simulation,
        Err(err) => {
            error!(
                "{} ({}x{} cells) : {}",
                GRID_ALLOCATION_ERROR, config.grid_size_x, config.grid_size_y, err
            );
            std::process::exit(1);
        }
    };

    info!(
        "Starting surface simulation: {}x{} grid, step {}s, dt/dx {}, stage `{}`",
        config.grid_size_x,
        config.grid_size_y,
        config.params.time_step,
        config.params.dt_dx(),
        simulation.stage_name()
    );

    app.insert_resource(simulation);
    app.insert_resource(SimulationModes {
        stepping: !settings.paused,
        ..default()
    });
    app.add_plugins(SurfaceSimulationPlugin);

    setup_resources(&mut app);

    if let Some(dump) = settings.dump {
        if let Err(err) = std::fs::create_dir_all(&dump.dir) {
            error!("{} {} : {}", DUMP_DIR_ERROR, dump.dir.display(), err);
            std::process::exit(1);
        }
        info!(
            "Dumping frames to {} every {} ticks",
            dump.dir.display(),
            dump.every
        );
        app.insert_resource(dump);
    }

    if let Some(path) = settings.fps_log {
        app.insert_resource(FrameRateLog { path });
    }

    if let Some(duration) = settings.duration {
        app.insert_resource(RunLimit(duration));
    }

    output::register_systems(&mut app);

    app.run();
}

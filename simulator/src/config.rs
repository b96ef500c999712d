use bevy_log::info;
use ron::de::from_str;
use ron::ser::PrettyConfig;
use shared::SimulationConfig;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::time::Duration;

/// Command-line settings that take precedence over the configuration file.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigOverrides {
    pub grid_size: Option<usize>,
    /// 0 removes the per-frame tick cap.
    pub max_ticks_per_frame: Option<u32>,
}

impl ConfigOverrides {
    pub fn apply(&self, config: &mut SimulationConfig) {
        if let Some(size) = self.grid_size {
            config.grid_size_x = size;
            config.grid_size_y = size;
        }
        if let Some(max) = self.max_ticks_per_frame {
            config.max_ticks_per_frame = (max > 0).then_some(max);
        }
    }
}

/// Converts the `--duration` argument into a run limit. `None` for values
/// that are not a positive, representable number of seconds.
pub fn run_duration(seconds: f64) -> Option<Duration> {
    if !(seconds.is_finite() && seconds > 0.0) {
        return None;
    }
    Duration::try_from_secs_f64(seconds).ok()
}

pub fn load_simulation_config(
    path: Option<&Path>,
) -> Result<SimulationConfig, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        info!("No configuration file given, using default settings.");
        return Ok(SimulationConfig::default());
    };

    if !path.exists() {
        info!(
            "Configuration file not found: {}. Using default settings.",
            path.display()
        );
        return Ok(SimulationConfig::default());
    }

    let contents: String = fs::read_to_string(path)?;
    let config: SimulationConfig = from_str(&contents)?;

    info!("Found configuration file on disk: {}", path.display());

    Ok(config)
}

pub fn save_simulation_config(
    config: &SimulationConfig,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let pretty_config = PrettyConfig::new()
        .with_depth_limit(3)
        .with_separate_tuple_members(true);

    let serialized = ron::ser::to_string_pretty(config, pretty_config)?;
    let mut file = File::create(path)?;
    file.write_all(serialized.as_bytes())?;
    info!("Configuration saved to {}", path.display());
    Ok(())
}

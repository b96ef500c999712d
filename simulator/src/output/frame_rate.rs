use bevy::prelude::*;
use bevy_log::{error, info};
use shared::diagnostics::FrameRateSampler;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// File that receives one line per frame-rate average.
#[derive(Resource, Debug, Clone)]
pub struct FrameRateLog {
    pub path: PathBuf,
}

pub fn append_average(path: &Path, average: f32) -> Result<(), Box<dyn std::error::Error>> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{average:.2}")?;
    Ok(())
}

pub fn sample_frame_rate_system(
    time: Res<Time>,
    mut sampler: ResMut<FrameRateSampler>,
    log_file: Option<Res<FrameRateLog>>,
) {
    let Some(average) = sampler.record_frame(time.delta()) else {
        return;
    };

    info!("Average frame rate: {:.1} fps", average);

    if let Some(log_file) = log_file {
        if let Err(err) = append_average(&log_file.path, average) {
            error!(
                "Could not write frame rate to {} : {}",
                log_file.path.display(),
                err
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_averages_are_appended() {
        let path = std::env::temp_dir().join(format!("ripple-{}-fps.txt", std::process::id()));
        let _ = std::fs::remove_file(&path);

        append_average(&path, 59.94).unwrap();
        append_average(&path, 60.0).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(contents, "59.94\n60.00\n");
    }
}

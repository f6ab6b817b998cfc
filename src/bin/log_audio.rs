use std::env;
use std::path::PathBuf;

use burn::backend::ndarray::NdArrayDevice;
use burn::backend::NdArray;
use burn::config::Config;
use color_eyre::eyre::{eyre, WrapErr};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use separation_audio_log::util::sample_batch;
use separation_audio_log::{AudioLogger, AudioLoggerConfig, WavDirSink};

type B = NdArray;

// usage: log_audio <config.json> <out_dir>
fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = env::args().skip(1);
    let config_path = PathBuf::from(args.next().ok_or_else(|| eyre!("missing config path"))?);
    let out_dir = PathBuf::from(args.next().ok_or_else(|| eyre!("missing output directory"))?);

    let config = if config_path.exists() {
        AudioLoggerConfig::load(&config_path)
            .map_err(|err| eyre!("{err}"))
            .wrap_err_with(|| format!("reading {}", config_path.display()))?
    } else {
        warn!(path = %config_path.display(), "config not found, using defaults");
        AudioLoggerConfig::new()
    };

    let device = NdArrayDevice::Cpu;
    // one second per clip
    let num_samples = config.sample_rate as usize;
    let (predicted, target, mixture) =
        sample_batch::<B>(config.batch_size, config.source_count, num_samples, &device);

    let logger = AudioLogger::new(config)?;
    let mut sink = WavDirSink::new(&out_dir);

    logger.log_tensors(predicted, target, mixture, &mut sink, Some(0))?;

    info!(
        clips = logger.config().clips_per_batch(),
        out = %out_dir.display(),
        "done"
    );

    Ok(())
}

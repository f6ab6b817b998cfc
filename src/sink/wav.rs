use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::clip::Clip;
use crate::error::SinkError;
use crate::sink::AudioSink;

/// Writes clips as mono float WAV files, one directory per step.
///
/// Layout: `root/step_{step}/{name}.wav`, or `root/unstepped/{name}.wav`
/// when no step is given. Metadata goes to a `{name}.json` sidecar.
#[derive(Debug, Clone)]
pub struct WavDirSink {
    root: PathBuf,
}

impl WavDirSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn step_dir(&self, step: Option<u64>) -> PathBuf {
        match step {
            Some(step) => self.root.join(format!("step_{step}")),
            None => self.root.join("unstepped"),
        }
    }

    /// First free `name.wav`, `name_1.wav`, ... unless overwriting.
    fn target_stem(dir: &Path, name: &str, overwrite: bool) -> String {
        if overwrite || !dir.join(format!("{name}.wav")).exists() {
            return name.to_string();
        }

        (1..)
            .map(|n| format!("{name}_{n}"))
            .find(|stem| !dir.join(format!("{stem}.wav")).exists())
            .unwrap_or_else(|| name.to_string())
    }
}

fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) -> Result<(), SinkError> {
    let sample_rate = i32::try_from(sample_rate)
        .map_err(|_| SinkError::Encode(format!("sample rate {sample_rate} out of range")))?;

    wavers::write(path, samples, sample_rate, 1).map_err(|err| SinkError::Encode(err.to_string()))
}

impl AudioSink for WavDirSink {
    fn record_clip(&mut self, clip: Clip<'_>) -> Result<(), SinkError> {
        let dir = self.step_dir(clip.step);
        fs::create_dir_all(&dir)?;

        let stem = Self::target_stem(&dir, &clip.name, clip.overwrite);
        let path = dir.join(format!("{stem}.wav"));

        if clip.copy_to_tmp {
            let tmp = dir.join(format!(".{stem}.wav.tmp"));
            let written = write_wav(&tmp, &clip.samples, clip.sample_rate)
                .and_then(|()| fs::rename(&tmp, &path).map_err(SinkError::from));

            if let Err(err) = written {
                let _ = fs::remove_file(&tmp);
                return Err(err);
            }
        } else {
            write_wav(&path, &clip.samples, clip.sample_rate)?;
        }

        if let Some(metadata) = clip.metadata {
            let json = serde_json::to_string_pretty(metadata)
                .map_err(|err| SinkError::Encode(err.to_string()))?;
            fs::write(dir.join(format!("{stem}.json")), json)?;
        }

        debug!(path = %path.display(), samples = clip.samples.len(), "wrote clip");

        Ok(())
    }
}

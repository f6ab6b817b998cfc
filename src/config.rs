use std::collections::BTreeMap;

use burn::config::Config;

use crate::error::LogAudioError;

/// Settings shared by every clip an [`AudioLogger`](crate::AudioLogger) emits.
#[derive(Config, Debug)]
pub struct AudioLoggerConfig {
    /// Sample rate in Hz.
    #[config(default = 8000)]
    pub sample_rate: u32,
    /// Number of batch items to log per call.
    #[config(default = 4)]
    pub batch_size: usize,
    /// Number of separated sources per batch item.
    #[config(default = 2)]
    pub source_count: usize,
    /// Replace an existing clip of the same name instead of keeping both.
    #[config(default = false)]
    pub overwrite: bool,
    /// Stage each clip in a temporary file before it is stored.
    #[config(default = true)]
    pub copy_to_tmp: bool,
    /// Attached verbatim to every clip.
    pub metadata: Option<BTreeMap<String, String>>,
}

impl AudioLoggerConfig {
    pub fn validate(&self) -> Result<(), LogAudioError> {
        let fields = [
            ("sample_rate", self.sample_rate as usize),
            ("batch_size", self.batch_size),
            ("source_count", self.source_count),
        ];

        match fields.iter().find(|(_, value)| *value == 0) {
            Some((name, _)) => Err(LogAudioError::InvalidConfig(format!(
                "{name} must be positive"
            ))),
            None => Ok(()),
        }
    }

    /// Sink calls issued by one `log_batch`.
    pub fn clips_per_batch(&self) -> usize {
        self.batch_size * (1 + 2 * self.source_count)
    }
}

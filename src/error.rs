use thiserror::Error;

/// Failure reported by an [`AudioSink`](crate::sink::AudioSink).
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode clip: {0}")]
    Encode(String),

    #[error("clip rejected: {0}")]
    Rejected(String),
}

#[derive(Debug, Error)]
pub enum LogAudioError {
    #[error("invalid logger config: {0}")]
    InvalidConfig(String),

    #[error("{array} batch has {actual} items, logger is configured for {expected}")]
    BatchOutOfRange {
        array: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{array} batch has {actual} sources, logger is configured for {expected}")]
    SourceOutOfRange {
        array: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("mixture batch must have a single channel, got {0}")]
    MixtureChannels(usize),

    #[error("failed to read tensor data to host: {0}")]
    Materialize(String),

    #[error("sink failed on clip `{clip}`")]
    Sink {
        clip: String,
        #[source]
        source: SinkError,
    },
}

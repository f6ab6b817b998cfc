pub mod clip;
pub mod config;
pub mod error;
pub mod host;
pub mod logger;
pub mod sink;
pub mod util;

pub use clip::{Clip, ClipName, ClipRole};
pub use config::AudioLoggerConfig;
pub use error::{LogAudioError, SinkError};
pub use logger::AudioLogger;
pub use sink::{AudioSink, MemorySink, WavDirSink};

pub mod memory;
pub mod wav;

pub use memory::{MemorySink, RecordedClip};
pub use wav::WavDirSink;

use crate::clip::Clip;
use crate::error::SinkError;

/// Destination for logged clips, typically an experiment tracker.
///
/// Calls are blocking and made in a fixed order; an error aborts the rest of
/// the batch.
pub trait AudioSink {
    fn record_clip(&mut self, clip: Clip<'_>) -> Result<(), SinkError>;
}

impl<S: AudioSink + ?Sized> AudioSink for &mut S {
    fn record_clip(&mut self, clip: Clip<'_>) -> Result<(), SinkError> {
        (**self).record_clip(clip)
    }
}

impl<S: AudioSink + ?Sized> AudioSink for Box<S> {
    fn record_clip(&mut self, clip: Clip<'_>) -> Result<(), SinkError> {
        (**self).record_clip(clip)
    }
}

use std::collections::BTreeMap;

use itertools::Itertools;

use crate::clip::Clip;
use crate::error::SinkError;
use crate::sink::AudioSink;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedClip {
    pub name: String,
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub step: Option<u64>,
    pub metadata: Option<BTreeMap<String, String>>,
}

/// Keeps every clip in call order.
#[derive(Debug, Default)]
pub struct MemorySink {
    clips: Vec<RecordedClip>,
    capacity: Option<usize>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts `accepted` clips, then rejects every following one.
    pub fn failing_after(accepted: usize) -> Self {
        Self {
            clips: Vec::new(),
            capacity: Some(accepted),
        }
    }

    pub fn clips(&self) -> &[RecordedClip] {
        &self.clips
    }

    pub fn names(&self) -> Vec<&str> {
        self.clips.iter().map(|clip| clip.name.as_str()).collect_vec()
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    pub fn clear(&mut self) {
        self.clips.clear();
    }
}

impl AudioSink for MemorySink {
    fn record_clip(&mut self, clip: Clip<'_>) -> Result<(), SinkError> {
        if self.capacity.is_some_and(|capacity| self.clips.len() >= capacity) {
            return Err(SinkError::Rejected(format!("{} refused", clip.name)));
        }

        self.clips.push(RecordedClip {
            name: clip.name,
            samples: clip.samples.into_owned(),
            sample_rate: clip.sample_rate,
            step: clip.step,
            metadata: clip.metadata.cloned(),
        });

        Ok(())
    }
}

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

/// What a clip holds relative to the separation task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipRole {
    Mixture,
    True { source: usize },
    Estimated { source: usize },
}

/// Name of a clip, built from zero-based indices and rendered one-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipName {
    pub batch_idx: usize,
    pub role: ClipRole,
}

impl ClipName {
    pub fn mixture(batch_idx: usize) -> Self {
        Self {
            batch_idx,
            role: ClipRole::Mixture,
        }
    }

    pub fn true_source(batch_idx: usize, source: usize) -> Self {
        Self {
            batch_idx,
            role: ClipRole::True { source },
        }
    }

    pub fn estimated_source(batch_idx: usize, source: usize) -> Self {
        Self {
            batch_idx,
            role: ClipRole::Estimated { source },
        }
    }
}

impl fmt::Display for ClipName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let batch = self.batch_idx + 1;

        match self.role {
            ClipRole::Mixture => write!(f, "batch_{batch}_mixture"),
            ClipRole::True { source } => write!(f, "batch_{batch}_source_{}_true", source + 1),
            ClipRole::Estimated { source } => write!(f, "batch_{batch}_source_{}_est", source + 1),
        }
    }
}

/// One single-channel clip handed to a sink. Only valid for the duration of the call.
#[derive(Debug, Clone)]
pub struct Clip<'a> {
    pub name: String,
    pub samples: Cow<'a, [f32]>,
    pub sample_rate: u32,
    pub step: Option<u64>,
    pub metadata: Option<&'a BTreeMap<String, String>>,
    pub overwrite: bool,
    pub copy_to_tmp: bool,
}

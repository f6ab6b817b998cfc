use burn::prelude::{Backend, Tensor};
use ndarray::{s, ArrayView1, ArrayView3};
use tracing::{debug, info, warn};

use crate::clip::{Clip, ClipName};
use crate::config::AudioLoggerConfig;
use crate::error::LogAudioError;
use crate::host::{host_samples, materialize};
use crate::sink::AudioSink;

/// Forwards mixtures, targets and estimates of a separation batch to a sink,
/// one named clip per batch item and source.
#[derive(Debug, Clone)]
pub struct AudioLogger {
    config: AudioLoggerConfig,
}

impl AudioLogger {
    pub fn new(config: AudioLoggerConfig) -> Result<Self, LogAudioError> {
        config.validate()?;

        Ok(Self { config })
    }

    /// Skips validation. A zero batch size makes `log_batch` a no-op.
    pub fn unchecked(config: AudioLoggerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AudioLoggerConfig {
        &self.config
    }

    /// Logs `batch_size` items, each as the mixture followed by the true and
    /// estimated clip of every source.
    ///
    /// `predicted` and `target` are `[batch, sources, samples]`, `mixture` is
    /// `[batch, 1, samples]`. Shapes are checked before the first sink call.
    pub fn log_batch<S: AudioSink>(
        &self,
        predicted: ArrayView3<'_, f32>,
        target: ArrayView3<'_, f32>,
        mixture: ArrayView3<'_, f32>,
        sink: &mut S,
        step: Option<u64>,
    ) -> Result<(), LogAudioError> {
        self.check_shapes(&predicted, &target, &mixture)?;

        info!(
            batch_size = self.config.batch_size,
            sources = self.config.source_count,
            ?step,
            "logging audio"
        );

        for batch_idx in 0..self.config.batch_size {
            self.emit(sink, ClipName::mixture(batch_idx), mixture.slice(s![batch_idx, 0, ..]), step)?;

            for source in 0..self.config.source_count {
                self.emit(
                    sink,
                    ClipName::true_source(batch_idx, source),
                    target.slice(s![batch_idx, source, ..]),
                    step,
                )?;
                self.emit(
                    sink,
                    ClipName::estimated_source(batch_idx, source),
                    predicted.slice(s![batch_idx, source, ..]),
                    step,
                )?;
            }
        }

        Ok(())
    }

    /// Same as [`log_batch`](Self::log_batch) for tensors on any backend.
    /// Each tensor is read back to host memory once.
    pub fn log_tensors<B: Backend, S: AudioSink>(
        &self,
        predicted: Tensor<B, 3>,
        target: Tensor<B, 3>,
        mixture: Tensor<B, 3>,
        sink: &mut S,
        step: Option<u64>,
    ) -> Result<(), LogAudioError> {
        let predicted = materialize(predicted)?;
        let target = materialize(target)?;
        let mixture = materialize(mixture)?;

        self.log_batch(predicted.view(), target.view(), mixture.view(), sink, step)
    }

    fn check_shapes(
        &self,
        predicted: &ArrayView3<'_, f32>,
        target: &ArrayView3<'_, f32>,
        mixture: &ArrayView3<'_, f32>,
    ) -> Result<(), LogAudioError> {
        let batch_size = self.config.batch_size;
        let source_count = self.config.source_count;

        if batch_size == 0 {
            return Ok(());
        }

        let dims = [
            ("predicted", predicted.dim()),
            ("target", target.dim()),
            ("mixture", mixture.dim()),
        ];

        for (array, (actual, _, _)) in dims {
            if actual < batch_size {
                return Err(LogAudioError::BatchOutOfRange {
                    array,
                    expected: batch_size,
                    actual,
                });
            }
        }

        for &(array, (_, actual, _)) in &dims[..2] {
            if actual < source_count {
                return Err(LogAudioError::SourceOutOfRange {
                    array,
                    expected: source_count,
                    actual,
                });
            }
        }

        match mixture.dim().1 {
            1 => Ok(()),
            channels => Err(LogAudioError::MixtureChannels(channels)),
        }
    }

    fn emit<S: AudioSink>(
        &self,
        sink: &mut S,
        name: ClipName,
        samples: ArrayView1<'_, f32>,
        step: Option<u64>,
    ) -> Result<(), LogAudioError> {
        let name = name.to_string();
        debug!(clip = %name, samples = samples.len(), "recording clip");

        let clip = Clip {
            name: name.clone(),
            samples: host_samples(samples),
            sample_rate: self.config.sample_rate,
            step,
            metadata: self.config.metadata.as_ref(),
            overwrite: self.config.overwrite,
            copy_to_tmp: self.config.copy_to_tmp,
        };

        sink.record_clip(clip).map_err(|source| {
            warn!(clip = %name, error = %source, "sink rejected clip");
            LogAudioError::Sink { clip: name, source }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use burn::backend::ndarray::NdArrayDevice;
    use burn::backend::NdArray;
    use burn::tensor::TensorData;
    use itertools::Itertools;
    use ndarray::Array3;

    use super::*;
    use crate::sink::MemorySink;
    use crate::util::{sample_batch, separation_batch};

    fn logger(batch_size: usize, source_count: usize) -> AudioLogger {
        AudioLogger::new(
            AudioLoggerConfig::new()
                .with_batch_size(batch_size)
                .with_source_count(source_count),
        )
        .unwrap()
    }

    fn expected_names(batch_size: usize, source_count: usize) -> Vec<String> {
        (1..=batch_size)
            .flat_map(|b| {
                std::iter::once(format!("batch_{b}_mixture")).chain((1..=source_count).flat_map(move |s| {
                    [format!("batch_{b}_source_{s}_true"), format!("batch_{b}_source_{s}_est")]
                }))
            })
            .collect_vec()
    }

    #[test]
    fn two_items_one_source() {
        let (predicted, target, mixture) = separation_batch(2, 1, 32);
        let mut sink = MemorySink::new();

        logger(2, 1)
            .log_batch(predicted.view(), target.view(), mixture.view(), &mut sink, Some(10))
            .unwrap();

        assert_eq!(
            sink.names(),
            vec![
                "batch_1_mixture",
                "batch_1_source_1_true",
                "batch_1_source_1_est",
                "batch_2_mixture",
                "batch_2_source_1_true",
                "batch_2_source_1_est",
            ]
        );
    }

    #[test]
    fn call_count_and_order_follow_config() {
        for (batch_size, source_count) in [(1, 1), (4, 2), (3, 4)] {
            let (predicted, target, mixture) = separation_batch(batch_size, source_count, 16);
            let mut sink = MemorySink::new();

            logger(batch_size, source_count)
                .log_batch(predicted.view(), target.view(), mixture.view(), &mut sink, None)
                .unwrap();

            assert_eq!(sink.len(), batch_size * (1 + 2 * source_count));
            assert_eq!(sink.names(), expected_names(batch_size, source_count));
        }
    }

    #[test]
    fn sample_rate_and_step_are_forwarded() {
        let (predicted, target, mixture) = separation_batch(2, 2, 8);
        let logger = AudioLogger::new(AudioLoggerConfig::new().with_batch_size(2).with_sample_rate(16_000)).unwrap();
        let mut sink = MemorySink::new();

        logger
            .log_batch(predicted.view(), target.view(), mixture.view(), &mut sink, Some(4200))
            .unwrap();
        logger
            .log_batch(predicted.view(), target.view(), mixture.view(), &mut sink, None)
            .unwrap();

        let (first, second) = sink.clips().split_at(10);
        assert!(first.iter().all(|clip| clip.sample_rate == 16_000 && clip.step == Some(4200)));
        assert!(second.iter().all(|clip| clip.sample_rate == 16_000 && clip.step.is_none()));
    }

    #[test]
    fn clips_select_their_own_source() {
        let (predicted, target, mixture) = separation_batch(2, 3, 5);
        let mut sink = MemorySink::new();

        logger(2, 3)
            .log_batch(predicted.view(), target.view(), mixture.view(), &mut sink, None)
            .unwrap();

        let by_name = sink.clips().iter().map(|clip| (clip.name.as_str(), &clip.samples)).collect::<BTreeMap<_, _>>();

        assert_eq!(by_name["batch_2_mixture"], &mixture.slice(s![1, 0, ..]).to_vec());
        assert_eq!(by_name["batch_1_source_3_true"], &target.slice(s![0, 2, ..]).to_vec());
        assert_eq!(by_name["batch_2_source_2_est"], &predicted.slice(s![1, 1, ..]).to_vec());
        assert_ne!(by_name["batch_1_source_1_true"], by_name["batch_1_source_2_true"]);
    }

    #[test]
    fn ignores_items_and_sources_beyond_config() {
        let (predicted, target, mixture) = separation_batch(5, 3, 8);
        let mut sink = MemorySink::new();

        logger(2, 1)
            .log_batch(predicted.view(), target.view(), mixture.view(), &mut sink, None)
            .unwrap();

        assert_eq!(sink.names(), expected_names(2, 1));
    }

    #[test]
    fn short_batch_fails_before_any_clip() {
        let (predicted, target, mixture) = separation_batch(3, 2, 8);
        let mut sink = MemorySink::new();

        let err = logger(4, 2)
            .log_batch(predicted.view(), target.view(), mixture.view(), &mut sink, None)
            .unwrap_err();

        assert!(matches!(
            err,
            LogAudioError::BatchOutOfRange {
                expected: 4,
                actual: 3,
                ..
            }
        ));
        assert!(sink.is_empty());
    }

    #[test]
    fn missing_sources_are_out_of_range() {
        let (_, target, mixture) = separation_batch(2, 2, 8);
        let predicted = Array3::<f32>::zeros((2, 1, 8));
        let mut sink = MemorySink::new();

        let err = logger(2, 2)
            .log_batch(predicted.view(), target.view(), mixture.view(), &mut sink, None)
            .unwrap_err();

        assert!(matches!(
            err,
            LogAudioError::SourceOutOfRange {
                array: "predicted",
                expected: 2,
                actual: 1,
            }
        ));
        assert!(sink.is_empty());
    }

    #[test]
    fn views_of_separate_buffers_are_checked() {
        let (_, target, _) = separation_batch(2, 2, 8);
        let mut sink = MemorySink::new();

        let mixture = {
            let (_, _, wide) = separation_batch(3, 2, 8);
            wide
        };
        let predicted = Array3::<f32>::zeros((4, 3, 8));

        logger(2, 2)
            .log_batch(
                predicted.slice(s![1.., ..2, ..]),
                target.view(),
                mixture.slice(s![..2, .., ..]),
                &mut sink,
                None,
            )
            .unwrap();

        assert_eq!(sink.len(), 10);
        assert_eq!(sink.clips()[2].samples, vec![0.0; 8]);
    }

    #[test]
    fn stereo_mixture_is_rejected() {
        let (predicted, target, _) = separation_batch(1, 2, 8);
        let mixture = Array3::<f32>::zeros((1, 2, 8));
        let mut sink = MemorySink::new();

        let err = logger(1, 2)
            .log_batch(predicted.view(), target.view(), mixture.view(), &mut sink, None)
            .unwrap_err();

        assert!(matches!(err, LogAudioError::MixtureChannels(2)));
    }

    #[test]
    fn zero_batch_size_is_a_no_op() {
        assert!(AudioLogger::new(AudioLoggerConfig::new().with_batch_size(0)).is_err());

        let logger = AudioLogger::unchecked(AudioLoggerConfig::new().with_batch_size(0));
        let empty = Array3::<f32>::zeros((0, 0, 0));
        let mut sink = MemorySink::new();

        logger
            .log_batch(empty.view(), empty.view(), empty.view(), &mut sink, Some(1))
            .unwrap();

        assert!(sink.is_empty());
    }

    #[test]
    fn sink_failure_aborts_remaining_clips() {
        let (predicted, target, mixture) = separation_batch(2, 2, 8);
        let mut sink = MemorySink::failing_after(3);

        let err = logger(2, 2)
            .log_batch(predicted.view(), target.view(), mixture.view(), &mut sink, None)
            .unwrap_err();

        match err {
            LogAudioError::Sink { clip, .. } => assert_eq!(clip, "batch_1_source_2_true"),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(sink.names(), vec!["batch_1_mixture", "batch_1_source_1_true", "batch_1_source_1_est"]);
    }

    #[test]
    fn metadata_is_attached_to_every_clip() {
        let (predicted, target, mixture) = separation_batch(1, 1, 4);
        let mut metadata = BTreeMap::new();
        metadata.insert("epoch".to_string(), "3".to_string());

        let logger = AudioLogger::new(
            AudioLoggerConfig::new()
                .with_batch_size(1)
                .with_source_count(1)
                .with_metadata(Some(metadata.clone())),
        )
        .unwrap();
        let mut sink = MemorySink::new();

        logger
            .log_batch(predicted.view(), target.view(), mixture.view(), &mut sink, None)
            .unwrap();

        assert!(sink.clips().iter().all(|clip| clip.metadata.as_ref() == Some(&metadata)));
    }

    #[test]
    fn tensors_are_logged_from_host_copies() {
        let device = NdArrayDevice::Cpu;
        let (predicted, target, mixture) = sample_batch::<NdArray>(2, 2, 16, &device);
        let expected_mixture = materialize(mixture.clone()).unwrap();
        let expected_predicted = materialize(predicted.clone()).unwrap();
        let mut sink = MemorySink::new();

        logger(2, 2).log_tensors(predicted, target, mixture, &mut sink, Some(1)).unwrap();

        assert_eq!(sink.len(), 10);
        assert_eq!(sink.clips()[5].name, "batch_2_mixture");
        assert_eq!(sink.clips()[5].samples, expected_mixture.slice(s![1, 0, ..]).to_vec());
        assert_eq!(sink.clips()[9].name, "batch_2_source_2_est");
        assert_eq!(sink.clips()[9].samples, expected_predicted.slice(s![1, 1, ..]).to_vec());
    }

    #[test]
    fn short_tensor_batch_is_out_of_range() {
        let device = NdArrayDevice::Cpu;
        let tensor = |b: usize, c: usize| {
            Tensor::<NdArray, 3>::from_data(TensorData::new(vec![0.0f32; b * c * 4], [b, c, 4]), &device)
        };
        let mut sink = MemorySink::new();

        let err = logger(2, 2)
            .log_tensors(tensor(2, 2), tensor(1, 2), tensor(2, 1), &mut sink, None)
            .unwrap_err();

        assert!(matches!(err, LogAudioError::BatchOutOfRange { array: "target", .. }));
        assert!(sink.is_empty());
    }
}

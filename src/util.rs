use std::f32::consts::TAU;

use burn::prelude::{Backend, Tensor};
use burn::tensor::TensorData;
use itertools::Itertools;
use ndarray::{Array3, Axis};
use rand::{thread_rng, Rng};

pub fn sine(freq: f32, sample_rate: u32, len: usize) -> Vec<f32> {
    (0..len)
        .map(|t| (TAU * freq * t as f32 / sample_rate as f32).sin())
        .collect_vec()
}

pub(crate) fn sample_sequence(len: usize) -> Vec<f32> {
    thread_rng()
        .sample_iter(rand::distributions::Uniform::new(-1.0, 1.0))
        .take(len)
        .collect_vec()
}

fn tensor_from_vec<B: Backend>(values: Vec<f32>, shape: [usize; 3], device: &B::Device) -> Tensor<B, 3> {
    Tensor::from_data(TensorData::new(values, shape), device)
}

/// Random `(predicted, target, mixture)` tensors; the mixture is the sum of the targets.
pub fn sample_batch<B: Backend>(
    batch_size: usize,
    source_count: usize,
    num_samples: usize,
    device: &B::Device,
) -> (Tensor<B, 3>, Tensor<B, 3>, Tensor<B, 3>) {
    let shape = [batch_size, source_count, num_samples];
    let numel = batch_size * source_count * num_samples;

    let target = tensor_from_vec::<B>(sample_sequence(numel), shape, device);
    let noise = tensor_from_vec::<B>(sample_sequence(numel), shape, device);
    let predicted = target.clone() + noise * 0.1;
    let mixture = target.clone().sum_dim(1);

    (predicted, target, mixture)
}

/// Deterministic `(predicted, target, mixture)` arrays of tones, one frequency per
/// batch item and source, so every clip differs.
pub fn separation_batch(
    batch_size: usize,
    source_count: usize,
    num_samples: usize,
) -> (Array3<f32>, Array3<f32>, Array3<f32>) {
    let sample_rate = 8000;

    let mut target = Array3::<f32>::zeros((batch_size, source_count, num_samples));
    for ((b, s), mut row) in (0..batch_size)
        .cartesian_product(0..source_count)
        .zip(target.lanes_mut(Axis(2)))
    {
        let freq = 110.0 * (1 + b * source_count + s) as f32;
        row.assign(&ndarray::Array1::from(sine(freq, sample_rate, num_samples)));
    }

    let predicted = target.mapv(|v| 0.9 * v);
    let mixture = target.sum_axis(Axis(1)).insert_axis(Axis(1));

    (predicted, target, mixture)
}

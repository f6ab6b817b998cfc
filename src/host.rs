use std::borrow::Cow;

use burn::prelude::{Backend, Tensor};
use ndarray::{Array3, ArrayView1};

use crate::error::LogAudioError;

/// Reads a `[batch, channels, samples]` tensor back to host memory as `f32`.
pub fn materialize<B: Backend>(tensor: Tensor<B, 3>) -> Result<Array3<f32>, LogAudioError> {
    let [batch, channels, samples] = tensor.dims();

    let values = tensor
        .into_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .map_err(|err| LogAudioError::Materialize(format!("{err:?}")))?;

    Array3::from_shape_vec((batch, channels, samples), values)
        .map_err(|err| LogAudioError::Materialize(err.to_string()))
}

/// Contiguous sample buffer for one clip; strided views are copied.
pub fn host_samples(view: ArrayView1<'_, f32>) -> Cow<'_, [f32]> {
    match view.to_slice() {
        Some(samples) => Cow::Borrowed(samples),
        None => Cow::Owned(view.to_vec()),
    }
}

use candle_core::{DType, Device, Tensor, Var};
use candle_nn::{Linear, Module, VarBuilder, VarMap};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::Rng;

use crate::error::{ClassifierError, Result};

/// Width of every hidden layer.
pub const HIDDEN_WIDTH: usize = 32;

/// Layer names and their `(fan_in, fan_out)`.
fn layer_shapes(input_size: usize) -> [(&'static str, usize, usize); 4] {
    [
        ("fc1", input_size, HIDDEN_WIDTH),
        ("fc2", HIDDEN_WIDTH, HIDDEN_WIDTH),
        ("fc3", HIDDEN_WIDTH, HIDDEN_WIDTH),
        ("fc4", HIDDEN_WIDTH, 1),
    ]
}

/// Fills `var_map` with freshly initialised parameters for a network on `input_size` features.
///
/// Weights and biases are drawn from `U(-1/sqrt(fan_in), 1/sqrt(fan_in))` using
/// `rng`, so the same seed always produces the same starting point.
pub fn init_parameters(
    var_map: &mut VarMap,
    input_size: usize,
    rng: &mut StdRng,
    device: &Device,
) -> Result<()> {
    let mut ws = var_map.data().lock().map_err(|e| {
        ClassifierError::Tensor(candle_core::Error::Msg(format!(
            "parameter store is poisoned: {}",
            e
        )))
    })?;

    for (name, fan_in, fan_out) in layer_shapes(input_size) {
        let bound = 1.0 / (fan_in.max(1) as f32).sqrt();
        let weight: Vec<f32> = (0..fan_in * fan_out)
            .map(|_| rng.gen_range(-bound..=bound))
            .collect();
        let bias: Vec<f32> = (0..fan_out).map(|_| rng.gen_range(-bound..=bound)).collect();

        let weight = Tensor::from_vec(weight, (fan_out, fan_in), device)?;
        let bias = Tensor::from_vec(bias, fan_out, device)?;
        ws.insert(format!("{}.weight", name), Var::from_tensor(&weight)?);
        ws.insert(format!("{}.bias", name), Var::from_tensor(&bias)?);
    }

    Ok(())
}

/// Three hidden ReLU layers followed by a single logit.
#[derive(Debug, Clone)]
pub struct FeedForwardNet {
    fc1: Linear,
    fc2: Linear,
    fc3: Linear,
    fc4: Linear,
    input_size: usize,
}

impl FeedForwardNet {
    pub fn new(input_size: usize, vb: VarBuilder) -> Result<Self> {
        Ok(Self {
            fc1: candle_nn::linear(input_size, HIDDEN_WIDTH, vb.pp("fc1"))?,
            fc2: candle_nn::linear(HIDDEN_WIDTH, HIDDEN_WIDTH, vb.pp("fc2"))?,
            fc3: candle_nn::linear(HIDDEN_WIDTH, HIDDEN_WIDTH, vb.pp("fc3"))?,
            fc4: candle_nn::linear(HIDDEN_WIDTH, 1, vb.pp("fc4"))?,
            input_size,
        })
    }

    /// Initialise a fresh parameter set and build the network on top of it.
    pub fn initialise(input_size: usize, rng: &mut StdRng, device: &Device) -> Result<(Self, VarMap)> {
        let mut var_map = VarMap::new();
        init_parameters(&mut var_map, input_size, rng, device)?;
        let vb = VarBuilder::from_varmap(&var_map, DType::F32, device);
        let net = Self::new(input_size, vb)?;
        Ok((net, var_map))
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }
}

impl Module for FeedForwardNet {
    /// `(batch, input_size)` to `(batch,)` logits.
    fn forward(&self, xs: &Tensor) -> candle_core::Result<Tensor> {
        let xs = self.fc1.forward(xs)?.relu()?;
        let xs = self.fc2.forward(&xs)?.relu()?;
        let xs = self.fc3.forward(&xs)?.relu()?;
        self.fc4.forward(&xs)?.squeeze(1)
    }
}

/// Copy a sample matrix into a `(rows, cols)` tensor.
pub fn to_tensor(x: &Array2<f32>, device: &Device) -> Result<Tensor> {
    let data: Vec<f32> = x.iter().copied().collect();
    Ok(Tensor::from_vec(data, (x.nrows(), x.ncols()), device)?)
}

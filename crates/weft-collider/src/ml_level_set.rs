//! Level set represented by a small fully connected network.
//!
//! The network maps a point normalized to `[-1, 1]³` over the training
//! box to a signed distance (scaled by `output_scale`). Outside the box
//! the network is evaluated at the clamped point, floored at zero, and
//! the box distance is added. The shape never extends past its training
//! box, so a bounds early-out sees the same surface as a direct query.

use serde::{Deserialize, Serialize};

use glam::Vec3;
use weft_math::geometry::normalize_or;
use weft_math::Aabb;
use weft_types::{WeftError, WeftResult};

use crate::query::ColliderQuery;

/// Widest hidden layer supported by the stack evaluation buffers.
pub const MAX_LAYER_WIDTH: usize = 256;

/// Relative step of the finite-difference gradient.
const GRADIENT_STEP: f32 = 1.0e-3;

/// Per-neuron nonlinearity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Activation {
    Linear,
    Relu,
    Tanh,
}

impl Activation {
    #[inline]
    fn apply(self, x: f32) -> f32 {
        match self {
            Activation::Linear => x,
            Activation::Relu => x.max(0.0),
            Activation::Tanh => x.tanh(),
        }
    }
}

/// One dense layer: `out = act(W · in + b)` with `W` row-major `outputs × inputs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseLayer {
    weights: Vec<f32>,
    biases: Vec<f32>,
    inputs: usize,
    activation: Activation,
}

impl DenseLayer {
    pub fn new(inputs: usize, weights: Vec<f32>, biases: Vec<f32>, activation: Activation) -> WeftResult<Self> {
        let outputs = biases.len();
        if inputs == 0 || outputs == 0 {
            return Err(WeftError::InvalidShape("dense layer must have inputs and outputs".into()));
        }
        if inputs > MAX_LAYER_WIDTH || outputs > MAX_LAYER_WIDTH {
            return Err(WeftError::InvalidShape(format!(
                "dense layer {inputs}x{outputs} exceeds the maximum width {MAX_LAYER_WIDTH}"
            )));
        }
        if weights.len() != inputs * outputs {
            return Err(WeftError::InvalidShape(format!(
                "dense layer expects {} weights, got {}",
                inputs * outputs,
                weights.len()
            )));
        }
        if weights.iter().chain(biases.iter()).any(|v| !v.is_finite()) {
            return Err(WeftError::InvalidShape("dense layer parameters must be finite".into()));
        }
        Ok(Self {
            weights,
            biases,
            inputs,
            activation,
        })
    }

    pub fn inputs(&self) -> usize {
        self.inputs
    }

    pub fn outputs(&self) -> usize {
        self.biases.len()
    }

    fn forward(&self, input: &[f32], output: &mut [f32]) {
        for (row, (out, bias)) in output.iter_mut().zip(&self.biases).enumerate() {
            let w = &self.weights[row * self.inputs..(row + 1) * self.inputs];
            let sum: f32 = w.iter().zip(input).map(|(a, b)| a * b).sum();
            *out = self.activation.apply(sum + bias);
        }
    }
}

/// A neural signed distance field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlLevelSet {
    layers: Vec<DenseLayer>,
    training_bounds: Aabb,
    output_scale: f32,
}

impl MlLevelSet {
    /// Creates a network level set.
    ///
    /// The first layer must take 3 inputs, the last must produce 1
    /// output, and consecutive layer widths must agree.
    pub fn new(layers: Vec<DenseLayer>, training_bounds: Aabb, output_scale: f32) -> WeftResult<Self> {
        let (first, last) = match (layers.first(), layers.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(WeftError::InvalidShape("network needs at least one layer".into())),
        };
        if first.inputs() != 3 {
            return Err(WeftError::InvalidShape(format!(
                "network input width must be 3, got {}",
                first.inputs()
            )));
        }
        if last.outputs() != 1 {
            return Err(WeftError::InvalidShape(format!(
                "network output width must be 1, got {}",
                last.outputs()
            )));
        }
        if let Some(pair) = layers.windows(2).find(|pair| pair[0].outputs() != pair[1].inputs()) {
            return Err(WeftError::InvalidShape(format!(
                "layer width mismatch: {} outputs feed {} inputs",
                pair[0].outputs(),
                pair[1].inputs()
            )));
        }
        if training_bounds.extents().cmple(Vec3::ZERO).any() {
            return Err(WeftError::InvalidShape("training bounds must have positive extents".into()));
        }
        if output_scale <= 0.0 || !output_scale.is_finite() {
            return Err(WeftError::InvalidShape(format!(
                "output scale must be positive, got {output_scale}"
            )));
        }
        Ok(Self {
            layers,
            training_bounds,
            output_scale,
        })
    }

    pub fn training_bounds(&self) -> Aabb {
        self.training_bounds
    }

    /// Raw network distance at a point inside the training box.
    fn evaluate(&self, p: Vec3) -> f32 {
        let normalized = 2.0 * (p - self.training_bounds.min) / self.training_bounds.extents() - Vec3::ONE;

        let mut front = [0.0f32; MAX_LAYER_WIDTH];
        let mut back = [0.0f32; MAX_LAYER_WIDTH];
        front[..3].copy_from_slice(&normalized.to_array());
        let mut width = 3;
        for layer in &self.layers {
            let outputs = layer.outputs();
            layer.forward(&front[..width], &mut back[..outputs]);
            std::mem::swap(&mut front, &mut back);
            width = outputs;
        }
        front[0] * self.output_scale
    }

    fn distance(&self, local: Vec3) -> f32 {
        let clamped = self.training_bounds.clamp(local);
        let outside = (local - clamped).length();
        if outside > 0.0 {
            self.evaluate(clamped).max(0.0) + outside
        } else {
            self.evaluate(clamped)
        }
    }
}

impl ColliderQuery for MlLevelSet {
    fn phi_with_normal(&self, local: Vec3) -> (f32, Vec3) {
        let phi = self.distance(local);
        let h = GRADIENT_STEP * self.training_bounds.extents().max_element();
        let dx = Vec3::new(h, 0.0, 0.0);
        let dy = Vec3::new(0.0, h, 0.0);
        let dz = Vec3::new(0.0, 0.0, h);
        let gradient = Vec3::new(
            self.distance(local + dx) - self.distance(local - dx),
            self.distance(local + dy) - self.distance(local - dy),
            self.distance(local + dz) - self.distance(local - dz),
        );
        (phi, normalize_or(gradient, Vec3::Z))
    }

    fn local_bounds(&self) -> Aabb {
        self.training_bounds
    }
}

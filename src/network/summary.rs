use serde::{Serialize, Deserialize};
use std::fmt;

use crate::activation::activation::ActivationFunction;
use crate::loss::loss_type::LossType;

/// One row of a `ModelSummary`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSummary {
    /// 1-based position in the model.
    pub index: usize,
    pub activation: ActivationFunction,
    pub units: usize,
    /// Weight count, `n_inputs × units`. Biases are not included.
    pub parameters: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub layers: Vec<LayerSummary>,
    pub loss: LossType,
}

impl ModelSummary {
    pub fn total_parameters(&self) -> usize {
        self.layers.iter().map(|l| l.parameters).sum()
    }
}

impl fmt::Display for ModelSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const RULE: &str = "-------------------------------------------------------------------";
        writeln!(f, "Model summary ({}):", self.loss)?;
        writeln!(f, "{:<12}{:<16}{:<12}{}", "Layer", "Activation", "Units", "Variables")?;
        writeln!(f, "{RULE}")?;
        for layer in &self.layers {
            writeln!(f, "{:<12}{:<16}{:<12}{}", layer.index, layer.activation.name(), layer.units, layer.parameters)?;
        }
        writeln!(f, "{RULE}")?;
        write!(f, "Total variables: {}", self.total_parameters())
    }
}

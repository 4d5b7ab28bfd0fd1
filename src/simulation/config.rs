use crate::strategies::AlgorithmParams;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    pub name: String,
    pub algorithm: String,
    pub params: AlgorithmParams,
    /// Fixed seed for reproducible runs, drawn from entropy when absent
    pub seed: Option<u64>,
    /// Run each round's agent phases on the rayon pool
    pub parallel: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            name: "default_sim".to_string(),
            algorithm: "dsa".to_string(),
            params: AlgorithmParams::default(),
            seed: None,
            parallel: true,
        }
    }
}

impl SimConfig {
    pub fn with_algorithm(mut self, algorithm: impl Into<String>) -> Self {
        self.algorithm = algorithm.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_params(mut self, params: AlgorithmParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

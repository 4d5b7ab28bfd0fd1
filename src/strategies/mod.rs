pub mod dsa;
pub mod mgm;
pub mod mgm2;

use crate::agent::{AgentCore, PhaseContext};
use crate::error::{DcopError, Result};
use crate::mailbox::Outbox;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A decision protocol run by every agent. The engine calls `on_phase` once
/// per round with `ctx.phase` cycling through `0..cycle_length()`.
pub trait Strategy: Send + Sync + fmt::Debug {
    fn on_phase(&mut self, agent: &mut AgentCore, ctx: &PhaseContext<'_>, outbox: &mut Outbox);
    fn cycle_length(&self) -> u32;
    fn name(&self) -> &str;
    /// Clears per-cycle transient state.
    fn reset(&mut self);
    fn clone_box(&self) -> Box<dyn Strategy>;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmParams {
    /// DSA acceptance probability
    pub dsa_probability: f64,
    /// Chance an MGM2 agent proposes a pair move in a cycle
    pub pair_offer_probability: f64,
}

impl Default for AlgorithmParams {
    fn default() -> Self {
        Self {
            dsa_probability: 0.7,
            pair_offer_probability: 0.5,
        }
    }
}

impl AlgorithmParams {
    pub fn with_dsa_probability(mut self, p: f64) -> Self {
        self.dsa_probability = p;
        self
    }

    pub fn with_pair_offer_probability(mut self, p: f64) -> Self {
        self.pair_offer_probability = p;
        self
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("dsa_probability", self.dsa_probability),
            ("pair_offer_probability", self.pair_offer_probability),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(DcopError::InvalidProbability { name, value });
            }
        }
        Ok(())
    }
}

type Factory = Box<dyn Fn(&AlgorithmParams) -> Box<dyn Strategy> + Send + Sync>;

pub struct StrategyRegistry {
    strategies: HashMap<String, Factory>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            strategies: HashMap::new(),
        };
        registry.register_builtin();
        registry
    }

    fn register_builtin(&mut self) {
        self.register("dsa", |params| Box::new(dsa::Dsa::new(params.dsa_probability)));
        self.register("mgm", |_| Box::new(mgm::Mgm::new()));
        self.register("mgm2", |params| Box::new(mgm2::Mgm2::new(params.pair_offer_probability)));
        self.register("mgm-2", |params| Box::new(mgm2::Mgm2::new(params.pair_offer_probability)));
    }

    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(&AlgorithmParams) -> Box<dyn Strategy> + Send + Sync + 'static,
    {
        self.strategies.insert(name.to_lowercase(), Box::new(factory));
    }

    pub fn create(&self, name: &str, params: &AlgorithmParams) -> Option<Box<dyn Strategy>> {
        self.strategies
            .get(&name.to_lowercase())
            .map(|factory| factory(params))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.strategies.contains_key(&name.to_lowercase())
    }

    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.strategies.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn global() -> &'static StrategyRegistry {
        use std::sync::OnceLock;
        static REGISTRY: OnceLock<StrategyRegistry> = OnceLock::new();
        REGISTRY.get_or_init(StrategyRegistry::new)
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_is_case_insensitive() {
        let registry = StrategyRegistry::global();
        let params = AlgorithmParams::default();
        assert_eq!(registry.create("DSA", &params).unwrap().cycle_length(), 1);
        assert_eq!(registry.create("Mgm", &params).unwrap().cycle_length(), 2);
        assert_eq!(registry.create("MGM2", &params).unwrap().cycle_length(), 5);
        assert!(registry.create("maxsum", &params).is_none());
        assert_eq!(registry.list(), vec!["dsa", "mgm", "mgm-2", "mgm2"]);
    }

    #[test]
    fn test_params_validation() {
        assert!(AlgorithmParams::default().validate().is_ok());
        let err = AlgorithmParams::default()
            .with_dsa_probability(1.2)
            .validate()
            .unwrap_err();
        assert_eq!(
            err,
            DcopError::InvalidProbability {
                name: "dsa_probability",
                value: 1.2
            }
        );
        assert!(AlgorithmParams::default()
            .with_pair_offer_probability(-0.1)
            .validate()
            .is_err());
    }
}

// Random instance builder. Lives outside the solver core, it only produces inputs.

use super::{Cost, CostMatrix, DcopInstance};
use crate::error::{DcopError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Bernoulli, Distribution, Uniform};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CostPattern {
    /// Every entry drawn from the cost range (subject to p2).
    #[default]
    Random,
    /// Only equal values cost anything, graph-colouring style.
    Coloring,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub agents: usize,
    pub domain_size: usize,
    /// Probability that an unordered pair of agents shares a constraint
    pub p1: f64,
    /// Probability that a single matrix entry is non-zero
    pub p2: f64,
    pub min_cost: Cost,
    pub max_cost: Cost,
    pub pattern: CostPattern,
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            agents: 30,
            domain_size: 10,
            p1: 0.2,
            p2: 1.0,
            min_cost: 1,
            max_cost: 10,
            pattern: CostPattern::Random,
            seed: 42,
        }
    }
}

impl GeneratorConfig {
    pub fn new(agents: usize, domain_size: usize) -> Self {
        Self {
            agents,
            domain_size,
            ..Default::default()
        }
    }

    pub fn with_density(mut self, p1: f64, p2: f64) -> Self {
        self.p1 = p1;
        self.p2 = p2;
        self
    }

    pub fn with_cost_range(mut self, min_cost: Cost, max_cost: Cost) -> Self {
        self.min_cost = min_cost;
        self.max_cost = max_cost;
        self
    }

    pub fn with_pattern(mut self, pattern: CostPattern) -> Self {
        self.pattern = pattern;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn generate(&self) -> Result<DcopInstance> {
        generate(self)
    }
}

pub fn generate(config: &GeneratorConfig) -> Result<DcopInstance> {
    if config.domain_size == 0 {
        return Err(DcopError::EmptyDomain);
    }
    if config.min_cost > config.max_cost {
        return Err(DcopError::InvalidGenerator(format!(
            "cost range {}..={} is empty",
            config.min_cost, config.max_cost
        )));
    }
    let edge = Bernoulli::new(config.p1)
        .map_err(|_| DcopError::InvalidProbability { name: "p1", value: config.p1 })?;
    let entry = Bernoulli::new(config.p2)
        .map_err(|_| DcopError::InvalidProbability { name: "p2", value: config.p2 })?;
    let costs = Uniform::new_inclusive(config.min_cost, config.max_cost);

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut instance = DcopInstance::new(config.agents, config.domain_size);
    let size = config.domain_size;

    for a in 0..config.agents {
        for b in (a + 1)..config.agents {
            if !edge.sample(&mut rng) {
                continue;
            }
            let mut entries = vec![0; size * size];
            for own in 0..size {
                for other in 0..size {
                    let applies = match config.pattern {
                        CostPattern::Random => true,
                        CostPattern::Coloring => own == other,
                    };
                    if applies && entry.sample(&mut rng) {
                        entries[own * size + other] = costs.sample(&mut rng);
                    }
                }
            }
            instance.add_constraint(a, b, CostMatrix::new(size, entries)?)?;
        }
    }

    for agent in 0..config.agents {
        instance.set_initial_value(agent, rng.gen_range(0..size))?;
    }

    debug!(
        "Generated instance: {} agents, {} edges, domain {}",
        config.agents,
        instance.edge_count(),
        size
    );
    Ok(instance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::Problem;

    #[test]
    fn test_same_seed_same_instance() {
        let config = GeneratorConfig::new(12, 4).with_density(0.4, 0.8).with_seed(7);
        let a = config.generate().unwrap();
        let b = config.generate().unwrap();
        for agent in 0..12 {
            assert_eq!(a.neighbors(agent), b.neighbors(agent));
            assert_eq!(a.initial_value(agent), b.initial_value(agent));
            for &n in a.neighbors(agent) {
                assert_eq!(a.cost_matrix(agent, n), b.cost_matrix(agent, n));
            }
        }
    }

    #[test]
    fn test_generated_instance_is_valid() {
        let instance = GeneratorConfig::new(20, 5).with_density(0.5, 0.5).generate().unwrap();
        assert!(instance.validate().is_ok());
        assert!(instance.edge_count() > 0);
    }

    #[test]
    fn test_full_density_is_complete_graph() {
        let instance = GeneratorConfig::new(6, 3).with_density(1.0, 1.0).generate().unwrap();
        assert_eq!(instance.edge_count(), 15);
        for agent in 0..6 {
            for &n in instance.neighbors(agent) {
                let m = instance.cost_matrix(agent, n).unwrap();
                for a in 0..3 {
                    for b in 0..3 {
                        assert!((1..=10).contains(&m.get(a, b)));
                    }
                }
            }
        }
    }

    #[test]
    fn test_coloring_only_penalises_equal_values() {
        let instance = GeneratorConfig::new(5, 3)
            .with_density(1.0, 1.0)
            .with_pattern(CostPattern::Coloring)
            .generate()
            .unwrap();
        let m = instance.cost_matrix(0, 1).unwrap();
        for a in 0..3 {
            for b in 0..3 {
                if a == b {
                    assert!(m.get(a, b) > 0);
                } else {
                    assert_eq!(m.get(a, b), 0);
                }
            }
        }
    }

    #[test]
    fn test_rejects_bad_probability() {
        let err = GeneratorConfig::new(5, 3).with_density(1.5, 1.0).generate().unwrap_err();
        assert_eq!(err, DcopError::InvalidProbability { name: "p1", value: 1.5 });
        assert!(matches!(
            GeneratorConfig::new(5, 3).with_cost_range(9, 2).generate(),
            Err(DcopError::InvalidGenerator(_))
        ));
    }
}

pub mod generator;
pub mod matrix;

pub use generator::{CostPattern, GeneratorConfig};
pub use matrix::{Cost, CostMatrix};

use crate::error::{DcopError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub type AgentId = usize;

/// What the engine needs from a problem instance. Anything that can answer
/// these questions can be simulated, generated or hand built.
pub trait Problem {
    fn agent_count(&self) -> usize;
    fn domain_size(&self) -> usize;
    fn neighbors(&self, agent: AgentId) -> &[AgentId];
    /// Matrix as seen from `agent`, rows indexed by its own value.
    fn cost_matrix(&self, agent: AgentId, neighbor: AgentId) -> Option<&CostMatrix>;
    fn initial_value(&self, agent: AgentId) -> Option<usize>;
}

/// Checks every construction invariant a problem has to satisfy before agents
/// are built from it.
pub fn validate<P: Problem + ?Sized>(problem: &P) -> Result<()> {
    let agents = problem.agent_count();
    let domain_size = problem.domain_size();
    if domain_size == 0 {
        return Err(DcopError::EmptyDomain);
    }

    for agent in 0..agents {
        let mut seen = BTreeSet::new();
        for &neighbor in problem.neighbors(agent) {
            if neighbor == agent {
                return Err(DcopError::SelfLoop { agent });
            }
            if !seen.insert(neighbor) {
                return Err(DcopError::DuplicateNeighbor { agent, neighbor });
            }
            if neighbor >= agents {
                return Err(DcopError::UnknownAgent { agent: neighbor, agents });
            }
            if !problem.neighbors(neighbor).contains(&agent) {
                return Err(DcopError::AsymmetricNeighbors { a: agent, b: neighbor });
            }

            let forward = problem
                .cost_matrix(agent, neighbor)
                .ok_or(DcopError::MissingMatrix { agent, neighbor })?;
            let backward = problem
                .cost_matrix(neighbor, agent)
                .ok_or(DcopError::MissingMatrix { agent: neighbor, neighbor: agent })?;
            if forward.size() != domain_size {
                return Err(DcopError::MatrixSize {
                    size: domain_size,
                    expected: domain_size * domain_size,
                    actual: forward.size() * forward.size(),
                });
            }
            if !forward.is_transpose_of(backward) {
                return Err(DcopError::AsymmetricMatrix { a: agent, b: neighbor });
            }
        }

        if let Some(value) = problem.initial_value(agent) {
            if value >= domain_size {
                return Err(DcopError::InvalidInitialValue { agent, value, domain_size });
            }
        }
    }
    Ok(())
}

/// Sum over every unordered edge, each counted once from its lower endpoint.
///
/// `assignment` holds one value per agent. Panics if its length differs from
/// `problem.agent_count()`.
pub fn global_cost<P: Problem + ?Sized>(problem: &P, assignment: &[usize]) -> Cost {
    assert_eq!(
        assignment.len(),
        problem.agent_count(),
        "assignment has {} values for {} agents",
        assignment.len(),
        problem.agent_count()
    );
    let mut total = 0;
    for agent in 0..problem.agent_count() {
        for &neighbor in problem.neighbors(agent) {
            if neighbor <= agent {
                continue;
            }
            if let Some(matrix) = problem.cost_matrix(agent, neighbor) {
                total += matrix.get(assignment[agent], assignment[neighbor]);
            }
        }
    }
    total
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DcopInstance {
    domain_size: usize,
    neighbors: Vec<Vec<AgentId>>,
    matrices: Vec<BTreeMap<AgentId, CostMatrix>>,
    initial_values: Vec<Option<usize>>,
}

impl DcopInstance {
    pub fn new(agents: usize, domain_size: usize) -> Self {
        Self {
            domain_size,
            neighbors: vec![Vec::new(); agents],
            matrices: vec![BTreeMap::new(); agents],
            initial_values: vec![None; agents],
        }
    }

    /// Stores `matrix` for (a, b) and its transpose for (b, a). Re-adding an
    /// existing edge replaces its costs.
    pub fn add_constraint(&mut self, a: AgentId, b: AgentId, matrix: CostMatrix) -> Result<()> {
        let agents = self.agent_count();
        for agent in [a, b] {
            if agent >= agents {
                return Err(DcopError::UnknownAgent { agent, agents });
            }
        }
        if a == b {
            return Err(DcopError::SelfLoop { agent: a });
        }
        if matrix.size() != self.domain_size {
            return Err(DcopError::MatrixSize {
                size: self.domain_size,
                expected: self.domain_size * self.domain_size,
                actual: matrix.size() * matrix.size(),
            });
        }

        if !self.neighbors[a].contains(&b) {
            self.neighbors[a].push(b);
            self.neighbors[b].push(a);
        }
        self.matrices[b].insert(a, matrix.transpose());
        self.matrices[a].insert(b, matrix);
        Ok(())
    }

    pub fn set_initial_value(&mut self, agent: AgentId, value: usize) -> Result<()> {
        let agents = self.agent_count();
        if agent >= agents {
            return Err(DcopError::UnknownAgent { agent, agents });
        }
        if value >= self.domain_size {
            return Err(DcopError::InvalidInitialValue {
                agent,
                value,
                domain_size: self.domain_size,
            });
        }
        self.initial_values[agent] = Some(value);
        Ok(())
    }

    pub fn with_initial_values(mut self, values: &[usize]) -> Result<Self> {
        for (agent, &value) in values.iter().enumerate() {
            self.set_initial_value(agent, value)?;
        }
        Ok(self)
    }

    pub fn edge_count(&self) -> usize {
        self.neighbors.iter().map(Vec::len).sum::<usize>() / 2
    }

    pub fn validate(&self) -> Result<()> {
        validate(self)
    }

    pub fn global_cost(&self, assignment: &[usize]) -> Cost {
        global_cost(self, assignment)
    }
}

impl Problem for DcopInstance {
    fn agent_count(&self) -> usize {
        self.neighbors.len()
    }

    fn domain_size(&self) -> usize {
        self.domain_size
    }

    fn neighbors(&self, agent: AgentId) -> &[AgentId] {
        self.neighbors.get(agent).map(Vec::as_slice).unwrap_or(&[])
    }

    fn cost_matrix(&self, agent: AgentId, neighbor: AgentId) -> Option<&CostMatrix> {
        self.matrices.get(agent)?.get(&neighbor)
    }

    fn initial_value(&self, agent: AgentId) -> Option<usize> {
        self.initial_values.get(agent).copied().flatten()
    }
}

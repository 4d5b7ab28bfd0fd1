use thiserror::Error;

use crate::problem::AgentId;

/// Construction-time failures. A simulation that was built successfully
/// never produces one of these.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DcopError {
    #[error("Unknown algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("Domain size must be at least 1")]
    EmptyDomain,

    #[error("Cost matrix has {actual} entries, expected {expected} for domain size {size}")]
    MatrixSize { size: usize, expected: usize, actual: usize },

    #[error("Agent {agent} is out of range for {agents} agents")]
    UnknownAgent { agent: AgentId, agents: usize },

    #[error("Agent {agent} lists {neighbor} as a neighbor but has no cost matrix for it")]
    MissingMatrix { agent: AgentId, neighbor: AgentId },

    #[error("Cost matrices for edge ({a}, {b}) are not transposes of each other")]
    AsymmetricMatrix { a: AgentId, b: AgentId },

    #[error("Agent {a} lists {b} as a neighbor but not the other way around")]
    AsymmetricNeighbors { a: AgentId, b: AgentId },

    #[error("Agent {agent} lists neighbor {neighbor} more than once")]
    DuplicateNeighbor { agent: AgentId, neighbor: AgentId },

    #[error("Agent {agent} cannot be its own neighbor")]
    SelfLoop { agent: AgentId },

    #[error("Initial value {value} of agent {agent} is outside domain 0..{domain_size}")]
    InvalidInitialValue { agent: AgentId, value: usize, domain_size: usize },

    #[error("{name} must lie in [0, 1], got {value}")]
    InvalidProbability { name: &'static str, value: f64 },

    #[error("Invalid generator config: {0}")]
    InvalidGenerator(String),
}

pub type Result<T> = std::result::Result<T, DcopError>;

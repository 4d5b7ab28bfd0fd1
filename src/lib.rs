pub mod agent;
pub mod error;
pub mod mailbox;
pub mod metrics;
pub mod problem;
pub mod simulation;
pub mod strategies;

pub use agent::{Agent, AgentCore};
pub use error::DcopError;
pub use problem::{CostMatrix, DcopInstance, Problem};
pub use simulation::{SimConfig, Simulation};
pub use strategies::{AlgorithmParams, Strategy};

pub mod prelude {
    pub use crate::agent::{Agent, AgentCore, PhaseContext};
    pub use crate::error::DcopError;
    pub use crate::mailbox::{Message, MessageKind, Payload};
    pub use crate::metrics::CostSample;
    pub use crate::problem::{AgentId, Cost, CostMatrix, DcopInstance, GeneratorConfig, Problem};
    pub use crate::simulation::{SimConfig, Simulation};
    pub use crate::strategies::{AlgorithmParams, Strategy, StrategyRegistry};
}

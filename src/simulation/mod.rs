pub mod config;
pub mod pairings;

pub use config::SimConfig;
pub use pairings::Pairings;

use crate::agent::{Agent, AgentCore, PhaseContext};
use crate::error::{DcopError, Result};
use crate::mailbox::{Message, MessageKind, Round};
use crate::metrics::{CostHistory, CostSample};
use crate::problem::{AgentId, Cost, Problem};
use crate::strategies::{AlgorithmParams, StrategyRegistry};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::{debug, info, warn};

/// Round-based driver. Every round each agent runs the same phase against the
/// messages of the previous round, then everything they sent is delivered at
/// once, so no agent ever sees a change made in the round it is running.
pub struct Simulation {
    config: SimConfig,
    agents: Vec<Agent>,
    pairings: Pairings,
    cycle_length: u32,
    round: Round,
    history: CostHistory,
    started: bool,
}

impl Simulation {
    pub fn new<P: Problem + ?Sized>(problem: &P, config: SimConfig) -> Result<Self> {
        crate::problem::validate(problem)?;
        config.params.validate()?;

        let registry = StrategyRegistry::global();
        let template = registry
            .create(&config.algorithm, &config.params)
            .ok_or_else(|| DcopError::UnknownAlgorithm(config.algorithm.clone()))?;
        let cycle_length = template.cycle_length();

        let seed = config.seed.unwrap_or_else(rand::random);
        let domain_size = problem.domain_size();
        let mut agents = Vec::with_capacity(problem.agent_count());
        for id in 0..problem.agent_count() {
            let mut rng = StdRng::seed_from_u64(agent_seed(seed, id));
            let value = problem
                .initial_value(id)
                .unwrap_or_else(|| rng.gen_range(0..domain_size));

            let mut core = AgentCore::new(id, domain_size, value, rng);
            for &neighbor in problem.neighbors(id) {
                let matrix = problem
                    .cost_matrix(id, neighbor)
                    .ok_or(DcopError::MissingMatrix { agent: id, neighbor })?;
                core.connect(neighbor, matrix.clone());
            }
            agents.push(Agent::new(core, template.clone_box()));
        }

        info!(
            "Simulation {}: {} with {} agents, domain {}, seed {}",
            config.name,
            template.name(),
            agents.len(),
            domain_size,
            seed
        );

        Ok(Self {
            pairings: Pairings::new(agents.len()),
            config,
            agents,
            cycle_length,
            round: 0,
            history: CostHistory::new(),
            started: false,
        })
    }

    /// Shorthand when only the algorithm and its parameters matter.
    pub fn with_algorithm<P: Problem + ?Sized>(
        problem: &P,
        algorithm: &str,
        params: AlgorithmParams,
    ) -> Result<Self> {
        let config = SimConfig::default()
            .with_algorithm(algorithm)
            .with_params(params);
        Self::new(problem, config)
    }

    /// Initial value broadcast (stamped round 0) plus the first history sample.
    fn start(&mut self) {
        let announcements: Vec<Message> = self
            .agents
            .iter_mut()
            .flat_map(|agent| agent.announce(0))
            .collect();
        self.deliver(announcements);
        let cost = self.global_cost();
        self.history.record(0, cost);
        self.started = true;
    }

    pub fn step(&mut self) {
        if !self.started {
            self.start();
        }
        self.round += 1;
        let phase = ((self.round - 1) % self.cycle_length as Round) as u32;
        let ctx = PhaseContext {
            round: self.round,
            phase,
            pairings: &self.pairings,
        };

        let outboxes: Vec<Vec<Message>> = if self.config.parallel {
            self.agents.par_iter_mut().map(|agent| agent.step(&ctx)).collect()
        } else {
            self.agents.iter_mut().map(|agent| agent.step(&ctx)).collect()
        };
        self.deliver(outboxes.into_iter().flatten().collect());

        if phase + 1 == self.cycle_length {
            self.pairings.clear();
        }

        let cost = self.global_cost();
        self.history.record(self.round, cost);
        debug!("Round {} (phase {}): global cost {}", self.round, phase, cost);
    }

    pub fn run(&mut self, steps: u64) {
        for _ in 0..steps {
            self.step();
        }
        info!(
            "Simulation {} finished round {} with global cost {}",
            self.config.name,
            self.round,
            self.final_global_cost()
        );
    }

    fn deliver(&mut self, messages: Vec<Message>) {
        for message in messages {
            let Some(receiver) = self.agents.get_mut(message.receiver) else {
                warn!("Dropping message to unknown agent {}", message.receiver);
                continue;
            };
            if !receiver.core().is_neighbor(message.sender) {
                warn!(
                    "Dropping message from {} to non-neighbor {}",
                    message.sender, message.receiver
                );
                continue;
            }
            if message.kind() == MessageKind::PairOffer {
                self.pairings.link(message.sender, message.receiver);
            }
            receiver.receive(message);
        }
    }

    /// Sum over every edge, read from the lower id's matrix.
    pub fn global_cost(&self) -> Cost {
        let mut total = 0;
        for agent in &self.agents {
            let core = agent.core();
            for &neighbor in core.neighbors() {
                if neighbor > core.id() {
                    total += core
                        .matrix(neighbor)
                        .get(core.value(), self.agents[neighbor].value());
                }
            }
        }
        total
    }

    pub fn history(&self) -> &[CostSample] {
        self.history.samples()
    }

    pub fn final_global_cost(&self) -> Cost {
        self.history
            .last()
            .map_or_else(|| self.global_cost(), |s| s.global_cost)
    }

    pub fn assignment(&self) -> Vec<usize> {
        self.agents.iter().map(Agent::value).collect()
    }

    pub fn value_of(&self, agent: AgentId) -> Option<usize> {
        self.agents.get(agent).map(Agent::value)
    }

    pub fn round(&self) -> Round {
        self.round
    }

    pub fn cycle_length(&self) -> u32 {
        self.cycle_length
    }

    pub fn algorithm(&self) -> &str {
        self.agents
            .first()
            .map_or(self.config.algorithm.as_str(), |a| a.strategy().name())
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn pairings(&self) -> &Pairings {
        &self.pairings
    }
}

// splitmix-style spread so neighbouring ids don't get correlated streams
fn agent_seed(seed: u64, id: AgentId) -> u64 {
    seed ^ (id as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

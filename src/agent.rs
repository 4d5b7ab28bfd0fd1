use crate::mailbox::{Inbox, Message, MessageKind, Outbox, Payload, Round};
use crate::problem::{AgentId, Cost, CostMatrix};
use crate::simulation::Pairings;
use crate::strategies::Strategy;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Everything an agent may look at while running one phase besides its own state.
#[derive(Debug, Clone, Copy)]
pub struct PhaseContext<'a> {
    pub round: Round,
    /// Position inside the algorithm's cycle, starting at 0.
    pub phase: u32,
    pub pairings: &'a Pairings,
}

impl PhaseContext<'_> {
    /// Round whose messages this phase reads.
    pub fn previous_round(&self) -> Round {
        self.round.saturating_sub(1)
    }
}

/// State and helpers every decision strategy shares.
pub struct AgentCore {
    id: AgentId,
    domain_size: usize,
    value: usize,
    neighbors: Vec<AgentId>,
    matrices: BTreeMap<AgentId, CostMatrix>,
    inbox: Inbox,
    cost_vector: Vec<Cost>,
    round: Round,
    rng: StdRng,
}

impl AgentCore {
    pub fn new(id: AgentId, domain_size: usize, value: usize, rng: StdRng) -> Self {
        Self {
            id,
            domain_size,
            value,
            neighbors: Vec::new(),
            matrices: BTreeMap::new(),
            inbox: Inbox::new(),
            cost_vector: vec![0; domain_size],
            round: 0,
            rng,
        }
    }

    /// `matrix` rows are indexed by this agent's value.
    pub fn connect(&mut self, neighbor: AgentId, matrix: CostMatrix) {
        if self.matrices.insert(neighbor, matrix).is_none() {
            self.neighbors.push(neighbor);
        }
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn value(&self) -> usize {
        self.value
    }

    pub fn set_value(&mut self, value: usize) {
        debug_assert!(value < self.domain_size);
        if value != self.value {
            debug!("Agent {} round {}: {} -> {}", self.id, self.round, self.value, value);
        }
        self.value = value;
    }

    pub fn domain_size(&self) -> usize {
        self.domain_size
    }

    pub fn neighbors(&self) -> &[AgentId] {
        &self.neighbors
    }

    pub fn is_neighbor(&self, agent: AgentId) -> bool {
        self.matrices.contains_key(&agent)
    }

    /// Panics for a non-neighbor: the graph is validated before any agent is
    /// built, so a miss here means the engine itself is broken.
    pub fn matrix(&self, neighbor: AgentId) -> &CostMatrix {
        self.matrices.get(&neighbor).unwrap_or_else(|| {
            panic!("agent {} has no cost matrix for neighbor {}", self.id, neighbor)
        })
    }

    pub fn cost_vector(&self) -> &[Cost] {
        &self.cost_vector
    }

    pub fn current_cost(&self) -> Cost {
        self.cost_vector[self.value]
    }

    pub fn round(&self) -> Round {
        self.round
    }

    pub fn inbox(&self) -> &Inbox {
        &self.inbox
    }

    pub fn inbox_mut(&mut self) -> &mut Inbox {
        &mut self.inbox
    }

    pub fn advance_round(&mut self, round: Round) {
        debug_assert!(round >= self.round, "rounds only move forward");
        self.round = round;
    }

    /// Rebuilds the cost of every domain value from the value messages stamped
    /// `from_round`, consuming them.
    pub fn recompute_cost_vector(&mut self, from_round: Round) -> &[Cost] {
        let announced = self.inbox.take(MessageKind::Value, from_round);
        let mut costs = vec![0; self.domain_size];
        for message in &announced {
            let Payload::Value(theirs) = message.payload else {
                continue;
            };
            let matrix = self.matrix(message.sender);
            for (own, cost) in costs.iter_mut().enumerate() {
                *cost += matrix.get(own, theirs);
            }
        }
        self.cost_vector = costs;
        &self.cost_vector
    }

    /// Probabilistic hill climb. Candidates are the other values tied at the
    /// minimum of the cost vector; nothing moves while the current cost is 0.
    pub fn best_alternative(&mut self, probability: f64) -> usize {
        let current = self.current_cost();
        let Some(&min) = self.cost_vector.iter().min() else {
            return self.value;
        };
        if current == 0 || min > current {
            return self.value;
        }

        let candidates: Vec<usize> = (0..self.domain_size)
            .filter(|&v| v != self.value && self.cost_vector[v] == min)
            .collect();
        if candidates.is_empty() || !self.chance(probability) {
            return self.value;
        }
        candidates.choose(&mut self.rng).copied().unwrap_or(self.value)
    }

    /// True unless some received score beats ours, ties going to the lower id.
    pub fn has_priority(&self, my_score: Cost, received: &[(AgentId, Cost)]) -> bool {
        received
            .iter()
            .all(|&(other, score)| !(score > my_score || (score == my_score && other < self.id)))
    }

    pub fn send_to_all(&self, outbox: &mut Outbox, payload: Payload) {
        outbox.send_to_all(&self.neighbors, payload);
    }

    pub fn send_to_one(&self, outbox: &mut Outbox, receiver: AgentId, payload: Payload) {
        debug_assert!(self.is_neighbor(receiver));
        outbox.send_to_one(receiver, payload);
    }

    pub fn purge_consumed(&mut self) {
        self.inbox.purge_consumed();
    }

    /// Anything older than the round just processed can never be read again.
    pub fn end_round(&mut self) {
        self.inbox.purge_consumed();
        self.inbox.discard_stale(self.round);
    }

    pub fn chance(&mut self, probability: f64) -> bool {
        probability >= 1.0 || (probability > 0.0 && self.rng.gen_bool(probability))
    }

    pub fn pick<T: Copy>(&mut self, items: &[T]) -> Option<T> {
        items.choose(&mut self.rng).copied()
    }

    pub fn random_neighbor(&mut self) -> Option<AgentId> {
        self.neighbors.choose(&mut self.rng).copied()
    }
}

impl fmt::Debug for AgentCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentCore")
            .field("id", &self.id)
            .field("value", &self.value)
            .field("neighbors", &self.neighbors)
            .field("round", &self.round)
            .field("inbox", &self.inbox.len())
            .finish()
    }
}

#[derive(Debug)]
pub struct Agent {
    core: AgentCore,
    strategy: Box<dyn Strategy>,
}

impl Agent {
    pub fn new(core: AgentCore, strategy: Box<dyn Strategy>) -> Self {
        Self { core, strategy }
    }

    pub fn id(&self) -> AgentId {
        self.core.id
    }

    pub fn value(&self) -> usize {
        self.core.value
    }

    pub fn core(&self) -> &AgentCore {
        &self.core
    }

    pub fn core_mut(&mut self) -> &mut AgentCore {
        &mut self.core
    }

    pub fn strategy(&self) -> &dyn Strategy {
        self.strategy.as_ref()
    }

    pub fn receive(&mut self, message: Message) {
        self.core.inbox.receive(message);
    }

    /// Initial value broadcast, done once before the first round.
    pub fn announce(&mut self, round: Round) -> Vec<Message> {
        let mut outbox = Outbox::new(self.core.id, round);
        self.core.send_to_all(&mut outbox, Payload::Value(self.core.value));
        outbox.into_messages()
    }

    /// Runs one phase of the strategy and hands back what it wants delivered.
    pub fn step(&mut self, ctx: &PhaseContext<'_>) -> Vec<Message> {
        self.core.advance_round(ctx.round);
        let mut outbox = Outbox::new(self.core.id, ctx.round);
        self.strategy.on_phase(&mut self.core, ctx, &mut outbox);
        self.core.end_round();
        outbox.into_messages()
    }
}

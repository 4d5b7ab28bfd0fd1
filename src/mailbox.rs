// Point to point messages between agents. Nothing here is shared, every
// inbox belongs to exactly one agent and the engine is the only courier.

use crate::problem::{AgentId, Cost};
use serde::{Deserialize, Serialize};

pub type Round = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKind {
    Value,
    Reduction,
    Proposal,
    PairOffer,
    Changing,
    Ack,
}

/// Joint move for two partnered agents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairAssignment {
    pub first: (AgentId, usize),
    pub second: (AgentId, usize),
}

impl PairAssignment {
    pub fn new(first: (AgentId, usize), second: (AgentId, usize)) -> Self {
        Self { first, second }
    }

    pub fn value_for(&self, agent: AgentId) -> Option<usize> {
        if self.first.0 == agent {
            Some(self.first.1)
        } else if self.second.0 == agent {
            Some(self.second.1)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Payload {
    Value(usize),
    Reduction(Cost),
    /// Proposer's current value plus its full cost vector, so the receiver
    /// can evaluate joint moves without another round trip.
    Proposal { value: usize, costs: Vec<Cost> },
    PairOffer { assignment: PairAssignment, reduction: Cost },
    Changing(bool),
    Ack(bool),
}

impl Payload {
    pub fn kind(&self) -> MessageKind {
        match self {
            Payload::Value(_) => MessageKind::Value,
            Payload::Reduction(_) => MessageKind::Reduction,
            Payload::Proposal { .. } => MessageKind::Proposal,
            Payload::PairOffer { .. } => MessageKind::PairOffer,
            Payload::Changing(_) => MessageKind::Changing,
            Payload::Ack(_) => MessageKind::Ack,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub sender: AgentId,
    pub receiver: AgentId,
    pub round: Round,
    pub payload: Payload,
    consumed: bool,
}

impl Message {
    pub fn new(sender: AgentId, receiver: AgentId, round: Round, payload: Payload) -> Self {
        Self {
            sender,
            receiver,
            round,
            payload,
            consumed: false,
        }
    }

    pub fn kind(&self) -> MessageKind {
        self.payload.kind()
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed
    }
}

#[derive(Debug, Clone, Default)]
pub struct Inbox {
    messages: Vec<Message>,
}

impl Inbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn receive(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Marks every unconsumed message of `kind` stamped `round` as consumed and
    /// returns copies in arrival order.
    pub fn take(&mut self, kind: MessageKind, round: Round) -> Vec<Message> {
        let mut taken = Vec::new();
        for message in self.messages.iter_mut() {
            if !message.consumed && message.round == round && message.kind() == kind {
                message.consumed = true;
                taken.push(message.clone());
            }
        }
        taken
    }

    /// Like [`Inbox::take`] but only for messages from `sender`.
    pub fn take_from(&mut self, sender: AgentId, kind: MessageKind, round: Round) -> Option<Message> {
        let message = self.messages.iter_mut().find(|m| {
            !m.consumed && m.sender == sender && m.round == round && m.kind() == kind
        })?;
        message.consumed = true;
        Some(message.clone())
    }

    pub fn purge_consumed(&mut self) {
        self.messages.retain(|m| !m.consumed);
    }

    /// Drops everything stamped before `oldest_round`, read or not.
    pub fn discard_stale(&mut self, oldest_round: Round) {
        self.messages.retain(|m| m.round >= oldest_round);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Messages produced by one agent during one round. Stamped with that round.
#[derive(Debug)]
pub struct Outbox {
    sender: AgentId,
    round: Round,
    messages: Vec<Message>,
}

impl Outbox {
    pub fn new(sender: AgentId, round: Round) -> Self {
        Self {
            sender,
            round,
            messages: Vec::new(),
        }
    }

    pub fn send_to_one(&mut self, receiver: AgentId, payload: Payload) {
        self.messages
            .push(Message::new(self.sender, receiver, self.round, payload));
    }

    pub fn send_to_all(&mut self, receivers: &[AgentId], payload: Payload) {
        for &receiver in receivers {
            self.send_to_one(receiver, payload.clone());
        }
    }

    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }
}

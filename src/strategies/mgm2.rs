// MGM-2: MGM plus coordinated two-agent moves.
//
// Phase 0  compute costs, maybe propose to a random neighbor
// Phase 1  non-proposers pick one proposal and answer with the best joint move
// Phase 2  everyone announces a reduction (pair or solo)
// Phase 3  decide maximality, paired agents tell each other
// Phase 4  commit if allowed, announce values, reset

use super::mgm::{received_reductions, solo_move};
use super::Strategy;
use crate::agent::{AgentCore, PhaseContext};
use crate::mailbox::{MessageKind, Outbox, PairAssignment, Payload};
use crate::problem::{AgentId, Cost};
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct Mgm2 {
    offer_probability: f64,
    potential_partner: Option<AgentId>,
    partner: Option<AgentId>,
    proposal_sent: bool,
    pair_assignment: Option<PairAssignment>,
    solo_value: Option<usize>,
    reduction: Cost,
    has_maximal_reduction: bool,
    changed: bool,
}

impl Mgm2 {
    pub fn new(offer_probability: f64) -> Self {
        Self {
            offer_probability,
            ..Default::default()
        }
    }

    pub fn partner(&self) -> Option<AgentId> {
        self.partner
    }

    pub fn reduction(&self) -> Cost {
        self.reduction
    }

    pub fn has_maximal_reduction(&self) -> bool {
        self.has_maximal_reduction
    }

    fn propose(&mut self, agent: &mut AgentCore, outbox: &mut Outbox) {
        if agent.neighbors().is_empty() || !agent.chance(self.offer_probability) {
            return;
        }
        let Some(target) = agent.random_neighbor() else {
            return;
        };
        let payload = Payload::Proposal {
            value: agent.value(),
            costs: agent.cost_vector().to_vec(),
        };
        agent.send_to_one(outbox, target, payload);
        self.potential_partner = Some(target);
        self.proposal_sent = true;
    }

    fn answer_proposal(&mut self, agent: &mut AgentCore, ctx: &PhaseContext<'_>, outbox: &mut Outbox) {
        if self.proposal_sent {
            return;
        }
        let proposals: Vec<(AgentId, usize, Vec<Cost>)> = agent
            .inbox_mut()
            .take(MessageKind::Proposal, ctx.previous_round())
            .into_iter()
            .filter_map(|m| match m.payload {
                Payload::Proposal { value, costs } => Some((m.sender, value, costs)),
                _ => None,
            })
            .collect();
        let Some(chosen) = agent.pick(&(0..proposals.len()).collect::<Vec<_>>()) else {
            return;
        };
        let (proposer, their_value, their_costs) = &proposals[chosen];

        let (assignment, reduction) = best_joint_move(agent, *proposer, *their_value, their_costs);
        self.partner = Some(*proposer);
        self.pair_assignment = Some(assignment);
        self.reduction = reduction;
        agent.send_to_one(outbox, *proposer, Payload::PairOffer { assignment, reduction });
    }

    fn announce_reduction(&mut self, agent: &mut AgentCore, ctx: &PhaseContext<'_>, outbox: &mut Outbox) {
        if let Some(target) = self.potential_partner.filter(|_| self.proposal_sent) {
            if let Some(offer) = agent
                .inbox_mut()
                .take_from(target, MessageKind::PairOffer, ctx.previous_round())
            {
                if let Payload::PairOffer { assignment, reduction } = offer.payload {
                    self.partner = Some(target);
                    self.pair_assignment = Some(assignment);
                    self.reduction = reduction;
                }
            }
        }

        debug_assert!(
            self.partner.is_none() || self.partner == ctx.pairings.partner_of(agent.id()),
            "pairings registry disagrees with agent {}",
            agent.id()
        );
        if self.partner.is_none() {
            let (best, reduction) = solo_move(agent);
            self.solo_value = Some(best);
            self.reduction = reduction;
        }
        agent.send_to_all(outbox, Payload::Reduction(self.reduction));
    }

    fn decide(&mut self, agent: &mut AgentCore, ctx: &PhaseContext<'_>, outbox: &mut Outbox) {
        let partner = ctx.pairings.partner_of(agent.id()).or(self.partner);
        let received: Vec<(AgentId, Cost)> = received_reductions(agent, ctx.previous_round())
            .into_iter()
            .filter(|&(sender, _)| Some(sender) != partner)
            .collect();
        self.has_maximal_reduction = agent.has_priority(self.reduction, &received);

        if let Some(partner) = partner {
            agent.send_to_one(outbox, partner, Payload::Changing(self.has_maximal_reduction));
        }
    }

    fn commit(&mut self, agent: &mut AgentCore, ctx: &PhaseContext<'_>, outbox: &mut Outbox) {
        let before = agent.value();
        if self.has_maximal_reduction {
            match (self.partner, self.pair_assignment) {
                (Some(partner), Some(assignment)) => {
                    let confirmed = agent
                        .inbox_mut()
                        .take_from(partner, MessageKind::Changing, ctx.previous_round())
                        .is_some_and(|m| m.payload == Payload::Changing(true));
                    if confirmed {
                        if let Some(value) = assignment.value_for(agent.id()) {
                            agent.set_value(value);
                        }
                    } else {
                        debug!("Agent {}: partner {} declined pair move", agent.id(), partner);
                    }
                }
                _ => {
                    if let Some(value) = self.solo_value {
                        agent.set_value(value);
                    }
                }
            }
        }
        self.changed = agent.value() != before;
        if let (true, Some(partner)) = (self.changed, self.partner) {
            debug!("Agent {} committed pair move with {}", agent.id(), partner);
        }
        agent.send_to_all(outbox, Payload::Value(agent.value()));
        self.reset();
    }
}

/// Exhaustive search over both domains for the pair (self, proposer). The
/// shared edge is counted once; all other neighbors are held at their last
/// announced values. Returns the chosen assignment and its saving.
fn best_joint_move(
    agent: &mut AgentCore,
    proposer: AgentId,
    their_value: usize,
    their_costs: &[Cost],
) -> (PairAssignment, Cost) {
    let me = agent.id();
    let my_value = agent.value();
    let domain_size = agent.domain_size();
    let shared = agent.matrix(proposer);
    let my_costs = agent.cost_vector();

    let joint = |v1: usize, v2: usize| -> Cost {
        let mine = my_costs[v1].saturating_sub(shared.get(v1, their_value));
        let theirs = their_costs[v2].saturating_sub(shared.get(my_value, v2));
        mine + theirs + shared.get(v1, v2)
    };

    let current = joint(my_value, their_value);
    let mut best = current;
    let mut minimizers: Vec<(usize, usize)> = Vec::new();
    for v1 in 0..domain_size {
        for v2 in 0..domain_size {
            let cost = joint(v1, v2);
            if cost < best {
                best = cost;
                minimizers.clear();
            }
            if cost == best {
                minimizers.push((v1, v2));
            }
        }
    }

    // Staying put wins ties, otherwise pick among the equally good pairs
    let (v1, v2) = if best == current {
        (my_value, their_value)
    } else {
        agent.pick(&minimizers).unwrap_or((my_value, their_value))
    };
    (PairAssignment::new((me, v1), (proposer, v2)), current - best)
}

impl Strategy for Mgm2 {
    fn on_phase(&mut self, agent: &mut AgentCore, ctx: &PhaseContext<'_>, outbox: &mut Outbox) {
        match ctx.phase {
            0 => {
                agent.recompute_cost_vector(ctx.previous_round());
                self.propose(agent, outbox);
            }
            1 => self.answer_proposal(agent, ctx, outbox),
            2 => self.announce_reduction(agent, ctx, outbox),
            3 => self.decide(agent, ctx, outbox),
            _ => self.commit(agent, ctx, outbox),
        }
    }

    fn cycle_length(&self) -> u32 { 5 }

    fn name(&self) -> &str { "MGM2" }

    fn reset(&mut self) {
        *self = Self::new(self.offer_probability);
    }

    fn clone_box(&self) -> Box<dyn Strategy> {
        Box::new(self.clone())
    }
}

use super::Strategy;
use crate::agent::{AgentCore, PhaseContext};
use crate::mailbox::{MessageKind, Outbox, Payload, Round};
use crate::problem::{AgentId, Cost};

/// Maximum Gain Message. Two phases: announce the gain, then only the agent
/// with the largest gain in its neighborhood moves.
#[derive(Debug, Clone, Default)]
pub struct Mgm {
    reduction: Cost,
}

impl Mgm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reduction(&self) -> Cost {
        self.reduction
    }
}

/// Best solo move and how much it would save, given the current cost vector.
pub(crate) fn solo_move(agent: &mut AgentCore) -> (usize, Cost) {
    let best = agent.best_alternative(1.0);
    let costs = agent.cost_vector();
    let reduction = costs[agent.value()].saturating_sub(costs[best]);
    (best, reduction)
}

/// Reductions announced by neighbors in `round`.
pub(crate) fn received_reductions(agent: &mut AgentCore, round: Round) -> Vec<(AgentId, Cost)> {
    agent
        .inbox_mut()
        .take(MessageKind::Reduction, round)
        .into_iter()
        .filter_map(|m| match m.payload {
            Payload::Reduction(r) => Some((m.sender, r)),
            _ => None,
        })
        .collect()
}

impl Strategy for Mgm {
    fn on_phase(&mut self, agent: &mut AgentCore, ctx: &PhaseContext<'_>, outbox: &mut Outbox) {
        match ctx.phase {
            0 => {
                agent.recompute_cost_vector(ctx.previous_round());
                let (_, reduction) = solo_move(agent);
                self.reduction = reduction;
                agent.send_to_all(outbox, Payload::Reduction(reduction));
            }
            _ => {
                let received = received_reductions(agent, ctx.previous_round());
                if agent.has_priority(self.reduction, &received) {
                    let (best, _) = solo_move(agent);
                    agent.set_value(best);
                }
                // Sent even when unchanged, neighbors rebuild their cost vectors from it
                agent.send_to_all(outbox, Payload::Value(agent.value()));
                self.reset();
            }
        }
    }

    fn cycle_length(&self) -> u32 { 2 }

    fn name(&self) -> &str { "MGM" }

    fn reset(&mut self) {
        self.reduction = 0;
    }

    fn clone_box(&self) -> Box<dyn Strategy> {
        Box::new(self.clone())
    }
}

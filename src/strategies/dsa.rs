use super::Strategy;
use crate::agent::{AgentCore, PhaseContext};
use crate::mailbox::{Outbox, Payload};

/// Distributed Stochastic Algorithm: every round, look at the neighbors'
/// last values and move to the best alternative with probability `p`.
#[derive(Debug, Clone)]
pub struct Dsa {
    probability: f64,
}

impl Dsa {
    pub fn new(probability: f64) -> Self {
        Self { probability }
    }
}

impl Strategy for Dsa {
    fn on_phase(&mut self, agent: &mut AgentCore, ctx: &PhaseContext<'_>, outbox: &mut Outbox) {
        agent.recompute_cost_vector(ctx.previous_round());
        let value = agent.best_alternative(self.probability);
        agent.set_value(value);
        agent.send_to_all(outbox, Payload::Value(value));
    }

    fn cycle_length(&self) -> u32 { 1 }

    fn name(&self) -> &str { "DSA" }

    fn reset(&mut self) {}

    fn clone_box(&self) -> Box<dyn Strategy> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mailbox::{Message, MessageKind};
    use crate::problem::CostMatrix;
    use crate::simulation::Pairings;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn agent(value: usize) -> AgentCore {
        let mut core = AgentCore::new(0, 3, value, StdRng::seed_from_u64(3));
        core.connect(
            1,
            CostMatrix::from_rows(&[vec![5, 5, 5], vec![1, 9, 9], vec![6, 6, 2]]).unwrap(),
        );
        core
    }

    #[test]
    fn test_moves_to_best_and_broadcasts() {
        let pairings = Pairings::new(2);
        let ctx = PhaseContext { round: 4, phase: 0, pairings: &pairings };
        let mut core = agent(0);
        core.inbox_mut().receive(Message::new(1, 0, 3, Payload::Value(0)));

        let mut outbox = Outbox::new(0, 4);
        Dsa::new(1.0).on_phase(&mut core, &ctx, &mut outbox);

        assert_eq!(core.value(), 1);
        let sent = outbox.into_messages();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].kind(), MessageKind::Value);
        assert_eq!(sent[0].payload, Payload::Value(1));
        assert_eq!(sent[0].round, 4);
    }

    #[test]
    fn test_zero_probability_never_moves() {
        let pairings = Pairings::new(2);
        let ctx = PhaseContext { round: 2, phase: 0, pairings: &pairings };
        let mut core = agent(0);
        core.inbox_mut().receive(Message::new(1, 0, 1, Payload::Value(2)));

        let mut outbox = Outbox::new(0, 2);
        Dsa::new(0.0).on_phase(&mut core, &ctx, &mut outbox);
        assert_eq!(core.value(), 0);
        assert_eq!(outbox.into_messages()[0].payload, Payload::Value(0));
    }
}

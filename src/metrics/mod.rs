pub mod analyzer;
pub mod logger;

use crate::mailbox::Round;
use crate::problem::Cost;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostSample {
    pub round: Round,
    pub global_cost: Cost,
}

/// Global cost after every round, in round order.
#[derive(Debug, Clone, Default)]
pub struct CostHistory {
    samples: Vec<CostSample>,
}

impl CostHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, round: Round, global_cost: Cost) {
        debug_assert!(self.samples.last().is_none_or(|s| s.round < round));
        self.samples.push(CostSample { round, global_cost });
    }

    pub fn samples(&self) -> &[CostSample] {
        &self.samples
    }

    pub fn last(&self) -> Option<&CostSample> {
        self.samples.last()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_in_round_order() {
        let mut history = CostHistory::new();
        assert!(history.is_empty());
        for (round, cost) in [(0, 40), (1, 12), (2, 12), (3, 15)] {
            history.record(round, cost);
        }
        let rounds: Vec<_> = history.samples().iter().map(|s| s.round).collect();
        assert_eq!(rounds, vec![0, 1, 2, 3]);
        assert_eq!(history.last(), Some(&CostSample { round: 3, global_cost: 15 }));
        assert_eq!(history.len(), 4);
    }
}

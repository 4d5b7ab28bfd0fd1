use crate::problem::AgentId;

/// Who is paired with whom for the current MGM2 cycle. Owned by the engine;
/// agents only ever read it.
#[derive(Debug, Clone, Default)]
pub struct Pairings {
    partners: Vec<Option<AgentId>>,
}

impl Pairings {
    pub fn new(agents: usize) -> Self {
        Self {
            partners: vec![None; agents],
        }
    }

    pub fn link(&mut self, a: AgentId, b: AgentId) {
        debug_assert!(
            self.partner_of(a).is_none() && self.partner_of(b).is_none(),
            "agent paired twice in one cycle: {} / {}",
            a,
            b
        );
        let needed = a.max(b) + 1;
        if self.partners.len() < needed {
            self.partners.resize(needed, None);
        }
        self.partners[a] = Some(b);
        self.partners[b] = Some(a);
    }

    pub fn partner_of(&self, agent: AgentId) -> Option<AgentId> {
        self.partners.get(agent).copied().flatten()
    }

    /// Each pair once, lower id first.
    pub fn pairs(&self) -> Vec<(AgentId, AgentId)> {
        self.partners
            .iter()
            .enumerate()
            .filter_map(|(a, p)| p.filter(|&b| a < b).map(|b| (a, b)))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.partners.iter().all(Option::is_none)
    }

    pub fn clear(&mut self) {
        self.partners.iter_mut().for_each(|p| *p = None);
    }
}

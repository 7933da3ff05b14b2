use super::states::ComponentState;
use serde::{Deserialize, Serialize};

/// A validity change dispatched by the component manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTransition {
    pub from: ComponentState,
    pub to: ComponentState,
}

impl StateTransition {
    pub fn new(from: ComponentState, to: ComponentState) -> Self {
        Self { from, to }
    }

    /// Matches a declared (initial, final) pair
    pub fn matches(&self, initial: ComponentState, final_state: ComponentState) -> bool {
        self.from == initial && self.to == final_state
    }
}

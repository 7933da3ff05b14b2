// State machine module for component validity
//
// A component instance is either VALID or INVALID; the component manager owns
// the current state and handlers observe transitions through `state_changed`.

pub mod events;
pub mod states;

// Re-export main types for convenient access
pub use events::StateTransition;
pub use states::ComponentState;

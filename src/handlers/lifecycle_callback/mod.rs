//! # Lifecycle Callbacks
//!
//! Component methods fired on declared validity transitions.

pub mod callback;
pub mod handler;

pub use callback::LifecycleCallback;
pub use handler::LifecycleCallbackHandler;

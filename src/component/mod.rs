//! # Component Runtime
//!
//! The per-instance orchestrator and the pieces it is built from:
//!
//! - [`ComponentType`]: method table of the component implementation, the
//!   targets lifecycle callbacks are resolved against
//! - [`PlatformContext`]: the external collaborators shared by every instance
//! - [`ComponentManager`]: owns validity state, the registered handler set and
//!   field interception

pub mod component_type;
pub mod context;
pub mod manager;

pub use component_type::{ComponentMethod, ComponentType, MethodBody, Visibility};
pub use context::PlatformContext;
pub use manager::ComponentManager;

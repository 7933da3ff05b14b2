use super::element::Element;
use crate::constants::attributes;
use crate::error::{LifecycleError, Result};
use crate::state_machine::ComponentState;
use serde::{Deserialize, Serialize};

/// Declared lifecycle callback: a method to call on a state transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleCallbackMetadata {
    initial: ComponentState,
    final_state: ComponentState,
    method: String,
    is_static: bool,
}

impl LifecycleCallbackMetadata {
    pub fn new(
        initial: ComponentState,
        final_state: ComponentState,
        method: impl Into<String>,
        is_static: bool,
    ) -> Self {
        Self {
            initial,
            final_state,
            method: method.into(),
            is_static,
        }
    }

    /// Parse a `callback` element. Unknown state names read as `INVALID`.
    pub fn from_element(element: &Element) -> Result<Self> {
        let method = element.attribute(attributes::METHOD).ok_or_else(|| {
            LifecycleError::MetadataError("callback element has no method attribute".to_string())
        })?;
        let initial =
            ComponentState::from_declaration(element.attribute(attributes::INITIAL).unwrap_or(""));
        let final_state =
            ComponentState::from_declaration(element.attribute(attributes::FINAL).unwrap_or(""));
        let is_static = element.attribute(attributes::IS_STATIC) == Some("true");

        Ok(Self::new(initial, final_state, method, is_static))
    }

    pub fn initial_state(&self) -> ComponentState {
        self.initial
    }

    pub fn final_state(&self) -> ComponentState {
        self.final_state
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }
}

use crate::component::{ComponentManager, ComponentMethod, ComponentType};
use crate::error::CallbackError;
use crate::metadata::LifecycleCallbackMetadata;
use crate::state_machine::StateTransition;

/// A declared callback bound to the method it names
#[derive(Debug, Clone)]
pub struct LifecycleCallback {
    metadata: LifecycleCallbackMetadata,
    target: Option<ComponentMethod>,
}

impl LifecycleCallback {
    /// Resolve the declared method against the component's method table.
    /// An unresolved method is kept and reported when the callback fires.
    pub fn resolve(metadata: LifecycleCallbackMetadata, component_type: &ComponentType) -> Self {
        let target = component_type.method(metadata.method()).cloned();
        Self { metadata, target }
    }

    pub fn metadata(&self) -> &LifecycleCallbackMetadata {
        &self.metadata
    }

    pub fn method(&self) -> &str {
        self.metadata.method()
    }

    pub fn is_resolved(&self) -> bool {
        self.target.is_some()
    }

    pub fn matches(&self, transition: &StateTransition) -> bool {
        transition.matches(self.metadata.initial_state(), self.metadata.final_state())
    }

    pub fn call(&self, manager: &ComponentManager) -> Result<(), CallbackError> {
        match &self.target {
            Some(method) => manager.invoke(method, self.metadata.is_static()),
            None => Err(CallbackError::NotFound {
                method: self.metadata.method().to_string(),
            }),
        }
    }
}

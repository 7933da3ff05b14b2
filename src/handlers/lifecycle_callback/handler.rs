use super::callback::LifecycleCallback;
use crate::component::ComponentManager;
use crate::constants::elements;
use crate::error::CallbackError;
use crate::handlers::Handler;
use crate::logging::log_handler_operation;
use crate::metadata::{ComponentMetadata, LifecycleCallbackMetadata};
use crate::state_machine::{ComponentState, StateTransition};
use crate::value::Dictionary;
use parking_lot::{Mutex, RwLock};
use std::any::Any;
use std::sync::{Arc, Weak};
use tracing::{debug, error, warn};

#[derive(Debug, Default)]
struct CallbackState {
    callbacks: Vec<LifecycleCallback>,
    /// Last state seen, for edge-triggered matching
    state: ComponentState,
}

/// Handler calling component methods on declared transitions
#[derive(Debug)]
pub struct LifecycleCallbackHandler {
    this: Weak<LifecycleCallbackHandler>,
    manager: RwLock<Weak<ComponentManager>>,
    inner: Mutex<CallbackState>,
}

impl LifecycleCallbackHandler {
    pub const NAME: &'static str = "lifecycle_callback";

    pub fn new() -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            this: this.clone(),
            manager: RwLock::new(Weak::new()),
            inner: Mutex::new(CallbackState::default()),
        })
    }

    pub fn callbacks(&self) -> Vec<LifecycleCallback> {
        self.inner.lock().callbacks.clone()
    }

    /// State the handler last observed
    pub fn tracked_state(&self) -> ComponentState {
        self.inner.lock().state
    }
}

impl Handler for LifecycleCallbackHandler {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn configure(
        &self,
        manager: &Arc<ComponentManager>,
        metadata: &ComponentMetadata,
        _configuration: &Dictionary,
    ) {
        *self.manager.write() = Arc::downgrade(manager);

        let mut callbacks = Vec::new();
        for element in metadata.element().elements(elements::CALLBACK) {
            let declared = match LifecycleCallbackMetadata::from_element(element) {
                Ok(declared) => declared,
                Err(e) => {
                    error!(
                        component = %metadata.class_name(),
                        error = %e,
                        "Ignoring malformed callback"
                    );
                    continue;
                }
            };
            let callback = LifecycleCallback::resolve(declared, manager.component_type());
            if !callback.is_resolved() {
                warn!(
                    component = %metadata.class_name(),
                    method = %callback.method(),
                    "Callback method not found in the implementation"
                );
            }
            callbacks.push(callback);
        }

        let count = callbacks.len();
        *self.inner.lock() = CallbackState {
            callbacks,
            state: ComponentState::Invalid,
        };

        if count == 0 {
            return;
        }
        if let Some(this) = self.this.upgrade() {
            manager.register(this);
        }
        log_handler_operation(
            "configure",
            metadata.class_name(),
            Self::NAME,
            "registered",
            Some(&format!("{count} callbacks")),
        );
    }

    fn start(&self) {}

    fn stop(&self) {
        self.inner.lock().state = ComponentState::Invalid;
    }

    fn state_changed(&self, state: ComponentState) {
        // Track the new state before any callback can start a nested transition
        let (transition, callbacks) = {
            let mut inner = self.inner.lock();
            let transition = StateTransition::new(inner.state, state);
            inner.state = state;
            (transition, inner.callbacks.clone())
        };

        if let Some(manager) = self.manager.read().upgrade() {
            for callback in callbacks.iter().filter(|c| c.matches(&transition)) {
                debug!(
                    component = %manager.class_name(),
                    method = %callback.method(),
                    "Calling lifecycle callback"
                );
                match callback.call(&manager) {
                    Ok(()) => {}
                    Err(CallbackError::NotFound { method }) => error!(
                        component = %manager.class_name(),
                        method = %method,
                        "Cannot call the callback: method not found"
                    ),
                    Err(CallbackError::Inaccessible { method }) => error!(
                        component = %manager.class_name(),
                        method = %method,
                        "Cannot call the callback: method not accessible"
                    ),
                    Err(CallbackError::Failed { method, cause }) => error!(
                        component = %manager.class_name(),
                        method = %method,
                        error = %cause,
                        "The callback failed"
                    ),
                }
            }
        }
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{ComponentType, PlatformContext};
    use crate::metadata::Element;
    use crate::registry::{InMemoryConfigurationHost, InMemoryServiceRegistry};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn callback(initial: &str, final_state: &str, method: &str) -> Element {
        Element::new("callback")
            .with_attribute("initial", initial)
            .with_attribute("final", final_state)
            .with_attribute("method", method)
    }

    fn setup(
        callbacks: Vec<Element>,
        component_type: ComponentType,
    ) -> (Arc<ComponentManager>, Arc<LifecycleCallbackHandler>) {
        let mut builder = ComponentMetadata::builder("com.acme.Impl");
        for element in callbacks {
            builder = builder.element(element);
        }
        let context = PlatformContext::new(
            Arc::new(InMemoryServiceRegistry::new()),
            Arc::new(InMemoryConfigurationHost::new()),
        );
        let manager = ComponentManager::new(builder.build(), component_type, context);
        let handler = LifecycleCallbackHandler::new();
        manager.configure(vec![handler.clone() as Arc<dyn Handler>], &Dictionary::new());
        (manager, handler)
    }

    fn counter() -> (Arc<AtomicUsize>, impl Fn(&ComponentManager) -> anyhow::Result<()>) {
        let count = Arc::new(AtomicUsize::new(0));
        let inner = count.clone();
        (count, move |_: &ComponentManager| {
            inner.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }

    #[test]
    fn test_no_callbacks_means_dormant() {
        let (manager, handler) = setup(Vec::new(), ComponentType::new("com.acme.Impl"));
        assert!(manager.handler_names().is_empty());
        assert!(handler.callbacks().is_empty());
    }

    #[test]
    fn test_activation_fires_once() {
        let (count, body) = counter();
        let (manager, handler) = setup(
            vec![callback("INVALID", "VALID", "onActivate")],
            ComponentType::new("com.acme.Impl").with_method("onActivate", body),
        );

        manager.start();
        assert_eq!(count.load(Ordering::SeqCst), 1);

        // VALID -> VALID does not match INVALID -> VALID
        handler.state_changed(ComponentState::Valid);
        assert_eq!(count.load(Ordering::SeqCst), 1);

        manager.set_state(ComponentState::Invalid);
        manager.set_state(ComponentState::Valid);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_failures_do_not_stop_siblings() {
        let (count, body) = counter();
        let component_type = ComponentType::new("com.acme.Impl")
            .with_method("fails", |_| Err(anyhow::anyhow!("boom")))
            .with_method("panics", |_| panic!("kaboom"))
            .with_private_method("hidden", |_| Ok(()))
            .with_method("counts", body);
        let (manager, handler) = setup(
            vec![
                callback("INVALID", "VALID", "missing"),
                callback("INVALID", "VALID", "fails"),
                callback("INVALID", "VALID", "panics"),
                callback("INVALID", "VALID", "hidden"),
                callback("INVALID", "VALID", "counts"),
            ],
            component_type,
        );

        manager.start();
        assert_eq!(manager.state(), ComponentState::Valid);
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(handler.tracked_state(), ComponentState::Valid);
    }

    #[test]
    fn test_instance_callback_reaches_fields() {
        let (manager, _) = setup(
            vec![callback("VALID", "INVALID", "onDeactivate")],
            ComponentType::new("com.acme.Impl").with_method("onDeactivate", |m| {
                m.set_field("m_active", json!(false));
                Ok(())
            }),
        );

        manager.start();
        assert_eq!(manager.get_field("m_active"), None);
        manager.set_state(ComponentState::Invalid);
        assert_eq!(manager.get_field("m_active"), Some(json!(false)));
    }

    #[test]
    fn test_static_callback() {
        let fired = Arc::new(AtomicUsize::new(0));
        let inner = fired.clone();
        let element = callback("INVALID", "VALID", "boot").with_attribute("isStatic", "true");
        let (manager, _) = setup(
            vec![element],
            ComponentType::new("com.acme.Impl").with_static_method("boot", move || {
                inner.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }),
        );
        manager.start();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_stop_resets_tracked_state() {
        let (count, body) = counter();
        let (manager, handler) = setup(
            vec![callback("INVALID", "VALID", "onActivate")],
            ComponentType::new("com.acme.Impl").with_method("onActivate", body),
        );
        manager.start();
        manager.stop();
        assert_eq!(handler.tracked_state(), ComponentState::Invalid);

        manager.start();
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_callback_revoking_validity_keeps_tracking_current() {
        let runs = Arc::new(AtomicUsize::new(0));
        let inner = runs.clone();
        let (manager, handler) = setup(
            vec![callback("INVALID", "VALID", "onActivate")],
            ComponentType::new("com.acme.Impl").with_method("onActivate", move |m| {
                if inner.fetch_add(1, Ordering::SeqCst) == 0 {
                    m.set_state(ComponentState::Invalid);
                }
                Ok(())
            }),
        );

        manager.start();
        assert_eq!(manager.state(), ComponentState::Invalid);
        assert_eq!(handler.tracked_state(), ComponentState::Invalid);
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        manager.set_state(ComponentState::Valid);
        assert_eq!(runs.load(Ordering::SeqCst), 2);
        assert_eq!(handler.tracked_state(), ComponentState::Valid);
    }
}

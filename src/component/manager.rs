//! # Component Manager
//!
//! Per-instance orchestrator. Drives `configure` → `start` / `stop` →
//! `state_changed` on the registered handlers and intercepts every read and
//! write of the component's manipulated fields.
//!
//! ## Locking
//!
//! Lifecycle operations (`configure`, `start`, `stop`, `set_state`) are
//! serialized by a reentrant per-instance lock, so a handler reacting to a
//! transition may itself trigger another one on the same thread. No internal
//! data lock is held while a handler is being called.

use super::component_type::{ComponentMethod, ComponentType};
use super::context::PlatformContext;
use crate::constants::events;
use crate::error::CallbackError;
use crate::handlers::Handler;
use crate::metadata::{ComponentInfo, ComponentMetadata};
use crate::state_machine::{ComponentState, StateTransition};
use crate::value::Dictionary;
use parking_lot::{ReentrantMutex, RwLock};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

struct HandlerRegistration {
    handler: Arc<dyn Handler>,
    fields: Vec<String>,
}

/// Orchestrator of one component instance
pub struct ComponentManager {
    metadata: ComponentMetadata,
    component_type: ComponentType,
    context: PlatformContext,
    info: RwLock<ComponentInfo>,
    state: RwLock<ComponentState>,
    handlers: RwLock<Vec<HandlerRegistration>>,
    fields: RwLock<HashMap<String, Value>>,
    lifecycle: ReentrantMutex<()>,
}

impl std::fmt::Debug for ComponentManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentManager")
            .field("class_name", &self.metadata.class_name())
            .field("state", &*self.state.read())
            .field("handlers", &self.handler_names())
            .finish()
    }
}

impl ComponentManager {
    pub fn new(
        metadata: ComponentMetadata,
        component_type: ComponentType,
        context: PlatformContext,
    ) -> Arc<Self> {
        let info = ComponentInfo::new(metadata.class_name());
        Arc::new(Self {
            metadata,
            component_type,
            context,
            info: RwLock::new(info),
            state: RwLock::new(ComponentState::Invalid),
            handlers: RwLock::new(Vec::new()),
            fields: RwLock::new(HashMap::new()),
            lifecycle: ReentrantMutex::new(()),
        })
    }

    /// Configure every candidate handler in order.
    ///
    /// Candidates that do not register themselves stay dormant and are dropped.
    pub fn configure(
        self: &Arc<Self>,
        candidates: Vec<Arc<dyn Handler>>,
        configuration: &Dictionary,
    ) {
        let _lifecycle = self.lifecycle.lock();

        for candidate in candidates {
            candidate.configure(self, &self.metadata, configuration);
        }

        info!(
            component = %self.class_name(),
            handlers = ?self.handler_names(),
            "Component configured"
        );
    }

    /// Register a handler as a validity participant
    pub fn register(&self, handler: Arc<dyn Handler>) {
        self.register_with_fields(handler, &[]);
    }

    /// Register a handler and its interest in get/set interception of `fields`
    pub fn register_with_fields(&self, handler: Arc<dyn Handler>, fields: &[String]) {
        let mut handlers = self.handlers.write();
        if let Some(existing) = handlers
            .iter_mut()
            .find(|r| same_handler(&r.handler, &handler))
        {
            for field in fields {
                if !existing.fields.contains(field) {
                    existing.fields.push(field.clone());
                }
            }
            return;
        }

        debug!(
            component = %self.metadata.class_name(),
            handler = handler.name(),
            fields = ?fields,
            "Handler registered"
        );
        handlers.push(HandlerRegistration {
            handler,
            fields: fields.to_vec(),
        });
    }

    /// Start registered handlers in order, then evaluate validity
    pub fn start(&self) {
        let _lifecycle = self.lifecycle.lock();

        for handler in self.registered_handlers() {
            handler.start();
        }
        info!(component = %self.class_name(), "Component started");

        self.check_validity();
    }

    /// Stop registered handlers in order; the instance ends INVALID
    pub fn stop(&self) {
        let _lifecycle = self.lifecycle.lock();

        for handler in self.registered_handlers() {
            handler.stop();
        }
        *self.state.write() = ComponentState::Invalid;

        info!(component = %self.class_name(), "Component stopped");
    }

    /// VALID iff every registered handler is satisfied
    pub fn check_validity(&self) {
        let valid = self.registered_handlers().iter().all(|h| h.is_valid());
        self.set_state(if valid {
            ComponentState::Valid
        } else {
            ComponentState::Invalid
        });
    }

    /// Record a new validity state and notify handlers in registration order
    pub fn set_state(&self, state: ComponentState) {
        let _lifecycle = self.lifecycle.lock();

        let previous = {
            let mut current = self.state.write();
            if *current == state {
                return;
            }
            std::mem::replace(&mut *current, state)
        };
        let transition = StateTransition::new(previous, state);

        info!(
            component = %self.class_name(),
            from = %transition.from,
            to = %transition.to,
            "Component state changed"
        );

        self.context.events.publish(
            events::COMPONENT_STATE_CHANGED,
            json!({
                "component": self.class_name(),
                "from": transition.from,
                "to": transition.to,
            }),
        );

        for handler in self.registered_handlers() {
            // A handler may have started a nested transition on this thread
            if *self.state.read() != state {
                debug!(
                    component = %self.class_name(),
                    to = %state,
                    "Transition superseded, remaining handlers skipped"
                );
                return;
            }
            handler.state_changed(state);
        }
    }

    pub fn state(&self) -> ComponentState {
        *self.state.read()
    }

    /// Write a manipulated field; every interested handler sees the write first
    pub fn set_field(&self, field: &str, value: Value) {
        for handler in self.handlers_for_field(field) {
            handler.setter_callback(field, &value);
        }
        self.fields.write().insert(field.to_string(), value);
    }

    /// Read a manipulated field as rewritten by the interested handlers
    pub fn get_field(&self, field: &str) -> Option<Value> {
        let raw = self.fields.read().get(field).cloned();
        self.handlers_for_field(field)
            .into_iter()
            .fold(raw, |value, handler| handler.getter_callback(field, value))
    }

    /// Handler-facing entry of the write path: behaves as a component write
    pub fn setter_callback(&self, field: &str, value: Value) {
        self.set_field(field, value);
    }

    /// Invoke a resolved component method against this instance
    pub fn invoke(
        &self,
        method: &ComponentMethod,
        declared_static: bool,
    ) -> Result<(), CallbackError> {
        method.invoke(self, declared_static)
    }

    /// Typed lookup among the registered handlers
    pub fn handler<T: Handler>(&self) -> Option<Arc<T>> {
        self.registered_handlers()
            .into_iter()
            .find_map(|handler| handler.into_any().downcast::<T>().ok())
    }

    pub fn handler_names(&self) -> Vec<&'static str> {
        self.handlers.read().iter().map(|r| r.handler.name()).collect()
    }

    pub fn metadata(&self) -> &ComponentMetadata {
        &self.metadata
    }

    pub fn component_type(&self) -> &ComponentType {
        &self.component_type
    }

    pub fn context(&self) -> &PlatformContext {
        &self.context
    }

    pub fn class_name(&self) -> &str {
        self.metadata.class_name()
    }

    /// Snapshot of the published capability surface
    pub fn component_info(&self) -> ComponentInfo {
        self.info.read().clone()
    }

    pub fn update_component_info<F>(&self, update: F)
    where
        F: FnOnce(&mut ComponentInfo),
    {
        update(&mut self.info.write());
    }

    fn registered_handlers(&self) -> Vec<Arc<dyn Handler>> {
        self.handlers
            .read()
            .iter()
            .map(|r| Arc::clone(&r.handler))
            .collect()
    }

    fn handlers_for_field(&self, field: &str) -> Vec<Arc<dyn Handler>> {
        self.handlers
            .read()
            .iter()
            .filter(|r| r.fields.iter().any(|f| f == field))
            .map(|r| Arc::clone(&r.handler))
            .collect()
    }
}

fn same_handler(a: &Arc<dyn Handler>, b: &Arc<dyn Handler>) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

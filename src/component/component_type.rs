use super::manager::ComponentManager;
use crate::error::CallbackError;
use std::collections::HashMap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

type InstanceFn = dyn Fn(&ComponentManager) -> anyhow::Result<()> + Send + Sync;
type StaticFn = dyn Fn() -> anyhow::Result<()> + Send + Sync;

/// Callable body of a component method
#[derive(Clone)]
pub enum MethodBody {
    /// Runs against the live instance; field access goes through the manager
    Instance(Arc<InstanceFn>),
    /// Runs without an instance
    Static(Arc<StaticFn>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

/// A named method of the component implementation
#[derive(Clone)]
pub struct ComponentMethod {
    name: String,
    visibility: Visibility,
    body: MethodBody,
}

impl fmt::Debug for ComponentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.body {
            MethodBody::Instance(_) => "instance",
            MethodBody::Static(_) => "static",
        };
        f.debug_struct("ComponentMethod")
            .field("name", &self.name)
            .field("visibility", &self.visibility)
            .field("kind", &kind)
            .finish()
    }
}

impl ComponentMethod {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_static(&self) -> bool {
        matches!(self.body, MethodBody::Static(_))
    }

    /// Invoke the method.
    ///
    /// A static declaration only resolves to a static method. Errors and
    /// panics raised by the body are reported as `CallbackError::Failed`.
    pub fn invoke(
        &self,
        manager: &ComponentManager,
        declared_static: bool,
    ) -> Result<(), CallbackError> {
        if self.visibility == Visibility::Private {
            return Err(CallbackError::Inaccessible {
                method: self.name.clone(),
            });
        }

        let outcome = match &self.body {
            MethodBody::Static(body) => catch_unwind(AssertUnwindSafe(|| body())),
            MethodBody::Instance(_) if declared_static => {
                return Err(CallbackError::NotFound {
                    method: self.name.clone(),
                })
            }
            MethodBody::Instance(body) => catch_unwind(AssertUnwindSafe(|| body(manager))),
        };

        match outcome {
            Ok(Ok(())) => Ok(()),
            Ok(Err(cause)) => Err(CallbackError::Failed {
                method: self.name.clone(),
                cause,
            }),
            Err(panic) => {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "panic".to_string());
                Err(CallbackError::Failed {
                    method: self.name.clone(),
                    cause: anyhow::anyhow!("panicked: {message}"),
                })
            }
        }
    }
}

/// Method table of a component implementation.
///
/// Lifecycle callbacks name methods; they are resolved against this table
/// once, at configure time.
#[derive(Debug, Clone, Default)]
pub struct ComponentType {
    class_name: String,
    methods: HashMap<String, ComponentMethod>,
}

impl ComponentType {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            methods: HashMap::new(),
        }
    }

    pub fn with_method<F>(self, name: &str, body: F) -> Self
    where
        F: Fn(&ComponentManager) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.with(name, Visibility::Public, MethodBody::Instance(Arc::new(body)))
    }

    pub fn with_static_method<F>(self, name: &str, body: F) -> Self
    where
        F: Fn() -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.with(name, Visibility::Public, MethodBody::Static(Arc::new(body)))
    }

    pub fn with_private_method<F>(self, name: &str, body: F) -> Self
    where
        F: Fn(&ComponentManager) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.with(name, Visibility::Private, MethodBody::Instance(Arc::new(body)))
    }

    fn with(mut self, name: &str, visibility: Visibility, body: MethodBody) -> Self {
        self.methods.insert(
            name.to_string(),
            ComponentMethod {
                name: name.to_string(),
                visibility,
                body,
            },
        );
        self
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn method(&self, name: &str) -> Option<&ComponentMethod> {
        self.methods.get(name)
    }
}

use crate::value;
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{error, warn};

/// A configuration key bound to a component field.
///
/// The live value is `None` until something provides one; an empty string is
/// a real value.
#[derive(Debug)]
pub struct ConfigurableProperty {
    name: String,
    field: Option<String>,
    type_name: String,
    value: Mutex<Option<Value>>,
    modifications: AtomicU64,
}

impl ConfigurableProperty {
    /// Create a property whose textual initial value is converted to the
    /// backing field's type when the field is known.
    pub fn new(
        name: impl Into<String>,
        field: Option<String>,
        initial: Option<String>,
        field_type: Option<&str>,
    ) -> Self {
        let name = name.into();
        let type_name = field_type
            .map(str::to_string)
            .unwrap_or_else(|| "java.lang.String".to_string());

        let value = initial.and_then(|raw| match value::convert(&type_name, &raw) {
            Ok(v) => Some(v),
            Err(e) => {
                error!(property = %name, error = %e, "Cannot convert initial property value");
                None
            }
        });

        Self {
            name,
            field,
            type_name,
            value: Mutex::new(value),
            modifications: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn value(&self) -> Option<Value> {
        self.value.lock().clone()
    }

    /// Number of times the live value actually changed
    pub fn modifications(&self) -> u64 {
        self.modifications.load(Ordering::Relaxed)
    }

    /// Replace the live value unless it is equal to the current one.
    ///
    /// Returns whether the value changed.
    pub fn set_value(&self, value: Value) -> bool {
        let mut current = self.value.lock();
        if current.as_ref() == Some(&value) {
            return false;
        }
        *current = Some(value);
        self.modifications.fetch_add(1, Ordering::Relaxed);
        true
    }

    /// Bring an incoming value to this property's type: textual values are
    /// converted, typed values pass through.
    pub fn coerce(&self, incoming: &Value) -> Value {
        match incoming {
            Value::String(raw) => match value::convert(&self.type_name, raw) {
                Ok(v) => v,
                Err(e) => {
                    warn!(property = %self.name, error = %e, "Keeping unconverted value");
                    incoming.clone()
                }
            },
            _ => incoming.clone(),
        }
    }
}

use crate::metadata::PropertyMetadata;
use crate::value;
use serde_json::Value;
use tracing::error;

/// Live value holder of a provided-service property
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    metadata: PropertyMetadata,
    value: Option<Value>,
}

impl Property {
    /// Create the holder, converting the resolved textual value to the
    /// property's type. A value that cannot be converted leaves it unset.
    pub fn new(metadata: PropertyMetadata) -> Self {
        let value = metadata.value().and_then(|raw| {
            let type_name = metadata.type_name().unwrap_or("java.lang.String");
            match value::convert(type_name, raw) {
                Ok(v) => Some(v),
                Err(e) => {
                    error!(
                        property = %metadata.name(),
                        error = %e,
                        "Cannot convert service property value"
                    );
                    None
                }
            }
        });
        Self { metadata, value }
    }

    pub fn metadata(&self) -> &PropertyMetadata {
        &self.metadata
    }

    pub fn name(&self) -> &str {
        self.metadata.name()
    }

    pub fn field(&self) -> Option<&str> {
        self.metadata.field()
    }

    pub fn get(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Returns whether the value changed
    pub fn set(&mut self, value: Value) -> bool {
        if self.value.as_ref() == Some(&value) {
            return false;
        }
        self.value = Some(value);
        true
    }
}

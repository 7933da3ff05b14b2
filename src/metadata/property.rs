use super::element::Element;
use crate::constants::attributes;
use crate::error::{LifecycleError, Result};
use crate::value::Dictionary;
use serde::{Deserialize, Serialize};

/// Resolve the textual initial value of a declared property.
///
/// Precedence: a textual configuration entry under the property name, then
/// the declared literal default, then a textual configuration entry under the
/// backing field's name. Non-textual entries are ignored here; they are
/// injected in a second pass once the live holders exist.
pub fn resolve_initial_value(
    name: Option<&str>,
    field: Option<&str>,
    declared: Option<&str>,
    configuration: &Dictionary,
) -> Option<String> {
    let textual = |key: Option<&str>| {
        key.and_then(|k| configuration.get(k))
            .and_then(|v| v.as_str())
            .map(str::to_string)
    };

    textual(name)
        .or_else(|| declared.map(str::to_string))
        .or_else(|| textual(field))
}

/// Descriptor of a provided-service property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyMetadata {
    name: String,
    field: Option<String>,
    type_name: Option<String>,
    value: Option<String>,
}

impl PropertyMetadata {
    pub fn new(
        name: Option<String>,
        field: Option<String>,
        type_name: Option<String>,
        value: Option<String>,
    ) -> Result<Self> {
        let name = name.or_else(|| field.clone()).ok_or_else(|| {
            LifecycleError::MetadataError("a property needs a name or a field".to_string())
        })?;
        Ok(Self {
            name,
            field,
            type_name,
            value,
        })
    }

    /// Build from a `Property` element, resolving the initial value against
    /// the instance configuration.
    pub fn from_element(element: &Element, configuration: &Dictionary) -> Result<Self> {
        let name = element.attribute(attributes::NAME);
        let field = element.attribute(attributes::FIELD);
        let value = resolve_initial_value(
            name,
            field,
            element.attribute(attributes::VALUE),
            configuration,
        );

        Self::new(
            name.map(str::to_string),
            field.map(str::to_string),
            element.attribute(attributes::TYPE).map(str::to_string),
            value,
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn set_type(&mut self, type_name: impl Into<String>) {
        self.type_name = Some(type_name.into());
    }

    /// A property without a backing field carries a literal value only
    pub fn is_static(&self) -> bool {
        self.field.is_none()
    }
}

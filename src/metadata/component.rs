use super::element::Element;
use crate::constants::{attributes, elements};
use crate::error::{LifecycleError, Result};
use std::collections::BTreeMap;

/// Declared description of a component implementation.
///
/// Holds the full descriptor tree (handlers read their own elements from it)
/// plus the manipulation data recorded for the implementation: its fields
/// with their real types and the interfaces it implements.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentMetadata {
    class_name: String,
    root: Element,
    fields: BTreeMap<String, String>,
    interfaces: Vec<String>,
}

impl ComponentMetadata {
    pub fn from_element(root: Element) -> Result<Self> {
        let class_name = root
            .attribute(attributes::CLASS_NAME)
            .ok_or_else(|| {
                LifecycleError::MetadataError(format!(
                    "component element '{}' has no {} attribute",
                    root.name,
                    attributes::CLASS_NAME
                ))
            })?
            .to_string();

        Ok(Self::assemble(class_name, root))
    }

    fn assemble(class_name: String, root: Element) -> Self {
        let mut fields = BTreeMap::new();
        let mut interfaces = Vec::new();
        if let Some(manipulation) = root.first(elements::MANIPULATION) {
            for field in manipulation.elements(elements::FIELD) {
                if let (Some(name), Some(field_type)) = (
                    field.attribute(attributes::NAME),
                    field.attribute(attributes::TYPE),
                ) {
                    fields.insert(name.to_string(), field_type.to_string());
                }
            }
            for interface in manipulation.elements(elements::INTERFACE) {
                if let Some(name) = interface.attribute(attributes::NAME) {
                    interfaces.push(name.to_string());
                }
            }
        }

        Self {
            class_name,
            root,
            fields,
            interfaces,
        }
    }

    pub fn builder(class_name: impl Into<String>) -> ComponentMetadataBuilder {
        ComponentMetadataBuilder::new(class_name)
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn element(&self) -> &Element {
        &self.root
    }

    /// Real type of a manipulated field
    pub fn field_type(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    pub fn interfaces(&self) -> &[String] {
        &self.interfaces
    }

    pub fn implements(&self, specification: &str) -> bool {
        self.interfaces.iter().any(|i| i == specification)
    }
}

/// Assembles a component descriptor tree with its manipulation data
#[derive(Debug, Clone)]
pub struct ComponentMetadataBuilder {
    root: Element,
    manipulation: Element,
}

impl ComponentMetadataBuilder {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            root: Element::new("component").with_attribute(attributes::CLASS_NAME, class_name),
            manipulation: Element::new(elements::MANIPULATION),
        }
    }

    pub fn field(mut self, name: &str, field_type: &str) -> Self {
        self.manipulation.add_element(
            Element::new(elements::FIELD)
                .with_attribute(attributes::NAME, name)
                .with_attribute(attributes::TYPE, field_type),
        );
        self
    }

    pub fn interface(mut self, name: &str) -> Self {
        self.manipulation
            .add_element(Element::new(elements::INTERFACE).with_attribute(attributes::NAME, name));
        self
    }

    pub fn element(mut self, element: Element) -> Self {
        self.root.add_element(element);
        self
    }

    pub fn build(self) -> ComponentMetadata {
        let class_name = self
            .root
            .attribute(attributes::CLASS_NAME)
            .unwrap_or_default()
            .to_string();
        ComponentMetadata::assemble(class_name, self.root.with_element(self.manipulation))
    }
}

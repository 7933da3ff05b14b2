use crate::error::Result;
use serde::{Deserialize, Serialize};

/// A property as exposed on the component description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: Option<String>,
    pub value: String,
}

impl PropertyInfo {
    pub fn new(
        name: impl Into<String>,
        type_name: Option<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            type_name,
            value: value.into(),
        }
    }
}

/// Capability surface of a component, visible to external introspection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentInfo {
    pub class_name: String,
    pub provided_service_specifications: Vec<String>,
    pub properties: Vec<PropertyInfo>,
}

impl ComponentInfo {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            ..Self::default()
        }
    }

    pub fn add_provided_service_specification(&mut self, specification: &str) {
        if !self.provides(specification) {
            self.provided_service_specifications
                .push(specification.to_string());
        }
    }

    pub fn add_property(&mut self, property: PropertyInfo) {
        self.properties.push(property);
    }

    pub fn provides(&self, specification: &str) -> bool {
        self.provided_service_specifications
            .iter()
            .any(|s| s == specification)
    }

    pub fn property(&self, name: &str) -> Option<&PropertyInfo> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

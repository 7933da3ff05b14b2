use super::component::ComponentMetadata;
use super::element::Element;
use super::property::PropertyMetadata;
use crate::constants::{attributes, elements, system};
use crate::value::Dictionary;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// How service objects are allocated to consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactoryPolicy {
    /// One shared instance for every consumer
    #[default]
    Singleton,
    /// One instance per distinct consumer
    ServiceInstancePerConsumer,
}

impl fmt::Display for FactoryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Singleton => write!(f, "singleton"),
            Self::ServiceInstancePerConsumer => write!(f, "service"),
        }
    }
}

/// Declared provided service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvidedServiceMetadata {
    specifications: Vec<String>,
    factory: FactoryPolicy,
    properties: Vec<PropertyMetadata>,
}

impl ProvidedServiceMetadata {
    pub fn new(specifications: Vec<String>, factory: FactoryPolicy) -> Self {
        Self {
            specifications,
            factory,
            properties: Vec::new(),
        }
    }

    /// Build from a `Provides` element.
    ///
    /// Specifications come from the comma-separated `interface` attribute or,
    /// when absent, from every interface the implementation is recorded as
    /// implementing.
    pub fn from_element(
        element: &Element,
        component: &ComponentMetadata,
        configuration: &Dictionary,
    ) -> Self {
        let specifications = match element.attribute(attributes::INTERFACE) {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            None => component.interfaces().to_vec(),
        };

        let factory = match element.attribute(attributes::FACTORY) {
            Some(system::SERVICE_FACTORY) => FactoryPolicy::ServiceInstancePerConsumer,
            _ => FactoryPolicy::Singleton,
        };

        let mut metadata = Self::new(specifications, factory);
        for property in element.elements(elements::PROPERTY) {
            match PropertyMetadata::from_element(property, configuration) {
                Ok(pm) => metadata.add_property(pm),
                Err(e) => warn!(
                    component = %component.class_name(),
                    error = %e,
                    "Ignoring malformed provided-service property"
                ),
            }
        }
        metadata
    }

    pub fn add_property(&mut self, property: PropertyMetadata) {
        self.properties.push(property);
    }

    pub fn specifications(&self) -> &[String] {
        &self.specifications
    }

    pub fn factory(&self) -> FactoryPolicy {
        self.factory
    }

    pub fn properties(&self) -> &[PropertyMetadata] {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut [PropertyMetadata] {
        &mut self.properties
    }
}

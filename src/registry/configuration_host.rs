//! # Configuration Host
//!
//! Publication surface for re-configurable components: a host (typically a
//! configuration admin) keeps a target per identity and pushes new
//! configurations to it.

use crate::error::{LifecycleError, Result};
use crate::value::Dictionary;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Receiver of live configuration updates.
///
/// `None` signals an explicit clear of the configuration.
pub trait ManagedConfiguration: Send + Sync {
    fn updated(&self, configuration: Option<&Dictionary>);
}

/// Opaque handle on a published configuration endpoint
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicationHandle(Uuid);

impl PublicationHandle {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PublicationHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PublicationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "publication:{}", self.0)
    }
}

pub trait ConfigurationHost: Send + Sync {
    fn publish(
        &self,
        identity: &str,
        properties: &Dictionary,
        target: Arc<dyn ManagedConfiguration>,
    ) -> Result<PublicationHandle>;

    fn withdraw(&self, handle: PublicationHandle) -> Result<()>;
}

struct Publication {
    identity: String,
    properties: Dictionary,
    target: Arc<dyn ManagedConfiguration>,
}

/// In-process configuration host
#[derive(Default)]
pub struct InMemoryConfigurationHost {
    publications: DashMap<PublicationHandle, Publication>,
}

impl fmt::Debug for InMemoryConfigurationHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryConfigurationHost")
            .field("publications", &self.publications.len())
            .finish()
    }
}

impl InMemoryConfigurationHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_published(&self, identity: &str) -> bool {
        self.publications.iter().any(|p| p.identity == identity)
    }

    pub fn publication_count(&self) -> usize {
        self.publications.len()
    }

    /// Properties a publication was made with
    pub fn publication_properties(&self, identity: &str) -> Option<Dictionary> {
        self.publications
            .iter()
            .find(|p| p.identity == identity)
            .map(|p| p.properties.clone())
    }

    /// Deliver a configuration to every target published under `identity`.
    ///
    /// Returns the number of targets reached.
    pub fn push(&self, identity: &str, configuration: Option<Dictionary>) -> usize {
        // Collect targets first so no map guard is held during delivery
        let targets: Vec<Arc<dyn ManagedConfiguration>> = self
            .publications
            .iter()
            .filter(|p| p.identity == identity)
            .map(|p| Arc::clone(&p.target))
            .collect();

        if targets.is_empty() {
            warn!(identity = %identity, "No configuration target published");
        }

        for target in &targets {
            target.updated(configuration.as_ref());
        }
        targets.len()
    }
}

impl ConfigurationHost for InMemoryConfigurationHost {
    fn publish(
        &self,
        identity: &str,
        properties: &Dictionary,
        target: Arc<dyn ManagedConfiguration>,
    ) -> Result<PublicationHandle> {
        let handle = PublicationHandle::new();
        self.publications.insert(
            handle.clone(),
            Publication {
                identity: identity.to_string(),
                properties: properties.clone(),
                target,
            },
        );
        debug!(%handle, identity = %identity, "Configuration endpoint published");
        Ok(handle)
    }

    fn withdraw(&self, handle: PublicationHandle) -> Result<()> {
        self.publications
            .remove(&handle)
            .map(|_| debug!(%handle, "Configuration endpoint withdrawn"))
            .ok_or_else(|| LifecycleError::UnknownHandle(handle.to_string()))
    }
}

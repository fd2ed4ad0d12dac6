//! Registry of named flows.

use crate::error::RegistryError;
use crate::flow::{Flow, FlowDescriptor};
use promptflow_core::Result;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Holds every flow by name.
///
/// Filled once at startup, then shared read-only.
#[derive(Clone, Default)]
pub struct FlowRegistry {
    flows: BTreeMap<String, Arc<dyn Flow>>,
}

impl FlowRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            flows: BTreeMap::new(),
        }
    }

    /// Registers a flow under its own name.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateName` if the name is taken; the existing flow is kept.
    pub fn register(&mut self, flow: impl Flow + 'static) -> Result<(), RegistryError> {
        self.register_shared(Arc::new(flow))
    }

    /// Registers an already shared flow.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateName` if the name is taken; the existing flow is kept.
    pub fn register_shared(&mut self, flow: Arc<dyn Flow>) -> Result<(), RegistryError> {
        let name = flow.name().to_string();
        if self.flows.contains_key(&name) {
            return Err(RegistryError::DuplicateName { name }.into());
        }
        debug!(flow = %name, "Registered flow");
        self.flows.insert(name, flow);
        Ok(())
    }

    /// Gets a flow by name.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no flow has this name.
    pub fn get(&self, name: &str) -> Result<Arc<dyn Flow>, RegistryError> {
        self.flows.get(name).cloned().ok_or_else(|| {
            RegistryError::NotFound {
                name: name.to_string(),
            }
            .into()
        })
    }

    /// Describes every registered flow, ordered by name.
    #[must_use]
    pub fn list(&self) -> Vec<FlowDescriptor> {
        self.flows.values().map(|flow| flow.descriptor()).collect()
    }

    /// Returns the number of registered flows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.flows.len()
    }

    /// Returns whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }
}

impl fmt::Debug for FlowRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlowRegistry")
            .field("flows", &self.flows.keys().collect::<Vec<_>>())
            .finish()
    }
}

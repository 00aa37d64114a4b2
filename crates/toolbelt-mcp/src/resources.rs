//! Read-only resources served by `resources/list` and `resources/read`.

use std::sync::Arc;

use serde_json::Value;
use toolbelt_core::{Error, Result};

use crate::protocol::{ResourceContents, ResourceDefinition};

const JSON_MIME: &str = "application/json";

type ReaderFn = dyn Fn() -> Result<Value> + Send + Sync;

/// A resource and the function producing its current contents.
pub struct ResourceDescriptor {
    uri: String,
    name: String,
    description: Option<String>,
    reader: Arc<ReaderFn>,
}

impl ResourceDescriptor {
    /// A JSON resource rendered fresh on every read.
    pub fn json<F>(uri: impl Into<String>, name: impl Into<String>, reader: F) -> Self
    where
        F: Fn() -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            uri: uri.into(),
            name: name.into(),
            description: None,
            reader: Arc::new(reader),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    fn definition(&self) -> ResourceDefinition {
        ResourceDefinition {
            uri: self.uri.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            mime_type: Some(JSON_MIME.to_string()),
        }
    }

    fn read(&self) -> Result<ResourceContents> {
        let value = (self.reader.as_ref())()?;
        Ok(ResourceContents {
            uri: self.uri.clone(),
            mime_type: Some(JSON_MIME.to_string()),
            text: serde_json::to_string_pretty(&value)?,
        })
    }
}

/// Resources of one server, in registration order.
#[derive(Default)]
pub struct ResourceRegistry {
    resources: Vec<ResourceDescriptor>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, resource: ResourceDescriptor) -> Self {
        self.resources.push(resource);
        self
    }

    pub fn list(&self) -> Vec<ResourceDefinition> {
        self.resources.iter().map(|r| r.definition()).collect()
    }

    /// Read a resource by URI.
    ///
    /// Unknown URIs are `InvalidInput`; the server maps that to -32602.
    pub fn read(&self, uri: &str) -> Result<ResourceContents> {
        let resource = self
            .resources
            .iter()
            .find(|r| r.uri == uri)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown resource: {}", uri)))?;
        resource.read()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

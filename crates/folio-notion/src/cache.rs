//! Credential-keyed cache of content-source clients.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use crate::client::{NotionClient, NotionConfig};
use crate::error::Result;
use crate::source::SharedSource;

type Factory = dyn Fn(&str) -> Result<SharedSource> + Send + Sync;

/// Maps an access token to its already-built client.
///
/// Entries are only ever added. The lock is held while a missing client is
/// built, so two requests racing on a new token end up sharing one client.
pub struct ClientCache {
    clients: Mutex<HashMap<String, SharedSource>>,
    factory: Box<Factory>,
}

impl std::fmt::Debug for ClientCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCache")
            .field("clients", &self.len())
            .finish_non_exhaustive()
    }
}

impl ClientCache {
    /// A cache that builds [`NotionClient`]s from `template` with the token swapped in.
    pub fn notion(template: NotionConfig) -> Self {
        Self::with_factory(move |token| {
            let client = NotionClient::new(template.for_token(token))?;
            Ok(Arc::new(client) as SharedSource)
        })
    }

    /// A cache with a custom client factory.
    pub fn with_factory<F>(factory: F) -> Self
    where
        F: Fn(&str) -> Result<SharedSource> + Send + Sync + 'static,
    {
        Self {
            clients: Mutex::new(HashMap::new()),
            factory: Box::new(factory),
        }
    }

    /// Get the client for `token`, building it on first use.
    pub fn source_for(&self, token: &str) -> Result<SharedSource> {
        let mut clients = self.clients.lock();
        if let Some(existing) = clients.get(token) {
            return Ok(existing.clone());
        }

        let source = (self.factory)(token)?;
        clients.insert(token.to_string(), source.clone());
        tracing::debug!(cached = clients.len(), "Created content source client");
        Ok(source)
    }

    /// Number of cached clients.
    pub fn len(&self) -> usize {
        self.clients.lock().len()
    }

    /// Returns true if no client has been built yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

//! # Identity Map
//!
//! [`ResourceManager`] guarantees that every remote entity has at most one live
//! in-memory instance per session. Nested payloads met during hydration are
//! resolved through [`ResourceManager::get_or_create`]: if an instance already
//! exists for the payload's self URL it is returned (and refreshed with the
//! payload), otherwise a new one is built, hydrated and registered.
//!
//! The registry owns what it resolves: a registered resource lives as long as
//! the session, so unsaved edits on a nested resource survive every re-hydration
//! of its parent.
//!
//! Transient resources have no URL to register under. They are kept in a pending
//! list and promoted into the registry once they acquire one, either eagerly
//! after a successful create or lazily the first time their URL is resolved.

use crate::framework::entity::{downcast, AnyResource, Resource};
use crate::framework::error::ResourceError;
use crate::framework::link;
use crate::framework::state::ResourceState;
use crate::lifecycle::Session;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tracing::{debug, info, warn};

#[derive(Default)]
struct Registry {
    by_url: HashMap<String, Arc<dyn AnyResource>>,
    pending: Vec<Weak<dyn AnyResource>>,
}

impl Registry {
    fn live(&self, url: &str) -> Option<Arc<dyn AnyResource>> {
        self.by_url.get(url).cloned()
    }

    /// Register `resource` under `url` unless another instance owns it.
    fn insert(&mut self, url: String, resource: &Arc<dyn AnyResource>) -> bool {
        if let Some(existing) = self.by_url.get(&url) {
            if !std::ptr::addr_eq(Arc::as_ptr(existing), Arc::as_ptr(resource)) {
                warn!(url = %url, kind = resource.resource_kind(), "URL already owned by another instance");
                return false;
            }
            return true;
        }
        self.by_url.insert(url, resource.clone());
        true
    }

    /// Track a transient resource, dropping pending entries nobody holds anymore.
    fn push_pending(&mut self, resource: &Arc<dyn AnyResource>) {
        self.pending.retain(|weak| weak.strong_count() > 0);
        self.pending.push(Arc::downgrade(resource));
    }

    /// Move pending resources that gained a URL into the registry.
    ///
    /// Dropped transient resources are discarded on the way.
    fn promote(&mut self) -> usize {
        let mut promoted = 0;
        let pending = std::mem::take(&mut self.pending);
        for weak in pending {
            let Some(resource) = weak.upgrade() else {
                continue;
            };
            match resource.resource_state().url() {
                Some(url) => {
                    debug!(url = %url, kind = resource.resource_kind(), "Promoting");
                    if self.insert(url, &resource) {
                        promoted += 1;
                    }
                }
                None => self.pending.push(weak),
            }
        }
        promoted
    }

    fn resolve(&mut self, url: &str) -> Option<Arc<dyn AnyResource>> {
        if let Some(resource) = self.live(url) {
            return Some(resource);
        }
        if self.promote() > 0 {
            return self.live(url);
        }
        None
    }
}

/// Per-session identity map of live resources, keyed by self URL.
///
/// Cheap to clone; clones share the same registry.
#[derive(Clone, Default)]
pub struct ResourceManager {
    inner: Arc<Mutex<Registry>>,
}

enum Resolution<R> {
    Existing(Arc<dyn AnyResource>),
    Created(Arc<R>),
}

impl ResourceManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Track a newly constructed resource.
    ///
    /// Persistent resources are registered under their URL. Transient ones wait
    /// in the pending list until they have one.
    pub fn add_resource<R: Resource>(&self, resource: &Arc<R>) {
        let erased: Arc<dyn AnyResource> = resource.clone();
        let mut registry = self.lock();
        match resource.url() {
            Some(url) => {
                registry.insert(url, &erased);
            }
            None => registry.push_pending(&erased),
        }
    }

    /// Resolve a raw nested payload into its canonical instance.
    ///
    /// * A registered URL returns the existing instance, after hydrating it with
    ///   the payload (dirty fields are kept).
    /// * An unknown URL builds, hydrates and registers a new `R`.
    /// * A payload without a self link cannot be deduplicated; it resolves to a
    ///   fresh transient instance.
    ///
    /// The only error is a URL already bound to a resource of another kind.
    pub async fn get_or_create<R: Resource>(
        &self,
        session: &Session,
        raw: &Value,
    ) -> Result<Arc<R>, ResourceError> {
        let Some(url) = link::payload_self_href(raw) else {
            warn!(kind = R::KIND, "Nested payload has no self link, resolving to a transient instance");
            let created = Arc::new(R::from_state(ResourceState::with_payload(
                session,
                R::KIND,
                R::FIELD_NAMES,
                raw,
            )));
            self.add_resource(&created);
            return Ok(created);
        };

        let resolution = {
            let mut registry = self.lock();
            match registry.resolve(&url) {
                Some(existing) => Resolution::Existing(existing),
                None => {
                    let created = Arc::new(R::from_state(ResourceState::with_payload(
                        session,
                        R::KIND,
                        R::FIELD_NAMES,
                        raw,
                    )));
                    let erased: Arc<dyn AnyResource> = created.clone();
                    registry.by_url.insert(url.clone(), erased);
                    Resolution::Created(created)
                }
            }
        };

        match resolution {
            Resolution::Created(created) => {
                info!(kind = R::KIND, url = %url, "Registered");
                Ok(created)
            }
            Resolution::Existing(existing) => {
                let existing: Arc<R> = downcast(&url, existing)?;
                existing.state().hydrate(raw).await;
                debug!(kind = R::KIND, url = %url, "Reused");
                Ok(existing)
            }
        }
    }

    /// The instance registered under `url`, if any.
    pub fn lookup(&self, url: &str) -> Option<Arc<dyn AnyResource>> {
        self.lock().resolve(url)
    }

    /// Typed [`lookup`](Self::lookup).
    pub fn lookup_as<R: Resource>(&self, url: &str) -> Result<Option<Arc<R>>, ResourceError> {
        self.lookup(url)
            .map(|resource| downcast(url, resource))
            .transpose()
    }

    /// Register every pending resource that has acquired a URL.
    pub fn promote_pending(&self) -> usize {
        self.lock().promote()
    }

    /// Number of registered resources.
    pub fn len(&self) -> usize {
        self.lock().by_url.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for ResourceManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.lock();
        f.debug_struct("ResourceManager")
            .field("registered", &registry.by_url.len())
            .field("pending", &registry.pending.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::fixtures::{links, session, Part, Widget};
    use crate::framework::mock::MockTransport;
    use serde_json::json;

    #[tokio::test]
    async fn test_same_url_resolves_to_same_instance() {
        let mock = Arc::new(MockTransport::new());
        let session = session(&mock);
        let manager = session.manager();

        let first: Arc<Part> = manager
            .get_or_create(&session, &json!({ "links": links("/p/1"), "sku": "a" }))
            .await
            .unwrap();
        let second: Arc<Part> = manager
            .get_or_create(&session, &json!({ "links": links("/p/1"), "sku": "b" }))
            .await
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        let sku: Option<String> = first.state().get("sku").await.unwrap();
        assert_eq!(sku.as_deref(), Some("b"));
        assert_eq!(manager.len(), 1);
        assert_eq!(mock.request_count(), 0);
    }

    #[tokio::test]
    async fn test_reuse_keeps_dirty_fields() {
        let mock = Arc::new(MockTransport::new());
        let session = session(&mock);
        let manager = session.manager();

        let part: Arc<Part> = manager
            .get_or_create(&session, &json!({ "links": links("/p/1"), "sku": "a" }))
            .await
            .unwrap();
        part.state().set("sku", "local").await.unwrap();
        let _: Arc<Part> = manager
            .get_or_create(&session, &json!({ "links": links("/p/1"), "sku": "remote" }))
            .await
            .unwrap();

        let sku: Option<String> = part.state().get("sku").await.unwrap();
        assert_eq!(sku.as_deref(), Some("local"));
    }

    #[tokio::test]
    async fn test_payload_without_self_link_stays_transient() {
        let mock = Arc::new(MockTransport::new());
        let session = session(&mock);
        let manager = session.manager();

        let part: Arc<Part> = manager
            .get_or_create(&session, &json!({ "sku": "loose" }))
            .await
            .unwrap();

        assert!(part.is_transient());
        assert!(manager.is_empty());
        let sku: Option<String> = part.state().get("sku").await.unwrap();
        assert_eq!(sku.as_deref(), Some("loose"));
    }

    #[tokio::test]
    async fn test_pending_resource_is_promoted_on_lookup() {
        let mock = Arc::new(MockTransport::new());
        let session = session(&mock);
        let manager = session.manager();

        let part = session.create::<Part>();
        assert!(manager.lookup("/p/5").is_none());

        part.state().hydrate(&json!({ "links": links("/p/5") })).await;
        let found = manager.lookup_as::<Part>("/p/5").unwrap().unwrap();
        assert!(Arc::ptr_eq(&found, &part));

        let resolved: Arc<Part> = manager
            .get_or_create(&session, &json!({ "links": links("/p/5") }))
            .await
            .unwrap();
        assert!(Arc::ptr_eq(&resolved, &part));
    }

    #[tokio::test]
    async fn test_url_bound_to_other_kind_is_an_error() {
        let mock = Arc::new(MockTransport::new());
        let session = session(&mock);
        let manager = session.manager();

        let _part: Arc<Part> = manager
            .get_or_create(&session, &json!({ "links": links("/x/1") }))
            .await
            .unwrap();
        let result = manager
            .get_or_create::<Widget>(&session, &json!({ "links": links("/x/1") }))
            .await;

        assert!(matches!(
            result,
            Err(ResourceError::KindMismatch { expected: "Widget", found: "Part", .. })
        ));
    }

    #[tokio::test]
    async fn test_registry_keeps_resources_after_callers_drop_them() {
        let mock = Arc::new(MockTransport::new());
        let session = session(&mock);
        let manager = session.manager();

        let part: Arc<Part> = manager
            .get_or_create(&session, &json!({ "links": links("/p/1"), "sku": "S-1" }))
            .await
            .unwrap();
        part.state().set("sku", "edited").await.unwrap();
        drop(part);

        assert_eq!(manager.len(), 1);
        let again: Arc<Part> = manager
            .get_or_create(&session, &json!({ "links": links("/p/1"), "sku": "S-1" }))
            .await
            .unwrap();
        let sku: Option<String> = again.state().get("sku").await.unwrap();
        assert_eq!(sku.as_deref(), Some("edited"));
        assert!(again.state().is_dirty("sku").await);
        assert_eq!(mock.request_count(), 0);
    }

    #[tokio::test]
    async fn test_many_resolved_urls_stay_registered() {
        let mock = Arc::new(MockTransport::new());
        let session = session(&mock);
        let manager = session.manager();

        for i in 0..100 {
            let payload = json!({ "links": links(&format!("/p/{}", i)) });
            let _: Arc<Part> = manager.get_or_create(&session, &payload).await.unwrap();
        }
        assert_eq!(manager.len(), 100);
        assert_eq!(manager.lock().by_url.len(), 100);
        assert!(manager.lookup("/p/42").is_some());
    }

    #[tokio::test]
    async fn test_dropped_transient_resources_leave_pending_list() {
        let mock = Arc::new(MockTransport::new());
        let session = session(&mock);

        for _ in 0..100 {
            drop(session.create::<Part>());
        }
        let kept = session.create::<Part>();

        assert_eq!(session.manager().lock().pending.len(), 1);
        assert!(session.manager().is_empty());
        kept.state().hydrate(&json!({ "links": links("/p/kept") })).await;
        assert_eq!(session.manager().promote_pending(), 1);
        assert!(session.manager().lock().pending.is_empty());
    }

    #[tokio::test]
    async fn test_resource_outliving_session_cannot_fetch() {
        let mock = Arc::new(MockTransport::new());
        let session = session(&mock);
        let part = session.find::<Part>("/p/1").await.unwrap();

        drop(session);

        assert!(matches!(
            part.state().session(),
            Err(ResourceError::SessionClosed { kind: "Part" })
        ));
        let result = part.state().get::<String>("sku").await;
        assert!(matches!(result, Err(ResourceError::SessionClosed { .. })));
        assert_eq!(mock.request_count(), 0);
        assert_eq!(part.url().as_deref(), Some("/p/1"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_resolution_yields_one_instance() {
        let mock = Arc::new(MockTransport::new());
        let session = session(&mock);

        let mut handles = Vec::new();
        for i in 0..16 {
            let session = session.clone();
            handles.push(tokio::spawn(async move {
                session
                    .manager()
                    .get_or_create::<Part>(
                        &session,
                        &json!({ "links": links("/p/shared"), "sku": format!("s{}", i) }),
                    )
                    .await
                    .unwrap()
            }));
        }

        let mut parts = Vec::new();
        for handle in handles {
            parts.push(handle.await.unwrap());
        }
        assert!(parts.iter().all(|part| Arc::ptr_eq(part, &parts[0])));
        assert_eq!(session.manager().len(), 1);
    }
}

//! # Hydration Engine
//!
//! [`ResourceState`] is the value every concrete resource embeds. It owns the
//! field state of one remote entity and implements the whole load/save protocol:
//!
//! * **Lazy hydration**: reading a field that was never fetched issues one GET
//!   against the resource's self URL and hydrates every field from the response.
//! * **Dirty tracking**: writes record the field name in an insertion-ordered
//!   dirty set. Dirty values are local truth and incoming payloads never
//!   overwrite them.
//! * **Nested resolution**: object-valued fields are resolved through the
//!   session's [`ResourceManager`](crate::framework::ResourceManager) on first
//!   typed read, and the canonical instance replaces the raw payload.
//! * **Save**: only dirty fields are sent, as a POST to the creation endpoint
//!   while transient or a PUT to the self URL otherwise.
//!
//! ## Concurrency
//!
//! Field state sits behind one `tokio::sync::Mutex` per resource. Fetches and
//! saves hold it across the transport call, so concurrent readers of an
//! unhydrated field cause a single GET. Nested resolution releases the lock before
//! calling into the manager and re-takes it to memoize the result, so two
//! resource locks are never held at the same time.
//!
//! The self URL is cached outside that lock so the identity map can read it
//! synchronously.

use crate::framework::entity::{downcast, AnyResource, Resource};
use crate::framework::error::ResourceError;
use crate::framework::field::{json_kind, Field, FieldValue};
use crate::framework::link::{self, LINKS_FIELD};
use crate::framework::query::Query;
use crate::framework::transport::Method;
use crate::lifecycle::{Session, WeakSession};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

/// Hydrated values plus the dirty set of one resource.
#[derive(Default)]
struct FieldStore {
    hydrated: HashMap<String, FieldValue>,
    dirty: Vec<String>,
}

impl FieldStore {
    fn is_dirty(&self, name: &str) -> bool {
        self.dirty.iter().any(|dirty| dirty == name)
    }

    fn mark_dirty(&mut self, name: &str) {
        if !self.is_dirty(name) {
            self.dirty.push(name.to_string());
        }
    }

    fn links_href(&self) -> Option<String> {
        match self.hydrated.get(LINKS_FIELD) {
            Some(FieldValue::Raw(links)) => link::self_href(links),
            _ => None,
        }
    }

    /// Copy every non-dirty entry of `data` into the hydrated map.
    fn absorb(&mut self, kind: &'static str, data: &Value) -> usize {
        let entries = match data {
            Value::Null => return 0,
            Value::Object(entries) => entries,
            other => {
                warn!(kind, found = json_kind(other), "Ignoring non-object payload");
                return 0;
            }
        };

        let mut applied = 0;
        for (name, value) in entries {
            if self.is_dirty(name) {
                debug!(kind, field = %name, "Keeping dirty value");
                continue;
            }
            self.hydrated
                .insert(name.clone(), FieldValue::Raw(value.clone()));
            applied += 1;
        }
        applied
    }
}

/// Shared hydration engine embedded in every resource.
pub struct ResourceState {
    session: WeakSession,
    kind: &'static str,
    field_names: &'static [&'static str],
    store: Mutex<FieldStore>,
    self_url: RwLock<Option<String>>,
}

impl ResourceState {
    /// A transient state with nothing hydrated.
    pub fn new(
        session: &Session,
        kind: &'static str,
        field_names: &'static [&'static str],
    ) -> Self {
        Self {
            session: session.downgrade(),
            kind,
            field_names,
            store: Mutex::new(FieldStore::default()),
            self_url: RwLock::new(None),
        }
    }

    /// A state hydrated from `payload` before anyone else can observe it.
    pub(crate) fn with_payload(
        session: &Session,
        kind: &'static str,
        field_names: &'static [&'static str],
        payload: &Value,
    ) -> Self {
        let mut store = FieldStore::default();
        store.absorb(kind, payload);
        let url = store.links_href();
        Self {
            session: session.downgrade(),
            kind,
            field_names,
            store: Mutex::new(store),
            self_url: RwLock::new(url),
        }
    }

    /// The session this resource was built in, while it is still alive.
    pub fn session(&self) -> Result<Session, ResourceError> {
        self.session
            .upgrade()
            .ok_or(ResourceError::SessionClosed { kind: self.kind })
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn field_names(&self) -> &'static [&'static str] {
        self.field_names
    }

    /// Target of the `self` link, if the links are known.
    ///
    /// This never fetches: a resource whose links were never loaded has no URL
    /// to load them from.
    pub fn url(&self) -> Option<String> {
        self.self_url
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_transient(&self) -> bool {
        self.url().is_none()
    }

    fn sync_url(&self, store: &FieldStore) {
        *self.self_url.write().unwrap_or_else(PoisonError::into_inner) = store.links_href();
    }

    // --- Inspection ---

    /// Load state of a field, without fetching.
    pub async fn field(&self, name: &str) -> Field {
        match self.store.lock().await.hydrated.get(name) {
            Some(value) => Field::Known(value.clone()),
            None => Field::NotLoaded,
        }
    }

    /// Dirty field names, in modification order.
    pub async fn dirty_fields(&self) -> Vec<String> {
        self.store.lock().await.dirty.clone()
    }

    pub async fn is_dirty(&self, name: &str) -> bool {
        self.store.lock().await.is_dirty(name)
    }

    pub async fn has_dirty_fields(&self) -> bool {
        !self.store.lock().await.dirty.is_empty()
    }

    // --- Fetch / hydrate ---

    /// Run the fetch protocol against `url`, with the store already locked.
    async fn init(&self, store: &mut FieldStore, url: Option<&str>) -> Result<(), ResourceError> {
        let Some(url) = url else {
            debug!(kind = self.kind, "Transient, nothing to fetch");
            return Ok(());
        };

        let session = self.session()?;
        info!(kind = self.kind, url, "Fetching");
        let data = session
            .transport()
            .request(session.auth(), url, Method::Get, None)
            .await?;
        let applied = store.absorb(self.kind, &data);

        // Declared fields the server left out are known to be empty. Links are
        // identity, not data: an omitted `links` keeps the known URL.
        let mut absent = 0;
        for name in self.field_names {
            if *name != LINKS_FIELD && !store.is_dirty(name) && data.get(name).is_none() {
                store.hydrated.insert(name.to_string(), FieldValue::null());
                absent += 1;
            }
        }
        self.sync_url(store);
        debug!(kind = self.kind, url, applied, absent, "Hydrated");
        Ok(())
    }

    /// Fetch if `name` was never loaded, and return the guard either way.
    async fn loaded(
        &self,
        name: &str,
    ) -> Result<tokio::sync::MutexGuard<'_, FieldStore>, ResourceError> {
        let mut store = self.store.lock().await;
        if !store.hydrated.contains_key(name) {
            let url = self.url();
            self.init(&mut store, url.as_deref()).await?;
            if url.is_some() && !store.hydrated.contains_key(name) && !store.is_dirty(name) {
                // Undeclared and absent: remember that too, or every read refetches.
                store.hydrated.insert(name.to_string(), FieldValue::null());
            }
        }
        Ok(store)
    }

    /// Re-run the fetch protocol even if fields are already hydrated.
    ///
    /// Dirty fields keep their local values.
    #[instrument(skip(self), fields(kind = self.kind))]
    pub async fn refresh(&self) -> Result<(), ResourceError> {
        let mut store = self.store.lock().await;
        let url = self.url();
        self.init(&mut store, url.as_deref()).await
    }

    /// Apply a server payload to every non-dirty field it names.
    ///
    /// A `null` payload is a no-op.
    pub async fn hydrate(&self, data: &Value) {
        let mut store = self.store.lock().await;
        let applied = store.absorb(self.kind, data);
        self.sync_url(&store);
        debug!(kind = self.kind, applied, "Hydrate");
    }

    // --- Getters ---

    /// Current value of `name`, fetching first if it was never loaded.
    ///
    /// A field that is unknown after the fetch (or on a transient resource)
    /// reads as `null`.
    pub async fn get_value(&self, name: &str) -> Result<FieldValue, ResourceError> {
        let store = self.loaded(name).await?;
        Ok(store
            .hydrated
            .get(name)
            .cloned()
            .unwrap_or_else(FieldValue::null))
    }

    /// Typed read of a plain field. `null` reads as `None`.
    pub async fn get<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, ResourceError> {
        match self.get_value(name).await? {
            FieldValue::Raw(Value::Null) => Ok(None),
            FieldValue::Raw(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|source| ResourceError::Decode {
                    field: name.to_string(),
                    source,
                }),
            FieldValue::Resource(resource) => Err(ResourceError::UnexpectedShape {
                field: name.to_string(),
                found: resource.resource_kind(),
            }),
        }
    }

    /// Read a nested resource, resolving its payload into the canonical instance.
    ///
    /// Resolution happens once per field: the resolved instance replaces the raw
    /// payload in the hydrated map.
    pub async fn get_resource<R: Resource>(
        &self,
        name: &str,
    ) -> Result<Option<Arc<R>>, ResourceError> {
        let raw = match self.get_value(name).await? {
            FieldValue::Resource(resource) => return downcast(name, resource).map(Some),
            FieldValue::Raw(Value::Null) => return Ok(None),
            FieldValue::Raw(raw @ Value::Object(_)) => raw,
            FieldValue::Raw(other) => {
                return Err(ResourceError::UnexpectedShape {
                    field: name.to_string(),
                    found: json_kind(&other),
                })
            }
        };

        let session = self.session()?;
        let resolved: Arc<R> = session.manager().get_or_create(&session, &raw).await?;

        let mut store = self.store.lock().await;
        if let Some(FieldValue::Resource(other)) = store.hydrated.get(name) {
            // Another reader memoized first.
            return downcast(name, other.clone()).map(Some);
        }
        let still_raw = matches!(
            store.hydrated.get(name),
            Some(FieldValue::Raw(current)) if *current == raw
        );
        if still_raw {
            let erased: Arc<dyn AnyResource> = resolved.clone();
            store
                .hydrated
                .insert(name.to_string(), FieldValue::Resource(erased));
            debug!(kind = self.kind, field = name, nested = R::KIND, "Resolved");
        } else {
            debug!(kind = self.kind, field = name, "Field changed during resolution");
        }
        Ok(Some(resolved))
    }

    // --- Setters ---

    /// Overwrite `name` and mark it dirty, unless it already holds an equal
    /// non-null value.
    pub async fn set_value(&self, name: &str, value: FieldValue) {
        let mut store = self.store.lock().await;
        let unchanged = matches!(
            store.hydrated.get(name),
            Some(current) if !current.is_null() && *current == value
        );
        if unchanged {
            debug!(kind = self.kind, field = name, "Unchanged");
            return;
        }

        store.mark_dirty(name);
        store.hydrated.insert(name.to_string(), value);
        if name == LINKS_FIELD {
            self.sync_url(&store);
        }
        debug!(kind = self.kind, field = name, "Dirty");
    }

    pub async fn set<T: Serialize>(&self, name: &str, value: T) -> Result<(), ResourceError> {
        let value = serde_json::to_value(value).map_err(|source| ResourceError::Encode {
            field: name.to_string(),
            source,
        })?;
        self.set_value(name, FieldValue::Raw(value)).await;
        Ok(())
    }

    /// Point a nested-resource field at `resource`, or clear it with `None`.
    pub async fn set_resource<R: Resource>(&self, name: &str, resource: Option<&Arc<R>>) {
        let value = match resource {
            Some(resource) => {
                let erased: Arc<dyn AnyResource> = resource.clone();
                FieldValue::Resource(erased)
            }
            None => FieldValue::null(),
        };
        self.set_value(name, value).await;
    }

    // --- Save ---

    /// Persist the dirty fields.
    ///
    /// Transient resources are created with a POST to `create_url`; persistent
    /// ones are updated with a PUT to their self URL. The response re-hydrates
    /// every non-dirty field, then the dirty set is cleared. Returns `false` when
    /// there was nothing to send. On failure the dirty set is left as it was.
    #[instrument(skip(self), fields(kind = self.kind))]
    pub async fn save(&self, create_url: &str) -> Result<bool, ResourceError> {
        let mut store = self.store.lock().await;
        if store.dirty.is_empty() {
            debug!("Nothing to save");
            return Ok(false);
        }

        let (url, method) = match self.url() {
            None => (create_url.to_string(), Method::Post),
            Some(url) => (url, Method::Put),
        };
        let values: Vec<(String, Value)> = store
            .dirty
            .iter()
            .map(|name| {
                let value = store
                    .hydrated
                    .get(name)
                    .map(FieldValue::to_json)
                    .unwrap_or(Value::Null);
                (name.clone(), value)
            })
            .collect();
        let query = Query::new().select(store.dirty.iter().cloned()).equal(values);

        let session = self.session()?;
        info!(%method, url = %url, fields = store.dirty.len(), "Saving");
        let data = session
            .transport()
            .request(session.auth(), &url, method, Some(&query))
            .await?;

        store.absorb(self.kind, &data);
        store.dirty.clear();
        self.sync_url(&store);
        drop(store);

        if method == Method::Post {
            match self.url() {
                Some(url) => {
                    info!(url = %url, "Created");
                    session.manager().promote_pending();
                }
                None => warn!("Create response carried no self link"),
            }
        }
        Ok(true)
    }
}

impl fmt::Debug for ResourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceState")
            .field("kind", &self.kind)
            .field("url", &self.url())
            .finish_non_exhaustive()
    }
}

use crate::framework::{
    link, Authentication, Resource, ResourceError, ResourceManager, ResourceState, Transport,
};
use crate::lifecycle::SessionConfig;
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::debug;

/// The context every resource is built in.
///
/// `Session` wires the collaborators together: the credentials forwarded on
/// every request, the transport that performs them, the identity map that
/// deduplicates instances, and the endpoint configuration.
///
/// # Scope
///
/// Each session owns its own [`ResourceManager`]. Two sessions never share
/// instances, which keeps tests isolated and lets one process talk to the API
/// under different credentials.
///
/// Registered resources live as long as the session does. They point back at it
/// through a [`WeakSession`], so dropping the last `Session` handle frees the
/// whole registry; fetches and saves on a resource that outlived it fail with
/// [`ResourceError::SessionClosed`].
///
/// # Example
///
/// ```ignore
/// let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new());
/// let session = Session::new(Authentication::new("user", "secret"), transport);
///
/// let listing = session.find::<Listing>("https://api.example.com/listings/42").await?;
/// let price = listing.list_price().await?;   // first read fetches
///
/// let draft = Listing::new(&session);         // transient
/// draft.set_status("active").await?;
/// draft.save().await?;                         // POST to the listings endpoint
/// ```
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    auth: Authentication,
    transport: Arc<dyn Transport>,
    manager: ResourceManager,
    config: SessionConfig,
}

/// Non-owning handle to a [`Session`], held by every resource it builds.
#[derive(Clone)]
pub struct WeakSession {
    inner: Weak<SessionInner>,
}

impl WeakSession {
    pub fn upgrade(&self) -> Option<Session> {
        self.inner.upgrade().map(|inner| Session { inner })
    }
}

impl fmt::Debug for WeakSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakSession")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

impl Session {
    /// Creates a session with the default configuration.
    pub fn new(auth: Authentication, transport: Arc<dyn Transport>) -> Self {
        Self::with_config(auth, transport, SessionConfig::default())
    }

    pub fn with_config(
        auth: Authentication,
        transport: Arc<dyn Transport>,
        config: SessionConfig,
    ) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                auth,
                transport,
                manager: ResourceManager::new(),
                config,
            }),
        }
    }

    pub fn downgrade(&self) -> WeakSession {
        WeakSession {
            inner: Arc::downgrade(&self.inner),
        }
    }

    pub fn auth(&self) -> &Authentication {
        &self.inner.auth
    }

    pub fn transport(&self) -> &dyn Transport {
        self.inner.transport.as_ref()
    }

    pub fn manager(&self) -> &ResourceManager {
        &self.inner.manager
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// Absolute URL for an endpoint path under the configured base URL.
    pub fn endpoint(&self, path: &str) -> String {
        self.inner.config.endpoint(path)
    }

    /// Construct a new transient resource and register it with the manager.
    pub fn create<R: Resource>(&self) -> Arc<R> {
        let resource = Arc::new(R::from_state(ResourceState::new(
            self,
            R::KIND,
            R::FIELD_NAMES,
        )));
        self.manager().add_resource(&resource);
        debug!(kind = R::KIND, "Constructed transient resource");
        resource
    }

    /// The canonical instance for a known URL.
    ///
    /// Nothing is fetched here; the first field read does that.
    pub async fn find<R: Resource>(&self, url: &str) -> Result<Arc<R>, ResourceError> {
        if let Some(existing) = self.manager().lookup_as::<R>(url)? {
            return Ok(existing);
        }
        self.manager()
            .get_or_create(self, &link::self_link_payload(url))
            .await
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("auth", &self.inner.auth)
            .field("manager", &self.inner.manager)
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

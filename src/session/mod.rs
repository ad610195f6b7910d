//! Tenant Session Context: the current store coordinates, the backend
//! credentials resolved for them, and request-tagged resolution so a slow
//! answer for an old pair never overwrites the state of a newer one.

pub mod store;

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::SecretString;
use tokio::sync::RwLock;

use crate::{
    errors::{AppError, AppResult},
    models::domain::{
        credentials::{COLOR_THEME, OPENROUTER_KEY, SUPABASE_ANON_KEY, SUPABASE_URL},
        CredentialDocument, StoreCoordinates,
    },
    rest::RestEnv,
    vault::{CredentialVault, EncryptionMode},
};

pub use store::{FileSessionStore, InMemorySessionStore, SessionStore};

/// Everything a request needs to talk to one tenant's backend.
#[derive(Clone, Debug)]
pub struct TenantSession {
    pub coordinates: StoreCoordinates,
    pub tenant_key: String,
    pub rest: RestEnv,
    pub openrouter_key: Option<SecretString>,
    pub color_theme: Option<String>,
}

impl TenantSession {
    pub fn from_document(coordinates: StoreCoordinates, document: &CredentialDocument) -> AppResult<Self> {
        let (Some(url), Some(anon_key)) = (
            document.non_empty(SUPABASE_URL),
            document.non_empty(SUPABASE_ANON_KEY),
        ) else {
            return Err(AppError::ValidationError(
                "Backend URL or anon key missing from stored credentials".to_string(),
            ));
        };

        let tenant_key = coordinates.tenant_key();
        Ok(TenantSession {
            rest: RestEnv::new(url, anon_key).with_tenant_key(tenant_key.clone()),
            tenant_key,
            openrouter_key: document
                .non_empty(OPENROUTER_KEY)
                .map(|k| SecretString::from(k.to_string())),
            color_theme: document.non_empty(COLOR_THEME).map(str::to_string),
            coordinates,
        })
    }
}

#[async_trait]
pub trait CredentialSource: Send + Sync {
    async fn resolve(&self, coords: &StoreCoordinates) -> AppResult<TenantSession>;
}

pub struct VaultCredentialSource {
    vault: CredentialVault,
    mode: EncryptionMode,
}

impl VaultCredentialSource {
    pub fn new(vault: CredentialVault, mode: EncryptionMode) -> Self {
        Self { vault, mode }
    }
}

#[async_trait]
impl CredentialSource for VaultCredentialSource {
    async fn resolve(&self, coords: &StoreCoordinates) -> AppResult<TenantSession> {
        let document = self.vault.load(coords, &self.mode).await?;
        TenantSession::from_document(coords.clone(), &document)
    }
}

#[derive(Clone, Debug)]
pub enum SessionStatus {
    Idle,
    Pending,
    Ready(TenantSession),
    Error(String),
}

impl SessionStatus {
    pub fn session(&self) -> Option<&TenantSession> {
        match self {
            SessionStatus::Ready(session) => Some(session),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, SessionStatus::Pending)
    }
}

struct SessionState {
    coordinates: Option<StoreCoordinates>,
    status: SessionStatus,
}

pub struct SessionContext {
    store: Arc<dyn SessionStore>,
    source: Arc<dyn CredentialSource>,
    state: RwLock<SessionState>,
}

impl SessionContext {
    pub fn new(store: Arc<dyn SessionStore>, source: Arc<dyn CredentialSource>) -> Self {
        Self {
            store,
            source,
            state: RwLock::new(SessionState {
                coordinates: None,
                status: SessionStatus::Idle,
            }),
        }
    }

    /// Explicit coordinates win and are persisted; otherwise the persisted
    /// pair, if any, is picked up.
    pub async fn initialize(&self, explicit: Option<StoreCoordinates>) -> AppResult<Option<StoreCoordinates>> {
        let coords = match explicit {
            Some(coords) => {
                self.store.save(&coords).await?;
                Some(coords)
            }
            None => self.store.load().await?,
        };

        let mut state = self.state.write().await;
        state.status = if coords.is_some() {
            SessionStatus::Pending
        } else {
            SessionStatus::Idle
        };
        state.coordinates = coords.clone();
        Ok(coords)
    }

    pub async fn set_coordinates(&self, coords: StoreCoordinates) -> AppResult<()> {
        self.store.save(&coords).await?;
        let mut state = self.state.write().await;
        state.coordinates = Some(coords);
        state.status = SessionStatus::Pending;
        Ok(())
    }

    /// Resolves credentials for the current pair. The outcome is applied only
    /// if the pair is unchanged when the lookup completes.
    pub async fn resolve(&self) -> SessionStatus {
        let tag = {
            let state = self.state.read().await;
            match &state.coordinates {
                Some(coords) => coords.clone(),
                None => return state.status.clone(),
            }
        };

        let outcome = self.source.resolve(&tag).await;

        let mut state = self.state.write().await;
        if state.coordinates.as_ref() != Some(&tag) {
            log::debug!("Discarding stale session resolution for bucket '{}'", tag.bucket);
            return state.status.clone();
        }

        state.status = match outcome {
            Ok(session) => {
                log::info!("Session ready for bucket '{}'", tag.bucket);
                SessionStatus::Ready(session)
            }
            Err(err) => {
                log::warn!("Session resolution failed for bucket '{}': {}", tag.bucket, err);
                SessionStatus::Error(err.to_string())
            }
        };
        state.status.clone()
    }

    pub async fn status(&self) -> SessionStatus {
        self.state.read().await.status.clone()
    }

    pub async fn coordinates(&self) -> Option<StoreCoordinates> {
        self.state.read().await.coordinates.clone()
    }

    pub async fn teardown(&self) -> AppResult<()> {
        self.store.clear().await?;
        let mut state = self.state.write().await;
        state.coordinates = None;
        state.status = SessionStatus::Idle;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tokio::sync::Notify;

    fn coords(store: &str) -> StoreCoordinates {
        StoreCoordinates::new(store, "fantoms").unwrap()
    }

    fn session_for(coords: &StoreCoordinates) -> TenantSession {
        let mut doc = CredentialDocument::new();
        doc.set(SUPABASE_URL, format!("https://{}.supabase.co", coords.store_id));
        doc.set(SUPABASE_ANON_KEY, "anon");
        TenantSession::from_document(coords.clone(), &doc).unwrap()
    }

    /// Resolves immediately unless a gate is registered for the store id.
    #[derive(Default)]
    struct GatedSource {
        gates: HashMap<String, (Arc<Notify>, Arc<Notify>)>,
        failing: Vec<String>,
    }

    #[async_trait]
    impl CredentialSource for GatedSource {
        async fn resolve(&self, coords: &StoreCoordinates) -> AppResult<TenantSession> {
            if let Some((started, release)) = self.gates.get(&coords.store_id) {
                started.notify_one();
                release.notified().await;
            }
            if self.failing.contains(&coords.store_id) {
                return Err(AppError::NotFound("no document".to_string()));
            }
            Ok(session_for(coords))
        }
    }

    fn context(source: GatedSource) -> (Arc<SessionContext>, Arc<InMemorySessionStore>) {
        let store = Arc::new(InMemorySessionStore::new());
        let ctx = SessionContext::new(store.clone(), Arc::new(source));
        (Arc::new(ctx), store)
    }

    #[test]
    fn test_tenant_session_requires_backend_credentials() {
        let mut doc = CredentialDocument::new();
        doc.set(SUPABASE_URL, "https://abc.supabase.co");
        assert!(TenantSession::from_document(coords("a"), &doc).is_err());

        doc.set(SUPABASE_ANON_KEY, "anon");
        let session = TenantSession::from_document(coords("a"), &doc).unwrap();
        assert_eq!(session.tenant_key, coords("a").tenant_key());
        assert_eq!(session.rest.tenant_key.as_deref(), Some(session.tenant_key.as_str()));
        assert!(session.openrouter_key.is_none());
    }

    #[tokio::test]
    async fn test_initialize_prefers_explicit_coordinates() {
        let (ctx, store) = context(GatedSource::default());
        store.save(&coords("persisted")).await.unwrap();

        let chosen = ctx.initialize(Some(coords("explicit"))).await.unwrap();
        assert_eq!(chosen, Some(coords("explicit")));
        assert_eq!(store.load().await.unwrap(), Some(coords("explicit")));
        assert!(ctx.status().await.is_pending());
    }

    #[tokio::test]
    async fn test_initialize_falls_back_to_persisted() {
        let (ctx, store) = context(GatedSource::default());
        store.save(&coords("persisted")).await.unwrap();

        assert_eq!(ctx.initialize(None).await.unwrap(), Some(coords("persisted")));
        let status = ctx.resolve().await;
        assert_eq!(status.session().unwrap().coordinates, coords("persisted"));
    }

    #[tokio::test]
    async fn test_resolve_without_coordinates_stays_idle() {
        let (ctx, _) = context(GatedSource::default());
        assert!(ctx.initialize(None).await.unwrap().is_none());
        assert!(matches!(ctx.resolve().await, SessionStatus::Idle));
    }

    #[tokio::test]
    async fn test_failed_resolution_keeps_coordinates() {
        let source = GatedSource {
            failing: vec!["broken".to_string()],
            ..Default::default()
        };
        let (ctx, _) = context(source);
        ctx.set_coordinates(coords("broken")).await.unwrap();

        assert!(matches!(ctx.resolve().await, SessionStatus::Error(_)));
        assert_eq!(ctx.coordinates().await, Some(coords("broken")));
    }

    #[tokio::test]
    async fn test_stale_resolution_does_not_overwrite_newer_pair() {
        let started = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let mut source = GatedSource::default();
        source
            .gates
            .insert("slow".to_string(), (started.clone(), release.clone()));
        let (ctx, _) = context(source);

        ctx.set_coordinates(coords("slow")).await.unwrap();
        let slow_ctx = Arc::clone(&ctx);
        let slow = tokio::spawn(async move { slow_ctx.resolve().await });
        started.notified().await;

        ctx.set_coordinates(coords("fast")).await.unwrap();
        let fast_status = ctx.resolve().await;
        assert_eq!(fast_status.session().unwrap().coordinates, coords("fast"));

        release.notify_one();
        let slow_status = slow.await.unwrap();
        assert_eq!(slow_status.session().unwrap().coordinates, coords("fast"));
        assert_eq!(
            ctx.status().await.session().unwrap().coordinates,
            coords("fast")
        );
    }

    #[tokio::test]
    async fn test_teardown_clears_everything() {
        let (ctx, store) = context(GatedSource::default());
        ctx.set_coordinates(coords("a")).await.unwrap();
        ctx.resolve().await;

        ctx.teardown().await.unwrap();
        assert!(matches!(ctx.status().await, SessionStatus::Idle));
        assert_eq!(ctx.coordinates().await, None);
        assert_eq!(store.load().await.unwrap(), None);
    }
}

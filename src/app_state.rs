use std::sync::Arc;

use crate::{
    config::Config,
    errors::AppResult,
    models::domain::StoreCoordinates,
    repositories::{RepositoryProvider, RestRepositoryProvider, TenantRepositories},
    rest::RestClient,
    services::{
        AccountService, DashboardService, OpenRouterGenerator, QuizAttemptService, QuizGenerator, QuizService,
        QuizUserService,
    },
    session::{CredentialSource, FileSessionStore, SessionContext, SessionStore, TenantSession, VaultCredentialSource},
    vault::{CredentialVault, EncryptionMode, PantryVault, VaultStore},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub vault: CredentialVault,
    pub repositories: Arc<dyn RepositoryProvider>,
    pub generator: Arc<dyn QuizGenerator>,
    /// Remembered operator coordinates, resolved under the fixed secret.
    pub session: Arc<SessionContext>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let vault_store = Arc::new(PantryVault::new(&config.vault_base_url));
        let repositories = Arc::new(RestRepositoryProvider::new(RestClient::new()));
        let generator = Arc::new(OpenRouterGenerator::new(
            &config.openrouter_api_base,
            config.openrouter_models.clone(),
        ));
        let session_store = Arc::new(FileSessionStore::new(&config.session_file));
        Self::with_components(config, vault_store, session_store, repositories, generator)
    }

    pub fn with_components(
        config: Config,
        vault_store: Arc<dyn VaultStore>,
        session_store: Arc<dyn SessionStore>,
        repositories: Arc<dyn RepositoryProvider>,
        generator: Arc<dyn QuizGenerator>,
    ) -> Self {
        let vault = CredentialVault::new(vault_store);
        let source = Arc::new(VaultCredentialSource::new(vault.clone(), EncryptionMode::FixedSecret));
        Self {
            config: Arc::new(config),
            session: Arc::new(SessionContext::new(session_store, source)),
            vault,
            repositories,
            generator,
        }
    }

    pub fn account_service(&self, mode: EncryptionMode) -> AccountService {
        AccountService::new(self.vault.clone(), mode)
    }

    /// Loads and decrypts the tenant's credentials, then wires table access
    /// to its backend. Runs once per request.
    pub async fn tenant(&self, coords: &StoreCoordinates, mode: EncryptionMode) -> AppResult<TenantScope> {
        let source = VaultCredentialSource::new(self.vault.clone(), mode);
        let session = source.resolve(coords).await?;
        let repositories = Arc::new(self.repositories.for_tenant(&session));
        Ok(TenantScope {
            session,
            repositories,
        })
    }
}

/// A resolved tenant and the services bound to it.
pub struct TenantScope {
    pub session: TenantSession,
    pub repositories: Arc<TenantRepositories>,
}

impl TenantScope {
    pub fn quiz_service(&self) -> QuizService {
        QuizService::new(
            self.repositories.quizzes.clone(),
            self.repositories.attempts.clone(),
            &self.session.tenant_key,
        )
    }

    pub fn participant_service(&self) -> QuizUserService {
        QuizUserService::new(
            self.repositories.users.clone(),
            self.repositories.quizzes.clone(),
            self.repositories.attempts.clone(),
            &self.session.tenant_key,
        )
    }

    pub fn attempt_service(&self) -> QuizAttemptService {
        QuizAttemptService::new(
            self.repositories.quizzes.clone(),
            self.repositories.users.clone(),
            self.repositories.attempts.clone(),
            &self.session.tenant_key,
        )
    }

    pub fn dashboard_service(&self) -> DashboardService {
        DashboardService::new(self.repositories.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_is_cloneable() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }

    #[test]
    fn test_app_state_from_config() {
        let state = AppState::new(Config::test_config());
        assert_eq!(state.config.openrouter_models.len(), 2);
    }
}

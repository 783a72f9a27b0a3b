//! Credential service: registration, login and token verification

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::auth::{
    AuthError, IssuedToken, LoginCredentials, RegisterCredentials, TokenClaims,
};
use crate::domain::user::{NewUser, User, UserRepository};
use crate::domain::DomainError;
use crate::infrastructure::auth::TokenGenerator;
use crate::infrastructure::observability::{record_auth_outcome, AuthOperation};

use super::password::PasswordHasher;

/// Owns user lookup, password hashing and token issuance
#[derive(Debug, Clone)]
pub struct CredentialService {
    repository: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenGenerator>,
    default_role: String,
}

impl CredentialService {
    pub fn new(
        repository: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenGenerator>,
        default_role: impl Into<String>,
    ) -> Self {
        Self {
            repository,
            hasher,
            tokens,
            default_role: default_role.into(),
        }
    }

    /// Register a new user keyed by username
    ///
    /// Email is not checked for duplicates. A username taken between the
    /// lookup and the insert still reports `AlreadyExists`.
    pub async fn register(&self, credentials: RegisterCredentials) -> Result<User, AuthError> {
        let result = self.register_inner(credentials).await;

        match &result {
            Ok(user) => {
                record_auth_outcome(AuthOperation::Register, "success");
                info!(
                    username = %user.username(),
                    user_id = %user.id(),
                    created_at = %user.created_at(),
                    "User registered"
                );
            }
            Err(e) => {
                record_auth_outcome(AuthOperation::Register, e.outcome());
                warn!(outcome = e.outcome(), error = %e, "Registration rejected");
            }
        }

        result
    }

    async fn register_inner(&self, credentials: RegisterCredentials) -> Result<User, AuthError> {
        let RegisterCredentials {
            username,
            email,
            password,
        } = credentials;

        if self.repository.username_exists(&username).await? {
            return Err(AuthError::AlreadyExists { username });
        }

        let password_hash = self.hash_password(password).await?;

        let new_user = NewUser {
            username: username.clone(),
            email,
            password_hash,
            role: self.default_role.clone(),
        };

        match self.repository.create(new_user).await {
            Ok(user) => Ok(user),
            Err(e) if e.is_conflict() => {
                debug!(username = %username, "Username claimed concurrently");
                Err(AuthError::AlreadyExists { username })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Authenticate by email and password and issue a token
    pub async fn login(&self, credentials: LoginCredentials) -> Result<IssuedToken, AuthError> {
        let result = self.login_inner(&credentials).await;

        match &result {
            Ok(issued) => {
                record_auth_outcome(AuthOperation::Login, "success");
                info!(username = %issued.claims.username, "User logged in");
            }
            Err(e) => {
                record_auth_outcome(AuthOperation::Login, e.outcome());
                warn!(outcome = e.outcome(), "Login rejected");
            }
        }

        result
    }

    async fn login_inner(&self, credentials: &LoginCredentials) -> Result<IssuedToken, AuthError> {
        let user = self
            .repository
            .get_by_email(&credentials.email)
            .await?
            .ok_or(AuthError::NotFound)?;

        let verified = self
            .verify_password(credentials.password.clone(), user.password_hash().to_string())
            .await?;
        if !verified {
            return Err(AuthError::InvalidCredentials);
        }

        self.tokens.issue(&user)
    }

    /// Hashing is CPU-bound, so it runs on the blocking pool
    async fn hash_password(&self, password: String) -> Result<String, DomainError> {
        let hasher = Arc::clone(&self.hasher);

        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| DomainError::internal(format!("Password hashing task failed: {}", e)))?
    }

    async fn verify_password(&self, password: String, hash: String) -> Result<bool, DomainError> {
        let hasher = Arc::clone(&self.hasher);

        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| {
                DomainError::internal(format!("Password verification task failed: {}", e))
            })
    }

    /// Verify a bearer token and return its claims
    pub fn verify_token(&self, token: &str) -> Result<TokenClaims, AuthError> {
        self.tokens.verify(token)
    }

    /// Check that the user store is reachable
    pub async fn ping(&self) -> Result<(), DomainError> {
        self.repository.ping().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::thread::{self, ThreadId};

    use crate::domain::user::MockUserRepository;
    use crate::infrastructure::auth::{JwtService, TokenConfig};
    use crate::infrastructure::user::{Argon2Hasher, InMemoryUserRepository, Sha256Hasher};

    fn token_service(expiry_minutes: u64) -> Arc<JwtService> {
        Arc::new(
            JwtService::new(TokenConfig::new(
                "credential-service-test-secret-key",
                "catalog-api",
                "catalog-clients",
                expiry_minutes,
            ))
            .unwrap(),
        )
    }

    fn create_service_with(repository: Arc<dyn UserRepository>) -> CredentialService {
        CredentialService::new(repository, Arc::new(Sha256Hasher::new()), token_service(60), "user")
    }

    fn create_service() -> CredentialService {
        create_service_with(Arc::new(InMemoryUserRepository::new()))
    }

    fn register(username: &str, email: &str, password: &str) -> RegisterCredentials {
        RegisterCredentials {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    fn login(email: &str, password: &str) -> LoginCredentials {
        LoginCredentials {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    /// Records which thread each hash or verify call ran on
    #[derive(Debug, Default)]
    struct ThreadRecordingHasher {
        threads: Mutex<Vec<ThreadId>>,
    }

    impl ThreadRecordingHasher {
        fn record(&self) {
            self.threads.lock().unwrap().push(thread::current().id());
        }
    }

    impl PasswordHasher for ThreadRecordingHasher {
        fn hash(&self, password: &str) -> Result<String, DomainError> {
            self.record();
            Sha256Hasher.hash(password)
        }

        fn verify(&self, password: &str, hash: &str) -> bool {
            self.record();
            Sha256Hasher.verify(password, hash)
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let service = create_service();

        let user = service
            .register(register("alice", "alice@x.com", "Secret123!"))
            .await
            .unwrap();
        assert_eq!(user.role(), "user");
        assert_ne!(user.password_hash(), "Secret123!");

        let issued = service.login(login("alice@x.com", "Secret123!")).await.unwrap();
        let claims = service.verify_token(&issued.token).unwrap();

        assert_eq!(claims.username, "alice");
        assert_eq!(claims.email, "alice@x.com");
        assert_eq!(claims.role, "user");
    }

    #[tokio::test]
    async fn test_registration_scenario() {
        let repository = Arc::new(InMemoryUserRepository::new());
        let service = create_service_with(repository.clone());

        service
            .register(register("alice", "alice@x.com", "Secret123!"))
            .await
            .unwrap();

        let duplicate = service
            .register(register("alice", "alice2@x.com", "Other456!"))
            .await;
        assert!(matches!(duplicate, Err(AuthError::AlreadyExists { .. })));
        assert_eq!(repository.count().await.unwrap(), 1);

        service
            .register(register("bob", "alice@x.com", "Bob789!"))
            .await
            .unwrap();
        assert_eq!(repository.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_shared_email_logs_into_earliest_record() {
        let service = create_service();
        service
            .register(register("alice", "shared@x.com", "Secret123!"))
            .await
            .unwrap();
        service
            .register(register("bob", "shared@x.com", "Bob789!"))
            .await
            .unwrap();

        let issued = service.login(login("shared@x.com", "Secret123!")).await.unwrap();
        assert_eq!(issued.claims.username, "alice");

        let result = service.login(login("shared@x.com", "Bob789!")).await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_unknown_email() {
        let service = create_service();

        let result = service.login(login("nobody@x.com", "whatever")).await;
        assert!(matches!(result, Err(AuthError::NotFound)));
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let service = create_service();
        service
            .register(register("alice", "alice@x.com", "Secret123!"))
            .await
            .unwrap();

        let result = service.login(login("alice@x.com", "secret123!")).await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_argon2_register_and_login() {
        let service = CredentialService::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(Argon2Hasher::new()),
            token_service(60),
            "user",
        );

        let user = service
            .register(register("alice", "alice@x.com", "Secret123!"))
            .await
            .unwrap();
        assert!(user.password_hash().starts_with("$argon2"));

        assert!(service.login(login("alice@x.com", "Secret123!")).await.is_ok());
    }

    #[tokio::test]
    async fn test_hashing_runs_off_the_runtime_thread() {
        let hasher = Arc::new(ThreadRecordingHasher::default());
        let service = CredentialService::new(
            Arc::new(InMemoryUserRepository::new()),
            hasher.clone(),
            token_service(60),
            "user",
        );

        service
            .register(register("alice", "alice@x.com", "Secret123!"))
            .await
            .unwrap();
        service.login(login("alice@x.com", "Secret123!")).await.unwrap();

        let runtime_thread = thread::current().id();
        let threads = hasher.threads.lock().unwrap();
        assert_eq!(threads.len(), 2);
        assert!(threads.iter().all(|id| *id != runtime_thread));
    }

    #[tokio::test]
    async fn test_zero_expiry_token_is_expired() {
        let service = CredentialService::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(Sha256Hasher::new()),
            token_service(0),
            "user",
        );
        service
            .register(register("alice", "alice@x.com", "Secret123!"))
            .await
            .unwrap();

        let issued = service.login(login("alice@x.com", "Secret123!")).await.unwrap();
        assert!(matches!(
            service.verify_token(&issued.token),
            Err(AuthError::TokenExpired)
        ));
    }

    #[tokio::test]
    async fn test_conflict_after_existence_check_is_already_exists() {
        let repository = Arc::new(MockUserRepository::new());
        let service = create_service_with(repository.clone());

        service
            .register(register("alice", "alice@x.com", "Secret123!"))
            .await
            .unwrap();

        repository.set_hide_existing(true).await;
        let result = service
            .register(register("alice", "other@x.com", "Other456!"))
            .await;

        assert!(matches!(result, Err(AuthError::AlreadyExists { .. })));
        assert_eq!(repository.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_registrations_single_winner() {
        let service = create_service();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let service = service.clone();
                tokio::spawn(async move {
                    service
                        .register(register("alice", &format!("a{}@x.com", i), "Secret123!"))
                        .await
                })
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(e) => assert!(matches!(e, AuthError::AlreadyExists { .. })),
            }
        }

        assert_eq!(successes, 1);
    }

    #[tokio::test]
    async fn test_storage_failure_propagates() {
        let repository = Arc::new(MockUserRepository::new());
        repository.set_should_fail(true).await;
        let service = create_service_with(repository);

        let result = service
            .register(register("alice", "alice@x.com", "Secret123!"))
            .await;
        assert!(matches!(result, Err(AuthError::Domain(DomainError::Storage { .. }))));

        assert!(service.ping().await.is_err());
    }
}

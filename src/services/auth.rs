use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::{
    clients::{IdentityProvider, IdentitySession, ProviderError},
    Error, Result,
};

/// Account management is delegated entirely to the identity provider.
#[derive(Clone)]
pub struct AuthService {
    identity: Arc<dyn IdentityProvider>,
}

impl AuthService {
    pub fn new(identity: Arc<dyn IdentityProvider>) -> Self {
        Self { identity }
    }

    #[instrument(skip(self, password))]
    pub async fn register(&self, email: &str, password: &str) -> Result<()> {
        self.identity
            .sign_up(email, password)
            .await
            .map_err(|e| self.provider_error(e))?;
        info!("User registered");
        Ok(())
    }

    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<IdentitySession> {
        let session = self
            .identity
            .sign_in(email, password)
            .await
            .map_err(|e| self.provider_error(e))?;
        info!("User signed in");
        Ok(session)
    }

    fn provider_error(&self, err: ProviderError) -> Error {
        match err {
            ProviderError::Rejected(message) => {
                warn!(reason = %message, "Identity provider rejected the request");
                Error::BadRequest(message)
            }
            source => Error::ExternalService {
                provider: self.identity.name(),
                source,
            },
        }
    }
}

//! Bearer-token verification for tokens issued by the external auth service.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::ports::IdentityProvider;
use crate::domain::user::CurrentUser;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    pub aud: String,
    pub exp: i64,
}

pub struct JwtIdentity {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtIdentity {
    pub fn new(secret: &[u8], audience: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[audience]);
        validation.set_required_spec_claims(&["exp", "aud", "sub"]);
        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }
}

impl IdentityProvider for JwtIdentity {
    fn current_user(&self, bearer_token: &str) -> Result<CurrentUser, DomainError> {
        let data = decode::<Claims>(bearer_token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                log::debug!("rejected bearer token: {e}");
                DomainError::Unauthenticated
            })?;
        Ok(CurrentUser {
            id: data.claims.sub,
            email: data.claims.email,
        })
    }
}

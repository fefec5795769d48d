//! Credential Verifier: bearer token → authenticated principal.

use std::sync::Arc;

use tidecrm_core::{AuthError, AuthResult, Principal, PrincipalId, TenantId};

use crate::token::decode_token;

/// Narrow principal lookup the verifier needs from storage.
pub trait PrincipalDirectory: Send + Sync {
    fn principal_by_id(&self, id: PrincipalId) -> AuthResult<Option<Principal>>;
}

impl<D> PrincipalDirectory for Arc<D>
where
    D: PrincipalDirectory + ?Sized,
{
    fn principal_by_id(&self, id: PrincipalId) -> AuthResult<Option<Principal>> {
        (**self).principal_by_id(id)
    }
}

/// Outcome of credential verification: the principal's *current* stored
/// state plus the tenant hint embedded in the credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub principal: Principal,
    pub tenant_hint: Option<TenantId>,
}

/// Verifies a bearer credential and resolves the acting principal.
///
/// The stored principal row is re-read on every call: a disabled account is
/// rejected even if its token is otherwise valid, and a role change is
/// visible to the very next request. Claims are verify-then-extract only.
pub struct CredentialVerifier<D> {
    secret: String,
    directory: D,
    dev_bypass: Option<PrincipalId>,
}

impl<D: PrincipalDirectory> CredentialVerifier<D> {
    pub fn new(secret: impl Into<String>, directory: D) -> Self {
        Self {
            secret: secret.into(),
            directory,
            dev_bypass: None,
        }
    }

    /// Trust `principal` for requests with no bearer token.
    ///
    /// Local development only. The config layer refuses to supply a bypass
    /// principal in a production posture, so this path is unreachable there.
    pub fn with_dev_bypass(mut self, principal: PrincipalId) -> Self {
        tracing::warn!(%principal, "credential verification bypass enabled");
        self.dev_bypass = Some(principal);
        self
    }

    /// Verify the credential and load the acting principal.
    ///
    /// `Unauthorized` for a missing/malformed/expired token, `Forbidden` for
    /// a disabled account. The HTTP layer collapses both to one
    /// undifferentiated authentication failure; the distinction exists so
    /// audit can record the real cause.
    pub fn verify(&self, bearer: Option<&str>) -> AuthResult<VerifiedIdentity> {
        let (subject, tenant_hint) = match bearer {
            Some(token) => {
                let claims = decode_token(token, &self.secret)?;
                (claims.sub, claims.tenant)
            }
            None => match self.dev_bypass {
                Some(principal) => (principal, None),
                None => return Err(AuthError::Unauthorized),
            },
        };

        let principal = self
            .directory
            .principal_by_id(subject)?
            .ok_or(AuthError::Unauthorized)?;

        if !principal.active {
            tracing::info!(principal = %principal.id, "disabled account presented a credential");
            return Err(AuthError::Forbidden);
        }

        Ok(VerifiedIdentity {
            principal,
            tenant_hint,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::RwLock;

    use chrono::Duration;
    use tidecrm_core::Role;

    use crate::claims::AccessClaims;
    use crate::token::encode_token;

    use super::*;

    const SECRET: &str = "test-secret";

    #[derive(Default)]
    struct FakeDirectory {
        principals: RwLock<HashMap<PrincipalId, Principal>>,
    }

    impl FakeDirectory {
        fn insert(&self, principal: Principal) {
            self.principals
                .write()
                .unwrap()
                .insert(principal.id, principal);
        }
    }

    impl PrincipalDirectory for FakeDirectory {
        fn principal_by_id(&self, id: PrincipalId) -> AuthResult<Option<Principal>> {
            Ok(self.principals.read().unwrap().get(&id).cloned())
        }
    }

    fn token_for(id: PrincipalId) -> String {
        encode_token(&AccessClaims::new(id, Duration::minutes(10)), SECRET).unwrap()
    }

    #[test]
    fn valid_token_resolves_principal() {
        let directory = Arc::new(FakeDirectory::default());
        let principal = Principal::new("alice@example.com", Role::Member);
        directory.insert(principal.clone());

        let verifier = CredentialVerifier::new(SECRET, directory);
        let identity = verifier.verify(Some(&token_for(principal.id))).unwrap();
        assert_eq!(identity.principal, principal);
    }

    #[test]
    fn missing_bearer_is_unauthorized() {
        let verifier = CredentialVerifier::new(SECRET, Arc::new(FakeDirectory::default()));
        assert_eq!(verifier.verify(None).unwrap_err(), AuthError::Unauthorized);
    }

    #[test]
    fn unknown_subject_is_unauthorized() {
        let verifier = CredentialVerifier::new(SECRET, Arc::new(FakeDirectory::default()));
        let token = token_for(PrincipalId::new());
        assert_eq!(
            verifier.verify(Some(&token)).unwrap_err(),
            AuthError::Unauthorized
        );
    }

    #[test]
    fn disabled_account_is_rejected_per_request() {
        let directory = Arc::new(FakeDirectory::default());
        let mut principal = Principal::new("bob@example.com", Role::Admin);
        directory.insert(principal.clone());
        let token = token_for(principal.id);

        let verifier = CredentialVerifier::new(SECRET, directory.clone());
        assert!(verifier.verify(Some(&token)).is_ok());

        // Admin disables the account after issuance: the same token must now
        // fail, with no caching of the active flag.
        principal.active = false;
        directory.insert(principal.clone());
        assert_eq!(
            verifier.verify(Some(&token)).unwrap_err(),
            AuthError::Forbidden
        );

        // Re-enabled: works again.
        principal.active = true;
        directory.insert(principal);
        assert!(verifier.verify(Some(&token)).is_ok());
    }

    #[test]
    fn dev_bypass_trusts_fixed_principal_without_bearer() {
        let directory = Arc::new(FakeDirectory::default());
        let principal = Principal::new("dev@example.com", Role::Owner);
        directory.insert(principal.clone());

        let verifier = CredentialVerifier::new(SECRET, directory).with_dev_bypass(principal.id);
        let identity = verifier.verify(None).unwrap();
        assert_eq!(identity.principal.id, principal.id);
    }

    #[test]
    fn dev_bypass_still_rejects_disabled_principal() {
        let directory = Arc::new(FakeDirectory::default());
        let mut principal = Principal::new("dev@example.com", Role::Owner);
        principal.active = false;
        directory.insert(principal.clone());

        let verifier = CredentialVerifier::new(SECRET, directory).with_dev_bypass(principal.id);
        assert_eq!(verifier.verify(None).unwrap_err(), AuthError::Forbidden);
    }
}

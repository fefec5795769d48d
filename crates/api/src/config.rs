//! Process configuration, read once from the environment at startup.

use core::str::FromStr;

use tidecrm_auth::AuthzModel;
use tidecrm_core::{PrincipalId, TenantId};

/// Deployment posture. Defaults to `Production`: anything development-only
/// must be opted into, never opted out of.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Posture {
    Development,
    #[default]
    Production,
}

impl FromStr for Posture {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "development" | "dev" => Ok(Posture::Development),
            "production" | "prod" => Ok(Posture::Production),
            other => anyhow::bail!("unknown posture '{other}'"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jwt_secret: String,
    pub default_tenant: TenantId,
    pub root_email: Option<String>,
    pub posture: Posture,
    pub authz_model: AuthzModel,
    pub bind: String,
    dev_principal: Option<PrincipalId>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let jwt_secret = std::env::var("TIDECRM_JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("TIDECRM_JWT_SECRET not set; using insecure dev default");
            "dev-secret".to_string()
        });

        let default_tenant = std::env::var("TIDECRM_DEFAULT_TENANT")
            .unwrap_or_else(|_| "demo".to_string())
            .parse::<TenantId>()
            .map_err(|e| anyhow::anyhow!("TIDECRM_DEFAULT_TENANT: {e}"))?;

        let posture = match std::env::var("TIDECRM_POSTURE") {
            Ok(v) => v.parse()?,
            Err(_) => Posture::default(),
        };

        let authz_model = match std::env::var("TIDECRM_AUTHZ_MODEL") {
            Ok(v) => v
                .parse::<AuthzModel>()
                .map_err(|e| anyhow::anyhow!("TIDECRM_AUTHZ_MODEL: {e}"))?,
            Err(_) => AuthzModel::default(),
        };

        let dev_principal = match std::env::var("TIDECRM_DEV_PRINCIPAL") {
            Ok(v) => Some(
                v.parse::<PrincipalId>()
                    .map_err(|e| anyhow::anyhow!("TIDECRM_DEV_PRINCIPAL: {e}"))?,
            ),
            Err(_) => None,
        };

        Ok(Self {
            jwt_secret,
            default_tenant,
            root_email: std::env::var("TIDECRM_ROOT_EMAIL").ok(),
            posture,
            authz_model,
            bind: std::env::var("TIDECRM_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            dev_principal,
        })
    }

    /// Builder-style config for tests and embedding.
    pub fn for_tests(jwt_secret: impl Into<String>, default_tenant: TenantId) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            default_tenant,
            root_email: None,
            posture: Posture::Production,
            authz_model: AuthzModel::default(),
            bind: "127.0.0.1:0".to_string(),
            dev_principal: None,
        }
    }

    pub fn with_root_email(mut self, email: impl Into<String>) -> Self {
        self.root_email = Some(email.into());
        self
    }

    pub fn with_authz_model(mut self, model: AuthzModel) -> Self {
        self.authz_model = model;
        self
    }

    pub fn with_dev_principal(mut self, posture: Posture, principal: PrincipalId) -> Self {
        self.posture = posture;
        self.dev_principal = Some(principal);
        self
    }

    /// The credential-bypass principal, if one is active.
    ///
    /// Returns `None` unless the posture is `Development`: the bypass is not
    /// reachable in production even when the variable is set.
    pub fn dev_principal(&self) -> Option<PrincipalId> {
        match self.posture {
            Posture::Development => self.dev_principal,
            Posture::Production => {
                if self.dev_principal.is_some() {
                    tracing::warn!(
                        "TIDECRM_DEV_PRINCIPAL is set but posture is production; ignoring"
                    );
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dev_principal_is_ignored_in_production() {
        let tenant: TenantId = "demo".parse().unwrap();
        let principal = PrincipalId::new();

        let mut cfg = AppConfig::for_tests("s", tenant.clone());
        cfg.dev_principal = Some(principal);
        cfg.posture = Posture::Production;
        assert_eq!(cfg.dev_principal(), None);

        let cfg = AppConfig::for_tests("s", tenant)
            .with_dev_principal(Posture::Development, principal);
        assert_eq!(cfg.dev_principal(), Some(principal));
    }

    #[test]
    fn posture_parses() {
        assert_eq!("dev".parse::<Posture>().unwrap(), Posture::Development);
        assert_eq!("production".parse::<Posture>().unwrap(), Posture::Production);
        assert!("staging".parse::<Posture>().is_err());
    }
}

//! Credential source selection
//!
//! Exactly one source is active per run, chosen with a fixed precedence:
//! role assumption, then a static key pair, then the ambient default chain.

use std::fmt;

/// Where the CloudWatch client gets its credentials from
#[derive(Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Assume this role using the ambient credentials
    AssumeRole { role_arn: String },
    /// Use a static access key pair
    Static {
        access_key_id: String,
        secret_access_key: String,
    },
    /// Environment, shared config/profile, container or instance metadata
    Ambient,
}

impl CredentialSource {
    /// Select the credential source from optional CLI values.
    ///
    /// Empty strings count as unset. A role ARN always wins over a static
    /// pair, and a static pair is only used when both halves are present.
    pub fn select(
        role_arn: Option<&str>,
        access_key_id: Option<&str>,
        secret_access_key: Option<&str>,
    ) -> Self {
        fn present(v: Option<&str>) -> Option<&str> {
            v.map(str::trim).filter(|v| !v.is_empty())
        }

        if let Some(role_arn) = present(role_arn) {
            return Self::AssumeRole {
                role_arn: role_arn.to_string(),
            };
        }

        match (present(access_key_id), present(secret_access_key)) {
            (Some(access_key_id), Some(secret_access_key)) => Self::Static {
                access_key_id: access_key_id.to_string(),
                secret_access_key: secret_access_key.to_string(),
            },
            _ => Self::Ambient,
        }
    }

    /// Short name for logs and error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AssumeRole { .. } => "assume-role",
            Self::Static { .. } => "static-keys",
            Self::Ambient => "default-chain",
        }
    }
}

// Keep secrets out of logs
impl fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AssumeRole { role_arn } => f
                .debug_struct("AssumeRole")
                .field("role_arn", role_arn)
                .finish(),
            Self::Static { access_key_id, .. } => f
                .debug_struct("Static")
                .field("access_key_id", access_key_id)
                .field("secret_access_key", &"<redacted>")
                .finish(),
            Self::Ambient => f.write_str("Ambient"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROLE: &str = "arn:aws:iam::123456789012:role/mackerel";

    #[test]
    fn test_role_wins_over_static_pair() {
        let source = CredentialSource::select(Some(ROLE), Some("AKIDEXAMPLE"), Some("secret"));
        assert_eq!(
            source,
            CredentialSource::AssumeRole {
                role_arn: ROLE.to_string()
            }
        );
        assert_eq!(source.kind(), "assume-role");
    }

    #[test]
    fn test_static_pair_requires_both_halves() {
        let source = CredentialSource::select(None, Some("AKIDEXAMPLE"), Some("secret"));
        assert!(matches!(source, CredentialSource::Static { .. }));

        assert_eq!(
            CredentialSource::select(None, Some("AKIDEXAMPLE"), None),
            CredentialSource::Ambient
        );
        assert_eq!(
            CredentialSource::select(None, None, Some("secret")),
            CredentialSource::Ambient
        );
    }

    #[test]
    fn test_empty_values_are_unset() {
        assert_eq!(
            CredentialSource::select(Some(""), Some(""), Some("")),
            CredentialSource::Ambient
        );

        let source = CredentialSource::select(Some("  "), Some("AKIDEXAMPLE"), Some("secret"));
        assert_eq!(source.kind(), "static-keys");
    }

    #[test]
    fn test_values_are_trimmed() {
        let padded = format!("  {ROLE}\n");
        let source = CredentialSource::select(Some(padded.as_str()), None, None);
        assert_eq!(
            source,
            CredentialSource::AssumeRole {
                role_arn: ROLE.to_string()
            }
        );

        let source = CredentialSource::select(None, Some(" AKIDEXAMPLE "), Some("\tsecret"));
        assert_eq!(
            source,
            CredentialSource::Static {
                access_key_id: "AKIDEXAMPLE".to_string(),
                secret_access_key: "secret".to_string(),
            }
        );
    }

    #[test]
    fn test_debug_redacts_secret() {
        let source = CredentialSource::select(None, Some("AKIDEXAMPLE"), Some("hunter2"));
        let debug = format!("{source:?}");
        assert!(debug.contains("AKIDEXAMPLE"));
        assert!(!debug.contains("hunter2"));
    }
}

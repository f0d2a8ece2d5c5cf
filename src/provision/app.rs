//! provision::app
//!
//! App creation workflow.
//!
//! # Algorithm
//!
//! Sequential steps, each a hard gate:
//!
//! 1. Validate the app name (no network call is made for a bad name)
//! 2. Probe for an existing app; 404 means free to create
//! 3. Resolve the template descriptor and check its required fields
//! 4. Build the creation request; global templates omit the replacement
//!    token (the server derives it), account-scoped templates must carry
//!    one
//! 5. Submit and inspect the response's `success` flag independent of the
//!    HTTP status

use std::collections::BTreeMap;

use reqwest::Method;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::config::{Config, TemplateSettings};
use crate::platform::client::{ClientError, PlatformClient, Probe};
use crate::platform::templates::{self, TemplateDescriptor, TemplateError};

/// Errors from the app creation workflow.
#[derive(Debug, Error)]
pub enum CreateError {
    /// The configured app name is not usable.
    #[error("invalid app name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// The configuration was not validated for app creation.
    #[error("configuration is missing the template settings")]
    TemplateSettingsMissing,

    /// An app with this name already exists.
    #[error("app '{0}' already exists")]
    AlreadyExists(String),

    /// Template lookup failed.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// The descriptor parsed but lacks required fields; the raw payload
    /// is echoed for diagnosis.
    #[error("template '{name}' is unusable ({reason}); upstream payload: {raw}")]
    UnusableTemplate {
        name: String,
        reason: String,
        raw: String,
    },

    /// An account-scoped template has no replacement token.
    #[error("template '{0}' is account-scoped but has no replacement string")]
    MissingReplacement(String),

    /// The API call itself failed.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The platform answered 2xx but flagged the creation as failed.
    #[error("app creation rejected by the platform: {body}")]
    Rejected { body: String },

    /// The creation response did not parse.
    #[error("unexpected creation response: {raw}")]
    MalformedResponse { raw: String },
}

/// Summary of a successfully created app.
#[derive(Debug, Clone)]
pub struct CreatedApp {
    /// Created repository identifiers, keyed by role. Opaque strings
    /// reported back for display, not further validated.
    pub repos: BTreeMap<String, String>,
}

#[derive(Deserialize)]
struct CreateAppResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: CreateAppData,
}

#[derive(Deserialize, Default)]
struct CreateAppData {
    #[serde(default)]
    resultant_repos: BTreeMap<String, String>,
}

/// Validate an app name: non-empty, lowercase alphanumerics and hyphens,
/// no leading or trailing hyphen.
pub fn validate_app_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("must not be empty".to_string());
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err("may only contain lowercase letters, digits, and hyphens".to_string());
    }
    if name.starts_with('-') || name.ends_with('-') {
        return Err("must not start or end with a hyphen".to_string());
    }
    Ok(())
}

/// Build the creation request payload from the resolved descriptor.
///
/// Global templates never carry `replacement_string` (the server derives
/// it); account-scoped templates must, or the operation fails before any
/// submission.
fn build_request(
    template: &TemplateSettings,
    descriptor: &TemplateDescriptor,
) -> Result<Value, CreateError> {
    let mut payload = serde_json::json!({
        "template": template.name,
        "global_template": descriptor.is_global,
        "template_org": descriptor.org_login,
        "source_repo": descriptor.source_repo,
        "language": descriptor.language,
        "visibility": template.visibility,
        "description": template.description,
    });
    if !descriptor.is_global {
        match descriptor.replacement_string.as_deref() {
            Some(token) if !token.is_empty() => {
                payload["replacement_string"] = Value::String(token.to_string());
            }
            _ => return Err(CreateError::MissingReplacement(template.name.clone())),
        }
    }
    Ok(payload)
}

fn check_descriptor(
    template: &TemplateSettings,
    descriptor: &TemplateDescriptor,
    raw: &str,
) -> Result<(), CreateError> {
    let missing: Vec<&str> = [
        ("org_login", descriptor.org_login.is_empty()),
        ("source_repo", descriptor.source_repo.is_empty()),
        ("language", descriptor.language.is_empty()),
    ]
    .into_iter()
    .filter_map(|(field, empty)| empty.then_some(field))
    .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(CreateError::UnusableTemplate {
            name: template.name.clone(),
            reason: format!("missing {}", missing.join(", ")),
            raw: raw.to_string(),
        })
    }
}

/// Create the configured app from its template.
pub async fn create_app(client: &PlatformClient, config: &Config) -> Result<CreatedApp, CreateError> {
    let name = &config.app_name;
    validate_app_name(name).map_err(|reason| CreateError::InvalidName {
        name: name.clone(),
        reason,
    })?;
    let template = config
        .template
        .as_ref()
        .ok_or(CreateError::TemplateSettingsMissing)?;

    let probe_path = format!(
        "/accounts/{}/organizations/{}/apps/{}",
        config.account, config.org, name
    );
    if client.probe(&probe_path).await? == Probe::Exists {
        return Err(CreateError::AlreadyExists(name.clone()));
    }

    let (descriptor, raw) =
        templates::fetch(client, &config.account, &template.name, template.global).await?;
    check_descriptor(template, &descriptor, &raw)?;

    let payload = build_request(template, &descriptor)?;
    let path = format!(
        "/accounts/{}/organizations/{}/apps?app_name={}",
        config.account, config.org, name
    );
    let raw = client.request(Method::POST, &path, Some(&payload)).await?;

    let response: CreateAppResponse =
        serde_json::from_str(&raw).map_err(|_| CreateError::MalformedResponse { raw: raw.clone() })?;
    if !response.success {
        return Err(CreateError::Rejected { body: raw });
    }
    Ok(CreatedApp {
        repos: response.data.resultant_repos,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(global: bool) -> TemplateSettings {
        TemplateSettings {
            name: "go-service".to_string(),
            global,
            visibility: "private".to_string(),
            description: "Order processing".to_string(),
        }
    }

    fn descriptor(global: bool, replacement: Option<&str>) -> TemplateDescriptor {
        TemplateDescriptor {
            org_login: "acme-templates".to_string(),
            source_repo: "go-service".to_string(),
            is_global: global,
            language: "go".to_string(),
            replacement_string: replacement.map(str::to_string),
        }
    }

    mod name_validation {
        use super::*;

        #[test]
        fn accepts_lowercase_alphanumerics_and_hyphens() {
            assert!(validate_app_name("orders").is_ok());
            assert!(validate_app_name("orders-v2").is_ok());
            assert!(validate_app_name("a").is_ok());
            assert!(validate_app_name("0-0").is_ok());
        }

        #[test]
        fn rejects_empty_and_bad_characters() {
            assert!(validate_app_name("").is_err());
            assert!(validate_app_name("Orders").is_err());
            assert!(validate_app_name("orders_v2").is_err());
            assert!(validate_app_name("orders v2").is_err());
            assert!(validate_app_name("ordérs").is_err());
        }

        #[test]
        fn rejects_edge_hyphens() {
            assert!(validate_app_name("-orders").is_err());
            assert!(validate_app_name("orders-").is_err());
            assert!(validate_app_name("-").is_err());
        }
    }

    mod request_construction {
        use super::*;

        #[test]
        fn global_template_omits_replacement_token() {
            let payload = build_request(&settings(true), &descriptor(true, Some("__app__"))).unwrap();
            assert!(payload.get("replacement_string").is_none());
            assert_eq!(payload["global_template"], true);
            assert_eq!(payload["template_org"], "acme-templates");
        }

        #[test]
        fn account_template_carries_replacement_token() {
            let payload =
                build_request(&settings(false), &descriptor(false, Some("__app__"))).unwrap();
            assert_eq!(payload["replacement_string"], "__app__");
        }

        #[test]
        fn account_template_without_token_fails() {
            let err = build_request(&settings(false), &descriptor(false, None)).unwrap_err();
            assert!(matches!(err, CreateError::MissingReplacement(_)));

            let err = build_request(&settings(false), &descriptor(false, Some(""))).unwrap_err();
            assert!(matches!(err, CreateError::MissingReplacement(_)));
        }
    }

    mod descriptor_checks {
        use super::*;

        #[test]
        fn complete_descriptor_passes() {
            let d = descriptor(true, None);
            assert!(check_descriptor(&settings(true), &d, "{}").is_ok());
        }

        #[test]
        fn missing_fields_echo_the_raw_payload() {
            let mut d = descriptor(false, Some("__app__"));
            d.org_login = String::new();
            d.language = String::new();
            let raw = r#"{"source_repo":"go-service"}"#;
            let err = check_descriptor(&settings(false), &d, raw).unwrap_err();
            match err {
                CreateError::UnusableTemplate { reason, raw: echoed, .. } => {
                    assert_eq!(reason, "missing org_login, language");
                    assert_eq!(echoed, raw);
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn creation_response_parses_repo_map() {
        let raw = r#"{"success": true, "data": {"resultant_repos": {"app": "acme/orders", "gitops": "acme/orders-argocd"}}}"#;
        let response: CreateAppResponse = serde_json::from_str(raw).unwrap();
        assert!(response.success);
        assert_eq!(response.data.resultant_repos.len(), 2);
        assert_eq!(response.data.resultant_repos["app"], "acme/orders");
    }
}

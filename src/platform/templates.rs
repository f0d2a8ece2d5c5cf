//! platform::templates
//!
//! Template catalog reader.
//!
//! Templates come in two scopes: global (platform-provided) and
//! account-scoped (team-specific, requiring a name-substitution token).
//! Descriptors are fetched fresh per invocation and never cached.

use serde::Deserialize;
use thiserror::Error;

use super::client::{ClientError, PlatformClient};

/// Errors from template catalog operations.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// The underlying API call failed.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The API answered but the payload did not parse; the raw body is
    /// kept for diagnosis rather than a generic parse error.
    #[error("unexpected template payload: {raw}")]
    Malformed { raw: String },
}

/// One row of a template listing.
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateSummary {
    pub name: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub description: String,
}

/// Metadata describing a source-repository template.
///
/// Fields default to empty when absent so the app provisioner can report
/// which required ones are missing instead of failing the parse outright.
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateDescriptor {
    #[serde(default)]
    pub org_login: String,
    #[serde(default)]
    pub source_repo: String,
    #[serde(default)]
    pub is_global: bool,
    #[serde(default)]
    pub language: String,
    /// Substitution token; required for account-scoped templates only.
    #[serde(default)]
    pub replacement_string: Option<String>,
}

fn with_language(path: String, language: Option<&str>) -> String {
    match language {
        Some(language) => format!("{path}?language={language}"),
        None => path,
    }
}

/// List global and account templates.
///
/// Two independent GET calls; a failure of either fails the whole listing
/// (no partial result).
pub async fn list(
    client: &PlatformClient,
    account: &str,
    language: Option<&str>,
) -> Result<(Vec<TemplateSummary>, Vec<TemplateSummary>), TemplateError> {
    let global = fetch_listing(client, with_language("/global/templates".into(), language)).await?;
    let account_scoped = fetch_listing(
        client,
        with_language(format!("/accounts/{account}/templates"), language),
    )
    .await?;
    Ok((global, account_scoped))
}

async fn fetch_listing(
    client: &PlatformClient,
    path: String,
) -> Result<Vec<TemplateSummary>, TemplateError> {
    let body = client.get(&path).await?;
    serde_json::from_str(&body).map_err(|_| TemplateError::Malformed { raw: body })
}

/// Fetch one template descriptor by name and scope.
///
/// Returns the parsed descriptor together with the raw response body so
/// callers can echo the upstream payload when the descriptor turns out to
/// be unusable.
pub async fn fetch(
    client: &PlatformClient,
    account: &str,
    name: &str,
    global: bool,
) -> Result<(TemplateDescriptor, String), TemplateError> {
    let path = if global {
        format!("/global/templates/{name}")
    } else {
        format!("/accounts/{account}/templates/{name}")
    };
    let body = client.get(&path).await?;
    match serde_json::from_str(&body) {
        Ok(descriptor) => Ok((descriptor, body)),
        Err(_) => Err(TemplateError::Malformed { raw: body }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_parses_account_scoped_payload() {
        let raw = r#"{
            "org_login": "acme-templates",
            "source_repo": "go-service",
            "is_global": false,
            "language": "go",
            "replacement_string": "__app__"
        }"#;
        let descriptor: TemplateDescriptor = serde_json::from_str(raw).unwrap();
        assert_eq!(descriptor.org_login, "acme-templates");
        assert_eq!(descriptor.replacement_string.as_deref(), Some("__app__"));
        assert!(!descriptor.is_global);
    }

    #[test]
    fn descriptor_tolerates_missing_fields() {
        let descriptor: TemplateDescriptor = serde_json::from_str("{}").unwrap();
        assert!(descriptor.org_login.is_empty());
        assert!(descriptor.replacement_string.is_none());
    }

    #[test]
    fn listing_path_carries_language_filter() {
        assert_eq!(
            with_language("/global/templates".into(), Some("go")),
            "/global/templates?language=go"
        );
        assert_eq!(
            with_language("/global/templates".into(), None),
            "/global/templates"
        );
    }
}

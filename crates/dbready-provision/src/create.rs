//! Database creation through the application's database-manager endpoint.

use reqwest::{Client, StatusCode};
use serde::Serialize;
use url::Url;

use crate::error::{ProvisionError, Result};

const CREATE_PATH: &str = "/web/database/create";
const ACCESS_DENIED_MARKER: &str = "Database creation error: Access Denied";

/// Form body for a database creation request.
#[derive(Clone, Serialize)]
pub struct CreateDatabase {
    pub master_pwd: String,
    pub name: String,
    pub login: String,
    pub password: String,
    pub lang: String,
    pub country_code: String,
    pub phone: String,
}

impl std::fmt::Debug for CreateDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateDatabase")
            .field("name", &self.name)
            .field("login", &self.login)
            .field("lang", &self.lang)
            .field("country_code", &self.country_code)
            .finish_non_exhaustive()
    }
}

/// How the server answered a creation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    Created,
    /// The master password was rejected.
    AccessDenied,
    Failed { status: u16, body: String },
}

impl CreateOutcome {
    fn classify(status: StatusCode, body: String) -> Self {
        if status != StatusCode::OK {
            return Self::Failed {
                status: status.as_u16(),
                body,
            };
        }

        if body.contains(ACCESS_DENIED_MARKER) {
            Self::AccessDenied
        } else {
            Self::Created
        }
    }
}

/// Turn `localhost:8069` style input into the full creation endpoint.
///
/// Adds `http://` when no scheme is given and appends the creation path unless
/// it is already there.
pub fn normalize_endpoint(raw: &str) -> Result<Url> {
    let mut url = if raw.starts_with("http") {
        raw.to_string()
    } else {
        format!("http://{raw}")
    };

    if !url.ends_with(CREATE_PATH) {
        url = format!("{}{CREATE_PATH}", url.trim_end_matches('/'));
    }

    Url::parse(&url).map_err(|source| ProvisionError::InvalidUrl { url, source })
}

#[derive(Clone)]
pub struct DatabaseCreator {
    client: Client,
    endpoint: Url,
}

impl DatabaseCreator {
    /// Build a creator for the server at `base_url`.
    ///
    /// `ignore_ssl` disables certificate verification for self-signed setups.
    pub fn new(base_url: &str, ignore_ssl: bool) -> Result<Self> {
        let endpoint = normalize_endpoint(base_url)?;
        let client = Client::builder()
            .danger_accept_invalid_certs(ignore_ssl)
            .build()?;

        if ignore_ssl {
            tracing::warn!("TLS certificate verification disabled for {endpoint}");
        }

        Ok(Self { client, endpoint })
    }

    /// Submit the creation form once. No retries.
    pub async fn create(&self, request: &CreateDatabase) -> Result<CreateOutcome> {
        tracing::info!(database = %request.name, endpoint = %self.endpoint, "Creating database");

        let response = self
            .client
            .post(self.endpoint.clone())
            .form(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let outcome = CreateOutcome::classify(status, body);
        tracing::debug!(?outcome, "Database creation finished");
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Form;
    use axum::http::StatusCode as AxumStatus;
    use axum::routing::post;
    use axum::Router;
    use std::collections::HashMap;

    #[test]
    fn test_normalize_adds_scheme_and_path() {
        assert_eq!(
            normalize_endpoint("localhost:8069").unwrap().as_str(),
            "http://localhost:8069/web/database/create"
        );
    }

    #[test]
    fn test_normalize_keeps_https_and_trims_slash() {
        assert_eq!(
            normalize_endpoint("https://erp.example.com:443/").unwrap().as_str(),
            "https://erp.example.com/web/database/create"
        );
    }

    #[test]
    fn test_normalize_keeps_complete_endpoint() {
        assert_eq!(
            normalize_endpoint("http://odoo:8069/web/database/create")
                .unwrap()
                .as_str(),
            "http://odoo:8069/web/database/create"
        );
    }

    #[test]
    fn test_normalize_rejects_garbage() {
        assert!(matches!(
            normalize_endpoint("http://exa mple:80"),
            Err(ProvisionError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_classify_responses() {
        assert_eq!(
            CreateOutcome::classify(StatusCode::OK, "<html>ok</html>".into()),
            CreateOutcome::Created
        );
        assert_eq!(
            CreateOutcome::classify(
                StatusCode::OK,
                "<div>Database creation error: Access Denied</div>".into()
            ),
            CreateOutcome::AccessDenied
        );
        assert_eq!(
            CreateOutcome::classify(StatusCode::INTERNAL_SERVER_ERROR, "boom".into()),
            CreateOutcome::Failed {
                status: 500,
                body: "boom".into()
            }
        );
    }

    #[test]
    fn test_debug_hides_passwords() {
        let req = sample_request("admin");
        let debug = format!("{req:?}");
        assert!(!debug.contains("admin-secret"));
        assert!(!debug.contains("user-secret"));
    }

    fn sample_request(master_pwd: &str) -> CreateDatabase {
        CreateDatabase {
            master_pwd: format!("{master_pwd}-secret"),
            name: "odoo".into(),
            login: "admin".into(),
            password: "user-secret".into(),
            lang: "en_US".into(),
            country_code: "tw".into(),
            phone: "+886987654321".into(),
        }
    }

    async fn create_handler(Form(form): Form<HashMap<String, String>>) -> (AxumStatus, String) {
        match form.get("master_pwd").map(String::as_str) {
            Some("admin-secret") if form.get("name").is_some_and(|n| n == "odoo") => {
                (AxumStatus::OK, "<html>created</html>".into())
            }
            Some(_) => (
                AxumStatus::OK,
                "Database creation error: Access Denied".into(),
            ),
            None => (AxumStatus::BAD_REQUEST, "missing master_pwd".into()),
        }
    }

    async fn spawn_server() -> String {
        let app = Router::new().route("/web/database/create", post(create_handler));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr.to_string()
    }

    #[tokio::test]
    async fn test_create_against_local_server() {
        let addr = spawn_server().await;
        let creator = DatabaseCreator::new(&addr, false).unwrap();

        let outcome = creator.create(&sample_request("admin")).await.unwrap();
        assert_eq!(outcome, CreateOutcome::Created);

        let outcome = creator.create(&sample_request("wrong")).await.unwrap();
        assert_eq!(outcome, CreateOutcome::AccessDenied);
    }

    #[tokio::test]
    async fn test_unknown_path_is_failure() {
        let addr = spawn_server().await;
        let creator = DatabaseCreator::new(&format!("http://{addr}/nope"), false).unwrap();

        let outcome = creator.create(&sample_request("admin")).await.unwrap();
        assert!(matches!(outcome, CreateOutcome::Failed { status: 404, .. }));
    }
}

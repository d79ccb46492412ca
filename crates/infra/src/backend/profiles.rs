//! `profiles` table access over the REST API (`/rest/v1`)

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Method, RequestBuilder};
use studyhub_core::ProfileRepository;
use studyhub_domain::constants::{PROFILES_TABLE, REST_API_PREFIX};
use studyhub_domain::{BackendConfig, Profile, ProfileChanges, Result, StudyHubError};
use tracing::{debug, instrument};

use super::response::read_json;
use super::AccessTokenProvider;
use crate::http::HttpClient;

/// Media type asking the REST API for a single object instead of an array.
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// [`ProfileRepository`] backed by the hosted REST API.
///
/// Requests carry the signed-in user's access token so row-level security
/// applies; without one the anon key is used.
pub struct RestProfileRepository {
    http: HttpClient,
    table_url: String,
    anon_key: String,
    tokens: Arc<dyn AccessTokenProvider>,
}

impl RestProfileRepository {
    pub fn new(
        http: HttpClient,
        config: &BackendConfig,
        tokens: Arc<dyn AccessTokenProvider>,
    ) -> Self {
        Self {
            http,
            table_url: format!("{}{REST_API_PREFIX}/{PROFILES_TABLE}", config.base_url()),
            anon_key: config.anon_key.clone(),
            tokens,
        }
    }

    fn row_request(&self, method: Method, identity_id: &str, bearer: &str) -> RequestBuilder {
        let filter = format!("eq.{identity_id}");
        self.http
            .request(method, &self.table_url)
            .query(&[("id", filter.as_str()), ("select", "*")])
            .header(ACCEPT, SINGLE_OBJECT)
            .bearer_auth(bearer)
    }
}

#[async_trait]
impl ProfileRepository for RestProfileRepository {
    #[instrument(skip(self))]
    async fn fetch_by_identity_id(&self, identity_id: &str) -> Result<Option<Profile>> {
        let bearer = self.tokens.access_token().unwrap_or_else(|| self.anon_key.clone());
        let request = self.row_request(Method::GET, identity_id, &bearer);

        match read_json::<Profile>(self.http.send(request).await?).await {
            Ok(profile) => Ok(Some(profile)),
            Err(err) if err.is_not_found() => {
                debug!("profile row not found");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    #[instrument(skip(self, changes))]
    async fn update(&self, identity_id: &str, changes: &ProfileChanges) -> Result<Profile> {
        let bearer = self.tokens.access_token().ok_or_else(|| {
            StudyHubError::Auth("profile updates require a signed-in user".into())
        })?;

        let request = self
            .row_request(Method::PATCH, identity_id, &bearer)
            .header("Prefer", "return=representation")
            .json(changes);

        read_json(self.http.send(request).await?).await
    }
}

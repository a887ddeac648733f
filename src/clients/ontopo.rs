use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use crate::config::ApiConfig;
use crate::constants::api;
use crate::models::{SearchCriteria, SearchPage, SearchToken, Session};
use crate::services::booking_service::{BookingGateway, GatewayError};

/// Marketplace identity sent with every search token request.
#[derive(Debug, Clone)]
pub struct OntopoConfig {
    pub base_url: String,

    pub marketplace_id: String,

    pub locale: String,

    pub geocodes: Vec<String>,

    pub request_timeout: Duration,
}

impl Default for OntopoConfig {
    fn default() -> Self {
        Self {
            base_url: api::BASE_URL.to_string(),
            marketplace_id: api::MARKETPLACE_ID.to_string(),
            locale: api::LOCALE.to_string(),
            geocodes: api::GEOCODES.iter().map(ToString::to_string).collect(),
            request_timeout: Duration::from_secs(api::REQUEST_TIMEOUT_SECONDS),
        }
    }
}

impl From<&ApiConfig> for OntopoConfig {
    fn from(config: &ApiConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            marketplace_id: config.marketplace_id.clone(),
            locale: config.locale.clone(),
            geocodes: config.geocodes.clone(),
            request_timeout: Duration::from_secs(config.request_timeout_seconds),
        }
    }
}

#[derive(Serialize)]
struct SearchTokenRequest<'a> {
    criteria: CriteriaBody<'a>,
    marketplace_id: &'a str,
    locale: &'a str,
    geocodes: &'a [String],
}

#[derive(Serialize)]
struct CriteriaBody<'a> {
    date: &'a str,
    time: &'a str,
    size: &'a str,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    search_id: &'a str,
}

#[derive(Debug, Clone)]
pub struct OntopoClient {
    client: Client,
    config: OntopoConfig,
}

impl Default for OntopoClient {
    fn default() -> Self {
        Self::with_client(Client::new(), OntopoConfig::default())
    }
}

impl OntopoClient {
    pub fn new(config: OntopoConfig) -> reqwest::Result<Self> {
        let client = Client::builder()
            .user_agent(api::USER_AGENT)
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self::with_client(client, config))
    }

    #[must_use]
    pub const fn with_client(client: Client, config: OntopoConfig) -> Self {
        Self { client, config }
    }

    #[must_use]
    pub const fn config(&self) -> &OntopoConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    // The API checks the raw `token` header as well as the bearer token.
    fn authorized(&self, url: &str, jwt_token: &str) -> RequestBuilder {
        self.client
            .post(url)
            .bearer_auth(jwt_token)
            .header("token", jwt_token)
    }

    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, GatewayError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(GatewayError::Remote {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| GatewayError::Decode(e.to_string()))
    }
}

#[async_trait::async_trait]
impl BookingGateway for OntopoClient {
    async fn login_anonymously(&self) -> Result<Session, GatewayError> {
        let url = self.endpoint("loginAnonymously");
        Self::send(self.client.post(&url)).await
    }

    async fn acquire_search_token(
        &self,
        jwt_token: &str,
        criteria: &SearchCriteria,
    ) -> Result<SearchToken, GatewayError> {
        let request = SearchTokenRequest {
            criteria: CriteriaBody {
                date: &criteria.date,
                time: &criteria.time,
                size: &criteria.size,
            },
            marketplace_id: &self.config.marketplace_id,
            locale: &self.config.locale,
            geocodes: &self.config.geocodes,
        };

        debug!(
            body = %serde_json::to_string(&request).unwrap_or_default(),
            "Search token request"
        );

        let url = self.endpoint("search_token");
        Self::send(self.authorized(&url, jwt_token).json(&request)).await
    }

    async fn search_restaurants(
        &self,
        jwt_token: &str,
        search_id: &str,
    ) -> Result<SearchPage, GatewayError> {
        let request = SearchRequest { search_id };

        debug!(%search_id, "Search request");

        let url = self.endpoint("search_request");
        Self::send(self.authorized(&url, jwt_token).json(&request)).await
    }
}

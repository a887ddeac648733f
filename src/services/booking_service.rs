//! Seam between the search session and the remote booking API.
//!
//! Implementations are stateless request/response wrappers: no retries, no
//! caching, no validation beyond decoding the documented response shape.

use thiserror::Error;

use crate::models::{SearchCriteria, SearchPage, SearchToken, Session};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Booking API unreachable: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Booking API returned {status}: {body}")]
    Remote { status: u16, body: String },

    #[error("Unexpected booking API response: {0}")]
    Decode(String),
}

impl GatewayError {
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            Self::Network(_) | Self::Decode(_) => None,
        }
    }
}

#[async_trait::async_trait]
pub trait BookingGateway: Send + Sync {
    /// Opens an anonymous session. Sends no body.
    async fn login_anonymously(&self) -> Result<Session, GatewayError>;

    /// Exchanges criteria for an opaque search id bound to this query.
    async fn acquire_search_token(
        &self,
        jwt_token: &str,
        criteria: &SearchCriteria,
    ) -> Result<SearchToken, GatewayError>;

    /// Fetches the results for a search id.
    ///
    /// Repeated calls with the same id are how further pages are requested;
    /// what changes between calls is up to the remote API.
    async fn search_restaurants(
        &self,
        jwt_token: &str,
        search_id: &str,
    ) -> Result<SearchPage, GatewayError>;
}

#[async_trait::async_trait]
impl<G: BookingGateway + ?Sized> BookingGateway for std::sync::Arc<G> {
    async fn login_anonymously(&self) -> Result<Session, GatewayError> {
        (**self).login_anonymously().await
    }

    async fn acquire_search_token(
        &self,
        jwt_token: &str,
        criteria: &SearchCriteria,
    ) -> Result<SearchToken, GatewayError> {
        (**self).acquire_search_token(jwt_token, criteria).await
    }

    async fn search_restaurants(
        &self,
        jwt_token: &str,
        search_id: &str,
    ) -> Result<SearchPage, GatewayError> {
        (**self).search_restaurants(jwt_token, search_id).await
    }
}

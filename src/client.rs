//! Async HTTP client for the ledger API.
//!
//! Every request carries the bearer token. Non-success answers are turned
//! into [`LedgerError::Api`] with a message normalized from whatever error
//! body shape the server produced.

use core::future::Future;

use reqwest::header::{ACCEPT, AUTHORIZATION};
use secrecy::{ExposeSecret as _, SecretString};
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{LedgerError, Result, normalize_api_error};
use crate::models::{
    FilterSet, MemberId, Page, PageRequest, PaginatedResponse, Transaction, TransactionStats,
};
use crate::source::{LedgerSource, MAX_PAGE_SIZE};

/// Base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:9000";

/// Transactions list endpoint path.
const TRANSACTIONS_PATH: &str = "/api/transactions";

/// Transaction aggregates endpoint path.
const STATS_PATH: &str = "/api/transactions/stats";

/// Builder for constructing a [`LedgerClient`].
#[derive(Debug, Default)]
pub struct LedgerClientBuilder {
    /// Access token for API authentication.
    token: Option<String>,
    /// Base URL override.
    base_url: Option<String>,
    /// Page size requested by list calls.
    page_size: Option<u32>,
}

impl LedgerClientBuilder {
    /// Sets the access token for API authentication.
    #[inline]
    #[must_use]
    pub fn token<T: Into<String>>(mut self, token: T) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Overrides the base URL (useful for testing with a mock server).
    #[inline]
    #[must_use]
    pub fn base_url<T: Into<String>>(mut self, url: T) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the page size used by exhaustive fetches. Values are clamped to
    /// `1..=MAX_PAGE_SIZE`.
    #[inline]
    #[must_use]
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size.clamp(1, MAX_PAGE_SIZE));
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::MissingToken`] if no token was provided,
    /// [`LedgerError::InvalidBaseUrl`] if the base URL does not parse, and
    /// [`LedgerError::Http`] if the HTTP client fails to build.
    #[inline]
    #[tracing::instrument(skip_all)]
    pub fn build(self) -> Result<LedgerClient> {
        let token = self
            .token
            .filter(|token| !token.trim().is_empty())
            .ok_or(LedgerError::MissingToken)?;
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned())
            .trim_end_matches('/')
            .to_owned();
        let _parsed = Url::parse(&base_url)?;
        tracing::debug!(base_url = %base_url, "building client");
        let http = reqwest::Client::builder().build()?;

        Ok(LedgerClient {
            http,
            token: SecretString::from(token),
            base_url,
            page_size: self.page_size.unwrap_or(MAX_PAGE_SIZE),
        })
    }
}

/// Async client for the ledger API.
///
/// Use [`LedgerClient::builder()`] to construct an instance.
#[derive(Debug)]
pub struct LedgerClient {
    /// Underlying HTTP client.
    http: reqwest::Client,
    /// Bearer access token.
    token: SecretString,
    /// API base URL without a trailing slash.
    base_url: String,
    /// Page size requested by exhaustive fetches.
    page_size: u32,
}

impl LedgerClient {
    /// Creates a new builder for configuring the client.
    #[inline]
    #[must_use]
    pub fn builder() -> LedgerClientBuilder {
        LedgerClientBuilder::default()
    }

    /// Base URL the client talks to.
    #[inline]
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Lists one page of transactions via `GET /api/transactions`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails, the server returns a
    /// non-success status, or the response is not a valid page.
    #[inline]
    #[tracing::instrument(skip_all, fields(page = request.page))]
    pub async fn list_transactions(
        &self,
        filters: &FilterSet,
        request: PageRequest,
    ) -> Result<Page<Transaction>> {
        self.fetch_page(TRANSACTIONS_PATH, filters, request).await
    }

    /// Lists one page of a member's transactions via
    /// `GET /api/transactions/member/{id}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails, the server returns a
    /// non-success status, or the response is not a valid page.
    #[inline]
    #[tracing::instrument(skip_all, fields(member = %member, page = request.page))]
    pub async fn member_transactions(
        &self,
        member: MemberId,
        filters: &FilterSet,
        request: PageRequest,
    ) -> Result<Page<Transaction>> {
        let path = format!("{TRANSACTIONS_PATH}/member/{member}");
        self.fetch_page(&path, filters, request).await
    }

    /// Fetches server-side aggregates via `GET /api/transactions/stats`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails, the server returns a
    /// non-success status, or the response cannot be deserialized.
    #[inline]
    #[tracing::instrument(skip_all)]
    pub async fn transaction_stats(&self, filters: &FilterSet) -> Result<TransactionStats> {
        tracing::debug!("calling stats endpoint");
        self.get_json(STATS_PATH, &filters.query_pairs()).await
    }

    /// Requests a paginated list endpoint.
    async fn fetch_page(
        &self,
        path: &str,
        filters: &FilterSet,
        request: PageRequest,
    ) -> Result<Page<Transaction>> {
        let mut query = filters.query_pairs();
        query.push(("page", request.page.to_string()));
        query.push(("limit", request.page_size.to_string()));
        let response: PaginatedResponse<Transaction> = self.get_json(path, &query).await?;
        tracing::debug!(
            rows = response.data.len(),
            total = response.meta.total,
            "received page"
        );
        Ok(Page::from(response))
    }

    /// Builds the absolute URL for `path` with the given query string.
    fn endpoint(&self, path: &str, query: &[(&'static str, String)]) -> Result<Url> {
        let mut url = Url::parse(&format!("{}{path}", self.base_url))?;
        if !query.is_empty() {
            _ = url
                .query_pairs_mut()
                .extend_pairs(query.iter().map(|(key, value)| (*key, value.as_str())));
        }
        Ok(url)
    }

    /// Sends an authenticated GET request and deserializes the response.
    #[tracing::instrument(skip_all, fields(path = %path))]
    async fn get_json<Resp: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<Resp> {
        let url = self.endpoint(path, query)?;
        tracing::trace!(url = %url, "sending GET request");
        let response = self
            .http
            .get(url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token.expose_secret()))
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| self.transport_error(err))?;
        handle_response(response).await
    }

    /// Classifies a transport failure.
    fn transport_error(&self, err: reqwest::Error) -> LedgerError {
        if err.is_connect() {
            LedgerError::Unreachable {
                base_url: self.base_url.clone(),
                source: err,
            }
        } else {
            LedgerError::Http(err)
        }
    }
}

/// Checks the status and decodes a JSON body.
async fn handle_response<Resp: DeserializeOwned>(response: reqwest::Response) -> Result<Resp> {
    let status = response.status();
    tracing::debug!(status = %status, "received response");
    let body = response.text().await?;
    if status.is_success() {
        tracing::trace!(body_len = body.len(), "parsing response body");
        serde_json::from_str(&body).map_err(LedgerError::from)
    } else {
        let message = normalize_api_error(status.as_u16(), &body);
        tracing::debug!(status = status.as_u16(), message = %message, "API error");
        Err(LedgerError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

impl LedgerSource for LedgerClient {
    #[inline]
    fn page_size(&self) -> u32 {
        self.page_size
    }

    #[inline]
    fn list(
        &self,
        filters: &FilterSet,
        request: PageRequest,
    ) -> impl Future<Output = Result<Page<Transaction>>> + Send {
        self.list_transactions(filters, request)
    }
}

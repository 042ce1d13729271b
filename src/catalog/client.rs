use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use reqwest::multipart::Form;
use reqwest::RequestBuilder;
use tokio::sync::Semaphore;
use tracing::{debug, error, warn};
use url::Url;

use crate::catalog::parse::{parse_license_class, parse_license_ids, parse_license_uri};
use crate::catalog::payload::{answer_payload, ANSWERS_PART};
use crate::error::{CatalogError, ErrorKind};
use crate::models::{AnswerSet, Catalog, LicenseSummary};
use crate::xml::XmlDocument;

pub const DEFAULT_MAX_CONNECTIONS: usize = 5;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Settings a [`LicenseCatalogClient`] is built from.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// API root, e.g. `https://api.creativecommons.org/rest/1.5`.
    pub root_url: Url,
    /// License class identifiers dropped from every listing.
    pub excluded_licenses: HashSet<String>,
    /// Upper bound on requests in flight across all clones of the client.
    pub max_connections: usize,
    pub timeout: Duration,
}

impl CatalogConfig {
    pub fn new(root_url: Url) -> Self {
        Self {
            root_url,
            excluded_licenses: HashSet::new(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Steps of a whole-catalog fetch, in the order they happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogProgress<'a> {
    /// The license list arrived with this many classes to fetch.
    Listed(usize),
    /// The detail request for this class finished, successfully or not.
    Fetched(&'a str),
}

/// Client for a license-chooser API.
///
/// Every operation comes in two forms: `try_*` returns a typed
/// [`CatalogError`], the plain form logs the failure and returns an empty or
/// absent value. Clones share the connection pool and the in-flight limit.
#[derive(Debug, Clone)]
pub struct LicenseCatalogClient {
    http: reqwest::Client,
    root: Url,
    excluded: Arc<HashSet<String>>,
    permits: Arc<Semaphore>,
}

impl LicenseCatalogClient {
    pub fn new(config: CatalogConfig) -> Result<Self, CatalogError> {
        if config.root_url.cannot_be_a_base() {
            return Err(CatalogError::InvalidUrl {
                operation: "client_init",
                url: config.root_url.to_string(),
                reason: "not a base URL".to_string(),
            });
        }

        let max_connections = config.max_connections.max(1);

        // reqwest never retries on its own
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .pool_max_idle_per_host(max_connections)
            .user_agent(concat!("license-catalog/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| CatalogError::Transport {
                operation: "client_init",
                url: config.root_url.to_string(),
                source,
            })?;

        Ok(Self {
            http,
            root: config.root_url,
            excluded: Arc::new(config.excluded_licenses),
            permits: Arc::new(Semaphore::new(max_connections)),
        })
    }

    pub fn root_url(&self) -> &Url {
        &self.root
    }

    /// `{root}/{segments...}` with any query of the root removed.
    fn endpoint(&self, operation: &'static str, segments: &[&str]) -> Result<Url, CatalogError> {
        let mut url = self.root.clone();
        url.set_query(None);
        url.path_segments_mut()
            .map_err(|_| CatalogError::InvalidUrl {
                operation,
                url: self.root.to_string(),
                reason: "not a base URL".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send `request` and return the body of a successful response.
    async fn send(
        &self,
        operation: &'static str,
        url: &Url,
        request: RequestBuilder,
    ) -> Result<String, CatalogError> {
        // The semaphore is never closed; a failed acquire only skips the limit.
        let _permit = self.permits.acquire().await.ok();

        debug!(operation, %url, "sending request");

        let transport = |source| CatalogError::Transport {
            operation,
            url: url.to_string(),
            source,
        };

        let response = request.send().await.map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                operation,
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(transport)
    }

    // -- license list ---------------------------------------------------------

    /// `GET {root}/?locale={locale}`: identifiers of all offered license
    /// classes, minus the configured exclusions.
    pub async fn try_list_licenses(&self, locale: &str) -> Result<Vec<String>, CatalogError> {
        const OP: &str = "list_licenses";

        let mut url = self.endpoint(OP, &[""])?;
        url.query_pairs_mut().append_pair("locale", locale);

        let body = self.send(OP, &url, self.http.get(url.clone())).await?;
        parse_license_ids(&body, &self.excluded)
    }

    pub async fn list_licenses(&self, locale: &str) -> Vec<String> {
        match self.try_list_licenses(locale).await {
            Ok(ids) => ids,
            Err(e) => {
                error!(operation = "list_licenses", locale, error = %e, "could not retrieve license list");
                Vec::new()
            }
        }
    }

    // -- license detail -------------------------------------------------------

    /// `GET {root}/license/{id}`: the label and questions of one license class.
    pub async fn try_get_license(&self, license_id: &str) -> Result<LicenseSummary, CatalogError> {
        const OP: &str = "get_license";

        let url = self.endpoint(OP, &["license", license_id])?;
        let body = self.send(OP, &url, self.http.get(url.clone())).await?;
        parse_license_class(license_id, &body)
    }

    pub async fn get_license(&self, license_id: &str) -> Option<LicenseSummary> {
        match self.try_get_license(license_id).await {
            Ok(summary) => Some(summary),
            Err(e) => {
                error!(operation = "get_license", id = license_id, error = %e, "could not retrieve license");
                None
            }
        }
    }

    /// Every license class for `locale` with its questions.
    ///
    /// Detail requests run concurrently within the connection limit. A class
    /// whose detail cannot be fetched is left out and named in
    /// [`Catalog::failed`].
    pub async fn retrieve_licenses(&self, locale: &str) -> Catalog {
        self.retrieve_licenses_with(locale, |_| {}).await
    }

    /// [`retrieve_licenses`](Self::retrieve_licenses), reporting each step
    /// to `progress` as it happens.
    pub async fn retrieve_licenses_with<F>(&self, locale: &str, progress: F) -> Catalog
    where
        F: Fn(CatalogProgress<'_>),
    {
        let ids = self.list_licenses(locale).await;
        progress(CatalogProgress::Listed(ids.len()));

        let progress = &progress;
        let fetches = ids.iter().map(|id| async move {
            let result = self.try_get_license(id).await;
            progress(CatalogProgress::Fetched(id.as_str()));
            result
        });
        let results = join_all(fetches).await;

        assemble_catalog(ids.into_iter().zip(results))
    }

    // -- license URI ----------------------------------------------------------

    /// `POST {root}/license/{id}/issue` with the answers document; returns the
    /// issued license URI.
    ///
    /// A response without a (non-blank) `license-uri` is an
    /// [`ErrorKind::NotFound`] error.
    pub async fn try_resolve_license_uri(
        &self,
        license_id: &str,
        locale: &str,
        answers: &AnswerSet,
    ) -> Result<String, CatalogError> {
        const OP: &str = "resolve_license_uri";

        let payload = answer_payload(license_id, locale, answers)?;
        let url = self.endpoint(OP, &["license", license_id, "issue"])?;
        let form = Form::new().text(ANSWERS_PART, payload);

        let body = self
            .send(OP, &url, self.http.post(url.clone()).multipart(form))
            .await?;
        parse_license_uri(&body)
    }

    pub async fn resolve_license_uri(
        &self,
        license_id: &str,
        locale: &str,
        answers: &AnswerSet,
    ) -> Option<String> {
        match self.try_resolve_license_uri(license_id, locale, answers).await {
            Ok(uri) => Some(uri),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(operation = "resolve_license_uri", id = license_id, %answers, "no license URI issued");
                None
            }
            Err(e) => {
                error!(
                    operation = "resolve_license_uri",
                    id = license_id,
                    %answers,
                    error = %e,
                    "could not retrieve license URI"
                );
                None
            }
        }
    }

    // -- license document -----------------------------------------------------

    /// `GET {root}/details?license-uri={uri}`: the descriptor document of an
    /// issued license. `license_uri` must be an absolute URL.
    pub async fn try_fetch_license_document(
        &self,
        license_uri: &str,
    ) -> Result<XmlDocument, CatalogError> {
        const OP: &str = "fetch_license_document";

        // Validated only; the caller's spelling is what the API receives.
        Url::parse(license_uri).map_err(|e| CatalogError::InvalidUrl {
            operation: OP,
            url: license_uri.to_string(),
            reason: e.to_string(),
        })?;

        let mut url = self.endpoint(OP, &["details"])?;
        url.query_pairs_mut().append_pair("license-uri", license_uri);

        let body = self.send(OP, &url, self.http.get(url.clone())).await?;
        XmlDocument::parse(&body).map_err(|source| CatalogError::Parse {
            operation: OP,
            source,
        })
    }

    pub async fn fetch_license_document(&self, license_uri: &str) -> Option<XmlDocument> {
        match self.try_fetch_license_document(license_uri).await {
            Ok(doc) => Some(doc),
            Err(e) => {
                error!(
                    operation = "fetch_license_document",
                    uri = license_uri,
                    error = %e,
                    "could not retrieve license document"
                );
                None
            }
        }
    }
}

/// Fold per-license results into a [`Catalog`], keeping successes in input
/// order and logging each failure.
pub fn assemble_catalog<I>(results: I) -> Catalog
where
    I: IntoIterator<Item = (String, Result<LicenseSummary, CatalogError>)>,
{
    let mut catalog = Catalog::default();

    for (id, result) in results {
        match result {
            Ok(summary) => catalog.licenses.push(summary),
            Err(e) => {
                error!(operation = "get_license", id = %id, error = %e, "could not retrieve license");
                catalog.failed.push(id);
            }
        }
    }

    if !catalog.is_complete() {
        warn!(
            retrieved = catalog.licenses.len(),
            failed = catalog.failed.len(),
            "license catalog is incomplete"
        );
    }

    catalog
}

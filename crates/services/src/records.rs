//! Remote proxies for the persistence API
//!
//! [`RecordService`] mirrors the CRUD protocol for one record kind. Calls
//! that cannot succeed (the unsaved id) return immediately without touching
//! the network. Everything else is timed and any failure, including a
//! panic inside the transport, is reported as an empty result.

use std::future::Future;
use std::marker::PhantomData;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use pandamonium_common::{
    config::PersistenceApiConfig,
    metrics::{record_proxy_failure, RequestTimer},
    records::{Definition, Proof, Record, UNSAVED_ID},
};
use reqwest::{StatusCode, Url};
use tracing::{debug, error, info};

use crate::rest::{RestClient, RestService, Timeouts};

/// Proxy for one record kind served under `{base_url}{R::RESOURCE}/`
pub struct RecordService<R, C = RestService> {
    client: Arc<C>,
    resource_url: String,
    timeouts: Timeouts,
    _record: PhantomData<fn() -> R>,
}

pub type DefinitionService<C = RestService> = RecordService<Definition, C>;
pub type ProofService<C = RestService> = RecordService<Proof, C>;

impl<R, C> Clone for RecordService<R, C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            resource_url: self.resource_url.clone(),
            timeouts: self.timeouts,
            _record: PhantomData,
        }
    }
}

impl<R: Record> RecordService<R, RestService> {
    /// Proxy configured from the `persistence_api` section
    pub fn from_config(client: Arc<RestService>, config: &PersistenceApiConfig) -> Self {
        Self::new(client, &config.base_url, Timeouts::from(config))
    }
}

impl<R: Record, C: RestClient> RecordService<R, C> {
    pub fn new(client: Arc<C>, base_url: &str, timeouts: Timeouts) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            client,
            resource_url: format!("{}/{}/", base, R::RESOURCE),
            timeouts,
            _record: PhantomData,
        }
    }

    /// `{base_url}{resource}/`
    pub fn resource_url(&self) -> &str {
        &self.resource_url
    }

    fn record_url(&self, id: i32) -> String {
        format!("{}{}", self.resource_url, id)
    }

    /// Run one forwarded call, absorbing panics and counting empty results
    async fn guarded<T, F>(&self, operation: &'static str, call: F) -> Option<T>
    where
        F: Future<Output = Option<T>>,
    {
        let _timer = RequestTimer::start(R::RESOURCE, operation);

        let outcome = match AssertUnwindSafe(call).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(_) => {
                error!(resource = R::RESOURCE, operation, "Transport panicked");
                None
            }
        };

        if outcome.is_none() {
            record_proxy_failure(R::RESOURCE, operation);
        }
        outcome
    }

    pub async fn get_all(&self) -> Option<Vec<R>> {
        info!("Sending request to get all {}", R::RESOURCE);

        let request = self.client.get(&self.resource_url, self.timeouts, None);
        let records: Option<Vec<R>> = self.guarded("get_all", request).await;

        if let Some(records) = &records {
            info!("Received {} {}", records.len(), R::RESOURCE);
        }
        records
    }

    pub async fn find_by_id(&self, id: i32) -> Option<R> {
        if id == UNSAVED_ID {
            error!("Passed ID is {}", UNSAVED_ID);
            return None;
        }

        info!("Sending request to find {} by id {}", R::RESOURCE, id);
        let url = self.record_url(id);
        self.guarded("find_by_id", self.client.get(&url, self.timeouts, None))
            .await
    }

    /// Create `record`. Its id and version are assigned by the persistence API.
    pub async fn create(&self, record: &R) -> Option<R> {
        info!("Sending request to insert {} record", R::RESOURCE);
        debug!(?record, "Create payload");

        self.guarded(
            "create",
            self.client.post(&self.resource_url, record, self.timeouts),
        )
        .await
    }

    /// Send `record` as a partial update of the stored record with its id
    pub async fn update(&self, record: &R) -> Option<R> {
        if record.id() == UNSAVED_ID {
            error!("Specified ID is {}", UNSAVED_ID);
            return None;
        }

        info!("Sending request to update {} with id {}", R::RESOURCE, record.id());
        let url = self.record_url(record.id());
        self.guarded("update", self.client.patch(&url, record, self.timeouts))
            .await
    }

    pub async fn delete(&self, record: &R) -> bool {
        if record.id() == UNSAVED_ID {
            error!("Specified ID is {}", UNSAVED_ID);
            return false;
        }

        info!("Sending request to delete {} with id {}", R::RESOURCE, record.id());
        let url = self.record_url(record.id());
        let deleted = self
            .guarded("delete", async {
                self.client
                    .delete(&url, self.timeouts, StatusCode::NO_CONTENT)
                    .await
                    .then_some(())
            })
            .await;

        deleted.is_some()
    }

    async fn find_where(&self, operation: &'static str, field: &str, value: &str) -> Option<Vec<R>> {
        info!("Sending request to find {} by {} {}", R::RESOURCE, field, value);

        let url = match Url::parse_with_params(
            &format!("{}{}", self.resource_url, field),
            &[(field, value)],
        ) {
            Ok(url) => url,
            Err(e) => {
                error!(error = %e, base = %self.resource_url, "Invalid persistence API URL");
                record_proxy_failure(R::RESOURCE, operation);
                return None;
            }
        };

        self.guarded(operation, self.client.get(url.as_str(), self.timeouts, None))
            .await
    }
}

impl<C: RestClient> RecordService<Proof, C> {
    pub async fn find_by_branch(&self, branch: &str) -> Option<Vec<Proof>> {
        self.find_where("find_by_branch", "branch", branch).await
    }

    pub async fn find_by_theorem_name(&self, theorem_name: &str) -> Option<Vec<Proof>> {
        self.find_where("find_by_theorem_name", "theorem_name", theorem_name)
            .await
    }
}

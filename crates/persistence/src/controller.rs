//! Record CRUD protocol
//!
//! Framework-independent request handling for one record kind. Every
//! operation validates its inputs, talks to the store under a
//! [`QueryTimer`] and reports its outcome. Absent inputs are
//! `InvalidRequest`, failed field validation is `UnprocessableEntity`, and
//! a missing record comes back as `Ok(None)` rather than an error.

use std::sync::Arc;

use pandamonium_common::{
    db::RecordStore,
    errors::{AppError, Result},
    metrics::QueryTimer,
    records::{merge, Proof, ProofFilter, Record, RecordPatch},
};
use tracing::{debug, error, info, warn};

pub struct RecordController<R: Record> {
    store: Arc<dyn RecordStore<R>>,
}

impl<R: Record> Clone for RecordController<R> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<R: Record> RecordController<R> {
    pub fn new(store: Arc<dyn RecordStore<R>>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &dyn RecordStore<R> {
        self.store.as_ref()
    }

    /// All records. An empty store is a successful, empty result.
    pub async fn list(&self) -> Result<Vec<R>> {
        info!(resource = R::RESOURCE, "Received request to list all {}", R::RESOURCE);
        debug!("Querying for list of all {}", R::RESOURCE);

        let timer = QueryTimer::start(R::RESOURCE, "list");
        let records = self.store.list().await;
        timer.stop();
        let records = records?;

        info!("Returning list of all {} with size {}", R::RESOURCE, records.len());
        Ok(records)
    }

    pub async fn get_by_id(&self, id: Option<i32>) -> Result<Option<R>> {
        info!(resource = R::RESOURCE, ?id, "Received request to query by id");
        let Some(id) = id else {
            error!("ERROR: ID was null");
            return Err(AppError::invalid_request("Specified ID is null"));
        };

        debug!("Querying for {} with id {}", R::RESOURCE, id);

        let timer = QueryTimer::start(R::RESOURCE, "get_by_id");
        let record = self.store.get(id).await;
        timer.stop();

        match record? {
            Some(record) => {
                info!("Returning {} with id {}", R::RESOURCE, id);
                Ok(Some(record))
            }
            None => {
                warn!("No {} was found with id {}", R::RESOURCE, id);
                Ok(None)
            }
        }
    }

    /// Records matching `filter`. Unlike [`Self::list`], an empty match is
    /// reported as not found (`Ok(None)`).
    pub async fn find_by(&self, label: &str, filter: Option<R::Filter>) -> Result<Option<Vec<R>>> {
        info!(resource = R::RESOURCE, ?filter, "Received request to query by {}", label);
        let Some(filter) = filter else {
            error!("ERROR: {} was null", label);
            return Err(AppError::invalid_request(format!("Specified {} is null", label)));
        };

        debug!("Querying for {} with {:?}", R::RESOURCE, filter);

        let timer = QueryTimer::start(R::RESOURCE, "find_by");
        let records = self.store.find_by(&filter).await;
        timer.stop();
        let records = records?;

        if records.is_empty() {
            warn!("No {} were found for {:?}", R::RESOURCE, filter);
            return Ok(None);
        }

        info!("Returning list of {} with size {}", R::RESOURCE, records.len());
        Ok(Some(records))
    }

    pub async fn create(&self, payload: Option<R::Patch>) -> Result<R> {
        info!(resource = R::RESOURCE, "Received request to insert a new record");
        let Some(payload) = payload else {
            error!("Passed entity is null");
            return Err(AppError::invalid_request(format!("Passed {} record is null", R::RESOURCE)));
        };

        if let Err(errors) = payload.validate_insert() {
            error!(%errors, "Binding result is unprocessable");
            return Err(errors.into());
        }

        debug!("Saving new {} record", R::RESOURCE);

        let timer = QueryTimer::start(R::RESOURCE, "create");
        let saved = self.store.save(payload.into_record()).await;
        timer.stop();
        let saved = saved?;

        info!("Returning the newly created {} record with id {}", R::RESOURCE, saved.id());
        Ok(saved)
    }

    /// Merge `payload` onto the stored record and bump its version by one.
    ///
    /// The read and the write are separate store calls: two concurrent
    /// updates of the same id can both read version N and both write N + 1.
    pub async fn update(&self, id: Option<i32>, payload: Option<R::Patch>) -> Result<Option<R>> {
        info!(resource = R::RESOURCE, ?id, "Received request to update a record");

        if let Some(Err(errors)) = payload.as_ref().map(|p| p.validate_update()) {
            error!(%errors, "Binding result is unprocessable");
            return Err(errors.into());
        }

        let Some(payload) = payload else {
            error!("Passed entity is null");
            return Err(AppError::invalid_request(format!("Passed {} record is null", R::RESOURCE)));
        };

        let Some(id) = id else {
            error!("Record ID must be specified");
            return Err(AppError::invalid_request("Specified ID is null"));
        };

        debug!("Checking for existence of {} with id {}", R::RESOURCE, id);

        let timer = QueryTimer::start(R::RESOURCE, "get_by_id");
        let existing = self.store.get(id).await;
        timer.stop();

        let Some(existing) = existing? else {
            error!("No {} associated with id {}", R::RESOURCE, id);
            return Ok(None);
        };

        let Some(version) = existing.version().checked_add(1) else {
            error!("Version counter of {} with id {} is exhausted", R::RESOURCE, id);
            return Err(AppError::Internal {
                message: format!("Version counter of {} {} is exhausted", R::RESOURCE, id),
            });
        };

        let mut merged = merge(&payload, &existing);
        merged.set_version(version);

        info!("Updating {} with id {}", R::RESOURCE, id);

        let timer = QueryTimer::start(R::RESOURCE, "update");
        let updated = self.store.save(merged).await;
        timer.stop();

        Ok(Some(updated?))
    }

    /// Delete by id. Deleting an id that does not exist still succeeds.
    pub async fn delete(&self, id: Option<i32>) -> Result<()> {
        info!(resource = R::RESOURCE, ?id, "Received request to delete a record");
        let Some(id) = id else {
            error!("Specified id is null");
            return Err(AppError::invalid_request("Specified ID is null"));
        };

        debug!("Deleting {} with id {}", R::RESOURCE, id);

        let timer = QueryTimer::start(R::RESOURCE, "delete");
        let deleted = self.store.delete(id).await;
        timer.stop();
        deleted?;

        info!("Deleted {} with id {}", R::RESOURCE, id);
        Ok(())
    }
}

impl RecordController<Proof> {
    pub async fn find_by_branch(&self, branch: Option<String>) -> Result<Option<Vec<Proof>>> {
        self.find_by("branch", branch.as_deref().map(ProofFilter::branch)).await
    }

    pub async fn find_by_theorem_name(&self, theorem_name: Option<String>) -> Result<Option<Vec<Proof>>> {
        self.find_by("theorem name", theorem_name.as_deref().map(ProofFilter::theorem_name))
            .await
    }
}

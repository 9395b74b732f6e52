use std::sync::Arc;

use tally_store::{InMemoryRecordStore, RecordStore};
use tally_types::{
    Page, PageRequest, Transaction, TransactionDraft, TransactionId, TransactionType,
};
use tracing::{debug, error, info};

use crate::cache::{ListKey, TransactionCache};
use crate::config::ServiceConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::query;
use crate::validation::Validator;

/// The transaction service: validation, storage, caching, and queries
/// composed into the operations exposed to the transport layer.
///
/// Every operation is a single attempt. Failures are returned to the caller
/// unchanged and never retried.
pub struct TransactionService {
    store: Arc<dyn RecordStore>,
    cache: TransactionCache,
    validator: Validator,
    config: ServiceConfig,
}

impl TransactionService {
    /// Create a service over an explicit store handle.
    pub fn new(store: Arc<dyn RecordStore>, config: ServiceConfig) -> Self {
        info!(cache_enabled = config.cache_enabled, "transaction service initialized");
        Self {
            store,
            cache: TransactionCache::with_list_capacity(config.max_cached_lists),
            validator: Validator::with_default_rules(),
            config,
        }
    }

    /// A service over a fresh, empty in-memory store.
    pub fn in_memory(config: ServiceConfig) -> Self {
        Self::new(Arc::new(InMemoryRecordStore::new()), config)
    }

    /// Replace the validation pipeline.
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn cache(&self) -> &TransactionCache {
        &self.cache
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    // ---- Mutations ----

    /// Validate and store a new record.
    pub fn create(&self, draft: &TransactionDraft) -> ServiceResult<Transaction> {
        debug!("attempting to create transaction");
        let fields = self.validator.validate(draft)?;
        let created = self.store.insert(fields)?;
        self.cache.invalidate_lists()?;
        info!(id = %created.id, "transaction created");
        Ok(created)
    }

    /// Replace the mutable fields of an existing record.
    ///
    /// `id` and `timestamp` are preserved.
    pub fn update(
        &self,
        id: &TransactionId,
        draft: &TransactionDraft,
    ) -> ServiceResult<Transaction> {
        debug!(id = %id, "attempting to update transaction");
        let fields = self.validator.validate(draft)?;
        let mut record = self.store.find_by_id(id)?.ok_or_else(|| {
            error!(id = %id, "transaction not found for update");
            ServiceError::NotFound(*id)
        })?;
        record.apply(fields);

        let updated = self.store.replace(record)?.ok_or_else(|| {
            error!(id = %id, "transaction deleted during update");
            ServiceError::NotFound(*id)
        })?;
        self.cache.invalidate_record(id)?;
        info!(id = %id, "transaction updated");
        Ok(updated)
    }

    /// Remove an existing record.
    pub fn delete(&self, id: &TransactionId) -> ServiceResult<()> {
        debug!(id = %id, "attempting to delete transaction");
        if !self.store.exists_by_id(id)? || !self.store.delete_by_id(id)? {
            error!(id = %id, "transaction not found for deletion");
            return Err(ServiceError::NotFound(*id));
        }
        self.cache.invalidate_record(id)?;
        info!(id = %id, "transaction deleted");
        Ok(())
    }

    // ---- Reads ----

    pub fn get_by_id(&self, id: &TransactionId) -> ServiceResult<Transaction> {
        debug!(id = %id, "fetching transaction");
        let load = || -> ServiceResult<Option<Transaction>> { Ok(self.store.find_by_id(id)?) };
        let found = if self.config.cache_enabled {
            self.cache.record_or_load(id, load)?
        } else {
            load()?
        };
        found.ok_or_else(|| {
            error!(id = %id, "transaction not found");
            ServiceError::NotFound(*id)
        })
    }

    /// Every record, in creation order.
    pub fn get_all(&self) -> ServiceResult<Vec<Transaction>> {
        let all = self.cached_list(ListKey::All, || Ok(self.store.find_all()?))?;
        info!(count = all.len(), "retrieved all transactions");
        Ok(all)
    }

    /// One page of all records. Never cached.
    pub fn get_paged(&self, request: PageRequest) -> ServiceResult<Page<Transaction>> {
        debug!(page = request.page(), size = request.size(), "fetching transaction page");
        let page = query::paginate(self.store.find_all()?, request);
        debug!(
            page = page.page,
            total_pages = page.total_pages,
            items = page.len(),
            "returning transaction page"
        );
        Ok(page)
    }

    /// Records of the given type, ignoring case.
    ///
    /// A value that is not a known type matches nothing and is not cached.
    pub fn get_by_type(&self, kind: &str) -> ServiceResult<Vec<Transaction>> {
        let Ok(parsed) = kind.parse::<TransactionType>() else {
            debug!(kind, "unknown transaction type");
            return Ok(Vec::new());
        };
        let found = self.cached_list(ListKey::ByType(parsed), || {
            Ok(query::filter_by_type(self.store.find_all()?, kind))
        })?;
        info!(count = found.len(), kind, "found transactions by type");
        Ok(found)
    }

    /// Records in the given category, ignoring case.
    pub fn get_by_category(&self, category: &str) -> ServiceResult<Vec<Transaction>> {
        let found = self.cached_list(ListKey::by_category(category), || {
            Ok(query::filter_by_category(self.store.find_all()?, category))
        })?;
        info!(count = found.len(), category, "found transactions by category");
        Ok(found)
    }

    fn cached_list<F>(&self, key: ListKey, load: F) -> ServiceResult<Vec<Transaction>>
    where
        F: FnOnce() -> ServiceResult<Vec<Transaction>>,
    {
        if self.config.cache_enabled {
            self.cache.list_or_load(key, load)
        } else {
            load()
        }
    }
}

impl std::fmt::Debug for TransactionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionService")
            .field("config", &self.config)
            .field("cache", &self.cache)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::thread;

    use rust_decimal::Decimal;

    use super::*;
    use crate::error::{ErrorKind, ValidationError};

    fn service() -> TransactionService {
        TransactionService::in_memory(ServiceConfig::default())
    }

    fn hema() -> TransactionDraft {
        TransactionDraft::new("Fruit from Hema", Decimal::new(2318, 2), "DEBIT", Some("Food"))
    }

    fn draft(description: &str, kind: &str, category: Option<&str>) -> TransactionDraft {
        TransactionDraft::new(description, Decimal::new(1000, 2), kind, category)
    }

    // -----------------------------------------------------------------------
    // Create / read / update / delete
    // -----------------------------------------------------------------------

    #[test]
    fn end_to_end_lifecycle() {
        let svc = service();

        let created = svc.create(&hema()).unwrap();
        let fetched = svc.get_by_id(&created.id).unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.description, "Fruit from Hema");
        assert_eq!(fetched.amount, Decimal::new(2318, 2));
        assert_eq!(fetched.kind, TransactionType::Debit);
        assert_eq!(fetched.category.as_deref(), Some("Food"));

        let mut payload = hema();
        payload.amount = Some(Decimal::new(5000, 2));
        svc.update(&created.id, &payload).unwrap();

        let after = svc.get_by_id(&created.id).unwrap();
        assert_eq!(after.amount, Decimal::new(5000, 2));
        assert_eq!(after.id, created.id);
        assert_eq!(after.timestamp, created.timestamp);

        svc.delete(&created.id).unwrap();
        let err = svc.get_by_id(&created.id).unwrap_err();
        assert_eq!(err, ServiceError::NotFound(created.id));
    }

    #[test]
    fn create_assigns_fresh_ids() {
        let svc = service();
        let a = svc.create(&hema()).unwrap();
        let b = svc.create(&hema()).unwrap();
        assert_ne!(a.id, b.id);
        assert!(b.timestamp >= a.timestamp);
    }

    #[test]
    fn repeated_updates_never_move_the_timestamp() {
        let svc = service();
        let created = svc.create(&hema()).unwrap();
        for cents in [100, 200, 300] {
            let mut payload = hema();
            payload.amount = Some(Decimal::new(cents, 2));
            let updated = svc.update(&created.id, &payload).unwrap();
            assert_eq!(updated.timestamp, created.timestamp);
        }
    }

    #[test]
    fn invalid_create_leaves_store_untouched() {
        let svc = service();
        let mut bad = hema();
        bad.amount = Some(Decimal::ZERO);
        let err = svc.create(&bad).unwrap_err();
        assert_eq!(err, ServiceError::Validation(ValidationError::NonPositiveAmount));
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(svc.store().count().unwrap(), 0);
    }

    #[test]
    fn invalid_update_leaves_record_untouched() {
        let svc = service();
        let created = svc.create(&hema()).unwrap();
        let mut bad = hema();
        bad.description = Some("  ".into());
        assert_eq!(
            svc.update(&created.id, &bad).unwrap_err(),
            ServiceError::Validation(ValidationError::EmptyDescription)
        );
        assert_eq!(svc.get_by_id(&created.id).unwrap(), created);
    }

    #[test]
    fn custom_pipeline_cannot_store_bad_values() {
        let svc = service().with_validator(Validator::new());
        let mut bad = hema();
        bad.description = Some("".into());
        assert_eq!(
            svc.create(&bad).unwrap_err(),
            ServiceError::Validation(ValidationError::EmptyDescription)
        );
        bad = hema();
        bad.amount = Some(Decimal::new(-1, 0));
        assert_eq!(svc.create(&bad).unwrap_err().kind(), ErrorKind::Validation);
        assert_eq!(svc.store().count().unwrap(), 0);
    }

    #[test]
    fn validation_runs_before_lookup() {
        let svc = service();
        let mut bad = hema();
        bad.kind = Some("TRANSFER".into());
        let err = svc.update(&TransactionId::new(), &bad).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn update_missing_is_not_found() {
        let svc = service();
        svc.create(&hema()).unwrap();
        let id = TransactionId::new();
        assert_eq!(svc.update(&id, &hema()).unwrap_err(), ServiceError::NotFound(id));
        assert_eq!(svc.get_all().unwrap().len(), 1);
    }

    #[test]
    fn delete_missing_twice_is_not_found_both_times() {
        let svc = service();
        let kept = svc.create(&hema()).unwrap();
        let id = TransactionId::new();
        assert_eq!(svc.delete(&id).unwrap_err(), ServiceError::NotFound(id));
        assert_eq!(svc.delete(&id).unwrap_err(), ServiceError::NotFound(id));
        assert_eq!(svc.get_all().unwrap(), vec![kept]);
    }

    #[test]
    fn delete_is_not_repeatable() {
        let svc = service();
        let created = svc.create(&hema()).unwrap();
        svc.delete(&created.id).unwrap();
        assert_eq!(svc.delete(&created.id).unwrap_err().kind(), ErrorKind::NotFound);
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    #[test]
    fn type_queries_ignore_case() {
        let svc = service();
        svc.create(&draft("salary", "CREDIT", Some("Salary"))).unwrap();
        svc.create(&draft("lunch", "debit", Some("Food"))).unwrap();
        svc.create(&draft("refund", "credit", None)).unwrap();

        let upper = svc.get_by_type("CREDIT").unwrap();
        let lower = svc.get_by_type("credit").unwrap();
        assert_eq!(upper.len(), 2);
        assert_eq!(upper, lower);
    }

    #[test]
    fn category_queries_skip_uncategorized() {
        let svc = service();
        svc.create(&draft("lunch", "DEBIT", Some("Food"))).unwrap();
        svc.create(&draft("dinner", "DEBIT", Some("FOOD"))).unwrap();
        svc.create(&draft("misc", "DEBIT", None)).unwrap();

        assert_eq!(svc.get_by_category("food").unwrap().len(), 2);
        assert!(svc.get_by_category("rent").unwrap().is_empty());
    }

    #[test]
    fn paged_reads_follow_creation_order() {
        let svc = service();
        let ids: Vec<_> = (0..7)
            .map(|i| svc.create(&draft(&format!("tx-{i}"), "DEBIT", None)).unwrap().id)
            .collect();

        let first = svc.get_paged(PageRequest::of(0, 3).unwrap()).unwrap();
        assert_eq!(first.content.iter().map(|t| t.id).collect::<Vec<_>>(), ids[..3].to_vec());
        assert_eq!(first.total_elements, 7);
        assert_eq!(first.total_pages, 3);

        let last = svc.get_paged(PageRequest::of(2, 3).unwrap()).unwrap();
        assert_eq!(last.len(), 1);
        assert_eq!(last.content[0].id, ids[6]);

        let beyond = svc.get_paged(PageRequest::of(9, 3).unwrap()).unwrap();
        assert!(beyond.is_empty());
    }

    // -----------------------------------------------------------------------
    // Cache coherence
    // -----------------------------------------------------------------------

    #[test]
    fn list_reads_are_cached_until_a_mutation() {
        let svc = service();
        svc.create(&hema()).unwrap();

        svc.get_all().unwrap();
        svc.get_all().unwrap();
        assert_eq!(svc.cache().metrics().hits, 1);
        assert!(svc.cache().contains_list(&ListKey::All));

        svc.create(&hema()).unwrap();
        assert!(!svc.cache().contains_list(&ListKey::All));
        assert_eq!(svc.get_all().unwrap().len(), 2);
    }

    #[test]
    fn update_moves_record_between_type_buckets() {
        let svc = service();
        let created = svc.create(&draft("entry", "DEBIT", Some("Food"))).unwrap();
        assert_eq!(svc.get_by_type("DEBIT").unwrap().len(), 1);
        assert!(svc.get_by_type("CREDIT").unwrap().is_empty());

        svc.update(&created.id, &draft("entry", "CREDIT", Some("Food"))).unwrap();
        assert!(svc.get_by_type("DEBIT").unwrap().is_empty());
        assert_eq!(svc.get_by_type("CREDIT").unwrap().len(), 1);
    }

    #[test]
    fn category_and_type_buckets_do_not_collide() {
        let svc = service();
        svc.create(&draft("odd category", "DEBIT", Some("credit"))).unwrap();
        svc.create(&draft("real credit", "CREDIT", None)).unwrap();

        let by_type = svc.get_by_type("credit").unwrap();
        let by_category = svc.get_by_category("credit").unwrap();
        assert_eq!(by_type.len(), 1);
        assert_eq!(by_type[0].description, "real credit");
        assert_eq!(by_category.len(), 1);
        assert_eq!(by_category[0].description, "odd category");
    }

    #[test]
    fn get_by_id_is_fresh_after_update_and_delete() {
        let svc = service();
        let created = svc.create(&hema()).unwrap();
        svc.get_by_id(&created.id).unwrap();
        assert!(svc.cache().contains_record(&created.id));

        let mut payload = hema();
        payload.description = Some("Vegetables".into());
        svc.update(&created.id, &payload).unwrap();
        assert_eq!(svc.get_by_id(&created.id).unwrap().description, "Vegetables");

        svc.delete(&created.id).unwrap();
        assert_eq!(
            svc.get_by_id(&created.id).unwrap_err(),
            ServiceError::NotFound(created.id)
        );
    }

    #[test]
    fn unknown_type_queries_are_not_cached() {
        let svc = service();
        svc.create(&hema()).unwrap();
        for raw in ["TRANSFER", "refund", "x"] {
            assert!(svc.get_by_type(raw).unwrap().is_empty());
        }
        assert_eq!(svc.cache().list_entries(), 0);
    }

    #[test]
    fn category_lists_respect_the_configured_cap() {
        let config = ServiceConfig {
            max_cached_lists: 3,
            ..ServiceConfig::default()
        };
        let svc = TransactionService::in_memory(config);
        svc.create(&hema()).unwrap();
        for i in 0..10 {
            svc.get_by_category(&format!("category-{i}")).unwrap();
        }
        assert_eq!(svc.cache().list_entries(), 3);
        assert_eq!(svc.get_by_category("food").unwrap().len(), 1);
    }

    #[test]
    fn paged_reads_bypass_the_cache() {
        let svc = service();
        svc.create(&hema()).unwrap();
        svc.get_paged(PageRequest::of(0, 10).unwrap()).unwrap();
        assert_eq!(svc.cache().list_entries(), 0);
        assert_eq!(svc.cache().metrics().misses, 0);
    }

    #[test]
    fn disabled_cache_is_never_populated() {
        let svc = TransactionService::in_memory(ServiceConfig::uncached());
        let created = svc.create(&hema()).unwrap();
        svc.get_all().unwrap();
        svc.get_by_type("DEBIT").unwrap();
        svc.get_by_id(&created.id).unwrap();
        assert_eq!(svc.cache().list_entries(), 0);
        assert!(!svc.cache().contains_record(&created.id));
    }

    // -----------------------------------------------------------------------
    // Concurrency
    // -----------------------------------------------------------------------

    #[test]
    fn concurrent_creates_produce_distinct_ids() {
        let svc = Arc::new(service());

        let handles: Vec<_> = (0..100)
            .map(|i| {
                let svc = Arc::clone(&svc);
                thread::spawn(move || {
                    svc.create(&draft(&format!("tx-{i}"), "CREDIT", None)).unwrap().id
                })
            })
            .collect();

        let ids: HashSet<_> = handles
            .into_iter()
            .map(|h| h.join().expect("thread should not panic"))
            .collect();

        assert_eq!(ids.len(), 100);
        assert_eq!(svc.get_all().unwrap().len(), 100);
    }

    #[test]
    fn concurrent_reads_and_writes_keep_lists_coherent() {
        let svc = Arc::new(service());

        let writers: Vec<_> = (0..4)
            .map(|w| {
                let svc = Arc::clone(&svc);
                thread::spawn(move || {
                    for i in 0..25 {
                        svc.create(&draft(&format!("w{w}-{i}"), "DEBIT", None)).unwrap();
                    }
                })
            })
            .collect();
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let svc = Arc::clone(&svc);
                thread::spawn(move || {
                    for _ in 0..50 {
                        svc.get_all().unwrap();
                        svc.get_by_type("debit").unwrap();
                    }
                })
            })
            .collect();

        for h in writers.into_iter().chain(readers) {
            h.join().expect("thread should not panic");
        }

        // Whatever was cached mid-flight, the final view is complete.
        assert_eq!(svc.get_all().unwrap().len(), 100);
        assert_eq!(svc.get_by_type("DEBIT").unwrap().len(), 100);
    }
}

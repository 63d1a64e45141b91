//! Storage layer using RocksDB
//!
//! # Column Families
//!
//! - `batches` - Batch rows (key: batch_id)
//! - `line_items` - Line items (key: batch_id || seq, so a prefix scan yields
//!   a batch's items in submission order)
//! - `settlement_records` - Archival records (key: batch_id)
//! - `activity` - Append-only activity log (key: timestamp_nanos || event_id)
//! - `indices` - Status index (key: status || batch_id)
//!
//! All multi-row mutations go through a single `WriteBatch`, so readers never
//! observe a half-written batch. Status transitions serialize through an
//! internal lock, making `transition_batch` an atomic compare-and-set.

use crate::{
    error::{Error, Result},
    types::{
        ActivityEvent, ActorId, Batch, BatchStatus, ItemStatus, LineItem, SettlementRecord,
        StoreStats, SubmitterSummary,
    },
    Config,
};
use chrono::Utc;
use parking_lot::Mutex;
use rocksdb::{
    ColumnFamily, ColumnFamilyDescriptor, Direction, IteratorMode, Options, WriteBatch, DB,
};
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

/// Column family names
const CF_BATCHES: &str = "batches";
const CF_ITEMS: &str = "line_items";
const CF_RECORDS: &str = "settlement_records";
const CF_ACTIVITY: &str = "activity";
const CF_INDICES: &str = "indices";

/// Storage wrapper for RocksDB
pub struct Storage {
    db: Arc<DB>,

    /// Serializes status transitions; `transition_batch` and
    /// `finalize_settlement` are read-modify-write sections.
    transition_lock: Mutex<()>,
}

impl Storage {
    /// Open or create database
    pub fn open(config: &Config) -> Result<Self> {
        let path = &config.data_dir;

        std::fs::create_dir_all(path)?;

        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);

        // Tuning from config
        db_opts.set_write_buffer_size(config.rocksdb.write_buffer_size_mb * 1024 * 1024);
        db_opts.set_max_write_buffer_number(config.rocksdb.max_write_buffer_number);
        db_opts.set_target_file_size_base(config.rocksdb.target_file_size_mb * 1024 * 1024);
        db_opts.set_max_background_jobs(config.rocksdb.max_background_jobs);

        if config.rocksdb.enable_statistics {
            db_opts.enable_statistics();
        }

        let cf_descriptors = vec![
            ColumnFamilyDescriptor::new(CF_BATCHES, Self::cf_options_hot()),
            ColumnFamilyDescriptor::new(CF_ITEMS, Self::cf_options_hot()),
            ColumnFamilyDescriptor::new(CF_RECORDS, Self::cf_options_cold()),
            ColumnFamilyDescriptor::new(CF_ACTIVITY, Self::cf_options_cold()),
            ColumnFamilyDescriptor::new(CF_INDICES, Self::cf_options_hot()),
        ];

        let db = DB::open_cf_descriptors(&db_opts, path, cf_descriptors)?;

        tracing::info!("Opened RocksDB at {:?}", path);

        Ok(Self {
            db: Arc::new(db),
            transition_lock: Mutex::new(()),
        })
    }

    // Column family options

    fn cf_options_hot() -> Options {
        let mut opts = Options::default();
        // Frequently read, use LZ4 for speed
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
        opts
    }

    fn cf_options_cold() -> Options {
        let mut opts = Options::default();
        opts.set_compression_type(rocksdb::DBCompressionType::Zstd);
        opts
    }

    fn cf_handle(&self, name: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| Error::Storage(format!("Column family {} not found", name)))
    }

    // Key helpers

    fn item_key(batch_id: &Uuid, seq: u32) -> Vec<u8> {
        let mut key = batch_id.as_bytes().to_vec();
        key.extend_from_slice(&seq.to_be_bytes());
        key
    }

    fn index_key(status: BatchStatus, batch_id: &Uuid) -> Vec<u8> {
        let mut key = vec![status as u8];
        key.extend_from_slice(batch_id.as_bytes());
        key
    }

    fn activity_key(event: &ActivityEvent) -> Vec<u8> {
        let nanos = event.timestamp.timestamp_nanos_opt().unwrap_or(0);
        let mut key = nanos.to_be_bytes().to_vec();
        key.extend_from_slice(event.event_id.as_bytes());
        key
    }

    // Batch operations

    /// Persist a new batch and its line items (atomic)
    ///
    /// Sole creation path for a batch; the lifecycle layer validates before
    /// calling, so nothing here is persisted for a rejected submission.
    pub fn put_batch_atomic(&self, batch: &Batch, items: &[LineItem]) -> Result<()> {
        let cf_batches = self.cf_handle(CF_BATCHES)?;
        let cf_items = self.cf_handle(CF_ITEMS)?;
        let cf_indices = self.cf_handle(CF_INDICES)?;

        let mut wb = WriteBatch::default();
        wb.put_cf(cf_batches, batch.id.as_bytes(), bincode::serialize(batch)?);
        for item in items {
            wb.put_cf(
                cf_items,
                Self::item_key(&batch.id, item.seq),
                bincode::serialize(item)?,
            );
        }
        wb.put_cf(cf_indices, Self::index_key(batch.status, &batch.id), b"");

        self.db.write(wb)?;

        tracing::debug!(
            batch_id = %batch.id,
            line_count = batch.line_count,
            "Batch persisted"
        );

        Ok(())
    }

    /// Get batch by ID
    pub fn get_batch(&self, batch_id: Uuid) -> Result<Batch> {
        let cf = self.cf_handle(CF_BATCHES)?;

        let value = self
            .db
            .get_cf(cf, batch_id.as_bytes())?
            .ok_or(Error::BatchNotFound(batch_id))?;

        let batch: Batch = bincode::deserialize(&value)?;
        Ok(batch)
    }

    /// Persist note/label edits on an existing batch
    ///
    /// Must not be used to change `status`; transitions go through
    /// `transition_batch` so the status index stays consistent.
    pub fn update_batch(&self, batch: &Batch) -> Result<()> {
        let cf = self.cf_handle(CF_BATCHES)?;
        self.db
            .put_cf(cf, batch.id.as_bytes(), bincode::serialize(batch)?)?;
        Ok(())
    }

    /// Get a batch's line items in submission order
    pub fn get_line_items(&self, batch_id: Uuid) -> Result<Vec<LineItem>> {
        let cf = self.cf_handle(CF_ITEMS)?;
        let prefix = batch_id.as_bytes();

        let iter = self
            .db
            .iterator_cf(cf, IteratorMode::From(prefix, Direction::Forward));

        let mut items = Vec::new();
        for entry in iter {
            let (key, value) = entry?;
            if key.len() < 16 || &key[..16] != prefix {
                break;
            }
            let item: LineItem = bincode::deserialize(&value)?;
            items.push(item);
        }

        Ok(items)
    }

    /// Atomic compare-and-set on batch status
    ///
    /// Exactly one of N racing callers succeeds; the rest observe
    /// `Error::InvalidTransition` with the status they lost to.
    pub fn transition_batch(
        &self,
        batch_id: Uuid,
        from: BatchStatus,
        to: BatchStatus,
    ) -> Result<Batch> {
        let _guard = self.transition_lock.lock();

        let mut batch = self.get_batch(batch_id)?;
        if batch.status != from {
            return Err(Error::InvalidTransition {
                batch_id,
                expected: from,
                actual: batch.status,
            });
        }

        batch.status = to;
        batch.updated_at = Utc::now();

        let cf_batches = self.cf_handle(CF_BATCHES)?;
        let cf_indices = self.cf_handle(CF_INDICES)?;

        let mut wb = WriteBatch::default();
        wb.put_cf(cf_batches, batch.id.as_bytes(), bincode::serialize(&batch)?);
        wb.delete_cf(cf_indices, Self::index_key(from, &batch_id));
        wb.put_cf(cf_indices, Self::index_key(to, &batch_id), b"");

        self.db.write(wb)?;

        tracing::info!(batch_id = %batch_id, from = %from, to = %to, "Batch transitioned");

        Ok(batch)
    }

    /// Commit settlement results (atomic)
    ///
    /// One write covering every terminal line item, the settlement record,
    /// and the `Processing -> Processed` flip. A concurrent reader either
    /// sees the batch fully settled or not settled at all.
    pub fn finalize_settlement(
        &self,
        batch_id: Uuid,
        items: &[LineItem],
        record: &SettlementRecord,
    ) -> Result<Batch> {
        let _guard = self.transition_lock.lock();

        let mut batch = self.get_batch(batch_id)?;
        if batch.status != BatchStatus::Processing {
            return Err(Error::InvalidTransition {
                batch_id,
                expected: BatchStatus::Processing,
                actual: batch.status,
            });
        }

        batch.status = BatchStatus::Processed;
        batch.updated_at = Utc::now();

        let cf_batches = self.cf_handle(CF_BATCHES)?;
        let cf_items = self.cf_handle(CF_ITEMS)?;
        let cf_records = self.cf_handle(CF_RECORDS)?;
        let cf_indices = self.cf_handle(CF_INDICES)?;

        let mut wb = WriteBatch::default();
        wb.put_cf(cf_batches, batch.id.as_bytes(), bincode::serialize(&batch)?);
        for item in items {
            wb.put_cf(
                cf_items,
                Self::item_key(&batch_id, item.seq),
                bincode::serialize(item)?,
            );
        }
        wb.put_cf(cf_records, batch_id.as_bytes(), bincode::serialize(record)?);
        wb.delete_cf(cf_indices, Self::index_key(BatchStatus::Processing, &batch_id));
        wb.put_cf(
            cf_indices,
            Self::index_key(BatchStatus::Processed, &batch_id),
            b"",
        );

        self.db.write(wb)?;

        tracing::info!(
            batch_id = %batch_id,
            line_count = batch.line_count,
            "Settlement finalized"
        );

        Ok(batch)
    }

    // Settlement record operations

    /// Get the archival record of a processed batch
    pub fn get_settlement_record(&self, batch_id: Uuid) -> Result<SettlementRecord> {
        let cf = self.cf_handle(CF_RECORDS)?;

        let value = self
            .db
            .get_cf(cf, batch_id.as_bytes())?
            .ok_or(Error::RecordNotFound(batch_id))?;

        let record: SettlementRecord = bincode::deserialize(&value)?;
        Ok(record)
    }

    /// All settlement records, newest first
    pub fn list_settlement_records(&self) -> Result<Vec<SettlementRecord>> {
        let cf = self.cf_handle(CF_RECORDS)?;

        let mut records = Vec::new();
        for entry in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_, value) = entry?;
            records.push(bincode::deserialize::<SettlementRecord>(&value)?);
        }
        records.sort_by(|a, b| b.processed_at.cmp(&a.processed_at));

        Ok(records)
    }

    // Activity log operations

    /// Append an activity event
    pub fn append_activity(&self, event: &ActivityEvent) -> Result<()> {
        let cf = self.cf_handle(CF_ACTIVITY)?;
        self.db
            .put_cf(cf, Self::activity_key(event), bincode::serialize(event)?)?;
        Ok(())
    }

    /// All activity events, newest first
    pub fn list_activity(&self) -> Result<Vec<ActivityEvent>> {
        let cf = self.cf_handle(CF_ACTIVITY)?;

        let mut events = Vec::new();
        for entry in self.db.iterator_cf(cf, IteratorMode::End) {
            let (_, value) = entry?;
            events.push(bincode::deserialize::<ActivityEvent>(&value)?);
        }

        Ok(events)
    }

    // Query surface

    /// Batches currently in the given status, via the status index
    pub fn list_batches_by_status(&self, status: BatchStatus) -> Result<Vec<Batch>> {
        let cf = self.cf_handle(CF_INDICES)?;
        let prefix = [status as u8];

        let iter = self
            .db
            .iterator_cf(cf, IteratorMode::From(&prefix, Direction::Forward));

        let mut batches = Vec::new();
        for entry in iter {
            let (key, _) = entry?;
            if key.is_empty() || key[0] != status as u8 {
                break;
            }
            if key.len() >= 17 {
                let id_bytes: [u8; 16] = key[1..17].try_into().unwrap();
                batches.push(self.get_batch(Uuid::from_bytes(id_bytes))?);
            }
        }

        Ok(batches)
    }

    /// Batches submitted by one organization, newest first
    pub fn list_batches_for_submitter(&self, submitter_id: &ActorId) -> Result<Vec<Batch>> {
        let cf = self.cf_handle(CF_BATCHES)?;

        let mut batches = Vec::new();
        for entry in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_, value) = entry?;
            let batch: Batch = bincode::deserialize(&value)?;
            if &batch.submitter_id == submitter_id {
                batches.push(batch);
            }
        }
        batches.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(batches)
    }

    /// Total number of batch rows
    pub fn batch_count(&self) -> Result<u64> {
        let cf = self.cf_handle(CF_BATCHES)?;
        let mut count = 0u64;
        for entry in self.db.iterator_cf(cf, IteratorMode::Start) {
            entry?;
            count += 1;
        }
        Ok(count)
    }

    /// Aggregate summary over the whole store
    pub fn stats(&self) -> Result<StoreStats> {
        let cf_items = self.cf_handle(CF_ITEMS)?;
        let cf_batches = self.cf_handle(CF_BATCHES)?;

        let mut total_paid_amount = Decimal::ZERO;
        let mut paid_item_count = 0u64;
        for entry in self.db.iterator_cf(cf_items, IteratorMode::Start) {
            let (_, value) = entry?;
            let item: LineItem = bincode::deserialize(&value)?;
            if item.status == ItemStatus::Paid {
                total_paid_amount += item.amount;
                paid_item_count += 1;
            }
        }

        let mut pending_batch_count = 0u64;
        for entry in self.db.iterator_cf(cf_batches, IteratorMode::Start) {
            let (_, value) = entry?;
            let batch: Batch = bincode::deserialize(&value)?;
            if batch.status == BatchStatus::PendingApproval {
                pending_batch_count += 1;
            }
        }

        Ok(StoreStats {
            total_paid_amount,
            paid_item_count,
            pending_batch_count,
        })
    }

    /// Per-submitter totals and success rate
    pub fn submitter_summary(&self, submitter_id: &ActorId) -> Result<SubmitterSummary> {
        let owned: HashSet<Uuid> = self
            .list_batches_for_submitter(submitter_id)?
            .into_iter()
            .map(|b| b.id)
            .collect();

        let cf_items = self.cf_handle(CF_ITEMS)?;
        let mut summary = SubmitterSummary {
            submitter_id: submitter_id.clone(),
            submitted_amount: Decimal::ZERO,
            paid_amount: Decimal::ZERO,
            item_count: 0,
            paid_item_count: 0,
        };

        for entry in self.db.iterator_cf(cf_items, IteratorMode::Start) {
            let (_, value) = entry?;
            let item: LineItem = bincode::deserialize(&value)?;
            if !owned.contains(&item.batch_id) {
                continue;
            }
            summary.submitted_amount += item.amount;
            summary.item_count += 1;
            if item.status == ItemStatus::Paid {
                summary.paid_amount += item.amount;
                summary.paid_item_count += 1;
            }
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Actor, ActorRole, FailureReason};
    use tempfile::TempDir;

    fn test_storage() -> (Storage, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.data_dir = temp_dir.path().to_path_buf();
        (Storage::open(&config).unwrap(), temp_dir)
    }

    fn test_batch(amounts: &[i64]) -> (Batch, Vec<LineItem>) {
        let batch_id = Uuid::new_v4();
        let now = Utc::now();
        let items: Vec<LineItem> = amounts
            .iter()
            .enumerate()
            .map(|(seq, cents)| LineItem {
                id: Uuid::now_v7(),
                batch_id,
                seq: seq as u32,
                payee_name: format!("Payee {}", seq),
                payee_bank: "CRDB".to_string(),
                payee_account: format!("0152{:06}", seq),
                amount: Decimal::new(*cents, 2),
                status: ItemStatus::Pending,
            })
            .collect();
        let batch = Batch {
            id: batch_id,
            submitter_id: ActorId::new("coop-1"),
            submitter_label: "Northern Cooperative".to_string(),
            source_label: "payroll.csv".to_string(),
            line_count: items.len() as u32,
            total_amount: items.iter().map(|i| i.amount).sum(),
            created_at: now,
            updated_at: now,
            status: BatchStatus::PendingApproval,
            submitter_note: None,
            reviewer_note: None,
        };
        (batch, items)
    }

    #[test]
    fn test_put_and_get_batch() {
        let (storage, _temp) = test_storage();
        let (batch, items) = test_batch(&[100000, 250000]);

        storage.put_batch_atomic(&batch, &items).unwrap();

        let retrieved = storage.get_batch(batch.id).unwrap();
        assert_eq!(retrieved.id, batch.id);
        assert_eq!(retrieved.status, BatchStatus::PendingApproval);
        assert_eq!(retrieved.total_amount, Decimal::new(350000, 2));
        assert_eq!(retrieved.line_count, 2);
    }

    #[test]
    fn test_get_batch_not_found() {
        let (storage, _temp) = test_storage();
        let missing = Uuid::new_v4();
        assert!(matches!(
            storage.get_batch(missing),
            Err(Error::BatchNotFound(id)) if id == missing
        ));
    }

    #[test]
    fn test_line_items_in_submission_order() {
        let (storage, _temp) = test_storage();
        let (batch, items) = test_batch(&[100, 200, 300, 400, 500]);

        storage.put_batch_atomic(&batch, &items).unwrap();

        let retrieved = storage.get_line_items(batch.id).unwrap();
        assert_eq!(retrieved.len(), 5);
        let seqs: Vec<u32> = retrieved.iter().map(|i| i.seq).collect();
        assert_eq!(seqs, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_items_scoped_to_batch() {
        let (storage, _temp) = test_storage();
        let (batch_a, items_a) = test_batch(&[100, 200]);
        let (batch_b, items_b) = test_batch(&[300, 400, 500]);

        storage.put_batch_atomic(&batch_a, &items_a).unwrap();
        storage.put_batch_atomic(&batch_b, &items_b).unwrap();

        assert_eq!(storage.get_line_items(batch_a.id).unwrap().len(), 2);
        assert_eq!(storage.get_line_items(batch_b.id).unwrap().len(), 3);
    }

    #[test]
    fn test_transition_cas() {
        let (storage, _temp) = test_storage();
        let (batch, items) = test_batch(&[1000]);
        storage.put_batch_atomic(&batch, &items).unwrap();

        let updated = storage
            .transition_batch(
                batch.id,
                BatchStatus::PendingApproval,
                BatchStatus::Processing,
            )
            .unwrap();
        assert_eq!(updated.status, BatchStatus::Processing);
        assert!(updated.updated_at >= batch.updated_at);

        // Second CAS from the same expected state loses
        let err = storage
            .transition_batch(
                batch.id,
                BatchStatus::PendingApproval,
                BatchStatus::Processing,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidTransition {
                actual: BatchStatus::Processing,
                ..
            }
        ));
    }

    #[test]
    fn test_transition_moves_status_index() {
        let (storage, _temp) = test_storage();
        let (batch, items) = test_batch(&[1000]);
        storage.put_batch_atomic(&batch, &items).unwrap();

        assert_eq!(
            storage
                .list_batches_by_status(BatchStatus::PendingApproval)
                .unwrap()
                .len(),
            1
        );

        storage
            .transition_batch(
                batch.id,
                BatchStatus::PendingApproval,
                BatchStatus::Processing,
            )
            .unwrap();

        assert!(storage
            .list_batches_by_status(BatchStatus::PendingApproval)
            .unwrap()
            .is_empty());
        assert_eq!(
            storage
                .list_batches_by_status(BatchStatus::Processing)
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn test_finalize_settlement_atomic() {
        let (storage, _temp) = test_storage();
        let (batch, mut items) = test_batch(&[100000, 250000, 75000]);
        storage.put_batch_atomic(&batch, &items).unwrap();
        storage
            .transition_batch(
                batch.id,
                BatchStatus::PendingApproval,
                BatchStatus::Processing,
            )
            .unwrap();

        items[0].status = ItemStatus::Paid;
        items[1].status = ItemStatus::Failed(FailureReason::BankError);
        items[2].status = ItemStatus::Paid;
        let record = SettlementRecord {
            batch_id: batch.id,
            submitter_label: batch.submitter_label.clone(),
            source_label: batch.source_label.clone(),
            line_count: batch.line_count,
            total_amount: batch.total_amount,
            processed_at: Utc::now(),
        };

        let finalized = storage
            .finalize_settlement(batch.id, &items, &record)
            .unwrap();
        assert_eq!(finalized.status, BatchStatus::Processed);

        let stored = storage.get_line_items(batch.id).unwrap();
        assert_eq!(stored[0].status, ItemStatus::Paid);
        assert_eq!(
            stored[1].status,
            ItemStatus::Failed(FailureReason::BankError)
        );

        let stored_record = storage.get_settlement_record(batch.id).unwrap();
        assert_eq!(stored_record.total_amount, batch.total_amount);

        // Cannot finalize twice
        assert!(storage
            .finalize_settlement(batch.id, &items, &record)
            .is_err());
    }

    #[test]
    fn test_activity_log_newest_first() {
        let (storage, _temp) = test_storage();
        let actor = Actor::new("coop-1", "Northern Cooperative", ActorRole::Submitter);

        for i in 0..3 {
            let mut event = ActivityEvent::new(
                &actor,
                crate::types::ActivityAction::Submission,
                format!("submission {}", i),
            );
            // Force distinct, increasing timestamps
            event.timestamp = Utc::now() + chrono::Duration::milliseconds(i);
            storage.append_activity(&event).unwrap();
        }

        let events = storage.list_activity().unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].details, "submission 2");
        assert_eq!(events[2].details, "submission 0");
    }

    #[test]
    fn test_stats_and_submitter_summary() {
        let (storage, _temp) = test_storage();
        let (batch, mut items) = test_batch(&[100000, 250000]);
        storage.put_batch_atomic(&batch, &items).unwrap();
        storage
            .transition_batch(
                batch.id,
                BatchStatus::PendingApproval,
                BatchStatus::Processing,
            )
            .unwrap();

        items[0].status = ItemStatus::Paid;
        items[1].status = ItemStatus::Failed(FailureReason::InvalidAccount);
        let record = SettlementRecord {
            batch_id: batch.id,
            submitter_label: batch.submitter_label.clone(),
            source_label: batch.source_label.clone(),
            line_count: batch.line_count,
            total_amount: batch.total_amount,
            processed_at: Utc::now(),
        };
        storage
            .finalize_settlement(batch.id, &items, &record)
            .unwrap();

        let stats = storage.stats().unwrap();
        assert_eq!(stats.paid_item_count, 1);
        assert_eq!(stats.total_paid_amount, Decimal::new(100000, 2));
        assert_eq!(stats.pending_batch_count, 0);

        let summary = storage.submitter_summary(&ActorId::new("coop-1")).unwrap();
        assert_eq!(summary.item_count, 2);
        assert_eq!(summary.paid_item_count, 1);
        assert_eq!(summary.submitted_amount, Decimal::new(350000, 2));
        assert_eq!(summary.paid_amount, Decimal::new(100000, 2));
        assert_eq!(summary.success_rate(), 0.5);
    }

    #[test]
    fn test_settlement_records_newest_first() {
        let (storage, _temp) = test_storage();

        for i in 0..3 {
            let (batch, items) = test_batch(&[1000]);
            storage.put_batch_atomic(&batch, &items).unwrap();
            storage
                .transition_batch(
                    batch.id,
                    BatchStatus::PendingApproval,
                    BatchStatus::Processing,
                )
                .unwrap();
            let record = SettlementRecord {
                batch_id: batch.id,
                submitter_label: batch.submitter_label.clone(),
                source_label: format!("file-{}.csv", i),
                line_count: batch.line_count,
                total_amount: batch.total_amount,
                processed_at: Utc::now() + chrono::Duration::milliseconds(i),
            };
            storage
                .finalize_settlement(batch.id, &items, &record)
                .unwrap();
        }

        let records = storage.list_settlement_records().unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].source_label, "file-2.csv");
    }
}

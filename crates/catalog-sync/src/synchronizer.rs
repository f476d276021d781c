//! The per-content-type reconciliation loop.
//!
//! For every content type the cache lists ids for, the synchronizer brackets
//! the load with index settings (rebuild on full runs, refresh off, refresh
//! back on), streams candidate records through the transformer into bounded
//! bulk batches, and finally saves the indexed-id set.

use std::collections::HashSet;

use catalog_core::config::SyncSettings;
use catalog_core::mapping::IndexMapping;
use catalog_core::traits::{ContentCatalogSource, SearchIndex};
use catalog_core::types::{ContentType, Document, FailurePolicy, IndexedIdSet, SourceIdSet};
use catalog_core::{Error, Result};

use crate::batch::BatchBuffer;
use crate::observer::SyncObserver;
use crate::report::{ContentOutcome, ContentReport, SyncReport};
use crate::settings::IndexSettingsController;
use crate::transform::DocumentTransformer;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SyncMode {
    /// Submit only ids missing from the indexed-id set.
    #[default]
    Incremental,
    /// Recreate each index and submit every id.
    Full,
}

#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub mode: SyncMode,
    /// Only this content type (case-insensitive).
    pub content_filter: Option<String>,
    /// Only this id within each visited content type.
    pub id_filter: Option<u64>,
    pub max_bulk_documents: usize,
    pub document_type: String,
    pub refresh_interval: String,
    pub failure_policy: FailurePolicy,
    /// Submit documents one at a time instead of in bulk.
    pub single_document: bool,
}

impl SyncOptions {
    pub fn from_settings(settings: &SyncSettings) -> Self {
        Self {
            mode: SyncMode::Incremental,
            content_filter: None,
            id_filter: None,
            max_bulk_documents: settings.max_bulk_documents,
            document_type: settings.document_type.clone(),
            refresh_interval: settings.refresh_interval.clone(),
            failure_policy: settings.failure_policy,
            single_document: false,
        }
    }
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self::from_settings(&SyncSettings::default())
    }
}

pub struct IndexSynchronizer<S, I> {
    source: S,
    index: I,
    mapping: IndexMapping,
    options: SyncOptions,
    transformer: DocumentTransformer,
}

impl<S: ContentCatalogSource, I: SearchIndex> IndexSynchronizer<S, I> {
    pub fn new(source: S, index: I, mapping: IndexMapping, options: SyncOptions) -> Self {
        let transformer = DocumentTransformer::new(&source.list_content_types());
        Self { source, index, mapping, options, transformer }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn index(&self) -> &I {
        &self.index
    }

    /// Synchronize every selected content type, in catalog order.
    ///
    /// Under `FailurePolicy::FailFast` the first error ends the run. Under
    /// `Continue` the failing content type is reported as aborted and the
    /// next one starts.
    pub fn run(&self, observer: &dyn SyncObserver) -> Result<SyncReport> {
        let mut sync_report = SyncReport::default();
        for ct in self.selected_content_types()? {
            let mut report = ContentReport::new(ct.clone());
            if let Err(e) = self.sync_content(&ct, &mut report, observer) {
                if self.options.failure_policy == FailurePolicy::FailFast {
                    return Err(e);
                }
                tracing::error!(content = %ct, error = %e, "content type aborted");
                report.outcome = ContentOutcome::Aborted { error: e.to_string() };
            }
            observer.content_finished(&report);
            sync_report.contents.push(report);
        }
        Ok(sync_report)
    }

    fn selected_content_types(&self) -> Result<Vec<ContentType>> {
        let all = self.source.list_content_types();
        let Some(filter) = &self.options.content_filter else { return Ok(all) };
        let selected: Vec<ContentType> = all.into_iter().filter(|ct| ct.as_str().eq_ignore_ascii_case(filter)).collect();
        if selected.is_empty() {
            return Err(Error::NotFound(format!("content type '{}'", filter)));
        }
        Ok(selected)
    }

    fn sync_content(&self, ct: &ContentType, report: &mut ContentReport, observer: &dyn SyncObserver) -> Result<()> {
        let name = ct.index_name();
        let source_ids = self.source.source_ids(ct)?;
        report.candidates = source_ids.len();
        if source_ids.is_empty() {
            tracing::warn!(content = %ct, "no ids in cache, skipping");
            report.outcome = ContentOutcome::Skipped;
            return Ok(());
        }
        let indexed = self.source.indexed_ids(ct)?;
        tracing::info!(content = %ct, ids = source_ids.len(), indexed = indexed.len(), mode = ?self.options.mode, "processing");

        let controller = IndexSettingsController::new(&self.index, &self.mapping, self.options.refresh_interval.as_str());
        if self.options.mode == SyncMode::Full {
            controller.rebuild_index(&name)?;
        }
        controller.prepare_for_bulk_load(&name)?;

        observer.content_started(ct, source_ids.len());
        if let Err(e) = self.stream(ct, &name, &source_ids, &indexed, report, observer) {
            if self.options.failure_policy == FailurePolicy::Continue {
                if let Err(restore) = controller.restore_after_bulk_load(&name) {
                    tracing::warn!(index = %name, error = %restore, "could not restore refresh after failure");
                }
            }
            return Err(e);
        }
        controller.restore_after_bulk_load(&name)?;

        // A rebuilt index holds exactly what this run submitted.
        let persisted = match self.options.mode {
            SyncMode::Full => report.submitted.clone(),
            SyncMode::Incremental => indexed.union(&report.submitted).copied().collect(),
        };
        self.source.save_indexed_ids(ct, &persisted)?;
        report.outcome = ContentOutcome::Persisted;

        tracing::info!(
            content = %ct,
            submitted = report.submitted.len(),
            already_indexed = report.already_indexed,
            missing = report.missing,
            rejected = report.rejected,
            failed = report.failed.len(),
            bulk_calls = report.bulk_calls,
            "finished"
        );
        Ok(())
    }

    fn stream(
        &self,
        ct: &ContentType,
        name: &str,
        source_ids: &SourceIdSet,
        indexed: &IndexedIdSet,
        report: &mut ContentReport,
        observer: &dyn SyncObserver,
    ) -> Result<()> {
        let mut batch = BatchBuffer::new(self.options.max_bulk_documents);
        for id in source_ids.iter() {
            let full = self.visit(ct, name, id, indexed, &mut batch, report)?;
            observer.advanced(ct);
            if full {
                self.flush(&mut batch, name, report)?;
            }
        }
        if !batch.is_empty() {
            self.flush(&mut batch, name, report)?;
        }
        Ok(())
    }

    /// Handle one candidate id. Returns `true` when the batch is full.
    fn visit(
        &self,
        ct: &ContentType,
        name: &str,
        id: u64,
        indexed: &IndexedIdSet,
        batch: &mut BatchBuffer,
        report: &mut ContentReport,
    ) -> Result<bool> {
        if self.options.id_filter.is_some_and(|only| only != id) {
            report.filtered += 1;
            return Ok(false);
        }
        if self.options.mode == SyncMode::Incremental && indexed.contains(&id) {
            report.already_indexed += 1;
            return Ok(false);
        }
        let Some(record) = self.source.record(ct, id)? else {
            tracing::debug!(content = %ct, id, "record missing from cache");
            report.missing += 1;
            return Ok(false);
        };
        let Some(doc) = self.transformer.transform(ct, &record) else {
            tracing::debug!(content = %ct, id, "no primary name, not indexed");
            report.rejected += 1;
            return Ok(false);
        };
        if self.options.single_document {
            self.submit_single(name, id, &doc, report)?;
            return Ok(false);
        }
        Ok(batch.add(id, doc))
    }

    fn flush(&self, batch: &mut BatchBuffer, name: &str, report: &mut ContentReport) -> Result<()> {
        let flushed = batch.flush(&self.index, name, &self.options.document_type)?;
        report.bulk_calls += 1;

        let failed: Vec<(u64, String)> = flushed
            .response
            .failed()
            .map(|item| (item.id, item.error.clone().unwrap_or_else(|| format!("status {}", item.status))))
            .collect();
        let failed_ids: HashSet<u64> = failed.iter().map(|(id, _)| *id).collect();
        report.submitted.extend(flushed.docs.keys().copied().filter(|id| !failed_ids.contains(id)));

        for (id, reason) in failed {
            let Some(doc) = flushed.docs.get(&id) else { continue };
            tracing::warn!(index = name, id, %reason, "bulk item rejected, retrying alone");
            self.submit_single(name, id, doc, report)?;
        }
        Ok(())
    }

    fn submit_single(&self, name: &str, id: u64, doc: &Document, report: &mut ContentReport) -> Result<()> {
        match self.index.add_document(name, &self.options.document_type, id, doc) {
            Ok(()) => {
                report.submitted.insert(id);
                Ok(())
            }
            Err(Error::Rejected { reason, .. }) => {
                tracing::warn!(index = name, id, %reason, "document rejected");
                report.failed.push((id, reason));
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

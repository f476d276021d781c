use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use tantivy::collector::TopDocs;
use tantivy::query::TermQuery;
use tantivy::schema::{Field, IndexRecordOption};
use tantivy::{Document as _, Index, IndexWriter, TantivyDocument, Term};

use catalog_core::constants::DEFAULT_REFRESH_INTERVAL;
use catalog_core::mapping::IndexMapping;
use catalog_core::traits::SearchIndex;
use catalog_core::types::{BulkItem, BulkResponse, Document, RefreshInterval, SettingsPatch, ValueKind};
use catalog_core::{Error, Result};

use crate::tantivy_utils::{build_schema, register_tokenizer, BODY_FIELD, ID_FIELD, NAME_LOCALE_FIELD};

const META_FILE: &str = "catalog_meta.json";
const WRITER_HEAP_BYTES: usize = 50_000_000;

/// Sidecar state Tantivy has no notion of: the creation body, the refresh
/// setting and the first-seen kind of every top-level field.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexMeta {
	mapping: serde_json::Value,
	refresh_interval: String,
	field_kinds: BTreeMap<String, ValueKind>,
}

struct OpenIndex {
	index: Index,
	writer: IndexWriter,
	id_field: Field,
	dir: PathBuf,
	meta: IndexMeta,
	pending: usize,
}

impl OpenIndex {
	fn refresh_enabled(&self) -> bool {
		RefreshInterval::parse(&self.meta.refresh_interval) != RefreshInterval::Disabled
	}

	fn save_meta(&self) -> Result<()> {
		fs::write(self.dir.join(META_FILE), serde_json::to_vec_pretty(&self.meta)?)?;
		Ok(())
	}

	fn commit(&mut self) -> Result<()> {
		self.writer.commit().map_err(index_err)?;
		tracing::debug!(dir = %self.dir.display(), docs = self.pending, "committed");
		self.pending = 0;
		Ok(())
	}

	/// Reject documents whose fields change kind relative to earlier
	/// documents, like a strict dynamic mapping would. Null matches anything.
	fn check_kinds(&self, doc: &Document) -> std::result::Result<(), String> {
		for (field, value) in doc.fields() {
			let kind = value.kind();
			if kind == ValueKind::Null {
				continue;
			}
			if let Some(known) = self.meta.field_kinds.get(field) {
				if *known != kind {
					return Err(format!("mapper_parsing_exception: field '{}' is {:?}, got {:?}", field, known, kind));
				}
			}
		}
		Ok(())
	}

	fn record_kinds(&mut self, doc: &Document) {
		for (field, value) in doc.fields() {
			if value.kind() != ValueKind::Null {
				self.meta.field_kinds.entry(field.clone()).or_insert(value.kind());
			}
		}
	}

	fn upsert(&mut self, id: u64, doc: &Document) -> Result<()> {
		let schema = self.index.schema();
		let json = serde_json::json!({
			ID_FIELD: id.to_string(),
			NAME_LOCALE_FIELD: doc.text("NameLocale"),
			BODY_FIELD: doc.to_json()?,
		});
		let tantivy_doc = TantivyDocument::parse_json(&schema, &json.to_string()).map_err(index_err)?;
		self.writer.delete_term(Term::from_field_text(self.id_field, &id.to_string()));
		self.writer.add_document(tantivy_doc).map_err(index_err)?;
		self.record_kinds(doc);
		self.pending += 1;
		Ok(())
	}
}

fn index_err(e: impl Display) -> Error {
	Error::Index(e.to_string())
}

/// Tantivy-backed `SearchIndex`. Each index name is a directory under `root`.
///
/// With refresh disabled, writes stay uncommitted (invisible to readers) until
/// refresh is restored; otherwise every bulk call commits.
pub struct TantivySearchIndex {
	root: PathBuf,
	open: Mutex<HashMap<String, OpenIndex>>,
}

impl TantivySearchIndex {
	pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
		let root = root.into();
		fs::create_dir_all(&root)?;
		Ok(Self { root, open: Mutex::new(HashMap::new()) })
	}

	pub fn exists(&self, name: &str) -> bool {
		self.root.join(name).join(META_FILE).exists()
	}

	/// Number of committed, visible documents.
	pub fn doc_count(&self, name: &str) -> Result<u64> {
		let mut open = self.lock()?;
		let handle = self.handle(&mut open, name)?;
		let reader = handle.index.reader().map_err(index_err)?;
		Ok(reader.searcher().num_docs())
	}

	/// The committed document stored under `id`, as JSON.
	pub fn get_document(&self, name: &str, id: u64) -> Result<Option<serde_json::Value>> {
		let mut open = self.lock()?;
		let handle = self.handle(&mut open, name)?;
		let reader = handle.index.reader().map_err(index_err)?;
		let searcher = reader.searcher();
		let query = TermQuery::new(Term::from_field_text(handle.id_field, &id.to_string()), IndexRecordOption::Basic);
		let top = searcher.search(&query, &TopDocs::with_limit(1)).map_err(index_err)?;
		let Some((_, address)) = top.into_iter().next() else { return Ok(None) };
		let doc: TantivyDocument = searcher.doc(address).map_err(index_err)?;
		let stored: serde_json::Value = serde_json::from_str(&doc.to_json(&handle.index.schema()))?;
		Ok(stored.get(BODY_FIELD).and_then(|values| values.get(0)).cloned())
	}

	/// The body the index was created with.
	pub fn mapping(&self, name: &str) -> Result<serde_json::Value> {
		let mut open = self.lock()?;
		Ok(self.handle(&mut open, name)?.meta.mapping.clone())
	}

	/// Current refresh interval setting.
	pub fn refresh_interval(&self, name: &str) -> Result<String> {
		let mut open = self.lock()?;
		Ok(self.handle(&mut open, name)?.meta.refresh_interval.clone())
	}

	fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, OpenIndex>>> {
		self.open.lock().map_err(|_| Error::Index("index registry lock poisoned".into()))
	}

	fn handle<'a>(&self, open: &'a mut HashMap<String, OpenIndex>, name: &str) -> Result<&'a mut OpenIndex> {
		if !open.contains_key(name) {
			let opened = self.open_existing(name)?;
			open.insert(name.to_string(), opened);
		}
		open.get_mut(name).ok_or_else(|| Error::NotFound(format!("index '{}'", name)))
	}

	fn open_existing(&self, name: &str) -> Result<OpenIndex> {
		let dir = self.root.join(name);
		if !dir.join(META_FILE).exists() {
			return Err(Error::NotFound(format!("index '{}' does not exist; run a full rebuild first", name)));
		}
		let meta: IndexMeta = serde_json::from_str(&fs::read_to_string(dir.join(META_FILE))?)?;
		let index = Index::open_in_dir(&dir).map_err(index_err)?;
		Self::attach(index, dir, meta)
	}

	fn attach(index: Index, dir: PathBuf, meta: IndexMeta) -> Result<OpenIndex> {
		register_tokenizer(&index);
		let id_field = index.schema().get_field(ID_FIELD).map_err(index_err)?;
		let writer: IndexWriter = index.writer(WRITER_HEAP_BYTES).map_err(index_err)?;
		Ok(OpenIndex { index, writer, id_field, dir, meta, pending: 0 })
	}
}

impl SearchIndex for TantivySearchIndex {
	fn delete_index(&self, name: &str) -> Result<()> {
		let mut open = self.lock()?;
		// The writer holds the directory lock; drop it before removing files.
		drop(open.remove(name));
		let dir = self.root.join(name);
		if dir.exists() {
			fs::remove_dir_all(&dir)?;
			tracing::info!(index = name, "deleted index");
		}
		Ok(())
	}

	fn create_index(&self, name: &str, mapping: &IndexMapping) -> Result<()> {
		let mut open = self.lock()?;
		let dir = self.root.join(name);
		if open.contains_key(name) || dir.join(META_FILE).exists() {
			return Err(Error::Index(format!("resource_already_exists_exception: index '{}' already exists", name)));
		}
		fs::create_dir_all(&dir)?;
		let index = Index::create_in_dir(&dir, build_schema()).map_err(index_err)?;
		let meta = IndexMeta {
			mapping: mapping.body().clone(),
			refresh_interval: DEFAULT_REFRESH_INTERVAL.to_string(),
			field_kinds: BTreeMap::new(),
		};
		let handle = Self::attach(index, dir, meta)?;
		handle.save_meta()?;
		open.insert(name.to_string(), handle);
		tracing::info!(index = name, "created index");
		Ok(())
	}

	fn put_settings(&self, name: &str, patch: &SettingsPatch) -> Result<()> {
		let mut open = self.lock()?;
		let handle = self.handle(&mut open, name)?;
		handle.meta.refresh_interval = patch.refresh_interval.as_setting().to_string();
		if handle.refresh_enabled() && handle.pending > 0 {
			handle.commit()?;
		}
		handle.save_meta()
	}

	fn bulk_index(&self, name: &str, _doc_type: &str, docs: &BTreeMap<u64, Document>) -> Result<BulkResponse> {
		let mut open = self.lock()?;
		let handle = self.handle(&mut open, name).map_err(|e| Error::submission(name, e))?;
		let mut items = Vec::with_capacity(docs.len());
		for (id, doc) in docs {
			if let Err(reason) = handle.check_kinds(doc) {
				items.push(BulkItem::rejected(*id, 400, reason));
				continue;
			}
			handle.upsert(*id, doc).map_err(|e| Error::submission(name, e))?;
			items.push(BulkItem { id: *id, status: 201, error: None });
		}
		if handle.refresh_enabled() {
			handle.commit().map_err(|e| Error::submission(name, e))?;
		}
		handle.save_meta()?;
		Ok(BulkResponse { items })
	}

	fn add_document(&self, name: &str, _doc_type: &str, id: u64, doc: &Document) -> Result<()> {
		let mut open = self.lock()?;
		let handle = self.handle(&mut open, name).map_err(|e| Error::submission(name, e))?;
		if let Err(reason) = handle.check_kinds(doc) {
			return Err(Error::rejected(name, id, reason));
		}
		handle.upsert(id, doc).map_err(|e| Error::submission(name, e))?;
		if handle.refresh_enabled() {
			handle.commit().map_err(|e| Error::submission(name, e))?;
		}
		handle.save_meta()
	}
}

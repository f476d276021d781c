use tantivy::schema::{IndexRecordOption, Schema, TextFieldIndexing, TextOptions, STORED, STRING, TEXT};
use tantivy::tokenizer::{AsciiFoldingFilter, LowerCaser, SimpleTokenizer, TextAnalyzer};
use tantivy::Index;

pub const ID_FIELD: &str = "id";
pub const NAME_LOCALE_FIELD: &str = "name_locale";
pub const BODY_FIELD: &str = "body";

const CATALOG_TOKENIZER: &str = "catalog_text";

/// Every catalog index shares one schema: the document id, the combined
/// multi-language name for full-text lookups, and the whole document as JSON.
pub fn build_schema() -> Schema {
	let mut schema_builder = Schema::builder();
	let _id_field = schema_builder.add_text_field(ID_FIELD, STRING | STORED);
	let name_indexing = TextFieldIndexing::default()
		.set_tokenizer(CATALOG_TOKENIZER)
		.set_index_option(IndexRecordOption::WithFreqsAndPositions);
	let name_options = TextOptions::default().set_indexing_options(name_indexing).set_stored();
	let _name_field = schema_builder.add_text_field(NAME_LOCALE_FIELD, name_options);
	let _body_field = schema_builder.add_json_field(BODY_FIELD, TEXT | STORED);
	schema_builder.build()
}

pub fn register_tokenizer(index: &Index) {
	let tokenizer = TextAnalyzer::builder(SimpleTokenizer::default())
		.filter(LowerCaser)
		.filter(AsciiFoldingFilter)
		.build();
	index.tokenizers().register(CATALOG_TOKENIZER, tokenizer);
}

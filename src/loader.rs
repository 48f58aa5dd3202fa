//! Dataset loading: fetching a payload and turning it into records.
//!
//! Two payload shapes are accepted, both JSON arrays:
//!
//! - **rows**: `[{"name": "...", "article": "...", "price": 1.5}, ...]`
//! - **sheet**: `[["Наименование", "Артикул", "Цена"], ["...", "...", 1.5], ...]`,
//!   where the first row holds the headers.
//!
//! Column names are resolved once, from the first row, against an ordered
//! alias list per field. Everything after that works with canonical fields
//! only. Validation is all-or-nothing: a payload either loads completely or
//! produces a [`LoadError`].

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Number, Value};
use tracing::{debug, info};

use crate::error::LoadError;
use crate::options::SearchOptions;
use crate::record::{Dataset, Document, Record};

/// Relative path the dataset is read from when none is given.
pub const DEFAULT_DATASET_PATH: &str = "base.search.json";

/// Accepted column names for the product name, in lookup order.
pub const NAME_ALIASES: &[&str] = &["name", "Наименование"];
/// Accepted column names for the article code, in lookup order.
pub const ARTICLE_ALIASES: &[&str] = &["article", "Артикул"];
/// Accepted column names for the price, in lookup order.
pub const PRICE_ALIASES: &[&str] = &["price", "Цена"];
/// Accepted column names for document links, in lookup order.
pub const DOCUMENTS_ALIASES: &[&str] = &["documents", "Документы"];

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)https?://[^\s]+").expect("static URL pattern is valid")
});

/// Where the raw dataset bytes come from.
///
/// Implementations should refuse payloads over `limit` bytes with
/// [`LoadError::PayloadTooLarge`] as early as they can; [`load`] checks
/// the length again after fetching.
pub trait DatasetSource {
    /// Human-readable location, for logs and messages.
    fn describe(&self) -> String;

    /// Return the complete payload.
    fn fetch(&self, limit: u64) -> Result<Vec<u8>, LoadError>;
}

/// Reads the dataset from a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// Source reading from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file this source reads.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileSource {
    fn default() -> Self {
        Self::new(DEFAULT_DATASET_PATH)
    }
}

impl DatasetSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch(&self, limit: u64) -> Result<Vec<u8>, LoadError> {
        let fetch_err = |source| LoadError::Fetch {
            path: self.path.clone(),
            source,
        };
        let size = fs::metadata(&self.path).map_err(fetch_err)?.len();
        if size > limit {
            return Err(LoadError::PayloadTooLarge { size, max: limit });
        }
        fs::read(&self.path).map_err(fetch_err)
    }
}

/// Fetch from `source` and parse the payload.
///
/// # Errors
///
/// Any [`LoadError`]; nothing is partially loaded.
pub fn load<S>(source: &S, options: &SearchOptions) -> Result<Dataset, LoadError>
where
    S: DatasetSource + ?Sized,
{
    let bytes = source.fetch(options.max_payload_bytes)?;
    let size = bytes.len() as u64;
    if size > options.max_payload_bytes {
        return Err(LoadError::PayloadTooLarge {
            size,
            max: options.max_payload_bytes,
        });
    }
    let dataset = parse_dataset(&bytes, options)?;
    info!(rows = dataset.len(), source = %source.describe(), "dataset loaded");
    Ok(dataset)
}

/// Column keys resolved from the first row.
struct Columns<K> {
    name: K,
    article: K,
    price: Option<K>,
    documents: Option<K>,
}

/// Resolve every field through its alias list using `lookup`.
///
/// Name and article are required; price and documents are optional.
fn resolve_columns<K>(lookup: impl Fn(&str) -> Option<K>) -> Result<Columns<K>, LoadError> {
    let pick = |aliases: &[&str]| aliases.iter().find_map(|alias| lookup(alias));
    let name = pick(NAME_ALIASES);
    let article = pick(ARTICLE_ALIASES);
    let price = pick(PRICE_ALIASES);
    let documents = pick(DOCUMENTS_ALIASES);

    match (name, article) {
        (Some(name), Some(article)) => Ok(Columns {
            name,
            article,
            price,
            documents,
        }),
        (name, article) => {
            let mut missing = Vec::new();
            if name.is_none() {
                missing.push(NAME_ALIASES.join("/"));
            }
            if article.is_none() {
                missing.push(ARTICLE_ALIASES.join("/"));
            }
            Err(LoadError::MissingColumns { missing })
        }
    }
}

/// Parse a JSON payload into a dataset.
///
/// # Examples
///
/// ```
/// use pricesearch::SearchOptions;
/// use pricesearch::loader::parse_dataset;
///
/// let json = r#"[{"Наименование": "Болт М6", "Артикул": 1001, "Цена": "12,5"}]"#;
/// let ds = parse_dataset(json.as_bytes(), &SearchOptions::default()).unwrap();
/// assert_eq!(ds[0].article, "1001");
/// assert_eq!(ds[0].price, Some(12.5));
/// ```
pub fn parse_dataset(bytes: &[u8], options: &SearchOptions) -> Result<Dataset, LoadError> {
    let value: Value = serde_json::from_slice(bytes)?;
    let Value::Array(rows) = value else {
        return Err(LoadError::InvalidFormat(
            "expected a JSON array of rows".to_owned(),
        ));
    };

    let records = match rows.first() {
        None => return Err(LoadError::Empty),
        Some(Value::Object(_)) => object_rows(&rows, options)?,
        Some(Value::Array(_)) => sheet_rows(&rows, options)?,
        Some(_) => {
            return Err(LoadError::InvalidFormat(
                "rows must be objects or arrays".to_owned(),
            ));
        }
    };
    Dataset::new(records, options.max_rows)
}

fn check_row_count(count: usize, options: &SearchOptions) -> Result<(), LoadError> {
    if count == 0 {
        return Err(LoadError::Empty);
    }
    if count > options.max_rows {
        return Err(LoadError::TooManyRows {
            count,
            max: options.max_rows,
        });
    }
    Ok(())
}

/// Rows given as objects keyed by column name.
fn object_rows(rows: &[Value], options: &SearchOptions) -> Result<Vec<Record>, LoadError> {
    check_row_count(rows.len(), options)?;
    let first = rows[0].as_object().ok_or(LoadError::Empty)?;
    let cols = resolve_columns(|alias| first.contains_key(alias).then(|| alias.to_owned()))?;
    debug!(
        name = %cols.name,
        article = %cols.article,
        price = ?cols.price,
        documents = ?cols.documents,
        "resolved row columns"
    );

    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            let obj: &Map<String, Value> = row
                .as_object()
                .ok_or_else(|| LoadError::InvalidFormat(format!("row {} is not an object", i + 1)))?;
            let get = |key: &Option<String>| key.as_ref().and_then(|k| obj.get(k));
            Ok(build_record(
                obj.get(&cols.name),
                obj.get(&cols.article),
                get(&cols.price),
                get(&cols.documents),
            ))
        })
        .collect()
}

/// Rows given as arrays, the first one holding the headers.
fn sheet_rows(rows: &[Value], options: &SearchOptions) -> Result<Vec<Record>, LoadError> {
    let headers: Vec<String> = rows[0]
        .as_array()
        .map(|cells| cells.iter().map(|c| cell_text(Some(c)).trim().to_owned()).collect())
        .unwrap_or_default();
    let data = &rows[1..];
    check_row_count(data.len(), options)?;
    let cols = resolve_columns(|alias| headers.iter().position(|h| h == alias))?;
    debug!(headers = headers.len(), "resolved sheet columns");

    data.iter()
        .enumerate()
        .map(|(i, row)| {
            let cells = row.as_array().ok_or_else(|| {
                LoadError::InvalidFormat(format!("sheet row {} is not an array", i + 2))
            })?;
            let get = |idx: &Option<usize>| idx.and_then(|i| cells.get(i));
            Ok(build_record(
                cells.get(cols.name),
                cells.get(cols.article),
                get(&cols.price),
                get(&cols.documents),
            ))
        })
        .collect()
}

fn build_record(
    name: Option<&Value>,
    article: Option<&Value>,
    price: Option<&Value>,
    documents: Option<&Value>,
) -> Record {
    Record::new(
        cell_text(name),
        cell_text(article),
        cell_price(price),
        parse_documents(documents),
    )
}

/// Text of a cell: strings as-is, numbers and booleans rendered, anything
/// else empty.
fn cell_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => number_text(n),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Shortest text for a JSON number: integral floats drop their `.0`.
fn number_text(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        _ => n.to_string(),
    }
}

/// Numeric value of a price cell.
fn cell_price(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_price_text(s),
        _ => None,
    }
}

/// Parse a price written as text, tolerating grouping spaces and a decimal
/// comma.
///
/// # Examples
///
/// ```
/// use pricesearch::loader::parse_price_text;
///
/// assert_eq!(parse_price_text("1 234,50"), Some(1234.5));
/// assert_eq!(parse_price_text("12.3"), Some(12.3));
/// assert_eq!(parse_price_text("n/a"), None);
/// assert_eq!(parse_price_text(""), None);
/// ```
pub fn parse_price_text(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|p| p.is_finite())
}

/// Parse a documents cell.
///
/// Text cells go through [`parse_document_text`]. Array cells may hold
/// `{"title": ..., "url": ...}` objects or text fragments. URLs repeated
/// within one cell are kept once.
pub fn parse_documents(value: Option<&Value>) -> Vec<Document> {
    let mut found: Vec<(Option<String>, String)> = Vec::new();
    match value {
        Some(Value::String(text)) => collect_links(text, &mut found),
        Some(Value::Array(items)) => {
            for item in items {
                match item {
                    Value::String(text) => collect_links(text, &mut found),
                    Value::Object(obj) => {
                        let url = cell_text(obj.get("url"));
                        if URL_RE.is_match(&url) {
                            let title = cell_text(obj.get("title")).trim().to_owned();
                            found.push(((!title.is_empty()).then_some(title), url.trim().to_owned()));
                        }
                    }
                    _ => {}
                }
            }
        }
        _ => {}
    }

    let mut docs: Vec<Document> = Vec::with_capacity(found.len());
    for (title, url) in found {
        if docs.iter().any(|d| d.url == url) {
            continue;
        }
        let title = title.unwrap_or_else(|| format!("Document {}", docs.len() + 1));
        docs.push(Document { title, url });
    }
    docs
}

/// Parse free text holding one or more URLs, each optionally preceded by a
/// title.
///
/// # Examples
///
/// ```
/// use pricesearch::loader::parse_document_text;
///
/// let docs = parse_document_text("Сайт https://a.example/x\nhttps://b.example/manual.pdf");
/// assert_eq!(docs[0].title, "Сайт");
/// assert_eq!(docs[1].title, "Document 2");
/// assert_eq!(docs[1].url, "https://b.example/manual.pdf");
/// ```
pub fn parse_document_text(text: &str) -> Vec<Document> {
    parse_documents(Some(&Value::String(text.to_owned())))
}

/// Append `(title, url)` pairs found in `text` to `out`.
fn collect_links(text: &str, out: &mut Vec<(Option<String>, String)>) {
    let mut last_end = 0;
    for m in URL_RE.find_iter(text) {
        let title = text[last_end..m.start()]
            .trim()
            .trim_end_matches([':', '-', '–', '—', '|'])
            .trim();
        let url = m.as_str().trim_end_matches([',', ';']);
        out.push(((!title.is_empty()).then(|| title.to_owned()), url.to_owned()));
        last_end = m.end();
    }
}

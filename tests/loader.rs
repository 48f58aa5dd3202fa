//! Dataset loading from files and in-memory payloads.

use std::fs;

use pricesearch::loader::{DatasetSource, load, parse_dataset};
use pricesearch::{FileSource, LoadError, SearchOptions};

// ---------------------------------------------------------------------------
// FileSource
// ---------------------------------------------------------------------------

#[test]
fn missing_file_is_a_fetch_error() {
    let dir = tempfile::tempdir().unwrap();
    let source = FileSource::new(dir.path().join("absent.json"));
    let err = load(&source, &SearchOptions::default()).unwrap_err();
    assert!(matches!(err, LoadError::Fetch { .. }));
    assert!(err.to_string().contains("absent.json"));
}

#[test]
fn oversized_file_is_rejected_before_parsing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("big.json");
    // Not valid JSON: the size check must fire first.
    fs::write(&path, "x".repeat(2048)).unwrap();
    let opts = SearchOptions {
        max_payload_bytes: 1024,
        ..Default::default()
    };
    let err = load(&FileSource::new(&path), &opts).unwrap_err();
    assert!(matches!(
        err,
        LoadError::PayloadTooLarge {
            size: 2048,
            max: 1024
        }
    ));
}

// ---------------------------------------------------------------------------
// Custom sources
// ---------------------------------------------------------------------------

struct Memory(&'static str);

impl DatasetSource for Memory {
    fn describe(&self) -> String {
        "memory".to_owned()
    }

    fn fetch(&self, _limit: u64) -> Result<Vec<u8>, LoadError> {
        Ok(self.0.as_bytes().to_vec())
    }
}

#[test]
fn byte_length_is_checked_after_fetch() {
    // A source that ignores the limit is still held to it.
    let opts = SearchOptions {
        max_payload_bytes: 8,
        ..Default::default()
    };
    let err = load(&Memory(r#"[{"name": "a", "article": "b"}]"#), &opts).unwrap_err();
    assert!(matches!(err, LoadError::PayloadTooLarge { max: 8, .. }));
}

#[test]
fn boxed_sources_load() {
    let source: Box<dyn DatasetSource> = Box::new(Memory(r#"[{"name": "Nut", "article": 7}]"#));
    let ds = load(source.as_ref(), &SearchOptions::default()).unwrap();
    assert_eq!(ds[0].article, "7");
}

// ---------------------------------------------------------------------------
// Payload shapes and failures
// ---------------------------------------------------------------------------

fn parse(json: &str) -> Result<pricesearch::Dataset, LoadError> {
    parse_dataset(json.as_bytes(), &SearchOptions::default())
}

#[test]
fn malformed_json_is_a_parse_error() {
    assert!(matches!(parse("[{"), Err(LoadError::Parse(_))));
}

#[test]
fn non_array_payload_is_invalid() {
    assert!(matches!(
        parse(r#"{"name": "Bolt"}"#),
        Err(LoadError::InvalidFormat(_))
    ));
}

#[test]
fn empty_array_is_empty() {
    assert!(matches!(parse("[]"), Err(LoadError::Empty)));
}

#[test]
fn header_only_sheet_is_empty() {
    assert!(matches!(
        parse(r#"[["Наименование", "Артикул"]]"#),
        Err(LoadError::Empty)
    ));
}

#[test]
fn both_missing_columns_are_listed() {
    let err = parse(r#"[{"Цена": 1}]"#).unwrap_err();
    assert_eq!(
        err.to_string(),
        "missing required columns: name/Наименование, article/Артикул"
    );
}

#[test]
fn documents_column_is_parsed() {
    let ds = parse(
        r#"[{"name": "Bolt", "article": "1",
             "Документы": "Сайт https://a.example/x\nhttps://a.example/x\nhttps://b.example/y.pdf"}]"#,
    )
    .unwrap();
    let docs = &ds[0].documents;
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0].title, "Сайт");
    assert_eq!(docs[1].title, "Document 2");
    assert_eq!(docs[1].url, "https://b.example/y.pdf");
}

#[test]
fn price_cells_are_coerced() {
    let ds = parse(
        r#"[{"name": "a", "article": "1", "price": "1 234,5"},
            {"name": "b", "article": "2", "price": null},
            {"name": "c", "article": "3", "price": "call"}]"#,
    )
    .unwrap();
    assert_eq!(ds[0].price, Some(1234.5));
    assert_eq!(ds[0].formatted_price(), "1\u{a0}234,50");
    assert_eq!(ds[1].price, None);
    assert_eq!(ds[2].formatted_price(), "0,00");
}

#[test]
fn precomputed_search_columns_are_ignored() {
    let ds = parse(r#"[{"name": "Bolt", "article": "1", "__name": "zzz"}]"#).unwrap();
    assert_eq!(ds[0].normalized_name(), "bolt");
}

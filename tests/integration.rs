//! End-to-end tests of search and the session through the public API.
//!
//! Every test builds its dataset in memory or in a temporary file and drives
//! it the way a presenter would: set a query, read the view, show more.

use std::time::{Duration, Instant};

use pricesearch::{
    Dataset, FileSource, LoadError, Query, Record, SearchOptions, SearchSession, SearchState,
    search,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn dataset(rows: &[(&str, &str)]) -> Dataset {
    let records = rows
        .iter()
        .map(|(name, article)| Record::new(*name, *article, None, Vec::new()))
        .collect();
    Dataset::new(records, 200_000).unwrap()
}

fn names(ds: &Dataset, raw: &str) -> Vec<String> {
    let query = Query::parse(raw, &SearchOptions::default());
    search(ds, &query)
        .into_iter()
        .map(|r| r.record.name.clone())
        .collect()
}

fn catalog() -> Dataset {
    dataset(&[
        ("Bolt M6x20", "001"),
        ("Washer 6", "002"),
        ("Bolt M6", "003"),
        ("Болт М8", "004"),
        ("Lamp 5V", "A-100"),
        ("Fuse", "15v-2"),
        ("Clamp", "12345"),
        ("Bolt 12345", "900"),
        ("Cable", "12-345"),
    ])
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

#[test]
fn shorter_name_wins_tie() {
    let ds = dataset(&[("Bolt M6x20", "1"), ("Bolt M6", "2")]);
    assert_eq!(names(&ds, "bolt"), ["Bolt M6", "Bolt M6x20"]);
}

#[test]
fn results_are_deterministic() {
    let ds = catalog();
    let first = names(&ds, "bolt");
    for _ in 0..10 {
        assert_eq!(names(&ds, "bolt"), first);
    }
}

#[test]
fn letterless_query_prefers_article_hits() {
    let ds = catalog();
    // Article bonus, then name bonus, then an article match through a
    // stripped delimiter.
    assert_eq!(names(&ds, "12345"), ["Clamp", "Bolt 12345", "Cable"]);
}

#[test]
fn letter_query_ignores_articles() {
    let ds = catalog();
    // "Fuse" has "15v" only in its article.
    assert_eq!(names(&ds, "5v"), ["Lamp 5V"]);
}

#[test]
fn query_delimiters_are_ignored_for_matching() {
    let ds = catalog();
    assert_eq!(names(&ds, "12-345"), names(&ds, "12345"));
}

// ---------------------------------------------------------------------------
// Homoglyphs and transliteration
// ---------------------------------------------------------------------------

#[test]
fn mixed_script_name_matches_latin_query() {
    // Latin "m" in the query, Cyrillic "М" in the name.
    let ds = catalog();
    assert_eq!(names(&ds, "m8"), ["Болт М8"]);
}

#[test]
fn latin_query_finds_cyrillic_name() {
    let ds = catalog();
    let found = names(&ds, "bolt");
    assert!(found.contains(&"Болт М8".to_owned()));
}

#[test]
fn cyrillic_query_finds_latin_name() {
    let ds = catalog();
    let found = names(&ds, "болт");
    assert!(found.contains(&"Bolt M6".to_owned()));
    assert!(found.contains(&"Болт М8".to_owned()));
}

// ---------------------------------------------------------------------------
// Token semantics
// ---------------------------------------------------------------------------

#[test]
fn every_token_must_match() {
    let ds = catalog();
    assert_eq!(names(&ds, "bolt 20"), ["Bolt M6x20"]);
    assert!(names(&ds, "bolt washer").is_empty());
}

#[test]
fn adding_a_token_never_grows_results() {
    let ds = catalog();
    let broad = names(&ds, "6");
    let narrow = names(&ds, "6 bolt");
    assert!(narrow.len() <= broad.len());
    assert!(narrow.iter().all(|n| broad.contains(n)));
}

#[test]
fn words_past_the_sixth_are_ignored() {
    let ds = dataset(&[("a1 b2 c3 d4 e5 f6", "1")]);
    assert_eq!(names(&ds, "a1 b2 c3 d4 e5 f6 zz"), ["a1 b2 c3 d4 e5 f6"]);
}

#[test]
fn overlong_word_behaves_like_its_truncation() {
    let (short, long_name) = ("7".repeat(64), "7".repeat(80));
    let ds = dataset(&[(short.as_str(), "1"), (long_name.as_str(), "2")]);
    let long = names(&ds, &"7".repeat(100));
    assert_eq!(long, names(&ds, &"7".repeat(64)));
    assert_eq!(long.len(), 2);
}

#[test]
fn regex_metacharacters_are_literal() {
    let ds = dataset(&[("Cable (3x2.5)", "1"), ("Cable 3x215", "2")]);
    assert_eq!(names(&ds, "(3x2.5)"), ["Cable (3x2.5)"]);
    assert!(names(&ds, ".*").is_empty());
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[test]
fn session_states() {
    let mut s = SearchSession::new(catalog(), SearchOptions::default());
    assert_eq!(s.view().state, SearchState::EmptyQuery);
    s.set_query("zzzz");
    assert_eq!(s.view().state, SearchState::NoMatches);
    s.set_query("--");
    assert_eq!(s.view().state, SearchState::NoMatches);
    s.set_query("");
    assert_eq!(s.view().state, SearchState::EmptyQuery);
}

#[test]
fn default_pages_hold_two_hundred_rows() {
    let records = (0..450)
        .map(|i| Record::new(format!("Bolt {i}"), i.to_string(), None, Vec::new()))
        .collect();
    let ds = Dataset::new(records, 200_000).unwrap();
    let mut s = SearchSession::new(ds, SearchOptions::default());
    s.set_query("bolt");

    let mut shown = vec![s.view().rows.len()];
    while s.show_more() {
        shown.push(s.view().rows.len());
    }
    assert_eq!(shown, [200, 400, 450]);
    assert_eq!(s.view().total, 450);
    assert!(!s.view().has_more);
}

#[test]
fn view_rows_follow_rank_order() {
    let mut s = SearchSession::new(catalog(), SearchOptions::default());
    s.set_query("12345");
    let view = s.view();
    let rows: Vec<&str> = view.rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(rows, ["Clamp", "Bolt 12345", "Cable"]);
}

#[test]
fn typed_input_is_debounced() {
    let mut s = SearchSession::new(catalog(), SearchOptions::default());
    let t0 = Instant::now();
    for (i, prefix) in ["c", "cl", "cla", "clam"].iter().enumerate() {
        s.input(*prefix, t0 + Duration::from_millis(50 * i as u64));
        assert!(!s.poll(t0 + Duration::from_millis(50 * i as u64 + 10)));
    }
    assert!(s.poll(t0 + Duration::from_millis(350)));
    assert_eq!(s.query().raw(), "clam");
    assert_eq!(s.total(), 1);
}

#[test]
fn highlighting_marks_homoglyph_matches() {
    let mut s = SearchSession::new(catalog(), SearchOptions::default());
    s.set_query("bolt");
    let view = s.view();
    let h = view.highlighter.expect("highlighter for a small result set");
    // Cyrillic В, О and Т around a Latin L.
    assert_eq!(
        h.highlight("\u{412}\u{41e}L\u{422} M6"),
        "<span class=\"highlight\">\u{412}\u{41e}L\u{422}</span> M6"
    );
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

#[test]
fn session_loads_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("base.search.json");
    std::fs::write(
        &path,
        r#"[{"Наименование": "Болт М6", "Артикул": "001", "Цена": 12.5}]"#,
    )
    .unwrap();

    let mut s = SearchSession::load(&FileSource::new(&path), SearchOptions::default()).unwrap();
    s.set_query("болт");
    let view = s.view();
    assert_eq!(view.rows[0].formatted_price(), "12,50");
}

#[test]
fn over_cap_dataset_is_rejected() {
    let mut json = String::from("[[\"name\",\"article\"]");
    for i in 0..200_001 {
        json.push_str(&format!(",[\"x\",\"{i}\"]"));
    }
    json.push(']');
    let err = pricesearch::loader::parse_dataset(json.as_bytes(), &SearchOptions::default())
        .unwrap_err();
    assert!(matches!(
        err,
        LoadError::TooManyRows {
            count: 200_001,
            max: 200_000
        }
    ));
}

#[test]
fn missing_article_column_is_rejected() {
    let err = pricesearch::loader::parse_dataset(
        br#"[{"name": "Bolt"}]"#,
        &SearchOptions::default(),
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "missing required columns: article/Артикул");
}

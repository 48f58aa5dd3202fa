//! The search session: loaded dataset plus the mutable query state.
//!
//! A [`SearchSession`] owns its [`Dataset`] and is the only holder of the
//! query, the ranked result order and the page cursor. It is driven by two
//! inputs from the presenter, a raw query string and "show more", and
//! exposes one output, a [`ResultsView`] of the current window.

use std::time::Instant;

use tracing::{debug, warn};

use crate::debounce::Debouncer;
use crate::error::LoadError;
use crate::highlight::Highlighter;
use crate::loader::{DatasetSource, load};
use crate::options::SearchOptions;
use crate::record::{Dataset, Record};
use crate::search;
use crate::tokenize::Query;

/// What the presenter should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    /// No query typed yet, or the query was cleared.
    EmptyQuery,
    /// A query is present but nothing matched.
    NoMatches,
    /// At least one record matched.
    Results,
}

/// The visible part of the current result set.
#[derive(Debug)]
pub struct ResultsView<'s> {
    /// Which of the three states the session is in.
    pub state: SearchState,
    /// The trimmed query text.
    pub query: &'s str,
    /// Records of the current window, best first.
    pub rows: Vec<&'s Record>,
    /// Number of matching records.
    pub total: usize,
    /// Pages currently shown, starting at 1.
    pub page: usize,
    /// Whether "show more" would reveal further rows.
    pub has_more: bool,
    /// Highlighter for row text; `None` when highlighting is off for this
    /// result set.
    pub highlighter: Option<&'s Highlighter>,
}

/// Receives views and load failures from the application driving a session.
pub trait Presenter {
    /// Show the given window of results.
    fn render(&mut self, view: &ResultsView<'_>);

    /// Show a load failure. Called at most once per load attempt.
    fn report_error(&mut self, error: &LoadError);

    /// Put `text` on the clipboard. Failures are the presenter's to log;
    /// they never reach the session.
    fn copy_to_clipboard(&mut self, text: &str) -> Result<(), String> {
        let _ = text;
        Err("clipboard not available".to_owned())
    }
}

/// Loaded dataset plus query state for one search surface.
#[derive(Debug)]
pub struct SearchSession {
    dataset: Dataset,
    options: SearchOptions,
    query: Query,
    results: Vec<usize>,
    page: usize,
    highlighter: Highlighter,
    input: Debouncer<String>,
}

impl SearchSession {
    /// Start a session over `dataset` with an empty query.
    pub fn new(dataset: Dataset, options: SearchOptions) -> Self {
        let input = Debouncer::new(options.debounce);
        let query = Query::parse("", &options);
        Self {
            dataset,
            options,
            query,
            results: Vec::new(),
            page: 1,
            highlighter: Highlighter::default(),
            input,
        }
    }

    /// Load a dataset from `source` and start a session over it.
    ///
    /// # Errors
    ///
    /// The [`LoadError`] from loading; no session exists in that case.
    pub fn load<S>(source: &S, options: SearchOptions) -> Result<Self, LoadError>
    where
        S: DatasetSource + ?Sized,
    {
        let dataset = load(source, &options)?;
        Ok(Self::new(dataset, options))
    }

    /// Load like [`SearchSession::load`], reporting a failure to `presenter`
    /// and rendering the initial empty view on success.
    pub fn open<S, P>(source: &S, options: SearchOptions, presenter: &mut P) -> Option<Self>
    where
        S: DatasetSource + ?Sized,
        P: Presenter + ?Sized,
    {
        match Self::load(source, options) {
            Ok(session) => {
                presenter.render(&session.view());
                Some(session)
            }
            Err(e) => {
                warn!(error = %e, source = %source.describe(), "dataset load failed");
                presenter.report_error(&e);
                None
            }
        }
    }

    /// The loaded dataset.
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// The options this session runs with.
    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    /// Run `raw` as the new query immediately.
    ///
    /// Resets the page cursor to 1 and rebuilds the highlighter. Any input
    /// still waiting in the debouncer is discarded.
    pub fn set_query(&mut self, raw: &str) {
        self.input.cancel();
        self.page = 1;
        self.query = Query::parse(raw, &self.options);
        self.results = search(&self.dataset, &self.query)
            .into_iter()
            .map(|r| r.index)
            .collect();
        self.highlighter = if self.results.is_empty() {
            Highlighter::default()
        } else {
            Highlighter::new(self.query.highlight_words(), self.options.max_pattern_total)
        };
    }

    /// Queue `raw` as typed input at `now`. It runs on the first
    /// [`SearchSession::poll`] after the debounce period with no further
    /// input.
    pub fn input(&mut self, raw: impl Into<String>, now: Instant) {
        self.input.push(raw.into(), now);
    }

    /// Run the pending input if it is due. Returns whether a search ran.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.input.poll(now) {
            Some(raw) => {
                self.set_query(&raw);
                true
            }
            None => false,
        }
    }

    /// When pending input becomes due, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.input.deadline()
    }

    /// Reveal one more page. Returns `false` when everything is already
    /// shown.
    pub fn show_more(&mut self) -> bool {
        if self.visible_len() >= self.results.len() {
            return false;
        }
        self.page += 1;
        debug!(page = self.page, "showing more results");
        true
    }

    /// Pages currently shown, starting at 1.
    pub fn page(&self) -> usize {
        self.page
    }

    /// The current query.
    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Number of matching records.
    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// All matching records, best first. References into the dataset.
    pub fn results(&self) -> impl Iterator<Item = &Record> + '_ {
        self.results.iter().map(|&i| &self.dataset[i])
    }

    /// Current state for the presenter.
    pub fn state(&self) -> SearchState {
        if self.query.is_blank() {
            SearchState::EmptyQuery
        } else if self.results.is_empty() {
            SearchState::NoMatches
        } else {
            SearchState::Results
        }
    }

    fn visible_len(&self) -> usize {
        self.page
            .saturating_mul(self.options.page_size)
            .min(self.results.len())
    }

    /// The current window of results.
    pub fn view(&self) -> ResultsView<'_> {
        let total = self.results.len();
        let end = self.visible_len();
        let highlighter = (self.highlighter.is_active() && total <= self.options.highlight_row_limit)
            .then_some(&self.highlighter);
        ResultsView {
            state: self.state(),
            query: self.query.raw(),
            rows: self.results[..end].iter().map(|&i| &self.dataset[i]).collect(),
            total,
            page: self.page,
            has_more: end < total,
            highlighter,
        }
    }

    /// Copy the row at `position` in the result order through `presenter`.
    ///
    /// Clipboard failures are logged and swallowed. Returns whether the
    /// copy succeeded.
    pub fn copy_row<P>(&self, position: usize, presenter: &mut P) -> bool
    where
        P: Presenter + ?Sized,
    {
        let Some(&index) = self.results.get(position) else {
            return false;
        };
        let text = self.dataset[index].clipboard_text();
        match presenter.copy_to_clipboard(&text) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "clipboard copy failed");
                false
            }
        }
    }
}

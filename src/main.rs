use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use pricesearch::highlight::row_html;
use pricesearch::loader::DEFAULT_DATASET_PATH;
use pricesearch::{
    FileSource, LoadError, Presenter, ResultsView, SearchOptions, SearchSession, SearchState,
};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Search a product price list from the terminal.
#[derive(Parser, Debug)]
#[command(name = "pricesearch", version, about = "Search a product price list")]
struct Cli {
    /// Dataset file (JSON rows or a sheet of rows)
    #[arg(long, default_value = DEFAULT_DATASET_PATH)]
    data: PathBuf,

    /// JSON file overriding search limits
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print ranked rows as JSON lines
    #[arg(long, conflicts_with = "html")]
    json: bool,

    /// Print rows as highlighted HTML table rows
    #[arg(long)]
    html: bool,

    /// Number of pages to show for a one-shot query
    #[arg(long, default_value_t = 1)]
    pages: usize,

    /// Log debug events to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Query to run once; without it, queries are read from stdin
    query: Option<String>,
}

#[derive(Debug, Clone, Copy)]
enum Format {
    Text,
    Json,
    Html,
}

struct TerminalPresenter<W> {
    out: W,
    format: Format,
}

impl<W: Write> TerminalPresenter<W> {
    fn write_view(&mut self, view: &ResultsView<'_>) -> io::Result<()> {
        match view.state {
            SearchState::EmptyQuery => return writeln!(self.out, "Введите текст для поиска"),
            SearchState::NoMatches => return writeln!(self.out, "По вашему запросу ничего не найдено"),
            SearchState::Results => {}
        }
        for record in &view.rows {
            match self.format {
                Format::Text => writeln!(
                    self.out,
                    "{}\t{}\t{}",
                    record.name,
                    record.article,
                    record.formatted_price()
                )?,
                Format::Json => {
                    serde_json::to_writer(&mut self.out, record)?;
                    writeln!(self.out)?;
                }
                Format::Html => writeln!(self.out, "{}", row_html(record, view.highlighter))?,
            }
        }
        if !matches!(self.format, Format::Json) {
            writeln!(self.out, "Показаны: {} из {}", view.rows.len(), view.total)?;
        }
        Ok(())
    }
}

impl<W: Write> Presenter for TerminalPresenter<W> {
    fn render(&mut self, view: &ResultsView<'_>) {
        if let Err(e) = self.write_view(view).and_then(|()| self.out.flush()) {
            tracing::warn!(error = %e, "failed to write results");
        }
    }

    fn report_error(&mut self, error: &LoadError) {
        eprintln!("Ошибка загрузки данных: {error}");
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { Level::DEBUG } else { Level::WARN };
    let filter = EnvFilter::builder()
        .with_default_directive(default.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let options = match &cli.config {
        Some(path) => SearchOptions::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SearchOptions::default(),
    };

    let format = if cli.json {
        Format::Json
    } else if cli.html {
        Format::Html
    } else {
        Format::Text
    };
    let mut presenter = TerminalPresenter {
        out: io::stdout().lock(),
        format,
    };

    let source = FileSource::new(&cli.data);
    let Some(mut session) = SearchSession::load(&source, options)
        .map_err(|e| presenter.report_error(&e))
        .ok()
    else {
        std::process::exit(1);
    };

    match cli.query {
        Some(query) => {
            session.set_query(&query);
            for _ in 1..cli.pages {
                if !session.show_more() {
                    break;
                }
            }
            presenter.render(&session.view());
        }
        None => {
            for line in io::stdin().lock().lines() {
                let line = line.context("reading query from stdin")?;
                if line.trim() == "+" {
                    if !session.show_more() {
                        continue;
                    }
                } else {
                    session.set_query(&line);
                }
                presenter.render(&session.view());
            }
        }
    }
    Ok(())
}

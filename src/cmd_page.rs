//! Single-document subcommand handlers.

use std::path::Path;

use serde::Serialize;
use tracing::{debug, info};

use pagehands_autofill::{auto_fill, classify};
use pagehands_config::Config;
use pagehands_dom::{highlight, try_find_and_replace, Document, HighlightOptions, ReplaceOptions};

use crate::cli::Commands;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Handle the commands that work on one fixture without the router.
pub(crate) fn handle_page_command(command: Commands, config: &Config) -> CmdResult {
    match command {
        Commands::Classify { value } => page_classify(&value),
        Commands::Extract { fixture } => page_extract(&fixture),
        Commands::Fill { fixture, value, html } => page_fill(&fixture, &value, html),
        Commands::Highlight {
            fixture,
            term,
            case_sensitive,
        } => page_highlight(&fixture, &term, case_sensitive, config),
        Commands::Replace {
            fixture,
            find,
            replace,
            regex,
            whole_word,
            case_sensitive,
        } => {
            let options = ReplaceOptions {
                case_sensitive,
                whole_word,
                use_regex: regex,
            };
            page_replace(&fixture, &find, &replace, &options)
        }
        Commands::Analyze { fixture } => page_analyze(&fixture),
        Commands::Demo { .. } => Err("demo runs through the extension host".into()),
    }
}

/// Load a JSON page fixture.
pub(crate) fn load_fixture(path: &Path) -> Result<Document, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
    let document = Document::from_fixture_str(&content)?;
    debug!("Loaded {} ({} nodes)", path.display(), document.len());
    Ok(document)
}

fn print_json<T: Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(crate) fn highlight_options(config: &Config) -> HighlightOptions {
    HighlightOptions {
        background_color: config.highlight.background_color.clone(),
        foreground_color: config.highlight.foreground_color.clone(),
        class_name: config.highlight.class_name.clone(),
        case_sensitive: config.highlight.case_sensitive,
    }
}

fn page_classify(value: &str) -> CmdResult {
    let kind = classify(value);
    if kind.is_classified() {
        println!("{}", kind);
        println!("keywords: {}", kind.keywords().join(", "));
    } else {
        println!("unclassified");
    }
    Ok(())
}

fn page_extract(fixture: &Path) -> CmdResult {
    let document = load_fixture(fixture)?;
    print_json(&document.extract_page_data())
}

fn page_fill(fixture: &Path, value: &str, html: bool) -> CmdResult {
    let mut document = load_fixture(fixture)?;
    let outcome = auto_fill(&mut document, value);
    info!(
        "Classified as {}, filled {} field(s)",
        outcome.classification,
        outcome.filled_fields.len()
    );

    if outcome.is_empty() {
        println!("No fillable form fields found.");
    } else {
        println!("{:<24} {:<10} {}", "FIELD", "TYPE", "VALUE");
        println!("{}", "-".repeat(60));
        for field in &outcome.filled_fields {
            println!(
                "{:<24} {:<10} {}",
                field.field_identifier, field.field_type, field.value
            );
        }
    }
    if html {
        println!();
        println!("{}", document.to_html());
    }
    Ok(())
}

fn page_highlight(fixture: &Path, term: &str, case_sensitive: bool, config: &Config) -> CmdResult {
    let mut document = load_fixture(fixture)?;
    let mut options = highlight_options(config);
    options.case_sensitive |= case_sensitive;
    let count = highlight(&mut document, term, &options);
    println!("Highlighted {} text node(s)", count);
    if count > 0 {
        println!("{}", document.to_html());
    }
    Ok(())
}

fn page_replace(fixture: &Path, find: &str, replace: &str, options: &ReplaceOptions) -> CmdResult {
    let mut document = load_fixture(fixture)?;
    let count = try_find_and_replace(&mut document, find, replace, options)?;
    println!("Replaced text in {} node(s)", count);
    if count > 0 {
        println!("{}", document.to_html());
    }
    Ok(())
}

fn page_analyze(fixture: &Path) -> CmdResult {
    let document = load_fixture(fixture)?;
    let analysis = document.analyze_page();
    let stats = document.page_stats();
    print_json(&serde_json::json!({
        "analysis": analysis,
        "stats": stats,
    }))
}

//! `demo`: every context running in-process against one page.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tracing::{info, warn};

use pagehands_autofill::PlainTextParser;
use pagehands_config::Config;
use pagehands_core::{FileSettingsStore, MemorySettingsStore};
use pagehands_protocols::{ContextAddress, SettingsStore};
use pagehands_runtime::{ExtensionHost, LogNotifier, Popup, Tab};

use crate::cmd_page::load_fixture;

const DEMO_TAB: u32 = 1;
const READY_POLLS: usize = 100;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

pub(crate) async fn handle_demo_command(
    config: Config,
    fixture: PathBuf,
    fill: Option<String>,
    highlight: Option<String>,
    resume: Option<PathBuf>,
    settings: Option<PathBuf>,
) -> CmdResult {
    let store: Arc<dyn SettingsStore> = match settings {
        Some(path) => {
            info!("Settings file: {}", path.display());
            Arc::new(FileSettingsStore::new(path))
        }
        None => Arc::new(MemorySettingsStore::default()),
    };
    let host = ExtensionHost::start(config, store, Arc::new(LogNotifier)).await?;

    let result = run_demo(&host, &fixture, fill, highlight, resume).await;
    host.shutdown();
    result
}

async fn run_demo(
    host: &ExtensionHost,
    fixture: &Path,
    fill: Option<String>,
    highlight: Option<String>,
    resume: Option<PathBuf>,
) -> CmdResult {
    let document = load_fixture(fixture)?;
    let tab = host.open_tab(DEMO_TAB, document).await?;
    wait_until_ready(host, &tab).await;

    let popup = host.open_popup(Arc::new(PlainTextParser::new()))?;
    let background = popup.check_background().await?;
    println!("coordinator: {}", background["message"].as_str().unwrap_or("ok"));

    if let Some(term) = highlight {
        let count = popup
            .router()
            .call(
                ContextAddress::coordinator(),
                "tabCommand",
                json!({"action": "capability:highlightText", "data": [&term]}),
            )
            .await?;
        println!("highlighted {} text node(s) for \"{}\"", count, term);
    }

    if let Some(value) = fill {
        let outcome = popup.fill_web_form(&value).await?;
        print_fill(&popup, &outcome);
    }

    if let Some(path) = resume {
        fill_resume(&popup, &path).await?;
    }

    for info in host.page_infos().await {
        match info {
            Ok(info) => println!("{}", serde_json::to_string_pretty(&info)?),
            Err(e) => warn!("Page info unavailable: {}", e),
        }
    }
    popup.close();
    Ok(())
}

async fn wait_until_ready(host: &ExtensionHost, tab: &Tab) {
    for _ in 0..READY_POLLS {
        if tab.mediator.host_ready() && host.coordinator().tabs().contains(tab.id) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    warn!("Tab {} did not report ready in time", tab.id);
}

fn print_fill(popup: &Popup, outcome: &serde_json::Value) {
    if let Some(status) = popup.status() {
        println!("{}", status.message);
    }
    for field in outcome["filledFields"].as_array().into_iter().flatten() {
        println!(
            "  {} ({}) = {}",
            field["fieldIdentifier"].as_str().unwrap_or("unknown"),
            field["fieldType"].as_str().unwrap_or("text"),
            field["value"].as_str().unwrap_or_default()
        );
    }
}

async fn fill_resume(popup: &Popup, path: &Path) -> CmdResult {
    let bytes = std::fs::read(path)?;
    let info = popup.load_document(&bytes, "text/plain")?;
    if info.is_empty() {
        println!("No resume fields recognised in {}", path.display());
        return Ok(());
    }
    for (key, label, value) in info.fields() {
        println!("{} ({}): {}", label, key, value);
        match popup.fill_resume_field(key).await {
            Ok(outcome) => print_fill(popup, &outcome),
            Err(e) => warn!("Could not fill '{}': {}", key, e),
        }
    }
    Ok(())
}

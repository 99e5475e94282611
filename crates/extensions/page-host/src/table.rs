//! Capability table.

use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use pagehands_config::HighlightConfig;
use pagehands_dom::{
    find_and_replace, highlight, remove_highlight, ElementHighlightOptions, HighlightOptions,
    ReplaceOptions,
};
use pagehands_protocols::{CapabilityError, DomError};

use crate::args::CapabilityArgs;
use crate::capability::Capability;
use crate::SharedDocument;

type CapabilityFn = fn(&CapabilityContext, &CapabilityArgs) -> Result<Value, CapabilityError>;

/// State every capability operates on.
pub struct CapabilityContext {
    pub document: SharedDocument,
    pub highlight_defaults: HighlightOptions,
}

impl CapabilityContext {
    pub fn new(document: SharedDocument, highlight: &HighlightConfig) -> Self {
        Self {
            document,
            highlight_defaults: HighlightOptions {
                background_color: highlight.background_color.clone(),
                foreground_color: highlight.foreground_color.clone(),
                class_name: highlight.class_name.clone(),
                case_sensitive: highlight.case_sensitive,
            },
        }
    }
}

/// Fixed mapping from capability to operation, built once per host.
pub struct CapabilityTable {
    entries: HashMap<Capability, CapabilityFn>,
    context: CapabilityContext,
}

impl CapabilityTable {
    pub fn new(context: CapabilityContext) -> Self {
        let entries: HashMap<Capability, CapabilityFn> = Capability::ALL
            .into_iter()
            .map(|capability| (capability, operation(capability)))
            .collect();
        Self { entries, context }
    }

    pub fn context(&self) -> &CapabilityContext {
        &self.context
    }

    pub fn capabilities(&self) -> Vec<Capability> {
        Capability::ALL
            .into_iter()
            .filter(|c| self.entries.contains_key(c))
            .collect()
    }

    /// Invoke a capability by wire name.
    pub fn invoke(&self, name: &str, payload: Value) -> Result<Value, CapabilityError> {
        let capability: Capability = name.parse()?;
        self.call(capability, payload)
    }

    pub fn call(&self, capability: Capability, payload: Value) -> Result<Value, CapabilityError> {
        let op = self
            .entries
            .get(&capability)
            .ok_or_else(|| CapabilityError::NotFound(capability.to_string()))?;
        let args = CapabilityArgs::from_payload(capability, payload);
        debug!("Invoking {} with {} args", capability, args.len());
        op(&self.context, &args)
    }
}

fn operation(capability: Capability) -> CapabilityFn {
    match capability {
        Capability::HighlightText => highlight_text,
        Capability::RemoveHighlight => remove_highlight_text,
        Capability::ExtractPageData => extract_page_data,
        Capability::AnalyzePage => analyze_page,
        Capability::FindAndReplace => find_replace,
        Capability::AddCustomStyles => add_custom_styles,
        Capability::RemoveCustomStyles => remove_custom_styles,
        Capability::GetPageStats => page_stats,
        Capability::ScrollToElement => scroll_to_element,
        Capability::HighlightElement => highlight_element,
    }
}

fn dom_failure(capability: Capability, e: DomError) -> CapabilityError {
    CapabilityError::Failed {
        capability: capability.to_string(),
        message: e.to_string(),
    }
}

fn to_json<T: Serialize>(capability: Capability, value: &T) -> Result<Value, CapabilityError> {
    serde_json::to_value(value).map_err(|e| CapabilityError::Failed {
        capability: capability.to_string(),
        message: e.to_string(),
    })
}

fn highlight_text(ctx: &CapabilityContext, args: &CapabilityArgs) -> Result<Value, CapabilityError> {
    let term = args.string(0)?;
    let options = args.options_over(1, &ctx.highlight_defaults)?;
    let count = highlight(&mut ctx.document.lock(), &term, &options);
    Ok(json!(count))
}

fn remove_highlight_text(
    ctx: &CapabilityContext,
    args: &CapabilityArgs,
) -> Result<Value, CapabilityError> {
    let class_name = args
        .optional_string(0)?
        .unwrap_or_else(|| ctx.highlight_defaults.class_name.clone());
    let count = remove_highlight(&mut ctx.document.lock(), &class_name);
    Ok(json!(count))
}

fn extract_page_data(ctx: &CapabilityContext, args: &CapabilityArgs) -> Result<Value, CapabilityError> {
    let data = ctx.document.lock().extract_page_data();
    to_json(args.capability(), &data)
}

fn analyze_page(ctx: &CapabilityContext, args: &CapabilityArgs) -> Result<Value, CapabilityError> {
    let analysis = ctx.document.lock().analyze_page();
    to_json(args.capability(), &analysis)
}

fn page_stats(ctx: &CapabilityContext, args: &CapabilityArgs) -> Result<Value, CapabilityError> {
    let stats = ctx.document.lock().page_stats();
    to_json(args.capability(), &stats)
}

fn find_replace(ctx: &CapabilityContext, args: &CapabilityArgs) -> Result<Value, CapabilityError> {
    let find = args.string(0)?;
    let replace = args.string(1)?;
    let options = args.options_over(2, &ReplaceOptions::default())?;
    let count = find_and_replace(&mut ctx.document.lock(), &find, &replace, &options);
    Ok(json!(count))
}

fn add_custom_styles(ctx: &CapabilityContext, args: &CapabilityArgs) -> Result<Value, CapabilityError> {
    let css = args.string(0)?;
    ctx.document
        .lock()
        .add_custom_styles(&css)
        .map_err(|e| dom_failure(args.capability(), e))?;
    Ok(json!(true))
}

fn remove_custom_styles(
    ctx: &CapabilityContext,
    args: &CapabilityArgs,
) -> Result<Value, CapabilityError> {
    let removed = ctx
        .document
        .lock()
        .remove_custom_styles()
        .map_err(|e| dom_failure(args.capability(), e))?;
    Ok(json!(removed))
}

fn scroll_to_element(ctx: &CapabilityContext, args: &CapabilityArgs) -> Result<Value, CapabilityError> {
    let selector = args.string(0)?;
    let found = ctx
        .document
        .lock()
        .scroll_to_element(&selector)
        .map_err(|e| dom_failure(args.capability(), e))?;
    Ok(json!(found))
}

fn highlight_element(ctx: &CapabilityContext, args: &CapabilityArgs) -> Result<Value, CapabilityError> {
    let selector = args.string(0)?;
    let options = args.options_over(1, &ElementHighlightOptions::default())?;
    let snapshot = ctx
        .document
        .lock()
        .highlight_element(&selector, &options)
        .map_err(|e| dom_failure(args.capability(), e))?;

    let Some(snapshot) = snapshot else {
        return Ok(json!(false));
    };
    if options.duration > 0 {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let document = ctx.document.clone();
                let delay = Duration::from_millis(options.duration);
                handle.spawn(async move {
                    tokio::time::sleep(delay).await;
                    if let Err(e) = document.lock().restore_style(&snapshot) {
                        debug!("Style restore skipped: {}", e);
                    }
                });
            }
            Err(_) => warn!("No async runtime; element emphasis will not be reverted"),
        }
    }
    Ok(json!(true))
}

#[cfg(test)]
#[path = "table_tests.rs"]
mod tests;

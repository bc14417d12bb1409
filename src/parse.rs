//! Parse collaborator: turns one fetched response into extracted records
//!
//! Parsing is a pure function of one response and may produce zero, one, or
//! many records. A failure is converted into a parse-error record by the
//! driver and the job is retried (re-fetched) in a later round; it never
//! aborts the stage for other responses.
//!
//! Records are JSON values so arbitrary extractions persist uniformly
//! through the JSON sink.

use crate::config::{ParseConfig, ParseMode};
use crate::engine::FetchedPage;
use crate::ConfigError;
use anyhow::{bail, Context};
use scraper::{Html, Selector};
use serde_json::{json, Value};
use std::sync::Arc;
use url::Url;

/// Capability interface for parsing one fetched response
pub trait ParseResponse: Send + Sync {
    fn parse(&self, page: &FetchedPage) -> anyhow::Result<Vec<Value>>;
}

/// Builds the parser selected by the `[parse]` config section
pub fn parser_from_config(config: &ParseConfig) -> Result<Arc<dyn ParseResponse>, ConfigError> {
    match config.mode {
        ParseMode::Status => Ok(Arc::new(StatusParser)),
        ParseMode::Text => Ok(Arc::new(TextParser)),
        ParseMode::Links => Ok(Arc::new(LinkParser)),
        ParseMode::Select => {
            let selector = config.selector.as_deref().ok_or_else(|| {
                ConfigError::Validation("parse mode 'select' requires a selector".to_string())
            })?;
            Ok(Arc::new(SelectorParser::new(selector)?))
        }
    }
}

/// Emits one record with the URL and the HTTP status code
pub struct StatusParser;

impl ParseResponse for StatusParser {
    fn parse(&self, page: &FetchedPage) -> anyhow::Result<Vec<Value>> {
        Ok(vec![json!({ "url": page.url, "status": page.status })])
    }
}

/// Emits one record with the page title and the body text
pub struct TextParser;

impl ParseResponse for TextParser {
    fn parse(&self, page: &FetchedPage) -> anyhow::Result<Vec<Value>> {
        let document = Html::parse_document(&page.body);

        let title = select_first_text(&document, "title");

        let Some(text) = select_first_text(&document, "body") else {
            bail!("empty or missing <body> in response from {}", page.url);
        };

        Ok(vec![json!({
            "url": page.url,
            "title": title,
            "text": text,
        })])
    }
}

/// Emits one record per link, resolved to an absolute URL
pub struct LinkParser;

impl ParseResponse for LinkParser {
    fn parse(&self, page: &FetchedPage) -> anyhow::Result<Vec<Value>> {
        let base = Url::parse(&page.final_url)
            .with_context(|| format!("invalid base URL {}", page.final_url))?;
        let document = Html::parse_document(&page.body);
        let anchors = Selector::parse("a[href]").expect("static selector");

        let mut records = Vec::new();
        for element in document.select(&anchors) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            // Fragment-only and unresolvable hrefs are skipped, not errors.
            let Ok(mut absolute) = base.join(href) else {
                continue;
            };
            absolute.set_fragment(None);
            records.push(Value::String(absolute.into()));
        }
        Ok(records)
    }
}

/// Emits one record per CSS-selector match, with the matched text
pub struct SelectorParser {
    selector: Selector,
    raw: String,
}

impl SelectorParser {
    pub fn new(selector: &str) -> Result<Self, ConfigError> {
        let parsed = Selector::parse(selector)
            .map_err(|e| ConfigError::InvalidSelector(format!("{selector}: {e}")))?;
        Ok(Self {
            selector: parsed,
            raw: selector.to_string(),
        })
    }
}

impl ParseResponse for SelectorParser {
    fn parse(&self, page: &FetchedPage) -> anyhow::Result<Vec<Value>> {
        let document = Html::parse_document(&page.body);
        let records: Vec<Value> = document
            .select(&self.selector)
            .map(|element| {
                json!({
                    "url": page.url,
                    "text": element.text().collect::<String>().trim(),
                })
            })
            .collect();

        if records.is_empty() {
            bail!("selector '{}' matched nothing at {}", self.raw, page.url);
        }
        Ok(records)
    }
}

fn select_first_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
}

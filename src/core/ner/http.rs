//! JSON-over-HTTP entity model client.
//!
//! Request: `POST <endpoint>` with `{"text": "..."}`.
//! Response: `{"entities": [{"text": "...", "label": "PERSON"}, ...]}`.
//! displaCy-style `{"ents": [{"start": 0, "end": 8, "label": "PERSON"}]}` is
//! accepted too; `start`/`end` are character offsets into the sent text.

use log::{debug, info};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::error::{ScanError, ScanResult};
use crate::core::ner::entity::{Entity, NerModel};

const ERROR_BODY_PREVIEW: usize = 200;

#[derive(Serialize)]
struct NerRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct NerResponse {
    #[serde(alias = "ents")]
    entities: Vec<RawEntity>,
}

#[derive(Deserialize)]
struct RawEntity {
    text: Option<String>,
    start: Option<usize>,
    end: Option<usize>,
    #[serde(alias = "label_")]
    label: String,
}

impl RawEntity {
    fn resolve(self, source: &str) -> ScanResult<Entity> {
        if let Some(text) = self.text {
            return Ok(Entity::new(text, self.label));
        }
        match (self.start, self.end) {
            (Some(start), Some(end)) => char_span(source, start, end)
                .map(|text| Entity::new(text, self.label))
                .ok_or_else(|| {
                    ScanError::EntityModel(format!(
                        "entity span {}..{} outside the {}-char text",
                        start,
                        end,
                        source.chars().count()
                    ))
                }),
            _ => Err(ScanError::EntityModel(
                "entity has neither text nor start/end offsets".into(),
            )),
        }
    }
}

/// Slice by character offsets, the way spaCy counts them.
fn char_span(source: &str, start: usize, end: usize) -> Option<&str> {
    if start > end {
        return None;
    }
    let byte_at = |n: usize| {
        source
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(source.len()))
            .nth(n)
    };
    Some(&source[byte_at(start)?..byte_at(end)?])
}

pub struct HttpNerModel {
    client: Client,
    endpoint: String,
}

impl HttpNerModel {
    pub fn new(endpoint: impl Into<String>, timeout: Option<Duration>) -> ScanResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl NerModel for HttpNerModel {
    fn entities(&self, text: &str) -> ScanResult<Vec<Entity>> {
        info!("🧠 Sending {} chars to NER endpoint {}", text.len(), self.endpoint);

        let body = serde_json::to_string(&NerRequest { text })?;
        let resp = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()?;

        let status = resp.status();
        let raw = resp.text()?;
        if !status.is_success() {
            let preview: String = raw.chars().take(ERROR_BODY_PREVIEW).collect();
            return Err(ScanError::EntityModel(format!(
                "{} returned {}: {}",
                self.endpoint, status, preview
            )));
        }

        let parsed: NerResponse = serde_json::from_str(&raw)?;
        debug!("🧠 NER returned {} entities", parsed.entities.len());
        parsed
            .entities
            .into_iter()
            .map(|e| e.resolve(text))
            .collect()
    }

    fn name(&self) -> &str {
        "http"
    }
}

use serde::{Deserialize, Serialize};
use std::sync::Mutex;

use crate::core::error::ScanResult;

pub const PERSON_LABEL: &str = "PERSON";

/// One span emitted by an entity model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub text: String,
    #[serde(alias = "label_")]
    pub label: String,
}

impl Entity {
    pub fn new(text: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            label: label.into(),
        }
    }

    pub fn person(text: impl Into<String>) -> Self {
        Self::new(text, PERSON_LABEL)
    }

    pub fn is_person(&self) -> bool {
        self.label == PERSON_LABEL
    }
}

pub trait NerModel: Send + Sync {
    /// Entities in the order the model emits them.
    fn entities(&self, text: &str) -> ScanResult<Vec<Entity>>;

    fn name(&self) -> &str;
}

/// Test double returning a fixed entity list and remembering the text it saw.
pub struct MockNerModel {
    entities: Vec<Entity>,
    seen: Mutex<Vec<String>>,
}

impl MockNerModel {
    pub fn new(entities: Vec<Entity>) -> Self {
        Self {
            entities,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn seen_texts(&self) -> Vec<String> {
        self.seen.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl NerModel for MockNerModel {
    fn entities(&self, text: &str) -> ScanResult<Vec<Entity>> {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(text.to_string());
        }
        Ok(self.entities.clone())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

use log::{debug, info};

use crate::core::error::ScanResult;
use crate::core::ner::entity::NerModel;

/// Person-name extraction over the whole corpus.
///
/// Keeps entities labelled `PERSON` whose text has at least two whitespace
/// tokens, in model emission order. Repeated mentions are kept; nothing is
/// normalized here.
pub struct EntityExtractor {
    model: Box<dyn NerModel>,
}

impl EntityExtractor {
    pub fn new(model: Box<dyn NerModel>) -> Self {
        Self { model }
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub fn extract(&self, corpus: &str) -> ScanResult<Vec<String>> {
        if corpus.trim().is_empty() {
            debug!("🧠 Empty corpus, skipping NER");
            return Ok(Vec::new());
        }

        let entities = self.model.entities(corpus)?;
        let total = entities.len();
        let names: Vec<String> = entities
            .into_iter()
            .filter(|e| e.is_person())
            .filter(|e| is_multi_token(&e.text))
            .map(|e| e.text)
            .collect();

        info!(
            "🧠 {} entities from {}, {} multi-token person names",
            total,
            self.model.name(),
            names.len()
        );
        Ok(names)
    }
}

pub fn is_multi_token(name: &str) -> bool {
    name.split_whitespace().nth(1).is_some()
}

pub mod entity;
pub mod extractor;
pub mod http;
pub mod tagger;

pub use entity::{Entity, MockNerModel, NerModel, PERSON_LABEL};
pub use extractor::{is_multi_token, EntityExtractor};
pub use http::HttpNerModel;
pub use tagger::CapitalizedRunTagger;

use log::warn;
use std::sync::Once;

use crate::core::config::{NerBackend, PipelineConfig};
use crate::core::error::ScanResult;

static TAGGER_WARNING: Once = Once::new();

/// Builds the entity model the config asks for.
pub fn model_from_config(config: &PipelineConfig) -> ScanResult<Box<dyn NerModel>> {
    let model: Box<dyn NerModel> = match &config.ner {
        NerBackend::Http { endpoint } => {
            Box::new(HttpNerModel::new(endpoint.clone(), config.ner_timeout())?)
        }
        NerBackend::CapitalizedRuns => {
            TAGGER_WARNING.call_once(|| {
                warn!(
                    "⚠️ Using the capitalized-run tagger: every Title Case run counts as a person \
                     (organisations included). Point --ner-url at an entity service for real NER."
                );
            });
            Box::new(CapitalizedRunTagger::new())
        }
    };
    Ok(model)
}

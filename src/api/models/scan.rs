use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::core::pipeline::ScanOutcome;

/// 单次扫描结果摘要
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSummary {
    #[serde(rename = "runId")]
    pub run_id: String,
    #[serde(rename = "frameCount")]
    pub frame_count: usize,
    #[serde(rename = "extractedCount")]
    pub extracted_count: usize,
    pub matches: Vec<NameMatch>,
    /// 去重排序后的报告行
    pub rows: Vec<String>,
    #[serde(rename = "reportPath")]
    pub report_path: PathBuf,
    #[serde(rename = "extractedNamesPath", skip_serializing_if = "Option::is_none", default)]
    pub extracted_names_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameMatch {
    pub name: String,
    pub reference: String,
}

impl From<ScanOutcome> for ScanSummary {
    fn from(outcome: ScanOutcome) -> Self {
        Self {
            run_id: outcome.run_id,
            frame_count: outcome.frame_count,
            extracted_count: outcome.extracted_names.len(),
            matches: outcome
                .matches
                .into_iter()
                .map(|m| NameMatch {
                    name: m.name,
                    reference: m.reference,
                })
                .collect(),
            rows: outcome.rows,
            report_path: outcome.report_path,
            extracted_names_path: outcome.extracted_names_path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::matching::MatchRecord;

    #[test]
    fn test_summary_from_outcome() {
        let outcome = ScanOutcome {
            run_id: "run-1".to_string(),
            frame_count: 3,
            extracted_names: vec!["Jane Doe".into(), "Jane Doe".into(), "John Smith".into()],
            matches: vec![
                MatchRecord {
                    name: "Jane Doe".into(),
                    reference: "doe".into(),
                },
                MatchRecord {
                    name: "Jane Doe".into(),
                    reference: "doe".into(),
                },
            ],
            rows: vec!["Jane Doe".into()],
            report_path: PathBuf::from("/tmp/run-1/outputs/common_names.csv"),
            extracted_names_path: None,
        };

        let summary = ScanSummary::from(outcome);
        assert_eq!(summary.extracted_count, 3);
        assert_eq!(summary.matches.len(), 2);
        assert_eq!(summary.rows, vec!["Jane Doe"]);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["runId"], "run-1");
        assert_eq!(json["frameCount"], 3);
        assert!(json.get("extractedNamesPath").is_none());
    }
}

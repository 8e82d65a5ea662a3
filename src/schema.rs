//! Formal output schema for schema-constrained generation
//!
//! Builds the structural schema attached to contract-module requests so the
//! remote service constrains decoding to the exact report shape. The scam
//! module attaches none; its output cardinality is open-ended and a rigid
//! schema would risk the service rejecting the request.

use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum SchemaKind {
    Object,
    Array,
    String,
    Integer,
}

/// One node of the schema tree, serialized in the Generative Language
/// schema vocabulary (uppercase type tags, `enum` for closed string sets).
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OutputSchema {
    #[serde(rename = "type")]
    pub kind: SchemaKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, OutputSchema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<OutputSchema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<Vec<String>>,
}

impl OutputSchema {
    pub fn string() -> Self {
        Self::leaf(SchemaKind::String)
    }

    pub fn integer() -> Self {
        Self::leaf(SchemaKind::Integer)
    }

    /// A string constrained to a closed set of tokens.
    pub fn enumeration(values: &[&str]) -> Self {
        Self {
            allowed_values: Some(values.iter().map(|v| v.to_string()).collect()),
            ..Self::leaf(SchemaKind::String)
        }
    }

    pub fn array(items: OutputSchema) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::leaf(SchemaKind::Array)
        }
    }

    pub fn object(properties: Vec<(&str, OutputSchema)>, required: &[&str]) -> Self {
        Self {
            properties: Some(
                properties
                    .into_iter()
                    .map(|(name, schema)| (name.to_string(), schema))
                    .collect(),
            ),
            required: Some(required.iter().map(|r| r.to_string()).collect()),
            ..Self::leaf(SchemaKind::Object)
        }
    }

    fn leaf(kind: SchemaKind) -> Self {
        Self {
            kind,
            properties: None,
            items: None,
            required: None,
            allowed_values: None,
        }
    }
}

/// The full contract-report shape: discriminator, summary, risk score,
/// localized interface labels, and the findings cards with their nested
/// details. Required lists are exhaustive at every level.
pub fn contract_response_schema() -> OutputSchema {
    let details = OutputSchema::object(
        vec![
            ("plain_english_explanation", OutputSchema::string()),
            ("exact_quote_citation", OutputSchema::string()),
            ("suggested_fix", OutputSchema::string()),
        ],
        &[
            "plain_english_explanation",
            "exact_quote_citation",
            "suggested_fix",
        ],
    );

    let card = OutputSchema::object(
        vec![
            ("id", OutputSchema::integer()),
            ("short_warning", OutputSchema::string()),
            (
                "risk_level",
                OutputSchema::enumeration(&["High", "Medium", "Low"]),
            ),
            ("risk_level_label", OutputSchema::string()),
            ("details", details),
        ],
        &["id", "short_warning", "risk_level", "risk_level_label", "details"],
    );

    let ui_translations = OutputSchema::object(
        vec![
            ("summary_label", OutputSchema::string()),
            ("risk_score_label", OutputSchema::string()),
            ("findings_label", OutputSchema::string()),
            ("explanation_label", OutputSchema::string()),
            ("evidence_label", OutputSchema::string()),
            ("advice_label", OutputSchema::string()),
        ],
        &[
            "summary_label",
            "risk_score_label",
            "findings_label",
            "explanation_label",
            "evidence_label",
            "advice_label",
        ],
    );

    OutputSchema::object(
        vec![
            ("type", OutputSchema::enumeration(&["contract"])),
            ("summary", OutputSchema::string()),
            ("overall_risk", OutputSchema::integer()),
            ("ui_translations", ui_translations),
            ("cards", OutputSchema::array(card)),
        ],
        &["type", "summary", "overall_risk", "cards", "ui_translations"],
    )
}

//! Response extraction and validation
//!
//! Two extraction strategies feed one validator. The schema-constrained
//! contract path parses the response text directly; the unconstrained scam
//! path scans for the first balanced JSON object inside whatever prose the
//! model wrapped around it. The validator then checks the discriminator and
//! the fixed-vocabulary invariants before a typed report leaves the
//! pipeline. Nothing is coerced: a report that violates an invariant fails
//! exactly like a transport error would.

use crate::models::{AnalysisModule, AnalysisResult};
use crate::{Error, Result};
use serde_json::Value;

/// Strict parse for the schema-constrained path. The service was told to
/// emit exact JSON, so anything unparsable is `MalformedSchema`.
pub fn strict_json(raw: &str) -> Result<Value> {
    serde_json::from_str(raw.trim()).map_err(|e| Error::MalformedSchema(e.to_string()))
}

/// Lenient extraction for the unconstrained path: take the first balanced
/// `{...}` span and parse that. No span at all is `NoStructuredOutput`; a
/// span that will not parse is `MalformedFreeform`.
pub fn lenient_json(raw: &str) -> Result<Value> {
    let span = balanced_object_span(raw).ok_or(Error::NoStructuredOutput)?;
    serde_json::from_str(span).map_err(|e| Error::MalformedFreeform(e.to_string()))
}

/// Runs the module's extraction strategy and validates the payload.
pub fn extract_and_validate(raw: &str, module: AnalysisModule) -> Result<AnalysisResult> {
    let value = match module {
        AnalysisModule::Contract => strict_json(raw)?,
        AnalysisModule::Scam => lenient_json(raw)?,
    };
    validate_report(value, module)
}

/// Confirms the discriminator matches the requested module, deserializes
/// into the typed union, and enforces the invariants serde cannot express:
/// `overall_risk` within 0..=100 and a non-empty `verdict_text`.
pub fn validate_report(value: Value, module: AnalysisModule) -> Result<AnalysisResult> {
    let tag = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::ShapeMismatch("missing 'type' discriminator".to_string()))?;
    if tag != module.as_str() {
        return Err(Error::ShapeMismatch(format!(
            "discriminator '{tag}' does not match requested module '{}'",
            module.as_str()
        )));
    }

    let report: AnalysisResult =
        serde_json::from_value(value).map_err(|e| Error::ShapeMismatch(e.to_string()))?;

    match &report {
        AnalysisResult::Contract(contract) => {
            if contract.overall_risk > 100 {
                return Err(Error::ShapeMismatch(format!(
                    "overall_risk {} is outside 0-100",
                    contract.overall_risk
                )));
            }
        }
        AnalysisResult::Scam(scam) => {
            if scam.verdict_text.trim().is_empty() {
                return Err(Error::ShapeMismatch(
                    "verdict_text must not be empty".to_string(),
                ));
            }
        }
    }

    Ok(report)
}

/// First balanced `{...}` span in the text. String and escape state is
/// tracked so braces inside string literals do not count toward nesting.
fn balanced_object_span(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in raw[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&raw[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RiskLevel, Verdict};
    use pretty_assertions::assert_eq;

    const CONTRACT_JSON: &str = r#"{
        "type": "contract",
        "summary": "Dos cláusulas de alto riesgo.",
        "overall_risk": 72,
        "ui_translations": {
            "summary_label": "Resumen",
            "risk_score_label": "Puntuación de riesgo",
            "findings_label": "Hallazgos",
            "explanation_label": "Explicación",
            "evidence_label": "Evidencia",
            "advice_label": "Consejo"
        },
        "cards": [
            {
                "id": 1,
                "short_warning": "Renovación automática",
                "risk_level": "High",
                "risk_level_label": "Alto",
                "details": {
                    "plain_english_explanation": "El contrato se renueva solo.",
                    "exact_quote_citation": "This agreement shall renew automatically.",
                    "suggested_fix": "Solicite un aviso de renovación."
                }
            },
            {
                "id": 2,
                "short_warning": "Penalización por cancelación",
                "risk_level": "Medium",
                "risk_level_label": "Medio",
                "details": {
                    "plain_english_explanation": "Cancelar cuesta dinero.",
                    "exact_quote_citation": "Early termination incurs a fee of $500.",
                    "suggested_fix": "Negocie una tarifa menor."
                }
            }
        ]
    }"#;

    const SCAM_JSON: &str = r#"{
        "type": "scam",
        "verdict": "DANGER",
        "verdict_text": "Peligro",
        "headline": "Sitio fraudulento",
        "explanation": "Dominio reciente que imita a un banco.",
        "visual_cues": [
            {"cue": "Logotipo pixelado", "psychology": "Imita una marca confiable"}
        ],
        "ui_translations": {
            "verdict_label": "Veredicto",
            "analysis_label": "Análisis",
            "sources_label": "Fuentes",
            "cues_label": "Señales"
        }
    }"#;

    #[test]
    fn test_strict_parses_exact_json() {
        let value = strict_json(CONTRACT_JSON).unwrap();
        assert_eq!(value["overall_risk"], 72);
    }

    #[test]
    fn test_strict_rejects_fenced_json() {
        let fenced = format!("```json\n{CONTRACT_JSON}\n```");
        assert!(matches!(
            strict_json(&fenced),
            Err(Error::MalformedSchema(_))
        ));
    }

    #[test]
    fn test_lenient_extracts_noise_wrapped_object() {
        let noisy = format!("Sure! Here is the analysis:\n{SCAM_JSON}\nLet me know if...");
        let value = lenient_json(&noisy).unwrap();
        assert_eq!(value["verdict"], "DANGER");
    }

    #[test]
    fn test_lenient_takes_first_balanced_span() {
        let text = r#"noise {"type":"scam"} trailing {"other":1}"#;
        let value = lenient_json(text).unwrap();
        assert_eq!(value, serde_json::json!({"type": "scam"}));
    }

    #[test]
    fn test_lenient_handles_braces_inside_strings() {
        let text = r#"prefix {"headline":"uses } and { freely","verdict":"SAFE"} suffix"#;
        let value = lenient_json(text).unwrap();
        assert_eq!(value["headline"], "uses } and { freely");
    }

    #[test]
    fn test_lenient_handles_escaped_quotes() {
        let text = r#"{"quote":"she said \"hi\" {once}"}"#;
        let value = lenient_json(text).unwrap();
        assert_eq!(value["quote"], "she said \"hi\" {once}");
    }

    #[test]
    fn test_lenient_no_brace_is_no_structured_output() {
        assert!(matches!(
            lenient_json("The site looks legitimate to me."),
            Err(Error::NoStructuredOutput)
        ));
    }

    #[test]
    fn test_lenient_unterminated_object_is_no_structured_output() {
        assert!(matches!(
            lenient_json(r#"{"verdict": "SAFE", "verdict_text": "#),
            Err(Error::NoStructuredOutput)
        ));
    }

    #[test]
    fn test_lenient_balanced_garbage_is_malformed_freeform() {
        assert!(matches!(
            lenient_json("{this is not json at all}"),
            Err(Error::MalformedFreeform(_))
        ));
    }

    #[test]
    fn test_contract_round_trip_preserves_cards() {
        let report = extract_and_validate(CONTRACT_JSON, AnalysisModule::Contract).unwrap();
        let contract = match report {
            AnalysisResult::Contract(c) => c,
            _ => panic!("expected contract report"),
        };

        assert_eq!(contract.overall_risk, 72);
        assert_eq!(contract.summary, "Dos cláusulas de alto riesgo.");
        assert_eq!(contract.cards.len(), 2);
        assert_eq!(contract.cards[0].id, 1);
        assert_eq!(contract.cards[0].risk_level, RiskLevel::High);
        assert_eq!(
            contract.cards[0].details.exact_quote_citation,
            "This agreement shall renew automatically."
        );
        assert_eq!(contract.cards[1].id, 2);
        assert_eq!(contract.cards[1].risk_level, RiskLevel::Medium);
        assert_eq!(contract.ui_translations.advice_label, "Consejo");
    }

    #[test]
    fn test_scam_lenient_path_end_to_end() {
        let noisy = format!("Analysis follows. {SCAM_JSON}");
        let report = extract_and_validate(&noisy, AnalysisModule::Scam).unwrap();
        match report {
            AnalysisResult::Scam(scam) => {
                assert_eq!(scam.verdict, Verdict::Danger);
                assert_eq!(scam.verdict_text, "Peligro");
                assert_eq!(scam.visual_cues.len(), 1);
                assert!(scam.sources.is_none());
            }
            _ => panic!("expected scam report"),
        }
    }

    #[test]
    fn test_discriminator_must_match_requested_module() {
        let value = strict_json(SCAM_JSON).unwrap();
        let err = validate_report(value, AnalysisModule::Contract).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch(_)));
    }

    #[test]
    fn test_missing_discriminator_is_shape_mismatch() {
        let err = validate_report(
            serde_json::json!({"summary": "no tag"}),
            AnalysisModule::Contract,
        )
        .unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch(_)));
    }

    #[test]
    fn test_overall_risk_above_range_is_rejected() {
        let mut value = strict_json(CONTRACT_JSON).unwrap();
        value["overall_risk"] = serde_json::json!(150);
        assert!(matches!(
            validate_report(value, AnalysisModule::Contract),
            Err(Error::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_negative_overall_risk_is_rejected() {
        let mut value = strict_json(CONTRACT_JSON).unwrap();
        value["overall_risk"] = serde_json::json!(-5);
        assert!(matches!(
            validate_report(value, AnalysisModule::Contract),
            Err(Error::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_fractional_overall_risk_is_rejected() {
        let mut value = strict_json(CONTRACT_JSON).unwrap();
        value["overall_risk"] = serde_json::json!(45.5);
        assert!(matches!(
            validate_report(value, AnalysisModule::Contract),
            Err(Error::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_unknown_risk_level_is_rejected() {
        let mut value = strict_json(CONTRACT_JSON).unwrap();
        value["cards"][0]["risk_level"] = serde_json::json!("Severe");
        assert!(matches!(
            validate_report(value, AnalysisModule::Contract),
            Err(Error::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_localized_verdict_token_is_rejected() {
        let mut value = lenient_json(SCAM_JSON).unwrap();
        value["verdict"] = serde_json::json!("PELIGRO");
        assert!(matches!(
            validate_report(value, AnalysisModule::Scam),
            Err(Error::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_empty_verdict_text_is_rejected() {
        let mut value = lenient_json(SCAM_JSON).unwrap();
        value["verdict_text"] = serde_json::json!("  ");
        assert!(matches!(
            validate_report(value, AnalysisModule::Scam),
            Err(Error::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_missing_required_field_is_rejected() {
        let mut value = strict_json(CONTRACT_JSON).unwrap();
        value.as_object_mut().unwrap().remove("summary");
        assert!(matches!(
            validate_report(value, AnalysisModule::Contract),
            Err(Error::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_scam_sources_survive_when_present() {
        let mut value = lenient_json(SCAM_JSON).unwrap();
        value["sources"] = serde_json::json!([
            {"title": "Registro de dominios", "uri": "https://whois.example"}
        ]);
        let report = validate_report(value, AnalysisModule::Scam).unwrap();
        match report {
            AnalysisResult::Scam(scam) => {
                let sources = scam.sources.unwrap();
                assert_eq!(sources.len(), 1);
                assert_eq!(sources[0].title, "Registro de dominios");
            }
            _ => panic!("expected scam report"),
        }
    }

    #[test]
    fn test_contract_strict_path_rejects_prose_wrapping() {
        let noisy = format!("Here you go: {CONTRACT_JSON}");
        assert!(matches!(
            extract_and_validate(&noisy, AnalysisModule::Contract),
            Err(Error::MalformedSchema(_))
        ));
    }
}

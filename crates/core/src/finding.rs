//! Findings returned by the analysis API.
//!
//! The API sends each finding as a flat JSON object: one key naming the measured parameter
//! (for example `"urobilinogen": "Normal"`) next to three fixed text fields. The parameter key
//! varies per entry and new parameters can appear at any time, so it is recovered here into an
//! explicit `parameter`/`value` pair instead of being looked up by position at render time.

use serde::Deserialize;
use serde_json::{Map, Value};

const INTERPRETATION_KEY: &str = "interpretation";
const CLINICAL_SIGNIFICANCE_KEY: &str = "clinical_significance";
const FOLLOW_UP_KEY: &str = "follow_up";

/// One test parameter's result plus its interpretive text.
///
/// Decode-only: the API shape cannot be rebuilt from the explicit pair, so views serialise
/// their own projection instead.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct Finding {
    pub parameter: String,
    pub value: Value,
    pub interpretation: String,
    pub clinical_significance: String,
    pub follow_up: String,
}

impl Finding {
    /// Returns the value as display text.
    ///
    /// Strings are shown bare; any other JSON value is shown as compact JSON.
    pub fn value_text(&self) -> String {
        match &self.value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Returns the heading line shown above the finding's text fields.
    pub fn title(&self) -> String {
        format!("{}: {}", self.parameter, self.value_text())
    }
}

/// Error returned when an API object cannot be read as a finding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FindingError {
    #[error("finding has no parameter field")]
    MissingParameter,
}

impl TryFrom<Map<String, Value>> for Finding {
    type Error = FindingError;

    fn try_from(mut object: Map<String, Value>) -> Result<Self, Self::Error> {
        let interpretation = take_text(&mut object, INTERPRETATION_KEY);
        let clinical_significance = take_text(&mut object, CLINICAL_SIGNIFICANCE_KEY);
        let follow_up = take_text(&mut object, FOLLOW_UP_KEY);

        // Whatever remains first, in document order, names the parameter.
        let (parameter, value) = object
            .into_iter()
            .next()
            .ok_or(FindingError::MissingParameter)?;

        Ok(Self {
            parameter,
            value,
            interpretation,
            clinical_significance,
            follow_up,
        })
    }
}

fn take_text(object: &mut Map<String, Value>, key: &str) -> String {
    match object.shift_remove(key) {
        Some(Value::String(s)) => s,
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parameter_key_is_recovered_as_explicit_pair() {
        let finding: Finding = serde_json::from_value(json!({
            "urobilinogen": "Normal",
            "interpretation": "Within range",
            "clinical_significance": "None",
            "follow_up": "None"
        }))
        .unwrap();

        assert_eq!(finding.parameter, "urobilinogen");
        assert_eq!(finding.value, json!("Normal"));
        assert_eq!(finding.interpretation, "Within range");
        assert_eq!(finding.title(), "urobilinogen: Normal");
    }

    #[test]
    fn parameter_key_may_follow_the_fixed_fields() {
        let finding: Finding = serde_json::from_value(json!({
            "interpretation": "Trace",
            "clinical_significance": "Possible infection",
            "follow_up": "Repeat in one week",
            "leukocytes": "15 cells/uL"
        }))
        .unwrap();

        assert_eq!(finding.parameter, "leukocytes");
        assert_eq!(finding.follow_up, "Repeat in one week");
    }

    #[test]
    fn non_string_values_render_as_json() {
        let finding: Finding = serde_json::from_value(json!({
            "ph": 6.5,
            "interpretation": "Normal",
            "clinical_significance": "None",
            "follow_up": "None"
        }))
        .unwrap();

        assert_eq!(finding.title(), "ph: 6.5");
    }

    #[test]
    fn missing_fixed_fields_decode_as_empty_text() {
        let finding: Finding = serde_json::from_value(json!({ "glucose": "Negative" })).unwrap();
        assert_eq!(finding.interpretation, "");
        assert_eq!(finding.clinical_significance, "");
        assert_eq!(finding.follow_up, "");
    }

    #[test]
    fn object_without_parameter_is_rejected() {
        let err = serde_json::from_value::<Finding>(json!({
            "interpretation": "x",
            "clinical_significance": "y",
            "follow_up": "z"
        }))
        .unwrap_err();
        assert!(err.to_string().contains("finding has no parameter field"));
    }
}

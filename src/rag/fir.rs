//! First Information Report drafting from structured form data.

use crate::config::Prompts;
use crate::error::{NyayError, Result};
use crate::generation::Generator;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};

const NOT_SPECIFIED: &str = "(Not specified)";

/// Structured FIR form data as sent by the frontend.
///
/// Every field is optional. Scalar JSON values are accepted as text so a
/// form that posts `"dist": 12` still renders.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirData {
    #[serde(default)]
    pub incident: Option<Incident>,
    #[serde(default)]
    pub complainant: Option<Complainant>,
    #[serde(default)]
    pub accused: Option<Accused>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub ai_analysis: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub crime_description: Option<String>,
}

/// Where and when the incident happened.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Incident {
    /// Police station.
    #[serde(default, deserialize_with = "lenient_string")]
    pub ps: Option<String>,
    /// District.
    #[serde(default, deserialize_with = "lenient_string")]
    pub dist: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub time: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub place: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Complainant {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub guardian: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Accused {
    #[serde(default, deserialize_with = "lenient_string")]
    pub details: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub witnesses: Option<String>,
}

/// Key under which the frontend nests the FIR form.
const ENVELOPE_KEY: &str = "firData";

impl FirData {
    /// Read a FIR request body: either `{"firData": {...}}` or the FIR
    /// object itself.
    ///
    /// A body that carries `firData` is only ever read through it, so a
    /// malformed form is rejected instead of drafted from defaults.
    pub fn from_request(body: Value) -> Result<Self> {
        let Value::Object(mut map) = body else {
            return Err(NyayError::InvalidInput(
                "FIR request body must be a JSON object".to_string(),
            ));
        };

        let data = match map.remove(ENVELOPE_KEY) {
            Some(inner @ Value::Object(_)) => serde_json::from_value(inner),
            Some(other) => {
                return Err(NyayError::InvalidInput(format!(
                    "{} must be an object, got {}",
                    ENVELOPE_KEY, other
                )))
            }
            None => serde_json::from_value(Value::Object(map)),
        };

        data.map_err(|e| NyayError::InvalidInput(format!("Invalid FIR data: {}", e)))
    }
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

fn or_default(value: Option<&String>, default: &str) -> String {
    value.cloned().unwrap_or_else(|| default.to_string())
}

impl FirData {
    /// Template variables with the defaults applied for missing fields.
    pub fn template_vars(&self) -> HashMap<String, String> {
        let incident = self.incident.clone().unwrap_or_default();
        let complainant = self.complainant.clone().unwrap_or_default();
        let accused = self.accused.clone().unwrap_or_default();

        let pairs = [
            ("police_station", or_default(incident.ps.as_ref(), NOT_SPECIFIED)),
            ("district", or_default(incident.dist.as_ref(), NOT_SPECIFIED)),
            ("complainant_name", or_default(complainant.name.as_ref(), "")),
            ("complainant_guardian", or_default(complainant.guardian.as_ref(), "")),
            ("complainant_address", or_default(complainant.address.as_ref(), "")),
            ("date", or_default(incident.date.as_ref(), "")),
            ("time", or_default(incident.time.as_ref(), "")),
            ("place", or_default(incident.place.as_ref(), "")),
            ("ai_analysis", or_default(self.ai_analysis.as_ref(), "")),
            ("accused_details", or_default(accused.details.as_ref(), "Unknown")),
            ("witness_details", or_default(accused.witnesses.as_ref(), "None")),
            ("crime_description", or_default(self.crime_description.as_ref(), "")),
        ];

        pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }
}

/// Drafts FIR text with the generator.
pub struct FirDrafter {
    generator: Arc<dyn Generator>,
    prompts: Prompts,
}

impl FirDrafter {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self {
            generator,
            prompts: Prompts::default(),
        }
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn render_prompt(&self, data: &FirData) -> String {
        self.prompts
            .render_with_custom(&self.prompts.fir.template, &data.template_vars())
    }

    #[instrument(skip_all)]
    pub async fn draft(&self, data: &FirData) -> Result<String> {
        info!("Generating FIR text with {}", self.generator.model());
        let prompt = self.render_prompt(data);
        let text = self.generator.generate(&prompt).await?;
        info!("FIR text generated successfully");
        Ok(text)
    }
}

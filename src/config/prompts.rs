//! Prompt templates for Nyay.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Prompts {
    pub analysis: AnalysisPrompts,
    pub fir: FirPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Prompt for legal section analysis.
///
/// Variables: `{{context}}`, `{{query}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisPrompts {
    pub template: String,
}

impl Default for AnalysisPrompts {
    fn default() -> Self {
        Self {
            template: "You are an expert legal assistant. Based ONLY on the context below, analyze the user's query and list the potential legal sections that apply. Explain why each section is relevant.\n\nCONTEXT:\n{{context}}\n\nUSER QUERY:\n{{query}}\n\nANALYSIS:".to_string(),
        }
    }
}

/// Prompt for drafting a First Information Report.
///
/// Variables: `{{police_station}}`, `{{district}}`, `{{complainant_name}}`,
/// `{{complainant_guardian}}`, `{{complainant_address}}`, `{{date}}`,
/// `{{time}}`, `{{place}}`, `{{ai_analysis}}`, `{{accused_details}}`,
/// `{{witness_details}}`, `{{crime_description}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FirPrompts {
    pub template: String,
}

impl Default for FirPrompts {
    fn default() -> Self {
        Self {
            template: r#"
You are a police officer in India writing a First Information Report (FIR).
Your task is to take the structured information below and write a formal, clear, and concise FIR document.
Combine the 'Complaint Details' with the other data points to create a coherent narrative.
The final output should be the complete, formatted FIR text.

--- STRUCTURED DATA ---
- Police Station: {{police_station}}
- District: {{district}}
- Complainant Name: {{complainant_name}}
- Complainant Guardian: {{complainant_guardian}}
- Complainant Address: {{complainant_address}}
- Date of Occurrence: {{date}}
- Time of Occurrence: {{time}}
- Place of Occurrence: {{place}}
- Initial AI Analysis of Offenses: {{ai_analysis}}
- Accused Details: {{accused_details}}
- Witness Details: {{witness_details}}
- Complaint Details (Narrative): {{crime_description}}
---

Generate the complete FIR document based on this data.
"#
            .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let analysis_path = custom_path.join("analysis.toml");
            if analysis_path.exists() {
                let content = std::fs::read_to_string(&analysis_path)?;
                prompts.analysis = toml::from_str(&content)?;
            }

            let fir_path = custom_path.join("fir.toml");
            if fir_path.exists() {
                let content = std::fs::read_to_string(&fir_path)?;
                prompts.fir = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    ///
    /// Substitution is single-pass, so placeholders that appear inside a
    /// value (e.g. a user query containing `{{context}}`) are left alone.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find("{{") {
            let Some(len) = rest[start + 2..].find("}}") else {
                break;
            };
            let key = &rest[start + 2..start + 2 + len];

            result.push_str(&rest[..start]);
            match vars.get(key.trim()) {
                Some(value) => result.push_str(value),
                None => result.push_str(&rest[start..start + 4 + len]),
            }
            rest = &rest[start + 4 + len..];
        }

        result.push_str(rest);
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(prompts.analysis.template.contains("{{context}}"));
        assert!(prompts.analysis.template.ends_with("ANALYSIS:"));
        assert!(prompts.fir.template.contains("{{crime_description}}"));
    }

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} messages.";
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Alice, you have 5 messages.");
    }

    #[test]
    fn test_render_does_not_expand_values() {
        let mut vars = HashMap::new();
        vars.insert("query".to_string(), "what is {{context}}?".to_string());
        vars.insert("context".to_string(), "SECRET".to_string());

        let result = Prompts::render("Q: {{query}}", &vars);
        assert_eq!(result, "Q: what is {{context}}?");
    }

    #[test]
    fn test_render_keeps_unknown_placeholders() {
        let result = Prompts::render("a {{missing}} b {{", &HashMap::new());
        assert_eq!(result, "a {{missing}} b {{");
    }

    #[test]
    fn test_custom_variables_are_overridden_by_call_site() {
        let mut custom = HashMap::new();
        custom.insert("state".to_string(), "Kerala".to_string());
        custom.insert("query".to_string(), "ignored".to_string());
        let prompts = Prompts::load(None, Some(&custom)).unwrap();

        let mut vars = HashMap::new();
        vars.insert("query".to_string(), "theft".to_string());

        let result = prompts.render_with_custom("{{state}}: {{query}}", &vars);
        assert_eq!(result, "Kerala: theft");
    }

    #[test]
    fn test_load_custom_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("analysis.toml"),
            "template = \"Sections for {{query}}:\\n{{context}}\"\n",
        )
        .unwrap();

        let prompts = Prompts::load(dir.path().to_str(), None).unwrap();
        assert_eq!(prompts.analysis.template, "Sections for {{query}}:\n{{context}}");
        assert!(prompts.fir.template.contains("First Information Report"));
    }
}

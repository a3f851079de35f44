#[cfg(test)]
#[path = "correction_test.rs"]
mod tests;

use anyhow::bail;
use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::domain::models::BackendBox;
use crate::domain::models::BackendPrompt;

pub const FALLBACK_PROMPTS: &[&str] = &[
    "Show caffeine",
    "Find human insulin protein",
    "Fold MKTAYIAKQRQISFVKSHFSRQLEERLGLIEVQ",
    "Display 1CRN",
    "Visualize aspirin 3D structure",
];

const MAX_PROMPTS: usize = 5;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NameCorrection {
    #[serde(default)]
    corrected_name: String,
    #[serde(default)]
    reasoning: String,
}

#[derive(Debug, Deserialize)]
struct PromptSuggestions {
    #[serde(default)]
    prompts: Vec<String>,
}

fn correction_prompt(name: &str) -> BackendPrompt {
    let mut prompt = BackendPrompt::new(format!(
        r#"You are a molecular biology expert. Analyze this user query and extract or correct the molecule or protein name for database searching.

User input: "{name}"

Common corrections needed:
- Fix spelling errors (e.g., "caffiene" to "caffeine")
- Standardize names (e.g., "acetylsalicylic acid" to "aspirin")
- Extract the actual molecule or protein name from conversational text
- Use common database names

Return the best search term for PDB and PubChem databases."#
    ));
    prompt.expect_json(r#"{"correctedName": "string", "reasoning": "string"}"#);

    return prompt;
}

fn suggestion_prompt() -> BackendPrompt {
    let mut prompt = BackendPrompt::new(format!(
        r#"You are an assistant suggesting example prompts for a bioinformatics chat application called BioCopilot.
The application finds small molecules in PubChem, finds protein structures in the RCSB PDB, and predicts protein structures from amino acid sequences.

Suggest the top {MAX_PROMPTS} diverse example prompts that showcase these capabilities. Keep them clear, concise, and easy for new users to understand. Cover:

* Visualizing small molecules
* Finding protein structures
* Predicting protein structures from a sequence"#
    ));
    prompt.expect_json(r#"{"prompts": ["Show caffeine", "Fold MKTAYIAKQRQISFVKSHFSRQLEERLGLIEVQ"]}"#);

    return prompt;
}

/// Parses a model answer as JSON, tolerating markdown fences and chatter
/// around the object.
pub fn parse_json_answer<T: DeserializeOwned>(text: &str) -> Result<T> {
    let start = text.find('{');
    let end = text.rfind('}');
    let (Some(start), Some(end)) = (start, end) else {
        bail!("Model answer did not contain a JSON object");
    };
    if end < start {
        bail!("Model answer did not contain a JSON object");
    }

    return Ok(serde_json::from_str::<T>(&text[start..=end])?);
}

/// Canonical database search term for a name. Falls back to the input
/// whenever the backend is missing or its answer is unusable.
pub async fn correct_name(backend: Option<&BackendBox>, name: &str) -> String {
    let Some(backend) = backend else {
        return name.to_string();
    };

    let res = backend.get_completion(correction_prompt(name)).await;
    let answer = match res {
        Ok(answer) => answer,
        Err(err) => {
            tracing::error!(error = ?err, name, "Name correction failed");
            return name.to_string();
        }
    };

    let correction = match parse_json_answer::<NameCorrection>(&answer.text) {
        Ok(correction) => correction,
        Err(err) => {
            tracing::error!(error = ?err, name, "Name correction answer was not usable");
            return name.to_string();
        }
    };

    let corrected = correction.corrected_name.trim();
    if corrected.is_empty() {
        return name.to_string();
    }

    tracing::debug!(
        name,
        corrected,
        reasoning = correction.reasoning.as_str(),
        "Name corrected"
    );

    return corrected.to_string();
}

fn fallback_prompts() -> Vec<String> {
    return FALLBACK_PROMPTS
        .iter()
        .map(|e| return e.to_string())
        .collect();
}

/// Example prompts for new users, from the backend when possible.
pub async fn suggest_prompts(backend: Option<&BackendBox>) -> Vec<String> {
    let Some(backend) = backend else {
        return fallback_prompts();
    };

    let suggestions = match backend.get_completion(suggestion_prompt()).await {
        Ok(answer) => parse_json_answer::<PromptSuggestions>(&answer.text),
        Err(err) => Err(err),
    };

    match suggestions {
        Ok(suggestions) => {
            let prompts = suggestions
                .prompts
                .into_iter()
                .map(|e| return e.trim().to_string())
                .filter(|e| return !e.is_empty())
                .take(MAX_PROMPTS)
                .collect::<Vec<String>>();

            if prompts.is_empty() {
                return fallback_prompts();
            }

            return prompts;
        }
        Err(err) => {
            tracing::error!(error = ?err, "Prompt suggestion failed");
            return fallback_prompts();
        }
    }
}

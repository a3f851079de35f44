#[cfg(test)]
#[path = "actions_test.rs"]
mod tests;

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;

use super::correction::suggest_prompts;
use super::AppContext;
use super::Orchestrator;
use crate::configuration::ConfigKey;
use crate::domain::models::Action;
use crate::domain::models::Event;

pub fn help_text() -> String {
    let text = r#"
COMMANDS:
- /modellist (/ml) - Lists all available models from the language model backend.
- /model (/m) [MODEL_NAME,MODEL_INDEX] - Sets the specified model as the active model. You can pass either the model name, or the index from /modellist
- /new (/n) - Starts a new chat session.
- /sessions (/s) - Lists all chat sessions, most recently modified first.
- /switch (/sw) [SESSION_INDEX] - Switches to a session from /sessions.
- /rename (/rn) [TITLE] - Renames the active session. An empty title resets it.
- /delete (/d) [SESSION_INDEX?] - Deletes a session from /sessions, or the active one.
- /export [PATH] - Writes the active session as JSON to a file.
- /import [PATH] - Loads a session from a JSON file and switches to it.
- /layers (/l) - Lists the visualization layers of the active session.
- /layer (/ly) [LAYER_INDEX] - Makes a layer from /layers the active one.
- /rmlayer (/rl) [LAYER_INDEX] - Removes a layer from /layers.
- /show [LAYER_INDEX?] - Prints details of a layer, or the active one.
- /profile (/p) - Shows your display name and estimated GPU usage.
- /name [NAME] - Sets your display name. An empty name resets it.
- /resetgpu - Resets the estimated GPU usage.
- /prompts - Suggests example prompts.
- /quit /exit (/q) - Exit BioCopilot.
- /help (/h) - Provides this help menu.

EXAMPLES:
- Show caffeine - Loads a molecule from PubChem.
- Display 1CRN - Loads a protein entry from the RCSB PDB.
- Fold MKTAYIAKQRQISFVKSHFSRQLEERLGLIEVQ - Predicts a structure from an amino acid sequence.
        "#;

    return text.trim().to_string();
}

fn notice(tx: &mpsc::UnboundedSender<Event>, text: &str) -> Result<()> {
    tx.send(Event::Notice(text.to_string()))?;
    return Ok(());
}

async fn sorted_models(context: &AppContext) -> Result<Option<Vec<String>>> {
    let Some(backend) = context.backend() else {
        return Ok(None);
    };

    let mut models = backend.list_models().await?;
    models.sort();

    return Ok(Some(models));
}

fn no_backend(tx: &mpsc::UnboundedSender<Event>) -> Result<()> {
    return notice(
        tx,
        "No language model backend is configured. Start BioCopilot with --backend to enable models.",
    );
}

async fn model_list(context: &AppContext, tx: &mpsc::UnboundedSender<Event>) -> Result<()> {
    let Some(models) = sorted_models(context).await? else {
        return no_backend(tx);
    };

    let res = models
        .iter()
        .enumerate()
        .map(|(idx, model)| {
            let n = idx + 1;
            return format!("- ({n}) {model}");
        })
        .collect::<Vec<String>>();

    return notice(tx, &res.join("\n"));
}

async fn model_set(
    context: &AppContext,
    tx: &mpsc::UnboundedSender<Event>,
    text: &str,
) -> Result<()> {
    let mut model_name = text.trim().to_string();
    if model_name.is_empty() {
        return notice(
            tx,
            "You must specify a model name with `/model` or `/m`. Run `/help` for more details.",
        );
    }

    let Some(models) = sorted_models(context).await? else {
        return no_backend(tx);
    };

    if let Ok(idx) = model_name.parse::<usize>() {
        if idx < 1 || idx > models.len() {
            return notice(
                tx,
                &format!("{idx} is not a valid index from the model list."),
            );
        }
        model_name = models[idx - 1].to_string();
    }

    if !models.contains(&model_name) {
        let backend_name = context.config.get(ConfigKey::Backend);
        return notice(
            tx,
            &format!(
                "No model named {model_name} found in backend {backend_name}. Did you mistype it?"
            ),
        );
    }

    context.config.set(ConfigKey::Model, &model_name);
    context.reload_backend()?;

    return notice(tx, &format!("{model_name} has entered the chat."));
}

fn worker_error(err: anyhow::Error, tx: &mpsc::UnboundedSender<Event>) -> Result<()> {
    return notice(
        tx,
        &format!("The backend failed with the following error: {err:?}"),
    );
}

pub struct ActionsService {}

impl ActionsService {
    /// Consumes actions until the sending side closes. Chat commands and
    /// prompt suggestions run as their own tasks so they can overlap.
    pub async fn start(
        context: Arc<AppContext>,
        tx: mpsc::UnboundedSender<Event>,
        rx: &mut mpsc::UnboundedReceiver<Action>,
    ) -> Result<()> {
        while let Some(action) = rx.recv().await {
            match action {
                Action::Command(text) => {
                    let orchestrator = Orchestrator::new(context.clone(), tx.clone());
                    tokio::spawn(async move {
                        if let Err(err) = orchestrator.handle_command(&text).await {
                            tracing::error!(error = ?err, "Command task stopped");
                        }
                    });
                }
                Action::ModelList() => {
                    if let Err(err) = model_list(&context, &tx).await {
                        worker_error(err, &tx)?;
                    }
                }
                Action::ModelSet(text) => {
                    if let Err(err) = model_set(&context, &tx, &text).await {
                        worker_error(err, &tx)?;
                    }
                }
                Action::SuggestPrompts() => {
                    let worker_context = context.clone();
                    let worker_tx = tx.clone();
                    tokio::spawn(async move {
                        let backend = worker_context.backend();
                        let prompts = suggest_prompts(backend.as_deref()).await;
                        if worker_tx.send(Event::PromptsSuggested(prompts)).is_err() {
                            tracing::debug!("Prompt suggestions arrived after shutdown");
                        }
                    });
                }
            }
        }

        return Ok(());
    }
}

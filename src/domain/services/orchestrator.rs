#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod tests;

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;

use super::AppContext;
use crate::domain::models::classify;
use crate::domain::models::is_valid_pdb;
use crate::domain::models::mean_plddt;
use crate::domain::models::pdb_title;
use crate::domain::models::rcsb_page_url;
use crate::domain::models::subject_of;
use crate::domain::models::Event;
use crate::domain::models::ExternalId;
use crate::domain::models::IntentTag;
use crate::domain::models::LayerPatch;
use crate::domain::models::LayerType;
use crate::domain::models::MessageContent;
use crate::domain::models::MessagePatch;
use crate::domain::models::NewLayer;
use crate::domain::models::NewMessage;
use crate::domain::models::ResponderName;
use crate::domain::models::StructureFormat;
use crate::domain::models::StructurePayload;

const GPU_SECONDS_PER_RESIDUE: f64 = 0.1;
const MAX_ERROR_DETAIL_LENGTH: usize = 200;
const AI_SERVICE_MARKERS: &[&str] = &[
    "API key",
    "Quota",
    "model not found",
    "GenerateContentRequest",
    "GoogleGenerativeAI Error",
];

pub const NO_SEQUENCE_TEXT: &str =
    "No valid sequence or protein ID found for structure prediction.";
pub const NO_STRUCTURE_TEXT: &str = "No structure found";

/// Simulated compute cost of a prediction, rounded to whole seconds.
pub fn estimate_gpu_seconds(sequence: &str) -> f64 {
    return (sequence.len() as f64 * GPU_SECONDS_PER_RESIDUE)
        .round()
        .max(1.0);
}

/// User-facing explanation for a failed command.
pub fn describe_error(err: &anyhow::Error) -> String {
    let message = format!("{err:#}");
    if AI_SERVICE_MARKERS
        .iter()
        .any(|marker| return message.contains(marker))
    {
        return format!(
            "AI service error: {message}. Please check your API key, service configuration, and tool schemas."
        );
    }

    let mut text =
        "Sorry, I encountered an error trying to understand or execute your command.".to_string();
    if message.len() < MAX_ERROR_DETAIL_LENGTH {
        text += &format!(" Details: {message}");
    }

    return text;
}

pub fn not_found_text(name: &str) -> String {
    return format!(
        r#"I couldn't find 3D structure data for "{name}". This could be because the structure isn't available in PDB or PubChem databases, or there was an issue with the search. Try searching for common molecules like "caffeine", "aspirin", or proteins like "insulin"."#
    );
}

fn prefix(text: &str, len: usize) -> String {
    return text.chars().take(len).collect();
}

/// Ids of everything a single command writes to. Updates stay keyed by them
/// even when the user switches sessions mid-flight.
struct Turn {
    session_id: String,
    prompt_message_id: String,
    message_id: String,
    layer_id: Option<String>,
}

/// Answers chat commands by driving the resolver, structure prediction, or
/// the workflow webhook, and records the outcome in the chat session.
pub struct Orchestrator {
    context: Arc<AppContext>,
    tx: mpsc::UnboundedSender<Event>,
}

impl Orchestrator {
    pub fn new(context: Arc<AppContext>, tx: mpsc::UnboundedSender<Event>) -> Orchestrator {
        return Orchestrator { context, tx };
    }

    /// Runs one command to completion. Failures are written to the chat as
    /// the assistant's answer; only a closed event channel is returned.
    pub async fn handle_command(&self, command: &str) -> Result<()> {
        let command = command.trim();
        if command.is_empty() {
            return Ok(());
        }

        let mut turn = self.begin(command).await?;
        let res = match self.context.responder() {
            ResponderName::Workflow => self.forward(&mut turn, command).await,
            ResponderName::Assistant => {
                let intent = classify(command);
                tracing::debug!(command, intent = %intent.tag, "Classified command");
                if intent.tag == IntentTag::FoldSequence {
                    self.fold(&mut turn, intent.sequence.as_deref()).await
                } else {
                    self.lookup(&mut turn, command, intent.tag).await
                }
            }
        };

        if let Err(err) = res {
            tracing::error!(error = ?err, command, "Command failed");
            let text = describe_error(&err);
            self.patch_pending(&turn, LayerPatch::error(&text)).await?;
            self.finish(&turn, MessageContent::from(text), None).await?;
        }

        return Ok(());
    }

    async fn begin(&self, command: &str) -> Result<Turn> {
        let (session_id, prompt, placeholder) = {
            let mut chats = self.context.chats.lock().await;
            let session_id = chats.ensure_active_session();
            let prompt = chats.append_message(NewMessage::user(command));
            let placeholder = chats.append_message_in(&session_id, NewMessage::placeholder());
            (session_id, prompt, placeholder)
        };

        let prompt_message_id = prompt.map(|e| return e.id).unwrap_or_default();
        let message_id = placeholder.map(|e| return e.id).unwrap_or_default();
        for id in [&prompt_message_id, &message_id] {
            self.tx.send(Event::MessageUpdated {
                session_id: session_id.to_string(),
                message_id: id.to_string(),
            })?;
        }

        return Ok(Turn {
            session_id,
            prompt_message_id,
            message_id,
            layer_id: None,
        });
    }

    async fn fold(&self, turn: &mut Turn, sequence: Option<&str>) -> Result<()> {
        let Some(sequence) = sequence else {
            return self
                .finish(turn, MessageContent::from(NO_SEQUENCE_TEXT), None)
                .await;
        };

        self.add_pending(
            turn,
            &format!("Loading structure for {}...", prefix(sequence, 10)),
            LayerType::ProteinFold,
        )
        .await?;
        self.update_message(
            turn,
            MessagePatch {
                content: Some(MessageContent::from(format!(
                    "Predicting structure for {}... (this may take a moment)",
                    prefix(sequence, 15)
                ))),
                ..MessagePatch::default()
            },
        )
        .await?;

        let Some(pdb) = self.context.esmfold.fold(sequence).await? else {
            self.patch_pending(
                turn,
                LayerPatch::error(&format!("Failed to predict structure for {sequence}.")),
            )
            .await?;
            let text = format!("Could not predict structure for {sequence}. The model might not support this sequence or an error occurred.");
            return self.finish(turn, MessageContent::from(text), None).await;
        };

        let confidence = mean_plddt(&pdb);
        let gpu_seconds = estimate_gpu_seconds(sequence);
        self.context.profiles.lock().await.add_gpu_usage(gpu_seconds);

        let plddt = confidence
            .map(|e| return format!("{e:.2}"))
            .unwrap_or_else(|| return "N/A".to_string());
        let text = format!(
            "Predicted structure for sequence (pLDDT: {plddt}). View in visualizer.\nEstimated GPU time: {gpu_seconds:.0}s."
        );

        let layer = NewLayer {
            confidence,
            ..NewLayer::loaded(
                &turn.prompt_message_id,
                &format!("Folded: {}...", prefix(sequence, 10)),
                LayerType::ProteinFold,
                pdb,
            )
        };
        let layer_id = self.settle_layer(turn, layer).await?;

        return self.finish(turn, MessageContent::from(text), layer_id).await;
    }

    async fn lookup(&self, turn: &mut Turn, command: &str, tag: IntentTag) -> Result<()> {
        let subject = subject_of(command);
        match tag {
            IntentTag::VisualizeMolecule => {
                self.add_pending(turn, &format!("Loading {subject}..."), LayerType::Molecule3d)
                    .await?;
            }
            IntentTag::VisualizeProtein => {
                self.add_pending(turn, &format!("Loading {subject}..."), LayerType::Protein3d)
                    .await?;
            }
            IntentTag::FoldSequence | IntentTag::Chat => {}
        }

        let backend = self.context.backend();
        let lookup = self.context.resolver.resolve(command, backend.as_deref()).await;
        let payload = if lookup.is_found() {
            self.context.resolver.fetch(&lookup).await?
        } else {
            None
        };

        let Some(payload) = payload else {
            self.patch_pending(turn, LayerPatch::error(NO_STRUCTURE_TEXT))
                .await?;
            let text = not_found_text(&lookup.resolved_name);
            return self.finish(turn, MessageContent::from(text), None).await;
        };

        let note = if lookup.was_corrected() {
            format!(" (corrected from \"{}\")", lookup.original_name)
        } else {
            "".to_string()
        };
        let (kind, suffix) = match payload.format {
            StructureFormat::Sdf => ("molecule", "3D"),
            StructureFormat::Pdb => ("protein", "PDB"),
        };
        let text = format!(
            "Found {} {kind} structure{note}! This {kind} is now loaded in the 3D viewer.",
            payload.name
        );

        let layer_name = format!("{} ({suffix})", payload.name);
        let layer = self.loaded_layer(turn, &layer_name, payload);
        let layer_id = self.settle_layer(turn, layer).await?;

        return self.finish(turn, MessageContent::from(text), layer_id).await;
    }

    async fn forward(&self, turn: &mut Turn, command: &str) -> Result<()> {
        let reply = self.context.workflow.send(command, &turn.session_id).await?;
        let content = reply.content();

        let Some(update) = reply.canvas_update() else {
            return self.finish(turn, content, None).await;
        };

        self.add_pending(
            turn,
            &format!("Loading {}...", update.pdb_id),
            LayerType::Protein3d,
        )
        .await?;

        let inline = update.data.filter(|e| return is_valid_pdb(e));
        let payload = match inline {
            Some(data) => Some(StructurePayload {
                format: StructureFormat::Pdb,
                name: update.pdb_id.to_string(),
                title: pdb_title(&data),
                data,
                external_id: ExternalId::Pdb(update.pdb_id.to_string()),
                page_url: update
                    .url
                    .clone()
                    .unwrap_or_else(|| return rcsb_page_url(&update.pdb_id)),
            }),
            None => match self.context.resolver.fetch_pdb_entry(&update.pdb_id).await {
                Ok(payload) => payload,
                Err(err) => {
                    tracing::error!(error = ?err, pdb_id = update.pdb_id.as_str(), "Canvas update download failed");
                    None
                }
            },
        };

        let Some(payload) = payload else {
            self.patch_pending(
                turn,
                LayerPatch::error(&format!("Could not load structure {}.", update.pdb_id)),
            )
            .await?;
            return self.finish(turn, content, None).await;
        };

        let name = update.name.clone().unwrap_or_else(|| return payload.name.to_string());
        let layer_name = format!("{name} (PDB)");
        let layer = self.loaded_layer(turn, &layer_name, payload);
        let layer_id = self.settle_layer(turn, layer).await?;

        return self.finish(turn, content, layer_id).await;
    }

    fn loaded_layer(&self, turn: &Turn, name: &str, payload: StructurePayload) -> NewLayer {
        return NewLayer {
            external_id: Some(payload.external_id),
            external_url: Some(payload.page_url),
            ..NewLayer::loaded(
                &turn.prompt_message_id,
                name,
                LayerType::for_format(payload.format),
                payload.data,
            )
        };
    }

    async fn add_pending(&self, turn: &mut Turn, name: &str, layer_type: LayerType) -> Result<()> {
        let layer = self.context.chats.lock().await.add_layer_in(
            &turn.session_id,
            NewLayer::pending(&turn.prompt_message_id, name, layer_type),
        );

        if let Some(layer) = layer {
            self.tx.send(Event::LayerUpdated {
                session_id: turn.session_id.to_string(),
                layer_id: layer.layer_id.to_string(),
            })?;
            turn.layer_id = Some(layer.layer_id);
        }

        return Ok(());
    }

    async fn patch_pending(&self, turn: &Turn, patch: LayerPatch) -> Result<()> {
        let Some(layer_id) = &turn.layer_id else {
            return Ok(());
        };

        let patched = self
            .context
            .chats
            .lock()
            .await
            .patch_layer_in(&turn.session_id, layer_id, patch);
        if patched {
            self.tx.send(Event::LayerUpdated {
                session_id: turn.session_id.to_string(),
                layer_id: layer_id.to_string(),
            })?;
        }

        return Ok(());
    }

    /// Settles the pending layer with the loaded structure, or adds a new
    /// layer when none was pending. The layer becomes the active one.
    async fn settle_layer(&self, turn: &Turn, layer: NewLayer) -> Result<Option<String>> {
        let layer_id = {
            let mut chats = self.context.chats.lock().await;
            match &turn.layer_id {
                Some(layer_id)
                    if chats.patch_layer_in(&turn.session_id, layer_id, LayerPatch::from(layer.clone())) =>
                {
                    chats.set_active_layer_in(&turn.session_id, Some(layer_id));
                    Some(layer_id.to_string())
                }
                _ => chats
                    .add_layer_in(&turn.session_id, layer)
                    .map(|e| return e.layer_id),
            }
        };

        if let Some(layer_id) = &layer_id {
            self.tx.send(Event::LayerUpdated {
                session_id: turn.session_id.to_string(),
                layer_id: layer_id.to_string(),
            })?;
        }

        return Ok(layer_id);
    }

    async fn update_message(&self, turn: &Turn, patch: MessagePatch) -> Result<()> {
        let patched = self
            .context
            .chats
            .lock()
            .await
            .patch_message_in(&turn.session_id, &turn.message_id, patch);
        if patched {
            self.tx.send(Event::MessageUpdated {
                session_id: turn.session_id.to_string(),
                message_id: turn.message_id.to_string(),
            })?;
        }

        return Ok(());
    }

    async fn finish(
        &self,
        turn: &Turn,
        content: MessageContent,
        layer_id: Option<String>,
    ) -> Result<()> {
        let patch = MessagePatch {
            visualization_layer_id: layer_id,
            ..MessagePatch::finalize(content)
        };

        return self.update_message(turn, patch).await;
    }
}

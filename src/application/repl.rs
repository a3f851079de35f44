#[cfg(test)]
#[path = "repl_test.rs"]
mod tests;

use std::sync::Arc;

use anyhow::bail;
use anyhow::Result;
use tokio::io::AsyncBufReadExt;
use tokio::io::BufReader;
use tokio::sync::mpsc;
use yansi::Paint;

use crate::configuration::ConfigKey;
use crate::domain::models::format_gpu_time;
use crate::domain::models::protein_sequence;
use crate::domain::models::Action;
use crate::domain::models::ChatSession;
use crate::domain::models::Event;
use crate::domain::models::LayerStatus;
use crate::domain::models::LayerType;
use crate::domain::models::Message;
use crate::domain::models::Profile;
use crate::domain::models::Sender;
use crate::domain::models::SlashCommand;
use crate::domain::models::VisualizationLayer;
use crate::domain::services::actions::help_text;
use crate::domain::services::AppContext;

const PREVIEW_LENGTH: usize = 70;

/// What the REPL does after a line of input.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    Quit,
    Output(String),
    Dispatched,
}

fn preview(text: &str) -> String {
    let line = text.lines().next().unwrap_or_default();
    if line.chars().count() >= PREVIEW_LENGTH {
        let cut = line.chars().take(PREVIEW_LENGTH - 3).collect::<String>();
        return format!("{cut}...");
    }

    return line.to_string();
}

pub fn format_session(idx: usize, session: &ChatSession, active: bool) -> String {
    let marker = if active { "*" } else { " " };
    let mut res = format!(
        "{marker} ({}) {}, Modified: {}, Messages: {}, Layers: {}",
        idx + 1,
        session.title,
        session.last_modified_at.format("%Y-%m-%d %H:%M"),
        session.chat_history.len(),
        session.visualization_layers.len()
    );

    if let Some(first) = session.chat_history.first() {
        res = format!("{res}, {}", preview(&first.content.to_string()));
    }

    return res;
}

pub fn format_layer(idx: usize, layer: &VisualizationLayer, active: bool) -> String {
    let marker = if active { "*" } else { " " };
    return format!(
        "{marker} ({}) {} [{}] {}",
        idx + 1,
        layer.name,
        layer.layer_type,
        layer.status
    );
}

/// Multi-line description of a layer, including the chain sequence of
/// protein structures.
pub fn describe_layer(layer: &VisualizationLayer) -> String {
    let mut lines = vec![
        format!("Name: {}", layer.name),
        format!("Type: {}", layer.layer_type),
        format!("Status: {}", layer.status),
    ];

    if let Some(external_id) = &layer.external_id {
        lines.push(format!("ID: {external_id}"));
    }
    if let Some(external_url) = &layer.external_url {
        lines.push(format!("Link: {external_url}"));
    }
    if let Some(confidence) = layer.confidence {
        lines.push(format!("pLDDT: {confidence:.2}"));
    }

    match (&layer.status, &layer.data) {
        (LayerStatus::Error, Some(reason)) => lines.push(format!("Error: {reason}")),
        (LayerStatus::Loaded, Some(data)) => {
            lines.push(format!("Data: {} lines", data.lines().count()));
            if matches!(layer.layer_type, LayerType::Protein3d | LayerType::ProteinFold) {
                let sequence = protein_sequence(data);
                if !sequence.is_empty() {
                    lines.push(format!("Sequence: {sequence}"));
                }
            }
        }
        _ => {}
    }

    return lines.join("\n");
}

pub fn format_profile(profile: &Profile) -> String {
    return format!(
        "Name: {}\nEstimated GPU usage: {}",
        profile.display_name,
        format_gpu_time(profile.estimated_gpu_usage)
    );
}

pub fn format_message(message: &Message, display_name: &str) -> String {
    let author = match message.sender {
        Sender::User => display_name.to_string(),
        Sender::Assistant => "BioCopilot".to_string(),
    };
    let content = message.content.to_string();
    if message.is_loading() && content.is_empty() {
        return format!("{author}: ...");
    }

    return format!("{author}: {content}");
}

async fn transcript(context: &AppContext) -> String {
    let display_name = context
        .profiles
        .lock()
        .await
        .profile()
        .display_name
        .to_string();
    let chats = context.chats.lock().await;
    let Some(session) = chats.active_session() else {
        return "No active session.".to_string();
    };

    let mut lines = vec![format!("Switched to {}.", session.title)];
    lines.extend(
        session
            .chat_history
            .iter()
            .map(|message| return format_message(message, &display_name)),
    );

    return lines.join("\n");
}

fn session_at(sessions: &[ChatSession], command: &SlashCommand) -> Result<String> {
    let Some(idx) = command.index_arg() else {
        bail!("Pass a session number from /sessions.");
    };
    let Some(session) = sessions.get(idx - 1) else {
        bail!(format!("{idx} is not a valid index from the session list."));
    };

    return Ok(session.id.to_string());
}

fn layer_at(session: Option<&ChatSession>, command: &SlashCommand) -> Result<String> {
    let Some(session) = session else {
        bail!("No active session.");
    };
    let Some(idx) = command.index_arg() else {
        bail!("Pass a layer number from /layers.");
    };
    let Some(layer) = session.visualization_layers.get(idx - 1) else {
        bail!(format!("{idx} is not a valid index from the layer list."));
    };

    return Ok(layer.layer_id.to_string());
}

async fn session_command(context: &AppContext, command: &SlashCommand) -> Result<String> {
    if command.is_new_session() {
        let mut chats = context.chats.lock().await;
        let session_id = chats.create_session();
        let title = chats
            .session(&session_id)
            .map(|e| return e.title.to_string())
            .unwrap_or_default();
        return Ok(format!("Started {title}."));
    }

    if command.is_session_list() {
        let chats = context.chats.lock().await;
        let active = chats.active_session_id();
        if chats.sessions().is_empty() {
            return Ok("There are no sessions available. You should start your first one!".to_string());
        }

        let lines = chats
            .sessions()
            .iter()
            .enumerate()
            .map(|(idx, session)| {
                return format_session(idx, session, active.as_deref() == Some(session.id.as_str()));
            })
            .collect::<Vec<String>>();
        return Ok(lines.join("\n"));
    }

    if command.is_session_switch() {
        {
            let mut chats = context.chats.lock().await;
            let session_id = session_at(chats.sessions(), command)?;
            chats.select_session(&session_id);
        }
        return Ok(transcript(context).await);
    }

    if command.is_session_rename() {
        let mut chats = context.chats.lock().await;
        let Some(session_id) = chats.active_session_id() else {
            bail!("No active session.");
        };
        chats.rename_session(&session_id, &command.arg_text());
        let title = chats
            .session(&session_id)
            .map(|e| return e.title.to_string())
            .unwrap_or_default();
        return Ok(format!("Renamed session to {title}."));
    }

    if command.is_session_delete() {
        let mut chats = context.chats.lock().await;
        let session_id = if command.args.is_empty() {
            match chats.active_session_id() {
                Some(session_id) => session_id,
                None => bail!("No active session."),
            }
        } else {
            session_at(chats.sessions(), command)?
        };
        chats.delete_session(&session_id);
        return Ok("Deleted session.".to_string());
    }

    if command.is_session_export() {
        let path = command.arg_text();
        let payload = {
            let chats = context.chats.lock().await;
            chats
                .active_session_id()
                .and_then(|session_id| return chats.export_session(&session_id))
        };
        let Some(payload) = payload else {
            bail!("No active session to export.");
        };
        tokio::fs::write(&path, payload).await?;
        return Ok(format!("Exported session to {path}."));
    }

    if command.is_session_import() {
        let path = command.arg_text();
        let payload = tokio::fs::read_to_string(&path).await?;
        context.chats.lock().await.import_session(&payload)?;
        return Ok(transcript(context).await);
    }

    bail!("Unknown session command.");
}

async fn layer_command(context: &AppContext, command: &SlashCommand) -> Result<String> {
    let mut chats = context.chats.lock().await;

    if command.is_layer_list() {
        let Some(session) = chats.active_session() else {
            return Ok("No active session.".to_string());
        };
        if session.visualization_layers.is_empty() {
            return Ok("No layers yet. Ask for a molecule or protein to add one.".to_string());
        }

        let lines = session
            .visualization_layers
            .iter()
            .enumerate()
            .map(|(idx, layer)| {
                let active = session.active_layer_id.as_deref() == Some(layer.layer_id.as_str());
                return format_layer(idx, layer, active);
            })
            .collect::<Vec<String>>();
        return Ok(lines.join("\n"));
    }

    if command.is_layer_select() {
        let layer_id = layer_at(chats.active_session(), command)?;
        chats.set_active_layer(Some(&layer_id));
        return Ok("Layer activated.".to_string());
    }

    if command.is_layer_remove() {
        let layer_id = layer_at(chats.active_session(), command)?;
        chats.remove_layer(&layer_id);
        return Ok("Layer removed.".to_string());
    }

    if command.is_layer_show() {
        let session = chats.active_session();
        let layer = if command.args.is_empty() {
            session.and_then(|e| return e.active_layer())
        } else {
            let layer_id = layer_at(session, command)?;
            session.and_then(|e| return e.layer(&layer_id))
        };
        let Some(layer) = layer else {
            return Ok("No active layer.".to_string());
        };
        return Ok(describe_layer(layer));
    }

    bail!("Unknown layer command.");
}

async fn profile_command(context: &AppContext, command: &SlashCommand) -> Result<String> {
    let mut profiles = context.profiles.lock().await;

    if command.is_profile_name() {
        profiles.update_display_name(&command.arg_text());
    }
    if command.is_gpu_reset() {
        profiles.reset_gpu_usage();
    }

    return Ok(format_profile(profiles.profile()));
}

/// Handles one line of user input. Slash commands that only touch local
/// state answer directly; everything else is dispatched as an action.
pub async fn handle_input(
    context: &AppContext,
    tx: &mpsc::UnboundedSender<Action>,
    input: &str,
) -> Result<Outcome> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(Outcome::Dispatched);
    }

    let Some(command) = SlashCommand::parse(input) else {
        tx.send(Action::Command(input.to_string()))?;
        return Ok(Outcome::Dispatched);
    };

    if command.is_quit() {
        return Ok(Outcome::Quit);
    }
    if command.is_help() {
        return Ok(Outcome::Output(help_text()));
    }
    if command.is_model_list() {
        tx.send(Action::ModelList())?;
        return Ok(Outcome::Dispatched);
    }
    if command.is_model_set() {
        tx.send(Action::ModelSet(command.arg_text()))?;
        return Ok(Outcome::Dispatched);
    }
    if command.is_prompts() {
        tx.send(Action::SuggestPrompts())?;
        return Ok(Outcome::Dispatched);
    }

    let res = if command.is_profile() || command.is_profile_name() || command.is_gpu_reset() {
        profile_command(context, &command).await
    } else if command.is_layer_list()
        || command.is_layer_select()
        || command.is_layer_remove()
        || command.is_layer_show()
    {
        layer_command(context, &command).await
    } else {
        session_command(context, &command).await
    };

    match res {
        Ok(text) => return Ok(Outcome::Output(text)),
        Err(err) => return Ok(Outcome::Output(err.to_string())),
    }
}

async fn render_event(context: &AppContext, event: Event) {
    match event {
        Event::MessageUpdated {
            session_id,
            message_id,
        } => {
            let display_name = context
                .profiles
                .lock()
                .await
                .profile()
                .display_name
                .to_string();
            let chats = context.chats.lock().await;
            if chats.active_session_id().as_deref() != Some(session_id.as_str()) {
                return;
            }
            let Some(message) = chats
                .session(&session_id)
                .and_then(|session| return session.message(&message_id))
            else {
                return;
            };
            if message.sender == Sender::User {
                return;
            }

            let text = format_message(message, &display_name);
            if message.is_loading() {
                println!("{}", Paint::new(text).dimmed());
            } else {
                println!("{}", Paint::cyan(text));
            }
        }
        Event::LayerUpdated {
            session_id,
            layer_id,
        } => {
            let chats = context.chats.lock().await;
            if chats.active_session_id().as_deref() != Some(session_id.as_str()) {
                return;
            }
            if let Some(layer) = chats
                .session(&session_id)
                .and_then(|session| return session.layer(&layer_id))
            {
                println!(
                    "{}",
                    Paint::new(format!("[layer] {} ({})", layer.name, layer.status)).dimmed()
                );
            }
        }
        Event::Notice(text) => {
            println!("{}", Paint::yellow(text));
        }
        Event::PromptsSuggested(prompts) => {
            let lines = prompts
                .iter()
                .map(|prompt| return format!("- {prompt}"))
                .collect::<Vec<String>>();
            println!("Try one of these:\n{}", lines.join("\n"));
        }
    }
}

/// Startup warning about the configured backend, when it is unreachable or
/// lacks the configured model.
pub async fn backend_warning(context: &AppContext) -> Option<String> {
    let backend = context.backend()?;
    let backend_name = backend.name();

    if let Err(err) = backend.health_check().await {
        return Some(format!("Hey, it looks like backend {backend_name} isn't running, I can't connect to it. Names will be looked up exactly as typed until it is reachable.\n\nError: {err}"));
    }

    let model_name = context.config.get(ConfigKey::Model);
    if model_name.is_empty() {
        return None;
    }

    match backend.list_models().await {
        Ok(models) => {
            if models.contains(&model_name) {
                return None;
            }
            return Some(format!("Model {model_name} doesn't exist for backend {backend_name}. You can use `/modellist` to view all available models, and `/model NAME` to switch models."));
        }
        Err(err) => {
            return Some(format!(
                "Could not list models for backend {backend_name}.\n\nError: {err}"
            ));
        }
    }
}

/// Runs the line-oriented chat loop until `/quit` or end of input.
pub async fn start(
    context: Arc<AppContext>,
    tx: mpsc::UnboundedSender<Action>,
    rx: &mut mpsc::UnboundedReceiver<Event>,
) -> Result<()> {
    {
        let mut chats = context.chats.lock().await;
        let session_id = context.config.get(ConfigKey::SessionID);
        if !session_id.is_empty() && !chats.select_session(&session_id) {
            bail!(format!("No session found with ID {session_id}"));
        }
        chats.ensure_active_session();
    }

    println!(
        "{}",
        Paint::new("BioCopilot. Ask for a molecule, a protein, or a sequence to fold. Type /help for commands.").bold()
    );
    if let Some(warning) = backend_warning(&context).await {
        println!("{}", Paint::yellow(warning));
    }
    println!("{}", transcript(&context).await);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match handle_input(&context, &tx, &line).await? {
                    Outcome::Quit => break,
                    Outcome::Output(text) => println!("{text}"),
                    Outcome::Dispatched => {}
                }
            }
            event = rx.recv() => {
                let Some(event) = event else {
                    break;
                };
                render_event(&context, event).await;
            }
        }
    }

    return Ok(());
}

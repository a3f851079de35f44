#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;

use std::io;
use std::path;
use std::sync::Arc;

use anyhow::bail;
use anyhow::Result;
use clap::builder::PossibleValuesParser;
use clap::value_parser;
use clap::Arg;
use clap::ArgAction;
use clap::ArgGroup;
use clap::ArgMatches;
use clap::Command;
use clap_complete::generate;
use clap_complete::Generator;
use clap_complete::Shell;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Select;
use futures::future::join_all;
use strum::VariantNames;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use yansi::Paint;

use super::repl::format_profile;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::BackendName;
use crate::domain::models::ChatSession;
use crate::domain::models::ResponderName;
use crate::domain::models::StructureLookup;
use crate::domain::services::actions::help_text;
use crate::domain::services::correction::suggest_prompts;
use crate::domain::services::AppContext;
use crate::domain::services::NO_STRUCTURE_TEXT;
use crate::infrastructure::storage::FileStorage;

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
    std::process::exit(0);
}

/// Opens the persisted application state under the configured data
/// directory.
pub fn open_context(config: Config) -> Result<Arc<AppContext>> {
    let data_dir = path::PathBuf::from(config.get(ConfigKey::DataDir));
    let storage = Arc::new(FileStorage::new(data_dir));
    let context = AppContext::new(config, storage)?;

    return Ok(Arc::new(context));
}

fn format_session(session: &ChatSession) -> String {
    let mut res = format!(
        "- (ID: {}) {}, Modified: {}, Messages: {}, Layers: {}",
        session.id,
        session.title,
        session.last_modified_at.format("%Y-%m-%d %H:%M"),
        session.chat_history.len(),
        session.visualization_layers.len()
    );

    if let Some(message) = session.chat_history.first() {
        let text = message.content.to_string();
        let mut line = text.lines().next().unwrap_or_default().to_string();
        if line.chars().count() >= 70 {
            line = format!("{}...", line.chars().take(67).collect::<String>());
        }
        res = format!("{res}, {line}");
    }

    return res;
}

pub fn format_lookup(lookup: &StructureLookup) -> String {
    let mut name = lookup.original_name.to_string();
    if lookup.was_corrected() {
        name = format!("{name} (as {})", lookup.resolved_name);
    }

    let (Some(format), Some(url)) = (&lookup.format, &lookup.url) else {
        return format!("- {name}: {NO_STRUCTURE_TEXT}");
    };

    let external_id = lookup
        .external_id
        .as_ref()
        .map(|e| return e.to_string())
        .unwrap_or_default();

    return format!("- {name}: {} {external_id} {url}", format.to_string().to_uppercase());
}

async fn print_resolved(config: Config, names: Vec<String>) -> Result<()> {
    let context = open_context(config)?;
    let backend = context.backend();

    let lookups = join_all(names.iter().map(|name| {
        return context.resolver.resolve(name, backend.as_deref());
    }))
    .await;

    let lines = lookups
        .iter()
        .map(|lookup| return format_lookup(lookup))
        .collect::<Vec<String>>();
    println!("{}", lines.join("\n"));

    return Ok(());
}

async fn print_prompts(config: Config) -> Result<()> {
    let context = open_context(config)?;
    let backend = context.backend();
    let prompts = suggest_prompts(backend.as_deref()).await;

    for prompt in prompts {
        println!("- {prompt}");
    }

    return Ok(());
}

async fn print_sessions_list(context: &AppContext) -> Result<()> {
    let sessions = context
        .chats
        .lock()
        .await
        .sessions()
        .iter()
        .map(format_session)
        .collect::<Vec<String>>();

    if sessions.is_empty() {
        println!("There are no sessions available. You should start your first one!");
    } else {
        println!("{}", sessions.join("\n"));
    }

    return Ok(());
}

async fn select_session_interactive(context: &AppContext) -> Result<Option<String>> {
    let sessions = context.chats.lock().await.sessions().to_vec();
    if sessions.is_empty() {
        println!("There are no sessions available. You should start your first one!");
        return Ok(None);
    }

    let session_options = sessions
        .iter()
        .map(format_session)
        .collect::<Vec<String>>();

    let idx = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Which session would you like to load?")
        .default(0)
        .items(&session_options)
        .interact_opt()?;

    return Ok(idx.map(|idx| return sessions[idx].id.to_string()));
}

async fn create_config_file() -> Result<()> {
    let config_file_path_str = Config::default_value(ConfigKey::ConfigFile);
    let config_file_path = path::PathBuf::from(&config_file_path_str);
    if config_file_path.exists() {
        bail!(format!(
            "Config file already exists at {config_file_path_str}"
        ));
    }

    if let Some(parent) = config_file_path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    let mut file = fs::File::create(&config_file_path).await?;
    file.write_all(Config::serialize_default(build()).as_bytes())
        .await?;

    println!("Created default config file at {config_file_path_str}");
    return Ok(());
}

fn session_id_arg(matches: &ArgMatches) -> Result<String> {
    let Some(session_id) = matches.get_one::<String>("session-id") else {
        bail!("A session ID is required");
    };

    return Ok(session_id.to_string());
}

async fn handle_sessions(config: Config, matches: &ArgMatches) -> Result<Option<Config>> {
    let Some((name, subcmd_matches)) = matches.subcommand() else {
        subcommand_sessions().print_long_help()?;
        return Ok(None);
    };

    if name == "dir" {
        println!("{}", config.get(ConfigKey::DataDir));
        return Ok(None);
    }

    let context = open_context(config.clone())?;
    match name {
        "list" => {
            print_sessions_list(&context).await?;
        }
        "open" => {
            let session_id = match subcmd_matches.get_one::<String>("session-id") {
                Some(session_id) => Some(session_id.to_string()),
                None => select_session_interactive(&context).await?,
            };
            let Some(session_id) = session_id else {
                return Ok(None);
            };
            if context.chats.lock().await.session(&session_id).is_none() {
                bail!(format!("No session found with ID {session_id}"));
            }

            config.set(ConfigKey::SessionID, &session_id);
            return Ok(Some(config));
        }
        "delete" => {
            let mut chats = context.chats.lock().await;
            if subcmd_matches.get_flag("all") {
                chats.clear();
                println!("Deleted all sessions");
            } else {
                let session_id = session_id_arg(subcmd_matches)?;
                if !chats.delete_session(&session_id) {
                    bail!(format!("No session found with ID {session_id}"));
                }
                println!("Deleted session {session_id}");
            }
        }
        "rename" => {
            let session_id = session_id_arg(subcmd_matches)?;
            let title = subcmd_matches
                .get_one::<String>("title")
                .map(|e| return e.to_string())
                .unwrap_or_default();
            if !context.chats.lock().await.rename_session(&session_id, &title) {
                bail!(format!("No session found with ID {session_id}"));
            }
            println!("Renamed session {session_id}");
        }
        "export" => {
            let session_id = session_id_arg(subcmd_matches)?;
            let Some(payload) = context.chats.lock().await.export_session(&session_id) else {
                bail!(format!("No session found with ID {session_id}"));
            };
            if let Some(output) = subcmd_matches.get_one::<String>("output") {
                fs::write(output, payload).await?;
                println!("Exported session {session_id} to {output}");
            } else {
                println!("{payload}");
            }
        }
        "import" => {
            let Some(input) = subcmd_matches.get_one::<String>("input") else {
                bail!("An input file is required");
            };
            let payload = fs::read_to_string(input).await?;
            let session_id = context.chats.lock().await.import_session(&payload)?;
            println!("Imported session {session_id}");
        }
        _ => {
            subcommand_sessions().print_long_help()?;
        }
    }

    return Ok(None);
}

async fn handle_profile(config: Config, matches: &ArgMatches) -> Result<()> {
    let context = open_context(config)?;
    let mut profiles = context.profiles.lock().await;

    match matches.subcommand() {
        Some(("rename", rename_matches)) => {
            let name = rename_matches
                .get_one::<String>("name")
                .map(|e| return e.to_string())
                .unwrap_or_default();
            profiles.update_display_name(&name);
        }
        Some(("reset-gpu", _)) => {
            profiles.reset_gpu_usage();
        }
        _ => {}
    }

    println!("{}", format_profile(profiles.profile()));
    return Ok(());
}

fn subcommand_completions() -> Command {
    return Command::new("completions")
        .about("Generates shell completions.")
        .arg(
            clap::Arg::new("shell")
                .short('s')
                .long("shell")
                .help("Which shell to generate completions for.")
                .action(ArgAction::Set)
                .value_parser(value_parser!(Shell))
                .required(true),
        );
}

fn subcommand_config() -> Command {
    return Command::new("config")
        .about("Configuration file options.")
        .subcommand(
            Command::new("create").about("Saves the default config file to the configuration file path. This command will fail if the file exists already.")
        )
        .subcommand(
            Command::new("default").about("Outputs the default configuration file to stdout.")
        )
        .subcommand(
            Command::new("path").about("Returns the default path for the configuration file.")
        );
}

fn arg_session_id(required: bool) -> Arg {
    return Arg::new("session-id")
        .short('i')
        .long("id")
        .help("Session ID")
        .num_args(1)
        .required(required);
}

fn subcommand_sessions_delete() -> Command {
    return Command::new("delete")
        .about("Delete one or all sessions.")
        .arg(arg_session_id(false))
        .arg(
            Arg::new("all")
                .long("all")
                .help("Delete all sessions.")
                .action(ArgAction::SetTrue),
        )
        .group(
            ArgGroup::new("delete-args")
                .args(["session-id", "all"])
                .required(true),
        );
}

fn subcommand_sessions() -> Command {
    return Command::new("sessions")
        .about("Manage past chat sessions.")
        .arg_required_else_help(true)
        .subcommand(Command::new("dir").about("Print the data directory sessions are stored in."))
        .subcommand(Command::new("list").about("List all sessions with their ids, most recently modified first."))
        .subcommand(
            Command::new("open")
                .about("Open a previous session by ID. Omit passing any session ID to load an interactive selection.")
                .arg(arg_session_id(false)),
        )
        .subcommand(subcommand_sessions_delete())
        .subcommand(
            Command::new("rename")
                .about("Rename a session. An empty title resets it.")
                .arg(arg_session_id(true))
                .arg(
                    Arg::new("title")
                        .short('t')
                        .long("title")
                        .help("New session title")
                        .num_args(1),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Export a session as JSON.")
                .arg(arg_session_id(true))
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .help("File to write to. Prints to stdout when omitted.")
                        .num_args(1),
                ),
        )
        .subcommand(
            Command::new("import")
                .about("Import a session from an exported JSON file.")
                .arg(
                    Arg::new("input")
                        .long("input")
                        .help("Exported session file")
                        .num_args(1)
                        .required(true),
                ),
        );
}

fn subcommand_profile() -> Command {
    return Command::new("profile")
        .about("Show or edit the user profile.")
        .subcommand(Command::new("show").about("Print the display name and estimated GPU usage."))
        .subcommand(
            Command::new("rename")
                .about("Set the display name. An empty name resets it.")
                .arg(Arg::new("name").help("Display name").num_args(1)),
        )
        .subcommand(Command::new("reset-gpu").about("Reset the estimated GPU usage to zero."));
}

fn subcommand_resolve() -> Command {
    return Command::new("resolve")
        .about("Resolve molecule or protein names against PubChem and the RCSB PDB without starting a chat.")
        .arg(
            Arg::new("names")
                .help("Names to resolve, looked up concurrently.")
                .num_args(1..)
                .required(true),
        );
}

fn arg_backend() -> Arg {
    return Arg::new(ConfigKey::Backend.to_string())
        .short('b')
        .long(ConfigKey::Backend.to_string())
        .env("BIOCOPILOT_BACKEND")
        .num_args(1)
        .help(format!(
            "The language model backend used for name correction and prompt suggestions. [default: {}]",
            Config::default_value(ConfigKey::Backend)
        ))
        .value_parser(PossibleValuesParser::new(BackendName::VARIANTS))
        .global(true);
}

fn arg_backend_health_check_timeout() -> Arg {
    return Arg::new(ConfigKey::BackendHealthCheckTimeout.to_string())
        .long(ConfigKey::BackendHealthCheckTimeout.to_string())
        .env("BIOCOPILOT_BACKEND_HEALTH_CHECK_TIMEOUT")
        .num_args(1)
        .help(
            format!("Time to wait in milliseconds before timing out when doing a healthcheck for a backend. [default: {}]", Config::default_value(ConfigKey::BackendHealthCheckTimeout)),
        )
        .global(true);
}

fn arg_model() -> Arg {
    return Arg::new(ConfigKey::Model.to_string())
        .short('m')
        .long(ConfigKey::Model.to_string())
        .env("BIOCOPILOT_MODEL")
        .num_args(1)
        .help("The model on the backend to consume. Defaults to the backend's own default model if not set.")
        .global(true);
}

fn arg_responder() -> Arg {
    return Arg::new(ConfigKey::Responder.to_string())
        .short('r')
        .long(ConfigKey::Responder.to_string())
        .env("BIOCOPILOT_RESPONDER")
        .num_args(1)
        .help(format!(
            "Which pipeline answers chat commands. [default: {}]",
            Config::default_value(ConfigKey::Responder)
        ))
        .value_parser(PossibleValuesParser::new(ResponderName::VARIANTS))
        .global(true);
}

fn arg_url(key: ConfigKey, env: &'static str, help: &str) -> Arg {
    return Arg::new(key.to_string())
        .long(key.to_string())
        .env(env)
        .num_args(1)
        .help(format!("{help} [default: {}]", Config::default_value(key)))
        .global(true);
}

fn arg_token(key: ConfigKey, env: &'static str, help: &'static str) -> Arg {
    return Arg::new(key.to_string())
        .long(key.to_string())
        .env(env)
        .num_args(1)
        .help(help)
        .global(true);
}

pub fn build() -> Command {
    let commands_text = help_text()
        .split('\n')
        .map(|line| {
            if line.starts_with('-') {
                return format!("  {line}");
            }
            if line.starts_with("COMMANDS:") || line.starts_with("EXAMPLES:") {
                return Paint::new(format!("CHAT {line}"))
                    .underline()
                    .bold()
                    .to_string();
            }
            return line.to_string();
        })
        .collect::<Vec<String>>()
        .join("\n");

    let about = format!(
        "{}\n\nVersion: {}",
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
    );

    return Command::new("biocopilot")
        .about(about)
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .after_help(commands_text)
        .arg_required_else_help(false)
        .subcommand(Command::new("chat").about("Start a chat session."))
        .subcommand(subcommand_completions())
        .subcommand(subcommand_config())
        .subcommand(subcommand_profile())
        .subcommand(Command::new("prompts").about("Print example prompts, suggested by the backend when one is configured."))
        .subcommand(subcommand_resolve())
        .subcommand(subcommand_sessions())
        .arg(arg_backend())
        .arg(arg_backend_health_check_timeout())
        .arg(arg_model())
        .arg(arg_responder())
        .arg(
            Arg::new(ConfigKey::ConfigFile.to_string())
                .short('c')
                .long(ConfigKey::ConfigFile.to_string())
                .env("BIOCOPILOT_CONFIG_FILE")
                .num_args(1)
                .help(format!("Path to configuration file [default: {}]", Config::default_value(ConfigKey::ConfigFile)))
                .global(true)
        )
        .arg(
            Arg::new(ConfigKey::DataDir.to_string())
                .long(ConfigKey::DataDir.to_string())
                .env("BIOCOPILOT_DATA_DIR")
                .num_args(1)
                .help(format!("Directory chat sessions and the profile are stored in. [default: {}]", Config::default_value(ConfigKey::DataDir)))
                .global(true)
        )
        .arg(arg_url(ConfigKey::PubchemURL, "BIOCOPILOT_PUBCHEM_URL", "PubChem PUG REST API URL."))
        .arg(arg_url(ConfigKey::RcsbSearchURL, "BIOCOPILOT_RCSB_SEARCH_URL", "RCSB PDB search API URL."))
        .arg(arg_url(ConfigKey::RcsbFilesURL, "BIOCOPILOT_RCSB_FILES_URL", "RCSB PDB file download URL."))
        .arg(arg_url(ConfigKey::EsmfoldURL, "BIOCOPILOT_ESMFOLD_URL", "ESMFold structure prediction API URL."))
        .arg(arg_url(ConfigKey::WorkflowURL, "BIOCOPILOT_WORKFLOW_URL", "Webhook URL commands are forwarded to when using the workflow responder."))
        .arg(arg_url(ConfigKey::OllamaURL, "BIOCOPILOT_OLLAMA_URL", "Ollama API URL when using the Ollama backend."))
        .arg(arg_url(ConfigKey::OpenAiURL, "BIOCOPILOT_OPENAI_URL", "OpenAI API URL when using the OpenAI backend. Can be swapped to a compatible proxy."))
        .arg(arg_url(ConfigKey::GeminiURL, "BIOCOPILOT_GEMINI_URL", "Google Gemini API URL when using the Gemini backend."))
        .arg(arg_token(ConfigKey::OpenAiToken, "BIOCOPILOT_OPENAI_TOKEN", "OpenAI API token when using the OpenAI backend."))
        .arg(arg_token(ConfigKey::GeminiToken, "BIOCOPILOT_GEMINI_TOKEN", "Google Gemini API token when using the Gemini backend."));
}

/// Parses arguments and runs one-shot subcommands. Returns the loaded
/// configuration when a chat should start.
pub async fn parse() -> Result<Option<Config>> {
    let matches = build().get_matches();

    match matches.subcommand() {
        Some(("chat", subcmd_matches)) => {
            let config = Config::load(build(), vec![&matches, subcmd_matches]).await?;
            return Ok(Some(config));
        }
        Some(("completions", subcmd_matches)) => {
            if let Some(completions) = subcmd_matches.get_one::<Shell>("shell").copied() {
                let mut app = build();
                print_completions(completions, &mut app);
            }
            return Ok(None);
        }
        Some(("config", subcmd_matches)) => match subcmd_matches.subcommand() {
            Some(("create", _)) => {
                create_config_file().await?;
                return Ok(None);
            }
            Some(("default", _)) => {
                println!("{}", Config::serialize_default(build()));
                return Ok(None);
            }
            Some(("path", _)) => {
                println!("{}", Config::default_value(ConfigKey::ConfigFile));
                return Ok(None);
            }
            _ => {
                subcommand_config().print_long_help()?;
                return Ok(None);
            }
        },
        Some(("profile", subcmd_matches)) => {
            let config = Config::load(build(), vec![&matches, subcmd_matches]).await?;
            handle_profile(config, subcmd_matches).await?;
            return Ok(None);
        }
        Some(("prompts", subcmd_matches)) => {
            let config = Config::load(build(), vec![&matches, subcmd_matches]).await?;
            print_prompts(config).await?;
            return Ok(None);
        }
        Some(("resolve", subcmd_matches)) => {
            let names = subcmd_matches
                .get_many::<String>("names")
                .map(|names| return names.map(|e| return e.to_string()).collect::<Vec<String>>())
                .unwrap_or_default();
            let config = Config::load(build(), vec![&matches, subcmd_matches]).await?;
            print_resolved(config, names).await?;
            return Ok(None);
        }
        Some(("sessions", subcmd_matches)) => {
            let config = Config::load(build(), vec![&matches, subcmd_matches]).await?;
            return handle_sessions(config, subcmd_matches).await;
        }
        _ => {
            let config = Config::load(build(), vec![&matches]).await?;
            return Ok(Some(config));
        }
    }
}

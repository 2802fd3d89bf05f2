use std::io;
use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::builder::PossibleValuesParser;
use clap::value_parser;
use clap::Arg;
use clap::ArgAction;
use clap::Command;
use clap_complete::generate;
use clap_complete::Generator;
use clap_complete::Shell;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Confirm;
use dialoguer::Select;
use strum::VariantNames;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use yansi::Paint;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::services::display_id;
use crate::domain::services::help_text;
use crate::domain::services::markdown;
use crate::domain::services::parse_transcript;
use crate::domain::services::PreferencesStore;
use crate::infrastructure::api::ApiManager;
use crate::infrastructure::storage::StorageManager;

const TRANSCRIPT_FORMATS: [&str; 2] = ["text", "html"];

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
    std::process::exit(0);
}

async fn list_session_ids() -> Result<Vec<String>> {
    let api = ApiManager::get()?;
    return Ok(api.list_session_ids().await?);
}

async fn print_sessions_list() -> Result<()> {
    let sessions = list_session_ids()
        .await?
        .iter()
        .enumerate()
        .map(|(idx, id)| return format!("{}. {id}", idx + 1))
        .collect::<Vec<String>>();

    if sessions.is_empty() {
        println!("There are no sessions available. You should start your first one!");
    } else {
        println!("{}", sessions.join("\n"));
    }

    return Ok(());
}

async fn print_session(session_id: &str, format: &str) -> Result<()> {
    let api = ApiManager::get()?;
    let history = api.get_history(session_id).await?;
    let messages = parse_transcript(&history);

    let res = messages
        .iter()
        .map(|message| {
            if format == "html" {
                return format!(
                    "<article id=\"{}\">\n{}\n</article>",
                    markdown::escape_html(&message.id),
                    markdown::to_html(&message.content)
                );
            }
            return message.content.to_string();
        })
        .collect::<Vec<String>>();

    if format == "html" {
        println!("{}", res.join("\n"));
    } else {
        println!("{}", res.join("\n\n---\n\n"));
    }

    return Ok(());
}

async fn select_session_interactive() -> Result<Option<String>> {
    let session_ids = list_session_ids().await?;
    if session_ids.is_empty() {
        println!("There are no sessions available. You should start your first one!");
        return Ok(None);
    }

    let session_options = session_ids
        .iter()
        .map(|id| return display_id(id))
        .collect::<Vec<String>>();

    let idx = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Which session would you like to load?")
        .default(0)
        .items(&session_options)
        .interact_opt()?;

    return Ok(idx.map(|idx| return session_ids[idx].to_string()));
}

async fn create_config_file() -> Result<()> {
    let config_file_path_str = Config::default(ConfigKey::ConfigFile);
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

    let mut file = fs::File::create(config_file_path.clone()).await?;
    file.write_all(Config::serialize_default(build()).as_bytes())
        .await?;

    println!("Created default config file at {config_file_path_str}");
    return Ok(());
}

fn preferences_store() -> Result<PreferencesStore> {
    return Ok(PreferencesStore::load(StorageManager::get()?));
}

async fn import_preferences(file: &str) -> Result<()> {
    let payload = fs::read_to_string(file).await?;
    let preferences = preferences_store()?.import_snapshot(&payload)?;
    println!(
        "Imported preferences from {file}\n{}",
        serde_json::to_string_pretty(&preferences)?
    );

    return Ok(());
}

fn clear_preferences(skip_prompt: bool) -> Result<()> {
    let mut confirmed = skip_prompt;
    if !confirmed {
        confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt("This removes your preferences and all locally stored data. Continue?")
            .default(false)
            .interact()?;
    }

    if preferences_store()?.clear_all(confirmed)? {
        println!("Cleared all stored data");
    } else {
        println!("Nothing was removed");
    }

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

fn subcommand_debug() -> Command {
    return Command::new("debug")
        .about("Debug helpers for AskImmigrate")
        .hide(true)
        .subcommand(
            Command::new("log-path").about("Output path to debug log file generated when running AskImmigrate with environment variable RUST_LOG=askimmigrate")
        )
        .subcommand(
            Command::new("enum-config").about("List all config keys as strings.")
        );
}

fn arg_session_id() -> Arg {
    return Arg::new(ConfigKey::SessionID.to_string())
        .short('i')
        .long("id")
        .help("Session ID")
        .num_args(1);
}

fn subcommand_chat() -> Command {
    return Command::new("chat")
        .about("Start chatting with the assistant. This is the default command.")
        .arg(arg_session_id().help("Session to open instead of the most recent one."));
}

fn subcommand_sessions() -> Command {
    return Command::new("sessions")
        .about("Browse consultation sessions stored by the assistant.")
        .arg_required_else_help(true)
        .subcommand(Command::new("list").about("List the identifiers of every session, most recent first."))
        .subcommand(
            Command::new("open")
                .about("Open a session by ID. Omit passing any session ID to load an interactive selection.")
                .arg(arg_session_id().required(false)),
        )
        .subcommand(
            Command::new("show")
                .about("Print the transcript of a session.")
                .arg(arg_session_id().required(true))
                .arg(
                    Arg::new("format")
                        .short('f')
                        .long("format")
                        .help("Output format. [default: text]")
                        .num_args(1)
                        .value_parser(PossibleValuesParser::new(TRANSCRIPT_FORMATS)),
                ),
        );
}

fn subcommand_preferences() -> Command {
    return Command::new("preferences")
        .about("Manage locally stored preferences.")
        .arg_required_else_help(true)
        .subcommand(Command::new("show").about("Print the current preferences as JSON."))
        .subcommand(
            Command::new("export")
                .about("Write the preferences to a dated JSON file.")
                .arg(
                    Arg::new("dir")
                        .short('d')
                        .long("dir")
                        .help("Directory to write the export to. [default: the data directory]")
                        .num_args(1),
                ),
        )
        .subcommand(
            Command::new("import")
                .about("Restore preferences from a file created by the export command.")
                .arg(
                    Arg::new("file")
                        .help("Path to the exported JSON file.")
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("clear")
                .about("Remove all locally stored data and reset preferences to their defaults.")
                .arg(
                    Arg::new("yes")
                        .short('y')
                        .long("yes")
                        .help("Skip the confirmation prompt.")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("path").about("Print the data directory path."));
}

pub fn build() -> Command {
    let commands_text = help_text()
        .split('\n')
        .map(|line| {
            if line.starts_with('-') {
                return format!("  {line}");
            }
            if line.starts_with("COMMANDS:") || line.starts_with("HOTKEYS:") {
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
        "{}\n\nVersion: {}\nCommit: {}",
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
        env!("VERGEN_GIT_DESCRIBE")
    );

    return Command::new("askimmigrate")
        .about(about)
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .after_help(commands_text)
        .arg_required_else_help(false)
        .subcommand(subcommand_chat())
        .subcommand(subcommand_completions())
        .subcommand(subcommand_config())
        .subcommand(subcommand_debug())
        .subcommand(Command::new("manpages").about("Generates manpages and outputs to stdout."))
        .subcommand(subcommand_preferences())
        .subcommand(subcommand_sessions())
        .arg(
            Arg::new(ConfigKey::ApiURL.to_string())
                .long(ConfigKey::ApiURL.to_string())
                .env("ASKIMMIGRATE_API_URL")
                .num_args(1)
                .help(format!("Base URL of the AskImmigrate API. [default: {}]", Config::default(ConfigKey::ApiURL)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::ApiTimeout.to_string())
                .long(ConfigKey::ApiTimeout.to_string())
                .env("ASKIMMIGRATE_API_TIMEOUT")
                .num_args(1)
                .help(format!("Time to wait in milliseconds for the API before giving up on a request. [default: {}]", Config::default(ConfigKey::ApiTimeout)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::ConfigFile.to_string())
                .short('c')
                .long(ConfigKey::ConfigFile.to_string())
                .env("ASKIMMIGRATE_CONFIG_FILE")
                .num_args(1)
                .help(format!("Path to configuration file [default: {}]", Config::default(ConfigKey::ConfigFile)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::DataDir.to_string())
                .long(ConfigKey::DataDir.to_string())
                .env("ASKIMMIGRATE_DATA_DIR")
                .num_args(1)
                .help(format!("Directory holding preferences and exports. [default: {}]", Config::default(ConfigKey::DataDir)))
                .global(true),
        );
}

/// Parses arguments and runs one-shot subcommands. Returns true when the
/// chat interface should start.
pub async fn parse() -> Result<bool> {
    let matches = build().get_matches();

    match matches.subcommand() {
        Some(("debug", debug_matches)) => {
            match debug_matches.subcommand() {
                Some(("log-path", _)) => {
                    let log_path = Config::log_dir().join("debug.log");
                    println!("{}", log_path.to_string_lossy());
                }
                Some(("enum-config", _)) => {
                    let res = ConfigKey::VARIANTS.join("\n");
                    println!("{}", res);
                }
                _ => {
                    subcommand_debug().print_long_help()?;
                }
            }

            return Ok(false);
        }
        Some(("chat", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
        }
        Some(("completions", subcmd_matches)) => {
            if let Some(completions) = subcmd_matches.get_one::<Shell>("shell").copied() {
                let mut app = build();
                print_completions(completions, &mut app);
            }
            return Ok(false);
        }
        Some(("config", subcmd_matches)) => match subcmd_matches.subcommand() {
            Some(("create", _)) => {
                create_config_file().await?;
                return Ok(false);
            }
            Some(("default", _)) => {
                println!("{}", Config::serialize_default(build()));
                return Ok(false);
            }
            Some(("path", _)) => {
                println!("{}", Config::default(ConfigKey::ConfigFile));
                return Ok(false);
            }
            _ => {
                subcommand_config().print_long_help()?;
                return Ok(false);
            }
        },
        Some(("manpages", _)) => {
            clap_mangen::Man::new(build()).render(&mut io::stdout())?;
            return Ok(false);
        }
        Some(("preferences", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
            match subcmd_matches.subcommand() {
                Some(("show", _)) => {
                    let store = preferences_store()?;
                    println!("{}", serde_json::to_string_pretty(store.get())?);
                }
                Some(("export", export_matches)) => {
                    let dir = match export_matches.get_one::<String>("dir") {
                        Some(dir) => path::PathBuf::from(dir),
                        None => path::PathBuf::from(Config::get(ConfigKey::DataDir)),
                    };
                    let file = preferences_store()?.export_to_dir(&dir)?;
                    println!("Exported preferences to {}", file.to_string_lossy());
                }
                Some(("import", import_matches)) => {
                    if let Some(file) = import_matches.get_one::<String>("file") {
                        import_preferences(file).await?;
                    }
                }
                Some(("clear", clear_matches)) => {
                    clear_preferences(clear_matches.get_flag("yes"))?;
                }
                Some(("path", _)) => {
                    println!("{}", Config::get(ConfigKey::DataDir));
                }
                _ => {
                    subcommand_preferences().print_long_help()?;
                }
            }

            return Ok(false);
        }
        Some(("sessions", subcmd_matches)) => match subcmd_matches.subcommand() {
            Some(("list", list_matches)) => {
                Config::load(build(), vec![&matches, subcmd_matches, list_matches]).await?;
                print_sessions_list().await?;
                return Ok(false);
            }
            Some(("open", open_matches)) => {
                Config::load(build(), vec![&matches, subcmd_matches, open_matches]).await?;
                if open_matches
                    .get_one::<String>(&ConfigKey::SessionID.to_string())
                    .is_none()
                {
                    match select_session_interactive().await? {
                        Some(session_id) => Config::set(ConfigKey::SessionID, &session_id),
                        None => return Ok(false),
                    }
                }
            }
            Some(("show", show_matches)) => {
                Config::load(build(), vec![&matches, subcmd_matches, show_matches]).await?;
                let format = show_matches
                    .get_one::<String>("format")
                    .map(|e| return e.as_str())
                    .unwrap_or("text");
                if let Some(session_id) =
                    show_matches.get_one::<String>(&ConfigKey::SessionID.to_string())
                {
                    print_session(session_id, format).await?;
                }
                return Ok(false);
            }
            _ => {
                subcommand_sessions().print_long_help()?;
                return Ok(false);
            }
        },
        _ => {
            Config::load(build(), vec![&matches]).await?;
        }
    }

    return Ok(true);
}

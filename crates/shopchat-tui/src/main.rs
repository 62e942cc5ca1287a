use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use colored::*;
use shopchat_core::{ChatWidget, Config, HttpEndpoint, Locale, SubmitOutcome};
use tracing::info;

mod app;
mod handler;
mod logging;
mod tui;
mod ui;

use app::App;
use tui::{EventHandler, Tui};

#[derive(Parser)]
#[command(name = "shopchat", version)]
#[command(about = "Chat with the shop assistant from your terminal")]
struct Cli {
    /// Chat endpoint URL (overrides the config file)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Interface language: pl or en (overrides the config file)
    #[arg(long, global = true)]
    locale: Option<String>,

    /// Where the interactive chat writes its log
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive chat widget (default)
    Chat,
    /// Send one message and print the assistant's reply
    Ask {
        /// Your message
        message: String,
    },
    /// Show or change the saved configuration
    Config {
        /// Save this endpoint URL
        #[arg(long)]
        set_endpoint: Option<String>,
        /// Save this language (pl or en)
        #[arg(long)]
        set_locale: Option<String>,
        /// Forget all saved settings
        #[arg(long)]
        reset: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("{}: {}", "Ignoring unreadable config".yellow(), e);
        Config::new()
    });

    let endpoint_url = cli
        .endpoint
        .clone()
        .unwrap_or_else(|| config.endpoint_url().to_string());

    let locale = match cli.locale.as_deref() {
        Some(name) => parse_locale(name)?,
        None => config.locale(),
    };

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => run_chat(&endpoint_url, locale, cli.log_file).await?,
        Commands::Ask { message } => ask_once(&endpoint_url, locale, &message).await?,
        Commands::Config { set_endpoint, set_locale, reset } => {
            update_config(config, set_endpoint, set_locale, reset)?
        }
    }

    Ok(())
}

fn parse_locale(name: &str) -> Result<Locale> {
    match Locale::from_str(name) {
        Some(locale) => Ok(locale),
        None => {
            let known: Vec<&str> = Locale::all().iter().map(|l| l.as_str()).collect();
            bail!("Unknown locale '{}', expected one of: {}", name, known.join(", "))
        }
    }
}

async fn run_chat(endpoint_url: &str, locale: Locale, log_file: Option<PathBuf>) -> Result<()> {
    let log_path = match log_file {
        Some(path) => path,
        None => logging::default_log_path()?,
    };
    logging::init_file(&log_path)?;
    info!(endpoint = endpoint_url, locale = locale.as_str(), "starting chat widget");

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();

    let widget = ChatWidget::new(locale.strings());
    let mut app = App::new(widget, HttpEndpoint::new(endpoint_url), events.sender());

    let result = run_loop(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    info!("chat widget closed");
    result
}

async fn run_loop(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event)?,
            None => break,
        }
    }
    Ok(())
}

async fn ask_once(endpoint_url: &str, locale: Locale, message: &str) -> Result<()> {
    logging::init_stderr();

    let endpoint = HttpEndpoint::new(endpoint_url);
    let mut widget = ChatWidget::new(locale.strings());
    widget.open();
    widget.input_mut().set(message);

    println!("{} {}", "🛒 Asking".bold().blue(), endpoint_url.dimmed());

    match widget.submit_and_wait(&endpoint).await {
        SubmitOutcome::Sent(_) => {
            if let Some(reply) = widget.transcript().last_message() {
                println!("\n{}", format!("{}:", locale.strings().assistant_label).bold().green());
                println!("{}", reply.content);
            }
        }
        SubmitOutcome::Empty | SubmitOutcome::Busy(_) => {
            println!("{}", "Nothing to send: the message is blank".yellow());
        }
    }

    Ok(())
}

fn update_config(
    mut config: Config,
    set_endpoint: Option<String>,
    set_locale: Option<String>,
    reset: bool,
) -> Result<()> {
    let path = Config::get_config_path()?;
    let changed = reset || set_endpoint.is_some() || set_locale.is_some();

    if reset {
        config = Config::new();
    }
    if let Some(url) = set_endpoint {
        config.endpoint_url = Some(url);
    }
    if let Some(name) = set_locale {
        config.locale = Some(parse_locale(&name)?.as_str().to_string());
    }

    if changed {
        config.save()?;
        println!("{} {}", "Saved".green().bold(), path.display().to_string().dimmed());
    } else {
        println!("{} {}", "Config file".bold(), path.display().to_string().dimmed());
    }

    println!("  endpoint: {}", config.endpoint_url().cyan());
    println!("  locale:   {}", config.locale().as_str().cyan());

    Ok(())
}

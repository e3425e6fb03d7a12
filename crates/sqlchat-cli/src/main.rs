use std::path::Path;
use std::sync::Arc;

use sqlchat::prelude::*;
use sqlchat::AttachmentGate;
use sqlchat_cli::commands::{Command, HELP};
use sqlchat_cli::config::CliConfig;
use sqlchat_cli::session::Session;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let config = CliConfig::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_logging(&config);
    tracing::info!("Agent endpoint: {}", config.agent.endpoint);

    let store = Arc::new(FileStore::open(&config.storage.dir)?);

    let mut gateway = HttpAgentGateway::builder()
        .endpoint(&config.agent.endpoint)
        .timeout(config.agent_timeout());
    if let Some(api_key) = &config.api_key {
        gateway = gateway.api_key(api_key);
    }

    let (observer, events) = ChannelObserver::new();
    let chat = Arc::new(
        ConversationController::builder()
            .store(store)
            .gateway(Arc::new(gateway.build()?))
            .config(config.controller_config())
            .observer(Arc::new(observer))
            .build()?,
    );

    let autosave = spawn_autosave(chat.clone(), IntervalTicker::new(config.autosave_interval()));
    let printer = tokio::spawn(print_replies(chat.clone(), events));

    let mut session = Session::new(chat.clone());

    println!("SQLChat. Type a question, or /help for commands.");
    print_history(&chat);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let Some(command) = Command::parse(&line) else {
            continue;
        };
        match command {
            Command::Ask(question) => session.ask(question),
            Command::New => {
                let id = chat.new_thread();
                println!("Started chat {}", id);
            }
            Command::List => print_threads(&chat),
            Command::Switch(id) => match chat.switch_thread(&id) {
                Ok(()) => print_history(&chat),
                Err(e) => println!("{}", e),
            },
            Command::Delete(id) => match chat.delete_thread(&id) {
                Ok(result) => println!("Deleted {}; current chat is {}", result.deleted, result.active),
                Err(e) => println!("{}", e),
            },
            Command::Attach(path) => match attach(&chat, &path).await {
                Ok(name) => println!("Attached {} to your next question", name),
                Err(e) => println!("Cannot attach {}: {}", path.display(), e),
            },
            Command::Detach => {
                chat.clear_attachment();
                println!("Attachment cleared");
            }
            Command::History => print_history(&chat),
            Command::Help => println!("{}", HELP),
            Command::Quit => break,
            Command::Invalid(message) => println!("{} (try /help)", message),
        }
    }

    // Outstanding sends commit before the final snapshot
    let saved = session.shutdown().await;
    autosave.abort();
    printer.abort();
    tracing::info!(saved, "Conversations saved; exiting");

    Ok(())
}

/// Validate size and suffix from metadata before reading the file into memory
async fn attach(chat: &ConversationController, path: &Path) -> anyhow::Result<String> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow::anyhow!("not a file name"))?
        .to_string();

    let metadata = tokio::fs::metadata(path).await?;
    if let Err(e) = AttachmentGate::check(&name, metadata.len()) {
        chat.clear_attachment();
        return Err(e.into());
    }

    let bytes = tokio::fs::read(path).await?;
    chat.attach(Attachment::new(name.clone(), bytes))?;
    Ok(name)
}

async fn print_replies(chat: Arc<ConversationController>, mut events: UnboundedReceiver<StateEvent>) {
    while let Some(event) = events.recv().await {
        let StateEvent::MessageAppended {
            thread_id,
            message_id,
            role: MessageRole::Assistant,
        } = event
        else {
            continue;
        };
        let Some(thread) = chat.thread(&thread_id) else {
            continue;
        };
        let Some(message) = thread.messages().iter().find(|m| m.id == message_id) else {
            continue;
        };

        if chat.current_thread_id().as_deref() == Some(thread_id.as_str()) {
            println!("\nagent> {}\n", message.content);
        } else {
            println!(
                "\n[answer saved to \"{}\" ({})]\nagent> {}\n",
                thread.title(),
                thread_id,
                message.content
            );
        }
    }
}

fn print_threads(chat: &ConversationController) {
    for summary in chat.threads() {
        let marker = if summary.is_active { '*' } else { ' ' };
        println!(
            "{} {}  {:<33}  {} messages  {}",
            marker,
            summary.id,
            summary.title,
            summary.message_count,
            summary.created_at.format("%Y-%m-%d %H:%M")
        );
    }
}

fn print_history(chat: &ConversationController) {
    let Some(id) = chat.current_thread_id() else {
        return;
    };
    let title = chat
        .thread(&id)
        .map(|t| t.title().to_string())
        .unwrap_or_default();
    println!("-- {} ({}) --", title, id);
    for message in chat.active_messages() {
        let speaker = match message.role {
            MessageRole::User => "you",
            MessageRole::Assistant => "agent",
        };
        println!("{}> {}", speaker, message.content);
    }
    if let Some(pending) = chat.pending_attachment() {
        println!("(attached: {}, {} bytes)", pending.name, pending.byte_size);
    }
}

fn init_logging(config: &CliConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let registry = tracing_subscriber::registry().with(env_filter);

    // stdout belongs to the conversation
    match config.logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
                .init();
        }
    }
}

//! `cyclemate ask`: one message, one reply.

use std::path::Path;

use cyclemate_agent::{ChatAssistant, ChatReply};
use tracing::{debug, warn};

pub async fn run(
    config_path: Option<&Path>,
    message: String,
    name: Option<String>,
    history: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;

    if !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    CYCLEMATE_API_KEY=...   (preferred)");
        eprintln!("    GEMINI_API_KEY=...");
        eprintln!("    GOOGLE_API_KEY=...");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", super::config_path(config_path).display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let request = super::build_request(message, name, history)?;
    debug!(history_len = request.history.len(), "Sending one-off chat request");
    let provider = cyclemate_providers::build_from_config(&config)?;
    let assistant = ChatAssistant::from_config(&config, provider);

    let reply = assistant.respond(&request).await;
    println!("{}", reply.reply_text());

    match reply {
        ChatReply::Succeeded { .. } => Ok(()),
        ChatReply::Failed(classification) => {
            warn!(kind = %classification.kind, status = ?classification.http_status, "Ask failed");
            Err(format!("provider call failed ({})", classification.kind).into())
        }
        ChatReply::Rejected(err) => {
            warn!(reason = %err, "Ask rejected");
            Err(format!("invalid request: {err}").into())
        }
    }
}

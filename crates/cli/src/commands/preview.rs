//! `cyclemate preview`: print the assembled turns as JSON.

use std::path::Path;

use cyclemate_agent::ChatAssistant;

pub fn run(
    config_path: Option<&Path>,
    message: String,
    name: Option<String>,
    history: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let request = super::build_request(message, name, history)?;

    // Preview never calls the provider, so a missing key is fine here.
    let provider = cyclemate_providers::build_from_config(&config)?;
    let assistant = ChatAssistant::from_config(&config, provider);

    let preview = assistant
        .preview(&request)
        .map_err(|e| format!("invalid request: {e}"))?;
    println!("{}", serde_json::to_string_pretty(&preview)?);

    Ok(())
}

//! The `wordcraft init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    let path = std::path::Path::new("wordcraft.toml");
    if path.exists() {
        println!("wordcraft.toml already exists, skipping.");
    } else {
        std::fs::write(path, SAMPLE_CONFIG)?;
        println!("Created wordcraft.toml");
    }

    println!("\nNext steps:");
    println!("  1. Pick a judge in wordcraft.toml and set its API key");
    println!("  2. Run: wordcraft today");
    println!("  3. Run: wordcraft define <word> \"<your definition>\"");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# wordcraft configuration

# Judge used by the CLI: "remote", "anthropic", "openai", "mock", or any name below.
default_judge = "remote"
# judge_model = "claude-sonnet-4-20250514"
# data_dir = "${HOME}/.local/share/wordcraft"
# bank = "my-words.json"

[judges.remote]
type = "remote"
base_url = "http://127.0.0.1:8787"

[judges.anthropic]
type = "anthropic"
api_key = "${ANTHROPIC_API_KEY}"

[judges.openai]
type = "openai"
api_key = "${OPENAI_API_KEY}"

[server]
bind = "127.0.0.1:8787"
judge = "anthropic"
rate_limit_max = 10
rate_limit_window_secs = 60
"#;

//! Config command - inspect the resolved configuration.

use anyhow::Result;
use arbiter_config::{ResolvedConfig, loader};

use crate::ConfigCommands;
use crate::theme::Theme;

pub(crate) fn handle_config(resolved: &ResolvedConfig, command: &ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => show(resolved),
        ConfigCommands::Paths => {
            paths(resolved);
            Ok(())
        },
    }
}

/// Print the merged configuration. The session token never appears.
fn show(resolved: &ResolvedConfig) -> Result<()> {
    println!("{}", toml::to_string_pretty(&resolved.config)?);
    if resolved.config.api.has_session_token() {
        println!("{}", Theme::dimmed("# api.session_token is set (hidden)"));
    }
    Ok(())
}

fn paths(resolved: &ResolvedConfig) {
    println!("\n{}", Theme::header("Configuration sources"));
    println!("{}", Theme::separator());

    match loader::user_config_path() {
        Some(path) => println!("user config:  {}", path.display()),
        None => println!("user config:  {}", Theme::dimmed("(no home directory)")),
    }

    if resolved.loaded_files.is_empty() {
        println!("{}", Theme::info("No config file loaded, using defaults"));
    }
    for file in &resolved.loaded_files {
        println!("{}", Theme::success(&format!("loaded {file}")));
    }
    for field in &resolved.env_fields {
        println!("{}", Theme::info(&format!("{field} from environment")));
    }
    println!();
}

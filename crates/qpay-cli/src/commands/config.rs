//! Configuration display commands.

use anyhow::Result;
use clap::Subcommand;
use serde::Serialize;

use super::GlobalOpts;
use crate::config::{self, mask_secret};
use crate::output::{print_json, print_key_value};

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration (default)
    Show,

    /// Show config file path
    Path,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfigView {
    base_url: String,
    username: String,
    password: String,
    invoice_code: String,
    callback_url: String,
}

fn or_not_set(value: &str) -> String {
    if value.is_empty() {
        "(not set)".to_string()
    } else {
        value.to_string()
    }
}

pub fn handle_config_command(opts: GlobalOpts, cmd: Option<ConfigCommands>) -> Result<()> {
    match cmd.unwrap_or(ConfigCommands::Show) {
        ConfigCommands::Show => show_config(opts),
        ConfigCommands::Path => show_path(),
    }
}

fn show_config(opts: GlobalOpts) -> Result<()> {
    let resolved = config::load(opts.sandbox)?;
    let view = ConfigView {
        base_url: or_not_set(&resolved.base_url),
        username: or_not_set(&resolved.username),
        password: mask_secret(&resolved.password),
        invoice_code: or_not_set(&resolved.invoice_code),
        callback_url: or_not_set(&resolved.callback_url),
    };

    if opts.json {
        return print_json(&view);
    }

    print_key_value("Base Url", &view.base_url);
    print_key_value("Username", &view.username);
    print_key_value("Password", &view.password);
    print_key_value("Invoice Code", &view.invoice_code);
    print_key_value("Callback Url", &view.callback_url);
    Ok(())
}

fn show_path() -> Result<()> {
    println!("{}", config::config_path()?.display());
    Ok(())
}

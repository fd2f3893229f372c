//! Interactive credential setup.

use anyhow::{Context, Result};
use console::{Term, style};

use crate::config::{self, ResolvedConfig};
use crate::output::print_success;

/// Prompts for merchant settings and saves them to the config file.
pub fn handle_setup() -> Result<()> {
    let existing = config::load(false)?;
    let term = Term::stdout();

    println!();
    println!("  {}", style("QPay CLI Setup").bold());
    println!("  Configure your QPay merchant credentials.");
    println!();

    let base_url = prompt(&term, "Base URL", &existing.base_url)?;
    let username = prompt(&term, "Username", &existing.username)?;
    let password = prompt_secret(&term, "Password")?;
    let invoice_code = prompt(&term, "Invoice Code", &existing.invoice_code)?;
    let callback_url = prompt(&term, "Callback URL", &existing.callback_url)?;

    let updated = ResolvedConfig {
        base_url,
        username,
        password: if password.is_empty() {
            existing.password
        } else {
            password
        },
        invoice_code,
        callback_url,
    };

    let path = config::config_path()?;
    config::save(&path, &updated.to_file_config())?;

    println!();
    print_success(&format!("Configuration saved to {}", path.display()));
    println!("  You can now use `qpay invoice create` to create invoices.");
    println!();

    Ok(())
}

/// Asks for a value, keeping `current` when the answer is blank.
fn prompt(term: &Term, label: &str, current: &str) -> Result<String> {
    let suffix = if current.is_empty() {
        String::new()
    } else {
        format!(" ({})", current)
    };
    term.write_str(&format!("  {}{}: ", label, suffix))?;

    let answer = term.read_line().context("Failed to read input")?;
    Ok(answer_or(answer, current))
}

/// Asks for a value without echoing it.
fn prompt_secret(term: &Term, label: &str) -> Result<String> {
    term.write_str(&format!("  {}: ", label))?;
    let answer = term.read_secure_line().context("Failed to read input")?;
    Ok(answer.trim().to_string())
}

fn answer_or(answer: String, current: &str) -> String {
    let answer = answer.trim();
    if answer.is_empty() {
        current.to_string()
    } else {
        answer.to_string()
    }
}

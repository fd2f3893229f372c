//! Output formatting utilities for CLI.

use anyhow::Result;
use console::style;
use serde::Serialize;
use serde_json::Value;

/// Prints a value as pretty JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Prints a key-value pair, skipping empty values.
pub fn print_key_value(key: &str, value: &str) {
    if !value.is_empty() {
        println!("  {} {}", style(format!("{}:", key)).dim(), value);
    }
}

/// Prints every field of a JSON object as a labelled line.
///
/// Nested values are shown as compact JSON; nulls and empty strings are skipped.
pub fn print_object(value: &Value) {
    let Value::Object(map) = value else {
        println!("  {}", value);
        return;
    };

    for (key, field) in map {
        let text = match field {
            Value::Null => continue,
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        print_key_value(&humanize_key(key), &text);
    }
}

/// Turns `invoice_status` or `invoiceStatus` into `Invoice Status`.
pub fn humanize_key(key: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();

    for c in key.chars() {
        if c == '_' || c == '-' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
        } else if c.is_uppercase() && !current.is_empty() {
            words.push(std::mem::take(&mut current));
            current.push(c);
        } else {
            current.push(c);
        }
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Prints a section header.
pub fn print_section(title: &str) {
    println!();
    println!("  {}", style(title).bold());
    println!();
}

/// Prints a success message.
pub fn print_success(message: &str) {
    println!("  {} {}", style("✓").green(), message);
}

/// Prints an error message.
pub fn print_error(message: &str) {
    eprintln!("  {} {}", style("Error:").red().bold(), message);
}

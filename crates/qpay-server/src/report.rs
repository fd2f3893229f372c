//! Console output for the listener.

use console::style;
use qpay_core::models::WebhookEvent;

/// Formats the console lines for a recorded event.
pub fn event_summary(event: &WebhookEvent) -> String {
    let status = if event.verified {
        style("PAID").green().bold()
    } else {
        style("UNPAID").yellow().bold()
    };

    let mut summary = format!(
        "  [{}] {} {}",
        event.timestamp.format("%H:%M:%S"),
        status,
        event.invoice_id
    );

    if let Some(payment) = &event.payment {
        let amount = payment
            .amount
            .map(|a| a.to_string())
            .unwrap_or_else(|| "-".to_string());
        summary.push_str(&format!("\n    Amount: {}", amount));
    }

    if let Some(error) = &event.error {
        summary.push_str(&format!("\n    Error: {}", style(error).red()));
    }

    summary
}

/// Prints the startup banner.
pub fn print_banner(port: u16) {
    println!();
    println!("  {}", style("QPay Webhook Listener").bold());
    println!("  Listening on {}", style(format!("http://localhost:{}", port)).cyan());
    println!("  Point your QPAY_CALLBACK_URL to this address.");
    println!("  {}", style("Press Ctrl+C to stop.").dim());
    println!();
}

/// Formats the shutdown summary.
pub fn shutdown_summary(count: usize) -> String {
    format!("Stopped. {} events received.", count)
}

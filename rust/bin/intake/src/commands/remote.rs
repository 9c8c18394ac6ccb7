//! Commands that talk to the intake service.

use anyhow::Result;
use intake_client::{FormSession, SubmissionClient, SubmitOutcome};
use intake_form::FormState;

use crate::config::ClientConfig;

/// Build the client from config.
pub fn build_client(config: &ClientConfig) -> Result<SubmissionClient> {
    if config.server.is_empty() {
        anyhow::bail!("No server URL set. Run `intake config --server <url>`.");
    }
    let client = SubmissionClient::new(config.server.clone())?.with_retry(config.retry_policy());
    Ok(client)
}

/// SUBMIT the current form. The draft is cleared only on success.
pub async fn submit(state: FormState, client: SubmissionClient) -> SubmitOutcome {
    FormSession::new(state, client).submit().await
}

/// Render a submit outcome for the terminal.
pub fn render_outcome(outcome: &SubmitOutcome, json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(&serde_json::json!({
            "success": outcome.success,
            "message": outcome.message,
            "data": outcome.data,
            "errors": outcome.errors,
            "attempts": outcome.attempts,
        }))?);
    }
    let mut out = vec![outcome.message.clone()];
    for e in &outcome.errors {
        out.push(format!("  {}: {}", e.field, e.message));
    }
    if let Some(record) = &outcome.data {
        out.push(format!("id:           {}", record.id));
        out.push(format!("submitted at: {}", record.submitted_at.to_rfc3339()));
    }
    if outcome.attempts > 1 {
        out.push(format!("({} attempts)", outcome.attempts));
    }
    Ok(out.join("\n"))
}

/// LIST one page of submissions.
pub async fn list(client: &SubmissionClient, page: usize, limit: usize, json: bool) -> Result<()> {
    let result = client.list(page, limit).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&result.data)?);
        return Ok(());
    }
    if result.data.is_empty() {
        println!("No submissions.");
    }
    for s in &result.data {
        println!(
            "{}  {}  {:<9} {:<10} {:<8} {}",
            s.id,
            s.submitted_at.format("%Y-%m-%d %H:%M"),
            s.product_line,
            s.er_code,
            s.model_number,
            s.name,
        );
    }
    let p = &result.pagination;
    println!(
        "page {} of {} ({} total){}",
        p.current,
        p.total,
        p.count,
        if p.has_more { ", more available" } else { "" }
    );
    Ok(())
}

/// GET one submission.
pub async fn get(client: &SubmissionClient, id: &str) -> Result<()> {
    let record = client.get(id).await?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

/// DELETE one submission.
pub async fn delete(client: &SubmissionClient, id: &str) -> Result<()> {
    let message = client.delete(id).await?;
    println!("{}", message);
    Ok(())
}

/// STATUS: check server health.
pub async fn status(config: &ClientConfig) -> Result<()> {
    println!("Server:    {}", if config.server.is_empty() { "-" } else { &config.server });
    if config.server.is_empty() {
        println!("Status:    no server configured");
        return Ok(());
    }

    let client = build_client(config)?;
    match client.health().await {
        Ok(h) => println!("Status:    connected ({})", h.timestamp),
        Err(e) => println!("Status:    disconnected ({})", e),
    }
    Ok(())
}

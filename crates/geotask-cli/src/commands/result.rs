use super::App;
use super::sessions::format_result;
use anyhow::{Context, Result};
use geotask_core::result::TaskPayload;
use geotask_infrastructure::codec::{PayloadRecord, decode_payload};
use std::fs;
use std::path::Path;

pub async fn get(app: &App, task_id: u32, session: Option<String>) -> Result<()> {
    let session_id = app.session_or_current(session).await?;

    match app.store.get_task_result(&session_id, task_id).await {
        Some(result) => print!("{}", format_result(&result)),
        None => println!("No result for task {} in session {}.", task_id, session_id),
    }
    Ok(())
}

pub async fn save(app: &App, task_id: u32, file: &Path, session: Option<String>) -> Result<()> {
    let payload = read_payload(file)?;
    payload
        .validate_submission()
        .with_context(|| format!("Rejected payload in {}", file.display()))?;

    let session_id = app.session_or_current(session).await?;
    let saved = app
        .store
        .save_task_result(&session_id, task_id, payload)
        .await
        .with_context(|| format!("Failed to save task {}; try again", task_id))?;

    println!(
        "✅ Saved task {} ({}, {} item(s)) for session {}",
        saved.task_id,
        saved.kind(),
        saved.payload.len(),
        session_id
    );
    Ok(())
}

fn read_payload(file: &Path) -> Result<TaskPayload> {
    let content =
        fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let record: PayloadRecord = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {} as a task payload", file.display()))?;
    Ok(decode_payload(record))
}

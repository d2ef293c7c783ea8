use super::App;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use geotask_core::gallery::{GalleryEntry, GalleryQuery, build_gallery};
use geotask_core::result::{TaskPayload, TaskResult};
use geotask_core::session::Session;
use geotask_infrastructure::codec::encode_result;

pub async fn list(app: &App, search: Option<String>) -> Result<()> {
    let sessions = app.store.get_all_sessions().await;
    let query = GalleryQuery { search };
    let gallery = build_gallery(sessions, &query, app.config.total_tasks);

    if gallery.is_empty() {
        println!("No sessions found.");
        return Ok(());
    }

    println!("📚 {} session(s)", gallery.len());
    for entry in &gallery {
        println!("{}", format_entry(entry));
    }
    Ok(())
}

pub async fn show(app: &App, id: &str, json: bool) -> Result<()> {
    let Some(session) = app.store.get_session(id).await else {
        println!("Session {} not found.", id);
        return Ok(());
    };

    if json {
        let records: Vec<_> = session.sorted_results().into_iter().map(encode_result).collect();
        let rendered =
            serde_json::to_string_pretty(&records).context("Failed to render results as JSON")?;
        println!("{}", rendered);
        return Ok(());
    }

    print!("{}", format_session(&session));
    Ok(())
}

pub async fn delete(app: &App, id: &str) -> Result<()> {
    let existed = app.store.session_exists(id).await;
    app.store
        .delete_session(id)
        .await
        .with_context(|| format!("Failed to delete session {}", id))?;

    if existed {
        println!("🗑️  Deleted session {}", id);
    } else {
        println!("Session {} not found (nothing to delete).", id);
    }
    Ok(())
}

fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M UTC").to_string()
}

fn format_entry(entry: &GalleryEntry) -> String {
    let stats = &entry.stats;
    format!(
        "  {}  {}  {:>3}% ({}/{})  polygons: {}  popups: {}",
        entry.session.id,
        format_timestamp(&entry.session.created_at),
        stats.progress_percent,
        stats.completed,
        stats.total,
        stats.polygons,
        stats.popups
    )
}

pub(crate) fn format_result(result: &TaskResult) -> String {
    let mut out = format!("Task {} [{}]\n", result.task_id, result.kind());
    match &result.payload {
        TaskPayload::Polygon(rings) => {
            for (index, ring) in rings.iter().enumerate() {
                let points: Vec<String> = ring
                    .iter()
                    .map(|p| format!("({}, {})", p.lat, p.lng))
                    .collect();
                out.push_str(&format!("  ring {}: {}\n", index + 1, points.join(" ")));
            }
        }
        TaskPayload::Popup(popups) => {
            for popup in popups {
                out.push_str(&format!(
                    "  ({}, {}) {:?}\n",
                    popup.position.lat, popup.position.lng, popup.content
                ));
            }
        }
    }
    if result.payload.is_empty() {
        out.push_str("  (empty)\n");
    }
    out
}

fn format_session(session: &Session) -> String {
    let mut out = format!(
        "Session {}\nCreated {}\n",
        session.id,
        format_timestamp(&session.created_at)
    );
    let results = session.sorted_results();
    if results.is_empty() {
        out.push_str("No results yet.\n");
    }
    for result in results {
        out.push_str(&format_result(result));
    }
    out
}

//! Gallery view over stored sessions.
//!
//! Pure functions that turn the sessions returned by
//! `ResultStore::get_all_sessions` into a filtered, ordered listing with
//! per-session statistics.

use crate::result::TaskKind;
use crate::session::Session;
use serde::Serialize;

/// Progress figures for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    /// Number of tasks with a saved result
    pub completed: usize,
    /// Number of tasks in the tutorial
    pub total: usize,
    /// Completed polygon tasks
    pub polygons: usize,
    /// Completed popup tasks
    pub popups: usize,
    /// `completed / total` as a rounded percentage
    pub progress_percent: u32,
}

impl SessionStats {
    pub fn for_session(session: &Session, total_tasks: usize) -> Self {
        let count = |kind: TaskKind| session.results.iter().filter(|r| r.kind() == kind).count();
        let polygons = count(TaskKind::Polygon);
        let popups = count(TaskKind::Popup);
        let completed = session.results.len();

        Self {
            completed,
            total: total_tasks,
            polygons,
            popups,
            progress_percent: progress_percent(completed, total_tasks),
        }
    }
}

fn progress_percent(completed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (completed as f64 / total as f64 * 100.0).round() as u32
}

/// Filter applied to the gallery listing.
#[derive(Debug, Clone, Default)]
pub struct GalleryQuery {
    /// Case-insensitive substring of the session id
    pub search: Option<String>,
}

impl GalleryQuery {
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: Some(term.into()),
        }
    }

    fn matches(&self, session: &Session) -> bool {
        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => session.id.to_lowercase().contains(&term.to_lowercase()),
        }
    }
}

/// A session as shown in the gallery.
#[derive(Debug, Clone, Serialize)]
pub struct GalleryEntry {
    pub session: Session,
    pub stats: SessionStats,
}

/// Builds the gallery listing.
///
/// Sessions are filtered by `query`, ordered newest first, and each entry's
/// results are sorted by task id.
pub fn build_gallery(
    sessions: Vec<Session>,
    query: &GalleryQuery,
    total_tasks: usize,
) -> Vec<GalleryEntry> {
    let mut entries: Vec<GalleryEntry> = sessions
        .into_iter()
        .filter(|session| query.matches(session))
        .map(|mut session| {
            session.results.sort_by_key(|r| r.task_id);
            let stats = SessionStats::for_session(&session, total_tasks);
            GalleryEntry { session, stats }
        })
        .collect();

    entries.sort_by(|a, b| b.session.created_at.cmp(&a.session.created_at));
    entries
}

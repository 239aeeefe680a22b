//! # Session Management
//!
//! A [`SessionManager`] maps caller-chosen ids to editing sessions. The
//! registry map sits behind a read/write lock that is only held long
//! enough to find or insert an entry; each session has its own mutex, so
//! operations on one session are serialized while different sessions
//! proceed independently.
//!
//! Every operation computes a new [`Document`] from the current one and
//! swaps it in only on success. Readers never see a half-applied edit and
//! a failed operation leaves the session exactly as it was.

use crate::config::EditorConfig;
use crate::document::{Document, Origin};
use crate::matcher::{find_matches, Match, MatchOptions, SymbolMatcher};
use crate::mutations::{Direction, Mutation, MutationResult};
use crate::pipeline::ThreadStyle;
use crate::summary::{path_steps, Location, NodeSummary, PathStep};
use crate::undo_stack::UndoStack;
use crate::{EditorError, EditorResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, TryLockError};
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// One in-progress editing context
#[derive(Debug)]
pub struct Session {
    pub id: String,
    document: Document,
    history: UndoStack,
    /// Incremented on every commit
    version: u64,
    created_at: DateTime<Utc>,
    last_used: Instant,
}

impl Session {
    fn new(id: String, document: Document, config: &EditorConfig) -> Self {
        Self {
            id,
            document,
            history: UndoStack::with_max_levels(config.history_limit),
            version: 0,
            created_at: Utc::now(),
            last_used: Instant::now(),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    fn touch(&mut self) {
        self.last_used = Instant::now();
    }

    /// Swap in a new document; tree changes are recorded for undo
    fn commit(&mut self, document: Document) {
        if self.document.tree_changed(&document) {
            let previous = std::mem::replace(&mut self.document, document);
            self.history.record(previous);
        } else {
            self.document = document;
        }
        self.version += 1;
        self.touch();
    }

    fn result(&self, replacements: Option<usize>) -> MutationResult {
        MutationResult {
            version: self.version,
            replacements,
            location: Location::of(self.document.cursor()),
        }
    }
}

/// Snapshot describing a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub id: String,
    pub origin: Origin,
    pub current: NodeSummary,
    /// Ancestors of the current node, outermost first
    pub path: Vec<PathStep>,
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub can_undo: bool,
    pub can_redo: bool,
}

/// What `save` did
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveOutcome {
    /// No target: the serialized text
    Text(String),
    /// Written to this file
    WrittenTo(PathBuf),
}

/// Registry of editing sessions
#[derive(Debug, Default)]
pub struct SessionManager {
    sessions: RwLock<HashMap<String, Arc<Mutex<Session>>>>,
    config: EditorConfig,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    pub fn with_config(config: EditorConfig) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            config,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Register a session
    ///
    /// With `from_file`, `source` is a path to read; otherwise it is the
    /// source text itself.
    #[instrument(skip(self, source), fields(len = source.len()))]
    pub fn create(&self, id: &str, source: &str, from_file: bool) -> EditorResult<()> {
        if self.read_sessions().contains_key(id) {
            return Err(EditorError::DuplicateId(id.to_string()));
        }

        let document = if from_file {
            Document::load(source)?
        } else {
            Document::from_source(source)?
        };

        let mut sessions = self.write_sessions();
        if sessions.contains_key(id) {
            return Err(EditorError::DuplicateId(id.to_string()));
        }
        let session = Session::new(id.to_string(), document, &self.config);
        sessions.insert(id.to_string(), Arc::new(Mutex::new(session)));

        info!(id, from_file, sessions = sessions.len(), "session created");
        Ok(())
    }

    /// Run `f` against the session's document and commit what it returns
    ///
    /// The session stays locked for the duration of `f`. An error from `f`
    /// leaves the session untouched.
    pub fn with_session<T, F>(&self, id: &str, f: F) -> EditorResult<T>
    where
        F: FnOnce(&Document) -> EditorResult<(Document, T)>,
    {
        let entry = self.entry(id)?;
        let mut session = lock(&entry);
        match f(&session.document) {
            Ok((document, value)) => {
                session.commit(document);
                Ok(value)
            }
            Err(e) => {
                session.touch();
                warn!(id, error = %e, "operation rejected, session unchanged");
                Err(e)
            }
        }
    }

    /// Apply one mutation
    #[instrument(skip(self, mutation), fields(op = mutation.name()))]
    pub fn apply(&self, id: &str, mutation: Mutation) -> EditorResult<MutationResult> {
        let entry = self.entry(id)?;
        let mut session = lock(&entry);
        match session.document.apply(&mutation, &self.config) {
            Ok((document, replacements)) => {
                session.commit(document);
                debug!(id, version = session.version, "mutation committed");
                Ok(session.result(replacements))
            }
            Err(e) => {
                session.touch();
                warn!(id, op = mutation.name(), error = %e, "mutation rejected, session unchanged");
                Err(e)
            }
        }
    }

    /// Apply several mutations as one all-or-nothing step
    ///
    /// The batch is committed once, so a single undo reverts all of it.
    #[instrument(skip(self, mutations), fields(count = mutations.len()))]
    pub fn apply_all(&self, id: &str, mutations: &[Mutation]) -> EditorResult<MutationResult> {
        let entry = self.entry(id)?;
        let mut session = lock(&entry);
        let mut current = session.document.clone();
        let mut replacements = None;

        for mutation in mutations {
            match current.apply(mutation, &self.config) {
                Ok((next, count)) => {
                    if let Some(count) = count {
                        replacements = Some(replacements.unwrap_or(0) + count);
                    }
                    current = next;
                }
                Err(e) => {
                    session.touch();
                    warn!(id, op = mutation.name(), error = %e, "batch rejected, session unchanged");
                    return Err(e);
                }
            }
        }

        session.commit(current);
        debug!(id, version = session.version, "batch committed");
        Ok(session.result(replacements))
    }

    pub fn navigate(&self, id: &str, direction: Direction) -> EditorResult<MutationResult> {
        self.apply(id, Mutation::Navigate { direction })
    }

    pub fn goto(&self, id: &str, path: &[usize]) -> EditorResult<MutationResult> {
        self.apply(id, Mutation::Goto { path: path.to_vec() })
    }

    pub fn replace(&self, id: &str, fragment: &str) -> EditorResult<MutationResult> {
        self.apply(
            id,
            Mutation::Replace {
                fragment: fragment.to_string(),
            },
        )
    }

    /// Rename every match; returns the number of replacements
    pub fn bulk_replace(
        &self,
        id: &str,
        query: &str,
        replacement: &str,
        options: MatchOptions,
    ) -> EditorResult<usize> {
        let result = self.apply(
            id,
            Mutation::BulkReplace {
                query: query.to_string(),
                replacement: replacement.to_string(),
                options,
            },
        )?;
        Ok(result.replacements.unwrap_or(0))
    }

    pub fn extract_to_let(&self, id: &str, name: &str) -> EditorResult<MutationResult> {
        self.apply(id, Mutation::ExtractToLet { name: name.to_string() })
    }

    pub fn thread(&self, id: &str, style: ThreadStyle) -> EditorResult<MutationResult> {
        self.apply(id, Mutation::Thread { style })
    }

    pub fn find_next(&self, id: &str, query: &str, options: MatchOptions) -> EditorResult<MutationResult> {
        self.apply(
            id,
            Mutation::FindNext {
                query: query.to_string(),
                options,
            },
        )
    }

    /// Matching atoms in document order; the session is not modified
    pub fn find(&self, id: &str, query: &str, options: MatchOptions) -> EditorResult<Vec<Match>> {
        let entry = self.entry(id)?;
        let matcher = SymbolMatcher::new(query, options)?;
        let mut session = lock(&entry);
        session.touch();
        Ok(find_matches(&session.document.tree(), &matcher))
    }

    pub fn info(&self, id: &str) -> EditorResult<SessionInfo> {
        let entry = self.entry(id)?;
        let mut session = lock(&entry);
        session.touch();

        let cursor = session.document.cursor();
        Ok(SessionInfo {
            id: session.id.clone(),
            origin: session.document.origin().clone(),
            current: NodeSummary::of(cursor, self.config.summary_width),
            path: path_steps(cursor),
            version: session.version,
            created_at: session.created_at,
            can_undo: session.history.can_undo(),
            can_redo: session.history.can_redo(),
        })
    }

    /// Serialized text of the current tree
    pub fn serialize(&self, id: &str) -> EditorResult<String> {
        let entry = self.entry(id)?;
        let mut session = lock(&entry);
        session.touch();
        Ok(session.document.source())
    }

    /// Write to `target`, else to the origin file, else return the text
    #[instrument(skip(self))]
    pub fn save(&self, id: &str, target: Option<&Path>) -> EditorResult<SaveOutcome> {
        let entry = self.entry(id)?;
        let mut session = lock(&entry);
        session.touch();

        let path = match target {
            Some(path) => path.to_path_buf(),
            None => match session.document.origin().path() {
                Some(path) => path.to_path_buf(),
                None => return Ok(SaveOutcome::Text(session.document.source())),
            },
        };
        session.document.save_to(&path)?;
        info!(id, path = %path.display(), "session saved");
        Ok(SaveOutcome::WrittenTo(path))
    }

    pub fn undo(&self, id: &str) -> EditorResult<MutationResult> {
        let entry = self.entry(id)?;
        let mut guard = lock(&entry);
        let session = &mut *guard;
        let previous = session
            .history
            .undo(&session.document)
            .ok_or(EditorError::NothingToUndo)?;
        session.document = previous;
        session.version += 1;
        session.touch();
        Ok(session.result(None))
    }

    pub fn redo(&self, id: &str) -> EditorResult<MutationResult> {
        let entry = self.entry(id)?;
        let mut guard = lock(&entry);
        let session = &mut *guard;
        let next = session
            .history
            .redo(&session.document)
            .ok_or(EditorError::NothingToRedo)?;
        session.document = next;
        session.version += 1;
        session.touch();
        Ok(session.result(None))
    }

    #[instrument(skip(self))]
    pub fn close(&self, id: &str) -> EditorResult<()> {
        let mut sessions = self.write_sessions();
        sessions
            .remove(id)
            .ok_or_else(|| EditorError::UnknownSession(id.to_string()))?;
        info!(id, sessions = sessions.len(), "session closed");
        Ok(())
    }

    /// Ids of all open sessions, sorted
    pub fn list(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.read_sessions().keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.read_sessions().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop sessions idle longer than the configured timeout
    ///
    /// Sessions busy with an operation are never evicted. Returns the
    /// evicted ids; does nothing when no timeout is configured.
    pub fn evict_idle(&self) -> Vec<String> {
        let Some(timeout) = self.config.idle_timeout() else {
            return Vec::new();
        };

        let mut sessions = self.write_sessions();
        let mut evicted: Vec<String> = sessions
            .iter()
            .filter(|(_, entry)| match entry.try_lock() {
                Ok(session) => session.last_used.elapsed() >= timeout,
                Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner().last_used.elapsed() >= timeout,
                Err(TryLockError::WouldBlock) => false,
            })
            .map(|(id, _)| id.clone())
            .collect();
        evicted.sort();

        for id in &evicted {
            sessions.remove(id);
            warn!(id = %id, "evicted idle session");
        }
        evicted
    }

    fn entry(&self, id: &str) -> EditorResult<Arc<Mutex<Session>>> {
        self.read_sessions()
            .get(id)
            .cloned()
            .ok_or_else(|| EditorError::UnknownSession(id.to_string()))
    }

    fn read_sessions(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Arc<Mutex<Session>>>> {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_sessions(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Arc<Mutex<Session>>>> {
        self.sessions.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Lock a session; a panic in another operation leaves the last committed
/// document in place, so a poisoned lock is still usable
fn lock(entry: &Mutex<Session>) -> MutexGuard<'_, Session> {
    entry.lock().unwrap_or_else(PoisonError::into_inner)
}

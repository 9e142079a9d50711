use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, warn};

use super::token;

/// Session file name inside the state directory
const SESSION_FILE: &str = "session.json";

/// Saved tokens older than this are not restored.
/// The backend issues tokens with a six hour lifetime.
const TOKEN_EXPIRY_HOURS: i64 = 6;

/// Login flow status, driven by the auth transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

#[derive(Debug, Clone, Default)]
struct SessionState {
    status: AuthStatus,
    token: Option<String>,
}

impl SessionState {
    fn logged_in(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// Snapshot published to subscribers whenever the session changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionSnapshot {
    pub status: AuthStatus,
    pub logged_in: bool,
}

/// Persisted form. The token (and when it was obtained) is the only
/// session state that outlives the process; everything else is rebuilt on
/// startup.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedSession {
    token: String,
    created_at: DateTime<Utc>,
}

impl PersistedSession {
    fn is_expired(&self) -> bool {
        Utc::now() > self.created_at + Duration::hours(TOKEN_EXPIRY_HOURS)
    }
}

/// Owned session state for the dashboards.
///
/// Holds the bearer token and the status of the most recent login flow,
/// persists the token under one well-known file so a restart stays logged
/// in, and notifies subscribers on every change. Constructed once by the
/// application root and handed to the API client - never ambient.
pub struct SessionStore {
    state_dir: PathBuf,
    state: Mutex<SessionState>,
    notify: watch::Sender<SessionSnapshot>,
}

impl SessionStore {
    /// Open a session store backed by `state_dir`, restoring any
    /// previously saved token. A restored token counts as a logged-in
    /// session.
    pub fn open(state_dir: PathBuf) -> Result<Self> {
        let (notify, _) = watch::channel(SessionSnapshot::default());
        let store = Self {
            state_dir,
            state: Mutex::new(SessionState::default()),
            notify,
        };
        store.restore()?;
        Ok(store)
    }

    fn restore(&self) -> Result<()> {
        let path = self.session_path();
        if !path.exists() {
            return Ok(());
        }
        let contents =
            std::fs::read_to_string(&path).context("Failed to read session file")?;
        match serde_json::from_str::<PersistedSession>(&contents) {
            Ok(saved) if saved.is_expired() => {
                debug!("saved session token has expired, not restoring");
            }
            Ok(saved) if !saved.token.is_empty() => {
                self.transition(|state| {
                    state.status = AuthStatus::Success;
                    state.token = Some(saved.token);
                });
            }
            Ok(_) => {}
            Err(err) => warn!(error = %err, "ignoring unreadable session file"),
        }
        Ok(())
    }

    // ===== Auth transitions =====

    /// A login attempt has started.
    pub fn begin_login(&self) {
        self.transition(|state| state.status = AuthStatus::Loading);
    }

    /// A login attempt succeeded; commit and persist the token.
    pub fn complete_login(&self, token: String) {
        self.transition(|state| {
            state.status = AuthStatus::Success;
            state.token = Some(token.clone());
        });
        if let Err(err) = self.save(&token) {
            warn!(error = %err, "failed to persist session token");
        }
    }

    /// A login attempt failed; drop any token, in memory and on disk.
    pub fn fail_login(&self) {
        self.transition(|state| {
            state.status = AuthStatus::Error;
            state.token = None;
        });
        if let Err(err) = self.remove_saved() {
            warn!(error = %err, "failed to remove persisted session");
        }
    }

    /// Explicit logout: back to idle with no token anywhere.
    pub fn logout(&self) -> Result<()> {
        self.transition(|state| {
            state.status = AuthStatus::Idle;
            state.token = None;
        });
        self.remove_saved()
    }

    /// Forced logout driven by an unauthorized response. Same observable
    /// effect as `logout`, but never fails outward - the caller is already
    /// in an error path.
    pub fn invalidate(&self) {
        self.transition(|state| {
            state.status = AuthStatus::Idle;
            state.token = None;
        });
        if let Err(err) = self.remove_saved() {
            warn!(error = %err, "failed to remove persisted session");
        }
    }

    // ===== Readers =====

    /// The bearer token, when a non-empty one is held.
    pub fn token(&self) -> Option<String> {
        let state = self.lock();
        state.token.clone().filter(|t| !t.is_empty())
    }

    /// True iff a non-empty token is held.
    pub fn is_logged_in(&self) -> bool {
        self.lock().logged_in()
    }

    pub fn status(&self) -> AuthStatus {
        self.lock().status
    }

    /// Watch for session changes; the receiver always sees the latest
    /// snapshot.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.notify.subscribe()
    }

    // ===== Display-only token fields =====

    /// Name to show for the logged-in user; empty when no token is held or
    /// the token payload is unreadable.
    pub fn display_name(&self) -> String {
        self.claim(|claims| claims.display_name)
    }

    /// Role claim, for display only; same degradation as `display_name`.
    pub fn role(&self) -> String {
        self.claim(|claims| claims.role)
    }

    pub fn email(&self) -> String {
        self.claim(|claims| claims.email)
    }

    fn claim(&self, pick: impl FnOnce(token::TokenClaims) -> String) -> String {
        self.token()
            .and_then(|t| token::decode_claims(&t))
            .map(pick)
            .unwrap_or_default()
    }

    // ===== Internals =====

    fn transition(&self, apply: impl FnOnce(&mut SessionState)) {
        let snapshot = {
            let mut state = self.lock();
            apply(&mut state);
            SessionSnapshot {
                status: state.status,
                logged_in: state.logged_in(),
            }
        };
        self.notify.send_replace(snapshot);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn save(&self, token: &str) -> Result<()> {
        let path = self.session_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(&PersistedSession {
            token: token.to_string(),
            created_at: Utc::now(),
        })?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn remove_saved(&self) -> Result<()> {
        let path = self.session_path();
        if path.exists() {
            std::fs::remove_file(path).context("Failed to remove session file")?;
        }
        Ok(())
    }

    fn session_path(&self) -> PathBuf {
        self.state_dir.join(SESSION_FILE)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;

    fn store_in(dir: &TempDir) -> SessionStore {
        SessionStore::open(dir.path().to_path_buf()).unwrap()
    }

    #[test]
    fn login_flow_walks_the_status_machine() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert_eq!(store.status(), AuthStatus::Idle);
        assert!(!store.is_logged_in());

        store.begin_login();
        assert_eq!(store.status(), AuthStatus::Loading);

        store.complete_login("abc".to_string());
        assert_eq!(store.status(), AuthStatus::Success);
        assert!(store.is_logged_in());
        assert_eq!(store.token().as_deref(), Some("abc"));
    }

    #[test]
    fn failed_login_clears_the_token() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.complete_login("abc".to_string());

        store.begin_login();
        store.fail_login();
        assert_eq!(store.status(), AuthStatus::Error);
        assert!(!store.is_logged_in());
        assert_eq!(store.token(), None);
    }

    #[test]
    fn logout_resets_to_idle_from_any_state() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.complete_login("abc".to_string());

        store.logout().unwrap();
        assert_eq!(store.status(), AuthStatus::Idle);
        assert!(!store.is_logged_in());

        // idempotent from idle too
        store.logout().unwrap();
        assert_eq!(store.status(), AuthStatus::Idle);
    }

    #[test]
    fn token_survives_reopening_the_store() {
        let dir = TempDir::new().unwrap();
        store_in(&dir).complete_login("abc".to_string());

        let reopened = store_in(&dir);
        assert!(reopened.is_logged_in());
        assert_eq!(reopened.status(), AuthStatus::Success);
        assert_eq!(reopened.token().as_deref(), Some("abc"));
    }

    #[test]
    fn logout_removes_the_persisted_token() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.complete_login("abc".to_string());
        store.logout().unwrap();

        let reopened = store_in(&dir);
        assert!(!reopened.is_logged_in());
        assert_eq!(reopened.status(), AuthStatus::Idle);
    }

    #[test]
    fn expired_saved_token_is_not_restored() {
        let dir = TempDir::new().unwrap();
        let stale = PersistedSession {
            token: "abc".to_string(),
            created_at: Utc::now() - Duration::hours(TOKEN_EXPIRY_HOURS + 1),
        };
        std::fs::write(
            dir.path().join(SESSION_FILE),
            serde_json::to_string(&stale).unwrap(),
        )
        .unwrap();

        let store = store_in(&dir);
        assert!(!store.is_logged_in());
        assert_eq!(store.status(), AuthStatus::Idle);
    }

    #[test]
    fn empty_token_does_not_count_as_logged_in() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.complete_login(String::new());
        assert!(!store.is_logged_in());
        assert_eq!(store.token(), None);
    }

    #[test]
    fn subscribers_see_session_changes() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let rx = store.subscribe();

        store.begin_login();
        assert_eq!(rx.borrow().status, AuthStatus::Loading);

        store.complete_login("abc".to_string());
        let snapshot = *rx.borrow();
        assert_eq!(snapshot.status, AuthStatus::Success);
        assert!(snapshot.logged_in);
    }

    #[test]
    fn display_fields_come_from_the_token_payload() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.complete_login(token::fake_jwt(json!({
            "displayName": "Jo Bloggs",
            "role": "portal-user"
        })));
        assert_eq!(store.display_name(), "Jo Bloggs");
        assert_eq!(store.role(), "portal-user");
        assert_eq!(store.email(), "");
    }

    #[test]
    fn unreadable_token_degrades_to_empty_display_values() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.complete_login("opaque-but-not-a-jwt".to_string());
        assert!(store.is_logged_in());
        assert_eq!(store.display_name(), "");
        assert_eq!(store.role(), "");
    }

    #[test]
    fn corrupt_session_file_is_ignored_on_open() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(SESSION_FILE), "not json").unwrap();

        let store = store_in(&dir);
        assert!(!store.is_logged_in());
        assert_eq!(store.status(), AuthStatus::Idle);
    }
}

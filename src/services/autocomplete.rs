//! Push-driven autocomplete session for entity mentions.
//!
//! The host forwards editor events (key-down, key-up, blur, viewport moves,
//! pointer activity) and renders the popover from [`SessionEvent`]s. The
//! session itself owns the lifecycle: it re-reads the token under the caret
//! on every content keystroke, debounces the lookup, and replaces the token
//! with a mention span on accept. Dropping the event receiver is the
//! unsubscribe.
//!
//! The controller must live inside a tokio runtime; debounced lookups are
//! spawned tasks. A lookup superseded before its debounce fires never
//! dispatches; one superseded while in flight is discarded on arrival via
//! a session generation check.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::error::WeaveError;
use crate::markup::codec;
use crate::models::{EntityMention, Suggestion};
use crate::services::suggest::SuggestionProvider;
use crate::surface::{anchor_point, word_at_caret, Caret, EditorSurface, Point, SelectionRange};

/// Tunables for the autocomplete session.
#[derive(Debug, Clone)]
pub struct AutocompleteConfig {
    /// Shortest token (in characters) that triggers a lookup.
    pub min_token_len: usize,
    /// Quiet period between the last keystroke and the lookup dispatch.
    pub debounce: Duration,
    /// Rows requested per lookup.
    pub result_limit: usize,
    /// Vertical gap between the selection and the popover anchor.
    pub anchor_gap: f64,
}

impl Default for AutocompleteConfig {
    fn default() -> Self {
        Self {
            min_token_len: 3,
            debounce: Duration::from_millis(150),
            result_limit: 10,
            anchor_gap: 6.0,
        }
    }
}

/// Keyboard input in host-independent form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorKey {
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Control,
    Alt,
    Meta,
    Shift,
    Tab,
    Escape,
    Enter,
    Backspace,
    Delete,
    Char(char),
}

impl EditorKey {
    /// Keys that cannot have changed the token under the caret.
    fn is_navigation(self) -> bool {
        matches!(
            self,
            EditorKey::ArrowLeft
                | EditorKey::ArrowRight
                | EditorKey::ArrowUp
                | EditorKey::ArrowDown
                | EditorKey::Control
                | EditorKey::Alt
                | EditorKey::Meta
                | EditorKey::Shift
                | EditorKey::Tab
                | EditorKey::Escape
                | EditorKey::Enter
        )
    }
}

/// What the controller did with a key-down event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDisposition {
    /// Consumed; the host must suppress the editor's default handling.
    Handled,
    /// Not for the session; let the editor handle it normally.
    Pass,
}

/// Popover lifecycle notifications.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Opened {
        items: Vec<Suggestion>,
        active: usize,
        anchor: Option<Point>,
    },
    ActiveChanged {
        active: usize,
    },
    Repositioned {
        anchor: Option<Point>,
    },
    Closed,
}

/// Coarse session state, for hosts that poll instead of subscribing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Debouncing,
    Suggesting,
}

enum Phase {
    Idle,
    Suggesting {
        items: Vec<Suggestion>,
        active: usize,
        anchor: Option<Point>,
    },
}

struct AcState {
    scope: Option<String>,
    phase: Phase,
    /// A lookup is scheduled but has not applied yet.
    pending: bool,
    /// The key-up paired with an accepting key-down must not start a lookup.
    suppress_next_key_up: bool,
}

struct Inner {
    config: AutocompleteConfig,
    provider: Arc<dyn SuggestionProvider>,
    events: broadcast::Sender<SessionEvent>,
    state: Mutex<AcState>,
    /// Bumped on every schedule and every close; a lookup only applies if
    /// the generation it was scheduled under is still current.
    generation: AtomicU64,
}

impl Inner {
    fn lock_state(&self) -> MutexGuard<'_, AcState> {
        self.state.lock().expect("autocomplete state mutex")
    }

    fn close_locked(&self, state: &mut AcState) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        state.pending = false;
        if matches!(state.phase, Phase::Suggesting { .. }) {
            state.phase = Phase::Idle;
            let _ = self.events.send(SessionEvent::Closed);
        }
    }
}

/// One entity-mention autocomplete session over an editing surface.
#[derive(Clone)]
pub struct AutocompleteController {
    inner: Arc<Inner>,
}

impl AutocompleteController {
    pub fn new(provider: Arc<dyn SuggestionProvider>, config: AutocompleteConfig) -> Self {
        let (events, _) = broadcast::channel(32);
        Self {
            inner: Arc::new(Inner {
                config,
                provider,
                events,
                state: Mutex::new(AcState {
                    scope: None,
                    phase: Phase::Idle,
                    pending: false,
                    suppress_next_key_up: false,
                }),
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// Collection the session looks entities up in. `None` disables lookups.
    pub fn set_scope(&self, scope: Option<String>) {
        self.inner.lock_state().scope = scope;
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    pub fn phase(&self) -> SessionPhase {
        let state = self.inner.lock_state();
        match state.phase {
            Phase::Suggesting { .. } => SessionPhase::Suggesting,
            Phase::Idle if state.pending => SessionPhase::Debouncing,
            Phase::Idle => SessionPhase::Idle,
        }
    }

    /// Current suggestion rows, empty while closed.
    pub fn items(&self) -> Vec<Suggestion> {
        match &self.inner.lock_state().phase {
            Phase::Suggesting { items, .. } => items.clone(),
            Phase::Idle => Vec::new(),
        }
    }

    pub fn active_index(&self) -> Option<usize> {
        match &self.inner.lock_state().phase {
            Phase::Suggesting { active, .. } => Some(*active),
            Phase::Idle => None,
        }
    }

    pub fn anchor(&self) -> Option<Point> {
        match &self.inner.lock_state().phase {
            Phase::Suggesting { anchor, .. } => *anchor,
            Phase::Idle => None,
        }
    }

    /// Key-down while the list is open: arrows move the active row, Escape
    /// closes, Enter or plain Tab accepts the active row. Everything else,
    /// and every key while the list is closed, passes through.
    pub fn handle_key_down(
        &self,
        surface: &mut dyn EditorSurface,
        key: EditorKey,
        shift: bool,
    ) -> KeyDisposition {
        let mut state = self.inner.lock_state();
        let Phase::Suggesting { items, active, .. } = &mut state.phase else {
            return KeyDisposition::Pass;
        };
        let len = items.len();
        match key {
            EditorKey::ArrowDown => {
                *active = (*active + 1).min(len.saturating_sub(1));
                let _ = self
                    .inner
                    .events
                    .send(SessionEvent::ActiveChanged { active: *active });
                KeyDisposition::Handled
            }
            EditorKey::ArrowUp => {
                *active = active.saturating_sub(1);
                let _ = self
                    .inner
                    .events
                    .send(SessionEvent::ActiveChanged { active: *active });
                KeyDisposition::Handled
            }
            EditorKey::Escape => {
                self.inner.close_locked(&mut state);
                KeyDisposition::Handled
            }
            EditorKey::Enter => {
                let index = *active;
                self.accept(surface, state, index, true)
            }
            EditorKey::Tab if !shift => {
                let index = *active;
                self.accept(surface, state, index, true)
            }
            _ => KeyDisposition::Pass,
        }
    }

    /// Key-up drives the lookup cycle: the token under the caret is
    /// re-read and a debounced lookup is scheduled when it is long enough.
    /// Navigation keys leave an open list untouched.
    pub fn handle_key_up(&self, surface: &dyn EditorSurface, key: EditorKey) {
        let mut state = self.inner.lock_state();
        if state.suppress_next_key_up {
            state.suppress_next_key_up = false;
            return;
        }
        if key.is_navigation() {
            return;
        }
        let Some(scope) = state.scope.clone() else {
            self.inner.close_locked(&mut state);
            return;
        };
        let token = word_at_caret(surface)
            .map(|hit| hit.text)
            .unwrap_or_default();
        if token.chars().count() < self.inner.config.min_token_len {
            self.inner.close_locked(&mut state);
            return;
        }
        // Anchor is captured now so the popover opens where the token was
        // typed, even if the view scrolls during the debounce.
        let anchor = anchor_point(surface, self.inner.config.anchor_gap);
        state.pending = true;
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        drop(state);
        self.spawn_lookup(scope, token, anchor, generation);
    }

    /// Focus left the surface.
    pub fn handle_blur(&self) {
        let mut state = self.inner.lock_state();
        self.inner.close_locked(&mut state);
    }

    /// Close the list without inserting (outside click, route change).
    pub fn dismiss(&self) {
        let mut state = self.inner.lock_state();
        self.inner.close_locked(&mut state);
    }

    /// Viewport scrolled or resized: re-anchor an open list in place
    /// without touching its rows.
    pub fn handle_viewport_change(&self, surface: &dyn EditorSurface) {
        let mut state = self.inner.lock_state();
        if let Phase::Suggesting { anchor, .. } = &mut state.phase {
            let next = anchor_point(surface, self.inner.config.anchor_gap);
            *anchor = next;
            let _ = self
                .inner
                .events
                .send(SessionEvent::Repositioned { anchor: next });
        }
    }

    /// Pointer hover over a row previews it as active.
    pub fn pointer_preview(&self, index: usize) {
        let mut state = self.inner.lock_state();
        if let Phase::Suggesting { items, active, .. } = &mut state.phase {
            if index < items.len() && *active != index {
                *active = index;
                let _ = self
                    .inner
                    .events
                    .send(SessionEvent::ActiveChanged { active: index });
            }
        }
    }

    /// Pointer press on a row accepts it. Hosts call this in the press
    /// phase, before the press can steal focus from the surface.
    pub fn pointer_accept(&self, surface: &mut dyn EditorSurface, index: usize) {
        let state = self.inner.lock_state();
        self.accept(surface, state, index, false);
    }

    fn accept(
        &self,
        surface: &mut dyn EditorSurface,
        mut state: MutexGuard<'_, AcState>,
        index: usize,
        from_keyboard: bool,
    ) -> KeyDisposition {
        let choice = match &state.phase {
            Phase::Suggesting { items, .. } => items.get(index).cloned(),
            Phase::Idle => None,
        };
        let Some(choice) = choice else {
            return KeyDisposition::Pass;
        };
        if from_keyboard {
            state.suppress_next_key_up = true;
        }
        self.inner.close_locked(&mut state);
        drop(state);
        if let Err(err) = insert_mention(surface, &choice) {
            warn!(error = %err, "mention insertion failed");
        }
        KeyDisposition::Handled
    }

    fn spawn_lookup(
        &self,
        scope: String,
        query: String,
        anchor: Option<Point>,
        generation: u64,
    ) {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            tokio::time::sleep(inner.config.debounce).await;
            if inner.generation.load(Ordering::SeqCst) != generation {
                return; // superseded before dispatch, never looked up
            }
            let result = inner
                .provider
                .suggest(&scope, &query, inner.config.result_limit)
                .await;
            let mut state = inner.lock_state();
            if inner.generation.load(Ordering::SeqCst) != generation {
                debug!(query, "discarding suggestions for a superseded query");
                return;
            }
            state.pending = false;
            match result {
                Ok(items) if !items.is_empty() => {
                    let active = 0;
                    state.phase = Phase::Suggesting {
                        items: items.clone(),
                        active,
                        anchor,
                    };
                    let _ = inner.events.send(SessionEvent::Opened {
                        items,
                        active,
                        anchor,
                    });
                }
                Ok(_) => inner.close_locked(&mut state),
                Err(err) => {
                    warn!(error = %err, query, "suggestion lookup failed");
                    inner.close_locked(&mut state);
                }
            }
        });
    }
}

/// Replace the token under the caret with the chosen entity's mention span,
/// one undo step, caret after the span.
fn insert_mention(surface: &mut dyn EditorSurface, choice: &Suggestion) -> Result<(), WeaveError> {
    let mention = EntityMention::new(choice.entity_type, choice.id.clone(), choice.label.clone());
    let markup = codec::encode_mention(&mention);
    let target = word_at_caret(surface);
    surface.run_transaction(&mut |s| {
        if let Some(hit) = &target {
            s.set_selection(SelectionRange::new(
                Caret::new(hit.node, hit.start),
                Caret::new(hit.node, hit.end),
            ))?;
        }
        s.splice(&markup)?;
        s.collapse_selection(true);
        Ok(())
    })
}

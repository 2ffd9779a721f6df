use serde_json::Value;
use thiserror::Error;

use crate::model::{ExpressionPair, TranslationRecord, TranslationTable};
use crate::prompt::build_prompt;
use crate::store::{DurableStore, Persistence, ScopeKey};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum InjectError {
    #[error("Invalid input: Expected an array.")]
    NotAnArray,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    pub pairs: Vec<ExpressionPair>,
    pub pending_context: Option<String>,
    pub translations: TranslationTable,
    pub scope: ScopeKey,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionSnapshot {
    pub text: String,
    pub collapsed: bool,
    pub block_context: Option<String>,
}

impl SelectionSnapshot {
    fn usable_text(&self) -> Option<&str> {
        let text = self.text.trim();
        if self.collapsed || text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyInput {
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shortcut {
    SetContext,
    CommitExpression,
    Reset,
}

impl Shortcut {
    pub fn from_key(input: &KeyInput) -> Option<Self> {
        if !(input.ctrl || input.meta) {
            return None;
        }
        match (input.key.as_str(), input.shift) {
            ("ArrowUp", false) => Some(Shortcut::SetContext),
            ("ArrowUp", true) => Some(Shortcut::CommitExpression),
            ("ArrowDown", false) => Some(Shortcut::Reset),
            _ => None,
        }
    }

    pub fn needs_selection(self) -> bool {
        !matches!(self, Shortcut::Reset)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub success: bool,
}

impl Notice {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            success: true,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            success: false,
        }
    }

    pub fn prompt_copied(pairs: usize) -> Self {
        Self::ok(format!("✅ Prompt for {pairs} pair(s) copied to clipboard!"))
    }

    pub fn prompt_failed() -> Self {
        Self::failed("❌ Failed to copy prompt to clipboard.")
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    ClearSelection,
    Render,
    Notify(Notice),
    /// `announce` is false after a failed save so the copy toast does not
    /// replace the save failure.
    CopyPrompt { text: String, announce: bool },
    Alert(String),
}

pub struct Controller<S> {
    session: Session,
    persistence: Persistence<S>,
}

impl<S: DurableStore> Controller<S> {
    pub fn new(persistence: Persistence<S>) -> Self {
        let session = Session {
            pairs: Vec::new(),
            pending_context: None,
            translations: TranslationTable::new(),
            scope: persistence.global_scope(),
        };
        Self {
            session,
            persistence,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn persistence(&self) -> &Persistence<S> {
        &self.persistence
    }

    pub fn restore(&mut self) -> Vec<Effect> {
        let loaded = self.persistence.load();
        if loaded.scope.is_page() {
            let count = loaded.pairs.len();
            self.session.pairs = loaded.pairs;
            for record in loaded.translations.values() {
                self.session.translations.upsert(record.clone());
            }
            self.session.scope = loaded.scope;
            tracing::info!(key = self.session.scope.as_str(), pairs = count, "restored page highlights");
            return vec![
                Effect::Render,
                Effect::Notify(Notice::ok(format!(
                    "✅ Loaded {count} saved highlights for this page."
                ))),
            ];
        }
        if loaded.pairs.is_empty() {
            tracing::debug!("nothing to restore");
            return Vec::new();
        }
        tracing::info!(pairs = loaded.pairs.len(), "restored global highlights");
        self.session.pairs = loaded.pairs;
        self.session.scope = loaded.scope;
        vec![Effect::Render]
    }

    pub fn handle(&mut self, shortcut: Shortcut, selection: &SelectionSnapshot) -> Vec<Effect> {
        match shortcut {
            Shortcut::SetContext => self.set_context(selection),
            Shortcut::CommitExpression => self.commit_expression(selection),
            Shortcut::Reset => self.reset(),
        }
    }

    pub fn set_context(&mut self, selection: &SelectionSnapshot) -> Vec<Effect> {
        let Some(text) = selection.usable_text() else {
            return Vec::new();
        };
        self.session.pending_context = Some(text.to_string());
        vec![
            Effect::ClearSelection,
            Effect::Render,
            Effect::Notify(Notice::ok("Yellow context set. Now highlight an expression.")),
        ]
    }

    pub fn commit_expression(&mut self, selection: &SelectionSnapshot) -> Vec<Effect> {
        let Some(expression) = selection.usable_text() else {
            return Vec::new();
        };

        let context = match self.session.pending_context.as_deref() {
            Some(context) => context.to_string(),
            None => match selection.block_context.as_deref().map(str::trim) {
                Some(block) if !block.is_empty() => block.to_string(),
                _ => {
                    return vec![Effect::Notify(Notice::failed(
                        "❌ Auto-context failed. Please set a context manually first.",
                    ))]
                }
            },
        };

        self.session
            .pairs
            .push(ExpressionPair::new(context, expression));
        self.session.pending_context = None;

        let saved = self.save();
        let mut effects = vec![Effect::ClearSelection, Effect::Render];
        if let Err(notice) = &saved {
            effects.push(Effect::Notify(notice.clone()));
        }
        match build_prompt(&self.session.pairs) {
            Ok(Some(text)) => effects.push(Effect::CopyPrompt {
                text,
                announce: saved.is_ok(),
            }),
            Ok(None) => {}
            Err(err) => tracing::error!(error = %err, "failed to build prompt"),
        }
        effects
    }

    pub fn reset(&mut self) -> Vec<Effect> {
        if let Err(err) = self.persistence.reset(&self.session.scope) {
            tracing::warn!(key = self.session.scope.as_str(), error = %err, "failed to delete record");
        }
        self.session.pairs.clear();
        self.session.pending_context = None;
        self.session.translations.clear();
        self.session.scope = self.persistence.global_scope();
        vec![
            Effect::Render,
            Effect::Notify(Notice::ok("All highlights for this context cleared.")),
        ]
    }

    pub fn inject(&mut self, input: &Value) -> Vec<Effect> {
        let (supplied, records) = match parse_injection(input) {
            Ok(parsed) => parsed,
            Err(err) => {
                tracing::warn!(error = %err, "rejected translation injection");
                return vec![Effect::Alert(format!("❌ {err}"))];
            }
        };

        let accepted = records.len();
        for record in records {
            self.session.translations.upsert(record);
        }
        self.session.scope = self.persistence.page_scope();
        tracing::info!(supplied, accepted, key = self.session.scope.as_str(), "injected translations");

        let notice = match self.save() {
            Ok(()) => Notice::ok(format!(
                "✅ Injected and saved {supplied} translations for this page."
            )),
            Err(failed) => failed,
        };
        vec![Effect::Notify(notice)]
    }

    fn save(&self) -> Result<(), Notice> {
        let session = &self.session;
        match self
            .persistence
            .save(&session.scope, &session.pairs, &session.translations)
        {
            Ok(()) => Ok(()),
            Err(err) => {
                tracing::error!(key = session.scope.as_str(), error = %err, "failed to save state");
                Err(Notice::failed("Error: Could not save highlights."))
            }
        }
    }
}

fn parse_injection(input: &Value) -> Result<(usize, Vec<TranslationRecord>), InjectError> {
    let items = input.as_array().ok_or(InjectError::NotAnArray)?;
    let records = items.iter().filter_map(TranslationRecord::from_value).collect();
    Ok((items.len(), records))
}

//! Durable per-page / global persistence of expression pairs and injected
//! translations.
//!
//! Two on-disk shapes share one key space:
//! - global key: a bare JSON array of pairs (legacy form)
//! - page-scoped keys (`<prefix><page id>`): `{"highlightPairs": [...], "translations": [...]}`

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use url::form_urlencoded;

use crate::config::Config;
use crate::model::{ExpressionPair, TranslationRecord, TranslationTable};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage write failed for {key}: {reason}")]
    Write { key: String, reason: String },

    #[error("Storage remove failed for {key}: {reason}")]
    Remove { key: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub trait DurableStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RefCell<HashMap<String, String>>,
    reject_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read_only() -> Self {
        Self {
            reject_writes: true,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

impl DurableStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.reject_writes {
            return Err(StoreError::Write {
                key: key.to_string(),
                reason: "QuotaExceededError".to_string(),
            });
        }
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScopeKey {
    Global(String),
    Page(String),
}

impl ScopeKey {
    pub fn as_str(&self) -> &str {
        match self {
            ScopeKey::Global(key) | ScopeKey::Page(key) => key,
        }
    }

    pub fn is_page(&self) -> bool {
        matches!(self, ScopeKey::Page(_))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PageLocation {
    pub hostname: String,
    pub pathname: String,
    pub search: String,
}

/// Page-scoped storage key. YouTube watch pages key on the video id so the
/// same video shares its pairs across playlist/timestamp variants of the URL.
pub fn page_key(prefix: &str, location: &PageLocation) -> String {
    static RE_SEPARATORS: OnceLock<Regex> = OnceLock::new();

    if location.hostname.contains("youtube.com") && location.pathname.contains("/watch") {
        if let Some(video_id) = video_id(&location.search) {
            return format!("{prefix}youtube-{video_id}");
        }
    }

    let re_separators =
        RE_SEPARATORS.get_or_init(|| Regex::new(r"[/.]").expect("valid separator regex"));
    let raw = format!("{prefix}{}{}", location.hostname, location.pathname);
    re_separators.replace_all(&raw, "-").into_owned()
}

// First `v` parameter, percent-decoded. An empty value counts as absent.
fn video_id(search: &str) -> Option<String> {
    let query = search.strip_prefix('?').unwrap_or(search);
    form_urlencoded::parse(query.as_bytes())
        .find(|(name, _)| name == "v")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PageRecordRef<'a> {
    highlight_pairs: &'a [ExpressionPair],
    translations: &'a [TranslationRecord],
}

#[derive(Clone, Debug, PartialEq)]
pub struct Loaded {
    pub pairs: Vec<ExpressionPair>,
    pub translations: TranslationTable,
    pub scope: ScopeKey,
}

pub struct Persistence<S> {
    store: S,
    prefix: String,
    global_key: String,
    location: PageLocation,
}

impl<S: DurableStore> Persistence<S> {
    pub fn new(store: S, config: &Config, location: PageLocation) -> Self {
        Self {
            store,
            prefix: config.namespace_prefix.clone(),
            global_key: config.global_key.clone(),
            location,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn global_scope(&self) -> ScopeKey {
        ScopeKey::Global(self.global_key.clone())
    }

    pub fn page_scope(&self) -> ScopeKey {
        ScopeKey::Page(page_key(&self.prefix, &self.location))
    }

    pub fn save(
        &self,
        scope: &ScopeKey,
        pairs: &[ExpressionPair],
        translations: &TranslationTable,
    ) -> Result<(), StoreError> {
        let payload = if scope.as_str().starts_with(&self.prefix) {
            serde_json::to_string(&PageRecordRef {
                highlight_pairs: pairs,
                translations: translations.values(),
            })?
        } else {
            serde_json::to_string(pairs)?
        };
        self.store.set(scope.as_str(), &payload)?;
        tracing::debug!(key = scope.as_str(), pairs = pairs.len(), "saved state");
        Ok(())
    }

    pub fn load(&self) -> Loaded {
        let page = self.page_scope();
        if let Some((pairs, translations)) = self
            .store
            .get(page.as_str())
            .and_then(|raw| parse_page_record(page.as_str(), &raw))
        {
            return Loaded {
                pairs,
                translations,
                scope: page,
            };
        }

        let global = self.global_scope();
        let pairs = self
            .store
            .get(global.as_str())
            .and_then(|raw| parse_pair_list(global.as_str(), &raw))
            .unwrap_or_default();
        Loaded {
            pairs,
            translations: TranslationTable::new(),
            scope: global,
        }
    }

    pub fn reset(&self, scope: &ScopeKey) -> Result<(), StoreError> {
        self.store.remove(scope.as_str())
    }
}

fn parse_json(key: &str, raw: &str) -> Option<Value> {
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::error!(key, error = %err, "failed to parse stored highlights");
            None
        }
    }
}

fn parse_page_record(key: &str, raw: &str) -> Option<(Vec<ExpressionPair>, TranslationTable)> {
    let value = parse_json(key, raw)?;
    let pairs = value.get("highlightPairs").filter(|v| v.is_array())?;
    let translations = value.get("translations")?.as_array()?;

    let pairs = match serde_json::from_value::<Vec<ExpressionPair>>(pairs.clone()) {
        Ok(pairs) => pairs,
        Err(err) => {
            tracing::error!(key, error = %err, "stored pairs are malformed");
            return None;
        }
    };
    let table = translations
        .iter()
        .filter_map(TranslationRecord::from_value)
        .collect();
    Some((pairs, table))
}

fn parse_pair_list(key: &str, raw: &str) -> Option<Vec<ExpressionPair>> {
    let value = parse_json(key, raw)?;
    if !value.is_array() {
        tracing::warn!(key, "global record is not an array");
        return None;
    }
    match serde_json::from_value(value) {
        Ok(pairs) => Some(pairs),
        Err(err) => {
            tracing::error!(key, error = %err, "stored pairs are malformed");
            None
        }
    }
}

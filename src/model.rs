use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One committed (context, expression) selection. Field order is the JSON
/// order used in storage and in the clipboard prompt.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ExpressionPair {
    pub context: String,
    pub expression: String,
}

impl ExpressionPair {
    pub fn new(context: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            expression: expression.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct TranslationRecord {
    pub expression: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ro_translation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uk_pron: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub us_pron: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub en_phonetic_ro: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synonyms: Option<Vec<String>>,
}

impl TranslationRecord {
    /// Lenient decode of externally supplied JSON. Returns `None` unless the
    /// value is an object with a non-blank string `expression`; optional
    /// fields of the wrong type are dropped rather than rejecting the item.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let expression = obj.get("expression")?.as_str()?;
        if expression.trim().is_empty() {
            return None;
        }
        let text = |field: &str| obj.get(field).and_then(Value::as_str).map(str::to_string);
        let synonyms = obj.get("synonyms").and_then(Value::as_array).map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        });
        Some(Self {
            expression: expression.to_string(),
            definition: text("definition"),
            ro_translation: text("ro_translation"),
            uk_pron: text("uk_pron"),
            us_pron: text("us_pron"),
            en_phonetic_ro: text("en_phonetic_ro"),
            synonyms,
        })
    }

    pub fn key(&self) -> &str {
        self.expression.trim()
    }
}

/// Expression text -> record, with first-insertion ordering like a JS `Map`:
/// overwriting a key replaces the record in place.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TranslationTable {
    entries: Vec<TranslationRecord>,
}

impl TranslationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&mut self, record: TranslationRecord) {
        match self.entries.iter_mut().find(|r| r.key() == record.key()) {
            Some(existing) => *existing = record,
            None => self.entries.push(record),
        }
    }

    pub fn get(&self, expression: &str) -> Option<&TranslationRecord> {
        self.entries.iter().find(|r| r.key() == expression)
    }

    pub fn values(&self) -> &[TranslationRecord] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl FromIterator<TranslationRecord> for TranslationTable {
    fn from_iter<I: IntoIterator<Item = TranslationRecord>>(iter: I) -> Self {
        let mut table = Self::new();
        for record in iter {
            table.upsert(record);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lenient_decode_drops_bad_fields() {
        let record = TranslationRecord::from_value(&json!({
            "expression": "brown",
            "definition": 42,
            "ro_translation": "maro",
            "synonyms": ["tan", 7, "umber"],
            "extra": true
        }))
        .unwrap();
        assert_eq!(record.definition, None);
        assert_eq!(record.ro_translation.as_deref(), Some("maro"));
        assert_eq!(
            record.synonyms,
            Some(vec!["tan".to_string(), "umber".to_string()])
        );
    }

    #[test]
    fn rejects_items_without_expression() {
        assert!(TranslationRecord::from_value(&json!({"definition": "x"})).is_none());
        assert!(TranslationRecord::from_value(&json!({"expression": "   "})).is_none());
        assert!(TranslationRecord::from_value(&json!("brown")).is_none());
    }

    #[test]
    fn upsert_overwrites_in_place() {
        let mut table = TranslationTable::new();
        table.upsert(TranslationRecord {
            expression: "a".into(),
            definition: Some("first".into()),
            ..Default::default()
        });
        table.upsert(TranslationRecord {
            expression: "b".into(),
            ..Default::default()
        });
        table.upsert(TranslationRecord {
            expression: " a ".into(),
            definition: Some("second".into()),
            ..Default::default()
        });

        assert_eq!(table.len(), 2);
        assert_eq!(table.values()[0].definition.as_deref(), Some("second"));
        assert_eq!(table.values()[1].expression, "b");
        assert!(table.get("a").is_some());
    }
}

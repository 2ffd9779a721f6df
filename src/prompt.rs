use crate::model::ExpressionPair;

const INSTRUCTIONS: &str = r#"For all the below English array of expressions, return a JSON array of objects with:
- expression
- definition
- ro_translation
- uk_pron
- us_pron
- synonyms
- en_phonetic_ro (Romanian-style English pronunciation)

Like
[
  {
    "expression": "...",
    "ro_translation": "...",
    "definition": "...",
    "uk_pron": "...",
    "us_pron": "...",
    "synonyms": ["...", ...],
    "en_phonetic_ro": "..."
  },
...
]

Array of expressions:
"#;

pub fn build_prompt(pairs: &[ExpressionPair]) -> Result<Option<String>, serde_json::Error> {
    if pairs.is_empty() {
        return Ok(None);
    }
    let listing = serde_json::to_string_pretty(pairs)?;
    Ok(Some(format!("{INSTRUCTIONS}{listing}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_pairs_no_prompt() {
        assert_eq!(build_prompt(&[]).unwrap(), None);
    }

    #[test]
    fn lists_pairs_as_indented_json() {
        let prompt = build_prompt(&[ExpressionPair::new("quick brown fox", "brown")])
            .unwrap()
            .unwrap();
        assert!(prompt.starts_with("For all the below English array of expressions"));
        assert!(prompt.ends_with(
            "Array of expressions:\n[\n  {\n    \"context\": \"quick brown fox\",\n    \"expression\": \"brown\"\n  }\n]"
        ));
    }
}

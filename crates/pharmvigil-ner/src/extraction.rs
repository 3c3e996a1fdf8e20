//! Mention extraction from token-classification output.
//!
//! The upstream model emits one label per wordpiece token. This module
//! merges continuation tokens back into phrases, flushes the current
//! phrase at every boundary (non-entity label or special token), and
//! deduplicates the result preserving first appearance.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use pharmvigil_core::pipeline::MentionExtractor;

/// Extraction errors.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("invalid model output: {0}")]
    InvalidFormat(String),

    #[error("tagger error: {0}")]
    Tagger(String),
}

pub type ExtractionResult<T> = Result<T, ExtractionError>;

/// Label the upstream model assigns to non-entity tokens; every other
/// label is treated as an entity token.
pub const OUTSIDE_LABEL: &str = "LABEL_0";

/// Control tokens that end the current entity phrase.
const SPECIAL_TOKENS: [&str; 5] = ["[CLS]", "[SEP]", "[PAD]", "[UNK]", "[MASK]"];

/// One wordpiece token with its predicted label.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaggedToken {
    pub text: String,
    pub label: String,
}

impl TaggedToken {
    pub fn new(text: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            label: label.into(),
        }
    }

    fn is_special(&self) -> bool {
        SPECIAL_TOKENS.contains(&self.text.as_str())
    }

    fn is_entity(&self) -> bool {
        !self.is_special() && self.label != OUTSIDE_LABEL
    }
}

/// Token sequence as produced by the model service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaggedOutput {
    pub tokens: Vec<TaggedToken>,
}

/// Parse model output JSON into tagged tokens.
///
/// Tolerates prose around the JSON object by scanning to the outermost
/// braces.
pub fn parse_tagged_output(raw: &str) -> ExtractionResult<TaggedOutput> {
    let start = raw
        .find('{')
        .ok_or_else(|| ExtractionError::InvalidFormat("no JSON object in output".into()))?;
    let end = raw
        .rfind('}')
        .ok_or_else(|| ExtractionError::InvalidFormat("no closing brace in output".into()))?;

    Ok(serde_json::from_str(&raw[start..=end])?)
}

/// Merge contiguous entity-labeled tokens into mention phrases.
///
/// Output is deduplicated preserving first appearance. Empty input yields
/// an empty list.
pub fn merge_entity_tokens(tokens: &[TaggedToken]) -> Vec<String> {
    let mut phrases = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for token in tokens {
        if token.is_entity() {
            current.push(&token.text);
        } else if !current.is_empty() {
            phrases.push(join_wordpieces(&current));
            current.clear();
        }
    }
    if !current.is_empty() {
        phrases.push(join_wordpieces(&current));
    }

    let mut deduped = Vec::new();
    for phrase in phrases {
        if !deduped.contains(&phrase) {
            deduped.push(phrase);
        }
    }
    deduped
}

/// Join wordpiece tokens back into a clean phrase:
/// `["ab", "##dom", "##inal", "pain"]` → `"abdominal pain"`.
fn join_wordpieces(tokens: &[&str]) -> String {
    let mut text = String::new();
    for token in tokens {
        if let Some(rest) = token.strip_prefix("##") {
            text.push_str(rest);
        } else if text.is_empty() {
            text.push_str(token);
        } else {
            text.push(' ');
            text.push_str(token);
        }
    }
    text
}

/// Token-level tagger backed by an external model.
pub trait TokenTagger {
    fn tag(&self, text: &str) -> ExtractionResult<Vec<TaggedToken>>;
}

/// Adapter from any [`TokenTagger`] to the core mention-extractor seam.
pub struct NerExtractor<T: TokenTagger> {
    tagger: T,
}

impl<T: TokenTagger> NerExtractor<T> {
    pub fn new(tagger: T) -> Self {
        Self { tagger }
    }
}

impl<T: TokenTagger> MentionExtractor for NerExtractor<T> {
    fn extract_mentions(&self, text: &str) -> anyhow::Result<Vec<String>> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        let tokens = self.tagger.tag(text)?;
        Ok(merge_entity_tokens(&tokens))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(text: &str) -> TaggedToken {
        TaggedToken::new(text, "LABEL_1")
    }

    fn outside(text: &str) -> TaggedToken {
        TaggedToken::new(text, OUTSIDE_LABEL)
    }

    #[test]
    fn test_merge_contiguous_entities() {
        let tokens = vec![
            outside("patient"),
            outside("has"),
            entity("ab"),
            entity("##dom"),
            entity("##inal"),
            entity("pain"),
            outside("since"),
        ];
        assert_eq!(merge_entity_tokens(&tokens), ["abdominal pain"]);
    }

    #[test]
    fn test_boundary_flushes_phrase() {
        let tokens = vec![
            entity("fever"),
            outside("and"),
            entity("nau"),
            entity("##sea"),
        ];
        assert_eq!(merge_entity_tokens(&tokens), ["fever", "nausea"]);
    }

    #[test]
    fn test_special_tokens_are_boundaries() {
        let tokens = vec![
            TaggedToken::new("[CLS]", "LABEL_1"),
            entity("fever"),
            TaggedToken::new("[SEP]", "LABEL_1"),
            entity("rash"),
        ];
        assert_eq!(merge_entity_tokens(&tokens), ["fever", "rash"]);
    }

    #[test]
    fn test_dedup_preserves_first_appearance() {
        let tokens = vec![
            entity("fever"),
            outside(","),
            entity("rash"),
            outside(","),
            entity("fever"),
        ];
        assert_eq!(merge_entity_tokens(&tokens), ["fever", "rash"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(merge_entity_tokens(&[]).is_empty());
    }

    #[test]
    fn test_trailing_entity_is_flushed() {
        let tokens = vec![outside("had"), entity("head"), entity("##ache")];
        assert_eq!(merge_entity_tokens(&tokens), ["headache"]);
    }

    #[test]
    fn test_parse_tagged_output() {
        let json = r#"{"tokens":[{"text":"fever","label":"LABEL_1"},{"text":".","label":"LABEL_0"}]}"#;
        let output = parse_tagged_output(json).unwrap();
        assert_eq!(output.tokens.len(), 2);
        assert_eq!(output.tokens[0].text, "fever");
    }

    #[test]
    fn test_parse_tolerates_surrounding_prose() {
        let raw = "model says:\n{\"tokens\":[{\"text\":\"rash\",\"label\":\"LABEL_2\"}]}\ndone";
        let output = parse_tagged_output(raw).unwrap();
        assert_eq!(output.tokens.len(), 1);
    }

    #[test]
    fn test_parse_rejects_non_json() {
        assert!(matches!(
            parse_tagged_output("no braces here"),
            Err(ExtractionError::InvalidFormat(_))
        ));
    }

    struct FixedTagger(Vec<TaggedToken>);

    impl TokenTagger for FixedTagger {
        fn tag(&self, _text: &str) -> ExtractionResult<Vec<TaggedToken>> {
            Ok(self.0.clone())
        }
    }

    struct BrokenTagger;

    impl TokenTagger for BrokenTagger {
        fn tag(&self, _text: &str) -> ExtractionResult<Vec<TaggedToken>> {
            Err(ExtractionError::Tagger("model not loaded".into()))
        }
    }

    #[test]
    fn test_ner_extractor_adapts_tagger() {
        let extractor = NerExtractor::new(FixedTagger(vec![
            outside("felt"),
            entity("dizz"),
            entity("##iness"),
        ]));
        let mentions = extractor.extract_mentions("felt dizziness").unwrap();
        assert_eq!(mentions, ["dizziness"]);
    }

    #[test]
    fn test_ner_extractor_empty_input_is_ok() {
        let extractor = NerExtractor::new(BrokenTagger);
        // Empty input never reaches the tagger.
        assert!(extractor.extract_mentions("   ").unwrap().is_empty());
    }

    #[test]
    fn test_ner_extractor_propagates_tagger_errors() {
        let extractor = NerExtractor::new(BrokenTagger);
        assert!(extractor.extract_mentions("some text").is_err());
    }
}

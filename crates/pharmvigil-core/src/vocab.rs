//! Canonical vocabulary store.
//!
//! Loads the canonical reaction list, the canonical generic-medicine list,
//! and the brand-to-generic mapping from flat text files, once, and keeps
//! them in memory for the life of the process.
//!
//! The reaction list is required: without it no term can ever match, so a
//! missing file fails the load. The generic and brand lists are optional;
//! when absent the dependent matchers simply never succeed.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};
use once_cell::sync::OnceCell;
use thiserror::Error;

use crate::config::Settings;

/// Canonical reaction terms, one per line. Required.
pub const ADR_LIST_FILE: &str = "ADR_LIST.txt";
/// Canonical generic medicine names, one per line. Optional.
pub const GENERIC_LIST_FILE: &str = "GENERIC_LIST.txt";
/// `Brand = Generic` mapping lines. Optional.
pub const BRAND_LIST_FILE: &str = "BRAND_LIST.txt";

/// Vocabulary loading errors.
#[derive(Error, Debug)]
pub enum VocabError {
    #[error("canonical reaction list not found at {0}")]
    MissingReactionList(PathBuf),

    #[error("canonical reaction list at {0} is empty")]
    EmptyReactionList(PathBuf),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Immutable canonical vocabularies, loaded once.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    reactions: Vec<String>,
    generics: Vec<String>,
    brand_map: HashMap<String, String>,
    /// Brand keys in first-seen order, so fuzzy matching is deterministic.
    brand_keys: Vec<String>,
}

impl Vocabulary {
    /// Load all vocabulary files from `dir`.
    pub fn load(dir: &Path) -> Result<Self, VocabError> {
        let adr_path = dir.join(ADR_LIST_FILE);
        let reactions = match read_list(&adr_path)? {
            Some(lines) if !lines.is_empty() => lines,
            Some(_) => return Err(VocabError::EmptyReactionList(adr_path)),
            None => return Err(VocabError::MissingReactionList(adr_path)),
        };

        let generics = read_list(&dir.join(GENERIC_LIST_FILE))?.unwrap_or_default();

        let brand_text = match read_file(&dir.join(BRAND_LIST_FILE))? {
            Some(text) => text,
            None => String::new(),
        };
        let (brand_map, brand_keys) = parse_brand_lines(&brand_text);

        info!(
            "vocabulary loaded: {} reactions, {} generics, {} brand mappings",
            reactions.len(),
            generics.len(),
            brand_keys.len()
        );

        Ok(Self {
            reactions,
            generics,
            brand_map,
            brand_keys,
        })
    }

    /// Build a vocabulary directly, for tests and embedders. `brand_lines`
    /// uses the same `Brand = Generic` format as BRAND_LIST.txt.
    pub fn from_parts(
        reactions: Vec<String>,
        generics: Vec<String>,
        brand_lines: &str,
    ) -> Self {
        let (brand_map, brand_keys) = parse_brand_lines(brand_lines);
        Self {
            reactions,
            generics,
            brand_map,
            brand_keys,
        }
    }

    /// Canonical reaction terms, in file order.
    pub fn reactions(&self) -> &[String] {
        &self.reactions
    }

    /// Canonical generic medicine names, in file order.
    pub fn generics(&self) -> &[String] {
        &self.generics
    }

    /// Lowercased brand names, in first-seen file order.
    pub fn brand_keys(&self) -> &[String] {
        &self.brand_keys
    }

    /// Generic mapped to a (lowercased) brand key.
    pub fn brand_generic(&self, brand_key: &str) -> Option<&str> {
        self.brand_map.get(brand_key).map(String::as_str)
    }

    /// The stored member equal to `name`, when `name` is a canonical
    /// generic.
    pub fn canonical_generic(&self, name: &str) -> Option<&str> {
        self.generics
            .iter()
            .find(|g| g.as_str() == name)
            .map(String::as_str)
    }
}

/// Read a line-per-entry list file. `Ok(None)` when the file is absent.
fn read_list(path: &Path) -> Result<Option<Vec<String>>, VocabError> {
    Ok(read_file(path)?.map(|text| {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    }))
}

fn read_file(path: &Path) -> Result<Option<String>, VocabError> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(VocabError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Parse `Brand = Generic` lines into a lowercase-keyed map plus the key
/// order. Comments (`#`), lines without `=`, and entries whose target
/// carries a skip marker ("not a medicine", "skip") are ignored.
/// Duplicate brands keep their first position; the last value wins.
fn parse_brand_lines(text: &str) -> (HashMap<String, String>, Vec<String>) {
    let mut map = HashMap::new();
    let mut keys = Vec::new();

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((left, right)) = line.split_once('=') else {
            continue;
        };
        let brand = left.trim();
        let generic = right.trim();

        let generic_lower = generic.to_lowercase();
        if generic_lower.contains("not a medicine") || generic_lower.contains("skip") {
            debug!("skipping brand mapping line: {line}");
            continue;
        }

        if brand.is_empty() || generic.is_empty() {
            continue;
        }

        let key = brand.to_lowercase();
        if !map.contains_key(&key) {
            keys.push(key.clone());
        }
        map.insert(key, generic.to_string());
    }

    (map, keys)
}

static SHARED: OnceCell<Vocabulary> = OnceCell::new();

/// Process-wide vocabulary, loaded from [`Settings::from_env`] on first
/// use. Concurrent first calls may race on the load; the parse is
/// idempotent and only one result is kept.
pub fn shared() -> Result<&'static Vocabulary, VocabError> {
    SHARED.get_or_try_init(|| Vocabulary::load(&Settings::from_env().vocab_dir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_vocab_dir(
        adr: Option<&str>,
        generic: Option<&str>,
        brand: Option<&str>,
    ) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        if let Some(text) = adr {
            fs::write(dir.path().join(ADR_LIST_FILE), text).unwrap();
        }
        if let Some(text) = generic {
            fs::write(dir.path().join(GENERIC_LIST_FILE), text).unwrap();
        }
        if let Some(text) = brand {
            fs::write(dir.path().join(BRAND_LIST_FILE), text).unwrap();
        }
        dir
    }

    #[test]
    fn test_load_full_set() {
        let dir = write_vocab_dir(
            Some("Fever\n\nNausea\n  Headache  \n"),
            Some("Paracetamol\nAmlodipine\n"),
            Some("Biogesic = Paracetamol\n"),
        );
        let vocab = Vocabulary::load(dir.path()).unwrap();
        assert_eq!(vocab.reactions(), ["Fever", "Nausea", "Headache"]);
        assert_eq!(vocab.generics(), ["Paracetamol", "Amlodipine"]);
        assert_eq!(vocab.brand_keys(), ["biogesic"]);
        assert_eq!(vocab.brand_generic("biogesic"), Some("Paracetamol"));
    }

    #[test]
    fn test_missing_reaction_list_is_fatal() {
        let dir = write_vocab_dir(None, Some("Paracetamol\n"), None);
        let err = Vocabulary::load(dir.path()).unwrap_err();
        assert!(matches!(err, VocabError::MissingReactionList(_)));
    }

    #[test]
    fn test_empty_reaction_list_is_fatal() {
        let dir = write_vocab_dir(Some("\n  \n"), None, None);
        let err = Vocabulary::load(dir.path()).unwrap_err();
        assert!(matches!(err, VocabError::EmptyReactionList(_)));
    }

    #[test]
    fn test_optional_lists_degrade_to_empty() {
        let dir = write_vocab_dir(Some("Fever\n"), None, None);
        let vocab = Vocabulary::load(dir.path()).unwrap();
        assert!(vocab.generics().is_empty());
        assert!(vocab.brand_keys().is_empty());
    }

    #[test]
    fn test_brand_parsing_skips_markers_and_comments() {
        let lines = "\
# header comment
Biogesic = Paracetamol
Bioflu = Phenylephrine + Chlorphenamine + Paracetamol
Burger = Not a medicine
Mystery = SKIP this one
malformed line without equals
 = Paracetamol
Empty =
";
        let vocab = Vocabulary::from_parts(vec!["Fever".into()], vec![], lines);
        assert_eq!(vocab.brand_keys(), ["biogesic", "bioflu"]);
        assert!(vocab.brand_generic("burger").is_none());
        assert!(vocab.brand_generic("mystery").is_none());
    }

    #[test]
    fn test_duplicate_brand_last_value_wins_first_position_kept() {
        let lines = "Biogesic = Wrong\nAlaxan = Ibuprofen + Paracetamol\nBiogesic = Paracetamol\n";
        let vocab = Vocabulary::from_parts(vec!["Fever".into()], vec![], lines);
        assert_eq!(vocab.brand_keys(), ["biogesic", "alaxan"]);
        assert_eq!(vocab.brand_generic("biogesic"), Some("Paracetamol"));
    }

    #[test]
    fn test_canonical_generic_is_exact_match() {
        let vocab = Vocabulary::from_parts(
            vec!["Fever".into()],
            vec!["Paracetamol".into()],
            "",
        );
        assert_eq!(vocab.canonical_generic("Paracetamol"), Some("Paracetamol"));
        assert!(vocab.canonical_generic("paracetamol").is_none());
    }
}

//! Word bank data model.
//!
//! A word bank is a fixed, ordered list of vocabulary entries. Order matters:
//! the daily selector permutes bank indices, so reordering the bank changes
//! every day's selection.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BankError;

/// The bank shipped with the crate.
const BUILTIN_BANK: &str = include_str!("../data/words.json");

/// Difficulty tier of a word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Tier {
    Common = 1,
    Advanced = 2,
    Rare = 3,
}

impl TryFrom<u8> for Tier {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Tier::Common),
            2 => Ok(Tier::Advanced),
            3 => Ok(Tier::Rare),
            other => Err(format!("invalid tier: {other}")),
        }
    }
}

impl From<Tier> for u8 {
    fn from(tier: Tier) -> Self {
        tier as u8
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Common => write!(f, "common"),
            Tier::Advanced => write!(f, "advanced"),
            Tier::Rare => write!(f, "rare"),
        }
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "common" | "1" => Ok(Tier::Common),
            "advanced" | "2" => Ok(Tier::Advanced),
            "rare" | "3" => Ok(Tier::Rare),
            other => Err(format!("unknown tier: {other}")),
        }
    }
}

/// A single vocabulary entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordEntry {
    /// The word itself. Unique within a bank.
    #[serde(rename = "word")]
    pub term: String,
    /// Reference definition.
    pub definition: String,
    /// How the word feels in use: positive, negative, formal, wry.
    #[serde(rename = "connotation")]
    pub connotation_note: String,
    /// Origin of the word.
    #[serde(rename = "roots")]
    pub etymology: String,
    /// Difficulty tier.
    pub tier: Tier,
}

/// Raw bank entry; tier is kept numeric so a bad tier can be reported by term.
#[derive(Deserialize)]
struct RawEntry {
    word: String,
    definition: String,
    #[serde(default)]
    connotation: String,
    #[serde(default)]
    roots: String,
    tier: u8,
}

/// A validated, ordered collection of word entries.
#[derive(Debug, Clone)]
pub struct WordBank {
    entries: Vec<WordEntry>,
}

impl WordBank {
    /// Build a bank from entries, enforcing non-empty terms that are unique
    /// ignoring case.
    pub fn new(entries: Vec<WordEntry>) -> Result<Self, BankError> {
        if entries.is_empty() {
            return Err(BankError::Empty);
        }
        let mut seen = HashSet::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            if entry.term.trim().is_empty() {
                return Err(BankError::EmptyTerm { index });
            }
            if !seen.insert(entry.term.to_lowercase()) {
                return Err(BankError::DuplicateTerm(entry.term.clone()));
            }
        }
        Ok(Self { entries })
    }

    /// Parse a bank from its JSON array representation.
    pub fn from_json_str(json: &str) -> Result<Self, BankError> {
        let raw: Vec<RawEntry> = serde_json::from_str(json)?;
        let entries = raw
            .into_iter()
            .map(|r| {
                let tier = Tier::try_from(r.tier).map_err(|_| BankError::InvalidTier {
                    term: r.word.clone(),
                    tier: r.tier,
                })?;
                Ok(WordEntry {
                    term: r.word,
                    definition: r.definition,
                    connotation_note: r.connotation,
                    etymology: r.roots,
                    tier,
                })
            })
            .collect::<Result<Vec<_>, BankError>>()?;
        Self::new(entries)
    }

    /// Load a bank from a JSON file.
    pub fn load(path: &Path) -> Result<Self, BankError> {
        let content = std::fs::read_to_string(path).map_err(|source| BankError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// The bank embedded in this crate.
    pub fn builtin() -> Result<Self, BankError> {
        Self::from_json_str(BUILTIN_BANK)
    }

    pub fn entries(&self) -> &[WordEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an entry by term (case-insensitive).
    pub fn find(&self, term: &str) -> Option<&WordEntry> {
        self.entries
            .iter()
            .find(|e| e.term.eq_ignore_ascii_case(term))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(term: &str) -> WordEntry {
        WordEntry {
            term: term.into(),
            definition: format!("meaning of {term}"),
            connotation_note: String::new(),
            etymology: String::new(),
            tier: Tier::Common,
        }
    }

    #[test]
    fn builtin_bank_is_valid() {
        let bank = WordBank::builtin().unwrap();
        assert_eq!(bank.len(), 40);
        let first = &bank.entries()[0];
        assert_eq!(first.term, "ubiquitous");
        assert_eq!(first.tier, Tier::Common);
        assert!(bank.entries().iter().any(|e| e.tier == Tier::Rare));
    }

    #[test]
    fn parses_wire_field_names() {
        let json = r#"[{"word":"laconic","definition":"using very few words","connotation":"dry","roots":"Greek Lakonikos","tier":2}]"#;
        let bank = WordBank::from_json_str(json).unwrap();
        let e = &bank.entries()[0];
        assert_eq!(e.term, "laconic");
        assert_eq!(e.connotation_note, "dry");
        assert_eq!(e.etymology, "Greek Lakonikos");
        assert_eq!(e.tier, Tier::Advanced);
    }

    #[test]
    fn rejects_duplicate_terms() {
        let err = WordBank::new(vec![entry("candid"), entry("candid")]).unwrap_err();
        assert!(matches!(err, BankError::DuplicateTerm(t) if t == "candid"));
    }

    #[test]
    fn duplicate_terms_differing_in_case_are_rejected() {
        let err = WordBank::new(vec![entry("Candid"), entry("candid")]).unwrap_err();
        assert!(matches!(err, BankError::DuplicateTerm(t) if t == "candid"));
    }

    #[test]
    fn rejects_empty_bank_and_terms() {
        assert!(matches!(WordBank::new(vec![]), Err(BankError::Empty)));
        assert!(matches!(
            WordBank::new(vec![entry("ok"), entry("  ")]),
            Err(BankError::EmptyTerm { index: 1 })
        ));
    }

    #[test]
    fn rejects_out_of_range_tier() {
        let json = r#"[{"word":"odd","definition":"strange","connotation":"","roots":"","tier":7}]"#;
        let err = WordBank::from_json_str(json).unwrap_err();
        assert!(matches!(err, BankError::InvalidTier { tier: 7, .. }));
    }

    #[test]
    fn find_is_case_insensitive() {
        let bank = WordBank::new(vec![entry("Candid"), entry("frugal")]).unwrap();
        assert_eq!(bank.find("candid").unwrap().term, "Candid");
        assert!(bank.find("missing").is_none());
    }

    #[test]
    fn tier_display_and_parse() {
        assert_eq!(Tier::Rare.to_string(), "rare");
        assert_eq!("advanced".parse::<Tier>().unwrap(), Tier::Advanced);
        assert_eq!("1".parse::<Tier>().unwrap(), Tier::Common);
        assert!("legendary".parse::<Tier>().is_err());
    }
}

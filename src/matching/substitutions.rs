//! Informal-speech substitutions ("gonna" for "going to").
//!
//! The table is plain data: a key heard in casual speech mapped to the
//! written phrases it stands for. Lookup is bidirectional, so the key may
//! appear on either the spoken or the expected side.

use crate::matching::normalize::normalize_text;
use crate::matching::similarity::tokens_match;
use std::collections::BTreeMap;

/// Built-in substitutions, key first.
pub const BUILTIN_SUBSTITUTIONS: &[(&str, &[&str])] = &[
    ("gonna", &["going", "going to"]),
    ("gotta", &["got to", "have to"]),
    ("wanna", &["want to"]),
    ("kinda", &["kind of"]),
    ("sorta", &["sort of"]),
    ("dunno", &["don't know"]),
    ("lemme", &["let me"]),
    ("gimme", &["give me"]),
    ("cause", &["because"]),
    ("cuz", &["because"]),
    ("yeah", &["yes"]),
    ("yep", &["yes"]),
    ("nope", &["no"]),
    ("ok", &["okay"]),
    ("alright", &["all right"]),
];

/// Key → expansion phrases.
#[derive(Debug, Clone, PartialEq)]
pub struct SubstitutionTable {
    entries: BTreeMap<String, Vec<String>>,
}

impl Default for SubstitutionTable {
    fn default() -> Self {
        let mut table = Self::empty();
        for (key, expansions) in BUILTIN_SUBSTITUTIONS {
            table.insert(key, expansions.iter().copied());
        }
        table
    }
}

impl SubstitutionTable {
    /// A table with no entries: only fuzzy token matching applies.
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Add expansions for a key, merging with any existing ones.
    ///
    /// Key and expansions are normalized the same way transcripts are, so
    /// configuration can be written in natural casing. Entries that
    /// normalize to nothing are dropped.
    pub fn insert<'a>(&mut self, key: &str, expansions: impl IntoIterator<Item = &'a str>) {
        let key = normalize_text(key);
        if key.is_empty() {
            return;
        }
        let slot = self.entries.entry(key).or_default();
        for expansion in expansions {
            let expansion = normalize_text(expansion);
            if !expansion.is_empty() && !slot.contains(&expansion) {
                slot.push(expansion);
            }
        }
    }

    /// Merge user-provided entries into this table.
    pub fn extend<K, V>(&mut self, extra: impl IntoIterator<Item = (K, V)>)
    where
        K: AsRef<str>,
        V: IntoIterator,
        V::Item: AsRef<str>,
    {
        for (key, expansions) in extra {
            let expansions: Vec<V::Item> = expansions.into_iter().collect();
            self.insert(key.as_ref(), expansions.iter().map(|e| e.as_ref()));
        }
    }

    pub fn expansions(&self, key: &str) -> Option<&[String]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// True when one side is a key and the other side occurs inside one of
    /// that key's expansion phrases.
    ///
    /// This is a substring test, not a word test: spoken "gonna" matches an
    /// expected "go" or "to" because both occur inside "going to".
    pub fn substitutes(&self, spoken: &str, expected: &str) -> bool {
        let contains = |key: &str, other: &str| {
            self.entries
                .get(key)
                .is_some_and(|expansions| expansions.iter().any(|e| e.contains(other)))
        };
        contains(spoken, expected) || contains(expected, spoken)
    }
}

/// Fuzzy token match, falling back to the substitution table.
pub fn tokens_match_with_substitutions(
    spoken: &str,
    expected: &str,
    tolerance: f64,
    table: &SubstitutionTable,
) -> bool {
    tokens_match(spoken, expected, tolerance) || table.substitutes(spoken, expected)
}

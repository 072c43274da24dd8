//! Structured script model.
//!
//! Scripts arrive as JSON from the structuring service (camelCase keys, as
//! produced upstream); unknown fields such as timestamps are ignored.

use crate::error::{CuelineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    #[default]
    Dialogue,
    Direction,
    Action,
}

/// Who voices a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Performer {
    Human,
    #[default]
    Ai,
    Skip,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptLine {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub index: usize,
    /// `None` for stage directions.
    #[serde(default)]
    pub character: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: LineKind,
    pub text: String,
    #[serde(default)]
    pub assigned_to: Performer,
}

impl ScriptLine {
    pub fn dialogue(character: &str, text: &str, assigned_to: Performer) -> Self {
        Self {
            id: String::new(),
            index: 0,
            character: Some(character.to_string()),
            kind: LineKind::Dialogue,
            text: text.to_string(),
            assigned_to,
        }
    }

    pub fn direction(text: &str) -> Self {
        Self {
            id: String::new(),
            index: 0,
            character: None,
            kind: LineKind::Direction,
            text: text.to_string(),
            assigned_to: Performer::Skip,
        }
    }

    pub fn is_dialogue(&self) -> bool {
        self.kind == LineKind::Dialogue
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub name: String,
    #[serde(default)]
    pub assigned_to: Performer,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_id: Option<String>,
    /// Voice hint from the structuring service, e.g. "deep male".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_voice_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Script {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub raw_text: String,
    pub lines: Vec<ScriptLine>,
    #[serde(default)]
    pub characters: Vec<Character>,
}

impl Script {
    /// Build a script from lines, deriving the cast from dialogue lines.
    ///
    /// Each character takes the assignment of its first line.
    pub fn new(title: &str, lines: Vec<ScriptLine>) -> Self {
        let mut characters: Vec<Character> = Vec::new();
        for line in lines.iter().filter(|l| l.is_dialogue()) {
            if let Some(name) = &line.character
                && !characters.iter().any(|c| &c.name == name)
            {
                characters.push(Character {
                    name: name.clone(),
                    assigned_to: line.assigned_to,
                    voice_id: None,
                    suggested_voice_type: None,
                });
            }
        }

        let mut script = Self {
            id: String::new(),
            title: title.to_string(),
            raw_text: String::new(),
            lines,
            characters,
        };
        script.reindex();
        script
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let mut script: Script = serde_json::from_str(json)?;
        script.reindex();
        Ok(script)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Make `index` agree with position and fill in missing ids.
    fn reindex(&mut self) {
        for (position, line) in self.lines.iter_mut().enumerate() {
            line.index = position;
            if line.id.is_empty() {
                line.id = format!("line-{position}");
            }
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line(&self, index: usize) -> Option<&ScriptLine> {
        self.lines.get(index)
    }

    pub fn character(&self, name: &str) -> Option<&Character> {
        self.characters.iter().find(|c| c.name == name)
    }

    /// The cast entry for the speaker of `line`, if any.
    pub fn voice_for(&self, line: &ScriptLine) -> Option<&Character> {
        line.character.as_deref().and_then(|name| self.character(name))
    }

    /// Give a character (and every one of their lines) to a performer.
    ///
    /// Character names match case-insensitively.
    pub fn assign_character(&mut self, name: &str, performer: Performer) -> Result<()> {
        let character = self
            .characters
            .iter_mut()
            .find(|c| c.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| CuelineError::UnknownCharacter {
                name: name.to_string(),
            })?;
        character.assigned_to = performer;
        let canonical = character.name.clone();

        for line in &mut self.lines {
            if line.character.as_deref() == Some(canonical.as_str()) {
                line.assigned_to = performer;
            }
        }
        Ok(())
    }

    /// Number of dialogue lines per character.
    pub fn line_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts: BTreeMap<&str, usize> = self
            .characters
            .iter()
            .map(|c| (c.name.as_str(), 0))
            .collect();
        for line in self.lines.iter().filter(|l| l.is_dialogue()) {
            if let Some(name) = line.character.as_deref()
                && let Some(count) = counts.get_mut(name)
            {
                *count += 1;
            }
        }
        counts
    }

    /// Names of the characters the human reads.
    pub fn human_characters(&self) -> Vec<&str> {
        self.characters
            .iter()
            .filter(|c| c.assigned_to == Performer::Human)
            .map(|c| c.name.as_str())
            .collect()
    }
}

//! Core types for the persona system.
//!
//! A persona is one of five fixed response strategies. The label set is
//! closed; anything the classifier cannot map lands on [`PersonaLabel::DEFAULT`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

// ─────────────────────────────────────────────────────────────────
// Persona Label
// ─────────────────────────────────────────────────────────────────

/// The five personas a turn can be routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonaLabel {
    /// Product manager that maintains the specification document.
    Pm,
    /// Software engineer.
    Swe,
    /// Travel agent.
    Travel,
    /// Joke teller with a joke-lookup tool.
    Joker,
    /// Distractible, curt assistant. Also the fallback.
    Adhd,
}

impl PersonaLabel {
    /// Fallback when classification is impossible.
    pub const DEFAULT: PersonaLabel = PersonaLabel::Adhd;

    /// Lowercase label as the classifier expects it back.
    pub fn slug(&self) -> &'static str {
        match self {
            PersonaLabel::Pm => "pm",
            PersonaLabel::Swe => "swe",
            PersonaLabel::Travel => "travel",
            PersonaLabel::Joker => "joker",
            PersonaLabel::Adhd => "adhd",
        }
    }

    /// Human-readable display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            PersonaLabel::Pm => "Product Manager",
            PersonaLabel::Swe => "Software Engineer",
            PersonaLabel::Travel => "Travel Agent",
            PersonaLabel::Joker => "Joker",
            PersonaLabel::Adhd => "AI with ADHD",
        }
    }

    /// All labels in declaration order. Substring matching scans in this order.
    pub fn all() -> &'static [PersonaLabel] {
        &[
            PersonaLabel::Pm,
            PersonaLabel::Swe,
            PersonaLabel::Travel,
            PersonaLabel::Joker,
            PersonaLabel::Adhd,
        ]
    }
}

impl Default for PersonaLabel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for PersonaLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for PersonaLabel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        PersonaLabel::all()
            .iter()
            .copied()
            .find(|label| label.slug() == wanted)
            .ok_or_else(|| Error::UnknownPersona(s.to_string()))
    }
}

// ─────────────────────────────────────────────────────────────────
// Classification
// ─────────────────────────────────────────────────────────────────

/// How a label was obtained. Only used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// The response was exactly a label.
    Exact,
    /// A label was found inside a longer response.
    Embedded,
    /// Nothing usable; the default label was chosen.
    Fallback,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::Exact => write!(f, "exact"),
            Provenance::Embedded => write!(f, "embedded"),
            Provenance::Fallback => write!(f, "fallback"),
        }
    }
}

/// Outcome of classifying one utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassificationResult {
    pub label: PersonaLabel,
    pub provenance: Provenance,
}

impl ClassificationResult {
    pub fn new(label: PersonaLabel, provenance: Provenance) -> Self {
        Self { label, provenance }
    }

    pub fn fallback() -> Self {
        Self::new(PersonaLabel::DEFAULT, Provenance::Fallback)
    }
}

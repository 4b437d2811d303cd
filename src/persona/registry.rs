//! Bundled persona registry: system prompts compiled into the binary.

use super::types::PersonaLabel;

/// Registry of the persona system prompts.
pub struct PersonaRegistry;

impl PersonaRegistry {
    pub fn new() -> Self {
        Self
    }

    /// System prompt that opens every completion for `label`.
    pub fn system_prompt(&self, label: PersonaLabel) -> &'static str {
        match label {
            PersonaLabel::Pm => include_str!("../../config/prompts/pm.txt"),
            PersonaLabel::Swe => include_str!("../../config/prompts/swe.txt"),
            PersonaLabel::Travel => include_str!("../../config/prompts/travel.txt"),
            PersonaLabel::Joker => include_str!("../../config/prompts/joker.txt"),
            PersonaLabel::Adhd => include_str!("../../config/prompts/adhd.txt"),
        }
    }

    /// List all personas with a short description.
    pub fn list_available(&self) -> Vec<PersonaListing> {
        PersonaLabel::all()
            .iter()
            .map(|label| PersonaListing {
                label: *label,
                description: match label {
                    PersonaLabel::Pm => "Gathers requirements and maintains the project specification",
                    PersonaLabel::Swe => "Writes well-tested code, answers concisely",
                    PersonaLabel::Travel => "Helps plan trips",
                    PersonaLabel::Joker => "Tells jokes using the joke-lookup tool",
                    PersonaLabel::Adhd => "Easily distracted and curt",
                },
                is_default: *label == PersonaLabel::DEFAULT,
            })
            .collect()
    }
}

impl Default for PersonaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Summary of an available persona.
#[derive(Debug, Clone)]
pub struct PersonaListing {
    pub label: PersonaLabel,
    pub description: &'static str,
    pub is_default: bool,
}

//! Joke corpus backing the joker's `get_joke` tool.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use serde::Deserialize;

use crate::error::{Error, Result};

const BUNDLED_JOKES: &str = include_str!("../../config/jokes.toml");

/// Served when the corpus holds no jokes at all.
pub const CLASSIC_JOKE: &str = "Why did the chicken cross the road? To get to the other side!";

/// Jokes grouped by category.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JokeBook {
    #[serde(default)]
    categories: BTreeMap<String, Vec<String>>,
}

impl JokeBook {
    /// Parse a corpus from TOML (`[categories]` table of string arrays).
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::ConfigParse {
            message: format!("Invalid joke corpus: {}", e),
            source: Some(e),
        })
    }

    /// The corpus compiled into the binary.
    pub fn bundled() -> Result<Self> {
        Self::from_toml(BUNDLED_JOKES)
    }

    /// Random joke from `category`, or from every category when it is
    /// missing, blank, or unknown.
    pub fn get_joke(&self, category: Option<&str>) -> String {
        let mut rng = rand::thread_rng();

        if let Some(jokes) = category
            .filter(|c| !c.is_empty())
            .and_then(|c| self.categories.get(c))
        {
            if let Some(joke) = jokes.choose(&mut rng) {
                return joke.clone();
            }
        }

        let all: Vec<&String> = self.categories.values().flatten().collect();
        all.choose(&mut rng)
            .map(|joke| joke.to_string())
            .unwrap_or_else(|| CLASSIC_JOKE.to_string())
    }
}

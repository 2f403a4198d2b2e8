use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// News categories offered in the feed header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum NewsCategory {
    #[default]
    All,
    Politic,
    Sport,
    Education,
    Games,
    World,
    Tech,
}

impl NewsCategory {
    /// Canonical display order.
    pub const ALL: [NewsCategory; 7] = [
        NewsCategory::All,
        NewsCategory::Politic,
        NewsCategory::Sport,
        NewsCategory::Education,
        NewsCategory::Games,
        NewsCategory::World,
        NewsCategory::Tech,
    ];

    pub fn name(self) -> &'static str {
        match self {
            NewsCategory::All => "All",
            NewsCategory::Politic => "Politic",
            NewsCategory::Sport => "Sport",
            NewsCategory::Education => "Education",
            NewsCategory::Games => "Games",
            NewsCategory::World => "World",
            NewsCategory::Tech => "Tech",
        }
    }

    /// Search keyword sent to the news API; `All` searches without one.
    pub fn keyword(self) -> Option<&'static str> {
        match self {
            NewsCategory::All => None,
            other => Some(other.name()),
        }
    }
}

impl fmt::Display for NewsCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown news category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for NewsCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NewsCategory::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

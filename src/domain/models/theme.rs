//! Theme catalog.
//!
//! Themes are the fixed topical buckets used everywhere in the engine: session
//! stats, Beta scores, snapshots and badges. Question providers only ever see
//! the category hints a theme maps to.

use serde::Serialize;

/// A named theme and the provider categories it groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThemeDefinition {
    pub name: &'static str,
    /// OpenTriviaDB category ids.
    pub opentdb_categories: &'static [u32],
    /// The Trivia API category tags.
    pub triviaapi_tags: &'static [&'static str],
}

const CATALOG: &[ThemeDefinition] = &[
    ThemeDefinition {
        name: "Science",
        opentdb_categories: &[17, 19, 27],
        triviaapi_tags: &["science", "animals", "mathematics"],
    },
    ThemeDefinition {
        name: "History",
        opentdb_categories: &[23, 24],
        triviaapi_tags: &["history", "politics"],
    },
    ThemeDefinition {
        name: "Music",
        opentdb_categories: &[12],
        triviaapi_tags: &["music"],
    },
    ThemeDefinition {
        name: "Movies & TV",
        opentdb_categories: &[11, 14, 32],
        triviaapi_tags: &["film", "tv", "anime", "cartoons"],
    },
    ThemeDefinition {
        name: "Sports",
        opentdb_categories: &[21],
        triviaapi_tags: &["sports"],
    },
    ThemeDefinition {
        name: "Geography",
        opentdb_categories: &[22],
        triviaapi_tags: &["geography"],
    },
    ThemeDefinition {
        name: "Technology",
        opentdb_categories: &[15, 18, 28, 30],
        triviaapi_tags: &["technology", "video_games", "computers", "gadgets", "vehicles"],
    },
    ThemeDefinition {
        name: "General Knowledge",
        opentdb_categories: &[9, 16, 26],
        triviaapi_tags: &["general", "food", "board_games", "celebrity"],
    },
    ThemeDefinition {
        name: "Arts & Culture",
        opentdb_categories: &[10, 13, 20, 25, 29, 31],
        triviaapi_tags: &["art", "literature", "culture", "comics", "mythology"],
    },
];

/// Read-only access to the theme catalog.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThemeCatalog;

impl ThemeCatalog {
    pub fn definitions() -> &'static [ThemeDefinition] {
        CATALOG
    }

    /// All theme names in catalog order.
    pub fn all_names() -> Vec<String> {
        CATALOG.iter().map(|t| t.name.to_string()).collect()
    }

    pub fn get(name: &str) -> Option<&'static ThemeDefinition> {
        CATALOG.iter().find(|t| t.name == name)
    }

    pub fn is_valid(name: &str) -> bool {
        Self::get(name).is_some()
    }

    /// Keep only catalog themes, preserving order and dropping duplicates.
    ///
    /// Falls back to the whole catalog when nothing valid remains.
    pub fn filter_allowed<S: AsRef<str>>(requested: &[S]) -> Vec<String> {
        let mut allowed: Vec<String> = Vec::new();
        for theme in requested {
            let theme = theme.as_ref();
            if Self::is_valid(theme) && !allowed.iter().any(|t| t == theme) {
                allowed.push(theme.to_string());
            }
        }

        if allowed.is_empty() {
            Self::all_names()
        } else {
            allowed
        }
    }
}

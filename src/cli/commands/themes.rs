//! `trickia themes`: list the theme catalog.

use anyhow::Result;
use serde::Serialize;

use crate::cli::display::{list_table, render_list};
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{ThemeCatalog, ThemeDefinition};

#[derive(Debug, Serialize)]
pub struct ThemeOutput {
    pub name: String,
    pub opentdb_categories: Vec<u32>,
    pub triviaapi_tags: Vec<String>,
}

impl From<&ThemeDefinition> for ThemeOutput {
    fn from(def: &ThemeDefinition) -> Self {
        Self {
            name: def.name.to_string(),
            opentdb_categories: def.opentdb_categories.to_vec(),
            triviaapi_tags: def.triviaapi_tags.iter().map(ToString::to_string).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ThemeListOutput {
    pub themes: Vec<ThemeOutput>,
    pub total: usize,
}

impl CommandOutput for ThemeListOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["theme", "opentdb categories", "trivia api tags"]);
        for theme in &self.themes {
            let categories: Vec<String> = theme.opentdb_categories.iter().map(ToString::to_string).collect();
            table.add_row(vec![
                theme.name.clone(),
                categories.join(", "),
                theme.triviaapi_tags.join(", "),
            ]);
        }
        render_list("theme", &table, self.total)
    }
}

pub fn execute(json_mode: bool) -> Result<()> {
    let themes: Vec<ThemeOutput> = ThemeCatalog::definitions().iter().map(ThemeOutput::from).collect();
    let out = ThemeListOutput {
        total: themes.len(),
        themes,
    };
    output(&out, json_mode);
    Ok(())
}

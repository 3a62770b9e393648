//! Card catalog loader.
//!
//! Accepts either a RON file wrapping the list (`CardCatalogFile`) or a plain
//! JSON array as served to web clients. Unknown JSON fields are ignored.

use std::path::Path;

use game_core::{CardCatalog, CardDefinition};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Card catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardCatalogFile {
    pub cards: Vec<CardDefinition>,
}

/// Loader for the card catalog.
pub struct CardLoader;

impl CardLoader {
    /// Load the catalog, picking the format from the file extension.
    ///
    /// `.json` files are parsed as a JSON array; anything else as RON.
    pub fn load(path: &Path) -> LoadResult<CardCatalog> {
        let content = read_file(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_ron_str(&content)
        }
    }

    pub fn from_ron_str(content: &str) -> LoadResult<CardCatalog> {
        let file: CardCatalogFile = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse card catalog RON: {}", e))?;

        Ok(CardCatalog::new(file.cards))
    }

    pub fn from_json_str(content: &str) -> LoadResult<CardCatalog> {
        let cards: Vec<CardDefinition> = serde_json::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse card catalog JSON: {}", e))?;

        Ok(CardCatalog::new(cards))
    }
}

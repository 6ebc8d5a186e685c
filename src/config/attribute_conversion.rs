use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Rules that turn NetCDF attributes into COG metadata (`attributeConversion`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeConversion {
    /// Appended to the `history` attribute. May contain `<processDateISO>` and `<version>`.
    pub history: String,
    /// Empty, or exactly two characters: the opening and closing delimiter.
    pub list_enclosure: String,
    /// May be empty, list elements are then concatenated.
    pub list_separator: String,
    #[serde(default)]
    pub remove_attribute_lst: BTreeSet<String>,
}

impl AttributeConversion {
    /// Opening and closing delimiter for numeric lists, `None` when lists are not wrapped.
    pub fn enclosure(&self) -> Option<(char, char)> {
        let mut chars = self.list_enclosure.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(open), Some(close), None) => Some((open, close)),
            _ => None,
        }
    }

    pub fn is_removed(&self, attribute: &str) -> bool {
        self.remove_attribute_lst.contains(attribute)
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        let enclosure_len = self.list_enclosure.chars().count();
        if enclosure_len != 0 && enclosure_len != 2 {
            return Err("listEnclosure must be either two or no characters".to_string());
        }
        Ok(())
    }
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::schema::Schema;

/// Kind of itinerary entry; each category lives in its own sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[serde(alias = "activities")]
    Activity,
    Housing,
    Transportation,
}

impl Category {
    /// Sheet order inside a spreadsheet, also the merge order of `Itinerary::resources`.
    pub const ALL: [Category; 3] = [Category::Activity, Category::Housing, Category::Transportation];

    pub fn sheet_name(self) -> &'static str {
        match self {
            Category::Activity => "activities",
            Category::Housing => "housing",
            Category::Transportation => "transportation",
        }
    }

    pub fn schema(self) -> Schema {
        Schema::for_category(self)
    }
}

impl FromStr for Category {
    type Err = ModelError;

    /// Accepts both the sheet name (`activities`) and the discriminator (`activity`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "activities" | "activity" => Ok(Category::Activity),
            "housing" => Ok(Category::Housing),
            "transportation" => Ok(Category::Transportation),
            other => Err(ModelError::Validation(format!(
                "unknown category `{other}`; expected activities, housing or transportation"
            ))),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Category::Activity => "activity",
            Category::Housing => "housing",
            Category::Transportation => "transportation",
        };
        f.write_str(tag)
    }
}

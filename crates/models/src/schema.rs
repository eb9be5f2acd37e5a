use crate::category::Category;
use crate::errors::ModelError;
use crate::resource::Row;

const LOCATED_FIELDS: &[&str] = &[
    "name",
    "itinerary",
    "location",
    "location_detail",
    "date_start",
    "date_end",
    "cost",
    "notes",
];

const ROUTED_FIELDS: &[&str] = &[
    "name",
    "itinerary",
    "location_from",
    "location_to",
    "date_start",
    "date_end",
    "cost",
    "notes",
];

/// Ordered column list of one category's sheet.
///
/// This is the field order every row is written in. The header actually
/// present in a spreadsheet is only checked against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    category: Category,
    fields: &'static [&'static str],
}

impl Schema {
    pub fn for_category(category: Category) -> Self {
        let fields = match category {
            Category::Activity | Category::Housing => LOCATED_FIELDS,
            Category::Transportation => ROUTED_FIELDS,
        };
        Self { category, fields }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn fields(&self) -> &'static [&'static str] {
        self.fields
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields.contains(&field)
    }

    /// Header row as written by bootstrap.
    pub fn header(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.to_string()).collect()
    }

    /// A live header is compatible when it lists exactly the schema's columns
    /// in the schema's order; surrounding whitespace is ignored.
    pub fn check_header(&self, live: &[String]) -> Result<(), ModelError> {
        let matches = live.len() == self.fields.len()
            && live.iter().zip(self.fields).all(|(l, f)| l.trim() == *f);
        if matches {
            Ok(())
        } else {
            Err(ModelError::SchemaMismatch {
                sheet: self.category.sheet_name().to_string(),
                expected: self.header(),
                found: live.to_vec(),
            })
        }
    }

    /// Project a field map onto column order; missing fields become empty cells.
    pub fn project(&self, row: &Row) -> Vec<String> {
        self.fields
            .iter()
            .map(|f| row.get(*f).cloned().unwrap_or_default())
            .collect()
    }
}

use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::category::Category;
use crate::errors::ModelError;
use crate::validation::{validate_date_range, validate_date_value};

/// One spreadsheet row keyed by header cell.
pub type Row = BTreeMap<String, String>;

/// An activity, housing or transportation entry of an itinerary.
///
/// `category` is a discriminator, not a column. `index` is the 0-based
/// position of the row inside its sheet and is only filled in on reads.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Resource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub itinerary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_end: Option<String>,
    #[serde(default, deserialize_with = "cost_from_json", skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Resource {
    pub fn named(category: Category, name: impl Into<String>) -> Self {
        Self { category: Some(category), name: name.into(), ..Self::default() }
    }

    fn text_fields(&self) -> [(&'static str, Option<&str>); 9] {
        [
            ("name", Some(self.name.as_str())),
            ("itinerary", self.itinerary.as_deref()),
            ("location", self.location.as_deref()),
            ("location_detail", self.location_detail.as_deref()),
            ("location_from", self.location_from.as_deref()),
            ("location_to", self.location_to.as_deref()),
            ("date_start", self.date_start.as_deref()),
            ("date_end", self.date_end.as_deref()),
            ("notes", self.notes.as_deref()),
        ]
    }

    /// Checks a resource before it is written to the sheet of `category`.
    pub fn validate_for(&self, category: Category) -> Result<(), ModelError> {
        if let Some(tagged) = self.category {
            if tagged != category {
                return Err(ModelError::Validation(format!(
                    "resource is tagged `{tagged}` but was sent to `{}`",
                    category.sheet_name()
                )));
            }
        }
        if self.name.trim().is_empty() {
            return Err(ModelError::Validation("name required".into()));
        }
        let schema = category.schema();
        for (field, value) in self.text_fields() {
            if value.is_some_and(|v| !v.trim().is_empty()) && !schema.has_field(field) {
                return Err(ModelError::Validation(format!(
                    "field `{field}` is not a column of `{}`",
                    category.sheet_name()
                )));
            }
        }
        if let Some(start) = self.date_start.as_deref() {
            validate_date_value("date_start", start)?;
        }
        if let Some(end) = self.date_end.as_deref() {
            validate_date_value("date_end", end)?;
        }
        if let (Some(start), Some(end)) = (self.date_start.as_deref(), self.date_end.as_deref()) {
            validate_date_range(start, end)?;
        }
        if let Some(cost) = self.cost {
            if !cost.is_finite() || cost < 0.0 {
                return Err(ModelError::Validation("cost must be a non-negative number".into()));
            }
        }
        Ok(())
    }

    /// Field map for the sheet. The discriminator and index are dropped and
    /// absent fields are left out, so they project to empty cells.
    pub fn to_row(&self) -> Row {
        let mut row = Row::new();
        for (field, value) in self.text_fields() {
            if let Some(v) = value.filter(|v| !v.is_empty()) {
                row.insert(field.to_string(), v.to_string());
            }
        }
        if let Some(cost) = self.cost {
            row.insert("cost".into(), format_cost(cost));
        }
        row
    }

    /// Rebuild a resource from a sheet row, re-attaching its category and position.
    /// Empty cells come back as absent fields.
    pub fn from_row(category: Category, index: usize, row: &Row) -> Result<Self, ModelError> {
        let cell = |field: &str| -> Option<String> {
            row.get(field)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        let cost = match cell("cost") {
            Some(raw) => Some(parse_cost(&raw).ok_or_else(|| ModelError::Malformed {
                sheet: category.sheet_name().to_string(),
                index,
                field: "cost".into(),
                value: raw.clone(),
            })?),
            None => None,
        };
        Ok(Self {
            category: Some(category),
            index: Some(index),
            name: cell("name").unwrap_or_default(),
            itinerary: cell("itinerary"),
            location: cell("location"),
            location_detail: cell("location_detail"),
            location_from: cell("location_from"),
            location_to: cell("location_to"),
            date_start: cell("date_start"),
            date_end: cell("date_end"),
            cost,
            notes: cell("notes"),
        })
    }
}

fn format_cost(cost: f64) -> String {
    if cost.fract() == 0.0 && cost.abs() < 1e15 {
        format!("{}", cost as i64)
    } else {
        cost.to_string()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CostInput {
    Number(f64),
    Text(String),
}

// Accepts `6` as well as `"6"`; a blank string means no cost.
fn cost_from_json<'de, D: Deserializer<'de>>(de: D) -> Result<Option<f64>, D::Error> {
    match Option::<CostInput>::deserialize(de)? {
        None => Ok(None),
        Some(CostInput::Number(n)) => Ok(Some(n)),
        Some(CostInput::Text(raw)) if raw.trim().is_empty() => Ok(None),
        Some(CostInput::Text(raw)) => raw
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("cost must be a number, got `{raw}`"))),
    }
}

// Sheets may hand back user-entered costs with a currency sign or grouping.
fn parse_cost(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '$' | '€' | '£' | ' '))
        .collect();
    let (whole, fraction) = match cleaned.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (cleaned.as_str(), None),
    };
    let mut number = strip_grouping(whole)?;
    if let Some(fraction) = fraction {
        number.push('.');
        number.push_str(fraction);
    }
    number.parse::<f64>().ok().filter(|c| c.is_finite())
}

// Commas are only thousands separators: `1,250` but never `20,5`.
fn strip_grouping(whole: &str) -> Option<String> {
    let groups: Vec<&str> = whole.split(',').collect();
    if groups.len() == 1 {
        return Some(whole.to_string());
    }
    let digits = |g: &str| g.chars().all(|c| c.is_ascii_digit());
    let head = groups[0].trim_start_matches('-');
    let head_ok = (1..=3).contains(&head.len()) && digits(head);
    let tail_ok = groups[1..].iter().all(|g| g.len() == 3 && digits(g));
    (head_ok && tail_ok).then(|| groups.concat())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn louvre() -> Resource {
        Resource { cost: Some(20.0), ..Resource::named(Category::Activity, "Louvre") }
    }

    #[test]
    fn row_omits_absent_fields_and_discriminator() {
        let row = louvre().to_row();
        assert_eq!(row.len(), 2);
        assert_eq!(row["name"], "Louvre");
        assert_eq!(row["cost"], "20");
        assert!(!row.contains_key("category"));
    }

    #[test]
    fn absent_fields_never_become_placeholders() {
        let cells = Category::Activity.schema().project(&louvre().to_row());
        assert!(cells.iter().all(|c| c != "None" && c != "null"));
        assert_eq!(cells[0], "Louvre");
        assert_eq!(cells[1], "");
    }

    #[test]
    fn from_row_tags_category_and_index() {
        let mut row = Row::new();
        row.insert("name".into(), "Louvre".into());
        row.insert("cost".into(), "20".into());
        row.insert("notes".into(), "".into());
        let r = Resource::from_row(Category::Activity, 3, &row).expect("map");
        assert_eq!(r.category, Some(Category::Activity));
        assert_eq!(r.index, Some(3));
        assert_eq!(r.cost, Some(20.0));
        assert_eq!(r.notes, None);
        assert_eq!(r.location, None);
    }

    #[test]
    fn serialized_read_has_only_present_fields() {
        let mut row = Row::new();
        row.insert("name".into(), "Louvre".into());
        row.insert("cost".into(), "20".into());
        let r = Resource::from_row(Category::Activity, 0, &row).expect("map");
        let json = serde_json::to_value(&r).expect("json");
        let obj = json.as_object().expect("object");
        assert_eq!(obj.len(), 4);
        assert_eq!(json["category"], "activity");
        assert_eq!(json["cost"], 20.0);
    }

    #[test]
    fn cost_accepts_currency_formatting() {
        let mut row = Row::new();
        row.insert("name".into(), "Flight".into());
        row.insert("cost".into(), "$1,250.50".into());
        let r = Resource::from_row(Category::Transportation, 0, &row).expect("map");
        assert_eq!(r.cost, Some(1250.5));
    }

    #[test]
    fn cost_commas_must_be_thousands_separators() {
        assert_eq!(parse_cost("1,234,567"), Some(1234567.0));
        assert_eq!(parse_cost("€ 12"), Some(12.0));
        assert_eq!(parse_cost("20,5"), None);
        assert_eq!(parse_cost("1.234,50"), None);
        assert_eq!(parse_cost("1234,567"), None);

        let mut row = Row::new();
        row.insert("name".into(), "Dinner".into());
        row.insert("cost".into(), "20,5".into());
        let err = Resource::from_row(Category::Activity, 1, &row).unwrap_err();
        assert!(matches!(err, ModelError::Malformed { index: 1, .. }));
    }

    #[test]
    fn unreadable_cost_is_reported() {
        let mut row = Row::new();
        row.insert("name".into(), "Flight".into());
        row.insert("cost".into(), "cheap".into());
        let err = Resource::from_row(Category::Transportation, 2, &row).unwrap_err();
        assert!(matches!(err, ModelError::Malformed { index: 2, .. }));
    }

    #[test]
    fn validation_rejects_foreign_columns_and_bad_values() {
        let mut r = Resource::named(Category::Activity, "Hike");
        r.location_from = Some("A".into());
        assert!(r.validate_for(Category::Activity).is_err());

        let r = Resource { cost: Some(-1.0), ..Resource::named(Category::Activity, "Hike") };
        assert!(r.validate_for(Category::Activity).is_err());

        let r = Resource::named(Category::Activity, "  ");
        assert!(r.validate_for(Category::Activity).is_err());

        let r = Resource::named(Category::Housing, "Hotel");
        assert!(r.validate_for(Category::Activity).is_err());

        let mut r = Resource::named(Category::Transportation, "Train");
        r.location_from = Some("Paris".into());
        r.location_to = Some("Lyon".into());
        r.date_start = Some("2024-11-30".into());
        r.date_end = Some("2024-11-30T18:00:00Z".into());
        assert!(r.validate_for(Category::Transportation).is_ok());
    }

    #[test]
    fn untagged_body_is_accepted_for_any_category() {
        let r: Resource = serde_json::from_str(r#"{"name":"Hiking","cost":6}"#).expect("json");
        assert_eq!(r.category, None);
        assert!(r.validate_for(Category::Activity).is_ok());
    }

    #[test]
    fn cost_may_arrive_as_numeric_text() {
        let body = r#"{"category":"activity","name":"Hiking","cost":"6","date_start":"2024-11-30"}"#;
        let r: Resource = serde_json::from_str(body).expect("json");
        assert_eq!(r.cost, Some(6.0));
        assert!(r.validate_for(Category::Activity).is_ok());

        let r: Resource = serde_json::from_str(r#"{"name":"Hiking","cost":""}"#).expect("json");
        assert_eq!(r.cost, None);
        let r: Resource = serde_json::from_str(r#"{"name":"Hiking","cost":null}"#).expect("json");
        assert_eq!(r.cost, None);

        let err = serde_json::from_str::<Resource>(r#"{"name":"Hiking","cost":"cheap"}"#).unwrap_err();
        assert!(err.to_string().contains("cost must be a number"));
    }
}

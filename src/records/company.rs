use serde_json::Value;

/// A company as listed by the upstream directory
///
/// Built once from the listing response and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyRecord {
    /// Unique identifier used to build the detail-page URL
    pub slug: String,

    /// Display name
    pub name: String,

    /// Batch label (e.g. "W21"); empty when the listing omits it
    pub batch: String,

    /// One-line description; empty when the listing omits it
    pub description: String,

    /// Company website, if listed
    pub website: Option<String>,
}

impl CompanyRecord {
    /// Builds a record from one listing entry
    ///
    /// `slug` and `name` must be non-empty strings. The other fields are
    /// optional: a missing, null or mistyped value is treated as absent.
    ///
    /// # Returns
    ///
    /// * `Ok(CompanyRecord)` - The entry had the required fields
    /// * `Err(String)` - Why the entry must be skipped
    pub fn from_json(entry: &Value) -> Result<Self, String> {
        if !entry.is_object() {
            return Err(format!("expected an object, got {}", json_kind(entry)));
        }

        let slug = required_str(entry, "slug")?;
        let name = required_str(entry, "name")?;

        Ok(Self {
            slug,
            name,
            batch: optional_str(entry, "batch").unwrap_or_default(),
            description: optional_str(entry, "one_liner").unwrap_or_default(),
            website: optional_str(entry, "website"),
        })
    }
}

fn required_str(entry: &Value, key: &str) -> Result<String, String> {
    match entry.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Some(Value::String(_)) => Err(format!("field '{}' is empty", key)),
        Some(other) => Err(format!("field '{}' is {}, not a string", key, json_kind(other))),
        None => Err(format!("missing field '{}'", key)),
    }
}

fn optional_str(entry: &Value, key: &str) -> Option<String> {
    entry
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_full_entry() {
        let entry = json!({
            "id": 271,
            "name": "Airbnb",
            "slug": "airbnb",
            "batch": "W09",
            "one_liner": "Book accommodations around the world.",
            "website": "https://airbnb.com",
            "tags": ["Marketplace"]
        });

        let company = CompanyRecord::from_json(&entry).unwrap();
        assert_eq!(company.slug, "airbnb");
        assert_eq!(company.name, "Airbnb");
        assert_eq!(company.batch, "W09");
        assert_eq!(company.description, "Book accommodations around the world.");
        assert_eq!(company.website.as_deref(), Some("https://airbnb.com"));
    }

    #[test]
    fn test_optional_fields_default_to_empty() {
        let entry = json!({ "name": "Acme", "slug": "acme-inc", "one_liner": null, "batch": 12 });

        let company = CompanyRecord::from_json(&entry).unwrap();
        assert_eq!(company.batch, "");
        assert_eq!(company.description, "");
        assert_eq!(company.website, None);
    }

    #[test]
    fn test_missing_slug_is_rejected() {
        let entry = json!({ "name": "Acme" });
        let err = CompanyRecord::from_json(&entry).unwrap_err();
        assert!(err.contains("slug"));
    }

    #[test]
    fn test_mistyped_name_is_rejected() {
        let entry = json!({ "name": 42, "slug": "acme" });
        let err = CompanyRecord::from_json(&entry).unwrap_err();
        assert!(err.contains("a number"));
    }

    #[test]
    fn test_blank_required_field_is_rejected() {
        let entry = json!({ "name": "   ", "slug": "acme" });
        assert!(CompanyRecord::from_json(&entry).is_err());
    }

    #[test]
    fn test_non_object_entry_is_rejected() {
        assert!(CompanyRecord::from_json(&json!("acme")).is_err());
        assert!(CompanyRecord::from_json(&json!(null)).is_err());
    }

    #[test]
    fn test_fields_are_trimmed() {
        let entry = json!({ "name": "  Acme ", "slug": " acme\n" });
        let company = CompanyRecord::from_json(&entry).unwrap();
        assert_eq!(company.name, "Acme");
        assert_eq!(company.slug, "acme");
    }
}

//! Joins companies with their founders into output rows

use crate::records::{CompanyRecord, FounderRecord, OutputRow};
use std::collections::HashMap;

/// Flattens companies and founders into rows
///
/// Each company yields one row per founder in parser order, or exactly one
/// placeholder row when its founder list is empty or missing. Companies keep
/// their input order. Callers exclude failed fetches beforehand.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
/// use yc_founders::output::aggregate;
/// use yc_founders::CompanyRecord;
///
/// let company = CompanyRecord {
///     slug: "acme-inc".to_string(),
///     name: "Acme".to_string(),
///     batch: "W21".to_string(),
///     description: "Anvils".to_string(),
///     website: None,
/// };
///
/// let rows = aggregate(&[company], &HashMap::new());
/// assert_eq!(rows.len(), 1);
/// assert!(!rows[0].has_founder());
/// ```
pub fn aggregate(
    companies: &[CompanyRecord],
    founders_by_slug: &HashMap<String, Vec<FounderRecord>>,
) -> Vec<OutputRow> {
    let mut rows = Vec::with_capacity(companies.len());

    for company in companies {
        match founders_by_slug.get(&company.slug) {
            Some(founders) if !founders.is_empty() => {
                rows.extend(
                    founders
                        .iter()
                        .map(|founder| OutputRow::with_founder(company, founder)),
                );
            }
            _ => rows.push(OutputRow::placeholder(company)),
        }
    }

    rows
}

use super::{CompanyRecord, FounderRecord};

/// Header of the exported file, in column order
pub const CSV_HEADER: [&str; 5] = [
    "company_name",
    "batch",
    "short_description",
    "founder_name",
    "founder_linkedin_url",
];

/// One exported row: a company joined with one founder, or with no founder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRow {
    pub company_name: String,
    pub batch: String,
    pub short_description: String,
    pub founder_name: String,
    pub founder_linkedin_url: String,
}

impl OutputRow {
    pub fn with_founder(company: &CompanyRecord, founder: &FounderRecord) -> Self {
        Self {
            founder_name: founder.name.clone(),
            founder_linkedin_url: founder
                .profile_url
                .as_ref()
                .map(|u| u.to_string())
                .unwrap_or_default(),
            ..Self::placeholder(company)
        }
    }

    /// A row with empty founder fields
    pub fn placeholder(company: &CompanyRecord) -> Self {
        Self {
            company_name: company.name.clone(),
            batch: company.batch.clone(),
            short_description: company.description.clone(),
            founder_name: String::new(),
            founder_linkedin_url: String::new(),
        }
    }

    pub fn has_founder(&self) -> bool {
        !self.founder_name.is_empty()
    }

    /// Fields in [`CSV_HEADER`] order
    pub fn fields(&self) -> [&str; 5] {
        [
            self.company_name.as_str(),
            self.batch.as_str(),
            self.short_description.as_str(),
            self.founder_name.as_str(),
            self.founder_linkedin_url.as_str(),
        ]
    }
}

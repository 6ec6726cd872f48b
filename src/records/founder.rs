use url::Url;

/// A founder extracted from one company detail page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FounderRecord {
    /// Full name as displayed, whitespace-collapsed
    pub name: String,

    /// Professional-network profile, when the page links one
    pub profile_url: Option<Url>,
}

impl FounderRecord {
    pub fn new(name: impl Into<String>, profile_url: Option<Url>) -> Self {
        Self {
            name: name.into(),
            profile_url,
        }
    }

    pub fn has_profile(&self) -> bool {
        self.profile_url.is_some()
    }
}

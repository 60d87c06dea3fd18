use super::domain::{non_blank, NormalizedPolicy};
use serde::Serialize;
use std::collections::HashSet;

pub const ALL_COMPANIES: &str = "All Company";
pub const ALL_TYPES: &str = "All Types";

/// Filter options offered to the user, derived from the loaded records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetVocabulary {
    pub companies: Vec<String>,
    pub types: Vec<String>,
}

impl FacetVocabulary {
    pub fn contains_company(&self, value: &str) -> bool {
        self.companies.iter().any(|company| company == value)
    }

    pub fn contains_type(&self, value: &str) -> bool {
        self.types.iter().any(|policy_type| policy_type == value)
    }
}

impl Default for FacetVocabulary {
    fn default() -> Self {
        extract_facets(&[])
    }
}

pub fn extract_facets(records: &[NormalizedPolicy]) -> FacetVocabulary {
    let companies = distinct_with_sentinel(
        ALL_COMPANIES,
        records.iter().map(|policy| policy.company.as_str()),
    );
    let types = distinct_with_sentinel(
        ALL_TYPES,
        records
            .iter()
            .filter_map(|policy| non_blank(policy.policy_type())),
    );

    FacetVocabulary { companies, types }
}

fn distinct_with_sentinel<'a, I>(sentinel: &str, values: I) -> Vec<String>
where
    I: Iterator<Item = &'a str>,
{
    let mut seen: HashSet<&str> = HashSet::new();
    seen.insert(sentinel);

    let mut ordered = vec![sentinel.to_string()];
    for value in values {
        if seen.insert(value) {
            ordered.push(value.to_string());
        }
    }
    ordered
}

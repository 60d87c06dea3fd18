use super::dates::epoch_days;
use super::domain::NormalizedPolicy;
use super::facets::{FacetVocabulary, ALL_COMPANIES, ALL_TYPES};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// One facet's choice: no filtering, or an exact value to match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FacetChoice {
    #[default]
    All,
    Value(String),
}

impl FacetChoice {
    /// Reads a UI value; empty text and the facet's sentinel both mean "no filter".
    pub fn from_label(value: &str, sentinel: &str) -> Self {
        if value.trim().is_empty() || value == sentinel {
            Self::All
        } else {
            Self::Value(value.to_string())
        }
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::Value(value) => Some(value.as_str()),
        }
    }

    fn accepts(&self, candidate: Option<&str>) -> bool {
        match self {
            Self::All => true,
            Self::Value(value) => candidate == Some(value.as_str()),
        }
    }
}

/// The active facet choices of a screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSelection {
    #[serde(
        default,
        deserialize_with = "company_choice",
        serialize_with = "company_label"
    )]
    pub company: FacetChoice,
    #[serde(
        default,
        alias = "type",
        deserialize_with = "type_choice",
        serialize_with = "type_label"
    )]
    pub policy_type: FacetChoice,
}

impl FilterSelection {
    pub fn new(company: Option<&str>, policy_type: Option<&str>) -> Self {
        Self {
            company: company
                .map(|value| FacetChoice::from_label(value, ALL_COMPANIES))
                .unwrap_or_default(),
            policy_type: policy_type
                .map(|value| FacetChoice::from_label(value, ALL_TYPES))
                .unwrap_or_default(),
        }
    }

    pub fn company(value: &str) -> Self {
        Self::new(Some(value), None)
    }

    pub fn policy_type(value: &str) -> Self {
        Self::new(None, Some(value))
    }

    pub fn is_unfiltered(&self) -> bool {
        self.company == FacetChoice::All && self.policy_type == FacetChoice::All
    }

    pub fn matches(&self, policy: &NormalizedPolicy) -> bool {
        self.company.accepts(Some(policy.company.as_str()))
            && self.policy_type.accepts(policy.policy_type())
    }

    /// Resets choices whose value no longer appears in `facets`.
    ///
    /// Returns `true` when anything was reset.
    pub fn retain_available(&mut self, facets: &FacetVocabulary) -> bool {
        let mut changed = false;
        if let Some(company) = self.company.value() {
            if !facets.contains_company(company) {
                self.company = FacetChoice::All;
                changed = true;
            }
        }
        if let Some(policy_type) = self.policy_type.value() {
            if !facets.contains_type(policy_type) {
                self.policy_type = FacetChoice::All;
                changed = true;
            }
        }
        changed
    }
}

fn choice_from<'de, D>(deserializer: D, sentinel: &str) -> Result<FacetChoice, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .map(|value| FacetChoice::from_label(&value, sentinel))
        .unwrap_or_default())
}

fn company_choice<'de, D>(deserializer: D) -> Result<FacetChoice, D::Error>
where
    D: Deserializer<'de>,
{
    choice_from(deserializer, ALL_COMPANIES)
}

fn type_choice<'de, D>(deserializer: D) -> Result<FacetChoice, D::Error>
where
    D: Deserializer<'de>,
{
    choice_from(deserializer, ALL_TYPES)
}

fn company_label<S>(choice: &FacetChoice, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(choice.value().unwrap_or(ALL_COMPANIES))
}

fn type_label<S>(choice: &FacetChoice, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(choice.value().unwrap_or(ALL_TYPES))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    #[serde(alias = "newest-first", alias = "newest")]
    NewestFirst,
    #[serde(alias = "oldest-first", alias = "oldest")]
    OldestFirst,
    #[serde(alias = "premium-high-to-low", alias = "high-low")]
    PremiumHighToLow,
    #[serde(alias = "premium-low-to-high", alias = "low-high")]
    PremiumLowToHigh,
}

impl SortKey {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::NewestFirst,
            Self::OldestFirst,
            Self::PremiumHighToLow,
            Self::PremiumLowToHigh,
        ]
    }

    /// Spelling accepted on the command line.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NewestFirst => "newest-first",
            Self::OldestFirst => "oldest-first",
            Self::PremiumHighToLow => "premium-high-to-low",
            Self::PremiumLowToHigh => "premium-low-to-high",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::NewestFirst => "Newest First",
            Self::OldestFirst => "Oldest First",
            Self::PremiumHighToLow => "Premium: High to Low",
            Self::PremiumLowToHigh => "Premium: Low to High",
        }
    }

    fn compare(self, a: &NormalizedPolicy, b: &NormalizedPolicy) -> Ordering {
        let by_date = || epoch_days(a.parsed_end_date).cmp(&epoch_days(b.parsed_end_date));
        let by_premium = || {
            a.premium_value
                .unwrap_or(0)
                .cmp(&b.premium_value.unwrap_or(0))
        };

        match self {
            Self::NewestFirst => by_date().reverse(),
            Self::OldestFirst => by_date(),
            Self::PremiumHighToLow => by_premium().reverse(),
            Self::PremiumLowToHigh => by_premium(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSortKey(pub String);

impl fmt::Display for UnknownSortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let expected: Vec<&str> = SortKey::ordered().iter().map(|key| key.as_str()).collect();
        write!(
            f,
            "unknown sort key '{}' (expected one of {})",
            self.0,
            expected.join(", ")
        )
    }
}

impl std::error::Error for UnknownSortKey {}

impl FromStr for SortKey {
    type Err = UnknownSortKey;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        if let Some(key) = Self::ordered()
            .into_iter()
            .find(|key| key.as_str() == normalized)
        {
            return Ok(key);
        }
        match normalized.as_str() {
            "newest" => Ok(Self::NewestFirst),
            "oldest" => Ok(Self::OldestFirst),
            "high-low" => Ok(Self::PremiumHighToLow),
            "low-high" => Ok(Self::PremiumLowToHigh),
            _ => Err(UnknownSortKey(value.to_string())),
        }
    }
}

/// Filters and orders a normalized record set for display.
///
/// The sort is stable, so records with equal keys keep their input order in either
/// direction. Unreadable dates and premiums sort as zero.
pub fn apply(
    records: &[NormalizedPolicy],
    selection: &FilterSelection,
    sort: SortKey,
) -> Vec<NormalizedPolicy> {
    let mut view: Vec<NormalizedPolicy> = records
        .iter()
        .filter(|policy| selection.matches(policy))
        .cloned()
        .collect();
    view.sort_by(|a, b| sort.compare(a, b));
    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policies::domain::{PremiumAmount, RawPolicyRecord};
    use crate::policies::normalizer::PolicyNormalizer;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn normalizer() -> PolicyNormalizer {
        PolicyNormalizer::new(
            NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid today"),
            "Insurance Co.",
        )
    }

    fn policy(
        number: &str,
        insurer: &str,
        policy_type: &str,
        premium: &str,
        end: &str,
    ) -> NormalizedPolicy {
        normalizer().normalize(RawPolicyRecord {
            policy_number: Some(number.to_string()),
            insurer: Some(insurer.to_string()),
            policy_type: Some(policy_type.to_string()),
            premium_amount: Some(PremiumAmount::from(premium)),
            end_date: Some(end.to_string()),
            ..RawPolicyRecord::default()
        })
    }

    fn numbers(view: &[NormalizedPolicy]) -> Vec<&str> {
        view.iter()
            .map(|policy| policy.raw.policy_number.as_deref().unwrap_or(""))
            .collect()
    }

    fn sample() -> Vec<NormalizedPolicy> {
        vec![
            policy("a", "LIC", "Life", "12,000", "10/05/2024"),
            policy("b", "HDFC", "Health", "8,500", "01/01/2099"),
            policy("c", "LIC", "Health", "12,000", "15/08/2025"),
            policy("d", "TATA", "Motor", "oops", "unknown"),
        ]
    }

    #[test]
    fn unfiltered_selection_passes_everything() {
        let records = sample();
        let selection = FilterSelection::default();
        assert!(selection.is_unfiltered());
        assert_eq!(apply(&records, &selection, SortKey::OldestFirst).len(), 4);
    }

    #[test]
    fn active_facets_are_anded() {
        let records = sample();
        let selection = FilterSelection::new(Some("LIC"), Some("Health"));
        let view = apply(&records, &selection, SortKey::NewestFirst);
        assert_eq!(numbers(&view), vec!["c"]);
    }

    #[test]
    fn matching_is_case_sensitive() {
        let records = sample();
        let view = apply(&records, &FilterSelection::company("lic"), SortKey::NewestFirst);
        assert!(view.is_empty());
    }

    #[test]
    fn sentinel_labels_mean_no_filter() {
        let selection = FilterSelection::new(Some(ALL_COMPANIES), Some(ALL_TYPES));
        assert!(selection.is_unfiltered());
        assert!(FilterSelection::new(Some(""), None).is_unfiltered());
    }

    #[test]
    fn date_orders_put_unreadable_dates_at_the_epoch() {
        let records = sample();
        let newest = apply(&records, &FilterSelection::default(), SortKey::NewestFirst);
        assert_eq!(numbers(&newest), vec!["b", "c", "a", "d"]);

        let oldest = apply(&records, &FilterSelection::default(), SortKey::OldestFirst);
        assert_eq!(numbers(&oldest), vec!["d", "a", "c", "b"]);
    }

    #[test]
    fn premium_orders_are_stable_for_ties() {
        let records = sample();
        let high = apply(&records, &FilterSelection::default(), SortKey::PremiumHighToLow);
        assert_eq!(numbers(&high), vec!["a", "c", "b", "d"]);

        let low = apply(&records, &FilterSelection::default(), SortKey::PremiumLowToHigh);
        assert_eq!(numbers(&low), vec!["d", "b", "a", "c"]);
    }

    #[test]
    fn date_orders_are_stable_for_equal_and_unreadable_dates() {
        let records = vec![
            policy("p", "LIC", "Life", "100", "01/01/2030"),
            policy("q", "HDFC", "Life", "200", "not a date"),
            policy("r", "TATA", "Life", "300", "2030-01-01"),
            policy("s", "LIC", "Life", "400", ""),
            policy("t", "HDFC", "Life", "500", "01/01/2030"),
        ];

        let newest = apply(&records, &FilterSelection::default(), SortKey::NewestFirst);
        assert_eq!(numbers(&newest), vec!["p", "r", "t", "q", "s"]);

        let oldest = apply(&records, &FilterSelection::default(), SortKey::OldestFirst);
        assert_eq!(numbers(&oldest), vec!["q", "s", "p", "r", "t"]);
    }

    #[test]
    fn sort_keys_parse_from_cli_and_ui_spellings() {
        assert_eq!("newest-first".parse(), Ok(SortKey::NewestFirst));
        assert_eq!("Oldest_First".parse(), Ok(SortKey::OldestFirst));
        assert_eq!("high-low".parse(), Ok(SortKey::PremiumHighToLow));
        assert_eq!("premium low to high".parse(), Ok(SortKey::PremiumLowToHigh));
        let error = "cheapest".parse::<SortKey>().expect_err("unknown key");
        assert!(error
            .to_string()
            .ends_with("newest-first, oldest-first, premium-high-to-low, premium-low-to-high)"));
        for key in SortKey::ordered() {
            assert_eq!(key.as_str().parse(), Ok(key));
            assert!(!key.label().is_empty());
        }
    }

    #[test]
    fn selection_decodes_sentinels_and_missing_keys() {
        let selection: FilterSelection =
            serde_json::from_str(r#"{"company":"All Company","policyType":"Life"}"#)
                .expect("selection decodes");
        assert_eq!(selection.company, FacetChoice::All);
        assert_eq!(selection.policy_type, FacetChoice::Value("Life".to_string()));

        let empty: FilterSelection = serde_json::from_str("{}").expect("empty decodes");
        assert!(empty.is_unfiltered());

        let value = serde_json::to_value(&empty).expect("serializes");
        assert_eq!(value["company"], ALL_COMPANIES);
        assert_eq!(value["policyType"], ALL_TYPES);
    }

    #[test]
    fn retain_available_drops_vanished_values() {
        let facets = FacetVocabulary {
            companies: vec![ALL_COMPANIES.to_string(), "HDFC".to_string()],
            types: vec![ALL_TYPES.to_string(), "Life".to_string()],
        };
        let mut selection = FilterSelection::new(Some("LIC"), Some("Life"));
        assert!(selection.retain_available(&facets));
        assert_eq!(selection.company, FacetChoice::All);
        assert_eq!(selection.policy_type, FacetChoice::Value("Life".to_string()));
        assert!(!selection.retain_available(&facets));
    }

    fn arb_records() -> impl Strategy<Value = Vec<NormalizedPolicy>> {
        prop::collection::vec(
            (0usize..3, 0usize..3, 0u64..5, 0u32..4),
            0..24,
        )
        .prop_map(|rows| {
            rows.into_iter()
                .enumerate()
                .map(|(index, (insurer, kind, premium, month))| {
                    let insurer = ["LIC", "HDFC", "TATA"][insurer];
                    let kind = ["Life", "Health", "Motor"][kind];
                    let premium = (premium * 1_000).to_string();
                    let end = format!("01/{:02}/2024", month + 1);
                    policy(&index.to_string(), insurer, kind, &premium, &end)
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn single_filter_keeps_exactly_the_matches(records in arb_records(), pick in 0usize..3) {
            let company = ["LIC", "HDFC", "TATA"][pick];
            let view = apply(&records, &FilterSelection::company(company), SortKey::OldestFirst);
            prop_assert!(view.iter().all(|policy| policy.company == company));
            let expected = records.iter().filter(|policy| policy.company == company).count();
            prop_assert_eq!(view.len(), expected);
        }

        #[test]
        fn premium_directions_mirror_each_other(records in arb_records()) {
            let selection = FilterSelection::default();
            let high = apply(&records, &selection, SortKey::PremiumHighToLow);
            let low = apply(&records, &selection, SortKey::PremiumLowToHigh);

            for (position, later) in high.iter().enumerate() {
                for earlier in &high[..position] {
                    let earlier_low = low.iter().position(|policy| policy == earlier);
                    let later_low = low.iter().position(|policy| policy == later);
                    if earlier.premium_value == later.premium_value {
                        prop_assert!(earlier_low < later_low);
                    } else {
                        prop_assert!(earlier_low > later_low);
                    }
                }
            }
        }
    }
}

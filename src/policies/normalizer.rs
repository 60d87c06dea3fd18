use super::amount::{format_compact, premium_magnitude};
use super::company::company_or;
use super::dates::{format_display_date, parse_date};
use super::domain::{NormalizedPolicy, RawPolicyRecord, DERIVED_KEYS};
use super::status::resolve_status;
use chrono::NaiveDate;
use tracing::debug;

const MISSING_DATE_LABEL: &str = "-";

/// Annotates raw records for one screen.
///
/// Holds only the facts a screen supplies per load: the date to compare against and
/// the company label to use when a record names no insurer.
#[derive(Debug, Clone)]
pub struct PolicyNormalizer {
    today: NaiveDate,
    company_fallback: String,
}

impl PolicyNormalizer {
    pub fn new(today: NaiveDate, company_fallback: impl Into<String>) -> Self {
        Self {
            today,
            company_fallback: company_fallback.into(),
        }
    }

    pub fn normalize(&self, mut raw: RawPolicyRecord) -> NormalizedPolicy {
        for key in DERIVED_KEYS {
            if raw.extra.remove(*key).is_some() {
                debug!(
                    policy = ?raw.policy_number,
                    key,
                    "backend field shadowed by derived value"
                );
            }
        }

        let parsed_end_date = raw.end_date.as_deref().and_then(parse_date);
        if parsed_end_date.is_none() {
            if let Some(end_date) = raw.end_date.as_deref() {
                debug!(policy = ?raw.policy_number, end_date, "unparseable end date");
            }
        }

        let resolution = resolve_status(raw.status.as_deref(), parsed_end_date, self.today);
        let company = company_or(&raw, &self.company_fallback);

        let premium_value = raw.premium_amount.as_ref().and_then(premium_magnitude);
        if premium_value.is_none() && raw.premium_amount.is_some() {
            debug!(policy = ?raw.policy_number, "premium amount is not numeric");
        }

        let formatted_end_date = match (parsed_end_date, raw.end_date.as_deref()) {
            (Some(date), _) => format_display_date(date),
            (None, Some(text)) if !text.trim().is_empty() => text.trim().to_string(),
            (None, _) => MISSING_DATE_LABEL.to_string(),
        };

        NormalizedPolicy {
            parsed_end_date,
            resolved_status: resolution.status,
            is_overdue: resolution.is_overdue,
            company,
            formatted_premium: format_compact(premium_value),
            formatted_end_date,
            premium_value,
            raw,
        }
    }

    pub fn normalize_all<I>(&self, records: I) -> Vec<NormalizedPolicy>
    where
        I: IntoIterator<Item = RawPolicyRecord>,
    {
        records
            .into_iter()
            .map(|record| self.normalize(record))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policies::domain::{PolicyStatus, PremiumAmount};

    fn normalizer() -> PolicyNormalizer {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid today");
        PolicyNormalizer::new(today, "Insurance Co.")
    }

    #[test]
    fn annotates_every_display_field() {
        let raw = RawPolicyRecord {
            policy_number: Some("P-1".to_string()),
            product_name: Some("LIC Jeevan Anand".to_string()),
            premium_amount: Some(PremiumAmount::from("₹1,50,000")),
            end_date: Some("10/05/2024".to_string()),
            ..RawPolicyRecord::default()
        };

        let policy = normalizer().normalize(raw.clone());
        assert_eq!(
            policy.parsed_end_date,
            NaiveDate::from_ymd_opt(2024, 5, 10)
        );
        assert_eq!(policy.resolved_status, PolicyStatus::Overdue);
        assert!(policy.is_overdue);
        assert_eq!(policy.company, "LIC");
        assert_eq!(policy.formatted_premium, "1.5L");
        assert_eq!(policy.formatted_end_date, "10/05/2024");
        assert_eq!(policy.premium_value, Some(150_000));
        assert_eq!(policy.raw, raw);
    }

    #[test]
    fn malformed_fields_degrade_without_dropping_the_record() {
        let raw = RawPolicyRecord {
            premium_amount: Some(PremiumAmount::from("n/a")),
            end_date: Some("someday".to_string()),
            ..RawPolicyRecord::default()
        };

        let policies = normalizer().normalize_all(vec![raw, RawPolicyRecord::default()]);
        assert_eq!(policies.len(), 2);

        let garbled = &policies[0];
        assert_eq!(garbled.parsed_end_date, None);
        assert_eq!(garbled.resolved_status, PolicyStatus::Due);
        assert_eq!(garbled.formatted_premium, "0");
        assert_eq!(garbled.formatted_end_date, "someday");
        assert_eq!(garbled.company, "Insurance Co.");

        assert_eq!(policies[1].formatted_end_date, "-");
    }

    #[test]
    fn serialized_policy_keeps_raw_fields_next_to_derived_ones() {
        let raw = RawPolicyRecord {
            id: Some("abc".to_string()),
            company: Some("Star Health".to_string()),
            end_date: Some("2099-01-01".to_string()),
            ..RawPolicyRecord::default()
        };
        let value = serde_json::to_value(normalizer().normalize(raw)).expect("serializes");

        assert_eq!(value["id"], "abc");
        assert_eq!(value["companyName"], "Star Health");
        assert_eq!(value["company"], "Star Health");
        assert_eq!(value["endDate"], "2099-01-01");
        assert_eq!(value["parsedEndDate"], "2099-01-01");
        assert_eq!(value["resolvedStatus"], "Due");
        assert_eq!(value["isOverdue"], false);
        assert!(value.get("premiumValue").is_none());
    }

    #[test]
    fn backend_fields_named_like_derived_ones_are_not_repeated() {
        let raw: RawPolicyRecord = serde_json::from_value(serde_json::json!({
            "policyNumber": "P-9",
            "endDate": "01/01/2099",
            "isOverdue": true,
            "resolvedStatus": "Lapsed",
            "agentCode": "AG-1"
        }))
        .expect("record decodes");

        let policy = normalizer().normalize(raw);
        let text = serde_json::to_string(&policy).expect("serializes");
        assert_eq!(text.matches("\"isOverdue\"").count(), 1);
        assert_eq!(text.matches("\"resolvedStatus\"").count(), 1);

        let value: serde_json::Value = serde_json::from_str(&text).expect("valid json");
        assert_eq!(value["isOverdue"], false);
        assert_eq!(value["resolvedStatus"], "Due");
        assert_eq!(value["agentCode"], "AG-1");
    }
}

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number, Value};
use std::fmt;

/// Premium as delivered by the backend: either a JSON number or free text such as
/// `"₹12,500"`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PremiumAmount {
    Number(Number),
    Text(String),
}

impl From<u64> for PremiumAmount {
    fn from(value: u64) -> Self {
        Self::Number(Number::from(value))
    }
}

impl From<&str> for PremiumAmount {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// A policy record exactly as the backend returned it.
///
/// Unknown keys are kept in `extra` so that a record can be handed back to the
/// display layer without losing anything. Backend aliases (`_id`, `insurerName`,
/// `companyName`) fill their field only when the canonical key is absent, so a
/// record carrying both still decodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RecordFields")]
pub struct RawPolicyRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub premium_amount: Option<PremiumAmount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insurer: Option<String>,
    // Re-emitted as `companyName` so it never collides with the derived `company`.
    #[serde(rename = "companyName", skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

const ID_ALIAS: &str = "_id";
const INSURER_ALIAS: &str = "insurerName";
const COMPANY_ALIAS: &str = "companyName";

/// Wire shape of a record before aliases are folded in.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordFields {
    #[serde(default, deserialize_with = "optional_text")]
    id: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    customer_id: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    policy_number: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    product_name: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    policy_type: Option<String>,
    #[serde(default, deserialize_with = "optional_premium")]
    premium_amount: Option<PremiumAmount>,
    #[serde(default, deserialize_with = "optional_text")]
    end_date: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    status: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    insurer: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    company: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<RecordFields> for RawPolicyRecord {
    fn from(fields: RecordFields) -> Self {
        let mut extra = fields.extra;
        let mut take_alias = |canonical: Option<String>, alias: &str| {
            let aliased = extra.remove(alias).and_then(text_value);
            canonical.or(aliased)
        };

        Self {
            id: take_alias(fields.id, ID_ALIAS),
            insurer: take_alias(fields.insurer, INSURER_ALIAS),
            company: take_alias(fields.company, COMPANY_ALIAS),
            customer_id: fields.customer_id,
            policy_number: fields.policy_number,
            product_name: fields.product_name,
            policy_type: fields.policy_type,
            premium_amount: fields.premium_amount,
            end_date: fields.end_date,
            status: fields.status,
            extra,
        }
    }
}

/// Returns the value only when it carries something other than whitespace.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.trim().is_empty())
}

fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(text_value))
}

fn text_value(value: Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn optional_premium<'de, D>(deserializer: D) -> Result<Option<PremiumAmount>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(number)) => Some(PremiumAmount::Number(number)),
        Some(Value::String(text)) => Some(PremiumAmount::Text(text)),
        _ => None,
    })
}

/// Lifecycle state shown next to a policy.
///
/// `Paid` and `Reported` only ever come from the backend's own status field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PolicyStatus {
    Due,
    Overdue,
    Paid,
    Reported(String),
}

impl PolicyStatus {
    /// Maps an authoritative status string, keeping unknown text verbatim.
    pub fn from_reported(value: &str) -> Self {
        match value {
            "Due" => Self::Due,
            "Overdue" => Self::Overdue,
            "Paid" => Self::Paid,
            other => Self::Reported(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Due => "Due",
            Self::Overdue => "Overdue",
            Self::Paid => "Paid",
            Self::Reported(text) => text,
        }
    }
}

impl fmt::Display for PolicyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for PolicyStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.label())
    }
}

/// Keys `NormalizedPolicy` derives; a backend field with one of these names is
/// shadowed by the derived value.
pub(crate) const DERIVED_KEYS: &[&str] = &[
    "parsedEndDate",
    "resolvedStatus",
    "isOverdue",
    "company",
    "formattedPremium",
    "formattedEndDate",
];

/// A raw record annotated with everything the screens display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedPolicy {
    #[serde(flatten)]
    pub raw: RawPolicyRecord,
    pub parsed_end_date: Option<NaiveDate>,
    pub resolved_status: PolicyStatus,
    pub is_overdue: bool,
    pub company: String,
    pub formatted_premium: String,
    pub formatted_end_date: String,
    #[serde(skip)]
    pub premium_value: Option<u64>,
}

impl NormalizedPolicy {
    pub fn policy_type(&self) -> Option<&str> {
        self.raw.policy_type.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn raw_record_accepts_backend_aliases_and_keeps_unknown_fields() {
        let record: RawPolicyRecord = serde_json::from_value(json!({
            "_id": "64f1",
            "customerId": 42,
            "policyNumber": "P-001",
            "productName": "HDFC Life Click 2 Protect",
            "policyType": "Life",
            "premiumAmount": "₹12,500",
            "endDate": "10/05/2024",
            "insurerName": "HDFC Life",
            "agentCode": "AG-9"
        }))
        .expect("record decodes");

        assert_eq!(record.id.as_deref(), Some("64f1"));
        assert_eq!(record.customer_id.as_deref(), Some("42"));
        assert_eq!(record.insurer.as_deref(), Some("HDFC Life"));
        assert_eq!(
            record.premium_amount,
            Some(PremiumAmount::Text("₹12,500".to_string()))
        );
        assert_eq!(record.extra.get("agentCode"), Some(&json!("AG-9")));
    }

    #[test]
    fn canonical_keys_win_over_their_aliases() {
        let record: RawPolicyRecord = serde_json::from_value(json!({
            "_id": "665a01",
            "id": "665a02",
            "insurer": "LIC",
            "insurerName": "Life Insurance Corporation",
            "company": "LIC",
            "companyName": "LIC of India"
        }))
        .expect("record with duplicated keys decodes");

        assert_eq!(record.id.as_deref(), Some("665a02"));
        assert_eq!(record.insurer.as_deref(), Some("LIC"));
        assert_eq!(record.company.as_deref(), Some("LIC"));
        assert!(record.extra.is_empty());

        let alias_only: RawPolicyRecord =
            serde_json::from_value(json!({ "companyName": "Star Health", "insurerName": "" }))
                .expect("aliases decode");
        assert_eq!(alias_only.company.as_deref(), Some("Star Health"));
        assert_eq!(alias_only.insurer.as_deref(), Some(""));
    }

    #[test]
    fn serialized_record_emits_each_key_once() {
        let record: RawPolicyRecord =
            serde_json::from_value(json!({ "company": "LIC", "companyName": "LIC" }))
                .expect("record decodes");
        let text = serde_json::to_string(&record).expect("serializes");
        assert_eq!(text, r#"{"companyName":"LIC"}"#);
    }

    #[test]
    fn premium_keeps_numbers_as_numbers() {
        let record: RawPolicyRecord =
            serde_json::from_value(json!({ "premiumAmount": 1500, "status": null }))
                .expect("record decodes");
        assert_eq!(record.premium_amount, Some(PremiumAmount::from(1500)));
        assert!(record.status.is_none());
    }

    #[test]
    fn reported_status_is_case_preserving() {
        assert_eq!(PolicyStatus::from_reported("Paid"), PolicyStatus::Paid);
        assert_eq!(
            PolicyStatus::from_reported("paid"),
            PolicyStatus::Reported("paid".to_string())
        );
        assert_eq!(PolicyStatus::from_reported("Lapsed").label(), "Lapsed");
    }

    #[test]
    fn non_blank_rejects_whitespace() {
        assert_eq!(non_blank(Some("  ")), None);
        assert_eq!(non_blank(Some(" LIC ")), Some(" LIC "));
        assert_eq!(non_blank(None), None);
    }
}

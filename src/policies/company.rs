use super::domain::{non_blank, RawPolicyRecord};

// Checked in order; the first keyword found anywhere in the product name wins.
const INSURER_KEYWORDS: &[(&str, &str)] = &[
    ("TATA", "TATA"),
    ("HDFC", "HDFC"),
    ("LIC", "LIC"),
    ("ICICI", "ICICI"),
    ("MAX", "MAX"),
    ("STAR", "STAR"),
    ("BAJAJ", "BAJAJ"),
];

/// Infers the insurer behind a record, or `None` when nothing identifies it.
pub fn classify_company(record: &RawPolicyRecord) -> Option<String> {
    if let Some(insurer) = non_blank(record.insurer.as_deref()) {
        return Some(insurer.to_string());
    }

    if let Some(company) = non_blank(record.company.as_deref()) {
        return Some(company.to_string());
    }

    record
        .product_name
        .as_deref()
        .and_then(keyword_match)
        .map(str::to_string)
}

/// Like [`classify_company`] but substitutes the screen's fallback label.
pub fn company_or(record: &RawPolicyRecord, fallback: &str) -> String {
    classify_company(record).unwrap_or_else(|| fallback.to_string())
}

fn keyword_match(product_name: &str) -> Option<&'static str> {
    let haystack = product_name.to_ascii_uppercase();
    INSURER_KEYWORDS
        .iter()
        .find(|(keyword, _)| haystack.contains(keyword))
        .map(|(_, label)| *label)
}

use super::amount::{format_compact, format_grouped};
use super::domain::{NormalizedPolicy, PolicyStatus};
use super::facets::extract_facets;
use super::pipeline::{apply, FilterSelection, SortKey};
use crate::config::DisplayConfig;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The client screens that consume the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyScreen {
    #[default]
    MyPolicies,
    DuePayments,
    Dashboard,
}

impl PolicyScreen {
    pub const fn label(self) -> &'static str {
        match self {
            Self::MyPolicies => "My Policies",
            Self::DuePayments => "Due Payments",
            Self::Dashboard => "Dashboard",
        }
    }

    pub fn company_fallback(self, display: &DisplayConfig) -> &str {
        match self {
            Self::DuePayments => &display.payments_company_fallback,
            Self::MyPolicies | Self::Dashboard => &display.dashboard_company_fallback,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DuePaymentsView {
    pub due_count: usize,
    pub overdue_count: usize,
    pub outstanding_total: String,
    pub outstanding_compact: String,
    pub policies: Vec<NormalizedPolicy>,
}

/// Builds the due payments list: everything not reported as paid, filtered and sorted.
pub fn due_payments(
    records: &[NormalizedPolicy],
    selection: &FilterSelection,
    sort: SortKey,
) -> DuePaymentsView {
    let unpaid: Vec<NormalizedPolicy> = records
        .iter()
        .filter(|policy| policy.resolved_status != PolicyStatus::Paid)
        .cloned()
        .collect();
    let policies = apply(&unpaid, selection, sort);

    let overdue_count = policies.iter().filter(|policy| policy.is_overdue).count();
    let due_count = policies
        .iter()
        .filter(|policy| policy.resolved_status == PolicyStatus::Due)
        .count();
    let outstanding: u64 = policies
        .iter()
        .map(|policy| policy.premium_value.unwrap_or(0))
        .fold(0u64, u64::saturating_add);

    DuePaymentsView {
        due_count,
        overdue_count,
        outstanding_total: format_grouped(Some(outstanding)),
        outstanding_compact: format_compact(Some(outstanding)),
        policies,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CompanyCount {
    pub company: String,
    pub policies: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub today: NaiveDate,
    pub total_policies: usize,
    pub due_count: usize,
    pub overdue_count: usize,
    pub paid_count: usize,
    pub other_status_count: usize,
    pub total_premium: String,
    pub total_premium_compact: String,
    pub companies: Vec<CompanyCount>,
    pub upcoming: Vec<NormalizedPolicy>,
}

pub fn dashboard_summary(
    records: &[NormalizedPolicy],
    today: NaiveDate,
    upcoming_limit: usize,
) -> DashboardSummary {
    let mut due_count = 0;
    let mut overdue_count = 0;
    let mut paid_count = 0;
    let mut other_status_count = 0;
    let mut total_premium = 0u64;
    let mut per_company: HashMap<&str, usize> = HashMap::new();

    for policy in records {
        match policy.resolved_status {
            PolicyStatus::Due => due_count += 1,
            PolicyStatus::Overdue => overdue_count += 1,
            PolicyStatus::Paid => paid_count += 1,
            PolicyStatus::Reported(_) => other_status_count += 1,
        }
        total_premium = total_premium.saturating_add(policy.premium_value.unwrap_or(0));
        *per_company.entry(policy.company.as_str()).or_default() += 1;
    }

    let companies = extract_facets(records)
        .companies
        .into_iter()
        .skip(1)
        .map(|company| {
            let policies = per_company.get(company.as_str()).copied().unwrap_or(0);
            CompanyCount { company, policies }
        })
        .collect();

    let mut upcoming: Vec<NormalizedPolicy> = records
        .iter()
        .filter(|policy| policy.resolved_status != PolicyStatus::Paid)
        .filter(|policy| policy.parsed_end_date.is_some_and(|end| end >= today))
        .cloned()
        .collect();
    upcoming.sort_by_key(|policy| policy.parsed_end_date);
    upcoming.truncate(upcoming_limit);

    DashboardSummary {
        today,
        total_policies: records.len(),
        due_count,
        overdue_count,
        paid_count,
        other_status_count,
        total_premium: format_grouped(Some(total_premium)),
        total_premium_compact: format_compact(Some(total_premium)),
        companies,
        upcoming,
    }
}

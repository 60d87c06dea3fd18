use crate::error::AppError;
use crate::policies::{
    DashboardSummary, DuePaymentsView, FacetVocabulary, FilterSelection, NormalizedPolicy,
    SortKey,
};
use chrono::NaiveDate;
use clap::ValueEnum;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Debug, Serialize)]
struct PolicyRow<'a> {
    policy_number: &'a str,
    product_name: &'a str,
    company: &'a str,
    policy_type: &'a str,
    premium: &'a str,
    end_date: &'a str,
    status: &'a str,
    overdue: bool,
}

impl<'a> PolicyRow<'a> {
    fn from_policy(policy: &'a NormalizedPolicy) -> Self {
        Self {
            policy_number: policy.raw.policy_number.as_deref().unwrap_or("-"),
            product_name: policy.raw.product_name.as_deref().unwrap_or("-"),
            company: &policy.company,
            policy_type: policy.policy_type().unwrap_or("-"),
            premium: &policy.formatted_premium,
            end_date: &policy.formatted_end_date,
            status: policy.resolved_status.label(),
            overdue: policy.is_overdue,
        }
    }
}

pub(crate) fn render_policies<W: Write>(
    out: &mut W,
    policies: &[NormalizedPolicy],
    selection: &FilterSelection,
    sort: SortKey,
    format: OutputFormat,
    today: NaiveDate,
) -> Result<(), AppError> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, policies)?;
            writeln!(out)?;
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(&mut *out);
            for policy in policies {
                writer.serialize(PolicyRow::from_policy(policy))?;
            }
            writer.flush()?;
        }
        OutputFormat::Table => {
            let scope = if selection.is_unfiltered() {
                "all"
            } else {
                "filtered"
            };
            writeln!(
                out,
                "Policies ({} shown, {scope}, {}, evaluated {today})",
                policies.len(),
                sort.label()
            )?;
            write_policy_lines(out, policies)?;
        }
    }
    Ok(())
}

pub(crate) fn render_facets<W: Write>(
    out: &mut W,
    facets: &FacetVocabulary,
) -> Result<(), AppError> {
    writeln!(out, "Companies")?;
    for company in &facets.companies {
        writeln!(out, "- {company}")?;
    }
    writeln!(out, "\nPolicy types")?;
    for policy_type in &facets.types {
        writeln!(out, "- {policy_type}")?;
    }
    Ok(())
}

pub(crate) fn render_due_payments<W: Write>(
    out: &mut W,
    view: &DuePaymentsView,
    today: NaiveDate,
) -> Result<(), AppError> {
    writeln!(out, "Due payments (evaluated {today})")?;
    writeln!(
        out,
        "{} due, {} overdue, outstanding {} ({})",
        view.due_count, view.overdue_count, view.outstanding_total, view.outstanding_compact
    )?;
    if view.policies.is_empty() {
        writeln!(out, "\nNothing to pay")?;
        return Ok(());
    }
    writeln!(out)?;
    write_policy_lines(out, &view.policies)
}

pub(crate) fn render_dashboard<W: Write>(
    out: &mut W,
    summary: &DashboardSummary,
) -> Result<(), AppError> {
    writeln!(out, "Dashboard (evaluated {})", summary.today)?;
    writeln!(
        out,
        "{} policies | {} due | {} overdue | {} paid | {} other",
        summary.total_policies,
        summary.due_count,
        summary.overdue_count,
        summary.paid_count,
        summary.other_status_count
    )?;
    writeln!(
        out,
        "Total premium {} ({})",
        summary.total_premium, summary.total_premium_compact
    )?;

    writeln!(out, "\nCompanies")?;
    for entry in &summary.companies {
        writeln!(out, "- {}: {}", entry.company, entry.policies)?;
    }

    if summary.upcoming.is_empty() {
        writeln!(out, "\nUpcoming payments: none")?;
    } else {
        writeln!(out, "\nUpcoming payments")?;
        write_policy_lines(out, &summary.upcoming)?;
    }
    Ok(())
}

fn write_policy_lines<W: Write>(
    out: &mut W,
    policies: &[NormalizedPolicy],
) -> Result<(), AppError> {
    for policy in policies {
        let row = PolicyRow::from_policy(policy);
        writeln!(
            out,
            "- {} | {} | {} | {} | {} | due {} | {}",
            row.policy_number,
            row.product_name,
            row.company,
            row.policy_type,
            row.premium,
            row.end_date,
            row.status
        )?;
    }
    Ok(())
}

//! Policy normalization and filtering shared by the My Policies, Due Payments and
//! Dashboard screens.
//!
//! Records flow through [`PolicyNormalizer`] (dates, status, company, amounts), then
//! [`extract_facets`] builds the filter options and [`apply`] produces the ordered
//! list to display. Only [`import`] touches the filesystem, and nothing reads the clock.

pub mod amount;
pub mod company;
pub mod dates;
pub mod domain;
pub mod facets;
pub mod import;
pub mod normalizer;
pub mod pipeline;
pub mod session;
pub mod status;
pub mod views;

pub use amount::{format_compact, format_compact_amount, format_grouped, premium_magnitude};
pub use company::{classify_company, company_or};
pub use dates::{format_display_date, parse_date};
pub use domain::{NormalizedPolicy, PolicyStatus, PremiumAmount, RawPolicyRecord};
pub use facets::{extract_facets, FacetVocabulary, ALL_COMPANIES, ALL_TYPES};
pub use import::{ImportFormat, PolicyImportError, PolicyImporter};
pub use normalizer::PolicyNormalizer;
pub use pipeline::{apply, FacetChoice, FilterSelection, SortKey, UnknownSortKey};
pub use session::{BrowserPhase, FetchTicket, PolicyBrowser};
pub use status::{resolve_status, resolve_status_at, StatusResolution};
pub use views::{
    dashboard_summary, due_payments, CompanyCount, DashboardSummary, DuePaymentsView,
    PolicyScreen,
};

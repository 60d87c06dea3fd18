use super::domain::{NormalizedPolicy, RawPolicyRecord};
use super::facets::{extract_facets, FacetVocabulary};
use super::normalizer::PolicyNormalizer;
use super::pipeline::{apply, FilterSelection, SortKey};
use chrono::NaiveDate;
use tracing::debug;

/// Sequence number handed out per fetch; only the newest one may complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserPhase {
    Loading,
    Loaded,
    Filtered,
}

/// Per-screen state: the loaded records, their facets and the current view.
///
/// Every change to records, selection or sort re-runs the whole pipeline.
#[derive(Debug)]
pub struct PolicyBrowser {
    company_fallback: String,
    phase: BrowserPhase,
    latest_ticket: u64,
    records: Vec<NormalizedPolicy>,
    facets: FacetVocabulary,
    selection: FilterSelection,
    sort: SortKey,
    view: Vec<NormalizedPolicy>,
}

impl PolicyBrowser {
    pub fn new(company_fallback: impl Into<String>) -> Self {
        Self {
            company_fallback: company_fallback.into(),
            phase: BrowserPhase::Loading,
            latest_ticket: 0,
            records: Vec::new(),
            facets: FacetVocabulary::default(),
            selection: FilterSelection::default(),
            sort: SortKey::default(),
            view: Vec::new(),
        }
    }

    /// Starts a fetch (initial mount or pull-to-refresh).
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.latest_ticket += 1;
        self.phase = BrowserPhase::Loading;
        FetchTicket(self.latest_ticket)
    }

    /// Installs a fetched record set unless a newer fetch has started since.
    ///
    /// Returns `false` when the result was superseded and discarded.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        records: Vec<RawPolicyRecord>,
        today: NaiveDate,
    ) -> bool {
        if ticket.0 != self.latest_ticket {
            debug!(
                ticket = ticket.0,
                latest = self.latest_ticket,
                "discarding superseded fetch"
            );
            return false;
        }

        let normalizer = PolicyNormalizer::new(today, self.company_fallback.as_str());
        self.records = normalizer.normalize_all(records);
        self.facets = extract_facets(&self.records);
        self.selection.retain_available(&self.facets);
        self.phase = BrowserPhase::Loaded;
        self.recompute();
        true
    }

    pub fn set_selection(&mut self, mut selection: FilterSelection) {
        selection.retain_available(&self.facets);
        self.selection = selection;
        self.mark_filtered();
    }

    pub fn set_sort(&mut self, sort: SortKey) {
        self.sort = sort;
        self.mark_filtered();
    }

    pub fn phase(&self) -> BrowserPhase {
        self.phase
    }

    pub fn facets(&self) -> &FacetVocabulary {
        &self.facets
    }

    pub fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    pub fn sort(&self) -> SortKey {
        self.sort
    }

    pub fn records(&self) -> &[NormalizedPolicy] {
        &self.records
    }

    pub fn view(&self) -> &[NormalizedPolicy] {
        &self.view
    }

    fn mark_filtered(&mut self) {
        if self.phase != BrowserPhase::Loading {
            self.phase = BrowserPhase::Filtered;
        }
        self.recompute();
    }

    fn recompute(&mut self) {
        self.view = apply(&self.records, &self.selection, self.sort);
    }
}

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::domain::clock::Clock;
use crate::domain::listing::{PageSize, total_pages};
use crate::domain::models::Customer;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("HTTP {status} {reason}")]
    Status { status: u16, reason: String },
    #[error("invalid response body: {0}")]
    Decode(String),
    #[error("request aborted")]
    Aborted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: PageSize,
    pub search: String,
    pub sort: String,
    pub start_date: String,
    pub end_date: String,
}

impl PageRequest {
    /// Cached responses are keyed by the full parameter tuple, so any filter
    /// change addresses a different cache slot.
    pub fn cache_key(&self) -> String {
        format!(
            "{}_{}_{}_{}_{}_{}",
            self.page,
            self.limit.as_query_value(),
            self.search,
            self.sort,
            self.start_date,
            self.end_date
        )
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.as_query_value()),
        ];
        if !self.search.is_empty() {
            pairs.push(("search", self.search.clone()));
        }
        if !self.sort.is_empty() {
            pairs.push(("sort", self.sort.clone()));
        }
        if !self.start_date.is_empty() {
            pairs.push(("startDate", self.start_date.clone()));
        }
        if !self.end_date.is_empty() {
            pairs.push(("endDate", self.end_date.clone()));
        }
        pairs
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CustomerPage {
    pub data: Vec<Customer>,
    pub total: u64,
}

pub trait CustomerBackend {
    fn fetch_page(&self, request: &PageRequest) -> Result<CustomerPage, BackendError>;
}

pub struct HttpCustomerBackend {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpCustomerBackend {
    pub fn new(base_url: &str) -> Result<Self, BackendError> {
        let client = reqwest::blocking::Client::builder()
            .build()
            .map_err(|error| BackendError::Transport(error.to_string()))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

impl CustomerBackend for HttpCustomerBackend {
    fn fetch_page(&self, request: &PageRequest) -> Result<CustomerPage, BackendError> {
        let url = format!("{}/api/customers", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&request.query_pairs())
            .send()
            .map_err(|error| BackendError::Transport(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status {
                status: status.as_u16(),
                reason: status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string(),
            });
        }

        response
            .json::<CustomerPage>()
            .map_err(|error| BackendError::Decode(error.to_string()))
    }
}

/// Handle for one issued request. Completing a ticket whose generation has
/// been passed over leaves the model untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    pub request: PageRequest,
}

#[derive(Debug, PartialEq)]
pub enum FetchOutcome {
    Applied,
    Superseded,
    RetryLastPage(FetchTicket),
    Failed,
}

/// View model for the live customers table. Every query-state change
/// invalidates the in-flight request; responses are cached per parameter
/// tuple; search input settles through a debounce window before a request
/// is issued.
pub struct CustomersTableModel<C: Clock> {
    clock: C,
    debounce: Duration,
    cache: HashMap<String, CustomerPage>,
    generation: u64,
    page: u32,
    page_size: PageSize,
    sort: String,
    start_date: String,
    end_date: String,
    applied_search: String,
    pending_search: Option<(String, DateTime<Utc>)>,
    pub rows: Vec<Customer>,
    pub total: u64,
    pub error: Option<String>,
}

impl<C: Clock> CustomersTableModel<C> {
    pub fn new(clock: C, debounce_ms: u64) -> Self {
        Self {
            clock,
            debounce: Duration::milliseconds(debounce_ms as i64),
            cache: HashMap::new(),
            generation: 0,
            page: 1,
            page_size: PageSize::Limited(10),
            sort: "Newest First".to_string(),
            start_date: String::new(),
            end_date: String::new(),
            applied_search: String::new(),
            pending_search: None,
            rows: Vec::new(),
            total: 0,
            error: None,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    fn current_request(&self) -> PageRequest {
        PageRequest {
            page: self.page,
            limit: self.page_size,
            search: self.applied_search.clone(),
            sort: self.sort.clone(),
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
        }
    }

    fn begin(&mut self) -> Option<FetchTicket> {
        self.generation += 1;
        let request = self.current_request();
        if let Some(cached) = self.cache.get(&request.cache_key()) {
            let cached = cached.clone();
            self.apply_page(&request, &cached);
            return None;
        }
        Some(FetchTicket {
            generation: self.generation,
            request,
        })
    }

    pub fn refresh(&mut self) -> Option<FetchTicket> {
        self.begin()
    }

    pub fn set_page(&mut self, page: u32) -> Option<FetchTicket> {
        self.page = page.max(1);
        self.begin()
    }

    pub fn set_page_size(&mut self, size: PageSize) -> Option<FetchTicket> {
        self.page_size = size;
        self.page = 1;
        self.begin()
    }

    pub fn set_sort(&mut self, label: &str) -> Option<FetchTicket> {
        self.sort = label.to_string();
        self.begin()
    }

    pub fn set_date_window(&mut self, start: &str, end: &str) -> Option<FetchTicket> {
        self.start_date = start.to_string();
        self.end_date = end.to_string();
        self.begin()
    }

    /// Records a keystroke; the search is applied once `poll_debounce` sees
    /// the debounce window elapse with no newer keystroke.
    pub fn note_search_input(&mut self, term: &str) {
        let now = self.clock.now();
        self.pending_search = Some((term.to_string(), now));
    }

    pub fn poll_debounce(&mut self) -> Option<FetchTicket> {
        let (term, at) = self.pending_search.clone()?;
        let now = self.clock.now();
        if now - at < self.debounce {
            return None;
        }
        self.pending_search = None;
        if term == self.applied_search {
            return None;
        }
        self.applied_search = term;
        self.begin()
    }

    fn apply_page(&mut self, request: &PageRequest, page: &CustomerPage) {
        self.rows = page.data.clone();
        self.total = page.total;
        self.page = request.page;
        self.error = None;
    }

    pub fn complete(
        &mut self,
        ticket: &FetchTicket,
        result: Result<CustomerPage, BackendError>,
    ) -> FetchOutcome {
        if ticket.generation != self.generation {
            return FetchOutcome::Superseded;
        }

        match result {
            Err(BackendError::Aborted) => FetchOutcome::Superseded,
            Err(error) => {
                self.error = Some(error.to_string());
                FetchOutcome::Failed
            }
            Ok(page) => {
                self.cache.insert(ticket.request.cache_key(), page.clone());

                if let PageSize::Limited(size) = ticket.request.limit {
                    let last_page = total_pages(page.total as usize, size);
                    if page.data.is_empty() && page.total > 0 && ticket.request.page > last_page {
                        self.page = last_page;
                        self.generation += 1;
                        let mut request = ticket.request.clone();
                        request.page = last_page;
                        if let Some(cached) = self.cache.get(&request.cache_key()) {
                            let cached = cached.clone();
                            self.apply_page(&request, &cached);
                            return FetchOutcome::Applied;
                        }
                        return FetchOutcome::RetryLastPage(FetchTicket {
                            generation: self.generation,
                            request,
                        });
                    }
                }

                self.apply_page(&ticket.request, &page);
                FetchOutcome::Applied
            }
        }
    }

    /// Drives one ticket to completion against a backend, following at most
    /// one corrective last-page fetch.
    pub fn run_fetch<B: CustomerBackend>(&mut self, backend: &B, ticket: FetchTicket) -> FetchOutcome {
        let result = backend.fetch_page(&ticket.request);
        match self.complete(&ticket, result) {
            FetchOutcome::RetryLastPage(next) => {
                let result = backend.fetch_page(&next.request);
                self.complete(&next, result)
            }
            outcome => outcome,
        }
    }
}

use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::models::{Customer, StationSubmission, Trip, TripCheckin};

/// Row-level configuration for the shared table pipeline: which fields are
/// searchable, which field names the row, and which date orders it.
pub trait ListRow {
    fn search_text(&self) -> Vec<String>;
    fn sort_name(&self) -> &str;
    fn event_date(&self) -> Option<DateTime<Utc>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    NameAsc,
    NameDesc,
    NewestFirst,
    OldestFirst,
    #[default]
    Unsorted,
}

impl SortOrder {
    /// Maps the dashboard's sort labels. Unknown labels sort nothing, keeping
    /// the original order.
    pub fn parse(label: &str) -> Self {
        match label.trim() {
            "A - Z" | "Ascending (Low High)" => SortOrder::NameAsc,
            "Z - A" | "Descending (High Low)" => SortOrder::NameDesc,
            "Newest First" => SortOrder::NewestFirst,
            "Oldest First" => SortOrder::OldestFirst,
            _ => SortOrder::Unsorted,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSize {
    Limited(u32),
    All,
}

impl PageSize {
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("all") {
            return Some(PageSize::All);
        }
        trimmed
            .parse::<u32>()
            .ok()
            .filter(|size| *size > 0)
            .map(PageSize::Limited)
    }

    pub fn as_query_value(&self) -> String {
        match self {
            PageSize::Limited(size) => size.to_string(),
            PageSize::All => "all".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateWindow {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateWindow {
    pub fn parse(start: &str, end: &str) -> Result<Self, String> {
        Ok(Self {
            start: parse_bound(start)?,
            end: parse_bound(end)?,
        })
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// The end bound keeps records through the whole end day.
    pub fn contains(&self, date: Option<DateTime<Utc>>) -> bool {
        if self.is_unbounded() {
            return true;
        }
        let Some(date) = date else {
            return false;
        };
        let day = date.date_naive();
        if let Some(start) = self.start
            && day < start
        {
            return false;
        }
        if let Some(end) = self.end
            && day > end
        {
            return false;
        }
        true
    }
}

fn parse_bound(raw: &str) -> Result<Option<NaiveDate>, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| format!("invalid date bound: {trimmed}"))
}

#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub search: String,
    pub window: DateWindow,
    pub sort: SortOrder,
}

/// Discrete dropdown filters treat an empty selection or the `All` sentinel
/// as a no-op.
pub fn matches_choice(selected: &str, actual: &str) -> bool {
    let selected = selected.trim();
    selected.is_empty() || selected.eq_ignore_ascii_case("all") || selected == actual
}

/// Timestamps arrive either as RFC 3339 or as a bare `YYYY-MM-DD` day.
pub fn parse_event_date(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Produces the full filtered and sorted result set. Extra predicates carry
/// the entity-specific dropdown filters.
pub fn filter_and_sort<T>(rows: &[T], query: &ListQuery, extra: &[&dyn Fn(&T) -> bool]) -> Vec<T>
where
    T: ListRow + Clone,
{
    let needle = query.search.trim().to_lowercase();

    let mut matched: Vec<T> = rows
        .iter()
        .filter(|row| {
            let matches_search = needle.is_empty()
                || row
                    .search_text()
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle));
            matches_search
                && query.window.contains(row.event_date())
                && extra.iter().all(|predicate| predicate(row))
        })
        .cloned()
        .collect();

    sort_rows(&mut matched, query.sort);
    matched
}

fn sort_rows<T: ListRow>(rows: &mut [T], order: SortOrder) {
    match order {
        SortOrder::NameAsc => {
            rows.sort_by(|a, b| a.sort_name().to_lowercase().cmp(&b.sort_name().to_lowercase()));
        }
        SortOrder::NameDesc => {
            rows.sort_by(|a, b| b.sort_name().to_lowercase().cmp(&a.sort_name().to_lowercase()));
        }
        SortOrder::NewestFirst => rows.sort_by(|a, b| compare_dates(b, a)),
        SortOrder::OldestFirst => rows.sort_by(|a, b| compare_dates(a, b)),
        SortOrder::Unsorted => {}
    }
}

fn compare_dates<T: ListRow>(a: &T, b: &T) -> std::cmp::Ordering {
    match (a.event_date(), b.event_date()) {
        (Some(a), Some(b)) => a.cmp(&b),
        _ => std::cmp::Ordering::Equal,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageWindow<T> {
    pub rows: Vec<T>,
    pub total: usize,
    pub page: u32,
    pub total_pages: u32,
}

/// Clamps the requested page into `[1, total_pages]` and slices the window.
pub fn paginate<T: Clone>(rows: &[T], page: u32, size: PageSize) -> PageWindow<T> {
    let total = rows.len();
    match size {
        PageSize::All => PageWindow {
            rows: rows.to_vec(),
            total,
            page: 1,
            total_pages: 1,
        },
        PageSize::Limited(size) => {
            let total_pages = total_pages(total, size);
            let page = page.clamp(1, total_pages);
            let start = ((page - 1) * size) as usize;
            let end = (start + size as usize).min(total);
            PageWindow {
                rows: rows[start.min(total)..end].to_vec(),
                total,
                page,
                total_pages,
            }
        }
    }
}

pub fn total_pages(total: usize, size: u32) -> u32 {
    let size = size.max(1) as usize;
    (total.div_ceil(size)).max(1) as u32
}

impl ListRow for Customer {
    fn search_text(&self) -> Vec<String> {
        let mut fields = vec![
            self.first_name.clone(),
            self.last_name.clone(),
            self.email.clone(),
            self.phone.clone(),
        ];
        for vehicle in &self.vehicles {
            fields.push(vehicle.manufacturer.clone());
            fields.push(vehicle.vehicle_model.clone());
        }
        fields
    }

    fn sort_name(&self) -> &str {
        &self.first_name
    }

    fn event_date(&self) -> Option<DateTime<Utc>> {
        parse_event_date(&self.customer_reg_date)
    }
}

impl ListRow for StationSubmission {
    fn search_text(&self) -> Vec<String> {
        vec![
            self.station_name.clone(),
            self.user_name.clone(),
            self.network_name.clone(),
        ]
    }

    fn sort_name(&self) -> &str {
        &self.station_name
    }

    fn event_date(&self) -> Option<DateTime<Utc>> {
        parse_event_date(&self.submission_date)
    }
}

impl ListRow for Trip {
    fn search_text(&self) -> Vec<String> {
        let mut fields = vec![
            self.first_name.clone(),
            self.last_name.clone(),
            self.source.clone(),
            self.destination.clone(),
            self.trip_status.to_string(),
        ];
        fields.extend(self.via_stops.iter().cloned());
        fields
    }

    fn sort_name(&self) -> &str {
        &self.first_name
    }

    fn event_date(&self) -> Option<DateTime<Utc>> {
        parse_event_date(&self.date_time)
    }
}

impl ListRow for TripCheckin {
    fn search_text(&self) -> Vec<String> {
        vec![
            self.first_name.clone(),
            self.last_name.clone(),
            self.source.address.clone(),
            self.destination.address.clone(),
        ]
    }

    fn sort_name(&self) -> &str {
        &self.first_name
    }

    fn event_date(&self) -> Option<DateTime<Utc>> {
        parse_event_date(&self.date_time)
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::models::{Trip, TripStatus, YesNo};

    use super::{
        DateWindow, ListQuery, PageSize, SortOrder, filter_and_sort, matches_choice, paginate,
        parse_event_date,
    };

    fn sample_trip(id: &str, first_name: &str, destination: &str, date_time: &str) -> Trip {
        Trip {
            id: id.to_string(),
            date_time: date_time.to_string(),
            first_name: first_name.to_string(),
            last_name: "Sharma".to_string(),
            source: "Mumbai".to_string(),
            destination: destination.to_string(),
            via_stops: Vec::new(),
            navigation: YesNo::Yes,
            check_in: YesNo::No,
            trip_status: TripStatus::Completed,
        }
    }

    fn fleet() -> Vec<Trip> {
        vec![
            sample_trip("T-1", "Rohan", "Tata Power Hub, Pune", "2024-01-01"),
            sample_trip("T-2", "Asha", "Lonavala", "2024-06-01"),
            sample_trip("T-3", "Meera", "Statiq Plaza, Nashik", "2024-03-15"),
        ]
    }

    #[test]
    fn filtered_set_is_a_subset_of_the_source() {
        let rows = fleet();
        let query = ListQuery {
            search: "a".to_string(),
            ..ListQuery::default()
        };
        let filtered = filter_and_sort(&rows, &query, &[]);
        assert!(filtered.len() <= rows.len());
        for row in &filtered {
            assert!(rows.iter().any(|source| source.id == row.id));
        }
    }

    #[test]
    fn search_is_case_insensitive_substring_match() {
        let rows = fleet();
        let query = ListQuery {
            search: "tata".to_string(),
            ..ListQuery::default()
        };
        let filtered = filter_and_sort(&rows, &query, &[]);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].destination, "Tata Power Hub, Pune");
    }

    #[test]
    fn newest_first_orders_recent_dates_ahead() {
        let rows = vec![
            sample_trip("T-1", "Rohan", "Pune", "2024-01-01"),
            sample_trip("T-2", "Asha", "Nashik", "2024-06-01"),
        ];
        let query = ListQuery {
            sort: SortOrder::NewestFirst,
            ..ListQuery::default()
        };
        let sorted = filter_and_sort(&rows, &query, &[]);
        assert_eq!(sorted[0].date_time, "2024-06-01");
        assert_eq!(sorted[1].date_time, "2024-01-01");
    }

    #[test]
    fn unknown_sort_label_keeps_original_order() {
        assert_eq!(SortOrder::parse("Rating"), SortOrder::Unsorted);
        let rows = fleet();
        let query = ListQuery::default();
        let sorted = filter_and_sort(&rows, &query, &[]);
        let ids: Vec<&str> = sorted.iter().map(|trip| trip.id.as_str()).collect();
        assert_eq!(ids, vec!["T-1", "T-2", "T-3"]);
    }

    #[test]
    fn sort_labels_map_to_both_naming_schemes() {
        assert_eq!(SortOrder::parse("A - Z"), SortOrder::NameAsc);
        assert_eq!(SortOrder::parse("Ascending (Low High)"), SortOrder::NameAsc);
        assert_eq!(SortOrder::parse("Z - A"), SortOrder::NameDesc);
        assert_eq!(SortOrder::parse("Newest First"), SortOrder::NewestFirst);
        assert_eq!(SortOrder::parse("Oldest First"), SortOrder::OldestFirst);
    }

    #[test]
    fn date_window_end_bound_is_inclusive() {
        let window = DateWindow::parse("2024-01-01", "2024-06-01").expect("bounds should parse");
        assert!(window.contains(parse_event_date("2024-06-01T23:50:00.000Z")));
        assert!(!window.contains(parse_event_date("2024-06-02T00:10:00.000Z")));
        assert!(!window.contains(None));
    }

    #[test]
    fn invalid_date_bound_is_rejected() {
        assert!(DateWindow::parse("garbage", "").is_err());
    }

    #[test]
    fn discrete_filter_treats_all_as_no_op() {
        assert!(matches_choice("All", "Pending"));
        assert!(matches_choice("", "Pending"));
        assert!(matches_choice("Pending", "Pending"));
        assert!(!matches_choice("Approved", "Pending"));
    }

    #[test]
    fn page_size_change_reclamps_total_pages() {
        let rows: Vec<u32> = (0..17).collect();

        let first = paginate(&rows, 2, PageSize::Limited(10));
        assert_eq!(first.total_pages, 2);
        assert_eq!(first.rows.len(), 7);

        let wider = paginate(&rows, 2, PageSize::Limited(20));
        assert_eq!(wider.total_pages, 1);
        assert_eq!(wider.page, 1);
        assert_eq!(wider.rows.len(), 17);
    }

    #[test]
    fn page_beyond_range_clamps_to_last_page() {
        let rows: Vec<u32> = (0..17).collect();
        let window = paginate(&rows, 9, PageSize::Limited(10));
        assert_eq!(window.page, 2);
        assert_eq!(window.rows, (10..17).collect::<Vec<u32>>());
    }

    #[test]
    fn page_size_all_returns_a_single_page() {
        let rows: Vec<u32> = (0..17).collect();
        let window = paginate(&rows, 3, PageSize::All);
        assert_eq!(window.page, 1);
        assert_eq!(window.total_pages, 1);
        assert_eq!(window.rows.len(), 17);
    }

    #[test]
    fn empty_collection_still_reports_one_page() {
        let rows: Vec<u32> = Vec::new();
        let window = paginate(&rows, 1, PageSize::Limited(10));
        assert_eq!(window.total_pages, 1);
        assert!(window.rows.is_empty());
    }

    #[test]
    fn page_size_parses_numbers_and_the_all_sentinel() {
        assert_eq!(PageSize::parse("10"), Some(PageSize::Limited(10)));
        assert_eq!(PageSize::parse("all"), Some(PageSize::All));
        assert_eq!(PageSize::parse("All"), Some(PageSize::All));
        assert_eq!(PageSize::parse("0"), None);
        assert_eq!(PageSize::parse("ten"), None);
    }
}

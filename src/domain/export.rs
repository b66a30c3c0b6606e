use std::collections::HashSet;

use crate::domain::models::{Connector, Customer, StationSubmission, Trip, TripCheckin, Vehicle};
use crate::domain::moderation::displayed_evolts;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    Excel,
}

impl ExportFormat {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "" | "csv" => Some(ExportFormat::Csv),
            "excel" => Some(ExportFormat::Excel),
            _ => None,
        }
    }

    /// The Excel option keeps CSV content and only swaps the extension, as
    /// the dashboard always has.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Excel => "xls",
        }
    }

    pub fn content_type(&self) -> &'static str {
        "text/csv; charset=utf-8"
    }
}

pub fn export_filename(entity: &str, selected: bool, format: ExportFormat) -> String {
    let suffix = if selected { "_selected" } else { "" };
    format!("{entity}_list{suffix}.{}", format.extension())
}

#[derive(Debug, Clone, PartialEq)]
pub struct CsvDocument {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl CsvDocument {
    pub fn new(header: &[&str]) -> Self {
        Self {
            header: header.iter().map(ToString::to_string).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn to_text(&self) -> String {
        let mut lines = Vec::with_capacity(self.rows.len() + 1);
        lines.push(escape_line(&self.header));
        for row in &self.rows {
            lines.push(escape_line(row));
        }
        lines.join("\n")
    }
}

fn escape_line(fields: &[String]) -> String {
    fields
        .iter()
        .map(|field| escape(field))
        .collect::<Vec<String>>()
        .join(",")
}

fn escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Keeps the rows whose identity key is in `ids`; an empty selection keeps
/// everything.
pub fn select_rows<T: Clone>(rows: &[T], ids: &HashSet<String>, key: fn(&T) -> &str) -> Vec<T> {
    if ids.is_empty() {
        return rows.to_vec();
    }
    rows.iter()
        .filter(|row| ids.contains(key(*row)))
        .cloned()
        .collect()
}

const CUSTOMER_HEADER: &[&str] = &[
    "First Name",
    "Last Name",
    "Email",
    "Phone",
    "Customer Reg Date",
    "Vehicle Reg Date",
    "Subscription",
    "Vehicle Type",
    "Manufacturer",
    "Vehicle Model",
    "Vehicle Variant",
    "Device Brand",
    "Device Model",
    "Device Platform",
    "Version",
    "Navigation",
    "Trip",
    "Check In",
];

/// One row per vehicle, repeating the customer's scalar fields on each; a
/// customer without vehicles still contributes a single row.
pub fn customer_rows(customers: &[Customer]) -> CsvDocument {
    let mut document = CsvDocument::new(CUSTOMER_HEADER);
    for customer in customers {
        if customer.vehicles.is_empty() {
            document.push_row(customer_row(customer, None));
        } else {
            for vehicle in &customer.vehicles {
                document.push_row(customer_row(customer, Some(vehicle)));
            }
        }
    }
    document
}

fn customer_row(customer: &Customer, vehicle: Option<&Vehicle>) -> Vec<String> {
    let blank = String::new();
    vec![
        customer.first_name.clone(),
        customer.last_name.clone(),
        customer.email.clone(),
        customer.phone.clone(),
        customer.customer_reg_date.clone(),
        vehicle.map_or(blank.clone(), |v| v.vehicle_reg_date.clone()),
        customer.subscription.clone(),
        vehicle.map_or(blank.clone(), |v| v.vehicle_type.clone()),
        vehicle.map_or(blank.clone(), |v| v.manufacturer.clone()),
        vehicle.map_or(blank.clone(), |v| v.vehicle_model.clone()),
        vehicle.map_or(blank, |v| v.vehicle_variant.clone()),
        customer.device_brand.clone(),
        customer.device_model.clone(),
        customer.device_platform.clone(),
        customer.version.clone(),
        customer.navigation.to_string(),
        customer.trip.to_string(),
        customer.check_in.to_string(),
    ]
}

const SUBMISSION_HEADER: &[&str] = &[
    "ID",
    "Date",
    "Station Type",
    "Customer Name",
    "Phone No",
    "Latitude",
    "Longitude",
    "Network Name",
    "Station Name",
    "Usage Type",
    "Status",
    "EVolts",
    "Connector Name",
    "Connector Count",
    "Connector Type",
    "Power Rating",
    "Tariff",
];

/// One row per connector, repeating the submission's scalar fields on each.
pub fn submission_rows(submissions: &[StationSubmission]) -> CsvDocument {
    let mut document = CsvDocument::new(SUBMISSION_HEADER);
    for submission in submissions {
        if submission.connectors.is_empty() {
            document.push_row(submission_row(submission, None));
        } else {
            for connector in &submission.connectors {
                document.push_row(submission_row(submission, Some(connector)));
            }
        }
    }
    document
}

fn submission_row(submission: &StationSubmission, connector: Option<&Connector>) -> Vec<String> {
    let blank = String::new();
    vec![
        submission.id.clone(),
        submission.submission_date.clone(),
        submission.station_type.clone(),
        submission.user_name.clone(),
        submission.contact_number.clone(),
        submission.latitude.to_string(),
        submission.longitude.to_string(),
        submission.network_name.clone(),
        submission.station_name.clone(),
        submission.usage_type.to_string(),
        submission.status.to_string(),
        submission.credited_e_volts().to_string(),
        connector.map_or(blank.clone(), |c| c.name.clone()),
        connector.map_or(blank.clone(), |c| c.count.to_string()),
        connector.map_or(blank.clone(), |c| c.kind.to_string()),
        connector.map_or(blank.clone(), |c| c.power_rating.clone().unwrap_or_default()),
        connector.map_or(blank, |c| c.tariff.clone().unwrap_or_default()),
    ]
}

const TRIP_HEADER: &[&str] = &[
    "Customer Name",
    "Source",
    "Destination",
    "Date & Time",
    "Navigation",
    "Check - In",
    "Trip Status",
];

pub fn trip_rows(trips: &[Trip]) -> CsvDocument {
    let mut document = CsvDocument::new(TRIP_HEADER);
    for trip in trips {
        document.push_row(vec![
            format!("{} {}", trip.first_name, trip.last_name),
            trip.source.clone(),
            trip.destination.clone(),
            trip.date_time.clone(),
            trip.navigation.to_string(),
            trip.check_in.to_string(),
            trip.trip_status.to_string(),
        ]);
    }
    document
}

const CHECKIN_HEADER: &[&str] = &[
    "ID",
    "Date & Time",
    "User Name",
    "Phone",
    "Source",
    "Destination",
    "Trip Status",
    "Story Status",
    "EVolts",
];

pub fn checkin_rows(checkins: &[TripCheckin]) -> CsvDocument {
    let mut document = CsvDocument::new(CHECKIN_HEADER);
    for checkin in checkins {
        document.push_row(vec![
            checkin.id.clone(),
            checkin.date_time.clone(),
            checkin.full_name(),
            checkin.user_phone.clone().unwrap_or_else(|| "N/A".to_string()),
            checkin.source.address.clone(),
            checkin.destination.address.clone(),
            checkin.trip_status.to_string(),
            checkin.story_status.to_string(),
            displayed_evolts(checkin).to_string(),
        ]);
    }
    document
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use crate::domain::models::{
        Connector, ConnectorKind, Customer, StationSubmission, SubmissionStatus, UsageType,
        Vehicle, YesNo,
    };

    use super::{
        CsvDocument, ExportFormat, customer_rows, export_filename, select_rows, submission_rows,
    };

    fn sample_vehicle(model: &str) -> Vehicle {
        Vehicle {
            vehicle_reg_date: "2023-08-10".to_string(),
            vehicle_type: "4 Wheeler".to_string(),
            manufacturer: "Tata Motors".to_string(),
            vehicle_model: model.to_string(),
            vehicle_variant: "LR".to_string(),
        }
    }

    fn sample_customer(email: &str, vehicles: Vec<Vehicle>) -> Customer {
        Customer {
            first_name: "Asha".to_string(),
            last_name: "Verma".to_string(),
            email: email.to_string(),
            phone: "+91 98200 11001".to_string(),
            customer_reg_date: "2023-07-01".to_string(),
            subscription: "Premium".to_string(),
            device_brand: "Samsung".to_string(),
            device_model: "S23".to_string(),
            device_platform: "Android".to_string(),
            version: "2.4.1".to_string(),
            navigation: YesNo::Yes,
            trip: YesNo::Yes,
            check_in: YesNo::No,
            vehicles,
        }
    }

    #[test]
    fn customers_fan_out_one_row_per_vehicle() {
        let customers = vec![sample_customer(
            "asha@example.com",
            vec![sample_vehicle("Nexon EV"), sample_vehicle("Tiago EV")],
        )];
        let document = customer_rows(&customers);
        assert_eq!(document.row_count(), 2);
        for row in document.rows() {
            assert_eq!(row[2], "asha@example.com");
            assert_eq!(row[6], "Premium");
        }
        assert_eq!(document.rows()[0][9], "Nexon EV");
        assert_eq!(document.rows()[1][9], "Tiago EV");
    }

    #[test]
    fn customer_without_vehicles_still_emits_one_row() {
        let customers = vec![sample_customer("solo@example.com", Vec::new())];
        let document = customer_rows(&customers);
        assert_eq!(document.row_count(), 1);
        assert_eq!(document.rows()[0][8], "");
    }

    #[test]
    fn submissions_fan_out_one_row_per_connector() {
        let submission = StationSubmission {
            id: "ST-1001".to_string(),
            submission_date: "2024-03-01".to_string(),
            station_type: "Charging Station".to_string(),
            user_name: "Asha Verma".to_string(),
            contact_number: "+91 98200 11001".to_string(),
            latitude: 19.076,
            longitude: 72.8777,
            network_name: "Tata Power".to_string(),
            station_name: "Phoenix Mall Charging Hub".to_string(),
            station_number: "TPWR-204".to_string(),
            connectors: vec![
                Connector {
                    name: "CCS2".to_string(),
                    count: 2,
                    kind: ConnectorKind::Dc,
                    power_rating: Some("60 kW".to_string()),
                    tariff: Some("₹18/kWh".to_string()),
                },
                Connector {
                    name: "Type 2".to_string(),
                    count: 1,
                    kind: ConnectorKind::Ac,
                    power_rating: None,
                    tariff: None,
                },
            ],
            usage_type: UsageType::Public,
            photos: Vec::new(),
            status: SubmissionStatus::Approved,
            status_reason: None,
            decided_at: Some("2024-03-02T10:00:00.000Z".to_string()),
            e_volts: 3,
        };

        let document = submission_rows(&[submission]);
        assert_eq!(document.row_count(), 2);
        for row in document.rows() {
            assert_eq!(row[0], "ST-1001");
            assert_eq!(row[11], "3");
        }
        assert_eq!(document.rows()[0][12], "CCS2");
        assert_eq!(document.rows()[1][12], "Type 2");
        assert_eq!(document.rows()[1][15], "");
    }

    #[test]
    fn empty_selection_exports_all_filtered_rows() {
        let customers = vec![
            sample_customer("a@example.com", vec![sample_vehicle("Nexon EV")]),
            sample_customer("b@example.com", vec![sample_vehicle("ZS EV")]),
        ];
        let all = select_rows(&customers, &HashSet::new(), |c| &c.email);
        assert_eq!(all.len(), 2);

        let ids: HashSet<String> = ["b@example.com".to_string()].into_iter().collect();
        let picked = select_rows(&customers, &ids, |c| &c.email);
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].email, "b@example.com");
    }

    #[test]
    fn fields_with_commas_and_quotes_are_escaped() {
        let mut document = CsvDocument::new(&["a", "b"]);
        document.push_row(vec![
            "Pune, Maharashtra".to_string(),
            "say \"hello\"".to_string(),
        ]);
        let text = document.to_text();
        assert_eq!(text, "a,b\n\"Pune, Maharashtra\",\"say \"\"hello\"\"\"");
    }

    #[test]
    fn filenames_follow_the_entity_list_pattern() {
        assert_eq!(
            export_filename("customers", false, ExportFormat::Csv),
            "customers_list.csv"
        );
        assert_eq!(
            export_filename("trip_details", true, ExportFormat::Excel),
            "trip_details_list_selected.xls"
        );
    }
}

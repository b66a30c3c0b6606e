use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum YesNo {
    Yes,
    No,
}

impl YesNo {
    pub fn is_yes(self) -> bool {
        self == YesNo::Yes
    }
}

impl fmt::Display for YesNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YesNo::Yes => write!(f, "Yes"),
            YesNo::No => write!(f, "No"),
        }
    }
}

impl FromStr for YesNo {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "Yes" => Ok(YesNo::Yes),
            "No" => Ok(YesNo::No),
            other => Err(format!("unknown yes/no flag: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub vehicle_reg_date: String,
    pub vehicle_type: String,
    pub manufacturer: String,
    pub vehicle_model: String,
    pub vehicle_variant: String,
}

/// Seeded customers always carry at least one vehicle; an empty list is
/// tolerated everywhere it is read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub customer_reg_date: String,
    pub subscription: String,
    pub device_brand: String,
    pub device_model: String,
    pub device_platform: String,
    pub version: String,
    pub navigation: YesNo,
    pub trip: YesNo,
    pub check_in: YesNo,
    pub vehicles: Vec<Vehicle>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectorKind {
    #[serde(rename = "AC")]
    Ac,
    #[serde(rename = "DC")]
    Dc,
}

impl fmt::Display for ConnectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectorKind::Ac => write!(f, "AC"),
            ConnectorKind::Dc => write!(f, "DC"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connector {
    pub name: String,
    pub count: u32,
    #[serde(rename = "type")]
    pub kind: ConnectorKind,
    pub power_rating: Option<String>,
    pub tariff: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UsageType {
    Public,
    Private,
}

impl fmt::Display for UsageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UsageType::Public => write!(f, "Public"),
            UsageType::Private => write!(f, "Private"),
        }
    }
}

impl FromStr for UsageType {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "Public" => Ok(UsageType::Public),
            "Private" => Ok(UsageType::Private),
            other => Err(format!("unknown usage type: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmissionStatus {
    Pending,
    Approved,
    Rejected,
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionStatus::Pending => write!(f, "Pending"),
            SubmissionStatus::Approved => write!(f, "Approved"),
            SubmissionStatus::Rejected => write!(f, "Rejected"),
        }
    }
}

impl FromStr for SubmissionStatus {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "Pending" => Ok(SubmissionStatus::Pending),
            "Approved" => Ok(SubmissionStatus::Approved),
            "Rejected" => Ok(SubmissionStatus::Rejected),
            other => Err(format!("unknown submission status: {other}")),
        }
    }
}

/// A user-proposed charging station awaiting moderation. Coordinates are
/// fixed once submitted; only moderation and descriptive fields may change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationSubmission {
    pub id: String,
    pub submission_date: String,
    pub station_type: String,
    pub user_name: String,
    pub contact_number: String,
    pub latitude: f64,
    pub longitude: f64,
    pub network_name: String,
    pub station_name: String,
    pub station_number: String,
    pub connectors: Vec<Connector>,
    pub usage_type: UsageType,
    pub photos: Vec<String>,
    pub status: SubmissionStatus,
    pub status_reason: Option<String>,
    pub decided_at: Option<String>,
    pub e_volts: i64,
}

impl StationSubmission {
    /// Reward points count as credited only once the submission is approved.
    pub fn credited_e_volts(&self) -> i64 {
        if self.status == SubmissionStatus::Approved {
            self.e_volts
        } else {
            0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TripStatus {
    Planned,
    Ongoing,
    Completed,
    Cancelled,
}

impl fmt::Display for TripStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TripStatus::Planned => write!(f, "Planned"),
            TripStatus::Ongoing => write!(f, "Ongoing"),
            TripStatus::Completed => write!(f, "Completed"),
            TripStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl FromStr for TripStatus {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "Planned" => Ok(TripStatus::Planned),
            "Ongoing" => Ok(TripStatus::Ongoing),
            "Completed" => Ok(TripStatus::Completed),
            "Cancelled" => Ok(TripStatus::Cancelled),
            other => Err(format!("unknown trip status: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: String,
    pub date_time: String,
    pub first_name: String,
    pub last_name: String,
    pub source: String,
    pub destination: String,
    pub via_stops: Vec<String>,
    pub navigation: YesNo,
    pub check_in: YesNo,
    pub trip_status: TripStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvInfo {
    pub brand: String,
    pub model: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoryStatus {
    Pending,
    Approved,
    Rejected,
}

impl fmt::Display for StoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoryStatus::Pending => write!(f, "Pending"),
            StoryStatus::Approved => write!(f, "Approved"),
            StoryStatus::Rejected => write!(f, "Rejected"),
        }
    }
}

impl FromStr for StoryStatus {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "Pending" => Ok(StoryStatus::Pending),
            "Approved" => Ok(StoryStatus::Approved),
            "Rejected" => Ok(StoryStatus::Rejected),
            other => Err(format!("unknown story status: {other}")),
        }
    }
}

/// A check-in for a completed or in-progress journey, optionally carrying a
/// charging record and a narrative story awaiting editorial review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripCheckin {
    pub id: String,
    pub date_time: String,
    pub first_name: String,
    pub last_name: String,
    pub user_phone: Option<String>,
    pub source: GeoPoint,
    pub destination: GeoPoint,
    pub trip_status: TripStatus,
    pub navigation: YesNo,
    pub check_in: YesNo,
    pub rating: Option<f64>,
    pub feedback_provided: bool,
    pub units_charged: Option<f64>,
    pub rate_per_unit: Option<f64>,
    pub amount: Option<f64>,
    pub charging_time: Option<String>,
    pub ev: Option<EvInfo>,
    pub story_status: StoryStatus,
    pub blog_link: Option<String>,
    pub approval_date: Option<String>,
    pub approved_by: Option<String>,
    pub evolts_earned: Option<i64>,
}

impl TripCheckin {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAuditEvent {
    pub created_at: String,
    pub actor: String,
    pub action: String,
    pub entity_kind: String,
    pub entity_id: String,
    pub reason: Option<String>,
    pub details_json: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    pub id: String,
    pub created_at: String,
    pub actor: String,
    pub action: String,
    pub entity_kind: String,
    pub entity_id: String,
    pub reason: Option<String>,
    pub details_json: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::{StationSubmission, SubmissionStatus, UsageType};

    fn sample_submission(status: SubmissionStatus, e_volts: i64) -> StationSubmission {
        StationSubmission {
            id: "ST-1001".to_string(),
            submission_date: "2024-03-01T09:00:00.000Z".to_string(),
            station_type: "Charging Station".to_string(),
            user_name: "Asha Verma".to_string(),
            contact_number: "+91 98200 11001".to_string(),
            latitude: 19.076,
            longitude: 72.8777,
            network_name: "Tata Power".to_string(),
            station_name: "Phoenix Mall Charging Hub".to_string(),
            station_number: "TPWR-204".to_string(),
            connectors: Vec::new(),
            usage_type: UsageType::Public,
            photos: Vec::new(),
            status,
            status_reason: None,
            decided_at: None,
            e_volts,
        }
    }

    #[test]
    fn e_volts_count_only_once_approved() {
        assert_eq!(
            sample_submission(SubmissionStatus::Pending, 5).credited_e_volts(),
            0
        );
        assert_eq!(
            sample_submission(SubmissionStatus::Rejected, 5).credited_e_volts(),
            0
        );
        assert_eq!(
            sample_submission(SubmissionStatus::Approved, 5).credited_e_volts(),
            5
        );
    }

    #[test]
    fn status_round_trips_through_display_and_parse() {
        for status in [
            SubmissionStatus::Pending,
            SubmissionStatus::Approved,
            SubmissionStatus::Rejected,
        ] {
            let parsed: SubmissionStatus = status.to_string().parse().expect("status should parse");
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn connector_kind_serializes_with_wire_names() {
        let connector = super::Connector {
            name: "CCS2".to_string(),
            count: 2,
            kind: super::ConnectorKind::Dc,
            power_rating: Some("60 kW".to_string()),
            tariff: Some("₹18/kWh".to_string()),
        };
        let json = serde_json::to_value(&connector).expect("connector should serialize");
        assert_eq!(json["type"], "DC");
        assert_eq!(json["powerRating"], "60 kW");
    }
}

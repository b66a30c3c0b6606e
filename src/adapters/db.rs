use rusqlite::{Connection, params};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::domain::models::{
    AuditEvent, Customer, NewAuditEvent, StationSubmission, Trip, TripCheckin,
};

pub const LATEST_SCHEMA_VERSION: u32 = 1;

const MIGRATIONS: &[(u32, &str)] = &[(
    1,
    r#"
CREATE TABLE IF NOT EXISTS customers (
    email TEXT PRIMARY KEY,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    phone TEXT NOT NULL,
    customer_reg_date TEXT NOT NULL,
    subscription TEXT NOT NULL,
    device_brand TEXT NOT NULL,
    device_model TEXT NOT NULL,
    device_platform TEXT NOT NULL,
    version TEXT NOT NULL,
    navigation TEXT NOT NULL,
    trip TEXT NOT NULL,
    check_in TEXT NOT NULL,
    vehicles_json TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_customers_reg_date_desc
ON customers (customer_reg_date DESC);

CREATE TABLE IF NOT EXISTS station_submissions (
    id TEXT PRIMARY KEY,
    submission_date TEXT NOT NULL,
    station_type TEXT NOT NULL,
    user_name TEXT NOT NULL,
    contact_number TEXT NOT NULL,
    latitude REAL NOT NULL,
    longitude REAL NOT NULL,
    network_name TEXT NOT NULL,
    station_name TEXT NOT NULL,
    station_number TEXT NOT NULL,
    connectors_json TEXT NOT NULL,
    usage_type TEXT NOT NULL,
    photos_json TEXT NOT NULL,
    status TEXT NOT NULL,
    status_reason TEXT,
    decided_at TEXT,
    e_volts INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_station_submissions_date_desc
ON station_submissions (submission_date DESC);

CREATE TABLE IF NOT EXISTS trip_checkins (
    id TEXT PRIMARY KEY,
    date_time TEXT NOT NULL,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    user_phone TEXT,
    source_json TEXT NOT NULL,
    destination_json TEXT NOT NULL,
    trip_status TEXT NOT NULL,
    navigation TEXT NOT NULL,
    check_in TEXT NOT NULL,
    rating REAL,
    feedback_provided INTEGER NOT NULL,
    units_charged REAL,
    rate_per_unit REAL,
    amount REAL,
    charging_time TEXT,
    ev_json TEXT,
    story_status TEXT NOT NULL,
    blog_link TEXT,
    approval_date TEXT,
    approved_by TEXT,
    evolts_earned INTEGER
);

CREATE INDEX IF NOT EXISTS idx_trip_checkins_date_desc
ON trip_checkins (date_time DESC);

CREATE TABLE IF NOT EXISTS trips (
    id TEXT PRIMARY KEY,
    date_time TEXT NOT NULL,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    source TEXT NOT NULL,
    destination TEXT NOT NULL,
    via_stops_json TEXT NOT NULL,
    navigation TEXT NOT NULL,
    check_in TEXT NOT NULL,
    trip_status TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_trips_date_desc
ON trips (date_time DESC);

CREATE TABLE IF NOT EXISTS audit_events (
    id TEXT PRIMARY KEY,
    created_at TEXT NOT NULL,
    actor TEXT NOT NULL,
    action TEXT NOT NULL,
    entity_kind TEXT NOT NULL,
    entity_id TEXT NOT NULL,
    reason TEXT,
    details_json TEXT
);

CREATE INDEX IF NOT EXISTS idx_audit_events_created_at_desc
ON audit_events (created_at DESC);
"#,
)];

#[derive(Debug, Error)]
pub enum DbError {
    #[error("database operation failed: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("unsupported schema version {current}; latest supported is {latest}")]
    UnsupportedSchemaVersion { current: u32, latest: u32 },
    #[error("stored column {column} could not be decoded: {detail}")]
    Decode {
        column: &'static str,
        detail: String,
    },
}

pub fn open_connection(path: &str) -> Result<Connection, DbError> {
    Connection::open(path).map_err(DbError::from)
}

pub fn run_migrations(connection: &mut Connection) -> Result<(), DbError> {
    let current_version = schema_version(connection)?;

    if current_version > LATEST_SCHEMA_VERSION {
        return Err(DbError::UnsupportedSchemaVersion {
            current: current_version,
            latest: LATEST_SCHEMA_VERSION,
        });
    }

    let transaction = connection.transaction()?;

    for (version, sql) in MIGRATIONS {
        if *version > current_version {
            transaction.execute_batch(sql)?;
            transaction.pragma_update(None, "user_version", version)?;
        }
    }

    transaction.commit()?;

    Ok(())
}

pub fn schema_version(connection: &Connection) -> Result<u32, DbError> {
    let version = connection.pragma_query_value(None, "user_version", |row| row.get(0))?;
    Ok(version)
}

fn decode_json<T: DeserializeOwned>(column: &'static str, raw: &str) -> Result<T, DbError> {
    serde_json::from_str(raw).map_err(|error| DbError::Decode {
        column,
        detail: error.to_string(),
    })
}

fn decode_json_opt<T: DeserializeOwned>(
    column: &'static str,
    raw: Option<&str>,
) -> Result<Option<T>, DbError> {
    raw.map(|value| decode_json(column, value)).transpose()
}

fn encode_json<T: serde::Serialize>(column: &'static str, value: &T) -> Result<String, DbError> {
    serde_json::to_string(value).map_err(|error| DbError::Decode {
        column,
        detail: error.to_string(),
    })
}

fn decode_text<T>(column: &'static str, raw: &str) -> Result<T, DbError>
where
    T: std::str::FromStr<Err = String>,
{
    raw.parse::<T>().map_err(|detail| DbError::Decode { column, detail })
}

pub fn insert_customer(connection: &Connection, customer: &Customer) -> Result<(), DbError> {
    connection.execute(
        "INSERT INTO customers (
            email, first_name, last_name, phone, customer_reg_date, subscription,
            device_brand, device_model, device_platform, version,
            navigation, trip, check_in, vehicles_json
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        params![
            customer.email,
            customer.first_name,
            customer.last_name,
            customer.phone,
            customer.customer_reg_date,
            customer.subscription,
            customer.device_brand,
            customer.device_model,
            customer.device_platform,
            customer.version,
            customer.navigation.to_string(),
            customer.trip.to_string(),
            customer.check_in.to_string(),
            encode_json("vehicles_json", &customer.vehicles)?,
        ],
    )?;
    Ok(())
}

struct CustomerRow {
    email: String,
    first_name: String,
    last_name: String,
    phone: String,
    customer_reg_date: String,
    subscription: String,
    device_brand: String,
    device_model: String,
    device_platform: String,
    version: String,
    navigation: String,
    trip: String,
    check_in: String,
    vehicles_json: String,
}

impl CustomerRow {
    fn into_model(self) -> Result<Customer, DbError> {
        Ok(Customer {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            customer_reg_date: self.customer_reg_date,
            subscription: self.subscription,
            device_brand: self.device_brand,
            device_model: self.device_model,
            device_platform: self.device_platform,
            version: self.version,
            navigation: decode_text("navigation", &self.navigation)?,
            trip: decode_text("trip", &self.trip)?,
            check_in: decode_text("check_in", &self.check_in)?,
            vehicles: decode_json("vehicles_json", &self.vehicles_json)?,
        })
    }
}

pub fn list_customers(connection: &Connection) -> Result<Vec<Customer>, DbError> {
    let mut statement = connection.prepare(
        "SELECT email, first_name, last_name, phone, customer_reg_date, subscription,
                device_brand, device_model, device_platform, version,
                navigation, trip, check_in, vehicles_json
         FROM customers
         ORDER BY customer_reg_date DESC, email ASC",
    )?;

    let rows = statement.query_map([], |row| {
        Ok(CustomerRow {
            email: row.get(0)?,
            first_name: row.get(1)?,
            last_name: row.get(2)?,
            phone: row.get(3)?,
            customer_reg_date: row.get(4)?,
            subscription: row.get(5)?,
            device_brand: row.get(6)?,
            device_model: row.get(7)?,
            device_platform: row.get(8)?,
            version: row.get(9)?,
            navigation: row.get(10)?,
            trip: row.get(11)?,
            check_in: row.get(12)?,
            vehicles_json: row.get(13)?,
        })
    })?;

    let mut customers = Vec::new();
    for row in rows {
        customers.push(row?.into_model()?);
    }

    Ok(customers)
}

pub fn count_customers(connection: &Connection) -> Result<i64, DbError> {
    let count = connection.query_row("SELECT COUNT(*) FROM customers", [], |row| row.get(0))?;
    Ok(count)
}

pub fn insert_submission(
    connection: &Connection,
    submission: &StationSubmission,
) -> Result<(), DbError> {
    connection.execute(
        "INSERT INTO station_submissions (
            id, submission_date, station_type, user_name, contact_number,
            latitude, longitude, network_name, station_name, station_number,
            connectors_json, usage_type, photos_json, status, status_reason,
            decided_at, e_volts
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
        params![
            submission.id,
            submission.submission_date,
            submission.station_type,
            submission.user_name,
            submission.contact_number,
            submission.latitude,
            submission.longitude,
            submission.network_name,
            submission.station_name,
            submission.station_number,
            encode_json("connectors_json", &submission.connectors)?,
            submission.usage_type.to_string(),
            encode_json("photos_json", &submission.photos)?,
            submission.status.to_string(),
            submission.status_reason,
            submission.decided_at,
            submission.e_volts,
        ],
    )?;
    Ok(())
}

pub fn update_submission(
    connection: &Connection,
    submission: &StationSubmission,
) -> Result<bool, DbError> {
    let updated = connection.execute(
        "UPDATE station_submissions SET
            submission_date = ?2, station_type = ?3, user_name = ?4, contact_number = ?5,
            latitude = ?6, longitude = ?7, network_name = ?8, station_name = ?9,
            station_number = ?10, connectors_json = ?11, usage_type = ?12, photos_json = ?13,
            status = ?14, status_reason = ?15, decided_at = ?16, e_volts = ?17
         WHERE id = ?1",
        params![
            submission.id,
            submission.submission_date,
            submission.station_type,
            submission.user_name,
            submission.contact_number,
            submission.latitude,
            submission.longitude,
            submission.network_name,
            submission.station_name,
            submission.station_number,
            encode_json("connectors_json", &submission.connectors)?,
            submission.usage_type.to_string(),
            encode_json("photos_json", &submission.photos)?,
            submission.status.to_string(),
            submission.status_reason,
            submission.decided_at,
            submission.e_volts,
        ],
    )?;
    Ok(updated > 0)
}

struct SubmissionRow {
    id: String,
    submission_date: String,
    station_type: String,
    user_name: String,
    contact_number: String,
    latitude: f64,
    longitude: f64,
    network_name: String,
    station_name: String,
    station_number: String,
    connectors_json: String,
    usage_type: String,
    photos_json: String,
    status: String,
    status_reason: Option<String>,
    decided_at: Option<String>,
    e_volts: i64,
}

impl SubmissionRow {
    fn into_model(self) -> Result<StationSubmission, DbError> {
        Ok(StationSubmission {
            id: self.id,
            submission_date: self.submission_date,
            station_type: self.station_type,
            user_name: self.user_name,
            contact_number: self.contact_number,
            latitude: self.latitude,
            longitude: self.longitude,
            network_name: self.network_name,
            station_name: self.station_name,
            station_number: self.station_number,
            connectors: decode_json("connectors_json", &self.connectors_json)?,
            usage_type: decode_text("usage_type", &self.usage_type)?,
            photos: decode_json("photos_json", &self.photos_json)?,
            status: decode_text("status", &self.status)?,
            status_reason: self.status_reason,
            decided_at: self.decided_at,
            e_volts: self.e_volts,
        })
    }
}

const SUBMISSION_COLUMNS: &str = "id, submission_date, station_type, user_name, contact_number,
        latitude, longitude, network_name, station_name, station_number,
        connectors_json, usage_type, photos_json, status, status_reason, decided_at, e_volts";

fn submission_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SubmissionRow> {
    Ok(SubmissionRow {
        id: row.get(0)?,
        submission_date: row.get(1)?,
        station_type: row.get(2)?,
        user_name: row.get(3)?,
        contact_number: row.get(4)?,
        latitude: row.get(5)?,
        longitude: row.get(6)?,
        network_name: row.get(7)?,
        station_name: row.get(8)?,
        station_number: row.get(9)?,
        connectors_json: row.get(10)?,
        usage_type: row.get(11)?,
        photos_json: row.get(12)?,
        status: row.get(13)?,
        status_reason: row.get(14)?,
        decided_at: row.get(15)?,
        e_volts: row.get(16)?,
    })
}

pub fn list_submissions(connection: &Connection) -> Result<Vec<StationSubmission>, DbError> {
    let mut statement = connection.prepare(&format!(
        "SELECT {SUBMISSION_COLUMNS}
         FROM station_submissions
         ORDER BY submission_date DESC, id DESC"
    ))?;

    let rows = statement.query_map([], submission_from_row)?;

    let mut submissions = Vec::new();
    for row in rows {
        submissions.push(row?.into_model()?);
    }

    Ok(submissions)
}

pub fn get_submission(
    connection: &Connection,
    id: &str,
) -> Result<Option<StationSubmission>, DbError> {
    let mut statement = connection.prepare(&format!(
        "SELECT {SUBMISSION_COLUMNS} FROM station_submissions WHERE id = ?1"
    ))?;

    let mut rows = statement.query(params![id])?;
    if let Some(row) = rows.next()? {
        return submission_from_row(row)?.into_model().map(Some);
    }

    Ok(None)
}

pub fn count_submissions(connection: &Connection) -> Result<i64, DbError> {
    let count =
        connection.query_row("SELECT COUNT(*) FROM station_submissions", [], |row| row.get(0))?;
    Ok(count)
}

pub fn insert_checkin(connection: &Connection, checkin: &TripCheckin) -> Result<(), DbError> {
    connection.execute(
        "INSERT INTO trip_checkins (
            id, date_time, first_name, last_name, user_phone, source_json,
            destination_json, trip_status, navigation, check_in, rating,
            feedback_provided, units_charged, rate_per_unit, amount, charging_time,
            ev_json, story_status, blog_link, approval_date, approved_by, evolts_earned
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16,
                  ?17, ?18, ?19, ?20, ?21, ?22)",
        params![
            checkin.id,
            checkin.date_time,
            checkin.first_name,
            checkin.last_name,
            checkin.user_phone,
            encode_json("source_json", &checkin.source)?,
            encode_json("destination_json", &checkin.destination)?,
            checkin.trip_status.to_string(),
            checkin.navigation.to_string(),
            checkin.check_in.to_string(),
            checkin.rating,
            checkin.feedback_provided,
            checkin.units_charged,
            checkin.rate_per_unit,
            checkin.amount,
            checkin.charging_time,
            checkin
                .ev
                .as_ref()
                .map(|ev| encode_json("ev_json", ev))
                .transpose()?,
            checkin.story_status.to_string(),
            checkin.blog_link,
            checkin.approval_date,
            checkin.approved_by,
            checkin.evolts_earned,
        ],
    )?;
    Ok(())
}

pub fn update_checkin(connection: &Connection, checkin: &TripCheckin) -> Result<bool, DbError> {
    let updated = connection.execute(
        "UPDATE trip_checkins SET
            date_time = ?2, first_name = ?3, last_name = ?4, user_phone = ?5,
            source_json = ?6, destination_json = ?7, trip_status = ?8, navigation = ?9,
            check_in = ?10, rating = ?11, feedback_provided = ?12, units_charged = ?13,
            rate_per_unit = ?14, amount = ?15, charging_time = ?16, ev_json = ?17,
            story_status = ?18, blog_link = ?19, approval_date = ?20, approved_by = ?21,
            evolts_earned = ?22
         WHERE id = ?1",
        params![
            checkin.id,
            checkin.date_time,
            checkin.first_name,
            checkin.last_name,
            checkin.user_phone,
            encode_json("source_json", &checkin.source)?,
            encode_json("destination_json", &checkin.destination)?,
            checkin.trip_status.to_string(),
            checkin.navigation.to_string(),
            checkin.check_in.to_string(),
            checkin.rating,
            checkin.feedback_provided,
            checkin.units_charged,
            checkin.rate_per_unit,
            checkin.amount,
            checkin.charging_time,
            checkin
                .ev
                .as_ref()
                .map(|ev| encode_json("ev_json", ev))
                .transpose()?,
            checkin.story_status.to_string(),
            checkin.blog_link,
            checkin.approval_date,
            checkin.approved_by,
            checkin.evolts_earned,
        ],
    )?;
    Ok(updated > 0)
}

struct CheckinRow {
    id: String,
    date_time: String,
    first_name: String,
    last_name: String,
    user_phone: Option<String>,
    source_json: String,
    destination_json: String,
    trip_status: String,
    navigation: String,
    check_in: String,
    rating: Option<f64>,
    feedback_provided: bool,
    units_charged: Option<f64>,
    rate_per_unit: Option<f64>,
    amount: Option<f64>,
    charging_time: Option<String>,
    ev_json: Option<String>,
    story_status: String,
    blog_link: Option<String>,
    approval_date: Option<String>,
    approved_by: Option<String>,
    evolts_earned: Option<i64>,
}

impl CheckinRow {
    fn into_model(self) -> Result<TripCheckin, DbError> {
        Ok(TripCheckin {
            id: self.id,
            date_time: self.date_time,
            first_name: self.first_name,
            last_name: self.last_name,
            user_phone: self.user_phone,
            source: decode_json("source_json", &self.source_json)?,
            destination: decode_json("destination_json", &self.destination_json)?,
            trip_status: decode_text("trip_status", &self.trip_status)?,
            navigation: decode_text("navigation", &self.navigation)?,
            check_in: decode_text("check_in", &self.check_in)?,
            rating: self.rating,
            feedback_provided: self.feedback_provided,
            units_charged: self.units_charged,
            rate_per_unit: self.rate_per_unit,
            amount: self.amount,
            charging_time: self.charging_time,
            ev: decode_json_opt("ev_json", self.ev_json.as_deref())?,
            story_status: decode_text("story_status", &self.story_status)?,
            blog_link: self.blog_link,
            approval_date: self.approval_date,
            approved_by: self.approved_by,
            evolts_earned: self.evolts_earned,
        })
    }
}

const CHECKIN_COLUMNS: &str = "id, date_time, first_name, last_name, user_phone, source_json,
        destination_json, trip_status, navigation, check_in, rating, feedback_provided,
        units_charged, rate_per_unit, amount, charging_time, ev_json, story_status,
        blog_link, approval_date, approved_by, evolts_earned";

fn checkin_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<CheckinRow> {
    Ok(CheckinRow {
        id: row.get(0)?,
        date_time: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        user_phone: row.get(4)?,
        source_json: row.get(5)?,
        destination_json: row.get(6)?,
        trip_status: row.get(7)?,
        navigation: row.get(8)?,
        check_in: row.get(9)?,
        rating: row.get(10)?,
        feedback_provided: row.get(11)?,
        units_charged: row.get(12)?,
        rate_per_unit: row.get(13)?,
        amount: row.get(14)?,
        charging_time: row.get(15)?,
        ev_json: row.get(16)?,
        story_status: row.get(17)?,
        blog_link: row.get(18)?,
        approval_date: row.get(19)?,
        approved_by: row.get(20)?,
        evolts_earned: row.get(21)?,
    })
}

pub fn list_checkins(connection: &Connection) -> Result<Vec<TripCheckin>, DbError> {
    let mut statement = connection.prepare(&format!(
        "SELECT {CHECKIN_COLUMNS}
         FROM trip_checkins
         ORDER BY date_time DESC, id DESC"
    ))?;

    let rows = statement.query_map([], checkin_from_row)?;

    let mut checkins = Vec::new();
    for row in rows {
        checkins.push(row?.into_model()?);
    }

    Ok(checkins)
}

pub fn get_checkin(connection: &Connection, id: &str) -> Result<Option<TripCheckin>, DbError> {
    let mut statement = connection.prepare(&format!(
        "SELECT {CHECKIN_COLUMNS} FROM trip_checkins WHERE id = ?1"
    ))?;

    let mut rows = statement.query(params![id])?;
    if let Some(row) = rows.next()? {
        return checkin_from_row(row)?.into_model().map(Some);
    }

    Ok(None)
}

pub fn insert_trip(connection: &Connection, trip: &Trip) -> Result<(), DbError> {
    connection.execute(
        "INSERT INTO trips (
            id, date_time, first_name, last_name, source, destination,
            via_stops_json, navigation, check_in, trip_status
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            trip.id,
            trip.date_time,
            trip.first_name,
            trip.last_name,
            trip.source,
            trip.destination,
            encode_json("via_stops_json", &trip.via_stops)?,
            trip.navigation.to_string(),
            trip.check_in.to_string(),
            trip.trip_status.to_string(),
        ],
    )?;
    Ok(())
}

pub fn list_trips(connection: &Connection) -> Result<Vec<Trip>, DbError> {
    struct TripRow {
        id: String,
        date_time: String,
        first_name: String,
        last_name: String,
        source: String,
        destination: String,
        via_stops_json: String,
        navigation: String,
        check_in: String,
        trip_status: String,
    }

    let mut statement = connection.prepare(
        "SELECT id, date_time, first_name, last_name, source, destination,
                via_stops_json, navigation, check_in, trip_status
         FROM trips
         ORDER BY date_time DESC, id DESC",
    )?;

    let rows = statement.query_map([], |row| {
        Ok(TripRow {
            id: row.get(0)?,
            date_time: row.get(1)?,
            first_name: row.get(2)?,
            last_name: row.get(3)?,
            source: row.get(4)?,
            destination: row.get(5)?,
            via_stops_json: row.get(6)?,
            navigation: row.get(7)?,
            check_in: row.get(8)?,
            trip_status: row.get(9)?,
        })
    })?;

    let mut trips = Vec::new();
    for row in rows {
        let row = row?;
        trips.push(Trip {
            id: row.id,
            date_time: row.date_time,
            first_name: row.first_name,
            last_name: row.last_name,
            source: row.source,
            destination: row.destination,
            via_stops: decode_json("via_stops_json", &row.via_stops_json)?,
            navigation: decode_text("navigation", &row.navigation)?,
            check_in: decode_text("check_in", &row.check_in)?,
            trip_status: decode_text("trip_status", &row.trip_status)?,
        });
    }

    Ok(trips)
}

pub fn insert_audit_event(
    connection: &Connection,
    new_event: &NewAuditEvent,
) -> Result<String, DbError> {
    let id = uuid::Uuid::new_v4().to_string();
    connection.execute(
        "INSERT INTO audit_events (
            id, created_at, actor, action, entity_kind, entity_id, reason, details_json
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            id,
            new_event.created_at,
            new_event.actor,
            new_event.action,
            new_event.entity_kind,
            new_event.entity_id,
            new_event.reason,
            new_event.details_json,
        ],
    )?;
    Ok(id)
}

pub fn list_recent_audit_events(
    connection: &Connection,
    limit: u32,
) -> Result<Vec<AuditEvent>, DbError> {
    let mut statement = connection.prepare(
        "SELECT id, created_at, actor, action, entity_kind, entity_id, reason, details_json
         FROM audit_events
         ORDER BY created_at DESC, id DESC
         LIMIT ?1",
    )?;

    let rows = statement.query_map(params![i64::from(limit)], |row| {
        Ok(AuditEvent {
            id: row.get(0)?,
            created_at: row.get(1)?,
            actor: row.get(2)?,
            action: row.get(3)?,
            entity_kind: row.get(4)?,
            entity_id: row.get(5)?,
            reason: row.get(6)?,
            details_json: row.get(7)?,
        })
    })?;

    let mut events = Vec::new();
    for row in rows {
        events.push(row?);
    }

    Ok(events)
}

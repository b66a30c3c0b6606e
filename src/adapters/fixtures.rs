use rusqlite::Connection;

use crate::adapters::db::{
    self, DbError, insert_checkin, insert_customer, insert_submission, insert_trip,
};
use crate::domain::models::{Customer, StationSubmission, Trip, TripCheckin};

/// The bundled mock dataset every table starts from until a live backend
/// takes over.
#[derive(Debug, Clone, PartialEq)]
pub struct FixtureSet {
    pub customers: Vec<Customer>,
    pub submissions: Vec<StationSubmission>,
    pub checkins: Vec<TripCheckin>,
    pub trips: Vec<Trip>,
}

pub fn load_bundled() -> Result<FixtureSet, serde_json::Error> {
    Ok(FixtureSet {
        customers: serde_json::from_str(include_str!("../../fixtures/customers.json"))?,
        submissions: serde_json::from_str(include_str!("../../fixtures/station_submissions.json"))?,
        checkins: serde_json::from_str(include_str!("../../fixtures/trip_checkins.json"))?,
        trips: serde_json::from_str(include_str!("../../fixtures/trips.json"))?,
    })
}

pub fn seed(connection: &Connection, set: &FixtureSet) -> Result<(), DbError> {
    for customer in &set.customers {
        insert_customer(connection, customer)?;
    }
    for submission in &set.submissions {
        insert_submission(connection, submission)?;
    }
    for checkin in &set.checkins {
        insert_checkin(connection, checkin)?;
    }
    for trip in &set.trips {
        insert_trip(connection, trip)?;
    }
    Ok(())
}

pub fn is_seeded(connection: &Connection) -> Result<bool, DbError> {
    Ok(db::count_customers(connection)? > 0)
}

#[cfg(test)]
mod tests {
    use crate::adapters::db::{count_customers, count_submissions};
    use crate::domain::models::SubmissionStatus;
    use crate::test_support::open_test_connection;

    use super::{is_seeded, load_bundled, seed};

    #[test]
    fn bundled_fixtures_decode() {
        let set = load_bundled().expect("fixtures should decode");
        assert!(!set.customers.is_empty());
        assert!(!set.submissions.is_empty());
        assert!(!set.checkins.is_empty());
        assert!(!set.trips.is_empty());
    }

    #[test]
    fn every_seeded_customer_owns_at_least_one_vehicle() {
        let set = load_bundled().expect("fixtures should decode");
        for customer in &set.customers {
            assert!(
                !customer.vehicles.is_empty(),
                "customer {} should have a vehicle",
                customer.email
            );
        }
    }

    #[test]
    fn fixtures_cover_every_submission_status() {
        let set = load_bundled().expect("fixtures should decode");
        for status in [
            SubmissionStatus::Pending,
            SubmissionStatus::Approved,
            SubmissionStatus::Rejected,
        ] {
            assert!(
                set.submissions.iter().any(|s| s.status == status),
                "a {status} submission should be seeded"
            );
        }
    }

    #[test]
    fn seeding_populates_all_tables() {
        let connection = open_test_connection("fixtures-seed.sqlite");
        let set = load_bundled().expect("fixtures should decode");

        assert!(!is_seeded(&connection).expect("seed check should work"));
        seed(&connection, &set).expect("seed should succeed");
        assert!(is_seeded(&connection).expect("seed check should work"));

        assert_eq!(
            count_customers(&connection).expect("count should work"),
            set.customers.len() as i64
        );
        assert_eq!(
            count_submissions(&connection).expect("count should work"),
            set.submissions.len() as i64
        );
    }
}

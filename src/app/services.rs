use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use thiserror::Error;

use crate::adapters::db;
use crate::adapters::db::DbError;
use crate::domain::clock::{Clock, SystemClock, to_rfc3339_millis};
use crate::domain::models::{
    AuditEvent, Customer, NewAuditEvent, StationSubmission, Trip, TripCheckin,
};
use crate::domain::moderation::{
    self, ModerationError, StoryDecision,
};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("database lock poisoned")]
    DbLockPoisoned,
    #[error("database operation failed: {0}")]
    Database(#[from] DbError),
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    #[error(transparent)]
    Validation(#[from] ModerationError),
}

/// Read side of the admin repository: full collections feed the shared list
/// pipeline, single records feed the edit flows.
pub trait AdminQueryHandler {
    fn list_customers(&self) -> Result<Vec<Customer>, ServiceError>;
    fn list_submissions(&self) -> Result<Vec<StationSubmission>, ServiceError>;
    fn get_submission(&self, id: &str) -> Result<StationSubmission, ServiceError>;
    fn list_checkins(&self) -> Result<Vec<TripCheckin>, ServiceError>;
    fn get_checkin(&self, id: &str) -> Result<TripCheckin, ServiceError>;
    fn list_trips(&self) -> Result<Vec<Trip>, ServiceError>;
    fn list_recent_audit_events(&self, limit: u32) -> Result<Vec<AuditEvent>, ServiceError>;
}

/// Write side: full-record replacements merged by identity, plus the
/// moderation transitions. Every write leaves an audit event behind.
pub trait AdminCommandHandler {
    fn replace_submission(
        &self,
        replacement: &StationSubmission,
        actor: &str,
    ) -> Result<StationSubmission, ServiceError>;
    fn approve_submission(
        &self,
        id: &str,
        actor: &str,
    ) -> Result<StationSubmission, ServiceError>;
    fn reject_submission(
        &self,
        id: &str,
        actor: &str,
        reason: &str,
    ) -> Result<StationSubmission, ServiceError>;
    fn replace_checkin(
        &self,
        replacement: &TripCheckin,
        actor: &str,
        edit_reason: Option<&str>,
    ) -> Result<TripCheckin, ServiceError>;
    fn review_story(
        &self,
        id: &str,
        decision: StoryDecision,
        blog_link: Option<String>,
        admin: &str,
    ) -> Result<TripCheckin, ServiceError>;
}

#[derive(Clone)]
pub struct SqliteAdminService {
    connection: Arc<Mutex<Connection>>,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl SqliteAdminService {
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self::with_clock(connection, Arc::new(SystemClock))
    }

    pub fn with_clock(
        connection: Arc<Mutex<Connection>>,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        Self { connection, clock }
    }

    fn now(&self) -> String {
        to_rfc3339_millis(self.clock.now())
    }

    fn with_connection<T>(
        &self,
        op: impl FnOnce(&Connection) -> Result<T, DbError>,
    ) -> Result<T, ServiceError> {
        let connection = self
            .connection
            .lock()
            .map_err(|_| ServiceError::DbLockPoisoned)?;
        op(&connection).map_err(ServiceError::from)
    }

    fn record_audit(
        &self,
        connection: &Connection,
        actor: &str,
        action: &str,
        entity_kind: &str,
        entity_id: &str,
        reason: Option<&str>,
        details_json: Option<String>,
    ) -> Result<(), DbError> {
        db::insert_audit_event(
            connection,
            &NewAuditEvent {
                created_at: self.now(),
                actor: actor.to_string(),
                action: action.to_string(),
                entity_kind: entity_kind.to_string(),
                entity_id: entity_id.to_string(),
                reason: reason.map(ToString::to_string),
                details_json,
            },
        )?;
        Ok(())
    }
}

impl AdminQueryHandler for SqliteAdminService {
    fn list_customers(&self) -> Result<Vec<Customer>, ServiceError> {
        self.with_connection(db::list_customers)
    }

    fn list_submissions(&self) -> Result<Vec<StationSubmission>, ServiceError> {
        self.with_connection(db::list_submissions)
    }

    fn get_submission(&self, id: &str) -> Result<StationSubmission, ServiceError> {
        self.with_connection(|connection| db::get_submission(connection, id))?
            .ok_or_else(|| ServiceError::NotFound {
                kind: "station submission",
                id: id.to_string(),
            })
    }

    fn list_checkins(&self) -> Result<Vec<TripCheckin>, ServiceError> {
        self.with_connection(db::list_checkins)
    }

    fn get_checkin(&self, id: &str) -> Result<TripCheckin, ServiceError> {
        self.with_connection(|connection| db::get_checkin(connection, id))?
            .ok_or_else(|| ServiceError::NotFound {
                kind: "trip check-in",
                id: id.to_string(),
            })
    }

    fn list_trips(&self) -> Result<Vec<Trip>, ServiceError> {
        self.with_connection(db::list_trips)
    }

    fn list_recent_audit_events(&self, limit: u32) -> Result<Vec<AuditEvent>, ServiceError> {
        self.with_connection(|connection| db::list_recent_audit_events(connection, limit))
    }
}

impl AdminCommandHandler for SqliteAdminService {
    fn replace_submission(
        &self,
        replacement: &StationSubmission,
        actor: &str,
    ) -> Result<StationSubmission, ServiceError> {
        let current = self.get_submission(&replacement.id)?;
        moderation::validate_submission_edit(&current, replacement)?;

        let connection = self
            .connection
            .lock()
            .map_err(|_| ServiceError::DbLockPoisoned)?;
        db::update_submission(&connection, replacement)?;
        self.record_audit(
            &connection,
            actor,
            "submission.edit",
            "station_submission",
            &replacement.id,
            None,
            None,
        )?;

        tracing::info!(
            submission_id = %replacement.id,
            actor = %actor,
            "station submission edited"
        );
        Ok(replacement.clone())
    }

    fn approve_submission(
        &self,
        id: &str,
        actor: &str,
    ) -> Result<StationSubmission, ServiceError> {
        let mut submission = self.get_submission(id)?;
        moderation::approve_submission(&mut submission, &self.now())?;

        let connection = self
            .connection
            .lock()
            .map_err(|_| ServiceError::DbLockPoisoned)?;
        db::update_submission(&connection, &submission)?;
        self.record_audit(
            &connection,
            actor,
            "submission.approve",
            "station_submission",
            id,
            None,
            Some(serde_json::json!({ "eVolts": submission.e_volts }).to_string()),
        )?;

        tracing::info!(
            submission_id = %id,
            actor = %actor,
            e_volts = submission.e_volts,
            "station submission approved"
        );
        Ok(submission)
    }

    fn reject_submission(
        &self,
        id: &str,
        actor: &str,
        reason: &str,
    ) -> Result<StationSubmission, ServiceError> {
        let mut submission = self.get_submission(id)?;
        moderation::reject_submission(&mut submission, reason, &self.now())?;

        let connection = self
            .connection
            .lock()
            .map_err(|_| ServiceError::DbLockPoisoned)?;
        db::update_submission(&connection, &submission)?;
        self.record_audit(
            &connection,
            actor,
            "submission.reject",
            "station_submission",
            id,
            submission.status_reason.as_deref(),
            None,
        )?;

        tracing::info!(
            submission_id = %id,
            actor = %actor,
            "station submission rejected"
        );
        Ok(submission)
    }

    fn replace_checkin(
        &self,
        replacement: &TripCheckin,
        actor: &str,
        edit_reason: Option<&str>,
    ) -> Result<TripCheckin, ServiceError> {
        self.get_checkin(&replacement.id)?;
        moderation::validate_checkin_edit(replacement, edit_reason)?;

        let connection = self
            .connection
            .lock()
            .map_err(|_| ServiceError::DbLockPoisoned)?;
        db::update_checkin(&connection, replacement)?;
        self.record_audit(
            &connection,
            actor,
            "checkin.edit",
            "trip_checkin",
            &replacement.id,
            edit_reason.map(str::trim).filter(|reason| !reason.is_empty()),
            None,
        )?;

        tracing::info!(
            checkin_id = %replacement.id,
            actor = %actor,
            "trip check-in edited"
        );
        Ok(replacement.clone())
    }

    fn review_story(
        &self,
        id: &str,
        decision: StoryDecision,
        blog_link: Option<String>,
        admin: &str,
    ) -> Result<TripCheckin, ServiceError> {
        let mut checkin = self.get_checkin(id)?;
        moderation::review_story(&mut checkin, decision, blog_link, admin, &self.now());

        let action = match decision {
            StoryDecision::Approve => "story.approve",
            StoryDecision::Reject => "story.reject",
        };

        let connection = self
            .connection
            .lock()
            .map_err(|_| ServiceError::DbLockPoisoned)?;
        db::update_checkin(&connection, &checkin)?;
        self.record_audit(
            &connection,
            admin,
            action,
            "trip_checkin",
            id,
            None,
            checkin
                .blog_link
                .as_ref()
                .map(|link| serde_json::json!({ "blogLink": link }).to_string()),
        )?;

        tracing::info!(
            checkin_id = %id,
            admin = %admin,
            action = %action,
            "trip story reviewed"
        );
        Ok(checkin)
    }
}

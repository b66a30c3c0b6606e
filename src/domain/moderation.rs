use thiserror::Error;

use crate::domain::models::{
    StationSubmission, StoryStatus, SubmissionStatus, TripCheckin,
};

/// Fixed reward credited to the submitter when a station is approved.
pub const STATION_APPROVAL_REWARD: i64 = 3;

/// Tolerance before an edited amount counts as diverging from
/// `rate_per_unit × units_charged`.
pub const AMOUNT_MISMATCH_TOLERANCE: f64 = 1.0;

const MIN_OVERRIDE_REASON_LEN: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModerationError {
    #[error("submission is not awaiting review (current status: {0})")]
    NotPending(SubmissionStatus),
    #[error("a rejection reason is required")]
    MissingRejectionReason,
    #[error("station name is required")]
    MissingStationName,
    #[error("station coordinates cannot be changed after submission")]
    CoordinatesImmutable,
    #[error(
        "an override reason of at least {MIN_OVERRIDE_REASON_LEN} characters is required when the amount does not match rate × units"
    )]
    MissingOverrideReason,
}

pub fn approve_submission(
    submission: &mut StationSubmission,
    now: &str,
) -> Result<(), ModerationError> {
    if submission.status != SubmissionStatus::Pending {
        return Err(ModerationError::NotPending(submission.status));
    }
    submission.status = SubmissionStatus::Approved;
    submission.e_volts += STATION_APPROVAL_REWARD;
    submission.status_reason = None;
    submission.decided_at = Some(now.to_string());
    Ok(())
}

pub fn reject_submission(
    submission: &mut StationSubmission,
    reason: &str,
    now: &str,
) -> Result<(), ModerationError> {
    if submission.status != SubmissionStatus::Pending {
        return Err(ModerationError::NotPending(submission.status));
    }
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(ModerationError::MissingRejectionReason);
    }
    submission.status = SubmissionStatus::Rejected;
    submission.status_reason = Some(reason.to_string());
    submission.decided_at = Some(now.to_string());
    Ok(())
}

/// Edits replace the whole record, so the parts that must not drift are
/// checked against the stored row.
pub fn validate_submission_edit(
    current: &StationSubmission,
    replacement: &StationSubmission,
) -> Result<(), ModerationError> {
    if replacement.station_name.trim().is_empty() {
        return Err(ModerationError::MissingStationName);
    }
    if replacement.latitude != current.latitude || replacement.longitude != current.longitude {
        return Err(ModerationError::CoordinatesImmutable);
    }
    Ok(())
}

pub fn amount_mismatch(checkin: &TripCheckin) -> bool {
    let Some(amount) = checkin.amount else {
        return false;
    };
    let expected = checkin.rate_per_unit.unwrap_or(0.0) * checkin.units_charged.unwrap_or(0.0);
    (amount - expected).abs() > AMOUNT_MISMATCH_TOLERANCE
}

pub fn validate_checkin_edit(
    replacement: &TripCheckin,
    edit_reason: Option<&str>,
) -> Result<(), ModerationError> {
    if amount_mismatch(replacement)
        && edit_reason.map_or(0, |reason| reason.trim().len()) < MIN_OVERRIDE_REASON_LEN
    {
        return Err(ModerationError::MissingOverrideReason);
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoryDecision {
    Approve,
    Reject,
}

/// Rejection clears any blog link; both outcomes stamp the reviewer and time.
pub fn review_story(
    checkin: &mut TripCheckin,
    decision: StoryDecision,
    blog_link: Option<String>,
    admin: &str,
    now: &str,
) {
    match decision {
        StoryDecision::Approve => {
            checkin.story_status = StoryStatus::Approved;
            checkin.blog_link = blog_link.filter(|link| !link.trim().is_empty());
        }
        StoryDecision::Reject => {
            checkin.story_status = StoryStatus::Rejected;
            checkin.blog_link = None;
        }
    }
    checkin.approval_date = Some(now.to_string());
    checkin.approved_by = Some(admin.to_string());
}

/// Engagement score derived from the check-in itself: +2 for a rating or
/// feedback, +3 for a published approved story.
pub fn computed_evolts(checkin: &TripCheckin) -> i64 {
    let mut score = 0;
    if checkin.rating.is_some() || checkin.feedback_provided {
        score += 2;
    }
    if checkin.story_status == StoryStatus::Approved && checkin.blog_link.is_some() {
        score += 3;
    }
    score
}

/// The stored score wins when present; the derived score fills the gap.
pub fn displayed_evolts(checkin: &TripCheckin) -> i64 {
    checkin.evolts_earned.unwrap_or_else(|| computed_evolts(checkin))
}

#[cfg(test)]
mod tests {
    use crate::domain::models::{
        GeoPoint, StationSubmission, StoryStatus, SubmissionStatus, TripCheckin, TripStatus,
        UsageType, YesNo,
    };

    use super::{
        ModerationError, STATION_APPROVAL_REWARD, StoryDecision, amount_mismatch,
        approve_submission, computed_evolts, displayed_evolts, reject_submission, review_story,
        validate_checkin_edit, validate_submission_edit,
    };

    fn pending_submission() -> StationSubmission {
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
            status: SubmissionStatus::Pending,
            status_reason: None,
            decided_at: None,
            e_volts: 2,
        }
    }

    fn geo(address: &str) -> GeoPoint {
        GeoPoint {
            latitude: 18.5204,
            longitude: 73.8567,
            address: address.to_string(),
        }
    }

    fn sample_checkin() -> TripCheckin {
        TripCheckin {
            id: "CHK-301".to_string(),
            date_time: "2024-05-12T08:30:00.000Z".to_string(),
            first_name: "Rohan".to_string(),
            last_name: "Sharma".to_string(),
            user_phone: Some("+91 98200 22002".to_string()),
            source: geo("Mumbai, Maharashtra"),
            destination: geo("Pune, Maharashtra"),
            trip_status: TripStatus::Completed,
            navigation: YesNo::Yes,
            check_in: YesNo::Yes,
            rating: None,
            feedback_provided: false,
            units_charged: Some(20.0),
            rate_per_unit: Some(18.0),
            amount: Some(360.0),
            charging_time: Some("45 min".to_string()),
            ev: None,
            story_status: StoryStatus::Pending,
            blog_link: None,
            approval_date: None,
            approved_by: None,
            evolts_earned: None,
        }
    }

    const NOW: &str = "2024-06-01T12:00:00.000Z";

    #[test]
    fn approving_credits_exactly_the_fixed_reward() {
        let mut submission = pending_submission();
        let before = submission.e_volts;

        approve_submission(&mut submission, NOW).expect("approval should succeed");

        assert_eq!(submission.status, SubmissionStatus::Approved);
        assert_eq!(submission.e_volts, before + STATION_APPROVAL_REWARD);
        assert_eq!(submission.decided_at.as_deref(), Some(NOW));
    }

    #[test]
    fn approving_twice_is_rejected() {
        let mut submission = pending_submission();
        approve_submission(&mut submission, NOW).expect("first approval should succeed");

        let error = approve_submission(&mut submission, NOW).unwrap_err();
        assert_eq!(error, ModerationError::NotPending(SubmissionStatus::Approved));
        assert_eq!(submission.e_volts, 2 + STATION_APPROVAL_REWARD);
    }

    #[test]
    fn rejection_requires_a_non_empty_reason() {
        let mut submission = pending_submission();
        let error = reject_submission(&mut submission, "   ", NOW).unwrap_err();
        assert_eq!(error, ModerationError::MissingRejectionReason);
        assert_eq!(submission.status, SubmissionStatus::Pending);

        reject_submission(&mut submission, "duplicate of an existing station", NOW)
            .expect("rejection with reason should succeed");
        assert_eq!(submission.status, SubmissionStatus::Rejected);
        assert_eq!(
            submission.status_reason.as_deref(),
            Some("duplicate of an existing station")
        );
    }

    #[test]
    fn edits_cannot_move_the_station() {
        let current = pending_submission();
        let mut replacement = current.clone();
        replacement.latitude += 0.5;
        assert_eq!(
            validate_submission_edit(&current, &replacement),
            Err(ModerationError::CoordinatesImmutable)
        );
    }

    #[test]
    fn edits_require_a_station_name() {
        let current = pending_submission();
        let mut replacement = current.clone();
        replacement.station_name = "  ".to_string();
        assert_eq!(
            validate_submission_edit(&current, &replacement),
            Err(ModerationError::MissingStationName)
        );
    }

    #[test]
    fn amount_within_tolerance_needs_no_override() {
        let mut checkin = sample_checkin();
        checkin.amount = Some(360.9);
        assert!(!amount_mismatch(&checkin));
        validate_checkin_edit(&checkin, None).expect("edit should pass");
    }

    #[test]
    fn diverging_amount_requires_a_long_enough_reason() {
        let mut checkin = sample_checkin();
        checkin.amount = Some(500.0);
        assert!(amount_mismatch(&checkin));

        assert_eq!(
            validate_checkin_edit(&checkin, None),
            Err(ModerationError::MissingOverrideReason)
        );
        assert_eq!(
            validate_checkin_edit(&checkin, Some("short")),
            Err(ModerationError::MissingOverrideReason)
        );
        validate_checkin_edit(&checkin, Some("operator applied a flat session fee"))
            .expect("edit with reason should pass");
    }

    #[test]
    fn story_approval_keeps_the_blog_link() {
        let mut checkin = sample_checkin();
        review_story(
            &mut checkin,
            StoryDecision::Approve,
            Some("https://blog.example.com/pune-run".to_string()),
            "Priya Nair",
            NOW,
        );
        assert_eq!(checkin.story_status, StoryStatus::Approved);
        assert_eq!(
            checkin.blog_link.as_deref(),
            Some("https://blog.example.com/pune-run")
        );
        assert_eq!(checkin.approved_by.as_deref(), Some("Priya Nair"));
        assert_eq!(checkin.approval_date.as_deref(), Some(NOW));
    }

    #[test]
    fn story_rejection_clears_the_blog_link() {
        let mut checkin = sample_checkin();
        checkin.blog_link = Some("https://blog.example.com/old".to_string());
        review_story(&mut checkin, StoryDecision::Reject, None, "Priya Nair", NOW);
        assert_eq!(checkin.story_status, StoryStatus::Rejected);
        assert_eq!(checkin.blog_link, None);
    }

    #[test]
    fn engagement_score_combines_feedback_and_published_story() {
        let mut checkin = sample_checkin();
        assert_eq!(computed_evolts(&checkin), 0);

        checkin.rating = Some(4.5);
        assert_eq!(computed_evolts(&checkin), 2);

        checkin.story_status = StoryStatus::Approved;
        checkin.blog_link = Some("https://blog.example.com/pune-run".to_string());
        assert_eq!(computed_evolts(&checkin), 5);
    }

    #[test]
    fn stored_score_wins_over_the_derived_one() {
        let mut checkin = sample_checkin();
        checkin.rating = Some(4.0);
        checkin.evolts_earned = Some(7);
        assert_eq!(displayed_evolts(&checkin), 7);

        checkin.evolts_earned = None;
        assert_eq!(displayed_evolts(&checkin), 2);
    }
}

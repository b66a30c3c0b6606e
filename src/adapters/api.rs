use std::collections::HashSet;

use actix_web::{HttpResponse, Responder, get, post, put, web};
use serde::{Deserialize, Serialize};

use crate::app::services::{
    AdminCommandHandler, AdminQueryHandler, ServiceError, SqliteAdminService,
};
use crate::domain::export::{
    self, CsvDocument, ExportFormat, checkin_rows, customer_rows, submission_rows, trip_rows,
};
use crate::domain::listing::{
    DateWindow, ListQuery, ListRow, PageSize, SortOrder, filter_and_sort, matches_choice, paginate,
};
use crate::domain::models::{StationSubmission, Trip, TripCheckin};
use crate::domain::moderation::{StoryDecision, computed_evolts, displayed_evolts};

#[derive(Clone)]
pub struct ApiState {
    pub admin: SqliteAdminService,
    pub default_page_size: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    pub total: usize,
    pub page: u32,
    pub total_pages: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResponse {
    #[serde(flatten)]
    pub submission: StationSubmission,
    pub credited_e_volts: i64,
}

impl From<StationSubmission> for SubmissionResponse {
    fn from(submission: StationSubmission) -> Self {
        let credited_e_volts = submission.credited_e_volts();
        Self {
            submission,
            credited_e_volts,
        }
    }
}

/// Check-ins expose both the stored score and the recomputed one so a drift
/// between them stays visible to operators.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckinResponse {
    #[serde(flatten)]
    pub checkin: TripCheckin,
    pub evolts_computed: i64,
    pub evolts_displayed: i64,
}

impl From<TripCheckin> for CheckinResponse {
    fn from(checkin: TripCheckin) -> Self {
        let evolts_computed = computed_evolts(&checkin);
        let evolts_displayed = displayed_evolts(&checkin);
        Self {
            checkin,
            evolts_computed,
            evolts_displayed,
        }
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health)
        .service(list_customers_endpoint)
        .service(export_customers_endpoint)
        .service(list_submissions_endpoint)
        .service(export_submissions_endpoint)
        .service(update_submission_endpoint)
        .service(approve_submission_endpoint)
        .service(reject_submission_endpoint)
        .service(list_checkins_endpoint)
        .service(export_checkins_endpoint)
        .service(update_checkin_endpoint)
        .service(review_story_endpoint)
        .service(list_trips_endpoint)
        .service(export_trips_endpoint)
        .service(list_audit_events_endpoint);
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

fn bad_request(message: impl std::fmt::Display) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({ "error": message.to_string() }))
}

fn service_error_response(error: ServiceError) -> HttpResponse {
    match error {
        ServiceError::DbLockPoisoned => {
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "database lock poisoned"
            }))
        }
        ServiceError::Database(error) => {
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("database query failed: {error}")
            }))
        }
        ServiceError::NotFound { .. } => HttpResponse::NotFound().json(serde_json::json!({
            "error": error.to_string()
        })),
        ServiceError::Validation(error) => {
            HttpResponse::UnprocessableEntity().json(serde_json::json!({
                "error": error.to_string()
            }))
        }
    }
}

struct ParsedListParams {
    query: ListQuery,
    page: u32,
    page_size: PageSize,
}

fn parse_list_params(
    state: &ApiState,
    page: Option<u32>,
    limit: Option<&str>,
    search: Option<&str>,
    sort: Option<&str>,
    start_date: Option<&str>,
    end_date: Option<&str>,
) -> Result<ParsedListParams, HttpResponse> {
    let page_size = match limit {
        None => PageSize::Limited(state.default_page_size),
        Some(raw) => {
            PageSize::parse(raw).ok_or_else(|| bad_request(format!("invalid limit: {raw}")))?
        }
    };
    let window = DateWindow::parse(start_date.unwrap_or(""), end_date.unwrap_or(""))
        .map_err(bad_request)?;

    Ok(ParsedListParams {
        query: ListQuery {
            search: search.unwrap_or("").to_string(),
            window,
            sort: SortOrder::parse(sort.unwrap_or("")),
        },
        page: page.unwrap_or(1),
        page_size,
    })
}

fn list_response<T: Serialize, R: ListRow + Clone>(
    rows: Vec<R>,
    params: &ParsedListParams,
    extra: &[&dyn Fn(&R) -> bool],
    map: impl Fn(R) -> T,
) -> HttpResponse {
    let filtered = filter_and_sort(&rows, &params.query, extra);
    let window = paginate(&filtered, params.page, params.page_size);
    HttpResponse::Ok().json(ListResponse {
        data: window.rows.into_iter().map(map).collect::<Vec<T>>(),
        total: window.total,
        page: window.page,
        total_pages: window.total_pages,
    })
}

fn parse_ids(raw: Option<&str>) -> HashSet<String> {
    raw.unwrap_or("")
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn csv_response(document: &CsvDocument, entity: &str, selected: bool, format: ExportFormat) -> HttpResponse {
    let filename = export::export_filename(entity, selected, format);
    HttpResponse::Ok()
        .insert_header((actix_web::http::header::CONTENT_TYPE, format.content_type()))
        .insert_header((
            actix_web::http::header::CONTENT_DISPOSITION,
            format!("attachment; filename={filename}"),
        ))
        .body(document.to_text())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerListParams {
    pub page: Option<u32>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[get("/api/customers")]
async fn list_customers_endpoint(
    state: web::Data<ApiState>,
    params: web::Query<CustomerListParams>,
) -> impl Responder {
    let parsed = match parse_list_params(
        &state,
        params.page,
        params.limit.as_deref(),
        params.search.as_deref(),
        params.sort.as_deref(),
        params.start_date.as_deref(),
        params.end_date.as_deref(),
    ) {
        Ok(parsed) => parsed,
        Err(response) => return response,
    };

    match state.admin.list_customers() {
        Ok(customers) => list_response(customers, &parsed, &[], |customer| customer),
        Err(error) => service_error_response(error),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerExportParams {
    pub format: Option<String>,
    pub ids: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[get("/api/customers/export")]
async fn export_customers_endpoint(
    state: web::Data<ApiState>,
    params: web::Query<CustomerExportParams>,
) -> impl Responder {
    let Some(format) = ExportFormat::parse(params.format.as_deref().unwrap_or("")) else {
        return bad_request(format!(
            "invalid export format: {}",
            params.format.as_deref().unwrap_or("")
        ));
    };
    let parsed = match parse_list_params(
        &state,
        None,
        Some("all"),
        params.search.as_deref(),
        params.sort.as_deref(),
        params.start_date.as_deref(),
        params.end_date.as_deref(),
    ) {
        Ok(parsed) => parsed,
        Err(response) => return response,
    };
    let ids = parse_ids(params.ids.as_deref());

    match state.admin.list_customers() {
        Ok(customers) => {
            let filtered = filter_and_sort(&customers, &parsed.query, &[]);
            let picked = export::select_rows(&filtered, &ids, |customer| &customer.email);
            csv_response(&customer_rows(&picked), "customers", !ids.is_empty(), format)
        }
        Err(error) => service_error_response(error),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionListParams {
    pub page: Option<u32>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub status: Option<String>,
    pub network: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[get("/api/station-submissions")]
async fn list_submissions_endpoint(
    state: web::Data<ApiState>,
    params: web::Query<SubmissionListParams>,
) -> impl Responder {
    let parsed = match parse_list_params(
        &state,
        params.page,
        params.limit.as_deref(),
        params.search.as_deref(),
        None,
        params.start_date.as_deref(),
        params.end_date.as_deref(),
    ) {
        Ok(parsed) => parsed,
        Err(response) => return response,
    };

    let status = params.status.clone().unwrap_or_default();
    let network = params.network.clone().unwrap_or_default();
    let by_status =
        |submission: &StationSubmission| matches_choice(&status, &submission.status.to_string());
    let by_network =
        |submission: &StationSubmission| matches_choice(&network, &submission.network_name);

    match state.admin.list_submissions() {
        Ok(submissions) => list_response(
            submissions,
            &parsed,
            &[&by_status, &by_network],
            SubmissionResponse::from,
        ),
        Err(error) => service_error_response(error),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionExportParams {
    pub format: Option<String>,
    pub ids: Option<String>,
    pub search: Option<String>,
    pub status: Option<String>,
    pub network: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[get("/api/station-submissions/export")]
async fn export_submissions_endpoint(
    state: web::Data<ApiState>,
    params: web::Query<SubmissionExportParams>,
) -> impl Responder {
    let Some(format) = ExportFormat::parse(params.format.as_deref().unwrap_or("")) else {
        return bad_request(format!(
            "invalid export format: {}",
            params.format.as_deref().unwrap_or("")
        ));
    };
    let parsed = match parse_list_params(
        &state,
        None,
        Some("all"),
        params.search.as_deref(),
        None,
        params.start_date.as_deref(),
        params.end_date.as_deref(),
    ) {
        Ok(parsed) => parsed,
        Err(response) => return response,
    };
    let status = params.status.clone().unwrap_or_default();
    let network = params.network.clone().unwrap_or_default();
    let by_status =
        |submission: &StationSubmission| matches_choice(&status, &submission.status.to_string());
    let by_network =
        |submission: &StationSubmission| matches_choice(&network, &submission.network_name);
    let ids = parse_ids(params.ids.as_deref());

    match state.admin.list_submissions() {
        Ok(submissions) => {
            let filtered = filter_and_sort(&submissions, &parsed.query, &[&by_status, &by_network]);
            let picked = export::select_rows(&filtered, &ids, |submission| &submission.id);
            csv_response(
                &submission_rows(&picked),
                "station_submissions",
                !ids.is_empty(),
                format,
            )
        }
        Err(error) => service_error_response(error),
    }
}

#[derive(Debug, Deserialize)]
pub struct ActorBody {
    pub actor: Option<String>,
}

const DEFAULT_ACTOR: &str = "Admin User";

#[put("/api/station-submissions/{id}")]
async fn update_submission_endpoint(
    state: web::Data<ApiState>,
    path: web::Path<String>,
    body: web::Json<StationSubmission>,
) -> impl Responder {
    let id = path.into_inner();
    if body.id != id {
        return bad_request("path id and body id do not match");
    }

    match state.admin.replace_submission(&body, DEFAULT_ACTOR) {
        Ok(updated) => HttpResponse::Ok().json(SubmissionResponse::from(updated)),
        Err(error) => service_error_response(error),
    }
}

#[post("/api/station-submissions/{id}/approve")]
async fn approve_submission_endpoint(
    state: web::Data<ApiState>,
    path: web::Path<String>,
    body: web::Json<ActorBody>,
) -> impl Responder {
    let actor = body.actor.clone().unwrap_or_else(|| DEFAULT_ACTOR.to_string());
    match state.admin.approve_submission(&path.into_inner(), &actor) {
        Ok(updated) => HttpResponse::Ok().json(SubmissionResponse::from(updated)),
        Err(error) => service_error_response(error),
    }
}

#[derive(Debug, Deserialize)]
pub struct RejectBody {
    pub actor: Option<String>,
    pub reason: Option<String>,
}

#[post("/api/station-submissions/{id}/reject")]
async fn reject_submission_endpoint(
    state: web::Data<ApiState>,
    path: web::Path<String>,
    body: web::Json<RejectBody>,
) -> impl Responder {
    let actor = body.actor.clone().unwrap_or_else(|| DEFAULT_ACTOR.to_string());
    let reason = body.reason.clone().unwrap_or_default();
    match state
        .admin
        .reject_submission(&path.into_inner(), &actor, &reason)
    {
        Ok(updated) => HttpResponse::Ok().json(SubmissionResponse::from(updated)),
        Err(error) => service_error_response(error),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckinListParams {
    pub page: Option<u32>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub status: Option<String>,
}

#[get("/api/trip-checkins")]
async fn list_checkins_endpoint(
    state: web::Data<ApiState>,
    params: web::Query<CheckinListParams>,
) -> impl Responder {
    let parsed = match parse_list_params(
        &state,
        params.page,
        params.limit.as_deref(),
        params.search.as_deref(),
        None,
        None,
        None,
    ) {
        Ok(parsed) => parsed,
        Err(response) => return response,
    };

    let status = params.status.clone().unwrap_or_default();
    let by_status =
        |checkin: &TripCheckin| matches_choice(&status, &checkin.trip_status.to_string());

    match state.admin.list_checkins() {
        Ok(checkins) => list_response(checkins, &parsed, &[&by_status], CheckinResponse::from),
        Err(error) => service_error_response(error),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckinExportParams {
    pub format: Option<String>,
    pub ids: Option<String>,
    pub search: Option<String>,
    pub status: Option<String>,
}

#[get("/api/trip-checkins/export")]
async fn export_checkins_endpoint(
    state: web::Data<ApiState>,
    params: web::Query<CheckinExportParams>,
) -> impl Responder {
    let Some(format) = ExportFormat::parse(params.format.as_deref().unwrap_or("")) else {
        return bad_request(format!(
            "invalid export format: {}",
            params.format.as_deref().unwrap_or("")
        ));
    };
    let parsed = match parse_list_params(
        &state,
        None,
        Some("all"),
        params.search.as_deref(),
        None,
        None,
        None,
    ) {
        Ok(parsed) => parsed,
        Err(response) => return response,
    };
    let status = params.status.clone().unwrap_or_default();
    let by_status =
        |checkin: &TripCheckin| matches_choice(&status, &checkin.trip_status.to_string());
    let ids = parse_ids(params.ids.as_deref());

    match state.admin.list_checkins() {
        Ok(checkins) => {
            let filtered = filter_and_sort(&checkins, &parsed.query, &[&by_status]);
            let picked = export::select_rows(&filtered, &ids, |checkin| &checkin.id);
            csv_response(&checkin_rows(&picked), "trip_checkins", !ids.is_empty(), format)
        }
        Err(error) => service_error_response(error),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCheckinBody {
    pub checkin: TripCheckin,
    pub edit_reason: Option<String>,
    pub actor: Option<String>,
}

#[put("/api/trip-checkins/{id}")]
async fn update_checkin_endpoint(
    state: web::Data<ApiState>,
    path: web::Path<String>,
    body: web::Json<UpdateCheckinBody>,
) -> impl Responder {
    let id = path.into_inner();
    if body.checkin.id != id {
        return bad_request("path id and body id do not match");
    }
    let actor = body.actor.clone().unwrap_or_else(|| DEFAULT_ACTOR.to_string());

    match state
        .admin
        .replace_checkin(&body.checkin, &actor, body.edit_reason.as_deref())
    {
        Ok(updated) => HttpResponse::Ok().json(CheckinResponse::from(updated)),
        Err(error) => service_error_response(error),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryReviewBody {
    pub decision: String,
    pub blog_link: Option<String>,
    pub admin: Option<String>,
}

#[post("/api/trip-checkins/{id}/story")]
async fn review_story_endpoint(
    state: web::Data<ApiState>,
    path: web::Path<String>,
    body: web::Json<StoryReviewBody>,
) -> impl Responder {
    let decision = match body.decision.trim().to_lowercase().as_str() {
        "approve" => StoryDecision::Approve,
        "reject" => StoryDecision::Reject,
        other => return bad_request(format!("invalid story decision: {other}")),
    };
    let admin = body.admin.clone().unwrap_or_else(|| DEFAULT_ACTOR.to_string());

    match state
        .admin
        .review_story(&path.into_inner(), decision, body.blog_link.clone(), &admin)
    {
        Ok(updated) => HttpResponse::Ok().json(CheckinResponse::from(updated)),
        Err(error) => service_error_response(error),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripListParams {
    pub page: Option<u32>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[get("/api/trips")]
async fn list_trips_endpoint(
    state: web::Data<ApiState>,
    params: web::Query<TripListParams>,
) -> impl Responder {
    let parsed = match parse_list_params(
        &state,
        params.page,
        params.limit.as_deref(),
        params.search.as_deref(),
        params.sort.as_deref(),
        params.start_date.as_deref(),
        params.end_date.as_deref(),
    ) {
        Ok(parsed) => parsed,
        Err(response) => return response,
    };

    let status = params.status.clone().unwrap_or_default();
    let by_status = |trip: &Trip| matches_choice(&status, &trip.trip_status.to_string());

    match state.admin.list_trips() {
        Ok(trips) => list_response(trips, &parsed, &[&by_status], |trip| trip),
        Err(error) => service_error_response(error),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripExportParams {
    pub format: Option<String>,
    pub ids: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[get("/api/trips/export")]
async fn export_trips_endpoint(
    state: web::Data<ApiState>,
    params: web::Query<TripExportParams>,
) -> impl Responder {
    let Some(format) = ExportFormat::parse(params.format.as_deref().unwrap_or("")) else {
        return bad_request(format!(
            "invalid export format: {}",
            params.format.as_deref().unwrap_or("")
        ));
    };
    let parsed = match parse_list_params(
        &state,
        None,
        Some("all"),
        params.search.as_deref(),
        params.sort.as_deref(),
        params.start_date.as_deref(),
        params.end_date.as_deref(),
    ) {
        Ok(parsed) => parsed,
        Err(response) => return response,
    };
    let status = params.status.clone().unwrap_or_default();
    let by_status = |trip: &Trip| matches_choice(&status, &trip.trip_status.to_string());
    let ids = parse_ids(params.ids.as_deref());

    match state.admin.list_trips() {
        Ok(trips) => {
            let filtered = filter_and_sort(&trips, &parsed.query, &[&by_status]);
            let picked = export::select_rows(&filtered, &ids, |trip| &trip.id);
            csv_response(&trip_rows(&picked), "trip_details", !ids.is_empty(), format)
        }
        Err(error) => service_error_response(error),
    }
}

#[derive(Debug, Deserialize)]
pub struct AuditListParams {
    pub limit: Option<u32>,
}

#[get("/api/audit-events")]
async fn list_audit_events_endpoint(
    state: web::Data<ApiState>,
    params: web::Query<AuditListParams>,
) -> impl Responder {
    let limit = params.limit.unwrap_or(50).clamp(1, 500);
    match state.admin.list_recent_audit_events(limit) {
        Ok(events) => HttpResponse::Ok().json(events),
        Err(error) => service_error_response(error),
    }
}

use crate::{
    data::student::{Student, StudentPayload},
    envelope::Envelope,
    error::{MalformedPayloadSnafu, MissingStudentSnafu, ParseAgeSnafu, ParseUuidSnafu, RosterResult},
    state::RosterState,
};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use snafu::{OptionExt, ResultExt, ensure};
use time::OffsetDateTime;
use uuid::Uuid;

type Listing = Json<Envelope<Vec<Student>>>;

fn parse_id(original: String) -> RosterResult<Uuid> {
    Uuid::try_parse(original.trim()).context(ParseUuidSnafu { original })
}

pub async fn get_students(State(state): State<RosterState>) -> RosterResult<Listing> {
    let students = state.find_all().await?;
    Ok(Json(Envelope::listing(students)))
}

pub async fn get_students_by_major(
    State(state): State<RosterState>,
    Path(major): Path<String>,
) -> RosterResult<Listing> {
    let students = state.find_by_major(&major).await?;
    Ok(Json(
        Envelope::listing(students).with_filter(format!("Major: {major}")),
    ))
}

pub async fn get_students_by_min_age(
    State(state): State<RosterState>,
    Path(min_age): Path<String>,
) -> RosterResult<Listing> {
    let parsed = min_age
        .trim()
        .parse::<i64>()
        .ok()
        .context(ParseAgeSnafu { original: min_age })?;

    let students = state.find_by_min_age(parsed).await?;
    Ok(Json(
        Envelope::listing(students).with_filter(format!("Minimum age: {parsed}")),
    ))
}

pub async fn get_student_count(
    State(state): State<RosterState>,
) -> RosterResult<Json<Envelope<()>>> {
    let total = state.count().await?;
    Ok(Json(Envelope::empty().with_total(total)))
}

pub async fn post_new_student(
    State(state): State<RosterState>,
    payload: Result<Json<StudentPayload>, JsonRejection>,
) -> RosterResult<(StatusCode, Json<Envelope<Student>>)> {
    let Json(payload) = payload.context(MalformedPayloadSnafu)?;
    let new_student = payload.into_new_student(OffsetDateTime::now_utc())?;

    let student = state.insert(new_student).await?;
    info!(id = %student.id, "Created student");

    let message = format!(
        "Student {} {} created successfully",
        student.first_name, student.last_name
    );
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok(student).with_message(message)),
    ))
}

pub async fn put_student(
    State(state): State<RosterState>,
    Path(id): Path<String>,
    payload: Result<Json<StudentPayload>, JsonRejection>,
) -> RosterResult<Json<Envelope<Student>>> {
    let id = parse_id(id)?;
    let Json(payload) = payload.context(MalformedPayloadSnafu)?;
    let patch = payload.into_patch(OffsetDateTime::now_utc())?;

    let student = state
        .update(id, patch)
        .await?
        .context(MissingStudentSnafu { id })?;
    info!(%id, "Updated student");

    Ok(Json(
        Envelope::ok(student).with_message("Student updated successfully"),
    ))
}

pub async fn delete_student(
    State(state): State<RosterState>,
    Path(id): Path<String>,
) -> RosterResult<Json<Envelope<()>>> {
    let id = parse_id(id)?;

    let removed = state.remove(id).await?;
    ensure!(removed, MissingStudentSnafu { id });
    info!(%id, "Deleted student");

    Ok(Json(
        Envelope::empty().with_message("Student deleted successfully"),
    ))
}

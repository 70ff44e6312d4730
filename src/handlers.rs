use crate::codec::{self, SettingsSnapshot};
use crate::errors::AppError;
use crate::library::{Library, library};
use crate::models::{
    CountRequest, CreateDhikrRequest, DhikrRecord, ImportLinkResponse, LinkRequest, LinkResponse,
    ListQuery, ListResponse, Reminder, ScheduleRequest, Settings, ShareRequest, StatsResponse,
    TapRequest, TapResponse,
};
use crate::records;
use crate::state::{AppState, Store};
use crate::stats::build_stats;
use crate::storage::{export_records, parse_records};
use crate::ui::render_index;
use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse},
};
use chrono::{Local, Utc};
use tracing::info;

const BACKUP_FILE_NAME: &str = "zikirmatik_backup.json";

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let (stats, active) = state
        .read(|store| {
            let records = &store.data.dhikrs;
            let active: Vec<DhikrRecord> = records
                .iter()
                .filter(|r| r.status.is_active())
                .cloned()
                .collect();
            (build_stats(records), active)
        })
        .await;
    Html(render_index(&stats, &active))
}

pub async fn list_dhikrs(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Json<ListResponse> {
    let today = Local::now().date_naive();
    let list = state
        .read(|store| records::list(&store.data.dhikrs, &query, today, &Local))
        .await;
    Json(list)
}

pub async fn create_dhikr(
    State(state): State<AppState>,
    Json(payload): Json<CreateDhikrRequest>,
) -> Result<(StatusCode, Json<DhikrRecord>), AppError> {
    let now = Utc::now();
    let record = state
        .update(|store| Ok(records::create(&mut store.data.dhikrs, payload, now)?))
        .await?;
    info!("created dhikr {} ({})", record.id, record.name);
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn clear_dhikrs(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state
        .update(|store| {
            store.data.dhikrs.clear();
            store.taps.clear();
            Ok(())
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_dhikr(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DhikrRecord>, AppError> {
    let record = state
        .read(|store| records::find(&store.data.dhikrs, &id).cloned())
        .await?;
    Ok(Json(record))
}

pub async fn delete_dhikr(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state
        .update(|store| {
            records::delete(&mut store.data.dhikrs, &id)?;
            store.end_session(&id);
            Ok(())
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn start_dhikr(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DhikrRecord>, AppError> {
    let record = state
        .update(|store| {
            let record = records::start(&mut store.data.dhikrs, &id)?;
            store.end_session(&id);
            Ok(record)
        })
        .await?;
    Ok(Json(record))
}

fn apply_tap(store: &mut Store, id: &str, at_ms: i64) -> Result<TapResponse, AppError> {
    let Store { data, taps, .. } = store;
    let record = records::find_mut(&mut data.dhikrs, id)?;
    if record.is_completed() {
        return Ok(TapResponse {
            added: 0,
            completed: true,
            dhikr: record.clone(),
        });
    }

    let before = record.current_count;
    let classifier = taps.entry(id.to_string()).or_default();
    let (_, count) = classifier.tap(at_ms, before, record.target_count);
    let completed = records::set_count(record, count, Utc::now());
    let response = TapResponse {
        added: record.current_count - before,
        completed,
        dhikr: record.clone(),
    };
    if completed {
        taps.remove(id);
    }
    Ok(response)
}

pub async fn tap_dhikr(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Option<Json<TapRequest>>,
) -> Result<Json<TapResponse>, AppError> {
    let at_ms = payload
        .and_then(|Json(req)| req.at_ms)
        .unwrap_or_else(|| Utc::now().timestamp_millis());
    let response = state.update(|store| apply_tap(store, &id, at_ms)).await?;
    if response.completed && response.added > 0 {
        info!("dhikr {} completed", response.dhikr.id);
    }
    Ok(Json(response))
}

pub async fn set_count(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<CountRequest>,
) -> Result<Json<DhikrRecord>, AppError> {
    let now = Utc::now();
    let record = state
        .update(|store| {
            let record = records::find_mut(&mut store.data.dhikrs, &id)?;
            if records::set_count(record, payload.count, now) {
                store.end_session(&id);
            }
            Ok(records::find(&store.data.dhikrs, &id)?.clone())
        })
        .await?;
    Ok(Json(record))
}

pub async fn reset_dhikr(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DhikrRecord>, AppError> {
    let now = Utc::now();
    let record = state
        .update(|store| {
            let record = records::find_mut(&mut store.data.dhikrs, &id)?;
            records::reset(record, now);
            let record = record.clone();
            store.end_session(&id);
            Ok(record)
        })
        .await?;
    Ok(Json(record))
}

pub async fn repeat_dhikr(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<DhikrRecord>), AppError> {
    let now = Utc::now();
    let record = state
        .update(|store| Ok(records::repeat(&mut store.data.dhikrs, &id, now)?))
        .await?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn set_schedule(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<ScheduleRequest>,
) -> Result<Json<DhikrRecord>, AppError> {
    let record = state
        .update(|store| Ok(records::set_schedule(&mut store.data.dhikrs, &id, payload)?))
        .await?;
    Ok(Json(record))
}

pub async fn clear_schedule(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DhikrRecord>, AppError> {
    let record = state
        .update(|store| Ok(records::clear_schedule(&mut store.data.dhikrs, &id)?))
        .await?;
    Ok(Json(record))
}

pub async fn get_stats(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(state.read(|store| build_stats(&store.data.dhikrs)).await)
}

/// Newest first.
pub async fn get_reminders(State(state): State<AppState>) -> Json<Vec<Reminder>> {
    let feed = state
        .read(|store| store.reminders.iter().rev().cloned().collect())
        .await;
    Json(feed)
}

pub async fn get_settings(State(state): State<AppState>) -> Json<Settings> {
    Json(state.read(|store| store.data.settings.clone()).await)
}

pub async fn put_settings(
    State(state): State<AppState>,
    Json(payload): Json<SettingsSnapshot>,
) -> Result<Json<Settings>, AppError> {
    let settings = state
        .update(|store| {
            payload.apply_to(&mut store.data.settings);
            Ok(store.data.settings.clone())
        })
        .await?;
    Ok(Json(settings))
}

pub async fn get_library() -> Json<Library> {
    Json(library())
}

pub async fn export_backup(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let body = state.read(|store| export_records(&store.data.dhikrs)).await?;
    let disposition = format!("attachment; filename=\"{BACKUP_FILE_NAME}\"");
    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

pub async fn import_backup(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Vec<DhikrRecord>>, AppError> {
    let imported = parse_records(&body)?;
    let records = state
        .update(|store| {
            store.data.dhikrs = imported;
            store.taps.clear();
            Ok(store.data.dhikrs.clone())
        })
        .await?;
    info!("imported {} dhikr(s) from backup", records.len());
    Ok(Json(records))
}

pub async fn share_link(
    State(state): State<AppState>,
    Json(payload): Json<ShareRequest>,
) -> Result<Json<LinkResponse>, AppError> {
    if payload.ids.is_empty() {
        return Err(AppError::bad_request("ids must not be empty"));
    }
    let selected = state
        .read(|store| {
            payload
                .ids
                .iter()
                .map(|id| records::find(&store.data.dhikrs, id).cloned())
                .collect::<Result<Vec<_>, _>>()
        })
        .await?;
    let now_ms = Utc::now().timestamp_millis();
    let url = codec::share_link(&state.public_origin, &selected, payload.kind, now_ms)
        .map_err(AppError::internal)?;
    Ok(Json(LinkResponse { url }))
}

pub async fn export_link(State(state): State<AppState>) -> Result<Json<LinkResponse>, AppError> {
    let now_ms = Utc::now().timestamp_millis();
    let url = state
        .read(|store| codec::export_link(&state.public_origin, &store.data, now_ms))
        .await
        .map_err(AppError::internal)?;
    Ok(Json(LinkResponse { url }))
}

pub async fn accept_share(
    State(state): State<AppState>,
    Json(payload): Json<LinkRequest>,
) -> Result<(StatusCode, Json<Vec<DhikrRecord>>), AppError> {
    let shared = codec::decode_shared(&payload.url)
        .ok_or_else(|| AppError::bad_request("invalid share link"))?;
    let now = Utc::now();
    let added = state
        .update(|store| Ok(records::add_shared(&mut store.data.dhikrs, &shared.dhikrs, now)))
        .await?;
    info!("added {} shared dhikr(s)", added.len());
    Ok((StatusCode::CREATED, Json(added)))
}

pub async fn import_link(
    State(state): State<AppState>,
    Json(payload): Json<LinkRequest>,
) -> Result<Json<ImportLinkResponse>, AppError> {
    let Some(import) = codec::decode_import(&payload.url) else {
        return Ok(Json(ImportLinkResponse { imported: false }));
    };
    state
        .update(|store| {
            codec::apply_import(&mut store.data, import);
            store.taps.clear();
            Ok(())
        })
        .await?;
    info!("state replaced from import link");
    Ok(Json(ImportLinkResponse { imported: true }))
}

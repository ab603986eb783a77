use crate::errors::AppError;
use crate::models::{
    ClearResponse, GuestbookRequest, GuestbookResponse, PostEntryResponse, StateResponse,
    VisitRecord,
};
use crate::record::{guestbook_newest_first, is_milestone};
use crate::state::AppState;
use crate::ui::render_index;
use axum::{
    extract::{rejection::JsonRejection, State},
    response::Html,
    Json,
};
use chrono::{Local, NaiveDateTime};

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let store = state.store.lock().await;
    let load = store.page_load(now()).await;
    Html(render_index(&load))
}

pub async fn get_state(State(state): State<AppState>) -> Result<Json<StateResponse>, AppError> {
    let store = state.store.lock().await;
    let record = store.snapshot(now().date()).await;
    Ok(Json(to_state_response(record)))
}

pub async fn get_guestbook(
    State(state): State<AppState>,
) -> Result<Json<GuestbookResponse>, AppError> {
    let store = state.store.lock().await;
    let record = store.snapshot(now().date()).await;
    Ok(Json(GuestbookResponse {
        guestbook: guestbook_newest_first(&record),
    }))
}

pub async fn post_guestbook(
    State(state): State<AppState>,
    payload: Result<Json<GuestbookRequest>, JsonRejection>,
) -> Result<Json<PostEntryResponse>, AppError> {
    let Json(payload) = payload.map_err(|rejection| AppError::bad_request(rejection.body_text()))?;
    let name = payload.name.unwrap_or_default();
    let message = payload.message.unwrap_or_default();

    let store = state.store.lock().await;
    let (appended, record) = store.post_entry(&name, &message, now()).await?;

    Ok(Json(PostEntryResponse {
        appended: appended.is_some(),
        guestbook: guestbook_newest_first(&record),
    }))
}

pub async fn clear_guestbook(
    State(state): State<AppState>,
) -> Result<Json<ClearResponse>, AppError> {
    let store = state.store.lock().await;
    let removed = store.clear_guestbook(now().date()).await?;
    Ok(Json(ClearResponse {
        removed,
        guestbook: Vec::new(),
    }))
}

pub async fn healthz() -> &'static str {
    "ok"
}

fn to_state_response(record: VisitRecord) -> StateResponse {
    StateResponse {
        milestone: is_milestone(record.total),
        guestbook: guestbook_newest_first(&record),
        total: record.total,
        day: record.day,
        today: record.today,
        yesterday: record.yesterday,
    }
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

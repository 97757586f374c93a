use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::{header, HeaderMap, HeaderValue, Method},
    response::IntoResponse,
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use lightsheet_shared::{
    current_update_time, read_chunk, sort_all_index, sort_user_index, Identity, PlayerFrame,
    PlayerTrack, RawSnapshot, Snapshot, VersionEntry, VersionQuery,
};
use lightsheet_store::{Database, RetentionPolicy};

use crate::auth::AuthService;
use crate::config::ServerConfig;
use crate::error::{user_not_found, ServerError};
use crate::generator::{
    rand_lightlist, test_lightlist, test_lightlist_chunk, validate_count, GeneratedFrame,
};
use crate::music_store::MusicStore;

/// The store handle shared across handlers. `rusqlite::Connection` is not
/// `Sync`, so access is serialized behind an async mutex.
pub type SharedDb = Arc<Mutex<Database>>;

#[derive(Clone)]
pub struct AppState {
    pub db: SharedDb,
    pub auth: AuthService,
    pub music: Arc<MusicStore>,
    pub retention: RetentionPolicy,
    pub config: Arc<ServerConfig>,
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/api/", get(health_check))
        .route("/api/token", post(login))
        .route("/api/users/me", get(users_me))
        .route("/api/timelist", get(timelist_all))
        .route("/api/timelist/{username}", get(timelist_user))
        .route("/api/items", post(upload_snapshot))
        .route("/api/items/{username}/{version}", get(get_snapshot))
        .route(
            "/api/items/{username}/{version}/players/{player}",
            get(get_player_track),
        )
        .route(
            "/api/items/{username}/{version}/players/{player}/chunks/{chunk}",
            get(get_player_chunk),
        )
        .route("/api/raw", post(upload_raw))
        .route("/api/raw/{username}/{version}", get(get_raw))
        .route("/api/music", get(music_list_all).post(music_upload))
        .route("/api/music/{username}", get(music_list_user))
        .route("/api/music/{username}/{filename}", get(music_download))
        .route("/api/generate/test", get(generate_test))
        .route("/api/generate/random", get(generate_random))
        .layer(DefaultBodyLimit::max(state.config.max_upload_size))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ─── Wire shapes ───

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Deserialize)]
struct LoginForm {
    username: String,
    password: String,
}

#[derive(Serialize)]
struct TokenResponse {
    access_token: String,
    token_type: &'static str,
}

#[derive(Serialize)]
struct TimelistResponse {
    list: Vec<VersionEntry>,
}

/// Upload body: outer sequence indexed by player, inner sequence is that
/// player's chronological frames.
#[derive(Deserialize)]
struct SnapshotUpload {
    players: Vec<PlayerTrack>,
}

#[derive(Deserialize)]
struct RawUpload {
    raw_data: String,
}

#[derive(Serialize)]
struct UploadResponse {
    message: String,
    update_time: String,
}

#[derive(Serialize)]
struct ChunkResponse {
    player_data: Vec<PlayerFrame>,
}

#[derive(Serialize)]
struct PlayerTrackResponse {
    color_data: PlayerTrack,
}

#[derive(Serialize)]
struct MusicListResponse {
    music_list: Vec<String>,
    message: String,
}

#[derive(Serialize)]
struct AllMusicListsResponse {
    music_lists: std::collections::BTreeMap<String, Vec<String>>,
    message: &'static str,
}

#[derive(Deserialize)]
struct TestGeneratorParams {
    cnt: usize,
    chunk: Option<usize>,
}

#[derive(Deserialize)]
struct RandGeneratorParams {
    cnt: usize,
    seed: Option<u64>,
}

#[derive(Serialize)]
struct ColorDataResponse {
    color_data: Vec<GeneratedFrame>,
}

// ─── System ───

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ─── Auth ───

async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>, ServerError> {
    let token = state.auth.login(&form.username, &form.password).await?;
    Ok(Json(TokenResponse {
        access_token: token,
        token_type: "bearer",
    }))
}

async fn users_me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Identity>, ServerError> {
    let identity = state.auth.resolve_active(&headers).await?;
    Ok(Json(identity))
}

// ─── Index views ───

async fn timelist_all(
    State(state): State<AppState>,
) -> Result<Json<TimelistResponse>, ServerError> {
    let entries = {
        let db = state.db.lock().await;
        db.list_versions(None)?
    };
    Ok(Json(TimelistResponse {
        list: sort_all_index(entries),
    }))
}

async fn timelist_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<TimelistResponse>, ServerError> {
    let entries = {
        let db = state.db.lock().await;
        db.list_versions(Some(&username))?
    };
    Ok(Json(TimelistResponse {
        list: sort_user_index(entries, &username),
    }))
}

// ─── Snapshots ───

async fn get_snapshot(
    State(state): State<AppState>,
    Path((username, version)): Path<(String, String)>,
) -> Result<Json<Snapshot>, ServerError> {
    let query = VersionQuery::parse(&version);
    let db = state.db.lock().await;
    let snapshot = db
        .get_snapshot(&username, &query)
        .map_err(|e| user_not_found(e, &username))?;
    Ok(Json(snapshot))
}

async fn get_player_chunk(
    State(state): State<AppState>,
    Path((username, version, player, chunk)): Path<(String, String, usize, usize)>,
) -> Result<Json<ChunkResponse>, ServerError> {
    let query = VersionQuery::parse(&version);
    let snapshot = {
        let db = state.db.lock().await;
        db.get_snapshot(&username, &query)
            .map_err(|e| user_not_found(e, &username))?
    };

    let frames = read_chunk(&snapshot, player, chunk)?;
    Ok(Json(ChunkResponse {
        player_data: frames.to_vec(),
    }))
}

async fn get_player_track(
    State(state): State<AppState>,
    Path((username, version, player)): Path<(String, String, usize)>,
) -> Result<Json<PlayerTrackResponse>, ServerError> {
    let query = VersionQuery::parse(&version);
    let snapshot = {
        let db = state.db.lock().await;
        db.get_snapshot(&username, &query)
            .map_err(|e| user_not_found(e, &username))?
    };

    let track = snapshot
        .players
        .into_iter()
        .nth(player)
        .ok_or_else(|| ServerError::NotFound("no such player".to_string()))?;
    Ok(Json(PlayerTrackResponse { color_data: track }))
}

async fn upload_snapshot(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<SnapshotUpload>,
) -> Result<Json<UploadResponse>, ServerError> {
    let identity = state.auth.resolve_active(&headers).await?;

    let snapshot = Snapshot {
        user: identity.username.clone(),
        update_time: current_update_time(),
        players: body.players,
    };

    let db = state.db.lock().await;
    if let Some(candidate) = db.snapshot_eviction_candidate(&snapshot.user, state.retention)? {
        if state.config.retention_enforce {
            db.delete_snapshot(&snapshot.user, &candidate)?;
            info!(user = %snapshot.user, evicted = %candidate, "Evicted oldest snapshot");
        } else {
            warn!(
                user = %snapshot.user,
                candidate = %candidate,
                "Retention cap reached; oldest snapshot identified but not evicted"
            );
        }
    }
    db.insert_snapshot(&snapshot)?;

    info!(
        user = %snapshot.user,
        update_time = %snapshot.update_time,
        players = snapshot.players.len(),
        "Snapshot uploaded"
    );

    Ok(Json(UploadResponse {
        message: "upload success d(OvO)y".to_string(),
        update_time: snapshot.update_time,
    }))
}

// ─── Raw saves ───

async fn get_raw(
    State(state): State<AppState>,
    Path((username, version)): Path<(String, String)>,
) -> Result<Json<RawSnapshot>, ServerError> {
    let query = VersionQuery::parse(&version);
    let db = state.db.lock().await;
    let raw = db
        .get_raw(&username, &query)
        .map_err(|e| user_not_found(e, &username))?;
    Ok(Json(raw))
}

async fn upload_raw(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<RawUpload>,
) -> Result<Json<UploadResponse>, ServerError> {
    let identity = state.auth.resolve_active(&headers).await?;

    let raw = RawSnapshot {
        user: identity.username.clone(),
        update_time: current_update_time(),
        raw_data: body.raw_data,
    };

    let db = state.db.lock().await;
    if let Some(candidate) = db.raw_eviction_candidate(&raw.user, state.retention)? {
        if state.config.retention_enforce {
            db.delete_raw(&raw.user, &candidate)?;
            info!(user = %raw.user, evicted = %candidate, "Evicted oldest raw save");
        } else {
            warn!(
                user = %raw.user,
                candidate = %candidate,
                "Retention cap reached; oldest raw save identified but not evicted"
            );
        }
    }
    db.insert_raw(&raw)?;

    info!(user = %raw.user, update_time = %raw.update_time, "Raw data uploaded");

    Ok(Json(UploadResponse {
        message: "raw data upload success d(OuO)y".to_string(),
        update_time: raw.update_time,
    }))
}

// ─── Music ───

async fn music_upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, ServerError> {
    let identity = state.auth.resolve_active(&headers).await?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::Validation(format!("Multipart error: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        if field.content_type() != Some("audio/mpeg") {
            return Err(ServerError::UnsupportedMedia(
                "File must be an MP3".to_string(),
            ));
        }
        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| ServerError::Validation("Missing filename".to_string()))?;
        let data = field
            .bytes()
            .await
            .map_err(|e| ServerError::Validation(format!("Failed to read field: {e}")))?;

        state.music.save(&identity.username, &filename, &data).await?;

        info!(
            user = %identity.username,
            file = %filename,
            size = data.len(),
            "Music uploaded"
        );

        return Ok(Json(serde_json::json!({
            "info": format!("file '{}' saved for '{}'", filename, identity.username),
        })));
    }

    Err(ServerError::Validation(
        "Missing 'file' field in multipart form".to_string(),
    ))
}

async fn music_list_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<MusicListResponse>, ServerError> {
    let files = state.music.list(&username).await?;
    Ok(Json(MusicListResponse {
        music_list: files,
        message: format!("get music list for '{username}'"),
    }))
}

async fn music_list_all(
    State(state): State<AppState>,
) -> Result<Json<AllMusicListsResponse>, ServerError> {
    let lists = state.music.list_all().await?;
    Ok(Json(AllMusicListsResponse {
        music_lists: lists,
        message: "Retrieved all music lists",
    }))
}

async fn music_download(
    State(state): State<AppState>,
    Path((username, filename)): Path<(String, String)>,
) -> Result<impl IntoResponse, ServerError> {
    let data = state.music.read(&username, &filename).await?;

    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{filename}\""))
        .map_err(|_| ServerError::Validation("Invalid filename".to_string()))?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("audio/mpeg")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        data,
    ))
}

// ─── Generators ───

async fn generate_test(
    Query(params): Query<TestGeneratorParams>,
) -> Result<Json<ColorDataResponse>, ServerError> {
    validate_count(params.cnt)?;
    let color_data = match params.chunk {
        Some(chunk) => test_lightlist_chunk(params.cnt, chunk),
        None => test_lightlist(params.cnt),
    };
    Ok(Json(ColorDataResponse { color_data }))
}

async fn generate_random(
    Query(params): Query<RandGeneratorParams>,
) -> Result<Json<ColorDataResponse>, ServerError> {
    validate_count(params.cnt)?;
    Ok(Json(ColorDataResponse {
        color_data: rand_lightlist(params.cnt, params.seed),
    }))
}

// ─── Entry point ───

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);

    info!(addr = %addr, "Starting HTTP API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

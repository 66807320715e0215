//! The five routes SPEC_FULL.md §6 names. Each handler is a thin adapter
//! from axum's request/response shapes onto the scheduler/registry/queue
//! crates, which already carry the real logic and error taxonomy.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use lecture_auth::extract_bearer_token;
use lecture_core::EntryContext;
use lecture_core::errors::PipelineError;
use lecture_scheduler::Submission;
use lecture_stages::{NotesJob, SummaryJob, VideoJob};

use crate::error::HttpError;
use crate::state::AppState;

pub fn router(state: AppState) -> Router<()> {
    Router::new()
        .route("/process", post(process))
        .route("/status", post(status))
        .route("/existing", post(existing))
        .route("/login", get(login))
        .route("/callback", get(callback))
        .with_state(state)
}

/// Axum's `HeaderMap` keys are case-preserving; `lecture_auth::extract_bearer_token`
/// expects a plain lowercase-keyed map, the same normalization the original
/// source's framework did before handing headers to middleware.
fn headers_to_map(headers: &HeaderMap) -> HashMap<String, String> {
    headers
        .iter()
        .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str().to_ascii_lowercase(), v.to_string())))
        .collect()
}

fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<EntryContext, HttpError> {
    let map = headers_to_map(headers);
    let token = extract_bearer_token(&map).ok_or(lecture_auth::AuthError::MissingToken)?;
    let claims = state.verifier.verify(&token)?;
    Ok(EntryContext::new(claims.sub))
}

#[derive(Debug, Deserialize)]
struct ProcessRequest {
    #[serde(rename = "entryID")]
    entry_id: String,
    title: String,
    transcript: String,
    #[serde(default)]
    notes: bool,
    #[serde(default)]
    summarize: bool,
    #[serde(default, rename = "backgroundVideo")]
    background_video: String,
}

#[derive(Debug, Serialize)]
struct ProcessResponse {
    message: &'static str,
}

async fn process(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<ProcessRequest>,
) -> Result<Response, HttpError> {
    let caller = authenticate(&state, &headers)?;
    let requester_email = caller.user_id.0.clone();

    let submission = Submission {
        entry_id: body.entry_id,
        title: body.title,
        transcript_url: body.transcript,
        notes: body.notes,
        summarize: body.summarize,
        background_video: body.background_video,
        requester: caller.user_id,
        requester_email,
    };

    state.scheduler.submit(submission).await?;
    Ok((StatusCode::OK, Json(ProcessResponse { message: "Job queued successfully" })).into_response())
}

#[derive(Debug, Deserialize)]
struct EntryRequest {
    #[serde(rename = "entryID")]
    entry_id: String,
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    #[serde(rename = "notesStatus")]
    notes_status: u8,
    #[serde(rename = "summarizeStatus")]
    summarize_status: u8,
    #[serde(rename = "videoStatus")]
    video_status: u8,
}

async fn status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<EntryRequest>,
) -> Result<Response, HttpError> {
    authenticate(&state, &headers)?;

    let ctx = lecture_queue::QueueCtx::new(lecture_core::QUEUE_TENANT.to_string());
    let notes = state.queue.inspect::<NotesJob>(ctx.clone(), &format!("note:{}", body.entry_id)).await?;
    let summary = state.queue.inspect::<SummaryJob>(ctx.clone(), &format!("summary:{}", body.entry_id)).await?;
    let video = state.queue.inspect::<VideoJob>(ctx, &format!("video:{}", body.entry_id)).await?;

    Ok((
        StatusCode::OK,
        Json(StatusResponse {
            notes_status: notes.code(),
            summarize_status: summary.code(),
            video_status: video.code(),
        }),
    )
        .into_response())
}

#[derive(Debug, Serialize)]
struct ExistingResponse {
    #[serde(rename = "notesGenerated")]
    notes_generated: bool,
    #[serde(rename = "summaryGenerated")]
    summary_generated: bool,
    #[serde(rename = "videosAvailable")]
    videos_available: Vec<String>,
}

async fn existing(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<EntryRequest>,
) -> Result<Response, HttpError> {
    authenticate(&state, &headers)?;

    let job = state.registry.get_job(&body.entry_id).await?;
    let mut videos_available: Vec<String> = job.videos_available.into_iter().collect();
    videos_available.sort();

    Ok((
        StatusCode::OK,
        Json(ExistingResponse {
            notes_generated: job.notes_generated,
            summary_generated: job.summary_generated,
            videos_available,
        }),
    )
        .into_response())
}

async fn login(State(state): State<AppState>) -> Result<Redirect, HttpError> {
    let (url, _csrf) = state.google.authorize_url();
    Ok(Redirect::temporary(&url))
}

#[derive(Debug, Deserialize)]
struct CallbackQuery {
    code: String,
}

#[derive(Debug, Serialize)]
struct CallbackResponse {
    token: String,
    email: String,
    expiry: chrono::DateTime<chrono::Utc>,
}

async fn callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> Result<Response, HttpError> {
    let profile = state.google.profile_for_code(&query.code).await?;

    if let Some(domain) = &state.allowed_email_domain {
        let matches_hd = profile.hd.as_deref() == Some(domain.as_str());
        let matches_suffix = profile.email.ends_with(&format!("@{domain}"));
        if !matches_hd && !matches_suffix {
            return Err(PipelineError::not_authenticated(format!("{} is outside the allowed domain", profile.email)).into());
        }
    }

    let minted = state
        .token_minter
        .mint(&profile.email, std::time::Duration::from_secs(3600))
        .await?;

    Ok((
        StatusCode::OK,
        Json(CallbackResponse {
            token: minted.token,
            email: profile.email,
            expiry: minted.expiry,
        }),
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::router;
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
    use tower::ServiceExt;

    use lecture_auth::{Claims, JwtVerifier};
    use lecture_queue::backend::memory::MemoryBackend;
    use lecture_queue::QueueAdapter;
    use lecture_registry::InMemoryRegistry;
    use lecture_scheduler::JobScheduler;
    use lecture_stages::{NotesJob, SummaryJob, VideoJob};

    use crate::collaborators::{MintedToken, TokenMinter};
    use crate::oauth::GoogleOAuthClient;
    use crate::state::AppState;

    const SECRET: &str = "test-secret";

    fn bearer_token(sub: &str) -> String {
        let claims = Claims {
            sub: sub.to_string(),
            exp: chrono::Utc::now().timestamp() + 3600,
            iat: None,
            extra: serde_json::Map::new(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap()
    }

    struct StubMinter;

    #[async_trait]
    impl TokenMinter for StubMinter {
        async fn mint(&self, subject: &str, _ttl: std::time::Duration) -> Result<MintedToken, crate::error::HttpError> {
            Ok(MintedToken { token: format!("minted-for-{subject}"), expiry: chrono::Utc::now() })
        }
    }

    async fn state() -> (AppState, Arc<InMemoryRegistry>) {
        let registry = Arc::new(InMemoryRegistry::new());
        let queue = Arc::new(QueueAdapter::new(MemoryBackend::new()));
        queue.register_job::<NotesJob>().await.unwrap();
        queue.register_job::<SummaryJob>().await.unwrap();
        queue.register_job::<VideoJob>().await.unwrap();

        let scheduler = Arc::new(JobScheduler::new(
            registry.clone(),
            queue.clone(),
            5,
            vec!["cdnapi.kaltura.com".to_string()],
        ));

        let state = AppState {
            scheduler,
            registry: registry.clone(),
            queue,
            verifier: Arc::new(JwtVerifier::new(SECRET)),
            google: Arc::new(GoogleOAuthClient::new("id".to_string(), "secret".to_string(), "https://example.com/callback".to_string()).unwrap()),
            token_minter: Arc::new(StubMinter),
            allowed_email_domain: None,
        };
        (state, registry)
    }

    fn json_request(path: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
        let mut builder = Request::post(path).header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    #[tokio::test]
    async fn process_without_bearer_token_is_rejected() {
        let (state, _registry) = state().await;
        let router = router(state);

        let req = json_request(
            "/process",
            None,
            serde_json::json!({
                "entryID": "E1", "title": "T", "transcript": "https://cdnapi.kaltura.com/x",
                "notes": true, "summarize": false, "backgroundVideo": ""
            }),
        );
        let resp = router.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn process_happy_path_queues_notes_job() {
        let (state, registry) = state().await;
        let router = router(state);
        let token = bearer_token("u1");

        let req = json_request(
            "/process",
            Some(&token),
            serde_json::json!({
                "entryID": "E1", "title": "T", "transcript": "https://cdnapi.kaltura.com/x",
                "notes": true, "summarize": true, "backgroundVideo": "subway"
            }),
        );
        let resp = router.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = resp.into_body().collect().await.unwrap().to_bytes();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["message"], "Job queued successfully");

        let job = registry.get_job("E1").await.unwrap();
        assert!(!job.notes_generated);
    }

    #[tokio::test]
    async fn process_rejects_bad_transcript_host_with_400() {
        let (state, registry) = state().await;
        let router = router(state);
        let token = bearer_token("u1");

        let req = json_request(
            "/process",
            Some(&token),
            serde_json::json!({
                "entryID": "E2", "title": "T", "transcript": "https://evil.example/x",
                "notes": true, "summarize": false, "backgroundVideo": ""
            }),
        );
        let resp = router.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(registry.get_job("E2").await.is_err());
    }

    #[tokio::test]
    async fn existing_reports_job_flags_verbatim() {
        let (state, registry) = state().await;
        registry
            .create_job_if_absent("E3", "T", &lecture_core::UserId("u1".to_string()))
            .await
            .unwrap();
        registry.set_notes_generated("E3").await.unwrap();
        let router = router(state);
        let token = bearer_token("u1");

        let req = Request::post("/existing")
            .header("content-type", "application/json")
            .header("authorization", format!("Bearer {token}"))
            .body(Body::from(serde_json::json!({"entryID": "E3"}).to_string()))
            .unwrap();
        let resp = router.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = resp.into_body().collect().await.unwrap().to_bytes();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["notesGenerated"], true);
        assert_eq!(value["summaryGenerated"], false);
        assert_eq!(value["videosAvailable"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn status_reports_not_found_for_unscheduled_entry() {
        let (state, _registry) = state().await;
        let router = router(state);
        let token = bearer_token("u1");

        let req = json_request("/status", Some(&token), serde_json::json!({"entryID": "unknown"}));
        let resp = router.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = resp.into_body().collect().await.unwrap().to_bytes();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["notesStatus"], 0);
        assert_eq!(value["summarizeStatus"], 0);
        assert_eq!(value["videoStatus"], 0);
    }
}

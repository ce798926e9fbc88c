//! HTTP routes: upload form, conversion endpoint, health check.

use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header, HeaderName, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use cueframe_common::CueframeError;
use cueframe_render_engine::{convert_document, Conversion, RenderContext};
use cueframe_subtitle_model::SUPPORTED_EXTENSIONS;
use tracing::{debug, error, info, instrument, warn};

/// Multipart field carrying the subtitle file.
pub const UPLOAD_FIELD: &str = "srt_file";

const INDEX_HTML: &str = include_str!("index.html");

static RENDERED_HEADER: HeaderName = HeaderName::from_static("x-cueframe-rendered");
static SKIPPED_HEADER: HeaderName = HeaderName::from_static("x-cueframe-skipped");
static TOTAL_HEADER: HeaderName = HeaderName::from_static("x-cueframe-total");

/// Shared, read-only state for every request.
#[derive(Clone)]
pub struct AppState {
    pub ctx: Arc<RenderContext>,
}

/// Build the application router.
pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/convert", post(convert))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}

/// A request failure, rendered as a plain-text body.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}

impl From<CueframeError> for ApiError {
    fn from(err: CueframeError) -> Self {
        match err {
            CueframeError::Encoding { .. } => {
                Self::bad_request("Invalid subtitle file encoding. Please use UTF-8.")
            }
            CueframeError::Parse { message } => {
                Self::bad_request(format!("Error parsing subtitles: {message}"))
            }
            err @ CueframeError::EmptyArchive { .. } => {
                Self::new(StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
            }
            other => {
                error!(error = %other, "Conversion failed");
                Self::internal(format!("Conversion failed: {other}"))
            }
        }
    }
}

/// An uploaded subtitle file.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Reject empty bodies and unsupported extensions before any decoding.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.bytes.is_empty() {
            return Err(ApiError::bad_request("Uploaded file is empty"));
        }

        let Some(name) = self.file_name.as_deref().filter(|n| !n.is_empty()) else {
            return Ok(());
        };
        let extension = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension {
            Some(ext) if SUPPORTED_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
            _ => Err(ApiError::bad_request(format!(
                "Unsupported file type {name:?}. Please upload a .srt, .ass or .ssa file."
            ))),
        }
    }
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "font": state.ctx.font_source().to_string(),
    }))
}

#[instrument(skip_all)]
async fn convert(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::new(e.status(), format!("Malformed upload: {}", e.body_text())))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            debug!(field = ?field.name(), "Ignoring multipart field");
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::new(e.status(), format!("Malformed upload: {}", e.body_text())))?;
        upload = Some(Upload {
            file_name,
            bytes: bytes.to_vec(),
        });
        break;
    }

    let Some(upload) = upload else {
        return Err(ApiError::bad_request("No file uploaded"));
    };
    convert_upload(&state, upload).await
}

/// Validate, convert on the blocking pool, and build the download response.
pub async fn convert_upload(state: &AppState, upload: Upload) -> Result<Response, ApiError> {
    upload.validate()?;
    info!(
        file = upload.file_name.as_deref().unwrap_or("<unnamed>"),
        bytes = upload.bytes.len(),
        "Received subtitle upload"
    );

    let ctx = Arc::clone(&state.ctx);
    let conversion = tokio::task::spawn_blocking(move || {
        convert_document(&upload.bytes, upload.file_name.as_deref(), &ctx)
    })
    .await
    .map_err(|e| {
        error!(error = %e, "Conversion task failed");
        ApiError::internal("Conversion task failed")
    })??;

    if !conversion.skipped.is_empty() {
        warn!(
            skipped = conversion.skipped.len(),
            total = conversion.total,
            "Some cues were skipped"
        );
    }
    Ok(archive_response(conversion, state.ctx.config().format.extension()))
}

fn archive_response(conversion: Conversion, extension: &str) -> Response {
    let disposition = format!("attachment; filename=\"subtitles_{extension}.zip\"");
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
            (RENDERED_HEADER.clone(), conversion.rendered.len().to_string()),
            (SKIPPED_HEADER.clone(), conversion.skipped.len().to_string()),
            (TOTAL_HEADER.clone(), conversion.total.to_string()),
        ],
        conversion.archive,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use cueframe_common::RenderConfig;
    use cueframe_render_engine::ResolvedFont;
    use std::io::Cursor;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    const SAMPLE: &str = "1\n00:00:01,000 --> 00:00:02,000\nمرحبا\n\n2\n00:00:03,000 --> 00:00:04,000\n\n";

    fn state() -> AppState {
        let ctx = RenderContext::new(RenderConfig::default(), ResolvedFont::builtin(26.0)).unwrap();
        AppState { ctx: Arc::new(ctx) }
    }

    fn upload(name: &str, bytes: &[u8]) -> Upload {
        Upload {
            file_name: Some(name.to_string()),
            bytes: bytes.to_vec(),
        }
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    #[tokio::test]
    async fn test_successful_conversion_response() {
        let response = convert_upload(&state(), upload("clip.srt", SAMPLE.as_bytes()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], "application/zip");
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "attachment; filename=\"subtitles_tiff.zip\""
        );
        assert_eq!(headers["x-cueframe-rendered"], "1");
        assert_eq!(headers["x-cueframe-skipped"], "1");
        assert_eq!(headers["x-cueframe-total"], "2");

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let zip = zip::ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
        assert_eq!(zip.file_names().collect::<Vec<_>>(), vec!["subtitle_0001.tiff"]);
    }

    #[tokio::test]
    async fn test_invalid_encoding_is_bad_request() {
        let err = convert_upload(&state(), upload("clip.srt", b"1\n\xff\xfe\xfd\n"))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Invalid subtitle file encoding. Please use UTF-8.");
    }

    #[tokio::test]
    async fn test_parse_error_is_bad_request() {
        let err = convert_upload(&state(), upload("clip.srt", b"hello there"))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.message.starts_with("Error parsing subtitles:"));
    }

    #[tokio::test]
    async fn test_all_blank_cues_is_unprocessable() {
        let doc = "1\n00:00:01,000 --> 00:00:02,000\n\n";
        let err = convert_upload(&state(), upload("clip.srt", doc.as_bytes()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        let text = body_text(err.into_response()).await;
        assert!(text.contains("all 1 cue(s) were skipped"));
    }

    #[test]
    fn test_upload_validation() {
        assert!(upload("a.srt", b"x").validate().is_ok());
        assert!(upload("a.ASS", b"x").validate().is_ok());
        assert!(upload("", b"x").validate().is_ok());
        assert_eq!(
            upload("a.srt", b"").validate().unwrap_err().status,
            StatusCode::BAD_REQUEST
        );
        assert!(upload("a.txt", b"x").validate().is_err());
        assert!(upload("srt", b"x").validate().is_err());
    }

    async fn post_multipart(addr: std::net::SocketAddr, field: &str, body: &[u8]) -> String {
        let boundary = "cueframe-test-boundary";
        let mut payload = Vec::new();
        payload.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"clip.srt\"\r\nContent-Type: application/x-subrip\r\n\r\n"
            )
            .as_bytes(),
        );
        payload.extend_from_slice(body);
        payload.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        let mut request = format!(
            "POST /convert HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\nContent-Type: multipart/form-data; boundary={boundary}\r\nContent-Length: {}\r\n\r\n",
            payload.len()
        )
        .into_bytes();
        request.extend_from_slice(&payload);

        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        stream.write_all(&request).await.unwrap();
        let mut response = Vec::new();
        stream.read_to_end(&mut response).await.unwrap();
        String::from_utf8_lossy(&response).into_owned()
    }

    #[tokio::test]
    async fn test_multipart_round_trip_over_http() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(state(), 1024 * 1024);
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let ok = post_multipart(addr, UPLOAD_FIELD, SAMPLE.as_bytes()).await;
        assert!(ok.starts_with("HTTP/1.1 200"), "{ok}");
        assert!(ok.to_ascii_lowercase().contains("x-cueframe-rendered: 1"));

        let missing = post_multipart(addr, "other_field", SAMPLE.as_bytes()).await;
        assert!(missing.starts_with("HTTP/1.1 400"), "{missing}");
        assert!(missing.ends_with("No file uploaded"));
    }
}

use axum::{
    extract::{Multipart, State},
    response::{IntoResponse, Json, Response},
};

use crate::dto::upload_dto::UploadResumeResponse;
use crate::error::Error;
use crate::services::resume_service::{ResumeService, MAX_RESUME_BYTES};
use crate::AppState;

#[axum::debug_handler]
pub async fn upload_resume(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> crate::error::Result<Response> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("resume") {
            continue;
        }

        let filename = field.file_name().unwrap_or("resume").to_string();
        let content_type = field.content_type().map(|c| c.to_string());
        let kind = ResumeService::detect_kind(&filename, content_type.as_deref())
            .ok_or_else(|| {
                Error::BadRequest("Unsupported file type. Upload a PDF or DOCX.".to_string())
            })?;

        let data = field.bytes().await?;
        if data.is_empty() {
            return Err(Error::BadRequest("Uploaded file is empty".to_string()));
        }
        if data.len() > MAX_RESUME_BYTES {
            return Err(Error::BadRequest(
                "File too large; the limit is 10MB".to_string(),
            ));
        }

        let parsed = state.resume_service.ingest(kind, &data).await?;
        return Ok(Json(UploadResumeResponse {
            ok: true,
            fields: parsed.fields,
            text: parsed.text,
            file_id: parsed.file_id,
        })
        .into_response());
    }

    Err(Error::BadRequest("No file uploaded".to_string()))
}

use axum::{
    extract::{Extension, Multipart, Path, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_models::appointment::Document;
use shared_models::auth::{Role, User};
use shared_models::error::AppError;
use shared_utils::extractor::require_role;

use crate::models::UploadedFile;
use crate::services::document::DocumentService;
use crate::DocumentCellState;

/// POST /appointments/{id}/documents - multipart field `documents`.
pub async fn upload_documents(
    State(state): State<DocumentCellState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<Vec<Document>>, AppError> {
    require_role(&user, Role::Doctor)?;

    let files = read_document_batch(multipart).await?;
    debug!(
        "Doctor {} uploading {} files to appointment {}",
        user.id,
        files.len(),
        appointment_id
    );

    let service = DocumentService::new(&state);
    let documents = service
        .upload_documents(appointment_id, files, auth.token())
        .await?;

    Ok(Json(documents))
}

/// DELETE /appointments/{id}/documents/{key}
pub async fn delete_document(
    State(state): State<DocumentCellState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path((appointment_id, storage_key)): Path<(Uuid, String)>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, Role::Doctor)?;

    let service = DocumentService::new(&state);
    service
        .delete_document(appointment_id, &storage_key, auth.token())
        .await?;

    Ok(Json(json!({ "success": true })))
}

async fn read_document_batch(mut multipart: Multipart) -> Result<Vec<UploadedFile>, AppError> {
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::ValidationError(format!("File upload failed: {}", e)))?
    {
        if field.name() != Some("documents") {
            continue;
        }

        let filename = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::ValidationError(format!("File upload failed: {}", e)))?;

        files.push(UploadedFile {
            filename,
            content_type,
            bytes,
        });
    }

    Ok(files)
}

use axum::{Json, extract::Multipart, extract::State, response::IntoResponse};
use tracing::{error, info};

use trove_types::api::UploadResponse;

use crate::AppState;

const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// Store a listing image and return its relative path. Saving is best
/// effort: bad extension, missing field, or a write failure all come back
/// as an empty `image_url`, never as an error response.
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let image_url = match save_first_image(&state, &mut multipart).await {
        Ok(Some(path)) => path,
        Ok(None) => String::new(),
        Err(e) => {
            error!("Image upload failed: {}", e);
            String::new()
        }
    };

    Json(UploadResponse { image_url })
}

async fn save_first_image(
    state: &AppState,
    multipart: &mut Multipart,
) -> anyhow::Result<Option<String>> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("image") {
            continue;
        }

        let Some(extension) = field
            .file_name()
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext.to_lowercase())
            .filter(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
        else {
            return Ok(None);
        };

        let data = field.bytes().await?;
        if data.is_empty() {
            return Ok(None);
        }

        let filename = format!("{}.{}", hex::encode(rand::random::<[u8; 8]>()), extension);
        let path = state.upload_dir.join(&filename);
        tokio::fs::write(&path, &data).await?;

        info!("Stored upload {} ({} bytes)", path.display(), data.len());
        return Ok(Some(format!("uploads/{filename}")));
    }

    Ok(None)
}

use axum::{extract::State, Json};
use tracing::{info, warn};
use uuid::Uuid;

use super::{owned_history, owned_project, AppState};
use crate::auth::AuthUser;
use crate::error::{ApiError, ApiJson, ApiResponse};
use crate::models::{GenerateRequest, GenerateResponse, ImageResponse, InpaintRequest, NewHistory, UpscaleRequest};
use crate::provider::ImageData;
use crate::validation::{validate_generate, validate_inpaint, validate_upscale};

async fn save_image(state: &AppState, image: &ImageData, dir: &str) -> Result<String, ApiError> {
    let path = format!("{dir}/{}.{}", Uuid::new_v4(), image.extension());
    Ok(state.storage.upload(image.bytes.clone(), &path, &image.mime_type).await?)
}

/// Best-effort removal of files written earlier in a request that failed.
async fn discard_saved(state: &AppState, urls: &[String]) {
    for url in urls {
        let Some(path) = state.storage.path_from_url(url) else { continue };
        if let Err(e) = state.storage.delete(&path).await {
            warn!("Could not clean up {}: {}", path, e);
        }
    }
}

/// Saves every image or none: on error the files already written are removed.
async fn save_all(state: &AppState, images: &[ImageData], dir: &str) -> Result<Vec<String>, ApiError> {
    let mut urls = Vec::with_capacity(images.len());
    for image in images {
        match save_image(state, image, dir).await {
            Ok(url) => urls.push(url),
            Err(e) => {
                discard_saved(state, &urls).await;
                return Err(e);
            }
        }
    }
    Ok(urls)
}

/// Reads an image given either as one of our storage URLs or as a data URL.
async fn load_image(state: &AppState, source: &str) -> Result<ImageData, ApiError> {
    match state.storage.path_from_url(source) {
        Some(path) => Ok(ImageData::sniff(state.storage.download(&path).await?)),
        None => Ok(ImageData::from_data_url(source)?),
    }
}

/// Nothing is written to storage until the provider has produced images.
pub async fn generate(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(body): ApiJson<GenerateRequest>,
) -> Result<Json<ApiResponse<GenerateResponse>>, ApiError> {
    let (mode, count) = validate_generate(&body, state.max_images_per_request)?;
    let project = owned_project(&state, &user, body.project_id)?;

    let inputs = body
        .input_images
        .iter()
        .map(|source| ImageData::from_data_url(source))
        .collect::<Result<Vec<_>, _>>()?;

    let mut provider_inputs = inputs.clone();
    if let Some(reference_id) = body.reference_history_id {
        let reference = owned_history(&state, &user, reference_id)?;
        let previous = reference
            .output_images
            .first()
            .ok_or_else(|| ApiError::Validation("Referenced generation has no output images.".into()))?;
        provider_inputs.insert(0, load_image(&state, previous).await?);
        info!("📎 Using history {} as the previous result", reference_id);
    }

    let images = state.generator.generate(mode, &body.settings, &provider_inputs, count).await?;

    let input_urls = save_all(&state, &inputs, &format!("{}/{}/inputs", user.0.id, project.id)).await?;
    let output_urls = match save_all(&state, &images, &format!("{}/{}/outputs", user.0.id, project.id)).await {
        Ok(urls) => urls,
        Err(e) => {
            discard_saved(&state, &input_urls).await;
            return Err(e);
        }
    };

    let settings = crate::prompt::GenerationSettings { input_images: input_urls.clone(), ..body.settings };
    let history = state.store.create_history(NewHistory {
        project_id: project.id,
        mode,
        input_images: input_urls,
        output_images: output_urls.clone(),
        settings,
    });
    info!("✅ Generation {} stored with {} image(s)", history.id, output_urls.len());

    Ok(Json(ApiResponse::ok(GenerateResponse { images: output_urls, history_id: history.id })))
}

pub async fn inpaint(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(body): ApiJson<InpaintRequest>,
) -> Result<Json<ApiResponse<ImageResponse>>, ApiError> {
    validate_inpaint(&body)?;
    let image = load_image(&state, &body.image_url).await?;
    let mask = ImageData::from_data_url(&body.mask_data)?;

    let result = state.generator.inpaint(image, mask, body.edit_type, &body.instruction).await?;
    let result_image = save_image(&state, &result, &format!("{}/inpaint", user.id)).await?;
    Ok(Json(ApiResponse::ok(ImageResponse { result_image })))
}

pub async fn upscale(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(body): ApiJson<UpscaleRequest>,
) -> Result<Json<ApiResponse<ImageResponse>>, ApiError> {
    validate_upscale(&body)?;
    let image = load_image(&state, &body.image_url).await?;

    let result = state
        .generator
        .upscale(image, body.target_resolution, body.transparent_background)
        .await?;
    let result_image = save_image(&state, &result, &format!("{}/upscale", user.id)).await?;
    Ok(Json(ApiResponse::ok(ImageResponse { result_image })))
}

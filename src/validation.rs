//! Request checks run before anything reaches the store or the prompt builder.
//!
//! The prompt builder is total and will happily render unknown option keys;
//! these checks keep such values out of the HTTP surface.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ApiError;
use crate::models::{
    CreateProjectRequest, GenerateRequest, InpaintRequest, SignInRequest, SignUpRequest, UpdateProfileRequest,
    UpdateProjectRequest, UpscaleRequest,
};
use crate::prompt::{ColorSettings, GenerationMode, GenerationSettings};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());
static HEX_COLOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").unwrap());
static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^https?://\S+$").unwrap());

pub const UPSCALE_RESOLUTIONS: [u32; 2] = [2048, 4096];

fn invalid(message: &str) -> ApiError {
    ApiError::Validation(message.to_string())
}

fn check_name(name: &str) -> Result<(), ApiError> {
    match name.trim().chars().count() {
        0..=1 => Err(invalid("Name must be at least 2 characters.")),
        2..=50 => Ok(()),
        _ => Err(invalid("Name cannot exceed 50 characters.")),
    }
}

fn check_project_fields(name: Option<&str>, description: Option<&str>) -> Result<(), ApiError> {
    if let Some(name) = name {
        match name.trim().chars().count() {
            0 => return Err(invalid("Project name is required.")),
            1..=100 => {}
            _ => return Err(invalid("Project name cannot exceed 100 characters.")),
        }
    }
    if description.is_some_and(|d| d.chars().count() > 500) {
        return Err(invalid("Description cannot exceed 500 characters."));
    }
    Ok(())
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

pub fn is_hex_color(value: &str) -> bool {
    HEX_COLOR_RE.is_match(value)
}

pub fn validate_sign_up(request: &SignUpRequest) -> Result<(), ApiError> {
    if !is_valid_email(&request.email) {
        return Err(invalid("Invalid email address."));
    }
    if request.password.chars().count() < 8 {
        return Err(invalid("Password must be at least 8 characters."));
    }
    let has_letter = request.password.chars().any(|c| c.is_ascii_alphabetic());
    let has_digit = request.password.chars().any(|c| c.is_ascii_digit());
    if !(has_letter && has_digit) {
        return Err(invalid("Password must contain letters and numbers."));
    }
    check_name(&request.name)
}

pub fn validate_sign_in(request: &SignInRequest) -> Result<(), ApiError> {
    if !is_valid_email(&request.email) {
        return Err(invalid("Invalid email address."));
    }
    if request.password.is_empty() {
        return Err(invalid("Password is required."));
    }
    Ok(())
}

pub fn validate_profile_update(request: &UpdateProfileRequest) -> Result<(), ApiError> {
    if let Some(name) = &request.name {
        check_name(name)?;
    }
    if request.profile_image.as_deref().is_some_and(|url| !URL_RE.is_match(url)) {
        return Err(invalid("Profile image must be a valid URL."));
    }
    Ok(())
}

pub fn validate_create_project(request: &CreateProjectRequest) -> Result<(), ApiError> {
    check_project_fields(Some(&request.name), request.description.as_deref())
}

pub fn validate_update_project(request: &UpdateProjectRequest) -> Result<(), ApiError> {
    check_project_fields(request.name.as_deref(), request.description.as_deref())
}

/// Rejects option keys the prompt builder would otherwise pass through raw.
pub fn validate_settings(settings: &GenerationSettings) -> Result<(), ApiError> {
    if let Some(material) = &settings.material {
        if !material.kind.is_known() {
            return Err(ApiError::Validation(format!("Unknown material type: {}", material.kind.as_str())));
        }
    }
    if let Some(ColorSettings::Custom { custom_color }) = &settings.color {
        if !is_hex_color(custom_color) {
            return Err(invalid("Custom color must be a hex code like #AABBCC."));
        }
    }
    if let Some(viewpoint) = &settings.viewpoint {
        if !viewpoint.is_known() {
            return Err(ApiError::Validation(format!("Unknown viewpoint: {}", viewpoint.as_str())));
        }
    }
    Ok(())
}

/// Returns the parsed mode and the effective image count.
pub fn validate_generate(request: &GenerateRequest, max_images: usize) -> Result<(GenerationMode, usize), ApiError> {
    let mode = GenerationMode::parse_known(&request.mode)
        .ok_or_else(|| ApiError::Validation(format!("Unknown generation mode: {}", request.mode)))?;

    if request.input_images.is_empty() || request.input_images.iter().any(|i| i.trim().is_empty()) {
        return Err(invalid("At least one input image is required."));
    }

    let count = request.count.unwrap_or(1);
    if count == 0 || count > max_images {
        return Err(ApiError::Validation(format!("Image count must be between 1 and {max_images}.")));
    }

    validate_settings(&request.settings)?;
    Ok((mode, count))
}

pub fn validate_inpaint(request: &InpaintRequest) -> Result<(), ApiError> {
    if request.image_url.trim().is_empty() {
        return Err(invalid("Image URL is required."));
    }
    if request.mask_data.trim().is_empty() {
        return Err(invalid("Mask data is required."));
    }
    if request.instruction.trim().is_empty() {
        return Err(invalid("Edit instruction is required."));
    }
    Ok(())
}

pub fn validate_upscale(request: &UpscaleRequest) -> Result<(), ApiError> {
    if request.image_url.trim().is_empty() {
        return Err(invalid("Image URL is required."));
    }
    if !UPSCALE_RESOLUTIONS.contains(&request.target_resolution) {
        return Err(invalid("Target resolution must be 2048 or 4096."));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::{MaterialKind, MaterialSettings, Viewpoint};
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    fn sign_up(email: &str, password: &str, name: &str) -> SignUpRequest {
        SignUpRequest { email: email.into(), password: password.into(), name: name.into() }
    }

    fn generate(mode: &str, count: Option<usize>) -> GenerateRequest {
        GenerateRequest {
            project_id: Uuid::new_v4(),
            mode: mode.into(),
            input_images: vec!["data:image/png;base64,AAAA".into()],
            settings: GenerationSettings::default(),
            count,
            reference_history_id: None,
        }
    }

    #[test]
    fn sign_up_rules() {
        assert!(validate_sign_up(&sign_up("a@b.co", "abcdefg1", "Al")).is_ok());
        assert!(validate_sign_up(&sign_up("not-an-email", "abcdefg1", "Al")).is_err());
        assert!(validate_sign_up(&sign_up("a@b.co", "abc1", "Al")).is_err());
        assert!(validate_sign_up(&sign_up("a@b.co", "abcdefgh", "Al")).is_err());
        assert!(validate_sign_up(&sign_up("a@b.co", "12345678", "Al")).is_err());
        assert!(validate_sign_up(&sign_up("a@b.co", "abcdefg1", "A")).is_err());
        assert!(validate_sign_up(&sign_up("a@b.co", "abcdefg1", &"n".repeat(51))).is_err());
    }

    #[test]
    fn project_rules() {
        let mut request = CreateProjectRequest {
            name: "Mugs".into(),
            description: None,
            category: Default::default(),
            ip_character: None,
        };
        assert!(validate_create_project(&request).is_ok());

        request.name = "   ".into();
        assert!(validate_create_project(&request).is_err());

        request.name = "Mugs".into();
        request.description = Some("d".repeat(501));
        assert!(validate_create_project(&request).is_err());

        assert!(validate_update_project(&UpdateProjectRequest::default()).is_ok());
        assert!(validate_update_project(&UpdateProjectRequest { name: Some("x".repeat(101)), ..Default::default() }).is_err());
    }

    #[test]
    fn profile_image_must_be_a_url() {
        let ok = UpdateProfileRequest { profile_image: Some("https://cdn.example.com/me.png".into()), ..Default::default() };
        assert!(validate_profile_update(&ok).is_ok());
        let bad = UpdateProfileRequest { profile_image: Some("me.png".into()), ..Default::default() };
        assert!(validate_profile_update(&bad).is_err());
    }

    #[test]
    fn generate_defaults_count_and_parses_mode() {
        assert_eq!(validate_generate(&generate("sketch_to_mockup", None), 4).unwrap(), (GenerationMode::SketchToMockup, 1));
        assert_eq!(validate_generate(&generate("history_based", Some(4)), 4).unwrap().1, 4);
    }

    #[test]
    fn generate_rejections() {
        assert!(validate_generate(&generate("watercolor", None), 4).is_err());
        assert!(validate_generate(&generate("ip_replacement", Some(0)), 4).is_err());
        assert!(validate_generate(&generate("ip_replacement", Some(5)), 4).is_err());

        let mut no_images = generate("ip_replacement", None);
        no_images.input_images.clear();
        assert!(validate_generate(&no_images, 4).is_err());
    }

    #[test]
    fn settings_reject_unknown_keys_and_bad_hex() {
        let unknown_material = GenerationSettings {
            material: Some(MaterialSettings { kind: MaterialKind::Unrecognized("bronze".into()), custom_description: None }),
            ..Default::default()
        };
        assert!(validate_settings(&unknown_material).is_err());

        let unknown_view = GenerationSettings { viewpoint: Some(Viewpoint::Unrecognized("dutch".into())), ..Default::default() };
        assert!(validate_settings(&unknown_view).is_err());

        for (color, ok) in [("#A1b2C3", true), ("A1B2C3", false), ("#A1B2C", false), ("#GGGGGG", false)] {
            let settings = GenerationSettings {
                color: Some(ColorSettings::Custom { custom_color: color.into() }),
                ..Default::default()
            };
            assert_eq!(validate_settings(&settings).is_ok(), ok, "{color}");
        }

        let from_character = GenerationSettings { color: Some(ColorSettings::FromCharacter), ..Default::default() };
        assert!(validate_settings(&from_character).is_ok());
    }

    #[test]
    fn upscale_and_inpaint_rules() {
        let upscale = |resolution| UpscaleRequest { image_url: "x".into(), target_resolution: resolution, transparent_background: false };
        assert!(validate_upscale(&upscale(2048)).is_ok());
        assert!(validate_upscale(&upscale(4096)).is_ok());
        assert!(validate_upscale(&upscale(1024)).is_err());

        let inpaint = InpaintRequest {
            image_url: "x".into(),
            mask_data: "m".into(),
            edit_type: crate::prompt::EditType::Shape,
            instruction: " ".into(),
        };
        assert!(validate_inpaint(&inpaint).is_err());
    }
}

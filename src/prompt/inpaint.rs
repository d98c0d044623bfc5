use serde::{Deserialize, Serialize};

/// Category of a masked, localized edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditType {
    Material,
    Color,
    Shape,
    AddDetail,
}

impl EditType {
    #[cfg(test)]
    pub const ALL: [EditType; 4] = [EditType::Material, EditType::Color, EditType::Shape, EditType::AddDetail];

    fn task(&self) -> &'static str {
        match self {
            EditType::Material => "Modify the material of the selected masked area to match the user's instruction. \
                The new material should blend seamlessly with the surrounding areas, maintaining consistent lighting and shadows.",
            EditType::Color => "Change the color of the selected masked area to match the user's instruction. \
                The new color should appear natural and manufactured, not painted or digitally altered, with proper material interaction.",
            EditType::Shape => "Modify the shape of the selected masked area according to the user's instruction. \
                The modification should look like it was designed this way from the start, with natural transitions to surrounding areas.",
            EditType::AddDetail => "Add the specified detail to the selected masked area. \
                The new detail should appear as an original part of the product design, with appropriate material properties and lighting.",
        }
    }
}

const INTEGRATION_REQUIREMENTS: &str = "[INTEGRATION REQUIREMENTS]\n\
    - Maintain perfect consistency with the unmasked areas\n\
    - Match the existing lighting direction and intensity\n\
    - Preserve the same material properties and surface quality\n\
    - Ensure seamless blending at mask boundaries\n\
    - The edit should be undetectable - it should look original";

const INPAINT_QUALITY: &str = "[QUALITY]\n\
    High quality, seamless integration, professional product photography appearance.";

/// Localized-edit prompt. `instruction` is embedded verbatim.
pub fn build_inpaint_prompt(edit_type: EditType, instruction: &str) -> String {
    format!(
        "[INPAINTING TASK]\n{}\n\n[USER INSTRUCTION]\n{instruction}\n\n{INTEGRATION_REQUIREMENTS}\n\n{INPAINT_QUALITY}",
        edit_type.task()
    )
}

/// High-resolution regeneration prompt used in place of a native upscaler.
pub fn build_upscale_prompt(resolution: u32, transparent_background: bool) -> String {
    let mut prompt = format!(
        "Recreate this exact image at {resolution}x{resolution} resolution.\n\
         Maintain all details exactly as they are. High quality, sharp, professional."
    );
    if transparent_background {
        prompt.push_str("\nKeep the background fully transparent (alpha channel), with no background elements.");
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inpaint_prompt_embeds_edit_phrase_and_instruction() {
        let cases = [
            (EditType::Material, "switch to brushed metal", "material of the selected masked area"),
            (EditType::Color, "make it red", "color of the selected masked area"),
            (EditType::Shape, "round the handle more", "shape of the selected masked area"),
            (EditType::AddDetail, "add a logo", "Add the specified detail"),
        ];

        for (edit_type, instruction, expected) in cases {
            let prompt = build_inpaint_prompt(edit_type, instruction);
            assert!(prompt.starts_with("[INPAINTING TASK]\n"));
            assert!(prompt.contains(expected), "{edit_type:?}");
            assert!(prompt.contains(&format!("[USER INSTRUCTION]\n{instruction}\n")));
            assert!(prompt.contains("[INTEGRATION REQUIREMENTS]"));
            assert!(prompt.contains("seamless"));
            assert!(prompt.ends_with("professional product photography appearance."));
        }
    }

    #[test]
    fn instruction_is_passed_through_untouched() {
        let instruction = "  {color} [QUALITY]\n손잡이를 더 둥글게 <b>now</b>  ";
        let prompt = build_inpaint_prompt(EditType::Shape, instruction);
        assert!(prompt.contains(instruction));
    }

    #[test]
    fn edit_types_deserialize_from_snake_case() {
        let parsed: Vec<EditType> =
            serde_json::from_str(r#"["material","color","shape","add_detail"]"#).unwrap();
        assert_eq!(parsed, EditType::ALL);
    }

    #[test]
    fn upscale_prompt_names_resolution_and_background() {
        let plain = build_upscale_prompt(2048, false);
        assert!(plain.starts_with("Recreate this exact image at 2048x2048 resolution.\nMaintain"));
        assert!(!plain.contains("alpha channel"));

        let transparent = build_upscale_prompt(4096, true);
        assert!(transparent.contains("4096x4096"));
        assert!(transparent.contains("alpha channel"));
    }
}

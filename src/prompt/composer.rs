//! Section assembly shared by every generation mode.
//!
//! Each mode is a [`ModeTemplate`]: a table of fully labelled section texts.
//! [`compose`] decides which sections appear based on the settings; the
//! template only decides the wording. Templates may carry one placeholder
//! (`{requirements}`, `{color}` or `{viewpoint}`) that is filled at build time.

use super::lexicon::{material_requirements, viewpoint_description};
use super::settings::{ColorSettings, GenerationMode, GenerationSettings, Priority};

pub(crate) struct ModeTemplate {
    pub task: &'static str,
    pub preservation: &'static str,
    pub application: &'static str,
    pub material: &'static str,
    pub color_from_character: &'static str,
    pub color_custom: &'static str,
    pub camera: &'static str,
    pub priority_structure: &'static str,
    pub priority_style: &'static str,
    pub deformation: &'static str,
    pub background: &'static str,
    pub quality: &'static str,
}

const IP_REPLACEMENT: ModeTemplate = ModeTemplate {
    task: "[TASK INSTRUCTION]\n\
        Create a new professional product photograph by combining the elements from the provided images. \
        This is an IP (Intellectual Property) character replacement task.",
    preservation: "[PRODUCT PRESERVATION - CRITICAL]\n\
        Take the EXACT product structure, shape, pose, and form from Image 1 (the product image). \
        The product's physical structure must remain COMPLETELY UNCHANGED:\n\
        - Same overall shape and silhouette - do not modify the product's outline\n\
        - Same product dimensions and proportions - maintain exact size relationships\n\
        - Same functional elements (openings, handles, lids, buttons, etc.)\n\
        - Same pose and orientation in 3D space\n\
        - Same lighting setup, shadows, and reflections\n\
        - The product form is geometrically identical to the input product image",
    application: "[CHARACTER APPLICATION]\n\
        Apply the character design from Image 2 (the character reference) onto this product:\n\
        - Replace ONLY the character/face/design elements, not the product structure\n\
        - The character's face should be adapted to fit the product's existing face area naturally\n\
        - Maintain the character's key identifying features (eye shape, color, expression, distinctive marks)\n\
        - The character's proportions should be adjusted to match the product's form factor\n\
        - Colors from the character should be applied to the product while maintaining material properties",
    material: "[MATERIAL SPECIFICATION]\n{requirements}",
    color_from_character: "[COLOR APPLICATION]\n\
        Extract the primary and secondary colors from the character reference image. \
        Apply these colors to the product body and details while maintaining the specified material properties. \
        The color should appear as if the product was manufactured in these colors, not painted or digitally altered.",
    color_custom: "[COLOR APPLICATION]\n\
        Apply the custom color {color} to the product body. \
        The color should appear as if the product was manufactured in this color, not painted or digitally altered, \
        maintaining proper material reflections and depth for the specified material type.",
    camera: "[CAMERA ANGLE]\n{viewpoint}",
    priority_structure: "[PRIORITY INSTRUCTION - STRUCTURE PRESERVATION]\n\
        HIERARCHY OF PRESERVATION (in order of importance):\n\
        1. Product physical structure and shape - NEVER change under any circumstances\n\
        2. Product material and texture - maintain exactly as specified\n\
        3. Product functional elements - keep all intact and functional-looking\n\
        4. Character key features - adapt to fit product while keeping recognizable\n\
        5. Color scheme - apply character's colors while respecting material properties",
    priority_style: "[PRIORITY INSTRUCTION - STYLE MATCHING]\n\
        HIERARCHY OF PRESERVATION (in order of importance):\n\
        1. Character style and aesthetic - copy exactly, this is the primary goal\n\
        2. Product physical structure - maintain the general form\n\
        3. Style elements - transfer all stylistic choices from the reference\n\
        4. Color scheme - match the character's color palette precisely\n\
        5. Material appearance - adjust to support the character's visual style",
    deformation: "[DEFORMATION CONTROL]\n\
        The character's core proportions and silhouette must remain recognizable. \
        Do not stretch, squash, or distort the character's features beyond what is necessary to fit the product form naturally.",
    background: "[BACKGROUND SPECIFICATION]\n\
        Generate the image with a completely transparent background (alpha channel). \
        The output should show only the product with no background elements, suitable for compositing onto any surface.",
    quality: "[QUALITY REQUIREMENTS]\n\
        Generate a photorealistic product mockup with:\n\
        - Professional studio lighting with soft shadows\n\
        - High resolution suitable for e-commerce and catalog use\n\
        - Natural shadows and reflections appropriate for the material\n\
        - Clean, commercial-quality finish\n\
        - The final image should look like an actual manufactured product photograph, not a digital composite or 3D render",
};

const SKETCH_TO_MOCKUP: ModeTemplate = ModeTemplate {
    task: "[TASK INSTRUCTION]\n\
        Transform this 2D design sketch into a photorealistic product mockup. \
        The goal is to visualize how this design would look as an actual manufactured product.",
    preservation: "[DESIGN INTERPRETATION]\n\
        Analyze the provided sketch carefully and identify:\n\
        - The overall product shape and silhouette\n\
        - Character design elements and their intended appearance\n\
        - Proportions and spatial relationships between elements\n\
        - Intended material and finish (if suggested by the drawing style)\n\
        - Color indications or suggestions in the sketch",
    application: "[PRODUCT REALIZATION]\n\
        Create a realistic 3D product representation that:\n\
        - Preserves all design details, proportions, and artistic intent from the sketch\n\
        - Translates 2D line work into believable 3D forms with proper depth\n\
        - Adds appropriate material properties and surface details\n\
        - Maintains the character and charm of the original design\n\
        - Looks like a real manufactured item ready for production",
    material: "[MATERIAL SPECIFICATION]\n{requirements}",
    color_from_character: "[COLOR APPLICATION]\n\
        Use the colors suggested or implied in the sketch. \
        If the sketch is in grayscale or limited colors, interpret the intended color scheme based on the character design context.",
    color_custom: "[COLOR APPLICATION]\n\
        Apply the custom color {color} as the primary product color, maintaining the design proportions and material properties. \
        The color should appear as if the product was manufactured in this color, not painted on afterwards.",
    camera: "[CAMERA ANGLE]\n{viewpoint}",
    priority_structure: "[PRIORITY INSTRUCTION - STRUCTURE PRESERVATION]\n\
        HIERARCHY OF PRESERVATION (in order of importance):\n\
        1. Sketch silhouette and proportions - NEVER change under any circumstances\n\
        2. Functional parts drawn in the sketch - realize every one of them\n\
        3. Material and texture - keep believable for mass production\n\
        4. Character details - render faithfully within the drawn form\n\
        5. Color scheme - follow the sketch's indications",
    priority_style: "[PRIORITY INSTRUCTION - STYLE MATCHING]\n\
        HIERARCHY OF PRESERVATION (in order of importance):\n\
        1. Character style and aesthetic of the drawing - carry it into 3D, this is the primary goal\n\
        2. Product physical structure - maintain the general form of the sketch\n\
        3. Style elements - keep line weight, exaggeration and charm visible in the final form\n\
        4. Color scheme - match the sketch's palette precisely\n\
        5. Material appearance - adjust to support the drawing's visual style",
    deformation: "[DESIGN FIDELITY]\n\
        Maintain strict adherence to the sketch's proportions and design intent. \
        The 3D realization should be immediately recognizable as the same design, not a reinterpretation.",
    background: "[BACKGROUND SPECIFICATION]\n\
        Generate the image with a completely transparent background (alpha channel). \
        Show only the product, with no background elements.",
    quality: "[PHOTOREALISTIC RENDERING]\n\
        - Professional product photography lighting (softbox setup creating even, flattering light)\n\
        - Subtle shadows establishing depth and grounding the product\n\
        - Material-appropriate reflections and highlights\n\
        - Clean background suitable for e-commerce presentation\n\
        - High resolution with sharp focus on product details\n\
        - The output should look like a photograph of an actual manufactured product, not a 3D render or digital illustration",
};

const BACKGROUND_COMPOSITE: ModeTemplate = ModeTemplate {
    task: "[TASK INSTRUCTION]\n\
        Create a composite image by integrating the character from Image 2 onto the product shown in Image 1. \
        The result should appear as a factory-original product, not a digitally added design.",
    preservation: "[PRODUCT PRESERVATION - from Image 1]\n\
        The base product structure must remain exactly as shown:\n\
        - Exact product shape, size, and proportions unchanged\n\
        - Same material appearance and surface quality\n\
        - Same lighting and shadow setup\n\
        - Same camera angle and perspective\n\
        - All functional elements intact",
    application: "[CHARACTER INTEGRATION - from Image 2]\n\
        Apply the character design seamlessly onto the product:\n\
        - The character should appear as if it was originally manufactured as part of the product\n\
        - Adjust scale to fit appropriately on the product surface\n\
        - Match lighting and shadows to the original product photo\n\
        - For printed designs: follow the product's surface contours and curvature\n\
        - For 3D elements: add appropriate shadows, depth, and material transitions",
    material: "[MATERIAL SPECIFICATION]\n{requirements}",
    color_from_character: "[COLOR INTEGRATION]\n\
        Extract colors from the character and apply them to the product in a way that looks manufactured, not applied. \
        The colors should appear as original product colors.",
    color_custom: "[COLOR APPLICATION]\n\
        Incorporate the color {color} into the composite design. \
        It should look as if the product was manufactured in this color, not painted afterwards.",
    camera: "[CAMERA ANGLE]\n{viewpoint}",
    priority_structure: "[PRIORITY INSTRUCTION - STRUCTURE PRESERVATION]\n\
        HIERARCHY OF PRESERVATION (in order of importance):\n\
        1. Base product structure from Image 1 - NEVER change under any circumstances\n\
        2. Product material and surface quality - keep exactly as photographed\n\
        3. Lighting and perspective of Image 1 - the character must adapt to them\n\
        4. Character key features - adapt to the product surface while keeping recognizable\n\
        5. Color scheme - blend the character's colors into the product",
    priority_style: "[PRIORITY INSTRUCTION - STYLE MATCHING]\n\
        HIERARCHY OF PRESERVATION (in order of importance):\n\
        1. Character style and aesthetic from Image 2 - copy exactly, this is the primary goal\n\
        2. Product physical structure - maintain the general form of Image 1\n\
        3. Style elements - transfer all stylistic choices from the character\n\
        4. Color scheme - match the character's color palette precisely\n\
        5. Material appearance - adjust to support the character's visual style",
    deformation: "[CHARACTER PRESERVATION]\n\
        Maintain the character's key identifying features and proportions. \
        The character should be immediately recognizable despite being adapted to the product's form.",
    background: "[BACKGROUND SPECIFICATION]\n\
        Generate the final composite with a transparent background (alpha channel) and no background elements.",
    quality: "[OUTPUT QUALITY]\n\
        A seamless product photograph where the character integration looks factory-original, not digitally added. \
        Professional quality suitable for commercial use.",
};

const HISTORY_BASED: ModeTemplate = ModeTemplate {
    task: "[TASK INSTRUCTION]\n\
        Using the successful product mockup from the previous generation as a template, \
        create a new variation with a different character while maintaining complete visual consistency.",
    preservation: "[PRESERVE EXACTLY FROM PREVIOUS RESULT]\n\
        The following elements must be identical to the reference mockup:\n\
        - Product type, shape, and physical form\n\
        - Camera angle, distance, and composition\n\
        - Lighting setup, shadows, and reflections\n\
        - Background and staging elements\n\
        - Overall image quality, resolution, and style\n\
        - Material appearance and texture rendering",
    application: "[CHANGE ONLY]\n\
        - Replace the current character with the new character from the provided reference\n\
        - Apply the new character's distinctive features and color scheme\n\
        - Adapt the character's face and body to fit the same product form\n\
        - The new character should occupy the exact same product space as the original",
    material: "[MATERIAL CONSISTENCY]\n{requirements}\n\
        Maintain exact material appearance from the previous generation.",
    color_from_character: "[COLOR VARIATION]\n\
        Apply the new character's color palette to the product, replacing the previous character's colors. \
        The application method and material interaction should remain identical.",
    color_custom: "[COLOR APPLICATION]\n\
        Apply the color {color} to this variation. \
        It should look manufactured in this color, not painted over the previous result.",
    camera: "[CAMERA ANGLE CONSISTENCY]\nMaintain the same angle: {viewpoint}",
    priority_structure: "[PRIORITY INSTRUCTION - STRUCTURE PRESERVATION]\n\
        HIERARCHY OF PRESERVATION (in order of importance):\n\
        1. Product structure of the previous result - NEVER change under any circumstances\n\
        2. Material and texture rendering - identical to the previous result\n\
        3. Composition, lighting and staging - identical to the previous result\n\
        4. New character key features - adapt to fit the product while keeping recognizable\n\
        5. Color scheme - apply the new character's colors within the same material",
    priority_style: "[PRIORITY INSTRUCTION - STYLE MATCHING]\n\
        HIERARCHY OF PRESERVATION (in order of importance):\n\
        1. New character style and aesthetic - copy exactly, this is the primary goal\n\
        2. Product physical structure - maintain the general form of the previous result\n\
        3. Style elements - transfer all stylistic choices from the new reference\n\
        4. Color scheme - match the new character's color palette precisely\n\
        5. Material appearance - adjust to support the new character's visual style",
    deformation: "[CHARACTER ADAPTATION]\n\
        The new character must be adapted to fit the same product form as the original, \
        maintaining its key identifying features while matching the pose and position of the previous design. \
        Its proportions and silhouette must remain recognizable.",
    background: "[BACKGROUND]\n\
        Maintain transparent background consistent with previous generation. \
        Output with an alpha channel and no background elements.",
    quality: "[CONSISTENCY REQUIREMENTS]\n\
        - The new mockup should look like it belongs to the same product line/series\n\
        - Maintain identical product quality and manufacturing appearance\n\
        - Keep the same photographic style, mood, and commercial appeal\n\
        - This should appear as a product variant in the same catalog series",
};

pub(crate) fn template_for(mode: GenerationMode) -> &'static ModeTemplate {
    match mode {
        GenerationMode::IpReplacement => &IP_REPLACEMENT,
        GenerationMode::SketchToMockup => &SKETCH_TO_MOCKUP,
        GenerationMode::BackgroundComposite => &BACKGROUND_COMPOSITE,
        GenerationMode::HistoryBased => &HISTORY_BASED,
    }
}

/// Joins the sections selected by `settings` with a blank line between them.
pub(crate) fn compose(template: &ModeTemplate, settings: &GenerationSettings) -> String {
    let mut sections: Vec<String> = Vec::with_capacity(12);

    sections.push(template.task.to_string());
    sections.push(template.preservation.to_string());
    sections.push(template.application.to_string());

    if let Some(material) = &settings.material {
        if let Some(requirements) = material_requirements(&material.kind) {
            sections.push(template.material.replace("{requirements}", requirements));
        }
        if let Some(details) = material.custom_description.as_deref().filter(|d| !d.is_empty()) {
            sections.push(format!("Additional material details: {details}"));
        }
    }

    match &settings.color {
        Some(ColorSettings::FromCharacter) => sections.push(template.color_from_character.to_string()),
        Some(ColorSettings::Custom { custom_color }) => {
            sections.push(template.color_custom.replace("{color}", custom_color))
        }
        None => {}
    }

    if let Some(viewpoint) = &settings.viewpoint {
        sections.push(template.camera.replace("{viewpoint}", viewpoint_description(viewpoint)));
    }

    match settings.priority {
        Some(Priority::FixStructure) => sections.push(template.priority_structure.to_string()),
        Some(Priority::CopyStyle) => sections.push(template.priority_style.to_string()),
        None => {}
    }

    if !settings.allow_deformation {
        sections.push(template.deformation.to_string());
    }

    if settings.transparent_background {
        sections.push(template.background.to_string());
    }

    sections.push(template.quality.to_string());
    sections.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(section: &str) -> &str {
        section.lines().next().unwrap_or_default()
    }

    #[test]
    fn every_section_starts_with_a_bracketed_label() {
        for mode in GenerationMode::ALL {
            let t = template_for(mode);
            for section in [
                t.task,
                t.preservation,
                t.application,
                t.material,
                t.color_from_character,
                t.color_custom,
                t.camera,
                t.priority_structure,
                t.priority_style,
                t.deformation,
                t.background,
                t.quality,
            ] {
                let heading = label(section);
                assert!(heading.starts_with('[') && heading.ends_with(']'), "{mode:?}: {heading}");
                assert_eq!(heading, heading.to_uppercase().replace("FROM IMAGE", "from Image"));
            }
        }
    }

    #[test]
    fn placeholders_appear_exactly_once() {
        for mode in GenerationMode::ALL {
            let t = template_for(mode);
            assert_eq!(t.material.matches("{requirements}").count(), 1);
            assert_eq!(t.color_custom.matches("{color}").count(), 1);
            assert_eq!(t.camera.matches("{viewpoint}").count(), 1);
        }
    }

    #[test]
    fn continuation_lines_carry_no_indentation() {
        for mode in GenerationMode::ALL {
            let prompt = compose(template_for(mode), &GenerationSettings::default());
            assert!(!prompt.contains("  "), "{mode:?}");
            assert!(!prompt.contains("\n "), "{mode:?}");
        }
    }

    #[test]
    fn background_and_deformation_labels_are_mode_specific() {
        let labels: Vec<_> = GenerationMode::ALL
            .into_iter()
            .map(|mode| label(template_for(mode).deformation))
            .collect();
        assert_eq!(
            labels,
            ["[DEFORMATION CONTROL]", "[DESIGN FIDELITY]", "[CHARACTER PRESERVATION]", "[CHARACTER ADAPTATION]"]
        );
        assert_eq!(label(HISTORY_BASED.background), "[BACKGROUND]");
    }
}

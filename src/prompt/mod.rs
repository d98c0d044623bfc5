//! Prompt construction for the image model.
//!
//! Everything here is a pure function of its inputs: no I/O, no clock, no
//! randomness. The bracketed section labels and phrase fragments are relied on
//! verbatim by the model tuning and by the tests below.

mod composer;
mod inpaint;
mod lexicon;
mod settings;

pub use inpaint::{build_inpaint_prompt, build_upscale_prompt, EditType};
pub use settings::{
    ColorSettings, GenerationMode, GenerationSettings, MaterialKind, MaterialSettings, Priority, Viewpoint,
};

/// Builds the full generation prompt for `mode`.
///
/// Total over every input: unknown mode tags are resolved to
/// [`GenerationMode::IpReplacement`] by [`GenerationMode::from_tag`] before
/// reaching this function.
pub fn build_prompt(mode: GenerationMode, settings: &GenerationSettings) -> String {
    composer::compose(composer::template_for(mode), settings)
}

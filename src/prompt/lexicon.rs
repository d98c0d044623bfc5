//! Fixed English fragments for material and viewpoint options.

use super::settings::{MaterialKind, Viewpoint};

const PLASTIC_GLOSSY: &str = "Material rendering requirements:\n\
    - Glossy injection-molded plastic finish with high shine\n\
    - Sharp, precise edges from professional mold manufacturing\n\
    - Bright surface reflections showing studio lighting setup\n\
    - Consistent color with slight material depth and clarity\n\
    - Clean seam lines typical of commercial plastic products";

const PLASTIC_MATTE: &str = "Material rendering requirements:\n\
    - Matte injection-molded plastic finish with soft, non-reflective surface\n\
    - Sharp, precise edges from professional mold manufacturing\n\
    - Subtle light absorption characteristic of matte plastics\n\
    - Even color distribution without glossy highlights\n\
    - Professional manufacturing quality appearance";

const PLUSH_FABRIC: &str = "Material rendering requirements:\n\
    - Soft, plush fabric texture with visible fiber detail\n\
    - Short fur texture with natural fabric weave\n\
    - Realistic fabric creases and folds at joints and bends\n\
    - Soft shadows characteristic of fabric materials\n\
    - No hard edges - all contours should appear soft and huggable";

const PLUSH_FUR: &str = "Material rendering requirements:\n\
    - Fluffy, long fur texture with individual hair strands visible\n\
    - Natural fur direction and flow following the product's form\n\
    - Soft, diffused shadows characteristic of furry materials\n\
    - Plush, stuffed appearance with visible texture depth\n\
    - Warm, tactile quality that invites touch";

const CERAMIC: &str = "Material rendering requirements:\n\
    - Smooth, glossy ceramic glaze finish with professional quality\n\
    - Subtle surface reflections showing studio lights as soft highlights\n\
    - Clean, crisp edges typical of kiln-fired molded ceramics\n\
    - Even color application throughout the entire surface\n\
    - Slight depth and translucency in the glaze finish";

const PORCELAIN: &str = "Material rendering requirements:\n\
    - Fine white porcelain with delicate, translucent quality\n\
    - Smooth, refined surface with subtle luminosity\n\
    - Precise, elegant edges characteristic of high-quality porcelain\n\
    - Gentle light transmission creating a soft glow effect\n\
    - Premium, museum-quality appearance and craftsmanship";

const TRANSPARENT_PLASTIC: &str = "Material rendering requirements:\n\
    - Accurate light transmission and subtle refraction effects\n\
    - Visible internal elements through transparent areas\n\
    - Appropriate caustic effects and light play on surfaces\n\
    - Clear distinction between transparent and opaque areas\n\
    - Realistic clear plastic transparency with slight color tint";

const TRANSPARENT_GLASS: &str = "Material rendering requirements:\n\
    - Crystal-clear glass transparency with accurate refraction\n\
    - Visible internal structures through glass walls\n\
    - Beautiful caustic effects and rainbow light dispersion\n\
    - Sharp, precise edges typical of molded or blown glass\n\
    - Premium glass quality with professional finish";

/// Rendering cues for a material, `None` when the key is not in the table.
pub fn material_requirements(kind: &MaterialKind) -> Option<&'static str> {
    let text = match kind {
        MaterialKind::PlasticGlossy => PLASTIC_GLOSSY,
        MaterialKind::PlasticMatte => PLASTIC_MATTE,
        MaterialKind::PlushFabric => PLUSH_FABRIC,
        MaterialKind::PlushFur => PLUSH_FUR,
        MaterialKind::Ceramic => CERAMIC,
        MaterialKind::Porcelain => PORCELAIN,
        MaterialKind::TransparentPlastic => TRANSPARENT_PLASTIC,
        MaterialKind::TransparentGlass => TRANSPARENT_GLASS,
        MaterialKind::Unrecognized(_) => return None,
    };
    Some(text)
}

/// Camera placement sentence. Unknown keys come back unchanged.
pub fn viewpoint_description(viewpoint: &Viewpoint) -> &str {
    match viewpoint {
        Viewpoint::Front => "Camera positioned directly in front of the product, capturing the full face and frontal details at eye level.",
        Viewpoint::ThreeQuarter => "Camera positioned at a three-quarter angle (approximately 45 degrees), showing both the front and side of the product for a dynamic, dimensional view.",
        Viewpoint::Top => "Camera positioned directly above the product, capturing a bird's-eye view that shows the top surface and overall shape from above.",
        Viewpoint::Bottom => "Camera positioned below the product, looking upward to capture the underside and base details.",
        Viewpoint::Preview => "Classic product preview angle commonly used in e-commerce, positioned slightly above and to the side for an inviting, commercial presentation.",
        Viewpoint::Unrecognized(raw) => raw,
    }
}

use serde::{Deserialize, Serialize};

/// Generation strategy selecting which composer builds the prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    #[default]
    IpReplacement,
    SketchToMockup,
    BackgroundComposite,
    HistoryBased,
}

impl GenerationMode {
    pub const ALL: [GenerationMode; 4] = [
        GenerationMode::IpReplacement,
        GenerationMode::SketchToMockup,
        GenerationMode::BackgroundComposite,
        GenerationMode::HistoryBased,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationMode::IpReplacement => "ip_replacement",
            GenerationMode::SketchToMockup => "sketch_to_mockup",
            GenerationMode::BackgroundComposite => "background_composite",
            GenerationMode::HistoryBased => "history_based",
        }
    }

    /// Strict parse, `None` for anything that is not one of the four tags.
    pub fn parse_known(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.as_str() == tag)
    }

    /// Total parse: unknown tags resolve to `IpReplacement`.
    pub fn from_tag(tag: &str) -> Self {
        Self::parse_known(tag).unwrap_or_default()
    }
}

/// Material kinds known to the lexicon. Keys outside the table are kept
/// verbatim in `Unrecognized` so they survive a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MaterialKind {
    PlasticGlossy,
    PlasticMatte,
    PlushFabric,
    PlushFur,
    Ceramic,
    Porcelain,
    TransparentPlastic,
    TransparentGlass,
    Unrecognized(String),
}

impl MaterialKind {
    pub const KNOWN: [MaterialKind; 8] = [
        MaterialKind::PlasticGlossy,
        MaterialKind::PlasticMatte,
        MaterialKind::PlushFabric,
        MaterialKind::PlushFur,
        MaterialKind::Ceramic,
        MaterialKind::Porcelain,
        MaterialKind::TransparentPlastic,
        MaterialKind::TransparentGlass,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            MaterialKind::PlasticGlossy => "plastic_glossy",
            MaterialKind::PlasticMatte => "plastic_matte",
            MaterialKind::PlushFabric => "plush_fabric",
            MaterialKind::PlushFur => "plush_fur",
            MaterialKind::Ceramic => "ceramic",
            MaterialKind::Porcelain => "porcelain",
            MaterialKind::TransparentPlastic => "transparent_plastic",
            MaterialKind::TransparentGlass => "transparent_glass",
            MaterialKind::Unrecognized(raw) => raw,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, MaterialKind::Unrecognized(_))
    }
}

impl From<String> for MaterialKind {
    fn from(raw: String) -> Self {
        Self::KNOWN
            .into_iter()
            .find(|kind| kind.as_str() == raw)
            .unwrap_or(MaterialKind::Unrecognized(raw))
    }
}

impl From<MaterialKind> for String {
    fn from(kind: MaterialKind) -> Self {
        kind.as_str().to_string()
    }
}

/// Camera placement. Unknown keys are echoed into the prompt as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Viewpoint {
    Front,
    ThreeQuarter,
    Top,
    Bottom,
    Preview,
    Unrecognized(String),
}

impl Viewpoint {
    pub const KNOWN: [Viewpoint; 5] = [
        Viewpoint::Front,
        Viewpoint::ThreeQuarter,
        Viewpoint::Top,
        Viewpoint::Bottom,
        Viewpoint::Preview,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Viewpoint::Front => "front",
            Viewpoint::ThreeQuarter => "three_quarter",
            Viewpoint::Top => "top",
            Viewpoint::Bottom => "bottom",
            Viewpoint::Preview => "preview",
            Viewpoint::Unrecognized(raw) => raw,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Viewpoint::Unrecognized(_))
    }
}

impl From<String> for Viewpoint {
    fn from(raw: String) -> Self {
        Self::KNOWN
            .into_iter()
            .find(|view| view.as_str() == raw)
            .unwrap_or(Viewpoint::Unrecognized(raw))
    }
}

impl From<Viewpoint> for String {
    fn from(view: Viewpoint) -> Self {
        view.as_str().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    FixStructure,
    CopyStyle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialSettings {
    #[serde(rename = "type")]
    pub kind: MaterialKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ColorSettings {
    FromCharacter,
    Custom {
        #[serde(rename = "customColor")]
        custom_color: String,
    },
}

/// Every user-chosen option for one generation request.
///
/// `input_images[0]` is the product (or sketch / previous result) and
/// `input_images[1]` the character reference. The prompt builder never looks
/// at the list itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationSettings {
    #[serde(default)]
    pub input_images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<MaterialSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewpoint: Option<Viewpoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub allow_deformation: bool,
    #[serde(default)]
    pub transparent_background: bool,
}

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::StudioError;
use crate::media::MediaPart;
use crate::reports::{ConsultancyReport, LookPrompt};
use crate::schema::SchemaNode;

/// The fixed consultancy variants. Each kind owns its prompt template and
/// its response schema; `Look` is the one plain-text kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsultancyKind {
    FaceAnalysis,
    Color,
    Haircut,
    Look,
    HairTherapy,
}

impl ConsultancyKind {
    pub fn all() -> [ConsultancyKind; 5] {
        [
            Self::FaceAnalysis,
            Self::Color,
            Self::Haircut,
            Self::Look,
            Self::HairTherapy,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::FaceAnalysis => "face_analysis",
            Self::Color => "color",
            Self::Haircut => "haircut",
            Self::Look => "look",
            Self::HairTherapy => "hair_therapy",
        }
    }

    /// The declared output shape, or `None` for the plain-text look kind.
    /// `brand` is woven into field descriptions where the kind demands
    /// product-exact recommendations.
    pub fn schema(&self, brand: Option<&str>) -> Option<SchemaNode> {
        match self {
            Self::FaceAnalysis => Some(face_analysis_schema()),
            Self::Color => Some(color_schema(brand)),
            Self::Haircut => Some(haircut_schema(brand)),
            Self::Look => None,
            Self::HairTherapy => Some(hair_therapy_schema(brand)),
        }
    }
}

impl fmt::Display for ConsultancyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ConsultancyKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "face" | "face_analysis" | "face-analysis" => Ok(Self::FaceAnalysis),
            "color" | "colorist" => Ok(Self::Color),
            "haircut" | "cut" | "hairstylist" => Ok(Self::Haircut),
            "look" | "outfit" => Ok(Self::Look),
            "therapy" | "hair_therapy" | "hair-therapy" => Ok(Self::HairTherapy),
            other => Err(format!("unknown consultancy kind '{other}'")),
        }
    }
}

/// One fully specified consultancy request: subject photo, optional
/// reference photo, the client's stated goal, and an optional product brand.
#[derive(Debug, Clone)]
pub struct ConsultancyRequest {
    pub kind: ConsultancyKind,
    pub subject: MediaPart,
    pub reference: Option<MediaPart>,
    pub free_text: String,
    pub brand: Option<String>,
    pub deep_analysis: bool,
}

impl ConsultancyRequest {
    pub fn new(kind: ConsultancyKind, subject: MediaPart) -> Self {
        Self {
            kind,
            subject,
            reference: None,
            free_text: String::new(),
            brand: None,
            deep_analysis: false,
        }
    }

    pub fn with_reference(mut self, reference: MediaPart) -> Self {
        self.reference = Some(reference);
        self
    }

    pub fn with_free_text(mut self, free_text: impl Into<String>) -> Self {
        self.free_text = free_text.into();
        self
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    pub fn with_deep_analysis(mut self, deep_analysis: bool) -> Self {
        self.deep_analysis = deep_analysis;
        self
    }

    /// Caller-side precondition check. The haircut kind tolerates empty free
    /// text when a reference image stands in for it; the other text-driven
    /// kinds do not.
    pub fn ensure_valid(&self) -> Result<(), StudioError> {
        self.subject.ensure_accepted_input()?;
        if let Some(reference) = &self.reference {
            reference.ensure_accepted_input()?;
        }
        let text_missing = self.free_text.trim().is_empty();
        match self.kind {
            ConsultancyKind::FaceAnalysis => Ok(()),
            ConsultancyKind::Haircut | ConsultancyKind::Look => {
                if text_missing && self.reference.is_none() {
                    return Err(StudioError::InvalidRequest(format!(
                        "{} consultancy needs free text or a reference image",
                        self.kind
                    )));
                }
                Ok(())
            }
            ConsultancyKind::Color | ConsultancyKind::HairTherapy => {
                if text_missing {
                    return Err(StudioError::InvalidRequest(format!(
                        "{} consultancy needs a stated goal",
                        self.kind
                    )));
                }
                Ok(())
            }
        }
    }

    /// Text positioned between the images and the main instruction, telling
    /// the model which image is which. `None` for single-image kinds.
    pub fn framing_text(&self) -> Option<String> {
        let has_reference = self.reference.is_some();
        match self.kind {
            ConsultancyKind::FaceAnalysis | ConsultancyKind::HairTherapy => None,
            ConsultancyKind::Color => Some(if has_reference {
                "The first image is the client. The second image is the desired color reference."
                    .to_string()
            } else {
                "This is the client's photo.".to_string()
            }),
            ConsultancyKind::Haircut => Some(if has_reference {
                "The first image is the client. The second is the reference for the desired cut."
                    .to_string()
            } else {
                "This is the client's photo.".to_string()
            }),
            ConsultancyKind::Look => Some(if has_reference {
                "The first image is the client's face. The second is the inspiration for the look."
                    .to_string()
            } else {
                "This is the client's face.".to_string()
            }),
        }
    }

    /// The kind-specific instruction, embedding the caller's free text and
    /// brand verbatim.
    pub fn instruction(&self) -> String {
        match self.kind {
            ConsultancyKind::FaceAnalysis => {
                "Analyze this face. Provide the consultancy, the palette and three cut \
                 suggestions with prompts."
                    .to_string()
            }
            ConsultancyKind::Color => self.color_instruction(),
            ConsultancyKind::Haircut => self.haircut_instruction(),
            ConsultancyKind::Look => self.look_instruction(),
            ConsultancyKind::HairTherapy => self.hair_therapy_instruction(),
        }
    }

    /// Persona preamble sent as the system instruction; only the face
    /// analysis kind carries one.
    pub fn system_instruction(&self) -> Option<&'static str> {
        match self.kind {
            ConsultancyKind::FaceAnalysis => Some(FACE_ANALYSIS_SYSTEM_INSTRUCTION),
            _ => None,
        }
    }

    /// Opt-in deeper-reasoning budget; only meaningful for face analysis.
    pub fn thinking_budget(&self) -> Option<u32> {
        if self.deep_analysis && self.kind == ConsultancyKind::FaceAnalysis {
            Some(DEEP_ANALYSIS_THINKING_BUDGET)
        } else {
            None
        }
    }

    fn color_instruction(&self) -> String {
        let mut text = format!(
            "Act as a master colorist and internationally renowned visagiste. Be extremely \
             detailed, technical and precise. The goal is: {}.",
            self.free_text
        );
        if let Some(brand) = &self.brand {
            text.push_str(&format!(" The chosen product brand is: {brand}."));
        }
        text.push_str(
            "\nAssess feasibility and the lightening base required, then build a complete, \
             in-depth technical dossier.\n\nIMPORTANT: if the desired look involves highlights, \
             balayage or babylights you MUST detail the highlightingTechnique (for example \
             teased, woven, freehand, contour) and explain how to execute it. For a global \
             color, explain the application method.\n\nRespond STRICTLY as JSON following the \
             declared schema.",
        );
        text
    }

    fn haircut_instruction(&self) -> String {
        let mut text =
            "Act as an elite visagiste hairstylist building a complete technical dossier."
                .to_string();
        if let Some(brand) = &self.brand {
            text.push_str(&format!(" The preferred product brand is {brand}."));
        }
        if !self.free_text.trim().is_empty() {
            text.push_str(&format!(
                " The cut the client wants is: \"{}\".",
                self.free_text
            ));
            if self.reference.is_some() {
                text.push_str(
                    " The reference image is the main visual inspiration for this request.",
                );
            }
        } else if self.reference.is_some() {
            text.push_str(
                " The client provided no text. Base the ENTIRE analysis on the reference image \
                 to determine the desired cut and build a plan to apply it to the client.",
            );
        }
        text.push_str(
            " Analyze the image(s), the facial structure and the request, then create a \
             complete and highly detailed cutting plan.\nIMPORTANT: generate three concise \
             English technicalPrompts for an image model to render realistic simulations of \
             the cut on the client: one FRONT view, one SIDE view and one BACK view. Each \
             prompt must specify professional three-point studio lighting with a soft key \
             light and demand hyperrealistic skin texture preserving pores and natural detail, \
             avoiding an artificial airbrushed look.\nRespond STRICTLY as JSON.",
        );
        text
    }

    fn look_instruction(&self) -> String {
        format!(
            "Your task is to write a technical prompt for an image-generation model. Describe \
             a full-body look for the person in the first image. The look should be inspired \
             by: \"{}\". If a reference image is provided, use it as the main inspiration.\n\
             The prompt must be in English and extremely detailed, covering: outfit style, \
             colors and fabrics, hair and make-up that complement the look, setting and \
             background, lighting, and the quality terms 'photorealistic, 8k, hyper-detailed, \
             sharp focus'. Include the key phrase 'full body shot of the same person' and \
             state that the image MUST have a vertical 9:16 aspect ratio.\nRespond with the \
             prompt text only, nothing else.",
            self.free_text
        )
    }

    fn hair_therapy_instruction(&self) -> String {
        let brand = self
            .brand
            .as_deref()
            .unwrap_or("the salon's preferred product line");
        format!(
            "Act as a senior trichologist focused on visible results and long-term hair \
             health. The chosen product brand is: {brand}. Analyze the hair photo and the \
             client's complaint: \"{}\".\nProduce a complete, in-depth diagnosis of strand \
             health (porosity, elasticity, damage) and prescribe a treatment protocol or \
             schedule using ONLY products from {brand}. Be extremely detailed in the step by \
             step and the schedule.\nRespond STRICTLY as JSON.",
            self.free_text
        )
    }
}

const FACE_ANALYSIS_SYSTEM_INSTRUCTION: &str =
    "You are a world-class visagiste. Analyze the submitted photo and produce a complete \
     consultancy. Build a palette of 6 to 8 EXTREMELY vibrant colors with maximum contrast \
     between them, for a bold, modern look; avoid pastel or desaturated tones. The palette \
     must flatter the client's skin tone in a daring, fashion-forward way. IMPORTANT: suggest \
     exactly 3 specific haircuts that harmonize with this face. For each cut give the name, \
     the reasoning, and a technical ENGLISH prompt for a generative image model to apply the \
     cut while keeping the original face. Respond strictly as JSON.";

const DEEP_ANALYSIS_THINKING_BUDGET: u32 = 16000;

/// Maps a raw response text onto the typed report for `kind`. The text is
/// decoded as JSON, validated against the kind's schema, then deserialized;
/// every failure carries the raw text on the error.
pub fn parse_report(kind: ConsultancyKind, raw_text: &str) -> Result<ConsultancyReport, StudioError> {
    if kind == ConsultancyKind::Look {
        let trimmed = raw_text.trim();
        if trimmed.is_empty() {
            return Err(StudioError::contract_violation(
                "look prompt response was empty",
                raw_text,
            ));
        }
        return Ok(ConsultancyReport::Look(LookPrompt {
            prompt: trimmed.to_string(),
        }));
    }

    let payload: Value = serde_json::from_str(raw_text).map_err(|err| {
        StudioError::contract_violation(format!("response is not valid JSON: {err}"), raw_text)
    })?;
    if let Some(schema) = kind.schema(None) {
        schema
            .validate(&payload)
            .map_err(|problems| StudioError::contract_violation(problems.join("; "), raw_text))?;
    }

    match kind {
        ConsultancyKind::FaceAnalysis => {
            Ok(ConsultancyReport::FaceAnalysis(decode(payload, raw_text)?))
        }
        ConsultancyKind::Color => Ok(ConsultancyReport::Color(decode(payload, raw_text)?)),
        ConsultancyKind::Haircut => Ok(ConsultancyReport::Haircut(decode(payload, raw_text)?)),
        ConsultancyKind::HairTherapy => {
            Ok(ConsultancyReport::HairTherapy(decode(payload, raw_text)?))
        }
        ConsultancyKind::Look => unreachable!("look handled above"),
    }
}

fn decode<T: DeserializeOwned>(payload: Value, raw_text: &str) -> Result<T, StudioError> {
    serde_json::from_value(payload).map_err(|err| {
        StudioError::contract_violation(
            format!("schema-valid payload failed to decode: {err}"),
            raw_text,
        )
    })
}

fn face_analysis_schema() -> SchemaNode {
    SchemaNode::object(
        vec![
            (
                "consultancy",
                SchemaNode::text_with(
                    "A complete, extensive consultancy covering face shape, detailed skin \
                     tone analysis, and make-up and accessory suggestions.",
                ),
            ),
            (
                "palette",
                SchemaNode::array_with(
                    "A recommended palette of 6 to 8 intense, vibrant, high-contrast colors \
                     for a modern look.",
                    SchemaNode::object(
                        vec![
                            ("hex", SchemaNode::text_with("Hex code (e.g. #RRGGBB)")),
                            ("name", SchemaNode::text_with("Color name")),
                        ],
                        &["hex", "name"],
                    ),
                ),
            ),
            (
                "cuts",
                SchemaNode::array_with(
                    "3 ideal haircut suggestions.",
                    SchemaNode::object(
                        vec![
                            ("name", SchemaNode::text_with("Name of the cut")),
                            (
                                "description",
                                SchemaNode::text_with("Why it suits this face"),
                            ),
                            (
                                "technicalPrompt",
                                SchemaNode::text_with(
                                    "Very detailed ENGLISH prompt for an image model. Must \
                                     specify realistic professional three-point studio \
                                     lighting with a soft key light and subtle fill light, \
                                     plus 'hyperrealistic skin texture', 'catchlight in \
                                     eyes', '8k', 'cinematic'.",
                                ),
                            ),
                        ],
                        &["name", "description", "technicalPrompt"],
                    ),
                ),
            ),
        ],
        &["consultancy", "palette", "cuts"],
    )
}

fn color_schema(brand: Option<&str>) -> SchemaNode {
    let brand = brand.unwrap_or("the chosen brand");
    SchemaNode::object(
        vec![
            (
                "visagismAnalysis",
                SchemaNode::text_with(
                    "In-depth visagism analysis: does the color suit the skin tone, eye \
                     color and undertone? Explain the color theory applied and suggest \
                     warmer/cooler variations.",
                ),
            ),
            (
                "diagnosis",
                SchemaNode::text_with(
                    "Complete diagnosis of the current hair: grey percentage, apparent \
                     chemical history, and the exact lightening base to reach (e.g. 9.0 \
                     golden-yellow).",
                ),
            ),
            (
                "highlightingTechnique",
                SchemaNode::text_with(
                    "Name and detailed explanation of the specific highlighting technique \
                     (e.g. 'contour + teased 30%'). For a global color, explain the \
                     application method.",
                ),
            ),
            (
                "formula",
                SchemaNode::object(
                    vec![
                        (
                            "primary",
                            SchemaNode::text_with(format!(
                                "Exact recipe using {brand} nomenclature and products \
                                 (e.g. 30g of 9.1 + 45g 20vol developer)."
                            )),
                        ),
                        (
                            "toner",
                            SchemaNode::text_with(format!(
                                "Toner formula, if applicable, from {brand}."
                            )),
                        ),
                        (
                            "alternatives",
                            SchemaNode::text_with(
                                "Alternative formula with another brand or for a different \
                                 budget.",
                            ),
                        ),
                    ],
                    &[],
                ),
            ),
            (
                "techniqueStepByStep",
                SchemaNode::array_with(
                    "Numbered, chronological application steps including exact processing \
                     times and what to watch for.",
                    SchemaNode::text(),
                ),
            ),
            (
                "troubleshooting",
                SchemaNode::array_with(
                    "2-3 common problems (e.g. 'banded roots', 'color turned ashy-muddy') \
                     and how to correct them.",
                    SchemaNode::text(),
                ),
            ),
            (
                "postChemicalCare",
                SchemaNode::array_with(
                    "Maintenance tips and suggested home-care products for maximum color \
                     durability.",
                    SchemaNode::text(),
                ),
            ),
        ],
        &[
            "visagismAnalysis",
            "diagnosis",
            "highlightingTechnique",
            "formula",
            "techniqueStepByStep",
            "troubleshooting",
            "postChemicalCare",
        ],
    )
}

fn haircut_schema(brand: Option<&str>) -> SchemaNode {
    let brand = brand.unwrap_or("the chosen brand");
    SchemaNode::object(
        vec![
            (
                "visagismAnalysis",
                SchemaNode::text_with(
                    "Deep visagiste analysis: why this cut harmonizes with the face shape \
                     and features, which balance points it creates, plus small variations \
                     for other face shapes.",
                ),
            ),
            (
                "viabilityVerdict",
                SchemaNode::text_with(
                    "Feasibility verdict and difficulty level (beginner, intermediate, \
                     advanced). Is the client's hair texture and density suitable? Which \
                     adaptations are CRITICAL?",
                ),
            ),
            (
                "preparation",
                SchemaNode::array_with(
                    "Steps to prepare the hair for the cut (wash, product type, moisture \
                     level).",
                    SchemaNode::text(),
                ),
            ),
            (
                "toolsAndAccessories",
                SchemaNode::array_with(
                    "Specific tools and accessories needed (e.g. '6.0 razor-edge shears', \
                     'clipper with #2 guard', 'carbon comb').",
                    SchemaNode::text(),
                ),
            ),
            (
                "diagram3d",
                SchemaNode::text_with(
                    "Textual 3D diagram of the cut detailing sections, partings and guide \
                     lines.",
                ),
            ),
            (
                "products",
                SchemaNode::array_with(
                    format!(
                        "Styling products from {brand} to prep and finish the look (e.g. \
                         'volume mousse', 'heat protectant', 'matte paste')."
                    ),
                    SchemaNode::text(),
                ),
            ),
            (
                "techniqueStepByStep",
                SchemaNode::array_with(
                    "Numbered, detailed technical steps of the cut: elevation angles in \
                     degrees and texturizing techniques (e.g. 'point cutting', 'slide \
                     cutting').",
                    SchemaNode::text(),
                ),
            ),
            (
                "finalizationSecrets",
                SchemaNode::array_with(
                    "Finishing secrets: professional drying and styling tips to replicate \
                     the salon look.",
                    SchemaNode::text(),
                ),
            ),
            (
                "postCutCare",
                SchemaNode::array_with(
                    "Home maintenance tips and the ideal return interval.",
                    SchemaNode::text(),
                ),
            ),
            (
                "prompts",
                SchemaNode::object(
                    vec![
                        (
                            "front",
                            SchemaNode::text_with(
                                "Extremely detailed ENGLISH prompt for the FRONT view. Must \
                                 specify professional three-point studio lighting, soft key \
                                 light, subtle fill light, rim light for separation, \
                                 hyperrealistic skin texture preserving pores, no airbrushed \
                                 plastic look, subtle catchlight in eyes, 8k cinematic \
                                 quality.",
                            ),
                        ),
                        (
                            "side",
                            SchemaNode::text_with("ENGLISH prompt for the SIDE view."),
                        ),
                        (
                            "back",
                            SchemaNode::text_with("ENGLISH prompt for the BACK view."),
                        ),
                    ],
                    &["front", "side", "back"],
                ),
            ),
        ],
        &[
            "visagismAnalysis",
            "viabilityVerdict",
            "preparation",
            "toolsAndAccessories",
            "diagram3d",
            "products",
            "techniqueStepByStep",
            "finalizationSecrets",
            "postCutCare",
            "prompts",
        ],
    )
}

fn hair_therapy_schema(brand: Option<&str>) -> SchemaNode {
    let brand = brand.unwrap_or("the chosen brand");
    SchemaNode::object(
        vec![
            (
                "diagnosis",
                SchemaNode::object(
                    vec![
                        (
                            "damageLevel",
                            SchemaNode::text_with("Damage level (low, medium, high, critical)"),
                        ),
                        (
                            "porosity",
                            SchemaNode::text_with(
                                "Observed porosity, explained scientifically",
                            ),
                        ),
                        (
                            "elasticity",
                            SchemaNode::text_with(
                                "Described elasticity test and what it means",
                            ),
                        ),
                        (
                            "scalpCondition",
                            SchemaNode::text_with(
                                "Apparent scalp condition (oiliness, flaking, etc.)",
                            ),
                        ),
                        (
                            "summary",
                            SchemaNode::text_with(
                                "Overall summary explaining the root cause scientifically \
                                 and accessibly.",
                            ),
                        ),
                    ],
                    &[
                        "damageLevel",
                        "porosity",
                        "elasticity",
                        "scalpCondition",
                        "summary",
                    ],
                ),
            ),
            (
                "treatmentPlan",
                SchemaNode::object(
                    vec![
                        (
                            "protocolName",
                            SchemaNode::text_with(
                                "Name of the treatment protocol and its main objective \
                                 (e.g. 'Intensive Lipid Replacement Therapy').",
                            ),
                        ),
                        (
                            "products",
                            SchemaNode::array_with(
                                format!("EXACT {brand} products for the full treatment."),
                                SchemaNode::text(),
                            ),
                        ),
                        (
                            "stepByStep",
                            SchemaNode::array_with(
                                "Detailed in-salon application steps plus a simplified \
                                 at-home maintenance version.",
                                SchemaNode::text(),
                            ),
                        ),
                        (
                            "schedule",
                            SchemaNode::array_with(
                                "Detailed 4-week schedule specifying which products to use \
                                 at each stage (hydration, nutrition, reconstruction).",
                                SchemaNode::text(),
                            ),
                        ),
                        (
                            "lifestyleTips",
                            SchemaNode::array_with(
                                "Lifestyle and nutrition tips that support hair health.",
                                SchemaNode::text(),
                            ),
                        ),
                        (
                            "expectedResults",
                            SchemaNode::text_with(
                                "Expected results and their time frame.",
                            ),
                        ),
                    ],
                    &[
                        "protocolName",
                        "products",
                        "stepByStep",
                        "schedule",
                        "lifestyleTips",
                        "expectedResults",
                    ],
                ),
            ),
        ],
        &["diagnosis", "treatmentPlan"],
    )
}

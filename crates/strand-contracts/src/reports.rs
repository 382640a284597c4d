use serde::{Deserialize, Serialize};

/// A recommended palette entry from the face analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaletteColor {
    pub hex: String,
    pub name: String,
}

/// One of the three haircut suggestions attached to a face analysis, with
/// the English prompt used to drive the visual simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CutSuggestion {
    pub name: String,
    pub description: String,
    pub technical_prompt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceAnalysisReport {
    pub consultancy: String,
    pub palette: Vec<PaletteColor>,
    pub cuts: Vec<CutSuggestion>,
}

/// Formula block of a color consultancy. The endpoint schema declares no
/// required fields here, so every member is optional on decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ColorFormula {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternatives: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorConsultancyReport {
    pub visagism_analysis: String,
    pub diagnosis: String,
    pub highlighting_technique: String,
    pub formula: ColorFormula,
    pub technique_step_by_step: Vec<String>,
    pub troubleshooting: Vec<String>,
    pub post_chemical_care: Vec<String>,
}

/// Simulation prompts for the three camera angles of a haircut plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewPrompts {
    pub front: String,
    pub side: String,
    pub back: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HaircutConsultancyReport {
    pub visagism_analysis: String,
    pub viability_verdict: String,
    pub preparation: Vec<String>,
    pub tools_and_accessories: Vec<String>,
    #[serde(rename = "diagram3d")]
    pub diagram_3d: String,
    pub products: Vec<String>,
    pub technique_step_by_step: Vec<String>,
    pub finalization_secrets: Vec<String>,
    pub post_cut_care: Vec<String>,
    pub prompts: ViewPrompts,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HairDiagnosis {
    pub damage_level: String,
    pub porosity: String,
    pub elasticity: String,
    pub scalp_condition: String,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreatmentPlan {
    pub protocol_name: String,
    pub products: Vec<String>,
    pub step_by_step: Vec<String>,
    pub schedule: Vec<String>,
    pub lifestyle_tips: Vec<String>,
    pub expected_results: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HairTherapyReport {
    pub diagnosis: HairDiagnosis,
    pub treatment_plan: TreatmentPlan,
}

/// Result of the plain-text look kind: an English image-generation prompt
/// describing a full-body look for the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookPrompt {
    pub prompt: String,
}

/// The parsed, fully validated result of one consultancy request. Exactly
/// one variant per kind; no variant is ever returned partially populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConsultancyReport {
    FaceAnalysis(FaceAnalysisReport),
    Color(ColorConsultancyReport),
    Haircut(HaircutConsultancyReport),
    Look(LookPrompt),
    HairTherapy(HairTherapyReport),
}

impl ConsultancyReport {
    pub fn as_color(&self) -> Option<&ColorConsultancyReport> {
        match self {
            Self::Color(report) => Some(report),
            _ => None,
        }
    }

    pub fn as_face_analysis(&self) -> Option<&FaceAnalysisReport> {
        match self {
            Self::FaceAnalysis(report) => Some(report),
            _ => None,
        }
    }

    pub fn as_haircut(&self) -> Option<&HaircutConsultancyReport> {
        match self {
            Self::Haircut(report) => Some(report),
            _ => None,
        }
    }

    pub fn as_hair_therapy(&self) -> Option<&HairTherapyReport> {
        match self {
            Self::HairTherapy(report) => Some(report),
            _ => None,
        }
    }

    pub fn as_look(&self) -> Option<&LookPrompt> {
        match self {
            Self::Look(report) => Some(report),
            _ => None,
        }
    }
}

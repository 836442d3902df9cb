//! Design agents: architecture, engineering systems, interiors and the digital twin.

use super::{DESIGN_STYLE, MATERIAL_PALETTE, MEP_NOTES, PASS_THROUGH, STRUCTURAL_NOTES, project_type};
use crate::descriptor::{AgentDescriptor, FieldSpec, ImageSpec};
use crate::response::ResponseSchema;
use serde_json::{Map, Value, json};

const SITE_LOCATION: FieldSpec = FieldSpec::text(
    "location",
    "site_feasibility_report.location|location|client_requirements.parsed_requirements.location",
    "unspecified",
);

const DESIRED_FEATURES: FieldSpec = FieldSpec::list(
    "desired_features",
    "desired_features|client_requirements.parsed_requirements.desired_features",
);

fn design_fallback() -> Value {
    json!({
        "design_summary": "Could not parse design summary from AI. Manual design review needed.",
        "key_elements": ["Unspecified"],
        "considerations": ["Manual design. AI parsing failed or response malformed."]
    })
}

pub static ARCHITECTURAL_DESIGN: AgentDescriptor = AgentDescriptor {
    id: "generative_architectural_design_agent",
    name: "Generative Architectural Design Agent",
    description: "Generates initial architectural concepts and visual sketches.",
    task: "design concept",
    activity: "architectural design",
    output_key: "architectural_concept",
    temperature: 0.5,
    fields: &[
        project_type("residential"),
        SITE_LOCATION,
        DESIRED_FEATURES,
        FieldSpec::text("max_height", "site_feasibility_report.zoning_data.allowed_height_m", "N/A"),
        FieldSpec::object("site_report", "site_feasibility_report"),
        FieldSpec::object("requirements", "client_requirements.parsed_requirements"),
    ],
    prompt: "Based on the following site feasibility report and initial client requirements, \
propose an architectural concept. Consider the project type '{project_type}' and desired features \
'{desired_features}', adhering to zoning rules like max height {max_height}m. Summarize the \
proposed style, key design elements, and how it addresses site constraints.\n\
Site Report: {site_report}\n\
Initial Requirements: {requirements}\n\n\
Format output STRICTLY as JSON with keys 'design_summary' (string), 'key_elements' (list of \
strings), 'considerations' (list of strings).",
    schema: ResponseSchema::new(&["design_summary", "key_elements", "considerations"]),
    fallback: design_fallback,
    annotations: &[(
        "floor_plan_url_placeholder",
        "https://placehold.co/600x400/FF0000/FFFFFF?text=Conceptual_Floor_Plan",
    )],
    pass_through: PASS_THROUGH,
    images: &[ImageSpec {
        field: "conceptual_render_base64",
        prompt: "Architectural sketch of a {project_type} in {location} with features like \
{desired_features} and a {design_summary} style. Exterior view, clear daylight, high detail, \
concept art.",
    }],
    finish: None,
};

fn systems_fallback() -> Value {
    json!({
        "structural_notes": "Generic structural design considerations.",
        "mep_notes": "Standard MEP system recommendations.",
        "integration_challenges": ["LLM response parsing failed."]
    })
}

fn flag_design_conflicts(_fields: &Map<String, Value>, payload: &mut Map<String, Value>) {
    let conflicts = payload
        .get("integration_challenges")
        .and_then(Value::as_array)
        .is_some_and(|challenges| !challenges.is_empty());
    payload.insert("design_conflicts_detected".to_string(), Value::Bool(conflicts));
}

pub static SYSTEMS_ENGINEERING: AgentDescriptor = AgentDescriptor {
    id: "integrated_systems_engineering_agent",
    name: "Integrated Systems Engineering Agent",
    description: "Develops preliminary structural and MEP designs.",
    task: "systems engineering",
    activity: "systems engineering",
    output_key: "system_design",
    temperature: 0.4,
    fields: &[
        DESIGN_STYLE,
        project_type("residential"),
        FieldSpec::text("environmental_risk", "site_feasibility_report.environmental_risk", "Unknown"),
    ],
    prompt: "Given the architectural concept '{design_style}' for a {project_type} project and \
site conditions related to '{environmental_risk}', propose preliminary structural considerations \
(e.g., foundation type, material recommendations) and MEP (Mechanical, Electrical, Plumbing) \
system recommendations (e.g., HVAC type, smart home integration, water efficiency). Highlight any \
potential integration challenges.\n\n\
Format output STRICTLY as a JSON object with keys 'structural_notes' (string), 'mep_notes' \
(string), 'integration_challenges' (list of strings).",
    schema: ResponseSchema::new(&["structural_notes", "mep_notes", "integration_challenges"]),
    fallback: systems_fallback,
    annotations: &[
        ("structural_design_status", "preliminary_complete"),
        ("mep_design_status", "preliminary_complete"),
    ],
    pass_through: PASS_THROUGH,
    images: &[],
    finish: Some(flag_design_conflicts),
};

fn experiential_fallback() -> Value {
    json!({
        "interior_style": "Modern generic",
        "landscape_features": "Basic garden layout",
        "material_palette_notes": "Standard materials"
    })
}

pub static EXPERIENTIAL_DESIGN: AgentDescriptor = AgentDescriptor {
    id: "interior_experiential_design_agent",
    name: "Interior Experiential Design Agent",
    description: "Designs interior spaces and surrounding landscape.",
    task: "experiential design",
    activity: "experiential design",
    output_key: "experiential_design",
    temperature: 0.6,
    fields: &[project_type("residential"), DESIGN_STYLE, DESIRED_FEATURES],
    prompt: "Based on a '{project_type}' project with architectural style '{design_style}' and \
desired features '{desired_features}', propose interior design elements (style, materials, key \
spaces) and landscape design features (garden style, outdoor elements). Focus on enhancing user \
experience and functionality.\n\n\
Output STRICTLY as a JSON object with keys 'interior_style' (string), 'landscape_features' \
(string), 'material_palette_notes' (string).",
    schema: ResponseSchema::new(&["interior_style", "landscape_features", "material_palette_notes"]),
    fallback: experiential_fallback,
    annotations: &[(
        "mood_board_url_placeholder",
        "https://placehold.co/600x400/996633/FFFFFF?text=Interior_Mood_Board",
    )],
    pass_through: PASS_THROUGH,
    images: &[],
    finish: None,
};

fn twin_fallback() -> Value {
    json!({
        "integration_summary": "Digital twin integration summary unavailable due to parsing error.",
        "model_components": [
            "Architectural shell",
            "Structural frame",
            "MEP systems",
            "Interior fit-out",
            "Landscape"
        ]
    })
}

pub static DIGITAL_TWIN: AgentDescriptor = AgentDescriptor {
    id: "hyper_realistic_3d_digital_twin_agent",
    name: "Hyper-Realistic 3D Digital Twin Agent",
    description: "Integrates all design aspects into a comprehensive 3D model and generates renders.",
    task: "digital twin integration",
    activity: "digital twin creation",
    output_key: "digital_twin_output",
    temperature: 0.4,
    fields: &[
        DESIGN_STYLE,
        SITE_LOCATION,
        FieldSpec::list(
            "key_elements",
            "architectural_concept.key_elements|architectural_concept.key_design_elements",
        ),
        FieldSpec::text("landscape_features", "experiential_design.landscape_features", "N/A"),
        FieldSpec::text("interior_style", "experiential_design.interior_style", "N/A"),
        MATERIAL_PALETTE,
        STRUCTURAL_NOTES,
        MEP_NOTES,
    ],
    prompt: "As a BIM and digital twin specialist, describe how the following design work integrates \
into a single 3D model of the building.\n\
- Architectural style: {design_style}\n\
- Location: {location}\n\
- Key design elements: {key_elements}\n\
- Structural notes: {structural_notes}\n\
- MEP notes: {mep_notes}\n\
- Interior style: {interior_style}\n\
- Materials: {material_palette}\n\
- Landscape: {landscape_features}\n\n\
Output STRICTLY as a JSON object with keys 'integration_summary' (string) and \
'model_components' (list of strings).",
    schema: ResponseSchema::new(&["integration_summary", "model_components"]),
    fallback: twin_fallback,
    annotations: &[
        ("status", "initial_twin_created"),
        ("digital_twin_url_placeholder", "https://example.com/digital_twin_model.gltf"),
    ],
    pass_through: PASS_THROUGH,
    images: &[
        ImageSpec {
            field: "exterior_render_base64",
            prompt: "Photorealistic 3D exterior render of a {design_style} building at {location} \
with a '{landscape_features}' landscape. Incorporate elements from features like {key_elements}. \
High detail, natural lighting, daytime.",
        },
        ImageSpec {
            field: "interior_render_base64",
            prompt: "Photorealistic 3D interior render of a {design_style} building, with \
'{interior_style}' decor and materials like '{material_palette}'. Warm lighting, cozy atmosphere, \
focus on a living area.",
        },
    ],
    finish: None,
};

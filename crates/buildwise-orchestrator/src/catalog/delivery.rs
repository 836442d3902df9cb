//! Delivery agents: cost, planning, risk, quality and data integration.

use super::{
    DESIGN_STYLE, DURATION_WEEKS, LOCATION, MATERIAL_PALETTE, MEP_NOTES, PASS_THROUGH, PROJECT_DESCRIPTION,
    PROJECT_SIZE, STRUCTURAL_NOTES, project_type,
};
use crate::descriptor::{AgentDescriptor, AgentInput, FieldSpec};
use crate::response::ResponseSchema;
use serde_json::{Map, Value, json};

fn cost_fallback() -> Value {
    json!({
        "total_estimated_cost_usd": 700_000,
        "cost_breakdown": {
            "materials": "N/A",
            "labor": "N/A",
            "equipment": "N/A",
            "permits_fees": "N/A",
            "contingency": "N/A"
        },
        "procurement_strategy": "Generic procurement strategy due to parsing error."
    })
}

pub static COST_SUPPLY_CHAIN: AgentDescriptor = AgentDescriptor {
    id: "predictive_cost_supply_chain_agent",
    name: "Predictive Cost & Supply Chain Agent",
    description: "Estimates project costs and develops a preliminary procurement plan.",
    task: "cost/supply chain",
    activity: "cost and supply chain analysis",
    output_key: "cost_supply_chain_analysis",
    temperature: 0.3,
    fields: &[PROJECT_DESCRIPTION, PROJECT_SIZE, DESIGN_STYLE, STRUCTURAL_NOTES, MEP_NOTES, MATERIAL_PALETTE],
    prompt: "As a construction cost estimator and supply chain analyst, provide a detailed cost \
breakdown and preliminary procurement strategy for a '{project_description}' project of \
'{project_size}' size. Consider insights from the architectural concept ('{design_style}'), system \
design notes ('{structural_notes}', '{mep_notes}'), and interior design material palette \
('{material_palette}'). Break down costs into: materials, labor, equipment, permits/fees, and \
contingency (e.g., 10%). Suggest a procurement strategy focusing on efficiency and \
cost-effectiveness.\n\n\
Output STRICTLY as a JSON object with 'total_estimated_cost_usd' (number), 'cost_breakdown' \
(object with breakdown), and 'procurement_strategy' (string).",
    schema: ResponseSchema::new(&["total_estimated_cost_usd", "cost_breakdown", "procurement_strategy"]),
    fallback: cost_fallback,
    annotations: &[("status", "cost_estimation_complete")],
    pass_through: PASS_THROUGH,
    images: &[],
    finish: None,
};

fn plan_fallback() -> Value {
    json!({
        "status": "master_plan_drafted_with_errors",
        "budget_summary": "Approx. ${estimated_budget} (parsing error)",
        "timeline_summary": "{duration_weeks} weeks (parsing error)",
        "key_milestones_overview": "Milestones parsing failed."
    })
}

pub static PROJECT_MANAGEMENT: AgentDescriptor = AgentDescriptor {
    id: "adaptive_project_management_robotics_orchestration_agent",
    name: "Adaptive Project Management & Robotics Orchestration Agent",
    description: "Manages project planning, scheduling, and overall coordination.",
    task: "project plan",
    activity: "project planning",
    output_key: "master_project_plan",
    temperature: 0.4,
    fields: &[
        PROJECT_DESCRIPTION,
        FieldSpec::text("estimated_budget", "cost_supply_chain_analysis.total_estimated_cost_usd", "N/A"),
        FieldSpec::object("cost_breakdown", "cost_supply_chain_analysis.cost_breakdown"),
        FieldSpec::text("procurement_strategy", "cost_supply_chain_analysis.procurement_strategy", "N/A"),
        DURATION_WEEKS,
        FieldSpec::list("milestones", "estimated_schedule.milestones"),
        FieldSpec::text(
            "site_considerations",
            "site_feasibility_report.summary|site_feasibility_report.regulatory_summary_ai",
            "N/A",
        ),
        DESIGN_STYLE,
    ],
    prompt: "As a senior project manager for a construction project, synthesize a master project \
plan for '{project_description}'. Integrate the following information:\n\
- Estimated Budget: {estimated_budget}\n\
- Cost Breakdown: {cost_breakdown}\n\
- Procurement Strategy: {procurement_strategy}\n\
- Total Duration: {duration_weeks} weeks\n\
- Key Milestones: {milestones}\n\
- Site Considerations: {site_considerations}\n\
- Architectural Style: {design_style}\n\n\
Based on this, outline a master plan including key phases, potential risks, and next steps for \
client approval. Output STRICTLY as a JSON object with keys: 'status', 'budget_summary', \
'timeline_summary', 'key_milestones_overview', 'risks_identified' (list of strings), 'next_steps' \
(list of strings).",
    schema: ResponseSchema::new(&["status", "budget_summary", "timeline_summary", "key_milestones_overview"]),
    fallback: plan_fallback,
    annotations: &[],
    pass_through: PASS_THROUGH,
    images: &[],
    finish: None,
};

fn risk_fallback() -> Value {
    json!({
        "identified_risks": ["Generic risk identified due to parsing error."],
        "mitigation_strategies": ["Generic mitigation strategy."],
        "safety_highlights": ["General safety practices applicable."]
    })
}

pub static RISK_SAFETY: AgentDescriptor = AgentDescriptor {
    id: "proactive_risk_safety_management_agent",
    name: "Proactive Risk & Safety Management Agent",
    description: "Identifies, assesses, and mitigates project risks and ensures safety compliance.",
    task: "risk/safety",
    activity: "risk/safety assessment",
    output_key: "risk_safety_assessment",
    temperature: 0.5,
    fields: &[
        PROJECT_DESCRIPTION,
        FieldSpec::text("budget_summary", "master_project_plan.budget_summary", "N/A"),
        FieldSpec::text("timeline_summary", "master_project_plan.timeline_summary", "N/A"),
        FieldSpec::text("milestones_overview", "master_project_plan.key_milestones_overview", "N/A"),
        FieldSpec::text("environmental_risk", "site_feasibility_report.environmental_risk", "Unknown"),
        FieldSpec::list(
            "compliance_challenges",
            "site_feasibility_report.compliance_challenges|site_feasibility_report.compliance_challenges_ai",
        ),
    ],
    prompt: "As a construction risk and safety manager, analyze the following project details and \
identify potential risks (financial, schedule, technical, safety). Suggest mitigation strategies \
for these risks.\n\
Project Description: {project_description}\n\
Master Plan Summary: {budget_summary}, {timeline_summary}, Milestones: {milestones_overview}\n\
Site Report Environmental Risk: {environmental_risk}\n\
Site Compliance Challenges: {compliance_challenges}\n\n\
Output STRICTLY as a JSON object with keys 'identified_risks' (list of strings with description \
and type), 'mitigation_strategies' (list of strings), 'safety_highlights' (list of strings).",
    schema: ResponseSchema::new(&["identified_risks", "mitigation_strategies", "safety_highlights"]),
    fallback: risk_fallback,
    annotations: &[("status", "risk_safety_assessment_complete")],
    pass_through: PASS_THROUGH,
    images: &[],
    finish: None,
};

fn quality_fallback() -> Value {
    json!({
        "quality_standards": ["Applicable local building codes and standards."],
        "inspection_checkpoints": ["Foundation inspection", "Structural frame inspection", "Final inspection"],
        "testing_protocols": ["Concrete strength testing", "MEP systems commissioning"]
    })
}

pub static QUALITY_ASSURANCE: AgentDescriptor = AgentDescriptor {
    id: "ai_driven_quality_assurance_control_agent",
    name: "AI-Driven Quality Assurance & Control Agent",
    description: "Defines quality standards, inspection checkpoints, and testing protocols.",
    task: "quality assurance",
    activity: "quality assurance planning",
    output_key: "quality_assurance_plan",
    temperature: 0.4,
    fields: &[
        project_type("residential"),
        LOCATION,
        DESIGN_STYLE,
        STRUCTURAL_NOTES,
        MEP_NOTES,
        MATERIAL_PALETTE,
        FieldSpec::text(
            "building_codes",
            "site_feasibility_report.common_building_codes",
            "Standard building codes apply.",
        ),
    ],
    prompt: "As a construction quality assurance and control manager, draft a quality plan for a \
'{project_type}' project in '{location}' with architectural style '{design_style}'. Take into \
account the structural notes '{structural_notes}', MEP notes '{mep_notes}', materials \
'{material_palette}' and the applicable building codes: {building_codes}. Define the quality \
standards to meet, the inspection checkpoints across construction phases, and the testing \
protocols for materials and systems.\n\n\
Output STRICTLY as a JSON object with keys 'quality_standards' (list of strings), \
'inspection_checkpoints' (list of strings), 'testing_protocols' (list of strings).",
    schema: ResponseSchema::new(&["quality_standards", "inspection_checkpoints", "testing_protocols"]),
    fallback: quality_fallback,
    annotations: &[("status", "qa_plan_drafted")],
    pass_through: PASS_THROUGH,
    images: &[],
    finish: None,
};

/// Upstream payloads summarised for the data integration prompt, by summary label.
const DATA_SOURCES: &[(&str, &str)] = &[
    ("client_requirements", "client_requirements.parsed_requirements"),
    ("site_report_keys", "site_feasibility_report"),
    ("architectural_keys", "architectural_concept"),
    ("system_design_keys", "system_design"),
    ("experiential_design_keys", "experiential_design"),
    ("cost_keys", "cost_supply_chain_analysis"),
    ("schedule_keys", "estimated_schedule"),
];

/// Maps each upstream payload to the list of keys it carries (empty when absent).
fn upstream_keys(input: &AgentInput) -> Value {
    let summary: Map<String, Value> = DATA_SOURCES
        .iter()
        .map(|(label, path)| {
            let keys = crate::descriptor::lookup(input, path)
                .and_then(Value::as_object)
                .map(|object| object.keys().cloned().map(Value::String).collect())
                .unwrap_or_default();
            ((*label).to_string(), Value::Array(keys))
        })
        .collect();
    Value::Object(summary)
}

fn data_fallback() -> Value {
    json!({
        "data_domains": ["Design", "Cost", "Schedule"],
        "integration_challenges": ["Data silos", "Format incompatibility"],
        "suggested_ontologies": ["IFC (Industry Foundation Classes)"]
    })
}

pub static DATA_INTEGRATION: AgentDescriptor = AgentDescriptor {
    id: "semantic_data_integration_ontology_agent",
    name: "Semantic Data Integration & Ontology Agent",
    description: "Manages project data integration and semantic consistency.",
    task: "data integration",
    activity: "data integration analysis",
    output_key: "data_integration_analysis",
    temperature: 0.3,
    fields: &[
        FieldSpec::text("project_id", "project_id", "unknown project"),
        FieldSpec::computed("upstream_keys", upstream_keys),
    ],
    prompt: "As a semantic data integration and ontology expert for construction projects, analyze \
the following data entities and types generated for project '{project_id}': {upstream_keys}. \
Suggest key data domains (e.g., BIM, GIS, Cost, Schedule, HR), potential data integration \
challenges, and propose relevant construction ontologies (e.g., IFC, buildingSMART Data \
Dictionary, W3C BOT Ontology) for semantic interoperability.\n\n\
Output STRICTLY as a JSON object with keys 'data_domains' (list of strings), \
'integration_challenges' (list of strings), 'suggested_ontologies' (list of strings).",
    schema: ResponseSchema::new(&["data_domains", "integration_challenges", "suggested_ontologies"]),
    fallback: data_fallback,
    annotations: &[("status", "data_integration_analysis_complete")],
    pass_through: PASS_THROUGH,
    images: &[],
    finish: None,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_keys_summary() {
        let input = json!({
            "site_feasibility_report": {"summary": "ok", "zoning_data": {}},
            "estimated_schedule": {"total_duration_weeks": 40}
        });
        let summary = upstream_keys(input.as_object().unwrap());

        assert_eq!(summary["site_report_keys"], json!(["summary", "zoning_data"]));
        assert_eq!(summary["schedule_keys"], json!(["total_duration_weeks"]));
        assert_eq!(summary["cost_keys"], json!([]));
    }

    #[test]
    fn test_plan_fallback_interpolates_budget() {
        let input = json!({
            "cost_supply_chain_analysis": {"total_estimated_cost_usd": 700_000},
            "estimated_schedule": {"total_duration_weeks": 52}
        });
        let fields = PROJECT_MANAGEMENT.resolve_fields(input.as_object().unwrap());
        let fallback = PROJECT_MANAGEMENT.render_fallback(&fields).unwrap();

        assert_eq!(fallback["budget_summary"], json!("Approx. $700000 (parsing error)"));
        assert_eq!(fallback["timeline_summary"], json!("52 weeks (parsing error)"));
        assert_eq!(fallback["status"], json!("master_plan_drafted_with_errors"));
    }
}

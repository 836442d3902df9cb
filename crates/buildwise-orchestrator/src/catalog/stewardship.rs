//! Stewardship agents: learning, human review, sustainability, finance, legal, workforce,
//! facility management and public relations.

use super::{
    DESIGN_STYLE, DURATION_WEEKS, LOCATION, MATERIAL_PALETTE, MEP_NOTES, PASS_THROUGH, PROJECT_DESCRIPTION,
    PROJECT_SIZE, STRUCTURAL_NOTES, project_type,
};
use crate::descriptor::{AgentDescriptor, FieldSpec};
use crate::response::ResponseSchema;
use serde_json::{Value, json};

const fn client_name(default: &'static str) -> FieldSpec {
    FieldSpec::text("client_name", "client_name|client_requirements.parsed_requirements.client_name", default)
}

fn learning_fallback() -> Value {
    json!({
        "lessons_learned": ["Generic lesson: communication is key."],
        "adaptation_suggestions": ["Improve initial planning accuracy."]
    })
}

pub static LEARNING_ADAPTATION: AgentDescriptor = AgentDescriptor {
    id: "learning_adaptation_agent",
    name: "Learning & Adaptation Agent",
    description: "Analyzes project outcomes to learn and suggest improvements for future projects.",
    task: "learning/adaptation",
    activity: "simulated learning",
    output_key: "learning_adaptation_insights",
    temperature: 0.6,
    fields: &[PROJECT_DESCRIPTION, PROJECT_SIZE, LOCATION],
    prompt: "Based on a hypothetical '{project_description}' project of '{project_size}' size in \
'{location}', what are common lessons learned or areas for adaptation in similar construction \
projects? Suggest improvements for efficiency, cost-effectiveness, or quality for future \
projects.\n\n\
Output STRICTLY as a JSON object with keys 'lessons_learned' (list of strings), \
'adaptation_suggestions' (list of strings).",
    schema: ResponseSchema::new(&["lessons_learned", "adaptation_suggestions"]),
    fallback: learning_fallback,
    annotations: &[("status", "simulated_learning_complete")],
    pass_through: PASS_THROUGH,
    images: &[],
    finish: None,
};

fn human_fallback() -> Value {
    json!({
        "summary_for_human": "Summary generation failed due to parsing error. Please review raw agent outputs.",
        "key_findings": ["Core data available in raw outputs."],
        "recommended_human_actions": ["Manually review all agent outputs."]
    })
}

pub static HUMAN_COLLABORATION: AgentDescriptor = AgentDescriptor {
    id: "human_ai_collaboration_explainability_agent",
    name: "Human-AI Collaboration & Explainability Agent",
    description: "Facilitates human interaction, explains AI decisions, and manages feedback.",
    task: "human collaboration summary",
    activity: "to prepare human collaboration summary",
    output_key: "human_collaboration_summary",
    temperature: 0.5,
    fields: &[
        client_name("Valued Client"),
        FieldSpec::object("master_plan", "master_project_plan"),
        FieldSpec::object("risk_assessment", "risk_safety_assessment"),
        FieldSpec::object("qa_plan", "quality_assurance_plan"),
    ],
    prompt: "As an AI system liaison, prepare a concise summary for human review for a \
construction project. Consolidate key information from the master project plan, risk and safety \
assessment, and quality assurance plan. Explain the key findings clearly and suggest next human \
actions (e.g., 'review and approve'). Address it to '{client_name}'.\n\n\
Master Project Plan: {master_plan}\n\
Risk & Safety Assessment: {risk_assessment}\n\
Quality Assurance Plan: {qa_plan}\n\n\
Output STRICTLY as a JSON object with keys 'summary_for_human' (string), 'key_findings' (list of \
strings), 'recommended_human_actions' (list of strings).",
    schema: ResponseSchema::new(&["summary_for_human", "key_findings", "recommended_human_actions"]),
    fallback: human_fallback,
    annotations: &[("status", "summary_for_human_review_prepared")],
    pass_through: PASS_THROUGH,
    images: &[],
    finish: None,
};

fn sustainability_fallback() -> Value {
    json!({
        "sustainability_potential": "Assessment failed due to parsing error.",
        "green_strategies": ["Use energy-efficient lighting", "Recycle construction waste"],
        "potential_certifications": ["Green Star"]
    })
}

pub static SUSTAINABILITY: AgentDescriptor = AgentDescriptor {
    id: "sustainability_green_building_agent",
    name: "Sustainability & Green Building Agent",
    description: "Optimizes environmental impact and ensures green building compliance.",
    task: "sustainability",
    activity: "sustainability assessment",
    output_key: "sustainability_analysis",
    temperature: 0.5,
    fields: &[PROJECT_DESCRIPTION, DESIGN_STYLE, STRUCTURAL_NOTES, MEP_NOTES, MATERIAL_PALETTE],
    prompt: "As a sustainability and green building expert, evaluate the potential for \
sustainability for a project described as '{project_description}' with architectural style \
'{design_style}', structural notes '{structural_notes}', MEP notes '{mep_notes}', and materials \
like '{material_palette}'. Suggest key green building strategies (e.g., energy efficiency, water \
conservation, material sourcing) and potential certifications (e.g., LEED, BREEAM, Passive House) \
it could aim for.\n\n\
Output STRICTLY as a JSON object with keys 'sustainability_potential' (string summary), \
'green_strategies' (list of strings), 'potential_certifications' (list of strings).",
    schema: ResponseSchema::new(&["sustainability_potential", "green_strategies", "potential_certifications"]),
    fallback: sustainability_fallback,
    annotations: &[("status", "sustainability_assessment_complete")],
    pass_through: PASS_THROUGH,
    images: &[],
    finish: None,
};

fn financial_fallback() -> Value {
    json!({
        "investment_overview": "Financial analysis failed due to parsing error.",
        "projected_roi": "N/A",
        "financing_options": ["Construction loan", "Equity financing"],
        "financial_risks": ["Cost overruns", "Interest rate changes"]
    })
}

pub static FINANCIAL_ANALYSIS: AgentDescriptor = AgentDescriptor {
    id: "financial_investment_analysis_agent",
    name: "Financial & Investment Analysis Agent",
    description: "Evaluates project financing, investment returns, and financial risks.",
    task: "financial analysis",
    activity: "financial analysis",
    output_key: "financial_investment_analysis",
    temperature: 0.4,
    fields: &[
        PROJECT_DESCRIPTION,
        project_type("residential"),
        LOCATION,
        FieldSpec::text("estimated_budget", "cost_supply_chain_analysis.total_estimated_cost_usd", "N/A"),
        FieldSpec::object("cost_breakdown", "cost_supply_chain_analysis.cost_breakdown"),
        FieldSpec::text("budget_range", "budget_range|client_requirements.parsed_requirements.budget_range", "N/A"),
        DURATION_WEEKS,
    ],
    prompt: "As a construction finance and investment analyst, assess the financial viability of \
the '{project_description}' ({project_type}) project in '{location}'. The estimated cost is \
{estimated_budget} USD with breakdown {cost_breakdown}, the client's budget range is \
'{budget_range}' and the estimated duration is {duration_weeks} weeks. Give an investment \
overview, a projected return on investment, suitable financing options and the main financial \
risks.\n\n\
Output STRICTLY as a JSON object with keys 'investment_overview' (string summary), \
'projected_roi' (string), 'financing_options' (list of strings), 'financial_risks' (list of \
strings).",
    schema: ResponseSchema::new(&["investment_overview", "projected_roi", "financing_options", "financial_risks"]),
    fallback: financial_fallback,
    annotations: &[("status", "financial_analysis_complete")],
    pass_through: PASS_THROUGH,
    images: &[],
    finish: None,
};

fn legal_fallback() -> Value {
    json!({
        "legal_overview": "Legal assessment failed due to parsing error.",
        "common_contract_types": ["Fixed Price", "Cost-Plus"],
        "key_contract_clauses": ["Scope of Work", "Payment Terms"],
        "required_permits_licenses": ["Building Permit", "Zoning Approval"]
    })
}

pub static LEGAL_CONTRACT: AgentDescriptor = AgentDescriptor {
    id: "legal_contract_management_agent",
    name: "Legal & Contract Management Agent",
    description: "Manages legal documents, contracts, and regulatory compliance.",
    task: "legal/contract management",
    activity: "legal/contract assessment",
    output_key: "legal_contract_analysis",
    temperature: 0.5,
    fields: &[
        project_type("construction"),
        LOCATION,
        FieldSpec::text(
            "regulatory_summary",
            "site_feasibility_report.summary|site_feasibility_report.regulatory_summary_ai",
            "N/A",
        ),
        FieldSpec::list(
            "compliance_challenges",
            "site_feasibility_report.compliance_challenges|site_feasibility_report.compliance_challenges_ai",
        ),
    ],
    prompt: "As a construction legal and contract management expert, outline key legal \
considerations and common contract types for a '{project_type}' project in '{location}'. Consider \
regulatory challenges mentioned in the site report: '{regulatory_summary}' and potential \
compliance challenges: {compliance_challenges}. Suggest important contract clauses and necessary \
permits/licenses.\n\n\
Output STRICTLY as a JSON object with keys 'legal_overview' (string summary), \
'common_contract_types' (list of strings), 'key_contract_clauses' (list of strings), \
'required_permits_licenses' (list of strings).",
    schema: ResponseSchema::new(&[
        "legal_overview",
        "common_contract_types",
        "key_contract_clauses",
        "required_permits_licenses",
    ]),
    fallback: legal_fallback,
    annotations: &[("status", "legal_assessment_complete")],
    pass_through: PASS_THROUGH,
    images: &[],
    finish: None,
};

fn workforce_fallback() -> Value {
    json!({
        "workforce_needs": ["Skilled laborers", "Project manager"],
        "hr_considerations": ["Competitive salaries", "Safety training"],
        "labor_compliance_highlights": ["Local labor laws adherence"]
    })
}

pub static WORKFORCE_HR: AgentDescriptor = AgentDescriptor {
    id: "workforce_management_hr_agent",
    name: "Workforce Management & HR Agent",
    description: "Optimizes workforce allocation and manages HR functions.",
    task: "workforce/HR",
    activity: "workforce/HR assessment",
    output_key: "workforce_hr_analysis",
    temperature: 0.5,
    fields: &[PROJECT_SIZE, DURATION_WEEKS, LOCATION],
    prompt: "As a construction workforce and HR manager, based on a '{project_size}' size project \
with an estimated duration of {duration_weeks} weeks in '{location}', outline the key workforce \
needs (e.g., required trades, estimated team size), important HR considerations (e.g., recruitment \
challenges, training needs, labor laws), and basic labor compliance aspects for this type of \
project.\n\n\
Output STRICTLY as a JSON object with keys 'workforce_needs' (list of strings), \
'hr_considerations' (list of strings), 'labor_compliance_highlights' (list of strings).",
    schema: ResponseSchema::new(&["workforce_needs", "hr_considerations", "labor_compliance_highlights"]),
    fallback: workforce_fallback,
    annotations: &[("status", "workforce_hr_assessment_complete")],
    pass_through: PASS_THROUGH,
    images: &[],
    finish: None,
};

fn facility_fallback() -> Value {
    json!({
        "fm_overview": "FM assessment failed due to parsing error.",
        "maintenance_requirements": ["HVAC checks", "Roof inspections"],
        "operational_challenges": ["Energy consumption management"],
        "smart_building_tech_suggestions": ["Automated lighting", "Predictive HVAC"]
    })
}

pub static FACILITY_MANAGEMENT: AgentDescriptor = AgentDescriptor {
    id: "post_construction_facility_management_agent",
    name: "Post-Construction & Facility Management Agent",
    description: "Manages post-construction operations and facility maintenance.",
    task: "post-construction/FM",
    activity: "FM assessment",
    output_key: "post_construction_fm_analysis",
    temperature: 0.5,
    fields: &[project_type("residential"), PROJECT_DESCRIPTION, DESIGN_STYLE, MEP_NOTES],
    prompt: "As a facility management expert, outline key post-construction and facility management \
considerations for a '{project_type}' project described as '{project_description}'. Consider its \
architectural style '{design_style}' and system design elements (e.g., '{mep_notes}'). Suggest \
typical maintenance requirements, potential operational challenges, and smart building \
technologies for long-term efficiency.\n\n\
Output STRICTLY as a JSON object with keys 'fm_overview' (string summary), \
'maintenance_requirements' (list of strings), 'operational_challenges' (list of strings), \
'smart_building_tech_suggestions' (list of strings).",
    schema: ResponseSchema::new(&[
        "fm_overview",
        "maintenance_requirements",
        "operational_challenges",
        "smart_building_tech_suggestions",
    ]),
    fallback: facility_fallback,
    annotations: &[("status", "fm_assessment_complete")],
    pass_through: PASS_THROUGH,
    images: &[],
    finish: None,
};

fn public_relations_fallback() -> Value {
    json!({
        "communication_overview": "PR strategy generation failed due to parsing error.",
        "key_stakeholders": ["Local residents", "Media"],
        "communication_channels": ["Project website", "Local newspaper"],
        "key_messages": ["Building for the future", "Minimizing disruption"]
    })
}

pub static PUBLIC_RELATIONS: AgentDescriptor = AgentDescriptor {
    id: "public_relations_stakeholder_communication_agent",
    name: "Public Relations & Stakeholder Communication Agent",
    description: "Manages external communications and stakeholder engagement.",
    task: "public relations",
    activity: "PR strategy generation",
    output_key: "public_relations_strategy",
    temperature: 0.5,
    fields: &[client_name("the Client"), PROJECT_DESCRIPTION, LOCATION],
    prompt: "As a public relations and stakeholder communication expert for a construction project, \
outline a preliminary communication strategy for the '{project_description}' project in \
'{location}', initiated by '{client_name}'. Identify key stakeholder groups (e.g., local \
community, government, media, investors), suggest communication channels (e.g., press releases, \
community meetings, social media), and propose key messages for transparency and positive public \
image.\n\n\
Output STRICTLY as a JSON object with keys 'communication_overview' (string summary), \
'key_stakeholders' (list of strings), 'communication_channels' (list of strings), 'key_messages' \
(list of strings).",
    schema: ResponseSchema::new(&[
        "communication_overview",
        "key_stakeholders",
        "communication_channels",
        "key_messages",
    ]),
    fallback: public_relations_fallback,
    annotations: &[("status", "pr_strategy_drafted")],
    pass_through: PASS_THROUGH,
    images: &[],
    finish: None,
};

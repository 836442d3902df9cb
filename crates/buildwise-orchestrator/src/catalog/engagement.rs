//! Project intake: client requirements and site feasibility.

use super::site_data::{attach_site_data, site_info};
use super::{LOCATION, PASS_THROUGH, project_type};
use crate::descriptor::{AgentDescriptor, AgentInput, FieldSpec};
use crate::response::ResponseSchema;
use serde_json::{Value, json};

fn whole_inquiry(input: &AgentInput) -> Value {
    Value::Object(input.clone())
}

fn client_fallback() -> Value {
    json!({
        "parsed_requirements": "{inquiry}",
        "clarification_needed": "Gemini could not parse inquiry, manual review needed.",
        "suggested_next_steps": "Manual review of client inquiry."
    })
}

pub static CLIENT_ENGAGEMENT: AgentDescriptor = AgentDescriptor {
    id: "strategic_client_engagement_agent",
    name: "Strategic Client Engagement Agent",
    description: "Manages initial client interaction, requirement gathering, and project initiation.",
    task: "requirement parsing",
    activity: "to process client inquiry",
    output_key: "client_requirements",
    temperature: 0.2,
    fields: &[FieldSpec::computed("inquiry", whole_inquiry)],
    prompt: "Analyze the following client inquiry for a construction project and extract key, \
structured requirements. Be precise about 'project_type', 'client_name', 'budget_range', \
'location', and 'desired_features'. Identify any ambiguities or areas requiring clarification. \
Also, suggest immediate next steps for the project lifecycle.\n\n\
Client Inquiry: {inquiry}\n\n\
Format the output STRICTLY as a JSON object with keys 'parsed_requirements' (object), \
'clarification_needed' (string), 'suggested_next_steps' (string).",
    schema: ResponseSchema::new(&["parsed_requirements", "clarification_needed", "suggested_next_steps"]),
    fallback: client_fallback,
    annotations: &[],
    pass_through: PASS_THROUGH,
    images: &[],
    finish: None,
};

fn site_fallback() -> Value {
    json!({
        "summary": "Could not parse regulatory summary from AI. Manual review required.",
        "compliance_challenges": ["AI parsing failed or response malformed."],
        "recommendations": ["Consult local regulations directly for detailed compliance."]
    })
}

pub static SITE_INTELLIGENCE: AgentDescriptor = AgentDescriptor {
    id: "site_intelligence_regulatory_compliance_agent",
    name: "Site Intelligence & Regulatory Compliance Agent",
    description: "Analyzes site feasibility, zoning, and regulatory compliance.",
    task: "regulatory interpretation",
    activity: "site analysis",
    output_key: "site_feasibility_report",
    temperature: 0.2,
    fields: &[
        LOCATION,
        project_type("residential"),
        FieldSpec::object("requirements", "client_requirements.parsed_requirements"),
        FieldSpec::computed("site_info", site_info),
    ],
    prompt: "Given the following site information and common building codes for a '{location}' \
located project of type '{project_type}', summarize the key regulatory constraints and primary \
environmental risks. Focus on aspects like maximum height, setbacks, and notable code sections. \
Also, identify any potential compliance challenges given the initial requirements: {requirements}.\n\
Site Info: {site_info}\n\n\
Format the output STRICTLY as a JSON object with keys 'summary' (string), \
'compliance_challenges' (list of strings), 'recommendations' (list of strings).",
    schema: ResponseSchema::new(&["summary", "compliance_challenges", "recommendations"]),
    fallback: site_fallback,
    annotations: &[("status", "initial_analysis_complete")],
    pass_through: PASS_THROUGH,
    images: &[],
    finish: Some(attach_site_data),
};

//! The built-in agent catalog.
//!
//! Descriptors are listed in pipeline order: each agent may read the payloads of the agents
//! before it, merged into the input under their output keys.

mod delivery;
mod design;
mod engagement;
pub mod site_data;
mod stewardship;

use crate::descriptor::{AgentDescriptor, FieldSpec};

pub use delivery::{COST_SUPPLY_CHAIN, DATA_INTEGRATION, PROJECT_MANAGEMENT, QUALITY_ASSURANCE, RISK_SAFETY};
pub use design::{ARCHITECTURAL_DESIGN, DIGITAL_TWIN, EXPERIENTIAL_DESIGN, SYSTEMS_ENGINEERING};
pub use engagement::{CLIENT_ENGAGEMENT, SITE_INTELLIGENCE};
pub use stewardship::{
    FACILITY_MANAGEMENT, FINANCIAL_ANALYSIS, HUMAN_COLLABORATION, LEARNING_ADAPTATION, LEGAL_CONTRACT,
    PUBLIC_RELATIONS, SUSTAINABILITY, WORKFORCE_HR,
};

/// Every built-in descriptor, in pipeline order.
pub static CATALOG: &[&AgentDescriptor] = &[
    &CLIENT_ENGAGEMENT,
    &SITE_INTELLIGENCE,
    &ARCHITECTURAL_DESIGN,
    &SYSTEMS_ENGINEERING,
    &EXPERIENTIAL_DESIGN,
    &DIGITAL_TWIN,
    &COST_SUPPLY_CHAIN,
    &PROJECT_MANAGEMENT,
    &RISK_SAFETY,
    &QUALITY_ASSURANCE,
    &DATA_INTEGRATION,
    &LEARNING_ADAPTATION,
    &HUMAN_COLLABORATION,
    &SUSTAINABILITY,
    &FINANCIAL_ANALYSIS,
    &LEGAL_CONTRACT,
    &WORKFORCE_HR,
    &FACILITY_MANAGEMENT,
    &PUBLIC_RELATIONS,
];

/// Finds a built-in descriptor by ID.
pub fn find(id: &str) -> Option<&'static AgentDescriptor> {
    CATALOG.iter().copied().find(|d| d.id == id)
}

// Fields shared by several agents. Top-level keys win over the requirements parsed by the
// client engagement agent.

pub(crate) const LOCATION: FieldSpec = FieldSpec::text(
    "location",
    "location|client_requirements.parsed_requirements.location",
    "unspecified",
);

pub(crate) const PROJECT_DESCRIPTION: FieldSpec = FieldSpec::text(
    "project_description",
    "project_description|client_requirements.parsed_requirements.project_description",
    "a construction project",
);

pub(crate) const PROJECT_SIZE: FieldSpec = FieldSpec::text(
    "project_size",
    "project_size|client_requirements.parsed_requirements.project_size",
    "medium",
);

pub(crate) const DESIGN_STYLE: FieldSpec = FieldSpec::text(
    "design_style",
    "architectural_concept.design_summary|architectural_concept.design_style_summary",
    "N/A",
);

pub(crate) const STRUCTURAL_NOTES: FieldSpec =
    FieldSpec::text("structural_notes", "system_design.structural_notes", "N/A");

pub(crate) const MEP_NOTES: FieldSpec = FieldSpec::text("mep_notes", "system_design.mep_notes", "N/A");

pub(crate) const MATERIAL_PALETTE: FieldSpec =
    FieldSpec::text("material_palette", "experiential_design.material_palette_notes", "N/A");

pub(crate) const DURATION_WEEKS: FieldSpec =
    FieldSpec::text("duration_weeks", "estimated_schedule.total_duration_weeks", "N/A");

/// Builds a `project_type` field with an agent-specific default.
pub(crate) const fn project_type(default: &'static str) -> FieldSpec {
    FieldSpec::text(
        "project_type",
        "project_type|client_requirements.parsed_requirements.project_type",
        default,
    )
}

/// Every agent reports the project it worked on.
pub(crate) const PASS_THROUGH: &[&str] = &["project_id"];

//! Full catalog pipelines over a scripted backend.

use buildwise_abstraction::GenerationError;
use buildwise_models::{GenerationClient, MockBackend};
use buildwise_orchestrator::{AgentInput, AgentSystem};
use serde_json::json;
use std::sync::Arc;

fn system(backend: &Arc<MockBackend>) -> AgentSystem {
    AgentSystem::with_client(Arc::new(GenerationClient::with_backend(backend.clone())))
}

#[tokio::test]
async fn test_full_pipeline_on_fallbacks() {
    let backend = Arc::new(MockBackend::new("mock"));
    let pipeline = system(&backend).pipeline::<&str>(&[]).await.unwrap();
    let input = json!({
        "client_name": "Ada",
        "location": "Rural, California, USA",
        "project_type": "residential",
        "desired_features": ["passive cooling"],
        "estimated_schedule": {"total_duration_weeks": 48, "milestones": ["Permits", "Frame"]}
    })
    .as_object()
    .cloned()
    .unwrap();

    let report = pipeline.run(input).await;

    assert!(report.is_success());
    assert_eq!(report.outputs.len(), 19);
    assert_eq!(report.degraded_count(), 19);
    assert_eq!(report.halted_at, None);

    let state = &report.state;
    let project_id = state["project_id"].as_str().unwrap();
    assert!(project_id.starts_with("proj_"));
    assert_eq!(state["client_name"], json!("Ada"));
    assert_eq!(state["site_feasibility_report"]["zoning_data"]["allowed_height_m"], json!(10));
    assert_eq!(state["master_project_plan"]["budget_summary"], json!("Approx. $700000 (parsing error)"));
    assert_eq!(state["master_project_plan"]["timeline_summary"], json!("48 weeks (parsing error)"));
    assert_eq!(state["public_relations_strategy"]["project_id"], json!(project_id));

    // 19 text calls plus one concept render and two twin renders.
    assert_eq!(backend.text_calls(), 19);
    assert_eq!(backend.image_calls(), 3);
}

#[tokio::test]
async fn test_later_agents_see_earlier_payloads() {
    let backend = Arc::new(
        MockBackend::new("mock")
            .with_text(Ok(json!({
                "summary": "Wildfire zone.",
                "compliance_challenges": ["WUI ignition-resistant cladding"],
                "recommendations": []
            })
            .to_string()))
            .with_text(Ok("not json".to_string())),
    );
    let pipeline = system(&backend)
        .pipeline(&["site_intelligence_regulatory_compliance_agent", "legal_contract_management_agent"])
        .await
        .unwrap();

    let input = json!({"project_id": "p7", "location": "Rural, California, USA"}).as_object().cloned().unwrap();
    let report = pipeline.run(input).await;

    assert_eq!(report.degraded_count(), 1);
    let legal_prompt = &backend.requests()[1].prompt;
    assert!(legal_prompt.contains("site report: 'Wildfire zone.'"));
    assert!(legal_prompt.contains("compliance challenges: WUI ignition-resistant cladding."));
    assert_eq!(report.state["legal_contract_analysis"]["status"], json!("legal_assessment_complete"));
}

#[tokio::test]
async fn test_pipeline_halts_on_unavailable_backend() {
    let backend = Arc::new(MockBackend::new("mock"));
    backend.push_text(Ok("{}".to_string()));
    backend.push_text(Err(GenerationError::Api { status: 503, body: "overloaded".to_string() }));

    let report = system(&backend).pipeline::<&str>(&[]).await.unwrap().run(AgentInput::new()).await;

    assert_eq!(report.outputs.len(), 2);
    assert_eq!(report.halted_at.as_deref(), Some("site_intelligence_regulatory_compliance_agent"));
    assert!(report.state.contains_key("client_requirements"));
    assert!(!report.state.contains_key("site_feasibility_report"));
}

#[tokio::test]
async fn test_pipeline_continues_when_configured() {
    let backend = Arc::new(MockBackend::new("mock"));
    backend.push_text(Err(GenerationError::Request("timeout".to_string())));

    let report = system(&backend)
        .pipeline(&["strategic_client_engagement_agent", "learning_adaptation_agent"])
        .await
        .unwrap()
        .continue_on_error()
        .run(AgentInput::new())
        .await;

    assert_eq!(report.outputs.len(), 2);
    assert!(!report.outputs[0].is_success());
    assert!(report.outputs[1].is_success());
    assert!(report.state.contains_key("learning_adaptation_insights"));
    assert!(!report.is_success());
}

#[tokio::test]
async fn test_report_serializes() {
    let backend = Arc::new(MockBackend::new("mock"));
    let report = system(&backend)
        .pipeline(&["learning_adaptation_agent"])
        .await
        .unwrap()
        .run(json!({"project_id": "p8"}).as_object().cloned().unwrap())
        .await;

    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["halted_at"], serde_json::Value::Null);
    assert_eq!(value["outputs"][0]["status"], json!("success"));
    assert_eq!(
        value["outputs"][0]["learning_adaptation_insights"]["status"],
        json!("simulated_learning_complete")
    );
}

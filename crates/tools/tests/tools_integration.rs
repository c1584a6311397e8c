//! End-to-end tool calls through the registry

use serde_json::{json, Value};
use std::sync::Arc;

use partner_commission_config::PricingDomainConfig;
use partner_commission_core::TierOverride;
use partner_commission_tools::{create_registry, ToolError, ToolExecutor, ToolRegistry};

const AS_OF: &str = "2025-03-03T09:00:00Z";
const EVENT_DATE: &str = "2025-04-16T10:00:00Z";

fn registry() -> ToolRegistry {
    create_registry(Arc::new(PricingDomainConfig::default())).unwrap()
}

async fn call(registry: &ToolRegistry, name: &str, input: Value) -> (Value, bool) {
    let output = registry.execute(name, input).await.unwrap();
    (output.to_json().unwrap(), output.is_error)
}

fn running_quote() -> Value {
    json!({
        "event_type": "running",
        "coverage_type": "liability",
        "participants": 10,
        "event_date": EVENT_DATE,
        "duration_hours": 2,
        "partner_volume": 3000,
        "as_of": AS_OF,
    })
}

#[tokio::test]
async fn test_resolve_tier_reports_progress() {
    let registry = registry();

    let (gold, _) = call(&registry, "resolve_commission_tier", json!({ "volume": 2500 })).await;
    assert_eq!(gold["tier"]["name"], "Gold");
    assert_eq!(gold["next_tier"]["name"], "Platinum");
    assert_eq!(gold["participants_to_next"], 2500);
    assert_eq!(gold["below_minimum"], false);

    let (top, _) = call(&registry, "resolve_commission_tier", json!({ "volume": "12,000" })).await;
    assert_eq!(top["tier"]["name"], "Platinum");
    assert_eq!(top["is_top_tier"], true);
    assert!(top["next_tier"].is_null());

    let (small, _) = call(&registry, "resolve_commission_tier", json!({ "volume": 120 })).await;
    assert_eq!(small["tier"]["name"], "Bronze");
    assert_eq!(small["below_minimum"], true);
}

#[tokio::test]
async fn test_override_progress_follows_assigned_tier() {
    let mut config = PricingDomainConfig::default();
    config.tier_overrides.push(TierOverride {
        partner_id: "gym-42".to_string(),
        tier_name: "Platinum".to_string(),
        reason: Some("Launch partner".to_string()),
        expires_at: None,
    });
    let registry = create_registry(Arc::new(config)).unwrap();

    let (result, _) = call(
        &registry,
        "resolve_commission_tier",
        json!({ "volume": 600, "partner_id": "gym-42", "as_of": AS_OF }),
    )
    .await;

    assert_eq!(result["is_override"], true);
    assert_eq!(result["tier"]["name"], "Platinum");
    assert_eq!(result["volume_tier"], "Bronze");
    assert!(result["next_tier"].is_null());
    assert_eq!(result["participants_to_next"], 0);
    assert_eq!(result["is_top_tier"], true);
    assert!(!result["message"].as_str().unwrap().contains("more participants"));
}

#[tokio::test]
async fn test_earnings_by_profile() {
    let registry = registry();

    let (dashboard, _) = call(&registry, "calculate_earnings", json!({ "volume": 2500 })).await;
    assert_eq!(dashboard["profile"], "partner_dashboard");
    assert_eq!(dashboard["earnings"]["tier_name"], "Gold");
    assert_eq!(dashboard["earnings"]["monthly_earnings"], 50000.0);

    let (wellness, _) = call(
        &registry,
        "calculate_earnings",
        json!({ "volume": 1000, "profile": "wellness", "include_curve": true }),
    )
    .await;
    assert_eq!(wellness["earnings"]["covered_participants"], 950);
    assert_eq!(wellness["earnings"]["monthly_earnings"], 17100.0);
    assert_eq!(wellness["earnings"]["annual_earnings"], 205200.0);
    assert!(wellness["curve"].as_array().is_some_and(|c| !c.is_empty()));

    let err = registry
        .execute("calculate_earnings", json!({ "volume": 100, "profile": "kiosk" }))
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::InvalidParams(_)));
}

#[tokio::test]
async fn test_commission_with_flat_bonus() {
    let registry = registry();

    let (result, _) = call(
        &registry,
        "calculate_commission",
        json!({ "premium": 1000, "volume": 2500, "policy_count": 2, "as_of": AS_OF }),
    )
    .await;

    assert_eq!(result["tier"]["name"], "Gold");
    assert_eq!(result["commission"]["commission_amount"], 500.0);
    assert_eq!(result["commission"]["flat_bonus_amount"], 50.0);
    assert_eq!(result["commission"]["total_commission"], 550.0);

    let err = registry
        .execute("calculate_commission", json!({ "premium": -5, "volume": 2500 }))
        .await
        .unwrap_err();
    assert_eq!(err.code(), -32602);
}

#[tokio::test]
async fn test_validate_quote_lists_every_problem() {
    let registry = registry();

    let (report, is_error) = call(
        &registry,
        "validate_quote",
        json!({
            "event_type": "running",
            "coverage_type": "fire",
            "participants": 0,
            "event_date": "2025-03-01T10:00:00Z",
            "as_of": AS_OF,
        }),
    )
    .await;

    assert!(!is_error);
    assert_eq!(report["valid"], false);
    let codes: Vec<&str> = report["errors"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["code"].as_str())
        .collect();
    assert!(codes.contains(&"COVERAGE_TYPE_INVALID"));
    assert!(codes.contains(&"PARTICIPANTS_TOO_FEW"));
    assert!(codes.contains(&"EVENT_DATE_PAST"));
    assert_eq!(report["quick_check"]["acceptable"], false);
    assert_eq!(report["quick_check"]["reason"], "Event date is in the past");
}

#[tokio::test]
async fn test_invalid_quote_is_never_priced() {
    let registry = registry();
    let mut input = running_quote();
    input["participants"] = json!(2.5);

    let (result, is_error) = call(&registry, "calculate_quote_pricing", input).await;

    assert!(is_error);
    assert_eq!(result["valid"], false);
    assert!(result.get("quote").is_none());
    assert_eq!(result["errors"][0]["code"], "PARTICIPANTS_NOT_INTEGER");
}

#[tokio::test]
async fn test_quote_pricing_creates_pending_record() {
    let registry = registry();
    let mut input = running_quote();
    input["partner_id"] = json!("studio-7");
    input["all_coverages"] = json!(true);

    let (result, is_error) = call(&registry, "calculate_quote_pricing", input).await;

    assert!(!is_error);
    assert_eq!(result["valid"], true);

    let quote = &result["quote"];
    assert_eq!(quote["status"], "pending");
    assert_eq!(quote["partner_id"], "studio-7");
    assert_eq!(quote["expires_at"], "2025-04-02T09:00:00Z");
    assert_eq!(quote["pricing"]["premium"], 47.9);
    assert_eq!(quote["pricing"]["commission_tier"], "Gold");
    assert_eq!(quote["pricing"]["commission"], 23.95);

    let coverages = result["coverages"].as_array().unwrap();
    assert_eq!(coverages.len(), 3);
    assert_eq!(coverages[0]["coverage_type"], "liability");
    assert_eq!(result["manual_review"]["required"], false);
    assert_eq!(result["underwriting"]["decision"], "auto-approve");
}

#[tokio::test]
async fn test_underwriting_decision_follows_partner_history() {
    let registry = registry();

    let (clean, is_error) = call(&registry, "assess_quote_risk", running_quote()).await;
    assert!(!is_error);
    // 50 + 5 (unclassified) - 5 (44 days out) - 3 (2 hours)
    assert_eq!(clean["assessment"]["risk_score"], 47);
    assert_eq!(clean["assessment"]["overall_risk"], "low");
    assert_eq!(clean["assessment"]["decision"], "auto-approve");

    let mut input = running_quote();
    input["partner_history"] = json!({
        "totalQuotes": 30,
        "totalPolicies": 10,
        "claimsCount": 1,
        "claimsRate": 0.1,
    });
    let (risky, _) = call(&registry, "assess_quote_risk", input).await;
    assert_eq!(risky["assessment"]["risk_score"], 67);
    assert_eq!(risky["assessment"]["overall_risk"], "medium");
    assert_eq!(risky["assessment"]["decision"], "review-required");
    assert_eq!(risky["assessment"]["requires_review"], true);

    let mut invalid = running_quote();
    invalid["coverage_type"] = json!("fire");
    let (_, is_error) = call(&registry, "assess_quote_risk", invalid).await;
    assert!(is_error);
}

#[tokio::test]
async fn test_estimates_cover_every_coverage() {
    let registry = registry();

    let (result, _) = call(
        &registry,
        "estimate_quote_ranges",
        json!({ "event_type": "kayaking", "as_of": AS_OF }),
    )
    .await;

    assert_eq!(result["participants"], 100);
    let estimates = result["estimates"].as_array().unwrap();
    assert_eq!(estimates.len(), 3);
    for estimate in estimates {
        let min = estimate["min_price"].as_f64().unwrap();
        let typical = estimate["typical"].as_f64().unwrap();
        let max = estimate["max_price"].as_f64().unwrap();
        assert!(min < typical && typical < max);
    }
}

#[tokio::test]
async fn test_unknown_tool() {
    let registry = registry();

    let err = registry.execute("quote_lookup", json!({})).await.unwrap_err();
    assert_eq!(err, ToolError::NotFound("quote_lookup".to_string()));
    assert_eq!(err.code(), -32601);
}

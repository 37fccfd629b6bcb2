//! Acceptance tests for the protocol crate.
//!
//! Tests cover:
//! - Trait object safety (Box<dyn Trait> / Arc<dyn Trait> are Send + Sync)
//! - Wire formats of the types a host persists or loads
//! - Parameter files with partial contents

use chdet_types::*;
use serde_json::json;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Object Safety: Box<dyn Trait> compiles and is Send + Sync
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn _assert_send_sync<T: Send + Sync>() {}

#[test]
fn hook_is_object_safe_send_sync() {
    _assert_send_sync::<Box<dyn Hook>>();
    _assert_send_sync::<std::sync::Arc<dyn Hook>>();
}

#[test]
fn presenter_is_object_safe_send_sync() {
    _assert_send_sync::<Box<dyn Presenter>>();
    _assert_send_sync::<std::sync::Arc<dyn Presenter>>();
}

#[test]
fn result_sink_is_object_safe_send_sync() {
    _assert_send_sync::<Box<dyn ResultSink>>();
    _assert_send_sync::<std::sync::Arc<dyn ResultSink>>();
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Wire formats
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn sample_result() -> TrialResult {
    let stim = Stimulus::new(Location::new(2.0, -4.0), Color::rgb(1.0, 1.0, -1.0));
    TrialResult {
        block_num: 1,
        trial_num: 3,
        timestamp_ms: 1_700_000_000_000,
        condition: Condition::Same,
        set_size: 1,
        is_change: false,
        correct_key: "s".into(),
        response: Some("d".into()),
        accuracy: Some(false),
        rt_ms: Some(612.0),
        probe_index: 0,
        changed: None,
        sample: vec![stim],
        test: vec![stim],
        extra: serde_json::Map::new(),
    }
}

#[test]
fn trial_result_wire_format() {
    let json = serde_json::to_value(sample_result()).unwrap();
    assert_eq!(json["condition"], "same");
    assert_eq!(json["accuracy"], false);
    assert_eq!(json["sample"][0]["location"]["quadrant"], 3);
    assert_eq!(json["sample"][0]["color"], json!([1.0, 1.0, -1.0]));
    // Empty extras are omitted.
    assert!(json.get("extra").is_none());
}

#[test]
fn trial_result_extras_survive_serde() {
    let mut result = sample_result();
    result
        .extra
        .insert("eye_tracker_ok".into(), json!(true));
    let text = serde_json::to_string(&result).unwrap();
    let back: TrialResult = serde_json::from_str(&text).unwrap();
    assert_eq!(back.extra["eye_tracker_ok"], json!(true));
    assert_eq!(back, result);
}

#[test]
fn hook_context_starts_empty() {
    let ctx = HookContext::new(HookPoint::Setup);
    assert_eq!(ctx.point, HookPoint::Setup);
    assert!(ctx.block.is_none());
    assert!(ctx.trial.is_none());
    assert!(ctx.result.is_none());
    assert_eq!(ctx.trials_completed, 0);
    assert_eq!(ctx.elapsed, DurationMs::ZERO);
}

#[test]
fn run_error_messages_name_the_hook() {
    let err = RunError::HookContractViolation {
        point: HookPoint::PostBlock,
        reason: "replace_trial is not valid here".into(),
    };
    assert_eq!(
        err.to_string(),
        "hook contract violation at post_block_hook: replace_trial is not valid here"
    );
    let err = RunError::from(GenError::LayoutInfeasible {
        set_size: 8,
        attempts: 100,
    });
    assert!(err.to_string().contains("set size 8"));
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Parameter files
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[test]
fn parameter_file_with_enums_and_palette() {
    let params = ExperimentParams::from_json(
        r#"{
            "colors": [[1, -1, -1], [-1, 1, -1], [-1, -1, 1], [1, 1, -1]],
            "set_sizes": [2, 4],
            "condition_sampling": "balanced",
            "change_attribute": "location",
            "response_timeout": 3000,
            "questionaire_dict": [
                {"label": "Handedness", "kind": "choice", "options": ["Left", "Right"]}
            ]
        }"#,
    )
    .unwrap();
    assert_eq!(params.colors.len(), 4);
    assert_eq!(params.condition_sampling, ConditionSampling::Balanced);
    assert_eq!(params.change_attribute, ChangeAttribute::Location);
    assert_eq!(params.response_timeout, Some(DurationMs::from_secs(3)));
    assert_eq!(params.questionaire_dict[0].default_answer(), "Left");
}

#[test]
fn parameters_serialize_back_to_loadable_json() {
    let params = ExperimentParams {
        seed: Some(99),
        ..Default::default()
    };
    let text = serde_json::to_string(&params).unwrap();
    let back = ExperimentParams::from_json(&text).unwrap();
    assert_eq!(back, params);
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Test doubles
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(feature = "test-utils")]
#[tokio::test]
async fn scripted_presenter_drains_queue_then_defaults() {
    use chdet_types::test_utils::ScriptedPresenter;

    let presenter = ScriptedPresenter::with_responses(vec![Response::Timeout]);
    let keys = vec!["s".to_string(), "d".to_string()];
    assert_eq!(
        presenter.await_response(&keys, None).await.unwrap(),
        Response::Timeout
    );
    assert_eq!(
        presenter.await_response(&keys, None).await.unwrap(),
        Response::Key {
            key: "s".into(),
            rt_ms: 500.0
        }
    );

    let info = presenter
        .prompt_dialog(&ExperimentParams::default().questionaire_dict)
        .await
        .unwrap()
        .unwrap();
    assert!(info.contains_key("Gender"));
    assert!(
        ScriptedPresenter::new()
            .cancelling_dialog()
            .prompt_dialog(&[])
            .await
            .unwrap()
            .is_none()
    );
}

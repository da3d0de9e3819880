//! End-to-end flow over the in-memory records: users, models, tasks, history.

use modelhub::models::ModelError;
use modelhub::{
    Action, Model, ModelId, ModelStatus, Payload, PredictionHistory, PredictionStatus,
    PredictionTask, TaskId, User, UserRole,
};
use serde_json::json;

fn payload(pairs: &[(&str, serde_json::Value)]) -> Payload {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), v.clone()))
        .collect()
}

#[test]
fn owner_activates_model_and_task_is_recorded() {
    let owner = User::new("u1", "olga", "olga@example.com", "s3cret", UserRole::ModelOwner);
    assert!(owner.can_perform_action(Action::UploadModel.as_str()));

    let mut model = Model::tensorflow("m1", "fraud", owner.id().clone(), "/models/fraud");
    assert_eq!(model.status(), ModelStatus::Inactive);

    let input = payload(&[("amount", json!(120.5))]);
    assert!(matches!(
        model.predict(&input),
        Err(ModelError::NotActive { status: ModelStatus::Inactive, .. })
    ));

    model.activate();
    let stub = model.predict(&input).unwrap();
    assert_eq!(stub, payload(&[("prediction", json!("sample_result"))]));

    let mut history = PredictionHistory::new();
    let t1 = PredictionTask::new("t1", model.id().clone(), input);
    let t1_id = t1.task_id().clone();
    history.add_task(t1);

    history
        .complete_task(&t1_id, payload(&[("prediction", json!("x"))]))
        .unwrap();

    let stored = history.get_task_by_id(&t1_id).unwrap();
    assert_eq!(stored.status(), PredictionStatus::Completed);
    assert_eq!(stored.result(), Some(&payload(&[("prediction", json!("x"))])));
    assert!(stored.error().is_none());
}

#[test]
fn lookup_survives_later_inserts() {
    let mut history = PredictionHistory::new();
    history.add_task(PredictionTask::new("t1", "m1", Payload::new()));
    for i in 2..20 {
        history.add_task(PredictionTask::new(format!("t{i}"), "m2", Payload::new()));
    }

    let t1 = history.get_task_by_id(&TaskId::new("t1")).unwrap();
    assert_eq!(t1.model_id(), &ModelId::new("m1"));
    assert_eq!(history.get_model_history(&ModelId::new("m1")).len(), 1);
    assert_eq!(history.get_model_history(&ModelId::new("m2")).len(), 18);
}

#[test]
fn capability_table() {
    let cases = [
        (UserRole::Regular, [true, true, false, false]),
        (UserRole::ModelOwner, [true, true, true, true]),
        (UserRole::Admin, [true, true, true, true]),
    ];

    for (role, expected) in cases {
        let user = User::new("u", "name", "mail@example.com", "pw", role);
        for (action, allowed) in Action::ALL.iter().zip(expected) {
            assert_eq!(user.can_perform_action(action.as_str()), allowed, "{role} {action}");
        }
        assert_eq!(
            user.can_perform_action("launch_rockets"),
            role == UserRole::Admin
        );
    }
}

use insights::{Insights, InsightsError, ReportConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;
use store::{InMemoryStore, MetricSample, ResourceUsageSample, UserId};

#[test]
fn profile_counts_and_rollups() {
    let store = InMemoryStore::new();
    let mut rng = StdRng::seed_from_u64(7);
    let owner = store.register_user("ada", "ada@example.com").unwrap().id;
    let other = store.register_user("bob", "bob@example.com").unwrap().id;
    let project = store.create_project(owner, "vision", "").unwrap().id;

    let trained = store
        .create_experiment(owner, Some(project), "", &mut rng)
        .unwrap();
    let idle = store.create_experiment(owner, None, "", &mut rng).unwrap();
    let foreign = store.create_experiment(other, None, "", &mut rng).unwrap();

    for (epoch, accuracy) in [(1, 0.5), (2, 0.6), (3, 0.7)] {
        store
            .add_metric(owner, MetricSample::new(trained.id, epoch, accuracy, 0.5, 0.5, 0.2))
            .unwrap();
    }
    store
        .add_metric(other, MetricSample::new(foreign.id, 1, 0.99, 0.9, 0.9, 0.1))
        .unwrap();
    store.attach_model(owner, trained.id, "models/trained.pt").unwrap();

    let mut usage = ResourceUsageSample::empty(trained.id, 1);
    usage.cpu_percent = Some(75.0);
    usage.training_time_sec = Some(30.0);
    store.add_resource_usage(owner, usage).unwrap();

    let insights = Insights::new(&store, ReportConfig::default());
    let view = insights.build_profile(owner).unwrap();

    assert_eq!(view.username, "ada");
    assert_eq!(view.stats.experiment_count, 2);
    assert_eq!(view.stats.metric_count, 3);
    assert_eq!(view.stats.model_count, 1);
    assert_eq!(view.stats.project_count, 1);

    assert_eq!(view.experiment_metrics.len(), 1);
    assert_eq!(view.experiment_metrics[0].experiment, trained.name);
    assert_eq!(view.experiment_metrics[0].accuracy, 0.6);
    assert!(view
        .experiment_metrics
        .iter()
        .all(|entry| entry.experiment_id != idle.id));

    assert_eq!(view.project_metrics.len(), 1);
    assert_eq!(view.project_metrics[0].accuracy, 0.6);

    assert_eq!(view.usage.len(), 1);
    assert_eq!(view.usage[0].mean_cpu_percent, Some(75.0));
    assert_eq!(view.usage[0].total_training_time_sec, Some(30.0));
}

#[test]
fn unknown_user_is_not_found() {
    let store = InMemoryStore::new();
    let insights = Insights::new(&store, ReportConfig::default());
    let err = insights.build_profile(UserId(12)).unwrap_err();
    assert!(matches!(err, InsightsError::NotFound(ref what) if what == "user 12"));
}

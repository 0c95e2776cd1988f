//! End-to-end discovery runs driven from configuration

mod common;

use common::ScriptedUpdateProvider;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;
use watermark_discovery::catalog::InMemoryCatalog;
use watermark_discovery::clock::FixedClock;
use watermark_discovery::config::{ConfigManager, ConfigurationError, DiscoveryConfig, UpdateProviderConfig};
use watermark_discovery::constants::LAST_DDL_TIME_PARAMETER;
use watermark_discovery::discovery::DiscoverySource;
use watermark_discovery::error::DiscoveryError;
use watermark_discovery::events::PublishedEvent;
use watermark_discovery::models::{UnitDescriptor, Watermark};
use watermark_discovery::providers::{UpdateProviderRegistry, UpdateTimeProvider};
use watermark_discovery::watermark::{store_from_config, PreviousWorkUnitState, TableLevelWatermarker};

fn scripted_source(provider: ScriptedUpdateProvider) -> DiscoverySource {
    let mut registry = UpdateProviderRegistry::with_defaults();
    registry.register("scripted", move |_: &UpdateProviderConfig| {
        Ok(Arc::new(provider.clone()) as Arc<dyn UpdateTimeProvider>)
    });

    let mut config = DiscoveryConfig::default();
    config.update_provider.kind = "scripted".to_string();

    DiscoverySource::from_config(&config, &registry, Arc::new(TableLevelWatermarker::default()))
        .unwrap()
        .with_clock(Arc::new(FixedClock(1_000)))
}

fn drain(receiver: &mut tokio::sync::broadcast::Receiver<PublishedEvent>) -> Vec<PublishedEvent> {
    let mut events = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn test_successful_run_publishes_lifecycle_events() {
    let source = scripted_source(
        ScriptedUpdateProvider::new()
            .with_update_time("db@orders", 500)
            .with_update_time("db@archive", 0),
    );
    let mut receiver = source.event_publisher().unwrap().subscribe();
    let catalog = InMemoryCatalog::new()
        .with_table(UnitDescriptor::table("db", "orders"))
        .with_table(UnitDescriptor::table("db", "archive"));

    let run = source.get_work_units(&catalog).await.unwrap();

    assert_eq!(run.work_units.len(), 1);
    assert_eq!(run.work_units[0].dataset_urn(), "db@orders");
    assert_eq!(run.report.work_units_emitted, 1);
    assert_eq!(run.report.skipped.len(), 1);

    let events = drain(&mut receiver);
    let names: Vec<&str> = events.iter().map(|event| event.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "discovery.setup",
            "discovery.find_datasets",
            "discovery.work_unit_created",
            "discovery.unit_skipped",
            "discovery.run_completed",
        ]
    );
    let run_id = run.run_id.to_string();
    assert!(events.iter().all(|event| event.context["run_id"] == run_id));
    assert_eq!(events[4].context["work_units_emitted"], 1);
    assert_eq!(events[4].context["units_skipped"], 1);
}

#[tokio::test]
async fn test_failed_run_returns_error_and_publishes_run_failed() {
    let source = scripted_source(
        ScriptedUpdateProvider::new()
            .with_update_time("db@orders", 500)
            .failing_on_call(1),
    );
    let mut receiver = source.event_publisher().unwrap().subscribe();
    let catalog = InMemoryCatalog::new().with_table(UnitDescriptor::table("db", "orders"));

    let err = source.get_work_units(&catalog).await.unwrap_err();
    assert!(matches!(err, DiscoveryError::UpdateProvider { .. }));

    let events = drain(&mut receiver);
    let last = events.last().unwrap();
    assert_eq!(last.name, "discovery.run_failed");
    assert_eq!(last.context["category"], "provider");
    assert!(!events.iter().any(|event| event.name == "discovery.run_completed"));
}

#[tokio::test]
async fn test_failed_run_publishes_only_lifecycle_events() {
    let mut provider = ScriptedUpdateProvider::new().failing_on_call(2);
    let mut catalog = InMemoryCatalog::new();
    for name in ["t1", "t2", "t3", "t4", "t5"] {
        catalog = catalog.with_table(UnitDescriptor::table("db", name));
        provider = provider.with_update_time(&format!("db@{name}"), 500);
    }
    let source = scripted_source(provider);
    let mut receiver = source.event_publisher().unwrap().subscribe();

    assert!(source.get_work_units(&catalog).await.is_err());

    let names: Vec<String> = drain(&mut receiver).into_iter().map(|event| event.name).collect();
    assert_eq!(
        names,
        vec!["discovery.setup", "discovery.find_datasets", "discovery.run_failed"]
    );
}

#[tokio::test]
async fn test_each_run_is_independent() {
    let source = scripted_source(ScriptedUpdateProvider::new().with_update_time("db@orders", 500));
    let catalog = InMemoryCatalog::new().with_table(UnitDescriptor::table("db", "orders"));

    let first = source.get_work_units(&catalog).await.unwrap();
    let second = source.get_work_units(&catalog).await.unwrap();

    assert_ne!(first.run_id, second.run_id);
    assert_eq!(first.report, second.report);
    assert_eq!(first.work_units, second.work_units);
}

#[test]
fn test_unknown_update_provider_is_rejected() {
    let mut config = DiscoveryConfig::default();
    config.update_provider.kind = "hdfs_reflection".to_string();

    let err = DiscoverySource::from_config(
        &config,
        &UpdateProviderRegistry::with_defaults(),
        Arc::new(TableLevelWatermarker::default()),
    )
    .unwrap_err();

    assert!(err.is_configuration());
    match err {
        DiscoveryError::Configuration(ConfigurationError::UnknownUpdateProvider { key, available }) => {
            assert_eq!(key, "hdfs_reflection");
            assert_eq!(available, vec!["filesystem", "metastore"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_run_configured_from_yaml_file() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("discovery-config.yaml"),
        r#"
update_provider:
  kind: filesystem
watermark:
  store: table_level
discovery:
  lookup_concurrency: 1
events:
  enabled: true

test:
  update_provider:
    kind: metastore
  watermark:
    store: in_memory
  discovery:
    lookup_concurrency: 4
  events:
    enabled: false
"#,
    )
    .unwrap();

    let manager =
        ConfigManager::load_from_directory_with_env(Some(temp_dir.path().to_path_buf()), "test")
            .unwrap();
    let config = manager.config();
    assert_eq!(manager.environment(), "test");
    assert_eq!(config.update_provider.kind, "metastore");

    // previous run committed 100s for the table as a whole
    let store = store_from_config(
        &config.watermark,
        vec![PreviousWorkUnitState::new("db@orders", Watermark::new(100_000))],
    )
    .unwrap();
    let source = DiscoverySource::from_config(config, &UpdateProviderRegistry::with_defaults(), store)
        .unwrap()
        .with_clock(Arc::new(FixedClock(1_000_000)));

    assert!(source.event_publisher().is_none());
    assert_eq!(source.assembler().lookup_concurrency(), 4);

    let catalog = InMemoryCatalog::new()
        .with_table(UnitDescriptor::table("db", "orders").with_parameter(LAST_DDL_TIME_PARAMETER, "100"))
        .with_table(UnitDescriptor::table("db", "users").with_parameter(LAST_DDL_TIME_PARAMETER, "99"));

    let run = source.get_work_units(&catalog).await.unwrap();

    assert_eq!(run.work_units.len(), 1);
    assert_eq!(run.work_units[0].dataset_urn(), "db@users");
    assert_eq!(run.work_units[0].watermark_interval().low(), Watermark::ZERO);
    assert_eq!(
        run.work_units[0].watermark_interval().expected_high(),
        Watermark::new(1_000_000)
    );
}

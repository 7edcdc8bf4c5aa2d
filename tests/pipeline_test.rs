//! Integration tests for a full pipeline run against the mock warehouse.

use std::sync::Arc;

use snowmelt::{Config, EtlPipeline, MockWarehouse, RunContext, StatementCatalog};

const CONFIG_YAML: &str = r#"
warehouse:
  url: "postgres://localhost:5439/sparkify"
storage:
  region: us-west-2
  access_key_id: AKIA123
  secret_access_key: secret456
stages:
  staging_events:
    bucket: udacity-dend
    key_template: log-data
    layout: partitioned
    jsonpaths: "s3://udacity-dend/log_json_path.json"
    key_columns: [userid, sessionid, ts]
  staging_songs:
    bucket: udacity-dend
    key_template: song-data/A
    key_columns: [song_id, artist_id]
fact:
  table: songplays
  statement: songplay_table_insert
dimensions:
  songs:
    statement: song_table_insert
  users:
    statement: user_table_insert
  artists:
    statement: artist_table_insert
  time:
    statement: time_table_insert
quality:
  tables: [songplays, songs, users, artists, time]
"#;

fn pipeline(warehouse: Arc<MockWarehouse>) -> EtlPipeline {
    let config = Config::parse(CONFIG_YAML).unwrap();
    EtlPipeline::from_config(&config, StatementCatalog::sparkify(), warehouse).unwrap()
}

fn run_context() -> RunContext {
    RunContext::new(chrono::Utc::now())
}

/// Index of the first executed statement containing `pattern`.
fn first_index(executed: &[String], pattern: &str) -> usize {
    executed
        .iter()
        .position(|sql| sql.contains(pattern))
        .unwrap_or_else(|| panic!("no statement matching '{pattern}'"))
}

/// Index of the last executed statement containing `pattern`.
fn last_index(executed: &[String], pattern: &str) -> usize {
    executed
        .iter()
        .rposition(|sql| sql.contains(pattern))
        .unwrap_or_else(|| panic!("no statement matching '{pattern}'"))
}

#[test]
fn test_config_loads_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("snowmelt.yaml");
    std::fs::write(&path, CONFIG_YAML).unwrap();

    let config = Config::from_file(path.to_str().unwrap()).unwrap();
    assert_eq!(config.stages.len(), 2);
    assert_eq!(config.fact.table, "songplays");
}

#[tokio::test]
async fn test_full_run_statement_ordering() {
    let warehouse = Arc::new(MockWarehouse::new());
    pipeline(warehouse.clone())
        .run(&run_context())
        .await
        .unwrap();

    let executed = warehouse.executed();

    // Two stages: clear + copy + (3 and 2) cleanups = 9 statements, then
    // one fact insert, four truncates + four dimension inserts, and five
    // count queries.
    assert_eq!(executed.len(), 9 + 1 + 8 + 5);

    // Staging finishes entirely before the fact load starts.
    let fact_at = first_index(&executed, "INSERT INTO songplays");
    assert!(last_index(&executed, "COPY staging_") < fact_at);
    assert!(last_index(&executed, "IS NULL") < fact_at);

    // Every dimension load happens after the fact load and before the
    // first quality probe.
    let quality_at = first_index(&executed, "SELECT COUNT(*)");
    for table in ["songs", "users", "artists", "time"] {
        let truncate_at = first_index(&executed, &format!("TRUNCATE {table}"));
        let insert_at = first_index(&executed, &format!("INSERT INTO {table}"));
        assert!(fact_at < truncate_at);
        assert!(truncate_at < insert_at);
        assert!(insert_at < quality_at);
    }

    // Quality probes run in configured order.
    for (earlier, later) in [
        ("FROM songplays", "FROM songs"),
        ("FROM songs", "FROM users"),
        ("FROM users", "FROM artists"),
        ("FROM artists", "FROM time"),
    ] {
        assert!(
            first_index(&executed, &format!("SELECT COUNT(*) {earlier}"))
                < first_index(&executed, &format!("SELECT COUNT(*) {later}"))
        );
    }
}

#[tokio::test]
async fn test_null_cleanup_leaves_eight_of_ten_rows() {
    let warehouse = Arc::new(MockWarehouse::new());
    // A staged batch of 10 rows where 2 have a null userid: the cleanup
    // delete removes exactly those 2.
    warehouse.script_affected("DELETE FROM staging_events WHERE userid IS NULL", 2);

    pipeline(warehouse.clone())
        .run(&run_context())
        .await
        .unwrap();

    let executed = warehouse.executed();
    assert!(executed
        .iter()
        .any(|sql| sql == "DELETE FROM staging_events WHERE userid IS NULL"));
    // The remaining key columns are cleaned too.
    assert!(executed
        .iter()
        .any(|sql| sql == "DELETE FROM staging_events WHERE sessionid IS NULL"));
    assert!(executed
        .iter()
        .any(|sql| sql == "DELETE FROM staging_events WHERE ts IS NULL"));
}

#[tokio::test]
async fn test_stage_failure_stops_run_before_fact_load() {
    let warehouse = Arc::new(MockWarehouse::new());
    warehouse.fail_matching("COPY staging_songs");

    let err = pipeline(warehouse.clone())
        .run(&run_context())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("staging_songs"));
    assert_eq!(warehouse.count_matching("INSERT INTO songplays"), 0);
    assert_eq!(warehouse.count_matching("SELECT COUNT(*)"), 0);
}

#[tokio::test]
async fn test_empty_table_fails_quality_check() {
    let warehouse = Arc::new(MockWarehouse::new());
    warehouse.script_counts("FROM users", vec![vec![0]]);

    let err = pipeline(warehouse.clone())
        .run(&run_context())
        .await
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("users"));
    assert!(message.contains("zero rows present"));
    // Fail-fast: artists and time are never probed.
    assert_eq!(warehouse.count_matching("SELECT COUNT(*) FROM artists"), 0);
    assert_eq!(warehouse.count_matching("SELECT COUNT(*) FROM time"), 0);
}

#[tokio::test]
async fn test_two_runs_replace_dimensions_each_time() {
    let warehouse = Arc::new(MockWarehouse::new());
    let pipeline = pipeline(warehouse.clone());

    pipeline.run(&run_context()).await.unwrap();
    pipeline.run(&run_context()).await.unwrap();

    // Replace semantics: every dimension is truncated before each of its
    // two inserts, so the second run's rows are the only survivors.
    for table in ["songs", "users", "artists", "time"] {
        assert_eq!(warehouse.count_matching(&format!("TRUNCATE {table}")), 2);
        assert_eq!(
            warehouse.count_matching(&format!("INSERT INTO {table}")),
            2
        );
    }
}

#[tokio::test]
async fn test_append_mode_dimensions_accumulate() {
    let warehouse = Arc::new(MockWarehouse::new());
    let mut config = Config::parse(CONFIG_YAML).unwrap();
    for dimension in config.dimensions.values_mut() {
        dimension.append = true;
    }
    let pipeline =
        EtlPipeline::from_config(&config, StatementCatalog::sparkify(), warehouse.clone())
            .unwrap();

    pipeline.run(&run_context()).await.unwrap();
    pipeline.run(&run_context()).await.unwrap();

    // Append semantics: both runs' inserts land, nothing is truncated.
    assert_eq!(warehouse.count_matching("TRUNCATE"), 0);
    for table in ["songs", "users", "artists", "time"] {
        assert_eq!(
            warehouse.count_matching(&format!("INSERT INTO {table}")),
            2
        );
    }
}

#[tokio::test]
async fn test_copy_statements_carry_credentials_and_region() {
    let warehouse = Arc::new(MockWarehouse::new());
    pipeline(warehouse.clone())
        .run(&run_context())
        .await
        .unwrap();

    let executed = warehouse.executed();
    let copies: Vec<_> = executed
        .iter()
        .filter(|sql| sql.starts_with("COPY "))
        .collect();
    assert_eq!(copies.len(), 2);
    for copy in copies {
        assert!(copy.contains("ACCESS_KEY_ID 'AKIA123'"));
        assert!(copy.contains("SECRET_ACCESS_KEY 'secret456'"));
        assert!(copy.contains("REGION 'us-west-2'"));
    }

    // The events stage uses its jsonpaths spec; the songs stage falls back
    // to auto detection.
    let events_copy = executed
        .iter()
        .find(|sql| sql.starts_with("COPY staging_events"))
        .unwrap();
    assert!(events_copy.contains("JSON 's3://udacity-dend/log_json_path.json'"));
    let songs_copy = executed
        .iter()
        .find(|sql| sql.starts_with("COPY staging_songs"))
        .unwrap();
    assert!(songs_copy.contains("JSON 'auto'"));
}

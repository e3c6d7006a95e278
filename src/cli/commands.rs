//! CLI command implementations
//!
//! Every command produces one JSON value that `run` wraps in the response
//! envelope. Commands that need a payload take it from stdin.

use std::path::Path;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{json, Value};

use crate::collection::{Collection, FileStore, ListQuery, PageRequest, SortOrder};
use crate::mock::MockGenerator;
use crate::observability::Logger;
use crate::schema::{validate_schema_definition, SchemaDefinition};
use crate::validation::{RecordValidator, UnknownKeys};

use super::args::{Command, RecordOp};
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::{read_json_file, read_request};

/// Dispatch a parsed command
pub fn run_command(cmd: Command) -> CliResult<Value> {
    match cmd {
        Command::CheckSchema { schema } => check_schema(&schema),
        Command::Validate {
            schema,
            reject_unknown,
        } => validate(&schema, reject_unknown, read_request),
        Command::Mock { schema, seed } => mock(&schema, seed),
        Command::Records {
            config,
            collection,
            schema,
            op,
        } => records(&config, &collection, &schema, op, read_request),
    }
}

/// Load a schema file and run the definition validator over it
pub fn load_schema(path: &Path) -> CliResult<SchemaDefinition> {
    let raw = read_json_file(path)?;
    Ok(validate_schema_definition(&raw)?)
}

/// Check a schema definition file
pub fn check_schema(schema_path: &Path) -> CliResult<Value> {
    let schema = load_schema(schema_path)?;
    let primary = schema.primary_field().map(|f| f.name.clone());

    Ok(json!({
        "valid": true,
        "fields": schema.len(),
        "primary": primary,
        "schema": schema,
    }))
}

/// Validate one record against a schema file
pub fn validate<F>(schema_path: &Path, reject_unknown: bool, read_input: F) -> CliResult<Value>
where
    F: FnOnce() -> CliResult<Value>,
{
    let schema = load_schema(schema_path)?;
    let policy = if reject_unknown {
        UnknownKeys::Reject
    } else {
        UnknownKeys::Strip
    };
    let validator = RecordValidator::compile(&schema)?.with_unknown_keys(policy);

    let record = read_input()?;
    Ok(serde_json::to_value(validator.validate(&record))?)
}

/// Generate one mock batch
pub fn mock(schema_path: &Path, seed: Option<u64>) -> CliResult<Value> {
    let schema = load_schema(schema_path)?;
    let batch = generator(seed).generate_batch(&schema)?;
    Ok(Value::Array(batch))
}

/// Run one operation on a stored collection
pub fn records<F>(
    config_path: &Path,
    collection_id: &str,
    schema_path: &Path,
    op: RecordOp,
    read_input: F,
) -> CliResult<Value>
where
    F: FnOnce() -> CliResult<Value>,
{
    let config = Config::load(config_path)?;
    Logger::set_min_severity(config.min_severity());

    let schema = load_schema(schema_path)?;
    let store = FileStore::new(config.data_path());
    let mut collection = Collection::new(collection_id, schema, store, config.tier_limit())?
        .with_unknown_keys(config.unknown_keys);

    let data = match op {
        RecordOp::List {
            sort,
            order,
            offset,
            limit,
        } => {
            let order = SortOrder::parse(&order).ok_or_else(|| {
                CliError::invalid_argument(format!(
                    "Invalid order: '{}'. Use 'asc' or 'desc'.",
                    order
                ))
            })?;
            let query = ListQuery { sort, order };
            let page = PageRequest::new(offset, limit.unwrap_or(config.default_page_limit));
            serde_json::to_value(collection.list(&query, page)?)?
        }
        RecordOp::Get { key } => collection.get(&key)?,
        RecordOp::Create => collection.create(&read_input()?)?,
        RecordOp::Update { key } => collection.update(&key, &read_input()?)?,
        RecordOp::Delete { key } => collection.delete(&key)?,
        RecordOp::Seed { seed } => {
            let inserted = collection.seed(&mut generator(seed))?;
            json!({"seeded": inserted.len(), "records": inserted})
        }
    };

    Ok(data)
}

fn generator(seed: Option<u64>) -> MockGenerator<StdRng> {
    match seed {
        Some(seed) => MockGenerator::with_rng(StdRng::seed_from_u64(seed)),
        None => MockGenerator::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::errors::CliErrorCode;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    struct Fixture {
        dir: TempDir,
        config: PathBuf,
        schema: PathBuf,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("fauxbase.json");
        let schema = dir.path().join("people.json");

        let data_dir = dir.path().join("data");
        fs::write(
            &config,
            json!({"data_dir": data_dir.to_string_lossy(), "record_limits": {"free": 3}})
                .to_string(),
        )
        .unwrap();
        fs::write(
            &schema,
            json!([
                {"name": "id", "type": "number", "primary": true},
                {"name": "name", "type": "string", "validation": {"minLength": 2}}
            ])
            .to_string(),
        )
        .unwrap();

        Fixture {
            dir,
            config,
            schema,
        }
    }

    fn op(f: &Fixture, op: RecordOp, input: Value) -> CliResult<Value> {
        records(&f.config, "people", &f.schema, op, || Ok(input))
    }

    #[test]
    fn test_check_schema_reports_primary() {
        let f = fixture();
        let out = check_schema(&f.schema).unwrap();
        assert_eq!(out["primary"], json!("id"));
        assert_eq!(out["fields"], json!(2));
    }

    #[test]
    fn test_check_schema_rejection_carries_code() {
        let f = fixture();
        let bad = f.dir.path().join("bad.json");
        fs::write(&bad, json!([{"name": "x", "type": "string"}]).to_string()).unwrap();

        let err = check_schema(&bad).unwrap_err();
        assert_eq!(err.code_str(), "FAUX_SCHEMA_PRIMARY_KEY");
        assert!(err.details().is_some());
    }

    #[test]
    fn test_validate_command() {
        let f = fixture();
        let out = validate(&f.schema, false, || Ok(json!({"id": 1, "name": "a"}))).unwrap();
        assert_eq!(out["isValid"], json!(false));
        assert_eq!(out["errors"][0]["code"], json!("too_small"));

        let out = validate(&f.schema, true, || Ok(json!({"id": 1, "name": "ab", "x": 1}))).unwrap();
        assert_eq!(out["errors"][0]["code"], json!("unrecognized_keys"));
    }

    #[test]
    fn test_mock_is_reproducible_with_seed() {
        let f = fixture();
        let a = mock(&f.schema, Some(9)).unwrap();
        let b = mock(&f.schema, Some(9)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_array().unwrap().len(), 10);
    }

    #[test]
    fn test_record_lifecycle() {
        let f = fixture();

        let created = op(&f, RecordOp::Create, json!({"name": "ada"})).unwrap();
        assert_eq!(created["id"], json!(1));

        let fetched = op(&f, RecordOp::Get { key: "1".into() }, Value::Null).unwrap();
        assert_eq!(fetched["name"], json!("ada"));

        let updated = op(&f, RecordOp::Update { key: "1".into() }, json!({"name": "eve"})).unwrap();
        assert_eq!(updated["name"], json!("eve"));

        let list = op(
            &f,
            RecordOp::List {
                sort: Some("id".into()),
                order: "desc".into(),
                offset: 0,
                limit: None,
            },
            Value::Null,
        )
        .unwrap();
        assert_eq!(list["total"], json!(1));
        assert_eq!(list["limit"], json!(10));

        op(&f, RecordOp::Delete { key: "1".into() }, Value::Null).unwrap();
        let err = op(&f, RecordOp::Get { key: "1".into() }, Value::Null).unwrap_err();
        assert_eq!(err.code_str(), "FAUX_RECORD_NOT_FOUND");
    }

    #[test]
    fn test_seed_respects_tier_limit() {
        let f = fixture();
        let out = op(&f, RecordOp::Seed { seed: Some(1) }, Value::Null).unwrap();
        assert_eq!(out["seeded"], json!(3));
    }

    #[test]
    fn test_bad_order_is_invalid_argument() {
        let f = fixture();
        let err = op(
            &f,
            RecordOp::List {
                sort: None,
                order: "sideways".into(),
                offset: 0,
                limit: None,
            },
            Value::Null,
        )
        .unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::InvalidArgument);
    }
}

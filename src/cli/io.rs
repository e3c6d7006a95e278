//! JSON I/O handling for CLI
//!
//! - Input: one JSON value via stdin
//! - Output: one JSON object per line via stdout
//! - Logs go to stderr and never mix with responses

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use serde_json::Value;

use super::errors::{CliError, CliResult};

/// Read one JSON value from stdin
pub fn read_request() -> CliResult<Value> {
    let mut input = String::new();
    io::stdin().lock().read_to_string(&mut input)?;

    if input.trim().is_empty() {
        return Err(CliError::io_error("Empty input"));
    }

    let value: Value = serde_json::from_str(&input)?;
    Ok(value)
}

/// Read a JSON file
pub fn read_json_file(path: &Path) -> CliResult<Value> {
    let content = fs::read_to_string(path)
        .map_err(|e| CliError::io_error(format!("Failed to read {}: {}", path.display(), e)))?;
    serde_json::from_str(&content)
        .map_err(|e| CliError::io_error(format!("Invalid JSON in {}: {}", path.display(), e)))
}

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    write_line(&mut io::stdout(), &ok_envelope(data))
}

/// Write an error response to stdout
pub fn write_error(err: &CliError) -> CliResult<()> {
    write_line(&mut io::stdout(), &error_envelope(err))
}

pub(crate) fn ok_envelope(data: Value) -> Value {
    serde_json::json!({
        "status": "ok",
        "data": data
    })
}

pub(crate) fn error_envelope(err: &CliError) -> Value {
    let mut response = serde_json::json!({
        "status": "error",
        "code": err.code_str(),
        "message": err.message()
    });
    if let (Some(details), Some(obj)) = (err.details(), response.as_object_mut()) {
        obj.insert("errors".to_string(), details.clone());
    }
    response
}

fn write_line<W: Write>(writer: &mut W, response: &Value) -> CliResult<()> {
    serde_json::to_writer(&mut *writer, response)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelopes() {
        assert_eq!(
            ok_envelope(json!([1])),
            json!({"status": "ok", "data": [1]})
        );

        let err = CliError::invalid_argument("bad").with_details(json!(["x"]));
        assert_eq!(
            error_envelope(&err),
            json!({
                "status": "error",
                "code": "FAUX_CLI_INVALID_ARGUMENT",
                "message": "bad",
                "errors": ["x"]
            })
        );
    }

    #[test]
    fn test_write_line_is_one_line() {
        let mut out = Vec::new();
        write_line(&mut out, &json!({"a": 1})).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "{\"a\":1}\n");
    }
}

use anyhow::Context;
use serde_json::{json, Value};

use crate::cli::config::{load_session, resolve_server};
use crate::cli::{CliContext, OutputFormat};
use crate::client::{AdminHooks, DashboardClient, ResourceState, SwrOptions};

/// Output a success message in the appropriate format
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let Some(data_value) = data {
                response["data"] = data_value;
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output a record or a list. `columns` picks the fields shown per row in text mode.
pub fn output_value(output_format: &OutputFormat, value: &Value, columns: &[&str]) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(value)?);
        }
        OutputFormat::Text => match list_rows(value) {
            Some(rows) if rows.is_empty() => println!("(none)"),
            Some(rows) => {
                println!("{}", columns.join("\t"));
                for row in rows {
                    let cells: Vec<String> = columns.iter().map(|c| cell(row.get(*c))).collect();
                    println!("{}", cells.join("\t"));
                }
            }
            None => match value.as_object() {
                Some(map) => {
                    for (key, field) in map {
                        println!("{}: {}", key, cell(Some(field)));
                    }
                }
                None => println!("{}", cell(Some(value))),
            },
        },
    }
    Ok(())
}

fn list_rows(value: &Value) -> Option<&Vec<Value>> {
    match value {
        Value::Array(items) => Some(items),
        Value::Object(map) => crate::client::hooks::list_field(map),
        _ => None,
    }
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "-".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Parse a `--features '{"chat":true}'` style argument.
pub fn parse_json_arg(name: &str, raw: &str) -> anyhow::Result<Value> {
    serde_json::from_str(raw).with_context(|| format!("--{} must be valid JSON", name))
}

/// Hooks bound to the saved session.
pub fn signed_in_hooks(ctx: &CliContext) -> anyhow::Result<AdminHooks<DashboardClient>> {
    let session = load_session()?.ok_or_else(|| anyhow::anyhow!("not signed in; run `coachctl auth login` first"))?;
    let server = resolve_server(ctx.server.as_deref(), Some(&session));
    let client = DashboardClient::new(&server)?.with_session(session.cookie);
    Ok(AdminHooks::new(client, SwrOptions::default()))
}

/// A one-shot CLI read either has data or fails.
pub fn loaded(state: ResourceState) -> anyhow::Result<Value> {
    match (state.data, state.error) {
        (_, Some(error)) => Err(anyhow::anyhow!(error)),
        (Some(data), None) => Ok(data),
        (None, None) => Ok(Value::Null),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loaded_surfaces_errors() {
        let failed = ResourceState {
            data: None,
            error: Some("Failed to fetch plans (HTTP 500)".into()),
            is_loading: false,
            is_validating: false,
            is_empty: true,
        };
        assert!(loaded(failed).is_err());
    }

    #[test]
    fn bad_json_arg_names_the_flag() {
        let err = parse_json_arg("features", "{chat").unwrap_err();
        assert!(err.to_string().contains("--features"));
    }
}

use courtside_core::{ApiClient, HttpMethod, Query};
use serde_json::Value;

use crate::cli::RequestArgs;
use crate::error::CliError;

use super::{timed, CommandResult};

pub async fn run(args: &RequestArgs, client: &ApiClient) -> Result<CommandResult, CliError> {
    let method = HttpMethod::from(args.method);
    let query = parse_query(&args.query)?;
    let body = args.body.as_deref().map(parse_body).transpose()?;
    let endpoint = query.apply(&args.endpoint);

    let mut warnings = Vec::new();
    if body.is_some() && matches!(method, HttpMethod::Get | HttpMethod::Delete) {
        warnings.push(format!("{method} requests are sent without a body; --body ignored"));
    }

    let label = format!("{method} {endpoint}");
    let mut result = match method {
        HttpMethod::Get => timed(label, client.get::<Value>(&args.endpoint, &query)).await?,
        HttpMethod::Post => timed(label, client.post::<Value>(&endpoint, body)).await?,
        HttpMethod::Put => timed(label, client.put::<Value>(&endpoint, body)).await?,
        HttpMethod::Delete => timed(label, client.delete::<Value>(&endpoint)).await?,
    };
    for warning in warnings {
        result = result.with_warning(warning);
    }
    Ok(result)
}

/// Parses repeated `key=value` flags. Values may contain `=`.
fn parse_query(pairs: &[String]) -> Result<Query, CliError> {
    pairs
        .iter()
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                Ok((key.trim().to_owned(), value.to_owned()))
            }
            _ => Err(CliError::Command(format!(
                "query parameter must be KEY=VALUE: '{pair}'"
            ))),
        })
        .collect()
}

fn parse_body(raw: &str) -> Result<Value, CliError> {
    serde_json::from_str(raw)
        .map_err(|error| CliError::Command(format!("--body is not valid JSON: {error}")))
}

use std::fs;
use std::path::Path;

use chrono::Utc;
use tally_core::{validate_request, Dataset, EngineConfig, QuoteEngine, QuoteInput, QuoteRequest};

use super::CommandResult;

enum Failure {
    /// Bad cart or promotion input from the caller.
    InvalidRequest(String),
    /// Unreadable dataset or config; an operator problem, not a cart problem.
    Environment(String),
}

pub fn run(
    dataset_path: &Path,
    cart_path: &Path,
    promo: Option<&str>,
    config_path: Option<&Path>,
) -> CommandResult {
    match execute(dataset_path, cart_path, promo, config_path) {
        Ok(result) => result,
        Err(Failure::InvalidRequest(message)) => {
            CommandResult::failure("quote", "invalid_request", message, 2)
        }
        Err(Failure::Environment(message)) => {
            CommandResult::failure("quote", "environment", message, 1)
        }
    }
}

fn execute(
    dataset_path: &Path,
    cart_path: &Path,
    promo: Option<&str>,
    config_path: Option<&Path>,
) -> Result<CommandResult, Failure> {
    let config = match config_path {
        Some(path) => {
            EngineConfig::from_path(path).map_err(|e| Failure::Environment(e.to_string()))?
        }
        None => EngineConfig::default(),
    };

    let dataset: Dataset = read_json(dataset_path).map_err(Failure::Environment)?;
    let request: QuoteRequest = read_json(cart_path).map_err(Failure::InvalidRequest)?;
    validate_request(&request).map_err(|e| Failure::InvalidRequest(e.to_string()))?;

    let code = promo.or(request.promo_code.as_deref());
    let bundle = code.and_then(|code| dataset.bundle_for(code));

    let snapshot = dataset.snapshot();
    let engine = QuoteEngine::new(config);
    let result = engine.quote(
        QuoteInput { request: &request, snapshot: &snapshot, promotion: bundle.as_ref() },
        Utc::now(),
    );

    Ok(CommandResult::payload(result))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, String> {
    let raw = fs::read_to_string(path)
        .map_err(|error| format!("could not read `{}`: {error}", path.display()))?;
    serde_json::from_str(&raw)
        .map_err(|error| format!("could not parse `{}`: {error}", path.display()))
}

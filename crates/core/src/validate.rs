//! Request validation, run before the engine. A failed request is rejected
//! whole; the engine never sees it and no partial quote is produced.
//!
//! Unknown size keys never reach this point: `SizeKey` is a closed enum, so
//! they fail at deserialization in the transport layer.

use std::collections::HashSet;

use crate::domain::cart::QuoteRequest;
use crate::errors::QuoteRequestError;

pub fn validate_request(request: &QuoteRequest) -> Result<(), QuoteRequestError> {
    if request.lines.is_empty() {
        return Err(QuoteRequestError::EmptyCart);
    }

    let mut seen: HashSet<&str> = HashSet::with_capacity(request.lines.len());
    for line in &request.lines {
        if line.quantity == 0 {
            return Err(QuoteRequestError::NonPositiveQuantity {
                line_id: line.line_id.0.clone(),
            });
        }
        if !seen.insert(&line.line_id.0) {
            return Err(QuoteRequestError::DuplicateLineId { line_id: line.line_id.0.clone() });
        }
    }
    Ok(())
}

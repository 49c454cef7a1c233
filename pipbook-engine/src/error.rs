//! Calculation errors.

use pipbook_domain::DomainError;
use thiserror::Error;

/// Errors surfaced by the calculators.
///
/// Both variants are detected before any arithmetic runs; there is never a
/// partial result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalcError {
    /// Non-positive balance, risk or price, a zero entry-to-stop distance, or
    /// inputs whose result does not fit a `Decimal`
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Symbol missing from the pip table
    #[error("Unknown instrument: {0}")]
    UnknownInstrument(String),
}

impl CalcError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Arithmetic on the inputs left the representable range
    pub(crate) fn out_of_range(quantity: &str) -> Self {
        Self::InvalidInput(format!("{} out of range", quantity))
    }
}

impl From<DomainError> for CalcError {
    fn from(err: DomainError) -> Self {
        match err {
            // A symbol that does not parse cannot be in the table either
            DomainError::UnknownInstrument(symbol) | DomainError::InvalidSymbol(symbol) => {
                CalcError::UnknownInstrument(symbol)
            },
            other => CalcError::InvalidInput(other.to_string()),
        }
    }
}

/// Result type for calculations.
pub type CalcResult<T> = Result<T, CalcError>;

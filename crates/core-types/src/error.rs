use thiserror::Error;

/// Rejections raised while validating client input, before any store access.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Name is required")]
    EmptyName,

    #[error("Balance is required")]
    MissingBalance,

    #[error("Invalid balance: {0}")]
    InvalidBalance(String),

    #[error(
        "Balance {0} cannot be stored exactly: at most 28 significant digits and a magnitude below 7.9e28 are supported"
    )]
    UnrepresentableBalance(String),
}

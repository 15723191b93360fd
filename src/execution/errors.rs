use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionError {
    InvalidSize(f64),
    ExceedsMaxSize { size: f64, max: f64 },
    InvalidAmount(String),
    InvalidAddress { field: &'static str, value: String },
    InvalidHex { field: &'static str },
    InvalidProtectionLevel { level: u32, min: u32, max: u32 },
    InvalidPortfolioValue(f64),
    MissingSpotPrice(String),
    InvalidExpiryDays(u32),
}

impl fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionError::InvalidSize(size) => write!(f, "Invalid order size: {}", size),
            ExecutionError::ExceedsMaxSize { size, max } => {
                write!(f, "Size {} exceeds order maximum {}", size, max)
            }
            ExecutionError::InvalidAmount(msg) => write!(f, "Invalid amount: {}", msg),
            ExecutionError::InvalidAddress { field, value } => {
                write!(f, "Invalid address for {}: {}", field, value)
            }
            ExecutionError::InvalidHex { field } => write!(f, "Invalid hex data for {}", field),
            ExecutionError::InvalidProtectionLevel { level, min, max } => {
                write!(
                    f,
                    "Protection level {}% outside {}%..={}%",
                    level, min, max
                )
            }
            ExecutionError::InvalidPortfolioValue(v) => {
                write!(f, "Portfolio value must be positive, got {}", v)
            }
            ExecutionError::MissingSpotPrice(asset) => write!(f, "No spot price for {}", asset),
            ExecutionError::InvalidExpiryDays(days) => {
                write!(f, "Expiry must be at least one day, got {}", days)
            }
        }
    }
}

impl std::error::Error for ExecutionError {}

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TaxError {
    #[error("Unknown tax regime: {0}")]
    UnknownRegime(String),

    #[error("Unknown city type: {0}")]
    UnknownCityType(String),

    #[error("Negative amount for {field}: {value}")]
    NegativeAmount { field: &'static str, value: f64 },

    #[error("Invalid age: {0}")]
    InvalidAge(u32),
}

use validator::Validate;

use crate::error::AppError;

/// Flatten `validator` results into a single domain-level message. Parameter
/// problems ride inside the 200 `{success:false, error}` envelope like every
/// other domain error, so this never maps to a 4xx response.
pub trait ValidateParams {
    fn check(&self) -> Result<(), AppError>;
}

impl<T: Validate> ValidateParams for T {
    fn check(&self) -> Result<(), AppError> {
        self.validate().map_err(|errors| {
            let mut parts: Vec<String> = errors
                .field_errors()
                .iter()
                .map(|(field, field_errors)| {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .clone()
                                .unwrap_or_else(|| "invalid value".into())
                                .to_string()
                        })
                        .collect();
                    format!("{}: {}", field, messages.join(", "))
                })
                .collect();
            parts.sort();
            AppError::Validation(parts.join("; "))
        })
    }
}

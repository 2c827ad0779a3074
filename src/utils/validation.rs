use crate::utils::error::{OutputsError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(OutputsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(OutputsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(OutputsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// Vendor names are forwarded verbatim (spaces included); only control characters are refused.
pub fn validate_vendor(field_name: &str, vendor: &str) -> Result<()> {
    if vendor.chars().any(char::is_control) {
        return Err(OutputsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: vendor.escape_debug().to_string(),
            reason: "Vendor must not contain control characters".to_string(),
        });
    }
    Ok(())
}

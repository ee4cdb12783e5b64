//! # Validation Module
//!
//! Quantity validation shared by the stock ledger and the cart.
//!
//! Every quantity entering the system passes through here before any state
//! is touched. A rejected value leaves the caller unchanged.

use crate::error::{CoreError, CoreResult};
use crate::MAX_LINE_QUANTITY;

// =============================================================================
// Quantity Validation
// =============================================================================

/// Validates that a quantity is strictly positive.
///
/// `field` names the offending input in the error message, e.g. `"quantity"`
/// or `"boxes"`.
///
/// ## Example
/// ```rust
/// use crumb_core::validation::validate_quantity;
///
/// assert!(validate_quantity("quantity", 3).is_ok());
/// assert!(validate_quantity("quantity", 0).is_err());
/// assert!(validate_quantity("quantity", -5).is_err());
/// ```
pub fn validate_quantity(field: &'static str, value: i64) -> CoreResult<()> {
    if value <= 0 {
        return Err(CoreError::InvalidQuantity { field, value });
    }
    Ok(())
}

/// Validates a cart line quantity: strictly positive and within the line cap.
pub fn validate_line_quantity(field: &'static str, value: i64) -> CoreResult<()> {
    validate_quantity(field, value)?;
    if value > MAX_LINE_QUANTITY {
        return Err(CoreError::QuantityTooLarge {
            requested: value,
            max: MAX_LINE_QUANTITY,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_quantity_passes() {
        assert!(validate_quantity("quantity", 1).is_ok());
        assert!(validate_quantity("quantity", 999).is_ok());
    }

    #[test]
    fn test_zero_and_negative_rejected() {
        for bad in [0, -1, -100] {
            let err = validate_quantity("boxes", bad).unwrap_err();
            match err {
                CoreError::InvalidQuantity { field, value } => {
                    assert_eq!(field, "boxes");
                    assert_eq!(value, bad);
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn test_line_cap_enforced() {
        assert!(validate_line_quantity("quantity", MAX_LINE_QUANTITY).is_ok());
        assert!(matches!(
            validate_line_quantity("quantity", MAX_LINE_QUANTITY + 1),
            Err(CoreError::QuantityTooLarge { .. })
        ));
    }
}

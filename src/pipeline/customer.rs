use thiserror::Error;

use super::status::CustomerStatus;
use crate::upstream::CustomerDetail;

/// A customer record that breaks the closing-details invariant:
/// `closed_amount` / `closed_produk` present iff `status == closed`.
#[derive(Debug, Error)]
pub enum InvariantViolation {
    #[error("customer {cif} is closed but has no closing details")]
    MissingClosingDetails { cif: String },
}

/// Why a requested status change was refused before reaching the core API.
#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("customer is already {from}; no further status change is possible")]
    Terminal { from: CustomerStatus },
    #[error("cannot move a {from} customer to {to}")]
    Illegal {
        from: CustomerStatus,
        to: CustomerStatus,
    },
    #[error("closing a customer requires the product that was sold")]
    MissingProduct,
    #[error("closing a customer requires the sale amount")]
    MissingAmount,
    #[error("product and amount may only accompany a closed transition")]
    UnexpectedClosingFields,
}

/// Check a proposed transition against the customer's current status and
/// the fields supplied alongside it. Pure; the caller fetches the current
/// record and performs the upstream write.
pub fn validate_transition(
    current: CustomerStatus,
    requested: CustomerStatus,
    product_id: Option<i64>,
    amount_supplied: bool,
) -> Result<(), TransitionError> {
    if current.is_terminal() {
        return Err(TransitionError::Terminal { from: current });
    }
    if !current.can_transition_to(requested) {
        return Err(TransitionError::Illegal {
            from: current,
            to: requested,
        });
    }
    if requested.requires_closing_details() {
        if product_id.is_none() {
            return Err(TransitionError::MissingProduct);
        }
        if !amount_supplied {
            return Err(TransitionError::MissingAmount);
        }
    } else if product_id.is_some() || amount_supplied {
        return Err(TransitionError::UnexpectedClosingFields);
    }
    Ok(())
}

/// Enforce the closing-details invariant on a record read from upstream.
///
/// A closed customer without its closing details is unusable and rejected.
/// Leftover closing fields on a non-closed customer are scrubbed with a
/// warning so the invariant holds on everything the gateway serves.
pub fn normalize_detail(mut detail: CustomerDetail) -> Result<CustomerDetail, InvariantViolation> {
    if detail.status == CustomerStatus::Closed {
        if detail.closed_amount.is_none()
            || detail.closed_produk_id.is_none()
            || detail.closed_produk.is_none()
        {
            return Err(InvariantViolation::MissingClosingDetails {
                cif: detail.cif.clone(),
            });
        }
    } else if detail.closed_amount.is_some()
        || detail.closed_produk_id.is_some()
        || detail.closed_produk.is_some()
    {
        tracing::warn!(
            cif = %detail.cif,
            status = %detail.status,
            "scrubbing closing details from non-closed customer"
        );
        detail.closed_amount = None;
        detail.closed_produk_id = None;
        detail.closed_produk = None;
    }
    Ok(detail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use CustomerStatus::*;

    fn detail(status: CustomerStatus) -> CustomerDetail {
        CustomerDetail {
            id: 1,
            cif: "124900000".to_string(),
            full_name: "Sandy Sudrajat".to_string(),
            phone_code: "+62".to_string(),
            phone_number: "88 9999 34555".to_string(),
            account_number: "78879101".to_string(),
            email: "sandy@example.com".to_string(),
            address: "Jl. Sandi Palupesy".to_string(),
            occupation: "Pegawai".to_string(),
            age: 30,
            income: 30_000_000,
            payroll: true,
            gender: "male".to_string(),
            marital_status: true,
            category_segment: "BUMN".to_string(),
            existing_products: vec!["mitraguna".to_string()],
            transaction_activity: "Active".to_string(),
            status,
            closed_amount: None,
            closed_produk_id: None,
            closed_produk: None,
        }
    }

    #[test]
    fn closing_requires_a_product_and_an_amount() {
        let err = validate_transition(New, Closed, None, true).unwrap_err();
        assert!(matches!(err, TransitionError::MissingProduct));
        let err = validate_transition(New, Closed, Some(3), false).unwrap_err();
        assert!(matches!(err, TransitionError::MissingAmount));
        assert!(validate_transition(New, Closed, Some(3), true).is_ok());
    }

    #[test]
    fn closing_fields_are_refused_outside_closed() {
        let err = validate_transition(New, Contacted, Some(3), false).unwrap_err();
        assert!(matches!(err, TransitionError::UnexpectedClosingFields));
        let err = validate_transition(New, Rejected, None, true).unwrap_err();
        assert!(matches!(err, TransitionError::UnexpectedClosingFields));
        assert!(validate_transition(Contacted, Rejected, None, false).is_ok());
    }

    #[test]
    fn terminal_customers_are_frozen() {
        let err = validate_transition(Closed, Contacted, None, false).unwrap_err();
        assert!(matches!(err, TransitionError::Terminal { from: Closed }));
        let err = validate_transition(Rejected, Closed, Some(1), true).unwrap_err();
        assert!(matches!(err, TransitionError::Terminal { from: Rejected }));
    }

    #[test]
    fn closed_without_details_is_rejected() {
        let result = normalize_detail(detail(Closed));
        assert!(matches!(
            result,
            Err(InvariantViolation::MissingClosingDetails { .. })
        ));
    }

    #[test]
    fn complete_closed_record_passes_through() {
        let mut closed = detail(Closed);
        closed.closed_amount = Some(1_000_000);
        closed.closed_produk_id = Some(2);
        closed.closed_produk = Some("Griya".to_string());
        let normalized = normalize_detail(closed).unwrap();
        assert_eq!(normalized.closed_amount, Some(1_000_000));
        assert_eq!(normalized.closed_produk.as_deref(), Some("Griya"));
    }

    #[test]
    fn stray_closing_fields_are_scrubbed() {
        let mut contacted = detail(Contacted);
        contacted.closed_amount = Some(5);
        let normalized = normalize_detail(contacted).unwrap();
        assert_eq!(normalized.closed_amount, None);
        assert_eq!(normalized.closed_produk_id, None);
    }
}

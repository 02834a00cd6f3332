//! Monthly per-product target assignments that branch managers hand to
//! marketing staff.

use std::collections::HashMap;
use std::collections::HashSet;

use thiserror::Error;

use crate::upstream::{AssignmentUpdate, MarketingAssignment};

#[derive(Debug, Error)]
pub enum AssignmentError {
    #[error("target month must be 1-12, got {0}")]
    InvalidMonth(u32),
    #[error("an assignment needs at least one product target")]
    Empty,
    #[error("target amount for product {product_id} is negative")]
    NegativeAmount { product_id: i64 },
    #[error("product {product_id} appears more than once")]
    DuplicateProduct { product_id: i64 },
}

/// Validate a manager-submitted assignment before it goes upstream.
pub fn validate_update(update: &AssignmentUpdate) -> Result<(), AssignmentError> {
    if !(1..=12).contains(&update.bulan) {
        return Err(AssignmentError::InvalidMonth(update.bulan));
    }
    if update.target.is_empty() {
        return Err(AssignmentError::Empty);
    }
    let mut seen = HashSet::new();
    for row in &update.target {
        if row.amount < 0 {
            return Err(AssignmentError::NegativeAmount {
                product_id: row.product_id,
            });
        }
        if !seen.insert(row.product_id) {
            return Err(AssignmentError::DuplicateProduct {
                product_id: row.product_id,
            });
        }
    }
    Ok(())
}

/// Re-establish the invariant `total_target == sum(target_details.amount)`
/// on assignments read from upstream. A mismatched total is corrected to
/// the recomputed sum and logged; `has_target` likewise follows from
/// whether any detail rows exist.
pub fn normalize(mut assignment: MarketingAssignment) -> MarketingAssignment {
    let computed: i64 = assignment.target_details.iter().map(|d| d.amount).sum();
    if assignment.total_target != computed {
        tracing::warn!(
            nip = %assignment.marketing_nip,
            reported = assignment.total_target,
            computed,
            "assignment total disagrees with its detail rows; using recomputed sum"
        );
        assignment.total_target = computed;
    }
    assignment.has_target = !assignment.target_details.is_empty();
    assignment
}

/// Field-level errors for the manager form, keyed the way the form
/// renders them.
pub fn field_errors(err: &AssignmentError) -> HashMap<String, String> {
    let mut errors = HashMap::new();
    match err {
        AssignmentError::InvalidMonth(_) => {
            errors.insert("bulan".to_string(), err.to_string());
        }
        AssignmentError::Empty => {
            errors.insert("target".to_string(), err.to_string());
        }
        AssignmentError::NegativeAmount { product_id }
        | AssignmentError::DuplicateProduct { product_id } => {
            errors.insert(format!("target.{}", product_id), err.to_string());
        }
    }
    errors
}

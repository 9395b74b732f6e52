use rust_decimal::Decimal;
use tally_types::{TransactionDraft, TransactionFields, TransactionType};
use tracing::{error, trace};

use crate::error::ValidationError;

/// A single field-level check applied to a draft.
///
/// Rules are evaluated in order; the first failure wins.
pub trait ValidationRule: Send + Sync {
    /// Human-readable name of this rule (e.g., "amount", "type").
    fn name(&self) -> &str;

    fn check(&self, draft: &TransactionDraft) -> Result<(), ValidationError>;
}

/// Amount must be present and strictly positive.
pub struct AmountRule;

impl ValidationRule for AmountRule {
    fn name(&self) -> &str {
        "amount"
    }

    fn check(&self, draft: &TransactionDraft) -> Result<(), ValidationError> {
        match draft.amount {
            Some(amount) if amount > Decimal::ZERO => Ok(()),
            _ => Err(ValidationError::NonPositiveAmount),
        }
    }
}

/// Type must be present and equal `CREDIT` or `DEBIT`, ignoring case.
pub struct TypeRule;

impl ValidationRule for TypeRule {
    fn name(&self) -> &str {
        "type"
    }

    fn check(&self, draft: &TransactionDraft) -> Result<(), ValidationError> {
        match draft.kind.as_deref() {
            Some(raw) if raw.parse::<TransactionType>().is_ok() => Ok(()),
            _ => Err(ValidationError::InvalidType),
        }
    }
}

/// Description must be present and not blank.
pub struct DescriptionRule;

impl ValidationRule for DescriptionRule {
    fn name(&self) -> &str {
        "description"
    }

    fn check(&self, draft: &TransactionDraft) -> Result<(), ValidationError> {
        match draft.description.as_deref() {
            Some(d) if !d.trim().is_empty() => Ok(()),
            _ => Err(ValidationError::EmptyDescription),
        }
    }
}

/// Fail-fast pipeline of [`ValidationRule`]s.
///
/// Category is never checked.
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Validator {
    /// Empty pipeline. Use [`Self::add_rule`] or [`Self::with_default_rules`].
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Amount -> Type -> Description.
    pub fn with_default_rules() -> Self {
        let mut validator = Self::new();
        validator.add_rule(Box::new(AmountRule));
        validator.add_rule(Box::new(TypeRule));
        validator.add_rule(Box::new(DescriptionRule));
        validator
    }

    pub fn add_rule(&mut self, rule: Box<dyn ValidationRule>) {
        self.rules.push(rule);
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Run every rule, then convert the draft into typed fields.
    pub fn validate(&self, draft: &TransactionDraft) -> Result<TransactionFields, ValidationError> {
        trace!("validating transaction draft");
        for rule in &self.rules {
            if let Err(e) = rule.check(draft) {
                error!(rule = rule.name(), reason = %e, "validation failed");
                return Err(e);
            }
        }
        into_fields(draft)
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::with_default_rules()
    }
}

// The pipeline is configurable, so the field invariants are enforced here too.
fn into_fields(draft: &TransactionDraft) -> Result<TransactionFields, ValidationError> {
    let amount = draft
        .amount
        .filter(|a| *a > Decimal::ZERO)
        .ok_or(ValidationError::NonPositiveAmount)?;
    let kind = draft
        .kind
        .as_deref()
        .and_then(|raw| raw.parse().ok())
        .ok_or(ValidationError::InvalidType)?;
    let description = draft
        .description
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .ok_or(ValidationError::EmptyDescription)?;
    Ok(TransactionFields {
        description: description.to_string(),
        amount,
        kind,
        category: draft.category.clone(),
    })
}

//! Boundary validation for create flows.

use crate::error::{AppError, MergeError};
use crate::merge::{MergeEngine, Mergeable};

pub struct RequestValidator;

impl RequestValidator {
    /// A body that creates a fresh entity must carry every `required` field;
    /// the default it merges into has nothing to fall back on. Merge-into-
    /// existing flows skip this: reject-null already keeps the stored value.
    pub fn validate_create<E: Mergeable>(engine: &MergeEngine, source: &E) -> Result<(), AppError> {
        let descriptor = engine.describe::<E>().map_err(MergeError::from)?;
        for field in descriptor.fields() {
            if field.is_required() && field.is_unset(source) {
                return Err(AppError::Validation(format!("{} is required", field.name())));
            }
        }
        Ok(())
    }
}

pub mod crud;
pub mod validation;

pub use crud::{CrudService, RestEntity};
pub use validation::RequestValidator;

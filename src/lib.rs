//! Graft SDK: entity-graph merge engine with generic REST CRUD services.

pub mod error;
pub mod handlers;
pub mod merge;
pub mod response;
pub mod routes;
pub mod service;
pub mod state;
pub mod store;

pub use error::{AppError, DescriptorError, MergeError};
pub use merge::{
    DescriptorCache, FieldDescriptor, FieldKind, Identified, MergeEngine, Mergeable, NullPolicy,
    TypeBuilder, TypeDescriptor,
};
pub use routes::{common_routes, entity_routes};
pub use service::{CrudService, RequestValidator, RestEntity};
pub use state::EntityState;
pub use store::{MemoryStore, Repository};

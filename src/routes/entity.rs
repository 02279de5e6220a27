//! Resource routes for one entity type. Mount under the entity's path
//! segment, e.g. `Router::new().nest("/api/v1/customers", entity_routes(state))`.

use crate::handlers::entity::{create, delete as delete_handler, list, merge, read, upsert, values};
use crate::service::RestEntity;
use crate::state::EntityState;
use axum::{routing::get, Router};

pub fn entity_routes<E: RestEntity>(state: EntityState<E>) -> Router {
    Router::new()
        .route("/", get(list::<E>).post(create::<E>))
        .route("/values/:field", get(values::<E>))
        .route(
            "/:id",
            get(read::<E>)
                .put(upsert::<E>)
                .patch(merge::<E>)
                .delete(delete_handler::<E>),
        )
        .with_state(state)
}

//! Example server: declares a small customer model, wires the merge engine to
//! in-memory repositories, and mounts common and entity routes.

use axum::Router;
use chrono::{DateTime, Utc};
use graft_sdk::{
    common_routes, entity_routes, EntityState, Identified, MemoryStore, MergeEngine, Mergeable,
    TypeBuilder,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
struct Address {
    street: Option<String>,
    city: Option<String>,
    postal_code: Option<String>,
}

impl Mergeable for Address {
    fn configure(fields: &mut TypeBuilder<Self>) {
        fields.scalar("street", |a| &a.street, |a| &mut a.street).accept_null();
        fields.scalar("city", |a| &a.city, |a| &mut a.city);
        fields
            .scalar("postal_code", |a| &a.postal_code, |a| &mut a.postal_code)
            .accept_null();
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
struct Contact {
    id: Option<Uuid>,
    label: Option<String>,
    phone: Option<String>,
}

impl Identified for Contact {
    type Key = Uuid;

    fn identity(&self) -> Option<Uuid> {
        self.id
    }

    fn set_identity(&mut self, key: Option<Uuid>) {
        self.id = key;
    }
}

impl Mergeable for Contact {
    fn configure(fields: &mut TypeBuilder<Self>) {
        fields.scalar("label", |c| &c.label, |c| &mut c.label);
        fields.scalar("phone", |c| &c.phone, |c| &mut c.phone).accept_null();
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
struct Customer {
    id: Option<Uuid>,
    name: Option<String>,
    email: Option<String>,
    signed_up_at: Option<DateTime<Utc>>,
    address: Option<Address>,
    tags: Option<Vec<String>>,
    attributes: Option<HashMap<String, String>>,
    contacts: Option<Vec<Contact>>,
}

impl Identified for Customer {
    type Key = Uuid;

    fn identity(&self) -> Option<Uuid> {
        self.id
    }

    fn set_identity(&mut self, key: Option<Uuid>) {
        self.id = key;
    }
}

impl Mergeable for Customer {
    fn configure(fields: &mut TypeBuilder<Self>) {
        fields.scalar("name", |c| &c.name, |c| &mut c.name).required();
        fields.scalar("email", |c| &c.email, |c| &mut c.email).accept_null();
        fields.scalar("signed_up_at", |c| &c.signed_up_at, |c| &mut c.signed_up_at);
        fields.nested("address", |c| &c.address, |c| &mut c.address).accept_null();
        fields.scalar_vec("tags", |c| &c.tags, |c| &mut c.tags);
        fields.scalar_map("attributes", |c| &c.attributes, |c| &mut c.attributes);
        fields.entity_vec("contacts", |c| &c.contacts, |c| &mut c.contacts);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("graft_sdk=info".parse()?))
        .init();

    let engine = Arc::new(MergeEngine::new());
    let customers = EntityState::new(engine, Arc::new(MemoryStore::<Customer>::new()));

    let app = Router::new()
        .merge(common_routes())
        .nest("/api/v1/customers", entity_routes(customers));

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

//! Example consumer: a separate Rust project that uses graft-sdk as a
//! dependency. Declares one entity, demonstrates a direct merge, then serves
//! it as a REST resource.
//!
//! Run from repo root: `cargo run -p example-consumer`

use axum::Router;
use graft_sdk::{
    common_routes, entity_routes, EntityState, Identified, MemoryStore, MergeEngine, Mergeable,
    TypeBuilder,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use uuid::Uuid;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
struct Ticket {
    id: Option<Uuid>,
    title: Option<String>,
    assignee: Option<String>,
    labels: Option<Vec<String>>,
}

impl Identified for Ticket {
    type Key = Uuid;

    fn identity(&self) -> Option<Uuid> {
        self.id
    }

    fn set_identity(&mut self, key: Option<Uuid>) {
        self.id = key;
    }
}

impl Mergeable for Ticket {
    fn configure(fields: &mut TypeBuilder<Self>) {
        fields.scalar("title", |t| &t.title, |t| &mut t.title).required();
        fields.scalar("assignee", |t| &t.assignee, |t| &mut t.assignee).accept_null();
        fields.scalar_vec("labels", |t| &t.labels, |t| &mut t.labels);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("graft_sdk=info")),
        )
        .init();

    let engine = Arc::new(MergeEngine::new());

    let mut stored = Ticket {
        id: Some(Uuid::new_v4()),
        title: Some("fix login".into()),
        assignee: Some("sam".into()),
        ..Default::default()
    };
    let incoming = Ticket {
        title: Some("fix login flow".into()),
        assignee: None,
        labels: Some(vec!["bug".into()]),
        ..Default::default()
    };
    let changed = engine.update(&mut stored, &incoming)?;
    tracing::info!(changed, title = ?stored.title, assignee = ?stored.assignee, "merged ticket");

    let state = EntityState::new(Arc::clone(&engine), Arc::new(MemoryStore::<Ticket>::new()));
    let app = Router::new()
        .merge(common_routes())
        .nest("/api/v1/tickets", entity_routes(state));

    let listener = TcpListener::bind("127.0.0.1:3000").await?;
    tracing::info!("example consumer listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

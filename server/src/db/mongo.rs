//! MongoDB-backed store.
//!
//! Documents are stored as
//! `{ _id: ObjectId, title, description?, completed, createdAt, updatedAt }`
//! with BSON dates. Ids that are not valid ObjectId hex strings cannot name a
//! document, so lookups with them answer "not found" without a round-trip.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::TryStreamExt;
use mongodb::{
    bson::{self, doc, oid::ObjectId, Document},
    options::ReturnDocument,
    Client, Collection, Database,
};
use serde::{Deserialize, Serialize};
use todo_core::{NewTodo, TodoPatch};
use tracing::debug;

use super::{ConnectionError, Connector, StoreError, TodoRepository, Todos, COLLECTION};
use crate::config::StoreConfig;
use crate::model::{now_millis, Todo, TodoId};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TodoDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default)]
    completed: bool,
    created_at: bson::DateTime,
    updated_at: bson::DateTime,
}

impl From<TodoDocument> for Todo {
    fn from(doc: TodoDocument) -> Self {
        Todo {
            id: TodoId::new(doc.id.to_hex()),
            title: doc.title,
            description: doc.description,
            completed: doc.completed,
            created_at: to_chrono(doc.created_at),
            updated_at: to_chrono(doc.updated_at),
        }
    }
}

fn to_chrono(at: bson::DateTime) -> DateTime<Utc> {
    DateTime::<Utc>::from(at.to_system_time())
}

fn to_bson(at: DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_millis(at.timestamp_millis())
}

fn object_id(id: &TodoId) -> Option<ObjectId> {
    ObjectId::parse_str(id.as_str()).ok()
}

/// Single-stage update pipeline for a partial update.
///
/// `updatedAt` becomes `max(now, previous + 1ms)` so it advances even when
/// two writes land in the same millisecond. Supplied strings go through
/// `$literal` since pipeline values starting with `$` are field paths.
fn update_pipeline(patch: TodoPatch, now: DateTime<Utc>) -> Vec<Document> {
    let mut set = doc! {
        "updatedAt": { "$max": [to_bson(now), { "$add": ["$updatedAt", 1_i64] }] }
    };
    if let Some(title) = patch.title {
        set.insert("title", doc! { "$literal": title.into_inner() });
    }
    if let Some(description) = patch.description {
        set.insert("description", doc! { "$literal": description.into_inner() });
    }
    if let Some(completed) = patch.completed {
        set.insert("completed", completed);
    }
    vec![doc! { "$set": set }]
}

#[derive(Clone)]
pub struct MongoTodos {
    collection: Collection<TodoDocument>,
}

impl MongoTodos {
    pub fn new(database: &Database) -> Self {
        Self {
            collection: database.collection(COLLECTION),
        }
    }
}

#[async_trait]
impl TodoRepository for MongoTodos {
    async fn list_all(&self) -> Result<Vec<Todo>, StoreError> {
        let cursor = self
            .collection
            .find(doc! {})
            .sort(doc! { "createdAt": -1, "_id": -1 })
            .await?;
        let docs: Vec<TodoDocument> = cursor.try_collect().await?;
        Ok(docs.into_iter().map(Todo::from).collect())
    }

    async fn get_by_id(&self, id: &TodoId) -> Result<Option<Todo>, StoreError> {
        let Some(oid) = object_id(id) else {
            debug!(%id, "not an ObjectId");
            return Ok(None);
        };
        let found = self.collection.find_one(doc! { "_id": oid }).await?;
        Ok(found.map(Todo::from))
    }

    async fn create(&self, input: NewTodo) -> Result<Todo, StoreError> {
        let now = to_bson(now_millis());
        let document = TodoDocument {
            id: ObjectId::new(),
            title: input.title.into_inner(),
            description: input.description.map(|d| d.into_inner()),
            completed: input.completed,
            created_at: now,
            updated_at: now,
        };
        self.collection.insert_one(&document).await?;
        Ok(document.into())
    }

    async fn update_by_id(&self, id: &TodoId, patch: TodoPatch) -> Result<Option<Todo>, StoreError> {
        let Some(oid) = object_id(id) else {
            return Ok(None);
        };
        let updated = self
            .collection
            .find_one_and_update(doc! { "_id": oid }, update_pipeline(patch, now_millis()))
            .return_document(ReturnDocument::After)
            .await?;
        Ok(updated.map(Todo::from))
    }

    async fn delete_by_id(&self, id: &TodoId) -> Result<Option<Todo>, StoreError> {
        let Some(oid) = object_id(id) else {
            return Ok(None);
        };
        let removed = self.collection.find_one_and_delete(doc! { "_id": oid }).await?;
        Ok(removed.map(Todo::from))
    }
}

/// Opens a client from the configured URI and pings the database before
/// reporting success, since the driver connects lazily.
pub struct MongoConnector {
    uri: String,
    database: String,
}

impl MongoConnector {
    pub fn new(uri: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            database: database.into(),
        }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(config.uri.clone(), config.database.clone())
    }
}

#[async_trait]
impl Connector for MongoConnector {
    async fn connect(&self) -> Result<Todos, ConnectionError> {
        if self.uri.trim().is_empty() {
            return Err(ConnectionError::MissingUri);
        }
        let client = Client::with_uri_str(&self.uri)
            .await
            .map_err(|e| ConnectionError::Connect(e.to_string()))?;
        let database = client.database(&self.database);
        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| ConnectionError::Connect(e.to_string()))?;
        Ok(Arc::new(MongoTodos::new(&database)))
    }
}

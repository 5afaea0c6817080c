//! In-process store selected by `memory://` URIs and used by the tests.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;
use todo_core::{NewTodo, TodoPatch};
use uuid::Uuid;

use super::{ConnectionError, Connector, StoreError, TodoRepository, Todos};
use crate::model::{next_updated_at, now_millis, Todo, TodoId};

struct Stored {
    // Insertion order; breaks ties between equal `createdAt` values.
    seq: u64,
    todo: Todo,
}

#[derive(Default)]
struct Collection {
    docs: HashMap<TodoId, Stored>,
    next_seq: u64,
}

#[derive(Clone, Default)]
pub struct MemoryTodos {
    inner: Arc<RwLock<Collection>>,
}

impl MemoryTodos {
    pub async fn len(&self) -> usize {
        self.inner.read().await.docs.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl TodoRepository for MemoryTodos {
    async fn list_all(&self) -> Result<Vec<Todo>, StoreError> {
        let collection = self.inner.read().await;
        let mut stored: Vec<&Stored> = collection.docs.values().collect();
        stored.sort_by(|a, b| {
            b.todo
                .created_at
                .cmp(&a.todo.created_at)
                .then(b.seq.cmp(&a.seq))
        });
        Ok(stored.into_iter().map(|s| s.todo.clone()).collect())
    }

    async fn get_by_id(&self, id: &TodoId) -> Result<Option<Todo>, StoreError> {
        let collection = self.inner.read().await;
        Ok(collection.docs.get(id).map(|s| s.todo.clone()))
    }

    async fn create(&self, input: NewTodo) -> Result<Todo, StoreError> {
        let now = now_millis();
        let todo = Todo {
            id: TodoId::new(Uuid::new_v4().simple().to_string()),
            title: input.title.into_inner(),
            description: input.description.map(|d| d.into_inner()),
            completed: input.completed,
            created_at: now,
            updated_at: now,
        };

        let mut collection = self.inner.write().await;
        let seq = collection.next_seq;
        collection.next_seq += 1;
        collection.docs.insert(
            todo.id.clone(),
            Stored {
                seq,
                todo: todo.clone(),
            },
        );
        Ok(todo)
    }

    async fn update_by_id(&self, id: &TodoId, patch: TodoPatch) -> Result<Option<Todo>, StoreError> {
        let mut collection = self.inner.write().await;
        let Some(stored) = collection.docs.get_mut(id) else {
            return Ok(None);
        };
        let todo = &mut stored.todo;
        if let Some(title) = patch.title {
            todo.title = title.into_inner();
        }
        if let Some(description) = patch.description {
            todo.description = Some(description.into_inner());
        }
        if let Some(completed) = patch.completed {
            todo.completed = completed;
        }
        todo.updated_at = next_updated_at(todo.updated_at, now_millis());
        Ok(Some(todo.clone()))
    }

    async fn delete_by_id(&self, id: &TodoId) -> Result<Option<Todo>, StoreError> {
        let mut collection = self.inner.write().await;
        Ok(collection.docs.remove(id).map(|s| s.todo))
    }
}

/// Hands out the same in-process collection on every connect.
#[derive(Clone, Default)]
pub struct MemoryConnector {
    todos: MemoryTodos,
}

impl MemoryConnector {
    pub fn new(todos: MemoryTodos) -> Self {
        Self { todos }
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(&self) -> Result<Todos, ConnectionError> {
        Ok(Arc::new(self.todos.clone()))
    }
}

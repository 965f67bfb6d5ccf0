use crate::data::student::{NewStudent, Student, StudentPatch};
use crate::error::RosterResult;
use async_trait::async_trait;
use std::fmt::Debug;
use uuid::Uuid;

pub mod memory_store;
pub mod postgres_store;
pub mod seed;
pub mod student;

///Everything the handlers need from wherever students are kept. Each method is one store operation.
#[async_trait]
pub trait StudentStore: Debug + Send + Sync {
    async fn find_all(&self) -> RosterResult<Vec<Student>>;
    ///case-insensitive substring match on the major
    async fn find_by_major(&self, fragment: &str) -> RosterResult<Vec<Student>>;
    async fn find_by_min_age(&self, min_age: i64) -> RosterResult<Vec<Student>>;
    async fn count(&self) -> RosterResult<u64>;
    async fn insert(&self, to_be_added: NewStudent) -> RosterResult<Student>;
    ///`Ok(None)` when nothing has that id
    async fn update(&self, id: Uuid, patch: StudentPatch) -> RosterResult<Option<Student>>;
    ///whether anything was removed
    async fn remove(&self, id: Uuid) -> RosterResult<bool>;
    async fn close(&self);
}

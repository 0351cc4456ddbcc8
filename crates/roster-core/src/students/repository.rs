use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{StudentError, StudentResult};
use crate::students::model::{Student, StudentInput};

/// Persistence seam for student records.
///
/// `insert` and `update` must reject a username already held by another
/// student with [`StudentError::AlreadyExists`].
#[async_trait]
pub trait StudentRepository: Send + Sync {
    async fn find_by_id(&self, id: u64) -> StudentResult<Option<Student>>;

    async fn find_by_username(&self, username: &str) -> StudentResult<Option<Student>>;

    /// All students ordered by id.
    async fn list(&self) -> StudentResult<Vec<Student>>;

    async fn insert(&self, input: StudentInput) -> StudentResult<Student>;

    async fn update(&self, student: Student) -> StudentResult<Student>;

    /// Returns `false` if no student had this id.
    async fn delete(&self, id: u64) -> StudentResult<bool>;
}

#[derive(Debug, Default)]
struct Table {
    rows: BTreeMap<u64, Student>,
    last_id: u64,
}

impl Table {
    fn username_taken(&self, username: &str, except: Option<u64>) -> bool {
        self.rows
            .values()
            .any(|s| s.username == username && Some(s.id) != except)
    }
}

/// Student records kept in process memory.
#[derive(Debug, Default)]
pub struct MemoryStudentRepository {
    table: RwLock<Table>,
}

impl MemoryStudentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StudentRepository for MemoryStudentRepository {
    async fn find_by_id(&self, id: u64) -> StudentResult<Option<Student>> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> StudentResult<Option<Student>> {
        let table = self.table.read().await;
        Ok(table.rows.values().find(|s| s.username == username).cloned())
    }

    async fn list(&self) -> StudentResult<Vec<Student>> {
        Ok(self.table.read().await.rows.values().cloned().collect())
    }

    async fn insert(&self, input: StudentInput) -> StudentResult<Student> {
        let mut table = self.table.write().await;
        if table.username_taken(&input.username, None) {
            return Err(StudentError::AlreadyExists(input.username));
        }
        table.last_id += 1;
        let student = Student {
            id: table.last_id,
            username: input.username,
            level: input.level,
        };
        table.rows.insert(student.id, student.clone());
        Ok(student)
    }

    async fn update(&self, student: Student) -> StudentResult<Student> {
        let mut table = self.table.write().await;
        if !table.rows.contains_key(&student.id) {
            return Err(StudentError::NotFound(student.id));
        }
        if table.username_taken(&student.username, Some(student.id)) {
            return Err(StudentError::AlreadyExists(student.username));
        }
        table.rows.insert(student.id, student.clone());
        Ok(student)
    }

    async fn delete(&self, id: u64) -> StudentResult<bool> {
        Ok(self.table.write().await.rows.remove(&id).is_some())
    }
}

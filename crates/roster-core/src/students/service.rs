use std::sync::Arc;

use crate::error::{StudentError, StudentResult};
use crate::students::model::{Page, Student, StudentInput, StudentLevel};
use crate::students::repository::StudentRepository;

const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 50;

/// Student CRUD, search and filtering on top of a [`StudentRepository`].
pub struct StudentService {
    repo: Arc<dyn StudentRepository>,
}

impl StudentService {
    pub fn new(repo: Arc<dyn StudentRepository>) -> Self {
        Self { repo }
    }

    pub async fn create(&self, input: StudentInput) -> StudentResult<Student> {
        let input = validate(input)?;
        if self.repo.find_by_username(&input.username).await?.is_some() {
            return Err(StudentError::AlreadyExists(input.username));
        }
        let student = self.repo.insert(input).await?;
        tracing::info!("Created student {} (id={})", student.username, student.id);
        Ok(student)
    }

    pub async fn get(&self, id: u64) -> StudentResult<Student> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(StudentError::NotFound(id))
    }

    pub async fn list(&self, page: usize, size: usize) -> StudentResult<Page<Student>> {
        Ok(Page::from_sorted(self.repo.list().await?, page, size))
    }

    pub async fn update(&self, id: u64, input: StudentInput) -> StudentResult<Student> {
        let input = validate(input)?;
        let current = self.get(id).await?;

        if current.username != input.username
            && self.repo.find_by_username(&input.username).await?.is_some()
        {
            return Err(StudentError::AlreadyExists(input.username));
        }

        let updated = self
            .repo
            .update(Student {
                id,
                username: input.username,
                level: input.level,
            })
            .await?;
        tracing::info!("Updated student id={id}");
        Ok(updated)
    }

    pub async fn delete(&self, id: u64) -> StudentResult<()> {
        if !self.repo.delete(id).await? {
            return Err(StudentError::NotFound(id));
        }
        tracing::info!("Deleted student id={id}");
        Ok(())
    }

    /// Case-insensitive substring match on username.
    pub async fn search(&self, query: &str, page: usize, size: usize) -> StudentResult<Page<Student>> {
        let needle = query.to_lowercase();
        let matches = self
            .repo
            .list()
            .await?
            .into_iter()
            .filter(|s| s.username.to_lowercase().contains(&needle))
            .collect();
        Ok(Page::from_sorted(matches, page, size))
    }

    pub async fn filter_by_level(
        &self,
        level: StudentLevel,
        page: usize,
        size: usize,
    ) -> StudentResult<Page<Student>> {
        let matches = self
            .repo
            .list()
            .await?
            .into_iter()
            .filter(|s| s.level == level)
            .collect();
        Ok(Page::from_sorted(matches, page, size))
    }
}

fn validate(input: StudentInput) -> StudentResult<StudentInput> {
    let username = input.username.trim().to_string();
    let len = username.chars().count();
    if !(USERNAME_MIN..=USERNAME_MAX).contains(&len) {
        return Err(StudentError::Validation(format!(
            "username must be between {USERNAME_MIN} and {USERNAME_MAX} characters"
        )));
    }
    Ok(StudentInput { username, ..input })
}

use serde::{Deserialize, Serialize};

/// Year of study.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StudentLevel {
    FirstYear,
    SecondYear,
    ThirdYear,
    FourthYear,
    FifthYear,
}

impl StudentLevel {
    pub fn display_name(self) -> &'static str {
        match self {
            StudentLevel::FirstYear => "First Year",
            StudentLevel::SecondYear => "Second Year",
            StudentLevel::ThirdYear => "Third Year",
            StudentLevel::FourthYear => "Fourth Year",
            StudentLevel::FifthYear => "Fifth Year",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: u64,
    pub username: String,
    pub level: StudentLevel,
}

/// Fields supplied by a caller when creating or updating a student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentInput {
    pub username: String,
    pub level: StudentLevel,
}

/// One page of results plus the totals needed to render pagination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: usize,
    pub size: usize,
    pub total_elements: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    /// Slices an already ordered list into page `page` of `size` items.
    pub fn from_sorted(items: Vec<T>, page: usize, size: usize) -> Self {
        let size = size.max(1);
        let total_elements = items.len();
        let total_pages = total_elements.div_ceil(size);
        let content = items.into_iter().skip(page.saturating_mul(size)).take(size).collect();
        Self {
            content,
            page,
            size,
            total_elements,
            total_pages,
        }
    }
}

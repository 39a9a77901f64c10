//! Consumed interface of the remote content/quiz service
//!
//! The guided-learning chat flow is an external collaborator: stateless, no
//! bearing on the attendance protocol. Only its consumed surface is defined
//! here; there is no client implementation in this workspace.

use serde::{Deserialize, Serialize};

use crate::Result;

// ----------------------------------------------------------------------------
// Payload Types
// ----------------------------------------------------------------------------

/// One multiple-choice question of a generated quiz
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    /// Index into `options`
    pub answer: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    pub questions: Vec<QuizQuestion>,
}

/// Teaching content generated for one topic
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonContent {
    pub summary: String,
    pub condensed_content: Vec<String>,
}

/// Combined response of a content-and-quiz request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonBundle {
    pub content: LessonContent,
    pub quiz: Quiz,
}

// ----------------------------------------------------------------------------
// Service Trait
// ----------------------------------------------------------------------------

/// Remote content/quiz API surface consumed by the student chat flow
#[async_trait::async_trait]
pub trait ContentService: Send + Sync {
    async fn subjects(&self) -> Result<Vec<String>>;

    async fn chapters(&self, subject: &str) -> Result<Vec<String>>;

    async fn topics(&self, subject: &str, chapter: &str) -> Result<Vec<String>>;

    /// Request lesson content plus a quiz sized to `minutes` of study time.
    async fn request_content_and_quiz(
        &self,
        subject: &str,
        chapter: &str,
        topic: &str,
        minutes: u32,
    ) -> Result<LessonBundle>;
}

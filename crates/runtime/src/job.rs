use crate::navigation::NavToken;

/// A unit of work deferred to the next paint frame.
///
/// Jobs remember the navigation they were scheduled under so the runner can
/// skip them once the page has been replaced.
#[derive(Debug, Clone, PartialEq)]
pub struct Job<T> {
    pub id: &'static str,
    /// Smaller values run earlier.
    pub priority: i32,
    pub token: NavToken,
    pub task: T,
}

impl<T> Job<T> {
    pub fn new(id: &'static str, token: NavToken, task: T) -> Self {
        Self {
            id,
            priority: 0,
            token,
            task,
        }
    }

    pub fn with_priority(id: &'static str, priority: i32, token: NavToken, task: T) -> Self {
        Self {
            id,
            priority,
            token,
            task,
        }
    }
}

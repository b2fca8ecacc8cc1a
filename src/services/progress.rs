/// Completion counts handed to the progress policy after a lesson completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ProgressSnapshot {
    pub(crate) completed_lessons: i64,
    pub(crate) total_lessons: i64,
}

/// Decides the enrollment progress written after a completion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum ProgressPolicy {
    /// Progress is left as stored; nothing is written.
    #[default]
    Unchanged,
}

impl ProgressPolicy {
    /// Returns the new progress percentage, or `None` to leave it untouched.
    pub(crate) fn next_progress(self, snapshot: ProgressSnapshot) -> Option<i32> {
        match self {
            Self::Unchanged => {
                tracing::debug!(
                    completed_lessons = snapshot.completed_lessons,
                    total_lessons = snapshot.total_lessons,
                    "progress left unchanged"
                );
                None
            }
        }
    }
}

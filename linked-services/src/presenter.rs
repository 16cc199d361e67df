use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// User-facing side of the coordinator: transient notices and yes/no prompts.
#[async_trait]
pub trait Presenter: Send + Sync {
    /// Asks before a destructive action. Nothing happens unless this returns true.
    async fn confirm(&self, title: &str, message: &str) -> bool;

    fn notify(&self, message: &str, kind: NoticeKind);
}

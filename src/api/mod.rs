pub mod client;
pub mod models;
pub mod threads;

pub use client::GmailClient;
pub use models::{Message, MessageRef, Thread, ThreadPage, ThreadSummary};

use crate::error::AppResult;

/// Read-only view of a mailbox's threads.
#[allow(async_fn_in_trait)]
pub trait MailSource {
    async fn list_threads_page(
        &mut self,
        user_id: &str,
        page_token: Option<&str>,
    ) -> AppResult<ThreadPage>;

    async fn get_thread(&mut self, user_id: &str, thread_id: &str) -> AppResult<Thread>;

    async fn get_message(&mut self, user_id: &str, message_id: &str) -> AppResult<Message>;
}

use std::io::Write;

use crate::api::{MailSource, Thread, ThreadPage};
use crate::error::AppResult;

/// Where the pagination loop stands between list calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageState {
    /// `None` only before the first list call.
    HasNextPage(Option<String>),
    Done,
}

impl PageState {
    pub fn start() -> Self {
        Self::HasNextPage(None)
    }

    /// An empty page ends the loop even when it carries a continuation token.
    pub fn after(page: &ThreadPage) -> Self {
        if page.threads.is_empty() {
            return Self::Done;
        }

        match page.next_page_token.as_deref() {
            Some(token) if !token.is_empty() => Self::HasNextPage(Some(token.to_string())),
            _ => Self::Done,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchSummary {
    pub pages: usize,
    pub threads: usize,
    pub printed_threads: usize,
    pub lines: usize,
}

pub struct ThreadFetcher<'a, M, W> {
    source: &'a mut M,
    user_id: &'a str,
    out: W,
}

impl<'a, M: MailSource, W: Write> ThreadFetcher<'a, M, W> {
    pub fn new(source: &'a mut M, user_id: &'a str, out: W) -> Self {
        Self {
            source,
            user_id,
            out,
        }
    }

    pub fn into_output(self) -> W {
        self.out
    }

    pub async fn run(&mut self) -> AppResult<FetchSummary> {
        let mut summary = FetchSummary::default();
        let mut state = PageState::start();

        while let PageState::HasNextPage(page_token) = state {
            let page = self
                .source
                .list_threads_page(self.user_id, page_token.as_deref())
                .await?;
            summary.pages += 1;
            tracing::debug!(
                page = summary.pages,
                threads = page.threads.len(),
                "listed thread page"
            );

            for entry in &page.threads {
                summary.threads += 1;
                let thread = self.source.get_thread(self.user_id, &entry.id).await?;
                let lines =
                    print_thread_snippets(&mut *self.source, self.user_id, &thread, &mut self.out)
                        .await?;
                if lines > 0 {
                    summary.printed_threads += 1;
                    summary.lines += lines;
                }
            }

            state = PageState::after(&page);
        }

        self.out.flush()?;
        Ok(summary)
    }
}

/// Prints `index: snippet` for each message of a multi-message thread.
/// Returns the number of lines written.
pub async fn print_thread_snippets<M, W>(
    source: &mut M,
    user_id: &str,
    thread: &Thread,
    out: &mut W,
) -> AppResult<usize>
where
    M: MailSource,
    W: Write,
{
    if thread.messages.len() <= 1 {
        return Ok(0);
    }

    for (index, message_ref) in thread.messages.iter().enumerate() {
        let message = source.get_message(user_id, &message_ref.id).await?;
        writeln!(out, "{index}: {}", snippet_text(&message.snippet))?;
    }

    Ok(thread.messages.len())
}

fn snippet_text(snippet: &str) -> String {
    html_escape::decode_html_entities(snippet).to_string()
}

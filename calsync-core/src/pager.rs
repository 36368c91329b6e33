//! Continuation-token paging over the remote feed.

use crate::error::SyncResult;
use crate::remote::{FeedClient, FeedPage};

/// Drives repeated feed fetches until the continuation token runs out.
///
/// Lazy and non-restartable: each call fetches exactly one page, and the
/// only cross-page state is the current token. Feed errors propagate
/// unchanged; there is no retry.
pub struct Pager<'a, C: FeedClient> {
    client: &'a C,
    calendar_id: &'a str,
    token: String,
    done: bool,
}

impl<'a, C: FeedClient> Pager<'a, C> {
    pub fn new(client: &'a C, calendar_id: &'a str) -> Self {
        Pager {
            client,
            calendar_id,
            token: String::new(),
            done: false,
        }
    }

    /// Fetch the next page, or `None` once the feed is exhausted.
    pub async fn next_page(&mut self) -> SyncResult<Option<FeedPage>> {
        if self.done {
            return Ok(None);
        }

        let page = self.client.list_page(self.calendar_id, &self.token).await?;

        match &page.next_page_token {
            Some(token) => self.token = token.clone(),
            None => self.done = true,
        }

        Ok(Some(page))
    }
}

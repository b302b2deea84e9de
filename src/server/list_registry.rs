//! List registry mapping served list names to their fetchers

use crate::core::adapter::{ClientFetcher, ServerFetcher};
use crate::core::auth::SessionProvider;
use crate::core::error::FetchResult;
use crate::core::query::{ListPage, ListRequest};
use indexmap::IndexMap;

/// A list as served over HTTP
#[derive(Clone)]
pub enum RegisteredList {
    /// Unscoped list, left to the store's access control
    Client(ClientFetcher),

    /// Owner-scoped list, resolved against the request session
    Server(ServerFetcher),
}

impl RegisteredList {
    /// Fetch a page; `session` is only consulted by scoped lists
    pub async fn fetch(
        &self,
        session: &dyn SessionProvider,
        request: &ListRequest,
    ) -> FetchResult<ListPage> {
        match self {
            RegisteredList::Client(fetcher) => fetcher.fetch(request).await,
            RegisteredList::Server(fetcher) => fetcher.fetch_with_session(session, request).await,
        }
    }

    pub fn collection(&self) -> &str {
        match self {
            RegisteredList::Client(fetcher) => fetcher.config().collection(),
            RegisteredList::Server(fetcher) => fetcher.config().collection(),
        }
    }

    pub fn is_scoped(&self) -> bool {
        matches!(self, RegisteredList::Server(_))
    }
}

/// Registry for all lists in the application
///
/// Names keep registration order.
#[derive(Clone, Default)]
pub struct ListRegistry {
    lists: IndexMap<String, RegisteredList>,
}

impl ListRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a list; a later registration under the same name replaces it
    pub fn register(&mut self, name: impl Into<String>, list: RegisteredList) {
        self.lists.insert(name.into(), list);
    }

    pub fn get(&self, name: &str) -> Option<&RegisteredList> {
        self.lists.get(name)
    }

    /// Get all registered list names
    pub fn names(&self) -> Vec<&str> {
        self.lists.keys().map(|s| s.as_str()).collect()
    }
}

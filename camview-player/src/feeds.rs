//! Named camera feed registry
//!
//! In-memory list of feeds the user registered, plus the current selection.
//! The registry only stores; handlers pass the selected locator on to the
//! negotiator.

use crate::error::{Error, Result};
use crate::negotiator::stream_path;
use camview_common::events::FeedInfo;
use uuid::Uuid;

const UNTITLED_FEED: &str = "Untitled stream";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feed {
    pub id: Uuid,
    pub name: String,
    pub locator: String,
}

#[derive(Debug, Default)]
pub struct FeedRegistry {
    feeds: Vec<Feed>,
    selected: Option<Uuid>,
}

impl FeedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a feed
    ///
    /// Name and locator are trimmed. An empty locator is rejected; an empty
    /// name defaults to the locator's host.
    pub fn add(&mut self, name: &str, locator: &str) -> Result<Feed> {
        let locator = locator.trim();
        if locator.is_empty() {
            return Err(Error::BadRequest("locator must not be empty".to_string()));
        }

        let name = match name.trim() {
            "" => default_name(locator),
            name => name.to_string(),
        };

        let feed = Feed {
            id: Uuid::new_v4(),
            name,
            locator: locator.to_string(),
        };
        self.feeds.push(feed.clone());
        Ok(feed)
    }

    /// Remove a feed, returning it and whether it was the selected one
    pub fn remove(&mut self, id: Uuid) -> Result<(Feed, bool)> {
        let index = self
            .feeds
            .iter()
            .position(|f| f.id == id)
            .ok_or(Error::FeedNotFound(id))?;

        let feed = self.feeds.remove(index);
        let was_selected = self.selected == Some(id);
        if was_selected {
            self.selected = None;
        }
        Ok((feed, was_selected))
    }

    pub fn select(&mut self, id: Uuid) -> Result<Feed> {
        let feed = self.get(id).cloned().ok_or(Error::FeedNotFound(id))?;
        self.selected = Some(id);
        Ok(feed)
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn get(&self, id: Uuid) -> Option<&Feed> {
        self.feeds.iter().find(|f| f.id == id)
    }

    pub fn selected(&self) -> Option<&Feed> {
        self.selected.and_then(|id| self.get(id))
    }

    pub fn selected_id(&self) -> Option<Uuid> {
        self.selected
    }

    pub fn len(&self) -> usize {
        self.feeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.feeds.is_empty()
    }

    /// Feed list for display; `connected` marks the selected feed while playing
    pub fn list(&self, playing: bool) -> Vec<FeedInfo> {
        self.feeds
            .iter()
            .map(|feed| FeedInfo {
                id: feed.id,
                name: feed.name.clone(),
                locator: feed.locator.clone(),
                connected: playing && self.selected == Some(feed.id),
            })
            .collect()
    }
}

fn default_name(locator: &str) -> String {
    url::Url::parse(locator)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
        .filter(|host| !host.is_empty())
        .map(|host| match stream_path(locator) {
            Some(path) => format!("{} ({})", host, path),
            None => host,
        })
        .unwrap_or_else(|| UNTITLED_FEED.to_string())
}

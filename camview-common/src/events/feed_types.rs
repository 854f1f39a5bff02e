//! Camera feed type definitions

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named camera feed as shown in the feed list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedInfo {
    pub id: Uuid,
    pub name: String,
    /// Camera stream locator (rtsp://host:port/path)
    pub locator: String,
    /// Selected and playing intent on
    pub connected: bool,
}

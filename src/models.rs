use serde::{Deserialize, Serialize};

pub const ANONYMOUS_NAME: &str = "ななし";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestbookEntry {
    pub name: String,
    pub message: String,
    pub date: String,
}

/// The single persisted record. Field names are the storage layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitRecord {
    pub total: u64,
    pub day: String,
    pub today: u64,
    pub yesterday: u64,
    pub guestbook: Vec<GuestbookEntry>,
}

#[derive(Debug, Deserialize)]
pub struct GuestbookRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StateResponse {
    pub total: u64,
    pub day: String,
    pub today: u64,
    pub yesterday: u64,
    pub milestone: bool,
    pub guestbook: Vec<GuestbookEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GuestbookResponse {
    pub guestbook: Vec<GuestbookEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PostEntryResponse {
    pub appended: bool,
    pub guestbook: Vec<GuestbookEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClearResponse {
    pub removed: usize,
    pub guestbook: Vec<GuestbookEntry>,
}

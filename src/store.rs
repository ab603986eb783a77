use crate::errors::AppError;
use crate::models::{GuestbookEntry, VisitRecord};
use crate::record::{self, Recovery};
use crate::storage::Storage;
use chrono::{NaiveDate, NaiveDateTime};
use tracing::{error, info, warn};

pub const STORAGE_KEY: &str = "retro_otaku_site_v1";

/// Sole owner of the persisted record: every read and write of the entry
/// goes through here.
#[derive(Debug, Clone)]
pub struct VisitStore {
    storage: Storage,
}

#[derive(Debug, Clone)]
pub struct PageLoad {
    pub record: VisitRecord,
    pub now: NaiveDateTime,
    pub milestone: bool,
}

impl VisitStore {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Reads and decodes the entry. Only a failed read is an error; anything
    /// that was read decodes to some record.
    async fn read(&self, today: NaiveDate) -> Result<VisitRecord, AppError> {
        let raw = self.storage.get_item(STORAGE_KEY).await?;
        let decoded = record::decode(raw.as_deref(), today);
        match &decoded.recovery {
            Recovery::Clean | Recovery::Missing => {}
            Recovery::Unreadable => warn!("stored record unreadable, starting fresh"),
            Recovery::Repaired(fields) => warn!(?fields, "stored record repaired"),
        }
        Ok(decoded.record)
    }

    pub async fn load(&self, today: NaiveDate) -> VisitRecord {
        match self.read(today).await {
            Ok(record) => record,
            Err(err) => {
                error!("failed to read {STORAGE_KEY}: {err}");
                VisitRecord::fresh(today)
            }
        }
    }

    pub async fn save(&self, record: &VisitRecord) -> Result<(), AppError> {
        let payload = serde_json::to_string(record)?;
        self.storage.set_item(STORAGE_KEY, &payload).await
    }

    /// Rollover and visit counting for one page load. The returned record
    /// always reflects the visit. Nothing is written when the entry could not
    /// be read, so an unreadable entry is never replaced by a fresh record.
    pub async fn page_load(&self, now: NaiveDateTime) -> PageLoad {
        let today = now.date();
        let (mut record, readable) = match self.read(today).await {
            Ok(record) => (record, true),
            Err(err) => {
                error!("failed to read {STORAGE_KEY}, visit will not be saved: {err}");
                (VisitRecord::fresh(today), false)
            }
        };

        if record::apply_daily_rollover(&mut record, today) {
            info!(day = %record.day, yesterday = record.yesterday, "daily rollover");
        }
        record::record_visit(&mut record);

        if readable {
            if let Err(err) = self.save(&record).await {
                error!("failed to persist visit: {err}");
            }
        }

        let milestone = record::is_milestone(record.total);
        if milestone {
            info!(total = record.total, "milestone visit");
        }

        PageLoad {
            record,
            now,
            milestone,
        }
    }

    /// Current view of the record without counting a visit or writing.
    pub async fn snapshot(&self, today: NaiveDate) -> VisitRecord {
        let mut record = self.load(today).await;
        record::apply_daily_rollover(&mut record, today);
        record
    }

    pub async fn post_entry(
        &self,
        name: &str,
        message: &str,
        now: NaiveDateTime,
    ) -> Result<(Option<GuestbookEntry>, VisitRecord), AppError> {
        let mut record = self.read(now.date()).await?;
        let appended = record::append_guestbook_entry(&mut record, name, message, now).cloned();
        if appended.is_some() {
            self.save(&record).await?;
        }
        Ok((appended, record))
    }

    pub async fn clear_guestbook(&self, today: NaiveDate) -> Result<usize, AppError> {
        let mut record = self.read(today).await?;
        let removed = record::clear_guestbook(&mut record);
        self.save(&record).await?;
        info!(removed, "guestbook cleared");
        Ok(removed)
    }
}

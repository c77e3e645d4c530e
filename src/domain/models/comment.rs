//! Comment domain model.
//!
//! Free-text or geo-tagged annotations attached to an activity record, with
//! optional file attachments. Plain CRUD, no lifecycle of its own.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const MAP_BASE_URL: &str = "https://yandex.ru/maps/";
const MAP_ZOOM: u8 = 15;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,

    /// Activity record the comment annotates
    pub activity_statistics_id: Uuid,

    pub text: Option<String>,

    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// File attached to a comment, stored by path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentFile {
    pub id: Uuid,
    pub comment_id: Uuid,
    pub path: String,
}

impl Comment {
    pub fn new(activity_statistics_id: Uuid, actor: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            activity_statistics_id,
            text: None,
            latitude: None,
            longitude: None,
            created_by: Some(actor),
            updated_by: Some(actor),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    /// Map link for geotagged comments.
    pub fn map_url(&self) -> Option<String> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(format!(
                "{MAP_BASE_URL}?ll={lon},{lat}&pt={lon},{lat}&z={MAP_ZOOM}"
            )),
            _ => None,
        }
    }
}

//! QR scan dispatch
//!
//! Decoding is done by the scanning library on the client. We only classify
//! the decoded payload and close the scanning session.

use std::fmt;

use serde::Serialize;
use tracing::{debug, info};
use url::Url;

use crate::error::ScanError;

/// Query parameter that marks a card link
const CARD_PARAM: &str = "card";
const CARD_IDS: [&str; 4] = ["1", "2", "3", "4"];

/// Identifier of one of the printed cards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CardId(u8);

impl CardId {
    /// Accepts exactly "1" through "4"
    pub fn from_param(value: &str) -> Option<Self> {
        if CARD_IDS.contains(&value) {
            value.parse().ok().map(CardId)
        } else {
            None
        }
    }

    pub fn get(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What to do with a decoded payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "value", rename_all = "snake_case")]
pub enum ScanOutcome {
    ShowCard(CardId),
    /// Any other absolute url, kept exactly as scanned
    OpenLink(String),
    ShowText(String),
}

/// Classify a decoded payload
pub fn classify_scan(payload: &str) -> ScanOutcome {
    let url = match Url::parse(payload.trim()) {
        Ok(url) => url,
        Err(e) => {
            debug!("Scan payload is not a url ({}), showing as text", e);
            return ScanOutcome::ShowText(payload.to_string());
        }
    };

    let card = url
        .query_pairs()
        .find(|(key, _)| key == CARD_PARAM)
        .and_then(|(_, value)| CardId::from_param(&value));

    match card {
        Some(card) => ScanOutcome::ShowCard(card),
        None => ScanOutcome::OpenLink(payload.to_string()),
    }
}

/// Where scanned images come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanMode {
    Camera,
    /// Camera could not be acquired; the client prompts for an image file
    Upload,
}

/// One open scanning dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanSession {
    mode: ScanMode,
    open: bool,
}

impl ScanSession {
    /// Open a session, falling back to upload when the camera is unavailable
    pub fn open(camera: Result<(), ScanError>) -> Self {
        let mode = match camera {
            Ok(()) => ScanMode::Camera,
            Err(e) => {
                info!("Falling back to image upload: {}", e);
                ScanMode::Upload
            }
        };
        Self { mode, open: true }
    }

    pub fn closed() -> Self {
        Self {
            mode: ScanMode::Camera,
            open: false,
        }
    }

    pub fn mode(&self) -> ScanMode {
        self.mode
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Classify a payload and close the session
    pub fn submit(&mut self, payload: &str) -> Result<ScanOutcome, ScanError> {
        if !self.open {
            return Err(ScanError::SessionClosed);
        }
        self.open = false;
        Ok(classify_scan(payload))
    }
}

//! Response shapes of the server's AJAX endpoints and the photo picker modal
//! that displays them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::text::pluralize;

/// Form field carrying the CSRF token on POSTs.
pub const CSRF_FIELD: &str = "csrfmiddlewaretoken";

/// Add the CSRF token to outgoing form data.
pub fn include_csrf(
    mut data: BTreeMap<String, String>,
    token: impl Into<String>,
) -> BTreeMap<String, String> {
    data.insert(CSRF_FIELD.to_string(), token.into());
    data
}

/// Envelope shared by the JSON endpoints: `success` plus a message on failure.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatusResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// One photo offered by the photo picker.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PhotoRecord {
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PhotosResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub photos: Vec<PhotoRecord>,
}

impl PhotosResponse {
    pub fn from_json(body: &str) -> serde_json::Result<Self> {
        serde_json::from_str(body)
    }
}

/// State of the photo picker modal.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PhotosModal {
    pub title: String,
    pub message: Option<String>,
    pub results: Vec<PhotoRecord>,
    pub open: bool,
    object_id: Option<String>,
}

impl PhotosModal {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Open for the object named by the clicked button, if any.
    pub fn open_for(&mut self, object_id: Option<String>) {
        self.open = true;
        self.object_id = object_id;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// Query string for the photo listing request.
    pub fn listing_query(&self) -> BTreeMap<String, String> {
        self.object_id
            .iter()
            .map(|id| ("object_id".to_string(), id.clone()))
            .collect()
    }

    /// Show the listing: a count and thumbnails on success, the server message otherwise.
    pub fn apply_listing(&mut self, response: PhotosResponse) {
        if response.success {
            if !response.photos.is_empty() {
                let count = response.photos.len();
                self.message = Some(format!(
                    "{count} {} found.",
                    pluralize(count, "photo", None)
                ));
                self.results = response.photos;
            }
        } else {
            self.message = response.message;
        }
    }

    /// POST body for choosing `photo`, or `None` if it carries no photo URL.
    pub fn selection(&self, photo: &PhotoRecord, csrf_token: &str) -> Option<BTreeMap<String, String>> {
        let photo_url = photo.photo_url.clone()?;
        let mut data = BTreeMap::new();
        data.insert(
            "object_id".to_string(),
            self.object_id.clone().unwrap_or_default(),
        );
        data.insert("photo_url".to_string(), photo_url);
        Some(include_csrf(data, csrf_token))
    }

    /// Whether the page should reload after a selection was posted.
    pub fn apply_selection(&mut self, response: StatusResponse) -> bool {
        if response.success {
            true
        } else {
            self.message = response.message;
            false
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SubpageResponse {
    #[serde(default)]
    pub redirect: Option<String>,
    #[serde(default)]
    pub subpage: Option<String>,
}

/// What to do with the response to a subpage form post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubpageAction {
    /// Leave the page.
    Navigate(String),
    /// Fetch `url` into the `into` subpage and collapse the current one.
    Load { url: String, into: String },
    /// The body was HTML for the current subpage.
    Replace(String),
}

impl SubpageAction {
    pub fn from_body(body: &str) -> Self {
        match serde_json::from_str::<SubpageResponse>(body) {
            Ok(SubpageResponse {
                redirect: Some(url),
                subpage,
            }) => match subpage.filter(|s| !s.is_empty()) {
                Some(into) => Self::Load { url, into },
                None => Self::Navigate(url),
            },
            _ => Self::Replace(body.to_string()),
        }
    }
}

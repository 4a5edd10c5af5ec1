//! Primary / high-resolution image sources.
//!
//! The overlay starts on the primary source. If a high-resolution source was
//! given it is preloaded by the host; the outcome is parked here and applied
//! on the next frame. A failed preload keeps the primary source for good.

use serde::{Deserialize, Serialize};

use crate::error::ViewerError;
use crate::geometry::Size;

/// Component inputs describing the media.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ImageSources {
    /// Shown in the preview and at low zoom
    pub primary: String,
    /// Swapped into the overlay once preloaded
    #[serde(default)]
    pub hi_res: Option<String>,
    /// Accessibility text, passed through unmodified
    #[serde(default)]
    pub alt: String,
    /// Region label, passed through unmodified
    #[serde(default)]
    pub label: String,
}

impl ImageSources {
    pub fn new(primary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            alt: "Preview image".to_string(),
            label: "Preview".to_string(),
            ..Default::default()
        }
    }

    pub fn with_hi_res(mut self, hi_res: impl Into<String>) -> Self {
        self.hi_res = Some(hi_res.into());
        self
    }

    pub fn with_alt(mut self, alt: impl Into<String>) -> Self {
        self.alt = alt.into();
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HiResStatus {
    /// No high-resolution source configured
    #[default]
    Absent,
    /// Waiting for the host to start the preload
    Pending,
    Loading,
    Loaded,
    Failed,
}

/// Preload outcome reported by the host.
pub type PreloadResult = Result<Size, ViewerError>;

#[derive(Debug)]
pub struct SourceState {
    sources: ImageSources,
    status: HiResStatus,
    parked: Option<PreloadResult>,
}

impl SourceState {
    pub fn new(sources: ImageSources) -> Self {
        let status = if sources.hi_res.is_some() {
            HiResStatus::Pending
        } else {
            HiResStatus::Absent
        };
        Self {
            sources,
            status,
            parked: None,
        }
    }

    pub fn sources(&self) -> &ImageSources {
        &self.sources
    }

    pub fn status(&self) -> &HiResStatus {
        &self.status
    }

    /// URL the overlay image should currently show.
    pub fn current(&self) -> &str {
        match (&self.status, &self.sources.hi_res) {
            (HiResStatus::Loaded, Some(hi_res)) => hi_res,
            _ => &self.sources.primary,
        }
    }

    /// Hand out the URL to preload, once.
    pub fn take_preload_request(&mut self) -> Option<String> {
        if self.status != HiResStatus::Pending {
            return None;
        }
        self.status = HiResStatus::Loading;
        self.sources.hi_res.clone()
    }

    /// Park a preload outcome until the next frame.
    pub fn park(&mut self, result: PreloadResult) -> bool {
        if self.status != HiResStatus::Loading {
            log::debug!("Ignoring preload result in state {:?}", self.status);
            return false;
        }
        self.parked = Some(result);
        true
    }

    /// Apply a parked outcome. Returns the new URL and natural size on success.
    pub fn apply_parked(&mut self) -> Option<(String, Size)> {
        match self.parked.take()? {
            Ok(size) => {
                self.status = HiResStatus::Loaded;
                log::info!("High-resolution image ready ({}x{})", size.width, size.height);
                Some((self.current().to_string(), size))
            }
            Err(e) => {
                self.status = HiResStatus::Failed;
                log::warn!("Keeping primary image: {}", e);
                None
            }
        }
    }

    pub fn cancel_parked(&mut self) {
        self.parked = None;
    }
}

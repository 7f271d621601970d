//! Camera and gallery capture flow.
//!
//! # Responsibility
//! - Request the matching permission before opening any capture UI.
//! - Tell the user when permission is denied.
//! - Collapse denial and cancellation into "no photo" for the store.
//!
//! # Invariants
//! - The capture UI is never launched without a granted permission.
//! - A blank locator from the host counts as a cancellation.

use super::capability::MediaCapability;
use crate::model::task::Photo;
use async_trait::async_trait;
use log::{info, warn};

const DEFAULT_CAPTURE_QUALITY: f32 = 0.8;

/// Result of a permission prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
    /// The user has not answered yet; treated as denied.
    Undetermined,
}

/// Options forwarded to the host capture UI.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureOptions {
    /// Let the user crop before confirming.
    pub allows_editing: bool,
    /// JPEG quality in `0.0..=1.0`.
    pub quality: f32,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            allows_editing: true,
            quality: DEFAULT_CAPTURE_QUALITY,
        }
    }
}

impl CaptureOptions {
    fn normalized(self) -> Self {
        let quality = if self.quality.is_finite() {
            self.quality.clamp(0.0, 1.0)
        } else {
            DEFAULT_CAPTURE_QUALITY
        };
        Self { quality, ..self }
    }
}

/// Host media services.
#[async_trait(?Send)]
pub trait MediaPlatform {
    async fn request_permission(&self, capability: MediaCapability) -> PermissionStatus;

    /// Opens the camera or gallery UI. `None` means the user cancelled.
    async fn launch(&self, capability: MediaCapability, options: CaptureOptions) -> Option<String>;

    /// Shows a blocking, user-visible message.
    fn show_alert(&self, message: &str);
}

/// Outcome of one capture attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    Captured(String),
    Cancelled,
    PermissionDenied,
}

impl CaptureOutcome {
    /// Denial and cancellation both mean "no photo chosen".
    pub fn into_photo(self) -> Photo {
        match self {
            Self::Captured(locator) => Photo::from_locator(locator),
            Self::Cancelled | Self::PermissionDenied => Photo::None,
        }
    }

    pub fn locator(&self) -> Option<&str> {
        match self {
            Self::Captured(locator) => Some(locator.as_str()),
            Self::Cancelled | Self::PermissionDenied => None,
        }
    }
}

/// Capture facade over a [`MediaPlatform`].
pub struct MediaCapture<P: MediaPlatform> {
    platform: P,
    options: CaptureOptions,
}

impl<P: MediaPlatform> MediaCapture<P> {
    pub fn new(platform: P) -> Self {
        Self::with_options(platform, CaptureOptions::default())
    }

    pub fn with_options(platform: P, options: CaptureOptions) -> Self {
        Self {
            platform,
            options: options.normalized(),
        }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn options(&self) -> CaptureOptions {
        self.options
    }

    /// Takes a new photo with the camera.
    pub async fn capture_photo(&self) -> CaptureOutcome {
        self.acquire(MediaCapability::Camera).await
    }

    /// Picks an existing image from the gallery.
    pub async fn pick_from_gallery(&self) -> CaptureOutcome {
        self.acquire(MediaCapability::MediaLibrary).await
    }

    async fn acquire(&self, capability: MediaCapability) -> CaptureOutcome {
        let status = self.platform.request_permission(capability).await;
        if status != PermissionStatus::Granted {
            warn!(
                "event=media_capture module=media status=denied capability={capability} permission={status:?}"
            );
            self.platform.show_alert(capability.permission_message());
            return CaptureOutcome::PermissionDenied;
        }

        match self.platform.launch(capability, self.options).await {
            Some(locator) if !locator.trim().is_empty() => {
                info!("event=media_capture module=media status=ok capability={capability}");
                CaptureOutcome::Captured(locator)
            }
            _ => {
                info!("event=media_capture module=media status=cancelled capability={capability}");
                CaptureOutcome::Cancelled
            }
        }
    }
}

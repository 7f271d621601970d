//! Media capabilities a task photo can come from.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Platform capability that needs a user permission before use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MediaCapability {
    Camera,
    MediaLibrary,
}

/// Stable string id for the camera capability.
pub const MEDIA_CAPABILITY_CAMERA: &str = "camera";
/// Stable string id for the photo library capability.
pub const MEDIA_CAPABILITY_MEDIA_LIBRARY: &str = "media_library";

impl MediaCapability {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Camera => MEDIA_CAPABILITY_CAMERA,
            Self::MediaLibrary => MEDIA_CAPABILITY_MEDIA_LIBRARY,
        }
    }

    /// Message shown to the user when the permission is denied.
    pub fn permission_message(self) -> &'static str {
        match self {
            Self::Camera => "Camera permission is required to take a photo.",
            Self::MediaLibrary => "Gallery permission is required to pick a photo.",
        }
    }
}

impl Display for MediaCapability {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a capability id sent by the host.
pub fn parse_media_capability(value: &str) -> Result<MediaCapability, MediaCapabilityError> {
    match value.trim() {
        "" => Err(MediaCapabilityError::Empty),
        MEDIA_CAPABILITY_CAMERA => Ok(MediaCapability::Camera),
        MEDIA_CAPABILITY_MEDIA_LIBRARY => Ok(MediaCapability::MediaLibrary),
        other => Err(MediaCapabilityError::Unsupported(other.to_string())),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaCapabilityError {
    Empty,
    Unsupported(String),
}

impl Display for MediaCapabilityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "media capability value must not be empty"),
            Self::Unsupported(value) => write!(f, "media capability is unsupported: {value}"),
        }
    }
}

impl Error for MediaCapabilityError {}

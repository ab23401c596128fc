use std::fmt;

use crate::infra::camera::DeviceError;

pub const VALIDATION_MESSAGE: &str = "must supply text or image";
/// Size-limit message for the default 5 MiB limit.
pub const SIZE_LIMIT_MESSAGE: &str = "image must be 5 MiB or smaller";
pub const SUBMISSION_MESSAGE: &str = "failed to submit post";
pub const CAPTURE_FAILED_MESSAGE: &str = "failed to capture photo";
pub const NO_CAPTURE_SESSION_MESSAGE: &str = "camera is not active";

pub const CAMERA_DENIED_MESSAGE: &str = "camera access denied";
pub const CAMERA_NOT_FOUND_MESSAGE: &str = "camera not found";
pub const CAMERA_BUSY_MESSAGE: &str = "camera in use by another process";
pub const CAMERA_FAILED_MESSAGE: &str = "camera failed to start";

/// Platform error name → user message. Unlisted names map to [`CAMERA_FAILED_MESSAGE`].
pub const DEVICE_ERROR_MESSAGES: &[(&str, &str)] = &[
    ("NotAllowedError", CAMERA_DENIED_MESSAGE),
    ("PermissionDeniedError", CAMERA_DENIED_MESSAGE),
    ("SecurityError", CAMERA_DENIED_MESSAGE),
    ("NotFoundError", CAMERA_NOT_FOUND_MESSAGE),
    ("DevicesNotFoundError", CAMERA_NOT_FOUND_MESSAGE),
    ("OverconstrainedError", CAMERA_NOT_FOUND_MESSAGE),
    ("NotReadableError", CAMERA_BUSY_MESSAGE),
    ("TrackStartError", CAMERA_BUSY_MESSAGE),
];

pub fn device_error_message(name: &str) -> &'static str {
    DEVICE_ERROR_MESSAGES
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, message)| *message)
        .unwrap_or(CAMERA_FAILED_MESSAGE)
}

fn format_limit(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * KIB;
    match bytes {
        0 => "0 bytes".to_string(),
        b if b % MIB == 0 => format!("{} MiB", b / MIB),
        b if b % KIB == 0 => format!("{} KiB", b / KIB),
        b => format!("{} bytes", b),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    SizeLimit,
    DeviceAccess,
    Encoding,
    Submission,
}

/// A user-facing composer failure. `message` is safe to show as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposerError {
    kind: ErrorKind,
    message: String,
}

impl ComposerError {
    pub fn validation() -> Self {
        Self {
            kind: ErrorKind::Validation,
            message: VALIDATION_MESSAGE.to_string(),
        }
    }

    pub fn size_limit(max_bytes: u64) -> Self {
        Self {
            kind: ErrorKind::SizeLimit,
            message: format!("image must be {} or smaller", format_limit(max_bytes)),
        }
    }

    pub fn device_access(err: &DeviceError) -> Self {
        Self {
            kind: ErrorKind::DeviceAccess,
            message: device_error_message(&err.name).to_string(),
        }
    }

    pub fn no_capture_session() -> Self {
        Self {
            kind: ErrorKind::DeviceAccess,
            message: NO_CAPTURE_SESSION_MESSAGE.to_string(),
        }
    }

    pub fn capture() -> Self {
        Self {
            kind: ErrorKind::Encoding,
            message: CAPTURE_FAILED_MESSAGE.to_string(),
        }
    }

    pub fn encoding() -> Self {
        Self {
            kind: ErrorKind::Encoding,
            message: SUBMISSION_MESSAGE.to_string(),
        }
    }

    pub fn submission() -> Self {
        Self {
            kind: ErrorKind::Submission,
            message: SUBMISSION_MESSAGE.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ComposerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ComposerError {}

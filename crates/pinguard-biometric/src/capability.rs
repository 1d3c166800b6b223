//! Biometric capability query

use crate::error::AvailabilityError;

/// Answer of the platform capability check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityStatus {
    /// Hardware present, biometrics enrolled, ready to authenticate
    Success,
    /// No biometric hardware
    NoHardware,
    /// Hardware present but currently unavailable
    HardwareUnavailable,
    /// No biometrics enrolled
    NoneEnrolled,
    /// A security update is required first
    SecurityUpdateRequired,
    /// Not supported on this OS version
    Unsupported,
}

impl CapabilityStatus {
    /// Whether authentication can start
    pub fn is_available(self) -> bool {
        self == CapabilityStatus::Success
    }
}

/// Platform service answering "can the user authenticate biometrically now?"
pub trait BiometricCapability {
    /// Query the capability
    ///
    /// Returns an [`AvailabilityError`] when the check itself is refused,
    /// for example because the permission is missing.
    fn can_authenticate(&self) -> Result<CapabilityStatus, AvailabilityError>;
}

/// Capability with a fixed answer
#[derive(Debug, Clone)]
pub struct StaticCapability {
    answer: Result<CapabilityStatus, AvailabilityError>,
}

impl StaticCapability {
    /// Always available
    pub fn available() -> Self {
        Self::status(CapabilityStatus::Success)
    }

    /// Always reports `status`
    pub fn status(status: CapabilityStatus) -> Self {
        Self { answer: Ok(status) }
    }

    /// Always refuses the check with a security error
    pub fn denied(reason: impl Into<String>) -> Self {
        Self {
            answer: Err(AvailabilityError::Security(reason.into())),
        }
    }
}

impl BiometricCapability for StaticCapability {
    fn can_authenticate(&self) -> Result<CapabilityStatus, AvailabilityError> {
        self.answer.clone()
    }
}

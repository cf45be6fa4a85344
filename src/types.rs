use serde::{Deserialize, Serialize};

/// Scan profile selected by the user. Each variant maps to a fixed nmap
/// argument set; unknown tokens fall back to `Default` (no extra arguments)
/// rather than being rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanProfile {
    /// Host liveness only (`-sn`), no port enumeration.
    Discovery,
    /// TCP ports with service/version detection (`-sV`).
    ServiceDetection,
    /// Host liveness plus OS guess (`-O`).
    OsFingerprint,
    /// Fallback: let nmap run with its own defaults.
    Default,
}

impl ScanProfile {
    /// Map the request token ("basic", "service", "os") to a profile.
    pub fn from_token(token: &str) -> Self {
        match token {
            "basic" => Self::Discovery,
            "service" => Self::ServiceDetection,
            "os" => Self::OsFingerprint,
            _ => Self::Default,
        }
    }

    /// The nmap arguments this profile adds before the output flag and target.
    pub fn args(self) -> &'static [&'static str] {
        match self {
            Self::Discovery => &["-sn"],
            Self::ServiceDetection => &["-sV"],
            Self::OsFingerprint => &["-O"],
            Self::Default => &[],
        }
    }
}

/// Transport protocol of a scanned port.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    Tcp,
    Udp,
}

/// One port entry as reported by the scan engine.
///
/// `state` is a free-form token ("open", "closed", "filtered", ...) because
/// nmap's vocabulary is open-ended. The optional fields are present only when
/// the engine reported them; `None` means "unknown", never empty string.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PortRecord {
    pub port: u16,
    pub protocol: Transport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// One host entry. `ip` can be absent when the engine emitted a host element
/// without a usable address; such hosts are still reported as long as their
/// status parsed. Ports keep discovery order, TCP before UDP.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct HostRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    pub status: String,
    pub ports: Vec<PortRecord>,
}

/// Canonical scan result. Zero hosts is a valid outcome (target unreachable
/// or filtered) and distinct from a parse failure.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    pub hosts: Vec<HostRecord>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    Success,
    Error,
}

/// The outward-facing response shape: every scan request, successful or not,
/// is answered with one of these. `status == Error` implies empty `data`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ScanEnvelope {
    pub status: ScanStatus,
    pub message: String,
    pub data: ScanResult,
}

impl ScanEnvelope {
    pub fn success(message: impl Into<String>, data: ScanResult) -> Self {
        Self {
            status: ScanStatus::Success,
            message: message.into(),
            data,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ScanStatus::Error,
            message: message.into(),
            data: ScanResult::default(),
        }
    }
}

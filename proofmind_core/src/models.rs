use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Certificate categories understood by the contract.
///
/// Categories read back from chain that are not in the fixed set are kept
/// verbatim in `Other` so nothing decoded is lost.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CertificateCategory {
    #[default]
    General,
    Education,
    Professional,
    Event,
    Timestamp,
    Achievement,
    Verification,
    Other(String),
}

impl CertificateCategory {
    pub const ALL: [CertificateCategory; 7] = [
        CertificateCategory::General,
        CertificateCategory::Education,
        CertificateCategory::Professional,
        CertificateCategory::Event,
        CertificateCategory::Timestamp,
        CertificateCategory::Achievement,
        CertificateCategory::Verification,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            CertificateCategory::General => "GENERAL",
            CertificateCategory::Education => "EDUCATION",
            CertificateCategory::Professional => "PROFESSIONAL",
            CertificateCategory::Event => "EVENT",
            CertificateCategory::Timestamp => "TIMESTAMP",
            CertificateCategory::Achievement => "ACHIEVEMENT",
            CertificateCategory::Verification => "VERIFICATION",
            CertificateCategory::Other(s) => s.as_str(),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, CertificateCategory::Other(_))
    }
}

impl From<String> for CertificateCategory {
    fn from(s: String) -> Self {
        match s.as_str() {
            "GENERAL" => CertificateCategory::General,
            "EDUCATION" => CertificateCategory::Education,
            "PROFESSIONAL" => CertificateCategory::Professional,
            "EVENT" => CertificateCategory::Event,
            "TIMESTAMP" => CertificateCategory::Timestamp,
            "ACHIEVEMENT" => CertificateCategory::Achievement,
            "VERIFICATION" => CertificateCategory::Verification,
            _ => CertificateCategory::Other(s),
        }
    }
}

impl From<CertificateCategory> for String {
    fn from(c: CertificateCategory) -> Self {
        match c {
            CertificateCategory::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for CertificateCategory {
    type Err = String;

    /// Strict parse: only the fixed set is accepted (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match CertificateCategory::from(s.trim().to_uppercase()) {
            CertificateCategory::Other(other) => Err(format!("Unknown category: {}", other)),
            known => Ok(known),
        }
    }
}

impl fmt::Display for CertificateCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trust state of a certificate as tracked by the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VerificationStatus {
    #[default]
    Pending,
    Verified,
    Rejected,
    Flagged,
}

impl VerificationStatus {
    /// Lenient name lookup. Anything unrecognised degrades to `Pending`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Verified" => VerificationStatus::Verified,
            "Rejected" => VerificationStatus::Rejected,
            "Flagged" => VerificationStatus::Flagged,
            _ => VerificationStatus::Pending,
        }
    }

    /// Enum discriminant as laid out by the contract's binary encoding.
    pub fn from_discriminant(d: u8) -> Option<Self> {
        match d {
            0 => Some(VerificationStatus::Pending),
            1 => Some(VerificationStatus::Verified),
            2 => Some(VerificationStatus::Rejected),
            3 => Some(VerificationStatus::Flagged),
            _ => None,
        }
    }

    pub fn discriminant(&self) -> u8 {
        match self {
            VerificationStatus::Pending => 0,
            VerificationStatus::Verified => 1,
            VerificationStatus::Rejected => 2,
            VerificationStatus::Flagged => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Pending => "Pending",
            VerificationStatus::Verified => "Verified",
            VerificationStatus::Rejected => "Rejected",
            VerificationStatus::Flagged => "Flagged",
        }
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One proof stored on-chain, keyed by `proof_id` within its owner's address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    pub proof_id: String,
    pub proof_text: String,
    pub category: CertificateCategory,
    pub metadata: String,
    pub ai_tags: Vec<String>,
    /// Block timestamp (seconds) assigned by the contract.
    pub timestamp: u64,
    pub confidence_score: u32,
    pub verification_status: VerificationStatus,
    pub created_by: String,
}

impl Certificate {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(i64::try_from(self.timestamp).ok()?, 0).single()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CreateCertificateRequest {
    pub proof_text: String,
    pub proof_id: String,
    #[serde(default)]
    pub category: Option<CertificateCategory>,
    #[serde(default)]
    pub metadata: Option<String>,
    #[serde(default)]
    pub ai_tags: Option<Vec<String>>,
}

/// Partial update addressed by `proof_id`. `None` means "leave unchanged".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UpdateCertificateRequest {
    pub proof_id: String,
    #[serde(default)]
    pub new_proof_text: Option<String>,
    #[serde(default)]
    pub new_category: Option<CertificateCategory>,
    #[serde(default)]
    pub new_metadata: Option<String>,
    #[serde(default)]
    pub new_ai_tags: Option<Vec<String>>,
}

/// Wallet connection backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderKind {
    #[serde(rename = "web")]
    Web,
    #[serde(rename = "extension")]
    Extension,
    #[serde(rename = "remote-pair", alias = "walletconnect")]
    RemotePair,
    #[serde(rename = "hardware")]
    Hardware,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Web => "web",
            ProviderKind::Extension => "extension",
            ProviderKind::RemotePair => "remote-pair",
            ProviderKind::Hardware => "hardware",
        }
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "web" => Ok(ProviderKind::Web),
            "extension" => Ok(ProviderKind::Extension),
            "remote-pair" | "walletconnect" => Ok(ProviderKind::RemotePair),
            "hardware" | "ledger" => Ok(ProviderKind::Hardware),
            other => Err(format!("Unsupported provider type: {}", other)),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connected wallet as persisted in the durable session record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletInfo {
    pub address: String,
    /// Integer string in base units (10^-18 EGLD).
    pub balance: String,
    pub is_connected: bool,
    pub provider: ProviderKind,
}

/// Account state as reported by the network provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub address: String,
    #[serde(default)]
    pub nonce: u64,
    #[serde(default = "zero_balance")]
    pub balance: String,
}

fn zero_balance() -> String {
    "0".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Success,
    Fail,
    Invalid,
    Unknown(String),
}

impl TransactionStatus {
    pub fn from_name(name: &str) -> Self {
        match name {
            "pending" | "received" | "partially-executed" => TransactionStatus::Pending,
            "success" | "executed" => TransactionStatus::Success,
            "fail" | "failed" => TransactionStatus::Fail,
            "invalid" => TransactionStatus::Invalid,
            other => TransactionStatus::Unknown(other.to_string()),
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(
            self,
            TransactionStatus::Success | TransactionStatus::Fail | TransactionStatus::Invalid
        )
    }
}

/// Aggregate view over one owner's certificates.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_certificates: usize,
    pub verified_certificates: usize,
    pub pending_certificates: usize,
    pub categories_count: usize,
    /// Latest certificate timestamp, `None` when there is no activity.
    pub last_activity: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub category: CertificateCategory,
    pub count: usize,
    pub percentage: u32,
}

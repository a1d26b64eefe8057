// Certificate store - the connected owner's certificates and the dashboard
// figures derived from them

use crate::gateway::ContractGateway;
use crate::models::{Certificate, CategoryStats, DashboardStats, VerificationStatus};
use log::debug;

#[derive(Debug, Default)]
pub struct CertificateStore {
    owner: Option<String>,
    certificates: Vec<Certificate>,
}

impl CertificateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reload the list for `address`. Read failures leave an empty list.
    pub async fn refresh(&mut self, gateway: &ContractGateway, address: &str) -> &[Certificate] {
        self.certificates = gateway.get_user_certificates(address).await;
        self.owner = Some(address.to_string());
        debug!("Loaded {} certificates for {}", self.certificates.len(), address);
        &self.certificates
    }

    pub fn clear(&mut self) {
        self.owner = None;
        self.certificates.clear();
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub fn certificates(&self) -> &[Certificate] {
        &self.certificates
    }

    pub fn find(&self, proof_id: &str) -> Option<&Certificate> {
        self.certificates.iter().find(|c| c.proof_id == proof_id)
    }

    pub fn stats(&self) -> DashboardStats {
        dashboard_stats(&self.certificates)
    }

    pub fn category_breakdown(&self) -> Vec<CategoryStats> {
        category_breakdown(&self.certificates)
    }
}

pub fn dashboard_stats(certificates: &[Certificate]) -> DashboardStats {
    let count_status =
        |status: VerificationStatus| certificates.iter().filter(|c| c.verification_status == status).count();
    DashboardStats {
        total_certificates: certificates.len(),
        verified_certificates: count_status(VerificationStatus::Verified),
        pending_certificates: count_status(VerificationStatus::Pending),
        categories_count: category_breakdown(certificates).len(),
        last_activity: certificates.iter().map(|c| c.timestamp).max(),
    }
}

/// Per-category counts in order of first appearance. Percentages are
/// rounded to the nearest integer.
pub fn category_breakdown(certificates: &[Certificate]) -> Vec<CategoryStats> {
    let mut breakdown: Vec<CategoryStats> = Vec::new();
    for cert in certificates {
        match breakdown.iter_mut().find(|s| s.category == cert.category) {
            Some(entry) => entry.count += 1,
            None => breakdown.push(CategoryStats {
                category: cert.category.clone(),
                count: 1,
                percentage: 0,
            }),
        }
    }
    let total = certificates.len();
    for entry in &mut breakdown {
        entry.percentage = ((entry.count * 200 + total) / (2 * total)) as u32;
    }
    breakdown
}

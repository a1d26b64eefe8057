// Request validation - runs before anything touches the network

use crate::error::{CoreError, CoreResult};
use crate::models::{CertificateCategory, CreateCertificateRequest, UpdateCertificateRequest};

pub const PROOF_TEXT_MIN: usize = 10;
pub const PROOF_TEXT_MAX: usize = 1000;
pub const PROOF_ID_MIN: usize = 5;
pub const PROOF_ID_MAX: usize = 100;

pub fn validate_create(request: &CreateCertificateRequest) -> CoreResult<()> {
    validate_proof_text(&request.proof_text)?;
    validate_proof_id(&request.proof_id)?;
    if let Some(category) = &request.category {
        validate_category(category)?;
    }
    if let Some(metadata) = &request.metadata {
        validate_metadata(metadata)?;
    }
    Ok(())
}

pub fn validate_update(request: &UpdateCertificateRequest) -> CoreResult<()> {
    validate_proof_id(&request.proof_id)?;
    if let Some(text) = &request.new_proof_text {
        validate_proof_text(text)?;
    }
    if let Some(category) = &request.new_category {
        validate_category(category)?;
    }
    if let Some(metadata) = &request.new_metadata {
        validate_metadata(metadata)?;
    }
    check_update_order(request)
}

/// `updateProof` takes its optional fields positionally and treats every
/// argument it receives as a new value. Only trailing fields can be left
/// out, so a skipped field before a given one cannot be sent.
fn check_update_order(request: &UpdateCertificateRequest) -> CoreResult<()> {
    let fields = [
        ("new_proof_text", request.new_proof_text.is_some()),
        ("new_category", request.new_category.is_some()),
        ("new_metadata", request.new_metadata.is_some()),
        ("new_ai_tags", request.new_ai_tags.is_some()),
    ];
    let Some(last) = fields.iter().rposition(|(_, present)| *present) else {
        return Ok(());
    };
    match fields[..last].iter().find(|(_, present)| !*present) {
        Some((missing, _)) => Err(CoreError::Validation(format!(
            "{} must be given when {} is updated",
            missing, fields[last].0
        ))),
        None => Ok(()),
    }
}

pub fn validate_proof_text(text: &str) -> CoreResult<()> {
    check_length("proof_text", text, PROOF_TEXT_MIN, PROOF_TEXT_MAX)
}

pub fn validate_proof_id(id: &str) -> CoreResult<()> {
    check_length("proof_id", id, PROOF_ID_MIN, PROOF_ID_MAX)
}

/// Empty metadata is allowed (it is submitted as `{}`); anything else must
/// parse as JSON.
pub fn validate_metadata(metadata: &str) -> CoreResult<()> {
    if metadata.trim().is_empty() {
        return Ok(());
    }
    serde_json::from_str::<serde_json::Value>(metadata)
        .map(|_| ())
        .map_err(|e| CoreError::Validation(format!("metadata is not valid JSON: {}", e)))
}

pub fn validate_category(category: &CertificateCategory) -> CoreResult<()> {
    if category.is_known() {
        Ok(())
    } else {
        Err(CoreError::Validation(format!("Unknown category: {}", category)))
    }
}

/// Trim tags, drop empty ones and keep the first occurrence of each.
pub fn normalize_tags<S: AsRef<str>>(tags: &[S]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.as_ref().trim();
        if tag.is_empty() || out.iter().any(|t| t == tag) {
            continue;
        }
        out.push(tag.to_string());
    }
    out
}

fn check_length(field: &str, value: &str, min: usize, max: usize) -> CoreResult<()> {
    let len = value.chars().count();
    if len < min {
        return Err(CoreError::Validation(format!(
            "{} must be at least {} characters (got {})",
            field, min, len
        )));
    }
    if len > max {
        return Err(CoreError::Validation(format!(
            "{} must be at most {} characters (got {})",
            field, max, len
        )));
    }
    Ok(())
}

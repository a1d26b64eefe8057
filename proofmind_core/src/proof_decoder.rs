// Certificate decoding - platform agnostic
// Turns raw `getProof` / `getUserProofs` return data into certificates

use crate::address::encode_bech32;
use crate::codec::{put_nested_buffer, NestedReader};
use crate::models::{Certificate, CertificateCategory, VerificationStatus};
use log::debug;
use serde_json::{Map, Value};

/// Untyped view of one on-chain certificate. Fields the response did not
/// carry are simply absent.
pub type FieldBag = Map<String, Value>;

/// Read one nested-encoded certificate struct into a field bag.
///
/// Layout follows the contract's struct order: proof_text, timestamp,
/// proof_id, category, metadata, ai_tags, confidence_score,
/// verification_status, created_by. Reading stops at the first field the
/// remaining bytes cannot satisfy.
pub fn read_certificate_fields(reader: &mut NestedReader<'_>) -> FieldBag {
    let mut bag = FieldBag::new();

    macro_rules! field {
        ($name:expr, $value:expr) => {
            match $value {
                Some(v) => {
                    bag.insert($name.to_string(), v);
                }
                None => return bag,
            }
        };
    }

    field!("proof_text", reader.read_buffer().map(lossy_string));
    field!("timestamp", reader.read_u64().map(Value::from));
    field!("proof_id", reader.read_buffer().map(lossy_string));
    field!("category", reader.read_buffer().map(lossy_string));
    field!("metadata", reader.read_buffer().map(lossy_string));

    match reader.read_buffer_vec() {
        Some((tags, complete)) => {
            let tags: Vec<Value> = tags.into_iter().map(lossy_string).collect();
            bag.insert("ai_tags".to_string(), Value::Array(tags));
            if !complete {
                return bag;
            }
        }
        None => return bag,
    }

    field!("confidence_score", reader.read_u32().map(Value::from));
    field!(
        "verification_status",
        reader.read_u8().map(|d| {
            let name = VerificationStatus::from_discriminant(d)
                .map(|s| s.as_str().to_string())
                .unwrap_or_else(|| "Unknown".to_string());
            Value::String(name)
        })
    );
    field!(
        "created_by",
        reader
            .read_array::<32>()
            .map(|key| Value::String(encode_bech32(&key).unwrap_or_else(|_| hex::encode(key))))
    );

    bag
}

fn lossy_string(bytes: Vec<u8>) -> Value {
    Value::String(String::from_utf8_lossy(&bytes).into_owned())
}

fn field_string(bag: &FieldBag, key: &str) -> Option<String> {
    match bag.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn field_u64(bag: &FieldBag, key: &str) -> u64 {
    match bag.get(key) {
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

/// Total mapping from a field bag to a certificate. Never fails: absent or
/// malformed fields take their defaults (empty string, `"{}"` metadata,
/// zero, no tags, `Pending`).
pub fn certificate_from_fields(bag: &FieldBag) -> Certificate {
    let ai_tags = match bag.get("ai_tags") {
        Some(Value::Array(items)) => items
            .iter()
            .map(|t| match t {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        _ => Vec::new(),
    };

    let verification_status = field_string(bag, "verification_status")
        .map(|s| VerificationStatus::from_name(&s))
        .unwrap_or_default();

    Certificate {
        proof_id: field_string(bag, "proof_id").unwrap_or_default(),
        proof_text: field_string(bag, "proof_text").unwrap_or_default(),
        category: CertificateCategory::from(field_string(bag, "category").unwrap_or_default()),
        metadata: field_string(bag, "metadata")
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| "{}".to_string()),
        ai_tags,
        timestamp: field_u64(bag, "timestamp"),
        confidence_score: u32::try_from(field_u64(bag, "confidence_score")).unwrap_or(u32::MAX),
        verification_status,
        created_by: field_string(bag, "created_by").unwrap_or_default(),
    }
}

/// Decode a single top-encoded certificate. Empty input or a record with
/// neither id nor text is "not found".
pub fn decode_certificate(bytes: &[u8]) -> Option<Certificate> {
    if bytes.is_empty() {
        return None;
    }
    let mut reader = NestedReader::new(bytes);
    let cert = certificate_from_fields(&read_certificate_fields(&mut reader));
    if cert.proof_id.is_empty() && cert.proof_text.is_empty() {
        debug!("getProof returned an empty record");
        return None;
    }
    Some(cert)
}

/// Decode a top-encoded list of certificates, preserving contract order.
pub fn decode_certificate_list(bytes: &[u8]) -> Vec<Certificate> {
    let mut reader = NestedReader::new(bytes);
    let mut certificates = Vec::new();
    while !reader.is_empty() {
        let start = reader.position();
        let bag = read_certificate_fields(&mut reader);
        if bag.is_empty() || reader.position() == start {
            debug!("Stopping certificate list decode at byte {}", start);
            break;
        }
        certificates.push(certificate_from_fields(&bag));
    }
    certificates
}

/// Nested encoding of a certificate, mirroring the contract's struct layout.
pub fn encode_certificate(cert: &Certificate, owner_pubkey: &[u8; 32]) -> Vec<u8> {
    let mut out = Vec::new();
    put_nested_buffer(&mut out, cert.proof_text.as_bytes());
    out.extend_from_slice(&cert.timestamp.to_be_bytes());
    put_nested_buffer(&mut out, cert.proof_id.as_bytes());
    put_nested_buffer(&mut out, cert.category.as_str().as_bytes());
    put_nested_buffer(&mut out, cert.metadata.as_bytes());
    out.extend_from_slice(&(cert.ai_tags.len() as u32).to_be_bytes());
    for tag in &cert.ai_tags {
        put_nested_buffer(&mut out, tag.as_bytes());
    }
    out.extend_from_slice(&cert.confidence_score.to_be_bytes());
    out.push(cert.verification_status.discriminant());
    out.extend_from_slice(owner_pubkey);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample(owner: &[u8; 32]) -> Certificate {
        Certificate {
            proof_id: "CERT-2024-001".to_string(),
            proof_text: "Completed blockchain development course".to_string(),
            category: CertificateCategory::Education,
            metadata: r#"{"issuer":"academy"}"#.to_string(),
            ai_tags: vec!["education".to_string(), "skills".to_string()],
            timestamp: 1_700_000_000,
            confidence_score: 100,
            verification_status: VerificationStatus::Verified,
            created_by: encode_bech32(owner).unwrap(),
        }
    }

    #[test]
    fn test_decode_full_record() {
        let owner = [3u8; 32];
        let cert = sample(&owner);
        let decoded = decode_certificate(&encode_certificate(&cert, &owner)).unwrap();
        assert_eq!(decoded, cert);
    }

    #[test]
    fn test_missing_status_defaults_to_pending() {
        let bag = json!({
            "proof_id": "CERT-1",
            "proof_text": "some proof text",
        });
        let cert = certificate_from_fields(bag.as_object().unwrap());
        assert_eq!(cert.verification_status, VerificationStatus::Pending);
        assert_eq!(cert.metadata, "{}");
        assert_eq!(cert.timestamp, 0);
        assert!(cert.ai_tags.is_empty());
        assert_eq!(cert.created_by, "");
    }

    #[test]
    fn test_unknown_status_defaults_to_pending() {
        let bag = json!({ "verification_status": "Unknown" });
        let cert = certificate_from_fields(bag.as_object().unwrap());
        assert_eq!(cert.verification_status, VerificationStatus::Pending);

        let owner = [1u8; 32];
        let mut bytes = encode_certificate(&sample(&owner), &owner);
        let status_at = bytes.len() - 33;
        bytes[status_at] = 42;
        let decoded = decode_certificate(&bytes).unwrap();
        assert_eq!(decoded.verification_status, VerificationStatus::Pending);
    }

    #[test]
    fn test_truncated_record_keeps_leading_fields() {
        let owner = [1u8; 32];
        let bytes = encode_certificate(&sample(&owner), &owner);
        // cut inside the tag list
        let cut = 4 + 39 + 8 + 4 + 13 + 4 + 9 + 4 + 20 + 4 + 4 + 9 + 2;
        let decoded = decode_certificate(&bytes[..cut]).unwrap();
        assert_eq!(decoded.proof_id, "CERT-2024-001");
        assert_eq!(decoded.category, CertificateCategory::Education);
        assert_eq!(decoded.ai_tags, vec!["education".to_string()]);
        assert_eq!(decoded.confidence_score, 0);
        assert_eq!(decoded.verification_status, VerificationStatus::Pending);
    }

    #[test]
    fn test_list_preserves_order_and_empty_is_empty() {
        let owner = [9u8; 32];
        let mut first = sample(&owner);
        first.proof_id = "PROOF-B".to_string();
        let mut second = sample(&owner);
        second.proof_id = "PROOF-A".to_string();
        let mut bytes = encode_certificate(&first, &owner);
        bytes.extend(encode_certificate(&second, &owner));

        let list = decode_certificate_list(&bytes);
        let ids: Vec<_> = list.iter().map(|c| c.proof_id.as_str()).collect();
        assert_eq!(ids, vec!["PROOF-B", "PROOF-A"]);
        assert!(decode_certificate_list(&[]).is_empty());
        assert!(decode_certificate(&[]).is_none());
    }
}

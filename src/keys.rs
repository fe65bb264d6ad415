//! Length-prefixed key encoding for the membership store.
//!
//! Keys are encoded as `[len1][bytes1][len2][bytes2]`:
//! no delimiters and no escaping, so ids may contain `:` or `/`.
//! Each part is at most 255 bytes.

use crate::error::{AuthzError, Result};

/// Longest id a key part can hold.
pub const MAX_ID_LEN: usize = u8::MAX as usize;

/// Reject ids that cannot be stored as a key part.
pub fn validate_id(kind: &'static str, id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(AuthzError::InvalidId { kind, reason: "empty".into() });
    }
    if id.len() > MAX_ID_LEN {
        return Err(AuthzError::InvalidId {
            kind,
            reason: format!("longer than {MAX_ID_LEN} bytes"),
        });
    }
    Ok(())
}

/// Build a length-prefixed key from parts (each already validated)
#[inline]
pub fn build_key(parts: &[&str]) -> Vec<u8> {
    let total_len: usize = parts.iter().map(|p| 1 + p.len()).sum();
    let mut key = Vec::with_capacity(total_len);
    for part in parts {
        key.push(part.len() as u8);
        key.extend_from_slice(part.as_bytes());
    }
    key
}

/// Get the Nth part from a key without allocating
#[inline]
pub fn get_part(bytes: &[u8], n: usize) -> Option<&str> {
    let mut i = 0;
    let mut count = 0;
    while i < bytes.len() {
        let len = bytes[i] as usize;
        if i + 1 + len > bytes.len() {
            return None;
        }
        if count == n {
            return std::str::from_utf8(&bytes[i + 1..i + 1 + len]).ok();
        }
        i += 1 + len;
        count += 1;
    }
    None
}

/// `organization/user` key of a membership record
#[inline]
pub fn member_key(organization_id: &str, user_id: &str) -> Vec<u8> {
    build_key(&[organization_id, user_id])
}

/// `user/organization` key of the reverse index
#[inline]
pub fn user_org_key(user_id: &str, organization_id: &str) -> Vec<u8> {
    build_key(&[user_id, organization_id])
}

/// `organization/email` key of the pending-invitation index
#[inline]
pub fn invite_key(organization_id: &str, email: &str) -> Vec<u8> {
    build_key(&[organization_id, email])
}

/// Prefix matching every key whose first part is `first`
#[inline]
pub fn prefix(first: &str) -> Vec<u8> {
    build_key(&[first])
}

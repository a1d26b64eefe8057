// MultiversX argument and return-data encoding
//
// Contract call data is `function@hex(arg)@hex(arg)...`. Return data from
// view functions arrives as base64 strings holding top-encoded values; nested
// values inside them use big-endian u32 length prefixes.

use crate::error::CoreError;
use base64::{engine::general_purpose::STANDARD as Base64Engine, Engine as _};

pub const EGLD_DECIMALS: u32 = 18;

/// Build the `data` field of a contract call transaction.
pub fn encode_call_data(function: &str, args: &[Vec<u8>]) -> String {
    let mut data = function.to_string();
    for arg in args {
        data.push('@');
        data.push_str(&hex::encode(arg));
    }
    data
}

/// Split call data back into function name and raw arguments.
pub fn decode_call_data(data: &str) -> Result<(String, Vec<Vec<u8>>), CoreError> {
    let mut parts = data.split('@');
    let function = parts
        .next()
        .filter(|f| !f.is_empty())
        .ok_or_else(|| CoreError::ParseError("Call data has no function name".to_string()))?
        .to_string();
    let args = parts
        .map(|p| hex::decode(p).map_err(|e| CoreError::ParseError(format!("Invalid hex argument: {}", e))))
        .collect::<Result<Vec<_>, _>>()?;
    Ok((function, args))
}

/// Append a nested-encoded buffer (u32 BE length followed by the bytes).
pub fn put_nested_buffer(out: &mut Vec<u8>, bytes: &[u8]) {
    out.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
    out.extend_from_slice(bytes);
}

/// Top-encode a list of buffers: items nested-encoded back to back, no count.
pub fn top_encode_buffer_list<S: AsRef<[u8]>>(items: &[S]) -> Vec<u8> {
    let mut out = Vec::new();
    for item in items {
        put_nested_buffer(&mut out, item.as_ref());
    }
    out
}

/// Inverse of [`top_encode_buffer_list`].
pub fn top_decode_buffer_list(bytes: &[u8]) -> Result<Vec<Vec<u8>>, CoreError> {
    let mut reader = NestedReader::new(bytes);
    let mut items = Vec::new();
    while !reader.is_empty() {
        let item = reader
            .read_buffer()
            .ok_or_else(|| CoreError::ParseError("Truncated buffer list".to_string()))?;
        items.push(item);
    }
    Ok(items)
}

/// Minimal big-endian encoding; zero encodes as no bytes.
pub fn top_encode_u64(value: u64) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let first = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    bytes[first..].to_vec()
}

pub fn top_decode_u64(bytes: &[u8]) -> Result<u64, CoreError> {
    if bytes.len() > 8 {
        return Err(CoreError::ParseError(format!(
            "Integer too large: {} bytes",
            bytes.len()
        )));
    }
    Ok(bytes.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64))
}

pub fn decode_base64(data: &str) -> Result<Vec<u8>, CoreError> {
    Base64Engine
        .decode(data)
        .map_err(|e| CoreError::ParseError(format!("Failed to decode base64: {}", e)))
}

pub fn encode_base64(data: &[u8]) -> String {
    Base64Engine.encode(data)
}

/// Cursor over nested-encoded bytes. Every read returns `None` once the
/// input runs short, leaving the cursor where it was.
pub struct NestedReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> NestedReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        let end = self.pos.checked_add(n)?;
        let slice = self.data.get(self.pos..end)?;
        self.pos = end;
        Some(slice)
    }

    pub fn read_u8(&mut self) -> Option<u8> {
        self.take(1).map(|b| b[0])
    }

    pub fn read_u32(&mut self) -> Option<u32> {
        let bytes: [u8; 4] = self.take(4)?.try_into().ok()?;
        Some(u32::from_be_bytes(bytes))
    }

    pub fn read_u64(&mut self) -> Option<u64> {
        let bytes: [u8; 8] = self.take(8)?.try_into().ok()?;
        Some(u64::from_be_bytes(bytes))
    }

    pub fn read_buffer(&mut self) -> Option<Vec<u8>> {
        let start = self.pos;
        let len = self.read_u32()? as usize;
        match self.take(len) {
            Some(bytes) => Some(bytes.to_vec()),
            None => {
                self.pos = start;
                None
            }
        }
    }

    /// Length-prefixed list of nested buffers. Returns the items read before
    /// the input ran short, with `complete` false in that case.
    pub fn read_buffer_vec(&mut self) -> Option<(Vec<Vec<u8>>, bool)> {
        let count = self.read_u32()? as usize;
        let mut items = Vec::with_capacity(count.min(64));
        for _ in 0..count {
            match self.read_buffer() {
                Some(item) => items.push(item),
                None => return Some((items, false)),
            }
        }
        Some((items, true))
    }

    pub fn read_array<const N: usize>(&mut self) -> Option<[u8; N]> {
        self.take(N)?.try_into().ok()
    }
}

/// Render a base-unit integer string with `decimals` implied decimals,
/// truncated to `precision` fractional digits.
pub fn format_amount(base_units: &str, decimals: u32, precision: u32) -> Result<String, CoreError> {
    let digits = base_units.trim();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CoreError::ParseError(format!("Invalid amount: {}", base_units)));
    }
    let decimals = decimals as usize;
    let padded = format!("{:0>width$}", digits, width = decimals + 1);
    let (int_part, frac_part) = padded.split_at(padded.len() - decimals);
    let int_part = int_part.trim_start_matches('0');
    let int_part = if int_part.is_empty() { "0" } else { int_part };
    if precision == 0 {
        return Ok(int_part.to_string());
    }
    let mut frac: String = frac_part.chars().take(precision as usize).collect();
    while frac.len() < precision as usize {
        frac.push('0');
    }
    Ok(format!("{}.{}", int_part, frac))
}

/// EGLD balance with four fractional digits, as shown next to the wallet.
pub fn format_egld(base_units: &str) -> Result<String, CoreError> {
    format_amount(base_units, EGLD_DECIMALS, 4)
}

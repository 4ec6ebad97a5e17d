//! ILP payment packet codec.
//!
//! Packets use the Interledger payment format (type `1`) in canonical OER:
//!
//! ```text
//! type (u8 = 1)
//! envelope length (OER length prefix)
//!   amount  UInt64, big-endian
//!   account var-octet-string, ASCII ILP address
//!   data    var-octet-string
//!   extensibility (u8 = 0)
//! ```
//!
//! Length prefixes are a single octet below 128, otherwise `0x80 | n`
//! followed by `n` big-endian length octets.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{DecodeError, IlpError};

/// Type octet of an ILP payment packet.
pub const TYPE_ILP_PAYMENT: u8 = 1;

/// Largest `data` payload accepted in a packet.
pub const MAX_DATA_SIZE: usize = 32_767;

/// Longest ILP address accepted in a packet.
pub const MAX_ADDRESS_LENGTH: usize = 1023;

/// Most decimal digits a UInt64 amount can have.
pub const MAX_AMOUNT_DIGITS: usize = 20;

static ADDRESS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(g|private|example|peer|self|test[1-3]?|local)([.][a-zA-Z0-9_~-]+)+$")
        .expect("ILP address pattern is valid")
});

/// A decoded ILP payment packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IlpPacket {
    /// Amount in the currency's minor unit, as a base-10 integer string.
    pub amount: String,
    /// Destination ILP address.
    pub account: String,
    /// Opaque end-to-end payload.
    pub data: Vec<u8>,
}

impl IlpPacket {
    /// Serializes this packet.
    ///
    /// # Errors
    ///
    /// See [`encode`].
    pub fn to_bytes(&self) -> Result<Vec<u8>, IlpError> {
        encode(&self.amount, &self.account, &self.data)
    }

    /// Parses a packet from its binary form.
    ///
    /// # Errors
    ///
    /// See [`decode`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        decode(bytes)
    }
}

/// Checks that `account` is a syntactically valid ILP address.
///
/// # Errors
///
/// Returns [`IlpError::InvalidAddress`] otherwise.
pub fn validate_address(account: &str) -> Result<(), IlpError> {
    if account.len() > MAX_ADDRESS_LENGTH {
        return Err(IlpError::InvalidAddress(format!(
            "address is {} bytes, maximum is {MAX_ADDRESS_LENGTH}",
            account.len()
        )));
    }
    if !ADDRESS_PATTERN.is_match(account) {
        return Err(IlpError::InvalidAddress(account.to_owned()));
    }
    Ok(())
}

/// Parses an ILP amount string into its integer value.
///
/// # Errors
///
/// Returns [`IlpError::InvalidAmount`] unless `amount` is a non-empty string
/// of at most [`MAX_AMOUNT_DIGITS`] ASCII digits that fits in a `u64`. Leading
/// zeros are rejected since decoding could not reproduce them.
pub fn parse_amount(amount: &str) -> Result<u64, IlpError> {
    if amount.is_empty()
        || amount.len() > MAX_AMOUNT_DIGITS
        || !amount.bytes().all(|b| b.is_ascii_digit())
        || (amount.len() > 1 && amount.starts_with('0'))
    {
        return Err(IlpError::InvalidAmount(amount.to_owned()));
    }
    amount
        .parse::<u64>()
        .map_err(|_| IlpError::InvalidAmount(amount.to_owned()))
}

/// Encodes an ILP payment packet.
///
/// All fields are validated before anything is written, so no partial
/// packet is ever produced.
///
/// # Errors
///
/// - [`IlpError::InvalidAddress`] if `account` is not an ILP address
/// - [`IlpError::InvalidAmount`] if `amount` is not a UInt64 integer string
/// - [`IlpError::PayloadTooLarge`] if `data` exceeds [`MAX_DATA_SIZE`]
pub fn encode(amount: &str, account: &str, data: &[u8]) -> Result<Vec<u8>, IlpError> {
    validate_address(account)?;
    let amount = parse_amount(amount)?;
    if data.len() > MAX_DATA_SIZE {
        return Err(IlpError::PayloadTooLarge {
            size: data.len(),
            max: MAX_DATA_SIZE,
        });
    }

    let mut contents = Vec::with_capacity(8 + account.len() + data.len() + 8);
    contents.extend_from_slice(&amount.to_be_bytes());
    write_var_octets(&mut contents, account.as_bytes());
    write_var_octets(&mut contents, data);
    contents.push(0);

    let mut packet = Vec::with_capacity(contents.len() + 4);
    packet.push(TYPE_ILP_PAYMENT);
    write_var_octets(&mut packet, &contents);
    Ok(packet)
}

/// Decodes an ILP payment packet.
///
/// # Errors
///
/// Returns a [`DecodeError`] for truncated input, an unknown type octet, a
/// non-minimal length prefix, an envelope whose length disagrees with the
/// buffer, an account that is not an ILP address, or trailing bytes.
pub fn decode(bytes: &[u8]) -> Result<IlpPacket, DecodeError> {
    let mut reader = Reader::new(bytes);
    let packet_type = reader.read_u8("packet type")?;
    if packet_type != TYPE_ILP_PAYMENT {
        return Err(DecodeError::UnknownType(packet_type));
    }
    let declared = reader.read_length("envelope length")?;
    if declared != reader.remaining() {
        return Err(DecodeError::LengthMismatch {
            declared,
            actual: reader.remaining(),
        });
    }

    let amount = reader.read_u64("amount")?;
    let account = reader.read_var_octets("account")?;
    if !account.is_ascii() {
        return Err(DecodeError::NonAsciiAccount);
    }
    let account = String::from_utf8_lossy(account).into_owned();
    if validate_address(&account).is_err() {
        return Err(DecodeError::InvalidAccount(account));
    }
    let data = reader.read_var_octets("data")?;
    reader.read_u8("extensibility")?;
    if reader.remaining() > 0 {
        return Err(DecodeError::TrailingBytes(reader.remaining()));
    }

    Ok(IlpPacket {
        amount: amount.to_string(),
        account,
        data: data.to_vec(),
    })
}

fn write_length(buf: &mut Vec<u8>, len: usize) {
    if len < 0x80 {
        #[allow(clippy::cast_possible_truncation)]
        buf.push(len as u8);
        return;
    }
    let be = len.to_be_bytes();
    let skip = be.iter().take_while(|b| **b == 0).count();
    let significant = &be[skip..];
    #[allow(clippy::cast_possible_truncation)]
    buf.push(0x80 | significant.len() as u8);
    buf.extend_from_slice(significant);
}

fn write_var_octets(buf: &mut Vec<u8>, bytes: &[u8]) {
    write_length(buf, bytes.len());
    buf.extend_from_slice(bytes);
}

/// Cursor over a packet buffer.
struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    const fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    const fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn read_slice(&mut self, len: usize, what: &'static str) -> Result<&'a [u8], DecodeError> {
        if len > self.remaining() {
            return Err(DecodeError::UnexpectedEof(what));
        }
        let slice = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn read_u8(&mut self, what: &'static str) -> Result<u8, DecodeError> {
        Ok(self.read_slice(1, what)?[0])
    }

    fn read_u64(&mut self, what: &'static str) -> Result<u64, DecodeError> {
        let mut be = [0u8; 8];
        be.copy_from_slice(self.read_slice(8, what)?);
        Ok(u64::from_be_bytes(be))
    }

    fn read_length(&mut self, what: &'static str) -> Result<usize, DecodeError> {
        let first = self.read_u8(what)?;
        if first & 0x80 == 0 {
            return Ok(usize::from(first));
        }
        let octets = usize::from(first & 0x7f);
        if octets == 0 {
            return Err(DecodeError::InvalidLength(format!(
                "{what} uses indefinite form"
            )));
        }
        if octets > std::mem::size_of::<usize>() {
            return Err(DecodeError::InvalidLength(format!(
                "{what} has {octets} length octets"
            )));
        }
        let octets = self.read_slice(octets, what)?;
        if octets[0] == 0 {
            return Err(DecodeError::InvalidLength(format!(
                "{what} has a leading zero length octet"
            )));
        }
        let len = octets
            .iter()
            .fold(0usize, |acc, b| (acc << 8) | usize::from(*b));
        if len < 0x80 {
            return Err(DecodeError::InvalidLength(format!(
                "{what} of {len} must use the short form"
            )));
        }
        Ok(len)
    }

    fn read_var_octets(&mut self, what: &'static str) -> Result<&'a [u8], DecodeError> {
        let len = self.read_length(what)?;
        self.read_slice(len, what)
    }
}

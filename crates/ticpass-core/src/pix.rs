//! # PIX BR Code Generation
//!
//! Builds the EMV Merchant-Presented-Mode payload ("BR Code") that the
//! merchant PIX flow renders as a QR code. The payload is a flat sequence of
//! `ID(2) + LEN(2) + VALUE` fields, closed by a CRC-16/CCITT-FALSE checksum
//! over everything up to and including the CRC field's own header.
//!
//! Field layout (per the Banco Central BR Code manual):
//! ```text
//! 00  payload format indicator        "01"
//! 26  merchant account information
//!     ├─ 00  GUI                      "br.gov.bcb.pix"
//!     └─ 01  PIX key
//! 52  merchant category code         "0000"
//! 53  transaction currency           "986" (BRL)
//! 54  transaction amount             "12.34" (optional)
//! 58  country code                   "BR"
//! 59  merchant name
//! 60  merchant city
//! 62  additional data
//!     └─ 05  txid                    "***" when unused
//! 63  CRC-16                         4 uppercase hex chars
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

const PIX_GUI: &str = "br.gov.bcb.pix";
const CURRENCY_BRL: &str = "986";
const COUNTRY_BR: &str = "BR";

// =============================================================================
// Errors
// =============================================================================

/// Reasons a BR Code cannot be assembled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PixError {
    /// The PIX key is empty.
    #[error("PIX key must not be empty")]
    EmptyKey,

    /// A field exceeds the 99-character EMV length limit.
    #[error("field {0} exceeds 99 characters")]
    FieldTooLong(&'static str),

    /// The amount is zero or negative.
    #[error("amount must be positive")]
    InvalidAmount,
}

// =============================================================================
// BR Code Builder
// =============================================================================

/// Inputs for one merchant-presented PIX charge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PixCharge {
    /// Merchant PIX key (EVP, CPF/CNPJ, phone or e-mail).
    pub key: String,
    /// Amount in cents of BRL.
    pub amount_cents: i64,
    /// Merchant display name (truncated to 25 chars by the builder).
    pub merchant_name: String,
    /// Merchant city (truncated to 15 chars by the builder).
    pub merchant_city: String,
    /// Transaction id shown on the payer's statement; `None` emits `***`.
    pub txid: Option<String>,
}

impl PixCharge {
    /// Renders the charge as a complete, CRC-terminated BR Code string.
    pub fn to_br_code(&self) -> Result<String, PixError> {
        if self.key.is_empty() {
            return Err(PixError::EmptyKey);
        }
        if self.amount_cents <= 0 {
            return Err(PixError::InvalidAmount);
        }

        let merchant_account = format!(
            "{}{}",
            emv_field("00", PIX_GUI)?,
            emv_field("01", &self.key)?
        );
        let name: String = self.merchant_name.chars().take(25).collect();
        let city: String = self.merchant_city.chars().take(15).collect();
        let txid = self.txid.as_deref().unwrap_or("***");
        let amount = format!(
            "{}.{:02}",
            self.amount_cents / 100,
            self.amount_cents % 100
        );

        let mut payload = String::new();
        payload.push_str(&emv_field("00", "01")?);
        payload.push_str(&emv_field("26", &merchant_account)?);
        payload.push_str(&emv_field("52", "0000")?);
        payload.push_str(&emv_field("53", CURRENCY_BRL)?);
        payload.push_str(&emv_field("54", &amount)?);
        payload.push_str(&emv_field("58", COUNTRY_BR)?);
        payload.push_str(&emv_field("59", &name)?);
        payload.push_str(&emv_field("60", &city)?);
        payload.push_str(&emv_field("62", &emv_field("05", txid)?)?);

        // CRC covers everything through its own "6304" header.
        payload.push_str("6304");
        let crc = crc16_ccitt(payload.as_bytes());
        payload.push_str(&format!("{crc:04X}"));
        Ok(payload)
    }
}

fn emv_field(id: &'static str, value: &str) -> Result<String, PixError> {
    let len = value.chars().count();
    if len > 99 {
        return Err(PixError::FieldTooLong(id));
    }
    Ok(format!("{id}{len:02}{value}"))
}

/// CRC-16/CCITT-FALSE: poly 0x1021, init 0xFFFF, no reflection, no xorout.
pub fn crc16_ccitt(data: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;
    for &byte in data {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            if crc & 0x8000 != 0 {
                crc = (crc << 1) ^ 0x1021;
            } else {
                crc <<= 1;
            }
        }
    }
    crc
}

// =============================================================================
// Unit Tests
// =============================================================================

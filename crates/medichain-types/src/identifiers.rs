//! Patient, hospital and contact identifiers.
//!
//! Each type is constructed through `parse`, which applies the same format rules the portal
//! forms enforce:
//! - Aadhar numbers are exactly 12 ASCII digits
//! - hospital addresses are `0x` followed by 40 hex digits (normalised to lower case)
//! - email addresses have one `@`, no whitespace and a dotted domain
//! - phone numbers are exactly 10 ASCII digits

use std::fmt;

/// Errors produced when an identifier fails validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentifierError {
    #[error("Please enter a valid 12-digit Aadhar number")]
    InvalidAadhar,
    #[error("invalid hospital address: expected 0x followed by 40 hex digits")]
    InvalidHospitalAddress,
    #[error("Please enter a valid email address")]
    InvalidEmail,
    #[error("Please enter a valid 10-digit phone number")]
    InvalidPhone,
}

const AADHAR_LEN: usize = 12;
const PHONE_LEN: usize = 10;
const ADDRESS_HEX_LEN: usize = 40;

fn all_digits(input: &str, len: usize) -> bool {
    input.len() == len && input.bytes().all(|b| b.is_ascii_digit())
}

macro_rules! string_newtype {
    ($name:ident) => {
        impl $name {
            /// Returns the validated value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::str::FromStr for $name {
            type Err = IdentifierError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(&self.0)
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                Self::parse(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

/// A 12-digit Aadhar number identifying a patient.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AadharNumber(String);

impl AadharNumber {
    /// Parses an Aadhar number. Surrounding whitespace is ignored; nothing else is.
    pub fn parse(input: &str) -> Result<Self, IdentifierError> {
        let trimmed = input.trim();
        if !all_digits(trimmed, AADHAR_LEN) {
            return Err(IdentifierError::InvalidAadhar);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

string_newtype!(AadharNumber);

/// The ledger address of a hospital, e.g. `0x5fbdb2315678afecb367f032d93f642f64180aa3`.
///
/// Addresses are stored lower-cased, so checksummed and plain spellings compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HospitalAddress(String);

impl HospitalAddress {
    /// Parses a `0x`-prefixed, 40 hex digit address.
    pub fn parse(input: &str) -> Result<Self, IdentifierError> {
        let trimmed = input.trim();
        let hex = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or(IdentifierError::InvalidHospitalAddress)?;

        if hex.len() != ADDRESS_HEX_LEN || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(IdentifierError::InvalidHospitalAddress);
        }

        Ok(Self(format!("0x{}", hex.to_ascii_lowercase())))
    }
}

string_newtype!(HospitalAddress);

/// A contact email address attached to an appointment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContactEmail(String);

impl ContactEmail {
    /// Parses an email address of the form `local@domain.tld`.
    pub fn parse(input: &str) -> Result<Self, IdentifierError> {
        let trimmed = input.trim();
        if trimmed.chars().any(char::is_whitespace) {
            return Err(IdentifierError::InvalidEmail);
        }

        let (local, domain) = trimmed
            .split_once('@')
            .ok_or(IdentifierError::InvalidEmail)?;
        if local.is_empty() || domain.contains('@') {
            return Err(IdentifierError::InvalidEmail);
        }

        // Needs a dot with at least one character on each side.
        let dotted = domain
            .char_indices()
            .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len());
        if !dotted {
            return Err(IdentifierError::InvalidEmail);
        }

        Ok(Self(trimmed.to_owned()))
    }
}

string_newtype!(ContactEmail);

/// A 10-digit contact phone number attached to an appointment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContactPhone(String);

impl ContactPhone {
    /// Parses a phone number consisting of exactly 10 digits.
    pub fn parse(input: &str) -> Result<Self, IdentifierError> {
        let trimmed = input.trim();
        if !all_digits(trimmed, PHONE_LEN) {
            return Err(IdentifierError::InvalidPhone);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

string_newtype!(ContactPhone);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aadhar_requires_exactly_twelve_digits() {
        assert!(AadharNumber::parse("123456789012").is_ok());
        assert!(AadharNumber::parse(" 123456789012 ").is_ok());
        assert_eq!(
            AadharNumber::parse("12345678901"),
            Err(IdentifierError::InvalidAadhar)
        );
        assert_eq!(
            AadharNumber::parse("1234567890123"),
            Err(IdentifierError::InvalidAadhar)
        );
        assert_eq!(
            AadharNumber::parse("12345678901a"),
            Err(IdentifierError::InvalidAadhar)
        );
        // Non-ASCII digits are not accepted.
        assert_eq!(
            AadharNumber::parse("١٢٣٤٥٦٧٨٩٠١٢"),
            Err(IdentifierError::InvalidAadhar)
        );
    }

    #[test]
    fn hospital_address_is_normalised_to_lower_case() {
        let upper = HospitalAddress::parse("0x5FbDB2315678afecb367f032d93F642f64180aa3")
            .expect("valid address");
        let lower = HospitalAddress::parse("0x5fbdb2315678afecb367f032d93f642f64180aa3")
            .expect("valid address");
        assert_eq!(upper, lower);
        assert_eq!(upper.as_str(), "0x5fbdb2315678afecb367f032d93f642f64180aa3");
    }

    #[test]
    fn hospital_address_rejects_bad_shapes() {
        for input in [
            "5fbdb2315678afecb367f032d93f642f64180aa3",
            "0x5fbdb2315678afecb367f032d93f642f64180aa",
            "0x5fbdb2315678afecb367f032d93f642f64180aa3ff",
            "0xzzbdb2315678afecb367f032d93f642f64180aa3",
            "",
        ] {
            assert_eq!(
                HospitalAddress::parse(input),
                Err(IdentifierError::InvalidHospitalAddress),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn email_validation() {
        assert!(ContactEmail::parse("patient@example.com").is_ok());
        assert!(ContactEmail::parse("a@b.co.in").is_ok());
        for input in [
            "patient",
            "patient@",
            "@example.com",
            "patient@example",
            "patient@.com",
            "patient@example.",
            "pa tient@example.com",
            "a@b@example.com",
        ] {
            assert_eq!(
                ContactEmail::parse(input),
                Err(IdentifierError::InvalidEmail),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn phone_requires_ten_digits() {
        assert!(ContactPhone::parse("9876543210").is_ok());
        assert_eq!(
            ContactPhone::parse("987654321"),
            Err(IdentifierError::InvalidPhone)
        );
        assert_eq!(
            ContactPhone::parse("+919876543210"),
            Err(IdentifierError::InvalidPhone)
        );
    }

    #[test]
    fn serde_round_trip_validates() {
        let id: AadharNumber = serde_json::from_str("\"123456789012\"").expect("valid");
        assert_eq!(serde_json::to_string(&id).expect("serialise"), "\"123456789012\"");
        assert!(serde_json::from_str::<AadharNumber>("\"12\"").is_err());
    }
}

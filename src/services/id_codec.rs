/*
 * Responsibility
 * - 公開 post id ↔ 内部 BIGSERIAL id の変換 (encode/decode)
 * - sqids の扱いはここに閉じ込める (方式変更の影響を局所化)
 *
 * Error 型はこのモジュールで完結するので thiserror は使わない
 */
use sqids::{Error as SqidsError, Sqids};
use std::{error::Error, fmt};

pub type Result<T> = std::result::Result<T, IdCodecError>;

#[derive(Debug)]
pub enum IdCodecError {
    InvalidMinLength { value: usize },
    Sqids(SqidsError),
    NegativeId { value: i64 },
    DecodeInvalidFormat,
    DecodeOutOfRange,
}

impl fmt::Display for IdCodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdCodecError::InvalidMinLength { value } => {
                write!(f, "SQIDS_MIN_LENGTH must be between 0 and 255, got {}", value)
            }
            IdCodecError::Sqids(e) => write!(f, "sqids error: {}", e),
            IdCodecError::NegativeId { value } => write!(f, "negative post id: {}", value),
            IdCodecError::DecodeInvalidFormat => write!(f, "invalid public id format"),
            IdCodecError::DecodeOutOfRange => write!(f, "decoded id is out of range"),
        }
    }
}

impl Error for IdCodecError {}

impl From<SqidsError> for IdCodecError {
    fn from(e: SqidsError) -> Self {
        IdCodecError::Sqids(e)
    }
}

#[derive(Clone, Debug)]
pub struct IdCodec {
    sqids: Sqids,
}

impl IdCodec {
    pub fn new(min_length: usize, alphabet: &str) -> Result<Self> {
        let min_length: u8 = min_length
            .try_into()
            .map_err(|_| IdCodecError::InvalidMinLength { value: min_length })?;

        let sqids = Sqids::builder()
            .min_length(min_length)
            .alphabet(alphabet.chars().collect())
            .build()?;

        Ok(Self { sqids })
    }

    pub fn encode(&self, id: i64) -> Result<String> {
        let n = u64::try_from(id).map_err(|_| IdCodecError::NegativeId { value: id })?;
        Ok(self.sqids.encode(&[n])?)
    }

    pub fn decode(&self, public_id: &str) -> Result<i64> {
        let nums = self.sqids.decode(public_id);
        let [n] = nums.as_slice() else {
            return Err(IdCodecError::DecodeInvalidFormat);
        };

        // Only the canonical encoding is accepted
        if self.sqids.encode(&[*n])? != public_id {
            return Err(IdCodecError::DecodeInvalidFormat);
        }

        i64::try_from(*n).map_err(|_| IdCodecError::DecodeOutOfRange)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALPHABET: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

    #[test]
    fn encoded_ids_respect_min_length_and_decode_back() {
        let codec = IdCodec::new(10, ALPHABET).unwrap();
        let public = codec.encode(42).unwrap();

        assert!(public.len() >= 10);
        assert_eq!(codec.decode(&public).unwrap(), 42);
    }

    #[test]
    fn negative_ids_are_refused() {
        let codec = IdCodec::new(10, ALPHABET).unwrap();
        assert!(matches!(
            codec.encode(-1),
            Err(IdCodecError::NegativeId { value: -1 })
        ));
    }

    #[test]
    fn junk_does_not_decode() {
        let codec = IdCodec::new(10, ALPHABET).unwrap();
        assert!(codec.decode("").is_err());
        assert!(codec.decode("!!!").is_err());
    }

    #[test]
    fn min_length_over_u8_is_rejected() {
        assert!(matches!(
            IdCodec::new(300, ALPHABET),
            Err(IdCodecError::InvalidMinLength { value: 300 })
        ));
    }
}

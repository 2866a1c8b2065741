//! Ordered text decoding: UTF-8 first, then a single-byte fallback.
//!
//! Latin-1 maps every byte to the code point of the same value, so with the default chain
//! decoding cannot fail. A decoder configured without the fallback can, which is how a
//! strict UTF-8 run is expressed.

/// A character encoding the decoder knows how to try.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Utf8,
    Latin1,
}

impl Encoding {
    /// Name used in the content label of a fallback decode.
    pub fn label(self) -> &'static str {
        match self {
            Encoding::Utf8 => "UTF-8",
            Encoding::Latin1 => "Latin-1",
        }
    }

    fn decode(self, bytes: &[u8]) -> Option<String> {
        match self {
            Encoding::Utf8 => std::str::from_utf8(bytes).ok().map(str::to_owned),
            Encoding::Latin1 => Some(bytes.iter().map(|&b| char::from(b)).collect()),
        }
    }
}

/// Result of decoding one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// The first encoding in the chain succeeded.
    Primary(String),
    /// A later encoding succeeded.
    Fallback { encoding: Encoding, text: String },
    /// No encoding in the chain accepted the bytes.
    Failure,
}

#[derive(Debug, Clone)]
pub struct Decoder {
    chain: Vec<Encoding>,
}

impl Default for Decoder {
    fn default() -> Self {
        Self {
            chain: vec![Encoding::Utf8, Encoding::Latin1],
        }
    }
}

impl Decoder {
    pub fn new(chain: Vec<Encoding>) -> Self {
        Self { chain }
    }

    /// UTF-8 only, no fallback.
    pub fn strict() -> Self {
        Self::new(vec![Encoding::Utf8])
    }

    pub fn decode(&self, bytes: &[u8]) -> DecodeOutcome {
        for (position, encoding) in self.chain.iter().enumerate() {
            if let Some(text) = encoding.decode(bytes) {
                return if position == 0 {
                    DecodeOutcome::Primary(text)
                } else {
                    DecodeOutcome::Fallback {
                        encoding: *encoding,
                        text,
                    }
                };
            }
        }
        DecodeOutcome::Failure
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_utf8_is_primary() {
        let outcome = Decoder::default().decode("héllo".as_bytes());
        assert_eq!(outcome, DecodeOutcome::Primary("héllo".to_string()));
    }

    #[test]
    fn invalid_utf8_falls_back_to_latin1() {
        let outcome = Decoder::default().decode(&[0x63, 0x61, 0x66, 0xE9]);
        assert_eq!(
            outcome,
            DecodeOutcome::Fallback {
                encoding: Encoding::Latin1,
                text: "café".to_string()
            }
        );
    }

    #[test]
    fn latin1_accepts_every_byte() {
        let all: Vec<u8> = (0..=255).collect();
        match Decoder::new(vec![Encoding::Latin1]).decode(&all) {
            DecodeOutcome::Primary(text) => assert_eq!(text.chars().count(), 256),
            other => panic!("expected primary decode, got {other:?}"),
        }
    }

    #[test]
    fn strict_decoder_reports_failure() {
        assert_eq!(Decoder::strict().decode(&[0xFF, 0xFE]), DecodeOutcome::Failure);
    }

    #[test]
    fn empty_chain_always_fails() {
        assert_eq!(Decoder::new(vec![]).decode(b"x"), DecodeOutcome::Failure);
    }
}

//! Serde support for [`Xid`].
//!
//! By default an [`Xid`] serializes as its 20-character text form and
//! deserializes from either that text or a 12-byte buffer. Use [`as_bytes`]
//! with `#[serde(with = "xid::serde::as_bytes")]` to store the raw bytes
//! instead.

use ::serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use core::fmt;

use crate::Xid;

impl Serialize for Xid {
    fn serialize<S>(&self, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_str(self.encode_text().as_str())
    }
}

impl<'de> Deserialize<'de> for Xid {
    fn deserialize<D>(d: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        d.deserialize_str(XidVisitor)
    }
}

struct XidVisitor;

impl<'de> de::Visitor<'de> for XidVisitor {
    type Value = Xid;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a 20-character base32hex string or 12 bytes")
    }

    #[inline]
    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Xid::decode_text(v).map_err(de::Error::custom)
    }

    #[inline]
    fn visit_bytes<E>(self, v: &[u8]) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Xid::decode_bytes(v).map_err(de::Error::custom)
    }
}

/// Serializes an [`Xid`] as its raw 12 bytes.
///
/// Formats without a native byte type (JSON, for one) write the bytes as a
/// sequence of integers, which is accepted back on deserialize.
pub mod as_bytes {
    use super::*;

    pub fn serialize<S>(id: &Xid, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_bytes(id.as_bytes())
    }

    pub fn deserialize<'de, D>(d: D) -> Result<Xid, D::Error>
    where
        D: Deserializer<'de>,
    {
        d.deserialize_bytes(BytesVisitor)
    }

    struct BytesVisitor;

    impl<'de> de::Visitor<'de> for BytesVisitor {
        type Value = Xid;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("12 bytes")
        }

        #[inline]
        fn visit_bytes<E>(self, v: &[u8]) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Xid::decode_bytes(v).map_err(de::Error::custom)
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: de::SeqAccess<'de>,
        {
            let mut bytes = [0u8; Xid::RAW_LEN];
            for (index, slot) in bytes.iter_mut().enumerate() {
                *slot = seq
                    .next_element()?
                    .ok_or_else(|| <A::Error as de::Error>::invalid_length(index, &self))?;
            }
            if seq.next_element::<u8>()?.is_some() {
                return Err(de::Error::invalid_length(Xid::RAW_LEN + 1, &self));
            }
            Ok(Xid::from_bytes(bytes))
        }
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;
    use ::serde::de::value::{BytesDeserializer, Error as ValueError};

    const TEXT: &str = "9m4e2mr0ui3e8a215n4g";
    const BYTES: [u8; 12] = [
        0x4d, 0x88, 0xe1, 0x5b, 0x60, 0xf4, 0x86, 0xe4, 0x28, 0x41, 0x2d, 0xc9,
    ];

    #[test]
    fn serializes_as_text() {
        let json = serde_json::to_string(&Xid::from_bytes(BYTES)).expect("serialize");
        assert_eq!(json, format!("\"{TEXT}\""));
    }

    #[test]
    fn deserializes_from_text() {
        let id: Xid = serde_json::from_str(&format!("\"{TEXT}\"")).expect("deserialize");
        assert_eq!(id, Xid::from_bytes(BYTES));
    }

    #[test]
    fn deserializes_from_bytes() {
        let id = Xid::deserialize(BytesDeserializer::<ValueError>::new(&BYTES))
            .expect("deserialize");
        assert_eq!(id, Xid::from_bytes(BYTES));

        let short = Xid::deserialize(BytesDeserializer::<ValueError>::new(&BYTES[..11]));
        assert!(short.is_err());
    }

    #[test]
    fn rejects_malformed_text() {
        for input in [
            "\"\"",
            "\"9m4e2mr0ui3e8a215n4\"",
            "\"9M4E2MR0UI3E8A215N4G\"",
            "\"vvvvvvvvvvvvvvvvvvvv\"",
            "42",
        ] {
            assert!(serde_json::from_str::<Xid>(input).is_err(), "{input}");
        }
    }

    #[test]
    fn error_message_names_the_problem() {
        let err = serde_json::from_str::<Xid>("\"9m4e2mr0ui3e8a215n4w\"").unwrap_err();
        assert!(err.to_string().contains("invalid character"), "{err}");
    }

    #[test]
    fn text_field_round_trip() {
        #[derive(PartialEq, Eq, Debug, Serialize, Deserialize)]
        struct Row {
            id: Xid,
        }
        let row = Row {
            id: Xid::from_bytes(BYTES),
        };

        let json = serde_json::to_string(&row).expect("serialize");
        assert_eq!(json, format!(r#"{{"id":"{TEXT}"}}"#));
        let back: Row = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, row);
    }

    #[test]
    fn bytes_field_round_trip() {
        #[derive(PartialEq, Eq, Debug, Serialize, Deserialize)]
        struct Row {
            #[serde(with = "as_bytes")]
            id: Xid,
        }
        let row = Row {
            id: Xid::from_bytes(BYTES),
        };

        let json = serde_json::to_string(&row).expect("serialize");
        assert_eq!(json, r#"{"id":[77,136,225,91,96,244,134,228,40,65,45,201]}"#);
        let back: Row = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, row);
    }

    #[test]
    fn bytes_field_rejects_wrong_length() {
        #[derive(Debug, Deserialize)]
        struct Row {
            #[serde(with = "as_bytes")]
            #[allow(dead_code)]
            id: Xid,
        }
        assert!(serde_json::from_str::<Row>(r#"{"id":[1,2,3]}"#).is_err());
        assert!(serde_json::from_str::<Row>(r#"{"id":[0,0,0,0,0,0,0,0,0,0,0,0,0]}"#).is_err());
    }
}

//! Typed value encoding.

use crate::error::{CodecError, CodecResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Types that can be written as a stored value.
pub trait Encode {
    /// Encode this value to its stored bytes.
    fn encode(&self) -> CodecResult<Vec<u8>>;
}

/// Types that can be read back from a stored value.
pub trait Decode: Sized {
    /// Name used in error messages.
    const TYPE_NAME: &'static str;

    /// Decode a value from its stored bytes.
    fn decode(bytes: &[u8]) -> CodecResult<Self>;
}

/// Value returned by sentinel accessors when a key is absent.
///
/// Integers use their minimum representable value.
pub trait AbsentSentinel {
    /// The absence sentinel.
    const ABSENT: Self;
}

macro_rules! fixed_width_int {
    ($($ty:ty),*) => {
        $(
            impl Encode for $ty {
                fn encode(&self) -> CodecResult<Vec<u8>> {
                    Ok(self.to_be_bytes().to_vec())
                }
            }

            impl Decode for $ty {
                const TYPE_NAME: &'static str = stringify!($ty);

                fn decode(bytes: &[u8]) -> CodecResult<Self> {
                    let array = bytes.try_into().map_err(|_| CodecError::InvalidLength {
                        type_name: Self::TYPE_NAME,
                        expected: std::mem::size_of::<$ty>(),
                        actual: bytes.len(),
                    })?;
                    Ok(<$ty>::from_be_bytes(array))
                }
            }

            impl AbsentSentinel for $ty {
                const ABSENT: Self = <$ty>::MIN;
            }
        )*
    };
}

fixed_width_int!(i16, i32, i64);

impl Encode for bool {
    fn encode(&self) -> CodecResult<Vec<u8>> {
        Ok(vec![u8::from(*self)])
    }
}

impl Decode for bool {
    const TYPE_NAME: &'static str = "bool";

    fn decode(bytes: &[u8]) -> CodecResult<Self> {
        match bytes {
            [0] => Ok(false),
            [1] => Ok(true),
            [other] => Err(CodecError::InvalidBool(*other)),
            _ => Err(CodecError::InvalidLength {
                type_name: Self::TYPE_NAME,
                expected: 1,
                actual: bytes.len(),
            }),
        }
    }
}

fn to_cbor<T: Serialize + ?Sized>(value: &T) -> CodecResult<Vec<u8>> {
    let mut buffer = Vec::new();
    ciborium::into_writer(value, &mut buffer)
        .map_err(|e| CodecError::encoding_failed(e.to_string()))?;
    Ok(buffer)
}

/// Decodes exactly one CBOR item spanning all of `bytes`.
fn from_cbor<T: DeserializeOwned>(bytes: &[u8]) -> CodecResult<T> {
    let mut reader = bytes;
    let value = ciborium::from_reader(&mut reader)
        .map_err(|e| CodecError::decoding_failed(e.to_string()))?;
    if !reader.is_empty() {
        return Err(CodecError::decoding_failed(format!(
            "{} trailing bytes",
            reader.len()
        )));
    }
    Ok(value)
}

impl Encode for str {
    fn encode(&self) -> CodecResult<Vec<u8>> {
        to_cbor(self)
    }
}

impl Encode for String {
    fn encode(&self) -> CodecResult<Vec<u8>> {
        to_cbor(self.as_str())
    }
}

impl Decode for String {
    const TYPE_NAME: &'static str = "String";

    fn decode(bytes: &[u8]) -> CodecResult<Self> {
        from_cbor(bytes)
    }
}

impl Encode for [i64] {
    fn encode(&self) -> CodecResult<Vec<u8>> {
        to_cbor(self)
    }
}

impl Encode for Vec<i64> {
    fn encode(&self) -> CodecResult<Vec<u8>> {
        to_cbor(self.as_slice())
    }
}

impl Decode for Vec<i64> {
    const TYPE_NAME: &'static str = "Vec<i64>";

    fn decode(bytes: &[u8]) -> CodecResult<Self> {
        from_cbor(bytes)
    }
}

/// An arbitrary serde value stored as an opaque object.
///
/// # Example
///
/// ```
/// use nskv_codec::{Decode, Encode, Object};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, PartialEq, Serialize, Deserialize)]
/// struct Band {
///     name: String,
///     founded: u16,
/// }
///
/// let band = Object(Band { name: "Opeth".into(), founded: 1990 });
/// let bytes = band.encode().unwrap();
/// let decoded: Object<Band> = Object::decode(&bytes).unwrap();
/// assert_eq!(decoded, band);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Object<T>(pub T);

impl<T> Object<T> {
    /// Unwraps the inner value.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: Serialize> Encode for Object<T> {
    fn encode(&self) -> CodecResult<Vec<u8>> {
        to_cbor(&self.0)
    }
}

impl<T: DeserializeOwned> Decode for Object<T> {
    const TYPE_NAME: &'static str = "Object";

    fn decode(bytes: &[u8]) -> CodecResult<Self> {
        from_cbor(bytes).map(Object)
    }
}

impl<T: Encode + ?Sized> Encode for &T {
    fn encode(&self) -> CodecResult<Vec<u8>> {
        (**self).encode()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn cbor_decode_rejects_trailing_bytes() {
        // 0x80 is an empty CBOR array, followed by three stray bytes.
        let err = Vec::<i64>::decode(&i32::MIN.encode().unwrap()).unwrap_err();
        assert!(matches!(err, CodecError::DecodingFailed { .. }));

        // 0x61 0x41 is the one-char text "A", followed by "BC".
        assert!(String::decode(&0x6141_4243i32.encode().unwrap()).is_err());

        let mut padded = "ok".encode().unwrap();
        padded.push(0);
        assert!(String::decode(&padded).is_err());
    }

    #[test]
    fn integers_are_fixed_width_big_endian() {
        assert_eq!(0x0102i16.encode().unwrap(), vec![1, 2]);
        assert_eq!(0x0102_0304i32.encode().unwrap(), vec![1, 2, 3, 4]);
        assert_eq!((-1i64).encode().unwrap(), vec![0xFF; 8]);
    }

    #[test]
    fn integer_wrong_length_fails() {
        let err = i32::decode(&[1, 2]).unwrap_err();
        assert_eq!(
            err,
            CodecError::InvalidLength {
                type_name: "i32",
                expected: 4,
                actual: 2
            }
        );
    }

    #[test]
    fn i64_keeps_full_width() {
        let value = i64::from(i32::MAX) * 4 + 3;
        let bytes = value.encode().unwrap();
        assert_eq!(bytes.len(), 8);
        assert_eq!(i64::decode(&bytes).unwrap(), value);
    }

    #[test]
    fn bool_is_single_byte() {
        assert_eq!(true.encode().unwrap(), vec![1]);
        assert_eq!(false.encode().unwrap(), vec![0]);
        assert!(bool::decode(&[1]).unwrap());
        assert!(!bool::decode(&[0]).unwrap());
    }

    #[test]
    fn bool_rejects_other_bytes() {
        assert_eq!(bool::decode(&[2]), Err(CodecError::InvalidBool(2)));
        assert!(matches!(
            bool::decode(&[]),
            Err(CodecError::InvalidLength { .. })
        ));
    }

    #[test]
    fn str_and_string_encode_identically() {
        assert_eq!("band".encode().unwrap(), String::from("band").encode().unwrap());
    }

    #[test]
    fn string_roundtrip() {
        let value = String::from("Metal ünd Röck");
        assert_eq!(String::decode(&value.encode().unwrap()).unwrap(), value);
    }

    #[test]
    fn array_roundtrip_preserves_order() {
        let value = vec![3i64, -1, i64::MAX, i64::MIN, 0];
        assert_eq!(Vec::<i64>::decode(&value.encode().unwrap()).unwrap(), value);
    }

    #[test]
    fn empty_array_roundtrip() {
        let value: Vec<i64> = Vec::new();
        assert_eq!(Vec::<i64>::decode(&value.encode().unwrap()).unwrap(), value);
    }

    #[test]
    fn object_roundtrip() {
        let mut map = BTreeMap::new();
        map.insert("genre".to_string(), vec![1u32, 2]);
        let value = Object(map);
        assert_eq!(Object::decode(&value.encode().unwrap()).unwrap(), value);
    }

    #[test]
    fn corrupt_cbor_fails_to_decode() {
        assert!(matches!(
            String::decode(&[0xFF, 0x00]),
            Err(CodecError::DecodingFailed { .. })
        ));
    }

    #[test]
    fn mismatched_type_fails_to_decode() {
        let bytes = "not an array".encode().unwrap();
        assert!(Vec::<i64>::decode(&bytes).is_err());
    }

    #[test]
    fn sentinels_are_minimums() {
        assert_eq!(<i16 as AbsentSentinel>::ABSENT, i16::MIN);
        assert_eq!(<i32 as AbsentSentinel>::ABSENT, i32::MIN);
        assert_eq!(<i64 as AbsentSentinel>::ABSENT, i64::MIN);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn i16_roundtrip(v in any::<i16>()) {
                prop_assert_eq!(i16::decode(&v.encode().unwrap()).unwrap(), v);
            }

            #[test]
            fn i32_roundtrip(v in any::<i32>()) {
                prop_assert_eq!(i32::decode(&v.encode().unwrap()).unwrap(), v);
            }

            #[test]
            fn i64_roundtrip(v in any::<i64>()) {
                prop_assert_eq!(i64::decode(&v.encode().unwrap()).unwrap(), v);
            }

            #[test]
            fn string_roundtrip_any(v in any::<String>()) {
                prop_assert_eq!(String::decode(&v.encode().unwrap()).unwrap(), v);
            }

            #[test]
            fn array_roundtrip_any(v in prop::collection::vec(any::<i64>(), 0..64)) {
                prop_assert_eq!(Vec::<i64>::decode(&v.encode().unwrap()).unwrap(), v);
            }
        }
    }
}

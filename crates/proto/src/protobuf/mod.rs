//! Conversions between domain types and their Protobuf counterparts.

mod error;

use core::fmt::Display;

use bytes::Buf;
use prost::Message;

pub use error::Error;

/// A domain type with a canonical Protobuf encoding `T`.
///
/// Encoding goes through `T: From<Self>`; decoding goes through
/// `Self: TryFrom<T>`, so validation of the raw message happens exactly once,
/// in the `TryFrom` implementation of the domain type.
pub trait Protobuf<T: Message + Default + From<Self>>
where
    Self: Sized + Clone + TryFrom<T>,
    <Self as TryFrom<T>>::Error: Display,
{
    fn encode(&self, buf: &mut Vec<u8>) -> Result<(), Error> {
        T::from(self.clone())
            .encode(buf)
            .map_err(Error::encode_message)
    }

    /// Decodes the raw message, consuming the whole buffer, then validates it
    /// into the domain type.
    fn decode<B: Buf>(buf: B) -> Result<Self, Error> {
        let raw = T::decode(buf).map_err(Error::decode_message)?;

        Self::try_from(raw).map_err(|e| Error::try_from_protobuf(e.to_string()))
    }

    fn encoded_len(&self) -> usize {
        T::from(self.clone()).encoded_len()
    }

    fn encode_vec(&self) -> Vec<u8> {
        T::from(self.clone()).encode_to_vec()
    }

    fn decode_vec(v: &[u8]) -> Result<Self, Error> {
        Self::decode(v)
    }
}

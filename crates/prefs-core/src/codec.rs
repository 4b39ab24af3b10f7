//! Serialization of list values to and from their stored string form.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CodecError, CodecResult};

/// Canonical stored form of the empty list.
pub const EMPTY_LIST: &str = "[]";

/// Converts a list of elements to and from a single stored string.
///
/// Implementations must satisfy `decode(&encode(x)?)? == x`, and `decode`
/// of [`EMPTY_LIST`] must yield an empty list. Malformed input is an error,
/// never a partial or empty result.
pub trait ListCodec {
    type Elem;

    fn encode(list: &[Self::Elem]) -> CodecResult<String>;

    fn decode(raw: &str) -> CodecResult<Vec<Self::Elem>>;
}

/// JSON array codec, e.g. `[1,2,3]`.
pub struct JsonListCodec<T>(PhantomData<fn() -> T>);

impl<T> ListCodec for JsonListCodec<T>
where
    T: Serialize + DeserializeOwned,
{
    type Elem = T;

    fn encode(list: &[T]) -> CodecResult<String> {
        serde_json::to_string(list).map_err(|e| CodecError::Encode(e.to_string()))
    }

    fn decode(raw: &str) -> CodecResult<Vec<T>> {
        serde_json::from_str(raw).map_err(|e| CodecError::Malformed(e.to_string()))
    }
}

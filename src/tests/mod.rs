//! Tests for the OCHP client.



use crate::types::{DecodeAttempt, ResultObject};

/// Decoder for the JSON-encoded result bodies used in these tests
pub(crate) fn json_decoder(body: &[u8]) -> DecodeAttempt {
    match serde_json::from_slice::<serde_json::Value>(body) {
        Ok(serde_json::Value::Null) => DecodeAttempt::Empty,
        Ok(value) => match serde_json::from_value::<ResultObject>(value) {
            Ok(result) => DecodeAttempt::Decoded(result),
            Err(err) => DecodeAttempt::Failed(err.into()),
        },
        Err(err) => DecodeAttempt::Failed(err.into()),
    }
}

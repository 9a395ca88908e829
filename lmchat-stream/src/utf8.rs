//! UTF-8 decoding that tolerates code points split across chunks.

use lmchat_types::StreamError;

/// Decode `pending ++ bytes`, returning the text and the incomplete tail.
///
/// A trailing sequence that is merely unfinished is returned as the new
/// tail (at most three bytes). Bytes that can never form valid UTF-8 are an
/// error.
pub(crate) fn decode(mut pending: Vec<u8>, bytes: &[u8]) -> Result<(String, Vec<u8>), StreamError> {
    pending.extend_from_slice(bytes);
    match String::from_utf8(pending) {
        Ok(text) => Ok((text, Vec::new())),
        Err(err) => {
            let utf8 = err.utf8_error();
            if utf8.error_len().is_some() {
                return Err(StreamError::Decode(utf8.to_string()));
            }
            let mut valid = err.into_bytes();
            let tail = valid.split_off(utf8.valid_up_to());
            let text = String::from_utf8(valid).map_err(|e| StreamError::Decode(e.to_string()))?;
            Ok((text, tail))
        }
    }
}

/// Check that nothing is left over once the source has ended.
pub(crate) fn finish(pending: &[u8]) -> Result<(), StreamError> {
    if pending.is_empty() {
        Ok(())
    } else {
        Err(StreamError::Decode(format!(
            "incomplete UTF-8 sequence of {} bytes at end of stream",
            pending.len()
        )))
    }
}

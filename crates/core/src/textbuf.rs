use servo_deck_protocol::Frame;
use thiserror::Error;

/// Separator written after every record in the sequence text buffer.
pub const RECORD_SEPARATOR: char = ',';

#[derive(Debug, Error)]
pub enum SequenceTextError {
    #[error("malformed sequence text: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("could not encode frame record: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Append one frame to the text buffer as a compact JSON record followed by
/// the separator and a newline.
///
/// The buffer is machine-written but operator-editable plain text: one
/// record per line keeps hand edits and diffs cheap, at the cost of the
/// buffer never being a structurally valid JSON array on its own. Appends
/// never rewrite existing content.
pub fn append_record(buffer: &mut String, frame: &Frame) -> Result<(), SequenceTextError> {
    let record = serde_json::to_string(frame).map_err(SequenceTextError::Encode)?;
    buffer.push_str(&record);
    buffer.push(RECORD_SEPARATOR);
    buffer.push('\n');
    Ok(())
}

/// Parse the text buffer back into frames.
///
/// Trims surrounding whitespace, strips exactly one trailing separator if
/// present (the buffer always ends with one after an append), wraps the
/// result in `[...]` and decodes. A buffer with no trailing separator
/// parses the same way; one with two fails, since the wrapped text then
/// carries a JSON trailing comma.
pub fn parse_records(buffer: &str) -> Result<Vec<Frame>, SequenceTextError> {
    let text = buffer.trim();
    let text = text.strip_suffix(RECORD_SEPARATOR).unwrap_or(text);
    let wrapped = format!("[{text}]");
    serde_json::from_str(&wrapped).map_err(SequenceTextError::Malformed)
}

#[cfg(test)]
#[path = "transcript_test.rs"]
mod tests;

use crate::domain::models::Message;

/// Splits a raw transcript into messages. A block ends at a blank line that
/// is immediately followed by an ASCII letter, so numbered lists and
/// indented continuations stay inside the block they belong to.
///
/// Identifiers count every block, including the empty ones that are dropped.
pub fn parse_transcript(history: &str) -> Vec<Message> {
    let bytes = history.as_bytes();
    let mut blocks: Vec<&str> = vec![];
    let mut start = 0;
    let mut idx = 0;

    while idx + 2 < bytes.len() {
        if bytes[idx] == b'\n' && bytes[idx + 1] == b'\n' && bytes[idx + 2].is_ascii_alphabetic() {
            blocks.push(&history[start..idx]);
            start = idx + 2;
            idx += 2;
            continue;
        }
        idx += 1;
    }
    blocks.push(&history[start..]);

    return blocks
        .iter()
        .enumerate()
        .filter_map(|(idx, block)| {
            let trimmed = block.trim();
            if trimmed.is_empty() {
                return None;
            }

            return Some(Message::new(&format!("msg-{}", idx + 1), trimmed));
        })
        .collect();
}

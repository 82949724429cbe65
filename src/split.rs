//! Splitting rendered markup into transport-sized chunks.
//!
//! Lengths are counted in UTF-16 code units, the unit the chat transport
//! limits on, and every cut lands on a char boundary. Markup that fits goes
//! out as a single chunk. Otherwise a code block always starts a new chunk;
//! one that does not fit is sliced and each slice is re-wrapped in its own
//! `<pre><code>` so that every chunk displays on its own.
//!
//! Plain-text cuts may still fall inside a `<b>`, `<i>` or `<a>` span.

use tracing::{debug, trace};

use crate::error::{Error, Result};

pub const CODE_OPEN: &str = "<pre><code>";
pub const CODE_CLOSE: &str = "</code></pre>";

/// Units spent on the code block wrapper in every code chunk.
pub const WRAPPER_OVERHEAD: usize = CODE_OPEN.len() + CODE_CLOSE.len();

/// Smallest accepted limit: the wrapper plus room for one surrogate pair.
pub const MIN_CHUNK_LEN: usize = WRAPPER_OVERHEAD + 2;

// Longest character reference a cut will step back over, e.g. `&quot;`
const MAX_ENTITY_LEN: usize = 10;

/// Length of `text` in UTF-16 code units.
pub fn text_len(text: &str) -> usize {
    text.chars().map(char::len_utf16).sum()
}

/// Split `markup` into chunks of at most `max_len` UTF-16 code units.
///
/// Concatenating the chunks, after removing the wrappers added around code
/// slices, gives back `markup`. Empty input yields no chunks.
pub fn split(markup: &str, max_len: usize) -> Result<Vec<String>> {
    if max_len < MIN_CHUNK_LEN {
        return Err(Error::ChunkLimitTooSmall {
            limit: max_len,
            minimum: MIN_CHUNK_LEN,
        });
    }
    if markup.is_empty() {
        return Ok(Vec::new());
    }
    if text_len(markup) <= max_len {
        return Ok(vec![markup.to_string()]);
    }

    let mut chunks = Vec::new();
    let mut pos = 0;
    let mut next_code = markup.find(CODE_OPEN);

    while pos < markup.len() {
        // Only search again once the cursor has moved past the known marker
        if let Some(marker) = next_code {
            if marker < pos {
                next_code = markup[pos..].find(CODE_OPEN).map(|offset| pos + offset);
            }
        }

        let window_end = advance_units(markup, pos, max_len);
        let code_start = match next_code {
            Some(start) if start < window_end => start,
            _ => {
                let end = entity_safe_cut(markup, pos, window_end);
                chunks.push(markup[pos..end].to_string());
                pos = end;
                continue;
            }
        };

        if code_start > pos {
            chunks.push(markup[pos..code_start].to_string());
        }

        let payload_start = code_start + CODE_OPEN.len();
        let (payload_end, next_pos) = match markup[payload_start..].find(CODE_CLOSE) {
            Some(offset) => {
                let end = payload_start + offset;
                (end, end + CODE_CLOSE.len())
            }
            None => {
                debug!(at = code_start, "unterminated code block, taking rest of input");
                (markup.len(), markup.len())
            }
        };

        push_code_block(&markup[payload_start..payload_end], max_len, &mut chunks);
        pos = next_pos;
    }

    Ok(chunks)
}

fn push_code_block(payload: &str, max_len: usize, chunks: &mut Vec<String>) {
    if WRAPPER_OVERHEAD + text_len(payload) <= max_len {
        chunks.push(wrap_code(payload));
        return;
    }

    let budget = max_len - WRAPPER_OVERHEAD;
    let mut pos = 0;
    let mut slices = 0;
    while pos < payload.len() {
        let end = entity_safe_cut(payload, pos, advance_units(payload, pos, budget));
        chunks.push(wrap_code(&payload[pos..end]));
        pos = end;
        slices += 1;
    }
    trace!(slices, budget, "sliced oversized code block");
}

fn wrap_code(payload: &str) -> String {
    let mut chunk = String::with_capacity(WRAPPER_OVERHEAD + payload.len());
    chunk.push_str(CODE_OPEN);
    chunk.push_str(payload);
    chunk.push_str(CODE_CLOSE);
    chunk
}

/// Byte offset of the longest run of chars from `from` that fits in `units`
/// UTF-16 code units. `units >= 2` always admits at least one char.
fn advance_units(text: &str, from: usize, units: usize) -> usize {
    let mut used = 0;
    for (offset, c) in text[from..].char_indices() {
        used += c.len_utf16();
        if used > units {
            return from + offset;
        }
    }
    text.len()
}

/// Pull a cut at `cut` back to the start of a character reference it would
/// otherwise split, as long as the chunk starting at `start` stays non-empty.
fn entity_safe_cut(text: &str, start: usize, cut: usize) -> usize {
    if cut >= text.len() {
        return cut;
    }
    let Some(amp) = text[start..cut].rfind('&').map(|offset| start + offset) else {
        return cut;
    };
    if amp == start || text[amp..cut].contains(';') {
        return cut;
    }
    let tail = &text[amp + 1..];
    let Some(semi) = tail.find(';') else {
        return cut;
    };
    let name = &tail[..semi];
    let is_reference = !name.is_empty()
        && semi + 2 <= MAX_ENTITY_LEN
        && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'#');
    if is_reference { amp } else { cut }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_no_chunks() {
        assert_eq!(split("", 100).unwrap(), Vec::<String>::new());
    }

    #[test]
    fn short_input_is_one_chunk() {
        assert_eq!(split("<b>hi</b> there", 100).unwrap(), vec!["<b>hi</b> there"]);
    }

    #[test]
    fn plain_text_cut_at_limit() {
        let text = "a".repeat(60);
        let chunks = split(&text, 25).unwrap();
        assert_eq!(chunks, vec!["a".repeat(25), "a".repeat(25), "a".repeat(10)]);
    }

    #[test]
    fn code_block_forces_cut() {
        let markup = format!("X{CODE_OPEN}{}{CODE_CLOSE}Z", "Y".repeat(10000));
        let chunks = split(&markup, 100).unwrap();

        assert_eq!(chunks.first().map(String::as_str), Some("X"));
        assert_eq!(chunks.last().map(String::as_str), Some("Z"));

        let interior = &chunks[1..chunks.len() - 1];
        assert_eq!(interior.len(), 10000usize.div_ceil(100 - WRAPPER_OVERHEAD));
        let mut payload = String::new();
        for chunk in interior {
            assert!(chunk.len() <= 100);
            let inner = chunk
                .strip_prefix(CODE_OPEN)
                .and_then(|c| c.strip_suffix(CODE_CLOSE))
                .unwrap();
            assert!(inner.len() <= 100 - WRAPPER_OVERHEAD);
            payload.push_str(inner);
        }
        assert_eq!(payload, "Y".repeat(10000));
    }

    #[test]
    fn fitting_code_block_stays_whole() {
        let after = "z".repeat(30);
        let markup = format!("intro\n{CODE_OPEN}let x = 1;{CODE_CLOSE}\n\n{after}");
        let chunks = split(&markup, 40).unwrap();
        assert_eq!(
            chunks,
            vec![
                "intro\n".to_string(),
                format!("{CODE_OPEN}let x = 1;{CODE_CLOSE}"),
                format!("\n\n{after}"),
            ]
        );
    }

    #[test]
    fn short_input_with_code_block_is_one_chunk() {
        let markup = format!("intro\n\n{CODE_OPEN}x{CODE_CLOSE}\n\nafter");
        assert_eq!(split(&markup, 4096).unwrap(), vec![markup.clone()]);
    }

    #[test]
    fn every_code_block_is_found() {
        let block = format!("{CODE_OPEN}{}{CODE_CLOSE}", "c".repeat(10));
        let markup = format!("{}{block}{}{block}", "a".repeat(70), "b".repeat(70));
        let chunks = split(&markup, 50).unwrap();
        assert_eq!(
            chunks,
            vec![
                "a".repeat(50),
                "a".repeat(20),
                block.clone(),
                "b".repeat(50),
                "b".repeat(20),
                block,
            ]
        );
    }

    #[test]
    fn code_block_beyond_window_is_not_reached() {
        let markup = format!("{}{CODE_OPEN}c{CODE_CLOSE}", "a".repeat(30));
        let chunks = split(&markup, 30).unwrap();
        assert_eq!(chunks[0], "a".repeat(30));
        assert_eq!(chunks[1], format!("{CODE_OPEN}c{CODE_CLOSE}"));
    }

    #[test]
    fn unterminated_code_block_runs_to_end() {
        let lead = "t".repeat(20);
        let code = "y".repeat(20);
        let markup = format!("{lead}{CODE_OPEN}{code}");
        let chunks = split(&markup, 50).unwrap();
        assert_eq!(chunks, vec![lead, format!("{CODE_OPEN}{code}{CODE_CLOSE}")]);
    }

    #[test]
    fn empty_code_block_is_kept() {
        let markup = format!("{CODE_OPEN}{CODE_CLOSE}");
        assert_eq!(split(&markup, 100).unwrap(), vec![markup.clone()]);
    }

    #[test]
    fn limit_must_leave_room_past_wrapper() {
        assert!(matches!(
            split("text", WRAPPER_OVERHEAD),
            Err(Error::ChunkLimitTooSmall { limit: 24, minimum: 26 })
        ));
        assert!(split("", 10).is_err());
        assert!(split("text", MIN_CHUNK_LEN - 1).is_err());
        assert!(split("text", MIN_CHUNK_LEN).is_ok());
    }

    #[test]
    fn astral_chars_count_two_units() {
        let text = "😀".repeat(200);
        let chunks = split(&text, 100).unwrap();
        assert_eq!(chunks.len(), 4);
        for chunk in &chunks {
            assert!(text_len(chunk) <= 100);
        }
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn astral_code_slices_fit() {
        let markup = format!("{CODE_OPEN}{}{CODE_CLOSE}", "😀".repeat(60));
        let chunks = split(&markup, 51).unwrap();
        for chunk in &chunks {
            assert!(text_len(chunk) <= 51);
            assert!(chunk.starts_with(CODE_OPEN) && chunk.ends_with(CODE_CLOSE));
        }
        // 27 units of budget hold 13 emoji
        assert_eq!(chunks[0], format!("{CODE_OPEN}{}{CODE_CLOSE}", "😀".repeat(13)));
    }

    #[test]
    fn text_len_counts_utf16_units() {
        assert_eq!(text_len("ab"), 2);
        assert_eq!(text_len("жж"), 2);
        assert_eq!(text_len("😀"), 2);
    }

    #[test]
    fn bmp_text_counts_one_unit_per_char() {
        let text = "ж".repeat(30);
        let chunks = split(&text, 25).unwrap();
        assert_eq!(chunks, vec!["ж".repeat(25), "ж".repeat(5)]);
    }

    #[test]
    fn cut_does_not_split_entity() {
        // cut at 25 would land inside "&amp;"
        let text = format!("{}&amp;{}", "a".repeat(23), "b".repeat(10));
        let chunks = split(&text, 25).unwrap();
        assert_eq!(chunks[0], "a".repeat(23));
        assert!(chunks[1].starts_with("&amp;"));
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn code_slice_does_not_split_entity() {
        let payload = format!("{}&lt;{}", "x".repeat(4), "y".repeat(20));
        let markup = format!("{CODE_OPEN}{payload}{CODE_CLOSE}");
        // six chars of payload per slice
        let chunks = split(&markup, WRAPPER_OVERHEAD + 6).unwrap();
        assert_eq!(chunks[0], format!("{CODE_OPEN}xxxx{CODE_CLOSE}"));
        assert!(chunks[1].starts_with(&format!("{CODE_OPEN}&lt;")));
    }

    #[test]
    fn bare_ampersand_is_cut_normally() {
        let text = format!("{}& {}", "a".repeat(24), "b".repeat(10));
        let chunks = split(&text, 25).unwrap();
        assert_eq!(chunks[0], format!("{}&", "a".repeat(24)));
    }
}

//! Single-line rendering of stream preview frames.

use jiwa_core::Frame;
use jiwa_core::streaming::{CURSOR, PREPARING_PLACEHOLDER};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const STREAMING_LABEL: &str = "🔄 ";

/// What the in-place preview line should show, `None` to leave it blank.
///
/// Partial text is flattened to one line and, when wider than `width`
/// columns, only its tail is kept so the newest tokens stay visible.
pub fn preview_line(frame: &Frame, width: usize) -> Option<String> {
    match frame {
        Frame::Preparing => Some(PREPARING_PLACEHOLDER.to_owned()),
        Frame::Partial { text, cursor } => {
            let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
            // One column is kept for the cursor.
            let budget = width.saturating_sub(STREAMING_LABEL.width() + 1);
            let mut line = String::from(STREAMING_LABEL);
            line.push_str(&tail_within(&flat, budget));
            if *cursor {
                line.push(CURSOR);
            }
            Some(line)
        }
        Frame::Final { .. } | Frame::Cleared | Frame::Status(_) => None,
    }
}

fn tail_within(text: &str, columns: usize) -> String {
    let mut used = 0;
    let mut start = text.len();
    for (idx, c) in text.char_indices().rev() {
        let w = c.width().unwrap_or(0);
        if used + w > columns {
            break;
        }
        used += w;
        start = idx;
    }
    text[start..].to_owned()
}

/// Utility functions for the annotation server.
///
/// Position/offset conversion between LSP coordinates and the byte offsets
/// used by the parser, plus client logging.
use tower_lsp::lsp_types::*;

use crate::Backend;
use crate::types::Span;

impl Backend {
    /// Convert an LSP Position (line, character) to a byte offset in content.
    pub(crate) fn position_to_offset(content: &str, position: Position) -> u32 {
        let mut offset: u32 = 0;
        for (i, line) in content.split('\n').enumerate() {
            if i == position.line as usize {
                // Characters are counted as Unicode scalar values; PHP
                // sources are overwhelmingly ASCII.
                let byte_col = line
                    .char_indices()
                    .nth(position.character as usize)
                    .map(|(idx, _)| idx)
                    .unwrap_or(line.len());
                return offset + byte_col as u32;
            }
            // +1 for the newline character
            offset += line.len() as u32 + 1;
        }
        content.len() as u32
    }

    /// Convert a byte offset in content to an LSP Position.
    pub(crate) fn offset_to_position(content: &str, offset: u32) -> Position {
        let offset = (offset as usize).min(content.len());
        let mut line = 0u32;
        let mut line_start = 0usize;
        for (idx, byte) in content.as_bytes()[..offset].iter().enumerate() {
            if *byte == b'\n' {
                line += 1;
                line_start = idx + 1;
            }
        }
        let character = content
            .get(line_start..offset)
            .map(|s| s.chars().count())
            .unwrap_or(offset - line_start);
        Position {
            line,
            character: character as u32,
        }
    }

    pub(crate) fn span_to_range(content: &str, span: Span) -> Range {
        Range {
            start: Self::offset_to_position(content, span.start),
            end: Self::offset_to_position(content, span.end),
        }
    }

    pub(crate) async fn log(&self, typ: MessageType, message: String) {
        if let Some(client) = &self.client {
            client.log_message(typ, message).await;
        }
    }
}

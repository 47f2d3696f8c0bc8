//! Line-based document chunking.

use serde::{Deserialize, Serialize};

/// A contiguous, 1-indexed inclusive line range of a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Zero-based position in the chunk list
    pub index: usize,
    pub start_line: usize,
    pub end_line: usize,
    pub text: String,
}

/// Model commentary on one chunk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkSummary {
    pub index: usize,
    pub start_line: usize,
    pub end_line: usize,
    pub summary: String,
}

impl ChunkSummary {
    pub fn new(chunk: &Chunk, summary: impl Into<String>) -> Self {
        Self {
            index: chunk.index,
            start_line: chunk.start_line,
            end_line: chunk.end_line,
            summary: summary.into(),
        }
    }
}

/// Partition `content` into runs of at most `chunk_size` lines.
///
/// The chunks cover every line exactly once and joining their texts with
/// `"\n"` gives back `content`. A document that is a single empty line has
/// no chunks.
pub fn split_into_chunks(content: &str, chunk_size: usize) -> Vec<Chunk> {
    let lines: Vec<&str> = content.split('\n').collect();
    if lines.len() == 1 && lines[0].is_empty() {
        return Vec::new();
    }

    let size = chunk_size.max(1);
    lines
        .chunks(size)
        .enumerate()
        .map(|(index, slice)| {
            let start_line = index * size + 1;
            Chunk {
                index,
                start_line,
                end_line: start_line + slice.len() - 1,
                text: slice.join("\n"),
            }
        })
        .collect()
}

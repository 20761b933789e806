/// Splits a block into sub-blocks of at most `granularity` frames.
///
/// Sub-blocks start on multiples of the granularity, which is exactly where
/// quantized events land, so every event in the block gets a decision point.
#[derive(Debug, Clone)]
pub struct SubBlocks {
    frames: usize,
    granularity: usize,
    cursor: usize,
}

impl SubBlocks {
    pub fn new(frames: usize, granularity: usize) -> Self {
        Self {
            frames,
            granularity: granularity.max(1),
            cursor: 0,
        }
    }
}

impl Iterator for SubBlocks {
    /// `(start, len)`
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.frames {
            return None;
        }
        let start = self.cursor;
        let len = self.granularity.min(self.frames - start);
        self.cursor += len;
        Some((start, len))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.frames.saturating_sub(self.cursor).div_ceil(self.granularity);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SubBlocks {}

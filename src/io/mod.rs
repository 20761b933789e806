// Purpose - external interfaces, format conversions

pub mod converter;
pub mod midi;

/// Input channels handed to every voice. Synths without audio inputs can
/// pass an empty set, or use the channels for global modulation sources.
#[derive(Debug, Default, Clone)]
pub struct AudioInput {
    pub buffers: Vec<Vec<f32>>,
}

/// Output channels. Voices accumulate into these; the engine zeroes them at
/// the start of every block.
#[derive(Debug, Default, Clone)]
pub struct AudioOutput {
    pub buffers: Vec<Vec<f32>>,
}

impl AudioInput {
    pub fn with_channels(channels: usize, frames: usize) -> Self {
        Self {
            buffers: vec![vec![0.0; frames]; channels],
        }
    }

    pub fn channels(&self) -> usize {
        self.buffers.len()
    }
}

impl AudioOutput {
    pub fn with_channels(channels: usize, frames: usize) -> Self {
        Self {
            buffers: vec![vec![0.0; frames]; channels],
        }
    }

    pub fn channels(&self) -> usize {
        self.buffers.len()
    }

    /// Shortest channel length, i.e. how many frames can safely be written.
    pub fn capacity(&self) -> usize {
        self.buffers.iter().map(Vec::len).min().unwrap_or(0)
    }

    /// Zero the first `frames` samples of every channel.
    pub fn clear(&mut self, frames: usize) {
        for channel in &mut self.buffers {
            let end = frames.min(channel.len());
            channel[..end].fill(0.0);
        }
    }
}

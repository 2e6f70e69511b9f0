//! A sequence of frame snapshots stored as one binary file.

use std::path::Path;

use serde::{Deserialize, Serialize};
use weft_types::{WeftError, WeftResult};

use crate::snapshot::FrameSnapshot;

/// Magic prefix of a recording file.
const MAGIC: &[u8; 4] = b"WEFT";

/// Format version written after the magic.
const VERSION: u32 = 1;

/// All recorded frames of one simulation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactRecording {
    /// Name of the scenario that produced the recording.
    pub scenario: String,
    pub frames: Vec<FrameSnapshot>,
}

/// Aggregate statistics over a recording.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RecordingStats {
    pub frames: usize,
    pub particles: usize,
    pub total_contacts: usize,
    pub max_penetration: f32,
    /// Frame with the most contacts, if any frame has one.
    pub busiest_frame: Option<u32>,
}

impl ContactRecording {
    pub fn new(scenario: impl Into<String>) -> Self {
        Self {
            scenario: scenario.into(),
            frames: Vec::new(),
        }
    }

    pub fn push(&mut self, frame: FrameSnapshot) {
        self.frames.push(frame);
    }

    pub fn stats(&self) -> RecordingStats {
        let busiest = self
            .frames
            .iter()
            .filter(|f| !f.contacts.is_empty())
            .max_by_key(|f| f.contacts.len());
        RecordingStats {
            frames: self.frames.len(),
            particles: self.frames.first().map_or(0, FrameSnapshot::particle_count),
            total_contacts: self.frames.iter().map(|f| f.contacts.len()).sum(),
            max_penetration: self.frames.iter().map(FrameSnapshot::max_penetration).fold(0.0, f32::max),
            busiest_frame: busiest.map(|f| f.frame),
        }
    }

    /// Serializes to binary: magic, version, then the bincode payload.
    pub fn to_bytes(&self) -> WeftResult<Vec<u8>> {
        let payload = bincode::serialize(self)
            .map_err(|e| WeftError::Serialization(format!("recording encode failed: {e}")))?;
        let mut out = Vec::with_capacity(payload.len() + 8);
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&VERSION.to_le_bytes());
        out.extend_from_slice(&payload);
        Ok(out)
    }

    /// Deserializes from binary produced by [`ContactRecording::to_bytes`].
    pub fn from_bytes(data: &[u8]) -> WeftResult<Self> {
        if data.len() < 8 || data[..4] != MAGIC[..] {
            return Err(WeftError::Serialization("not a weft contact recording".into()));
        }
        let mut version = [0u8; 4];
        version.copy_from_slice(&data[4..8]);
        let version = u32::from_le_bytes(version);
        if version != VERSION {
            return Err(WeftError::Serialization(format!(
                "unsupported recording version {version} (expected {VERSION})"
            )));
        }
        bincode::deserialize(&data[8..])
            .map_err(|e| WeftError::Serialization(format!("recording decode failed: {e}")))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> WeftResult<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_bytes()?)?;
        tracing::debug!(path = %path.display(), frames = self.frames.len(), "recording_saved");
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> WeftResult<Self> {
        let data = std::fs::read(path)?;
        Self::from_bytes(&data)
    }
}

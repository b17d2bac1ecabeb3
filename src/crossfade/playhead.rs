use crate::transport::TransportSnapshot;

/// What changed in the host transport since the previous block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportEvent {
    None,
    /// The playhead is not where continuous playback would have put it.
    Jump,
    /// Playback started.
    Restart,
}

/// Predicts where the playhead should be next block and flags deviations.
#[derive(Debug, Clone, Default)]
pub struct PlayheadTracker {
    expected_ppq: Option<f64>,
    was_playing: bool,
}

impl PlayheadTracker {
    /// Deviation, in samples, tolerated before a jump is reported.
    pub const JUMP_THRESHOLD_SAMPLES: f64 = 2.0;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.expected_ppq = None;
        self.was_playing = false;
    }

    pub fn observe(&mut self, transport: &TransportSnapshot, num_samples: usize) -> TransportEvent {
        let playing = transport.is_locked();
        let beats_per_sample = transport.beats_per_sample();

        let event = if playing && !self.was_playing {
            TransportEvent::Restart
        } else if playing {
            match self.expected_ppq {
                Some(expected)
                    if (transport.ppq_position - expected).abs()
                        > Self::JUMP_THRESHOLD_SAMPLES * beats_per_sample =>
                {
                    TransportEvent::Jump
                }
                _ => TransportEvent::None,
            }
        } else {
            TransportEvent::None
        };

        self.was_playing = playing;
        self.expected_ppq = playing
            .then(|| transport.ppq_position + num_samples as f64 * beats_per_sample);
        event
    }
}

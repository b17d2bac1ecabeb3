/// Transport information as the host reports it. Every field may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HostTransport {
    pub bpm: Option<f64>,
    /// Playhead in quarter notes.
    pub ppq_position: Option<f64>,
    pub time_samples: Option<i64>,
    pub time_seconds: Option<f64>,
    pub is_playing: bool,
}

/// Resolved transport for one block. Always complete; missing host data is
/// replaced with a stopped transport at the default tempo.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransportSnapshot {
    pub bpm: f64,
    /// Playhead in quarter notes at the first sample of the block.
    pub ppq_position: f64,
    pub time_samples: i64,
    pub time_seconds: f64,
    pub is_playing: bool,
    /// Output delay the plugin reports to the host.
    pub latency_samples: u32,
    pub sample_rate: f64,
    pub has_transport: bool,
}

impl TransportSnapshot {
    pub const DEFAULT_BPM: f64 = 120.0;

    pub fn free_running(sample_rate: f64) -> Self {
        Self {
            bpm: Self::DEFAULT_BPM,
            ppq_position: 0.0,
            time_samples: 0,
            time_seconds: 0.0,
            is_playing: false,
            latency_samples: 0,
            sample_rate: sample_rate.max(1.0),
            has_transport: false,
        }
    }

    pub fn from_host(host: Option<&HostTransport>, sample_rate: f64, latency_samples: u32) -> Self {
        let mut snapshot = Self::free_running(sample_rate);
        snapshot.latency_samples = latency_samples;

        let Some(host) = host else {
            return snapshot;
        };

        let sample_rate = snapshot.sample_rate;
        let bpm = host
            .bpm
            .filter(|bpm| bpm.is_finite() && *bpm > 0.0)
            .unwrap_or(Self::DEFAULT_BPM);
        let beats_per_second = bpm / 60.0;

        let time_seconds = host
            .time_seconds
            .filter(|s| s.is_finite())
            .or_else(|| host.time_samples.map(|s| s as f64 / sample_rate))
            .or_else(|| {
                host.ppq_position
                    .filter(|p| p.is_finite())
                    .map(|p| p / beats_per_second)
            })
            .unwrap_or(0.0);
        let time_samples = host
            .time_samples
            .unwrap_or_else(|| (time_seconds * sample_rate).round() as i64);
        let ppq_position = host
            .ppq_position
            .filter(|p| p.is_finite())
            .unwrap_or(time_seconds * beats_per_second);

        snapshot.bpm = bpm;
        snapshot.ppq_position = ppq_position;
        snapshot.time_samples = time_samples;
        snapshot.time_seconds = time_seconds;
        snapshot.is_playing = host.is_playing;
        snapshot.has_transport = true;
        snapshot
    }

    #[inline]
    pub fn beats_per_sample(&self) -> f64 {
        self.bpm / 60.0 / self.sample_rate
    }

    #[inline]
    pub fn latency_beats(&self) -> f64 {
        self.latency_samples as f64 * self.beats_per_sample()
    }

    /// Playhead of the audio the listener hears right now, i.e. shifted back
    /// by the reported latency.
    #[inline]
    pub fn compensated_ppq(&self) -> f64 {
        self.ppq_position - self.latency_beats()
    }

    /// Whether tempo-synced generators should lock to the playhead.
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.has_transport && self.is_playing
    }

    /// Snapshot for a position `samples` later in the same block.
    pub fn advanced(&self, samples: usize) -> Self {
        if !self.is_playing || samples == 0 {
            return *self;
        }
        let mut next = *self;
        next.ppq_position += samples as f64 * self.beats_per_sample();
        next.time_samples += samples as i64;
        next.time_seconds += samples as f64 / self.sample_rate;
        next
    }
}

impl Default for TransportSnapshot {
    fn default() -> Self {
        Self::free_running(48_000.0)
    }
}

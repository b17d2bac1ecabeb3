use once_cell::sync::Lazy;

/// A musical note length, e.g. "1/4" (one beat) or "1/8T" (a third of a beat).
#[derive(Debug, Clone, PartialEq)]
pub struct BeatDivision {
    pub label: String,
    /// Length in quarter notes.
    pub beats: f64,
}

static BEAT_DIVISIONS: Lazy<Vec<BeatDivision>> = Lazy::new(build_divisions);

fn build_divisions() -> Vec<BeatDivision> {
    // (numerator, denominator) of a whole note
    const BASES: [(u32, u32); 9] = [
        (8, 1),
        (4, 1),
        (2, 1),
        (1, 1),
        (1, 2),
        (1, 4),
        (1, 8),
        (1, 16),
        (1, 32),
    ];

    let mut divisions = Vec::with_capacity(BASES.len() * 3);
    for (num, den) in BASES {
        let beats = 4.0 * num as f64 / den as f64;
        divisions.push(BeatDivision {
            label: format!("{}/{}.", num, den),
            beats: beats * 1.5,
        });
        divisions.push(BeatDivision {
            label: format!("{}/{}", num, den),
            beats,
        });
        divisions.push(BeatDivision {
            label: format!("{}/{}T", num, den),
            beats: beats * 2.0 / 3.0,
        });
    }
    divisions.sort_by(|a, b| b.beats.total_cmp(&a.beats));
    divisions
}

/// All divisions, longest first.
pub fn beat_divisions() -> &'static [BeatDivision] {
    &BEAT_DIVISIONS
}

impl BeatDivision {
    pub fn count() -> usize {
        BEAT_DIVISIONS.len()
    }

    /// Length in quarter notes for a table index; out-of-range indices clamp.
    pub fn beats_at(index: usize) -> f64 {
        let divisions = beat_divisions();
        divisions[index.min(divisions.len() - 1)].beats
    }

    pub fn find(label: &str) -> Option<usize> {
        beat_divisions().iter().position(|d| d.label == label)
    }

    /// Index of a plain quarter note.
    pub fn quarter_index() -> usize {
        Self::find("1/4").unwrap_or(0)
    }
}

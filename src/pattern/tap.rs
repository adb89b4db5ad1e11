// Tap - One recorded gesture of a tap pattern
// Phases and durations are fractions of one cycle

/// A recorded gesture
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tap {
    /// Onset relative to the recording start, in [0, 1)
    pub on_phase: f64,
    pub velocity: f64,
    /// Held length in cycles; provisional `1 - on_phase` until released
    pub duration: f64,
}

impl Tap {
    /// New tap assumed to be held until the end of the cycle
    pub fn new(on_phase: f64, velocity: f64) -> Self {
        Self {
            on_phase,
            velocity,
            duration: 1.0 - on_phase,
        }
    }

    /// Phase of the release edge
    pub fn off_phase(&self) -> f64 {
        self.on_phase + self.duration
    }
}

/// Recorder/player state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PatternState {
    /// Nothing recorded, or stopped
    #[default]
    Idle,
    /// Taps are being captured; playback starts at the next cycle start
    Recording,
    /// Playing: next scheduled edge is a tap onset or the loop boundary
    WaitingForOn,
    /// Playing: next scheduled edge is the release of the current tap
    WaitingForOff,
}

impl PatternState {
    pub fn is_playing(&self) -> bool {
        matches!(self, PatternState::WaitingForOn | PatternState::WaitingForOff)
    }
}

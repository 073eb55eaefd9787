//! Shared transcript fixtures for tests and examples.

pub mod interview_1 {
    /// Two-speaker interview with diarized labels, a mid-session label
    /// format switch, an auto-caption credit line and cross-cue sentence
    /// carry-over.
    pub const VTT: &str = include_str!("../interview_1/transcript.vtt");
}

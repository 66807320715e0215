//! lecture-speech: the speech synthesis driver (SPEC_FULL.md §4.4).
//!
//! Submits narration text to a [`provider::SynthesisProvider`], polls it on a
//! fixed tick until a terminal state or an overall deadline, then renames the
//! provider's provisional artifact into its canonical key. Side-effectful
//! only through the artifact store — it never touches registry state, so a
//! caller can retry a whole stage without this crate leaving partial state
//! behind.

pub mod driver;
pub mod error;
pub mod provider;

pub use driver::{PollingPolicy, SpeechSynthesisDriver};
pub use error::{SpeechError, SpeechResult};
pub use provider::{SynthesisFormat, SynthesisProvider, SynthesisStatus, SynthesisTaskId};

//! Voice and haptic capabilities

use tracing::{debug, info, warn};

use crate::scheduler::Announcement;
use crate::AlertError;

/// Speech synthesis. `interrupt` cuts off any utterance in progress.
pub trait VoiceOutput: Send {
    fn is_supported(&self) -> bool;

    fn speak(&mut self, text: &str, interrupt: bool) -> Result<(), AlertError>;
}

/// Vibration motor
pub trait HapticOutput: Send {
    fn is_supported(&self) -> bool;

    fn vibrate(&mut self, pattern: &[u64]) -> Result<(), AlertError>;
}

/// Voice that writes utterances to the log
#[derive(Debug, Default)]
pub struct LogVoice;

impl VoiceOutput for LogVoice {
    fn is_supported(&self) -> bool {
        true
    }

    fn speak(&mut self, text: &str, interrupt: bool) -> Result<(), AlertError> {
        info!(interrupt, "Speaking: {}", text);
        Ok(())
    }
}

/// Haptics that write patterns to the log
#[derive(Debug, Default)]
pub struct LogHaptics;

impl HapticOutput for LogHaptics {
    fn is_supported(&self) -> bool {
        true
    }

    fn vibrate(&mut self, pattern: &[u64]) -> Result<(), AlertError> {
        info!("Vibrating: {:?}", pattern);
        Ok(())
    }
}

/// Device without a vibration motor
#[derive(Debug, Default)]
pub struct NoHaptics;

impl HapticOutput for NoHaptics {
    fn is_supported(&self) -> bool {
        false
    }

    fn vibrate(&mut self, _pattern: &[u64]) -> Result<(), AlertError> {
        Ok(())
    }
}

/// Routes announcements to whichever capabilities the device has.
///
/// Support is queried once at construction; a missing capability is skipped
/// silently.
pub struct AlertDispatcher {
    voice: Box<dyn VoiceOutput>,
    haptics: Box<dyn HapticOutput>,
    voice_supported: bool,
    haptics_supported: bool,
}

impl AlertDispatcher {
    pub fn new(voice: Box<dyn VoiceOutput>, haptics: Box<dyn HapticOutput>) -> Self {
        let voice_supported = voice.is_supported();
        let haptics_supported = haptics.is_supported();
        if !voice_supported {
            warn!("Speech output not available");
        }
        if !haptics_supported {
            debug!("Vibration not available");
        }
        Self {
            voice,
            haptics,
            voice_supported,
            haptics_supported,
        }
    }

    /// Speak and vibrate. Both outputs are attempted; the first failure is
    /// returned.
    pub fn dispatch(&mut self, announcement: &Announcement) -> Result<(), AlertError> {
        let spoken = if self.voice_supported {
            self.voice.speak(&announcement.message, announcement.interrupt)
        } else {
            Ok(())
        };

        let vibrated = if self.haptics_supported && !announcement.vibration.is_empty() {
            self.haptics.vibrate(&announcement.vibration)
        } else {
            Ok(())
        };

        spoken.and(vibrated)
    }
}

impl Default for AlertDispatcher {
    fn default() -> Self {
        Self::new(Box::new(LogVoice), Box::new(LogHaptics))
    }
}

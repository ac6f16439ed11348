use crate::config::DetectorConfig;
use crate::core::clipboard::source::{Generation, GenerationProbe};
use crate::shared::types::WatcherSignal;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};

/// Out-of-band reasons to sample soon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorTrigger {
    /// ⌘C or ⌘X was seen by the global key monitor
    CopyChord,
}

/// True for ⌘C / ⌘X. `characters` is the key's text ignoring modifiers.
pub fn is_copy_chord(command_held: bool, characters: &str) -> bool {
    command_held && (characters.eq_ignore_ascii_case("c") || characters.eq_ignore_ascii_case("x"))
}

/// Turns clipboard generation changes into [`WatcherSignal`]s.
///
/// The generation at construction is the baseline, so content that was
/// already on the clipboard at startup never produces a signal.
pub struct ChangeDetector<P: GenerationProbe> {
    probe: P,
    last_seen: Option<Generation>,
    consecutive_errors: u32,
}

impl<P: GenerationProbe> ChangeDetector<P> {
    pub fn new(mut probe: P) -> Self {
        let last_seen = match probe.generation() {
            Ok(generation) => Some(generation),
            Err(e) => {
                log::warn!("[ChangeDetector] Could not read initial generation: {}", e);
                None
            }
        };
        Self {
            probe,
            last_seen,
            consecutive_errors: 0,
        }
    }

    /// Read the generation once. Returns a signal when it moved since the
    /// last successful read.
    pub fn sample(&mut self) -> Option<WatcherSignal> {
        match self.probe.generation() {
            Ok(generation) => {
                self.consecutive_errors = 0;
                match self.last_seen.replace(generation) {
                    Some(previous) if previous != generation => Some(WatcherSignal),
                    // first successful read after a failed prime becomes the baseline
                    _ => None,
                }
            }
            Err(e) => {
                self.consecutive_errors += 1;
                if self.consecutive_errors == 1 || self.consecutive_errors % 10 == 0 {
                    log::warn!(
                        "[ChangeDetector] Failed to read clipboard generation (error #{}): {}",
                        self.consecutive_errors,
                        e
                    );
                }
                None
            }
        }
    }

    /// Sample every `poll_interval` and `settle_delay` after each trigger
    /// until the signal receiver goes away.
    ///
    /// Triggers that arrive while a settle is pending push it back, so a burst
    /// of chords costs one sample.
    pub async fn run(
        mut self,
        config: DetectorConfig,
        mut triggers: mpsc::UnboundedReceiver<DetectorTrigger>,
        signals: mpsc::UnboundedSender<WatcherSignal>,
    ) {
        let mut poll = tokio::time::interval(config.poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // interval fires immediately; the baseline was taken in `new`
        poll.tick().await;

        let settle = tokio::time::sleep(config.settle_delay);
        tokio::pin!(settle);
        let mut settle_armed = false;
        let mut triggers_open = true;

        log::info!(
            "[ChangeDetector] Started (poll {:?}, settle {:?})",
            config.poll_interval,
            config.settle_delay
        );

        loop {
            tokio::select! {
                _ = signals.closed() => break,
                trigger = triggers.recv(), if triggers_open => {
                    match trigger {
                        Some(DetectorTrigger::CopyChord) => {
                            settle.as_mut().reset(Instant::now() + config.settle_delay);
                            settle_armed = true;
                        }
                        None => {
                            log::debug!("[ChangeDetector] Trigger source closed, polling only");
                            triggers_open = false;
                        }
                    }
                    continue;
                }
                _ = &mut settle, if settle_armed => {
                    settle_armed = false;
                }
                _ = poll.tick() => {}
            }

            if let Some(signal) = self.sample() {
                if signals.send(signal).is_err() {
                    break;
                }
            }
        }

        log::info!("[ChangeDetector] Stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::errors::{CommandError, CommandResult};
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Clone, Default)]
    struct FakeProbe {
        count: Arc<AtomicU64>,
        failing: Arc<AtomicBool>,
    }

    impl FakeProbe {
        fn bump(&self) {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl GenerationProbe for FakeProbe {
        fn generation(&mut self) -> CommandResult<Generation> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(CommandError::ClipboardError("pasteboard busy".to_string()));
            }
            Ok(Generation(self.count.load(Ordering::SeqCst)))
        }
    }

    fn config() -> DetectorConfig {
        DetectorConfig {
            settle_delay: Duration::from_millis(50),
            poll_interval: Duration::from_secs(1),
        }
    }

    #[test]
    fn test_copy_chord() {
        assert!(is_copy_chord(true, "c"));
        assert!(is_copy_chord(true, "X"));
        assert!(!is_copy_chord(false, "c"));
        assert!(!is_copy_chord(true, "v"));
    }

    #[test]
    fn test_no_signal_for_startup_content() {
        let probe = FakeProbe::default();
        probe.count.store(42, Ordering::SeqCst);

        let mut detector = ChangeDetector::new(probe);
        assert_eq!(detector.sample(), None);
    }

    #[test]
    fn test_signal_once_per_change() {
        let probe = FakeProbe::default();
        let mut detector = ChangeDetector::new(probe.clone());

        probe.bump();
        assert_eq!(detector.sample(), Some(WatcherSignal));
        assert_eq!(detector.sample(), None);

        // several changes between samples collapse into one signal
        probe.bump();
        probe.bump();
        assert_eq!(detector.sample(), Some(WatcherSignal));
    }

    #[test]
    fn test_errors_do_not_signal() {
        let probe = FakeProbe::default();
        let mut detector = ChangeDetector::new(probe.clone());

        probe.failing.store(true, Ordering::SeqCst);
        probe.bump();
        for _ in 0..12 {
            assert_eq!(detector.sample(), None);
        }

        probe.failing.store(false, Ordering::SeqCst);
        assert_eq!(detector.sample(), Some(WatcherSignal));
    }

    #[test]
    fn test_failed_prime_takes_first_read_as_baseline() {
        let probe = FakeProbe::default();
        probe.failing.store(true, Ordering::SeqCst);
        let mut detector = ChangeDetector::new(probe.clone());

        probe.failing.store(false, Ordering::SeqCst);
        assert_eq!(detector.sample(), None);
        probe.bump();
        assert_eq!(detector.sample(), Some(WatcherSignal));
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_picks_up_change() {
        let probe = FakeProbe::default();
        let detector = ChangeDetector::new(probe.clone());
        let (_trigger_tx, trigger_rx) = mpsc::unbounded_channel();
        let (signal_tx, mut signal_rx) = mpsc::unbounded_channel();
        tokio::spawn(detector.run(config(), trigger_rx, signal_tx));

        probe.bump();
        let signal = tokio::time::timeout(Duration::from_millis(1500), signal_rx.recv())
            .await
            .unwrap();
        assert_eq!(signal, Some(WatcherSignal));
    }

    #[tokio::test(start_paused = true)]
    async fn test_chord_samples_after_settle_delay() {
        let probe = FakeProbe::default();
        let detector = ChangeDetector::new(probe.clone());
        let (trigger_tx, trigger_rx) = mpsc::unbounded_channel();
        let (signal_tx, mut signal_rx) = mpsc::unbounded_channel();
        tokio::spawn(detector.run(config(), trigger_rx, signal_tx));

        let started = Instant::now();
        probe.bump();
        trigger_tx.send(DetectorTrigger::CopyChord).unwrap();

        let signal = tokio::time::timeout(Duration::from_millis(200), signal_rx.recv())
            .await
            .unwrap();
        assert_eq!(signal, Some(WatcherSignal));
        assert!(started.elapsed() >= Duration::from_millis(50));
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_quiet_clipboard_stays_silent() {
        let probe = FakeProbe::default();
        let detector = ChangeDetector::new(probe.clone());
        let (trigger_tx, trigger_rx) = mpsc::unbounded_channel();
        let (signal_tx, mut signal_rx) = mpsc::unbounded_channel();
        tokio::spawn(detector.run(config(), trigger_rx, signal_tx));

        trigger_tx.send(DetectorTrigger::CopyChord).unwrap();
        let waited = tokio::time::timeout(Duration::from_millis(2500), signal_rx.recv()).await;
        assert!(waited.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_when_receiver_dropped() {
        let detector = ChangeDetector::new(FakeProbe::default());
        let (_trigger_tx, trigger_rx) = mpsc::unbounded_channel();
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(detector.run(config(), trigger_rx, signal_tx));

        drop(signal_rx);
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }
}

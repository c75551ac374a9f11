use crate::error::TranscriptionError;
use crate::session::typing::TypingSession;
use crate::session::CompletionEvent;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;

/// Turns recorded audio into text
pub trait Transcriber: fmt::Debug + Send + Sync + 'static {
    fn transcribe(&self, audio: &[u8]) -> Result<String, TranscriptionError>;
}

/// A transcription running on a worker thread, polled from the event loop
#[derive(Debug)]
pub struct PendingTranscription {
    rx: Receiver<Result<String, TranscriptionError>>,
    cancelled: Arc<AtomicBool>,
    done: bool,
}

pub fn start_transcription(transcriber: Arc<dyn Transcriber>, audio: Vec<u8>) -> PendingTranscription {
    let (tx, rx) = mpsc::channel();
    let cancelled = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancelled);

    std::thread::spawn(move || {
        let result = transcriber.transcribe(&audio);
        if !flag.load(Ordering::SeqCst) {
            // receiver may be gone already
            let _ = tx.send(result);
        }
    });

    PendingTranscription {
        rx,
        cancelled,
        done: false,
    }
}

impl PendingTranscription {
    /// `None` while the worker is still busy. Yields the outcome exactly once.
    pub fn poll(&mut self) -> Option<Result<String, TranscriptionError>> {
        if self.done {
            return None;
        }
        if self.cancelled.load(Ordering::SeqCst) {
            self.done = true;
            return Some(Err(TranscriptionError::Cancelled));
        }
        match self.rx.try_recv() {
            Ok(result) => {
                self.done = true;
                Some(result)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.done = true;
                Some(Err(TranscriptionError::Disconnected))
            }
        }
    }

    /// Block until the worker finishes
    pub fn wait(mut self) -> Result<String, TranscriptionError> {
        if let Some(result) = self.poll() {
            return result;
        }
        self.rx.recv().unwrap_or(Err(TranscriptionError::Disconnected))
    }

    /// Discard whatever the worker produces
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Append a finished transcript to the typing input.
/// Failures are logged and leave the typed text untouched.
pub fn apply_transcript(
    session: &mut TypingSession,
    result: Result<String, TranscriptionError>,
) -> Result<Option<CompletionEvent>, TranscriptionError> {
    match result {
        Ok(text) => Ok(session.append_transcript(&text)),
        Err(e) => {
            log::warn!("speech input dropped: {e}");
            Err(e)
        }
    }
}

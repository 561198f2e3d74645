// ============================================================================
// PALETTE SCAN — unique-colour extraction on a background thread
// ============================================================================
//
// The worker receives its own copy of the composited image, so the canvas is
// never shared with it. Each request carries a token; a newer request makes
// every older result stale, and stale results are dropped when polled.
// ============================================================================

use std::collections::HashSet;
use std::sync::mpsc;

use image::{Rgba, RgbaImage};
use tracing::{debug, warn};

use crate::error::CoreError;

/// What a colour scan produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ColourScanOutcome {
    /// Unique colours in order of first appearance (row-major).
    Completed(Vec<Rgba<u8>>),
    /// The image holds more than this many colours; the scan stopped early.
    ExceededMaximum(usize),
    /// The worker went away without reporting a result.
    Interrupted,
}

/// Collect the distinct colours of `img`, giving up once more than `max_colours` are found.
pub fn unique_colours(img: &RgbaImage, max_colours: usize) -> ColourScanOutcome {
    let mut seen: HashSet<[u8; 4]> = HashSet::new();
    let mut ordered = Vec::new();
    for px in img.pixels() {
        if seen.insert(px.0) {
            if ordered.len() == max_colours {
                return ColourScanOutcome::ExceededMaximum(max_colours);
            }
            ordered.push(*px);
        }
    }
    ColourScanOutcome::Completed(ordered)
}

struct ScanResult {
    token: u64,
    outcome: ColourScanOutcome,
}

/// Handle to the (at most one) live colour-scan worker.
pub struct ColourScanner {
    max_colours: usize,
    max_pixels: u64,
    token: u64,
    receiver: Option<mpsc::Receiver<ScanResult>>,
}

impl ColourScanner {
    pub fn new(max_colours: usize, max_pixels: u64) -> Self {
        Self { max_colours, max_pixels, token: 0, receiver: None }
    }

    pub fn is_running(&self) -> bool {
        self.receiver.is_some()
    }

    /// Start scanning `image`, superseding any scan still running.
    pub fn request(&mut self, image: RgbaImage) -> Result<(), CoreError> {
        let (width, height) = image.dimensions();
        if width as u64 * height as u64 > self.max_pixels {
            return Err(CoreError::ImageTooLarge { width, height, max_pixels: self.max_pixels });
        }

        self.token = self.token.wrapping_add(1);
        let token = self.token;
        let max_colours = self.max_colours;
        let (tx, rx) = mpsc::channel();
        self.receiver = Some(rx);
        debug!(token, width, height, "starting colour scan");

        std::thread::spawn(move || {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                unique_colours(&image, max_colours)
            }));
            // A panicking scan sends nothing; the poller sees the disconnect.
            if let Ok(outcome) = result {
                let _ = tx.send(ScanResult { token, outcome });
            }
        });
        Ok(())
    }

    /// Non-blocking check for the current scan's result.
    pub fn poll(&mut self) -> Option<ColourScanOutcome> {
        let rx = self.receiver.as_ref()?;
        match rx.try_recv() {
            Ok(result) if result.token == self.token => {
                self.receiver = None;
                Some(result.outcome)
            }
            Ok(stale) => {
                debug!(token = stale.token, "dropping stale colour scan result");
                None
            }
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => {
                warn!("colour scan worker exited without a result");
                self.receiver = None;
                Some(ColourScanOutcome::Interrupted)
            }
        }
    }

    /// Block until the current scan reports. Used by tests and headless callers.
    pub fn wait(&mut self) -> Option<ColourScanOutcome> {
        let rx = self.receiver.take()?;
        match rx.recv() {
            Ok(result) => Some(result.outcome),
            Err(_) => Some(ColourScanOutcome::Interrupted),
        }
    }
}

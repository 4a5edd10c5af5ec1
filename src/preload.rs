//! Background image preloading (native only)
//!
//! `PreloadThread` probes high-resolution sources on a worker thread so the
//! frame loop never blocks on disk I/O. Only the header is decoded: the viewer
//! needs the natural size, not the pixels.

use std::collections::HashSet;
use std::path::Path;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use folio_viewer::{PreloadResult, Size, ViewerError};

/// Finished preload, as reported back to the frame loop.
#[derive(Debug)]
pub struct PreloadOutcome {
    pub url: String,
    pub result: PreloadResult,
}

enum ThreadMessage {
    Probe(String),
    Shutdown,
}

pub struct PreloadThread {
    request_tx: Sender<ThreadMessage>,
    result_rx: Receiver<PreloadOutcome>,
    thread_handle: Option<JoinHandle<()>>,
    pending: HashSet<String>,
}

impl PreloadThread {
    pub fn spawn() -> std::io::Result<Self> {
        let (request_tx, request_rx) = mpsc::channel::<ThreadMessage>();
        let (result_tx, result_rx) = mpsc::channel::<PreloadOutcome>();

        let thread_handle = thread::Builder::new()
            .name("image-preload".to_string())
            .spawn(move || {
                log::debug!("Preload thread started");
                Self::thread_loop(request_rx, result_tx);
                log::debug!("Preload thread exiting");
            })?;

        log::info!("Native preload thread spawned");

        Ok(Self {
            request_tx,
            result_rx,
            thread_handle: Some(thread_handle),
            pending: HashSet::new(),
        })
    }

    fn thread_loop(request_rx: Receiver<ThreadMessage>, result_tx: Sender<PreloadOutcome>) {
        while let Ok(ThreadMessage::Probe(url)) = request_rx.recv() {
            let result = Self::probe(&url);
            if result_tx.send(PreloadOutcome { url, result }).is_err() {
                log::warn!("Result channel closed, preload thread exiting");
                break;
            }
        }
    }

    /// Read the natural size of the image at `url` (a local path).
    fn probe(url: &str) -> PreloadResult {
        match image::image_dimensions(Path::new(url)) {
            Ok((width, height)) => {
                log::debug!("Probed {}: {}x{}", url, width, height);
                Ok(Size::new(width as f32, height as f32))
            }
            Err(e) => Err(ViewerError::Preload {
                url: url.to_string(),
                message: e.to_string(),
            }),
        }
    }

    /// Queue `url` for probing. Duplicate pending requests are dropped.
    pub fn request(&mut self, url: String) {
        if !self.pending.insert(url.clone()) {
            return;
        }
        if self.request_tx.send(ThreadMessage::Probe(url)).is_err() {
            log::error!("Failed to send preload request: channel closed");
        }
    }

    /// Take one finished preload without blocking.
    pub fn take_one_result(&mut self) -> Option<PreloadOutcome> {
        match self.result_rx.try_recv() {
            Ok(outcome) => Some(self.finish(outcome)),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                log::warn!("Preload thread disconnected");
                None
            }
        }
    }

    /// Wait up to `timeout` for one finished preload.
    pub fn wait_one_result(&mut self, timeout: Duration) -> Option<PreloadOutcome> {
        match self.result_rx.recv_timeout(timeout) {
            Ok(outcome) => Some(self.finish(outcome)),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                log::warn!("Preload thread disconnected");
                None
            }
        }
    }

    fn finish(&mut self, outcome: PreloadOutcome) -> PreloadOutcome {
        self.pending.remove(&outcome.url);
        outcome
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, url: &str) -> bool {
        self.pending.contains(url)
    }
}

impl Drop for PreloadThread {
    fn drop(&mut self) {
        log::debug!("Shutting down preload thread");
        let _ = self.request_tx.send(ThreadMessage::Shutdown);
        if let Some(handle) = self.thread_handle.take() {
            if let Err(e) = handle.join() {
                log::warn!("Preload thread panicked: {:?}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WAIT: Duration = Duration::from_secs(5);

    #[test]
    fn test_probe_reports_dimensions() {
        let dir = std::env::temp_dir().join(format!("folio-preload-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir");
        let path = dir.join("hero.png");
        image::RgbaImage::new(12, 7).save(&path).expect("write png");
        let url = path.to_string_lossy().into_owned();

        let mut thread = PreloadThread::spawn().expect("spawn");
        thread.request(url.clone());
        thread.request(url.clone());
        assert_eq!(thread.pending_count(), 1);
        assert!(thread.is_pending(&url));

        let outcome = thread.wait_one_result(WAIT).expect("result");
        assert_eq!(outcome.url, url);
        assert_eq!(outcome.result.expect("probe ok"), Size::new(12.0, 7.0));
        assert_eq!(thread.pending_count(), 0);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_file_reports_error() {
        let mut thread = PreloadThread::spawn().expect("spawn");
        thread.request("/nonexistent/folio/missing.jpg".to_string());
        let outcome = thread.wait_one_result(WAIT).expect("result");
        assert!(matches!(outcome.result, Err(ViewerError::Preload { .. })));
    }

    #[test]
    fn test_no_result_without_request() {
        let mut thread = PreloadThread::spawn().expect("spawn");
        assert!(thread.take_one_result().is_none());
    }
}

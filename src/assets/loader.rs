use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::scene_graph::ModelTemplate;

/// Anything that can turn a url into a template. Runs on a loader thread.
pub trait ModelSource: Send + Sync + 'static {
    fn load(&self, url: &str) -> anyhow::Result<ModelTemplate>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadTicket(u64);

#[derive(Debug, Clone)]
pub enum LoadStatus {
    Pending,
    Loaded(Arc<ModelTemplate>),
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct LoadEvent {
    pub ticket: LoadTicket,
    pub url: String,
    pub status: LoadStatus,
}

type Completion = (LoadTicket, String, anyhow::Result<ModelTemplate>);

/// Loads models in worker threads. Only the most recent request is ever delivered.
pub struct AssetLoader {
    source: Arc<dyn ModelSource>,
    sender: Sender<Completion>,
    receiver: Receiver<Completion>,
    next_ticket: u64,
    latest: Option<(LoadTicket, String)>,
    delivered: Option<LoadEvent>,
}

impl AssetLoader {
    pub fn new(source: impl ModelSource) -> Self {
        let (sender, receiver) = channel();

        Self {
            source: Arc::new(source),
            sender,
            receiver,
            next_ticket: 0,
            latest: None,
            delivered: None,
        }
    }

    /// Starts loading `url`, superseding any request still in flight.
    pub fn request(&mut self, url: &str) -> LoadTicket {
        let ticket = LoadTicket(self.next_ticket);
        self.next_ticket += 1;

        if let Some((_, previous)) = self.latest.replace((ticket, url.to_string())) {
            log::debug!("Load of {} superseded by {}", previous, url);
        }

        let source = Arc::clone(&self.source);
        let sender = self.sender.clone();
        let url = url.to_string();

        thread::spawn(move || {
            let result = source.load(&url);
            // The loader may be gone by now, which is fine.
            let _ = sender.send((ticket, url, result));
        });

        ticket
    }

    /// Stops listening for the outstanding request.
    pub fn cancel(&mut self) {
        if let Some((_, url)) = self.latest.take() {
            log::debug!("Cancelled load of {}", url);
        }
    }

    pub fn pending(&self) -> Option<LoadTicket> {
        self.latest.as_ref().map(|(ticket, _)| *ticket)
    }

    /// `Pending` while in flight, the outcome once delivered. `None` for superseded,
    /// cancelled or unknown tickets.
    pub fn status(&self, ticket: LoadTicket) -> Option<LoadStatus> {
        if self.pending() == Some(ticket) {
            return Some(LoadStatus::Pending);
        }
        self.delivered
            .as_ref()
            .filter(|event| event.ticket == ticket)
            .map(|event| event.status.clone())
    }

    /// Non-blocking. Returns the completion of the latest request if it has arrived.
    pub fn poll(&mut self) -> Option<LoadEvent> {
        while let Ok(completion) = self.receiver.try_recv() {
            if let Some(event) = self.accept(completion) {
                return Some(event);
            }
        }
        None
    }

    /// Blocks up to `timeout` for the latest request to finish.
    pub fn wait(&mut self, timeout: Duration) -> Option<LoadEvent> {
        let deadline = Instant::now() + timeout;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.receiver.recv_timeout(remaining) {
                Ok(completion) => {
                    if let Some(event) = self.accept(completion) {
                        return Some(event);
                    }
                }
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => return None,
            }
        }
    }

    fn accept(&mut self, (ticket, url, result): Completion) -> Option<LoadEvent> {
        if self.pending() != Some(ticket) {
            log::debug!("Discarding stale load result for {}", url);
            return None;
        }
        self.latest = None;

        let status = match result {
            Ok(template) => LoadStatus::Loaded(Arc::new(template)),
            Err(e) => LoadStatus::Failed(format!("{:#}", e)),
        };

        let event = LoadEvent {
            ticket,
            url,
            status,
        };
        self.delivered = Some(event.clone());
        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene_graph::primitives;
    use glam::Vec3;

    /// Builds a room for any url except "missing", after an optional delay.
    struct RoomSource {
        slow_url: &'static str,
        delay: Duration,
    }

    impl ModelSource for RoomSource {
        fn load(&self, url: &str) -> anyhow::Result<ModelTemplate> {
            if url == self.slow_url {
                thread::sleep(self.delay);
            }
            if url == "missing" {
                anyhow::bail!("no such model: {}", url);
            }
            Ok(primitives::room(url, Vec3::splat(2.0)))
        }
    }

    fn loader() -> AssetLoader {
        AssetLoader::new(RoomSource {
            slow_url: "slow",
            delay: Duration::from_millis(150),
        })
    }

    #[test]
    fn delivers_loaded_template() {
        let mut loader = loader();
        let ticket = loader.request("house");
        assert!(matches!(loader.status(ticket), Some(LoadStatus::Pending)));

        let event = loader.wait(Duration::from_secs(5)).expect("load should finish");
        assert_eq!(event.ticket, ticket);
        assert_eq!(event.url, "house");
        assert!(matches!(event.status, LoadStatus::Loaded(ref t) if t.name == "house"));
        assert!(loader.pending().is_none());
        assert!(matches!(loader.status(ticket), Some(LoadStatus::Loaded(_))));
    }

    #[test]
    fn reports_failures_with_url() {
        let mut loader = loader();
        let ticket = loader.request("missing");

        let event = loader.wait(Duration::from_secs(5)).unwrap();
        match event.status {
            LoadStatus::Failed(reason) => assert!(reason.contains("missing")),
            other => panic!("expected failure, got {:?}", other),
        }
        assert!(matches!(loader.status(ticket), Some(LoadStatus::Failed(_))));
    }

    #[test]
    fn latest_request_wins() {
        let mut loader = loader();
        let superseded = loader.request("slow");
        let latest = loader.request("fast");

        let event = loader.wait(Duration::from_secs(5)).unwrap();
        assert_eq!(event.ticket, latest);
        assert_eq!(event.url, "fast");

        // The superseded load still completes and is dropped.
        assert!(loader.wait(Duration::from_millis(400)).is_none());
        assert!(loader.status(superseded).is_none());
    }

    #[test]
    fn cancelled_request_is_never_delivered() {
        let mut loader = loader();
        loader.request("slow");
        loader.cancel();

        assert!(loader.pending().is_none());
        assert!(loader.wait(Duration::from_millis(400)).is_none());
        assert!(loader.poll().is_none());
    }
}

use crate::engine::{ClientEvent, VenueClient};
use crate::error::ClientError;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{info, warn};
use venue_core::{
    ErrorCode, PeerId, PublishFeedRequest, SettingsUpdate, SignalKind, VolumeLevels,
};

/// Requests from the host to a running client.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientCommand {
    /// Something changed server-side; exchange soon.
    Notify,
    Send {
        to: PeerId,
        kind: SignalKind,
        payload: String,
    },
    Candidate {
        to: PeerId,
        candidate: String,
    },
    SetMute(bool),
    RaiseHand(bool),
    SendVolume(VolumeLevels),
    Publish {
        publish: bool,
        feed: Option<String>,
    },
    Leave,
}

/// Cheap handle for talking to a spawned client.
#[derive(Clone)]
pub struct ClientHandle {
    commands: mpsc::UnboundedSender<ClientCommand>,
}

impl ClientHandle {
    /// Returns false once the client task has stopped.
    pub fn send(&self, command: ClientCommand) -> bool {
        self.commands.send(command).is_ok()
    }

    pub fn notify(&self) -> bool {
        self.send(ClientCommand::Notify)
    }

    pub fn set_mute(&self, mute: bool) -> bool {
        self.send(ClientCommand::SetMute(mute))
    }

    pub fn raise_hand(&self, raised: bool) -> bool {
        self.send(ClientCommand::RaiseHand(raised))
    }

    pub fn publish(&self, feed: Option<String>) -> bool {
        self.send(ClientCommand::Publish {
            publish: true,
            feed,
        })
    }

    pub fn unpublish(&self) -> bool {
        self.send(ClientCommand::Publish {
            publish: false,
            feed: None,
        })
    }

    pub fn leave(&self) -> bool {
        self.send(ClientCommand::Leave)
    }
}

impl VenueClient {
    /// Moves the client onto its own task.
    pub fn spawn(self) -> (ClientHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(self.run(rx));
        (ClientHandle { commands: tx }, task)
    }

    /// Drives the client until it leaves, is evicted or every handle is
    /// dropped.
    pub async fn run(mut self, mut commands: mpsc::UnboundedReceiver<ClientCommand>) {
        let mut poll = tokio::time::interval(self.config.poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let deadline = self.throttle.deadline();
            tokio::select! {
                command = commands.recv() => match command {
                    Some(ClientCommand::Leave) | None => {
                        self.shutdown().await;
                        break;
                    }
                    Some(command) => self.handle_command(command).await,
                },
                _ = poll.tick() => self.request_exchange(),
                _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    if !self.fire().await {
                        break;
                    }
                }
            }
        }

        info!("Venue client for peer {} stopped", self.peer_id);
    }

    fn request_exchange(&mut self) {
        self.throttle.request(Instant::now());
    }

    /// Runs the scheduled exchange. Returns false when the client must stop.
    async fn fire(&mut self) -> bool {
        self.throttle.fire(Instant::now());

        match self.exchange_once().await {
            Ok(_) => {
                self.failures = 0;
                if !self.outbox.is_empty() {
                    self.request_exchange();
                }
                true
            }
            Err(e) if e.is_gone() => {
                warn!("Peer {} is gone from the venue: {}", self.peer_id, e);
                self.close_all();
                self.emit(ClientEvent::Evicted);
                false
            }
            Err(_) => {
                self.failures = self.failures.saturating_add(1);
                let delay = self.config.backoff(self.failures);
                self.throttle.backoff(Instant::now(), delay);
                true
            }
        }
    }

    async fn handle_command(&mut self, command: ClientCommand) {
        let peer_id = self.peer_id;
        let result = match command {
            ClientCommand::Notify => Ok(()),
            ClientCommand::Send { to, kind, payload } => {
                self.queue(to, kind, payload);
                Ok(())
            }
            ClientCommand::Candidate { to, candidate } => {
                self.queue_candidate(to, candidate);
                Ok(())
            }
            ClientCommand::SetMute(mute) => self
                .transport
                .update_settings(peer_id, SettingsUpdate::mute(mute))
                .await
                .map(drop),
            ClientCommand::RaiseHand(raised) => {
                self.transport.raise_hand(peer_id, raised).await.map(drop)
            }
            ClientCommand::SendVolume(levels) => {
                self.transport.send_volume(peer_id, levels).await.map(drop)
            }
            ClientCommand::Publish { publish, feed } => self
                .transport
                .publish_feed(peer_id, PublishFeedRequest { publish, feed })
                .await
                .map(drop),
            ClientCommand::Leave => Ok(()),
        };

        match result {
            Err(ClientError::Rejected {
                code: ErrorCode::FeedBusy,
                ..
            }) => self.emit(ClientEvent::FeedBusy),
            Err(e) => warn!("Command for peer {} failed: {}", peer_id, e),
            Ok(()) => {}
        }
        self.request_exchange();
    }

    /// Closes the peer server-side so roommates tear down at once, then
    /// removes it. Leftovers are reclaimed by the presence sweeper.
    async fn shutdown(&mut self) {
        self.close_all();
        if let Err(e) = self
            .transport
            .update_settings(self.peer_id, SettingsUpdate::close())
            .await
        {
            warn!("Closing peer {} failed: {}", self.peer_id, e);
        }
        if let Err(e) = self.transport.leave(self.peer_id).await {
            warn!("Leaving as peer {} failed: {}", self.peer_id, e);
        }
        self.emit(ClientEvent::Left);
    }
}

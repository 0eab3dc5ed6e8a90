use crate::engine::VenueClient;
use crate::error::ClientError;
use tracing::{debug, warn};
use venue_core::ExchangeRequest;

impl VenueClient {
    /// One exchange round trip: push the outbox, consume new signals and
    /// reconcile connections with the returned snapshot. Returns the number
    /// of signals handled.
    ///
    /// On failure the outbox is restored so the next call resends it.
    pub async fn exchange_once(&mut self) -> Result<usize, ClientError> {
        let messages = std::mem::take(&mut self.outbox);
        let req = ExchangeRequest {
            messages: messages.clone(),
            lastsignal: self.checkpoint,
        };

        let response = match self.transport.exchange(self.peer_id, req).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Exchange failed for peer {}: {}", self.peer_id, e);
                let queued_meanwhile = std::mem::replace(&mut self.outbox, messages);
                self.outbox.extend(queued_meanwhile);
                return Err(e);
            }
        };

        let mut handled = 0;
        for envelope in response.messages {
            if envelope.id <= self.checkpoint {
                debug!("Skipping already consumed signal {}", envelope.id);
                continue;
            }
            self.checkpoint = envelope.id;
            self.handle_signal(envelope).await;
            handled += 1;
        }

        self.reconcile(response.peers, response.settings).await;
        Ok(handled)
    }
}

//! Network actor - runs HTTP requests in the Tokio async runtime

use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::messages::{NetworkCommand, NetworkResponse};
use crate::network::client::{create_client, execute_request};

/// Network actor that processes HTTP request commands.
///
/// Every request runs in its own task, so a slow call never blocks the next
/// one. Ordering of the replies is not guaranteed.
pub struct NetworkActor {
    client: reqwest::Client,
    response_tx: mpsc::UnboundedSender<NetworkResponse>,
    active_requests: JoinSet<()>,
}

impl NetworkActor {
    pub fn new(response_tx: mpsc::UnboundedSender<NetworkResponse>) -> Self {
        Self::with_client(create_client(), response_tx)
    }

    pub fn with_client(
        client: reqwest::Client,
        response_tx: mpsc::UnboundedSender<NetworkResponse>,
    ) -> Self {
        NetworkActor {
            client,
            response_tx,
            active_requests: JoinSet::new(),
        }
    }

    /// Run the network actor message loop
    pub async fn run(mut self, mut cmd_rx: mpsc::UnboundedReceiver<NetworkCommand>) {
        loop {
            tokio::select! {
                biased;

                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(NetworkCommand::Execute { id, request }) => {
                            let response_tx = self.response_tx.clone();
                            let client = self.client.clone();

                            self.active_requests.spawn(async move {
                                tracing::info!(id, url = %request.url, method = %request.method, "Executing request");
                                let reply = match execute_request(&client, &request).await {
                                    Ok(response) => {
                                        tracing::info!(id, status = response.status_code, elapsed_ms = response.elapsed_ms, "Request completed");
                                        NetworkResponse::Success { id, response }
                                    }
                                    Err(error) => {
                                        tracing::warn!(id, %error, "Request failed");
                                        NetworkResponse::Failure { id, error }
                                    }
                                };
                                let _ = response_tx.send(reply);
                            });
                        }

                        Some(NetworkCommand::Shutdown) | None => {
                            self.active_requests.abort_all();
                            break;
                        }
                    }
                }

                Some(_result) = self.active_requests.join_next() => {}
            }
        }
    }
}

//! App actor - message loop processing UI events and network responses

use tokio::sync::mpsc;

use crate::app::state::AppState;
use crate::messages::{NetworkCommand, NetworkResponse, RenderState, UiEvent};
use crate::storage::Storage;

/// App actor that processes UI events and network responses
pub struct AppActor {
    state: AppState,
    network_tx: mpsc::UnboundedSender<NetworkCommand>,
    render_tx: mpsc::UnboundedSender<RenderState>,
}

impl AppActor {
    pub fn new(
        storage: Storage,
        network_tx: mpsc::UnboundedSender<NetworkCommand>,
        render_tx: mpsc::UnboundedSender<RenderState>,
    ) -> Self {
        AppActor {
            state: AppState::new(storage),
            network_tx,
            render_tx,
        }
    }

    /// Run the actor message loop
    pub async fn run(
        mut self,
        mut ui_rx: mpsc::UnboundedReceiver<UiEvent>,
        mut net_rx: mpsc::UnboundedReceiver<NetworkResponse>,
    ) {
        // Send initial render state
        let _ = self.render_tx.send(self.state.to_render_state());

        loop {
            tokio::select! {
                Some(event) = ui_rx.recv() => {
                    if self.handle_ui_event(event) {
                        // Quit signal received
                        let _ = self.network_tx.send(NetworkCommand::Shutdown);
                        break;
                    }
                    let _ = self.render_tx.send(self.state.to_render_state());
                }
                Some(response) = net_rx.recv() => {
                    self.state.handle_response(response);
                    let _ = self.render_tx.send(self.state.to_render_state());
                }
                else => break,
            }
        }
    }

    /// Handle a UI event, returns true if quit was requested
    fn handle_ui_event(&mut self, event: UiEvent) -> bool {
        // A fresh notice per event; handlers set it again when needed.
        self.state.status_message = None;

        match event {
            // Request editor
            UiEvent::SetMethod(method) => self.state.set_method(method),
            UiEvent::SetUrl(url) => self.state.set_url(url),
            UiEvent::SetHeaders(text) => self.state.set_headers(text),
            UiEvent::SetBody(body) => self.state.set_body(body),
            UiEvent::SendRequest => {
                let cmd = self.state.begin_send();
                let _ = self.network_tx.send(cmd);
            }

            // Search
            UiEvent::Search(query) => {
                self.state.search(&query);
            }
            UiEvent::NextMatch => self.state.next_match(),
            UiEvent::PrevMatch => self.state.prev_match(),
            UiEvent::ClearSearch => self.state.clear_search(),

            // Response tools
            UiEvent::JsonQuery(path) => self.state.run_json_query(&path),
            UiEvent::CopyResponse(reply) => {
                let _ = reply.send(self.state.copy_text());
            }

            // Workspace tree
            UiEvent::CreateWorkspace(name) => self.state.create_workspace(&name),
            UiEvent::CreateCollection(name) => self.state.create_collection(&name),
            UiEvent::SelectWorkspace(name) => self.state.select_workspace(&name),
            UiEvent::SelectCollection(name) => self.state.select_collection(&name),

            // Saved requests
            UiEvent::SaveRequest => self.state.save_current_request(),
            UiEvent::LoadRequest(idx) => self.state.load_request(idx),
            UiEvent::RenameRequest { index, name } => self.state.rename_request(index, &name),
            UiEvent::DeleteRequest(idx) => self.state.delete_request(idx),

            // Postman
            UiEvent::ImportPostman(data) => self.state.import_postman(&data),
            UiEvent::ExportPostman(reply) => {
                let _ = reply.send(self.state.export_postman());
            }

            // System
            UiEvent::Quit => return true,
        }

        false
    }
}

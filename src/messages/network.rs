//! Network messages - communication between App and Network layers

use crate::error::Error;
use crate::headers::HeaderList;
use crate::models::{HttpMethod, HttpResponse};

/// A request as composed in the editor, ready to send.
#[derive(Debug, Clone, Default)]
pub struct OutgoingRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HeaderList,
    pub body: String,
}

/// Commands sent from App layer to Network layer
#[derive(Debug, Clone)]
pub enum NetworkCommand {
    /// Execute an HTTP request
    Execute { id: u64, request: OutgoingRequest },
    /// Shutdown the network actor
    Shutdown,
}

/// Responses sent from Network layer to App layer
#[derive(Debug)]
pub enum NetworkResponse {
    Success { id: u64, response: HttpResponse },
    Failure { id: u64, error: Error },
}

impl NetworkResponse {
    /// Get the request ID from the response
    pub fn id(&self) -> u64 {
        match self {
            NetworkResponse::Success { id, .. } => *id,
            NetworkResponse::Failure { id, .. } => *id,
        }
    }

    pub fn into_result(self) -> Result<HttpResponse, Error> {
        match self {
            NetworkResponse::Success { response, .. } => Ok(response),
            NetworkResponse::Failure { error, .. } => Err(error),
        }
    }
}

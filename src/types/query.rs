//! Request types for the HTTP surface

use serde::{Deserialize, Serialize};

/// Ask request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskRequest {
    /// The question to answer from the loaded document
    pub question: String,
}

//! Authorized-module listing returned by `GET /auth/modules`.

use serde::{Deserialize, Serialize};

/// One console module the signed-in user may open.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    pub id: i64,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleList {
    pub modules: Vec<Module>,
    pub total_records: i64,
}

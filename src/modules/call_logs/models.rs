use leadbase_db::RecordId;
use serde::{Deserialize, Serialize};

/// A row of the `call_logs` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallLog {
    pub id: RecordId,
    #[serde(default)]
    pub lead_id: Option<RecordId>,
    #[serde(default)]
    pub agent_name: Option<String>,
    #[serde(default)]
    pub call_type: Option<String>,
    #[serde(default)]
    pub call_summary: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Request model for logging a call against a lead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCallLog {
    pub lead_id: RecordId,
    pub agent_name: String,
    pub call_type: String,
    pub call_summary: String,
    pub tags: Vec<String>,
}

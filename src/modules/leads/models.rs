use leadbase_db::RecordId;
use serde::{Deserialize, Serialize};

/// A row of the `leads` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    /// Primary key assigned by the database
    pub id: RecordId,
    /// Owner name
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub property_address: Option<String>,
    /// Where the lead came from (scraper, import, manual entry)
    #[serde(default)]
    pub lead_source: Option<String>,
    #[serde(default)]
    pub data_enriched: bool,
    #[serde(default)]
    pub in_foreclosure: bool,
    #[serde(default)]
    pub lender_name: Option<String>,
}

/// Request model for inserting a lead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLead {
    pub name: String,
    pub phone: String,
    pub property_address: String,
    pub lead_source: String,
    pub data_enriched: bool,
    pub in_foreclosure: bool,
}

/// Partial update for a lead. Unset fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeadPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_enriched: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lender_name: Option<String>,
}

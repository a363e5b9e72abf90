pub mod models;

use leadbase_db::{DbResult, RecordId, SupabaseClient};

pub use models::{Lead, LeadPatch, NewLead};

pub const TABLE: &str = "leads";

/// Insert a lead and return the stored row.
pub async fn create(client: &SupabaseClient, lead: &NewLead) -> DbResult<Lead> {
    client.table(TABLE).insert(lead).execute().await?.first()
}

/// Fetch a lead by primary key.
pub async fn find(client: &SupabaseClient, id: &RecordId) -> DbResult<Lead> {
    client
        .table(TABLE)
        .select("*")
        .eq("id", id)
        .execute()
        .await?
        .first()
}

/// Apply `patch` to a lead and return the updated row.
pub async fn update(client: &SupabaseClient, id: &RecordId, patch: &LeadPatch) -> DbResult<Lead> {
    client
        .table(TABLE)
        .update(patch)
        .eq("id", id)
        .execute()
        .await?
        .first()
}

/// Delete a lead. Returns how many rows were removed.
pub async fn delete(client: &SupabaseClient, id: &RecordId) -> DbResult<usize> {
    let response = client.table(TABLE).delete().eq("id", id).execute().await?;
    Ok(response.data.len())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn patch_omits_unset_fields() {
        let patch = LeadPatch {
            data_enriched: Some(true),
            ..LeadPatch::default()
        };
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({"data_enriched": true})
        );
    }

    #[test]
    fn row_tolerates_nulls_and_extra_columns() {
        let lead: Lead = serde_json::from_value(json!({
            "id": "0190c7a4-5b9e-7cc1-8f43-3f1a3c0f9b11",
            "name": "Ryan Test",
            "phone": null,
            "created_at": "2026-10-16T12:00:00Z",
            "in_foreclosure": true
        }))
        .unwrap();
        assert_eq!(lead.name, "Ryan Test");
        assert!(lead.phone.is_none());
        assert!(!lead.data_enriched);
        assert!(lead.in_foreclosure);
    }
}

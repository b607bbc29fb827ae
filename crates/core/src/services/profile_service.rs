use serde_json::json;
use std::sync::Arc;

use crate::backend::traits::RemoteTable;
use crate::errors::CoreError;
use crate::models::profile::Profile;
use crate::models::session::Session;

const PROFILES_TABLE: &str = "profiles";

/// Reads and updates the signed-in user's profile row.
pub struct ProfileService {
    backend: Arc<dyn RemoteTable>,
}

impl ProfileService {
    pub fn new(backend: Arc<dyn RemoteTable>) -> Self {
        Self { backend }
    }

    /// The session user's profile, or `None` if the row does not exist yet.
    pub async fn fetch(&self, session: &Session) -> Result<Option<Profile>, CoreError> {
        let row = self
            .backend
            .select_by_id(PROFILES_TABLE, session.user_id(), Some(session))
            .await?;
        row.map(|r| {
            serde_json::from_value::<Profile>(r)
                .map_err(|e| CoreError::MalformedRow(format!("{PROFILES_TABLE}: {e}")))
        })
        .transpose()
    }

    /// Set the display name; blank names clear it.
    pub async fn update_display_name(
        &self,
        session: &Session,
        display_name: &str,
    ) -> Result<Profile, CoreError> {
        let trimmed = display_name.trim();
        let value = if trimmed.is_empty() { None } else { Some(trimmed) };
        let row = self
            .backend
            .update_by_id(
                PROFILES_TABLE,
                session.user_id(),
                json!({ "display_name": value }),
                Some(session),
            )
            .await?;
        let profile: Profile = serde_json::from_value(row)
            .map_err(|e| CoreError::MalformedRow(format!("{PROFILES_TABLE}: {e}")))?;
        tracing::info!(user_id = %profile.id, "profile updated");
        Ok(profile)
    }
}

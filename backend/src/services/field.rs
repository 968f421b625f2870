//! Field service: sessions of drawn fields and their irrigation state

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use shared::{Coordinate, FieldRecord, FieldSession, FieldStatus, Polygon};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::decision::DecisionSource;
use crate::error::{AppError, AppResult};
use crate::external::ImagePreview;

/// Session snapshot returned to clients
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub selected: Option<Uuid>,
    pub fields: Vec<FieldRecord>,
    pub map_center: Option<Coordinate>,
}

impl From<&FieldSession> for SessionView {
    fn from(session: &FieldSession) -> Self {
        Self {
            id: session.id,
            selected: session.selected,
            fields: session.fields().to_vec(),
            map_center: session.map_center(),
        }
    }
}

/// In-memory session store. Locks are never held across collaborator calls.
#[derive(Clone)]
pub struct FieldService {
    sessions: Arc<RwLock<HashMap<Uuid, FieldSession>>>,
    decisions: Arc<dyn DecisionSource>,
}

impl FieldService {
    /// Create a new FieldService instance
    pub fn new(decisions: Arc<dyn DecisionSource>) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            decisions,
        }
    }

    pub async fn create_session(&self) -> SessionView {
        let session = FieldSession::new();
        let view = SessionView::from(&session);
        self.sessions.write().await.insert(session.id, session);
        tracing::info!(session_id = %view.id, "Created session");
        view
    }

    pub async fn get_session(&self, session_id: Uuid) -> AppResult<SessionView> {
        let sessions = self.sessions.read().await;
        let session = sessions
            .get(&session_id)
            .ok_or_else(|| session_not_found(session_id))?;
        Ok(SessionView::from(session))
    }

    pub async fn delete_session(&self, session_id: Uuid) -> AppResult<()> {
        self.sessions
            .write()
            .await
            .remove(&session_id)
            .map(|_| tracing::info!(%session_id, "Deleted session"))
            .ok_or_else(|| session_not_found(session_id))
    }

    /// Add a drawn polygon to a session
    pub async fn add_field(&self, session_id: Uuid, polygon: Polygon) -> AppResult<FieldRecord> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(&session_id)
            .ok_or_else(|| session_not_found(session_id))?;

        let record = session.add_field(polygon).map_err(|e| {
            tracing::warn!(%session_id, error = %e, "Rejected field geometry");
            AppError::from(e)
        })?;
        tracing::info!(%session_id, field_id = %record.id, area = record.area, "Added field");
        Ok(record.clone())
    }

    pub async fn list_fields(&self, session_id: Uuid) -> AppResult<Vec<FieldRecord>> {
        let sessions = self.sessions.read().await;
        let session = sessions
            .get(&session_id)
            .ok_or_else(|| session_not_found(session_id))?;
        Ok(session.fields().to_vec())
    }

    pub async fn get_field(&self, session_id: Uuid, field_id: Uuid) -> AppResult<FieldRecord> {
        let sessions = self.sessions.read().await;
        let session = sessions
            .get(&session_id)
            .ok_or_else(|| session_not_found(session_id))?;
        session
            .get(field_id)
            .cloned()
            .ok_or_else(|| field_not_found(field_id))
    }

    /// Run the decision engine for a field and store the result. A failed
    /// decision leaves the record untouched.
    pub async fn fetch_field(&self, session_id: Uuid, field_id: Uuid) -> AppResult<FieldRecord> {
        let polygon = self.get_field(session_id, field_id).await?.polygon;

        let decision = self.decisions.decide_field(&polygon).await?;

        let mut sessions = self.sessions.write().await;
        let record = sessions
            .get_mut(&session_id)
            .ok_or_else(|| session_not_found(session_id))?
            .get_mut(field_id)
            .ok_or_else(|| field_not_found(field_id))?;
        record.record_decision(&decision);
        tracing::info!(
            %session_id,
            %field_id,
            irrigate = decision.irrigate,
            color = %record.display_color,
            "Fetched field data"
        );
        Ok(record.clone())
    }

    /// Dashboard summary; only available once the field has been fetched
    pub async fn field_status(&self, session_id: Uuid, field_id: Uuid) -> AppResult<FieldStatus> {
        self.get_field(session_id, field_id)
            .await?
            .status()
            .ok_or_else(|| AppError::Validation {
                field: "field_id".to_string(),
                message: "Field data has not been fetched yet".to_string(),
            })
    }

    pub async fn preview_field(&self, session_id: Uuid, field_id: Uuid) -> AppResult<ImagePreview> {
        let polygon = self.get_field(session_id, field_id).await?.polygon;
        self.decisions.preview_field(&polygon).await
    }

    /// Select the first field containing the point
    pub async fn select_at(&self, session_id: Uuid, point: Coordinate) -> AppResult<Option<Uuid>> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(&session_id)
            .ok_or_else(|| session_not_found(session_id))?;
        Ok(session.select_at(point))
    }

    pub async fn map_center(&self, session_id: Uuid) -> AppResult<Option<Coordinate>> {
        let sessions = self.sessions.read().await;
        let session = sessions
            .get(&session_id)
            .ok_or_else(|| session_not_found(session_id))?;
        Ok(session.map_center())
    }
}

fn session_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Session {}", id))
}

fn field_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Field {}", id))
}

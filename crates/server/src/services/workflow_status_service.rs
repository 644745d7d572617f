use crate::dtos::workflow_status_dto::{CreateWorkflowStatusDto, UpdateWorkflowStatusDto};
use crate::services::{apply_merge_patch, patch_pos_field};
use async_trait::async_trait;
use database::ordering::{self, PosConfig};
use database::workflow_status::{model::WorkflowStatus, repository::DynWorkflowStatusRepository};
use mongodb::bson::oid::ObjectId;
use serde_json::Value;
use std::sync::Arc;
use utils::{AppError, AppResult};

const WORKFLOW_STATUS_NOT_FOUND: &str = "The workflow status was not found";
const WRONG_WORKFLOW_STATUS_ID: &str = "Wrong workflow status ID";

pub type DynWorkflowStatusService = Arc<dyn WorkflowStatusServiceTrait + Send + Sync>;

#[async_trait]
pub trait WorkflowStatusServiceTrait {
    async fn create_status(&self, dto: CreateWorkflowStatusDto) -> AppResult<WorkflowStatus>;
    async fn get_statuses(&self) -> AppResult<Vec<WorkflowStatus>>;
    async fn get_status(&self, id: &str) -> AppResult<WorkflowStatus>;
    async fn update_status(&self, id: &str, dto: UpdateWorkflowStatusDto) -> AppResult<WorkflowStatus>;
    async fn partial_update_status(&self, id: &str, patch: Value) -> AppResult<WorkflowStatus>;
    async fn delete_status(&self, id: &str) -> AppResult<()>;
}

#[derive(Clone)]
pub struct WorkflowStatusService {
    repository: DynWorkflowStatusRepository,
    pos_config: PosConfig,
}

impl WorkflowStatusService {
    pub fn new(repository: DynWorkflowStatusRepository, pos_config: PosConfig) -> Self {
        Self { repository, pos_config }
    }

    fn parse_id(id: &str) -> AppResult<ObjectId> {
        ObjectId::parse_str(id).map_err(|_| AppError::NotFound(WORKFLOW_STATUS_NOT_FOUND.to_string()))
    }
}

#[async_trait]
impl WorkflowStatusServiceTrait for WorkflowStatusService {
    async fn create_status(&self, dto: CreateWorkflowStatusDto) -> AppResult<WorkflowStatus> {
        let statuses = self.repository.find_all_statuses().await?;
        let pos = ordering::assign_on_create(&ordering::siblings_of(&statuses), dto.pos, &self.pos_config)?;

        let status = WorkflowStatus {
            id: None,
            name: dto.name,
            color: dto.color,
            pos: Some(pos),
        };

        self.repository.insert_status(status).await
    }

    async fn get_statuses(&self) -> AppResult<Vec<WorkflowStatus>> {
        self.repository.find_all_statuses().await
    }

    async fn get_status(&self, id: &str) -> AppResult<WorkflowStatus> {
        let oid = Self::parse_id(id)?;

        self.repository
            .find_status_by_id(oid)
            .await?
            .ok_or_else(|| AppError::NotFound(WORKFLOW_STATUS_NOT_FOUND.to_string()))
    }

    async fn update_status(&self, id: &str, dto: UpdateWorkflowStatusDto) -> AppResult<WorkflowStatus> {
        let oid = Self::parse_id(id)?;
        if dto.id != id {
            return Err(AppError::BadRequest(WRONG_WORKFLOW_STATUS_ID.to_string()));
        }

        let mut status = self
            .repository
            .find_status_by_id(oid)
            .await?
            .ok_or_else(|| AppError::NotFound(WORKFLOW_STATUS_NOT_FOUND.to_string()))?;

        let statuses = self.repository.find_all_statuses().await?;
        ordering::validate_on_update(&ordering::siblings_of(&statuses), oid, dto.pos)?;

        status.name = dto.name;
        status.color = dto.color;
        status.pos = Some(dto.pos);

        self.repository.replace_status(&status).await?;

        Ok(status)
    }

    async fn partial_update_status(&self, id: &str, patch: Value) -> AppResult<WorkflowStatus> {
        let oid = Self::parse_id(id)?;

        let status = self
            .repository
            .find_status_by_id(oid)
            .await?
            .ok_or_else(|| AppError::NotFound(WORKFLOW_STATUS_NOT_FOUND.to_string()))?;

        let statuses = self.repository.find_all_statuses().await?;
        let patch_pos = patch_pos_field(&patch, "pos")?;
        ordering::validate_on_patch(&ordering::siblings_of(&statuses), oid, patch_pos)?;

        let mut merged: WorkflowStatus = apply_merge_patch(&status, &patch)?;
        merged.id = status.id;

        self.repository.replace_status(&merged).await?;

        Ok(merged)
    }

    async fn delete_status(&self, id: &str) -> AppResult<()> {
        let oid = Self::parse_id(id)?;

        if !self.repository.delete_status(oid).await? {
            return Err(AppError::NotFound(WORKFLOW_STATUS_NOT_FOUND.to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::InMemoryWorkflowStatusRepository;
    use serde_json::json;

    fn service(statuses: Vec<WorkflowStatus>) -> WorkflowStatusService {
        WorkflowStatusService::new(
            Arc::new(InMemoryWorkflowStatusRepository::with_statuses(statuses)),
            PosConfig::default(),
        )
    }

    fn status(name: &str, pos: i64) -> WorkflowStatus {
        WorkflowStatus {
            id: Some(ObjectId::new()),
            name: name.to_string(),
            color: Some("#ff0000".to_string()),
            pos: Some(pos),
        }
    }

    #[tokio::test]
    async fn create_into_empty_collection_assigns_start_val() {
        let created = service(vec![])
            .create_status(CreateWorkflowStatusDto {
                name: "New".to_string(),
                color: None,
                pos: None,
            })
            .await
            .unwrap();

        assert_eq!(created.pos, Some(0));
    }

    #[tokio::test]
    async fn create_auto_increments_past_existing_statuses() {
        let created = service(vec![status("Existing", 99999)])
            .create_status(CreateWorkflowStatusDto {
                name: "New".to_string(),
                color: None,
                pos: None,
            })
            .await
            .unwrap();

        assert_eq!(created.pos, Some(100009));
    }

    #[tokio::test]
    async fn create_after_sibling_at_i64_max_is_a_bad_request() {
        let result = service(vec![status("Edge", i64::MAX)])
            .create_status(CreateWorkflowStatusDto {
                name: "New".to_string(),
                color: None,
                pos: None,
            })
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn create_with_taken_pos_is_a_conflict() {
        let result = service(vec![status("Existing", 99999)])
            .create_status(CreateWorkflowStatusDto {
                name: "New".to_string(),
                color: None,
                pos: Some(99999),
            })
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn update_with_mismatched_body_id_is_a_bad_request() {
        let existing = status("Existing", 10);
        let path_id = existing.id.unwrap().to_hex();
        let result = service(vec![existing])
            .update_status(
                &path_id,
                UpdateWorkflowStatusDto {
                    id: ObjectId::new().to_hex(),
                    name: "Renamed".to_string(),
                    color: None,
                    pos: 10,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn update_keeping_own_pos_succeeds() {
        let existing = status("Existing", 10);
        let path_id = existing.id.unwrap().to_hex();
        let updated = service(vec![existing, status("Other", 20)])
            .update_status(
                &path_id,
                UpdateWorkflowStatusDto {
                    id: path_id.clone(),
                    name: "Renamed".to_string(),
                    color: None,
                    pos: 10,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.pos, Some(10));
    }

    #[tokio::test]
    async fn update_taking_another_statuses_pos_is_a_conflict() {
        let existing = status("Existing", 10);
        let path_id = existing.id.unwrap().to_hex();
        let result = service(vec![existing, status("Other", 20)])
            .update_status(
                &path_id,
                UpdateWorkflowStatusDto {
                    id: path_id.clone(),
                    name: "Renamed".to_string(),
                    color: None,
                    pos: 20,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn patch_without_pos_leaves_pos_untouched() {
        let existing = status("Existing", 10);
        let path_id = existing.id.unwrap().to_hex();
        let patched = service(vec![existing, status("Other", 20)])
            .partial_update_status(&path_id, json!({ "name": "Renamed" }))
            .await
            .unwrap();

        assert_eq!(patched.name, "Renamed");
        assert_eq!(patched.pos, Some(10));
    }

    #[tokio::test]
    async fn patch_with_pos_zero_is_conflict_checked() {
        let existing = status("Existing", 10);
        let path_id = existing.id.unwrap().to_hex();
        let result = service(vec![existing, status("Other", 0)])
            .partial_update_status(&path_id, json!({ "pos": 0 }))
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn get_with_malformed_id_is_not_found() {
        let result = service(vec![]).get_status("not-an-object-id").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}

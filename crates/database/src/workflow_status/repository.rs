use crate::{workflow_status::model::WorkflowStatus, Database};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use std::sync::Arc;
use utils::{AppError, AppResult};

pub type DynWorkflowStatusRepository = Arc<dyn WorkflowStatusRepositoryTrait + Send + Sync>;

// 主要用于Service中，表示提供了该Trait功能
#[async_trait]
pub trait WorkflowStatusRepositoryTrait {
    async fn find_all_statuses(&self) -> AppResult<Vec<WorkflowStatus>>;
    async fn find_status_by_id(&self, id: ObjectId) -> AppResult<Option<WorkflowStatus>>;
    async fn insert_status(&self, status: WorkflowStatus) -> AppResult<WorkflowStatus>;
    async fn replace_status(&self, status: &WorkflowStatus) -> AppResult<()>;
    async fn delete_status(&self, id: ObjectId) -> AppResult<bool>;
}

#[async_trait]
impl WorkflowStatusRepositoryTrait for Database {
    async fn find_all_statuses(&self) -> AppResult<Vec<WorkflowStatus>> {
        let cursor = self.workflow_statuses.find(doc! {}, None).await?;
        let statuses = cursor.try_collect().await?;

        Ok(statuses)
    }

    async fn find_status_by_id(&self, id: ObjectId) -> AppResult<Option<WorkflowStatus>> {
        let status = self.workflow_statuses.find_one(doc! { "_id": id }, None).await?;

        Ok(status)
    }

    async fn insert_status(&self, status: WorkflowStatus) -> AppResult<WorkflowStatus> {
        let result = self.workflow_statuses.insert_one(&status, None).await?;

        let mut created = status;
        created.id = result.inserted_id.as_object_id();

        Ok(created)
    }

    async fn replace_status(&self, status: &WorkflowStatus) -> AppResult<()> {
        let id = status
            .id
            .ok_or_else(|| AppError::InternalServerErrorWithContext("workflow status without id".to_string()))?;

        self.workflow_statuses
            .replace_one(doc! { "_id": id }, status, None)
            .await?;

        Ok(())
    }

    async fn delete_status(&self, id: ObjectId) -> AppResult<bool> {
        let result = self.workflow_statuses.delete_one(doc! { "_id": id }, None).await?;

        Ok(result.deleted_count > 0)
    }
}

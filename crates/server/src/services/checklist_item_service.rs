use crate::dtos::checklist_item_dto::{CreateChecklistItemDto, UpdateChecklistItemDto};
use crate::services::{apply_merge_patch, patch_pos_field};
use async_trait::async_trait;
use database::customer::{
    model::{ChecklistItem, Customer},
    repository::DynCustomerRepository,
};
use database::ordering::{self, PosConfig};
use mongodb::bson::oid::ObjectId;
use serde_json::Value;
use std::sync::Arc;
use utils::{AppError, AppResult};

const CHECKLIST_NOT_FOUND: &str = "The checklist was not found";
const CHECKLIST_ITEM_NOT_FOUND: &str = "The checklist item was not found";
const WRONG_CHECKLIST_ITEM_ID: &str = "Wrong checklist item ID";

pub type DynChecklistItemService = Arc<dyn ChecklistItemServiceTrait + Send + Sync>;

#[async_trait]
pub trait ChecklistItemServiceTrait {
    async fn create_item(&self, checklist_id: &str, dto: CreateChecklistItemDto) -> AppResult<ChecklistItem>;
    async fn get_items(&self, checklist_id: &str) -> AppResult<Vec<ChecklistItem>>;
    async fn get_item(&self, id: &str) -> AppResult<ChecklistItem>;
    async fn update_item(&self, id: &str, dto: UpdateChecklistItemDto) -> AppResult<ChecklistItem>;
    async fn partial_update_item(&self, id: &str, patch: Value) -> AppResult<ChecklistItem>;
    async fn delete_item(&self, id: &str) -> AppResult<()>;
}

#[derive(Clone)]
pub struct ChecklistItemService {
    repository: DynCustomerRepository,
    pos_config: PosConfig,
}

impl ChecklistItemService {
    pub fn new(repository: DynCustomerRepository, pos_config: PosConfig) -> Self {
        Self { repository, pos_config }
    }

    fn parse_id(id: &str) -> AppResult<ObjectId> {
        ObjectId::parse_str(id).map_err(|_| AppError::NotFound(CHECKLIST_ITEM_NOT_FOUND.to_string()))
    }

    /// 定位持有该item的客户文档
    async fn owner_of(&self, item_id: ObjectId) -> AppResult<Customer> {
        self.repository
            .find_customer_with_checklist_item(item_id)
            .await?
            .ok_or_else(|| AppError::NotFound(CHECKLIST_ITEM_NOT_FOUND.to_string()))
    }
}

#[async_trait]
impl ChecklistItemServiceTrait for ChecklistItemService {
    async fn create_item(&self, checklist_id: &str, dto: CreateChecklistItemDto) -> AppResult<ChecklistItem> {
        let checklist_oid =
            ObjectId::parse_str(checklist_id).map_err(|_| AppError::NotFound(CHECKLIST_NOT_FOUND.to_string()))?;

        let mut customer = self
            .repository
            .find_customer_with_checklist(checklist_oid)
            .await?
            .ok_or_else(|| AppError::NotFound(CHECKLIST_NOT_FOUND.to_string()))?;

        let checklist = customer
            .checklist_mut(checklist_oid)
            .ok_or_else(|| AppError::NotFound(CHECKLIST_NOT_FOUND.to_string()))?;

        let pos = ordering::assign_on_create(&ordering::siblings_of(&checklist.items), dto.pos, &self.pos_config)?;

        let item = ChecklistItem::new(dto.text, dto.checked.unwrap_or(false), pos);
        checklist.items.push(item.clone());
        checklist.touch();
        customer.touch();

        self.repository.save_customer(&customer).await?;

        Ok(item)
    }

    async fn get_items(&self, checklist_id: &str) -> AppResult<Vec<ChecklistItem>> {
        let checklist_oid =
            ObjectId::parse_str(checklist_id).map_err(|_| AppError::NotFound(CHECKLIST_NOT_FOUND.to_string()))?;

        let customer = self
            .repository
            .find_customer_with_checklist(checklist_oid)
            .await?
            .ok_or_else(|| AppError::NotFound(CHECKLIST_NOT_FOUND.to_string()))?;

        let checklist = customer
            .checklist(checklist_oid)
            .ok_or_else(|| AppError::NotFound(CHECKLIST_NOT_FOUND.to_string()))?;

        Ok(checklist.items.clone())
    }

    async fn get_item(&self, id: &str) -> AppResult<ChecklistItem> {
        let oid = Self::parse_id(id)?;
        let customer = self.owner_of(oid).await?;

        customer
            .checklist_with_item(oid)
            .and_then(|c| c.item(oid))
            .cloned()
            .ok_or_else(|| AppError::NotFound(CHECKLIST_ITEM_NOT_FOUND.to_string()))
    }

    async fn update_item(&self, id: &str, dto: UpdateChecklistItemDto) -> AppResult<ChecklistItem> {
        let oid = Self::parse_id(id)?;
        if dto.id != id {
            return Err(AppError::BadRequest(WRONG_CHECKLIST_ITEM_ID.to_string()));
        }

        let mut customer = self.owner_of(oid).await?;
        let checklist = customer
            .checklist_with_item_mut(oid)
            .ok_or_else(|| AppError::NotFound(CHECKLIST_ITEM_NOT_FOUND.to_string()))?;

        ordering::validate_on_update(&ordering::siblings_of(&checklist.items), oid, dto.pos)?;

        let item = checklist
            .item_mut(oid)
            .ok_or_else(|| AppError::NotFound(CHECKLIST_ITEM_NOT_FOUND.to_string()))?;
        item.text = dto.text;
        item.checked = dto.checked;
        item.pos = Some(dto.pos);
        item.touch();
        let updated = item.clone();
        checklist.touch();
        customer.touch();

        self.repository.save_customer(&customer).await?;

        Ok(updated)
    }

    async fn partial_update_item(&self, id: &str, patch: Value) -> AppResult<ChecklistItem> {
        let oid = Self::parse_id(id)?;

        let mut customer = self.owner_of(oid).await?;
        let checklist = customer
            .checklist_with_item_mut(oid)
            .ok_or_else(|| AppError::NotFound(CHECKLIST_ITEM_NOT_FOUND.to_string()))?;

        let patch_pos = patch_pos_field(&patch, "pos")?;
        ordering::validate_on_patch(&ordering::siblings_of(&checklist.items), oid, patch_pos)?;

        let item = checklist
            .item_mut(oid)
            .ok_or_else(|| AppError::NotFound(CHECKLIST_ITEM_NOT_FOUND.to_string()))?;

        let mut merged: ChecklistItem = apply_merge_patch(item, &patch)?;
        merged.id = item.id;
        merged.touch();
        *item = merged.clone();
        checklist.touch();
        customer.touch();

        self.repository.save_customer(&customer).await?;

        Ok(merged)
    }

    async fn delete_item(&self, id: &str) -> AppResult<()> {
        let oid = Self::parse_id(id)?;

        let mut customer = self.owner_of(oid).await?;
        let checklist = customer
            .checklist_with_item_mut(oid)
            .ok_or_else(|| AppError::NotFound(CHECKLIST_ITEM_NOT_FOUND.to_string()))?;
        checklist.items.retain(|i| i.id != oid);
        checklist.touch();
        customer.touch();

        self.repository.save_customer(&customer).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{empty_customer, InMemoryCustomerRepository};
    use database::Checklist;
    use serde_json::json;

    fn customer_with_checklist(items: Vec<ChecklistItem>) -> (Customer, ObjectId) {
        let mut customer = empty_customer(ObjectId::new());
        let mut checklist = Checklist::new("Visa".to_string(), 0);
        checklist.items = items;
        let checklist_id = checklist.id;
        customer.checklists.push(checklist);
        (customer, checklist_id)
    }

    fn service(customers: Vec<Customer>) -> ChecklistItemService {
        ChecklistItemService::new(
            Arc::new(InMemoryCustomerRepository::with_customers(customers)),
            PosConfig::default(),
        )
    }

    #[tokio::test]
    async fn create_auto_increments_within_the_checklist() {
        let (customer, checklist_id) = customer_with_checklist(vec![ChecklistItem::new(
            "Passport copy".to_string(),
            false,
            25,
        )]);

        let created = service(vec![customer])
            .create_item(
                &checklist_id.to_hex(),
                CreateChecklistItemDto {
                    text: "Police check".to_string(),
                    checked: None,
                    pos: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(created.pos, Some(35));
        assert!(!created.checked);
    }

    #[tokio::test]
    async fn create_with_taken_pos_is_a_conflict() {
        let (customer, checklist_id) = customer_with_checklist(vec![ChecklistItem::new(
            "Passport copy".to_string(),
            false,
            25,
        )]);

        let result = service(vec![customer])
            .create_item(
                &checklist_id.to_hex(),
                CreateChecklistItemDto {
                    text: "Police check".to_string(),
                    checked: None,
                    pos: Some(25),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn pos_is_scoped_per_checklist() {
        let mut customer = empty_customer(ObjectId::new());
        let mut first = Checklist::new("Visa".to_string(), 0);
        first.items.push(ChecklistItem::new("Passport copy".to_string(), false, 25));
        customer.checklists.push(first);
        let second = Checklist::new("Enrolment".to_string(), 10);
        let second_id = second.id.to_hex();
        customer.checklists.push(second);

        let created = service(vec![customer])
            .create_item(
                &second_id,
                CreateChecklistItemDto {
                    text: "CoE".to_string(),
                    checked: None,
                    pos: Some(25),
                },
            )
            .await
            .unwrap();

        assert_eq!(created.pos, Some(25));
    }

    #[tokio::test]
    async fn patch_toggles_checked_without_moving_the_item() {
        let item = ChecklistItem::new("Passport copy".to_string(), false, 25);
        let item_id = item.id.to_hex();
        let (customer, _) = customer_with_checklist(vec![item]);

        let patched = service(vec![customer])
            .partial_update_item(&item_id, json!({ "checked": true }))
            .await
            .unwrap();

        assert!(patched.checked);
        assert_eq!(patched.pos, Some(25));
    }

    #[tokio::test]
    async fn update_taking_a_siblings_pos_is_a_conflict() {
        let first = ChecklistItem::new("Passport copy".to_string(), false, 0);
        let second = ChecklistItem::new("Police check".to_string(), false, 10);
        let second_id = second.id.to_hex();
        let (customer, _) = customer_with_checklist(vec![first, second]);

        let result = service(vec![customer])
            .update_item(
                &second_id,
                UpdateChecklistItemDto {
                    id: second_id.clone(),
                    text: "Police check".to_string(),
                    checked: true,
                    pos: 0,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn delete_removes_only_the_target_item() {
        let first = ChecklistItem::new("Passport copy".to_string(), false, 0);
        let second = ChecklistItem::new("Police check".to_string(), false, 10);
        let first_id = first.id.to_hex();
        let (customer, checklist_id) = customer_with_checklist(vec![first, second]);

        let service = service(vec![customer]);
        service.delete_item(&first_id).await.unwrap();

        let remaining = service.get_items(&checklist_id.to_hex()).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].text, "Police check");
    }

    #[tokio::test]
    async fn create_under_unknown_checklist_is_not_found() {
        let result = service(vec![])
            .create_item(
                &ObjectId::new().to_hex(),
                CreateChecklistItemDto {
                    text: "Passport copy".to_string(),
                    checked: None,
                    pos: None,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}

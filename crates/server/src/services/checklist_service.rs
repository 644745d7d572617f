use crate::dtos::checklist_dto::{CreateChecklistDto, UpdateChecklistDto};
use crate::services::{apply_merge_patch, patch_pos_field};
use async_trait::async_trait;
use database::customer::{
    model::{Checklist, Customer},
    repository::DynCustomerRepository,
};
use database::ordering::{self, PosConfig};
use mongodb::bson::oid::ObjectId;
use serde_json::Value;
use std::sync::Arc;
use utils::{AppError, AppResult};

const CUSTOMER_NOT_FOUND: &str = "The customer was not found";
const CHECKLIST_NOT_FOUND: &str = "The checklist was not found";
const WRONG_CHECKLIST_ID: &str = "Wrong checklist ID";

pub type DynChecklistService = Arc<dyn ChecklistServiceTrait + Send + Sync>;

#[async_trait]
pub trait ChecklistServiceTrait {
    async fn create_checklist(&self, customer_id: &str, dto: CreateChecklistDto) -> AppResult<Checklist>;
    async fn get_checklists(&self, customer_id: &str) -> AppResult<Vec<Checklist>>;
    async fn get_checklist(&self, id: &str) -> AppResult<Checklist>;
    async fn update_checklist(&self, id: &str, dto: UpdateChecklistDto) -> AppResult<Checklist>;
    async fn partial_update_checklist(&self, id: &str, patch: Value) -> AppResult<Checklist>;
    async fn delete_checklist(&self, id: &str) -> AppResult<()>;
}

#[derive(Clone)]
pub struct ChecklistService {
    repository: DynCustomerRepository,
    pos_config: PosConfig,
}

impl ChecklistService {
    pub fn new(repository: DynCustomerRepository, pos_config: PosConfig) -> Self {
        Self { repository, pos_config }
    }

    fn parse_id(id: &str) -> AppResult<ObjectId> {
        ObjectId::parse_str(id).map_err(|_| AppError::NotFound(CHECKLIST_NOT_FOUND.to_string()))
    }

    /// 定位持有该checklist的客户文档
    async fn owner_of(&self, checklist_id: ObjectId) -> AppResult<Customer> {
        self.repository
            .find_customer_with_checklist(checklist_id)
            .await?
            .ok_or_else(|| AppError::NotFound(CHECKLIST_NOT_FOUND.to_string()))
    }
}

#[async_trait]
impl ChecklistServiceTrait for ChecklistService {
    async fn create_checklist(&self, customer_id: &str, dto: CreateChecklistDto) -> AppResult<Checklist> {
        let customer_oid =
            ObjectId::parse_str(customer_id).map_err(|_| AppError::NotFound(CUSTOMER_NOT_FOUND.to_string()))?;

        let mut customer = self
            .repository
            .find_customer_by_id(customer_oid)
            .await?
            .ok_or_else(|| AppError::NotFound(CUSTOMER_NOT_FOUND.to_string()))?;

        let pos = ordering::assign_on_create(&ordering::siblings_of(&customer.checklists), dto.pos, &self.pos_config)?;

        let checklist = Checklist::new(dto.name, pos);
        customer.checklists.push(checklist.clone());
        customer.touch();

        self.repository.save_customer(&customer).await?;

        Ok(checklist)
    }

    async fn get_checklists(&self, customer_id: &str) -> AppResult<Vec<Checklist>> {
        let customer_oid =
            ObjectId::parse_str(customer_id).map_err(|_| AppError::NotFound(CUSTOMER_NOT_FOUND.to_string()))?;

        let customer = self
            .repository
            .find_customer_by_id(customer_oid)
            .await?
            .ok_or_else(|| AppError::NotFound(CUSTOMER_NOT_FOUND.to_string()))?;

        Ok(customer.checklists)
    }

    async fn get_checklist(&self, id: &str) -> AppResult<Checklist> {
        let oid = Self::parse_id(id)?;
        let customer = self.owner_of(oid).await?;

        customer
            .checklist(oid)
            .cloned()
            .ok_or_else(|| AppError::NotFound(CHECKLIST_NOT_FOUND.to_string()))
    }

    async fn update_checklist(&self, id: &str, dto: UpdateChecklistDto) -> AppResult<Checklist> {
        let oid = Self::parse_id(id)?;
        if dto.id != id {
            return Err(AppError::BadRequest(WRONG_CHECKLIST_ID.to_string()));
        }

        let mut customer = self.owner_of(oid).await?;
        ordering::validate_on_update(&ordering::siblings_of(&customer.checklists), oid, dto.pos)?;

        let checklist = customer
            .checklist_mut(oid)
            .ok_or_else(|| AppError::NotFound(CHECKLIST_NOT_FOUND.to_string()))?;
        checklist.name = dto.name;
        checklist.pos = Some(dto.pos);
        checklist.touch();
        let updated = checklist.clone();
        customer.touch();

        self.repository.save_customer(&customer).await?;

        Ok(updated)
    }

    async fn partial_update_checklist(&self, id: &str, patch: Value) -> AppResult<Checklist> {
        let oid = Self::parse_id(id)?;

        let mut customer = self.owner_of(oid).await?;
        let patch_pos = patch_pos_field(&patch, "pos")?;
        ordering::validate_on_patch(&ordering::siblings_of(&customer.checklists), oid, patch_pos)?;

        let checklist = customer
            .checklist_mut(oid)
            .ok_or_else(|| AppError::NotFound(CHECKLIST_NOT_FOUND.to_string()))?;

        let mut merged: Checklist = apply_merge_patch(checklist, &patch)?;
        merged.id = checklist.id;
        merged.touch();
        *checklist = merged.clone();
        customer.touch();

        self.repository.save_customer(&customer).await?;

        Ok(merged)
    }

    async fn delete_checklist(&self, id: &str) -> AppResult<()> {
        let oid = Self::parse_id(id)?;

        let mut customer = self.owner_of(oid).await?;
        customer.checklists.retain(|c| c.id != oid);
        customer.touch();

        self.repository.save_customer(&customer).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{empty_customer, InMemoryCustomerRepository};
    use serde_json::json;

    fn service(customers: Vec<Customer>) -> ChecklistService {
        ChecklistService::new(
            Arc::new(InMemoryCustomerRepository::with_customers(customers)),
            PosConfig::default(),
        )
    }

    #[tokio::test]
    async fn create_scopes_pos_to_the_owning_customer() {
        let mut first = empty_customer(ObjectId::new());
        first.checklists.push(Checklist::new("Visa".to_string(), 30));
        let second = empty_customer(ObjectId::new());
        let second_id = second.id.unwrap().to_hex();

        // 另一个客户已占用pos 30，不影响本客户的作用域
        let created = service(vec![first, second])
            .create_checklist(
                &second_id,
                CreateChecklistDto {
                    name: "Enrolment".to_string(),
                    pos: Some(30),
                },
            )
            .await
            .unwrap();

        assert_eq!(created.pos, Some(30));
    }

    #[tokio::test]
    async fn create_auto_increments_within_the_customer() {
        let mut customer = empty_customer(ObjectId::new());
        customer.checklists.push(Checklist::new("Visa".to_string(), 30));
        let customer_id = customer.id.unwrap().to_hex();

        let created = service(vec![customer])
            .create_checklist(
                &customer_id,
                CreateChecklistDto {
                    name: "Enrolment".to_string(),
                    pos: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(created.pos, Some(40));
    }

    #[tokio::test]
    async fn create_with_taken_pos_is_a_conflict() {
        let mut customer = empty_customer(ObjectId::new());
        customer.checklists.push(Checklist::new("Visa".to_string(), 30));
        let customer_id = customer.id.unwrap().to_hex();

        let result = service(vec![customer])
            .create_checklist(
                &customer_id,
                CreateChecklistDto {
                    name: "Enrolment".to_string(),
                    pos: Some(30),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn get_checklist_finds_it_across_customers() {
        let mut customer = empty_customer(ObjectId::new());
        let checklist = Checklist::new("Visa".to_string(), 0);
        let checklist_id = checklist.id.to_hex();
        customer.checklists.push(checklist);

        let found = service(vec![empty_customer(ObjectId::new()), customer])
            .get_checklist(&checklist_id)
            .await
            .unwrap();

        assert_eq!(found.name, "Visa");
    }

    #[tokio::test]
    async fn update_taking_a_siblings_pos_is_a_conflict() {
        let mut customer = empty_customer(ObjectId::new());
        customer.checklists.push(Checklist::new("Visa".to_string(), 0));
        let target = Checklist::new("Enrolment".to_string(), 10);
        let target_id = target.id.to_hex();
        customer.checklists.push(target);

        let result = service(vec![customer])
            .update_checklist(
                &target_id,
                UpdateChecklistDto {
                    id: target_id.clone(),
                    name: "Enrolment".to_string(),
                    pos: 0,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn patch_renames_without_touching_items() {
        let mut customer = empty_customer(ObjectId::new());
        let mut checklist = Checklist::new("Visa".to_string(), 0);
        checklist
            .items
            .push(database::ChecklistItem::new("Passport copy".to_string(), false, 0));
        let checklist_id = checklist.id.to_hex();
        customer.checklists.push(checklist);

        let patched = service(vec![customer])
            .partial_update_checklist(&checklist_id, json!({ "name": "Visa 2024" }))
            .await
            .unwrap();

        assert_eq!(patched.name, "Visa 2024");
        assert_eq!(patched.items.len(), 1);
        assert_eq!(patched.pos, Some(0));
    }

    #[tokio::test]
    async fn delete_removes_the_checklist_from_its_owner() {
        let mut customer = empty_customer(ObjectId::new());
        let checklist = Checklist::new("Visa".to_string(), 0);
        let checklist_id = checklist.id.to_hex();
        customer.checklists.push(checklist);
        let customer_id = customer.id.unwrap().to_hex();

        let service = service(vec![customer]);
        service.delete_checklist(&checklist_id).await.unwrap();

        assert!(service.get_checklists(&customer_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_checklist_is_not_found() {
        let result = service(vec![]).get_checklist(&ObjectId::new().to_hex()).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}

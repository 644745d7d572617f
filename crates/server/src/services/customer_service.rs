use crate::dtos::customer_dto::{CreateCustomerDto, UpdateCustomerDto};
use crate::services::{apply_merge_patch, patch_pos_field};
use async_trait::async_trait;
use chrono::Utc;
use database::customer::{model::Customer, repository::DynCustomerRepository};
use database::ordering::{self, PosConfig, Sibling};
use database::workflow_status::repository::DynWorkflowStatusRepository;
use mongodb::bson::oid::ObjectId;
use serde_json::{json, Value};
use std::sync::Arc;
use utils::{AppError, AppResult};

const CUSTOMER_NOT_FOUND: &str = "The customer was not found";
const WRONG_CUSTOMER_ID: &str = "Wrong customer ID";
const WORKFLOW_STATUS_NOT_FOUND: &str = "The workflow status was not found";
const WRONG_WORKFLOW_STATUS_ID: &str = "Wrong workflow status ID";

pub type DynCustomerService = Arc<dyn CustomerServiceTrait + Send + Sync>;

#[async_trait]
pub trait CustomerServiceTrait {
    async fn create_customer(&self, dto: CreateCustomerDto) -> AppResult<Customer>;
    async fn get_customers(&self) -> AppResult<Vec<Customer>>;
    async fn get_customer(&self, id: &str) -> AppResult<Customer>;
    async fn update_customer(&self, id: &str, dto: UpdateCustomerDto) -> AppResult<Customer>;
    async fn partial_update_customer(&self, id: &str, patch: Value) -> AppResult<Customer>;
    async fn delete_customer(&self, id: &str) -> AppResult<()>;
}

#[derive(Clone)]
pub struct CustomerService {
    repository: DynCustomerRepository,
    status_repository: DynWorkflowStatusRepository,
    pos_config: PosConfig,
}

impl CustomerService {
    pub fn new(
        repository: DynCustomerRepository,
        status_repository: DynWorkflowStatusRepository,
        pos_config: PosConfig,
    ) -> Self {
        Self {
            repository,
            status_repository,
            pos_config,
        }
    }

    fn parse_id(id: &str) -> AppResult<ObjectId> {
        ObjectId::parse_str(id).map_err(|_| AppError::NotFound(CUSTOMER_NOT_FOUND.to_string()))
    }

    async fn resolve_status(&self, status: &str) -> AppResult<ObjectId> {
        let oid =
            ObjectId::parse_str(status).map_err(|_| AppError::BadRequest(WRONG_WORKFLOW_STATUS_ID.to_string()))?;

        self.status_repository
            .find_status_by_id(oid)
            .await?
            .ok_or_else(|| AppError::BadRequest(WORKFLOW_STATUS_NOT_FOUND.to_string()))?;

        Ok(oid)
    }

    fn list_siblings(customers: &[Customer]) -> Vec<Sibling> {
        customers.iter().map(Customer::list_sibling).collect()
    }

    fn workflow_siblings(customers: &[Customer]) -> Vec<Sibling> {
        customers.iter().map(Customer::workflow_sibling).collect()
    }

    /// serde把ObjectId序列化为`{"$oid": hex}`；客户端补丁里的status是裸hex字符串，
    /// 合并前先改写成扩展JSON形式，否则反序列化必然失败。
    fn normalize_status_field(patch: &mut Value) -> AppResult<()> {
        if let Some(status) = patch.get("status") {
            match status {
                Value::String(hex) => {
                    let oid = ObjectId::parse_str(hex)
                        .map_err(|_| AppError::BadRequest(WRONG_WORKFLOW_STATUS_ID.to_string()))?;
                    patch["status"] = json!({ "$oid": oid.to_hex() });
                }
                Value::Object(_) => {}
                _ => return Err(AppError::BadRequest(WRONG_WORKFLOW_STATUS_ID.to_string())),
            }
        }
        Ok(())
    }
}

#[async_trait]
impl CustomerServiceTrait for CustomerService {
    async fn create_customer(&self, dto: CreateCustomerDto) -> AppResult<Customer> {
        let status = self.resolve_status(&dto.status).await?;

        let customers = self.repository.find_all_customers().await?;
        let list_pos = ordering::assign_on_create(&Self::list_siblings(&customers), dto.list_pos, &self.pos_config)?;
        let workflow_pos =
            ordering::assign_on_create(&Self::workflow_siblings(&customers), dto.workflow_pos, &self.pos_config)?;

        let now = Utc::now().timestamp();
        let customer = Customer {
            id: None,
            email: dto.email,
            surname: dto.surname,
            given_name: dto.given_name,
            nickname: dto.nickname,
            real_name: dto.real_name,
            gender: dto.gender,
            birthday: dto.birthday,
            mobile: dto.mobile,
            qq: dto.qq,
            wechat: dto.wechat,
            au_address: dto.au_address,
            foreign_address: dto.foreign_address,
            visa_expiry_date: dto.visa_expiry_date,
            status,
            list_pos: Some(list_pos),
            workflow_pos: Some(workflow_pos),
            is_archived: dto.is_archived.unwrap_or(false),
            checklists: Vec::new(),
            sticky_notes: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        self.repository.insert_customer(customer).await
    }

    async fn get_customers(&self) -> AppResult<Vec<Customer>> {
        self.repository.find_all_customers().await
    }

    async fn get_customer(&self, id: &str) -> AppResult<Customer> {
        let oid = Self::parse_id(id)?;

        self.repository
            .find_customer_by_id(oid)
            .await?
            .ok_or_else(|| AppError::NotFound(CUSTOMER_NOT_FOUND.to_string()))
    }

    async fn update_customer(&self, id: &str, dto: UpdateCustomerDto) -> AppResult<Customer> {
        let oid = Self::parse_id(id)?;
        if dto.id != id {
            return Err(AppError::BadRequest(WRONG_CUSTOMER_ID.to_string()));
        }

        let mut customer = self
            .repository
            .find_customer_by_id(oid)
            .await?
            .ok_or_else(|| AppError::NotFound(CUSTOMER_NOT_FOUND.to_string()))?;

        let status = self.resolve_status(&dto.status).await?;

        let customers = self.repository.find_all_customers().await?;
        ordering::validate_on_update(&Self::list_siblings(&customers), oid, dto.list_pos)?;
        ordering::validate_on_update(&Self::workflow_siblings(&customers), oid, dto.workflow_pos)?;

        customer.email = dto.email;
        customer.surname = dto.surname;
        customer.given_name = dto.given_name;
        customer.nickname = dto.nickname;
        customer.real_name = dto.real_name;
        customer.gender = dto.gender;
        customer.birthday = dto.birthday;
        customer.mobile = dto.mobile;
        customer.qq = dto.qq;
        customer.wechat = dto.wechat;
        customer.au_address = dto.au_address;
        customer.foreign_address = dto.foreign_address;
        customer.visa_expiry_date = dto.visa_expiry_date;
        customer.status = status;
        customer.is_archived = dto.is_archived;
        customer.list_pos = Some(dto.list_pos);
        customer.workflow_pos = Some(dto.workflow_pos);
        customer.touch();

        self.repository.save_customer(&customer).await?;

        Ok(customer)
    }

    async fn partial_update_customer(&self, id: &str, patch: Value) -> AppResult<Customer> {
        let oid = Self::parse_id(id)?;

        let customer = self
            .repository
            .find_customer_by_id(oid)
            .await?
            .ok_or_else(|| AppError::NotFound(CUSTOMER_NOT_FOUND.to_string()))?;

        let mut patch = patch;
        Self::normalize_status_field(&mut patch)?;

        let customers = self.repository.find_all_customers().await?;
        ordering::validate_on_patch(
            &Self::list_siblings(&customers),
            oid,
            patch_pos_field(&patch, "list_pos")?,
        )?;
        ordering::validate_on_patch(
            &Self::workflow_siblings(&customers),
            oid,
            patch_pos_field(&patch, "workflow_pos")?,
        )?;

        let mut merged: Customer = apply_merge_patch(&customer, &patch)?;
        merged.id = customer.id;
        merged.touch();

        self.repository.save_customer(&merged).await?;

        Ok(merged)
    }

    async fn delete_customer(&self, id: &str) -> AppResult<()> {
        let oid = Self::parse_id(id)?;

        if !self.repository.delete_customer(oid).await? {
            return Err(AppError::NotFound(CUSTOMER_NOT_FOUND.to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{empty_customer, InMemoryCustomerRepository, InMemoryWorkflowStatusRepository};
    use database::WorkflowStatus;
    use serde_json::json;

    fn known_status() -> WorkflowStatus {
        WorkflowStatus {
            id: Some(ObjectId::new()),
            name: "Open".to_string(),
            color: None,
            pos: Some(0),
        }
    }

    fn service(customers: Vec<Customer>, statuses: Vec<WorkflowStatus>) -> CustomerService {
        CustomerService::new(
            Arc::new(InMemoryCustomerRepository::with_customers(customers)),
            Arc::new(InMemoryWorkflowStatusRepository::with_statuses(statuses)),
            PosConfig::default(),
        )
    }

    fn create_dto(status: &ObjectId) -> CreateCustomerDto {
        CreateCustomerDto {
            email: Some("new@example.com".to_string()),
            surname: Some("Doe".to_string()),
            given_name: Some("Jane".to_string()),
            nickname: None,
            real_name: None,
            gender: None,
            birthday: None,
            mobile: None,
            qq: None,
            wechat: None,
            au_address: None,
            foreign_address: None,
            visa_expiry_date: None,
            status: status.to_hex(),
            is_archived: None,
            list_pos: None,
            workflow_pos: None,
        }
    }

    #[tokio::test]
    async fn create_assigns_both_scopes_independently() {
        let status = known_status();
        let status_id = status.id.unwrap();
        let mut existing = empty_customer(status_id);
        existing.list_pos = Some(40);
        existing.workflow_pos = Some(7);

        let created = service(vec![existing], vec![status])
            .create_customer(create_dto(&status_id))
            .await
            .unwrap();

        assert_eq!(created.list_pos, Some(50));
        assert_eq!(created.workflow_pos, Some(17));
    }

    #[tokio::test]
    async fn create_with_unknown_status_is_a_bad_request() {
        let result = service(vec![], vec![])
            .create_customer(create_dto(&ObjectId::new()))
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn create_with_taken_list_pos_is_a_conflict() {
        let status = known_status();
        let status_id = status.id.unwrap();
        let mut existing = empty_customer(status_id);
        existing.list_pos = Some(40);

        let mut dto = create_dto(&status_id);
        dto.list_pos = Some(40);

        let result = service(vec![existing], vec![status]).create_customer(dto).await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn patch_moves_customer_to_another_status() {
        let status = known_status();
        let other_status = known_status();
        let other_status_id = other_status.id.unwrap();
        let existing = empty_customer(status.id.unwrap());
        let path_id = existing.id.unwrap().to_hex();

        let patched = service(vec![existing], vec![status, other_status])
            .partial_update_customer(&path_id, json!({ "status": other_status_id.to_hex() }))
            .await
            .unwrap();

        assert_eq!(patched.status, other_status_id);
    }

    #[tokio::test]
    async fn patch_with_taken_workflow_pos_is_a_conflict() {
        let status = known_status();
        let status_id = status.id.unwrap();
        let mut first = empty_customer(status_id);
        first.workflow_pos = Some(10);
        let mut second = empty_customer(status_id);
        second.workflow_pos = Some(20);
        let path_id = second.id.unwrap().to_hex();

        let result = service(vec![first, second], vec![status])
            .partial_update_customer(&path_id, json!({ "workflow_pos": 10 }))
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn patch_preserves_embedded_checklists() {
        let status = known_status();
        let mut existing = empty_customer(status.id.unwrap());
        existing.checklists.push(database::Checklist::new("Visa".to_string(), 0));
        let path_id = existing.id.unwrap().to_hex();

        let patched = service(vec![existing], vec![status])
            .partial_update_customer(&path_id, json!({ "nickname": "JJ" }))
            .await
            .unwrap();

        assert_eq!(patched.nickname.as_deref(), Some("JJ"));
        assert_eq!(patched.checklists.len(), 1);
    }

    #[tokio::test]
    async fn update_with_mismatched_body_id_is_a_bad_request() {
        let status = known_status();
        let status_id = status.id.unwrap();
        let existing = empty_customer(status_id);
        let path_id = existing.id.unwrap().to_hex();

        let dto = UpdateCustomerDto {
            id: ObjectId::new().to_hex(),
            email: None,
            surname: None,
            given_name: None,
            nickname: None,
            real_name: None,
            gender: None,
            birthday: None,
            mobile: None,
            qq: None,
            wechat: None,
            au_address: None,
            foreign_address: None,
            visa_expiry_date: None,
            status: status_id.to_hex(),
            is_archived: false,
            list_pos: 0,
            workflow_pos: 0,
        };

        let result = service(vec![existing], vec![status]).update_customer(&path_id, dto).await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn delete_missing_customer_is_not_found() {
        let result = service(vec![], vec![]).delete_customer(&ObjectId::new().to_hex()).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}

use crate::{customer::model::Customer, Database};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use std::sync::Arc;
use utils::{AppError, AppResult};

pub type DynCustomerRepository = Arc<dyn CustomerRepositoryTrait + Send + Sync>;

// 主要用于Service中，表示提供了该Trait功能。
// 内嵌实体(checklist/item/sticky note)没有独立集合，统一通过
// 所属Customer文档定位与保存。
#[async_trait]
pub trait CustomerRepositoryTrait {
    async fn find_all_customers(&self) -> AppResult<Vec<Customer>>;
    async fn find_customer_by_id(&self, id: ObjectId) -> AppResult<Option<Customer>>;
    /// 按内嵌checklist的_id定位所属Customer
    async fn find_customer_with_checklist(&self, checklist_id: ObjectId) -> AppResult<Option<Customer>>;
    /// 按内嵌checklist item的_id定位所属Customer
    async fn find_customer_with_checklist_item(&self, item_id: ObjectId) -> AppResult<Option<Customer>>;
    /// 按内嵌sticky note的_id定位所属Customer
    async fn find_customer_with_sticky_note(&self, note_id: ObjectId) -> AppResult<Option<Customer>>;
    async fn insert_customer(&self, customer: Customer) -> AppResult<Customer>;
    /// 整文档回写；MongoDB单文档写入原子，内嵌作用域的并发写串行化于此
    async fn save_customer(&self, customer: &Customer) -> AppResult<()>;
    async fn delete_customer(&self, id: ObjectId) -> AppResult<bool>;
}

#[async_trait]
impl CustomerRepositoryTrait for Database {
    async fn find_all_customers(&self) -> AppResult<Vec<Customer>> {
        let cursor = self.customers.find(doc! {}, None).await?;
        let customers = cursor.try_collect().await?;

        Ok(customers)
    }

    async fn find_customer_by_id(&self, id: ObjectId) -> AppResult<Option<Customer>> {
        let customer = self.customers.find_one(doc! { "_id": id }, None).await?;

        Ok(customer)
    }

    async fn find_customer_with_checklist(&self, checklist_id: ObjectId) -> AppResult<Option<Customer>> {
        let customer = self
            .customers
            .find_one(doc! { "checklists._id": checklist_id }, None)
            .await?;

        Ok(customer)
    }

    async fn find_customer_with_checklist_item(&self, item_id: ObjectId) -> AppResult<Option<Customer>> {
        let customer = self
            .customers
            .find_one(doc! { "checklists.items._id": item_id }, None)
            .await?;

        Ok(customer)
    }

    async fn find_customer_with_sticky_note(&self, note_id: ObjectId) -> AppResult<Option<Customer>> {
        let customer = self
            .customers
            .find_one(doc! { "sticky_notes._id": note_id }, None)
            .await?;

        Ok(customer)
    }

    async fn insert_customer(&self, customer: Customer) -> AppResult<Customer> {
        let result = self.customers.insert_one(&customer, None).await?;

        let mut created = customer;
        created.id = result.inserted_id.as_object_id();

        Ok(created)
    }

    async fn save_customer(&self, customer: &Customer) -> AppResult<()> {
        let id = customer
            .id
            .ok_or_else(|| AppError::InternalServerErrorWithContext("customer without id".to_string()))?;

        self.customers.replace_one(doc! { "_id": id }, customer, None).await?;

        Ok(())
    }

    async fn delete_customer(&self, id: ObjectId) -> AppResult<bool> {
        let result = self.customers.delete_one(doc! { "_id": id }, None).await?;

        Ok(result.deleted_count > 0)
    }
}

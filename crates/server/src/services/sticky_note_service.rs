use crate::dtos::sticky_note_dto::{CreateStickyNoteDto, UpdateStickyNoteDto};
use crate::services::{apply_merge_patch, patch_pos_field};
use async_trait::async_trait;
use database::customer::{
    model::{Customer, StickyNote},
    repository::DynCustomerRepository,
};
use database::ordering::{self, PosConfig};
use mongodb::bson::oid::ObjectId;
use serde_json::Value;
use std::sync::Arc;
use utils::{AppError, AppResult};

const CUSTOMER_NOT_FOUND: &str = "The customer was not found";
const STICKY_NOTE_NOT_FOUND: &str = "The sticky note was not found";
const WRONG_STICKY_NOTE_ID: &str = "Wrong sticky note ID";

pub type DynStickyNoteService = Arc<dyn StickyNoteServiceTrait + Send + Sync>;

#[async_trait]
pub trait StickyNoteServiceTrait {
    async fn create_sticky_note(&self, customer_id: &str, dto: CreateStickyNoteDto) -> AppResult<StickyNote>;
    async fn get_sticky_notes(&self, customer_id: &str) -> AppResult<Vec<StickyNote>>;
    async fn get_sticky_note(&self, id: &str) -> AppResult<StickyNote>;
    async fn update_sticky_note(&self, id: &str, dto: UpdateStickyNoteDto) -> AppResult<StickyNote>;
    async fn partial_update_sticky_note(&self, id: &str, patch: Value) -> AppResult<StickyNote>;
    async fn delete_sticky_note(&self, id: &str) -> AppResult<()>;
}

#[derive(Clone)]
pub struct StickyNoteService {
    repository: DynCustomerRepository,
    pos_config: PosConfig,
}

impl StickyNoteService {
    pub fn new(repository: DynCustomerRepository, pos_config: PosConfig) -> Self {
        Self { repository, pos_config }
    }

    fn parse_id(id: &str) -> AppResult<ObjectId> {
        ObjectId::parse_str(id).map_err(|_| AppError::NotFound(STICKY_NOTE_NOT_FOUND.to_string()))
    }

    /// 定位持有该便签的客户文档
    async fn owner_of(&self, note_id: ObjectId) -> AppResult<Customer> {
        self.repository
            .find_customer_with_sticky_note(note_id)
            .await?
            .ok_or_else(|| AppError::NotFound(STICKY_NOTE_NOT_FOUND.to_string()))
    }
}

#[async_trait]
impl StickyNoteServiceTrait for StickyNoteService {
    async fn create_sticky_note(&self, customer_id: &str, dto: CreateStickyNoteDto) -> AppResult<StickyNote> {
        let customer_oid =
            ObjectId::parse_str(customer_id).map_err(|_| AppError::NotFound(CUSTOMER_NOT_FOUND.to_string()))?;

        let mut customer = self
            .repository
            .find_customer_by_id(customer_oid)
            .await?
            .ok_or_else(|| AppError::NotFound(CUSTOMER_NOT_FOUND.to_string()))?;

        let pos = ordering::assign_on_create(&ordering::siblings_of(&customer.sticky_notes), dto.pos, &self.pos_config)?;

        let note = StickyNote::new(dto.text, pos);
        customer.sticky_notes.push(note.clone());
        customer.touch();

        self.repository.save_customer(&customer).await?;

        Ok(note)
    }

    async fn get_sticky_notes(&self, customer_id: &str) -> AppResult<Vec<StickyNote>> {
        let customer_oid =
            ObjectId::parse_str(customer_id).map_err(|_| AppError::NotFound(CUSTOMER_NOT_FOUND.to_string()))?;

        let customer = self
            .repository
            .find_customer_by_id(customer_oid)
            .await?
            .ok_or_else(|| AppError::NotFound(CUSTOMER_NOT_FOUND.to_string()))?;

        Ok(customer.sticky_notes)
    }

    async fn get_sticky_note(&self, id: &str) -> AppResult<StickyNote> {
        let oid = Self::parse_id(id)?;
        let customer = self.owner_of(oid).await?;

        customer
            .sticky_note(oid)
            .cloned()
            .ok_or_else(|| AppError::NotFound(STICKY_NOTE_NOT_FOUND.to_string()))
    }

    async fn update_sticky_note(&self, id: &str, dto: UpdateStickyNoteDto) -> AppResult<StickyNote> {
        let oid = Self::parse_id(id)?;
        if dto.id != id {
            return Err(AppError::BadRequest(WRONG_STICKY_NOTE_ID.to_string()));
        }

        let mut customer = self.owner_of(oid).await?;
        ordering::validate_on_update(&ordering::siblings_of(&customer.sticky_notes), oid, dto.pos)?;

        let note = customer
            .sticky_note_mut(oid)
            .ok_or_else(|| AppError::NotFound(STICKY_NOTE_NOT_FOUND.to_string()))?;
        note.text = dto.text;
        note.pos = Some(dto.pos);
        note.touch();
        let updated = note.clone();
        customer.touch();

        self.repository.save_customer(&customer).await?;

        Ok(updated)
    }

    async fn partial_update_sticky_note(&self, id: &str, patch: Value) -> AppResult<StickyNote> {
        let oid = Self::parse_id(id)?;

        let mut customer = self.owner_of(oid).await?;
        let patch_pos = patch_pos_field(&patch, "pos")?;
        ordering::validate_on_patch(&ordering::siblings_of(&customer.sticky_notes), oid, patch_pos)?;

        let note = customer
            .sticky_note_mut(oid)
            .ok_or_else(|| AppError::NotFound(STICKY_NOTE_NOT_FOUND.to_string()))?;

        let mut merged: StickyNote = apply_merge_patch(note, &patch)?;
        merged.id = note.id;
        merged.touch();
        *note = merged.clone();
        customer.touch();

        self.repository.save_customer(&customer).await?;

        Ok(merged)
    }

    async fn delete_sticky_note(&self, id: &str) -> AppResult<()> {
        let oid = Self::parse_id(id)?;

        let mut customer = self.owner_of(oid).await?;
        customer.sticky_notes.retain(|n| n.id != oid);
        customer.touch();

        self.repository.save_customer(&customer).await
    }
}

// src/services/crm_service.rs

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::{ClientRepository, QuoteRepository},
    models::crm::{Client, ClientInput},
};

#[derive(Clone)]
pub struct CrmService {
    client_repo: ClientRepository,
    quote_repo: QuoteRepository,
}

impl CrmService {
    pub fn new(client_repo: ClientRepository, quote_repo: QuoteRepository) -> Self {
        Self {
            client_repo,
            quote_repo,
        }
    }

    pub async fn list_clients(&self) -> Result<Vec<Client>, AppError> {
        self.client_repo.get_all().await
    }

    pub async fn get_client(&self, id: Uuid) -> Result<Client, AppError> {
        self.client_repo
            .get_by_id(id)
            .await?
            .ok_or(AppError::ClientNotFound(id))
    }

    pub async fn create_client(&self, input: ClientInput) -> Result<Client, AppError> {
        let input = input.normalized();
        input.validate()?;

        let client = Client {
            id: Uuid::new_v4(),
            name: input.name,
            email: input.email,
            phone: input.phone,
            address: input.address,
            created_at: Utc::now(),
        };

        self.client_repo.save(&client).await?;
        tracing::info!("👤 Cliente '{}' cadastrado ({})", client.name, client.id);
        Ok(client)
    }

    pub async fn update_client(&self, id: Uuid, input: ClientInput) -> Result<Client, AppError> {
        let input = input.normalized();
        input.validate()?;
        let existing = self.get_client(id).await?;

        // createdAt é preservado
        let client = Client {
            name: input.name,
            email: input.email,
            phone: input.phone,
            address: input.address,
            ..existing
        };

        self.client_repo.save(&client).await?;
        tracing::info!("👤 Cliente '{}' atualizado", client.name);
        Ok(client)
    }

    /// Clientes com orçamentos vinculados não podem ser excluídos.
    pub async fn delete_client(&self, id: Uuid) -> Result<(), AppError> {
        let client = self.get_client(id).await?;

        let in_use = self
            .quote_repo
            .get_all()
            .await?
            .iter()
            .any(|q| q.client_id == id);
        if in_use {
            return Err(AppError::ClientInUse(id));
        }

        self.client_repo.delete(id).await?;
        tracing::info!("🗑️ Cliente '{}' excluído", client.name);
        Ok(())
    }
}

// src/models/crm.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::validation::validate_not_blank;

// --- CLIENTE ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: Uuid,

    #[schema(example = "João Silva")]
    pub name: String,

    #[schema(example = "joao@email.com")]
    pub email: Option<String>,
    #[schema(example = "(11) 99999-9999")]
    pub phone: Option<String>,

    // Endereço já montado pelo frontend (logradouro, número, bairro, cidade - UF, CEP)
    #[schema(example = "Rua das Flores, 123 - São Paulo/SP")]
    pub address: Option<String>,

    pub created_at: DateTime<Utc>,
}

// Dados de entrada para criar ou editar um cliente
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientInput {
    #[validate(custom(function = "validate_not_blank", message = "O nome é obrigatório."))]
    pub name: String,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,

    pub phone: Option<String>,
    pub address: Option<String>,
}

impl ClientInput {
    /// Campos opcionais vazios viram `None` (o formulário manda "").
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: non_empty(self.email),
            phone: non_empty(self.phone),
            address: non_empty(self.address),
        }
    }
}

pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

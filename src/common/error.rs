use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::middleware::i18n::Locale;
use crate::models::quotes::QuoteStatus;

// Classificação usada pelos chamadores (e pelos testes) para reagir ao erro
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    Validation,   // Campo obrigatório ausente ou inválido
    Policy,       // Operação proibida no estado atual
    NotFound,     // O registro alvo da operação não existe
    Unauthorized,
    Internal,
}

#[derive(Debug, Error)]
pub enum AppError {
    // --- Validação ---
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Cliente, prazo de validade e pelo menos um item são obrigatórios.")]
    QuoteWithoutItems,

    #[error("Selecione pelo menos um item para aprovação.")]
    NoItemsSelected,

    #[error("Quantidade aprovada inválida para o item {item_id}: {approved} (máximo {max}).")]
    InvalidApprovedQuantity { item_id: Uuid, approved: u32, max: u32 },

    #[error("O item {0} não pertence a este orçamento.")]
    UnknownApprovalItem(Uuid),

    #[error("O item {0} foi informado mais de uma vez.")]
    DuplicateApprovalItem(Uuid),

    #[error("O motivo do cancelamento é obrigatório.")]
    MissingCancellationReason,

    // --- Política (estado) ---
    #[error("Este orçamento não possui itens válidos para aprovação.")]
    NothingToApprove,

    #[error("Não é possível mudar o orçamento de \"{from}\" para \"{to}\".")]
    InvalidTransition { from: QuoteStatus, to: QuoteStatus },

    #[error("Somente orçamentos em aberto podem ser editados (status atual: \"{0}\").")]
    QuoteNotEditable(QuoteStatus),

    #[error("Orçamentos pagos não podem ser excluídos.")]
    PaidQuoteLocked,

    #[error("O cliente possui orçamentos vinculados e não pode ser excluído.")]
    ClientInUse(Uuid),

    #[error("O produto está presente em orçamentos e não pode ser excluído.")]
    ProductInUse(Uuid),

    #[error("O item é usado na composição de produtos e não pode ser excluído.")]
    MaterialInUse(Uuid),

    // --- Não encontrado ---
    #[error("Orçamento {0} não encontrado.")]
    QuoteNotFound(Uuid),

    #[error("Cliente {0} não encontrado.")]
    ClientNotFound(Uuid),

    #[error("Produto {0} não encontrado.")]
    ProductNotFound(Uuid),

    #[error("Item de estoque {0} não encontrado.")]
    MaterialNotFound(Uuid),

    // --- Autenticação ---
    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    // --- Infraestrutura ---
    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro de migração: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("Registro corrompido no armazenamento: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::ValidationError(_)
            | AppError::QuoteWithoutItems
            | AppError::NoItemsSelected
            | AppError::InvalidApprovedQuantity { .. }
            | AppError::UnknownApprovalItem(_)
            | AppError::DuplicateApprovalItem(_)
            | AppError::MissingCancellationReason => ErrorKind::Validation,

            AppError::NothingToApprove
            | AppError::InvalidTransition { .. }
            | AppError::QuoteNotEditable(_)
            | AppError::PaidQuoteLocked
            | AppError::ClientInUse(_)
            | AppError::ProductInUse(_)
            | AppError::MaterialInUse(_) => ErrorKind::Policy,

            AppError::QuoteNotFound(_)
            | AppError::ClientNotFound(_)
            | AppError::ProductNotFound(_)
            | AppError::MaterialNotFound(_) => ErrorKind::NotFound,

            AppError::InvalidCredentials | AppError::InvalidToken => ErrorKind::Unauthorized,

            AppError::DatabaseError(_)
            | AppError::MigrationError(_)
            | AppError::SerializationError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => ErrorKind::Internal,
        }
    }

    /// Código estável para o frontend (não muda com o idioma).
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_FAILED",
            AppError::QuoteWithoutItems => "QUOTE_WITHOUT_ITEMS",
            AppError::NoItemsSelected => "NO_ITEMS_SELECTED",
            AppError::InvalidApprovedQuantity { .. } => "INVALID_APPROVED_QUANTITY",
            AppError::UnknownApprovalItem(_) => "UNKNOWN_APPROVAL_ITEM",
            AppError::DuplicateApprovalItem(_) => "DUPLICATE_APPROVAL_ITEM",
            AppError::MissingCancellationReason => "MISSING_CANCELLATION_REASON",
            AppError::NothingToApprove => "NOTHING_TO_APPROVE",
            AppError::InvalidTransition { .. } => "INVALID_TRANSITION",
            AppError::QuoteNotEditable(_) => "QUOTE_NOT_EDITABLE",
            AppError::PaidQuoteLocked => "PAID_QUOTE_LOCKED",
            AppError::ClientInUse(_) => "CLIENT_IN_USE",
            AppError::ProductInUse(_) => "PRODUCT_IN_USE",
            AppError::MaterialInUse(_) => "MATERIAL_IN_USE",
            AppError::QuoteNotFound(_) => "QUOTE_NOT_FOUND",
            AppError::ClientNotFound(_) => "CLIENT_NOT_FOUND",
            AppError::ProductNotFound(_) => "PRODUCT_NOT_FOUND",
            AppError::MaterialNotFound(_) => "MATERIAL_NOT_FOUND",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::InvalidToken => "INVALID_TOKEN",
            _ => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Policy => StatusCode::CONFLICT,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Mensagem para o usuário no idioma pedido (pt é o padrão).
    pub fn message(&self, locale: &Locale) -> String {
        if !locale.is_english() {
            return match self.kind() {
                ErrorKind::Internal => "Ocorreu um erro inesperado.".to_string(),
                ErrorKind::Validation if matches!(self, AppError::ValidationError(_)) => {
                    "Um ou mais campos são inválidos.".to_string()
                }
                _ => self.to_string(),
            };
        }

        match self {
            AppError::ValidationError(_) => "One or more fields are invalid.".to_string(),
            AppError::QuoteWithoutItems => {
                "Client, validity date and at least one item are required.".to_string()
            }
            AppError::NoItemsSelected => "Select at least one item to approve.".to_string(),
            AppError::InvalidApprovedQuantity { item_id, approved, max } => {
                format!("Invalid approved quantity for item {item_id}: {approved} (max {max}).")
            }
            AppError::UnknownApprovalItem(id) => format!("Item {id} does not belong to this quote."),
            AppError::DuplicateApprovalItem(id) => format!("Item {id} was sent more than once."),
            AppError::MissingCancellationReason => "A cancellation reason is required.".to_string(),
            AppError::NothingToApprove => "This quote has no items to approve.".to_string(),
            AppError::InvalidTransition { from, to } => {
                format!("Cannot move a quote from \"{from}\" to \"{to}\".")
            }
            AppError::QuoteNotEditable(status) => {
                format!("Only open quotes can be edited (current status: \"{status}\").")
            }
            AppError::PaidQuoteLocked => "Paid quotes cannot be deleted.".to_string(),
            AppError::ClientInUse(_) => "The client has quotes and cannot be deleted.".to_string(),
            AppError::ProductInUse(_) => "The product is used in quotes and cannot be deleted.".to_string(),
            AppError::MaterialInUse(_) => {
                "The material is part of a product composition and cannot be deleted.".to_string()
            }
            AppError::QuoteNotFound(id) => format!("Quote {id} not found."),
            AppError::ClientNotFound(id) => format!("Client {id} not found."),
            AppError::ProductNotFound(id) => format!("Product {id} not found."),
            AppError::MaterialNotFound(id) => format!("Material {id} not found."),
            AppError::InvalidCredentials => "Invalid email, password or company.".to_string(),
            AppError::InvalidToken => "Missing or invalid authentication token.".to_string(),
            _ => "An unexpected error occurred.".to_string(),
        }
    }

    pub fn to_api_error(&self, locale: &Locale) -> ApiError {
        if self.kind() == ErrorKind::Internal {
            // O `tracing` loga a mensagem detalhada que `thiserror` nos deu.
            tracing::error!("Erro Interno do Servidor: {}", self);
        }

        // Retorna todos os detalhes da validação, campo a campo.
        let details = match self {
            AppError::ValidationError(errors) => {
                let mut details = serde_json::Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), json!(messages));
                }
                Some(serde_json::Value::Object(details))
            }
            _ => None,
        };

        ApiError {
            status: self.status(),
            kind: self.kind(),
            code: self.code(),
            error: self.message(locale),
            details,
        }
    }
}

// Erro já traduzido, pronto para virar resposta HTTP
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub kind: ErrorKind,
    pub code: &'static str,
    pub error: String,
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = json!({
            "error": self.error,
            "code": self.code,
            "kind": self.kind,
        });
        if let Some(details) = self.details {
            body["details"] = details;
        }
        (self.status, Json(body)).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default()).into_response()
    }
}

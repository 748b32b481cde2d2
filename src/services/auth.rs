// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use crate::{
    common::error::AppError,
    models::auth::{AuthResponse, Claims, SessionUser},
};

const TOKEN_TTL_DAYS: i64 = 7;

/// Login de demonstração: uma única credencial vinda da configuração.
#[derive(Clone)]
pub struct AuthService {
    email: String,
    password_hash: String,
    authorized_companies: Vec<String>,
    jwt_secret: String,
}

impl AuthService {
    /// Gera o hash bcrypt da senha configurada (fora do runtime assíncrono).
    pub async fn new(
        email: String,
        password: String,
        authorized_companies: Vec<String>,
        jwt_secret: String,
        bcrypt_cost: u32,
    ) -> Result<Self, AppError> {
        let password_hash = tokio::task::spawn_blocking(move || hash(&password, bcrypt_cost))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        Ok(Self {
            email,
            password_hash,
            authorized_companies: authorized_companies
                .into_iter()
                .map(|c| c.trim().to_lowercase())
                .collect(),
            jwt_secret,
        })
    }

    pub async fn login(
        &self,
        email: &str,
        password: &str,
        company: &str,
    ) -> Result<AuthResponse, AppError> {
        // A empresa precisa estar autorizada (sem diferenciar maiúsculas)
        let company = company.trim();
        if !self.authorized_companies.contains(&company.to_lowercase()) {
            return Err(AppError::InvalidCredentials);
        }
        if email.trim() != self.email {
            return Err(AppError::InvalidCredentials);
        }

        let password_clone = password.to_owned();
        let password_hash_clone = self.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid =
            tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        let user = SessionUser {
            email: self.email.clone(),
            company: company.to_string(),
        };
        let token = self.create_token(&user)?;
        tracing::info!("🔐 Login de '{}' na empresa '{}'", user.email, user.company);

        Ok(AuthResponse { token, user })
    }

    pub fn validate_token(&self, token: &str) -> Result<SessionUser, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        Ok(SessionUser {
            email: token_data.claims.sub,
            company: token_data.claims.company,
        })
    }

    fn create_token(&self, user: &SessionUser) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(TOKEN_TTL_DAYS);

        let claims = Claims {
            sub: user.email.clone(),
            company: user.company.clone(),
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

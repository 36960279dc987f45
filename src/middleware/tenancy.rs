// src/middleware/tenancy.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::common::error::AppError;

// O nome do nosso cabeçalho HTTP customizado
const TENANT_ID_HEADER: &str = "x-tenant-id";

// Extrator do tenant. Todas as operações do motor de risco são escopadas
// por tenant; sem este cabeçalho nenhum handler protegido executa. É isso
// que torna o acesso cross-tenant irrepresentável: não existe caminho de
// consulta sem um tenant_id.
#[derive(Debug, Clone)]
pub struct TenantContext(pub Uuid);

impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header_value = parts.headers.get(TENANT_ID_HEADER);

        match header_value {
            Some(value) => {
                let value_str = value.to_str().map_err(|_| {
                    AppError::Validation(
                        "El encabezado x-tenant-id contiene caracteres inválidos.".to_string(),
                    )
                })?;

                let tenant_id = Uuid::parse_str(value_str).map_err(|_| {
                    AppError::Validation(
                        "El encabezado x-tenant-id no es un UUID válido.".to_string(),
                    )
                })?;

                Ok(TenantContext(tenant_id))
            }
            None => Err(AppError::Validation(
                "El encabezado x-tenant-id es obligatorio.".to_string(),
            )),
        }
    }
}

// src/models/scoring.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::error::AppError;

// Tolerância aceita na soma dos pesos (0.99..=1.01)
pub const TOLERANCIA_PESOS: f64 = 0.01;

// --- Enums (Mapeando o Postgres) ---

// Nível de risco. A ordem dos variants É a ordem de prioridade da
// classificação (A antes de B antes de C), por isso o derive de Ord.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "nivel_riesgo", rename_all = "UPPERCASE")]
pub enum NivelRiesgo {
    A,
    B,
    C,
}

// Categoria de um item de scoring. Vive apenas dentro do JSONB de itens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CategoriaItem {
    Cualitativa,
    Conflicto,
    Cuantitativa,
}

// --- Structs ---

// Um fator avaliado: ("referencias comerciales", cualitativa, 80.0)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemScoring {
    pub categoria: CategoriaItem,

    #[schema(example = "Referencias comerciales")]
    pub nombre: String,

    #[schema(example = 80.0)]
    pub valor: f64,
}

// Pesos por categoria, frações de 1.0
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pesos {
    #[schema(example = 0.4)]
    pub cualitativo: f64,

    #[schema(example = 0.3)]
    pub conflictos: f64,

    #[schema(example = 0.3)]
    pub cuantitativo: f64,
}

impl Pesos {
    pub fn suma(&self) -> f64 {
        self.cualitativo + self.conflictos + self.cuantitativo
    }

    // Validação pura, aplicada ANTES de qualquer chamada de persistência.
    // A mensagem carrega o percentual realmente calculado.
    pub fn validar(&self) -> Result<(), AppError> {
        for (nombre, valor) in [
            ("cualitativo", self.cualitativo),
            ("conflictos", self.conflictos),
            ("cuantitativo", self.cuantitativo),
        ] {
            if !(0.0..=1.0).contains(&valor) {
                return Err(AppError::Validation(format!(
                    "El peso '{}' debe estar entre 0 y 1; se recibió {}.",
                    nombre, valor
                )));
            }
        }

        // O epsilon evita que 0.99/1.01 exatos caiam fora por ruído de f64.
        let suma = self.suma();
        if (suma - 1.0).abs() > TOLERANCIA_PESOS + 1e-9 {
            return Err(AppError::Validation(format!(
                "Los pesos deben sumar 100%; se obtuvo {:.0}%.",
                suma * 100.0
            )));
        }

        Ok(())
    }
}

impl Default for Pesos {
    fn default() -> Self {
        Self {
            cualitativo: 0.40,
            conflictos: 0.30,
            cuantitativo: 0.30,
        }
    }
}

// Umbral de um nível: score mínimo (inclusive) e techo de patrimonio
// (inclusive). O techo limita a exposição por nível, não só o score.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NivelUmbral {
    pub nivel: NivelRiesgo,

    #[schema(example = 85.0)]
    pub score_minimo: f64,

    #[schema(value_type = f64, example = 1000000)]
    pub patrimonio_maximo: Decimal,
}

// Valida a lista de umbrales de uma atualização de configuração.
pub fn validar_niveles(niveles: &[NivelUmbral]) -> Result<(), AppError> {
    if niveles.is_empty() {
        return Err(AppError::Validation(
            "La configuración debe definir al menos un nivel.".to_string(),
        ));
    }

    for (i, umbral) in niveles.iter().enumerate() {
        if niveles[..i].iter().any(|u| u.nivel == umbral.nivel) {
            return Err(AppError::Validation(format!(
                "El nivel {:?} está definido más de una vez.",
                umbral.nivel
            )));
        }
    }

    Ok(())
}

pub fn niveles_default() -> Vec<NivelUmbral> {
    vec![
        NivelUmbral {
            nivel: NivelRiesgo::A,
            score_minimo: 85.0,
            patrimonio_maximo: Decimal::from(1_000_000_i64),
        },
        NivelUmbral {
            nivel: NivelRiesgo::B,
            score_minimo: 70.0,
            patrimonio_maximo: Decimal::from(5_000_000_i64),
        },
        NivelUmbral {
            nivel: NivelRiesgo::C,
            score_minimo: 50.0,
            patrimonio_maximo: Decimal::from(10_000_000_i64),
        },
    ]
}

pub const MESES_REEVALUACION_DEFAULT: i32 = 12;

// Configuração de scoring: singleton por tenant, criada sob demanda.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScoringConfig {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,

    #[schema(ignore)]
    pub tenant_id: Uuid,

    #[schema(value_type = Pesos)]
    pub pesos: Json<Pesos>,

    #[schema(value_type = Vec<NivelUmbral>)]
    pub niveles: Json<Vec<NivelUmbral>>,

    #[schema(example = 12)]
    pub meses_reevaluacion: i32,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pesos_default_suman_cien_por_ciento() {
        assert!(Pesos::default().validar().is_ok());
    }

    #[test]
    fn acepta_sumas_dentro_de_la_tolerancia() {
        for suma_objetivo in [0.99, 1.0, 1.01] {
            let pesos = Pesos {
                cualitativo: suma_objetivo - 0.6,
                conflictos: 0.3,
                cuantitativo: 0.3,
            };
            assert!(pesos.validar().is_ok(), "suma {} debía pasar", suma_objetivo);
        }
    }

    #[test]
    fn rechaza_suma_fuera_de_tolerancia_con_porcentaje_en_mensaje() {
        let pesos = Pesos {
            cualitativo: 0.5,
            conflictos: 0.3,
            cuantitativo: 0.3,
        };
        match pesos.validar() {
            Err(AppError::Validation(msg)) => assert!(msg.contains("110%"), "mensaje: {}", msg),
            otro => panic!("se esperaba Validation, llegó {:?}", otro.err()),
        }
    }

    #[test]
    fn rechaza_peso_individual_fuera_de_rango() {
        let pesos = Pesos {
            cualitativo: 1.2,
            conflictos: -0.1,
            cuantitativo: -0.1,
        };
        assert!(matches!(pesos.validar(), Err(AppError::Validation(_))));
    }

    #[test]
    fn rechaza_nivel_duplicado() {
        let mut niveles = niveles_default();
        niveles.push(NivelUmbral {
            nivel: NivelRiesgo::A,
            score_minimo: 90.0,
            patrimonio_maximo: Decimal::from(100_i64),
        });
        assert!(validar_niveles(&niveles).is_err());
    }

    #[test]
    fn rechaza_lista_de_niveles_vacia() {
        assert!(validar_niveles(&[]).is_err());
    }
}

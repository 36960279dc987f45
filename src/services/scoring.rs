// src/services/scoring.rs
//
// Motor de scoring e classificador de nível. Funções puras: os handlers e
// o workflow chamam isto, persistência fica nos repositórios.

use rust_decimal::Decimal;

use crate::models::scoring::{CategoriaItem, ItemScoring, NivelRiesgo, NivelUmbral, Pesos};

// Subtotal de uma categoria: média aritmética dos valores dos itens da
// categoria, 0.0 quando a categoria não tem itens. A média é determinística
// e monótona em cada item, e não depende da cardinalidade relativa entre
// categorias.
fn subtotal_categoria(items: &[ItemScoring], categoria: CategoriaItem) -> f64 {
    let valores: Vec<f64> = items
        .iter()
        .filter(|item| item.categoria == categoria)
        .map(|item| item.valor)
        .collect();

    if valores.is_empty() {
        return 0.0;
    }

    valores.iter().sum::<f64>() / valores.len() as f64
}

// score_total = Σ subtotal_categoria × peso_categoria.
//
// Score de buró e ajuste manual ficam registrados ao lado do resultado,
// mas NUNCA entram aqui: o composite precisa ser reproduzível apenas a
// partir da lista de fatores avaliados.
pub fn calcular_score(items: &[ItemScoring], pesos: &Pesos) -> f64 {
    subtotal_categoria(items, CategoriaItem::Cualitativa) * pesos.cualitativo
        + subtotal_categoria(items, CategoriaItem::Conflicto) * pesos.conflictos
        + subtotal_categoria(items, CategoriaItem::Cuantitativa) * pesos.cuantitativo
}

// Classificação em nível de risco. Avalia SEMPRE em ordem de prioridade
// A → B → C, independente da ordem em que os umbrales foram gravados; um
// nível casa quando score >= score_minimo E patrimonio <= patrimonio_maximo;
// o primeiro que casar vence. `None` = sem clasificar.
//
// A dupla condição é regra de negócio: um cliente com score excelente mas
// patrimonio alto demais fica fora do nível A de propósito (o techo de
// patrimonio limita exposição por nível).
pub fn clasificar(score: f64, patrimonio: Decimal, niveles: &[NivelUmbral]) -> Option<NivelRiesgo> {
    let mut ordenados: Vec<&NivelUmbral> = niveles.iter().collect();
    ordenados.sort_by_key(|u| u.nivel);

    ordenados
        .into_iter()
        .find(|u| score >= u.score_minimo && patrimonio <= u.patrimonio_maximo)
        .map(|u| u.nivel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::scoring::niveles_default;

    fn item(categoria: CategoriaItem, valor: f64) -> ItemScoring {
        ItemScoring {
            categoria,
            nombre: "factor".to_string(),
            valor,
        }
    }

    #[test]
    fn ejemplo_de_referencia_da_80_5() {
        // Subtotales 80 / 90 / 70 con pesos 0.43 / 0.31 / 0.26 → 80.5
        let items = vec![
            item(CategoriaItem::Cualitativa, 80.0),
            item(CategoriaItem::Conflicto, 90.0),
            item(CategoriaItem::Cuantitativa, 70.0),
        ];
        let pesos = Pesos {
            cualitativo: 0.43,
            conflictos: 0.31,
            cuantitativo: 0.26,
        };
        let score = calcular_score(&items, &pesos);
        assert!((score - 80.5).abs() < 1e-9, "score = {}", score);
    }

    #[test]
    fn promedia_varios_items_de_la_misma_categoria() {
        let items = vec![
            item(CategoriaItem::Cualitativa, 60.0),
            item(CategoriaItem::Cualitativa, 100.0),
        ];
        let pesos = Pesos {
            cualitativo: 1.0,
            conflictos: 0.0,
            cuantitativo: 0.0,
        };
        assert_eq!(calcular_score(&items, &pesos), 80.0);
    }

    #[test]
    fn categoria_sin_items_aporta_cero() {
        let items = vec![item(CategoriaItem::Cualitativa, 80.0)];
        let score = calcular_score(&items, &Pesos::default());
        assert!((score - 80.0 * 0.40).abs() < 1e-9);
    }

    #[test]
    fn es_determinista() {
        let items = vec![
            item(CategoriaItem::Cualitativa, 73.2),
            item(CategoriaItem::Conflicto, 41.0),
            item(CategoriaItem::Cuantitativa, 88.8),
        ];
        let pesos = Pesos::default();
        assert_eq!(calcular_score(&items, &pesos), calcular_score(&items, &pesos));
    }

    #[test]
    fn subir_un_item_nunca_baja_el_score() {
        let pesos = Pesos::default();
        let base = vec![
            item(CategoriaItem::Cualitativa, 50.0),
            item(CategoriaItem::Cualitativa, 70.0),
            item(CategoriaItem::Conflicto, 60.0),
            item(CategoriaItem::Cuantitativa, 40.0),
        ];
        let score_base = calcular_score(&base, &pesos);

        for i in 0..base.len() {
            for delta in [0.5, 5.0, 50.0] {
                let mut subidos = base.clone();
                subidos[i].valor += delta;
                assert!(
                    calcular_score(&subidos, &pesos) >= score_base,
                    "subir el item {} en {} bajó el score",
                    i,
                    delta
                );
            }
        }
    }

    #[test]
    fn el_techo_de_patrimonio_excluye_del_nivel_a() {
        let niveles = niveles_default();
        // Score 90 con patrimonio 2M: pasa el score de A pero no su techo → B
        assert_eq!(
            clasificar(90.0, Decimal::from(2_000_000_i64), &niveles),
            Some(NivelRiesgo::B)
        );
        // Mismo score con patrimonio 900k sí entra en A
        assert_eq!(
            clasificar(90.0, Decimal::from(900_000_i64), &niveles),
            Some(NivelRiesgo::A)
        );
    }

    #[test]
    fn sin_coincidencia_queda_sin_clasificar() {
        let niveles = niveles_default();
        assert_eq!(clasificar(30.0, Decimal::from(100_i64), &niveles), None);
        assert_eq!(
            clasificar(99.0, Decimal::from(50_000_000_i64), &niveles),
            None
        );
    }

    #[test]
    fn respeta_la_prioridad_aunque_los_umbrales_lleguen_desordenados() {
        let mut niveles = niveles_default();
        niveles.reverse();
        assert_eq!(
            clasificar(90.0, Decimal::from(900_000_i64), &niveles),
            Some(NivelRiesgo::A)
        );
    }

    #[test]
    fn los_limites_son_inclusivos() {
        let niveles = niveles_default();
        assert_eq!(
            clasificar(85.0, Decimal::from(1_000_000_i64), &niveles),
            Some(NivelRiesgo::A)
        );
    }
}

//! Availability checks for requested materials, plus the conditional
//! decrement used to reserve stock.

use chrono::Utc;
use sea_orm::{sea_query::Expr, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use std::collections::HashMap;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::entities::material::{self, MaterialType};
use crate::errors::ServiceError;

/// One requested line: how much of which material, optionally of which type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialRequirement {
    pub material_id: Uuid,
    pub quantity: i32,
    pub expected_type: Option<MaterialType>,
}

impl MaterialRequirement {
    pub fn new(material_id: Uuid, quantity: i32) -> Self {
        Self {
            material_id,
            quantity,
            expected_type: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidatedMaterial {
    pub material: material::Model,
    pub quantity: i32,
}

/// Collapses repeated ids: the last quantity wins, the first position is kept.
pub fn dedupe_requirements(items: &[MaterialRequirement]) -> Vec<MaterialRequirement> {
    let mut order: Vec<Uuid> = Vec::with_capacity(items.len());
    let mut latest: HashMap<Uuid, MaterialRequirement> = HashMap::with_capacity(items.len());
    for item in items {
        if latest.insert(item.material_id, item.clone()).is_none() {
            order.push(item.material_id);
        }
    }
    order
        .into_iter()
        .filter_map(|id| latest.remove(&id))
        .collect()
}

/// Checks that every requirement names an existing, active material of the
/// expected type with enough on-hand quantity. Reads only.
pub async fn validate_materials<C>(
    conn: &C,
    items: &[MaterialRequirement],
) -> Result<Vec<ValidatedMaterial>, ServiceError>
where
    C: ConnectionTrait,
{
    let items = dedupe_requirements(items);
    if items.is_empty() {
        return Ok(Vec::new());
    }

    if let Some(bad) = items.iter().find(|i| i.quantity <= 0) {
        return Err(ServiceError::BadRequest(format!(
            "quantity must be positive for material {}",
            bad.material_id
        )));
    }

    let ids: Vec<Uuid> = items.iter().map(|i| i.material_id).collect();
    let found: HashMap<Uuid, material::Model> = material::Entity::find()
        .filter(material::Column::Id.is_in(ids.clone()))
        .filter(material::Column::IsActive.eq(true))
        .all(conn)
        .await?
        .into_iter()
        .map(|m| (m.id, m))
        .collect();

    let missing: Vec<String> = ids
        .iter()
        .filter(|id| !found.contains_key(id))
        .map(Uuid::to_string)
        .collect();
    if !missing.is_empty() {
        warn!(?missing, "requested materials unavailable");
        return Err(ServiceError::NotFound(format!(
            "missing or inactive material IDs: [{}]",
            missing.join(", ")
        )));
    }

    let mut validated = Vec::with_capacity(items.len());
    for item in items {
        let Some(material) = found.get(&item.material_id) else {
            continue;
        };
        if let Some(expected) = item.expected_type {
            if material.material_type != expected {
                return Err(ServiceError::BadRequest(format!(
                    "type mismatch for material {}: expected {} got {}",
                    material.id, expected, material.material_type
                )));
            }
        }
        if item.quantity > material.quantity {
            return Err(ServiceError::BadRequest(format!(
                "requested quantity {} exceeds available {} for material {}",
                item.quantity, material.quantity, material.id
            )));
        }
        validated.push(ValidatedMaterial {
            material: material.clone(),
            quantity: item.quantity,
        });
    }

    debug!(count = validated.len(), "materials validated");
    Ok(validated)
}

/// Decrements on-hand quantity only if enough remains. Fails with
/// `BadRequest` when a concurrent reservation got there first.
pub async fn reserve_quantity<C>(
    conn: &C,
    material_id: Uuid,
    quantity: i32,
) -> Result<(), ServiceError>
where
    C: ConnectionTrait,
{
    let result = material::Entity::update_many()
        .col_expr(
            material::Column::Quantity,
            Expr::col(material::Column::Quantity).sub(quantity),
        )
        .col_expr(material::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(material::Column::Id.eq(material_id))
        .filter(material::Column::Quantity.gte(quantity))
        .filter(material::Column::IsActive.eq(true))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        return Err(ServiceError::BadRequest(format!(
            "requested quantity {} is no longer available for material {}",
            quantity, material_id
        )));
    }
    Ok(())
}

/// Returns previously reserved quantity to stock.
pub async fn release_quantity<C>(
    conn: &C,
    material_id: Uuid,
    quantity: i32,
) -> Result<(), ServiceError>
where
    C: ConnectionTrait,
{
    material::Entity::update_many()
        .col_expr(
            material::Column::Quantity,
            Expr::col(material::Column::Quantity).add(quantity),
        )
        .col_expr(material::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(material::Column::Id.eq(material_id))
        .exec(conn)
        .await?;
    Ok(())
}

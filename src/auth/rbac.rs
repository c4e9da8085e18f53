/*!
 * # Role-Based Access Control (RBAC) Module
 *
 * Roles form a strict ladder: SUPER_ADMIN > ADMIN > USER. A route that
 * accepts a set of roles admits every caller whose rank is at least the
 * lowest rank in that set.
 */

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    DeriveActiveEnum,
    Display,
    EnumString,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    #[sea_orm(string_value = "SUPER_ADMIN")]
    SuperAdmin,
    #[sea_orm(string_value = "ADMIN")]
    Admin,
    #[sea_orm(string_value = "USER")]
    User,
}

impl Role {
    pub fn rank(&self) -> u8 {
        match self {
            Role::SuperAdmin => 3,
            Role::Admin => 2,
            Role::User => 1,
        }
    }

    /// True when this role may pass a gate accepting `accepted`.
    /// An empty set admits nobody.
    pub fn satisfies(&self, accepted: &[Role]) -> bool {
        accepted
            .iter()
            .map(Role::rank)
            .min()
            .is_some_and(|min| self.rank() >= min)
    }

    pub fn is_admin(&self) -> bool {
        self.satisfies(&[Role::Admin])
    }
}

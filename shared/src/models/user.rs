//! User, role, and permission models
//!
//! Roles carry immutable base permission tables; per-user overrides are
//! merged on top. Unknown role strings resolve through an explicit fallback
//! policy rather than a silent default lookup.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

/// A back-office user account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
    /// Per-user permission overrides keyed by "resource:action"
    pub permission_overrides: PermissionOverrides,
    /// Set when `role` is `Supplier`: the supplier this account belongs to
    pub supplier_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// User roles across the chain
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Manager,
    Pharmacist,
    Seller,
    Supplier,
}

/// Base permission tables per role, as "resource:action" strings
const ADMIN_PERMISSIONS: &[&str] = &[
    "pharmacies:view",
    "pharmacies:create",
    "pharmacies:edit",
    "pharmacies:delete",
    "inventory:view",
    "inventory:create",
    "inventory:edit",
    "inventory:delete",
    "search:view",
    "search:use",
    "users:view",
    "users:create",
    "users:edit",
    "users:delete",
    "users:change_password",
    "sales:view",
    "sales:create",
    "sales:edit",
    "sales:delete",
    "suppliers:view",
    "suppliers:create",
    "suppliers:edit",
    "suppliers:delete",
    "orders:view",
    "orders:create",
    "orders:edit",
    "reports:view",
    "reports:generate",
    "reports:export",
];

const MANAGER_PERMISSIONS: &[&str] = &[
    "pharmacies:view",
    "pharmacies:create",
    "pharmacies:edit",
    "inventory:view",
    "inventory:create",
    "inventory:edit",
    "search:view",
    "search:use",
    "users:view",
    "users:create",
    "users:edit",
    "sales:view",
    "sales:create",
    "sales:edit",
    "suppliers:view",
    "suppliers:create",
    "suppliers:edit",
    "orders:view",
    "orders:create",
    "orders:edit",
    "reports:view",
    "reports:generate",
    "reports:export",
];

const PHARMACIST_PERMISSIONS: &[&str] = &[
    "pharmacies:view",
    "inventory:view",
    "inventory:create",
    "inventory:edit",
    "search:view",
    "search:use",
    "sales:view",
    "sales:create",
    "sales:edit",
    "suppliers:view",
    "orders:view",
    "orders:create",
    "reports:view",
];

const SELLER_PERMISSIONS: &[&str] = &[
    "pharmacies:view",
    "inventory:view",
    "search:view",
    "search:use",
    "sales:view",
    "sales:create",
];

const SUPPLIER_PERMISSIONS: &[&str] = &[
    "orders:view",
    "orders:edit",
    "price_lists:view",
    "price_lists:upload",
];

impl Role {
    /// The role assigned when a stored role string is unrecognized
    ///
    /// Seller is the least-privileged staff role, so a corrupt or legacy
    /// value can never widen access.
    pub fn fallback() -> Role {
        Role::Seller
    }

    /// Parse a stored role string, falling back per the explicit policy
    pub fn parse_or_fallback(s: &str) -> Role {
        match s {
            "admin" => Role::Admin,
            "manager" => Role::Manager,
            "pharmacist" => Role::Pharmacist,
            "seller" => Role::Seller,
            "supplier" => Role::Supplier,
            _ => Role::fallback(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Pharmacist => "pharmacist",
            Role::Seller => "seller",
            Role::Supplier => "supplier",
        }
    }

    /// Whether an account with this role may act on data owned by `supplier_id`
    ///
    /// Staff roles reach every supplier. Supplier accounts are confined to
    /// the supplier they are linked to, for reads and writes alike.
    pub fn may_access_supplier(&self, own_supplier: Option<Uuid>, supplier_id: Uuid) -> bool {
        *self != Role::Supplier || own_supplier == Some(supplier_id)
    }

    /// The immutable base permission set for this role
    pub fn base_permissions(&self) -> &'static [&'static str] {
        match self {
            Role::Admin => ADMIN_PERMISSIONS,
            Role::Manager => MANAGER_PERMISSIONS,
            Role::Pharmacist => PHARMACIST_PERMISSIONS,
            Role::Seller => SELLER_PERMISSIONS,
            Role::Supplier => SUPPLIER_PERMISSIONS,
        }
    }
}

/// Per-user permission overrides
///
/// `true` grants a permission the role lacks, `false` revokes one it has.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PermissionOverrides(pub HashMap<String, bool>);

impl PermissionOverrides {
    /// Effective permissions: the role's base set merged with the overrides
    pub fn effective(&self, role: Role) -> BTreeSet<String> {
        let mut effective: BTreeSet<String> = role
            .base_permissions()
            .iter()
            .map(|p| p.to_string())
            .collect();

        for (permission, granted) in &self.0 {
            if *granted {
                effective.insert(permission.clone());
            } else {
                effective.remove(permission);
            }
        }

        effective
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_role_falls_back_to_seller() {
        assert_eq!(Role::parse_or_fallback("root"), Role::Seller);
        assert_eq!(Role::parse_or_fallback(""), Role::Seller);
    }

    #[test]
    fn admin_holds_every_manager_permission() {
        let admin: BTreeSet<_> = Role::Admin.base_permissions().iter().collect();
        for p in Role::Manager.base_permissions() {
            assert!(admin.contains(p), "admin missing {p}");
        }
    }

    #[test]
    fn overrides_grant_and_revoke() {
        let mut map = HashMap::new();
        map.insert("reports:view".to_string(), true);
        map.insert("sales:create".to_string(), false);
        let overrides = PermissionOverrides(map);

        let effective = overrides.effective(Role::Seller);
        assert!(effective.contains("reports:view"));
        assert!(!effective.contains("sales:create"));
        assert!(effective.contains("sales:view"));
    }
}

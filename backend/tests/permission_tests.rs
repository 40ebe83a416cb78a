//! Tests for roles, permission tables, and per-user overrides

use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};

use shared::models::{PermissionOverrides, Role};

const ALL_ROLES: [Role; 5] = [
    Role::Admin,
    Role::Manager,
    Role::Pharmacist,
    Role::Seller,
    Role::Supplier,
];

mod role_parsing {
    use super::*;

    #[test]
    fn known_roles_round_trip() {
        for role in ALL_ROLES {
            assert_eq!(Role::parse_or_fallback(role.as_str()), role);
        }
    }

    #[test]
    fn unrecognized_strings_resolve_to_seller() {
        assert_eq!(Role::parse_or_fallback("superadmin"), Role::Seller);
        assert_eq!(Role::parse_or_fallback("ADMIN"), Role::Seller);
        assert_eq!(Role::parse_or_fallback(""), Role::Seller);
        assert_eq!(Role::fallback(), Role::Seller);
    }
}

mod supplier_scoping {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn staff_roles_reach_any_supplier() {
        let target = Uuid::from_u128(7);
        for role in [Role::Admin, Role::Manager, Role::Pharmacist, Role::Seller] {
            assert!(role.may_access_supplier(None, target));
            assert!(role.may_access_supplier(Some(Uuid::from_u128(99)), target));
        }
    }

    #[test]
    fn supplier_accounts_are_confined_to_their_own_supplier() {
        let own = Uuid::from_u128(7);
        let other = Uuid::from_u128(8);
        assert!(Role::Supplier.may_access_supplier(Some(own), own));
        assert!(!Role::Supplier.may_access_supplier(Some(own), other));
    }

    #[test]
    fn unlinked_supplier_accounts_reach_nothing() {
        assert!(!Role::Supplier.may_access_supplier(None, Uuid::from_u128(7)));
    }
}

mod base_permissions {
    use super::*;

    #[test]
    fn admin_is_a_superset_of_every_staff_role() {
        let admin: BTreeSet<_> = Role::Admin.base_permissions().iter().collect();
        for role in [Role::Manager, Role::Pharmacist, Role::Seller] {
            for p in role.base_permissions() {
                assert!(admin.contains(p), "admin missing {p} from {role:?}");
            }
        }
    }

    #[test]
    fn only_admin_deletes_users() {
        for role in ALL_ROLES {
            let has_it = role.base_permissions().contains(&"users:delete");
            assert_eq!(has_it, role == Role::Admin, "unexpected users:delete on {role:?}");
        }
    }

    #[test]
    fn supplier_accounts_stay_out_of_staff_surfaces() {
        let supplier = Role::Supplier.base_permissions();
        for p in supplier {
            let (resource, _) = p.split_once(':').unwrap();
            assert!(
                resource == "orders" || resource == "price_lists",
                "supplier should not hold {p}"
            );
        }
        assert!(supplier.contains(&"price_lists:upload"));
        assert!(supplier.contains(&"orders:view"));
    }

    #[test]
    fn seller_cannot_touch_purchasing() {
        let seller = Role::Seller.base_permissions();
        assert!(!seller.contains(&"orders:create"));
        assert!(!seller.contains(&"suppliers:view"));
        assert!(seller.contains(&"sales:create"));
    }

    #[test]
    fn every_permission_is_resource_colon_action() {
        for role in ALL_ROLES {
            for p in role.base_permissions() {
                let parts: Vec<_> = p.split(':').collect();
                assert_eq!(parts.len(), 2, "malformed permission {p}");
                assert!(!parts[0].is_empty() && !parts[1].is_empty());
            }
        }
    }
}

mod overrides {
    use super::*;

    #[test]
    fn grants_extend_the_base_set() {
        let mut map = HashMap::new();
        map.insert("reports:view".to_string(), true);
        let effective = PermissionOverrides(map).effective(Role::Seller);
        assert!(effective.contains("reports:view"));
        assert!(effective.contains("sales:view"));
    }

    #[test]
    fn revocations_shrink_the_base_set() {
        let mut map = HashMap::new();
        map.insert("users:delete".to_string(), false);
        let effective = PermissionOverrides(map).effective(Role::Admin);
        assert!(!effective.contains("users:delete"));
        assert!(effective.contains("users:edit"));
    }

    #[test]
    fn revoking_an_absent_permission_is_harmless() {
        let mut map = HashMap::new();
        map.insert("users:delete".to_string(), false);
        let effective = PermissionOverrides(map).effective(Role::Seller);
        assert_eq!(
            effective,
            PermissionOverrides::default().effective(Role::Seller)
        );
    }
}

mod property_tests {
    use super::*;

    fn role_strategy() -> impl Strategy<Value = Role> {
        prop::sample::select(ALL_ROLES.to_vec())
    }

    fn overrides_strategy() -> impl Strategy<Value = PermissionOverrides> {
        prop::collection::hash_map(
            prop::sample::select(vec![
                "pharmacies:view",
                "inventory:edit",
                "users:delete",
                "sales:create",
                "reports:export",
                "price_lists:upload",
            ]),
            any::<bool>(),
            0..6,
        )
        .prop_map(|map| {
            PermissionOverrides(map.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Effective permissions are exactly base plus grants minus revocations
        #[test]
        fn prop_effective_set_is_base_with_overrides(
            role in role_strategy(),
            overrides in overrides_strategy(),
        ) {
            let effective = overrides.effective(role);
            let base: BTreeSet<String> =
                role.base_permissions().iter().map(|p| p.to_string()).collect();

            for permission in &effective {
                let granted = overrides.0.get(permission).copied();
                prop_assert!(
                    granted == Some(true) || (granted.is_none() && base.contains(permission))
                );
            }
            for (permission, granted) in &overrides.0 {
                if *granted {
                    prop_assert!(effective.contains(permission));
                } else {
                    prop_assert!(!effective.contains(permission));
                }
            }
        }

        /// Permissions untouched by overrides keep their base verdict
        #[test]
        fn prop_untouched_permissions_unchanged(
            role in role_strategy(),
            overrides in overrides_strategy(),
        ) {
            let effective = overrides.effective(role);
            for p in role.base_permissions() {
                if !overrides.0.contains_key(*p) {
                    prop_assert!(effective.contains(*p));
                }
            }
        }
    }
}

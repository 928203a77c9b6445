use core::str::FromStr;

use serde::{Deserialize, Serialize};

use gameshop_core::{DomainError, DomainResult, Entity, EntityId, Money};

/// Kind of catalog entity an [`EntityId`] refers to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Product,
    Platform,
    Genre,
    Developer,
    Company,
    DeveloperType,
    CompanyType,
    User,
    PaymentMethod,
    ShippingMethod,
    SaleStatus,
}

impl EntityKind {
    pub const ALL: [EntityKind; 11] = [
        EntityKind::Product,
        EntityKind::Platform,
        EntityKind::Genre,
        EntityKind::Developer,
        EntityKind::Company,
        EntityKind::DeveloperType,
        EntityKind::CompanyType,
        EntityKind::User,
        EntityKind::PaymentMethod,
        EntityKind::ShippingMethod,
        EntityKind::SaleStatus,
    ];

    /// Stable storage name (`developer_type`, `payment_method`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Product => "product",
            EntityKind::Platform => "platform",
            EntityKind::Genre => "genre",
            EntityKind::Developer => "developer",
            EntityKind::Company => "company",
            EntityKind::DeveloperType => "developer_type",
            EntityKind::CompanyType => "company_type",
            EntityKind::User => "user",
            EntityKind::PaymentMethod => "payment_method",
            EntityKind::ShippingMethod => "shipping_method",
            EntityKind::SaleStatus => "sale_status",
        }
    }

    /// Plural URL segment (`products`, `developer-types`, ...).
    pub fn path_segment(self) -> &'static str {
        match self {
            EntityKind::Product => "products",
            EntityKind::Platform => "platforms",
            EntityKind::Genre => "genres",
            EntityKind::Developer => "developers",
            EntityKind::Company => "companies",
            EntityKind::DeveloperType => "developer-types",
            EntityKind::CompanyType => "company-types",
            EntityKind::User => "users",
            EntityKind::PaymentMethod => "payment-methods",
            EntityKind::ShippingMethod => "shipping-methods",
            EntityKind::SaleStatus => "sale-statuses",
        }
    }

    pub fn from_path_segment(segment: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.path_segment() == segment)
    }

    /// Only products carry a catalog price.
    pub fn is_priced(self) -> bool {
        matches!(self, EntityKind::Product)
    }
}

impl core::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| DomainError::validation(format!("unknown entity kind '{s}'")))
    }
}

/// A catalog entity: name + active flag, plus the current price for products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub name: String,
    pub active: bool,
    pub price: Option<Money>,
}

impl Entity for CatalogEntity {
    type Id = EntityId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// Insert payload for a catalog entity (id assigned by storage).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntity {
    pub kind: EntityKind,
    pub name: String,
    pub price: Option<Money>,
}

/// Partial update for a catalog entity. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EntityPatch {
    pub name: Option<String>,
    pub active: Option<bool>,
    pub price: Option<Money>,
}

impl EntityPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.active.is_none() && self.price.is_none()
    }
}

/// Trim a name and reject blank ones.
pub fn normalize_name(name: &str) -> DomainResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation("name must not be blank"));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_segments_round_trip_for_every_kind() {
        for kind in EntityKind::ALL {
            assert_eq!(EntityKind::from_path_segment(kind.path_segment()), Some(kind));
            assert_eq!(kind.as_str().parse::<EntityKind>().unwrap(), kind);
        }
        assert_eq!(EntityKind::from_path_segment("consoles"), None);
    }

    #[test]
    fn normalize_name_trims_and_rejects_blank() {
        assert_eq!(normalize_name("  Nintendo  ").unwrap(), "Nintendo");
        assert!(matches!(normalize_name("   "), Err(DomainError::Validation(_))));
        assert!(matches!(normalize_name(""), Err(DomainError::Validation(_))));
    }

    #[test]
    fn patch_without_fields_is_empty() {
        assert!(EntityPatch::default().is_empty());
        let patch = EntityPatch {
            active: Some(false),
            ..EntityPatch::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn only_products_are_priced() {
        let priced: Vec<_> = EntityKind::ALL.into_iter().filter(|k| k.is_priced()).collect();
        assert_eq!(priced, vec![EntityKind::Product]);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: a normalized name is non-empty, has no surrounding
            /// whitespace, and normalizing it again is a no-op.
            #[test]
            fn normalize_name_is_idempotent(raw in "\\PC{0,24}") {
                if let Ok(name) = normalize_name(&raw) {
                    prop_assert!(!name.is_empty());
                    prop_assert_eq!(name.trim(), name.as_str());
                    prop_assert_eq!(normalize_name(&name).unwrap(), name.clone());
                } else {
                    prop_assert!(raw.trim().is_empty());
                }
            }
        }
    }
}

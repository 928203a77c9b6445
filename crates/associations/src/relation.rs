use serde::{Deserialize, Serialize};

use gameshop_catalog::EntityKind;

/// The six bridge relations of the catalog.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    ProductPlatform,
    ProductGenre,
    ProductCompany,
    ProductDeveloper,
    DeveloperDeveloperType,
    CompanyCompanyType,
}

impl RelationKind {
    pub const ALL: [RelationKind; 6] = [
        RelationKind::ProductPlatform,
        RelationKind::ProductGenre,
        RelationKind::ProductCompany,
        RelationKind::ProductDeveloper,
        RelationKind::DeveloperDeveloperType,
        RelationKind::CompanyCompanyType,
    ];

    pub fn left(self) -> EntityKind {
        match self {
            RelationKind::ProductPlatform
            | RelationKind::ProductGenre
            | RelationKind::ProductCompany
            | RelationKind::ProductDeveloper => EntityKind::Product,
            RelationKind::DeveloperDeveloperType => EntityKind::Developer,
            RelationKind::CompanyCompanyType => EntityKind::Company,
        }
    }

    pub fn right(self) -> EntityKind {
        match self {
            RelationKind::ProductPlatform => EntityKind::Platform,
            RelationKind::ProductGenre => EntityKind::Genre,
            RelationKind::ProductCompany => EntityKind::Company,
            RelationKind::ProductDeveloper => EntityKind::Developer,
            RelationKind::DeveloperDeveloperType => EntityKind::DeveloperType,
            RelationKind::CompanyCompanyType => EntityKind::CompanyType,
        }
    }

    /// Stable storage name.
    pub fn as_str(self) -> &'static str {
        match self {
            RelationKind::ProductPlatform => "product_platform",
            RelationKind::ProductGenre => "product_genre",
            RelationKind::ProductCompany => "product_company",
            RelationKind::ProductDeveloper => "product_developer",
            RelationKind::DeveloperDeveloperType => "developer_developer_type",
            RelationKind::CompanyCompanyType => "company_company_type",
        }
    }

    /// URL segment under the left entity (`/products/{id}/platforms`,
    /// `/developers/{id}/types`).
    pub fn segment(self) -> &'static str {
        match self {
            RelationKind::ProductPlatform => "platforms",
            RelationKind::ProductGenre => "genres",
            RelationKind::ProductCompany => "companies",
            RelationKind::ProductDeveloper => "developers",
            RelationKind::DeveloperDeveloperType | RelationKind::CompanyCompanyType => "types",
        }
    }

    pub fn for_segment(left: EntityKind, segment: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|r| r.left() == left && r.segment() == segment)
    }

    /// JSON field name of the left id (`product_id`, ...).
    pub fn left_field(self) -> &'static str {
        id_field(self.left())
    }

    /// JSON field name of the right id (`platform_id`, ...).
    pub fn right_field(self) -> &'static str {
        id_field(self.right())
    }
}

impl core::fmt::Display for RelationKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn id_field(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Product => "product_id",
        EntityKind::Platform => "platform_id",
        EntityKind::Genre => "genre_id",
        EntityKind::Developer => "developer_id",
        EntityKind::Company => "company_id",
        EntityKind::DeveloperType => "developer_type_id",
        EntityKind::CompanyType => "company_type_id",
        EntityKind::User => "user_id",
        EntityKind::PaymentMethod => "payment_method_id",
        EntityKind::ShippingMethod => "shipping_method_id",
        EntityKind::SaleStatus => "status_id",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_resolve_per_left_kind() {
        assert_eq!(
            RelationKind::for_segment(EntityKind::Product, "platforms"),
            Some(RelationKind::ProductPlatform)
        );
        assert_eq!(
            RelationKind::for_segment(EntityKind::Developer, "types"),
            Some(RelationKind::DeveloperDeveloperType)
        );
        assert_eq!(
            RelationKind::for_segment(EntityKind::Company, "types"),
            Some(RelationKind::CompanyCompanyType)
        );
        assert_eq!(RelationKind::for_segment(EntityKind::Product, "types"), None);
        assert_eq!(RelationKind::for_segment(EntityKind::Genre, "platforms"), None);
    }

    #[test]
    fn every_relation_bridges_two_distinct_kinds() {
        for r in RelationKind::ALL {
            assert_ne!(r.left(), r.right(), "{r}");
            assert_ne!(r.left_field(), r.right_field(), "{r}");
        }
    }

    #[test]
    fn storage_names_are_unique() {
        let mut names: Vec<_> = RelationKind::ALL.iter().map(|r| r.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), RelationKind::ALL.len());
    }
}

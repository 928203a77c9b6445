use serde::Deserialize;
use serde_json::{Map, Value, json};

use gameshop_associations::AssociationRecord;
use gameshop_catalog::CatalogEntity;
use gameshop_core::Money;
use gameshop_sales::{SaleHeader, SaleLine};

// -------------------------
// Request DTOs
// -------------------------

/// Body of `POST /catalog/{kind}`.
#[derive(Debug, Deserialize)]
pub struct CreateEntityRequest {
    pub name: String,
    pub price: Option<Money>,
}

// Association patches, sale creation and sale patches deserialize straight
// into the domain input types (`AssociationPatch`, `NewSale`, `SalePatch`),
// and catalog updates into `EntityPatch`.

// -------------------------
// Response mapping
// -------------------------

/// `{ "id", "relation", "<left>_id", "<right>_id" }`, field names per relation.
pub fn association_to_json(record: &AssociationRecord) -> Value {
    let mut body = Map::new();
    body.insert("id".to_string(), json!(record.id));
    body.insert("relation".to_string(), json!(record.relation.as_str()));
    body.insert(record.relation.left_field().to_string(), json!(record.left));
    body.insert(record.relation.right_field().to_string(), json!(record.right));
    Value::Object(body)
}

pub fn entity_to_json(entity: &CatalogEntity) -> Value {
    json!({
        "id": entity.id,
        "kind": entity.kind.as_str(),
        "name": entity.name,
        "active": entity.active,
        "price": entity.price,
    })
}

fn sale_line_to_json(line: &SaleLine) -> Value {
    json!({
        "id": line.id,
        "sale_id": line.sale,
        "product_id": line.product,
        "quantity": line.quantity,
        "unit_price_at_sale": line.unit_price_at_sale,
        "subtotal": line.subtotal(),
    })
}

/// Sale header with its lines and the derived total.
pub fn sale_to_json(sale: &SaleHeader) -> Value {
    json!({
        "id": sale.id,
        "purchase_date": sale.purchase_date,
        "purchase_time": sale.purchase_time,
        "buyer_id": sale.buyer,
        "payment_method_id": sale.payment_method,
        "shipping_method_id": sale.shipping_method,
        "status_id": sale.status,
        "lines": sale.lines.iter().map(sale_line_to_json).collect::<Vec<_>>(),
        "total": sale.total(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use gameshop_associations::RelationKind;
    use gameshop_core::{AssociationId, EntityId, SaleId, SaleLineId};

    #[test]
    fn association_fields_follow_relation() {
        let record = AssociationRecord {
            id: AssociationId::new(3),
            relation: RelationKind::DeveloperDeveloperType,
            left: EntityId::new(10),
            right: EntityId::new(1),
        };
        let v = association_to_json(&record);
        assert_eq!(v["id"], 3);
        assert_eq!(v["developer_id"], 10);
        assert_eq!(v["developer_type_id"], 1);
    }

    #[test]
    fn sale_json_carries_subtotals_and_total() {
        let line = |id, quantity, price| SaleLine {
            id: SaleLineId::new(id),
            sale: SaleId::new(1),
            product: EntityId::new(id),
            quantity,
            unit_price_at_sale: Money::new(price),
        };
        let sale = SaleHeader {
            id: SaleId::new(1),
            purchase_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            purchase_time: NaiveTime::from_hms_opt(14, 30, 0).unwrap(),
            buyer: EntityId::new(1),
            payment_method: EntityId::new(1),
            shipping_method: EntityId::new(1),
            status: EntityId::new(1),
            lines: vec![line(1, 2, 12990), line(2, 1, 5000)],
        };

        let v = sale_to_json(&sale);
        assert_eq!(v["lines"][0]["subtotal"], 25980);
        assert_eq!(v["lines"][1]["sale_id"], 1);
        assert_eq!(v["total"], 30980);
        assert_eq!(v["purchase_date"], "2024-05-01");
    }
}

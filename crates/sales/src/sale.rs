use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use gameshop_core::{DomainError, DomainResult, Entity, EntityId, Money, SaleId, SaleLineId};

/// Sale line: product, quantity and the unit price frozen at sale time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleLine {
    pub id: SaleLineId,
    /// Owning sale header.
    pub sale: SaleId,
    pub product: EntityId,
    pub quantity: i64,
    /// Price in the smallest currency unit, as supplied when the sale was made.
    pub unit_price_at_sale: Money,
}

impl SaleLine {
    /// `quantity * unit_price_at_sale`, saturating on overflow.
    pub fn subtotal(&self) -> Money {
        self.unit_price_at_sale
            .checked_times(self.quantity)
            .unwrap_or(Money::new(u64::MAX))
    }
}

impl Entity for SaleLine {
    type Id = SaleLineId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// Aggregate root: sale header owning its lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleHeader {
    pub id: SaleId,
    pub purchase_date: NaiveDate,
    pub purchase_time: NaiveTime,
    pub buyer: EntityId,
    pub payment_method: EntityId,
    pub shipping_method: EntityId,
    pub status: EntityId,
    pub lines: Vec<SaleLine>,
}

impl SaleHeader {
    /// Sum of line subtotals; zero for a sale without lines.
    pub fn total(&self) -> Money {
        self.lines.iter().map(SaleLine::subtotal).sum()
    }
}

impl Entity for SaleHeader {
    type Id = SaleId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// Requested line of a new sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSaleLine {
    pub product_id: EntityId,
    pub quantity: i64,
    pub unit_price: Money,
}

/// Command: create a sale with its lines in one write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSale {
    pub buyer_id: EntityId,
    pub payment_method_id: EntityId,
    pub shipping_method_id: EntityId,
    pub status_id: EntityId,
    pub date: NaiveDate,
    pub time: NaiveTime,
    #[serde(default)]
    pub lines: Vec<NewSaleLine>,
}

/// Partial header update. Omitted fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalePatch {
    pub buyer_id: Option<EntityId>,
    pub payment_method_id: Option<EntityId>,
    pub shipping_method_id: Option<EntityId>,
    pub status_id: Option<EntityId>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
}

impl SalePatch {
    pub fn is_empty(&self) -> bool {
        self.buyer_id.is_none()
            && self.payment_method_id.is_none()
            && self.shipping_method_id.is_none()
            && self.status_id.is_none()
            && self.date.is_none()
            && self.time.is_none()
    }
}

/// Reject lines with a quantity below one, or whose amounts overflow.
pub fn validate_lines(lines: &[NewSaleLine]) -> DomainResult<()> {
    let mut total = Money::ZERO;
    for (idx, line) in lines.iter().enumerate() {
        if line.quantity < 1 {
            return Err(DomainError::validation(format!(
                "line {}: quantity must be at least 1, got {}",
                idx + 1,
                line.quantity
            )));
        }
        let subtotal = line.unit_price.checked_times(line.quantity).ok_or_else(|| {
            DomainError::validation(format!("line {}: subtotal overflows", idx + 1))
        })?;
        total = total
            .checked_add(subtotal)
            .ok_or_else(|| DomainError::validation("sale total overflows"))?;
    }
    Ok(())
}

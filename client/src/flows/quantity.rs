use std::collections::HashMap;
use std::fmt;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{Event, TicketType};

/// Most tickets of one type a single order may hold.
pub const MAX_PER_ORDER: u32 = 10;
/// Remaining stock at or below which the "Only n left!" badge shows.
pub const LOW_STOCK_THRESHOLD: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockBadge {
    SoldOut,
    OnlyLeft(u32),
}

impl fmt::Display for StockBadge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StockBadge::SoldOut => f.write_str("Sold out"),
            StockBadge::OnlyLeft(n) => write!(f, "Only {} left!", n),
        }
    }
}

/// Per-ticket-type quantities for one order.
#[derive(Debug, Clone, Default)]
pub struct TicketSelector {
    ticket_types: Vec<TicketType>,
    quantities: HashMap<Uuid, u32>,
}

impl TicketSelector {
    pub fn new(ticket_types: Vec<TicketType>) -> Self {
        Self {
            ticket_types,
            quantities: HashMap::new(),
        }
    }

    pub fn for_event(event: &Event) -> Self {
        Self::new(event.ticket_types.clone())
    }

    pub fn ticket_types(&self) -> &[TicketType] {
        &self.ticket_types
    }

    fn ticket_type(&self, id: Uuid) -> Option<&TicketType> {
        self.ticket_types.iter().find(|t| t.id == id)
    }

    /// `min(remaining, MAX_PER_ORDER)`; zero for unknown types.
    pub fn max_for(&self, id: Uuid) -> u32 {
        self.ticket_type(id)
            .map_or(0, |t| t.remaining().min(MAX_PER_ORDER))
    }

    pub fn quantity(&self, id: Uuid) -> u32 {
        self.quantities.get(&id).copied().unwrap_or(0)
    }

    /// Adds one ticket unless already at the max. Returns the new quantity.
    pub fn increment(&mut self, id: Uuid) -> u32 {
        let current = self.quantity(id);
        self.set_quantity(id, current.saturating_add(1))
    }

    /// Removes one ticket unless already at zero. Returns the new quantity.
    pub fn decrement(&mut self, id: Uuid) -> u32 {
        let current = self.quantity(id);
        self.set_quantity(id, current.saturating_sub(1))
    }

    /// Sets a quantity, clamped to `0..=max_for(id)`.
    pub fn set_quantity(&mut self, id: Uuid, quantity: u32) -> u32 {
        let clamped = quantity.min(self.max_for(id));
        if clamped == 0 {
            self.quantities.remove(&id);
        } else {
            self.quantities.insert(id, clamped);
        }
        clamped
    }

    pub fn badge(&self, id: Uuid) -> Option<StockBadge> {
        let remaining = self.ticket_type(id)?.remaining();
        match remaining {
            0 => Some(StockBadge::SoldOut),
            n if n <= LOW_STOCK_THRESHOLD => Some(StockBadge::OnlyLeft(n)),
            _ => None,
        }
    }

    /// Σ quantity × price over the selection.
    pub fn total(&self) -> Decimal {
        self.selected()
            .map(|(t, qty)| t.price * Decimal::from(qty))
            .sum()
    }

    pub fn total_quantity(&self) -> u32 {
        self.quantities.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.quantities.is_empty()
    }

    /// Selected types with their quantities, in listing order.
    pub fn selected(&self) -> impl Iterator<Item = (&TicketType, u32)> + '_ {
        self.ticket_types.iter().filter_map(|t| {
            let qty = self.quantity(t.id);
            (qty > 0).then_some((t, qty))
        })
    }

    pub fn clear(&mut self) {
        self.quantities.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket_type(name: &str, price: i64, total: u32, sold: u32) -> TicketType {
        TicketType {
            id: Uuid::new_v4(),
            name: name.to_string(),
            price: Decimal::new(price, 0),
            description: None,
            total_quantity: total,
            sold_quantity: sold,
        }
    }

    #[test]
    fn test_only_five_left_scenario() {
        let early = ticket_type("Early Bird", 5000, 100, 95);
        let id = early.id;
        let mut selector = TicketSelector::new(vec![early]);

        assert_eq!(selector.max_for(id), 5);
        assert_eq!(selector.badge(id), Some(StockBadge::OnlyLeft(5)));
        assert_eq!(selector.badge(id).unwrap().to_string(), "Only 5 left!");

        for _ in 0..5 {
            selector.increment(id);
        }
        assert_eq!(selector.quantity(id), 5);
        // Further increments are no-ops
        assert_eq!(selector.increment(id), 5);
        assert_eq!(selector.increment(id), 5);
    }

    #[test]
    fn test_increment_capped_at_order_max() {
        let general = ticket_type("General", 2000, 500, 0);
        let id = general.id;
        let mut selector = TicketSelector::new(vec![general]);

        assert_eq!(selector.max_for(id), MAX_PER_ORDER);
        assert_eq!(selector.badge(id), None);
        for _ in 0..20 {
            selector.increment(id);
        }
        assert_eq!(selector.quantity(id), MAX_PER_ORDER);
        assert_eq!(selector.set_quantity(id, 50), MAX_PER_ORDER);
    }

    #[test]
    fn test_decrement_clamped_at_zero() {
        let general = ticket_type("General", 2000, 500, 0);
        let id = general.id;
        let mut selector = TicketSelector::new(vec![general]);

        assert_eq!(selector.decrement(id), 0);
        selector.increment(id);
        assert_eq!(selector.decrement(id), 0);
        assert_eq!(selector.decrement(id), 0);
        assert!(selector.is_empty());
    }

    #[test]
    fn test_sold_out_type_cannot_be_selected() {
        let gone = ticket_type("VIP", 10000, 20, 20);
        let id = gone.id;
        let mut selector = TicketSelector::new(vec![gone]);

        assert_eq!(selector.badge(id), Some(StockBadge::SoldOut));
        assert_eq!(selector.increment(id), 0);
        assert_eq!(selector.increment(Uuid::new_v4()), 0);
    }

    #[test]
    fn test_total_is_sum_of_quantity_times_price() {
        let general = ticket_type("General", 2000, 500, 0);
        let vip = ticket_type("VIP", 7500, 50, 0);
        let (g, v) = (general.id, vip.id);
        let mut selector = TicketSelector::new(vec![general, vip]);

        selector.set_quantity(g, 3);
        selector.set_quantity(v, 2);
        assert_eq!(selector.total(), Decimal::new(3 * 2000 + 2 * 7500, 0));
        assert_eq!(selector.total_quantity(), 5);

        let names: Vec<&str> = selector.selected().map(|(t, _)| t.name.as_str()).collect();
        assert_eq!(names, vec!["General", "VIP"]);
    }
}

//! In-memory refund card storage.

use farebox_shared::types::{DealId, RefundCardId};
use rust_decimal::Decimal;

use super::error::RefundError;
use super::types::{NewRefundCard, RefundCard, RefundStatus};

/// Refund card storage; one active card per deal.
#[derive(Debug, Clone, Default)]
pub struct RefundCardStore {
    cards: Vec<RefundCard>,
    next_id: i64,
}

impl RefundCardStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a refund card for a deal.
    ///
    /// # Errors
    ///
    /// Returns [`RefundError::AlreadyOpen`] while an attached card exists
    /// for the deal; canceled cards are detached and do not block.
    pub fn open(&mut self, input: NewRefundCard) -> Result<RefundCardId, RefundError> {
        if self.by_deal(input.deal_id).is_some() {
            return Err(RefundError::AlreadyOpen(input.deal_id));
        }

        self.next_id += 1;
        let id = RefundCardId::new(self.next_id);
        self.cards.push(RefundCard {
            id,
            deal_id: input.deal_id,
            status: RefundStatus::New,
            payment_type: None,
            direction_type: None,
            return_cash: Decimal::ZERO,
            return_deposit: Decimal::ZERO,
            supplier_return: Decimal::ZERO,
            rs_tls_fee: Decimal::ZERO,
            supplier_return_currency: None,
            rs_tls_fee_currency: None,
            is_correct_amount_all: false,
            is_retry_check_total_amount: false,
            delay_date: None,
            canceled_refund_deal_id: None,
            deal_stage_before_return: input.deal_stage_before_return,
            is_correction_card: input.is_correction_card,
            fin_card_id: input.fin_card_id,
            auditor: None,
        });
        Ok(id)
    }

    /// Looks up a card.
    pub fn get(&self, id: RefundCardId) -> Result<&RefundCard, RefundError> {
        self.cards
            .iter()
            .find(|c| c.id == id)
            .ok_or(RefundError::NotFound(id))
    }

    /// Looks up a card mutably.
    pub fn get_mut(&mut self, id: RefundCardId) -> Result<&mut RefundCard, RefundError> {
        self.cards
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(RefundError::NotFound(id))
    }

    /// The card currently attached to a deal, if any.
    #[must_use]
    pub fn by_deal(&self, deal_id: DealId) -> Option<&RefundCard> {
        if deal_id.is_detached() {
            return None;
        }
        self.cards.iter().find(|c| c.deal_id == deal_id)
    }

    /// The attached card or an error.
    pub fn by_deal_or_err(&self, deal_id: DealId) -> Result<&RefundCard, RefundError> {
        self.by_deal(deal_id)
            .ok_or(RefundError::NoActiveRefund(deal_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_card(deal_id: DealId) -> NewRefundCard {
        NewRefundCard {
            deal_id,
            deal_stage_before_return: "WON".to_string(),
            is_correction_card: false,
            fin_card_id: None,
        }
    }

    #[test]
    fn test_open_one_per_deal() {
        let mut store = RefundCardStore::new();
        let deal = DealId::new(1);
        let id = store.open(new_card(deal)).unwrap();

        assert_eq!(store.by_deal(deal).unwrap().id, id);
        assert!(matches!(
            store.open(new_card(deal)),
            Err(RefundError::AlreadyOpen(_))
        ));
    }

    #[test]
    fn test_detached_card_unblocks_deal() {
        let mut store = RefundCardStore::new();
        let deal = DealId::new(1);
        let id = store.open(new_card(deal)).unwrap();

        // Simulate a cancel: detach the card from the deal.
        {
            let card = store.get_mut(id).unwrap();
            card.canceled_refund_deal_id = Some(card.deal_id);
            card.deal_id = DealId::DETACHED;
            card.status = RefundStatus::Canceled;
        }

        assert!(store.by_deal(deal).is_none());
        assert!(store.open(new_card(deal)).is_ok());
    }

    #[test]
    fn test_lookup_missing() {
        let store = RefundCardStore::new();
        assert!(store.get(RefundCardId::new(9)).is_err());
        assert!(store.by_deal_or_err(DealId::new(9)).is_err());
    }
}

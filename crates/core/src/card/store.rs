//! In-memory card file.
//!
//! At most one non-superseded card exists per deal. Attaching a new card
//! supersedes the previous one in place; superseded cards are retained so
//! correction deltas can be computed against them.

use farebox_shared::types::{CardId, DealId};

use super::error::CardError;
use super::types::{FinancialCard, NewFinancialCard};

/// Deal-scoped financial card storage.
#[derive(Debug, Clone, Default)]
pub struct CardFile {
    cards: Vec<FinancialCard>,
    next_id: i64,
}

impl CardFile {
    /// Creates an empty card file.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a card to a deal, superseding any active card.
    pub fn attach(&mut self, input: NewFinancialCard) -> CardId {
        for card in &mut self.cards {
            if card.deal_id == input.deal_id && !card.superseded {
                card.superseded = true;
            }
        }

        self.next_id += 1;
        let id = CardId::new(self.next_id);
        self.cards.push(FinancialCard {
            id,
            deal_id: input.deal_id,
            scheme: input.scheme,
            is_correction_after_deal: input.is_correction_after_deal,
            price: input.price,
            supplier_vat: input.supplier_vat,
            superseded: false,
        });
        id
    }

    /// Returns the active (non-superseded) card for a deal.
    #[must_use]
    pub fn active(&self, deal_id: DealId) -> Option<&FinancialCard> {
        self.cards
            .iter()
            .find(|c| c.deal_id == deal_id && !c.superseded)
    }

    /// Returns the active card or a not-found error.
    pub fn active_or_err(&self, deal_id: DealId) -> Result<&FinancialCard, CardError> {
        self.active(deal_id).ok_or(CardError::NotFound(deal_id))
    }

    /// Returns the most recently superseded card for a deal.
    ///
    /// This is the card a correction card's deltas are computed against.
    #[must_use]
    pub fn preceding(&self, deal_id: DealId) -> Option<&FinancialCard> {
        self.cards
            .iter()
            .rev()
            .find(|c| c.deal_id == deal_id && c.superseded)
    }

    /// Looks up a card by ID.
    #[must_use]
    pub fn by_id(&self, id: CardId) -> Option<&FinancialCard> {
        self.cards.iter().find(|c| c.id == id)
    }
}

//! Refund-side orchestration: the audit workflow and its side effects.

use chrono::{DateTime, Utc};
use farebox_shared::types::money::round_money;
use farebox_shared::types::points::normalize_account_number;
use farebox_shared::types::{DealId, RefundCardId, UserId};
use rust_decimal::Decimal;
use tracing::{debug, info};
use uuid::Uuid;

use crate::accounting::{self, EntryKind};
use crate::card::SchemeWork;
use crate::external::{
    AccountingPoster, BonusService, DealDirectory, DebitCredit, FiscalProvider, Notifier,
    NotificationKind,
};
use crate::ledger::{
    BonusDirection, BonusIntent, LedgerError, NewTransaction, PaymentStatus, PaymentType,
};
use crate::refund::{
    DirectionType, NewRefundCard, RefundCard, RefundError, RefundPaymentType, RefundStatus,
    RefundWorkflow,
};
use crate::scheduler::JobKind;

use super::error::EngineError;
use super::Engine;

impl<D, F, B, N, P> Engine<D, F, B, N, P>
where
    D: DealDirectory,
    F: FiscalProvider,
    B: BonusService,
    N: Notifier,
    P: AccountingPoster,
{
    /// Opens a refund card, recording the deal stage to restore on cancel.
    pub fn open_refund(&mut self, deal_id: DealId) -> Result<RefundCardId, EngineError> {
        self.with_rollback(|e| {
            let deal = e.deals.deal(deal_id)?;
            let card = e.stores.cards.active(deal_id);
            let input = NewRefundCard {
                deal_id,
                deal_stage_before_return: deal.stage_id,
                is_correction_card: card.is_some_and(|c| c.is_correction_after_deal),
                fin_card_id: card.map(|c| c.id),
            };
            Ok(e.stores.refunds.open(input)?)
        })
    }

    /// Advances a refund card along the workflow, firing the transition's
    /// side effects. The whole transition is one unit of work.
    pub fn change_refund_status(
        &mut self,
        refund_card_id: RefundCardId,
        to: RefundStatus,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> Result<(), EngineError> {
        self.with_rollback(|e| {
            let card = e.stores.refunds.get(refund_card_id)?.clone();
            RefundWorkflow::validate_transition(card.status, to)?;
            e.stores.refunds.get_mut(refund_card_id)?.status = to;

            match to {
                RefundStatus::CheckTotalAmountVerified => e.on_check_total_verified(&card, now)?,
                RefundStatus::ConfirmedAgreement => {
                    e.notify(NotificationKind::RefundReadyForWork, refund_card_id, None);
                }
                RefundStatus::Work | RefundStatus::WorkTeamleader => {
                    e.stores.refunds.get_mut(refund_card_id)?.auditor = Some(actor);
                }
                RefundStatus::Completed => e.on_completed(&card, now)?,
                _ => {}
            }

            info!(refund_card = %refund_card_id, from = ?card.status, ?to, "refund transition");
            Ok(())
        })
    }

    /// "Totals incorrect" audit action: flags for re-audit, status unchanged.
    pub fn check_total_incorrect(&mut self, refund_card_id: RefundCardId) -> Result<(), EngineError> {
        let card = self.stores.refunds.get_mut(refund_card_id)?;
        card.is_correct_amount_all = false;
        card.is_retry_check_total_amount = true;
        Ok(())
    }

    /// "Send back to audit" action: clears both audit flags.
    pub fn retry_check(&mut self, refund_card_id: RefundCardId) -> Result<(), EngineError> {
        let card = self.stores.refunds.get_mut(refund_card_id)?;
        card.is_correct_amount_all = false;
        card.is_retry_check_total_amount = false;
        Ok(())
    }

    /// Defers the refund card to a later date.
    pub fn delay_refund(
        &mut self,
        refund_card_id: RefundCardId,
        date: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, EngineError> {
        self.with_rollback(|e| {
            let card = e.stores.refunds.get(refund_card_id)?.clone();
            RefundWorkflow::validate_transition(card.status, RefundStatus::Delay)?;

            let stored = e.stores.refunds.get_mut(refund_card_id)?;
            stored.status = RefundStatus::Delay;
            stored.delay_date = Some(date);
            Ok(e.stores.jobs.schedule(card.deal_id, JobKind::DelayedRefund, date))
        })
    }

    /// Moves the re-activation date of a delayed card.
    pub fn change_delay_refund(
        &mut self,
        refund_card_id: RefundCardId,
        date: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, EngineError> {
        self.with_rollback(|e| {
            let deal_id = e.stores.refunds.get(refund_card_id)?.deal_id;
            e.stores.refunds.get_mut(refund_card_id)?.delay_date = Some(date);
            Ok(e.stores.jobs.reschedule(deal_id, JobKind::DelayedRefund, date))
        })
    }

    /// Re-activates a delayed refund card (fired by the deferred job).
    pub fn reactivate_delayed_refund(&mut self, deal_id: DealId) -> Result<(), EngineError> {
        self.with_rollback(|e| {
            let card = e.stores.refunds.by_deal_or_err(deal_id)?.clone();
            RefundWorkflow::validate_transition(card.status, RefundStatus::Work)?;

            let stored = e.stores.refunds.get_mut(card.id)?;
            stored.status = RefundStatus::Work;
            stored.delay_date = None;
            Ok(())
        })
    }

    /// Hands the card to the team lead for a point refund.
    pub fn send_team_leader(
        &mut self,
        refund_card_id: RefundCardId,
        to: RefundStatus,
        actor: UserId,
    ) -> Result<(), EngineError> {
        self.with_rollback(|e| {
            let card = e.stores.refunds.get(refund_card_id)?.clone();
            RefundWorkflow::validate_transition(card.status, to)?;

            {
                let stored = e.stores.refunds.get_mut(refund_card_id)?;
                stored.status = to;
                stored.payment_type = Some(RefundPaymentType::Point);
                if to == RefundStatus::WorkTeamleader {
                    stored.auditor = Some(actor);
                }
            }
            if to == RefundStatus::ConfirmedTeamleader {
                e.notify(
                    NotificationKind::TeamLeadRefundReadyForWork,
                    refund_card_id,
                    None,
                );
            }
            Ok(())
        })
    }

    /// Cancels the active refund on a deal.
    pub fn cancel_refund(&mut self, deal_id: DealId) -> Result<(), EngineError> {
        self.cancel_refund_inner(deal_id, false, None)
    }

    /// Team-lead cancel, carrying an explanation to the notification.
    pub fn cancel_refund_team_lead(
        &mut self,
        deal_id: DealId,
        message: &str,
    ) -> Result<(), EngineError> {
        self.cancel_refund_inner(deal_id, true, Some(message))
    }

    fn cancel_refund_inner(
        &mut self,
        deal_id: DealId,
        team_lead: bool,
        message: Option<&str>,
    ) -> Result<(), EngineError> {
        self.with_rollback(|e| {
            let card = e.stores.refunds.by_deal_or_err(deal_id)?.clone();
            RefundWorkflow::validate_cancel(card.status)?;

            {
                let stored = e.stores.refunds.get_mut(card.id)?;
                stored.canceled_refund_deal_id = Some(deal_id);
                stored.deal_id = DealId::DETACHED;
                stored.status = RefundStatus::Canceled;
            }

            e.deals.update_stage(deal_id, &card.deal_stage_before_return)?;

            if !team_lead {
                e.stores.jobs.cancel(deal_id, JobKind::FullPaymentReceipt);
                e.stores.jobs.cancel(deal_id, JobKind::DelayedRefund);
            }

            let kind = if team_lead {
                NotificationKind::TeamLeadRefundCanceled
            } else {
                NotificationKind::RefundCanceled
            };
            e.notify(kind, card.id, message);

            info!(deal_id = %deal_id, refund_card = %card.id, team_lead, "refund canceled");
            Ok(())
        })
    }

    // ===== transition side effects =====

    /// Totals verified: sync the credit, post the refund realization acts.
    fn on_check_total_verified(
        &mut self,
        card: &RefundCard,
        now: DateTime<Utc>,
    ) -> Result<(), EngineError> {
        self.stores.refunds.get_mut(card.id)?.is_correct_amount_all = true;

        if let Some(credit) = self.stores.credits.info_by_deal(card.deal_id) {
            let credit_id = credit.id;
            self.stores
                .credits
                .reconcile_verified_refund(credit_id, card.return_cash)?;
        }

        let scheme = card
            .fin_card_id
            .and_then(|id| self.stores.cards.by_id(id))
            .map(|c| c.scheme);
        if let Some(scheme) = scheme {
            if !card.is_correction_card {
                let deal_id = card.deal_id;
                let payload = serde_json::json!({ "refundId": card.id.into_inner() });
                accounting::post_once(
                    &mut self.stores.journal,
                    deal_id,
                    EntryKind::RefundRealization,
                    now,
                    |kind| self.poster.post(kind, deal_id, &payload),
                )?;
                if matches!(scheme, SchemeWork::BuyerAgent | SchemeWork::ProvisionServices) {
                    accounting::post_once(
                        &mut self.stores.journal,
                        deal_id,
                        EntryKind::RefundIncome,
                        now,
                        |kind| self.poster.post(kind, deal_id, &payload),
                    )?;
                }
            }
        }
        Ok(())
    }

    /// Completion: execute the return, update the credit, clean up jobs.
    fn on_completed(&mut self, card: &RefundCard, now: DateTime<Utc>) -> Result<(), EngineError> {
        self.notify(NotificationKind::RefundCompleted, card.id, None);

        if card.payment_type == Some(RefundPaymentType::Point) {
            self.make_refund_point_receipt(card.deal_id, now)?;
            self.execute_point_refund(card, now)?;
            return Ok(());
        }

        if card.return_deposit > Decimal::ZERO {
            let deal = self.deals.deal(card.deal_id)?;
            self.deals
                .add_deposit(deal.contact_id, card.return_deposit, card.id)?;
        }

        self.execute_cash_return(card, now)?;

        if card.return_cash > Decimal::ZERO {
            if let Some(credit) = self.stores.credits.info_by_deal(card.deal_id) {
                let credit_id = credit.id;
                self.stores
                    .credits
                    .record_refund(credit_id, card.return_cash, now)?;
            }
        }

        self.stores
            .jobs
            .cancel(card.deal_id, JobKind::FullPaymentReceipt);

        if card.is_correction_card {
            // Correction refunds close themselves; no manual closure step.
            self.stores.refunds.get_mut(card.id)?.status = RefundStatus::Close;
            self.deals.mark_services_billable(card.deal_id)?;
        }
        Ok(())
    }

    /// Cash return: electronic reversal for card refunds, printed receipt
    /// for invoice refunds without an active credit.
    fn execute_cash_return(
        &mut self,
        card: &RefundCard,
        now: DateTime<Utc>,
    ) -> Result<(), EngineError> {
        if card.return_cash <= Decimal::ZERO {
            return Ok(());
        }
        let direction = card
            .direction_type
            .ok_or(RefundError::MissingDirection(card.id))?;

        match direction {
            DirectionType::Card => {
                let rate = self.stores.average_rates.get(card.deal_id).copied();
                let (fee, supplier) = match (
                    rate,
                    card.rs_tls_fee_currency,
                    card.supplier_return_currency,
                ) {
                    (Some(rate), Some(fee_currency), Some(supplier_currency)) => (
                        fee_currency * rate.factor(),
                        supplier_currency * rate.factor(),
                    ),
                    _ => (card.rs_tls_fee, card.supplier_return),
                };
                let product = round_money(card.return_cash - fee - supplier);
                debug!(
                    deal_id = %card.deal_id,
                    %product, %fee, %supplier,
                    "electronic reversal split"
                );

                self.stores.ledger.append(NewTransaction {
                    deal_id: card.deal_id,
                    payment_type: PaymentType::Refund,
                    status: PaymentStatus::Success,
                    amount: card.return_cash,
                    point_amount: None,
                    payment_by_point: false,
                    program: None,
                    is_correction: false,
                    date: now,
                })?;
            }
            DirectionType::Invoice => {
                if self.stores.credits.info_by_deal(card.deal_id).is_none() {
                    self.return_deal_refund(card.deal_id, now)?;
                }
            }
        }
        Ok(())
    }

    /// Point refund: reconcile the original loyalty debit, append the refund
    /// row, stage the bonus credit, post the point-refund entry.
    fn execute_point_refund(
        &mut self,
        card: &RefundCard,
        now: DateTime<Utc>,
    ) -> Result<(), EngineError> {
        if card.return_cash == Decimal::ZERO {
            return Err(RefundError::ZeroReturnCash(card.id).into());
        }

        let deal = self.deals.deal(card.deal_id)?;
        let profile = self.deals.bonus_profile(deal.contact_id)?.ok_or_else(|| {
            EngineError::Validation(format!(
                "Contact {} has no loyalty profile",
                deal.contact_id
            ))
        })?;

        let payments: Vec<_> = self
            .stores
            .ledger
            .point_payments(card.deal_id)
            .cloned()
            .collect();
        if payments.is_empty() {
            return Err(LedgerError::NoPointPayments(card.deal_id).into());
        }

        let amount: Decimal = payments.iter().map(|p| p.amount).sum();
        let point_amount: Decimal = payments.iter().filter_map(|p| p.point_amount).sum();
        let program = payments
            .last()
            .and_then(|p| p.program)
            .ok_or_else(|| EngineError::Validation("Point payment has no program".into()))?;
        let account = profile.account(program).ok_or_else(|| {
            EngineError::Validation(format!(
                "Contact {} is not enrolled in program {program}",
                deal.contact_id
            ))
        })?;

        // Find the loyalty-side debit matching one of the original payments.
        let history = self.bonus.account_history(&profile.client_external_id)?;
        let original_transaction_id = payments.iter().find_map(|payment| {
            history
                .iter()
                .find(|h| h.entry == DebitCredit::Debit && h.date == payment.date.date_naive())
                .map(|h| h.transaction_id)
        });

        let payment_id = self.stores.ledger.append(NewTransaction {
            deal_id: card.deal_id,
            payment_type: PaymentType::Refund,
            status: PaymentStatus::Success,
            amount,
            point_amount: Some(point_amount),
            payment_by_point: true,
            program: Some(program),
            is_correction: false,
            date: now,
        })?;

        self.stores.outbox.stage(BonusIntent {
            guid: Uuid::new_v4(),
            deal_id: card.deal_id,
            payment_id,
            client_external_id: profile.client_external_id.clone(),
            account_number: normalize_account_number(&account.account_number),
            program,
            point_amount,
            direction: BonusDirection::Credit,
            original_transaction_id,
            fulfilled: false,
        });

        let deal_id = card.deal_id;
        let payload = serde_json::json!({
            "dealId": deal_id.into_inner(),
            "paymentId": payment_id.into_inner(),
        });
        accounting::post_once(
            &mut self.stores.journal,
            deal_id,
            EntryKind::PointRefund,
            now,
            |kind| self.poster.post(kind, deal_id, &payload),
        )?;

        info!(deal_id = %deal_id, %payment_id, %point_amount, "point refund staged");
        Ok(())
    }
}

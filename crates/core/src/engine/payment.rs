//! Payment-side orchestration: advances, points, credits, corrections.

use chrono::{DateTime, Utc};
use farebox_shared::types::money::rounds_equal;
use farebox_shared::types::points::{normalize_account_number, LoyaltyProgram};
use farebox_shared::types::{ContactId, DealId, PaymentId, ReceiptId};
use rust_decimal::Decimal;
use tracing::{debug, info};
use uuid::Uuid;

use crate::accounting::{self, EntryKind, RealizationOutcome};
use crate::card::{CardError, FinancialCard};
use crate::credit::{CreditError, OperationKind};
use crate::deal::DealSummary;
use crate::external::{
    AccountingPoster, BonusOperation, BonusService, DealDirectory, FiscalProvider, Notifier,
};
use crate::ledger::{BonusDirection, BonusIntent, NewTransaction, PaymentStatus, PaymentType};
use crate::pricing::{self, ResolvedPrice};
use crate::receipt::{ReceiptManager, ReceiptStatus};
use crate::scheduler::JobKind;
use crate::strategy::{
    build_options, classify_credit_payment, classify_credit_refund, select_advance,
    strategy_type_by_date, CreditState, Decision, FieldContext, ReceiptOptions, ReceiptStrategy,
    ReceiptTag, ReceiptType, SelectorInput, StrategyKind,
};

use super::error::EngineError;
use super::Engine;

/// Outcome of an advance-path payment event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// A receipt row was created.
    Issued(ReceiptId),
    /// Not yet due; the full-payment pass was scheduled.
    Deferred(DateTime<Utc>),
}

/// Outcome of a correction-card pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrectionOutcome {
    /// The full-payment job was (re)scheduled; a delta receipt was issued
    /// only when correction payments exist.
    Scheduled {
        /// Effective run time of the scheduled job.
        run_at: DateTime<Utc>,
        /// The delta receipt, when one was issued.
        receipt: Option<ReceiptId>,
    },
    /// The deal was already due; a receipt was issued immediately.
    Issued(ReceiptId),
}

/// Credit-related fields flowing onto a receipt.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct CreditReceiptFields {
    pub is_first: bool,
    pub advance: Option<Decimal>,
    pub installment: Option<Decimal>,
}

impl<D, F, B, N, P> Engine<D, F, B, N, P>
where
    D: DealDirectory,
    F: FiscalProvider,
    B: BonusService,
    N: Notifier,
    P: AccountingPoster,
{
    /// Handles an advance-path payment event for a deal.
    ///
    /// Active installment credits win over timing; prepayment deals that are
    /// not yet due defer to service start; short payments force credit-style
    /// wording; everything else issues the timing receipt. Point-funded
    /// deals additionally run the realization/entrance pass.
    pub fn process_advance_payment(
        &mut self,
        deal_id: DealId,
        now: DateTime<Utc>,
    ) -> Result<AdvanceOutcome, EngineError> {
        self.with_rollback(|e| {
            let deal = e.deals.deal(deal_id)?;
            let card = e.stores.cards.active_or_err(deal_id)?.clone();
            let price = e.resolved_price(&card)?;

            if let Some(credit) = e.stores.credits.info_by_deal(deal_id) {
                if !credit.is_fully_paid() {
                    let is_first = e.stores.credits.is_first_checkpoint(credit.id);
                    let receipt = e.make_credit_payment(deal_id, is_first, PaymentId::NONE, now)?;
                    return Ok(AdvanceOutcome::Issued(receipt));
                }
            }

            if e.stores.ledger.has_point_payment(deal_id) {
                return e.process_point_advance(&deal, &card, &price, now);
            }

            let decision = select_advance(&SelectorInput {
                scheme: card.scheme,
                category: deal.category,
                service_start: deal.service_start,
                now,
                paid_total: e.stores.ledger.sum_incoming(deal_id),
                price_total: price.result,
                credit: None,
            });

            match decision {
                Decision::Defer { run_at } => Ok(AdvanceOutcome::Deferred(e.defer_full_payment(
                    deal_id, run_at,
                ))),
                Decision::Issue(kind) => {
                    let total = e.full_price_for_receipt(deal_id, &card, kind, false, price.result)?;
                    let advance = e.stores.ledger.sum_incoming(deal_id);
                    let fields = CreditReceiptFields {
                        advance: (kind_is_credit_series(kind) && advance > Decimal::ZERO)
                            .then_some(advance),
                        ..CreditReceiptFields::default()
                    };
                    let receipt = e.issue_income_receipt(
                        &card,
                        &price,
                        kind,
                        total,
                        PaymentId::NONE,
                        fields,
                        false,
                        now,
                    )?;
                    Ok(AdvanceOutcome::Issued(receipt))
                }
            }
        })
    }

    /// Point-funded advance: defer before service start, otherwise issue the
    /// settlement receipt and run the realization pass.
    fn process_point_advance(
        &mut self,
        deal: &DealSummary,
        card: &FinancialCard,
        price: &ResolvedPrice,
        now: DateTime<Utc>,
    ) -> Result<AdvanceOutcome, EngineError> {
        let kind = strategy_type_by_date(deal.category, card.scheme, deal.service_start, now);
        if kind == StrategyKind::Prepayment {
            return Ok(AdvanceOutcome::Deferred(
                self.defer_full_payment(deal.id, deal.service_start),
            ));
        }

        let total = self.full_price_for_receipt(deal.id, card, kind, false, price.result)?;
        let receipt = self.issue_income_receipt(
            card,
            price,
            kind,
            total,
            PaymentId::NONE,
            CreditReceiptFields::default(),
            true,
            now,
        )?;
        self.create_realization_entrance(deal.id, now)?;
        Ok(AdvanceOutcome::Issued(receipt))
    }

    /// Takes a point payment: ledger row, staged bonus debit, daily rate,
    /// and the point-payment posting — one unit of work.
    pub fn record_point_payment(
        &mut self,
        deal_id: DealId,
        contact_id: ContactId,
        points: Decimal,
        program: LoyaltyProgram,
        now: DateTime<Utc>,
    ) -> Result<PaymentId, EngineError> {
        self.with_rollback(|e| {
            let profile = e.deals.bonus_profile(contact_id)?.ok_or_else(|| {
                EngineError::Validation(format!("Contact {contact_id} has no loyalty profile"))
            })?;
            let account = profile.account(program).ok_or_else(|| {
                EngineError::Validation(format!(
                    "Contact {contact_id} is not enrolled in program {program}"
                ))
            })?;

            let amount = pricing::cash_equivalent(points, account.rate);
            let payment_id = e.stores.ledger.append(NewTransaction {
                deal_id,
                payment_type: PaymentType::Incoming,
                status: PaymentStatus::Success,
                amount,
                point_amount: Some(points),
                payment_by_point: true,
                program: Some(program),
                is_correction: false,
                date: now,
            })?;

            e.stores.outbox.stage(BonusIntent {
                guid: Uuid::new_v4(),
                deal_id,
                payment_id,
                client_external_id: profile.client_external_id.clone(),
                account_number: normalize_account_number(&account.account_number),
                program,
                point_amount: points,
                direction: BonusDirection::Debit,
                original_transaction_id: None,
                fulfilled: false,
            });

            e.stores.point_rates.record(program, now.date_naive(), account.rate);

            let poster = &mut e.poster;
            accounting::post_once(
                &mut e.stores.journal,
                deal_id,
                EntryKind::PointPayment,
                now,
                |kind| {
                    poster.post(
                        kind,
                        deal_id,
                        &serde_json::json!({
                            "dealId": deal_id.into_inner(),
                            "paymentId": payment_id.into_inner(),
                        }),
                    )
                },
            )?;

            info!(deal_id = %deal_id, %payment_id, %points, %amount, "point payment recorded");
            Ok(payment_id)
        })
    }

    /// Worker pass over the bonus outbox.
    ///
    /// Fulfilled intents stay fulfilled even when later intents fail; the
    /// per-intent GUID makes re-running after a failure safe. Returns the
    /// number of intents fulfilled this pass.
    pub fn drain_bonus_outbox(&mut self) -> Result<usize, EngineError> {
        let pending = self.stores.outbox.pending();
        let mut fulfilled = 0;
        let mut failures = Vec::new();

        for intent in pending {
            let op = BonusOperation {
                client_external_id: intent.client_external_id.clone(),
                account_number: intent.account_number.clone(),
                program: intent.program,
                amount: intent.point_amount,
                guid: intent.guid,
                transaction_id: intent.original_transaction_id,
            };
            let result = match intent.direction {
                BonusDirection::Debit => self.bonus.debit(&op),
                BonusDirection::Credit => self.bonus.credit(&op),
            };
            match result {
                Ok(()) => {
                    self.stores.outbox.mark_fulfilled(intent.guid);
                    fulfilled += 1;
                }
                Err(error) => failures.push(format!("{}: {error}", intent.guid)),
            }
        }

        if failures.is_empty() {
            Ok(fulfilled)
        } else {
            Err(EngineError::External(crate::external::ExternalError::new(
                format!("Bonus service errors: {}", failures.join("; ")),
            )))
        }
    }

    /// Realization and entrance postings for a point-paid deal.
    pub fn create_realization_entrance(
        &mut self,
        deal_id: DealId,
        now: DateTime<Utc>,
    ) -> Result<RealizationOutcome, EngineError> {
        let has_point = self.stores.ledger.has_point_payment(deal_id);
        let scheme = self.stores.cards.active(deal_id).map(|c| c.scheme);
        let debt = if has_point && scheme.is_some() {
            self.amount_debt(deal_id)?
        } else {
            Decimal::ZERO
        };

        let poster = &mut self.poster;
        let outcome = accounting::create_realization_entrance(
            &mut self.stores.journal,
            deal_id,
            has_point,
            debt,
            scheme,
            now,
            |kind| {
                poster.post(
                    kind,
                    deal_id,
                    &serde_json::json!({ "dealId": deal_id.into_inner() }),
                )
            },
        )?;
        debug!(deal_id = %deal_id, ?outcome, "realization pass");
        Ok(outcome)
    }

    /// Realization sweep over a batch of deals whose service date arrived.
    ///
    /// The cron-style counterpart of [`Self::create_realization_entrance`]:
    /// every deal re-validates its own preconditions, so deals that gained
    /// debt or lost their card since scheduling simply skip.
    pub fn run_realization_sweep(
        &mut self,
        deal_ids: &[DealId],
        now: DateTime<Utc>,
    ) -> Result<Vec<(DealId, RealizationOutcome)>, EngineError> {
        let mut outcomes = Vec::with_capacity(deal_ids.len());
        for &deal_id in deal_ids {
            outcomes.push((deal_id, self.create_realization_entrance(deal_id, now)?));
        }
        Ok(outcomes)
    }

    /// Attaches a financial card to a deal.
    ///
    /// A card already referenced by an issued receipt is immutable; only a
    /// correction card may take its place after that.
    pub fn attach_financial_card(
        &mut self,
        input: crate::card::NewFinancialCard,
    ) -> Result<farebox_shared::types::CardId, EngineError> {
        let deal_id = input.deal_id;
        if !input.is_correction_after_deal
            && self.stores.cards.active(deal_id).is_some()
            && self.stores.receipts.for_deal(deal_id).next().is_some()
        {
            return Err(CardError::Frozen(deal_id).into());
        }
        Ok(self.stores.cards.attach(input))
    }

    /// Signed remaining balance of a deal (positive: the client owes).
    pub fn amount_debt(&self, deal_id: DealId) -> Result<Decimal, EngineError> {
        let card = self.stores.cards.active_or_err(deal_id)?;
        let price = self.resolved_price(card)?;
        Ok(pricing::amount_debt(
            price.result,
            self.stores.ledger.recognized_paid(deal_id),
        ))
    }

    /// Builds the pre-receipt preview payload. Persists nothing.
    pub fn make_pre_receipt(
        &self,
        deal_id: DealId,
        now: DateTime<Utc>,
    ) -> Result<String, EngineError> {
        let deal = self.deals.deal(deal_id)?;
        let card = self.stores.cards.active_or_err(deal_id)?.clone();
        let price = self.resolved_price(&card)?;
        let advance = self.stores.ledger.sum_incoming(deal_id);

        let mut kind = strategy_type_by_date(deal.category, card.scheme, deal.service_start, now);
        if !rounds_equal(advance, price.result) {
            kind = if advance == Decimal::ZERO {
                StrategyKind::CreditTransfer
            } else {
                StrategyKind::Credit
            };
        }

        let total = self.full_price_for_receipt(deal_id, &card, kind, true, price.result)?;
        let fields = CreditReceiptFields {
            advance: (advance > Decimal::ZERO && kind != StrategyKind::Prepayment)
                .then_some(advance),
            ..CreditReceiptFields::default()
        };
        let strategy = self.build_income_strategy(&card, &price, kind, total, fields, false, now)?;
        Ok(ReceiptManager::new(&self.config).create_pre_receipt(&strategy)?)
    }

    /// Issues the "transfer into credit" receipt.
    pub fn make_credit_transfer(
        &mut self,
        deal_id: DealId,
        now: DateTime<Utc>,
    ) -> Result<ReceiptId, EngineError> {
        self.issue_transfer_receipt(deal_id, StrategyKind::CreditTransfer, now)
    }

    /// Issues the "reversal of transfer into credit" receipt.
    pub fn make_credit_refund_transfer(
        &mut self,
        deal_id: DealId,
        now: DateTime<Utc>,
    ) -> Result<ReceiptId, EngineError> {
        self.issue_transfer_receipt(deal_id, StrategyKind::CreditRefundTransfer, now)
    }

    fn issue_transfer_receipt(
        &mut self,
        deal_id: DealId,
        kind: StrategyKind,
        now: DateTime<Utc>,
    ) -> Result<ReceiptId, EngineError> {
        self.with_rollback(|e| {
            let card = e.stores.cards.active_or_err(deal_id)?.clone();
            let price = e.resolved_price(&card)?;
            let total = e.full_price_for_receipt(deal_id, &card, kind, false, price.result)?;
            let advance = e.stores.ledger.sum_incoming(deal_id);
            let fields = CreditReceiptFields {
                advance: (advance > Decimal::ZERO).then_some(advance),
                ..CreditReceiptFields::default()
            };
            e.issue_income_receipt(&card, &price, kind, total, PaymentId::NONE, fields, false, now)
        })
    }

    /// Issues an installment checkpoint receipt (partial or final).
    pub fn make_credit_payment(
        &mut self,
        deal_id: DealId,
        is_first: bool,
        payment_id: PaymentId,
        now: DateTime<Utc>,
    ) -> Result<ReceiptId, EngineError> {
        self.with_rollback(|e| {
            let credit = e
                .stores
                .credits
                .info_by_deal(deal_id)
                .ok_or(CreditError::NotFound(deal_id))?
                .clone();
            let card = e.stores.cards.active_or_err(deal_id)?.clone();
            let price = e.resolved_price(&card)?;

            let kind = classify_credit_payment(credit.amount_remaining);
            let fields = CreditReceiptFields {
                is_first,
                advance: (credit.amount_paid > Decimal::ZERO).then_some(credit.amount_paid),
                installment: Some(credit.normalized_last_payment()),
            };
            e.issue_income_receipt(
                &card,
                &price,
                kind,
                credit.amount_total,
                payment_id,
                fields,
                false,
                now,
            )
        })
    }

    /// Issues an installment refund checkpoint receipt (partial or full).
    pub fn make_credit_refund_payment(
        &mut self,
        deal_id: DealId,
        is_first: bool,
        payment_id: PaymentId,
        now: DateTime<Utc>,
    ) -> Result<ReceiptId, EngineError> {
        self.with_rollback(|e| {
            let credit = e
                .stores
                .credits
                .info_by_deal(deal_id)
                .ok_or(CreditError::NotFound(deal_id))?
                .clone();
            let card = e.stores.cards.active_or_err(deal_id)?.clone();
            let price = e.resolved_price(&card)?;

            let state = CreditState {
                remaining: credit.amount_remaining,
                is_first_checkpoint: is_first,
                last_operation_full_refund: matches!(
                    e.stores
                        .credits
                        .last_financial_operation(credit.id)
                        .map(|op| op.kind),
                    Some(OperationKind::RefundFullPaid)
                ),
                has_full_payment: e.stores.credits.is_full_payment(credit.id),
            };
            let kind = classify_credit_refund(&state);
            let fields = CreditReceiptFields {
                is_first,
                advance: Some(credit.amount_paid),
                installment: Some(credit.normalized_last_payment()),
            };
            e.issue_income_receipt(
                &card,
                &price,
                kind,
                credit.amount_total,
                payment_id,
                fields,
                false,
                now,
            )
        })
    }

    /// Issues the point-refund fiscal receipt.
    pub fn make_refund_point_receipt(
        &mut self,
        deal_id: DealId,
        now: DateTime<Utc>,
    ) -> Result<ReceiptId, EngineError> {
        self.with_rollback(|e| {
            let card = e.stores.cards.active_or_err(deal_id)?.clone();
            let price = e.resolved_price(&card)?;
            let kind = StrategyKind::CreditRefundTransfer;
            let total = e.full_price_for_receipt(deal_id, &card, kind, false, price.result)?;
            let fields = CreditReceiptFields {
                is_first: false,
                advance: Some(Decimal::ZERO),
                installment: None,
            };
            e.issue_income_receipt(&card, &price, kind, total, PaymentId::NONE, fields, false, now)
        })
    }

    /// Records a cash installment and issues its checkpoint receipt.
    pub fn process_credit_installment(
        &mut self,
        deal_id: DealId,
        amount: Decimal,
        now: DateTime<Utc>,
    ) -> Result<(PaymentId, ReceiptId), EngineError> {
        self.with_rollback(|e| {
            let credit_id = e
                .stores
                .credits
                .info_by_deal(deal_id)
                .ok_or(CreditError::NotFound(deal_id))?
                .id;
            let is_first = e.stores.credits.is_first_checkpoint(credit_id);
            let payment_id = e
                .stores
                .ledger
                .append(NewTransaction::incoming_cash(deal_id, amount, now))?;
            e.stores.credits.record_payment(credit_id, amount, now)?;
            let receipt = e.make_credit_payment(deal_id, is_first, payment_id, now)?;
            Ok((payment_id, receipt))
        })
    }

    /// Records an installment refund and issues its checkpoint receipt.
    pub fn process_credit_refund(
        &mut self,
        deal_id: DealId,
        amount: Decimal,
        now: DateTime<Utc>,
    ) -> Result<(PaymentId, ReceiptId), EngineError> {
        self.with_rollback(|e| {
            let credit_id = e
                .stores
                .credits
                .info_by_deal(deal_id)
                .ok_or(CreditError::NotFound(deal_id))?
                .id;
            let is_first = e.stores.credits.is_first_checkpoint(credit_id);
            let payment_id = e.stores.ledger.append(NewTransaction {
                payment_type: PaymentType::Refund,
                ..NewTransaction::incoming_cash(deal_id, amount, now)
            })?;
            e.stores.credits.record_refund(credit_id, amount, now)?;
            let receipt = e.make_credit_refund_payment(deal_id, is_first, payment_id, now)?;
            Ok((payment_id, receipt))
        })
    }

    /// Correction-card pass: delta receipts, deferred before service start.
    pub fn make_payment_correction(
        &mut self,
        deal_id: DealId,
        now: DateTime<Utc>,
    ) -> Result<CorrectionOutcome, EngineError> {
        self.with_rollback(|e| {
            let deal = e.deals.deal(deal_id)?;
            let card = e.stores.cards.active_or_err(deal_id)?.clone();
            let kind = strategy_type_by_date(deal.category, card.scheme, deal.service_start, now);

            if kind == StrategyKind::Prepayment {
                let run_at = e.defer_full_payment(deal_id, deal.service_start);

                // No charges in the correction card yet: nothing to fiscalize.
                if !e.stores.ledger.has_correction_payment(deal_id) {
                    return Ok(CorrectionOutcome::Scheduled {
                        run_at,
                        receipt: None,
                    });
                }

                let preceding = e
                    .stores
                    .cards
                    .preceding(deal_id)
                    .ok_or(CardError::NoPrecedingCard(deal_id))?
                    .clone();
                let rate = e.stores.average_rates.get(deal_id).copied();
                let delta = pricing::correction_delta(&card.price, &preceding.price);
                let price = pricing::resolve(deal_id, &delta, rate.as_ref())?;
                let total =
                    pricing::result_delta(deal_id, &card.price, &preceding.price, rate.as_ref())?;

                let receipt = e.issue_income_receipt(
                    &card,
                    &price,
                    kind,
                    total,
                    PaymentId::NONE,
                    CreditReceiptFields::default(),
                    false,
                    now,
                )?;
                return Ok(CorrectionOutcome::Scheduled {
                    run_at,
                    receipt: Some(receipt),
                });
            }

            let price = e.resolved_price(&card)?;
            let total = e.full_price_for_receipt(deal_id, &card, kind, false, price.result)?;
            let receipt = e.issue_income_receipt(
                &card,
                &price,
                kind,
                total,
                PaymentId::NONE,
                CreditReceiptFields::default(),
                false,
                now,
            )?;
            Ok(CorrectionOutcome::Issued(receipt))
        })
    }

    /// Issues the advance return receipt.
    ///
    /// The amount defaults to everything the client has successfully paid;
    /// penalties are handled by passing an explicit reduced amount.
    pub fn return_deal_advance(
        &mut self,
        deal_id: DealId,
        return_price: Option<Decimal>,
        is_real_return: bool,
        now: DateTime<Utc>,
    ) -> Result<ReceiptId, EngineError> {
        self.with_rollback(|e| {
            let deal = e.deals.deal(deal_id)?;
            let total = match return_price {
                Some(price) => price,
                None => e.stores.ledger.sum_incoming(deal_id),
            };
            let customer = e.deals.client_name(deal.contact_id)?;

            let mut builder = ReceiptOptions::builder(
                format!("RETURN_ADVANCE_DEAL_{deal_id}_0"),
                deal_id,
                total,
            )
            .customer_name(customer)
            .email(e.config.receipt.service_email.clone());
            if is_real_return {
                builder = builder.real_return();
            }

            let strategy = ReceiptStrategy {
                kind: StrategyKind::Advance,
                receipt_type: ReceiptType::Return,
                tag: ReceiptTag::Advance,
                options: builder.build(),
            };
            let manager = ReceiptManager::new(&e.config);
            Ok(manager.create(&mut e.stores.receipts, deal_id, PaymentId::NONE, &strategy, now)?)
        })
    }

    /// Issues the refund receipt variant matching the last printed receipt.
    ///
    /// An advance last-receipt refunds as an advance return; otherwise the
    /// final-payment return carries the product/fee/supplier split.
    pub fn return_deal_refund(
        &mut self,
        deal_id: DealId,
        now: DateTime<Utc>,
    ) -> Result<ReceiptId, EngineError> {
        self.with_rollback(|e| {
            let refund = e.stores.refunds.by_deal_or_err(deal_id)?.clone();
            let last = e
                .stores
                .receipts
                .last_for_deal(deal_id)
                .ok_or_else(|| {
                    EngineError::Validation(format!("Deal {deal_id} has no printed receipts"))
                })?
                .clone();

            if last.payment_kind == StrategyKind::Advance {
                return e.return_deal_advance(deal_id, Some(refund.return_cash), true, now);
            }

            let card = e.stores.cards.active_or_err(deal_id)?.clone();
            let rate = e.stores.average_rates.get(deal_id).copied();
            let (fee, supplier) = match (rate, refund.rs_tls_fee_currency, refund.supplier_return_currency) {
                (Some(rate), Some(fee_currency), Some(supplier_currency)) => (
                    fee_currency * rate.factor(),
                    supplier_currency * rate.factor(),
                ),
                _ => (refund.rs_tls_fee, refund.supplier_return),
            };
            let product =
                farebox_shared::types::money::round_money(refund.return_cash - fee - supplier);
            let is_real = refund.direction_type == Some(crate::refund::DirectionType::Card);

            let mut builder = ReceiptOptions::builder(
                crate::strategy::invoice_id(last.payment_kind, deal_id, now),
                deal_id,
                refund.return_cash,
            )
            .return_split(product, fee, supplier)
            .email(e.config.receipt.service_email.clone());

            if let Some(name) = e.deals.product_name(deal_id)? {
                builder = builder.product_name(name);
            }
            if card.scheme.refund_requires_company_identity() {
                let company = e.deals.company_identity(deal_id)?.ok_or(
                    crate::strategy::StrategyError::MissingCompanyIdentity {
                        scheme: card.scheme,
                    },
                )?;
                builder = builder.company(company.inn, company.name);
            }
            if is_real {
                builder = builder.real_return();
            }

            let strategy = ReceiptStrategy {
                kind: last.payment_kind,
                receipt_type: ReceiptType::Return,
                tag: ReceiptTag::FinalPayment,
                options: builder.build(),
            };
            let manager = ReceiptManager::new(&e.config);
            Ok(manager.create(&mut e.stores.receipts, deal_id, PaymentId::NONE, &strategy, now)?)
        })
    }

    /// Routes a deal entering the installment payment model.
    ///
    /// Fully paid deals fall back to the advance path. Deals already due
    /// issue the transfer-into-credit receipt now; the rest schedule the
    /// full-paid check for service start.
    pub fn process_credit_intake(
        &mut self,
        deal_id: DealId,
        now: DateTime<Utc>,
    ) -> Result<AdvanceOutcome, EngineError> {
        let deal = self.deals.deal(deal_id)?;
        let card = self.stores.cards.active_or_err(deal_id)?.clone();
        let price = self.resolved_price(&card)?;

        if rounds_equal(self.stores.ledger.sum_incoming(deal_id), price.result) {
            return self.process_advance_payment(deal_id, now);
        }
        if crate::strategy::is_momentary(deal.category, card.scheme) || deal.service_start <= now {
            return self
                .make_credit_transfer(deal_id, now)
                .map(AdvanceOutcome::Issued);
        }
        let run_at = self
            .stores
            .jobs
            .schedule(deal_id, JobKind::FullPaidCheck, deal.service_start);
        Ok(AdvanceOutcome::Deferred(run_at))
    }

    /// Deferred full-paid check: full payment reached issues the settlement
    /// receipt, otherwise the transfer-into-credit receipt.
    pub fn check_full_paid(
        &mut self,
        deal_id: DealId,
        now: DateTime<Utc>,
    ) -> Result<AdvanceOutcome, EngineError> {
        let card = self.stores.cards.active_or_err(deal_id)?.clone();
        let price = self.resolved_price(&card)?;
        if rounds_equal(self.stores.ledger.sum_incoming(deal_id), price.result) {
            self.process_advance_payment(deal_id, now)
        } else {
            self.make_credit_transfer(deal_id, now)
                .map(AdvanceOutcome::Issued)
        }
    }

    /// Submits a receipt to the fiscal provider.
    pub fn push_receipt(&mut self, id: ReceiptId) -> Result<ReceiptStatus, EngineError> {
        let manager = ReceiptManager::new(&self.config);
        Ok(manager.push(&mut self.stores.receipts, &mut self.fiscal, id)?)
    }

    /// Polls a submitted receipt for its rendered document.
    pub fn pull_receipt(&mut self, id: ReceiptId) -> Result<ReceiptStatus, EngineError> {
        let manager = ReceiptManager::new(&self.config);
        Ok(manager.pull(&mut self.stores.receipts, &mut self.fiscal, id)?)
    }

    // ===== shared helpers =====

    pub(crate) fn resolved_price(
        &self,
        card: &FinancialCard,
    ) -> Result<ResolvedPrice, EngineError> {
        Ok(pricing::resolve(
            card.deal_id,
            &card.price,
            self.stores.average_rates.get(card.deal_id),
        )?)
    }

    fn defer_full_payment(&mut self, deal_id: DealId, run_at: DateTime<Utc>) -> DateTime<Utc> {
        let effective = self
            .stores
            .jobs
            .schedule(deal_id, JobKind::FullPaymentReceipt, run_at);
        info!(deal_id = %deal_id, run_at = %effective, "full-payment receipt deferred");
        effective
    }

    /// Receipt total per the settlement state of the deal.
    fn full_price_for_receipt(
        &self,
        deal_id: DealId,
        card: &FinancialCard,
        kind: StrategyKind,
        is_pre_receipt: bool,
        price_result: Decimal,
    ) -> Result<Decimal, EngineError> {
        if is_pre_receipt {
            if card.is_correction_after_deal
                && matches!(kind, StrategyKind::Prepayment | StrategyKind::Credit)
            {
                return self.correction_result_delta(card);
            }
            let paid = self.stores.ledger.sum_incoming(deal_id);
            if paid == price_result {
                Ok(paid)
            } else {
                Ok(price_result)
            }
        } else {
            if let Some(credit) = self.stores.credits.info_by_deal(deal_id) {
                return Ok(credit.amount_total);
            }
            if card.is_correction_after_deal && kind == StrategyKind::Prepayment {
                return self.correction_result_delta(card);
            }
            Ok(self.stores.ledger.sum_incoming(deal_id))
        }
    }

    fn correction_result_delta(&self, card: &FinancialCard) -> Result<Decimal, EngineError> {
        let preceding = self
            .stores
            .cards
            .preceding(card.deal_id)
            .ok_or(CardError::NoPrecedingCard(card.deal_id))?;
        Ok(pricing::result_delta(
            card.deal_id,
            &card.price,
            &preceding.price,
            self.stores.average_rates.get(card.deal_id),
        )?)
    }

    #[allow(clippy::too_many_arguments)]
    fn build_income_strategy(
        &self,
        card: &FinancialCard,
        price: &ResolvedPrice,
        kind: StrategyKind,
        total: Decimal,
        credit_fields: CreditReceiptFields,
        point_settlement: bool,
        now: DateTime<Utc>,
    ) -> Result<ReceiptStrategy, EngineError> {
        let company = self.deals.company_identity(card.deal_id)?;
        let product = self.deals.product_name(card.deal_id)?;
        let ctx = FieldContext {
            deal_id: card.deal_id,
            kind,
            price,
            total,
            supplier_vat: card.supplier_vat,
            company: company.as_ref(),
            product_name: product.as_deref(),
            service_email: &self.config.receipt.service_email,
            now,
            is_first_credit_checkpoint: credit_fields.is_first,
            credit_advance: credit_fields.advance,
            credit_installment: credit_fields.installment,
            point_settlement,
        };
        Ok(build_options(card.scheme, &ctx)?)
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn issue_income_receipt(
        &mut self,
        card: &FinancialCard,
        price: &ResolvedPrice,
        kind: StrategyKind,
        total: Decimal,
        payment_id: PaymentId,
        credit_fields: CreditReceiptFields,
        point_settlement: bool,
        now: DateTime<Utc>,
    ) -> Result<ReceiptId, EngineError> {
        let strategy =
            self.build_income_strategy(card, price, kind, total, credit_fields, point_settlement, now)?;
        let manager = ReceiptManager::new(&self.config);
        Ok(manager.create(
            &mut self.stores.receipts,
            card.deal_id,
            payment_id,
            &strategy,
            now,
        )?)
    }
}

const fn kind_is_credit_series(kind: StrategyKind) -> bool {
    matches!(
        kind,
        StrategyKind::Credit
            | StrategyKind::CreditTransfer
            | StrategyKind::CreditFull
            | StrategyKind::CreditRefund
            | StrategyKind::CreditRefundFull
            | StrategyKind::CreditRefundTransfer
    )
}

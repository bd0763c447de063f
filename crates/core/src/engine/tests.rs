//! Engine integration tests over fake collaborators.

use std::collections::HashMap;

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use farebox_shared::config::EngineConfig;
use farebox_shared::types::points::LoyaltyProgram;
use farebox_shared::types::{ContactId, DealId, RefundCardId, UserId};

use crate::accounting::EntryKind;
use crate::card::{NewFinancialCard, SchemeWork};
use crate::deal::{DealCategory, DealSummary};
use crate::external::{
    BonusAccount, BonusHistoryEntry, BonusOperation, BonusProfile, CashboxInfo, DealDirectory,
    DebitCredit, ExternalError, FiscalCreateResponse, FiscalInfo, NotificationKind,
};
use crate::ledger::NewTransaction;
use crate::pricing::PriceBreakdown;
use crate::refund::{DirectionType, RefundStatus};
use crate::scheduler::JobKind;
use crate::strategy::{CompanyIdentity, ReceiptTag, ReceiptType, StrategyKind};

use super::payment::{AdvanceOutcome, CorrectionOutcome};
use super::Engine;

// ===== fakes =====

#[derive(Default)]
struct FakeDeals {
    deals: HashMap<DealId, DealSummary>,
    company: Option<CompanyIdentity>,
    product: Option<String>,
    profile: Option<BonusProfile>,
    updated_stages: Vec<(DealId, String)>,
    deposits: Vec<(ContactId, Decimal, RefundCardId)>,
    billable: Vec<DealId>,
}

impl DealDirectory for FakeDeals {
    fn deal(&self, id: DealId) -> Result<DealSummary, ExternalError> {
        self.deals
            .get(&id)
            .cloned()
            .ok_or_else(|| ExternalError::new(format!("deal {id} not found")))
    }

    fn update_stage(&mut self, id: DealId, stage_id: &str) -> Result<(), ExternalError> {
        self.updated_stages.push((id, stage_id.to_string()));
        Ok(())
    }

    fn mark_services_billable(&mut self, id: DealId) -> Result<(), ExternalError> {
        self.billable.push(id);
        Ok(())
    }

    fn company_identity(&self, _id: DealId) -> Result<Option<CompanyIdentity>, ExternalError> {
        Ok(self.company.clone())
    }

    fn product_name(&self, _id: DealId) -> Result<Option<String>, ExternalError> {
        Ok(self.product.clone())
    }

    fn client_name(&self, _contact: ContactId) -> Result<String, ExternalError> {
        Ok("Ivanov Ivan Ivanovich".to_string())
    }

    fn bonus_profile(&self, _contact: ContactId) -> Result<Option<BonusProfile>, ExternalError> {
        Ok(self.profile.clone())
    }

    fn add_deposit(
        &mut self,
        contact: ContactId,
        amount: Decimal,
        refund_card: RefundCardId,
    ) -> Result<(), ExternalError> {
        self.deposits.push((contact, amount, refund_card));
        Ok(())
    }
}

#[derive(Default)]
struct FakeFiscal {
    created: u32,
}

impl crate::external::FiscalProvider for FakeFiscal {
    fn create(&mut self, _payload: &str) -> Result<FiscalCreateResponse, ExternalError> {
        self.created += 1;
        Ok(FiscalCreateResponse {
            receipt_id: Some(format!("ofd-{}", self.created)),
        })
    }

    fn info(&self, _fiscal_receipt_id: &str) -> Result<FiscalInfo, ExternalError> {
        Ok(FiscalInfo {
            cashbox: Some(CashboxInfo {
                register_number: "00012345".to_string(),
                storage_serial: "99000001".to_string(),
                document_number: "1234".to_string(),
                document_attribute: "567890".to_string(),
            }),
        })
    }

    fn render_html(&self, _url: &str) -> Result<Option<String>, ExternalError> {
        Ok(Some("<html>receipt</html>".to_string()))
    }
}

#[derive(Default)]
struct FakeBonus {
    history: Vec<BonusHistoryEntry>,
    fail: bool,
    debits: Vec<BonusOperation>,
    credits: Vec<BonusOperation>,
}

impl crate::external::BonusService for FakeBonus {
    fn debit(&mut self, op: &BonusOperation) -> Result<(), ExternalError> {
        if self.fail {
            return Err(ExternalError::new("bonus service fault"));
        }
        self.debits.push(op.clone());
        Ok(())
    }

    fn credit(&mut self, op: &BonusOperation) -> Result<(), ExternalError> {
        if self.fail {
            return Err(ExternalError::new("bonus service fault"));
        }
        self.credits.push(op.clone());
        Ok(())
    }

    fn account_history(
        &self,
        _client_external_id: &str,
    ) -> Result<Vec<BonusHistoryEntry>, ExternalError> {
        Ok(self.history.clone())
    }
}

#[derive(Default)]
struct FakeNotifier {
    fail: bool,
    sent: Vec<(NotificationKind, RefundCardId)>,
}

impl crate::external::Notifier for FakeNotifier {
    fn send(
        &mut self,
        kind: NotificationKind,
        refund_card: RefundCardId,
        _message: Option<&str>,
    ) -> Result<(), ExternalError> {
        if self.fail {
            return Err(ExternalError::new("mail relay down"));
        }
        self.sent.push((kind, refund_card));
        Ok(())
    }
}

#[derive(Default)]
struct FakePoster {
    fail_kind: Option<EntryKind>,
    posted: Vec<(EntryKind, DealId)>,
}

impl crate::external::AccountingPoster for FakePoster {
    fn post(
        &mut self,
        kind: EntryKind,
        deal_id: DealId,
        _payload: &serde_json::Value,
    ) -> Result<(), ExternalError> {
        if self.fail_kind == Some(kind) {
            return Err(ExternalError::new(format!("posting {kind} rejected")));
        }
        self.posted.push((kind, deal_id));
        Ok(())
    }
}

type TestEngine = Engine<FakeDeals, FakeFiscal, FakeBonus, FakeNotifier, FakePoster>;

// ===== fixture =====

const DEAL: DealId = DealId(1);
const CONTACT: ContactId = ContactId(10);
const AUDITOR: UserId = UserId(77);

fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, day, hour, 0, 0).unwrap()
}

fn test_engine() -> TestEngine {
    let mut config = EngineConfig::default();
    config.fiscal.settle_delay_secs = 0;

    let mut deals = FakeDeals {
        company: Some(CompanyIdentity {
            inn: "7710000000".to_string(),
            name: "Supplier LLC".to_string(),
        }),
        product: Some("Tour package".to_string()),
        profile: Some(BonusProfile {
            client_external_id: "KS-100".to_string(),
            accounts: vec![(
                LoyaltyProgram::Mr,
                BonusAccount {
                    account_number: "123456789012345".to_string(),
                    rate: dec!(1.5),
                },
            )],
        }),
        ..FakeDeals::default()
    };
    deals.deals.insert(
        DEAL,
        DealSummary {
            id: DEAL,
            contact_id: CONTACT,
            category: DealCategory::Tour,
            stage_id: "C1:WON".to_string(),
            service_start: at(10, 12),
        },
    );

    Engine::new(
        config,
        deals,
        FakeFiscal::default(),
        FakeBonus::default(),
        FakeNotifier::default(),
        FakePoster::default(),
    )
}

fn cash_price(result: Decimal) -> PriceBreakdown {
    PriceBreakdown {
        supplier: result - dec!(200),
        service: dec!(200),
        result,
        ..PriceBreakdown::default()
    }
}

fn attach_card(engine: &mut TestEngine, scheme: SchemeWork, result: Decimal) {
    engine.stores.cards.attach(NewFinancialCard {
        deal_id: DEAL,
        scheme,
        is_correction_after_deal: false,
        price: cash_price(result),
        supplier_vat: Some(dec!(20)),
    });
}

fn pay_cash(engine: &mut TestEngine, amount: Decimal, now: DateTime<Utc>) {
    engine
        .stores
        .ledger
        .append(NewTransaction::incoming_cash(DEAL, amount, now))
        .unwrap();
}

// ===== advance path =====

#[test]
fn test_prepayment_defers_receipt() {
    let mut engine = test_engine();
    attach_card(&mut engine, SchemeWork::BuyerAgent, dec!(1000));
    pay_cash(&mut engine, dec!(1000), at(1, 12));

    let outcome = engine.process_advance_payment(DEAL, at(1, 12)).unwrap();

    assert_eq!(outcome, AdvanceOutcome::Deferred(at(10, 12)));
    assert!(engine.stores.jobs.has(DEAL, JobKind::FullPaymentReceipt));
    assert!(engine.stores.receipts.is_empty());
}

#[test]
fn test_deferred_job_issues_full_payment_receipt() {
    let mut engine = test_engine();
    attach_card(&mut engine, SchemeWork::BuyerAgent, dec!(1000));
    pay_cash(&mut engine, dec!(1000), at(1, 12));
    engine.process_advance_payment(DEAL, at(1, 12)).unwrap();

    // Service has started; the scheduled job fires.
    let reports = engine.run_due_jobs(at(10, 12));
    assert_eq!(reports.len(), 1);
    assert!(reports[0].result.is_ok());

    let receipt = engine.stores.receipts.last_for_deal(DEAL).unwrap();
    assert_eq!(receipt.payment_kind, StrategyKind::FullPayment);
    assert_eq!(receipt.tag, ReceiptTag::AgentBuyer);
    assert_eq!(receipt.receipt_type, ReceiptType::Income);
    assert!(receipt.request_payload.contains("7710000000"));
    assert!(engine.stores.jobs.is_empty());
}

#[test]
fn test_missing_company_identity_blocks_agent_receipt() {
    let mut engine = test_engine();
    engine.deals.company = None;
    attach_card(&mut engine, SchemeWork::BuyerAgent, dec!(1000));
    pay_cash(&mut engine, dec!(1000), at(11, 12));

    let result = engine.process_advance_payment(DEAL, at(11, 12));
    assert!(result.is_err());
    assert_eq!(result.unwrap_err().error_code(), "MISSING_COMPANY_IDENTITY");
    // No partial state: the aborted issuance left no receipt row.
    assert!(engine.stores.receipts.is_empty());
}

#[test]
fn test_momentary_deal_issues_immediately() {
    let mut engine = test_engine();
    engine.deals.deals.get_mut(&DEAL).unwrap().category = DealCategory::Avia;
    attach_card(&mut engine, SchemeWork::BuyerAgent, dec!(1000));
    pay_cash(&mut engine, dec!(1000), at(1, 12));

    let outcome = engine.process_advance_payment(DEAL, at(1, 12)).unwrap();
    assert!(matches!(outcome, AdvanceOutcome::Issued(_)));
}

#[test]
fn test_short_payment_forces_credit_wording() {
    let mut engine = test_engine();
    engine.deals.deals.get_mut(&DEAL).unwrap().category = DealCategory::Avia;
    attach_card(&mut engine, SchemeWork::BuyerAgent, dec!(1000));
    pay_cash(&mut engine, dec!(400), at(1, 12));

    engine.process_advance_payment(DEAL, at(1, 12)).unwrap();
    let receipt = engine.stores.receipts.last_for_deal(DEAL).unwrap();
    assert_eq!(receipt.payment_kind, StrategyKind::Credit);
}

// ===== credit path =====

#[test]
fn test_credit_checkpoint_receipts() {
    let mut engine = test_engine();
    attach_card(&mut engine, SchemeWork::BuyerAgent, dec!(1000));
    engine.stores.credits.open(DEAL, dec!(1000)).unwrap();

    let (_, first) = engine
        .process_credit_installment(DEAL, dec!(500), at(1, 12))
        .unwrap();
    let first = engine.stores.receipts.get(first).unwrap();
    // Remaining 500 > 0: partial installment receipt.
    assert_eq!(first.payment_kind, StrategyKind::Credit);
    assert!(first.request_payload.contains("\"is_first_credit_checkpoint\":true"));

    let (_, second) = engine
        .process_credit_installment(DEAL, dec!(500), at(2, 12))
        .unwrap();
    let second = engine.stores.receipts.get(second).unwrap();
    // Remaining hit zero: final settlement receipt.
    assert_eq!(second.payment_kind, StrategyKind::CreditFull);
}

#[test]
fn test_credit_refund_checkpoints() {
    let mut engine = test_engine();
    attach_card(&mut engine, SchemeWork::BuyerAgent, dec!(1000));
    engine.stores.credits.open(DEAL, dec!(1000)).unwrap();
    engine
        .process_credit_installment(DEAL, dec!(600), at(1, 12))
        .unwrap();

    let (_, partial) = engine
        .process_credit_refund(DEAL, dec!(200), at(3, 12))
        .unwrap();
    assert_eq!(
        engine.stores.receipts.get(partial).unwrap().payment_kind,
        StrategyKind::CreditRefund
    );

    let (_, full) = engine
        .process_credit_refund(DEAL, dec!(400), at(4, 12))
        .unwrap();
    assert_eq!(
        engine.stores.receipts.get(full).unwrap().payment_kind,
        StrategyKind::CreditRefundFull
    );
}

#[test]
fn test_credit_intake_defers_full_paid_check() {
    let mut engine = test_engine();
    attach_card(&mut engine, SchemeWork::BuyerAgent, dec!(1000));
    pay_cash(&mut engine, dec!(300), at(1, 12));

    let outcome = engine.process_credit_intake(DEAL, at(1, 12)).unwrap();
    assert!(matches!(outcome, AdvanceOutcome::Deferred(_)));
    assert!(engine.stores.jobs.has(DEAL, JobKind::FullPaidCheck));

    // Still short at service start: transfer-into-credit receipt.
    let reports = engine.run_due_jobs(at(10, 12));
    assert!(reports[0].result.is_ok());
    assert_eq!(
        engine.stores.receipts.last_for_deal(DEAL).unwrap().payment_kind,
        StrategyKind::CreditTransfer
    );
}

// ===== point path =====

#[test]
fn test_point_payment_ledger_and_outbox() {
    let mut engine = test_engine();
    attach_card(&mut engine, SchemeWork::BuyerAgent, dec!(3000));

    let payment_id = engine
        .record_point_payment(DEAL, CONTACT, dec!(2000), LoyaltyProgram::Mr, at(1, 12))
        .unwrap();

    let row = engine.stores.ledger.by_id(payment_id).unwrap();
    assert_eq!(row.amount, dec!(3000));
    assert_eq!(row.point_amount, Some(dec!(2000)));
    assert!(row.payment_by_point);

    assert_eq!(engine.stores.outbox.pending_count(), 1);
    let pending = engine.stores.outbox.pending();
    assert_eq!(pending[0].account_number, "0123456789012345");

    // Exactly one external debit with a fresh idempotency GUID.
    assert_eq!(engine.drain_bonus_outbox().unwrap(), 1);
    assert_eq!(engine.bonus.debits.len(), 1);
    assert_eq!(engine.bonus.debits[0].amount, dec!(2000));
    assert_eq!(engine.stores.outbox.pending_count(), 0);

    // Repeated drains call nothing further.
    assert_eq!(engine.drain_bonus_outbox().unwrap(), 0);
    assert_eq!(engine.bonus.debits.len(), 1);
}

#[test]
fn test_point_payment_rolls_back_on_posting_failure() {
    let mut engine = test_engine();
    attach_card(&mut engine, SchemeWork::BuyerAgent, dec!(3000));
    engine.poster.fail_kind = Some(EntryKind::PointPayment);

    let result =
        engine.record_point_payment(DEAL, CONTACT, dec!(2000), LoyaltyProgram::Mr, at(1, 12));
    assert!(result.is_err());

    // Ledger row and staged intent were rolled back together.
    assert_eq!(engine.stores.ledger.sum_incoming(DEAL), dec!(0));
    assert_eq!(engine.stores.outbox.pending_count(), 0);
}

#[test]
fn test_failed_bonus_call_keeps_intent_pending() {
    let mut engine = test_engine();
    attach_card(&mut engine, SchemeWork::BuyerAgent, dec!(3000));
    engine
        .record_point_payment(DEAL, CONTACT, dec!(2000), LoyaltyProgram::Mr, at(1, 12))
        .unwrap();

    engine.bonus.fail = true;
    assert!(engine.drain_bonus_outbox().is_err());
    assert_eq!(engine.stores.outbox.pending_count(), 1);

    // The worker recovers on the next pass.
    engine.bonus.fail = false;
    assert_eq!(engine.drain_bonus_outbox().unwrap(), 1);
}

#[test]
fn test_realization_posts_exactly_once() {
    let mut engine = test_engine();
    engine.deals.deals.get_mut(&DEAL).unwrap().category = DealCategory::Avia;
    attach_card(&mut engine, SchemeWork::ProvisionServices, dec!(3000));
    engine
        .record_point_payment(DEAL, CONTACT, dec!(2000), LoyaltyProgram::Mr, at(1, 12))
        .unwrap();

    engine.create_realization_entrance(DEAL, at(1, 13)).unwrap();
    engine.create_realization_entrance(DEAL, at(1, 14)).unwrap();

    let buyer_acts = engine
        .poster
        .posted
        .iter()
        .filter(|(kind, _)| *kind == EntryKind::ServiceActBuyer)
        .count();
    assert_eq!(buyer_acts, 1);
}

#[test]
fn test_realization_waits_for_debt() {
    let mut engine = test_engine();
    attach_card(&mut engine, SchemeWork::ProvisionServices, dec!(3000));
    // 1000 points at 1.5 covers only half of the 3000 price.
    engine
        .record_point_payment(DEAL, CONTACT, dec!(1000), LoyaltyProgram::Mr, at(1, 12))
        .unwrap();

    engine.create_realization_entrance(DEAL, at(1, 13)).unwrap();
    assert!(engine
        .poster
        .posted
        .iter()
        .all(|(kind, _)| *kind == EntryKind::PointPayment));

    // The second payment clears the debt; the acts fire.
    engine
        .record_point_payment(DEAL, CONTACT, dec!(1000), LoyaltyProgram::Mr, at(2, 12))
        .unwrap();
    engine.create_realization_entrance(DEAL, at(2, 13)).unwrap();
    assert!(engine
        .poster
        .posted
        .iter()
        .any(|(kind, _)| *kind == EntryKind::ServiceActBuyer));
    assert!(engine
        .poster
        .posted
        .iter()
        .any(|(kind, _)| *kind == EntryKind::ServiceActSupplier));
}

// ===== correction path =====

#[test]
fn test_correction_delta_receipt_before_service_start() {
    let mut engine = test_engine();
    attach_card(&mut engine, SchemeWork::BuyerAgent, dec!(1000));
    engine.stores.cards.attach(NewFinancialCard {
        deal_id: DEAL,
        scheme: SchemeWork::BuyerAgent,
        is_correction_after_deal: true,
        price: cash_price(dec!(1150)),
        supplier_vat: Some(dec!(20)),
    });
    engine
        .stores
        .ledger
        .append(NewTransaction {
            is_correction: true,
            ..NewTransaction::incoming_cash(DEAL, dec!(150), at(1, 12))
        })
        .unwrap();

    let outcome = engine.make_payment_correction(DEAL, at(1, 12)).unwrap();
    let CorrectionOutcome::Scheduled { receipt, .. } = outcome else {
        panic!("correction before service start must schedule");
    };
    let receipt = engine.stores.receipts.get(receipt.unwrap()).unwrap();
    // The receipt totals the price difference, not the full price.
    assert!(receipt.request_payload.contains("\"total\":\"150\""));
    assert!(engine.stores.jobs.has(DEAL, JobKind::FullPaymentReceipt));
}

#[test]
fn test_correction_without_charges_only_schedules() {
    let mut engine = test_engine();
    attach_card(&mut engine, SchemeWork::BuyerAgent, dec!(1000));
    engine.stores.cards.attach(NewFinancialCard {
        deal_id: DEAL,
        scheme: SchemeWork::BuyerAgent,
        is_correction_after_deal: true,
        price: cash_price(dec!(1150)),
        supplier_vat: Some(dec!(20)),
    });

    let outcome = engine.make_payment_correction(DEAL, at(1, 12)).unwrap();
    assert!(matches!(
        outcome,
        CorrectionOutcome::Scheduled { receipt: None, .. }
    ));
    assert!(engine.stores.receipts.is_empty());
}

#[test]
fn test_card_frozen_once_receipt_issued() {
    let mut engine = test_engine();
    engine.deals.deals.get_mut(&DEAL).unwrap().category = DealCategory::Avia;
    attach_card(&mut engine, SchemeWork::BuyerAgent, dec!(1000));
    pay_cash(&mut engine, dec!(1000), at(1, 12));
    engine.process_advance_payment(DEAL, at(1, 12)).unwrap();

    // A plain replacement card is rejected; a correction card is not.
    let replacement = NewFinancialCard {
        deal_id: DEAL,
        scheme: SchemeWork::BuyerAgent,
        is_correction_after_deal: false,
        price: cash_price(dec!(1100)),
        supplier_vat: None,
    };
    let result = engine.attach_financial_card(replacement.clone());
    assert_eq!(result.unwrap_err().error_code(), "FIN_CARD_FROZEN");

    let correction = NewFinancialCard {
        is_correction_after_deal: true,
        ..replacement
    };
    assert!(engine.attach_financial_card(correction).is_ok());
}

#[test]
fn test_realization_sweep_revalidates_each_deal() {
    let mut engine = test_engine();
    engine.deals.deals.get_mut(&DEAL).unwrap().category = DealCategory::Avia;
    attach_card(&mut engine, SchemeWork::ProvisionServices, dec!(3000));
    engine
        .record_point_payment(DEAL, CONTACT, dec!(2000), LoyaltyProgram::Mr, at(1, 12))
        .unwrap();

    let other = DealId::new(2);
    let outcomes = engine
        .run_realization_sweep(&[DEAL, other], at(1, 13))
        .unwrap();

    // The paid deal posted; the card-less deal skipped without error.
    assert_eq!(outcomes.len(), 2);
    assert!(matches!(
        outcomes[0].1,
        crate::accounting::RealizationOutcome::Posted { .. }
    ));
    assert!(matches!(
        outcomes[1].1,
        crate::accounting::RealizationOutcome::Skipped(_)
    ));
}

// ===== refund workflow =====

fn open_worked_refund(engine: &mut TestEngine, return_cash: Decimal) -> RefundCardId {
    let id = engine.open_refund(DEAL).unwrap();
    {
        let card = engine.stores.refunds.get_mut(id).unwrap();
        card.return_cash = return_cash;
        card.direction_type = Some(DirectionType::Invoice);
    }
    for status in [
        RefundStatus::AwaitingDocumentFromClient,
        RefundStatus::ConfirmedClient,
        RefundStatus::ConfirmedAgreement,
        RefundStatus::Work,
    ] {
        engine
            .change_refund_status(id, status, AUDITOR, at(5, 12))
            .unwrap();
    }
    id
}

#[test]
fn test_check_total_verified_posts_refund_acts() {
    let mut engine = test_engine();
    attach_card(&mut engine, SchemeWork::BuyerAgent, dec!(1000));
    pay_cash(&mut engine, dec!(1000), at(1, 12));
    let id = open_worked_refund(&mut engine, dec!(1000));

    engine
        .change_refund_status(id, RefundStatus::CheckTotalAmountVerified, AUDITOR, at(5, 13))
        .unwrap();

    let card = engine.stores.refunds.get(id).unwrap();
    assert!(card.is_correct_amount_all);
    assert!(engine
        .poster
        .posted
        .iter()
        .any(|(kind, _)| *kind == EntryKind::RefundRealization));
    // BuyerAgent is in the refund-income scheme set.
    assert!(engine
        .poster
        .posted
        .iter()
        .any(|(kind, _)| *kind == EntryKind::RefundIncome));
}

#[test]
fn test_check_total_verified_rolls_back_on_posting_failure() {
    let mut engine = test_engine();
    attach_card(&mut engine, SchemeWork::BuyerAgent, dec!(1000));
    pay_cash(&mut engine, dec!(1000), at(1, 12));
    let id = open_worked_refund(&mut engine, dec!(1000));
    engine.poster.fail_kind = Some(EntryKind::RefundRealization);

    let result =
        engine.change_refund_status(id, RefundStatus::CheckTotalAmountVerified, AUDITOR, at(5, 13));
    assert!(result.is_err());

    // The whole transition rolled back, flags included.
    let card = engine.stores.refunds.get(id).unwrap();
    assert_eq!(card.status, RefundStatus::Work);
    assert!(!card.is_correct_amount_all);
}

#[test]
fn test_refund_income_skipped_for_supplier_agent_scheme() {
    let mut engine = test_engine();
    attach_card(&mut engine, SchemeWork::SrSupplierAgent, dec!(1000));
    pay_cash(&mut engine, dec!(1000), at(1, 12));
    let id = open_worked_refund(&mut engine, dec!(1000));

    engine
        .change_refund_status(id, RefundStatus::CheckTotalAmountVerified, AUDITOR, at(5, 13))
        .unwrap();

    assert!(engine
        .poster
        .posted
        .iter()
        .all(|(kind, _)| *kind != EntryKind::RefundIncome));
}

#[test]
fn test_completed_invoice_refund_prints_advance_return() {
    let mut engine = test_engine();
    attach_card(&mut engine, SchemeWork::BuyerAgent, dec!(1000));
    pay_cash(&mut engine, dec!(1000), at(1, 12));

    // The deal's last receipt is an advance return base.
    engine
        .return_deal_advance(DEAL, None, false, at(2, 12))
        .unwrap();

    let id = open_worked_refund(&mut engine, dec!(800));
    {
        let card = engine.stores.refunds.get_mut(id).unwrap();
        card.return_deposit = dec!(50);
    }
    engine
        .change_refund_status(id, RefundStatus::CheckTotalAmountVerified, AUDITOR, at(5, 13))
        .unwrap();
    engine
        .change_refund_status(id, RefundStatus::Completed, AUDITOR, at(5, 14))
        .unwrap();

    // Deposit credited, completion notified, return receipt issued.
    assert_eq!(engine.deals.deposits.len(), 1);
    assert_eq!(engine.deals.deposits[0].1, dec!(50));
    assert!(engine
        .notifier
        .sent
        .iter()
        .any(|(kind, _)| *kind == NotificationKind::RefundCompleted));

    let receipt = engine.stores.receipts.last_for_deal(DEAL).unwrap();
    assert_eq!(receipt.receipt_type, ReceiptType::Return);
    assert_eq!(receipt.tag, ReceiptTag::Advance);
    assert!(receipt.is_real_return);
    // The pending full-payment job is gone.
    assert!(!engine.stores.jobs.has(DEAL, JobKind::FullPaymentReceipt));
}

#[test]
fn test_completed_card_refund_appends_reversal_transaction() {
    let mut engine = test_engine();
    attach_card(&mut engine, SchemeWork::BuyerAgent, dec!(1000));
    pay_cash(&mut engine, dec!(1000), at(1, 12));
    let id = open_worked_refund(&mut engine, dec!(800));
    engine.stores.refunds.get_mut(id).unwrap().direction_type = Some(DirectionType::Card);

    engine
        .change_refund_status(id, RefundStatus::CheckTotalAmountVerified, AUDITOR, at(5, 13))
        .unwrap();
    engine
        .change_refund_status(id, RefundStatus::Completed, AUDITOR, at(5, 14))
        .unwrap();

    assert_eq!(engine.stores.ledger.recognized_paid(DEAL), dec!(200));
}

#[test]
fn test_completed_point_refund_reconciles_history() {
    let mut engine = test_engine();
    attach_card(&mut engine, SchemeWork::BuyerAgent, dec!(3000));
    engine
        .record_point_payment(DEAL, CONTACT, dec!(2000), LoyaltyProgram::Mr, at(1, 12))
        .unwrap();
    engine.bonus.history = vec![
        BonusHistoryEntry {
            transaction_id: 555,
            date: at(1, 12).date_naive(),
            entry: DebitCredit::Credit,
        },
        BonusHistoryEntry {
            transaction_id: 777,
            date: at(1, 12).date_naive(),
            entry: DebitCredit::Debit,
        },
    ];

    let id = engine.open_refund(DEAL).unwrap();
    engine.stores.refunds.get_mut(id).unwrap().return_cash = dec!(3000);
    for status in [
        RefundStatus::AwaitingDocumentFromClient,
        RefundStatus::ConfirmedClient,
        RefundStatus::ConfirmedAgreement,
    ] {
        engine
            .change_refund_status(id, status, AUDITOR, at(5, 12))
            .unwrap();
    }
    engine
        .send_team_leader(id, RefundStatus::ConfirmedTeamleader, AUDITOR)
        .unwrap();
    engine
        .send_team_leader(id, RefundStatus::WorkTeamleader, AUDITOR)
        .unwrap();
    engine
        .change_refund_status(id, RefundStatus::Completed, AUDITOR, at(6, 12))
        .unwrap();

    // The point-refund receipt went out under the reversal wording.
    let receipt = engine.stores.receipts.last_for_deal(DEAL).unwrap();
    assert_eq!(receipt.payment_kind, StrategyKind::CreditRefundTransfer);

    // The staged credit carries the matched loyalty transaction.
    let pending = engine.stores.outbox.pending();
    let credit_intent = pending
        .iter()
        .find(|i| i.direction == crate::ledger::BonusDirection::Credit)
        .unwrap();
    assert_eq!(credit_intent.original_transaction_id, Some(777));
    assert_eq!(credit_intent.point_amount, dec!(2000));

    // The refund row mirrors the original point payment.
    assert_eq!(engine.stores.ledger.recognized_paid(DEAL), dec!(0));
    assert!(engine
        .poster
        .posted
        .iter()
        .any(|(kind, _)| *kind == EntryKind::PointRefund));
}

#[test]
fn test_cancel_restores_stage_and_detaches() {
    let mut engine = test_engine();
    attach_card(&mut engine, SchemeWork::BuyerAgent, dec!(1000));
    let id = engine.open_refund(DEAL).unwrap();

    engine.cancel_refund(DEAL).unwrap();

    let card = engine.stores.refunds.get(id).unwrap();
    assert_eq!(card.status, RefundStatus::Canceled);
    assert!(card.deal_id.is_detached());
    assert_eq!(card.canceled_refund_deal_id, Some(DEAL));
    assert_eq!(
        engine.deals.updated_stages,
        vec![(DEAL, "C1:WON".to_string())]
    );
    // A new refund can be opened for the deal.
    assert!(engine.open_refund(DEAL).is_ok());
}

#[test]
fn test_check_total_flags() {
    let mut engine = test_engine();
    attach_card(&mut engine, SchemeWork::BuyerAgent, dec!(1000));
    let id = engine.open_refund(DEAL).unwrap();

    engine.check_total_incorrect(id).unwrap();
    let card = engine.stores.refunds.get(id).unwrap();
    assert!(!card.is_correct_amount_all);
    assert!(card.is_retry_check_total_amount);

    engine.retry_check(id).unwrap();
    let card = engine.stores.refunds.get(id).unwrap();
    assert!(!card.is_correct_amount_all);
    assert!(!card.is_retry_check_total_amount);
}

#[test]
fn test_delayed_refund_reactivates_via_job() {
    let mut engine = test_engine();
    attach_card(&mut engine, SchemeWork::BuyerAgent, dec!(1000));
    let id = engine.open_refund(DEAL).unwrap();
    let effective = engine.delay_refund(id, at(7, 9)).unwrap();
    assert_eq!(effective, at(7, 9));

    let midnight = Utc.with_ymd_and_hms(2026, 6, 8, 0, 0, 0).unwrap();
    let shifted = engine.change_delay_refund(id, midnight).unwrap();
    assert_eq!(shifted, Utc.with_ymd_and_hms(2026, 6, 8, 10, 5, 0).unwrap());

    let reports = engine.run_due_jobs(shifted);
    assert!(reports[0].result.is_ok());
    let card = engine.stores.refunds.get(id).unwrap();
    assert_eq!(card.status, RefundStatus::Work);
    assert!(card.delay_date.is_none());
}

#[test]
fn test_notification_failure_is_not_fatal() {
    let mut engine = test_engine();
    attach_card(&mut engine, SchemeWork::BuyerAgent, dec!(1000));
    let id = engine.open_refund(DEAL).unwrap();
    engine.notifier.fail = true;

    for status in [
        RefundStatus::AwaitingDocumentFromClient,
        RefundStatus::ConfirmedClient,
        RefundStatus::ConfirmedAgreement,
    ] {
        engine
            .change_refund_status(id, status, AUDITOR, at(5, 12))
            .unwrap();
    }
    assert_eq!(
        engine.stores.refunds.get(id).unwrap().status,
        RefundStatus::ConfirmedAgreement
    );
}

#[test]
fn test_invalid_transition_is_rejected() {
    let mut engine = test_engine();
    attach_card(&mut engine, SchemeWork::BuyerAgent, dec!(1000));
    let id = engine.open_refund(DEAL).unwrap();

    let result = engine.change_refund_status(id, RefundStatus::Completed, AUDITOR, at(5, 12));
    assert_eq!(result.unwrap_err().error_code(), "INVALID_REFUND_TRANSITION");
    assert_eq!(
        engine.stores.refunds.get(id).unwrap().status,
        RefundStatus::New
    );
}

// ===== receipt submission =====

#[test]
fn test_push_and_pull_through_engine() {
    let mut engine = test_engine();
    engine.deals.deals.get_mut(&DEAL).unwrap().category = DealCategory::Avia;
    attach_card(&mut engine, SchemeWork::BuyerAgent, dec!(1000));
    pay_cash(&mut engine, dec!(1000), at(1, 12));

    let AdvanceOutcome::Issued(receipt_id) =
        engine.process_advance_payment(DEAL, at(1, 12)).unwrap()
    else {
        panic!("momentary deal must issue immediately");
    };

    let status = engine.push_receipt(receipt_id).unwrap();
    assert_eq!(status, crate::receipt::ReceiptStatus::Sended);

    let status = engine.pull_receipt(receipt_id).unwrap();
    assert_eq!(status, crate::receipt::ReceiptStatus::Created);

    let receipt = engine.stores.receipts.get(receipt_id).unwrap();
    assert!(receipt.url.is_some());
    assert!(receipt.fiscal_receipt_number.is_some());
}

#[test]
fn test_pre_receipt_persists_nothing() {
    let engine = {
        let mut engine = test_engine();
        engine.deals.deals.get_mut(&DEAL).unwrap().category = DealCategory::Avia;
        attach_card(&mut engine, SchemeWork::BuyerAgent, dec!(1000));
        pay_cash(&mut engine, dec!(400), at(1, 12));
        engine
    };

    let payload = engine.make_pre_receipt(DEAL, at(1, 12)).unwrap();
    // Short payment previews under credit wording at the full price.
    assert!(payload.contains("CREDIT"));
    assert!(engine.stores.receipts.is_empty());
}

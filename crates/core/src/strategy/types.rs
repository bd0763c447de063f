//! Strategy domain types.

use chrono::{DateTime, Utc};
use farebox_shared::types::DealId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::card::SchemeWork;
use crate::deal::DealCategory;

/// Settlement wording a receipt is issued under.
///
/// This is the "payment type" tag persisted on the receipt row; the fiscal
/// provider renders different settlement-method wording for each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StrategyKind {
    /// Advance receipt (money taken before anything is itemized).
    Advance,
    /// Prepayment receipt, ahead of service start.
    Prepayment,
    /// Full payment at or after service start.
    FullPayment,
    /// Partial installment settlement.
    Credit,
    /// Transfer into credit (nothing paid yet).
    CreditTransfer,
    /// Final installment settlement.
    CreditFull,
    /// Partial refund of installments.
    CreditRefund,
    /// Full refund of installments.
    CreditRefundFull,
    /// Reversal of a transfer into credit.
    CreditRefundTransfer,
}

impl StrategyKind {
    /// Stable string form used in invoice IDs and payloads.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Advance => "ADVANCE",
            Self::Prepayment => "PREPAYMENT",
            Self::FullPayment => "FULL_PAYMENT",
            Self::Credit => "CREDIT",
            Self::CreditTransfer => "CREDIT_TRANSFER",
            Self::CreditFull => "CREDIT_FULL",
            Self::CreditRefund => "CREDIT_REFUND",
            Self::CreditRefundFull => "CREDIT_REFUND_FULL",
            Self::CreditRefundTransfer => "CREDIT_REFUND_TRANSFER",
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fiscal operation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReceiptType {
    /// Money moving to the agency.
    Income,
    /// Money moving back to the client.
    Return,
}

/// Receipt content variant, keyed by scheme or return flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReceiptTag {
    /// Supplier-agent receipt, short-haul scheme.
    AgentSupplierSr,
    /// Supplier-agent receipt, long-haul scheme.
    AgentSupplierLr,
    /// Buyer-agent receipt.
    AgentBuyer,
    /// Direct service receipt.
    Service,
    /// Service-fee-only receipt.
    ServiceRsTls,
    /// Advance return receipt.
    Advance,
    /// Final-payment return receipt.
    FinalPayment,
}

/// Inputs the advance-path selector decides on.
#[derive(Debug, Clone)]
pub struct SelectorInput {
    /// The card's work scheme.
    pub scheme: SchemeWork,
    /// The deal's product line.
    pub category: DealCategory,
    /// When the purchased service begins.
    pub service_start: DateTime<Utc>,
    /// Decision time.
    pub now: DateTime<Utc>,
    /// Sum of successful incoming payments.
    pub paid_total: Decimal,
    /// The price the client must pay in total.
    pub price_total: Decimal,
    /// Active credit state, if the deal has one.
    pub credit: Option<CreditState>,
}

/// The slice of credit state the selector needs.
#[derive(Debug, Clone, Copy)]
pub struct CreditState {
    /// Remaining installment balance.
    pub remaining: Decimal,
    /// True before any financial operation exists.
    pub is_first_checkpoint: bool,
    /// True when the last operation is a full-refund marker.
    pub last_operation_full_refund: bool,
    /// True when a full-payment operation exists in the history.
    pub has_full_payment: bool,
}

/// Outcome of strategy selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Issue a receipt now under the given kind.
    Issue(StrategyKind),
    /// Not yet due: schedule the full-payment pass for later.
    Defer {
        /// When the deferred pass must run (before the midnight shift).
        run_at: DateTime<Utc>,
    },
}

/// Finalized receipt content.
///
/// Built once through [`ReceiptOptionsBuilder`] and never mutated after;
/// a partially-initialized options record cannot escape into receipt
/// creation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReceiptOptions {
    /// Invoice identifier embedded in the fiscal request.
    pub invoice_id: String,
    /// The deal the receipt belongs to.
    pub deal_id: DealId,
    /// Receipt total.
    pub total: Decimal,
    /// Product line item name.
    pub product_name: Option<String>,
    /// Agency service component.
    pub service_fee: Option<Decimal>,
    /// Supplier component.
    pub supplier: Option<Decimal>,
    /// Supplier VAT rate.
    pub supplier_vat: Option<Decimal>,
    /// Supplier tax number, required for agent schemes.
    pub company_inn: Option<String>,
    /// Supplier registered name, required for agent schemes.
    pub company_name: Option<String>,
    /// Penalty withheld by the supplier.
    pub supplier_penalty: Decimal,
    /// Supplier replacement charge.
    pub supplier_replacement: Decimal,
    /// Penalty withheld by the agency.
    pub rstls_penalty: Decimal,
    /// Pricing currency code for currency-denominated cards.
    pub currency_code: Option<String>,
    /// Receipt delivery email.
    pub email: Option<String>,
    /// Client display name, on return receipts.
    pub customer_name: Option<String>,
    /// True on the first credit checkpoint receipt.
    pub is_first_credit_checkpoint: bool,
    /// Previously paid sum credited against the installment plan.
    pub credit_advance: Option<Decimal>,
    /// Amount of the installment this receipt settles.
    pub credit_installment: Option<Decimal>,
    /// True when the payment settled from a loyalty balance.
    pub point_settlement: bool,
    /// True when a real payment reversal backs the receipt.
    pub is_real_return: bool,
    /// Product share of a return split.
    pub return_product: Option<Decimal>,
    /// Agency-fee share of a return split.
    pub return_fee: Option<Decimal>,
    /// Supplier share of a return split.
    pub return_supplier: Option<Decimal>,
}

impl ReceiptOptions {
    /// Starts a builder with the mandatory fields.
    #[must_use]
    pub fn builder(invoice_id: String, deal_id: DealId, total: Decimal) -> ReceiptOptionsBuilder {
        ReceiptOptionsBuilder {
            inner: Self {
                invoice_id,
                deal_id,
                total,
                ..Self::default()
            },
        }
    }
}

/// Move-style builder for [`ReceiptOptions`].
#[derive(Debug, Clone)]
pub struct ReceiptOptionsBuilder {
    inner: ReceiptOptions,
}

impl ReceiptOptionsBuilder {
    /// Sets the product line item name.
    #[must_use]
    pub fn product_name(mut self, name: impl Into<String>) -> Self {
        self.inner.product_name = Some(name.into());
        self
    }

    /// Sets the agency service component.
    #[must_use]
    pub fn service_fee(mut self, amount: Decimal) -> Self {
        self.inner.service_fee = Some(amount);
        self
    }

    /// Sets the supplier component and VAT.
    #[must_use]
    pub fn supplier(mut self, amount: Decimal, vat: Option<Decimal>) -> Self {
        self.inner.supplier = Some(amount);
        self.inner.supplier_vat = vat;
        self
    }

    /// Sets the supplier tax identity.
    #[must_use]
    pub fn company(mut self, inn: impl Into<String>, name: impl Into<String>) -> Self {
        self.inner.company_inn = Some(inn.into());
        self.inner.company_name = Some(name.into());
        self
    }

    /// Sets the penalty fields.
    #[must_use]
    pub fn penalties(
        mut self,
        supplier_penalty: Decimal,
        supplier_replacement: Decimal,
        rstls_penalty: Decimal,
    ) -> Self {
        self.inner.supplier_penalty = supplier_penalty;
        self.inner.supplier_replacement = supplier_replacement;
        self.inner.rstls_penalty = rstls_penalty;
        self
    }

    /// Sets the pricing currency code.
    #[must_use]
    pub fn currency_code(mut self, code: impl Into<String>) -> Self {
        self.inner.currency_code = Some(code.into());
        self
    }

    /// Sets the receipt delivery email.
    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.inner.email = Some(email.into());
        self
    }

    /// Sets the client display name.
    #[must_use]
    pub fn customer_name(mut self, name: impl Into<String>) -> Self {
        self.inner.customer_name = Some(name.into());
        self
    }

    /// Marks this as the first credit checkpoint.
    #[must_use]
    pub fn first_credit_checkpoint(mut self, is_first: bool) -> Self {
        self.inner.is_first_credit_checkpoint = is_first;
        self
    }

    /// Sets the previously paid sum credited against the plan.
    #[must_use]
    pub fn credit_advance(mut self, amount: Decimal) -> Self {
        self.inner.credit_advance = Some(amount);
        self
    }

    /// Sets the installment amount this receipt settles.
    #[must_use]
    pub fn credit_installment(mut self, amount: Decimal) -> Self {
        self.inner.credit_installment = Some(amount);
        self
    }

    /// Marks the payment as settled from a loyalty balance.
    #[must_use]
    pub fn point_settlement(mut self) -> Self {
        self.inner.point_settlement = true;
        self
    }

    /// Marks the receipt as backed by a real payment reversal.
    #[must_use]
    pub fn real_return(mut self) -> Self {
        self.inner.is_real_return = true;
        self
    }

    /// Sets the return split amounts.
    #[must_use]
    pub fn return_split(mut self, product: Decimal, fee: Decimal, supplier: Decimal) -> Self {
        self.inner.return_product = Some(product);
        self.inner.return_fee = Some(fee);
        self.inner.return_supplier = Some(supplier);
        self
    }

    /// Finalizes the options.
    #[must_use]
    pub fn build(self) -> ReceiptOptions {
        self.inner
    }
}

/// A fully decided receipt: kind, direction, content variant, and options.
///
/// Serialized verbatim as the receipt's request payload, so a persisted
/// receipt can be resubmitted after a process restart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptStrategy {
    /// Settlement wording.
    pub kind: StrategyKind,
    /// Fiscal operation direction.
    pub receipt_type: ReceiptType,
    /// Receipt content variant.
    pub tag: ReceiptTag,
    /// Finalized receipt content.
    pub options: ReceiptOptions,
}

//! Scheme-keyed receipt field mapping.
//!
//! Each work scheme maps a resolved price into the receipt options its
//! fiscal variant requires. Dispatch is enum-keyed and resolved at compile
//! time; there is no scheme a receipt can be requested for that lacks a
//! mapping.

use chrono::{DateTime, Utc};
use farebox_shared::types::DealId;
use rust_decimal::Decimal;

use crate::card::SchemeWork;
use crate::pricing::ResolvedPrice;

use super::error::StrategyError;
use super::types::{
    ReceiptOptions, ReceiptOptionsBuilder, ReceiptStrategy, ReceiptTag, ReceiptType, StrategyKind,
};

/// Supplier legal identity required on agent-scheme receipts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyIdentity {
    /// Tax number. Foreign suppliers carry the all-zero INN.
    pub inn: String,
    /// Registered company name.
    pub name: String,
}

/// Everything a scheme field builder needs.
#[derive(Debug, Clone)]
pub struct FieldContext<'a> {
    /// The deal the receipt is for.
    pub deal_id: DealId,
    /// Settlement wording the selector decided on.
    pub kind: StrategyKind,
    /// Resolved cash price figures.
    pub price: &'a ResolvedPrice,
    /// Receipt total.
    pub total: Decimal,
    /// Supplier VAT rate from the financial card.
    pub supplier_vat: Option<Decimal>,
    /// Supplier legal identity, when the deal has a confirmed supplier.
    pub company: Option<&'a CompanyIdentity>,
    /// Product line item name from the deal nomenclature.
    pub product_name: Option<&'a str>,
    /// Configured service delivery email.
    pub service_email: &'a str,
    /// Build time, embedded in the invoice ID.
    pub now: DateTime<Utc>,
    /// True on the first credit checkpoint.
    pub is_first_credit_checkpoint: bool,
    /// Previously paid sum credited against the plan.
    pub credit_advance: Option<Decimal>,
    /// Installment amount this receipt settles.
    pub credit_installment: Option<Decimal>,
    /// True when the payment settled from a loyalty balance.
    pub point_settlement: bool,
}

type FieldBuilder = fn(&FieldContext<'_>) -> Result<ReceiptOptions, StrategyError>;

/// Compile-time dispatch: scheme to field builder.
const fn builder_for(scheme: SchemeWork) -> FieldBuilder {
    match scheme {
        SchemeWork::SrSupplierAgent => sr_supplier_agent,
        SchemeWork::LrSupplierAgent => lr_supplier_agent,
        SchemeWork::BuyerAgent => buyer_agent,
        SchemeWork::ProvisionServices => provision_services,
        SchemeWork::RsTlsServiceFee => rs_tls_service_fee,
    }
}

/// Receipt content variant for a scheme's income receipts.
const fn tag_for(scheme: SchemeWork) -> ReceiptTag {
    match scheme {
        SchemeWork::SrSupplierAgent => ReceiptTag::AgentSupplierSr,
        SchemeWork::LrSupplierAgent => ReceiptTag::AgentSupplierLr,
        SchemeWork::BuyerAgent => ReceiptTag::AgentBuyer,
        SchemeWork::ProvisionServices => ReceiptTag::Service,
        SchemeWork::RsTlsServiceFee => ReceiptTag::ServiceRsTls,
    }
}

/// Builds the income receipt strategy for a scheme.
///
/// # Errors
///
/// Returns [`StrategyError::MissingCompanyIdentity`] when an agent scheme
/// has no confirmed supplier identity; issuance must abort with no receipt
/// row in that case.
pub fn build_options(
    scheme: SchemeWork,
    ctx: &FieldContext<'_>,
) -> Result<ReceiptStrategy, StrategyError> {
    let options = builder_for(scheme)(ctx)?;
    Ok(ReceiptStrategy {
        kind: ctx.kind,
        receipt_type: ReceiptType::Income,
        tag: tag_for(scheme),
        options,
    })
}

/// Invoice identifier: kind, deal, and build timestamp.
#[must_use]
pub fn invoice_id(kind: StrategyKind, deal_id: DealId, now: DateTime<Utc>) -> String {
    format!(
        "{}_DEAL_{}_{}",
        kind.as_str(),
        deal_id,
        now.format("%H_%M_%S_%d_%m_%Y")
    )
}

fn base(ctx: &FieldContext<'_>) -> ReceiptOptionsBuilder {
    let mut builder = ReceiptOptions::builder(
        invoice_id(ctx.kind, ctx.deal_id, ctx.now),
        ctx.deal_id,
        ctx.total,
    )
    .penalties(
        ctx.price.supplier_penalty,
        ctx.price.supplier_replacement,
        ctx.price.rstls_penalty,
    )
    .first_credit_checkpoint(ctx.is_first_credit_checkpoint);

    if let Some(advance) = ctx.credit_advance {
        builder = builder.credit_advance(advance);
    }
    if let Some(installment) = ctx.credit_installment {
        builder = builder.credit_installment(installment);
    }
    if ctx.point_settlement {
        builder = builder.point_settlement();
    }
    if let Some(name) = ctx.product_name {
        builder = builder.product_name(name);
    }
    builder
}

fn required_company<'a>(
    ctx: &'a FieldContext<'_>,
    scheme: SchemeWork,
) -> Result<&'a CompanyIdentity, StrategyError> {
    ctx.company
        .ok_or(StrategyError::MissingCompanyIdentity { scheme })
}

fn sr_supplier_agent(ctx: &FieldContext<'_>) -> Result<ReceiptOptions, StrategyError> {
    let company = required_company(ctx, SchemeWork::SrSupplierAgent)?;
    Ok(base(ctx)
        .supplier(ctx.price.supplier, ctx.supplier_vat)
        .service_fee(ctx.price.service)
        .company(company.inn.clone(), company.name.clone())
        .build())
}

fn lr_supplier_agent(ctx: &FieldContext<'_>) -> Result<ReceiptOptions, StrategyError> {
    Ok(base(ctx).email(ctx.service_email).build())
}

fn buyer_agent(ctx: &FieldContext<'_>) -> Result<ReceiptOptions, StrategyError> {
    let company = required_company(ctx, SchemeWork::BuyerAgent)?;
    Ok(base(ctx)
        .supplier(ctx.price.supplier, ctx.supplier_vat)
        .service_fee(ctx.price.service)
        .company(company.inn.clone(), company.name.clone())
        .build())
}

fn provision_services(ctx: &FieldContext<'_>) -> Result<ReceiptOptions, StrategyError> {
    let mut builder = base(ctx).email(ctx.service_email);
    if let Some(vat) = ctx.supplier_vat {
        builder = builder.supplier(Decimal::ZERO, Some(vat));
    }
    if let Some(code) = &ctx.price.currency_code {
        builder = builder.currency_code(code.clone());
    }
    Ok(builder.build())
}

fn rs_tls_service_fee(ctx: &FieldContext<'_>) -> Result<ReceiptOptions, StrategyError> {
    Ok(base(ctx).email(ctx.service_email).build())
}

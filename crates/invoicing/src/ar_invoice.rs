use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use kosmos_auth::{Caller, ModulePermissionSet, RoleName};
use kosmos_core::{
    AuditDto, AuditFields, DomainError, ModuleId, RecordId, Validate, Validator, impl_record,
};
use kosmos_module::{ErpModule, ModuleCommand, ModuleDefinition, TargetsRecord, exact_matches, patch};

/// Basis points in 100%.
pub const MAX_TAX_PERCENTAGE_BPS: u32 = 10_000;

/// Invoice status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArInvoiceStatus {
    #[default]
    Open,
    Paid,
    Void,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArInvoice {
    pub id: RecordId,
    pub customer_id: RecordId,
    pub order_id: Option<RecordId>,
    pub invoice_date: NaiveDate,
    /// Net days.
    pub payment_terms: u32,
    pub invoice_due_date: NaiveDate,
    pub is_taxable: bool,
    pub tax_percentage_bps: u32,
    pub subtotal: i64,
    pub total_paid: i64,
    pub status: ArInvoiceStatus,
    pub void_reason: Option<String>,
    pub audit: AuditFields,
}

impl_record!(ArInvoice);

impl ArInvoice {
    /// Tax rounded half up to the minor unit.
    pub fn tax_amount(&self) -> i64 {
        if !self.is_taxable {
            return 0;
        }
        let bps = i128::from(self.tax_percentage_bps);
        let tax = (i128::from(self.subtotal) * bps + 5_000) / 10_000;
        i64::try_from(tax).unwrap_or(if tax < 0 { i64::MIN } else { i64::MAX })
    }

    pub fn total_amount(&self) -> i64 {
        self.subtotal.saturating_add(self.tax_amount())
    }

    pub fn outstanding_amount(&self) -> i64 {
        self.total_amount().saturating_sub(self.total_paid).max(0)
    }

    /// Invariant: cannot pay void invoice.
    pub fn can_accept_payment(&self) -> bool {
        self.status != ArInvoiceStatus::Void && self.outstanding_amount() > 0
    }
}

fn due_date(invoice_date: NaiveDate, payment_terms: u32) -> NaiveDate {
    invoice_date
        .checked_add_days(Days::new(u64::from(payment_terms)))
        .unwrap_or(NaiveDate::MAX)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateArInvoice {
    pub caller: Caller,
    pub customer_id: RecordId,
    pub order_id: Option<RecordId>,
    pub invoice_date: NaiveDate,
    pub payment_terms: u32,
    /// Derived from the date and terms when absent.
    pub invoice_due_date: Option<NaiveDate>,
    pub is_taxable: bool,
    pub tax_percentage_bps: u32,
    pub subtotal: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditArInvoice {
    pub caller: Caller,
    pub id: RecordId,
    pub invoice_date: Option<NaiveDate>,
    pub payment_terms: Option<u32>,
    pub invoice_due_date: Option<NaiveDate>,
    pub is_taxable: Option<bool>,
    pub tax_percentage_bps: Option<u32>,
    pub subtotal: Option<i64>,
    /// Registers a payment of this amount.
    pub payment_amount: Option<i64>,
    /// Voids the invoice with this reason.
    pub void_reason: Option<String>,
}

impl EditArInvoice {
    pub fn new(caller: Caller, id: RecordId) -> Self {
        Self {
            caller,
            id,
            invoice_date: None,
            payment_terms: None,
            invoice_due_date: None,
            is_taxable: None,
            tax_percentage_bps: None,
            subtotal: None,
            payment_amount: None,
            void_reason: None,
        }
    }

    fn changes_amounts(&self) -> bool {
        self.is_taxable.is_some() || self.tax_percentage_bps.is_some() || self.subtotal.is_some()
    }
}

impl ModuleCommand for CreateArInvoice {
    fn caller(&self) -> &Caller {
        &self.caller
    }
}

impl ModuleCommand for EditArInvoice {
    fn caller(&self) -> &Caller {
        &self.caller
    }
}

impl TargetsRecord for EditArInvoice {
    fn record_id(&self) -> RecordId {
        self.id
    }
}

impl Validate for CreateArInvoice {
    fn validate(&self) -> Result<(), DomainError> {
        Validator::new()
            .positive("customer_id", i64::from(self.customer_id.get()))
            .non_negative("subtotal", self.subtotal)
            .check(
                self.tax_percentage_bps <= MAX_TAX_PERCENTAGE_BPS,
                "tax_percentage must not exceed 100%",
            )
            .check(
                self.invoice_due_date.is_none_or(|d| d >= self.invoice_date),
                "invoice_due_date cannot be before invoice_date",
            )
            .finish()
    }
}

impl Validate for EditArInvoice {
    fn validate(&self) -> Result<(), DomainError> {
        let mut v = Validator::new();
        v.check(self.id.get() > 0, "id must be greater than zero")
            .check(
                self.tax_percentage_bps.is_none_or(|bps| bps <= MAX_TAX_PERCENTAGE_BPS),
                "tax_percentage must not exceed 100%",
            )
            .max_len("void_reason", self.void_reason.as_deref(), 1000)
            .check(
                !(self.payment_amount.is_some() && self.void_reason.is_some()),
                "cannot pay and void an invoice at once",
            );
        if let Some(subtotal) = self.subtotal {
            v.non_negative("subtotal", subtotal);
        }
        if let Some(amount) = self.payment_amount {
            v.positive("payment_amount", amount);
        }
        v.finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ArInvoiceFilter {
    pub customer_id: Option<RecordId>,
    pub order_id: Option<RecordId>,
    pub status: Option<ArInvoiceStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArInvoiceDto {
    pub customer_id: RecordId,
    pub order_id: Option<RecordId>,
    pub invoice_date: NaiveDate,
    pub payment_terms: u32,
    pub invoice_due_date: NaiveDate,
    pub is_taxable: bool,
    pub tax_percentage_bps: u32,
    pub subtotal: i64,
    pub tax_amount: i64,
    pub total_amount: i64,
    pub total_paid: i64,
    pub outstanding_amount: i64,
    pub status: ArInvoiceStatus,
    pub void_reason: Option<String>,
    #[serde(flatten)]
    pub audit: AuditDto,
}

pub type ArInvoiceListDto = ArInvoiceDto;

pub struct ArInvoices;

impl ModuleDefinition for ArInvoices {
    const MODULE_ID: ModuleId = ModuleId::from_u128(0x9b4c2e1f_7a3d_4e8b_a6c5_0d2f1e9b7c55);
    const MODULE_NAME: &'static str = "AR Invoices";
    const RECORD_NAME: &'static str = "AR invoice";

    type Record = ArInvoice;
    type Dto = ArInvoiceDto;
    type ListDto = ArInvoiceListDto;
    type Create = CreateArInvoice;
    type Edit = EditArInvoice;
    type Filter = ArInvoiceFilter;

    fn permissions() -> ModulePermissionSet {
        ModulePermissionSet::crud(
            Self::MODULE_ID,
            Self::MODULE_NAME,
            RoleName::from_static("Accounts Receivable Users"),
            "ar_invoice",
            "AR Invoice",
        )
    }

    fn create_record(cmd: &CreateArInvoice, audit: AuditFields) -> ArInvoice {
        ArInvoice {
            id: RecordId::new(0),
            customer_id: cmd.customer_id,
            order_id: cmd.order_id,
            invoice_date: cmd.invoice_date,
            payment_terms: cmd.payment_terms,
            invoice_due_date: cmd
                .invoice_due_date
                .unwrap_or_else(|| due_date(cmd.invoice_date, cmd.payment_terms)),
            is_taxable: cmd.is_taxable,
            tax_percentage_bps: cmd.tax_percentage_bps,
            subtotal: cmd.subtotal,
            total_paid: 0,
            status: ArInvoiceStatus::Open,
            void_reason: None,
            audit,
        }
    }

    fn apply_edit(invoice: &mut ArInvoice, cmd: &EditArInvoice) -> Result<(), DomainError> {
        if invoice.status == ArInvoiceStatus::Void {
            return Err(DomainError::validation("void invoices cannot be edited"));
        }
        if cmd.changes_amounts() && invoice.total_paid > 0 {
            return Err(DomainError::validation(
                "amounts cannot change once payments are registered",
            ));
        }

        patch(&mut invoice.invoice_date, cmd.invoice_date.as_ref());
        patch(&mut invoice.payment_terms, cmd.payment_terms.as_ref());
        match cmd.invoice_due_date {
            Some(due) => invoice.invoice_due_date = due,
            None if cmd.invoice_date.is_some() || cmd.payment_terms.is_some() => {
                invoice.invoice_due_date = due_date(invoice.invoice_date, invoice.payment_terms);
            }
            None => {}
        }
        if invoice.invoice_due_date < invoice.invoice_date {
            return Err(DomainError::validation(
                "invoice_due_date cannot be before invoice_date",
            ));
        }
        patch(&mut invoice.is_taxable, cmd.is_taxable.as_ref());
        patch(&mut invoice.tax_percentage_bps, cmd.tax_percentage_bps.as_ref());
        patch(&mut invoice.subtotal, cmd.subtotal.as_ref());

        if let Some(amount) = cmd.payment_amount {
            if !invoice.can_accept_payment() {
                return Err(DomainError::validation(
                    "cannot register payment on void or fully paid invoice",
                ));
            }
            if amount > invoice.outstanding_amount() {
                return Err(DomainError::validation("cannot overpay invoice"));
            }
            invoice.total_paid += amount;
            if invoice.outstanding_amount() == 0 {
                invoice.status = ArInvoiceStatus::Paid;
            }
        }
        if let Some(reason) = cmd.void_reason.as_deref().filter(|r| !r.is_empty()) {
            invoice.status = ArInvoiceStatus::Void;
            invoice.void_reason = Some(reason.to_string());
        }
        Ok(())
    }

    fn to_dto(invoice: &ArInvoice) -> ArInvoiceDto {
        ArInvoiceDto {
            customer_id: invoice.customer_id,
            order_id: invoice.order_id,
            invoice_date: invoice.invoice_date,
            payment_terms: invoice.payment_terms,
            invoice_due_date: invoice.invoice_due_date,
            is_taxable: invoice.is_taxable,
            tax_percentage_bps: invoice.tax_percentage_bps,
            subtotal: invoice.subtotal,
            tax_amount: invoice.tax_amount(),
            total_amount: invoice.total_amount(),
            total_paid: invoice.total_paid,
            outstanding_amount: invoice.outstanding_amount(),
            status: invoice.status,
            void_reason: invoice.void_reason.clone(),
            audit: AuditDto::new(invoice.id, &invoice.audit),
        }
    }

    fn to_list_dto(invoice: &ArInvoice) -> ArInvoiceListDto {
        Self::to_dto(invoice)
    }

    fn search_fields(invoice: &ArInvoice) -> Vec<&str> {
        invoice.void_reason.as_deref().into_iter().collect()
    }

    fn matches(invoice: &ArInvoice, filter: &ArInvoiceFilter) -> bool {
        exact_matches(filter.customer_id.as_ref(), &invoice.customer_id)
            && filter.order_id.is_none_or(|id| invoice.order_id == Some(id))
            && exact_matches(filter.status.as_ref(), &invoice.status)
    }
}

pub type ArInvoiceModule<S> = ErpModule<ArInvoices, S>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use kosmos_core::{PagingSortingParameters, Response, ResultCode, UserId};
    use kosmos_module::{FindCommand, InMemoryRecordStore};
    use proptest::prelude::*;

    use crate::test_support::{AllowAll, caller};

    fn module() -> ArInvoiceModule<InMemoryRecordStore<ArInvoice>> {
        ErpModule::new(InMemoryRecordStore::new("AR invoice"), Arc::new(AllowAll))
    }

    fn net30(subtotal: i64) -> CreateArInvoice {
        CreateArInvoice {
            caller: caller(1),
            customer_id: RecordId::new(2),
            order_id: Some(RecordId::new(8)),
            invoice_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            payment_terms: 30,
            invoice_due_date: None,
            is_taxable: true,
            tax_percentage_bps: 825,
            subtotal,
        }
    }

    fn pay(module: &ArInvoiceModule<InMemoryRecordStore<ArInvoice>>, amount: i64) -> Response<ArInvoiceDto> {
        let mut edit = EditArInvoice::new(caller(1), RecordId::new(1));
        edit.payment_amount = Some(amount);
        module.edit(&edit)
    }

    #[test]
    fn due_date_follows_payment_terms() {
        let dto = module().create(&net30(10_000)).into_result().unwrap();
        assert_eq!(dto.invoice_due_date, NaiveDate::from_ymd_opt(2024, 2, 14).unwrap());
        assert_eq!(dto.tax_amount, 825);
        assert_eq!(dto.total_amount, 10_825);
    }

    #[test]
    fn changing_terms_moves_the_due_date() {
        let module = module();
        module.create(&net30(10_000)).into_result().unwrap();
        let mut edit = EditArInvoice::new(caller(1), RecordId::new(1));
        edit.payment_terms = Some(10);
        let dto = module.edit(&edit).into_result().unwrap();
        assert_eq!(dto.invoice_due_date, NaiveDate::from_ymd_opt(2024, 1, 25).unwrap());
    }

    #[test]
    fn payments_settle_the_invoice() {
        let module = module();
        module.create(&net30(10_000)).into_result().unwrap();

        let partial = pay(&module, 825).into_result().unwrap();
        assert_eq!(partial.outstanding_amount, 10_000);
        assert_eq!(partial.status, ArInvoiceStatus::Open);

        assert_eq!(pay(&module, 10_001).result_code, ResultCode::DataValidationError);

        let settled = pay(&module, 10_000).into_result().unwrap();
        assert_eq!(settled.status, ArInvoiceStatus::Paid);
        assert_eq!(pay(&module, 1).result_code, ResultCode::DataValidationError);
    }

    #[test]
    fn amounts_are_locked_after_a_payment() {
        let module = module();
        module.create(&net30(10_000)).into_result().unwrap();
        pay(&module, 100).into_result().unwrap();

        let mut edit = EditArInvoice::new(caller(1), RecordId::new(1));
        edit.subtotal = Some(1);
        assert_eq!(module.edit(&edit).result_code, ResultCode::DataValidationError);
    }

    #[test]
    fn void_invoices_reject_payment() {
        let module = module();
        module.create(&net30(10_000)).into_result().unwrap();
        let mut void = EditArInvoice::new(caller(1), RecordId::new(1));
        void.void_reason = Some("Duplicate".into());
        assert_eq!(module.edit(&void).into_result().unwrap().status, ArInvoiceStatus::Void);
        assert_eq!(pay(&module, 10).result_code, ResultCode::DataValidationError);

        let open = module.find(
            PagingSortingParameters::default(),
            &FindCommand::new(caller(1)).with_filter(ArInvoiceFilter {
                status: Some(ArInvoiceStatus::Open),
                ..ArInvoiceFilter::default()
            }),
        );
        assert_eq!(open.total_result_count, 0);
    }

    #[test]
    fn huge_subtotals_stay_readable() {
        let module = module();
        let mut cmd = net30(i64::MAX / 2);
        cmd.tax_percentage_bps = MAX_TAX_PERCENTAGE_BPS;
        let created = module.create(&cmd).into_result().unwrap();
        assert_eq!(created.tax_amount, i64::MAX / 2);
        assert_eq!(created.total_amount, i64::MAX - 1);

        let read = module.get_dto(&caller(1), RecordId::new(1)).into_result().unwrap();
        assert_eq!(read.total_amount, created.total_amount);
    }

    proptest! {
        #[test]
        fn untaxed_total_is_the_subtotal(subtotal in 0i64..1_000_000_000, bps in 0u32..=10_000) {
            let mut cmd = net30(subtotal);
            cmd.is_taxable = false;
            cmd.tax_percentage_bps = bps;
            let audit = AuditFields::fill_common(UserId::new(1), chrono::Utc::now());
            let invoice = ArInvoices::create_record(&cmd, audit);
            prop_assert_eq!(invoice.total_amount(), subtotal);
        }

        #[test]
        fn tax_never_exceeds_the_subtotal(subtotal in 0i64..=i64::MAX, bps in 0u32..=10_000) {
            let mut cmd = net30(subtotal);
            cmd.tax_percentage_bps = bps;
            let audit = AuditFields::fill_common(UserId::new(1), chrono::Utc::now());
            let invoice = ArInvoices::create_record(&cmd, audit);
            let tax = invoice.tax_amount();
            prop_assert!(tax >= 0);
            prop_assert!(tax <= subtotal);
            prop_assert!(invoice.total_amount() >= subtotal);
        }
    }
}

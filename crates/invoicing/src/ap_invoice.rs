use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use kosmos_auth::{Caller, ModulePermissionSet, RoleName};
use kosmos_core::{
    AuditDto, AuditFields, DomainError, ModuleId, RecordId, Validate, Validator, impl_record,
};
use kosmos_module::{
    ErpModule, Line, LineChange, ModuleCommand, ModuleDefinition, TargetsRecord,
    apply_line_changes, assign_line_number, check_distinct_line_numbers, check_line_number,
    check_line_numbers, exact_matches, next_line_id, patch, patch_opt, patch_opt_text, patch_text,
};

/// Which kind of document a vendor bill relates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssociationKind {
    PurchaseOrder,
    SalesOrder,
    ArInvoice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceAssociation {
    pub kind: AssociationKind,
    pub object_id: RecordId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApInvoiceLine {
    pub line_id: RecordId,
    pub line_number: u32,
    pub description: String,
    pub qty_invoiced: i32,
    pub line_total: i64,
    pub gl_account_id: RecordId,
    /// Line of the associated document this bill line covers.
    pub association_object_line_id: Option<RecordId>,
}

impl Line for ApInvoiceLine {
    fn line_id(&self) -> RecordId {
        self.line_id
    }

    fn line_number(&self) -> u32 {
        self.line_number
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApInvoice {
    pub id: RecordId,
    pub vendor_id: RecordId,
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    pub invoice_due_date: NaiveDate,
    pub invoice_received_date: NaiveDate,
    pub invoice_total: i64,
    pub memo: Option<String>,
    pub association: Option<InvoiceAssociation>,
    pub packing_list_is_required: bool,
    pub is_paid: bool,
    pub lines: Vec<ApInvoiceLine>,
    pub audit: AuditFields,
}

impl_record!(ApInvoice);

impl ApInvoice {
    pub fn lines_total(&self) -> i64 {
        self.lines
            .iter()
            .fold(0i64, |sum, line| sum.saturating_add(line.line_total))
    }

    /// The header total agrees with the lines (trivially so without lines).
    pub fn is_balanced(&self) -> bool {
        self.lines.is_empty() || self.lines_total() == self.invoice_total
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewApInvoiceLine {
    pub line_number: Option<u32>,
    pub description: String,
    pub qty_invoiced: i32,
    pub line_total: i64,
    pub gl_account_id: RecordId,
    pub association_object_line_id: Option<RecordId>,
}

impl NewApInvoiceLine {
    fn check(&self, v: &mut Validator) {
        check_line_number(v, self.line_number)
            .required("description", &self.description)
            .max_len("description", Some(&self.description), 1000)
            .positive("qty_invoiced", i64::from(self.qty_invoiced))
            .non_negative("line_total", self.line_total)
            .positive("gl_account_id", i64::from(self.gl_account_id.get()));
    }

    fn build(&self, line_id: RecordId, existing: &[ApInvoiceLine]) -> ApInvoiceLine {
        ApInvoiceLine {
            line_id,
            line_number: assign_line_number(existing, self.line_number),
            description: self.description.clone(),
            qty_invoiced: self.qty_invoiced,
            line_total: self.line_total,
            gl_account_id: self.gl_account_id,
            association_object_line_id: self.association_object_line_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ApInvoiceLineChanges {
    pub line_number: Option<u32>,
    pub description: Option<String>,
    pub qty_invoiced: Option<i32>,
    pub line_total: Option<i64>,
    pub gl_account_id: Option<RecordId>,
    pub association_object_line_id: Option<RecordId>,
}

pub type ApInvoiceLineChange = LineChange<NewApInvoiceLine, ApInvoiceLineChanges>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateApInvoice {
    pub caller: Caller,
    pub vendor_id: RecordId,
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    pub invoice_due_date: NaiveDate,
    pub invoice_received_date: NaiveDate,
    pub invoice_total: i64,
    pub memo: Option<String>,
    pub association: Option<InvoiceAssociation>,
    #[serde(default)]
    pub packing_list_is_required: bool,
    #[serde(default)]
    pub ap_invoice_lines: Vec<NewApInvoiceLine>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ApInvoiceChanges {
    pub invoice_number: Option<String>,
    pub vendor_id: Option<RecordId>,
    pub invoice_date: Option<NaiveDate>,
    pub invoice_due_date: Option<NaiveDate>,
    pub invoice_received_date: Option<NaiveDate>,
    pub invoice_total: Option<i64>,
    pub memo: Option<String>,
    pub association: Option<InvoiceAssociation>,
    pub packing_list_is_required: Option<bool>,
    pub is_paid: Option<bool>,
    #[serde(default)]
    pub line_changes: Vec<ApInvoiceLineChange>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditApInvoice {
    pub caller: Caller,
    pub id: RecordId,
    #[serde(flatten)]
    pub changes: ApInvoiceChanges,
}

impl EditApInvoice {
    pub fn new(caller: Caller, id: RecordId) -> Self {
        Self {
            caller,
            id,
            changes: ApInvoiceChanges::default(),
        }
    }
}

impl ModuleCommand for CreateApInvoice {
    fn caller(&self) -> &Caller {
        &self.caller
    }
}

impl ModuleCommand for EditApInvoice {
    fn caller(&self) -> &Caller {
        &self.caller
    }
}

impl TargetsRecord for EditApInvoice {
    fn record_id(&self) -> RecordId {
        self.id
    }
}

fn check_dates(v: &mut Validator, invoice: NaiveDate, due: NaiveDate) {
    v.check(due >= invoice, "invoice_due_date cannot be before invoice_date");
}

impl Validate for CreateApInvoice {
    fn validate(&self) -> Result<(), DomainError> {
        let mut v = Validator::new();
        v.positive("vendor_id", i64::from(self.vendor_id.get()))
            .required("invoice_number", &self.invoice_number)
            .max_len("invoice_number", Some(&self.invoice_number), 100)
            .non_negative("invoice_total", self.invoice_total)
            .max_len("memo", self.memo.as_deref(), 1000);
        check_dates(&mut v, self.invoice_date, self.invoice_due_date);
        for line in &self.ap_invoice_lines {
            line.check(&mut v);
        }
        check_distinct_line_numbers(&mut v, self.ap_invoice_lines.iter().map(|l| l.line_number));
        v.finish()
    }
}

impl Validate for EditApInvoice {
    fn validate(&self) -> Result<(), DomainError> {
        let c = &self.changes;
        let mut v = Validator::new();
        v.check(self.id.get() > 0, "id must be greater than zero")
            .max_len("invoice_number", c.invoice_number.as_deref(), 100)
            .max_len("memo", c.memo.as_deref(), 1000);
        if let Some(total) = c.invoice_total {
            v.non_negative("invoice_total", total);
        }
        for change in &c.line_changes {
            match change {
                LineChange::Add(line) => line.check(&mut v),
                LineChange::Update { changes, .. } => {
                    check_line_number(&mut v, changes.line_number)
                        .max_len("description", changes.description.as_deref(), 1000);
                    if let Some(qty) = changes.qty_invoiced {
                        v.positive("qty_invoiced", i64::from(qty));
                    }
                    if let Some(total) = changes.line_total {
                        v.non_negative("line_total", total);
                    }
                }
                LineChange::Remove { .. } => {}
            }
        }
        v.finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ApInvoiceFilter {
    pub vendor_id: Option<RecordId>,
    pub is_paid: Option<bool>,
    pub association_kind: Option<AssociationKind>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApInvoiceLineDto {
    pub id: RecordId,
    pub line_number: u32,
    pub description: String,
    pub qty_invoiced: i32,
    pub line_total: i64,
    pub gl_account_id: RecordId,
    pub association_object_line_id: Option<RecordId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApInvoiceDto {
    pub vendor_id: RecordId,
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    pub invoice_due_date: NaiveDate,
    pub invoice_received_date: NaiveDate,
    pub invoice_total: i64,
    pub lines_total: i64,
    pub is_balanced: bool,
    pub memo: Option<String>,
    pub association: Option<InvoiceAssociation>,
    pub packing_list_is_required: bool,
    pub is_paid: bool,
    pub ap_invoice_lines: Vec<ApInvoiceLineDto>,
    #[serde(flatten)]
    pub audit: AuditDto,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApInvoiceListDto {
    pub vendor_id: RecordId,
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    pub invoice_due_date: NaiveDate,
    pub invoice_total: i64,
    pub is_paid: bool,
    #[serde(flatten)]
    pub audit: AuditDto,
}

pub struct ApInvoices;

impl ModuleDefinition for ApInvoices {
    const MODULE_ID: ModuleId = ModuleId::from_u128(0x7c2e9a44_1d3b_4f6a_8e5c_2b9d0f1a6e33);
    const MODULE_NAME: &'static str = "AP Invoices";
    const RECORD_NAME: &'static str = "AP invoice";

    type Record = ApInvoice;
    type Dto = ApInvoiceDto;
    type ListDto = ApInvoiceListDto;
    type Create = CreateApInvoice;
    type Edit = EditApInvoice;
    type Filter = ApInvoiceFilter;

    fn permissions() -> ModulePermissionSet {
        ModulePermissionSet::crud(
            Self::MODULE_ID,
            Self::MODULE_NAME,
            RoleName::from_static("Accounts Payable Users"),
            "ap_invoice",
            "AP Invoice",
        )
    }

    fn create_record(cmd: &CreateApInvoice, audit: AuditFields) -> ApInvoice {
        let mut lines: Vec<ApInvoiceLine> = Vec::with_capacity(cmd.ap_invoice_lines.len());
        for new_line in &cmd.ap_invoice_lines {
            let line = new_line.build(next_line_id(&lines), &lines);
            lines.push(line);
        }
        ApInvoice {
            id: RecordId::new(0),
            vendor_id: cmd.vendor_id,
            invoice_number: cmd.invoice_number.clone(),
            invoice_date: cmd.invoice_date,
            invoice_due_date: cmd.invoice_due_date,
            invoice_received_date: cmd.invoice_received_date,
            invoice_total: cmd.invoice_total,
            memo: cmd.memo.clone(),
            association: cmd.association,
            packing_list_is_required: cmd.packing_list_is_required,
            is_paid: false,
            lines,
            audit,
        }
    }

    fn apply_edit(invoice: &mut ApInvoice, cmd: &EditApInvoice) -> Result<(), DomainError> {
        let c = &cmd.changes;
        if invoice.is_paid && (!c.line_changes.is_empty() || c.invoice_total.is_some()) {
            return Err(DomainError::validation(
                "amounts on a paid invoice cannot change",
            ));
        }
        patch_text(&mut invoice.invoice_number, c.invoice_number.as_deref());
        patch(&mut invoice.vendor_id, c.vendor_id.as_ref());
        patch(&mut invoice.invoice_date, c.invoice_date.as_ref());
        patch(&mut invoice.invoice_due_date, c.invoice_due_date.as_ref());
        patch(&mut invoice.invoice_received_date, c.invoice_received_date.as_ref());
        patch(&mut invoice.invoice_total, c.invoice_total.as_ref());
        patch_opt_text(&mut invoice.memo, c.memo.as_deref());
        patch_opt(&mut invoice.association, c.association.as_ref());
        patch(&mut invoice.packing_list_is_required, c.packing_list_is_required.as_ref());
        patch(&mut invoice.is_paid, c.is_paid.as_ref());

        let mut dates = Validator::new();
        check_dates(&mut dates, invoice.invoice_date, invoice.invoice_due_date);
        dates.finish()?;

        apply_line_changes(
            &mut invoice.lines,
            &c.line_changes,
            |new_line, id, existing| new_line.build(id, existing),
            |line, changes| {
                patch(&mut line.line_number, changes.line_number.as_ref());
                patch_text(&mut line.description, changes.description.as_deref());
                patch(&mut line.qty_invoiced, changes.qty_invoiced.as_ref());
                patch(&mut line.line_total, changes.line_total.as_ref());
                patch(&mut line.gl_account_id, changes.gl_account_id.as_ref());
                patch_opt(
                    &mut line.association_object_line_id,
                    changes.association_object_line_id.as_ref(),
                );
            },
        )?;
        check_line_numbers(&invoice.lines)
    }

    fn to_dto(invoice: &ApInvoice) -> ApInvoiceDto {
        ApInvoiceDto {
            vendor_id: invoice.vendor_id,
            invoice_number: invoice.invoice_number.clone(),
            invoice_date: invoice.invoice_date,
            invoice_due_date: invoice.invoice_due_date,
            invoice_received_date: invoice.invoice_received_date,
            invoice_total: invoice.invoice_total,
            lines_total: invoice.lines_total(),
            is_balanced: invoice.is_balanced(),
            memo: invoice.memo.clone(),
            association: invoice.association,
            packing_list_is_required: invoice.packing_list_is_required,
            is_paid: invoice.is_paid,
            ap_invoice_lines: invoice
                .lines
                .iter()
                .map(|line| ApInvoiceLineDto {
                    id: line.line_id,
                    line_number: line.line_number,
                    description: line.description.clone(),
                    qty_invoiced: line.qty_invoiced,
                    line_total: line.line_total,
                    gl_account_id: line.gl_account_id,
                    association_object_line_id: line.association_object_line_id,
                })
                .collect(),
            audit: AuditDto::new(invoice.id, &invoice.audit),
        }
    }

    fn to_list_dto(invoice: &ApInvoice) -> ApInvoiceListDto {
        ApInvoiceListDto {
            vendor_id: invoice.vendor_id,
            invoice_number: invoice.invoice_number.clone(),
            invoice_date: invoice.invoice_date,
            invoice_due_date: invoice.invoice_due_date,
            invoice_total: invoice.invoice_total,
            is_paid: invoice.is_paid,
            audit: AuditDto::new(invoice.id, &invoice.audit),
        }
    }

    fn search_fields(invoice: &ApInvoice) -> Vec<&str> {
        let mut fields = vec![invoice.invoice_number.as_str()];
        fields.extend(invoice.memo.as_deref());
        fields.extend(invoice.lines.iter().map(|l| l.description.as_str()));
        fields
    }

    fn matches(invoice: &ApInvoice, filter: &ApInvoiceFilter) -> bool {
        exact_matches(filter.vendor_id.as_ref(), &invoice.vendor_id)
            && exact_matches(filter.is_paid.as_ref(), &invoice.is_paid)
            && filter
                .association_kind
                .is_none_or(|kind| invoice.association.is_some_and(|a| a.kind == kind))
    }
}

pub type ApInvoiceModule<S> = ErpModule<ApInvoices, S>;

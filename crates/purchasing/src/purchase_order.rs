use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use kosmos_auth::{Caller, ModulePermissionSet, RoleName};
use kosmos_core::{
    AuditDto, AuditFields, DomainError, ModuleId, RecordId, UserId, Validate, Validator,
    impl_record,
};
use kosmos_module::{
    ErpModule, Line, LineChange, ModuleCommand, ModuleDefinition, TargetsRecord,
    apply_line_changes, assign_line_number, check_distinct_line_numbers, check_line_number,
    check_line_numbers, exact_matches, next_line_id, patch, patch_opt_text, patch_text,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PurchaseOrderStatus {
    #[default]
    Open,
    Complete,
    Canceled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrderLine {
    pub line_id: RecordId,
    pub line_number: u32,
    pub product_id: RecordId,
    pub quantity: i32,
    pub description: Option<String>,
    /// Minor currency units.
    pub unit_price: i64,
    pub tax: i64,
    pub is_taxable: bool,
}

impl PurchaseOrderLine {
    pub fn line_total(&self) -> i64 {
        let tax = if self.is_taxable { self.tax } else { 0 };
        i64::from(self.quantity)
            .saturating_mul(self.unit_price)
            .saturating_add(tax)
    }
}

impl Line for PurchaseOrderLine {
    fn line_id(&self) -> RecordId {
        self.line_id
    }

    fn line_number(&self) -> u32 {
        self.line_number
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub id: RecordId,
    pub vendor_id: RecordId,
    pub po_type: String,
    pub po_quote_number: Option<String>,
    /// Bumped on every successful edit.
    pub revision_number: u32,
    pub status: PurchaseOrderStatus,
    pub completed_on: Option<NaiveDate>,
    pub completed_by: Option<UserId>,
    pub canceled_on: Option<NaiveDate>,
    pub canceled_by: Option<UserId>,
    pub canceled_reason: Option<String>,
    pub lines: Vec<PurchaseOrderLine>,
    pub audit: AuditFields,
}

impl_record!(PurchaseOrder);

impl PurchaseOrder {
    pub fn order_total(&self) -> i64 {
        self.lines
            .iter()
            .fold(0i64, |sum, line| sum.saturating_add(line.line_total()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPurchaseOrderLine {
    /// Next free number when absent.
    pub line_number: Option<u32>,
    pub product_id: RecordId,
    pub quantity: i32,
    pub description: Option<String>,
    pub unit_price: i64,
    #[serde(default)]
    pub tax: i64,
    #[serde(default)]
    pub is_taxable: bool,
}

impl NewPurchaseOrderLine {
    pub fn new(product_id: RecordId, quantity: i32, unit_price: i64) -> Self {
        Self {
            line_number: None,
            product_id,
            quantity,
            description: None,
            unit_price,
            tax: 0,
            is_taxable: false,
        }
    }

    fn check(&self, v: &mut Validator) {
        check_line_number(v, self.line_number)
            .positive("product_id", i64::from(self.product_id.get()))
            .positive("quantity", i64::from(self.quantity))
            .max_len("description", self.description.as_deref(), 1000)
            .non_negative("unit_price", self.unit_price)
            .non_negative("tax", self.tax);
    }

    fn build(&self, line_id: RecordId, existing: &[PurchaseOrderLine]) -> PurchaseOrderLine {
        PurchaseOrderLine {
            line_id,
            line_number: assign_line_number(existing, self.line_number),
            product_id: self.product_id,
            quantity: self.quantity,
            description: self.description.clone(),
            unit_price: self.unit_price,
            tax: self.tax,
            is_taxable: self.is_taxable,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PurchaseOrderLineChanges {
    pub line_number: Option<u32>,
    pub product_id: Option<RecordId>,
    pub quantity: Option<i32>,
    pub description: Option<String>,
    pub unit_price: Option<i64>,
    pub tax: Option<i64>,
    pub is_taxable: Option<bool>,
}

impl PurchaseOrderLineChanges {
    fn check(&self, v: &mut Validator) {
        check_line_number(v, self.line_number)
            .max_len("description", self.description.as_deref(), 1000);
        if let Some(product_id) = self.product_id {
            v.positive("product_id", i64::from(product_id.get()));
        }
        if let Some(quantity) = self.quantity {
            v.positive("quantity", i64::from(quantity));
        }
        if let Some(unit_price) = self.unit_price {
            v.non_negative("unit_price", unit_price);
        }
        if let Some(tax) = self.tax {
            v.non_negative("tax", tax);
        }
    }

    fn apply(&self, line: &mut PurchaseOrderLine) {
        patch(&mut line.line_number, self.line_number.as_ref());
        patch(&mut line.product_id, self.product_id.as_ref());
        patch(&mut line.quantity, self.quantity.as_ref());
        patch_opt_text(&mut line.description, self.description.as_deref());
        patch(&mut line.unit_price, self.unit_price.as_ref());
        patch(&mut line.tax, self.tax.as_ref());
        patch(&mut line.is_taxable, self.is_taxable.as_ref());
    }
}

pub type PurchaseOrderLineChange = LineChange<NewPurchaseOrderLine, PurchaseOrderLineChanges>;

fn check_line_changes(v: &mut Validator, changes: &[PurchaseOrderLineChange]) {
    for change in changes {
        match change {
            LineChange::Add(line) => line.check(v),
            LineChange::Update { line_id, changes } => {
                v.positive("line_id", i64::from(line_id.get()));
                changes.check(v);
            }
            LineChange::Remove { line_id } => {
                v.positive("line_id", i64::from(line_id.get()));
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePurchaseOrder {
    pub caller: Caller,
    pub vendor_id: RecordId,
    pub po_type: String,
    pub po_quote_number: Option<String>,
    #[serde(default)]
    pub purchase_order_lines: Vec<NewPurchaseOrderLine>,
}

impl CreatePurchaseOrder {
    pub fn new(caller: Caller, vendor_id: RecordId, po_type: impl Into<String>) -> Self {
        Self {
            caller,
            vendor_id,
            po_type: po_type.into(),
            po_quote_number: None,
            purchase_order_lines: Vec::new(),
        }
    }

    pub fn with_line(mut self, line: NewPurchaseOrderLine) -> Self {
        self.purchase_order_lines.push(line);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PurchaseOrderChanges {
    pub vendor_id: Option<RecordId>,
    pub po_type: Option<String>,
    pub po_quote_number: Option<String>,
    /// `true` marks the order complete.
    pub complete: Option<bool>,
    /// Present: cancel the order with this reason.
    pub cancel_reason: Option<String>,
    #[serde(default)]
    pub line_changes: Vec<PurchaseOrderLineChange>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditPurchaseOrder {
    pub caller: Caller,
    pub id: RecordId,
    #[serde(flatten)]
    pub changes: PurchaseOrderChanges,
}

impl EditPurchaseOrder {
    pub fn new(caller: Caller, id: RecordId) -> Self {
        Self {
            caller,
            id,
            changes: PurchaseOrderChanges::default(),
        }
    }
}

impl ModuleCommand for CreatePurchaseOrder {
    fn caller(&self) -> &Caller {
        &self.caller
    }
}

impl ModuleCommand for EditPurchaseOrder {
    fn caller(&self) -> &Caller {
        &self.caller
    }
}

impl TargetsRecord for EditPurchaseOrder {
    fn record_id(&self) -> RecordId {
        self.id
    }
}

impl Validate for CreatePurchaseOrder {
    fn validate(&self) -> Result<(), DomainError> {
        let mut v = Validator::new();
        v.positive("vendor_id", i64::from(self.vendor_id.get()))
            .required("po_type", &self.po_type)
            .max_len("po_type", Some(&self.po_type), 50)
            .max_len("po_quote_number", self.po_quote_number.as_deref(), 100);
        for line in &self.purchase_order_lines {
            line.check(&mut v);
        }
        check_distinct_line_numbers(&mut v, self.purchase_order_lines.iter().map(|l| l.line_number));
        v.finish()
    }
}

impl Validate for EditPurchaseOrder {
    fn validate(&self) -> Result<(), DomainError> {
        let c = &self.changes;
        let mut v = Validator::new();
        v.check(self.id.get() > 0, "id must be greater than zero")
            .max_len("po_type", c.po_type.as_deref(), 50)
            .max_len("po_quote_number", c.po_quote_number.as_deref(), 100)
            .max_len("cancel_reason", c.cancel_reason.as_deref(), 1000)
            .check(
                !(c.complete == Some(true) && c.cancel_reason.is_some()),
                "an order cannot be completed and canceled at once",
            );
        if let Some(vendor_id) = c.vendor_id {
            v.positive("vendor_id", i64::from(vendor_id.get()));
        }
        check_line_changes(&mut v, &c.line_changes);
        v.finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PurchaseOrderFilter {
    pub vendor_id: Option<RecordId>,
    pub status: Option<PurchaseOrderStatus>,
    pub po_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrderLineDto {
    pub id: RecordId,
    pub line_number: u32,
    pub product_id: RecordId,
    pub quantity: i32,
    pub description: Option<String>,
    pub unit_price: i64,
    pub tax: i64,
    pub is_taxable: bool,
    pub line_total: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrderDto {
    pub vendor_id: RecordId,
    pub po_type: String,
    pub po_quote_number: Option<String>,
    pub revision_number: u32,
    pub status: PurchaseOrderStatus,
    pub completed_on: Option<NaiveDate>,
    pub completed_by: Option<UserId>,
    pub canceled_on: Option<NaiveDate>,
    pub canceled_by: Option<UserId>,
    pub canceled_reason: Option<String>,
    pub order_total: i64,
    pub purchase_order_lines: Vec<PurchaseOrderLineDto>,
    #[serde(flatten)]
    pub audit: AuditDto,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrderListDto {
    pub vendor_id: RecordId,
    pub po_type: String,
    pub po_quote_number: Option<String>,
    pub revision_number: u32,
    pub status: PurchaseOrderStatus,
    pub line_count: usize,
    pub order_total: i64,
    #[serde(flatten)]
    pub audit: AuditDto,
}

pub struct PurchaseOrders;

impl ModuleDefinition for PurchaseOrders {
    const MODULE_ID: ModuleId = ModuleId::from_u128(0x3a6f5c1d_8b1e_4c55_9f0e_6c2d8e7b4a21);
    const MODULE_NAME: &'static str = "Purchase Orders";
    const RECORD_NAME: &'static str = "Purchase order";

    type Record = PurchaseOrder;
    type Dto = PurchaseOrderDto;
    type ListDto = PurchaseOrderListDto;
    type Create = CreatePurchaseOrder;
    type Edit = EditPurchaseOrder;
    type Filter = PurchaseOrderFilter;

    fn permissions() -> ModulePermissionSet {
        ModulePermissionSet::crud(
            Self::MODULE_ID,
            Self::MODULE_NAME,
            RoleName::from_static("Purchasing Users"),
            "purchase_order",
            "Purchase Order",
        )
    }

    fn create_record(cmd: &CreatePurchaseOrder, audit: AuditFields) -> PurchaseOrder {
        let mut lines: Vec<PurchaseOrderLine> = Vec::with_capacity(cmd.purchase_order_lines.len());
        for new_line in &cmd.purchase_order_lines {
            let line = new_line.build(next_line_id(&lines), &lines);
            lines.push(line);
        }
        PurchaseOrder {
            id: RecordId::new(0),
            vendor_id: cmd.vendor_id,
            po_type: cmd.po_type.clone(),
            po_quote_number: cmd.po_quote_number.clone(),
            revision_number: 1,
            status: PurchaseOrderStatus::Open,
            completed_on: None,
            completed_by: None,
            canceled_on: None,
            canceled_by: None,
            canceled_reason: None,
            lines,
            audit,
        }
    }

    fn apply_edit(order: &mut PurchaseOrder, cmd: &EditPurchaseOrder) -> Result<(), DomainError> {
        if order.status != PurchaseOrderStatus::Open {
            return Err(DomainError::validation(
                "completed or canceled purchase orders cannot be edited",
            ));
        }
        let c = &cmd.changes;
        patch(&mut order.vendor_id, c.vendor_id.as_ref());
        patch_text(&mut order.po_type, c.po_type.as_deref());
        patch_opt_text(&mut order.po_quote_number, c.po_quote_number.as_deref());

        apply_line_changes(
            &mut order.lines,
            &c.line_changes,
            |new_line, id, existing| new_line.build(id, existing),
            |line, changes| changes.apply(line),
        )?;
        check_line_numbers(&order.lines)?;

        let user = cmd.caller.calling_user_id;
        let today = Utc::now().date_naive();
        if c.complete == Some(true) {
            order.status = PurchaseOrderStatus::Complete;
            order.completed_on = Some(today);
            order.completed_by = Some(user);
        }
        if let Some(reason) = c.cancel_reason.as_deref().filter(|r| !r.is_empty()) {
            order.status = PurchaseOrderStatus::Canceled;
            order.canceled_on = Some(today);
            order.canceled_by = Some(user);
            order.canceled_reason = Some(reason.to_string());
        }
        order.revision_number = order.revision_number.saturating_add(1);
        Ok(())
    }

    fn to_dto(order: &PurchaseOrder) -> PurchaseOrderDto {
        PurchaseOrderDto {
            vendor_id: order.vendor_id,
            po_type: order.po_type.clone(),
            po_quote_number: order.po_quote_number.clone(),
            revision_number: order.revision_number,
            status: order.status,
            completed_on: order.completed_on,
            completed_by: order.completed_by,
            canceled_on: order.canceled_on,
            canceled_by: order.canceled_by,
            canceled_reason: order.canceled_reason.clone(),
            order_total: order.order_total(),
            purchase_order_lines: order
                .lines
                .iter()
                .map(|line| PurchaseOrderLineDto {
                    id: line.line_id,
                    line_number: line.line_number,
                    product_id: line.product_id,
                    quantity: line.quantity,
                    description: line.description.clone(),
                    unit_price: line.unit_price,
                    tax: line.tax,
                    is_taxable: line.is_taxable,
                    line_total: line.line_total(),
                })
                .collect(),
            audit: AuditDto::new(order.id, &order.audit),
        }
    }

    fn to_list_dto(order: &PurchaseOrder) -> PurchaseOrderListDto {
        PurchaseOrderListDto {
            vendor_id: order.vendor_id,
            po_type: order.po_type.clone(),
            po_quote_number: order.po_quote_number.clone(),
            revision_number: order.revision_number,
            status: order.status,
            line_count: order.lines.len(),
            order_total: order.order_total(),
            audit: AuditDto::new(order.id, &order.audit),
        }
    }

    fn search_fields(order: &PurchaseOrder) -> Vec<&str> {
        let mut fields = vec![order.po_type.as_str()];
        fields.extend(order.po_quote_number.as_deref());
        fields.extend(order.lines.iter().filter_map(|l| l.description.as_deref()));
        fields
    }

    fn matches(order: &PurchaseOrder, filter: &PurchaseOrderFilter) -> bool {
        exact_matches(filter.vendor_id.as_ref(), &order.vendor_id)
            && exact_matches(filter.status.as_ref(), &order.status)
            && exact_matches(filter.po_type.as_ref(), &order.po_type)
    }
}

pub type PurchaseOrderModule<S> = ErpModule<PurchaseOrders, S>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use kosmos_core::{PagingSortingParameters, ResultCode};
    use kosmos_module::{FindCommand, InMemoryRecordStore, MAX_LINE_NUMBER};

    use crate::test_support::{AllowAll, caller};

    fn module() -> PurchaseOrderModule<InMemoryRecordStore<PurchaseOrder>> {
        ErpModule::new(InMemoryRecordStore::new("Purchase order"), Arc::new(AllowAll))
    }

    fn widget_order() -> CreatePurchaseOrder {
        CreatePurchaseOrder::new(caller(1), RecordId::new(7), "Standard")
            .with_line(NewPurchaseOrderLine::new(RecordId::new(3), 10, 250))
            .with_line(NewPurchaseOrderLine {
                line_number: Some(5),
                is_taxable: true,
                tax: 40,
                ..NewPurchaseOrderLine::new(RecordId::new(4), 2, 1_000)
            })
            .with_line(NewPurchaseOrderLine::new(RecordId::new(5), 1, 99))
    }

    #[test]
    fn create_numbers_lines_and_totals_them() {
        let dto = module().create(&widget_order()).into_result().unwrap();

        let numbers: Vec<u32> = dto.purchase_order_lines.iter().map(|l| l.line_number).collect();
        assert_eq!(numbers, vec![1, 5, 6]);
        assert_eq!(dto.purchase_order_lines[1].line_total, 2_040);
        assert_eq!(dto.order_total, 2_500 + 2_040 + 99);
        assert_eq!(dto.revision_number, 1);
        assert_eq!(dto.status, PurchaseOrderStatus::Open);
    }

    #[test]
    fn zero_quantity_lines_fail_validation() {
        let cmd = CreatePurchaseOrder::new(caller(1), RecordId::new(7), "Standard")
            .with_line(NewPurchaseOrderLine::new(RecordId::new(3), 0, 250));
        let resp = module().create(&cmd);
        assert_eq!(resp.result_code, ResultCode::DataValidationError);
    }

    #[test]
    fn edit_adds_updates_and_removes_lines() {
        let module = module();
        module.create(&widget_order()).into_result().unwrap();

        let mut edit = EditPurchaseOrder::new(caller(2), RecordId::new(1));
        edit.changes.line_changes = vec![
            LineChange::Remove { line_id: RecordId::new(3) },
            LineChange::Update {
                line_id: RecordId::new(1),
                changes: PurchaseOrderLineChanges {
                    quantity: Some(4),
                    ..PurchaseOrderLineChanges::default()
                },
            },
            LineChange::Add(NewPurchaseOrderLine::new(RecordId::new(9), 3, 10)),
        ];
        let dto = module.edit(&edit).into_result().unwrap();

        let lines: Vec<(RecordId, u32, i32)> = dto
            .purchase_order_lines
            .iter()
            .map(|l| (l.id, l.line_number, l.quantity))
            .collect();
        assert_eq!(
            lines,
            vec![
                (RecordId::new(1), 1, 4),
                (RecordId::new(2), 5, 2),
                (RecordId::new(3), 6, 3),
            ]
        );
        assert_eq!(dto.revision_number, 2);
    }

    #[test]
    fn unknown_line_is_not_found_and_leaves_the_order_alone() {
        let module = module();
        module.create(&widget_order()).into_result().unwrap();

        let mut edit = EditPurchaseOrder::new(caller(2), RecordId::new(1));
        edit.changes.po_type = Some("Blanket".into());
        edit.changes.line_changes = vec![LineChange::Remove { line_id: RecordId::new(42) }];
        assert_eq!(module.edit(&edit).result_code, ResultCode::NotFound);

        let dto = module.get_dto(&caller(1), RecordId::new(1)).into_result().unwrap();
        assert_eq!(dto.po_type, "Standard");
        assert_eq!(dto.purchase_order_lines.len(), 3);
    }

    #[test]
    fn renumbering_onto_a_used_number_is_rejected() {
        let module = module();
        module.create(&widget_order()).into_result().unwrap();

        let mut edit = EditPurchaseOrder::new(caller(2), RecordId::new(1));
        edit.changes.line_changes = vec![LineChange::Update {
            line_id: RecordId::new(1),
            changes: PurchaseOrderLineChanges {
                line_number: Some(5),
                ..PurchaseOrderLineChanges::default()
            },
        }];
        assert_eq!(module.edit(&edit).result_code, ResultCode::DataValidationError);
    }

    #[test]
    fn repeated_line_numbers_are_rejected_on_create() {
        let module = module();
        let cmd = CreatePurchaseOrder::new(caller(1), RecordId::new(7), "Standard")
            .with_line(NewPurchaseOrderLine {
                line_number: Some(1),
                ..NewPurchaseOrderLine::new(RecordId::new(3), 1, 10)
            })
            .with_line(NewPurchaseOrderLine {
                line_number: Some(1),
                ..NewPurchaseOrderLine::new(RecordId::new(4), 1, 10)
            });
        assert_eq!(module.create(&cmd).result_code, ResultCode::DataValidationError);
        assert_eq!(
            module
                .find(PagingSortingParameters::default(), &FindCommand::new(caller(1)))
                .total_result_count,
            0
        );
    }

    #[test]
    fn line_numbers_past_the_limit_are_rejected() {
        let cmd = CreatePurchaseOrder::new(caller(1), RecordId::new(7), "Standard")
            .with_line(NewPurchaseOrderLine {
                line_number: Some(u32::MAX),
                ..NewPurchaseOrderLine::new(RecordId::new(3), 1, 10)
            })
            .with_line(NewPurchaseOrderLine::new(RecordId::new(4), 1, 10));
        assert_eq!(module().create(&cmd).result_code, ResultCode::DataValidationError);

        let module = module();
        module.create(&widget_order()).into_result().unwrap();
        let mut edit = EditPurchaseOrder::new(caller(2), RecordId::new(1));
        edit.changes.line_changes = vec![LineChange::Add(NewPurchaseOrderLine {
            line_number: Some(MAX_LINE_NUMBER + 1),
            ..NewPurchaseOrderLine::new(RecordId::new(9), 1, 10)
        })];
        assert_eq!(module.edit(&edit).result_code, ResultCode::DataValidationError);
    }

    #[test]
    fn canceled_orders_are_frozen() {
        let module = module();
        module.create(&widget_order()).into_result().unwrap();

        let mut cancel = EditPurchaseOrder::new(caller(2), RecordId::new(1));
        cancel.changes.cancel_reason = Some("Vendor out of stock".into());
        let dto = module.edit(&cancel).into_result().unwrap();
        assert_eq!(dto.status, PurchaseOrderStatus::Canceled);
        assert_eq!(dto.canceled_by, Some(UserId::new(2)));
        assert!(dto.canceled_on.is_some());

        let mut retype = EditPurchaseOrder::new(caller(2), RecordId::new(1));
        retype.changes.po_type = Some("Blanket".into());
        assert_eq!(module.edit(&retype).result_code, ResultCode::DataValidationError);
    }

    #[test]
    fn complete_and_cancel_together_is_invalid() {
        let mut edit = EditPurchaseOrder::new(caller(2), RecordId::new(1));
        edit.changes.complete = Some(true);
        edit.changes.cancel_reason = Some("nope".into());
        assert!(edit.validate().is_err());
    }

    #[test]
    fn find_filters_by_vendor_and_status() {
        let module = module();
        module.create(&widget_order()).into_result().unwrap();
        module
            .create(&CreatePurchaseOrder::new(caller(1), RecordId::new(8), "Standard"))
            .into_result()
            .unwrap();

        let mut complete = EditPurchaseOrder::new(caller(1), RecordId::new(2));
        complete.changes.complete = Some(true);
        module.edit(&complete).into_result().unwrap();

        let open = module.find(
            PagingSortingParameters::default(),
            &FindCommand::new(caller(1)).with_filter(PurchaseOrderFilter {
                status: Some(PurchaseOrderStatus::Open),
                ..PurchaseOrderFilter::default()
            }),
        );
        assert_eq!(open.total_result_count, 1);
        assert_eq!(open.data[0].vendor_id, RecordId::new(7));
        assert_eq!(open.data[0].line_count, 3);
    }

    #[test]
    fn line_changes_serialize_with_an_action_tag() {
        let change: PurchaseOrderLineChange = LineChange::Remove { line_id: RecordId::new(2) };
        let json = serde_json::to_value(&change).unwrap();
        assert_eq!(json["action"], "remove");
    }
}

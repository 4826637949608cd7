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

/// Sales order status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Draft,
    Confirmed,
    Invoiced,
    Closed,
}

impl OrderStatus {
    pub fn can_become(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Draft, Confirmed) | (Confirmed, Invoiced) | (Invoiced, Closed) | (Draft, Closed)
        ) || self == next
    }
}

/// Order line: product, quantity, unit price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub line_id: RecordId,
    pub line_number: u32,
    pub product_id: RecordId,
    pub opportunity_line_id: Option<RecordId>,
    pub quantity: i32,
    /// Price in smallest currency unit (e.g., cents).
    pub unit_price: i64,
}

impl OrderLine {
    pub fn line_total(&self) -> i64 {
        i64::from(self.quantity).saturating_mul(self.unit_price)
    }
}

impl Line for OrderLine {
    fn line_id(&self) -> RecordId {
        self.line_id
    }

    fn line_number(&self) -> u32 {
        self.line_number
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: RecordId,
    pub customer_id: RecordId,
    pub order_type: String,
    pub customer_po_number: Option<String>,
    pub order_date: NaiveDate,
    pub required_date: Option<NaiveDate>,
    pub ship_to_address: Option<String>,
    pub status: OrderStatus,
    pub lines: Vec<OrderLine>,
    pub audit: AuditFields,
}

impl_record!(Order);

impl Order {
    /// Lines can only change while the order is a draft.
    pub fn is_modifiable(&self) -> bool {
        matches!(self.status, OrderStatus::Draft)
    }

    pub fn order_total(&self) -> i64 {
        self.lines
            .iter()
            .fold(0i64, |sum, line| sum.saturating_add(line.line_total()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrderLine {
    pub line_number: Option<u32>,
    pub product_id: RecordId,
    pub opportunity_line_id: Option<RecordId>,
    pub quantity: i32,
    pub unit_price: i64,
}

impl NewOrderLine {
    pub fn new(product_id: RecordId, quantity: i32, unit_price: i64) -> Self {
        Self {
            line_number: None,
            product_id,
            opportunity_line_id: None,
            quantity,
            unit_price,
        }
    }

    fn check(&self, v: &mut Validator) {
        check_line_number(v, self.line_number)
            .positive("product_id", i64::from(self.product_id.get()))
            .positive("quantity", i64::from(self.quantity))
            .positive("unit_price", self.unit_price);
    }

    fn build(&self, line_id: RecordId, existing: &[OrderLine]) -> OrderLine {
        OrderLine {
            line_id,
            line_number: assign_line_number(existing, self.line_number),
            product_id: self.product_id,
            opportunity_line_id: self.opportunity_line_id,
            quantity: self.quantity,
            unit_price: self.unit_price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrderLineChanges {
    pub line_number: Option<u32>,
    pub product_id: Option<RecordId>,
    pub quantity: Option<i32>,
    pub unit_price: Option<i64>,
}

pub type OrderLineChange = LineChange<NewOrderLine, OrderLineChanges>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOrder {
    pub caller: Caller,
    pub customer_id: RecordId,
    pub order_type: String,
    pub customer_po_number: Option<String>,
    pub order_date: NaiveDate,
    pub required_date: Option<NaiveDate>,
    pub ship_to_address: Option<String>,
    #[serde(default)]
    pub order_lines: Vec<NewOrderLine>,
}

impl CreateOrder {
    pub fn new(caller: Caller, customer_id: RecordId, order_date: NaiveDate) -> Self {
        Self {
            caller,
            customer_id,
            order_type: "Standard".to_string(),
            customer_po_number: None,
            order_date,
            required_date: None,
            ship_to_address: None,
            order_lines: Vec::new(),
        }
    }

    pub fn with_line(mut self, line: NewOrderLine) -> Self {
        self.order_lines.push(line);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrderChanges {
    pub order_type: Option<String>,
    pub customer_po_number: Option<String>,
    pub required_date: Option<NaiveDate>,
    pub ship_to_address: Option<String>,
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub line_changes: Vec<OrderLineChange>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditOrder {
    pub caller: Caller,
    pub id: RecordId,
    #[serde(flatten)]
    pub changes: OrderChanges,
}

impl EditOrder {
    pub fn new(caller: Caller, id: RecordId) -> Self {
        Self {
            caller,
            id,
            changes: OrderChanges::default(),
        }
    }
}

impl ModuleCommand for CreateOrder {
    fn caller(&self) -> &Caller {
        &self.caller
    }
}

impl ModuleCommand for EditOrder {
    fn caller(&self) -> &Caller {
        &self.caller
    }
}

impl TargetsRecord for EditOrder {
    fn record_id(&self) -> RecordId {
        self.id
    }
}

impl Validate for CreateOrder {
    fn validate(&self) -> Result<(), DomainError> {
        let mut v = Validator::new();
        v.positive("customer_id", i64::from(self.customer_id.get()))
            .required("order_type", &self.order_type)
            .max_len("order_type", Some(&self.order_type), 50)
            .max_len("customer_po_number", self.customer_po_number.as_deref(), 100)
            .max_len("ship_to_address", self.ship_to_address.as_deref(), 1000)
            .check(
                self.required_date.is_none_or(|d| d >= self.order_date),
                "required_date cannot be before order_date",
            );
        for line in &self.order_lines {
            line.check(&mut v);
        }
        check_distinct_line_numbers(&mut v, self.order_lines.iter().map(|l| l.line_number));
        v.finish()
    }
}

impl Validate for EditOrder {
    fn validate(&self) -> Result<(), DomainError> {
        let c = &self.changes;
        let mut v = Validator::new();
        v.check(self.id.get() > 0, "id must be greater than zero")
            .max_len("order_type", c.order_type.as_deref(), 50)
            .max_len("customer_po_number", c.customer_po_number.as_deref(), 100)
            .max_len("ship_to_address", c.ship_to_address.as_deref(), 1000);
        for change in &c.line_changes {
            match change {
                LineChange::Add(line) => line.check(&mut v),
                LineChange::Update { changes, .. } => {
                    check_line_number(&mut v, changes.line_number);
                    if let Some(quantity) = changes.quantity {
                        v.positive("quantity", i64::from(quantity));
                    }
                    if let Some(unit_price) = changes.unit_price {
                        v.positive("unit_price", unit_price);
                    }
                }
                LineChange::Remove { .. } => {}
            }
        }
        v.finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrderFilter {
    pub customer_id: Option<RecordId>,
    pub status: Option<OrderStatus>,
    pub order_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineDto {
    pub id: RecordId,
    pub line_number: u32,
    pub product_id: RecordId,
    pub opportunity_line_id: Option<RecordId>,
    pub quantity: i32,
    pub unit_price: i64,
    pub line_total: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDto {
    pub customer_id: RecordId,
    pub order_type: String,
    pub customer_po_number: Option<String>,
    pub order_date: NaiveDate,
    pub required_date: Option<NaiveDate>,
    pub ship_to_address: Option<String>,
    pub status: OrderStatus,
    pub order_total: i64,
    pub order_lines: Vec<OrderLineDto>,
    #[serde(flatten)]
    pub audit: AuditDto,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderListDto {
    pub customer_id: RecordId,
    pub order_type: String,
    pub customer_po_number: Option<String>,
    pub order_date: NaiveDate,
    pub status: OrderStatus,
    pub order_total: i64,
    #[serde(flatten)]
    pub audit: AuditDto,
}

pub struct Orders;

impl ModuleDefinition for Orders {
    const MODULE_ID: ModuleId = ModuleId::from_u128(0x1e8d4b7a_6c2f_4a9e_b3d1_5f0c7e2a9b44);
    const MODULE_NAME: &'static str = "Orders";
    const RECORD_NAME: &'static str = "Order";

    type Record = Order;
    type Dto = OrderDto;
    type ListDto = OrderListDto;
    type Create = CreateOrder;
    type Edit = EditOrder;
    type Filter = OrderFilter;

    fn permissions() -> ModulePermissionSet {
        ModulePermissionSet::crud(
            Self::MODULE_ID,
            Self::MODULE_NAME,
            RoleName::from_static("Sales Users"),
            "order",
            "Order",
        )
    }

    fn create_record(cmd: &CreateOrder, audit: AuditFields) -> Order {
        let mut lines: Vec<OrderLine> = Vec::with_capacity(cmd.order_lines.len());
        for new_line in &cmd.order_lines {
            let line = new_line.build(next_line_id(&lines), &lines);
            lines.push(line);
        }
        Order {
            id: RecordId::new(0),
            customer_id: cmd.customer_id,
            order_type: cmd.order_type.clone(),
            customer_po_number: cmd.customer_po_number.clone(),
            order_date: cmd.order_date,
            required_date: cmd.required_date,
            ship_to_address: cmd.ship_to_address.clone(),
            status: OrderStatus::Draft,
            lines,
            audit,
        }
    }

    fn apply_edit(order: &mut Order, cmd: &EditOrder) -> Result<(), DomainError> {
        let c = &cmd.changes;
        if order.status == OrderStatus::Closed {
            return Err(DomainError::validation("closed orders cannot be edited"));
        }
        if !c.line_changes.is_empty() && !order.is_modifiable() {
            return Err(DomainError::validation(
                "cannot modify order lines once the order is confirmed",
            ));
        }

        patch_text(&mut order.order_type, c.order_type.as_deref());
        patch_opt_text(&mut order.customer_po_number, c.customer_po_number.as_deref());
        patch_opt(&mut order.required_date, c.required_date.as_ref());
        patch_opt_text(&mut order.ship_to_address, c.ship_to_address.as_deref());
        if order.required_date.is_some_and(|d| d < order.order_date) {
            return Err(DomainError::validation(
                "required_date cannot be before order_date",
            ));
        }

        apply_line_changes(
            &mut order.lines,
            &c.line_changes,
            |new_line, id, existing| new_line.build(id, existing),
            |line, changes| {
                patch(&mut line.line_number, changes.line_number.as_ref());
                patch(&mut line.product_id, changes.product_id.as_ref());
                patch(&mut line.quantity, changes.quantity.as_ref());
                patch(&mut line.unit_price, changes.unit_price.as_ref());
            },
        )?;
        check_line_numbers(&order.lines)?;

        if let Some(next) = c.status {
            if !order.status.can_become(next) {
                return Err(DomainError::validation(format!(
                    "order cannot move from {:?} to {:?}",
                    order.status, next
                )));
            }
            if next == OrderStatus::Confirmed && order.lines.is_empty() {
                return Err(DomainError::validation("cannot confirm order without lines"));
            }
            order.status = next;
        }
        Ok(())
    }

    fn to_dto(order: &Order) -> OrderDto {
        OrderDto {
            customer_id: order.customer_id,
            order_type: order.order_type.clone(),
            customer_po_number: order.customer_po_number.clone(),
            order_date: order.order_date,
            required_date: order.required_date,
            ship_to_address: order.ship_to_address.clone(),
            status: order.status,
            order_total: order.order_total(),
            order_lines: order
                .lines
                .iter()
                .map(|line| OrderLineDto {
                    id: line.line_id,
                    line_number: line.line_number,
                    product_id: line.product_id,
                    opportunity_line_id: line.opportunity_line_id,
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                    line_total: line.line_total(),
                })
                .collect(),
            audit: AuditDto::new(order.id, &order.audit),
        }
    }

    fn to_list_dto(order: &Order) -> OrderListDto {
        OrderListDto {
            customer_id: order.customer_id,
            order_type: order.order_type.clone(),
            customer_po_number: order.customer_po_number.clone(),
            order_date: order.order_date,
            status: order.status,
            order_total: order.order_total(),
            audit: AuditDto::new(order.id, &order.audit),
        }
    }

    fn search_fields(order: &Order) -> Vec<&str> {
        let mut fields = vec![order.order_type.as_str()];
        fields.extend(order.customer_po_number.as_deref());
        fields.extend(order.ship_to_address.as_deref());
        fields
    }

    fn matches(order: &Order, filter: &OrderFilter) -> bool {
        exact_matches(filter.customer_id.as_ref(), &order.customer_id)
            && exact_matches(filter.status.as_ref(), &order.status)
            && exact_matches(filter.order_type.as_ref(), &order.order_type)
    }
}

pub type OrderModule<S> = ErpModule<Orders, S>;

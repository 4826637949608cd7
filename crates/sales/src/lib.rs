//! Sales: customer orders and their shipments.

pub mod order;
pub mod shipment;

pub use order::{
    CreateOrder, EditOrder, NewOrderLine, Order, OrderChanges, OrderDto, OrderFilter, OrderLine,
    OrderLineChange, OrderLineChanges, OrderListDto, OrderModule, OrderStatus, Orders,
};
pub use shipment::{
    CreateShipment, EditShipment, Shipment, ShipmentDto, ShipmentFilter, ShipmentListDto,
    ShipmentModule, Shipments,
};

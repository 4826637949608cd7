//! Purchasing: purchase orders and their lines.

pub mod purchase_order;

pub use purchase_order::{
    CreatePurchaseOrder, EditPurchaseOrder, NewPurchaseOrderLine, PurchaseOrder,
    PurchaseOrderChanges, PurchaseOrderDto, PurchaseOrderFilter, PurchaseOrderLine,
    PurchaseOrderLineChange, PurchaseOrderLineChanges, PurchaseOrderListDto, PurchaseOrderModule,
    PurchaseOrderStatus, PurchaseOrders,
};

//! Invoicing: accounts payable (vendor bills) and accounts receivable.
//!
//! Amounts are integers in the smallest currency unit.

pub mod ap_invoice;
pub mod ar_invoice;

pub use ap_invoice::{
    ApInvoice, ApInvoiceChanges, ApInvoiceDto, ApInvoiceFilter, ApInvoiceLine, ApInvoiceLineChange,
    ApInvoiceLineChanges, ApInvoiceListDto, ApInvoiceModule, ApInvoices, AssociationKind,
    CreateApInvoice, EditApInvoice, InvoiceAssociation, NewApInvoiceLine,
};
pub use ar_invoice::{
    ArInvoice, ArInvoiceDto, ArInvoiceFilter, ArInvoiceListDto, ArInvoiceModule, ArInvoiceStatus,
    ArInvoices, CreateArInvoice, EditArInvoice,
};

#[cfg(test)]
pub(crate) mod test_support {
    use kosmos_auth::{Authorizer, Caller, Capabilities, PermissionKey};
    use kosmos_core::UserId;

    pub struct AllowAll;

    impl Authorizer for AllowAll {
        fn has_permission(&self, _caller: &Caller, _key: &PermissionKey, required: Capabilities) -> bool {
            !required.is_empty()
        }
    }

    pub fn caller(id: i32) -> Caller {
        Caller::new(UserId::new(id), format!("token-{id}"))
    }
}

//! Trading partners: customers and vendors.

pub mod customer;
pub mod vendor;

pub use customer::{
    CreateCustomer, Customer, CustomerDto, CustomerFilter, CustomerListDto, CustomerModule,
    Customers, EditCustomer,
};
pub use vendor::{
    CreateVendor, EditVendor, Vendor, VendorDto, VendorFilter, VendorListDto, VendorModule, Vendors,
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

//! CRM modules: leads, opportunities and contacts.

pub mod contact;
pub mod lead;
pub mod opportunity;

pub use contact::{
    Contact, ContactDto, ContactFilter, ContactListDto, ContactModule, Contacts, CreateContact,
    EditContact,
};
pub use lead::{
    CreateLead, EditLead, Lead, LeadChanges, LeadDto, LeadFilter, LeadListDto, LeadModule,
    LeadStage, Leads,
};
pub use opportunity::{
    CreateOpportunity, EditOpportunity, Opportunities, Opportunity, OpportunityDto,
    OpportunityFilter, OpportunityListDto, OpportunityModule, OpportunityStage,
};

#[cfg(test)]
pub(crate) mod test_support {
    use kosmos_auth::{Authorizer, Caller, Capabilities, PermissionKey};
    use kosmos_core::UserId;

    /// Grants every non-empty request except to user 99.
    pub struct AllowAll;

    impl Authorizer for AllowAll {
        fn has_permission(&self, caller: &Caller, _key: &PermissionKey, required: Capabilities) -> bool {
            caller.calling_user_id != UserId::new(99) && !required.is_empty()
        }
    }

    pub fn caller(id: i32) -> Caller {
        Caller::new(UserId::new(id), format!("token-{id}"))
    }
}

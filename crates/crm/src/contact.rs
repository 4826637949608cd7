use serde::{Deserialize, Serialize};

use kosmos_auth::{Caller, ModulePermissionSet, RoleName};
use kosmos_core::{
    AuditDto, AuditFields, DomainError, ModuleId, RecordId, Validate, Validator, impl_record,
};
use kosmos_module::{
    ErpModule, ModuleCommand, ModuleDefinition, TargetsRecord, patch_opt, patch_opt_text, patch_text,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: RecordId,
    pub customer_id: Option<RecordId>,
    pub first_name: String,
    pub last_name: String,
    pub title: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub cell_phone: Option<String>,
    pub audit: AuditFields,
}

impl_record!(Contact);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateContact {
    pub caller: Caller,
    pub customer_id: Option<RecordId>,
    pub first_name: String,
    pub last_name: String,
    pub title: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub cell_phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditContact {
    pub caller: Caller,
    pub id: RecordId,
    pub customer_id: Option<RecordId>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub title: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub cell_phone: Option<String>,
}

impl ModuleCommand for CreateContact {
    fn caller(&self) -> &Caller {
        &self.caller
    }
}

impl ModuleCommand for EditContact {
    fn caller(&self) -> &Caller {
        &self.caller
    }
}

impl TargetsRecord for EditContact {
    fn record_id(&self) -> RecordId {
        self.id
    }
}

impl Validate for CreateContact {
    fn validate(&self) -> Result<(), DomainError> {
        Validator::new()
            .required("first_name", &self.first_name)
            .required("last_name", &self.last_name)
            .max_len("first_name", Some(&self.first_name), 100)
            .max_len("last_name", Some(&self.last_name), 100)
            .max_len("email", self.email.as_deref(), 255)
            .max_len("phone", self.phone.as_deref(), 50)
            .max_len("cell_phone", self.cell_phone.as_deref(), 50)
            .finish()
    }
}

impl Validate for EditContact {
    fn validate(&self) -> Result<(), DomainError> {
        Validator::new()
            .check(self.id.get() > 0, "id must be greater than zero")
            .max_len("first_name", self.first_name.as_deref(), 100)
            .max_len("last_name", self.last_name.as_deref(), 100)
            .max_len("email", self.email.as_deref(), 255)
            .max_len("phone", self.phone.as_deref(), 50)
            .max_len("cell_phone", self.cell_phone.as_deref(), 50)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContactFilter {
    pub customer_id: Option<RecordId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDto {
    pub customer_id: Option<RecordId>,
    pub first_name: String,
    pub last_name: String,
    pub title: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub cell_phone: Option<String>,
    #[serde(flatten)]
    pub audit: AuditDto,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactListDto {
    pub customer_id: Option<RecordId>,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    #[serde(flatten)]
    pub audit: AuditDto,
}

pub struct Contacts;

impl ModuleDefinition for Contacts {
    const MODULE_ID: ModuleId = ModuleId::from_u128(0xe89c86b7_44e8_4cac_aee3_3e7bcea845ef);
    const MODULE_NAME: &'static str = "Contacts";
    const RECORD_NAME: &'static str = "Contact";

    type Record = Contact;
    type Dto = ContactDto;
    type ListDto = ContactListDto;
    type Create = CreateContact;
    type Edit = EditContact;
    type Filter = ContactFilter;

    fn permissions() -> ModulePermissionSet {
        ModulePermissionSet::crud(
            Self::MODULE_ID,
            Self::MODULE_NAME,
            RoleName::from_static("Contact Users"),
            "contact",
            "Contact",
        )
    }

    fn create_record(cmd: &CreateContact, audit: AuditFields) -> Contact {
        Contact {
            id: RecordId::new(0),
            customer_id: cmd.customer_id,
            first_name: cmd.first_name.clone(),
            last_name: cmd.last_name.clone(),
            title: cmd.title.clone(),
            email: cmd.email.clone(),
            phone: cmd.phone.clone(),
            cell_phone: cmd.cell_phone.clone(),
            audit,
        }
    }

    fn apply_edit(contact: &mut Contact, cmd: &EditContact) -> Result<(), DomainError> {
        patch_opt(&mut contact.customer_id, cmd.customer_id.as_ref());
        patch_text(&mut contact.first_name, cmd.first_name.as_deref());
        patch_text(&mut contact.last_name, cmd.last_name.as_deref());
        patch_opt_text(&mut contact.title, cmd.title.as_deref());
        patch_opt_text(&mut contact.email, cmd.email.as_deref());
        patch_opt_text(&mut contact.phone, cmd.phone.as_deref());
        patch_opt_text(&mut contact.cell_phone, cmd.cell_phone.as_deref());
        Ok(())
    }

    fn to_dto(contact: &Contact) -> ContactDto {
        ContactDto {
            customer_id: contact.customer_id,
            first_name: contact.first_name.clone(),
            last_name: contact.last_name.clone(),
            title: contact.title.clone(),
            email: contact.email.clone(),
            phone: contact.phone.clone(),
            cell_phone: contact.cell_phone.clone(),
            audit: AuditDto::new(contact.id, &contact.audit),
        }
    }

    fn to_list_dto(contact: &Contact) -> ContactListDto {
        ContactListDto {
            customer_id: contact.customer_id,
            first_name: contact.first_name.clone(),
            last_name: contact.last_name.clone(),
            email: contact.email.clone(),
            audit: AuditDto::new(contact.id, &contact.audit),
        }
    }

    fn search_fields(contact: &Contact) -> Vec<&str> {
        let mut fields = vec![contact.first_name.as_str(), contact.last_name.as_str()];
        fields.extend(
            [&contact.title, &contact.email, &contact.phone, &contact.cell_phone]
                .into_iter()
                .filter_map(|f| f.as_deref()),
        );
        fields
    }

    fn matches(contact: &Contact, filter: &ContactFilter) -> bool {
        filter
            .customer_id
            .is_none_or(|id| contact.customer_id == Some(id))
    }
}

pub type ContactModule<S> = ErpModule<Contacts, S>;

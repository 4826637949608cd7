use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use kosmos_auth::{Caller, ModulePermissionSet, RoleName};
use kosmos_core::{
    AuditDto, AuditFields, DomainError, ModuleId, RecordId, UserId, Validate, Validator,
    impl_record,
};
use kosmos_module::{
    ErpModule, ModuleCommand, ModuleDefinition, TargetsRecord, exact_matches, patch, patch_opt,
    patch_opt_text, patch_text,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vendor {
    pub id: RecordId,
    pub vendor_name: String,
    pub vendor_description: Option<String>,
    pub phone: String,
    pub fax: Option<String>,
    pub general_email: Option<String>,
    pub website: Option<String>,
    pub category: String,
    pub is_critical_vendor: bool,
    pub approved_on: Option<NaiveDate>,
    pub approved_by: Option<UserId>,
    pub retired_on: Option<NaiveDate>,
    pub retired_by: Option<UserId>,
    pub audit: AuditFields,
}

impl_record!(Vendor);

impl Vendor {
    pub fn is_retired(&self) -> bool {
        self.retired_on.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateVendor {
    pub caller: Caller,
    pub vendor_name: String,
    pub vendor_description: Option<String>,
    pub phone: String,
    pub fax: Option<String>,
    pub general_email: Option<String>,
    pub website: Option<String>,
    pub category: String,
    pub is_critical_vendor: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditVendor {
    pub caller: Caller,
    pub id: RecordId,
    pub vendor_name: Option<String>,
    pub vendor_description: Option<String>,
    pub phone: Option<String>,
    pub fax: Option<String>,
    pub general_email: Option<String>,
    pub website: Option<String>,
    pub category: Option<String>,
    pub is_critical_vendor: Option<bool>,
    pub approved_on: Option<NaiveDate>,
    pub approved_by: Option<UserId>,
    pub retired_on: Option<NaiveDate>,
    pub retired_by: Option<UserId>,
}

impl EditVendor {
    pub fn new(caller: Caller, id: RecordId) -> Self {
        Self {
            caller,
            id,
            vendor_name: None,
            vendor_description: None,
            phone: None,
            fax: None,
            general_email: None,
            website: None,
            category: None,
            is_critical_vendor: None,
            approved_on: None,
            approved_by: None,
            retired_on: None,
            retired_by: None,
        }
    }
}

impl ModuleCommand for CreateVendor {
    fn caller(&self) -> &Caller {
        &self.caller
    }
}

impl ModuleCommand for EditVendor {
    fn caller(&self) -> &Caller {
        &self.caller
    }
}

impl TargetsRecord for EditVendor {
    fn record_id(&self) -> RecordId {
        self.id
    }
}

impl Validate for CreateVendor {
    fn validate(&self) -> Result<(), DomainError> {
        Validator::new()
            .required("vendor_name", &self.vendor_name)
            .max_len("vendor_name", Some(&self.vendor_name), 255)
            .max_len("vendor_description", self.vendor_description.as_deref(), 1000)
            .required("phone", &self.phone)
            .max_len("phone", Some(&self.phone), 50)
            .max_len("fax", self.fax.as_deref(), 50)
            .max_len("general_email", self.general_email.as_deref(), 255)
            .max_len("website", self.website.as_deref(), 255)
            .required("category", &self.category)
            .max_len("category", Some(&self.category), 100)
            .finish()
    }
}

impl Validate for EditVendor {
    fn validate(&self) -> Result<(), DomainError> {
        Validator::new()
            .check(self.id.get() > 0, "id must be greater than zero")
            .max_len("vendor_name", self.vendor_name.as_deref(), 255)
            .max_len("vendor_description", self.vendor_description.as_deref(), 1000)
            .max_len("phone", self.phone.as_deref(), 50)
            .max_len("fax", self.fax.as_deref(), 50)
            .max_len("general_email", self.general_email.as_deref(), 255)
            .max_len("website", self.website.as_deref(), 255)
            .max_len("category", self.category.as_deref(), 100)
            .check(
                self.approved_on.is_some() == self.approved_by.is_some(),
                "approved_on and approved_by must be given together",
            )
            .check(
                self.retired_on.is_some() == self.retired_by.is_some(),
                "retired_on and retired_by must be given together",
            )
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VendorFilter {
    pub category: Option<String>,
    pub is_critical_vendor: Option<bool>,
    /// `Some(false)` hides retired vendors.
    pub is_retired: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorDto {
    pub vendor_name: String,
    pub vendor_description: Option<String>,
    pub phone: String,
    pub fax: Option<String>,
    pub general_email: Option<String>,
    pub website: Option<String>,
    pub category: String,
    pub is_critical_vendor: bool,
    pub approved_on: Option<NaiveDate>,
    pub approved_by: Option<UserId>,
    pub retired_on: Option<NaiveDate>,
    pub retired_by: Option<UserId>,
    #[serde(flatten)]
    pub audit: AuditDto,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorListDto {
    pub vendor_name: String,
    pub phone: String,
    pub category: String,
    pub is_critical_vendor: bool,
    pub is_retired: bool,
    #[serde(flatten)]
    pub audit: AuditDto,
}

pub struct Vendors;

impl ModuleDefinition for Vendors {
    const MODULE_ID: ModuleId = ModuleId::from_u128(0xdae2593c_678b_4f6d_9c84_f4f74e066428);
    const MODULE_NAME: &'static str = "Vendors";
    const RECORD_NAME: &'static str = "Vendor";

    type Record = Vendor;
    type Dto = VendorDto;
    type ListDto = VendorListDto;
    type Create = CreateVendor;
    type Edit = EditVendor;
    type Filter = VendorFilter;

    fn permissions() -> ModulePermissionSet {
        ModulePermissionSet::crud(
            Self::MODULE_ID,
            Self::MODULE_NAME,
            RoleName::from_static("Vendor Users"),
            "vendor",
            "Vendor",
        )
    }

    fn create_record(cmd: &CreateVendor, audit: AuditFields) -> Vendor {
        Vendor {
            id: RecordId::new(0),
            vendor_name: cmd.vendor_name.clone(),
            vendor_description: cmd.vendor_description.clone(),
            phone: cmd.phone.clone(),
            fax: cmd.fax.clone(),
            general_email: cmd.general_email.clone(),
            website: cmd.website.clone(),
            category: cmd.category.clone(),
            is_critical_vendor: cmd.is_critical_vendor,
            approved_on: None,
            approved_by: None,
            retired_on: None,
            retired_by: None,
            audit,
        }
    }

    fn apply_edit(vendor: &mut Vendor, cmd: &EditVendor) -> Result<(), DomainError> {
        patch_text(&mut vendor.vendor_name, cmd.vendor_name.as_deref());
        patch_opt_text(&mut vendor.vendor_description, cmd.vendor_description.as_deref());
        patch_text(&mut vendor.phone, cmd.phone.as_deref());
        patch_opt_text(&mut vendor.fax, cmd.fax.as_deref());
        patch_opt_text(&mut vendor.general_email, cmd.general_email.as_deref());
        patch_opt_text(&mut vendor.website, cmd.website.as_deref());
        patch_text(&mut vendor.category, cmd.category.as_deref());
        patch(&mut vendor.is_critical_vendor, cmd.is_critical_vendor.as_ref());
        patch_opt(&mut vendor.approved_on, cmd.approved_on.as_ref());
        patch_opt(&mut vendor.approved_by, cmd.approved_by.as_ref());
        patch_opt(&mut vendor.retired_on, cmd.retired_on.as_ref());
        patch_opt(&mut vendor.retired_by, cmd.retired_by.as_ref());
        Ok(())
    }

    fn to_dto(vendor: &Vendor) -> VendorDto {
        VendorDto {
            vendor_name: vendor.vendor_name.clone(),
            vendor_description: vendor.vendor_description.clone(),
            phone: vendor.phone.clone(),
            fax: vendor.fax.clone(),
            general_email: vendor.general_email.clone(),
            website: vendor.website.clone(),
            category: vendor.category.clone(),
            is_critical_vendor: vendor.is_critical_vendor,
            approved_on: vendor.approved_on,
            approved_by: vendor.approved_by,
            retired_on: vendor.retired_on,
            retired_by: vendor.retired_by,
            audit: AuditDto::new(vendor.id, &vendor.audit),
        }
    }

    fn to_list_dto(vendor: &Vendor) -> VendorListDto {
        VendorListDto {
            vendor_name: vendor.vendor_name.clone(),
            phone: vendor.phone.clone(),
            category: vendor.category.clone(),
            is_critical_vendor: vendor.is_critical_vendor,
            is_retired: vendor.is_retired(),
            audit: AuditDto::new(vendor.id, &vendor.audit),
        }
    }

    fn search_fields(vendor: &Vendor) -> Vec<&str> {
        let mut fields = vec![
            vendor.vendor_name.as_str(),
            vendor.phone.as_str(),
            vendor.category.as_str(),
        ];
        fields.extend(
            [&vendor.vendor_description, &vendor.fax, &vendor.general_email, &vendor.website]
                .into_iter()
                .filter_map(|f| f.as_deref()),
        );
        fields
    }

    fn matches(vendor: &Vendor, filter: &VendorFilter) -> bool {
        exact_matches(filter.category.as_ref(), &vendor.category)
            && exact_matches(filter.is_critical_vendor.as_ref(), &vendor.is_critical_vendor)
            && exact_matches(filter.is_retired.as_ref(), &vendor.is_retired())
    }
}

pub type VendorModule<S> = ErpModule<Vendors, S>;

use serde::{Deserialize, Serialize};

use kosmos_auth::{Caller, ModulePermissionSet, RoleName};
use kosmos_core::{
    AuditDto, AuditFields, DomainError, ModuleId, RecordId, Validate, Validator, impl_record,
};
use kosmos_module::{
    ErpModule, ModuleCommand, ModuleDefinition, TargetsRecord, exact_matches, patch, patch_opt,
    patch_opt_text, patch_text,
};

/// Free-form name/value pair attached to a product (size, colour, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductAttribute {
    pub attribute_name: String,
    pub attribute_value: String,
    pub attribute_value2: Option<String>,
    pub attribute_value3: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: RecordId,
    pub product_name: String,
    pub product_class: String,
    pub category: String,
    /// Primary identifier, typically the SKU.
    pub identifier1: String,
    pub identifier2: Option<String>,
    pub identifier3: Option<String>,
    pub internal_description: Option<String>,
    pub external_description: Option<String>,
    pub vendor_id: Option<RecordId>,
    pub list_price: i64,
    pub sales_price: i64,
    pub unit_cost: i64,
    pub is_sales_item: bool,
    pub is_taxable: bool,
    pub is_stock: bool,
    pub is_shippable: bool,
    pub is_retired: bool,
    pub required_reorder_level: i32,
    pub attributes: Vec<ProductAttribute>,
    pub audit: AuditFields,
}

impl_record!(Product);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateProduct {
    pub caller: Caller,
    pub product_name: String,
    pub product_class: String,
    pub category: String,
    pub identifier1: String,
    pub identifier2: Option<String>,
    pub identifier3: Option<String>,
    pub internal_description: Option<String>,
    pub external_description: Option<String>,
    pub vendor_id: Option<RecordId>,
    pub list_price: i64,
    pub sales_price: i64,
    pub unit_cost: i64,
    pub is_sales_item: bool,
    pub is_taxable: bool,
    pub is_stock: bool,
    pub is_shippable: bool,
    pub required_reorder_level: i32,
    #[serde(default)]
    pub attributes: Vec<ProductAttribute>,
}

impl CreateProduct {
    pub fn new(
        caller: Caller,
        product_name: impl Into<String>,
        category: impl Into<String>,
        identifier1: impl Into<String>,
    ) -> Self {
        Self {
            caller,
            product_name: product_name.into(),
            product_class: "Standard".to_string(),
            category: category.into(),
            identifier1: identifier1.into(),
            identifier2: None,
            identifier3: None,
            internal_description: None,
            external_description: None,
            vendor_id: None,
            list_price: 0,
            sales_price: 0,
            unit_cost: 0,
            is_sales_item: true,
            is_taxable: true,
            is_stock: true,
            is_shippable: true,
            required_reorder_level: 0,
            attributes: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProductChanges {
    pub product_name: Option<String>,
    pub product_class: Option<String>,
    pub category: Option<String>,
    pub identifier1: Option<String>,
    pub identifier2: Option<String>,
    pub identifier3: Option<String>,
    pub internal_description: Option<String>,
    pub external_description: Option<String>,
    pub vendor_id: Option<RecordId>,
    pub list_price: Option<i64>,
    pub sales_price: Option<i64>,
    pub unit_cost: Option<i64>,
    pub is_sales_item: Option<bool>,
    pub is_taxable: Option<bool>,
    pub is_stock: Option<bool>,
    pub is_shippable: Option<bool>,
    pub is_retired: Option<bool>,
    pub required_reorder_level: Option<i32>,
    /// Replaces the whole attribute list when present.
    pub attributes: Option<Vec<ProductAttribute>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditProduct {
    pub caller: Caller,
    pub id: RecordId,
    #[serde(flatten)]
    pub changes: ProductChanges,
}

impl ModuleCommand for CreateProduct {
    fn caller(&self) -> &Caller {
        &self.caller
    }
}

impl ModuleCommand for EditProduct {
    fn caller(&self) -> &Caller {
        &self.caller
    }
}

impl TargetsRecord for EditProduct {
    fn record_id(&self) -> RecordId {
        self.id
    }
}

fn check_attributes(v: &mut Validator, attributes: &[ProductAttribute]) {
    for attribute in attributes {
        v.required("attribute_name", &attribute.attribute_name)
            .max_len("attribute_name", Some(&attribute.attribute_name), 100)
            .max_len("attribute_value", Some(&attribute.attribute_value), 255);
    }
}

impl Validate for CreateProduct {
    fn validate(&self) -> Result<(), DomainError> {
        let mut v = Validator::new();
        v.required("product_name", &self.product_name)
            .max_len("product_name", Some(&self.product_name), 255)
            .required("product_class", &self.product_class)
            .required("category", &self.category)
            .required("identifier1", &self.identifier1)
            .max_len("identifier1", Some(&self.identifier1), 100)
            .max_len("internal_description", self.internal_description.as_deref(), 1000)
            .max_len("external_description", self.external_description.as_deref(), 1000)
            .non_negative("list_price", self.list_price)
            .non_negative("sales_price", self.sales_price)
            .non_negative("unit_cost", self.unit_cost)
            .non_negative("required_reorder_level", i64::from(self.required_reorder_level));
        check_attributes(&mut v, &self.attributes);
        v.finish()
    }
}

impl Validate for EditProduct {
    fn validate(&self) -> Result<(), DomainError> {
        let c = &self.changes;
        let mut v = Validator::new();
        v.check(self.id.get() > 0, "id must be greater than zero")
            .max_len("product_name", c.product_name.as_deref(), 255)
            .max_len("identifier1", c.identifier1.as_deref(), 100)
            .max_len("internal_description", c.internal_description.as_deref(), 1000)
            .max_len("external_description", c.external_description.as_deref(), 1000);
        for (field, value) in [
            ("list_price", c.list_price),
            ("sales_price", c.sales_price),
            ("unit_cost", c.unit_cost),
            ("required_reorder_level", c.required_reorder_level.map(i64::from)),
        ] {
            if let Some(value) = value {
                v.non_negative(field, value);
            }
        }
        if let Some(attributes) = &c.attributes {
            check_attributes(&mut v, attributes);
        }
        v.finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub vendor_id: Option<RecordId>,
    pub is_retired: Option<bool>,
    pub is_sales_item: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDto {
    pub product_name: String,
    pub product_class: String,
    pub category: String,
    pub identifier1: String,
    pub identifier2: Option<String>,
    pub identifier3: Option<String>,
    pub internal_description: Option<String>,
    pub external_description: Option<String>,
    pub vendor_id: Option<RecordId>,
    pub list_price: i64,
    pub sales_price: i64,
    pub unit_cost: i64,
    pub is_sales_item: bool,
    pub is_taxable: bool,
    pub is_stock: bool,
    pub is_shippable: bool,
    pub is_retired: bool,
    pub required_reorder_level: i32,
    pub product_attributes: Vec<ProductAttribute>,
    #[serde(flatten)]
    pub audit: AuditDto,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductListDto {
    pub product_name: String,
    pub product_class: String,
    pub category: String,
    pub identifier1: String,
    pub vendor_id: Option<RecordId>,
    pub list_price: i64,
    pub sales_price: i64,
    pub is_sales_item: bool,
    #[serde(flatten)]
    pub audit: AuditDto,
}

pub struct Products;

impl ModuleDefinition for Products {
    const MODULE_ID: ModuleId = ModuleId::from_u128(0xb8b0d255_3901_4007_b9c7_b0678f89c955);
    const MODULE_NAME: &'static str = "Products";
    const RECORD_NAME: &'static str = "Product";

    type Record = Product;
    type Dto = ProductDto;
    type ListDto = ProductListDto;
    type Create = CreateProduct;
    type Edit = EditProduct;
    type Filter = ProductFilter;

    fn permissions() -> ModulePermissionSet {
        ModulePermissionSet::crud(
            Self::MODULE_ID,
            Self::MODULE_NAME,
            RoleName::from_static("Product Users"),
            "product",
            "Product",
        )
    }

    fn create_record(cmd: &CreateProduct, audit: AuditFields) -> Product {
        Product {
            id: RecordId::new(0),
            product_name: cmd.product_name.clone(),
            product_class: cmd.product_class.clone(),
            category: cmd.category.clone(),
            identifier1: cmd.identifier1.clone(),
            identifier2: cmd.identifier2.clone(),
            identifier3: cmd.identifier3.clone(),
            internal_description: cmd.internal_description.clone(),
            external_description: cmd.external_description.clone(),
            vendor_id: cmd.vendor_id,
            list_price: cmd.list_price,
            sales_price: cmd.sales_price,
            unit_cost: cmd.unit_cost,
            is_sales_item: cmd.is_sales_item,
            is_taxable: cmd.is_taxable,
            is_stock: cmd.is_stock,
            is_shippable: cmd.is_shippable,
            is_retired: false,
            required_reorder_level: cmd.required_reorder_level,
            attributes: cmd.attributes.clone(),
            audit,
        }
    }

    fn apply_edit(product: &mut Product, cmd: &EditProduct) -> Result<(), DomainError> {
        let c = &cmd.changes;
        patch_text(&mut product.product_name, c.product_name.as_deref());
        patch_text(&mut product.product_class, c.product_class.as_deref());
        patch_text(&mut product.category, c.category.as_deref());
        patch_text(&mut product.identifier1, c.identifier1.as_deref());
        patch_opt_text(&mut product.identifier2, c.identifier2.as_deref());
        patch_opt_text(&mut product.identifier3, c.identifier3.as_deref());
        patch_opt_text(&mut product.internal_description, c.internal_description.as_deref());
        patch_opt_text(&mut product.external_description, c.external_description.as_deref());
        patch_opt(&mut product.vendor_id, c.vendor_id.as_ref());
        patch(&mut product.list_price, c.list_price.as_ref());
        patch(&mut product.sales_price, c.sales_price.as_ref());
        patch(&mut product.unit_cost, c.unit_cost.as_ref());
        patch(&mut product.is_sales_item, c.is_sales_item.as_ref());
        patch(&mut product.is_taxable, c.is_taxable.as_ref());
        patch(&mut product.is_stock, c.is_stock.as_ref());
        patch(&mut product.is_shippable, c.is_shippable.as_ref());
        patch(&mut product.is_retired, c.is_retired.as_ref());
        patch(&mut product.required_reorder_level, c.required_reorder_level.as_ref());
        patch(&mut product.attributes, c.attributes.as_ref());
        Ok(())
    }

    fn to_dto(product: &Product) -> ProductDto {
        ProductDto {
            product_name: product.product_name.clone(),
            product_class: product.product_class.clone(),
            category: product.category.clone(),
            identifier1: product.identifier1.clone(),
            identifier2: product.identifier2.clone(),
            identifier3: product.identifier3.clone(),
            internal_description: product.internal_description.clone(),
            external_description: product.external_description.clone(),
            vendor_id: product.vendor_id,
            list_price: product.list_price,
            sales_price: product.sales_price,
            unit_cost: product.unit_cost,
            is_sales_item: product.is_sales_item,
            is_taxable: product.is_taxable,
            is_stock: product.is_stock,
            is_shippable: product.is_shippable,
            is_retired: product.is_retired,
            required_reorder_level: product.required_reorder_level,
            product_attributes: product.attributes.clone(),
            audit: AuditDto::new(product.id, &product.audit),
        }
    }

    fn to_list_dto(product: &Product) -> ProductListDto {
        ProductListDto {
            product_name: product.product_name.clone(),
            product_class: product.product_class.clone(),
            category: product.category.clone(),
            identifier1: product.identifier1.clone(),
            vendor_id: product.vendor_id,
            list_price: product.list_price,
            sales_price: product.sales_price,
            is_sales_item: product.is_sales_item,
            audit: AuditDto::new(product.id, &product.audit),
        }
    }

    fn search_fields(product: &Product) -> Vec<&str> {
        let mut fields = vec![
            product.product_name.as_str(),
            product.category.as_str(),
            product.identifier1.as_str(),
        ];
        fields.extend(
            [
                &product.identifier2,
                &product.identifier3,
                &product.internal_description,
                &product.external_description,
            ]
            .into_iter()
            .filter_map(|f| f.as_deref()),
        );
        fields
    }

    fn matches(product: &Product, filter: &ProductFilter) -> bool {
        exact_matches(filter.category.as_ref(), &product.category)
            && filter.vendor_id.is_none_or(|id| product.vendor_id == Some(id))
            && exact_matches(filter.is_retired.as_ref(), &product.is_retired)
            && exact_matches(filter.is_sales_item.as_ref(), &product.is_sales_item)
    }
}

pub type ProductModule<S> = ErpModule<Products, S>;

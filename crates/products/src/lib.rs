//! Product catalog module.
//!
//! Prices and costs are integers in minor currency units (cents).

pub mod product;

pub use product::{
    CreateProduct, EditProduct, Product, ProductAttribute, ProductDto, ProductFilter,
    ProductListDto, ProductModule, Products,
};

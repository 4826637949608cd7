use std::sync::Arc;

use chrono::{DateTime, Utc};

use kosmos_auth::{Authorizer, Hs256TokenValidator, InMemoryPermissionRepository, PermissionChecker};
use kosmos_core::UserId;
use kosmos_crm::{Contact, ContactModule, Lead, LeadModule, Opportunity, OpportunityModule};
use kosmos_geography::{Country, CountryModule, State, StateModule};
use kosmos_infra::{AppConfig, ModuleRegistry, SeedSummary};
use kosmos_invoicing::{ApInvoice, ApInvoiceModule, ArInvoice, ArInvoiceModule};
use kosmos_module::{ErpModule, InMemoryRecordStore, ModuleDefinition, PagingLimits, SeedPermissions};
use kosmos_parties::{Customer, CustomerModule, Vendor, VendorModule};
use kosmos_products::{Product, ProductModule};
use kosmos_purchasing::{PurchaseOrder, PurchaseOrderModule};
use kosmos_sales::{Order, OrderModule, Shipment, ShipmentModule};

pub type Store<T> = InMemoryRecordStore<T>;

pub type Checker = PermissionChecker<Arc<InMemoryPermissionRepository>, Hs256TokenValidator>;

/// Every module the process hosts, sharing one permission registry and one
/// checker.
pub struct AppServices {
    pub repository: Arc<InMemoryPermissionRepository>,
    pub checker: Arc<Checker>,

    pub leads: Arc<LeadModule<Store<Lead>>>,
    pub opportunities: Arc<OpportunityModule<Store<Opportunity>>>,
    pub contacts: Arc<ContactModule<Store<Contact>>>,
    pub customers: Arc<CustomerModule<Store<Customer>>>,
    pub vendors: Arc<VendorModule<Store<Vendor>>>,
    pub products: Arc<ProductModule<Store<Product>>>,
    pub purchase_orders: Arc<PurchaseOrderModule<Store<PurchaseOrder>>>,
    pub orders: Arc<OrderModule<Store<Order>>>,
    pub shipments: Arc<ShipmentModule<Store<Shipment>>>,
    pub ap_invoices: Arc<ApInvoiceModule<Store<ApInvoice>>>,
    pub ar_invoices: Arc<ArInvoiceModule<Store<ArInvoice>>>,
    pub countries: Arc<CountryModule<Store<Country>>>,
    pub states: Arc<StateModule<Store<State>>>,

    registry: ModuleRegistry,
}

fn module<D>(
    authorizer: &Arc<dyn Authorizer>,
    paging: PagingLimits,
) -> Arc<ErpModule<D, Store<D::Record>>>
where
    D: ModuleDefinition,
{
    Arc::new(
        ErpModule::new(InMemoryRecordStore::new(D::RECORD_NAME), Arc::clone(authorizer))
            .with_paging_limits(paging),
    )
}

impl AppServices {
    pub fn new(config: &AppConfig) -> Self {
        let repository = Arc::new(InMemoryPermissionRepository::new());
        let checker = Arc::new(PermissionChecker::new(
            Arc::clone(&repository),
            Hs256TokenValidator::new(&config.jwt_secret),
        ));
        let authorizer: Arc<dyn Authorizer> = checker.clone();
        let paging = config.paging;

        let leads = module(&authorizer, paging);
        let opportunities = module(&authorizer, paging);
        let contacts = module(&authorizer, paging);
        let customers = module(&authorizer, paging);
        let vendors = module(&authorizer, paging);
        let products = module(&authorizer, paging);
        let purchase_orders = module(&authorizer, paging);
        let orders = module(&authorizer, paging);
        let shipments = module(&authorizer, paging);
        let ap_invoices = module(&authorizer, paging);
        let ar_invoices = module(&authorizer, paging);
        let countries = module(&authorizer, paging);
        let states = module(&authorizer, paging);

        let mut registry = ModuleRegistry::new();
        let hosted: [Arc<dyn SeedPermissions>; 13] = [
            leads.clone(),
            opportunities.clone(),
            contacts.clone(),
            customers.clone(),
            vendors.clone(),
            products.clone(),
            purchase_orders.clone(),
            orders.clone(),
            shipments.clone(),
            ap_invoices.clone(),
            ar_invoices.clone(),
            countries.clone(),
            states.clone(),
        ];
        for module in hosted {
            registry.register(module);
        }

        Self {
            repository,
            checker,
            leads,
            opportunities,
            contacts,
            customers,
            vendors,
            products,
            purchase_orders,
            orders,
            shipments,
            ap_invoices,
            ar_invoices,
            countries,
            states,
            registry,
        }
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    /// Run permission seeding for every hosted module.
    pub fn seed(&self, actor: UserId, now: DateTime<Utc>) -> Vec<SeedSummary> {
        self.registry.seed_all(&*self.repository, actor, now)
    }
}

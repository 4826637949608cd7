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
pub struct Shipment {
    pub id: RecordId,
    pub order_id: RecordId,
    pub carrier: String,
    pub tracking_number: Option<String>,
    pub ship_to_address: String,
    pub package_count: u32,
    pub freight_cost: i64,
    pub shipped_on: Option<NaiveDate>,
    pub shipped_by: Option<UserId>,
    pub audit: AuditFields,
}

impl_record!(Shipment);

impl Shipment {
    pub fn is_shipped(&self) -> bool {
        self.shipped_on.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateShipment {
    pub caller: Caller,
    pub order_id: RecordId,
    pub carrier: String,
    pub tracking_number: Option<String>,
    pub ship_to_address: String,
    pub package_count: u32,
    pub freight_cost: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditShipment {
    pub caller: Caller,
    pub id: RecordId,
    pub carrier: Option<String>,
    pub tracking_number: Option<String>,
    pub ship_to_address: Option<String>,
    pub package_count: Option<u32>,
    pub freight_cost: Option<i64>,
    /// Marks the shipment as shipped by the caller on this date.
    pub shipped_on: Option<NaiveDate>,
}

impl EditShipment {
    pub fn new(caller: Caller, id: RecordId) -> Self {
        Self {
            caller,
            id,
            carrier: None,
            tracking_number: None,
            ship_to_address: None,
            package_count: None,
            freight_cost: None,
            shipped_on: None,
        }
    }
}

impl ModuleCommand for CreateShipment {
    fn caller(&self) -> &Caller {
        &self.caller
    }
}

impl ModuleCommand for EditShipment {
    fn caller(&self) -> &Caller {
        &self.caller
    }
}

impl TargetsRecord for EditShipment {
    fn record_id(&self) -> RecordId {
        self.id
    }
}

impl Validate for CreateShipment {
    fn validate(&self) -> Result<(), DomainError> {
        Validator::new()
            .positive("order_id", i64::from(self.order_id.get()))
            .required("carrier", &self.carrier)
            .max_len("carrier", Some(&self.carrier), 100)
            .max_len("tracking_number", self.tracking_number.as_deref(), 100)
            .required("ship_to_address", &self.ship_to_address)
            .max_len("ship_to_address", Some(&self.ship_to_address), 1000)
            .positive("package_count", i64::from(self.package_count))
            .non_negative("freight_cost", self.freight_cost)
            .finish()
    }
}

impl Validate for EditShipment {
    fn validate(&self) -> Result<(), DomainError> {
        let mut v = Validator::new();
        v.check(self.id.get() > 0, "id must be greater than zero")
            .max_len("carrier", self.carrier.as_deref(), 100)
            .max_len("tracking_number", self.tracking_number.as_deref(), 100)
            .max_len("ship_to_address", self.ship_to_address.as_deref(), 1000);
        if let Some(count) = self.package_count {
            v.positive("package_count", i64::from(count));
        }
        if let Some(cost) = self.freight_cost {
            v.non_negative("freight_cost", cost);
        }
        v.finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShipmentFilter {
    pub order_id: Option<RecordId>,
    pub carrier: Option<String>,
    pub is_shipped: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentDto {
    pub order_id: RecordId,
    pub carrier: String,
    pub tracking_number: Option<String>,
    pub ship_to_address: String,
    pub package_count: u32,
    pub freight_cost: i64,
    pub is_shipped: bool,
    pub shipped_on: Option<NaiveDate>,
    pub shipped_by: Option<UserId>,
    #[serde(flatten)]
    pub audit: AuditDto,
}

pub type ShipmentListDto = ShipmentDto;

pub struct Shipments;

impl ModuleDefinition for Shipments {
    const MODULE_ID: ModuleId = ModuleId::from_u128(0x2d7f1a9c_4e6b_4b3a_9c8d_1a5e7f0b2c66);
    const MODULE_NAME: &'static str = "Shipments";
    const RECORD_NAME: &'static str = "Shipment";

    type Record = Shipment;
    type Dto = ShipmentDto;
    type ListDto = ShipmentListDto;
    type Create = CreateShipment;
    type Edit = EditShipment;
    type Filter = ShipmentFilter;

    fn permissions() -> ModulePermissionSet {
        ModulePermissionSet::crud(
            Self::MODULE_ID,
            Self::MODULE_NAME,
            RoleName::from_static("Shipping Users"),
            "shipment",
            "Shipment",
        )
    }

    fn create_record(cmd: &CreateShipment, audit: AuditFields) -> Shipment {
        Shipment {
            id: RecordId::new(0),
            order_id: cmd.order_id,
            carrier: cmd.carrier.clone(),
            tracking_number: cmd.tracking_number.clone(),
            ship_to_address: cmd.ship_to_address.clone(),
            package_count: cmd.package_count,
            freight_cost: cmd.freight_cost,
            shipped_on: None,
            shipped_by: None,
            audit,
        }
    }

    fn apply_edit(shipment: &mut Shipment, cmd: &EditShipment) -> Result<(), DomainError> {
        if shipment.is_shipped() && cmd.shipped_on.is_some() {
            return Err(DomainError::validation("shipment has already shipped"));
        }
        patch_text(&mut shipment.carrier, cmd.carrier.as_deref());
        patch_opt_text(&mut shipment.tracking_number, cmd.tracking_number.as_deref());
        patch_text(&mut shipment.ship_to_address, cmd.ship_to_address.as_deref());
        patch(&mut shipment.package_count, cmd.package_count.as_ref());
        patch(&mut shipment.freight_cost, cmd.freight_cost.as_ref());
        if cmd.shipped_on.is_some() {
            patch_opt(&mut shipment.shipped_on, cmd.shipped_on.as_ref());
            shipment.shipped_by = Some(cmd.caller.calling_user_id);
        }
        Ok(())
    }

    fn to_dto(shipment: &Shipment) -> ShipmentDto {
        ShipmentDto {
            order_id: shipment.order_id,
            carrier: shipment.carrier.clone(),
            tracking_number: shipment.tracking_number.clone(),
            ship_to_address: shipment.ship_to_address.clone(),
            package_count: shipment.package_count,
            freight_cost: shipment.freight_cost,
            is_shipped: shipment.is_shipped(),
            shipped_on: shipment.shipped_on,
            shipped_by: shipment.shipped_by,
            audit: AuditDto::new(shipment.id, &shipment.audit),
        }
    }

    fn to_list_dto(shipment: &Shipment) -> ShipmentListDto {
        Self::to_dto(shipment)
    }

    fn search_fields(shipment: &Shipment) -> Vec<&str> {
        let mut fields = vec![shipment.carrier.as_str(), shipment.ship_to_address.as_str()];
        fields.extend(shipment.tracking_number.as_deref());
        fields
    }

    fn matches(shipment: &Shipment, filter: &ShipmentFilter) -> bool {
        exact_matches(filter.order_id.as_ref(), &shipment.order_id)
            && exact_matches(filter.carrier.as_ref(), &shipment.carrier)
            && exact_matches(filter.is_shipped.as_ref(), &shipment.is_shipped())
    }
}

pub type ShipmentModule<S> = ErpModule<Shipments, S>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use kosmos_core::{PagingSortingParameters, ResultCode};
    use kosmos_module::{FindCommand, InMemoryRecordStore};

    use crate::test_support::{AllowAll, caller};

    fn module() -> ShipmentModule<InMemoryRecordStore<Shipment>> {
        ErpModule::new(InMemoryRecordStore::new("Shipment"), Arc::new(AllowAll))
    }

    fn parcel(order_id: i32, tracking: &str) -> CreateShipment {
        CreateShipment {
            caller: caller(1),
            order_id: RecordId::new(order_id),
            carrier: "UPS".into(),
            tracking_number: Some(tracking.into()),
            ship_to_address: "1 Main St, Springfield".into(),
            package_count: 2,
            freight_cost: 1_500,
        }
    }

    #[test]
    fn shipping_stamps_the_caller_once() {
        let module = module();
        module.create(&parcel(1, "1Z999")).into_result().unwrap();

        let mut ship = EditShipment::new(caller(5), RecordId::new(1));
        ship.shipped_on = NaiveDate::from_ymd_opt(2024, 5, 2);
        let dto = module.edit(&ship).into_result().unwrap();
        assert!(dto.is_shipped);
        assert_eq!(dto.shipped_by, Some(UserId::new(5)));

        assert_eq!(module.edit(&ship).result_code, ResultCode::DataValidationError);
    }

    #[test]
    fn zero_packages_is_invalid() {
        let mut cmd = parcel(1, "1Z999");
        cmd.package_count = 0;
        assert_eq!(module().create(&cmd).result_code, ResultCode::DataValidationError);
    }

    #[test]
    fn find_unshipped_for_an_order() {
        let module = module();
        module.create(&parcel(1, "1Z111")).into_result().unwrap();
        module.create(&parcel(1, "1Z222")).into_result().unwrap();
        module.create(&parcel(2, "1Z333")).into_result().unwrap();

        let mut ship = EditShipment::new(caller(1), RecordId::new(1));
        ship.shipped_on = NaiveDate::from_ymd_opt(2024, 5, 2);
        module.edit(&ship).into_result().unwrap();

        let found = module.find(
            PagingSortingParameters::default(),
            &FindCommand::new(caller(1)).with_filter(ShipmentFilter {
                order_id: Some(RecordId::new(1)),
                is_shipped: Some(false),
                ..ShipmentFilter::default()
            }),
        );
        assert_eq!(found.total_result_count, 1);
        assert_eq!(found.data[0].tracking_number.as_deref(), Some("1Z222"));

        let by_tracking = module.global_search(&caller(1), PagingSortingParameters::default(), "1z3");
        assert_eq!(by_tracking.total_result_count, 1);
    }
}

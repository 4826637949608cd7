use serde::{Deserialize, Serialize};

use kosmos_auth::{Caller, ModulePermissionSet, RoleName};
use kosmos_core::{
    AuditDto, AuditFields, DomainError, ModuleId, RecordId, Validate, Validator, impl_record,
};
use kosmos_module::{
    ErpModule, ModuleCommand, ModuleDefinition, TargetsRecord, exact_matches, patch_opt_text,
    patch_text,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub id: RecordId,
    pub country_name: String,
    /// Upper-case ISO 3166-1 alpha-2.
    pub iso2: String,
    /// Upper-case ISO 3166-1 alpha-3.
    pub iso3: String,
    pub phone_code: Option<String>,
    pub currency: Option<String>,
    pub currency_symbol: Option<String>,
    pub region: Option<String>,
    pub audit: AuditFields,
}

impl_record!(Country);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCountry {
    pub caller: Caller,
    pub country_name: String,
    pub iso2: String,
    pub iso3: String,
    pub phone_code: Option<String>,
    pub currency: Option<String>,
    pub currency_symbol: Option<String>,
    pub region: Option<String>,
}

impl CreateCountry {
    pub fn new(caller: Caller, country_name: impl Into<String>, iso2: &str, iso3: &str) -> Self {
        Self {
            caller,
            country_name: country_name.into(),
            iso2: iso2.to_string(),
            iso3: iso3.to_string(),
            phone_code: None,
            currency: None,
            currency_symbol: None,
            region: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditCountry {
    pub caller: Caller,
    pub id: RecordId,
    pub country_name: Option<String>,
    pub iso2: Option<String>,
    pub iso3: Option<String>,
    pub phone_code: Option<String>,
    pub currency: Option<String>,
    pub currency_symbol: Option<String>,
    pub region: Option<String>,
}

impl EditCountry {
    pub fn new(caller: Caller, id: RecordId) -> Self {
        Self {
            caller,
            id,
            country_name: None,
            iso2: None,
            iso3: None,
            phone_code: None,
            currency: None,
            currency_symbol: None,
            region: None,
        }
    }
}

impl ModuleCommand for CreateCountry {
    fn caller(&self) -> &Caller {
        &self.caller
    }
}

impl ModuleCommand for EditCountry {
    fn caller(&self) -> &Caller {
        &self.caller
    }
}

impl TargetsRecord for EditCountry {
    fn record_id(&self) -> RecordId {
        self.id
    }
}

fn is_alpha(code: &str) -> bool {
    code.chars().all(|c| c.is_ascii_alphabetic())
}

impl Validate for CreateCountry {
    fn validate(&self) -> Result<(), DomainError> {
        Validator::new()
            .required("country_name", &self.country_name)
            .max_len("country_name", Some(&self.country_name), 100)
            .exact_len("iso2", &self.iso2, 2)
            .exact_len("iso3", &self.iso3, 3)
            .check(
                is_alpha(&self.iso2) && is_alpha(&self.iso3),
                "iso codes must be letters",
            )
            .max_len("phone_code", self.phone_code.as_deref(), 20)
            .max_len("currency", self.currency.as_deref(), 3)
            .max_len("currency_symbol", self.currency_symbol.as_deref(), 10)
            .max_len("region", self.region.as_deref(), 100)
            .finish()
    }
}

impl Validate for EditCountry {
    fn validate(&self) -> Result<(), DomainError> {
        let mut v = Validator::new();
        v.check(self.id.get() > 0, "id must be greater than zero")
            .max_len("country_name", self.country_name.as_deref(), 100)
            .max_len("phone_code", self.phone_code.as_deref(), 20)
            .max_len("currency", self.currency.as_deref(), 3)
            .max_len("currency_symbol", self.currency_symbol.as_deref(), 10)
            .max_len("region", self.region.as_deref(), 100);
        for (field, code, len) in [("iso2", &self.iso2, 2), ("iso3", &self.iso3, 3)] {
            if let Some(code) = code.as_deref().filter(|c| !c.is_empty()) {
                v.exact_len(field, code, len)
                    .check(is_alpha(code), "iso codes must be letters");
            }
        }
        v.finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CountryFilter {
    pub region: Option<String>,
    pub iso3: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryDto {
    pub country_name: String,
    pub iso2: String,
    pub iso3: String,
    pub phone_code: Option<String>,
    pub currency: Option<String>,
    pub currency_symbol: Option<String>,
    pub region: Option<String>,
    #[serde(flatten)]
    pub audit: AuditDto,
}

pub type CountryListDto = CountryDto;

pub struct Countries;

impl ModuleDefinition for Countries {
    const MODULE_ID: ModuleId = ModuleId::from_u128(0x6a1c9e3b_2f7d_4d5a_8b0e_9c4f2a1d3e77);
    const MODULE_NAME: &'static str = "Countries";
    const RECORD_NAME: &'static str = "Country";

    type Record = Country;
    type Dto = CountryDto;
    type ListDto = CountryListDto;
    type Create = CreateCountry;
    type Edit = EditCountry;
    type Filter = CountryFilter;

    fn permissions() -> ModulePermissionSet {
        ModulePermissionSet::crud(
            Self::MODULE_ID,
            Self::MODULE_NAME,
            RoleName::from_static("Country Users"),
            "country",
            "Country",
        )
    }

    fn create_record(cmd: &CreateCountry, audit: AuditFields) -> Country {
        Country {
            id: RecordId::new(0),
            country_name: cmd.country_name.clone(),
            iso2: cmd.iso2.to_ascii_uppercase(),
            iso3: cmd.iso3.to_ascii_uppercase(),
            phone_code: cmd.phone_code.clone(),
            currency: cmd.currency.clone(),
            currency_symbol: cmd.currency_symbol.clone(),
            region: cmd.region.clone(),
            audit,
        }
    }

    fn apply_edit(country: &mut Country, cmd: &EditCountry) -> Result<(), DomainError> {
        patch_text(&mut country.country_name, cmd.country_name.as_deref());
        patch_text(
            &mut country.iso2,
            cmd.iso2.as_deref().map(str::to_ascii_uppercase).as_deref(),
        );
        patch_text(
            &mut country.iso3,
            cmd.iso3.as_deref().map(str::to_ascii_uppercase).as_deref(),
        );
        patch_opt_text(&mut country.phone_code, cmd.phone_code.as_deref());
        patch_opt_text(&mut country.currency, cmd.currency.as_deref());
        patch_opt_text(&mut country.currency_symbol, cmd.currency_symbol.as_deref());
        patch_opt_text(&mut country.region, cmd.region.as_deref());
        Ok(())
    }

    fn to_dto(country: &Country) -> CountryDto {
        CountryDto {
            country_name: country.country_name.clone(),
            iso2: country.iso2.clone(),
            iso3: country.iso3.clone(),
            phone_code: country.phone_code.clone(),
            currency: country.currency.clone(),
            currency_symbol: country.currency_symbol.clone(),
            region: country.region.clone(),
            audit: AuditDto::new(country.id, &country.audit),
        }
    }

    fn to_list_dto(country: &Country) -> CountryListDto {
        Self::to_dto(country)
    }

    fn search_fields(country: &Country) -> Vec<&str> {
        vec![
            country.country_name.as_str(),
            country.iso2.as_str(),
            country.iso3.as_str(),
        ]
    }

    fn matches(country: &Country, filter: &CountryFilter) -> bool {
        filter.region.as_deref().is_none_or(|region| {
            country
                .region
                .as_deref()
                .is_some_and(|r| r.eq_ignore_ascii_case(region))
        }) && exact_matches(
            filter.iso3.as_ref().map(|c| c.to_ascii_uppercase()).as_ref(),
            &country.iso3,
        )
    }
}

pub type CountryModule<S> = ErpModule<Countries, S>;

//! Reference geography: countries and their states/provinces.

pub mod country;
pub mod state;

pub use country::{
    Countries, Country, CountryDto, CountryFilter, CountryListDto, CountryModule, CreateCountry,
    EditCountry,
};
pub use state::{CreateState, EditState, State, StateDto, StateFilter, StateListDto, StateModule, States};

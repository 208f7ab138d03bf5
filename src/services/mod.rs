//! Typed services over the HubSpot CRM API.

mod contacts;

pub use contacts::{
    ContactSearchRequest, ContactSearchResponse, ContactsService, Filter, FilterGroup,
};

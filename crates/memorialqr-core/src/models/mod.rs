//! Data models for the memorial QR service.
//!
//! Field names on the wire follow the remote API (Turkish, camelCase);
//! the Rust side uses English names with serde renames.
//!
//! - `Person`: a commemorated person, addressed by national ID (`tcno`)
//! - `Company`: a company profile, addressed by `company_code`
//! - Create/Update payloads for both

pub mod company;
pub mod person;

pub use company::{
    filter_companies, is_coordinate, maps_url, Company, CreateCompany, MediaResponse, UpdateCompany,
};
pub use person::{filter_persons, CreatePerson, ImagesResponse, Person, UpdatePerson};

//! Clients, the people and companies that hand over cheques.

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod form;
mod list;

pub use create::{create_client_endpoint, get_new_client_page};
pub use db::{
    ClientFilter, create_client, create_client_table, get_all_clients, get_client, search_clients,
    update_client,
};
pub use delete::delete_client_endpoint;
pub use domain::{Client, ClientBuilder, ClientId, ClientKind, ClientName};
pub use edit::{get_edit_client_page, update_client_endpoint};
pub use form::get_identity_fields;
pub use list::get_clients_page;

//! Bank branches. Cheques are drawn on a branch and may be deposited at another.

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod form;
mod options;

pub use create::{create_branch_endpoint, get_new_branch_page};
pub use db::{
    create_branch, create_branch_table, get_all_branches, get_branch, get_branch_choices,
    update_branch,
};
pub use delete::delete_branch_endpoint;
pub use domain::{Branch, BranchBuilder, BranchChoice, BranchId, BranchName};
pub use edit::{get_edit_branch_page, update_branch_endpoint};
pub use options::get_branch_options;

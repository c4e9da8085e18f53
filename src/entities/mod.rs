//! sea-orm entities for the workflow domain. User and session entities live
//! under `crate::auth`.

pub mod customer;
pub mod department;
pub mod material;
pub mod notification;
pub mod origin;
pub mod procedure;
pub mod request;
pub mod request_approval_info;
pub mod request_input;
pub mod request_material;
pub mod request_status_history;
pub mod source_other;
pub mod subprocess;
pub mod subprocess_history;

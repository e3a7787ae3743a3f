pub mod compare;
pub mod list_models;
pub mod run;

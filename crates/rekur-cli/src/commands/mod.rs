pub mod add;
pub mod delete;
pub mod r#do;
pub mod edit;
pub mod list;
pub mod series;
pub mod show;
pub mod undo;

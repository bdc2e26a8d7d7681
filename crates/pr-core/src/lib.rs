//! Payroll rule & filter engine.
//!
//! The crate is pure: documents are compiled (and validated) into typed
//! filters and rules, which are then evaluated against [`Record`]s without
//! touching the input. Rendering of rules for display lives in [`display`].

pub mod action;
pub mod category;
pub mod condition;
pub mod display;
pub mod document;
pub mod employee_filter;
pub mod error;
pub mod field_map;
pub mod filter;
pub mod record;
pub mod rule;
pub mod schema;

pub use action::{ArithOp, RuleAction};
pub use category::{CategoryMap, CategoryResolver, NoLabels};
pub use condition::{AtomCondition, Combinator, RuleCondition};
pub use display::render;
pub use document::{
    EmployeeFilterDocument, FieldMapDocument, RuleDocument, compile_employee_filter,
    compile_field_map, compile_rule,
};
pub use employee_filter::EmployeeFilter;
pub use error::{CoreReason, EngineError};
pub use field_map::{FieldMap, FieldMapItem, Row};
pub use filter::FilterField;
pub use record::{Record, Value};
pub use rule::{ActionFailure, AtomRule, Evaluation, Rule};
pub use schema::{EmployeeSchema, FilterKind};

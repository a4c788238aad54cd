//! Generated SQL for the audit subsystem

mod ddl;

pub use ddl::{
    append_only_guard_ddl, audit_function_ddl, create_schema_sql, create_trigger_sql,
    drop_function_sql, drop_trigger_sql, guard_function_name, guard_trigger_name, log_index_ddl,
    log_table_ddl,
};

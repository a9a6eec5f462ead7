// Security module for path validation
//
// Files written on behalf of callers are confined to the configured root
// directory when one is set.

pub mod path_validator;

pub use path_validator::{PathSecurityError, validate_write_path};

//! Cermin Core Object Model
//!
//! This crate provides the minimal types the Cermin reflection engine
//! operates on, without depending on the registry or descriptor machinery:
//! - **Values**: a small dynamic value representation (`value` module)
//! - **Objects**: reflectable instances with stable identity (`object` module)
//! - **Conversion**: Rust primitives ↔ `Value` traits (`convert` module)
//!
//! # Example
//!
//! ```rust,ignore
//! use cermin_core::{FromValue, IntoValue, ObjectRef, Reflectable, Value};
//!
//! struct Point { x: f64, y: f64 }
//!
//! impl Reflectable for Point {
//!     fn class_name(&self) -> &'static str { "Point" }
//!     fn as_any(&self) -> &dyn std::any::Any { self }
//!     fn as_any_mut(&mut self) -> &mut dyn std::any::Any { self }
//! }
//!
//! let point = ObjectRef::new(Point { x: 1.0, y: 2.0 });
//! let value = Value::Object(point.clone());
//! assert_eq!(value.kind().as_str(), "object");
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod convert;
pub mod error;
pub mod object;
pub mod value;

pub use convert::{FromValue, IntoValue};
pub use error::AccessError;
pub use object::{InstanceId, ObjectRef, Reflectable};
pub use value::{Value, ValueKind};

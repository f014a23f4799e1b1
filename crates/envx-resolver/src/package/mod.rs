// Package model for the envx resolver
//
// This module provides the data types the index, solver, and context builder
// share: catalog packages with their variants, the request grammar, and
// environment operations expressed as data.

mod env_op;
mod package;
mod request;

pub use env_op::EnvOp;
pub use package::{Package, Variant};
pub use request::{PackageRequest, RequestMode, RequestParseError};
